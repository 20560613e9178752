//! Request surface over the factory: explicit dispatch, intent-routed
//! dispatch, and the status snapshot.
//!
//! The manager owns the factory and the intent router. It holds no agent
//! cache of its own; the factory's value-keyed cache is the only one.

use super::descriptor::AgentDescriptor;
use super::factory::AgentFactory;
use super::{AgentError, AgentInfo, AgentKind, ChatOutcome};
use crate::routing::{KeywordRouter, MatchedBy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Optional per-request context: opaque tool references and memory
/// collection names to load into the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub memory_files: Vec<String>,
}

/// Aggregate snapshot for the status endpoint and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerStatus {
    pub total_agents: usize,
    pub cached_agents: usize,
    pub agents: BTreeMap<String, AgentInfo>,
}

/// Front door for agent requests.
pub struct AgentManager {
    factory: AgentFactory,
    router: KeywordRouter,
}

impl AgentManager {
    pub fn new(factory: AgentFactory) -> Self {
        Self { factory, router: KeywordRouter::default() }
    }

    pub fn factory(&self) -> &AgentFactory {
        &self.factory
    }

    /// Display info for every supported agent type.
    pub fn available_agents(&self) -> Vec<AgentInfo> {
        self.factory.available_agents()
    }

    /// Resolve a descriptor for `agent_type` with no tools or memory.
    /// Unknown types are a caller error and propagate.
    pub async fn agent(&self, agent_type: &str) -> Result<Arc<AgentDescriptor>, AgentError> {
        self.factory.build(agent_type, &[], &[]).await
    }

    /// Snapshot of the supported types and the cache population.
    pub fn status(&self) -> ManagerStatus {
        let agents: BTreeMap<String, AgentInfo> = self
            .factory
            .available_agents()
            .into_iter()
            .map(|info| (info.kind.to_string(), info))
            .collect();

        ManagerStatus {
            total_agents: AgentKind::ALL.len(),
            cached_agents: self.factory.cached_count(),
            agents,
        }
    }

    /// Pick the agent kind for a free-text message.
    pub fn select_agent_by_intent(&self, message: &str) -> AgentKind {
        let decision = self.router.route(message);
        match decision.matched_by {
            MatchedBy::Keyword(keyword) => {
                tracing::info!(agent = %decision.kind, keyword, "Intent matched");
            }
            MatchedBy::Default => {
                tracing::info!(agent = %decision.kind, "No intent keyword, using default agent");
            }
        }
        decision.kind
    }

    /// One chat turn against an explicitly chosen agent. Every failure,
    /// including an unknown `agent_type`, comes back inside the envelope.
    pub async fn process_request(
        &self,
        agent_type: &str,
        message: &str,
        context: Option<&RequestContext>,
    ) -> ChatOutcome {
        let (tools, memory_files) = context
            .map(|c| (c.tools.as_slice(), c.memory_files.as_slice()))
            .unwrap_or((&[], &[]));
        self.factory.chat(agent_type, message, tools, memory_files).await
    }

    /// Classify the message, dispatch to the selected agent, and stamp the
    /// outcome with the router's choice.
    pub async fn auto_process_request(
        &self,
        message: &str,
        context: Option<&RequestContext>,
    ) -> ChatOutcome {
        let kind = self.select_agent_by_intent(message);
        let mut outcome = self.process_request(kind.as_str(), message, context).await;
        outcome.selected_agent = Some(kind.to_string());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ListMemoryStore;
    use crate::model::mock::MockModelClient;
    use tempfile::TempDir;

    fn manager_with(client: MockModelClient, tmp: &TempDir) -> AgentManager {
        let store = Arc::new(ListMemoryStore::new(tmp.path().join("memory")));
        AgentManager::new(AgentFactory::new(Arc::new(client), store))
    }

    // ── Intent selection ─────────────────────────────────────────────

    #[test]
    fn intent_vectors_route_as_documented() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with(MockModelClient::replying("ok"), &tmp);

        assert_eq!(
            manager.select_agent_by_intent("请帮我生成一个隐私政策"),
            AgentKind::PrivacyPolicyGenerator
        );
        assert_eq!(
            manager.select_agent_by_intent("检查这个隐私政策是否合规"),
            AgentKind::ComplianceChecker
        );
        assert_eq!(
            manager.select_agent_by_intent("这段文字可读性如何"),
            AgentKind::ReadabilityChecker
        );
        assert_eq!(manager.select_agent_by_intent("hello"), AgentKind::PrivacyPolicyGenerator);
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn process_success_sets_response_and_no_error() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with(MockModelClient::replying("done"), &tmp);

        let outcome =
            manager.process_request("privacy_policy_generator", "generate", None).await;

        assert!(outcome.success);
        assert_eq!(outcome.response.as_deref(), Some("done"));
        assert!(outcome.error.is_none());
        assert!(outcome.selected_agent.is_none());
    }

    #[tokio::test]
    async fn process_failure_sets_error_and_no_response() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with(MockModelClient::failing("timeout"), &tmp);

        let outcome = manager.process_request("readability_checker", "score this", None).await;

        assert!(!outcome.success);
        assert!(outcome.response.is_none());
        assert!(outcome.error.unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn process_unknown_type_returns_failure_envelope() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with(MockModelClient::replying("ok"), &tmp);

        let outcome = manager.process_request("policy_wizard", "hello", None).await;

        assert!(!outcome.success);
        assert_eq!(outcome.agent_type, "policy_wizard");
        assert!(outcome.error.unwrap().contains("unsupported agent type"));
    }

    #[tokio::test]
    async fn process_passes_context_to_the_builder() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with(MockModelClient::replying("ok"), &tmp);

        let context = RequestContext {
            tools: vec!["lookup".to_string()],
            memory_files: vec!["laws".to_string()],
        };
        let outcome =
            manager.process_request("compliance_checker", "check", Some(&context)).await;

        assert!(outcome.success);
        assert_eq!(manager.factory().cached_count(), 1);
    }

    #[tokio::test]
    async fn auto_process_stamps_the_selected_agent() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with(MockModelClient::replying("ok"), &tmp);

        let outcome = manager.auto_process_request("请帮我生成一个隐私政策", None).await;

        assert!(outcome.success);
        assert_eq!(outcome.selected_agent.as_deref(), Some("privacy_policy_generator"));
        assert_eq!(outcome.agent_type, "privacy_policy_generator");
    }

    #[tokio::test]
    async fn auto_process_stamps_even_on_failure() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with(MockModelClient::failing("down"), &tmp);

        let outcome = manager.auto_process_request("检查合规", None).await;

        assert!(!outcome.success);
        assert_eq!(outcome.selected_agent.as_deref(), Some("compliance_checker"));
    }

    // ── Status and lookups ───────────────────────────────────────────

    #[tokio::test]
    async fn status_counts_supported_and_cached_agents() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with(MockModelClient::replying("ok"), &tmp);

        let before = manager.status();
        assert_eq!(before.total_agents, 3);
        assert_eq!(before.cached_agents, 0);
        assert_eq!(before.agents.len(), 3);
        assert!(before.agents.contains_key("privacy_policy_generator"));

        manager.agent("compliance_checker").await.unwrap();
        assert_eq!(manager.status().cached_agents, 1);
    }

    #[tokio::test]
    async fn agent_lookup_propagates_unknown_types() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with(MockModelClient::replying("ok"), &tmp);

        let error = manager.agent("policy_wizard").await.unwrap_err();
        assert!(matches!(error, AgentError::UnsupportedType(_)));
    }
}
