//! Agent subsystem: the three privacy-policy personas, their construction,
//! caching, and dispatch.
//!
//! [`AgentKind`] is the closed set of supported agent types. Per-kind
//! assembly lives in [`builders`], caching and chat dispatch in [`factory`],
//! and intent routing plus the request surface in [`manager`].

pub mod builders;
pub mod descriptor;
pub mod factory;
pub mod manager;

pub use builders::{
    ComplianceCheckerBuilder, PrivacyPolicyGeneratorBuilder, ReadabilityCheckerBuilder,
};
pub use descriptor::AgentDescriptor;
pub use factory::AgentFactory;
pub use manager::{AgentManager, ManagerStatus, RequestContext};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of agent types this service can build.
///
/// Wire names are the snake_case forms (`privacy_policy_generator`,
/// `compliance_checker`, `readability_checker`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    PrivacyPolicyGenerator,
    ComplianceChecker,
    ReadabilityChecker,
}

impl AgentKind {
    /// All supported kinds, in registry order.
    pub const ALL: [AgentKind; 3] = [
        AgentKind::PrivacyPolicyGenerator,
        AgentKind::ComplianceChecker,
        AgentKind::ReadabilityChecker,
    ];

    /// Canonical wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::PrivacyPolicyGenerator => "privacy_policy_generator",
            AgentKind::ComplianceChecker => "compliance_checker",
            AgentKind::ReadabilityChecker => "readability_checker",
        }
    }

    /// The peer kinds this agent may hand a conversation off to. Never
    /// contains the agent itself.
    pub fn handoff_targets(self) -> BTreeSet<AgentKind> {
        Self::ALL.iter().copied().filter(|kind| *kind != self).collect()
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "privacy_policy_generator" => Ok(AgentKind::PrivacyPolicyGenerator),
            "compliance_checker" => Ok(AgentKind::ComplianceChecker),
            "readability_checker" => Ok(AgentKind::ReadabilityChecker),
            other => Err(AgentError::UnsupportedType(other.to_string())),
        }
    }
}

/// Failure classes surfaced by the agent layer.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The requested agent type is not one of the supported kinds.
    #[error("unsupported agent type: {0}")]
    UnsupportedType(String),

    /// Agent assembly failed (invalid persona, broken construction input).
    #[error("agent build failed: {0}")]
    Build(anyhow::Error),

    /// The model round trip failed after the agent was built.
    #[error("model dispatch failed: {0}")]
    Dispatch(anyhow::Error),

    /// A memory write could not be completed.
    #[error("memory store failed: {0}")]
    MemoryIo(anyhow::Error),
}

/// Display information for one agent type, as reported by the listing and
/// status surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInfo {
    #[serde(rename = "type")]
    pub kind: AgentKind,
    pub name: String,
    pub description: String,
    pub status: String,
}

/// Uniform envelope for one chat dispatch.
///
/// Exactly one of `response` / `error` is populated, matching `success`.
/// `agent_type` echoes the caller's string so unknown types survive the
/// round trip verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub success: bool,
    pub agent_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set only on the auto-routing path: the kind the router chose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_agent: Option<String>,
}

impl ChatOutcome {
    /// Successful dispatch carrying the model's reply.
    pub fn success(agent_type: impl Into<String>, response: String) -> Self {
        let agent_type = agent_type.into();
        Self {
            success: true,
            message: format!("{agent_type} completed"),
            agent_type,
            response: Some(response),
            error: None,
            selected_agent: None,
        }
    }

    /// Failed dispatch carrying the error description.
    pub fn failure(agent_type: impl Into<String>, error: impl Into<String>) -> Self {
        let agent_type = agent_type.into();
        Self {
            success: false,
            message: format!("agent {agent_type} failed"),
            agent_type,
            response: None,
            error: Some(error.into()),
            selected_agent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── AgentKind ────────────────────────────────────────────────────

    #[test]
    fn kind_parses_wire_names() {
        assert_eq!(
            "privacy_policy_generator".parse::<AgentKind>().unwrap(),
            AgentKind::PrivacyPolicyGenerator
        );
        assert_eq!(
            "compliance_checker".parse::<AgentKind>().unwrap(),
            AgentKind::ComplianceChecker
        );
        assert_eq!(
            "readability_checker".parse::<AgentKind>().unwrap(),
            AgentKind::ReadabilityChecker
        );
    }

    #[test]
    fn kind_rejects_unknown_names() {
        let err = "policy_wizard".parse::<AgentKind>().unwrap_err();
        assert!(matches!(err, AgentError::UnsupportedType(_)));
        assert_eq!(err.to_string(), "unsupported agent type: policy_wizard");
    }

    #[test]
    fn kind_rejects_display_case() {
        assert!("Privacy_Policy_Generator".parse::<AgentKind>().is_err());
        assert!("".parse::<AgentKind>().is_err());
    }

    #[test]
    fn kind_display_matches_wire_name() {
        for kind in AgentKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&AgentKind::PrivacyPolicyGenerator).unwrap();
        assert_eq!(json, "\"privacy_policy_generator\"");
        let back: AgentKind = serde_json::from_str("\"readability_checker\"").unwrap();
        assert_eq!(back, AgentKind::ReadabilityChecker);
    }

    #[test]
    fn handoff_targets_exclude_self() {
        for kind in AgentKind::ALL {
            let targets = kind.handoff_targets();
            assert_eq!(targets.len(), 2);
            assert!(!targets.contains(&kind));
        }
    }

    // ── ChatOutcome ──────────────────────────────────────────────────

    #[test]
    fn success_outcome_has_response_and_no_error() {
        let outcome = ChatOutcome::success("privacy_policy_generator", "done".to_string());
        assert!(outcome.success);
        assert_eq!(outcome.response.as_deref(), Some("done"));
        assert!(outcome.error.is_none());
        assert_eq!(outcome.message, "privacy_policy_generator completed");
    }

    #[test]
    fn failure_outcome_has_error_and_no_response() {
        let outcome = ChatOutcome::failure("compliance_checker", "backend down");
        assert!(!outcome.success);
        assert!(outcome.response.is_none());
        assert_eq!(outcome.error.as_deref(), Some("backend down"));
        assert_eq!(outcome.message, "agent compliance_checker failed");
    }

    #[test]
    fn failure_outcome_echoes_unknown_type_verbatim() {
        let outcome = ChatOutcome::failure("no_such_agent", "unsupported agent type: no_such_agent");
        assert_eq!(outcome.agent_type, "no_such_agent");
    }

    #[test]
    fn outcome_serialization_skips_unset_fields() {
        let json =
            serde_json::to_value(ChatOutcome::success("readability_checker", "ok".to_string()))
                .unwrap();
        assert!(json.get("error").is_none());
        assert!(json.get("selected_agent").is_none());
        assert_eq!(json["agent_type"], "readability_checker");
    }
}
