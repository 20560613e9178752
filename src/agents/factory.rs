//! Descriptor construction, caching, and chat dispatch.

use super::builders;
use super::descriptor::AgentDescriptor;
use super::{AgentError, AgentInfo, AgentKind, ChatOutcome};
use crate::memory::ListMemoryStore;
use crate::model::ModelClient;
use crate::prompts;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Value-based cache key: structurally identical build requests share one
/// entry regardless of argument provenance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: AgentKind,
    tools: Vec<String>,
    memory_files: Vec<String>,
}

impl CacheKey {
    fn new(kind: AgentKind, tools: &[String], memory_files: &[String]) -> Self {
        Self { kind, tools: tools.to_vec(), memory_files: memory_files.to_vec() }
    }
}

/// Builds agents on demand and keeps every built descriptor until an
/// explicit [`clear_cache`](AgentFactory::clear_cache). This cache is the
/// only one in the process; callers share descriptors through it.
pub struct AgentFactory {
    client: Arc<dyn ModelClient>,
    store: Arc<ListMemoryStore>,
    cache: Mutex<HashMap<CacheKey, Arc<AgentDescriptor>>>,
}

impl AgentFactory {
    pub fn new(client: Arc<dyn ModelClient>, store: Arc<ListMemoryStore>) -> Self {
        Self { client, store, cache: Mutex::new(HashMap::new()) }
    }

    /// Build `agent_type` with the given tool and memory arguments, reusing
    /// the cached descriptor when an identical request was built before.
    ///
    /// The cache lock is not held across the build: two concurrent misses
    /// for one key may both build, and the later insert wins.
    pub async fn build(
        &self,
        agent_type: &str,
        tools: &[String],
        memory_files: &[String],
    ) -> Result<Arc<AgentDescriptor>, AgentError> {
        let kind = AgentKind::from_str(agent_type)?;
        let key = CacheKey::new(kind, tools, memory_files);

        if let Some(descriptor) = self.cache.lock().get(&key) {
            tracing::debug!(agent = %kind, "Agent cache hit");
            return Ok(descriptor.clone());
        }

        tracing::debug!(agent = %kind, "Agent cache miss, building");
        let descriptor =
            Arc::new(builders::build_agent(kind, tools, memory_files, &self.store).await?);
        self.cache.lock().insert(key, descriptor.clone());
        Ok(descriptor)
    }

    /// Static display info for one agent type.
    pub fn agent_info(&self, agent_type: &str) -> Result<AgentInfo, AgentError> {
        let kind = AgentKind::from_str(agent_type)?;
        let blueprint = prompts::blueprint(kind);
        Ok(AgentInfo {
            kind,
            name: blueprint.display_name.to_string(),
            description: blueprint.description.to_string(),
            status: "available".to_string(),
        })
    }

    /// Info for every supported type. A type whose info cannot be produced
    /// is logged and skipped rather than failing the whole listing.
    pub fn available_agents(&self) -> Vec<AgentInfo> {
        let mut agents = Vec::with_capacity(AgentKind::ALL.len());
        for kind in AgentKind::ALL {
            match self.agent_info(kind.as_str()) {
                Ok(info) => agents.push(info),
                Err(error) => {
                    tracing::warn!(agent = %kind, "Skipping agent info: {error}");
                }
            }
        }
        agents
    }

    /// One full chat turn: build (or reuse) the agent, send the message,
    /// wrap the result. Every failure comes back inside the envelope.
    pub async fn chat(
        &self,
        agent_type: &str,
        message: &str,
        tools: &[String],
        memory_files: &[String],
    ) -> ChatOutcome {
        let descriptor = match self.build(agent_type, tools, memory_files).await {
            Ok(descriptor) => descriptor,
            Err(error) => {
                tracing::error!(agent = agent_type, "Agent build failed: {error}");
                return ChatOutcome::failure(agent_type, error.to_string());
            }
        };

        match self.client.complete(descriptor.system_prompt(), message).await {
            Ok(response) => ChatOutcome::success(agent_type, response),
            Err(error) => {
                let error = AgentError::Dispatch(error);
                tracing::error!(agent = agent_type, "Chat dispatch failed: {error}");
                ChatOutcome::failure(agent_type, error.to_string())
            }
        }
    }

    /// Drop every cached descriptor.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        let evicted = cache.len();
        cache.clear();
        tracing::info!(evicted, "Agent cache cleared");
    }

    /// Number of descriptors currently cached.
    pub fn cached_count(&self) -> usize {
        self.cache.lock().len()
    }
}
