//! Immutable, validated representation of a built agent.

use super::{AgentError, AgentKind};
use crate::memory::MemoryCollection;
use crate::prompts::AgentBlueprint;
use std::collections::BTreeSet;

/// A fully assembled agent: persona plus the tool and memory context it was
/// built with.
///
/// Descriptors are validated at construction and never mutated afterwards;
/// the factory shares them out of its cache as `Arc<AgentDescriptor>`.
#[derive(Debug, Clone)]
pub struct AgentDescriptor {
    kind: AgentKind,
    name: String,
    description: String,
    system_prompt: String,
    tools: Vec<String>,
    memories: Vec<MemoryCollection>,
    handoff_targets: BTreeSet<AgentKind>,
}

impl AgentDescriptor {
    /// Assemble a descriptor, rejecting personas with an empty system prompt
    /// and handoff sets that include the agent itself.
    pub fn new(
        kind: AgentKind,
        blueprint: &AgentBlueprint,
        tools: Vec<String>,
        memories: Vec<MemoryCollection>,
        handoff_targets: BTreeSet<AgentKind>,
    ) -> Result<Self, AgentError> {
        if blueprint.system_prompt.trim().is_empty() {
            return Err(AgentError::Build(anyhow::anyhow!(
                "agent {kind} has an empty system prompt"
            )));
        }
        if handoff_targets.contains(&kind) {
            return Err(AgentError::Build(anyhow::anyhow!(
                "agent {kind} lists itself as a handoff target"
            )));
        }

        Ok(Self {
            kind,
            name: blueprint.display_name.to_string(),
            description: blueprint.description.to_string(),
            system_prompt: blueprint.system_prompt.to_string(),
            tools,
            memories,
            handoff_targets,
        })
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    /// Memory collections in the order they were requested.
    pub fn memories(&self) -> &[MemoryCollection] {
        &self.memories
    }

    pub fn handoff_targets(&self) -> &BTreeSet<AgentKind> {
        &self.handoff_targets
    }
}
