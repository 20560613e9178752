//! Per-kind agent builders.
//!
//! The three builders share one assembly path: pin the kind, pull the
//! persona from the prompt registry, load memory collections in input order,
//! and declare the other two kinds as handoff targets.

use super::descriptor::AgentDescriptor;
use super::{AgentError, AgentKind};
use crate::memory::{ListMemoryStore, MemoryCollection};
use crate::prompts;

async fn assemble(
    kind: AgentKind,
    tools: &[String],
    memory_files: &[String],
    store: &ListMemoryStore,
) -> Result<AgentDescriptor, AgentError> {
    let blueprint = prompts::blueprint(kind);

    let mut memories = Vec::with_capacity(memory_files.len());
    for name in memory_files {
        let records = store.load(name).await;
        memories.push(MemoryCollection { name: name.clone(), records });
    }

    AgentDescriptor::new(kind, blueprint, tools.to_vec(), memories, kind.handoff_targets())
}

/// Builds [`AgentKind::PrivacyPolicyGenerator`] descriptors.
pub struct PrivacyPolicyGeneratorBuilder {
    tools: Vec<String>,
    memory_files: Vec<String>,
}

impl PrivacyPolicyGeneratorBuilder {
    pub fn new(tools: Vec<String>, memory_files: Vec<String>) -> Self {
        Self { tools, memory_files }
    }

    pub async fn build(&self, store: &ListMemoryStore) -> Result<AgentDescriptor, AgentError> {
        assemble(AgentKind::PrivacyPolicyGenerator, &self.tools, &self.memory_files, store).await
    }
}

/// Builds [`AgentKind::ComplianceChecker`] descriptors.
pub struct ComplianceCheckerBuilder {
    tools: Vec<String>,
    memory_files: Vec<String>,
}

impl ComplianceCheckerBuilder {
    pub fn new(tools: Vec<String>, memory_files: Vec<String>) -> Self {
        Self { tools, memory_files }
    }

    pub async fn build(&self, store: &ListMemoryStore) -> Result<AgentDescriptor, AgentError> {
        assemble(AgentKind::ComplianceChecker, &self.tools, &self.memory_files, store).await
    }
}

/// Builds [`AgentKind::ReadabilityChecker`] descriptors.
pub struct ReadabilityCheckerBuilder {
    tools: Vec<String>,
    memory_files: Vec<String>,
}

impl ReadabilityCheckerBuilder {
    pub fn new(tools: Vec<String>, memory_files: Vec<String>) -> Self {
        Self { tools, memory_files }
    }

    pub async fn build(&self, store: &ListMemoryStore) -> Result<AgentDescriptor, AgentError> {
        assemble(AgentKind::ReadabilityChecker, &self.tools, &self.memory_files, store).await
    }
}

/// Dispatch to the builder for `kind`.
pub(crate) async fn build_agent(
    kind: AgentKind,
    tools: &[String],
    memory_files: &[String],
    store: &ListMemoryStore,
) -> Result<AgentDescriptor, AgentError> {
    match kind {
        AgentKind::PrivacyPolicyGenerator => {
            PrivacyPolicyGeneratorBuilder::new(tools.to_vec(), memory_files.to_vec())
                .build(store)
                .await
        }
        AgentKind::ComplianceChecker => {
            ComplianceCheckerBuilder::new(tools.to_vec(), memory_files.to_vec())
                .build(store)
                .await
        }
        AgentKind::ReadabilityChecker => {
            ReadabilityCheckerBuilder::new(tools.to_vec(), memory_files.to_vec())
                .build(store)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRecord;
    use tempfile::TempDir;

    fn test_store(tmp: &TempDir) -> ListMemoryStore {
        ListMemoryStore::new(tmp.path().join("memory"))
    }

    #[tokio::test]
    async fn builder_pins_kind_and_persona() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        let descriptor = ComplianceCheckerBuilder::new(Vec::new(), Vec::new())
            .build(&store)
            .await
            .unwrap();

        assert_eq!(descriptor.kind(), AgentKind::ComplianceChecker);
        assert_eq!(descriptor.name(), "Compliance Checker");
        assert!(descriptor.system_prompt().contains("compliance"));
    }

    #[tokio::test]
    async fn builder_declares_the_other_two_as_handoffs() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        let descriptor = PrivacyPolicyGeneratorBuilder::new(Vec::new(), Vec::new())
            .build(&store)
            .await
            .unwrap();

        let targets = descriptor.handoff_targets();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&AgentKind::ComplianceChecker));
        assert!(targets.contains(&AgentKind::ReadabilityChecker));
        assert!(!targets.contains(&AgentKind::PrivacyPolicyGenerator));
    }

    #[tokio::test]
    async fn memories_load_in_request_order() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);
        store.append("laws", MemoryRecord::text("note", "PIPL article 13")).await.unwrap();
        store.append("style", MemoryRecord::text("note", "short sentences")).await.unwrap();

        let descriptor = ReadabilityCheckerBuilder::new(
            Vec::new(),
            vec!["style".to_string(), "laws".to_string()],
        )
        .build(&store)
        .await
        .unwrap();

        let memories = descriptor.memories();
        assert_eq!(memories.len(), 2);
        assert_eq!(memories[0].name, "style");
        assert_eq!(memories[0].records[0].fields["text"], "short sentences");
        assert_eq!(memories[1].name, "laws");
    }

    #[tokio::test]
    async fn absent_collection_loads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        let descriptor = PrivacyPolicyGeneratorBuilder::new(
            Vec::new(),
            vec!["never_written".to_string()],
        )
        .build(&store)
        .await
        .unwrap();

        assert_eq!(descriptor.memories().len(), 1);
        assert!(descriptor.memories()[0].records.is_empty());
    }

    #[tokio::test]
    async fn dispatch_builds_every_kind() {
        let tmp = TempDir::new().unwrap();
        let store = test_store(&tmp);

        for kind in AgentKind::ALL {
            let descriptor = build_agent(kind, &[], &[], &store).await.unwrap();
            assert_eq!(descriptor.kind(), kind);
        }
    }
}
