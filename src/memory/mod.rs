//! File-backed list memory.
//!
//! Each named collection is one JSON array on disk (`<dir>/<name>.json`):
//! UTF-8, pretty-printed, created empty on first use. Records are free-form
//! JSON objects carrying at least a `type` tag.

pub mod list_store;

pub use list_store::ListMemoryStore;

use crate::agents::AgentError;
use crate::config::Config;
use crate::MemoryCommands;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry in a named memory collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Record tag, e.g. `"note"` or `"policy_fragment"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Remaining free-form fields, preserved verbatim.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl MemoryRecord {
    /// Tagged record with a single `text` field.
    pub fn text(kind: &str, text: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("text".to_string(), Value::String(text.to_string()));
        Self { kind: kind.to_string(), fields }
    }

    /// Case-insensitive containment test over the record's JSON form.
    pub fn matches(&self, query: &str) -> bool {
        let haystack = serde_json::to_string(self).unwrap_or_default();
        haystack.to_lowercase().contains(&query.to_lowercase())
    }
}

/// A named collection as loaded into an agent descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryCollection {
    pub name: String,
    pub records: Vec<MemoryRecord>,
}

// ── CLI handler ──────────────────────────────────────────────────────

/// Handle `policygen memory <subcommand>` CLI commands.
pub async fn handle_memory_command(command: MemoryCommands, config: &Config) -> Result<()> {
    let store = ListMemoryStore::new(config.memory.resolved_dir());
    match command {
        MemoryCommands::List => {
            let names = store.collection_names().await?;
            if names.is_empty() {
                println!("No memory collections in {}", store.root().display());
                return Ok(());
            }
            println!("Memory collections ({} total):\n", names.len());
            for name in names {
                let count = store.load(&name).await.len();
                println!("  {name} ({count} records)");
            }
        }
        MemoryCommands::Show { name } => {
            let records = store.load(&name).await;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        MemoryCommands::Add { name, text, kind } => {
            store
                .append(&name, MemoryRecord::text(&kind, &text))
                .await
                .map_err(AgentError::MemoryIo)?;
            println!("✓ Added 1 record to {name}");
        }
        MemoryCommands::Search { name, query } => {
            let matches = store.search(&name, &query).await;
            if matches.is_empty() {
                println!("No records in {name} match '{query}'.");
                return Ok(());
            }
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        MemoryCommands::Clear { name, yes } => {
            if !yes {
                eprintln!("Use --yes to confirm clearing collection '{name}'.");
                return Ok(());
            }
            store.clear(&name).await.map_err(AgentError::MemoryIo)?;
            println!("✓ Cleared {name}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_record_carries_tag_and_text() {
        let record = MemoryRecord::text("note", "retention is 30 days");
        assert_eq!(record.kind, "note");
        assert_eq!(record.fields["text"], "retention is 30 days");
    }

    #[test]
    fn record_round_trips_with_extra_fields() {
        let json = r#"{"type":"clause","text":"data sharing","severity":"high","weight":3}"#;
        let record: MemoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, "clause");
        assert_eq!(record.fields["severity"], "high");
        assert_eq!(record.fields["weight"], 3);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["type"], "clause");
        assert_eq!(back["weight"], 3);
    }

    #[test]
    fn matches_is_case_insensitive() {
        let record = MemoryRecord::text("note", "GDPR Article 17 covers erasure");
        assert!(record.matches("gdpr article"));
        assert!(record.matches("ERASURE"));
        assert!(!record.matches("ccpa"));
    }

    #[test]
    fn matches_sees_the_type_tag() {
        let record = MemoryRecord::text("policy_fragment", "short text");
        assert!(record.matches("policy_fragment"));
    }

    #[tokio::test]
    async fn add_surfaces_write_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("memory");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut config = Config::default();
        config.memory.dir = blocker.to_string_lossy().into_owned();

        let command = MemoryCommands::Add {
            name: "notes".to_string(),
            text: "retention is 30 days".to_string(),
            kind: "note".to_string(),
        };
        let error = handle_memory_command(command, &config).await.unwrap_err();
        assert!(error.to_string().contains("memory store failed"), "got: {error}");
    }
}
