//! JSON-array file store, one file per named collection.

use super::MemoryRecord;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// File-backed list memory rooted at one directory.
///
/// Reads never fail the caller: a missing collection is created empty and an
/// unreadable one is logged and treated as empty. Writes rewrite the whole
/// array through a same-directory temp file and rename, serialized per
/// collection name so concurrent appends cannot drop records.
pub struct ListMemoryStore {
    root: PathBuf,
    write_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ListMemoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Directory holding the collection files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load a collection in stored order, creating it empty if absent.
    pub async fn load(&self, name: &str) -> Vec<MemoryRecord> {
        match self.read_or_init(name).await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!("Memory collection '{name}' unreadable, treating as empty: {error:#}");
                Vec::new()
            }
        }
    }

    /// Append one record to a collection, creating it if absent.
    pub async fn append(&self, name: &str, record: MemoryRecord) -> Result<()> {
        validate_collection_name(name)?;
        let lock = self.write_lock(name);
        let _guard = lock.lock().await;

        let mut records = match self.read_or_init(name).await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!("Memory collection '{name}' unreadable, rewriting from empty: {error:#}");
                Vec::new()
            }
        };
        records.push(record);
        self.write_records(name, &records).await
    }

    /// Reset a collection to the empty array.
    pub async fn clear(&self, name: &str) -> Result<()> {
        validate_collection_name(name)?;
        let lock = self.write_lock(name);
        let _guard = lock.lock().await;
        self.write_records(name, &[]).await
    }

    /// Records whose JSON form contains `query`, case-insensitively, in
    /// stored order.
    pub async fn search(&self, name: &str, query: &str) -> Vec<MemoryRecord> {
        self.load(name)
            .await
            .into_iter()
            .filter(|record| record.matches(query))
            .collect()
    }

    /// Names of the collections present on disk, sorted. Temp files from
    /// in-flight writes are skipped.
    pub async fn collection_names(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut entries = fs::read_dir(&self.root)
            .await
            .with_context(|| format!("Failed to read memory directory: {}", self.root.display()))?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            if let Some(name) = file_name.strip_suffix(".json") {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    fn write_lock(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.write_locks
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Read a collection, creating the empty file on first use.
    async fn read_or_init(&self, name: &str) -> Result<Vec<MemoryRecord>> {
        validate_collection_name(name)?;
        let path = self.collection_path(name);

        if !path.exists() {
            self.write_records(name, &[]).await?;
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read memory file: {}", path.display()))?;
        let records: Vec<MemoryRecord> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse memory file: {}", path.display()))?;
        Ok(records)
    }

    /// Replace a collection file atomically: write a temp file in the same
    /// directory, then rename over the target.
    async fn write_records(&self, name: &str, records: &[MemoryRecord]) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create memory directory: {}", self.root.display()))?;

        let path = self.collection_path(name);
        let json = serde_json::to_string_pretty(records)
            .context("Failed to serialize memory records")?;

        let temp_path = self
            .root
            .join(format!(".{name}.json.tmp-{}", uuid::Uuid::new_v4()));
        fs::write(&temp_path, json.as_bytes())
            .await
            .with_context(|| format!("Failed to write temp memory file: {}", temp_path.display()))?;

        if let Err(error) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            anyhow::bail!("Failed to replace memory file {}: {error}", path.display());
        }
        Ok(())
    }
}

/// Collection names become file names; reject anything that could escape the
/// memory directory.
fn validate_collection_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("Memory collection name cannot be empty");
    }
    if name.starts_with('.') || name.contains('/') || name.contains('\\') || name.contains("..") {
        anyhow::bail!("Invalid memory collection name: {name}");
    }
    Ok(())
}
