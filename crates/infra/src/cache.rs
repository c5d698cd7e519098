//! Config cache implementations
//!
//! Both caches store the JSON-serialized `FlowNode` under
//! `calendar_widget_{widgetId}`, last-write-wins per key. The in-memory
//! cache models session storage for embedded mounts; the file-backed cache
//! survives restarts so standalone runs can rehydrate on cold start.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use flowcal_core::ConfigCache;
use flowcal_domain::constants::cache_key;
use flowcal_domain::{FlowNode, Result, WidgetError};
use tracing::debug;

/// Process-local cache keyed by the derived widget key.
#[derive(Debug, Default)]
pub struct MemoryConfigCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ConfigCache for MemoryConfigCache {
    async fn load(&self, widget_id: i64) -> Result<Option<FlowNode>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&cache_key(widget_id)) {
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|error| WidgetError::Serialization(error.to_string())),
            None => Ok(None),
        }
    }

    async fn store(&self, widget_id: i64, node: &FlowNode) -> Result<()> {
        let raw = serde_json::to_string(node)
            .map_err(|error| WidgetError::Serialization(error.to_string()))?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(cache_key(widget_id), raw);
        Ok(())
    }

    async fn remove(&self, widget_id: i64) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&cache_key(widget_id));
        Ok(())
    }
}

/// Cache persisting each widget's node as a JSON file in one directory.
#[derive(Debug)]
pub struct FileConfigCache {
    dir: PathBuf,
}

impl FileConfigCache {
    /// Open (creating if needed) a cache directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|error| WidgetError::Persistence(error.to_string()))?;
        Ok(Self { dir })
    }

    fn entry_path(&self, widget_id: i64) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(widget_id)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ConfigCache for FileConfigCache {
    async fn load(&self, widget_id: i64) -> Result<Option<FlowNode>> {
        let path = self.entry_path(widget_id);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(WidgetError::Persistence(error.to_string())),
        };
        debug!(widget_id, path = %path.display(), "loaded cached widget config");
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|error| WidgetError::Serialization(error.to_string()))
    }

    async fn store(&self, widget_id: i64, node: &FlowNode) -> Result<()> {
        let raw = serde_json::to_string_pretty(node)
            .map_err(|error| WidgetError::Serialization(error.to_string()))?;
        std::fs::write(self.entry_path(widget_id), raw)
            .map_err(|error| WidgetError::Persistence(error.to_string()))
    }

    async fn remove(&self, widget_id: i64) -> Result<()> {
        match std::fs::remove_file(self.entry_path(widget_id)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(WidgetError::Persistence(error.to_string())),
        }
    }
}
