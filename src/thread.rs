use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use crate::types::ChatTurn;

/// A conversation, identified by its thread id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationThread {
    pub thread_id:  String,
    pub turns:      Vec<ChatTurn>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationThread {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self { thread_id: thread_id.into(), turns: Vec::new(), updated_at: Utc::now() }
    }
}

#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Turns recorded so far; empty for an unknown thread.
    async fn load(&self, thread_id: &str) -> Result<Vec<ChatTurn>, String>;

    /// Appends turns to the thread, creating it if needed.
    async fn append(&self, thread_id: &str, turns: &[ChatTurn]) -> Result<(), String>;
}

/// Keeps threads for the lifetime of the process.
#[derive(Default)]
pub struct MemoryThreadStore {
    threads: Mutex<HashMap<String, ConversationThread>>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn load(&self, thread_id: &str) -> Result<Vec<ChatTurn>, String> {
        let store = self.threads.lock().map_err(|e| e.to_string())?;
        Ok(store.get(thread_id).map(|t| t.turns.clone()).unwrap_or_default())
    }

    async fn append(&self, thread_id: &str, turns: &[ChatTurn]) -> Result<(), String> {
        let mut store = self.threads.lock().map_err(|e| e.to_string())?;
        let thread = store.entry(thread_id.to_string())
            .or_insert_with(|| ConversationThread::new(thread_id));
        thread.turns.extend_from_slice(turns);
        thread.updated_at = Utc::now();
        Ok(())
    }
}

/// One pretty-printed JSON file per thread in a directory.
pub struct FileThreadStore {
    base_path: PathBuf,
}

impl FileThreadStore {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, String> {
        let base_path = path.into();
        std::fs::create_dir_all(&base_path)
            .map_err(|e| format!("{}: {}", base_path.display(), e))?;
        Ok(Self { base_path })
    }

    fn thread_path(&self, thread_id: &str) -> PathBuf {
        // Thread ids become file names; keep them to a safe alphabet.
        let safe: String = thread_id.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe))
    }

    fn read(&self, thread_id: &str) -> Result<Option<ConversationThread>, String> {
        let path = self.thread_path(thread_id);
        if !path.exists() { return Ok(None); }
        let data = std::fs::read_to_string(&path).map_err(|e| e.to_string())?;
        serde_json::from_str(&data).map(Some).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ThreadStore for FileThreadStore {
    async fn load(&self, thread_id: &str) -> Result<Vec<ChatTurn>, String> {
        Ok(self.read(thread_id)?.map(|t| t.turns).unwrap_or_default())
    }

    async fn append(&self, thread_id: &str, turns: &[ChatTurn]) -> Result<(), String> {
        let mut thread = self.read(thread_id)?
            .unwrap_or_else(|| ConversationThread::new(thread_id));
        thread.turns.extend_from_slice(turns);
        thread.updated_at = Utc::now();
        let data = serde_json::to_string_pretty(&thread).map_err(|e| e.to_string())?;
        std::fs::write(self.thread_path(thread_id), data).map_err(|e| e.to_string())
    }
}
