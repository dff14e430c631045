//! Persistence gateway: document history and the saved-documents list.
//!
//! Stored state is a best-effort cache, never the source of truth for an
//! open session. Anything that fails to parse is logged, wiped, and reported
//! as absent; it never surfaces as an error.

use crate::error::StoreError;
use crate::kv::KeyValueStore;
use fm_core::{Document, DocumentId, History};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Default cap on the saved-documents list.
pub const MAX_SAVED_DOCUMENTS: usize = 10;

/// Storage keys and limits.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub history_key: String,
    pub documents_key: String,
    /// Keep at most this many saved documents (most recently updated win).
    pub max_documents: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            history_key: "fieldmark.history".to_string(),
            documents_key: "fieldmark.documents".to_string(),
            max_documents: MAX_SAVED_DOCUMENTS,
        }
    }
}

/// What the editor needs from durable storage.
pub trait PersistenceGateway {
    /// The persisted history, or `None` if absent or unreadable.
    fn load_history(&mut self) -> Option<History>;

    fn save_history(&mut self, history: &History) -> Result<(), StoreError>;

    fn clear_history(&mut self) -> Result<(), StoreError>;

    /// Every saved document, in no particular order.
    fn list_documents(&mut self) -> Vec<Document>;

    /// Insert or replace by ID, evicting the least recently updated
    /// documents past the cap.
    fn save_document(&mut self, doc: &Document) -> Result<(), StoreError>;

    /// Delete by ID. Unlike field updates, a missing ID is reported.
    fn delete_document(&mut self, id: &DocumentId) -> Result<(), StoreError>;

    fn clear_all_documents(&mut self) -> Result<(), StoreError>;

    fn get_document(&mut self, id: &DocumentId) -> Option<Document> {
        self.list_documents().into_iter().find(|d| &d.id == id)
    }

    /// Saved documents whose name, ID, or creation date (`YYYY-MM-DD`)
    /// contains `query`, case-insensitively. A blank query matches all.
    fn search_documents(&mut self, query: &str) -> Vec<Document> {
        let query = query.trim().to_lowercase();
        let docs = self.list_documents();
        if query.is_empty() {
            return docs;
        }
        docs.into_iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&query)
                    || d.id.as_str().to_lowercase().contains(&query)
                    || d.created_at.date_naive().to_string().contains(&query)
            })
            .collect()
    }

    /// The most recently updated saved document.
    fn most_recent_document(&mut self) -> Option<Document> {
        self.list_documents()
            .into_iter()
            .max_by_key(|d| d.updated_at)
    }
}

/// `PersistenceGateway` over any `KeyValueStore`, JSON-encoded.
#[derive(Debug)]
pub struct KvGateway<S> {
    store: S,
    config: GatewayConfig,
}

impl<S: KeyValueStore> KvGateway<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, GatewayConfig::default())
    }

    pub fn with_config(store: S, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Read and decode `key`. Unreadable or corrupt entries are reset.
    fn read_json<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("failed to read {key}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("discarding corrupt {key}: {e}");
                if let Err(e) = self.store.remove(key) {
                    log::warn!("failed to reset {key}: {e}");
                }
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)
    }

    fn write_documents(&mut self, docs: &[Document]) -> Result<(), StoreError> {
        let key = self.config.documents_key.clone();
        self.write_json(&key, docs)
    }
}

impl<S: KeyValueStore> PersistenceGateway for KvGateway<S> {
    fn load_history(&mut self) -> Option<History> {
        let key = self.config.history_key.clone();
        self.read_json(&key)
    }

    fn save_history(&mut self, history: &History) -> Result<(), StoreError> {
        let key = self.config.history_key.clone();
        self.write_json(&key, history)
    }

    fn clear_history(&mut self) -> Result<(), StoreError> {
        self.store.remove(&self.config.history_key)
    }

    fn list_documents(&mut self) -> Vec<Document> {
        let key = self.config.documents_key.clone();
        self.read_json(&key).unwrap_or_default()
    }

    fn save_document(&mut self, doc: &Document) -> Result<(), StoreError> {
        let mut docs = self.list_documents();
        match docs.iter_mut().find(|d| d.id == doc.id) {
            Some(existing) => *existing = doc.clone(),
            None => docs.push(doc.clone()),
        }

        if docs.len() > self.config.max_documents {
            docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            for evicted in &docs[self.config.max_documents..] {
                log::info!("evicting saved document {} ({})", evicted.id, evicted.name);
            }
            docs.truncate(self.config.max_documents);
        }

        self.write_documents(&docs)
    }

    fn delete_document(&mut self, id: &DocumentId) -> Result<(), StoreError> {
        let mut docs = self.list_documents();
        let before = docs.len();
        docs.retain(|d| &d.id != id);
        if docs.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.write_documents(&docs)
    }

    fn clear_all_documents(&mut self) -> Result<(), StoreError> {
        self.store.remove(&self.config.documents_key)
    }
}
