//! Undo/Redo history.
//!
//! Linear snapshot history: every recorded state is a full `Document`
//! value, so undo and redo are a swap of whole documents rather than an
//! inverse-mutation chain. The oldest snapshot is evicted once `past`
//! exceeds the configured depth.
//!
//! The manager never owns storage. Callers hand it a `PersistenceGateway`
//! on each mutating call, and every change to the history is written
//! through it. Write failures are logged and otherwise ignored: losing the
//! persisted copy must not lose the in-memory edit.

use fm_core::model::{Document, History, MAX_HISTORY};
use fm_store::PersistenceGateway;

/// What `save` did with the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// First snapshot; it became `present` and nothing was persisted.
    Initialized,
    /// Same fields and page as `present`; nothing recorded.
    Unchanged,
    /// Previous `present` moved to `past`, redo branch discarded.
    Recorded,
}

#[derive(Debug, Clone)]
pub struct HistoryManager {
    history: History,
    max_history: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl HistoryManager {
    pub fn new(max_history: usize) -> Self {
        Self {
            history: History::default(),
            max_history,
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Replace the in-memory history with the persisted one. Returns whether
    /// anything was loaded. An over-long `past` is trimmed oldest-first; a
    /// history with snapshots but no `present` is discarded.
    pub fn load<G: PersistenceGateway + ?Sized>(&mut self, gateway: &mut G) -> bool {
        let Some(mut history) = gateway.load_history() else {
            return false;
        };
        if history.present.is_none() && !history.is_empty() {
            log::warn!("persisted history has no present state; discarding");
            self.history = History::default();
            return false;
        }
        while history.past.len() > self.max_history {
            history.past.pop_front();
        }
        log::info!(
            "history restored ({} undo, {} redo)",
            history.past.len(),
            history.future.len()
        );
        self.history = history;
        true
    }

    /// Record `doc` as the new present state.
    pub fn save<G: PersistenceGateway + ?Sized>(
        &mut self,
        doc: &Document,
        gateway: &mut G,
    ) -> SaveOutcome {
        let Some(present) = self.history.present.take() else {
            self.history.present = Some(doc.clone());
            return SaveOutcome::Initialized;
        };

        if !doc.differs_from(&present) {
            self.history.present = Some(present);
            return SaveOutcome::Unchanged;
        }

        self.history.past.push_back(present);
        while self.history.past.len() > self.max_history {
            self.history.past.pop_front();
        }
        self.history.present = Some(doc.clone());
        self.history.future.clear();
        self.persist(gateway);
        SaveOutcome::Recorded
    }

    /// Step back one snapshot. Returns an independent copy of the restored
    /// state, or `None` when there is nothing to undo.
    pub fn undo<G: PersistenceGateway + ?Sized>(&mut self, gateway: &mut G) -> Option<Document> {
        let previous = self.history.past.pop_back()?;
        if let Some(present) = self.history.present.replace(previous.clone()) {
            self.history.future.push_front(present);
        }
        self.persist(gateway);
        Some(previous)
    }

    /// Step forward one snapshot.
    pub fn redo<G: PersistenceGateway + ?Sized>(&mut self, gateway: &mut G) -> Option<Document> {
        let next = self.history.future.pop_front()?;
        if let Some(present) = self.history.present.replace(next.clone()) {
            self.history.past.push_back(present);
        }
        self.persist(gateway);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.history.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.history.future.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.history.past.len()
    }

    pub fn redo_count(&self) -> usize {
        self.history.future.len()
    }

    pub fn present(&self) -> Option<&Document> {
        self.history.present.as_ref()
    }

    /// Deep copy of the whole history.
    pub fn snapshot(&self) -> History {
        self.history.clone()
    }

    /// Forget everything, in memory and in storage.
    pub fn clear<G: PersistenceGateway + ?Sized>(&mut self, gateway: &mut G) {
        self.history = History::default();
        if let Err(e) = gateway.clear_history() {
            log::warn!("failed to clear persisted history: {e}");
        }
    }

    fn persist<G: PersistenceGateway + ?Sized>(&self, gateway: &mut G) {
        if let Err(e) = gateway.save_history(&self.history) {
            log::warn!("failed to persist history: {e}");
        }
    }
}
