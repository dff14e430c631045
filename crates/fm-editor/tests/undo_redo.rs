//! Integration tests: undo/redo history (fm-editor).
//!
//! Drives `HistoryManager` directly and through `EditorSession`, checking
//! that snapshots round-trip through the persistence gateway.

use fm_core::model::*;
use fm_core::{FieldId, Point};
use fm_editor::history::{HistoryManager, SaveOutcome};
use fm_editor::{EditorConfig, EditorSession};
use fm_store::{KvGateway, MemoryStore, PersistenceGateway};
use pretty_assertions::assert_eq;

type Session = EditorSession<KvGateway<MemoryStore>>;

fn gateway() -> KvGateway<MemoryStore> {
    KvGateway::new(MemoryStore::new())
}

fn session() -> Session {
    let mut s = EditorSession::new(EditorConfig::default(), gateway());
    s.new_document("lease", 2).unwrap();
    s.page_rendered(918.0, 1188.0);
    s
}

// ─── Manager ─────────────────────────────────────────────────────────────

#[test]
fn save_undo_redo_walkthrough() {
    let mut gw = gateway();
    let mut history = HistoryManager::default();
    let d0 = Document::new("a");
    let spec = FieldSpec::new(FieldContent::Text("Hi".into()), 0, 1.0, 1.0, 14.4, 14.4);
    let (d1, _) = d0.add_field(spec);

    assert_eq!(history.save(&d0, &mut gw), SaveOutcome::Initialized);
    assert_eq!(history.undo_count(), 0);

    assert_eq!(history.save(&d1, &mut gw), SaveOutcome::Recorded);
    assert_eq!(history.undo_count(), 1);
    assert_eq!(history.present(), Some(&d1));

    let undone = history.undo(&mut gw).unwrap();
    assert_eq!(undone, d0);
    assert_eq!((history.undo_count(), history.redo_count()), (0, 1));

    let redone = history.redo(&mut gw).unwrap();
    assert_eq!(redone, d1);
    assert_eq!((history.undo_count(), history.redo_count()), (1, 0));
}

#[test]
fn empty_stacks_are_unavailable() {
    let mut gw = gateway();
    let mut history = HistoryManager::default();
    assert_eq!(history.undo(&mut gw), None);
    assert_eq!(history.redo(&mut gw), None);
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn fifty_one_edits_keep_fifty() {
    let mut gw = gateway();
    let mut history = HistoryManager::default();
    let mut doc = Document::new("a");
    history.save(&doc, &mut gw);
    for i in 0..51 {
        let spec = FieldSpec::new(FieldContent::Checkbox(true), 0, f64::from(i), 0.0, 12.0, 12.0);
        doc = doc.add_field(spec).0;
        history.save(&doc, &mut gw);
    }
    assert_eq!(history.undo_count(), MAX_HISTORY);
    assert_eq!(gw.load_history().unwrap().past.len(), MAX_HISTORY);
}

// ─── Session ─────────────────────────────────────────────────────────────

#[test]
fn session_undo_restores_previous_document() {
    let mut s = session();
    let id = s.add_checkbox(true, Point::new(10.0, 10.0), 0).unwrap();
    s.update_field(id, &FieldPatch::position(50.0, 60.0)).unwrap();

    assert!(s.undo());
    let field = s.document().unwrap().field(id).unwrap();
    assert_eq!((field.x, field.y), (10.0, 10.0));

    assert!(s.undo());
    assert!(s.document().unwrap().fields.is_empty());
    assert!(!s.undo());

    assert!(s.redo());
    assert!(s.redo());
    let field = s.document().unwrap().field(id).unwrap();
    assert_eq!((field.x, field.y), (50.0, 60.0));
    assert!(!s.can_redo());
}

#[test]
fn new_edit_after_undo_drops_redo() {
    let mut s = session();
    s.add_checkbox(true, Point::new(10.0, 10.0), 0).unwrap();
    s.undo();
    assert!(s.can_redo());

    s.add_text("Name", Point::new(20.0, 20.0), 0).unwrap();
    assert!(!s.can_redo());
}

#[test]
fn page_change_is_undoable() {
    let mut s = session();
    s.change_page(2).unwrap();
    assert!(s.undo());
    assert_eq!(s.document().unwrap().current_page, 1);
}

#[test]
fn rename_alone_does_not_record_history() {
    let mut s = session();
    s.rename("Lease (signed)").unwrap();
    assert!(!s.can_undo());
    assert_eq!(s.saved_documents()[0].name, "Lease (signed)");
}

#[test]
fn missing_field_update_is_silent() {
    let mut s = session();
    s.add_checkbox(true, Point::new(10.0, 10.0), 0).unwrap();
    let before = s.document().unwrap().clone();

    s.update_field(FieldId::intern("text_deleted"), &FieldPatch::position(0.0, 0.0))
        .unwrap();

    let after = s.document().unwrap();
    assert_eq!(after.fields.len(), before.fields.len());
    assert_eq!(after.fields, before.fields);
    assert_eq!(s.history().undo_count(), 1);
}

#[test]
fn history_survives_restart() {
    let mut s = session();
    let id = s.add_checkbox(true, Point::new(10.0, 10.0), 0).unwrap();
    let gw = s.into_gateway();

    let mut s = EditorSession::new(EditorConfig::default(), gw);
    let latest = s.restore().expect("saved document");
    assert_eq!(latest.name, "lease");
    s.open_document(latest);

    assert!(s.can_undo());
    assert!(s.undo());
    assert!(s.document().unwrap().field(id).is_none());
}

#[test]
fn loading_a_new_pdf_starts_fresh_history() {
    let mut s = session();
    s.add_checkbox(true, Point::new(10.0, 10.0), 0).unwrap();
    s.new_document("other", 1).unwrap();
    assert!(!s.can_undo());
    assert_eq!(s.saved_documents().len(), 2);
}
