//! Integration tests: `KvGateway` over the file-backed store.

use fm_core::model::*;
use fm_store::{FileStore, GatewayConfig, KeyValueStore, KvGateway, PersistenceGateway};
use pretty_assertions::assert_eq;

fn checkbox_doc(name: &str) -> Document {
    let spec = FieldSpec::new(FieldContent::Checkbox(true), 0, 10.0, 20.0, 12.0, 12.0);
    Document::new(name).add_field(spec).0
}

#[test]
fn documents_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let doc = checkbox_doc("w9");
    {
        let mut gw = KvGateway::new(FileStore::new(dir.path()));
        gw.save_document(&doc).unwrap();
    }

    let mut gw = KvGateway::new(FileStore::new(dir.path()));
    assert_eq!(gw.get_document(&doc.id), Some(doc));
}

#[test]
fn history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let d0 = Document::new("w9");
    let d1 = checkbox_doc("w9");
    let history = History {
        past: [d0].into_iter().collect(),
        present: Some(d1),
        future: Default::default(),
    };
    KvGateway::new(FileStore::new(dir.path()))
        .save_history(&history)
        .unwrap();

    let mut gw = KvGateway::new(FileStore::new(dir.path()));
    assert_eq!(gw.load_history(), Some(history));

    gw.clear_history().unwrap();
    assert_eq!(gw.load_history(), None);
}

#[test]
fn corrupt_file_is_reset() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(dir.path());
    store.set("fieldmark.documents", "not json at all").unwrap();

    let mut gw = KvGateway::new(store);
    assert!(gw.list_documents().is_empty());
    assert!(!dir.path().join("fieldmark.documents.json").exists());
}

#[test]
fn custom_cap_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    let config = GatewayConfig {
        max_documents: 2,
        ..GatewayConfig::default()
    };
    let mut gw = KvGateway::with_config(FileStore::new(dir.path()), config);
    for name in ["a", "b", "c"] {
        let mut doc = Document::new(name);
        doc.touch();
        gw.save_document(&doc).unwrap();
    }
    assert_eq!(gw.list_documents().len(), 2);

    gw.clear_all_documents().unwrap();
    assert!(gw.list_documents().is_empty());
}
