#![allow(dead_code)]

use mockserver::model::{IndexSet, Role, Stream, StreamRule, User};
use mockserver::store::{EntityStore, FilePersistence};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn snapshot_path(dir: &TempDir) -> PathBuf {
    dir.path().join("graymock.json")
}

pub fn file_store(path: &Path, autosave: bool) -> EntityStore {
    EntityStore::with_persistence(FilePersistence::new(path), autosave)
}

/// Store holding an `Admin` role with `*`, user `alice` in it, and a default
/// index set. Returns the default index set id.
pub fn seed_admin_fixture(store: &EntityStore) -> String {
    store.add(Role::new("Admin", ["*"])).expect("admin role");
    store
        .add(User::new("alice").with_roles(["Admin"]))
        .expect("alice");
    let mut index_set = IndexSet::new("Default", "graylog");
    index_set.default = true;
    store.add(index_set).expect("default index set")
}

/// Add a stream with `rules` rules; returns the stream id and the rule ids.
pub fn stream_with_rules(store: &EntityStore, title: &str, rules: usize) -> (String, Vec<String>) {
    let stream_id = store.add(Stream::new(title, "")).expect("stream");
    let rule_ids = (0..rules)
        .map(|n| {
            store
                .add(StreamRule::new(&stream_id, format!("field_{n}"), "value"))
                .expect("rule")
        })
        .collect();
    (stream_id, rule_ids)
}
