mod common;

use mockserver::config::MockServerConfig;
use mockserver::model::{Dashboard, IndexSet, Input, Role, Stream, StreamRule, User};
use mockserver::store::{EntityStore, StoreError};
use serde_json::{Value, json};
use std::fs;

fn read_json(path: &std::path::Path) -> Value {
    let bytes = fs::read(path).expect("read snapshot");
    serde_json::from_slice(&bytes).expect("json")
}

#[test]
fn save_then_load_restores_every_collection() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = common::snapshot_path(&dir);

    let store = common::file_store(&path, false);
    let default_id = common::seed_admin_fixture(&store);
    let (stream_id, rule_ids) = common::stream_with_rules(&store, "errors", 2);
    let input: Input = serde_json::from_value(json!({
        "title": "gelf",
        "type": "org.graylog2.inputs.gelf.udp.GELFUDPInput",
        "bind_address": "0.0.0.0",
        "port": 12201,
    }))
    .expect("input");
    let input_id = store.add(input).expect("add input");
    store
        .add(Dashboard {
            title: "ops".to_string(),
            ..Dashboard::default()
        })
        .expect("dashboard");
    store.add_token("tok", "alice").expect("token");
    store.save().expect("save");

    let restored = common::file_store(&path, false);
    restored.load().expect("load");

    assert_eq!(
        restored.get::<User>("alice").expect("get"),
        store.get::<User>("alice").expect("get")
    );
    assert_eq!(
        restored.stream_rules(&stream_id).expect("rules").len(),
        rule_ids.len()
    );
    assert_eq!(
        restored.get::<Input>(&input_id).expect("get"),
        store.get::<Input>(&input_id).expect("get")
    );
    assert_eq!(
        restored.default_index_set().expect("default").map(|set| set.id),
        Some(default_id)
    );
    assert_eq!(restored.tokens_for_user("alice").expect("tokens"), vec!["tok"]);
    assert_eq!(restored.summary().counts, store.summary().counts);
}

#[test]
fn load_then_save_reproduces_snapshot_content() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = common::snapshot_path(&dir);
    let store = common::file_store(&path, true);
    common::seed_admin_fixture(&store);
    common::stream_with_rules(&store, "errors", 1);
    let before = read_json(&path);

    let reopened = common::file_store(&path, false);
    reopened.load().expect("load");
    reopened.save().expect("save");
    assert_eq!(read_json(&path), before);
}

#[test]
fn load_without_snapshot_is_a_noop() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = common::file_store(&common::snapshot_path(&dir), false);
    store.add(Role::new("Kept", ["x"])).expect("role");
    store.load().expect("load");
    assert!(store.has::<Role>("Kept").expect("has"));
}

#[test]
fn malformed_snapshot_leaves_state_untouched() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = common::snapshot_path(&dir);
    fs::write(&path, b"{ not json").expect("write");
    let store = common::file_store(&path, false);
    store.add(Role::new("Kept", ["x"])).expect("role");

    let err = store.load().expect_err("malformed");
    assert!(matches!(err, StoreError::Decode(_)));
    assert!(store.has::<Role>("Kept").expect("has"));
}

#[test]
fn snapshot_with_duplicate_keys_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = common::snapshot_path(&dir);
    fs::write(
        &path,
        serde_json::to_vec(&json!({
            "roles": [
                {"name": "Ops", "permissions": ["a"]},
                {"name": "Ops", "permissions": ["*"]},
            ],
            "users": [{"username": "bob", "roles": ["Ops"]}],
        }))
        .expect("encode"),
    )
    .expect("write");
    let store = common::file_store(&path, false);
    store.add(Role::new("Kept", ["x"])).expect("role");

    let err = store.load().expect_err("duplicate role");
    assert!(matches!(err, StoreError::Decode(_)));
    assert!(store.has::<Role>("Kept").expect("has"));
    assert!(!store.has::<Role>("Ops").expect("has"));
    assert_eq!(store.get::<User>("bob").expect("get"), None);
}

#[test]
fn snapshot_with_dangling_role_surfaces_consistency_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = common::snapshot_path(&dir);
    fs::write(
        &path,
        serde_json::to_vec(&json!({
            "users": [{"username": "ghost", "roles": ["Vanished"]}],
        }))
        .expect("encode"),
    )
    .expect("write");

    let store = common::file_store(&path, false);
    store.load().expect("load");
    let ghost = store.get::<User>("ghost").expect("get").expect("ghost");
    let err = store
        .authorize(Some(&ghost), "streams:read", &[])
        .expect_err("dangling role");
    assert!(matches!(err, StoreError::Consistency(_)));
}

#[test]
fn failed_autosave_keeps_the_mutation() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("missing-dir").join("graymock.json");
    let store = common::file_store(&path, true);

    let err = store.add(Role::new("Ops", ["x"])).expect_err("io error");
    assert!(matches!(err, StoreError::Io(_)));
    assert_eq!(err.status_code(), 500);
    assert!(store.has::<Role>("Ops").expect("has"));
    assert!(!path.exists());
}

#[test]
fn failed_save_leaves_previous_snapshot() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = common::snapshot_path(&dir);
    let store = common::file_store(&path, false);
    store.add(Role::new("First", ["x"])).expect("role");
    store.save().expect("save");
    let before = read_json(&path);

    // A directory squatting on the temp path makes the next write fail.
    fs::create_dir(path.with_extension("json.tmp")).expect("block temp path");
    store.add(Role::new("Second", ["y"])).expect("role");
    assert!(matches!(store.save(), Err(StoreError::Io(_))));
    assert_eq!(read_json(&path), before);
    assert!(store.has::<Role>("Second").expect("has"));
}

#[test]
fn open_seeds_and_persists_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = MockServerConfig {
        data_path: Some(common::snapshot_path(&dir)),
        admin_password: "pw".to_string(),
        ..MockServerConfig::default()
    };

    let store = EntityStore::open(&config).expect("open");
    assert!(store.is_durable());
    assert!(store.resolve_caller("admin", "pw").expect("resolve").is_some());
    let stream_id = store.add(Stream::new("errors", "")).expect("stream");
    store
        .add(StreamRule::new(&stream_id, "level", "3"))
        .expect("rule");

    let reopened = EntityStore::open(&config).expect("reopen");
    assert_eq!(reopened.get_all::<IndexSet>().expect("all").len(), 1);
    assert_eq!(reopened.stream_rules(&stream_id).expect("rules").len(), 1);
}
