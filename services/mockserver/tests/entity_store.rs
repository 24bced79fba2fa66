mod common;

use mockserver::model::{
    AlertCondition, IndexSet, Input, InputAttributes, Stream, StreamRule,
};
use mockserver::model::input::UntypedAttributes;
use mockserver::store::{EntityStore, StoreError};
use serde_json::json;
use std::sync::Arc;

#[test]
fn second_index_set_marked_default_is_the_only_default() {
    let store = EntityStore::new();
    store
        .add(IndexSet::new("first", "first"))
        .expect("first index set");
    let second = store
        .add(IndexSet::new("second", "second"))
        .expect("second index set");

    let mut promoted = store.get::<IndexSet>(&second).expect("get").expect("found");
    promoted.default = true;
    store.update(promoted).expect("promote");

    let defaults: Vec<_> = store
        .get_all::<IndexSet>()
        .expect("all")
        .into_iter()
        .filter(|set| set.default)
        .collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, second);
}

#[test]
fn deleting_stream_cascades_rules_and_conditions() {
    let store = EntityStore::new();
    common::seed_admin_fixture(&store);
    let (stream_id, rule_ids) = common::stream_with_rules(&store, "errors", 3);
    let (other_id, other_rules) = common::stream_with_rules(&store, "warnings", 1);
    let condition_id = store
        .add(AlertCondition {
            title: "too many errors".to_string(),
            condition_type: "message_count".to_string(),
            stream_id: stream_id.clone(),
            ..AlertCondition::default()
        })
        .expect("condition");

    store.delete::<Stream>(&stream_id).expect("delete stream");

    for rule_id in &rule_ids {
        assert_eq!(store.get::<StreamRule>(rule_id).expect("get"), None);
    }
    assert_eq!(store.get::<AlertCondition>(&condition_id).expect("get"), None);
    assert_eq!(
        store.stream_rules(&other_id).expect("rules")[0].id,
        other_rules[0]
    );
    assert!(matches!(
        store.stream_rules(&stream_id),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn input_with_unknown_type_is_stored_untyped() {
    let store = EntityStore::new();
    let raw = json!({
        "title": "custom",
        "type": "com.example.CustomInput",
        "global": false,
        "magic": {"nested": [1, 2, 3]},
    });
    let input: Input = serde_json::from_value(raw.clone()).expect("decode");
    let id = store.add(input).expect("add");

    let stored = store.get::<Input>(&id).expect("get").expect("found");
    assert_eq!(stored.input_type(), "com.example.CustomInput");
    let encoded = serde_json::to_value(&stored).expect("encode");
    assert_eq!(encoded["magic"], raw["magic"]);
    assert_eq!(encoded["id"], json!(id));
}

#[test]
fn untyped_bag_claiming_registered_type_is_validated() {
    let store = EntityStore::new();
    let bag = UntypedAttributes {
        input_type: "org.graylog2.inputs.syslog.udp.SyslogUDPInput".to_string(),
        fields: serde_json::Map::from_iter([("unexpected".to_string(), json!(true))]),
    };
    let input = Input::new("syslog", InputAttributes::Untyped(bag));
    let err = store.add(input).expect_err("strict shape");
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn input_without_attributes_is_rejected() {
    let store = EntityStore::new();
    let input = Input {
        title: "bare".to_string(),
        ..Input::default()
    };
    assert!(matches!(store.add(input), Err(StoreError::Validation(_))));
}

#[test]
fn concurrent_writers_are_linearizable() {
    let store = Arc::new(EntityStore::new());
    common::seed_admin_fixture(&store);
    let (stream_id, _) = common::stream_with_rules(&store, "busy", 0);

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let store = Arc::clone(&store);
            let stream_id = stream_id.clone();
            scope.spawn(move || {
                for n in 0..25 {
                    store
                        .add(StreamRule::new(&stream_id, format!("w{worker}_{n}"), "v"))
                        .expect("rule");
                    let _ = store.get_all::<StreamRule>().expect("read");
                }
            });
        }
    });

    let stream = store.get::<Stream>(&stream_id).expect("get").expect("found");
    assert_eq!(stream.rule_ids.len(), 200);
    assert_eq!(store.get_all::<StreamRule>().expect("all").len(), 200);
    assert_eq!(store.stream_rules(&stream_id).expect("rules").len(), 200);
}
