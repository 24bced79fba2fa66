use serde::{Deserialize, Serialize};

/// An index set. Rotation and retention settings are opaque to the mock.
///
/// The `default` flag is owned by the store: it always mirrors the store's
/// default-index-set pointer, so at most one stored index set carries it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSet {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub index_prefix: String,
    #[serde(default = "default_shards")]
    pub shards: u32,
    #[serde(default)]
    pub replicas: u32,
    #[serde(default)]
    pub rotation_strategy: serde_json::Value,
    #[serde(default)]
    pub retention_strategy: serde_json::Value,
    #[serde(default = "default_writable")]
    pub writable: bool,
    #[serde(default)]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
}

fn default_shards() -> u32 {
    4
}

fn default_writable() -> bool {
    true
}

impl IndexSet {
    pub fn new(title: impl Into<String>, index_prefix: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            description: String::new(),
            index_prefix: index_prefix.into(),
            shards: default_shards(),
            replicas: 0,
            rotation_strategy: serde_json::Value::Null,
            retention_strategy: serde_json::Value::Null,
            writable: true,
            default: false,
            creation_date: None,
        }
    }
}
