//! Typed collections and the per-kind entity contract.
//!
//! # Purpose
//! [`Collections`] is the complete in-memory state of the store and, as is,
//! the snapshot document written to disk. [`Entity`] ties each model type to
//! its collection and carries the per-kind lifecycle hooks (reference checks,
//! cascades) that the generic CRUD paths call.
//!
//! # Key invariants
//! - Collections preserve insertion order; lookups are linear scans, which is
//!   fine for test fixtures.
//! - Hooks never fail after a write has been applied: all checks live in
//!   [`Entity::prepare`] and [`Entity::check_delete`].
use super::StoreResult;
use crate::model::{
    Alert, AlertCondition, Dashboard, IndexSet, Input, Role, Stream, StreamRule, User,
};
use graymock_authz::{PermissionSet, RoleDirectory};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Insertion-ordered entities of one kind, unique by [`Entity::key`].
///
/// Decoding rejects empty and duplicate keys so a snapshot can never hold two
/// entities under one key.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<'de, T> Deserialize<'de> for Collection<T>
where
    T: Entity + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.key().is_empty() {
                return Err(D::Error::custom(format!(
                    "{} with empty {}",
                    T::KIND,
                    T::KEY_FIELD
                )));
            }
            if !seen.insert(item.key()) {
                return Err(D::Error::custom(format!(
                    "duplicate {} {} <{}>",
                    T::KIND,
                    T::KEY_FIELD,
                    item.key()
                )));
            }
        }
        Ok(Self { items })
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Collection<T> {
    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.key() == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Replace the entity with the same key, keeping its position.
    pub(crate) fn replace(&mut self, item: T) -> Option<T> {
        let slot = self.get_mut(item.key())?;
        Some(std::mem::replace(slot, item))
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.key() == key)?;
        Some(self.items.remove(index))
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }
}

/// Complete store state; serialized verbatim as the snapshot document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Collections {
    pub(crate) users: Collection<User>,
    pub(crate) roles: Collection<Role>,
    pub(crate) streams: Collection<Stream>,
    pub(crate) stream_rules: Collection<StreamRule>,
    pub(crate) index_sets: Collection<IndexSet>,
    pub(crate) inputs: Collection<Input>,
    pub(crate) dashboards: Collection<Dashboard>,
    pub(crate) alerts: Collection<Alert>,
    pub(crate) alert_conditions: Collection<AlertCondition>,
    pub(crate) default_index_set_id: String,
    /// Access token -> username.
    pub(crate) tokens: BTreeMap<String, String>,
}

impl Collections {
    /// Re-derive every index set's `default` flag from the default pointer.
    ///
    /// A pointer that names no stored index set is dropped in favour of the
    /// first set flagged default, if any.
    pub(crate) fn normalize_default_index_set(&mut self) {
        if !self.index_sets.contains(&self.default_index_set_id) {
            self.default_index_set_id = self
                .index_sets
                .iter()
                .find(|set| set.default)
                .map(|set| set.id.clone())
                .unwrap_or_default();
        }
        let default_id = self.default_index_set_id.clone();
        for set in self.index_sets.iter_mut() {
            set.default = set.id == default_id;
        }
    }
}

impl RoleDirectory for Collections {
    fn role_permissions(&self, name: &str) -> Option<&PermissionSet> {
        self.roles.get(name).map(|role| &role.permissions)
    }
}

/// A storable entity kind.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Kind label used in errors, logs and metrics.
    const KIND: &'static str;
    /// Name of the key field, for error messages.
    const KEY_FIELD: &'static str;
    /// Whether the store assigns a key when the caller leaves it empty.
    const GENERATED_KEY: bool;

    fn key(&self) -> &str;
    fn set_key(&mut self, key: String);

    fn collection(collections: &Collections) -> &Collection<Self>;
    fn collection_mut(collections: &mut Collections) -> &mut Collection<Self>;

    /// Validate and normalize before an insert (`existing == None`) or a
    /// replace. Must not depend on any state it mutates.
    fn prepare(&mut self, _existing: Option<&Self>, _collections: &Collections) -> StoreResult<()> {
        Ok(())
    }

    /// Propagate a successful insert/replace to related entities.
    fn after_write(&self, _collections: &mut Collections) {}

    /// Refuse a delete that would leave dangling references.
    fn check_delete(&self, _collections: &Collections) -> StoreResult<()> {
        Ok(())
    }

    /// Cascade a successful delete.
    fn after_delete(&self, _collections: &mut Collections) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_set(id: &str, default: bool) -> IndexSet {
        IndexSet {
            id: id.to_string(),
            default,
            ..IndexSet::new(id, id)
        }
    }

    #[test]
    fn replace_keeps_position() {
        let mut roles = Collection::default();
        roles.push(Role::new("a", ["x"]));
        roles.push(Role::new("b", ["y"]));
        let previous = roles.replace(Role::new("a", ["z"])).expect("replaced");
        assert!(previous.permissions.contains("x"));
        let names: Vec<_> = roles.iter().map(|role| role.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(roles.replace(Role::new("c", ["z"])).is_none());
    }

    #[test]
    fn normalize_adopts_flagged_set_when_pointer_dangles() {
        let mut collections = Collections::default();
        collections.index_sets.push(index_set("one", false));
        collections.index_sets.push(index_set("two", true));
        collections.index_sets.push(index_set("three", true));
        collections.default_index_set_id = "missing".to_string();

        collections.normalize_default_index_set();

        assert_eq!(collections.default_index_set_id, "two");
        let flagged: Vec<_> = collections
            .index_sets
            .iter()
            .filter(|set| set.default)
            .map(|set| set.id.as_str())
            .collect();
        assert_eq!(flagged, vec!["two"]);
    }

    #[test]
    fn empty_snapshot_document_decodes() {
        let collections: Collections = serde_json::from_str("{}").expect("decode");
        assert!(collections.users.is_empty());
        assert!(collections.tokens.is_empty());
        assert!(collections.default_index_set_id.is_empty());
    }

    #[test]
    fn duplicate_or_empty_keys_are_rejected() {
        let err = serde_json::from_str::<Collections>(
            r#"{"roles":[{"name":"Ops","permissions":["a"]},{"name":"Ops","permissions":["*"]}]}"#,
        )
        .expect_err("duplicate role");
        assert!(err.to_string().contains("duplicate role name <Ops>"));

        let err = serde_json::from_str::<Collections>(r#"{"users":[{"username":""}]}"#)
            .expect_err("empty username");
        assert!(err.to_string().contains("user with empty username"));
    }
}
