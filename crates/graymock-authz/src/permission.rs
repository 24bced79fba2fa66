//! Permission set primitive.
//!
//! # Purpose
//! Holds the permission strings granted to a user or role and answers
//! containment queries.
//!
//! # Key invariants
//! - Entries are de-duplicated and kept in lexical order, so serialized sets
//!   are stable across save/load cycles.
//! - `"*"` grants everything; no other prefix or glob matching is performed.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The universal permission.
pub const WILDCARD: &str = "*";

/// A de-duplicated set of permission strings such as `streams:read` or
/// `streams:read:5b3f...`.
///
/// Serialized as a JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    entries: BTreeSet<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding only the universal permission.
    pub fn all() -> Self {
        Self::from_iter([WILDCARD])
    }

    pub fn insert(&mut self, permission: impl Into<String>) -> bool {
        self.entries.insert(permission.into())
    }

    pub fn remove(&mut self, permission: &str) -> bool {
        self.entries.remove(permission)
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.entries.contains(permission)
    }

    /// Returns true if the set holds `"*"` or any candidate verbatim.
    pub fn has_any(&self, candidates: &[&str]) -> bool {
        if self.entries.contains(WILDCARD) {
            return true;
        }
        candidates
            .iter()
            .any(|candidate| self.entries.contains(*candidate))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for PermissionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.entries.extend(iter.into_iter().map(Into::into));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_deduplicates() {
        let perms = PermissionSet::from_iter(["b", "a", "b", "a"]);
        assert_eq!(perms.len(), 2);
        assert_eq!(perms.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn has_any_is_exact_match() {
        let perms = PermissionSet::from_iter(["streams:read"]);
        assert!(perms.has_any(&["streams:read"]));
        assert!(!perms.has_any(&["streams:read:abc"]));
        assert!(!perms.has_any(&["streams"]));
        assert!(!perms.has_any(&[]));
    }

    #[test]
    fn wildcard_grants_everything() {
        let perms = PermissionSet::all();
        assert!(perms.has_any(&["users:edit"]));
        assert!(perms.has_any(&[]));
    }

    #[test]
    fn insert_and_remove() {
        let mut perms = PermissionSet::new();
        assert!(perms.insert("inputs:read"));
        assert!(!perms.insert("inputs:read"));
        assert!(perms.remove("inputs:read"));
        assert!(perms.is_empty());
    }

    #[test]
    fn serializes_as_sorted_array() {
        let perms = PermissionSet::from_iter(["streams:read", "*"]);
        let json = serde_json::to_string(&perms).expect("serialize");
        assert_eq!(json, r#"["*","streams:read"]"#);
        let back: PermissionSet = serde_json::from_str(r#"["x","x"]"#).expect("deserialize");
        assert_eq!(back.len(), 1);
    }
}
