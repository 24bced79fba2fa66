use graymock_authz::PermissionSet;
use serde::{Deserialize, Serialize};

/// A named bundle of permissions. Keyed by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: PermissionSet,
    /// Built-in roles are read only and cannot be edited or removed.
    #[serde(default)]
    pub read_only: bool,
}

impl Role {
    pub fn new<I, S>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: String::new(),
            permissions: PermissionSet::from_iter(permissions),
            read_only: false,
        }
    }
}
