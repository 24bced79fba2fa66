use graymock_authz::{PermissionSet, Principal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const DEFAULT_SESSION_TIMEOUT_MS: u64 = 28_800_000;

fn default_session_timeout() -> u64 {
    DEFAULT_SESSION_TIMEOUT_MS
}

/// A user account. Keyed by `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    /// Opaque credential material; compared verbatim by `resolve_caller`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub permissions: PermissionSet,
    /// Role names; resolved against the store on every authorization check.
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default = "default_session_timeout")]
    pub session_timeout_ms: u64,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub external: bool,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            full_name: String::new(),
            email: String::new(),
            password: None,
            permissions: PermissionSet::new(),
            roles: BTreeSet::new(),
            timezone: None,
            session_timeout_ms: DEFAULT_SESSION_TIMEOUT_MS,
            read_only: false,
            external: false,
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(permissions);
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

impl Principal for User {
    fn name(&self) -> &str {
        &self.username
    }

    fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}
