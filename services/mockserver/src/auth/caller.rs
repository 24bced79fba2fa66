use crate::model::User;
use crate::store::{EntityStore, StoreResult};

/// Basic-auth credentials after transport decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

impl Credentials {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }

    /// Split decoded `name:password` user info at the first colon.
    pub fn parse(user_info: &str) -> Option<Self> {
        let (name, password) = user_info.split_once(':')?;
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, password))
    }
}

/// Outcome of gating a request on a scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    Granted(User),
    /// Missing or unknown credentials.
    Unauthenticated,
    Forbidden,
}

impl Access {
    pub fn status_code(&self) -> u16 {
        match self {
            Access::Granted(_) => 200,
            Access::Unauthenticated => 401,
            Access::Forbidden => 403,
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }
}

/// Resolve `credentials` and check the caller holds `scope` for `args`.
pub fn check_access(
    store: &EntityStore,
    credentials: Option<&Credentials>,
    scope: &str,
    args: &[&str],
) -> StoreResult<Access> {
    let Some(credentials) = credentials else {
        return Ok(Access::Unauthenticated);
    };
    let Some(user) = store.resolve_caller(&credentials.name, &credentials.password)? else {
        tracing::debug!(name = %credentials.name, "unknown credentials");
        return Ok(Access::Unauthenticated);
    };
    if store.authorize(Some(&user), scope, args)? {
        Ok(Access::Granted(user))
    } else {
        Ok(Access::Forbidden)
    }
}
