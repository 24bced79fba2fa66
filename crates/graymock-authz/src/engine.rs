//! Role-based authorization check.
//!
//! # Purpose
//! Decides whether a principal may act within a permission scope by checking
//! its direct permissions and then the permissions of each role it holds.
//!
//! # Key invariants
//! - Pure: never mutates the directory or the principal.
//! - Short-circuits on the first grant; role iteration order does not change
//!   the outcome.
//! - Allow and deny are both `Ok`; `Err` is reserved for dangling role
//!   references.
use crate::{AuthzError, AuthzResult, PermissionSet, WILDCARD};

/// Something that holds direct permissions and role memberships.
pub trait Principal {
    fn name(&self) -> &str;
    fn permissions(&self) -> &PermissionSet;
    fn role_names(&self) -> impl Iterator<Item = &str>;
}

/// Role lookup by name.
pub trait RoleDirectory {
    /// Permissions granted by the named role, or `None` if no such role exists.
    fn role_permissions(&self, name: &str) -> Option<&PermissionSet>;
}

/// Join a scope and its resource arguments with `:`.
///
/// `scoped_permission("streams:read", &["abc"])` is `streams:read:abc`; with no
/// arguments the scope is returned unchanged.
pub fn scoped_permission(scope: &str, args: &[&str]) -> String {
    if args.is_empty() {
        return scope.to_string();
    }
    format!("{scope}:{}", args.join(":"))
}

/// Authorize `principal` for `scope` (optionally narrowed by `args`).
///
/// `None` is the server-internal caller and is always allowed.
///
/// # Errors
/// - [`AuthzError::MissingRole`] if the principal references a role the
///   directory does not know. Callers should treat this as a store defect.
pub fn authorize<P, D>(
    directory: &D,
    principal: Option<&P>,
    scope: &str,
    args: &[&str],
) -> AuthzResult<bool>
where
    P: Principal,
    D: RoleDirectory + ?Sized,
{
    let Some(principal) = principal else {
        return Ok(true);
    };
    let scoped = scoped_permission(scope, args);
    let candidates = [WILDCARD, scope, scoped.as_str()];

    if principal.permissions().has_any(&candidates) {
        tracing::trace!(principal = principal.name(), scope = %scoped, "granted directly");
        return Ok(true);
    }

    for role in principal.role_names() {
        let permissions = directory
            .role_permissions(role)
            .ok_or_else(|| AuthzError::MissingRole(role.to_string()))?;
        if permissions.has_any(&candidates) {
            tracing::trace!(principal = principal.name(), role, scope = %scoped, "granted by role");
            return Ok(true);
        }
    }
    Ok(false)
}
