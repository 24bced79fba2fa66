//! Graymock authorization primitives shared by the mock server and its tests.
//!
//! # Purpose
//! Centralizes the permission model: permission sets with universal-wildcard
//! containment and the role-resolving authorization check.
//!
//! # How it fits
//! The mock server's entity store implements [`RoleDirectory`] over its role
//! collection and its `User` model implements [`Principal`]; request handlers
//! call the store, which delegates the decision to [`authorize`].
//!
//! # Key invariants
//! - Permission strings are matched verbatim; only `"*"` is a wildcard.
//! - A missing principal means a server-internal caller and is always allowed.
//! - A role referenced by a principal but absent from the directory is an error,
//!   never a silent denial.
//!
//! # Examples
//! ```rust
//! use graymock_authz::PermissionSet;
//!
//! let perms = PermissionSet::from_iter(["streams:read", "streams:read"]);
//! assert_eq!(perms.len(), 1);
//! assert!(perms.has_any(&["streams:edit", "streams:read"]));
//! ```
//!
//! # Common pitfalls
//! - `streams:read` does not imply `streams:read:abc`; the scoped form is checked
//!   separately by [`authorize`].

mod engine;
mod errors;
mod permission;

pub use engine::{Principal, RoleDirectory, authorize, scoped_permission};
pub use errors::{AuthzError, AuthzResult};
pub use permission::{PermissionSet, WILDCARD};
