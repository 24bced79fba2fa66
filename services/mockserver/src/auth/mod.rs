//! Caller resolution and permission scopes.
//!
//! # Purpose
//! Turns basic-auth credentials into a stored user and gates a request on a
//! permission scope, mirroring the 401/403 split of the real API.
mod caller;
pub mod scopes;

pub use caller::{Access, Credentials, check_access};
