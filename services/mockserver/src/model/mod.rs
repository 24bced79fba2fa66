//! Mock-server data model.
//!
//! # Purpose
//! Defines the entities stored by the mock server: users, roles, streams and
//! their rules, index sets, inputs, dashboards, alerts and alert conditions.
//!
//! # Notes
//! Entities reference each other by id or name only; the store owns every
//! lifecycle rule (cascades, reference checks).
mod alert;
mod dashboard;
mod index_set;
pub mod input;
mod role;
mod stream;
mod user;

pub use alert::{Alert, AlertCondition};
pub use dashboard::Dashboard;
pub use index_set::IndexSet;
pub use input::{Input, InputAttributes};
pub use role::Role;
pub use stream::{MatchingType, Stream, StreamRule, StreamRuleType};
pub use user::User;

/// Timestamp in the wire format used by the real server (`2018-02-24T03:02:26.001Z`).
pub fn timestamp_now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Server-generated entity id: 24 lowercase hex characters, shaped like the
/// object ids the real server hands out.
pub fn new_object_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(24);
    id
}
