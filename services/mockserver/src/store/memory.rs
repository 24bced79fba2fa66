//! In-memory entity store with pluggable snapshot persistence.
//!
//! # Purpose
//! [`EntityStore`] keeps users, roles, streams, stream rules, index sets,
//! inputs, dashboards, alerts, alert conditions and access tokens for the
//! mock server. Tests construct one store and hand it to the HTTP layer; there
//! is no process-wide instance.
//!
//! # Concurrency
//! - One `parking_lot::RwLock` guards every collection. Reads take the shared
//!   lock; writes, `save` and `load` take the exclusive lock.
//! - Each public operation acquires the lock once and releases it before
//!   returning, so operations are linearizable and never re-enter the lock.
//! - Cross-collection invariants (default index set, rule ownership, role
//!   membership) are maintained inside a single critical section.
//!
//! # Persistence
//! With `autosave` enabled, every successful mutation writes a snapshot
//! before the lock is released. A failed write is reported as
//! [`StoreError::Io`] but the in-memory mutation stands.
//!
//! # Metrics
//! - `graymock_entities_total{kind}` gauge after inserts and deletes.
//! - `graymock_entity_changes_total{kind,op}` counter per successful mutation.
//! - `graymock_snapshot_saves_total{result}` counter per snapshot write.
//! - `graymock_authz_decisions_total{decision}` counter per authorization check.
use super::collection::{Collections, Entity};
use super::persistence::{FilePersistence, NoopPersistence, Persistence};
use super::{StoreError, StoreResult};
use crate::config::MockServerConfig;
use crate::model::{
    Alert, AlertCondition, Dashboard, IndexSet, Input, Role, Stream, StreamRule, User,
    new_object_id,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;

pub const ADMIN_ROLE: &str = "Admin";
pub const READER_ROLE: &str = "Reader";
pub const ADMIN_USER: &str = "admin";

/// Password value that marks the username half of a credential pair as an
/// access token.
pub const TOKEN_PASSWORD: &str = "token";

const READER_PERMISSIONS: [&str; 10] = [
    "buffers:read",
    "clusterconfigentry:read",
    "fieldnames:read",
    "indexercluster:read",
    "inputs:read",
    "journal:read",
    "messagecount:read",
    "messages:analyze",
    "messages:read",
    "system:read",
];

/// Per-collection counts, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub backend: &'static str,
    pub default_index_set_id: String,
    pub counts: BTreeMap<&'static str, usize>,
    pub tokens: usize,
}

pub struct EntityStore {
    collections: RwLock<Collections>,
    persistence: Box<dyn Persistence>,
    autosave: bool,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Non-durable store; `save` and `load` are no-ops.
    pub fn new() -> Self {
        Self::with_persistence(NoopPersistence, false)
    }

    pub fn with_persistence(persistence: impl Persistence + 'static, autosave: bool) -> Self {
        Self {
            collections: RwLock::new(Collections::default()),
            persistence: Box::new(persistence),
            autosave,
        }
    }

    pub fn from_config(config: &MockServerConfig) -> Self {
        match &config.data_path {
            Some(path) => Self::with_persistence(FilePersistence::new(path), config.autosave),
            None => Self::with_persistence(NoopPersistence, config.autosave),
        }
    }

    /// Build a store from `config`, load its snapshot and seed the built-in
    /// entities when enabled.
    pub fn open(config: &MockServerConfig) -> StoreResult<Self> {
        let store = Self::from_config(config);
        store.load()?;
        if config.seed_defaults {
            store.seed_defaults(&config.admin_password)?;
        }
        Ok(store)
    }

    pub fn is_durable(&self) -> bool {
        self.persistence.is_durable()
    }

    pub fn backend_name(&self) -> &'static str {
        self.persistence.backend_name()
    }

    /// Insert `entity` and return its key, generating an id for kinds whose
    /// key is server-assigned.
    ///
    /// # Errors
    /// - [`StoreError::Validation`] for an empty user-supplied key or a failed
    ///   reference check.
    /// - [`StoreError::Conflict`] if the key already exists.
    pub fn add<T: Entity>(&self, entity: T) -> StoreResult<String> {
        self.mutate(T::KIND, "created", |collections| {
            insert_entity(collections, entity)
        })
    }

    /// Look up an entity. `Ok(None)` means not found.
    pub fn get<T: Entity>(&self, key: &str) -> StoreResult<Option<T>> {
        require_key::<T>(key)?;
        let collections = self.collections.read();
        Ok(T::collection(&collections).get(key).cloned())
    }

    pub fn has<T: Entity>(&self, key: &str) -> StoreResult<bool> {
        require_key::<T>(key)?;
        let collections = self.collections.read();
        Ok(T::collection(&collections).contains(key))
    }

    /// Copy of every entity of one kind, in insertion order.
    pub fn get_all<T: Entity>(&self) -> StoreResult<Vec<T>> {
        let collections = self.collections.read();
        Ok(T::collection(&collections).iter().cloned().collect())
    }

    /// Replace the stored entity with the same key.
    ///
    /// # Errors
    /// - [`StoreError::Validation`] for an empty key or a failed reference check.
    /// - [`StoreError::NotFound`] if nothing is stored under the key.
    pub fn update<T: Entity>(&self, entity: T) -> StoreResult<()> {
        self.mutate(T::KIND, "updated", |collections| {
            replace_entity(collections, entity)
        })
    }

    /// Remove an entity and cascade to the entities it owns.
    ///
    /// # Errors
    /// - [`StoreError::Validation`] for an empty key or a protected entity.
    /// - [`StoreError::NotFound`] if nothing is stored under the key.
    /// - [`StoreError::Conflict`] if live references block the delete.
    pub fn delete<T: Entity>(&self, key: &str) -> StoreResult<()> {
        self.mutate(T::KIND, "deleted", |collections| {
            remove_entity::<T>(collections, key).map(|_| ())
        })
    }

    /// Decide whether `user` may act within `scope`, optionally narrowed to
    /// resource ids by `args`. `None` is the server-internal caller.
    ///
    /// # Errors
    /// - [`StoreError::Consistency`] if the user references a missing role.
    pub fn authorize(&self, user: Option<&User>, scope: &str, args: &[&str]) -> StoreResult<bool> {
        let collections = self.collections.read();
        let allowed = graymock_authz::authorize(&*collections, user, scope, args)?;
        let decision = if allowed { "allow" } else { "deny" };
        metrics::counter!("graymock_authz_decisions_total", "decision" => decision).increment(1);
        tracing::debug!(
            user = user.map(|u| u.username.as_str()).unwrap_or("<system>"),
            scope,
            decision,
            "authorization checked"
        );
        Ok(allowed)
    }

    /// Write the current state through the persistence backend.
    pub fn save(&self) -> StoreResult<()> {
        let collections = self.collections.write();
        self.persist(&collections)
    }

    /// Replace the current state with the stored snapshot, if any.
    ///
    /// A malformed snapshot leaves the store untouched.
    pub fn load(&self) -> StoreResult<()> {
        let mut collections = self.collections.write();
        let Some(bytes) = self.persistence.read()? else {
            tracing::debug!(backend = self.backend_name(), "no snapshot to load");
            return Ok(());
        };
        let mut loaded: Collections = serde_json::from_slice(&bytes)?;
        loaded.normalize_default_index_set();
        *collections = loaded;
        record_counts(&collections);
        tracing::info!(
            backend = self.backend_name(),
            users = collections.users.len(),
            streams = collections.streams.len(),
            inputs = collections.inputs.len(),
            "snapshot loaded"
        );
        Ok(())
    }

    pub fn default_index_set(&self) -> StoreResult<Option<IndexSet>> {
        let collections = self.collections.read();
        Ok(collections
            .index_sets
            .get(&collections.default_index_set_id)
            .cloned())
    }

    /// Make `id` the default index set, clearing the previous holder.
    pub fn set_default_index_set(&self, id: &str) -> StoreResult<()> {
        require_key::<IndexSet>(id)?;
        self.mutate(IndexSet::KIND, "updated", |collections| {
            if !collections.index_sets.contains(id) {
                return Err(not_found::<IndexSet>(id));
            }
            collections.default_index_set_id = id.to_string();
            collections.normalize_default_index_set();
            Ok(())
        })
    }

    /// Rules of one stream, in the stream's rule order.
    pub fn stream_rules(&self, stream_id: &str) -> StoreResult<Vec<StreamRule>> {
        require_key::<Stream>(stream_id)?;
        let collections = self.collections.read();
        let stream = collections
            .streams
            .get(stream_id)
            .ok_or_else(|| not_found::<Stream>(stream_id))?;
        stream
            .rule_ids
            .iter()
            .map(|id| {
                collections.stream_rules.get(id).cloned().ok_or_else(|| {
                    StoreError::Consistency(format!(
                        "stream <{stream_id}> lists missing rule <{id}>"
                    ))
                })
            })
            .collect()
    }

    pub fn enabled_streams(&self) -> StoreResult<Vec<Stream>> {
        let collections = self.collections.read();
        Ok(collections
            .streams
            .iter()
            .filter(|stream| !stream.disabled)
            .cloned()
            .collect())
    }

    pub fn pause_stream(&self, id: &str) -> StoreResult<()> {
        self.set_stream_disabled(id, true)
    }

    pub fn resume_stream(&self, id: &str) -> StoreResult<()> {
        self.set_stream_disabled(id, false)
    }

    fn set_stream_disabled(&self, id: &str, disabled: bool) -> StoreResult<()> {
        require_key::<Stream>(id)?;
        let op = if disabled { "paused" } else { "resumed" };
        self.mutate(Stream::KIND, op, |collections| {
            let stream = collections
                .streams
                .get_mut(id)
                .ok_or_else(|| not_found::<Stream>(id))?;
            stream.disabled = disabled;
            Ok(())
        })
    }

    /// Users holding `role`.
    pub fn role_members(&self, role: &str) -> StoreResult<Vec<User>> {
        require_key::<Role>(role)?;
        let collections = self.collections.read();
        if !collections.roles.contains(role) {
            return Err(not_found::<Role>(role));
        }
        Ok(collections
            .users
            .iter()
            .filter(|user| user.roles.contains(role))
            .cloned()
            .collect())
    }

    pub fn add_user_to_role(&self, username: &str, role: &str) -> StoreResult<()> {
        self.change_membership(username, role, true)
    }

    pub fn remove_user_from_role(&self, username: &str, role: &str) -> StoreResult<()> {
        self.change_membership(username, role, false)
    }

    fn change_membership(&self, username: &str, role: &str, member: bool) -> StoreResult<()> {
        require_key::<User>(username)?;
        require_key::<Role>(role)?;
        self.mutate(User::KIND, "updated", |collections| {
            if !collections.roles.contains(role) {
                return Err(not_found::<Role>(role));
            }
            let user = collections
                .users
                .get_mut(username)
                .ok_or_else(|| not_found::<User>(username))?;
            if user.read_only {
                return Err(read_only_user(username));
            }
            if member {
                user.roles.insert(role.to_string());
            } else {
                user.roles.remove(role);
            }
            Ok(())
        })
    }

    /// Register an access token for an existing user.
    pub fn add_token(&self, token: &str, username: &str) -> StoreResult<()> {
        if token.is_empty() {
            return Err(StoreError::Validation("token is required".to_string()));
        }
        require_key::<User>(username)?;
        self.mutate("token", "created", |collections| {
            if !collections.users.contains(username) {
                return Err(StoreError::Validation(format!(
                    "no user found with name <{username}>"
                )));
            }
            if collections.tokens.contains_key(token) {
                return Err(StoreError::Conflict("token already exists".to_string()));
            }
            collections
                .tokens
                .insert(token.to_string(), username.to_string());
            Ok(())
        })
    }

    pub fn delete_token(&self, token: &str) -> StoreResult<()> {
        if token.is_empty() {
            return Err(StoreError::Validation("token is required".to_string()));
        }
        self.mutate("token", "deleted", |collections| {
            collections
                .tokens
                .remove(token)
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound("token".to_string()))
        })
    }

    pub fn tokens_for_user(&self, username: &str) -> StoreResult<Vec<String>> {
        require_key::<User>(username)?;
        let collections = self.collections.read();
        Ok(collections
            .tokens
            .iter()
            .filter(|(_, owner)| owner.as_str() == username)
            .map(|(token, _)| token.clone())
            .collect())
    }

    /// Resolve basic-auth credentials to the calling user.
    ///
    /// A password of [`TOKEN_PASSWORD`] means `name` is an access token;
    /// otherwise `name` and `password` must match a stored user.
    pub fn resolve_caller(&self, name: &str, password: &str) -> StoreResult<Option<User>> {
        if name.is_empty() {
            return Ok(None);
        }
        let collections = self.collections.read();
        if password == TOKEN_PASSWORD {
            let Some(username) = collections.tokens.get(name) else {
                return Ok(None);
            };
            return collections
                .users
                .get(username)
                .cloned()
                .map(Some)
                .ok_or_else(|| {
                    StoreError::Consistency(format!(
                        "token resolves to missing user <{username}>"
                    ))
                });
        }
        Ok(collections
            .users
            .get(name)
            .filter(|user| user.password.as_deref() == Some(password))
            .cloned())
    }

    /// Add the built-in roles, the admin user and a default index set unless
    /// they already exist.
    pub fn seed_defaults(&self, admin_password: &str) -> StoreResult<()> {
        self.mutate("seed", "created", |collections| {
            let mut staged = collections.clone();
            if !staged.roles.contains(ADMIN_ROLE) {
                let mut admin = Role::new(ADMIN_ROLE, [graymock_authz::WILDCARD]);
                admin.description =
                    "Grants all permissions for Graylog administrators (built-in)".to_string();
                admin.read_only = true;
                insert_entity(&mut staged, admin)?;
            }
            if !staged.roles.contains(READER_ROLE) {
                let mut reader = Role::new(READER_ROLE, READER_PERMISSIONS);
                reader.description = "Grants basic permissions for every Graylog user (built-in)"
                    .to_string();
                reader.read_only = true;
                insert_entity(&mut staged, reader)?;
            }
            if !staged.users.contains(ADMIN_USER) {
                let mut admin = User::new(ADMIN_USER)
                    .with_roles([ADMIN_ROLE])
                    .with_password(admin_password);
                admin.full_name = "Administrator".to_string();
                admin.read_only = true;
                insert_entity(&mut staged, admin)?;
            }
            if !staged.index_sets.contains(&staged.default_index_set_id) {
                let mut index_set = IndexSet::new("Default index set", "graylog");
                index_set.description = "The Graylog default index set".to_string();
                index_set.default = true;
                insert_entity(&mut staged, index_set)?;
            }
            *collections = staged;
            tracing::info!(
                roles = collections.roles.len(),
                users = collections.users.len(),
                default_index_set = %collections.default_index_set_id,
                "default entities seeded"
            );
            Ok(())
        })
    }

    pub fn summary(&self) -> StoreSummary {
        let collections = self.collections.read();
        let counts = BTreeMap::from([
            ("users", collections.users.len()),
            ("roles", collections.roles.len()),
            ("streams", collections.streams.len()),
            ("stream_rules", collections.stream_rules.len()),
            ("index_sets", collections.index_sets.len()),
            ("inputs", collections.inputs.len()),
            ("dashboards", collections.dashboards.len()),
            ("alerts", collections.alerts.len()),
            ("alert_conditions", collections.alert_conditions.len()),
        ]);
        StoreSummary {
            backend: self.backend_name(),
            default_index_set_id: collections.default_index_set_id.clone(),
            counts,
            tokens: collections.tokens.len(),
        }
    }

    /// Run one mutation under the write lock, then persist if configured.
    ///
    /// `apply` must leave the collections untouched when it fails: run every
    /// fallible check before the first write, or stage multi-step writes on a
    /// copy as `seed_defaults` does.
    fn mutate<R>(
        &self,
        kind: &'static str,
        op: &'static str,
        apply: impl FnOnce(&mut Collections) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut collections = self.collections.write();
        let result = apply(&mut *collections)?;
        record_counts(&collections);
        metrics::counter!("graymock_entity_changes_total", "kind" => kind, "op" => op)
            .increment(1);
        tracing::debug!(kind, op, "store mutated");
        if self.autosave {
            self.persist(&collections)?;
        }
        Ok(result)
    }

    fn persist(&self, collections: &Collections) -> StoreResult<()> {
        if !self.persistence.is_durable() {
            return Ok(());
        }
        let bytes = serde_json::to_vec(collections)?;
        match self.persistence.write(&bytes) {
            Ok(()) => {
                metrics::counter!("graymock_snapshot_saves_total", "result" => "ok").increment(1);
                tracing::debug!(
                    backend = self.backend_name(),
                    bytes = bytes.len(),
                    "snapshot saved"
                );
                Ok(())
            }
            Err(err) => {
                metrics::counter!("graymock_snapshot_saves_total", "result" => "error")
                    .increment(1);
                tracing::warn!(backend = self.backend_name(), error = %err, "snapshot save failed");
                Err(StoreError::Io(err))
            }
        }
    }
}

fn require_key<T: Entity>(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::Validation(format!(
            "{} is required",
            T::KEY_FIELD
        )));
    }
    Ok(())
}

fn read_only_user(username: &str) -> StoreError {
    StoreError::Validation(format!("user <{username}> is read only"))
}

fn not_found<T: Entity>(key: &str) -> StoreError {
    StoreError::NotFound(format!("no {} found with {} <{key}>", T::KIND, T::KEY_FIELD))
}

fn record_count<T: Entity>(collections: &Collections) {
    metrics::gauge!("graymock_entities_total", "kind" => T::KIND)
        .set(T::collection(collections).len() as f64);
}

/// Refresh the entity gauge of every kind; cascades touch kinds other than
/// the one being mutated.
fn record_counts(collections: &Collections) {
    record_count::<User>(collections);
    record_count::<Role>(collections);
    record_count::<Stream>(collections);
    record_count::<StreamRule>(collections);
    record_count::<IndexSet>(collections);
    record_count::<Input>(collections);
    record_count::<Dashboard>(collections);
    record_count::<Alert>(collections);
    record_count::<AlertCondition>(collections);
    metrics::gauge!("graymock_entities_total", "kind" => "token")
        .set(collections.tokens.len() as f64);
}

fn insert_entity<T: Entity>(collections: &mut Collections, mut entity: T) -> StoreResult<String> {
    if entity.key().is_empty() {
        if !T::GENERATED_KEY {
            return Err(StoreError::Validation(format!(
                "{} is required",
                T::KEY_FIELD
            )));
        }
        entity.set_key(new_object_id());
    }
    if T::collection(collections).contains(entity.key()) {
        return Err(StoreError::Conflict(format!(
            "{} <{}> already exists",
            T::KIND,
            entity.key()
        )));
    }
    entity.prepare(None, collections)?;
    let stored = entity.clone();
    T::collection_mut(collections).push(entity);
    stored.after_write(collections);
    Ok(stored.key().to_string())
}

fn replace_entity<T: Entity>(collections: &mut Collections, mut entity: T) -> StoreResult<()> {
    require_key::<T>(entity.key())?;
    let existing = T::collection(collections)
        .get(entity.key())
        .ok_or_else(|| not_found::<T>(entity.key()))?;
    entity.prepare(Some(existing), collections)?;
    let stored = entity.clone();
    T::collection_mut(collections).replace(entity);
    stored.after_write(collections);
    Ok(())
}

fn remove_entity<T: Entity>(collections: &mut Collections, key: &str) -> StoreResult<T> {
    require_key::<T>(key)?;
    let existing = T::collection(collections)
        .get(key)
        .ok_or_else(|| not_found::<T>(key))?;
    existing.check_delete(collections)?;
    let removed = T::collection_mut(collections)
        .remove(key)
        .ok_or_else(|| not_found::<T>(key))?;
    removed.after_delete(collections);
    Ok(removed)
}
