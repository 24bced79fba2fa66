//! Per-kind [`Entity`] implementations: keys, reference checks and cascades.
use super::collection::{Collection, Collections, Entity};
use super::{StoreError, StoreResult};
use crate::model::input::normalize_attributes;
use crate::model::{
    Alert, AlertCondition, Dashboard, IndexSet, Input, Role, Stream, StreamRule, User,
    timestamp_now,
};

fn require(value: &str, what: &str) -> StoreResult<()> {
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{what} is required")));
    }
    Ok(())
}

fn require_stream(collections: &Collections, stream_id: &str) -> StoreResult<()> {
    if !collections.streams.contains(stream_id) {
        return Err(StoreError::Validation(format!(
            "no stream found with id <{stream_id}>"
        )));
    }
    Ok(())
}

fn stamp_created(created_at: &mut Option<String>, existing: Option<&Option<String>>) {
    if created_at.is_some() {
        return;
    }
    *created_at = match existing {
        Some(previous) => previous.clone(),
        None => Some(timestamp_now()),
    };
}

impl Entity for User {
    const KIND: &'static str = "user";
    const KEY_FIELD: &'static str = "username";
    const GENERATED_KEY: bool = false;

    fn key(&self) -> &str {
        &self.username
    }

    fn set_key(&mut self, key: String) {
        self.username = key;
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.users
    }

    fn collection_mut(collections: &mut Collections) -> &mut Collection<Self> {
        &mut collections.users
    }

    fn prepare(&mut self, existing: Option<&Self>, collections: &Collections) -> StoreResult<()> {
        if existing.is_some_and(|user| user.read_only) {
            return Err(StoreError::Validation(format!(
                "user <{}> is read only",
                self.username
            )));
        }
        if let Some(missing) = self
            .roles
            .iter()
            .find(|role| !collections.roles.contains(role))
        {
            return Err(StoreError::Validation(format!(
                "no role found with name <{missing}>"
            )));
        }
        Ok(())
    }

    fn check_delete(&self, _collections: &Collections) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::Validation(format!(
                "user <{}> is read only",
                self.username
            )));
        }
        Ok(())
    }

    fn after_delete(&self, collections: &mut Collections) {
        collections
            .tokens
            .retain(|_, username| *username != self.username);
    }
}

impl Entity for Role {
    const KIND: &'static str = "role";
    const KEY_FIELD: &'static str = "name";
    const GENERATED_KEY: bool = false;

    fn key(&self) -> &str {
        &self.name
    }

    fn set_key(&mut self, key: String) {
        self.name = key;
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.roles
    }

    fn collection_mut(collections: &mut Collections) -> &mut Collection<Self> {
        &mut collections.roles
    }

    fn prepare(&mut self, existing: Option<&Self>, _collections: &Collections) -> StoreResult<()> {
        if existing.is_some_and(|role| role.read_only) {
            return Err(StoreError::Validation(format!(
                "role <{}> is read only",
                self.name
            )));
        }
        Ok(())
    }

    fn check_delete(&self, _collections: &Collections) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::Validation(format!(
                "role <{}> is read only",
                self.name
            )));
        }
        Ok(())
    }

    fn after_delete(&self, collections: &mut Collections) {
        for user in collections.users.iter_mut() {
            user.roles.remove(&self.name);
        }
    }
}

impl Entity for Stream {
    const KIND: &'static str = "stream";
    const KEY_FIELD: &'static str = "id";
    const GENERATED_KEY: bool = true;

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.streams
    }

    fn collection_mut(collections: &mut Collections) -> &mut Collection<Self> {
        &mut collections.streams
    }

    fn prepare(&mut self, existing: Option<&Self>, collections: &Collections) -> StoreResult<()> {
        require(&self.title, "stream title")?;
        if self.index_set_id.is_empty() {
            if collections.default_index_set_id.is_empty() {
                return Err(StoreError::Validation(
                    "index_set_id is empty and there is no default index set".to_string(),
                ));
            }
            self.index_set_id = collections.default_index_set_id.clone();
        }
        if !collections.index_sets.contains(&self.index_set_id) {
            return Err(StoreError::Validation(format!(
                "no index set found with id <{}>",
                self.index_set_id
            )));
        }
        // Rule ids are owned by the rule operations, never by the caller.
        self.rule_ids = existing
            .map(|stream| stream.rule_ids.clone())
            .unwrap_or_default();
        stamp_created(&mut self.created_at, existing.map(|s| &s.created_at));
        Ok(())
    }

    fn after_delete(&self, collections: &mut Collections) {
        collections
            .stream_rules
            .retain(|rule| rule.stream_id != self.id);
        collections
            .alert_conditions
            .retain(|condition| condition.stream_id != self.id);
    }
}

impl Entity for StreamRule {
    const KIND: &'static str = "stream rule";
    const KEY_FIELD: &'static str = "id";
    const GENERATED_KEY: bool = true;

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.stream_rules
    }

    fn collection_mut(collections: &mut Collections) -> &mut Collection<Self> {
        &mut collections.stream_rules
    }

    fn prepare(&mut self, existing: Option<&Self>, collections: &Collections) -> StoreResult<()> {
        require(&self.field, "stream rule field")?;
        require_stream(collections, &self.stream_id)?;
        if existing.is_some_and(|rule| rule.stream_id != self.stream_id) {
            return Err(StoreError::Validation(
                "a stream rule cannot move to another stream".to_string(),
            ));
        }
        Ok(())
    }

    fn after_write(&self, collections: &mut Collections) {
        if let Some(stream) = collections.streams.get_mut(&self.stream_id) {
            if !stream.rule_ids.contains(&self.id) {
                stream.rule_ids.push(self.id.clone());
            }
        }
    }

    fn after_delete(&self, collections: &mut Collections) {
        if let Some(stream) = collections.streams.get_mut(&self.stream_id) {
            stream.rule_ids.retain(|id| *id != self.id);
        }
    }
}

impl Entity for IndexSet {
    const KIND: &'static str = "index set";
    const KEY_FIELD: &'static str = "id";
    const GENERATED_KEY: bool = true;

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.index_sets
    }

    fn collection_mut(collections: &mut Collections) -> &mut Collection<Self> {
        &mut collections.index_sets
    }

    fn prepare(&mut self, existing: Option<&Self>, collections: &Collections) -> StoreResult<()> {
        require(&self.title, "index set title")?;
        require(&self.index_prefix, "index_prefix")?;
        if let Some(existing) = existing {
            if existing.id == collections.default_index_set_id && !self.default {
                return Err(StoreError::Validation(
                    "the default index set cannot be unset; promote another index set instead"
                        .to_string(),
                ));
            }
        }
        stamp_created(
            &mut self.creation_date,
            existing.map(|set| &set.creation_date),
        );
        Ok(())
    }

    fn after_write(&self, collections: &mut Collections) {
        if self.default {
            collections.default_index_set_id = self.id.clone();
        }
        collections.normalize_default_index_set();
    }

    fn check_delete(&self, collections: &Collections) -> StoreResult<()> {
        if self.id == collections.default_index_set_id {
            return Err(StoreError::Conflict(format!(
                "index set <{}> is the default index set",
                self.id
            )));
        }
        if let Some(stream) = collections
            .streams
            .iter()
            .find(|stream| stream.index_set_id == self.id)
        {
            return Err(StoreError::Conflict(format!(
                "index set <{}> is used by stream <{}>",
                self.id, stream.id
            )));
        }
        Ok(())
    }
}

impl Entity for Input {
    const KIND: &'static str = "input";
    const KEY_FIELD: &'static str = "id";
    const GENERATED_KEY: bool = true;

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.inputs
    }

    fn collection_mut(collections: &mut Collections) -> &mut Collection<Self> {
        &mut collections.inputs
    }

    fn prepare(&mut self, existing: Option<&Self>, _collections: &Collections) -> StoreResult<()> {
        require(&self.title, "input title")?;
        let attributes = self
            .attributes
            .take()
            .ok_or_else(|| StoreError::Validation("input attributes are required".to_string()))?;
        self.attributes = Some(normalize_attributes(attributes)?);
        stamp_created(&mut self.created_at, existing.map(|input| &input.created_at));
        Ok(())
    }
}

impl Entity for Dashboard {
    const KIND: &'static str = "dashboard";
    const KEY_FIELD: &'static str = "id";
    const GENERATED_KEY: bool = true;

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.dashboards
    }

    fn collection_mut(collections: &mut Collections) -> &mut Collection<Self> {
        &mut collections.dashboards
    }

    fn prepare(&mut self, existing: Option<&Self>, _collections: &Collections) -> StoreResult<()> {
        require(&self.title, "dashboard title")?;
        stamp_created(&mut self.created_at, existing.map(|d| &d.created_at));
        Ok(())
    }
}

impl Entity for Alert {
    const KIND: &'static str = "alert";
    const KEY_FIELD: &'static str = "id";
    const GENERATED_KEY: bool = true;

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.alerts
    }

    fn collection_mut(collections: &mut Collections) -> &mut Collection<Self> {
        &mut collections.alerts
    }
}

impl Entity for AlertCondition {
    const KIND: &'static str = "alert condition";
    const KEY_FIELD: &'static str = "id";
    const GENERATED_KEY: bool = true;

    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }

    fn collection(collections: &Collections) -> &Collection<Self> {
        &collections.alert_conditions
    }

    fn collection_mut(collections: &mut Collections) -> &mut Collection<Self> {
        &mut collections.alert_conditions
    }

    fn prepare(&mut self, existing: Option<&Self>, collections: &Collections) -> StoreResult<()> {
        require(&self.title, "alert condition title")?;
        require_stream(collections, &self.stream_id)?;
        stamp_created(&mut self.created_at, existing.map(|c| &c.created_at));
        Ok(())
    }
}
