//! Identity index: name → remote role.
//!
//! Built fresh from a live listing at the start of every run, mutated as
//! creates/updates land so later lookups see up-to-date `role_id`s, and
//! discarded when the run ends. Never persisted.

use std::collections::HashMap;

use crate::schema::RemoteRole;

/// Two remote records carry the same name. The run aborts rather than
/// guessing which record wins.
#[derive(Debug, thiserror::Error)]
#[error("duplicate role name in remote store: {name}")]
pub struct DuplicateName {
    pub name: String,
}

#[derive(Debug, Default)]
pub struct RoleIndex {
    by_name: HashMap<String, RemoteRole>,
}

impl RoleIndex {
    /// Build the index from a remote snapshot, enforcing name uniqueness.
    pub fn build(roles: Vec<RemoteRole>) -> Result<Self, DuplicateName> {
        let mut by_name = HashMap::with_capacity(roles.len());
        for role in roles {
            if by_name.contains_key(&role.name) {
                return Err(DuplicateName { name: role.name });
            }
            by_name.insert(role.name.clone(), role);
        }
        Ok(Self { by_name })
    }

    pub fn get(&self, name: &str) -> Option<&RemoteRole> {
        self.by_name.get(name)
    }

    /// Insert or replace the entry under the record's own name.
    pub fn insert(&mut self, role: RemoteRole) {
        self.by_name.insert(role.name.clone(), role);
    }

    pub fn remove(&mut self, name: &str) -> Option<RemoteRole> {
        self.by_name.remove(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
