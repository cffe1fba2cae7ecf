//! On-disk snapshot layout. Distinct from the API shapes in chirpy-types so
//! the persisted format can stay put while responses change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use chirpy_types::Id;
use chirpy_types::models::{Chirp, User};

use crate::error::StoreError;

/// The whole store at rest: one JSON document. Map keys serialize as
/// stringified ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub chirps: HashMap<Id, Chirp>,
    #[serde(default)]
    pub users: HashMap<Id, User>,
    pub next_id: Id,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            chirps: HashMap::new(),
            users: HashMap::new(),
            next_id: 1,
        }
    }
}

impl Snapshot {
    /// Hand out the next id. Shared by chirps and users, never reused; once
    /// the counter cannot advance, allocation fails instead of wrapping.
    pub(crate) fn allocate_id(&mut self) -> Result<Id, StoreError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(StoreError::IdsExhausted)?;
        Ok(id)
    }

    /// Reject snapshots whose counter could hand out an id already in use, or
    /// whose map keys disagree with the records they hold.
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        if self.next_id == 0 {
            return Err("next_id must be at least 1".into());
        }
        for (key, chirp) in &self.chirps {
            if *key != chirp.id {
                return Err(format!("chirp stored under key {key} has id {}", chirp.id));
            }
            if chirp.id >= self.next_id {
                return Err(format!("chirp id {} is not below next_id {}", chirp.id, self.next_id));
            }
        }
        for (key, user) in &self.users {
            if *key != user.id {
                return Err(format!("user stored under key {key} has id {}", user.id));
            }
            if user.id >= self.next_id {
                return Err(format!("user id {} is not below next_id {}", user.id, self.next_id));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `desc` in any case selects descending; anything else is ascending.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }
}
