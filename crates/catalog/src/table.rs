use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity};

/// Mutable-by-key table with a unique-key constraint.
///
/// Rows are ordered by key so listings are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedTable<E: Entity<Id = String>> {
    rows: BTreeMap<String, E>,
}

impl<E: Entity<Id = String>> Default for KeyedTable<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<E: Entity<Id = String>> KeyedTable<E> {
    /// Insert a row, failing with `Conflict` if its key is taken.
    ///
    /// An existing row is never overwritten.
    pub fn insert_unique(&mut self, row: E) -> DomainResult<&E> {
        let key = row.id().clone();
        if self.rows.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "{} '{}' already exists",
                E::KIND,
                key
            )));
        }
        Ok(self.rows.entry(key).or_insert(row))
    }

    pub fn get(&self, key: &str) -> DomainResult<&E> {
        self.rows
            .get(key)
            .ok_or_else(|| DomainError::not_found(E::KIND, key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
