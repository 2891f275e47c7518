//! In-memory level store with a JSON form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DataError;
use crate::level::LevelInfo;
use crate::store::{ComponentRow, LevelStore, LevelTransaction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredLevel {
    info: LevelInfo,
    #[serde(default)]
    rows: Vec<ComponentRow>,
}

/// Levels held in a `BTreeMap` keyed by level number.
///
/// Store-local entity ids come from one counter shared by every level and
/// are never reused, which matches how a database sequence behaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLevelStore {
    #[serde(default)]
    levels: BTreeMap<i32, StoredLevel>,
    /// Last store-local entity id handed out.
    #[serde(default)]
    last_entity_id: u64,
}

impl MemoryLevelStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a level, or replace the metadata of an existing one. Rows of an
    /// existing level are kept.
    pub fn define_level(&mut self, info: LevelInfo) {
        match self.levels.get_mut(&info.number) {
            Some(level) => level.info = info,
            None => {
                self.levels.insert(
                    info.number,
                    StoredLevel {
                        info,
                        rows: Vec::new(),
                    },
                );
            }
        }
    }

    /// Number of rows saved under level `number`, or `None` if there is no
    /// such level.
    #[must_use]
    pub fn row_count(&self, number: i32) -> Option<usize> {
        self.levels.get(&number).map(|level| level.rows.len())
    }

    /// Serialise the whole store as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Json`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, DataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuild a store from [`to_json`](Self::to_json) output.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Json`] if the input is malformed.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl LevelStore for MemoryLevelStore {
    type Transaction<'a> = MemoryTransaction<'a>;

    fn levels(&self) -> Result<Vec<LevelInfo>, DataError> {
        Ok(self.levels.values().map(|level| level.info.clone()).collect())
    }

    fn level(&self, number: i32) -> Result<Option<LevelInfo>, DataError> {
        Ok(self.levels.get(&number).map(|level| level.info.clone()))
    }

    fn rows(&self, number: i32) -> Result<Vec<ComponentRow>, DataError> {
        self.levels
            .get(&number)
            .map(|level| level.rows.clone())
            .ok_or(DataError::UnknownLevel(number))
    }

    fn begin(&mut self, number: i32) -> Result<MemoryTransaction<'_>, DataError> {
        if !self.levels.contains_key(&number) {
            return Err(DataError::UnknownLevel(number));
        }
        let last_entity_id = self.last_entity_id;
        Ok(MemoryTransaction {
            store: self,
            level: number,
            clear: false,
            rows: Vec::new(),
            last_entity_id,
            done: false,
        })
    }
}

/// Staged writes against a [`MemoryLevelStore`].
#[derive(Debug)]
pub struct MemoryTransaction<'a> {
    store: &'a mut MemoryLevelStore,
    level: i32,
    /// Drop the level's existing rows on commit.
    clear: bool,
    rows: Vec<ComponentRow>,
    last_entity_id: u64,
    /// Set once committed or explicitly rolled back.
    done: bool,
}

impl LevelTransaction for MemoryTransaction<'_> {
    fn clear_level(&mut self) -> Result<(), DataError> {
        self.clear = true;
        self.rows.clear();
        Ok(())
    }

    fn create_entity(&mut self) -> Result<u64, DataError> {
        self.last_entity_id = self
            .last_entity_id
            .checked_add(1)
            .ok_or_else(|| DataError::Store("store entity ids exhausted".into()))?;
        Ok(self.last_entity_id)
    }

    fn insert_row(&mut self, row: ComponentRow) -> Result<(), DataError> {
        self.rows.push(row);
        Ok(())
    }

    fn commit(mut self) -> Result<(), DataError> {
        let level = self
            .store
            .levels
            .get_mut(&self.level)
            .ok_or(DataError::UnknownLevel(self.level))?;
        if self.clear {
            level.rows.clear();
        }
        level.rows.append(&mut self.rows);
        let rows = level.rows.len();
        self.store.last_entity_id = self.last_entity_id;
        self.done = true;

        debug!(level = self.level, rows, "transaction committed");
        Ok(())
    }

    fn rollback(mut self) {
        self.done = true;
        debug!(level = self.level, staged = self.rows.len(), "transaction rolled back");
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if !self.done {
            debug!(
                level = self.level,
                staged = self.rows.len(),
                "transaction dropped without commit"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entity: u64, kind: &str) -> ComponentRow {
        ComponentRow {
            entity,
            kind: kind.into(),
            data: vec![0x90],
        }
    }

    fn store_with_level() -> MemoryLevelStore {
        let mut store = MemoryLevelStore::new();
        store.define_level(LevelInfo::new(1, "Meadow", "The first level"));
        store
    }

    #[test]
    fn test_commit_applies_rows() {
        let mut store = store_with_level();
        let mut tx = store.begin(1).unwrap();
        let a = tx.create_entity().unwrap();
        let b = tx.create_entity().unwrap();
        tx.insert_row(row(a, "Position")).unwrap();
        tx.insert_row(row(b, "Position")).unwrap();
        tx.commit().unwrap();

        assert_eq!((a, b), (1, 2));
        assert_eq!(store.rows(1).unwrap(), vec![row(1, "Position"), row(2, "Position")]);
    }

    #[test]
    fn test_drop_discards_changes() {
        let mut store = store_with_level();
        {
            let mut tx = store.begin(1).unwrap();
            let id = tx.create_entity().unwrap();
            tx.clear_level().unwrap();
            tx.insert_row(row(id, "Position")).unwrap();
        }
        assert_eq!(store.row_count(1), Some(0));

        // The id counter was not advanced either.
        let mut tx = store.begin(1).unwrap();
        assert_eq!(tx.create_entity().unwrap(), 1);
        tx.rollback();
        assert_eq!(store.row_count(1), Some(0));
    }

    #[test]
    fn test_clear_replaces_previous_rows() {
        let mut store = store_with_level();
        let mut tx = store.begin(1).unwrap();
        let id = tx.create_entity().unwrap();
        tx.insert_row(row(id, "Old")).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin(1).unwrap();
        tx.clear_level().unwrap();
        let id = tx.create_entity().unwrap();
        tx.insert_row(row(id, "New")).unwrap();
        tx.commit().unwrap();

        assert_eq!(store.rows(1).unwrap(), vec![row(2, "New")]);
    }

    #[test]
    fn test_unknown_level() {
        let mut store = store_with_level();
        assert!(matches!(store.rows(9), Err(DataError::UnknownLevel(9))));
        assert!(matches!(store.begin(9), Err(DataError::UnknownLevel(9))));
        assert_eq!(store.level(9).unwrap(), None);
    }

    #[test]
    fn test_define_level_keeps_rows() {
        let mut store = store_with_level();
        let mut tx = store.begin(1).unwrap();
        let id = tx.create_entity().unwrap();
        tx.insert_row(row(id, "Position")).unwrap();
        tx.commit().unwrap();

        store.define_level(LevelInfo::new(1, "Meadow (revised)", ""));
        assert_eq!(store.row_count(1), Some(1));
        assert_eq!(store.level(1).unwrap().map(|l| l.name), Some("Meadow (revised)".into()));
    }

    #[test]
    fn test_levels_are_ordered_by_number() {
        let mut store = MemoryLevelStore::new();
        store.define_level(LevelInfo::new(3, "Three", ""));
        store.define_level(LevelInfo::new(-1, "Tutorial", ""));
        store.define_level(LevelInfo::new(2, "Two", ""));
        let numbers: Vec<_> = store.levels().unwrap().iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![-1, 2, 3]);
    }

    #[test]
    fn test_json_form_restores_store() {
        let mut store = store_with_level();
        let mut tx = store.begin(1).unwrap();
        let id = tx.create_entity().unwrap();
        tx.insert_row(row(id, "Position")).unwrap();
        tx.commit().unwrap();

        let json = store.to_json().unwrap();
        let restored = MemoryLevelStore::from_json(&json).unwrap();
        assert_eq!(restored, store);
        assert!(MemoryLevelStore::from_json("{ not json").is_err());
    }
}
