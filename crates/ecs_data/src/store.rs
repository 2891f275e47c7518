//! Backend seam for level persistence.

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::level::LevelInfo;

/// One persisted (entity, component) pair.
///
/// `entity` is a store-local id handed out by
/// [`LevelTransaction::create_entity`]; it has no relation to the id the
/// entity had in the manager it was saved from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRow {
    pub entity: u64,
    /// Component kind name, as returned by `Component::type_name`.
    pub kind: String,
    /// MessagePack body.
    pub data: Vec<u8>,
}

/// A place levels are read from and written to.
pub trait LevelStore {
    type Transaction<'a>: LevelTransaction
    where
        Self: 'a;

    /// Every level the store knows about, ordered by number.
    ///
    /// # Errors
    ///
    /// Backend specific.
    fn levels(&self) -> Result<Vec<LevelInfo>, DataError>;

    /// Metadata of a single level.
    ///
    /// # Errors
    ///
    /// Backend specific.
    fn level(&self, number: i32) -> Result<Option<LevelInfo>, DataError> {
        Ok(self
            .levels()?
            .into_iter()
            .find(|level| level.number == number))
    }

    /// Every row saved under level `number`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownLevel`] if there is no such level.
    fn rows(&self, number: i32) -> Result<Vec<ComponentRow>, DataError>;

    /// Open a write transaction against level `number`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownLevel`] if there is no such level.
    fn begin(&mut self, number: i32) -> Result<Self::Transaction<'_>, DataError>;
}

/// Writes against one level. Nothing is visible in the store until
/// [`commit`](LevelTransaction::commit); dropping the transaction without
/// committing discards every change.
pub trait LevelTransaction: Sized {
    /// Delete every row of the level.
    ///
    /// # Errors
    ///
    /// Backend specific.
    fn clear_level(&mut self) -> Result<(), DataError>;

    /// Reserve a fresh store-local entity id.
    ///
    /// # Errors
    ///
    /// Backend specific.
    fn create_entity(&mut self) -> Result<u64, DataError>;

    /// Add one row to the level.
    ///
    /// # Errors
    ///
    /// Backend specific.
    fn insert_row(&mut self, row: ComponentRow) -> Result<(), DataError>;

    /// Apply every change.
    ///
    /// # Errors
    ///
    /// If the commit fails nothing is applied.
    fn commit(self) -> Result<(), DataError>;

    /// Discard every change.
    fn rollback(self) {}
}
