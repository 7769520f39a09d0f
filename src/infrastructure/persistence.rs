use crate::domain::Board;

use super::store::{KeyValueStore, StorageError, StorageResult};

/// Key the board snapshot is stored under.
pub const STATE_KEY: &str = "trellolState";

/// Saves and loads the whole board as a single JSON blob.
pub struct BoardRepository {
    store: Box<dyn KeyValueStore>,
}

impl BoardRepository {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn save(&mut self, board: &Board) -> StorageResult<()> {
        let json = serde_json::to_string(board)?;
        self.store.set(STATE_KEY, &json)
    }

    /// Reads the stored snapshot.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet and
    /// `Err(StorageError::Corrupt)` when the blob is not a valid board.
    pub fn try_load(&self) -> StorageResult<Option<Board>> {
        let Some(contents) = self.store.get(STATE_KEY)? else {
            return Ok(None);
        };

        let board: Board = serde_json::from_str(&contents)
            .map_err(|e| StorageError::Corrupt(format!("invalid board snapshot - {e}")))?;
        board.validate().map_err(StorageError::Corrupt)?;
        Ok(Some(board))
    }

    /// Reads the stored snapshot, treating anything unreadable as absent.
    pub fn load(&self) -> Option<Board> {
        match self.try_load() {
            Ok(board) => board,
            Err(e) => {
                tracing::warn!("Ignoring persisted board: {}", e);
                None
            }
        }
    }

    pub fn clear(&mut self) -> StorageResult<()> {
        self.store.remove(STATE_KEY)
    }
}
