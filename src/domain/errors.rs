use super::models::{CardId, ColumnId};
use thiserror::Error;

/// Reasons a board mutation is refused.
///
/// None of these are fatal: callers treat them as no-ops and the board is
/// left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Card text is empty")]
    InvalidInput,

    #[error("Card not found: {0}")]
    NotFound(CardId),

    #[error("Column not found: {0}")]
    ColumnNotFound(ColumnId),

    #[error("Invalid move target column: {0}")]
    InvalidTarget(ColumnId),
}

pub type BoardResult<T> = Result<T, BoardError>;
