use std::collections::HashSet;
use std::fmt;
use serde::{Deserialize, Serialize};

use super::errors::{BoardError, BoardResult};
use super::services::now_millis;

/// Identifier of a card, unique across the whole board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of one of the board's fixed columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(pub u32);

impl ColumnId {
    pub const TODO: ColumnId = ColumnId(1);
    pub const IN_PROGRESS: ColumnId = ColumnId(2);
    pub const DONE: ColumnId = ColumnId(3);
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub text: String,
}

impl Card {
    pub fn new(id: CardId, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(id: ColumnId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            cards: Vec::new(),
        }
    }

    pub fn position_of(&self, card_id: CardId) -> Option<usize> {
        self.cards.iter().position(|card| card.id == card_id)
    }
}

/// The whole persisted state: an ordered list of columns, each holding an
/// ordered list of cards.
///
/// `add_card`, `delete_card` and `move_card` are the only mutators. Each
/// either applies completely or leaves the board untouched.
///
/// # Examples
///
/// ```
/// use trellol::domain::{Board, ColumnId};
///
/// let mut board = Board::default();
/// let id = board.add_card(ColumnId::TODO, "  write tests ").unwrap();
/// assert_eq!(board.find_card(id), Some((ColumnId::TODO, 0)));
/// assert_eq!(board.column(ColumnId::TODO).unwrap().cards[0].text, "write tests");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub columns: Vec<Column>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            columns: vec![
                Column::new(ColumnId::TODO, "TODO"),
                Column::new(ColumnId::IN_PROGRESS, "IN PROGRESS"),
                Column::new(ColumnId::DONE, "DONE"),
            ],
        }
    }
}

impl Board {
    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == id)
    }

    fn column_mut(&mut self, id: ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.id == id)
    }

    pub fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|column| column.id == id)
    }

    /// Locates a card, scanning columns in declaration order.
    pub fn find_card(&self, card_id: CardId) -> Option<(ColumnId, usize)> {
        self.columns
            .iter()
            .find_map(|column| column.position_of(card_id).map(|index| (column.id, index)))
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .find(|card| card.id == card_id)
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|column| column.cards.len()).sum()
    }

    pub fn max_card_id(&self) -> Option<CardId> {
        self.columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .map(|card| card.id)
            .max()
    }

    /// Picks an id strictly greater than every id on the board, preferring
    /// the given wall-clock reading when it is already large enough.
    ///
    /// When the largest id is `u64::MAX` there is nothing greater; the
    /// smallest unused id is returned instead.
    pub fn next_card_id(&self, now: u64) -> CardId {
        match self.max_card_id() {
            None => CardId(now),
            Some(max) => match max.0.checked_add(1) {
                Some(floor) => CardId(now.max(floor)),
                None => self.smallest_unused_id(),
            },
        }
    }

    fn smallest_unused_id(&self) -> CardId {
        let used: HashSet<CardId> = self
            .columns
            .iter()
            .flat_map(|column| column.cards.iter())
            .map(|card| card.id)
            .collect();
        // A board holds far fewer than u64::MAX cards, so a gap always exists.
        (0..=u64::MAX)
            .map(CardId)
            .find(|id| !used.contains(id))
            .unwrap_or(CardId(0))
    }

    /// Appends a card with trimmed `text` to the end of a column.
    pub fn add_card(&mut self, column_id: ColumnId, text: &str) -> BoardResult<CardId> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BoardError::InvalidInput);
        }

        let id = self.next_card_id(now_millis());
        let column = self
            .column_mut(column_id)
            .ok_or(BoardError::ColumnNotFound(column_id))?;
        column.cards.push(Card::new(id, text));
        Ok(id)
    }

    /// Removes the first card with `card_id`, scanning columns in
    /// declaration order, and returns it.
    pub fn delete_card(&mut self, card_id: CardId) -> BoardResult<Card> {
        for column in &mut self.columns {
            if let Some(index) = column.position_of(card_id) {
                return Ok(column.cards.remove(index));
            }
        }
        Err(BoardError::NotFound(card_id))
    }

    /// Moves a card to `target_index` of the target column.
    ///
    /// The index is clamped against the target column after the card has
    /// been removed, so a move within one column counts positions without
    /// the moved card. An unknown target column leaves the card where it was.
    pub fn move_card(
        &mut self,
        card_id: CardId,
        target_column_id: ColumnId,
        target_index: usize,
    ) -> BoardResult<()> {
        if self.column(target_column_id).is_none() {
            return Err(BoardError::InvalidTarget(target_column_id));
        }

        let card = self.delete_card(card_id)?;
        let target = self
            .column_mut(target_column_id)
            .ok_or(BoardError::InvalidTarget(target_column_id))?;
        let index = target_index.min(target.cards.len());
        target.cards.insert(index, card);
        Ok(())
    }

    /// Checks the invariants a loaded snapshot must satisfy: exactly the
    /// fixed columns, in order and with their titles, and card ids unique
    /// across the board.
    pub fn validate(&self) -> Result<(), String> {
        let expected = Board::default();
        if self.columns.len() != expected.columns.len() {
            return Err(format!(
                "expected {} columns, found {}",
                expected.columns.len(),
                self.columns.len()
            ));
        }
        for (column, fixed) in self.columns.iter().zip(&expected.columns) {
            if column.id != fixed.id || column.title != fixed.title {
                return Err(format!(
                    "expected column {} \"{}\", found {} \"{}\"",
                    fixed.id, fixed.title, column.id, column.title
                ));
            }
        }

        let mut card_ids = HashSet::new();
        for card in self.columns.iter().flat_map(|column| column.cards.iter()) {
            if !card_ids.insert(card.id) {
                return Err(format!("duplicate card id {}", card.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(board: &Board, column: ColumnId) -> Vec<String> {
        board
            .column(column)
            .unwrap()
            .cards
            .iter()
            .map(|card| card.text.clone())
            .collect()
    }

    fn abc_board() -> (Board, CardId, CardId, CardId) {
        let mut board = Board::default();
        let a = board.add_card(ColumnId::TODO, "A").unwrap();
        let b = board.add_card(ColumnId::TODO, "B").unwrap();
        let c = board.add_card(ColumnId::TODO, "C").unwrap();
        (board, a, b, c)
    }

    #[test]
    fn test_default_board_has_three_fixed_columns() {
        let board = Board::default();
        let titles: Vec<&str> = board.columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["TODO", "IN PROGRESS", "DONE"]);
        assert_eq!(board.card_count(), 0);
    }

    #[test]
    fn test_add_card_trims_text() {
        let mut board = Board::default();
        let id = board.add_card(ColumnId::TODO, " hello ").unwrap();
        assert_eq!(board.card(id).unwrap().text, "hello");
    }

    #[test]
    fn test_add_card_rejects_blank_text() {
        let mut board = Board::default();
        assert_eq!(board.add_card(ColumnId::TODO, "   "), Err(BoardError::InvalidInput));
        assert_eq!(board.add_card(ColumnId::TODO, ""), Err(BoardError::InvalidInput));
        assert_eq!(board.card_count(), 0);
    }

    #[test]
    fn test_add_card_rejects_unknown_column() {
        let mut board = Board::default();
        let result = board.add_card(ColumnId(42), "orphan");
        assert_eq!(result, Err(BoardError::ColumnNotFound(ColumnId(42))));
        assert_eq!(board.card_count(), 0);
    }

    #[test]
    fn test_add_card_appends_to_end() {
        let (board, a, b, c) = abc_board();
        assert_eq!(texts(&board, ColumnId::TODO), vec!["A", "B", "C"]);
        assert_eq!(board.find_card(a), Some((ColumnId::TODO, 0)));
        assert_eq!(board.find_card(b), Some((ColumnId::TODO, 1)));
        assert_eq!(board.find_card(c), Some((ColumnId::TODO, 2)));
    }

    #[test]
    fn test_rapid_adds_get_unique_increasing_ids() {
        let mut board = Board::default();
        let ids: Vec<CardId> = (0..500)
            .map(|i| board.add_card(ColumnId::DONE, &format!("card {i}")).unwrap())
            .collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_next_card_id_stays_above_existing_ids() {
        let mut board = Board::default();
        board.columns[0].cards.push(Card::new(CardId(5_000), "future"));
        assert_eq!(board.next_card_id(10), CardId(5_001));
        assert_eq!(board.next_card_id(9_000), CardId(9_000));
    }

    #[test]
    fn test_delete_card_is_idempotent() {
        let (mut board, _, b, _) = abc_board();
        assert_eq!(board.delete_card(b).unwrap().text, "B");
        let after_first = board.clone();

        assert_eq!(board.delete_card(b), Err(BoardError::NotFound(b)));
        assert_eq!(board, after_first);
        assert_eq!(texts(&board, ColumnId::TODO), vec!["A", "C"]);
    }

    #[test]
    fn test_move_card_to_front_of_same_column() {
        let (mut board, _, b, _) = abc_board();
        board.move_card(b, ColumnId::TODO, 0).unwrap();
        assert_eq!(texts(&board, ColumnId::TODO), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_move_card_to_own_position_is_noop() {
        let (mut board, a, b, c) = abc_board();
        let before = board.clone();
        for (id, index) in [(a, 0), (b, 1), (c, 2)] {
            board.move_card(id, ColumnId::TODO, index).unwrap();
            assert_eq!(board, before);
        }
    }

    #[test]
    fn test_move_card_index_counts_without_moved_card() {
        let (mut board, a, _, _) = abc_board();
        // After removing A the column is [B, C]; index 1 lands between them.
        board.move_card(a, ColumnId::TODO, 1).unwrap();
        assert_eq!(texts(&board, ColumnId::TODO), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_move_card_clamps_index() {
        let (mut board, a, _, _) = abc_board();
        board.move_card(a, ColumnId::TODO, 99).unwrap();
        assert_eq!(texts(&board, ColumnId::TODO), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_move_card_into_empty_column() {
        let (mut board, _, b, _) = abc_board();
        board.move_card(b, ColumnId::IN_PROGRESS, 0).unwrap();
        assert_eq!(texts(&board, ColumnId::IN_PROGRESS), vec!["B"]);
        assert_eq!(texts(&board, ColumnId::TODO), vec!["A", "C"]);
    }

    #[test]
    fn test_move_card_to_invalid_column_keeps_card() {
        let (mut board, _, b, _) = abc_board();
        let before = board.clone();
        let result = board.move_card(b, ColumnId(99), 0);
        assert_eq!(result, Err(BoardError::InvalidTarget(ColumnId(99))));
        assert_eq!(board, before);
        assert_eq!(board.find_card(b), Some((ColumnId::TODO, 1)));
    }

    #[test]
    fn test_move_missing_card_is_noop() {
        let (mut board, _, _, _) = abc_board();
        let before = board.clone();
        assert_eq!(
            board.move_card(CardId(1), ColumnId::DONE, 0),
            Err(BoardError::NotFound(CardId(1)))
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_validate_rejects_duplicate_card_ids() {
        let mut board = Board::default();
        board.columns[0].cards.push(Card::new(CardId(7), "one"));
        board.columns[2].cards.push(Card::new(CardId(7), "two"));
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_column_ids() {
        let mut board = Board::default();
        board.columns[1].id = ColumnId::TODO;
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_validate_requires_the_fixed_columns() {
        assert!(Board::default().validate().is_ok());

        let mut board = Board::default();
        board.columns.clear();
        assert!(board.validate().is_err());

        let mut board = Board::default();
        board.columns.truncate(1);
        assert!(board.validate().is_err());

        let mut board = Board::default();
        board.columns.swap(0, 2);
        assert!(board.validate().is_err());

        let mut board = Board::default();
        board.columns[2].title = "SHIPPED".to_string();
        assert!(board.validate().is_err());

        let mut board = Board::default();
        board.columns.push(Column::new(ColumnId(4), "LATER"));
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_add_after_largest_possible_id() {
        let mut board = Board::default();
        board.columns[0].cards.push(Card::new(CardId(u64::MAX), "last"));
        board.columns[1].cards.push(Card::new(CardId(0), "zero"));

        let first = board.add_card(ColumnId::TODO, "next").unwrap();
        let second = board.add_card(ColumnId::TODO, "after").unwrap();

        assert_eq!(first, CardId(1));
        assert_eq!(second, CardId(2));
        assert!(board.validate().is_ok());
        assert_eq!(board.card_count(), 4);
    }
}
