//! Application state management for the terminal kanban board.
//!
//! This module contains the main application state, mode management and
//! the board actions every user gesture ends up in.

use crate::domain::{demo_board, now_millis, Board, BoardError, BoardResult, CardId, ColumnId};
use crate::infrastructure::{BoardRepository, MemoryStore};
use crate::presentation::{BoardView, ColumnScroll, DragController};

/// Represents the current mode of the application.
///
/// The mode decides how keyboard input is interpreted and which extra UI
/// elements are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Navigation mode - arrow keys move the selection, shortcuts available
    Normal,
    /// The inline add-card form is open on a column
    AddingCard { column: ColumnId },
    /// Help screen is displayed
    Help,
}

/// The board mutations user gestures are allowed to request.
///
/// Each request either changes the board and persists it, or fails and
/// leaves both untouched.
pub trait BoardActions {
    fn request_add(&mut self, column: ColumnId, text: &str) -> BoardResult<CardId>;

    fn request_delete(&mut self, card: CardId) -> BoardResult<()>;

    fn request_move(&mut self, card: CardId, column: ColumnId, index: usize) -> BoardResult<()>;
}

/// Single-line text buffer with a cursor counted in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    pub text: String,
    pub cursor: usize,
}

impl TextBuffer {
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let at = self.byte_offset(self.cursor - 1);
            self.text.remove(at);
            self.cursor -= 1;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_offset(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.char_count();
    }
}

/// Main application state: the board, where it is persisted, and the UI
/// state layered on top of it.
///
/// # Examples
///
/// ```
/// use trellol::application::{App, BoardActions};
/// use trellol::domain::ColumnId;
///
/// let mut app = App::default();
/// assert_eq!(app.board.card_count(), 24);
///
/// let id = app.request_add(ColumnId::DONE, "ship it").unwrap();
/// app.request_move(id, ColumnId::TODO, 0).unwrap();
/// assert_eq!(app.board.find_card(id), Some((ColumnId::TODO, 0)));
/// ```
pub struct App {
    /// The board being edited; only changed through [`BoardActions`]
    pub board: Board,
    repository: BoardRepository,
    /// Current application mode
    pub mode: AppMode,
    /// Add-card form input
    pub input: TextBuffer,
    /// Index of the selected column in `board.columns`
    pub selected_column: usize,
    /// Index of the selected card in the selected column
    pub selected_card: Option<usize>,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Scroll position in help text
    pub help_scroll: usize,
    pub drag: DragController,
    /// Per-column scroll position, settled by each render
    pub scroll: ColumnScroll,
    /// Geometry of the last rendered frame, used for mouse hit-testing
    pub view: BoardView,
    pub should_quit: bool,
}

impl Default for App {
    /// An app backed by an empty in-memory store, so it starts from the
    /// demo board.
    fn default() -> Self {
        Self::new(BoardRepository::new(MemoryStore::new()))
    }
}

impl App {
    /// Loads the persisted board, or seeds and persists the demo board when
    /// there is none (or it cannot be read).
    pub fn new(repository: BoardRepository) -> Self {
        let mut app = Self {
            board: Board::default(),
            repository,
            mode: AppMode::Normal,
            input: TextBuffer::default(),
            selected_column: 0,
            selected_card: None,
            status_message: None,
            help_scroll: 0,
            drag: DragController::new(),
            scroll: ColumnScroll::new(),
            view: BoardView::default(),
            should_quit: false,
        };

        match app.repository.load() {
            Some(board) => {
                tracing::info!(
                    "Loaded board with {} cards in {} columns",
                    board.card_count(),
                    board.columns.len()
                );
                app.board = board;
            }
            None => {
                tracing::info!("No saved board found, seeding demo board");
                app.board = demo_board(now_millis());
                app.persist();
            }
        }

        app.clamp_selection();
        app
    }

    /// Writes the board snapshot. A failure keeps the in-memory board and
    /// is reported on the status line.
    fn persist(&mut self) {
        if let Err(e) = self.repository.save(&self.board) {
            tracing::error!("Failed to save board: {}", e);
            self.status_message = Some(format!("Save failed: {}", e));
        }
    }

    pub fn selected_column_id(&self) -> Option<ColumnId> {
        self.board.columns.get(self.selected_column).map(|c| c.id)
    }

    pub fn selected_card_id(&self) -> Option<CardId> {
        let column = self.board.columns.get(self.selected_column)?;
        column.cards.get(self.selected_card?).map(|card| card.id)
    }

    /// Column the add form is open on, if any.
    pub fn form_column(&self) -> Option<ColumnId> {
        match self.mode {
            AppMode::AddingCard { column } => Some(column),
            _ => None,
        }
    }

    /// Keeps the selection pointing at an existing column and card.
    pub fn clamp_selection(&mut self) {
        if self.board.columns.is_empty() {
            self.selected_column = 0;
            self.selected_card = None;
            return;
        }

        self.selected_column = self.selected_column.min(self.board.columns.len() - 1);
        let len = self.board.columns[self.selected_column].cards.len();
        self.selected_card = match self.selected_card {
            _ if len == 0 => None,
            Some(index) => Some(index.min(len - 1)),
            None => None,
        };
    }

    pub fn select_card(&mut self, card: CardId) {
        if let Some((column, index)) = self.board.find_card(card)
            && let Some(column_index) = self.board.column_index(column)
        {
            self.selected_column = column_index;
            self.selected_card = Some(index);
        }
    }

    pub fn select_column(&mut self, column: ColumnId) {
        if let Some(column_index) = self.board.column_index(column) {
            if column_index != self.selected_column {
                self.selected_card = None;
            }
            self.selected_column = column_index;
            self.clamp_selection();
        }
    }

    pub fn select_previous_column(&mut self) {
        if self.selected_column > 0 {
            self.selected_column -= 1;
            self.selected_card = self.selected_card.map(|_| 0);
            self.clamp_selection();
        }
    }

    pub fn select_next_column(&mut self) {
        if self.selected_column + 1 < self.board.columns.len() {
            self.selected_column += 1;
            self.selected_card = self.selected_card.map(|_| 0);
            self.clamp_selection();
        }
    }

    pub fn select_previous_card(&mut self) {
        self.selected_card = match self.selected_card {
            Some(index) => Some(index.saturating_sub(1)),
            None => Some(0),
        };
        self.clamp_selection();
    }

    pub fn select_next_card(&mut self) {
        self.selected_card = match self.selected_card {
            Some(index) => Some(index + 1),
            None => Some(0),
        };
        self.clamp_selection();
    }

    /// Opens the add-card form on a column, discarding any half-typed text.
    pub fn start_add_card(&mut self, column: ColumnId) {
        if self.board.column(column).is_none() {
            return;
        }
        self.mode = AppMode::AddingCard { column };
        self.input.clear();
        self.status_message = None;
    }

    /// Confirms the add-card form. Blank text closes the form without
    /// adding anything.
    pub fn finish_add_card(&mut self) {
        let AppMode::AddingCard { column } = self.mode else {
            return;
        };

        let text = std::mem::take(&mut self.input.text);
        match self.request_add(column, &text) {
            Ok(id) => self.select_card(id),
            Err(e) => tracing::debug!("Add card ignored: {}", e),
        }

        self.cancel_add_card();
    }

    pub fn cancel_add_card(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
    }

    /// Deletes a card picked on screen or through the selection. A card
    /// that is already gone is ignored.
    pub fn delete_card(&mut self, card: CardId) {
        match self.request_delete(card) {
            Ok(()) => {}
            Err(BoardError::NotFound(_)) => self.clamp_selection(),
            Err(e) => tracing::warn!("Unexpected delete failure: {}", e),
        }
    }

    pub fn delete_selected_card(&mut self) {
        if let Some(card) = self.selected_card_id() {
            self.delete_card(card);
        }
    }

    /// Moves the selected card to the neighbouring column, keeping its
    /// index where possible.
    pub fn move_selected_card_horizontal(&mut self, delta: isize) {
        let (Some(card), Some(index)) = (self.selected_card_id(), self.selected_card) else {
            return;
        };
        let Some(target) = self
            .selected_column
            .checked_add_signed(delta)
            .and_then(|i| self.board.columns.get(i))
            .map(|c| c.id)
        else {
            return;
        };

        if self.request_move(card, target, index).is_ok() {
            self.select_card(card);
        }
    }

    /// Moves the selected card up or down within its column.
    pub fn move_selected_card_vertical(&mut self, delta: isize) {
        let (Some(card), Some(index), Some(column)) = (
            self.selected_card_id(),
            self.selected_card,
            self.selected_column_id(),
        ) else {
            return;
        };
        let Some(target_index) = index.checked_add_signed(delta) else {
            return;
        };

        if self.request_move(card, column, target_index).is_ok() {
            self.select_card(card);
        }
    }

    /// Scrolls a column by whole cards. A card selected in that column is
    /// deselected, since rendering keeps the selection in view.
    pub fn scroll_column(&mut self, column: ColumnId, delta: isize) {
        if self.selected_column_id() == Some(column) {
            self.selected_card = None;
        }
        self.scroll.scroll_by(column, delta);
    }

    pub fn toggle_help(&mut self) {
        self.mode = match self.mode {
            AppMode::Help => AppMode::Normal,
            _ => {
                self.help_scroll = 0;
                AppMode::Help
            }
        };
    }

    /// Keeps the highlight on the card it was on before a mutation. When
    /// that card is gone the selection stays at the same position.
    fn restore_selection(&mut self, previous: Option<CardId>) {
        match previous {
            Some(card) if self.board.card(card).is_some() => self.select_card(card),
            _ => self.clamp_selection(),
        }
    }

    fn card_label(&self, card: CardId) -> String {
        self.board
            .card(card)
            .map(|c| c.text.chars().take(24).collect())
            .unwrap_or_else(|| card.to_string())
    }
}

impl BoardActions for App {
    fn request_add(&mut self, column: ColumnId, text: &str) -> BoardResult<CardId> {
        let id = self.board.add_card(column, text)?;
        tracing::debug!("Added card {} to column {}", id, column);
        self.status_message = Some(format!("Added \"{}\"", self.card_label(id)));
        self.persist();
        Ok(id)
    }

    fn request_delete(&mut self, card: CardId) -> BoardResult<()> {
        let previous = self.selected_card_id();
        let removed = match self.board.delete_card(card) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::debug!("Delete ignored: {}", e);
                return Err(e);
            }
        };
        tracing::debug!("Deleted card {}", card);
        let label: String = removed.text.chars().take(24).collect();
        self.status_message = Some(format!("Deleted \"{}\"", label));
        self.persist();
        self.restore_selection(previous);
        Ok(())
    }

    fn request_move(&mut self, card: CardId, column: ColumnId, index: usize) -> BoardResult<()> {
        let previous = self.selected_card_id();
        if let Err(e) = self.board.move_card(card, column, index) {
            tracing::debug!("Move ignored: {}", e);
            if matches!(e, BoardError::InvalidTarget(_)) {
                self.status_message = Some(format!("Cannot move card: {}", e));
            }
            return Err(e);
        }
        tracing::debug!("Moved card {} to column {} at {}", card, column, index);
        self.status_message = Some(format!("Moved \"{}\"", self.card_label(card)));
        self.persist();
        self.restore_selection(previous);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Card;
    use crate::infrastructure::{FileStore, KeyValueStore, STATE_KEY};
    use tempfile::TempDir;

    fn texts(app: &App, column: ColumnId) -> Vec<String> {
        app.board
            .column(column)
            .unwrap()
            .cards
            .iter()
            .map(|card| card.text.clone())
            .collect()
    }

    fn empty_app() -> App {
        let mut app = App::default();
        for column in &mut app.board.columns {
            column.cards.clear();
        }
        app
    }

    #[test]
    fn test_app_default() {
        let app = App::default();
        assert!(matches!(app.mode, AppMode::Normal));
        assert_eq!(app.selected_column, 0);
        assert!(app.selected_card.is_none());
        assert!(app.status_message.is_none());
        assert!(!app.drag.is_active());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_fresh_start_seeds_and_persists_demo_board() {
        let temp_dir = TempDir::new().unwrap();
        let app = App::new(BoardRepository::new(FileStore::new(temp_dir.path())));

        let titles: Vec<&str> = app.board.columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["TODO", "IN PROGRESS", "DONE"]);
        assert_eq!(texts(&app, ColumnId::TODO)[0], "Welcome to Trellol");
        assert_eq!(app.board.card_count(), 24);

        let reopened = BoardRepository::new(FileStore::new(temp_dir.path()));
        assert_eq!(reopened.load(), Some(app.board.clone()));
    }

    #[test]
    fn test_startup_uses_persisted_board() {
        let temp_dir = TempDir::new().unwrap();
        let mut saved = Board::default();
        saved.columns[1].cards.push(Card::new(CardId(3), "persisted"));
        BoardRepository::new(FileStore::new(temp_dir.path())).save(&saved).unwrap();

        let app = App::new(BoardRepository::new(FileStore::new(temp_dir.path())));
        assert_eq!(app.board, saved);
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_demo_board() {
        let mut store = MemoryStore::new();
        store.set(STATE_KEY, "{ definitely not a board").unwrap();

        let app = App::new(BoardRepository::new(store));
        assert_eq!(app.board.card_count(), 24);
        assert_eq!(texts(&app, ColumnId::IN_PROGRESS).len(), 6);
    }

    #[test]
    fn test_snapshot_missing_columns_falls_back_to_demo_board() {
        let mut store = MemoryStore::new();
        store.set(STATE_KEY, r#"{"columns":[]}"#).unwrap();

        let mut app = App::new(BoardRepository::new(store));
        assert_eq!(app.board.columns.len(), 3);
        assert!(app.request_add(ColumnId::TODO, "x").is_ok());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = App::new(BoardRepository::new(FileStore::new(temp_dir.path())));
        let reload = || BoardRepository::new(FileStore::new(temp_dir.path())).load().unwrap();

        let id = app.request_add(ColumnId::DONE, "persist me").unwrap();
        assert_eq!(reload(), app.board);

        app.request_move(id, ColumnId::TODO, 0).unwrap();
        assert_eq!(reload(), app.board);

        app.request_delete(id).unwrap();
        assert_eq!(reload(), app.board);
        assert!(reload().card(id).is_none());
    }

    #[test]
    fn test_request_add_trims_and_rejects_blank() {
        let mut app = empty_app();
        assert_eq!(app.request_add(ColumnId::TODO, "   "), Err(BoardError::InvalidInput));
        assert_eq!(app.board.card_count(), 0);

        app.request_add(ColumnId::TODO, " hello ").unwrap();
        assert_eq!(texts(&app, ColumnId::TODO), vec!["hello"]);
    }

    #[test]
    fn test_request_delete_twice() {
        let mut app = App::default();
        let card = app.board.columns[0].cards[1].id;
        app.request_delete(card).unwrap();
        let after_first = app.board.clone();

        assert_eq!(app.request_delete(card), Err(BoardError::NotFound(card)));
        assert_eq!(app.board, after_first);
    }

    #[test]
    fn test_request_move_to_invalid_column_keeps_card() {
        let mut app = App::default();
        let before = app.board.clone();
        let card = app.board.columns[0].cards[2].id;

        let result = app.request_move(card, ColumnId(77), 0);
        assert_eq!(result, Err(BoardError::InvalidTarget(ColumnId(77))));
        assert_eq!(app.board, before);
        assert_eq!(app.board.find_card(card), Some((ColumnId::TODO, 2)));
    }

    #[test]
    fn test_add_card_form_flow() {
        let mut app = empty_app();
        app.start_add_card(ColumnId::IN_PROGRESS);
        assert_eq!(app.mode, AppMode::AddingCard { column: ColumnId::IN_PROGRESS });
        assert_eq!(app.form_column(), Some(ColumnId::IN_PROGRESS));

        for c in " new card ".chars() {
            app.input.insert(c);
        }
        app.finish_add_card();

        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.input.text.is_empty());
        assert_eq!(texts(&app, ColumnId::IN_PROGRESS), vec!["new card"]);
        assert_eq!(app.selected_column, 1);
        assert_eq!(app.selected_card, Some(0));
    }

    #[test]
    fn test_add_card_form_blank_closes_without_effect() {
        let mut app = empty_app();
        app.start_add_card(ColumnId::TODO);
        app.input.insert(' ');
        app.finish_add_card();

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.board.card_count(), 0);
    }

    #[test]
    fn test_cancel_add_card() {
        let mut app = empty_app();
        app.start_add_card(ColumnId::TODO);
        app.input.insert('x');
        app.cancel_add_card();

        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.input.text.is_empty());
        assert_eq!(app.board.card_count(), 0);
    }

    #[test]
    fn test_start_add_card_on_unknown_column() {
        let mut app = App::default();
        app.start_add_card(ColumnId(9));
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_keyboard_moves() {
        let mut app = empty_app();
        let a = app.request_add(ColumnId::TODO, "A").unwrap();
        app.request_add(ColumnId::TODO, "B").unwrap();
        app.select_card(a);

        app.move_selected_card_vertical(1);
        assert_eq!(texts(&app, ColumnId::TODO), vec!["B", "A"]);
        assert_eq!(app.selected_card, Some(1));

        app.move_selected_card_horizontal(1);
        assert_eq!(texts(&app, ColumnId::IN_PROGRESS), vec!["A"]);
        assert_eq!(app.selected_column, 1);
        assert_eq!(app.selected_card, Some(0));

        // Nothing to the left of the first column.
        app.selected_column = 0;
        app.selected_card = Some(0);
        app.move_selected_card_horizontal(-1);
        assert_eq!(texts(&app, ColumnId::TODO), vec!["B"]);

        // Nothing above the top card.
        app.move_selected_card_vertical(-1);
        assert_eq!(texts(&app, ColumnId::TODO), vec!["B"]);
    }

    #[test]
    fn test_selection_navigation() {
        let mut app = App::default();
        app.select_next_card();
        assert_eq!(app.selected_card, Some(0));
        app.select_previous_card();
        assert_eq!(app.selected_card, Some(0));

        for _ in 0..20 {
            app.select_next_card();
        }
        assert_eq!(app.selected_card, Some(9));

        app.select_next_column();
        assert_eq!(app.selected_column, 1);
        assert_eq!(app.selected_card, Some(0));

        app.select_next_column();
        app.select_next_column();
        assert_eq!(app.selected_column, 2);

        app.select_previous_column();
        assert_eq!(app.selected_column, 1);
    }

    #[test]
    fn test_delete_selected_card_clamps_selection() {
        let mut app = empty_app();
        app.request_add(ColumnId::TODO, "A").unwrap();
        let b = app.request_add(ColumnId::TODO, "B").unwrap();
        app.select_card(b);

        app.delete_selected_card();
        assert_eq!(texts(&app, ColumnId::TODO), vec!["A"]);
        assert_eq!(app.selected_card, Some(0));

        app.delete_selected_card();
        assert!(app.selected_card.is_none());
        app.delete_selected_card();
    }

    #[test]
    fn test_selection_follows_card_when_another_card_changes() {
        let mut app = empty_app();
        let a = app.request_add(ColumnId::TODO, "A").unwrap();
        let b = app.request_add(ColumnId::TODO, "B").unwrap();
        let c = app.request_add(ColumnId::TODO, "C").unwrap();

        app.select_card(c);
        app.request_delete(a).unwrap();
        assert_eq!(app.selected_card_id(), Some(c));
        assert_eq!(app.selected_card, Some(1));

        app.request_move(b, ColumnId::TODO, 5).unwrap();
        assert_eq!(app.selected_card_id(), Some(c));
        assert_eq!(app.selected_card, Some(0));

        app.request_move(b, ColumnId::DONE, 0).unwrap();
        assert_eq!(app.selected_card_id(), Some(c));
    }

    #[test]
    fn test_delete_card_already_gone() {
        let mut app = empty_app();
        let a = app.request_add(ColumnId::TODO, "A").unwrap();
        app.select_card(a);
        app.request_delete(a).unwrap();
        let before = app.board.clone();

        app.delete_card(a);
        assert_eq!(app.board, before);
        assert!(app.selected_card.is_none());
    }

    #[test]
    fn test_scroll_column_drops_selection_there() {
        let mut app = App::default();
        app.select_next_card();
        app.scroll_column(ColumnId::TODO, 2);
        assert!(app.selected_card.is_none());
        assert_eq!(app.scroll.offset(ColumnId::TODO), 2);

        app.select_next_card();
        app.scroll_column(ColumnId::DONE, 1);
        assert_eq!(app.selected_card, Some(0));
        app.scroll_column(ColumnId::DONE, -5);
        assert_eq!(app.scroll.offset(ColumnId::DONE), 0);
    }

    #[test]
    fn test_toggle_help() {
        let mut app = App::default();
        app.toggle_help();
        assert_eq!(app.mode, AppMode::Help);
        app.toggle_help();
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_text_buffer_is_char_indexed() {
        let mut buffer = TextBuffer::default();
        for c in "héllo".chars() {
            buffer.insert(c);
        }
        assert_eq!(buffer.cursor, 5);

        buffer.move_left();
        buffer.move_left();
        buffer.move_left();
        buffer.backspace();
        assert_eq!(buffer.text, "hllo");

        buffer.home();
        buffer.delete();
        assert_eq!(buffer.text, "llo");

        buffer.end();
        buffer.insert('☐');
        assert_eq!(buffer.text, "llo☐");
        assert_eq!(buffer.cursor, 4);
    }
}
