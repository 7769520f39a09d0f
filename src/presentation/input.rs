use crate::application::{App, AppMode, BoardActions};
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::drag::Release;
use super::layout::Hit;

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Esc && app.drag.cancel() {
            tracing::debug!("Drag cancelled from keyboard");
            return;
        }

        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::AddingCard { .. } => Self::handle_adding_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        let is_shift = modifiers.contains(KeyModifiers::SHIFT);
        app.status_message = None;

        match key {
            KeyCode::Char('q') => {
                app.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('h') if is_shift => app.move_selected_card_horizontal(-1),
            KeyCode::Right | KeyCode::Char('l') if is_shift => app.move_selected_card_horizontal(1),
            KeyCode::Up | KeyCode::Char('k') if is_shift => app.move_selected_card_vertical(-1),
            KeyCode::Down | KeyCode::Char('j') if is_shift => app.move_selected_card_vertical(1),
            KeyCode::Char('H') => app.move_selected_card_horizontal(-1),
            KeyCode::Char('L') => app.move_selected_card_horizontal(1),
            KeyCode::Char('K') => app.move_selected_card_vertical(-1),
            KeyCode::Char('J') => app.move_selected_card_vertical(1),
            KeyCode::Left | KeyCode::Char('h') => app.select_previous_column(),
            KeyCode::Right | KeyCode::Char('l') => app.select_next_column(),
            KeyCode::Up | KeyCode::Char('k') => app.select_previous_card(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next_card(),
            KeyCode::Char('a') | KeyCode::Char('n') | KeyCode::Enter => {
                if let Some(column) = app.selected_column_id() {
                    app.start_add_card(column);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => {
                app.delete_selected_card();
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.toggle_help();
            }
            KeyCode::Esc => {
                app.selected_card = None;
            }
            _ => {}
        }
    }

    fn handle_adding_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.finish_add_card(),
            KeyCode::Esc => app.cancel_add_card(),
            KeyCode::Backspace => app.input.backspace(),
            KeyCode::Delete => app.input.delete(),
            KeyCode::Left => app.input.move_left(),
            KeyCode::Right => app.input.move_right(),
            KeyCode::Home => app.input.home(),
            KeyCode::End => app.input.end(),
            KeyCode::Char(c) => app.input.insert(c),
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    /// Resolves a mouse event against the last rendered view.
    pub fn handle_mouse_event(app: &mut App, event: MouseEvent) {
        let (x, y) = (event.column, event.row);

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => Self::handle_press(app, x, y),
            MouseEventKind::Drag(MouseButton::Left) => {
                app.drag.drag_to(&app.view, x, y);
            }
            MouseEventKind::Up(MouseButton::Left) => Self::handle_release(app, x, y),
            MouseEventKind::ScrollDown => Self::handle_wheel(app, x, y, 1),
            MouseEventKind::ScrollUp => Self::handle_wheel(app, x, y, -1),
            _ => {}
        }
    }

    fn handle_wheel(app: &mut App, x: u16, y: u16, delta: isize) {
        if app.drag.is_active() {
            return;
        }
        if let Some(column) = app.view.column_at(x, y).map(|column| column.id) {
            app.scroll_column(column, delta);
        }
    }

    /// The terminal lost focus; a drag cannot complete without the release.
    pub fn handle_focus_lost(app: &mut App) {
        if app.drag.cancel() {
            tracing::debug!("Drag cancelled on focus loss");
        }
    }

    fn handle_press(app: &mut App, x: u16, y: u16) {
        if app.mode == AppMode::Help {
            app.mode = AppMode::Normal;
            return;
        }

        let Some(hit) = app.view.hit(x, y) else {
            return;
        };

        match hit {
            Hit::DeleteCard(card) => app.delete_card(card),
            Hit::Card { card, .. } => app.drag.press(card),
            Hit::AddCard(column) => app.start_add_card(column),
            Hit::ConfirmAdd(_) => app.finish_add_card(),
            Hit::CancelAdd(_) => app.cancel_add_card(),
            Hit::FormInput(_) => {}
            Hit::Column(column) => app.select_column(column),
        }
    }

    fn handle_release(app: &mut App, x: u16, y: u16) {
        match app.drag.release(&app.view, x, y) {
            Release::Click(card) => app.select_card(card),
            Release::Drop(request) => {
                if app.request_move(request.card, request.column, request.index).is_ok() {
                    app.select_card(request.card);
                }
            }
            Release::Cancelled(card) => {
                tracing::debug!("Drop of card {} outside any column", card);
            }
            Release::Ignored => {}
        }
    }
}
