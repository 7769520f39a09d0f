use crate::application::{App, AppMode};
use crate::domain::CardId;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::layout::{
    inner, BoardView, CardView, ColumnView, ADD_CARD_LABEL, CANCEL_LABEL, CONFIRM_LABEL,
    DELETE_GLYPH,
};

const FORM_PLACEHOLDER: &str = "Enter a title for this card...";

/// Draws a full frame and keeps its geometry on `app` for hit-testing.
pub fn render_ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    let view = BoardView::build(
        &app.board,
        chunks[1],
        app.drag.preview(),
        app.form_column(),
        &app.scroll,
        app.selected_card_id(),
    );
    app.scroll.sync(&view);

    render_header(f, app, chunks[0]);
    render_board(f, app, &view);
    render_status_bar(f, app, chunks[2]);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }

    app.view = view;
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!(
        "trellol - Terminal Kanban | {} cards",
        app.board.card_count()
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_board(f: &mut Frame, app: &App, view: &BoardView) {
    let selected_column = app.selected_column_id();
    let selected_card = app.selected_card_id();

    for column in &view.columns {
        render_column(f, app, column, selected_column == Some(column.id), selected_card);
    }
}

fn render_column(
    f: &mut Frame,
    app: &App,
    column: &ColumnView,
    is_selected: bool,
    selected_card: Option<CardId>,
) {
    let title = column_title(column);
    let border_style = if is_selected {
        Style::default().fg(Color::LightBlue)
    } else {
        Style::default().fg(Color::Gray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style);
    f.render_widget(block, column.area);

    for card in &column.cards {
        render_card(f, card, selected_card == Some(card.id));
    }

    if let Some(button) = column.add_button {
        let add = Paragraph::new(ADD_CARD_LABEL).style(Style::default().fg(Color::DarkGray));
        f.render_widget(add, button);
    }

    if let Some(form) = column.form {
        render_form_input(f, app, form.input);

        let confirm = Paragraph::new(CONFIRM_LABEL)
            .style(Style::default().fg(Color::Black).bg(Color::Green));
        f.render_widget(confirm, form.confirm);

        let cancel = Paragraph::new(CANCEL_LABEL).style(Style::default().fg(Color::Red));
        f.render_widget(cancel, form.cancel);
    }
}

fn column_title(column: &ColumnView) -> String {
    match (column.offset, column.hidden) {
        (0, 0) => column.title.clone(),
        (0, below) => format!("{} (+{} below)", column.title, below),
        (above, 0) => format!("{} (+{} above)", column.title, above),
        (above, below) => format!("{} (+{} above, +{} below)", column.title, above, below),
    }
}

fn render_card(f: &mut Frame, card: &CardView, is_selected: bool) {
    let (border_style, text_style) = if card.in_flight {
        (
            Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM),
            Style::default().fg(Color::DarkGray),
        )
    } else if is_selected {
        (Style::default().fg(Color::Cyan), Style::default().add_modifier(Modifier::BOLD))
    } else {
        (Style::default().fg(Color::White), Style::default())
    };

    f.render_widget(Clear, card.area);
    let block = Block::default().borders(Borders::ALL).border_style(border_style);
    f.render_widget(block, card.area);

    let text_area = inner(card.area);
    let text_area = Rect {
        width: text_area.width.saturating_sub(2),
        ..text_area
    };
    let lines: Vec<Line> = card.lines.iter().map(|l| Line::from(l.as_str())).collect();
    f.render_widget(Paragraph::new(lines).style(text_style), text_area);

    if card.delete_area.width > 0 {
        let delete = Paragraph::new(DELETE_GLYPH).style(Style::default().fg(Color::Red));
        f.render_widget(delete, card.delete_area);
    }
}

fn render_form_input(f: &mut Frame, app: &App, area: Rect) {
    if area.width == 0 {
        return;
    }

    if app.input.text.is_empty() {
        let placeholder = Paragraph::new(FORM_PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray).bg(Color::Black));
        f.render_widget(placeholder, area);
        f.set_cursor_position((area.x, area.y));
        return;
    }

    // Scroll horizontally so the cursor stays visible.
    let width = area.width as usize;
    let start = app.input.cursor.saturating_sub(width - 1);
    let visible: String = app.input.text.chars().skip(start).take(width).collect();
    let input = Paragraph::new(visible).style(Style::default().fg(Color::Green).bg(Color::Black));
    f.render_widget(input, area);
    f.set_cursor_position((area.x + (app.input.cursor - start) as u16, area.y));
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else if app.drag.is_active() {
                "Dragging card | release over a column to drop | Esc: cancel".to_string()
            } else {
                "Drag cards with the mouse | a: add | d: delete | H/J/K/L: move | ?: help | q: quit"
                    .to_string()
            }
        }
        AppMode::AddingCard { .. } => "Adding card (Enter to add, Esc to cancel)".to_string(),
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::AddingCard { .. } => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
        });
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("trellol Help (Line {}/{})", start_line + 1, help_lines.len()))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"TRELLOL KEYS AND MOUSE

=== MOUSE ===
Drag a card          Move it; the card is previewed where it would land
Release outside      Cancel the drag, the card stays where it was
Click a card         Select it
Click ×              Delete the card
Click + Add...       Open the add-card form on that column
[Add Card] / [✗]     Confirm / cancel the form
Wheel                Scroll the column under the pointer

=== NAVIGATION ===
←→ or h/l            Select column
↑↓ or j/k            Select card
Esc                  Clear selection, or cancel a drag

=== EDITING ===
a / n / Enter        Add a card to the selected column
d / Delete           Delete the selected card
H / L                Move the selected card to the previous / next column
K / J                Move the selected card up / down
Shift+arrows         Same as H/J/K/L

=== ADD-CARD FORM ===
Enter                Add the card (blank text adds nothing)
Esc                  Cancel
←→ Home End          Move the cursor

=== OTHER ===
F1 or ?              Toggle this help
q                    Quit

The board is saved after every change."#;
