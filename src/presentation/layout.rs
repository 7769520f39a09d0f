//! Geometry of the rendered board.
//!
//! A [`BoardView`] is rebuilt from the board on every frame and is the only
//! thing mouse input is resolved against. It never outlives the next render.

use std::collections::HashMap;

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::domain::{Board, Card, CardId, Column, ColumnId};
use super::drag::DragPreview;

pub const ADD_CARD_LABEL: &str = "+ Add another card";
pub const CONFIRM_LABEL: &str = "[Add Card]";
pub const CANCEL_LABEL: &str = "[✗]";
pub const DELETE_GLYPH: &str = "×";

/// One card box inside a column panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: CardId,
    /// Position of the card in its board column.
    pub index: usize,
    pub area: Rect,
    pub delete_area: Rect,
    pub lines: Vec<String>,
    /// Set on the card being dragged; it is drawn but never hit.
    pub in_flight: bool,
}

/// The inline add-card form shown at the bottom of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddFormView {
    pub input: Rect,
    pub confirm: Rect,
    pub cancel: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub id: ColumnId,
    pub title: String,
    pub area: Rect,
    /// Drop surface: the panel inside its border.
    pub surface: Rect,
    pub cards: Vec<CardView>,
    /// Cards scrolled out above the first laid out card.
    pub offset: usize,
    /// Of those, the ones that are not being dragged.
    pub resting_above: usize,
    /// Cards that did not fit below the last laid out card.
    pub hidden: usize,
    pub add_button: Option<Rect>,
    pub form: Option<AddFormView>,
}

impl ColumnView {
    /// Laid out cards that take part in hit-testing and drop calculations.
    pub fn resting_cards(&self) -> impl Iterator<Item = &CardView> {
        self.cards.iter().filter(|card| !card.in_flight)
    }
}

/// How far each column is scrolled, in whole cards. Kept between frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnScroll {
    offsets: HashMap<ColumnId, usize>,
}

impl ColumnScroll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self, column: ColumnId) -> usize {
        self.offsets.get(&column).copied().unwrap_or(0)
    }

    pub fn scroll_by(&mut self, column: ColumnId, delta: isize) {
        let offset = self.offset(column).saturating_add_signed(delta);
        self.offsets.insert(column, offset);
    }

    /// Adopts the offsets a render settled on.
    pub fn sync(&mut self, view: &BoardView) {
        for column in &view.columns {
            self.offsets.insert(column.id, column.offset);
        }
    }
}

/// What sits under a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    DeleteCard(CardId),
    Card { card: CardId, column: ColumnId, index: usize },
    AddCard(ColumnId),
    FormInput(ColumnId),
    ConfirmAdd(ColumnId),
    CancelAdd(ColumnId),
    Column(ColumnId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    pub area: Rect,
    pub columns: Vec<ColumnView>,
}

impl BoardView {
    /// Lays out every column and card of `board` inside `area`.
    ///
    /// With a drag preview that has a target, the dragged card is placed at
    /// the target position instead of its board position. Without a target
    /// it stays where the board has it. Either way it is marked in flight.
    ///
    /// Each column starts at its `scroll` offset, moved as needed so the
    /// previewed card, or else the `selected` card, is fully visible.
    pub fn build(
        board: &Board,
        area: Rect,
        preview: Option<DragPreview>,
        form_column: Option<ColumnId>,
        scroll: &ColumnScroll,
        selected: Option<CardId>,
    ) -> Self {
        if board.columns.is_empty() {
            return Self { area, columns: Vec::new() };
        }

        let constraints: Vec<Constraint> = board
            .columns
            .iter()
            .map(|_| Constraint::Ratio(1, board.columns.len() as u32))
            .collect();
        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        let dragged = preview.map(|p| p.card);
        let target = preview.and_then(|p| p.target);

        let columns = board
            .columns
            .iter()
            .zip(panels.iter())
            .map(|(column, panel)| {
                // (card, board index, in flight)
                let mut order: Vec<(&Card, usize, bool)> = column
                    .cards
                    .iter()
                    .enumerate()
                    .filter(|(_, card)| target.is_none() || Some(card.id) != dragged)
                    .map(|(index, card)| (card, index, Some(card.id) == dragged))
                    .collect();

                if let (Some(target), Some(card_id)) = (target, dragged)
                    && target.column == column.id
                    && let Some((origin_column, origin_index)) = board.find_card(card_id)
                    && let Some(card) = board.column(origin_column).and_then(|c| c.cards.get(origin_index))
                {
                    let at = target.index.min(order.len());
                    order.insert(at, (card, origin_index, true));
                }

                let focus = order
                    .iter()
                    .position(|(_, _, in_flight)| *in_flight && target.is_some())
                    .or_else(|| order.iter().position(|(card, _, _)| Some(card.id) == selected));
                let with_form = form_column == Some(column.id);
                layout_column(column, *panel, &order, with_form, scroll.offset(column.id), focus)
            })
            .collect();

        Self { area, columns }
    }

    pub fn column(&self, id: ColumnId) -> Option<&ColumnView> {
        self.columns.iter().find(|column| column.id == id)
    }

    /// The column whose drop surface contains the position.
    pub fn column_at(&self, x: u16, y: u16) -> Option<&ColumnView> {
        self.columns
            .iter()
            .find(|column| contains(column.surface, x, y))
    }

    pub fn hit(&self, x: u16, y: u16) -> Option<Hit> {
        let column = self.columns.iter().find(|column| contains(column.area, x, y))?;

        if let Some(form) = column.form {
            if contains(form.confirm, x, y) {
                return Some(Hit::ConfirmAdd(column.id));
            }
            if contains(form.cancel, x, y) {
                return Some(Hit::CancelAdd(column.id));
            }
            if contains(form.input, x, y) {
                return Some(Hit::FormInput(column.id));
            }
        }

        if let Some(button) = column.add_button
            && contains(button, x, y)
        {
            return Some(Hit::AddCard(column.id));
        }

        for card in column.resting_cards() {
            if contains(card.delete_area, x, y) {
                return Some(Hit::DeleteCard(card.id));
            }
            if contains(card.area, x, y) {
                return Some(Hit::Card {
                    card: card.id,
                    column: column.id,
                    index: card.index,
                });
            }
        }

        Some(Hit::Column(column.id))
    }
}

fn layout_column(
    column: &Column,
    area: Rect,
    order: &[(&Card, usize, bool)],
    with_form: bool,
    requested_offset: usize,
    focus: Option<usize>,
) -> ColumnView {
    let surface = inner(area);
    let footer_height: u16 = if with_form { 2 } else { 1 };
    let footer_height = footer_height.min(surface.height);
    let cards_bottom = surface.y + surface.height - footer_height;

    let width = text_width(surface.width);
    let wrapped: Vec<Vec<String>> = order
        .iter()
        .map(|(card, _, _)| wrap_text(&card.text, width))
        .collect();
    let heights: Vec<u16> = wrapped
        .iter()
        .map(|lines| u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2))
        .collect();
    let offset = scroll_offset(&heights, cards_bottom - surface.y, requested_offset, focus);
    let resting_above = order
        .iter()
        .take(offset)
        .filter(|(_, _, in_flight)| !in_flight)
        .count();

    let mut cards = Vec::new();
    let mut cursor_y = surface.y;
    let mut hidden = 0;

    for (position, ((card, index, in_flight), lines)) in
        order.iter().zip(wrapped).enumerate().skip(offset)
    {
        let height = heights[position];
        if u32::from(cursor_y) + u32::from(height) > u32::from(cards_bottom) {
            hidden = order.len() - position;
            break;
        }

        let card_area = Rect::new(surface.x, cursor_y, surface.width, height);
        cards.push(CardView {
            id: card.id,
            index: *index,
            area: card_area,
            delete_area: delete_area(card_area),
            lines,
            in_flight: *in_flight,
        });
        cursor_y += height;
    }

    let footer_y = cards_bottom;
    let (add_button, form) = if footer_height == 0 {
        (None, None)
    } else if with_form {
        let input = Rect::new(surface.x, footer_y, surface.width, 1);
        let buttons_y = footer_y + footer_height - 1;
        let confirm_width = (CONFIRM_LABEL.chars().count() as u16).min(surface.width);
        let confirm = Rect::new(surface.x, buttons_y, confirm_width, 1);
        let cancel_x = (surface.x + confirm_width + 1).min(surface.x + surface.width);
        let cancel_width = (CANCEL_LABEL.chars().count() as u16)
            .min(surface.x + surface.width - cancel_x);
        let cancel = Rect::new(cancel_x, buttons_y, cancel_width, 1);
        (None, Some(AddFormView { input, confirm, cancel }))
    } else {
        (Some(Rect::new(surface.x, footer_y, surface.width, 1)), None)
    };

    ColumnView {
        id: column.id,
        title: column.title.clone(),
        area,
        surface,
        cards,
        offset,
        resting_above,
        hidden,
        add_button,
        form,
    }
}

/// First card to lay out: the requested offset, pulled back while the cards
/// after it would leave room unused, then moved so that `focus` fits.
fn scroll_offset(heights: &[u16], available: u16, requested: usize, focus: Option<usize>) -> usize {
    let fits = |cards: &[u16]| {
        cards.iter().map(|height| u32::from(*height)).sum::<u32>() <= u32::from(available)
    };

    let mut max_offset = heights.len();
    while max_offset > 0 && fits(&heights[max_offset - 1..]) {
        max_offset -= 1;
    }

    let mut offset = requested.min(max_offset);
    if let Some(focus) = focus {
        offset = offset.min(focus);
        while offset < focus && !fits(&heights[offset..=focus]) {
            offset += 1;
        }
    }
    offset
}

/// Width available for card text: card borders plus the delete control.
fn text_width(card_width: u16) -> usize {
    card_width.saturating_sub(4).max(1) as usize
}

fn delete_area(card: Rect) -> Rect {
    if card.width < 4 || card.height < 3 {
        return Rect::new(card.x, card.y, 0, 0);
    }
    Rect::new(card.x + card.width - 2, card.y + 1, 1, 1)
}

/// The area inside a one-cell border.
pub fn inner(area: Rect) -> Rect {
    if area.width < 2 || area.height < 2 {
        return Rect::new(area.x, area.y, 0, 0);
    }
    Rect::new(area.x + 1, area.y + 1, area.width - 2, area.height - 2)
}

pub fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x
        && y >= area.y
        && u32::from(x) < u32::from(area.x) + u32::from(area.width)
        && u32::from(y) < u32::from(area.y) + u32::from(area.height)
}

/// Greedy word wrap by character count. Words longer than a line are split.
/// Always returns at least one line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > width && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}
