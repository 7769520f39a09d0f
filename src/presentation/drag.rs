//! Mouse drag-and-drop of cards.
//!
//! The controller only ever reads the last rendered [`BoardView`]. While a
//! card is in flight it publishes a [`DragPreview`] that the next render
//! uses to draw the card at its would-be position; the board itself is only
//! changed by the [`MoveRequest`] produced on a valid drop.

use ratatui::layout::Rect;

use crate::domain::{CardId, ColumnId};
use super::layout::BoardView;

/// Where a dropped card would land. `index` counts positions in the target
/// column with the dragged card removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub column: ColumnId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragPreview {
    pub card: CardId,
    pub target: Option<DropTarget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub card: CardId,
    pub column: ColumnId,
    pub index: usize,
}

/// Result of releasing the mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Press and release without motion.
    Click(CardId),
    Drop(MoveRequest),
    /// The card was released outside every drop surface.
    Cancelled(CardId),
    /// No drag was under way.
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum DragPhase {
    #[default]
    Idle,
    Armed {
        card: CardId,
    },
    InFlight {
        card: CardId,
        target: Option<DropTarget>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    phase: DragPhase,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Button pressed on a card: the card becomes the drag payload and is
    /// marked in flight, but it does not leave its place until the pointer
    /// moves.
    pub fn press(&mut self, card: CardId) {
        self.phase = DragPhase::Armed { card };
    }

    /// Pointer moved with the button held. Returns the current insertion
    /// point, if the pointer is over a drop surface.
    pub fn drag_to(&mut self, view: &BoardView, x: u16, y: u16) -> Option<DropTarget> {
        let card = match self.phase {
            DragPhase::Idle => return None,
            DragPhase::Armed { card } => {
                tracing::debug!("Drag started for card {}", card);
                card
            }
            DragPhase::InFlight { card, .. } => card,
        };

        let target = drop_target(view, card, x, y);
        self.phase = DragPhase::InFlight { card, target };
        target
    }

    /// Button released. Ends the drag whatever the outcome.
    pub fn release(&mut self, view: &BoardView, x: u16, y: u16) -> Release {
        let phase = std::mem::take(&mut self.phase);
        match phase {
            DragPhase::Idle => Release::Ignored,
            DragPhase::Armed { card } => Release::Click(card),
            DragPhase::InFlight { card, .. } => match drop_target(view, card, x, y) {
                Some(target) => Release::Drop(MoveRequest {
                    card,
                    column: target.column,
                    index: target.index,
                }),
                None => Release::Cancelled(card),
            },
        }
    }

    /// Abandons any drag. Returns whether one was under way.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        self.phase = DragPhase::Idle;
        was_active
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, DragPhase::Idle)
    }

    /// The card being dragged and where it would land. An armed card is
    /// already marked but stays in place.
    pub fn preview(&self) -> Option<DragPreview> {
        match self.phase {
            DragPhase::Idle => None,
            DragPhase::Armed { card } => Some(DragPreview { card, target: None }),
            DragPhase::InFlight { card, target } => Some(DragPreview { card, target }),
        }
    }
}

/// Insertion point for `card` when the pointer is at (`x`, `y`).
///
/// Cards scrolled out above the column count towards the index. Below the
/// last laid out card the card goes right after it, which is the end of the
/// column only when nothing is hidden further down.
pub fn drop_target(view: &BoardView, card: CardId, x: u16, y: u16) -> Option<DropTarget> {
    let column = view.column_at(x, y)?;
    let resting: Vec<Rect> = column
        .resting_cards()
        .filter(|view| view.id != card)
        .map(|view| view.area)
        .collect();

    let index = insertion_index(&resting, y).unwrap_or(resting.len());
    Some(DropTarget {
        column: column.id,
        index: column.resting_above + index,
    })
}

/// Among cards laid out top to bottom, the one the dragged card goes in
/// front of: the card whose vertical midpoint is below the pointer with the
/// smallest distance. `None` means the end of the column.
pub fn insertion_index(cards: &[Rect], pointer_y: u16) -> Option<usize> {
    // Doubled coordinates keep midpoints integral.
    let pointer = i32::from(pointer_y) * 2;
    let mut closest: Option<(i32, usize)> = None;

    for (index, area) in cards.iter().enumerate() {
        let offset = pointer - (i32::from(area.y) * 2 + i32::from(area.height));
        if offset < 0 && closest.is_none_or(|(best, _)| offset > best) {
            closest = Some((offset, index));
        }
    }

    closest.map(|(_, index)| index)
}
