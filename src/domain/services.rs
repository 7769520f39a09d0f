//! Board construction services: the wall clock used for card ids and the
//! demo content shown on first run.

use std::time::{SystemTime, UNIX_EPOCH};

use super::models::{Board, Card, CardId, ColumnId};

/// Milliseconds since the Unix epoch, or zero if the clock is before it.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

const DEMO_TODO: [&str; 10] = [
    "Welcome to Trellol",
    "This is a card.",
    "Click on a card to see what's behind it.",
    "- 💬 1",
    "- 💬 2",
    "You can attach pictures and files...",
    "... any kind of hyperlink ...",
    "- 💬 1",
    "... or checklists.",
    "- 💬 1/3",
];

const DEMO_IN_PROGRESS: [&str; 6] = [
    "Invite your team to this board using the Add Members button",
    "Drag people onto a card to indicate that they're responsible for it.",
    "Use color-coded labels for organization",
    "Make as many lists as you need!",
    "Try dragging cards anywhere.",
    "Finished with a card? Archive it.",
];

const DEMO_DONE: [&str; 8] = [
    "To learn more tricks, check out the guide.",
    "Use as many boards as you want. We'll make more!",
    "Want to use keyboard shortcuts? We have them!",
    "Want updates on new features?",
    "Need help?",
    "☐",
    "Want current tips, usage examples, or API info?",
    "☐",
];

/// Builds the first-run board.
///
/// Texts are fixed; ids are `base + 1` through `base + 24` in reading order.
///
/// # Examples
///
/// ```
/// use trellol::domain::{demo_board, ColumnId};
///
/// let board = demo_board(1_000);
/// assert_eq!(board.card_count(), 24);
/// assert_eq!(board.column(ColumnId::TODO).unwrap().cards[0].text, "Welcome to Trellol");
/// ```
pub fn demo_board(base: u64) -> Board {
    let mut board = Board::default();
    let mut next = base;

    for (column_id, texts) in [
        (ColumnId::TODO, &DEMO_TODO[..]),
        (ColumnId::IN_PROGRESS, &DEMO_IN_PROGRESS[..]),
        (ColumnId::DONE, &DEMO_DONE[..]),
    ] {
        if let Some(column) = board.columns.iter_mut().find(|c| c.id == column_id) {
            column.cards = texts
                .iter()
                .map(|text| {
                    next += 1;
                    Card::new(CardId(next), *text)
                })
                .collect();
        }
    }

    board
}
