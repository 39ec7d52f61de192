//! Panel geometry, derived from the terminal size every frame.
//!
//! Sources take the left 30% at full height; the right side splits into
//! the news list (70%) over the summary panel. Overlays are centered.

use ratatui::layout::{Constraint, Layout, Rect};

pub struct Panels {
    pub sources: Rect,
    pub news: Rect,
    pub summary: Rect,
}

pub fn panels(area: Rect) -> Panels {
    let columns =
        Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)]).split(area);
    let right =
        Layout::vertical([Constraint::Percentage(70), Constraint::Percentage(30)]).split(columns[1]);
    Panels {
        sources: columns[0],
        news: right[0],
        summary: right[1],
    }
}

/// Centered overlay covering three quarters of the screen (content view).
pub fn content_overlay(area: Rect) -> Rect {
    Rect {
        x: area.x + area.width / 8,
        y: area.y + area.height / 8,
        width: area.width * 3 / 4,
        height: area.height * 3 / 4,
    }
}

/// Single-input-line overlay, centered vertically, two thirds wide.
pub fn prompt_overlay(area: Rect) -> Rect {
    Rect {
        x: area.x + area.width / 6,
        y: area.y + (area.height / 2).saturating_sub(1),
        width: area.width * 2 / 3,
        height: 3.min(area.height),
    }
}

/// Interior (columns, rows) of a bordered panel.
pub fn interior(area: Rect) -> (usize, usize) {
    (
        area.width.saturating_sub(2) as usize,
        area.height.saturating_sub(2) as usize,
    )
}
