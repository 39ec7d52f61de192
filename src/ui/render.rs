//! Frame rendering: the two list panels, the summary panel, and any
//! active overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, Overlay};
use crate::util::{display_width, wrap};

use super::layout;

pub fn render(f: &mut Frame, app: &App) {
    let panels = layout::panels(f.area());
    app.sources.render(f, panels.sources);
    app.news.render(f, panels.news);
    render_summary(f, app, panels.summary);

    match &app.overlay {
        Some(Overlay::Content(list)) => {
            let area = layout::content_overlay(f.area());
            f.render_widget(Clear, area);
            list.render(f, area);
        }
        Some(Overlay::Prompt(prompt)) => {
            let area = layout::prompt_overlay(f.area());
            f.render_widget(Clear, area);
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!("{} (Ctrl-q to close)", prompt.title));
            f.render_widget(Paragraph::new(prompt.input.as_str()).block(block), area);
            // place the terminal cursor after the typed text
            let x = area.x + 1 + display_width(&prompt.input) as u16;
            f.set_cursor_position((x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
        }
        None => {}
    }
}

/// Author / published / url header plus the word-wrapped summary of the
/// entry under the news cursor.
fn render_summary(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Summary");
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(entry) = app.news.current_item() {
        let published = entry
            .published_at
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%a, %d %b %Y %H:%M UTC").to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        lines.push(Line::default());
        lines.push(Line::from(vec![
            Span::styled(" By: ", bold),
            Span::raw(entry.author.clone()),
        ]));
        lines.push(Line::from(vec![
            Span::styled(" Published on: ", bold),
            Span::raw(published),
        ]));
        lines.push(Line::from(vec![
            Span::styled(" URL: ", bold),
            Span::raw(entry.url.clone()),
        ]));
        lines.push(Line::default());

        let (width, _) = layout::interior(area);
        for l in wrap(&entry.summary, width.saturating_sub(2).max(1)) {
            lines.push(Line::from(Span::styled(format!(" {}", l), bold)));
        }
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}
