//! Keyboard input handling.
//!
//! Keys are dispatched in three layers: an active overlay captures input
//! exclusively; then global bindings (quit, focus switch, prompts,
//! bookmarks view); then bindings scoped to the focused panel.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use crate::app::{App, AppEvent, Focus, Overlay, Prompt, PromptKind};
use crate::content::fetch_paragraphs;
use crate::feed::{fetch_feed, search};
use crate::storage::Source;
use crate::ui::PagedList;

use super::loop_runner::Action;

pub async fn handle_input(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);

    if ctrl && key == KeyCode::Char('c') {
        return Ok(Action::Quit);
    }

    if app.overlay.is_some() {
        handle_overlay_key(app, key, modifiers, event_tx).await?;
        return Ok(Action::Continue);
    }

    match key {
        KeyCode::Tab => match app.focus {
            Focus::Sources => app.focus_news(),
            Focus::News => app.focus_sources(),
        },
        KeyCode::Char('n') if ctrl => {
            app.overlay = Some(Overlay::Prompt(Prompt::new(
                PromptKind::AddSource,
                "New site URL:",
            )));
        }
        KeyCode::Char('f') if ctrl => {
            app.overlay = Some(Overlay::Prompt(Prompt::new(
                PromptKind::Search,
                "Search with multiple terms:",
            )));
        }
        // Alt-Ctrl-B before plain Ctrl-B
        KeyCode::Char('b') if ctrl && alt => load_bookmarks(app).await?,
        KeyCode::Char('b') if ctrl => {
            if app.focus == Focus::News {
                toggle_bookmark(app).await;
            }
        }
        KeyCode::Char('o') if ctrl => {
            if app.focus == Focus::News {
                open_content(app, event_tx);
            }
        }
        KeyCode::Char('o') if !ctrl && !alt => {
            if app.focus == Focus::News {
                open_in_browser(app);
            }
        }
        KeyCode::Enter => {
            if app.focus == Focus::Sources {
                if let Some(source) = app.sources.current_item().cloned() {
                    start_fetch(app, source, event_tx);
                }
            }
        }
        KeyCode::Delete => delete_entry(app).await?,
        KeyCode::Up | KeyCode::Down | KeyCode::PageUp | KeyCode::PageDown => match app.focus {
            Focus::Sources => navigate(&mut app.sources, key),
            Focus::News => navigate(&mut app.news, key),
        },
        _ => {}
    }

    Ok(Action::Continue)
}

fn navigate<T: crate::ui::RowItem>(list: &mut PagedList<T>, key: KeyCode) {
    match key {
        KeyCode::Up => list.move_up(),
        KeyCode::Down => list.move_down(),
        KeyCode::PageUp => list.move_page_up(),
        KeyCode::PageDown => list.move_page_down(),
        _ => {}
    }
}

// ============================================================================
// Overlay input
// ============================================================================

async fn handle_overlay_key(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<()> {
    // dismissal first: Esc or Ctrl-Q pops back to the remembered panel
    if key == KeyCode::Esc
        || (key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL))
    {
        match app.overlay.take() {
            Some(Overlay::Prompt(_)) => {
                // invalidate any in-flight url validation
                app.next_prompt_generation();
                app.focus_sources();
            }
            Some(Overlay::Content(_)) => {
                // invalidate any in-flight paragraph fetch
                app.next_content_generation();
                app.focus_news();
            }
            None => {}
        }
        return Ok(());
    }

    match &mut app.overlay {
        Some(Overlay::Content(list)) => navigate(list, key),
        Some(Overlay::Prompt(prompt)) => {
            if prompt.busy {
                return Ok(());
            }
            match key {
                KeyCode::Backspace => {
                    prompt.input.pop();
                }
                KeyCode::Char(c)
                    if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    prompt.input.push(c);
                }
                KeyCode::Enter => {
                    let kind = prompt.kind;
                    let input = prompt.input.trim().to_string();
                    submit_prompt(app, kind, input, event_tx);
                }
                _ => {}
            }
        }
        None => {}
    }

    Ok(())
}

fn submit_prompt(
    app: &mut App,
    kind: PromptKind,
    input: String,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match kind {
        PromptKind::AddSource => {
            if input.is_empty() {
                return;
            }
            if let Some(Overlay::Prompt(prompt)) = &mut app.overlay {
                prompt.busy = true;
                prompt.title = "Validating URL...".to_string();
            }
            let generation = app.next_prompt_generation();
            let client = app.client.clone();
            let tx = event_tx.clone();
            tokio::spawn(async move {
                let result = fetch_feed(&client, &input).await.map(|feed| feed.title);
                let _ = tx
                    .send(AppEvent::SourceValidated {
                        url: input,
                        generation,
                        result,
                    })
                    .await;
            });
        }
        PromptKind::Search => {
            app.overlay = None;
            if input.is_empty() {
                app.focus_sources();
                return;
            }
            let terms: Vec<String> = input.split_whitespace().map(str::to_string).collect();
            start_search(app, terms, event_tx);
        }
    }
}

// ============================================================================
// Long-running operations (spawned; results come back as AppEvents)
// ============================================================================

/// Kicks off a single-source download. The news panel shows a placeholder
/// title until the worker's result arrives.
fn start_fetch(app: &mut App, source: Source, event_tx: &mpsc::Sender<AppEvent>) {
    app.viewing_bookmarks = false;
    app.focus_news();
    app.news.reset();
    app.news.set_title("Downloading...");

    let generation = app.next_news_generation();
    let client = app.client.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let result = fetch_feed(&client, &source.url).await.map(|feed| feed.entries);
        let _ = tx
            .send(AppEvent::FetchCompleted {
                source_name: source.name,
                generation,
                result,
            })
            .await;
    });
}

fn start_search(app: &mut App, terms: Vec<String>, event_tx: &mpsc::Sender<AppEvent>) {
    app.viewing_bookmarks = false;
    app.focus_news();
    app.news.reset();
    app.news.set_title("Searching...");
    app.search_hits = 0;

    let generation = app.next_news_generation();
    tokio::spawn(search::run(
        app.db.clone(),
        app.client.clone(),
        terms,
        generation,
        event_tx.clone(),
    ));
}

/// Opens the content overlay and fetches paragraphs for the current entry.
fn open_content(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(entry) = app.news.current_item().cloned() else {
        return;
    };

    let mut list: PagedList<String> = PagedList::new(false);
    list.set_title("Fetching... (Ctrl-q to close)");
    list.focus();
    app.overlay = Some(Overlay::Content(list));

    let generation = app.next_content_generation();
    let client = app.client.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let result = fetch_paragraphs(&client, &entry.url).await;
        let _ = tx
            .send(AppEvent::ContentLoaded {
                entry_title: entry.title,
                generation,
                result,
            })
            .await;
    });
}

// ============================================================================
// Short synchronous-ish operations (awaited inline on the UI loop)
// ============================================================================

/// Toggles the bookmark on the entry under the cursor. Store failures on
/// this write path are logged, never fatal.
async fn toggle_bookmark(app: &mut App) {
    let Some(entry) = app.news.current_item().cloned() else {
        return;
    };
    let existing_id = app.bookmark_for(&entry).map(|b| b.id);

    let mut updated = entry.clone();
    match existing_id {
        Some(id) => {
            match app.db.delete_bookmark(id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    tracing::warn!(id, "Bookmark vanished before delete");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to delete bookmark");
                    return;
                }
            }
            updated.id = 0;
            updated.bookmarked = false;
        }
        None => match app.db.add_bookmark(&entry).await {
            Ok(id) => {
                updated.id = id;
                updated.bookmarked = true;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to add bookmark");
                return;
            }
        },
    }

    if let Err(e) = app.refresh_bookmarks().await {
        tracing::error!(error = %e, "Failed to refresh bookmark cache");
    }
    app.news.update_current_item(updated);
}

/// Loads the bookmark view into the news panel.
async fn load_bookmarks(app: &mut App) -> Result<()> {
    app.refresh_bookmarks().await?;
    app.viewing_bookmarks = true;
    app.next_news_generation();
    app.focus_news();
    let bookmarks = app.bookmarks.clone();
    app.set_news(bookmarks, "My bookmarks");
    Ok(())
}

/// Delete under the cursor: a source, or a bookmarked entry when the news
/// panel shows the bookmark view.
async fn delete_entry(app: &mut App) -> Result<()> {
    match app.focus {
        Focus::Sources => {
            let Some(source) = app.sources.current_item().cloned() else {
                return Ok(());
            };
            let not_found = match app.db.delete_source(source.id).await {
                Ok(()) => None,
                Err(e) if e.is_not_found() => Some(e.to_string()),
                Err(e) => return Err(e.into()),
            };
            app.load_sources().await?;
            if let Some(message) = not_found {
                // the stale row is gone after the reload; tell the user why
                app.sources.set_title(message);
            }
        }
        Focus::News if app.viewing_bookmarks => {
            let Some(entry) = app.news.current_item().cloned() else {
                return Ok(());
            };
            match app.db.delete_bookmark(entry.id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    tracing::warn!(id = entry.id, "Bookmark vanished before delete");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to delete bookmark");
                    return Ok(());
                }
            }
            load_bookmarks(app).await?;
        }
        Focus::News => {}
    }
    Ok(())
}

fn open_in_browser(app: &App) {
    if let Some(entry) = app.news.current_item() {
        if let Err(e) = open::that(&entry.url) {
            tracing::error!(url = %entry.url, error = %e, "Failed to open browser");
        }
    }
}
