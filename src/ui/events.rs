//! Application event handling.
//!
//! Workers spawned by the input layer report back through [`AppEvent`]s.
//! Every event carries the generation it was started under; results from a
//! superseded operation are dropped without touching the panels.

use anyhow::Result;
use tracing::{debug, warn};

use crate::app::{App, AppEvent, Overlay, PromptKind};
use crate::util::wrap;

pub async fn handle_app_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::FetchCompleted {
            source_name,
            generation,
            result,
        } => {
            if generation != app.news_generation {
                return Ok(());
            }
            match result {
                Ok(entries) => app.set_news(entries, &source_name),
                Err(e) => {
                    warn!(source = %source_name, error = %e, "Feed download failed");
                    app.news.reset();
                    app.news
                        .set_title(format!("Failed to load news from {}", source_name));
                }
            }
        }

        AppEvent::SearchMatch { generation, entry } => {
            if generation != app.news_generation {
                return Ok(());
            }
            let mut entry = *entry;
            let marked = app.bookmark_for(&entry).is_some();
            entry.bookmarked = marked;
            app.news.append_item(entry);
            app.search_hits += 1;
            app.news
                .set_title(format!("{} event(s) found so far...", app.search_hits));
        }

        AppEvent::SearchFinished { generation } => {
            if generation != app.news_generation {
                return Ok(());
            }
            if app.search_hits == 0 {
                app.news.set_title("No events found");
            } else {
                app.news
                    .set_title(format!("{} event(s) found", app.search_hits));
            }
        }

        AppEvent::SourceValidated {
            url,
            generation,
            result,
        } => {
            if generation != app.prompt_generation {
                return Ok(());
            }
            handle_source_validated(app, url, result).await?;
        }

        AppEvent::ContentLoaded {
            entry_title,
            generation,
            result,
        } => {
            if generation != app.content_generation {
                return Ok(());
            }
            let Some(Overlay::Content(list)) = &mut app.overlay else {
                return Ok(());
            };
            match result {
                Ok(paragraphs) => {
                    let width = list.viewport_width().saturating_sub(2).max(1);
                    let mut lines = vec![String::new()];
                    for paragraph in &paragraphs {
                        lines.extend(wrap(paragraph, width));
                        lines.push(String::new());
                    }
                    list.set_items(lines);
                    list.set_title(format!("{} (Ctrl-q to close)", entry_title));
                }
                Err(e) => {
                    debug!(error = %e, "Content download failed");
                    list.set_title("Failed to load content (Ctrl-q to close)");
                }
            }
        }
    }

    Ok(())
}

/// Completes (or rejects) a pending add-source prompt. The prompt stays open
/// with an updated title on validation failure or duplicate URL.
async fn handle_source_validated(
    app: &mut App,
    url: String,
    result: Result<String, crate::feed::FetchError>,
) -> Result<()> {
    {
        let Some(Overlay::Prompt(prompt)) = &mut app.overlay else {
            return Ok(());
        };
        if prompt.kind != PromptKind::AddSource {
            return Ok(());
        }
        prompt.busy = false;
    }

    let feed_title = match result {
        Ok(title) => title,
        Err(e) => {
            debug!(url = %url, error = %e, "URL validation failed");
            retitle_prompt(app, "Invalid URL, try again:");
            return Ok(());
        }
    };

    match app.db.get_source_by_url(&url).await {
        Ok(_) => {
            retitle_prompt(app, "Site already exists, try again:");
        }
        Err(e) if e.is_not_found() => {
            app.db.add_source(&feed_title, &url).await?;
            app.overlay = None;
            app.focus_sources();
            app.load_sources().await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn retitle_prompt(app: &mut App, title: &str) {
    if let Some(Overlay::Prompt(prompt)) = &mut app.overlay {
        prompt.title = title.to_string();
        prompt.input.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Prompt;
    use crate::config::Config;
    use crate::content::ContentError;
    use crate::feed::FetchError;
    use crate::storage::{Database, NewsEntry};
    use crate::ui::PagedList;

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        let mut app = App::new(db, Config::default()).unwrap();
        app.news.set_viewport(40, 5);
        app
    }

    fn entry(url: &str, title: &str) -> NewsEntry {
        NewsEntry {
            id: 0,
            title: title.to_string(),
            author: "Author".to_string(),
            url: url.to_string(),
            summary: String::new(),
            published_at: None,
            bookmarked: false,
        }
    }

    #[tokio::test]
    async fn test_fetch_success_populates_news() {
        let mut app = test_app().await;
        let generation = app.next_news_generation();

        handle_app_event(
            &mut app,
            AppEvent::FetchCompleted {
                source_name: "BBC".to_string(),
                generation,
                result: Ok(vec![entry("http://bbc.test/1", "One")]),
            },
        )
        .await
        .unwrap();

        assert_eq!(app.news.title(), "News from BBC");
        assert_eq!(app.news.current_item().unwrap().title, "One");
    }

    #[tokio::test]
    async fn test_fetch_failure_clears_news_and_sets_error_title() {
        let mut app = test_app().await;
        app.set_news(vec![entry("http://bbc.test/1", "Old")], "BBC");
        let generation = app.next_news_generation();

        handle_app_event(
            &mut app,
            AppEvent::FetchCompleted {
                source_name: "BBC".to_string(),
                generation,
                result: Err(FetchError::HttpStatus(500)),
            },
        )
        .await
        .unwrap();

        assert_eq!(app.news.title(), "Failed to load news from BBC");
        assert!(app.news.is_empty());
    }

    #[tokio::test]
    async fn test_stale_fetch_result_is_dropped() {
        let mut app = test_app().await;
        let stale = app.next_news_generation();
        app.next_news_generation();

        handle_app_event(
            &mut app,
            AppEvent::FetchCompleted {
                source_name: "BBC".to_string(),
                generation: stale,
                result: Ok(vec![entry("http://bbc.test/1", "One")]),
            },
        )
        .await
        .unwrap();

        assert!(app.news.is_empty());
    }

    #[tokio::test]
    async fn test_search_stream_counts_and_finalizes_title() {
        let mut app = test_app().await;
        let generation = app.next_news_generation();
        app.search_hits = 0;

        for (i, url) in ["http://a.test/1", "http://a.test/2"].iter().enumerate() {
            handle_app_event(
                &mut app,
                AppEvent::SearchMatch {
                    generation,
                    entry: Box::new(entry(url, &format!("Hit {}", i))),
                },
            )
            .await
            .unwrap();
        }
        assert_eq!(app.news.title(), "2 event(s) found so far...");
        assert_eq!(app.news.len(), 2);

        handle_app_event(&mut app, AppEvent::SearchFinished { generation })
            .await
            .unwrap();
        assert_eq!(app.news.title(), "2 event(s) found");
    }

    fn content_lines(app: &mut App) -> Vec<String> {
        let Some(Overlay::Content(list)) = &mut app.overlay else {
            panic!("content overlay missing");
        };
        let mut lines = Vec::new();
        for _ in 0..list.len() {
            lines.push(list.current_item().unwrap().clone());
            list.move_down();
        }
        lines
    }

    #[tokio::test]
    async fn test_stale_source_validation_is_dropped() {
        let mut app = test_app().await;

        // a validation was started, then its prompt was dismissed
        let stale = app.next_prompt_generation();
        app.next_prompt_generation();

        // a fresh, never-submitted prompt is open when the result lands
        app.overlay = Some(Overlay::Prompt(Prompt::new(
            PromptKind::AddSource,
            "New site URL:",
        )));

        handle_app_event(
            &mut app,
            AppEvent::SourceValidated {
                url: "http://old.example/feed".to_string(),
                generation: stale,
                result: Ok("Old Feed".to_string()),
            },
        )
        .await
        .unwrap();

        // the abandoned url is not persisted and the new prompt survives
        assert!(app.db.get_sources().await.unwrap().is_empty());
        match &app.overlay {
            Some(Overlay::Prompt(prompt)) => {
                assert_eq!(prompt.title, "New site URL:");
                assert!(!prompt.busy);
            }
            _ => panic!("prompt overlay was closed"),
        }
    }

    #[tokio::test]
    async fn test_current_validation_adds_source_and_closes_prompt() {
        let mut app = test_app().await;
        app.sources.set_viewport(40, 5);

        let mut prompt = Prompt::new(PromptKind::AddSource, "New site URL:");
        prompt.busy = true;
        app.overlay = Some(Overlay::Prompt(prompt));
        let generation = app.next_prompt_generation();

        handle_app_event(
            &mut app,
            AppEvent::SourceValidated {
                url: "http://new.example/feed".to_string(),
                generation,
                result: Ok("New Feed".to_string()),
            },
        )
        .await
        .unwrap();

        assert!(app.overlay.is_none());
        let sources = app.db.get_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "New Feed");
        assert_eq!(app.sources.current_item().unwrap().name, "New Feed");
    }

    #[tokio::test]
    async fn test_content_lines_are_blank_separated_wrapped_paragraphs() {
        let mut app = test_app().await;

        let mut list: PagedList<String> = PagedList::new(false);
        list.set_viewport(12, 5);
        list.set_title("Fetching... (Ctrl-q to close)");
        app.overlay = Some(Overlay::Content(list));
        let generation = app.next_content_generation();

        handle_app_event(
            &mut app,
            AppEvent::ContentLoaded {
                entry_title: "Story".to_string(),
                generation,
                result: Ok(vec!["alpha beta gamma".to_string(), "delta".to_string()]),
            },
        )
        .await
        .unwrap();

        // paragraphs wrap at interior width minus margin (12 - 2 = 10)
        assert_eq!(
            content_lines(&mut app),
            vec!["", "alpha", "beta", "gamma", "", "delta", ""]
        );
        let Some(Overlay::Content(list)) = &app.overlay else {
            panic!("content overlay missing");
        };
        assert_eq!(list.title(), "Story (Ctrl-q to close)");
    }

    #[tokio::test]
    async fn test_content_failure_sets_error_title() {
        let mut app = test_app().await;

        let mut list: PagedList<String> = PagedList::new(false);
        list.set_viewport(12, 5);
        app.overlay = Some(Overlay::Content(list));
        let generation = app.next_content_generation();

        handle_app_event(
            &mut app,
            AppEvent::ContentLoaded {
                entry_title: "Story".to_string(),
                generation,
                result: Err(ContentError::HttpStatus(500)),
            },
        )
        .await
        .unwrap();

        let Some(Overlay::Content(list)) = &app.overlay else {
            panic!("content overlay missing");
        };
        assert!(list.is_empty());
        assert_eq!(list.title(), "Failed to load content (Ctrl-q to close)");
    }

    #[tokio::test]
    async fn test_stale_content_result_is_dropped() {
        let mut app = test_app().await;

        let mut list: PagedList<String> = PagedList::new(false);
        list.set_viewport(12, 5);
        list.set_title("Fetching... (Ctrl-q to close)");
        app.overlay = Some(Overlay::Content(list));
        let stale = app.next_content_generation();
        app.next_content_generation();

        handle_app_event(
            &mut app,
            AppEvent::ContentLoaded {
                entry_title: "Story".to_string(),
                generation: stale,
                result: Ok(vec!["text".to_string()]),
            },
        )
        .await
        .unwrap();

        let Some(Overlay::Content(list)) = &app.overlay else {
            panic!("content overlay missing");
        };
        assert!(list.is_empty());
        assert_eq!(list.title(), "Fetching... (Ctrl-q to close)");
    }

    #[tokio::test]
    async fn test_empty_search_finishes_with_no_events_title() {
        let mut app = test_app().await;
        let generation = app.next_news_generation();
        app.search_hits = 0;

        handle_app_event(&mut app, AppEvent::SearchFinished { generation })
            .await
            .unwrap();
        assert_eq!(app.news.title(), "No events found");
    }
}
