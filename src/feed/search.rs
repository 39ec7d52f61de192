//! Multi-term search across every registered source.
//!
//! The search runs as one background task that fetches each source in
//! turn and streams matching entries back to the UI loop as they are
//! found, so results appear incrementally. A source whose fetch fails is
//! skipped; per-source entry order is preserved, cross-source order is
//! arrival order.

use std::collections::HashSet;

use tokio::sync::mpsc;

use crate::app::AppEvent;
use crate::feed::fetch_feed;
use crate::storage::{Database, NewsEntry};

/// True iff every term occurs, case-insensitively, in the entry's title
/// or summary (conjunctive AND; a term may match in either field).
pub fn matches_terms(terms: &[String], entry: &NewsEntry) -> bool {
    let title = entry.title.to_lowercase();
    let summary = entry.summary.to_lowercase();
    terms.iter().all(|term| {
        let t = term.to_lowercase();
        title.contains(&t) || summary.contains(&t)
    })
}

/// Fetches every source and emits matching entries as `AppEvent`s.
///
/// Entries are deduplicated by url within one search. `generation` lets
/// the UI loop discard events from a superseded search. Always closes
/// with `SearchFinished`, even when listing sources fails.
pub async fn run(
    db: Database,
    client: reqwest::Client,
    terms: Vec<String>,
    generation: u64,
    tx: mpsc::Sender<AppEvent>,
) {
    let sources = match db.get_sources().await {
        Ok(sources) => sources,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list sources for search");
            Vec::new()
        }
    };

    let mut seen: HashSet<String> = HashSet::new();
    for source in sources {
        let feed = match fetch_feed(&client, &source.url).await {
            Ok(feed) => feed,
            Err(e) => {
                tracing::debug!(source = %source.name, error = %e, "Skipping source in search");
                continue;
            }
        };
        for entry in feed.entries {
            if matches_terms(&terms, &entry) && seen.insert(entry.url.clone()) {
                if tx
                    .send(AppEvent::SearchMatch {
                        generation,
                        entry: Box::new(entry),
                    })
                    .await
                    .is_err()
                {
                    return; // UI loop gone
                }
            }
        }
    }

    let _ = tx.send(AppEvent::SearchFinished { generation }).await;
}
