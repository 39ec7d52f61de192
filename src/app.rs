use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::content::ContentError;
use crate::feed::FetchError;
use crate::storage::{Database, NewsEntry, Source, StorageError};
use crate::ui::{PagedList, RowItem};

/// Marker prefixed to the row of an entry whose url is bookmarked.
pub const BOOKMARK_MARKER: &str = "★ ";

// ============================================================================
// Row rendering
// ============================================================================

impl RowItem for Source {
    fn row_text(&self) -> String {
        self.name.clone()
    }
}

impl RowItem for NewsEntry {
    fn row_text(&self) -> String {
        if self.bookmarked {
            format!("{}{}", BOOKMARK_MARKER, self.title)
        } else {
            self.title.clone()
        }
    }
}

// ============================================================================
// Focus and Overlays
// ============================================================================

/// Which base panel has input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sources,
    News,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    AddSource,
    Search,
}

/// Single-line input overlay (new-source url or search terms).
pub struct Prompt {
    pub kind: PromptKind,
    pub title: String,
    pub input: String,
    /// A validation round trip is in flight; input is frozen until the
    /// result comes back.
    pub busy: bool,
}

impl Prompt {
    pub fn new(kind: PromptKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            input: String::new(),
            busy: false,
        }
    }
}

/// Overlays capture focus exclusively until dismissed.
pub enum Overlay {
    Prompt(Prompt),
    Content(PagedList<String>),
}

// ============================================================================
// Events from background tasks
// ============================================================================

/// Results handed from worker tasks to the UI loop. Workers never touch
/// UI state directly; each event is applied by the loop in arrival order.
#[derive(Debug)]
pub enum AppEvent {
    /// A single-source download finished.
    FetchCompleted {
        source_name: String,
        generation: u64,
        result: Result<Vec<NewsEntry>, FetchError>,
    },
    /// One matching entry from a running search.
    SearchMatch {
        generation: u64,
        entry: Box<NewsEntry>,
    },
    /// The search task has visited every source.
    SearchFinished { generation: u64 },
    /// The add-source prompt's url was checked against the feed fetcher.
    SourceValidated {
        url: String,
        generation: u64,
        result: Result<String, FetchError>,
    },
    /// Paragraphs for the content overlay arrived.
    ContentLoaded {
        entry_title: String,
        generation: u64,
        result: Result<Vec<String>, ContentError>,
    },
}

// ============================================================================
// Application Context
// ============================================================================

/// Explicit application context passed to every handler: the shared store
/// handle, the HTTP client, both panel lists, the bookmark cache, and the
/// focus/overlay state.
pub struct App {
    pub db: Database,
    pub client: reqwest::Client,
    pub config: Config,

    pub sources: PagedList<Source>,
    pub news: PagedList<NewsEntry>,
    /// Cache of persisted bookmarks for membership checks by url.
    pub bookmarks: Vec<NewsEntry>,

    pub focus: Focus,
    pub overlay: Option<Overlay>,
    /// The news panel currently shows the bookmark view (affects Delete).
    pub viewing_bookmarks: bool,

    /// Bumped on every news-panel repopulation; stale fetch/search events
    /// carrying an older value are dropped.
    pub news_generation: u64,
    /// Bumped on every content-overlay open/close.
    pub content_generation: u64,
    /// Bumped on every prompt submit and dismissal; a validation result
    /// carrying an older value belongs to an abandoned prompt.
    pub prompt_generation: u64,
    /// Running hit counter for the active search.
    pub search_hits: usize,

    pub needs_redraw: bool,
}

impl App {
    pub fn new(db: Database, config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        let mut sources = PagedList::new(true);
        sources.set_title("Sites");
        sources.focus();

        let mut news = PagedList::new(true);
        news.set_title("No news yet...");

        Ok(Self {
            db,
            client,
            config,
            sources,
            news,
            bookmarks: Vec::new(),
            focus: Focus::Sources,
            overlay: None,
            viewing_bookmarks: false,
            news_generation: 0,
            content_generation: 0,
            prompt_generation: 0,
            search_hits: 0,
            needs_redraw: true,
        })
    }

    /// Reloads the sources panel from the store. Storage failure here is
    /// fatal: the UI cannot function without its source list.
    pub async fn load_sources(&mut self) -> Result<(), StorageError> {
        let sources = self.db.get_sources().await?;
        if sources.is_empty() {
            self.sources.reset();
            self.sources.set_title("No sites yet... (Ctrl-n to add)");
        } else {
            self.sources.set_title("Sites");
            self.sources.set_items(sources);
        }
        Ok(())
    }

    /// Refreshes the bookmark cache used for membership marking.
    pub async fn refresh_bookmarks(&mut self) -> Result<(), StorageError> {
        self.bookmarks = self.db.get_bookmarks().await?;
        Ok(())
    }

    /// The persisted bookmark holding the same story as `entry`, if any.
    pub fn bookmark_for(&self, entry: &NewsEntry) -> Option<&NewsEntry> {
        self.bookmarks.iter().find(|b| b.same_story(entry))
    }

    /// Populates the news panel, applying the bookmark-membership marker
    /// and the `"News from {name}"` / `"No news in {name}"` title rule.
    pub fn set_news(&mut self, mut entries: Vec<NewsEntry>, from: &str) {
        if entries.is_empty() {
            self.news.reset();
            self.news.set_title(format!("No news in {}", from));
            return;
        }
        for entry in &mut entries {
            let marked = self.bookmark_for(entry).is_some();
            entry.bookmarked = marked;
        }
        self.news.set_title(format!("News from {}", from));
        self.news.set_items(entries);
    }

    pub fn focus_sources(&mut self) {
        self.focus = Focus::Sources;
        self.sources.focus();
        self.news.unfocus();
    }

    pub fn focus_news(&mut self) {
        self.focus = Focus::News;
        self.news.focus();
        self.sources.unfocus();
    }

    /// Invalidate any in-flight fetch or search before repopulating the
    /// news panel.
    pub fn next_news_generation(&mut self) -> u64 {
        self.news_generation += 1;
        self.news_generation
    }

    pub fn next_content_generation(&mut self) -> u64 {
        self.content_generation += 1;
        self.content_generation
    }

    pub fn next_prompt_generation(&mut self) -> u64 {
        self.prompt_generation += 1;
        self.prompt_generation
    }
}
