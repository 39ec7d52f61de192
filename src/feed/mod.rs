//! Feed retrieval: single-source downloads and the multi-source
//! streaming search.

mod fetcher;
pub mod search;

pub use fetcher::{fetch_feed, strip_html, FetchError, FetchedFeed};
