//! Terminal feed reader: sites and headlines side by side, bookmarks,
//! streaming search across all sites, and an in-terminal article view.

pub mod app;
pub mod config;
pub mod content;
pub mod feed;
pub mod storage;
pub mod ui;
pub mod util;
