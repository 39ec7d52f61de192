//! Terminal user interface: panel layout, paged list widget, rendering and
//! the event loop that ties input to application state.

mod events;
mod input;
mod layout;
mod list;
mod loop_runner;
mod render;

pub use list::{Page, PagedList, RowItem};
pub use loop_runner::{run, Action};
