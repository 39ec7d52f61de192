mod db;
mod types;

pub use db::Database;
pub use types::{NewsEntry, Source, StorageError};
