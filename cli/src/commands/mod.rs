//! CLI command implementations

pub mod browse;
pub mod search;

pub use browse::{browse_command, BrowseArgs};
pub use search::{search_command, SearchArgs};
