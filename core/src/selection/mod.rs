//! Cross-source selection registry

pub mod manager;
pub mod types;

pub use manager::{SelectionManager, SharedSelectionManager, ToggleOutcome};
pub use types::{blob_url, GlobalSelection, SelectionSource};
