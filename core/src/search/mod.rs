//! Search pipeline: query, paged retrieval, filtering, dedup and enrichment

pub mod dedup;
pub mod engine;
pub mod enrich;
pub mod filter;
pub mod model;
pub mod paginate;
pub mod query;
pub mod retry;

pub use dedup::deduplicate_and_limit;
pub use engine::{sort_by_popularity, SearchEngine};
pub use enrich::PopularityEnricher;
pub use filter::{filename_matches, filter_by_filename};
pub use model::{file_name, is_markdown, IdentityKey, SearchOutcome, SearchResult};
pub use paginate::{PageFilter, PageOutcome, PaginationController, StopReason};
pub use query::build_query;
pub use retry::{retry_with_policy, RetryPolicy};
