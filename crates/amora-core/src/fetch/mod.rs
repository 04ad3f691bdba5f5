//! Content listing over the document store.
//!
//! Every listing screen reads through [`resilient::ResilientCollectionFetcher`]
//! so a missing index or an unpopulated order field degrades to unordered
//! content instead of an empty screen.

pub mod feed;
pub mod resilient;

pub use feed::FeedKind;
pub use resilient::{FetchOutcome, FetchPath, ResilientCollectionFetcher};
