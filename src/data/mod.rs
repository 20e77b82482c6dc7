//! Feed access.

pub mod feed;

pub use feed::{FeedClient, FeedSource, RawRow, REQUIRED_COLUMNS};
