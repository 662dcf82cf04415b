//! Indexer abstraction.
//!
//! An `Indexer` answers normalized Torznab queries with releases. The
//! `JackettIndexer` forwards them to a Jackett-compatible aggregator.

mod jackett;
mod types;

pub use jackett::JackettIndexer;
pub use types::*;
