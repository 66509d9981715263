//! Columnar block persistence and bucket-backed scanning.
//!
//! A *block* is an immutable slice of a table: a set of Arrow record batches
//! frozen by the write path. This crate persists blocks as parquet objects
//! under time-ordered keys (`<table>/<ulid>/data.parquet`) in a
//! [`boreal_storage::Bucket`], and scans them back row group by row group
//! without downloading whole objects.
//!
//! The pieces, write side to read side:
//!
//! - [`TableBlock::persist`]: streams a block through a parquet encoder into
//!   a bucket upload, overlapping serialization with the network write.
//! - [`BucketRangeReader`]: positioned reads over a bucket object, one ranged
//!   fetch per parquet read.
//! - [`BlockFile`] / [`BlockRowGroup`]: an opened block and its lazily
//!   decoded row groups.
//! - [`Table::iterate_bucket_blocks`]: chronological walk over a table's
//!   persisted blocks, pruning row groups through a [`TrueNegativeFilter`].

pub mod block;
pub mod config;
pub mod database;
pub mod filter;
pub mod reader;
pub mod rowgroup;
pub mod scan;
pub mod types;

pub use block::TableBlock;
pub use config::{DatabaseConfig, WriterConfig};
pub use database::{Database, Table};
pub use filter::{AllMayContain, TrueNegativeFilter};
pub use reader::BucketRangeReader;
pub use rowgroup::{BlockFile, BlockRowGroup};
pub use types::{block_key, BlockId, DATA_FILE_NAME};
