//! Boreal: an embedded columnar block store.
//!
//! Boreal persists immutable columnar table blocks as parquet objects in a
//! bucket under time-ordered keys and scans them back into a push-based
//! query pipeline. This crate is the facade: it re-exports the public
//! surface of the underlying `boreal-*` crates so applications see a single
//! entry point.
//!
//! The layers, storage up:
//!
//! - [`boreal_storage`]: the [`Bucket`] capability (upload, ordered listing,
//!   stat, ranged reads) with in-memory and local-disk adapters, plus the
//!   [`CancelToken`] threaded through every operation.
//! - [`boreal_block`]: [`TableBlock`] persistence and the bucket block
//!   iterator, which prunes row groups through a [`TrueNegativeFilter`] and
//!   streams survivors to the caller.
//! - [`boreal_executor`]: push-based operators, including the streaming
//!   [`Distinct`] stage.
//!
//! # Example
//!
//! ```no_run
//! use std::ops::ControlFlow;
//! use std::sync::Arc;
//!
//! use boreal::{AllMayContain, CancelToken, Database, MemBucket};
//!
//! # fn main() -> boreal::Result<()> {
//! let db = Database::with_bucket(Arc::new(MemBucket::new()));
//! let table = db.table("metrics")?;
//!
//! // The write path freezes record batches into a block, then persists it.
//! // table.new_block(batches).persist()?;
//!
//! table.iterate_bucket_blocks(
//!     &CancelToken::new(),
//!     &AllMayContain,
//!     |row_group| {
//!         let _batches = row_group.read();
//!         ControlFlow::Continue(())
//!     },
//!     0,
//! )?;
//! # Ok(())
//! # }
//! ```

pub use boreal_block::{
    block_key, AllMayContain, BlockFile, BlockId, BlockRowGroup, BucketRangeReader, Database,
    DatabaseConfig, Table, TableBlock, TrueNegativeFilter, WriterConfig, DATA_FILE_NAME,
};
pub use boreal_executor::{BatchCollector, Distinct, PhysicalNode};
pub use boreal_expr::ColumnExpr;
pub use boreal_result::{Error, Result};
pub use boreal_storage::{Bucket, CancelToken, LocalBucket, MemBucket, ObjectAttributes};
