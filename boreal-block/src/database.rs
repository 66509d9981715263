//! Database and table handles.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use boreal_result::{Error, Result};
use boreal_storage::Bucket;

use crate::block::TableBlock;
use crate::config::DatabaseConfig;
use crate::types::BlockId;

/// Top-level engine handle owning the optional bucket and configuration.
///
/// With no bucket configured the engine runs purely in-memory: persistence
/// and bucket iteration become successful no-ops.
pub struct Database {
    bucket: Option<Arc<dyn Bucket>>,
    config: DatabaseConfig,
}

impl Database {
    /// A database without persistence.
    pub fn in_memory() -> Arc<Self> {
        Self::with_config(None, DatabaseConfig::default())
    }

    /// A database persisting blocks to `bucket` with default configuration.
    pub fn with_bucket(bucket: Arc<dyn Bucket>) -> Arc<Self> {
        Self::with_config(Some(bucket), DatabaseConfig::default())
    }

    pub fn with_config(bucket: Option<Arc<dyn Bucket>>, config: DatabaseConfig) -> Arc<Self> {
        Arc::new(Self { bucket, config })
    }

    pub fn bucket(&self) -> Option<&Arc<dyn Bucket>> {
        self.bucket.as_ref()
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Handle for the table `name`.
    ///
    /// Table names become key path segments, so separators and empty names
    /// are rejected rather than silently corrupting the bucket layout.
    pub fn table(self: &Arc<Self>, name: &str) -> Result<Arc<Table>> {
        if name.is_empty() || name.contains('/') {
            return Err(Error::InvalidArgumentError(format!(
                "invalid table name '{name}'"
            )));
        }
        Ok(Arc::new(Table {
            name: name.to_string(),
            db: Arc::clone(self),
        }))
    }
}

/// Named view over a database; blocks keep one of these as their
/// back-reference, which transitively keeps the bucket handle alive.
pub struct Table {
    name: String,
    db: Arc<Database>,
}

impl Table {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    /// Freeze `batches` into a new block owned by this table, stamped with a
    /// fresh time-ordered identifier.
    pub fn new_block(self: &Arc<Self>, batches: Vec<RecordBatch>) -> TableBlock {
        self.new_block_with_id(BlockId::new(), batches)
    }

    /// Freeze `batches` under an explicit identifier. Compaction and restore
    /// paths use this to keep a block's original timestamp.
    pub fn new_block_with_id(self: &Arc<Self>, id: BlockId, batches: Vec<RecordBatch>) -> TableBlock {
        TableBlock::new(Arc::clone(self), id, batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_cannot_escape_the_key_layout() {
        let db = Database::in_memory();
        assert!(db.table("metrics").is_ok());
        assert!(matches!(
            db.table("a/b"),
            Err(Error::InvalidArgumentError(_))
        ));
        assert!(matches!(db.table(""), Err(Error::InvalidArgumentError(_))));
    }
}
