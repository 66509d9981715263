//! Bucket-backed block scanning.

use std::ops::ControlFlow;
use std::sync::Arc;

use boreal_result::Result;
use boreal_storage::CancelToken;

use crate::database::Table;
use crate::filter::TrueNegativeFilter;
use crate::reader::BucketRangeReader;
use crate::rowgroup::{BlockFile, BlockRowGroup};
use crate::types::{BlockId, DATA_FILE_NAME};

impl Table {
    /// Walk this table's persisted blocks, yielding row groups that survive
    /// `filter` to `visit`.
    ///
    /// Blocks are visited in the bucket's lexical listing order, which the
    /// time-prefixed identifiers make chronological; row groups within a
    /// block are visited in file order. Blocks whose identifier time is at
    /// or past `horizon_ms` (when non-zero) are skipped: they are still
    /// served by the in-memory tier. `visit` returning
    /// [`ControlFlow::Break`] stops the whole iteration with success; any
    /// error (malformed identifier, store failure, open failure, filter
    /// failure) stops it with that error.
    ///
    /// Without a bucket, or with storage reads disabled by configuration,
    /// this returns success without iterating.
    pub fn iterate_bucket_blocks<F>(
        &self,
        token: &CancelToken,
        filter: &dyn TrueNegativeFilter,
        mut visit: F,
        horizon_ms: u64,
    ) -> Result<()>
    where
        F: FnMut(BlockRowGroup) -> ControlFlow<()>,
    {
        let span = tracing::debug_span!(
            "iterate_bucket_blocks",
            table = %self.name(),
            last_block_timestamp = horizon_ms,
        );
        let _enter = span.enter();

        let Some(bucket) = self.db().bucket() else {
            return Ok(());
        };
        if self.db().config().ignore_storage_on_query {
            return Ok(());
        }

        let mut opened = 0usize;
        let result = bucket.iter(token, self.name(), &mut |child| {
            let block_span = tracing::debug_span!(
                "open_block",
                block = child,
                ulid = tracing::field::Empty,
                size = tracing::field::Empty,
            );
            let _enter = block_span.enter();

            let id_part = child.rsplit('/').next().unwrap_or(child);
            let id: BlockId = id_part.parse()?;
            block_span.record("ulid", tracing::field::display(id));

            if horizon_ms != 0 && id.timestamp_ms() >= horizon_ms {
                // Still live in the in-memory tier; the write path serves it.
                return Ok(ControlFlow::Continue(()));
            }

            let key = format!("{child}/{DATA_FILE_NAME}");
            let attrs = bucket.attributes(token, &key)?;
            block_span.record("size", attrs.size);

            let reader =
                BucketRangeReader::new(Arc::clone(bucket), key, attrs.size, token.clone());
            let file = BlockFile::open(reader)?;
            opened += 1;

            for index in 0..file.num_row_groups() {
                let row_group = file.row_group(index);
                if !filter.eval(&row_group)? {
                    continue;
                }
                if let ControlFlow::Break(()) = visit(row_group) {
                    return Ok(ControlFlow::Break(()));
                }
            }
            Ok(ControlFlow::Continue(()))
        });

        tracing::debug!(blocks = opened, table = %self.name(), "read blocks from bucket");
        result
    }
}
