//! Streaming hash-distinct operator.

use std::fmt;
use std::hash::{BuildHasher, RandomState};
use std::sync::{Arc, Mutex};

use arrow::array::{ArrayRef, UInt64Array};
use arrow::compute;
use arrow::datatypes::{FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use boreal_expr::ColumnExpr;
use boreal_result::{Error, Result};
use boreal_storage::CancelToken;
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::hash::{hash_array, hash_combine, NULL_HASH};
use crate::node::PhysicalNode;

/// Set-semantic operator that forwards only rows whose projected-column
/// tuple has not been seen before.
///
/// Deduplication is by 64-bit composite hash, so two distinct tuples that
/// collide dedupe together; the seed is drawn fresh per instance, which
/// keeps collisions non-reproducible across runs. The seen set is
/// append-only for the operator's lifetime and membership-test-plus-insert
/// is a single upsert under one lock acquisition, so racing upstream
/// partitions cannot emit the same composite twice.
///
/// Input order is not preserved: distinct is a set operator.
pub struct Distinct {
    columns: Vec<ColumnExpr>,
    hasher: RandomState,
    seen: Mutex<FxHashSet<u64>>,
    next: Option<Arc<dyn PhysicalNode>>,
}

impl Distinct {
    pub fn new(columns: Vec<ColumnExpr>) -> Self {
        Self {
            columns,
            hasher: RandomState::new(),
            seen: Mutex::new(FxHashSet::default()),
            next: None,
        }
    }
}

impl fmt::Debug for Distinct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Distinct")
            .field("columns", &self.columns)
            .finish()
    }
}

impl PhysicalNode for Distinct {
    fn set_next(&mut self, next: Arc<dyn PhysicalNode>) {
        self.next = Some(next);
    }

    fn callback(&self, token: &CancelToken, batch: &RecordBatch) -> Result<()> {
        token.check()?;
        let next = self.next.as_ref().ok_or_else(|| {
            Error::Internal("distinct operator has no downstream stage".to_string())
        })?;

        // Keep each field matched by at least one projection expression, in
        // schema iteration order.
        let schema = batch.schema();
        let mut fields: Vec<FieldRef> = Vec::new();
        let mut name_hashes: Vec<u64> = Vec::new();
        let mut arrays: Vec<ArrayRef> = Vec::new();
        for (index, field) in schema.fields().iter().enumerate() {
            if self
                .columns
                .iter()
                .any(|column| column.match_column(field.name()))
            {
                fields.push(Arc::clone(field));
                name_hashes.push(self.hasher.hash_one(field.name().as_str()));
                arrays.push(Arc::clone(batch.column(index)));
            }
        }
        if fields.is_empty() {
            // No projected column exists in this batch; there is no tuple to
            // deduplicate on.
            return Ok(());
        }

        let column_hashes: Vec<Vec<u64>> = arrays
            .par_iter()
            .map(|array| hash_array(&self.hasher, array.as_ref()))
            .collect::<Result<_>>()?;

        // Order-sensitive composite per row; sentinel columns drop out, and
        // folding the name hash in keeps swapped columns from aliasing.
        let mut keep: Vec<u64> = Vec::new();
        for row in 0..batch.num_rows() {
            let mut composite = 0u64;
            for (hashes, name_hash) in column_hashes.iter().zip(&name_hashes) {
                let value_hash = hashes[row];
                if value_hash == NULL_HASH {
                    continue;
                }
                composite = hash_combine(composite, hash_combine(*name_hash, value_hash));
            }

            let is_new = self
                .seen
                .lock()
                .expect("distinct seen set lock poisoned")
                .insert(composite);
            if is_new {
                keep.push(row as u64);
            }
        }

        if keep.is_empty() {
            // Nothing new in this batch; skip the downstream call entirely.
            return Ok(());
        }
        tracing::trace!(
            rows = keep.len(),
            columns = fields.len(),
            "distinct emitting rows"
        );

        let indices = UInt64Array::from(keep);
        let columns = arrays
            .iter()
            .map(|array| compute::take(array.as_ref(), &indices, None).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;
        let output = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;

        next.callback(token, &output)
        // `output` drops here, after the downstream call returns.
    }
}
