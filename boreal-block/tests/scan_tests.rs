//! Iterator semantics over a bucket of persisted blocks.

use std::io::Cursor;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arrow::array::{Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use boreal_block::{
    AllMayContain, BlockId, BlockRowGroup, Database, DatabaseConfig, Table, TrueNegativeFilter,
    WriterConfig,
};
use boreal_result::{Error, Result};
use boreal_storage::{Bucket, CancelToken, MemBucket};

fn batch(values: &[i64]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("value", DataType::Int64, false),
        Field::new("label", DataType::Utf8, false),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(values.to_vec())),
            Arc::new(StringArray::from(
                values.iter().map(|v| format!("v{v}")).collect::<Vec<_>>(),
            )),
        ],
    )
    .unwrap()
}

/// Two-block fixture: t0 block with 5 rows in 2-row row groups, t1 block
/// with 2 rows in one row group.
fn two_block_table(bucket: Arc<MemBucket>) -> (Arc<Table>, BlockId, BlockId) {
    let config = DatabaseConfig::default()
        .with_writer(WriterConfig::default().with_max_row_group_size(2));
    let db = Database::with_config(Some(bucket), config);
    let table = db.table("metrics").unwrap();

    let early = BlockId::from_timestamp_ms(1_000);
    let late = BlockId::from_timestamp_ms(2_000);
    table
        .new_block_with_id(early, vec![batch(&[1, 2, 3, 4, 5])])
        .persist()
        .expect("persist early block");
    table
        .new_block_with_id(late, vec![batch(&[6, 7])])
        .persist()
        .expect("persist late block");
    (table, early, late)
}

struct CountingFilter {
    evals: AtomicUsize,
    may_contain: bool,
}

impl CountingFilter {
    fn new(may_contain: bool) -> Self {
        Self {
            evals: AtomicUsize::new(0),
            may_contain,
        }
    }

    fn evals(&self) -> usize {
        self.evals.load(Ordering::Relaxed)
    }
}

impl TrueNegativeFilter for CountingFilter {
    fn eval(&self, _row_group: &BlockRowGroup) -> Result<bool> {
        self.evals.fetch_add(1, Ordering::Relaxed);
        Ok(self.may_contain)
    }
}

struct FailingFilter;

impl TrueNegativeFilter for FailingFilter {
    fn eval(&self, _row_group: &BlockRowGroup) -> Result<bool> {
        Err(Error::Internal("statistics unreadable".to_string()))
    }
}

#[test]
fn blocks_are_visited_chronologically_with_all_row_groups() {
    let bucket = Arc::new(MemBucket::new());
    let (table, early, late) = two_block_table(bucket);

    let mut first_rows: Vec<i64> = Vec::new();
    let mut row_groups = 0usize;
    table
        .iterate_bucket_blocks(
            &CancelToken::new(),
            &AllMayContain,
            |row_group| {
                row_groups += 1;
                for batch in row_group.read().expect("read row group") {
                    let values = batch
                        .column(0)
                        .as_any()
                        .downcast_ref::<Int64Array>()
                        .unwrap();
                    first_rows.extend(values.iter().flatten());
                }
                ControlFlow::Continue(())
            },
            0,
        )
        .expect("iterate");

    // 5 rows at 2-per-row-group plus one 2-row group in the later block.
    assert_eq!(row_groups, 4);
    // Listing order is chronological, so the early block's values all come
    // before the late block's.
    assert_eq!(first_rows, vec![1, 2, 3, 4, 5, 6, 7]);
    assert!(early.timestamp_ms() < late.timestamp_ms());
}

#[test]
fn horizon_skips_blocks_still_in_the_memory_tier() {
    let bucket = Arc::new(MemBucket::new());
    let (table, _early, late) = two_block_table(bucket);

    let mut rows = 0usize;
    table
        .iterate_bucket_blocks(
            &CancelToken::new(),
            &AllMayContain,
            |row_group| {
                rows += row_group.num_rows();
                ControlFlow::Continue(())
            },
            late.timestamp_ms(),
        )
        .expect("iterate");

    // Only the early block's 5 rows; the late block sits at the horizon.
    assert_eq!(rows, 5);
}

#[test]
fn pruned_row_groups_are_never_yielded() {
    let bucket = Arc::new(MemBucket::new());
    let (table, _, _) = two_block_table(bucket);

    let filter = CountingFilter::new(false);
    let mut visited = 0usize;
    table
        .iterate_bucket_blocks(
            &CancelToken::new(),
            &filter,
            |_| {
                visited += 1;
                ControlFlow::Continue(())
            },
            0,
        )
        .expect("iterate");

    assert_eq!(visited, 0);
    assert_eq!(filter.evals(), 4);
}

#[test]
fn break_stops_blocks_and_row_groups_alike() {
    let bucket = Arc::new(MemBucket::new());
    let (table, _, _) = two_block_table(bucket);

    let filter = CountingFilter::new(true);
    let mut visited = 0usize;
    table
        .iterate_bucket_blocks(
            &CancelToken::new(),
            &filter,
            |_| {
                visited += 1;
                ControlFlow::Break(())
            },
            0,
        )
        .expect("iterate");

    assert_eq!(visited, 1);
    // The stop happened before any further row group was even filtered.
    assert_eq!(filter.evals(), 1);
}

#[test]
fn filter_errors_abort_the_iteration() {
    let bucket = Arc::new(MemBucket::new());
    let (table, _, _) = two_block_table(bucket);

    let err = table
        .iterate_bucket_blocks(
            &CancelToken::new(),
            &FailingFilter,
            |_| ControlFlow::Continue(()),
            0,
        )
        .unwrap_err();
    assert!(matches!(err, Error::Internal(_)));
}

#[test]
fn malformed_block_identifiers_abort_the_iteration() {
    let bucket = Arc::new(MemBucket::new());
    bucket
        .upload(
            &CancelToken::new(),
            "metrics/not-a-ulid/data.parquet",
            &mut Cursor::new(b"junk".to_vec()),
        )
        .expect("upload");
    let db = Database::with_bucket(bucket);
    let table = db.table("metrics").unwrap();

    let err = table
        .iterate_bucket_blocks(
            &CancelToken::new(),
            &AllMayContain,
            |_| ControlFlow::Continue(()),
            0,
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgumentError(_)));
}

#[test]
fn missing_data_file_surfaces_the_store_error() {
    let bucket = Arc::new(MemBucket::new());
    let id = BlockId::from_timestamp_ms(1_000);
    bucket
        .upload(
            &CancelToken::new(),
            &format!("metrics/{id}/sidecar"),
            &mut Cursor::new(b"x".to_vec()),
        )
        .expect("upload");
    let db = Database::with_bucket(bucket);
    let table = db.table("metrics").unwrap();

    let err = table
        .iterate_bucket_blocks(
            &CancelToken::new(),
            &AllMayContain,
            |_| ControlFlow::Continue(()),
            0,
        )
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn no_bucket_and_disabled_storage_reads_are_noops() {
    let db = Database::in_memory();
    let table = db.table("metrics").unwrap();
    let mut visited = 0usize;
    table
        .iterate_bucket_blocks(
            &CancelToken::new(),
            &AllMayContain,
            |_| {
                visited += 1;
                ControlFlow::Continue(())
            },
            0,
        )
        .expect("no bucket is a successful no-op");
    assert_eq!(visited, 0);

    let bucket = Arc::new(MemBucket::new());
    let (ignoring_table, _, _) = {
        let (table, a, b) = two_block_table(bucket.clone());
        drop(table);
        let config = DatabaseConfig::default().with_ignore_storage_on_query(true);
        let db = Database::with_config(Some(bucket), config);
        (db.table("metrics").unwrap(), a, b)
    };
    ignoring_table
        .iterate_bucket_blocks(
            &CancelToken::new(),
            &AllMayContain,
            |_| {
                visited += 1;
                ControlFlow::Continue(())
            },
            0,
        )
        .expect("disabled storage reads are a successful no-op");
    assert_eq!(visited, 0);
}

#[test]
fn empty_listing_is_success_with_zero_blocks() {
    let bucket = Arc::new(MemBucket::new());
    let db = Database::with_bucket(bucket);
    let table = db.table("metrics").unwrap();

    let mut visited = 0usize;
    table
        .iterate_bucket_blocks(
            &CancelToken::new(),
            &AllMayContain,
            |_| {
                visited += 1;
                ControlFlow::Continue(())
            },
            0,
        )
        .expect("iterate");
    assert_eq!(visited, 0);
}

#[test]
fn cancellation_stops_the_scan() {
    let bucket = Arc::new(MemBucket::new());
    let (table, _, _) = two_block_table(bucket);

    let token = CancelToken::new();
    token.cancel();
    let err = table
        .iterate_bucket_blocks(&token, &AllMayContain, |_| ControlFlow::Continue(()), 0)
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}
