//! Positioned reads over a bucket object for the parquet reader.

use std::io::Read;
use std::sync::Arc;

use boreal_result::{Error, Result};
use boreal_storage::{Bucket, CancelToken};
use bytes::Bytes;
use parquet::errors::{ParquetError, Result as ParquetResult};
use parquet::file::reader::{ChunkReader, Length};

/// Adapter that lets the parquet reader pull footers and column-chunk pages
/// from a bucket object without downloading it whole.
///
/// Each positioned read issues exactly one ranged fetch and drops (closes)
/// the returned stream on every exit path. The adapter is stateless beyond
/// the object coordinates, which keeps prefetch policy where it belongs: in
/// the parquet reader. One ranged round-trip per read is the right
/// granularity for a remote store.
///
/// The cancellation token is captured when the block is opened and consulted
/// before every fetch; the adapter lives inside the opened [`crate::BlockFile`],
/// so the token outlives every read made through it.
#[derive(Clone)]
pub struct BucketRangeReader {
    bucket: Arc<dyn Bucket>,
    key: String,
    size: u64,
    token: CancelToken,
}

impl BucketRangeReader {
    pub fn new(
        bucket: Arc<dyn Bucket>,
        key: impl Into<String>,
        size: u64,
        token: CancelToken,
    ) -> Self {
        Self {
            bucket,
            key: key.into(),
            size,
            token,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn fetch(&self, offset: u64, len: u64) -> Result<Box<dyn Read + Send>> {
        self.token.check()?;
        self.bucket.get_range(&self.token, &self.key, offset, len)
    }
}

impl Length for BucketRangeReader {
    fn len(&self) -> u64 {
        self.size
    }
}

impl ChunkReader for BucketRangeReader {
    type T = Box<dyn Read + Send>;

    fn get_read(&self, start: u64) -> ParquetResult<Self::T> {
        self.fetch(start, self.size.saturating_sub(start))
            .map_err(external)
    }

    fn get_bytes(&self, start: u64, length: usize) -> ParquetResult<Bytes> {
        let mut stream = self.fetch(start, length as u64).map_err(external)?;
        let mut buf = Vec::with_capacity(length);
        stream.read_to_end(&mut buf)?;
        if buf.len() < length {
            return Err(ParquetError::EOF(format!(
                "expected {length} bytes at offset {start} of '{}', got {}",
                self.key,
                buf.len()
            )));
        }
        Ok(buf.into())
    }
}

fn external(err: Error) -> ParquetError {
    ParquetError::External(Box::new(err))
}
