//! In-memory table blocks and their persistence to the bucket.

use std::io::{self, Write};
use std::sync::Arc;
use std::thread;

use arrow::record_batch::RecordBatch;
use boreal_result::{Error, Result};
use boreal_storage::CancelToken;
use parquet::arrow::ArrowWriter;
use parquet::errors::ParquetError;

use crate::database::Table;
use crate::types::{block_key, BlockId};

/// An immutable columnar slice of a table, frozen by the write path.
///
/// The block's contents are Arrow record batches sharing one schema. The
/// persister borrows the block for the duration of a single upload; whether
/// to discard it afterwards is the caller's decision.
pub struct TableBlock {
    id: BlockId,
    table: Arc<Table>,
    batches: Vec<RecordBatch>,
}

impl TableBlock {
    pub(crate) fn new(table: Arc<Table>, id: BlockId, batches: Vec<RecordBatch>) -> Self {
        Self { id, table, batches }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Stream the block through a parquet encoder into `writer`.
    ///
    /// Row-group sizing, compression, and statistics follow the database's
    /// [`crate::WriterConfig`]. The writer is consumed and therefore closed
    /// on every exit path.
    pub fn serialize<W: Write + Send>(&self, writer: W) -> Result<()> {
        let schema = self
            .batches
            .first()
            .map(RecordBatch::schema)
            .ok_or_else(|| {
                Error::InvalidArgumentError("cannot serialize an empty block".to_string())
            })?;
        let props = self.table.db().config().writer.writer_properties();

        let mut encoder = ArrowWriter::try_new(writer, schema, Some(props))?;
        for batch in &self.batches {
            encoder.write(batch)?;
        }
        encoder.close()?;
        Ok(())
    }

    /// Upload the block to the bucket under its time-ordered key.
    ///
    /// Serialization and upload run concurrently, joined by a byte pipe: a
    /// serializer thread encodes into the write end while the caller's
    /// thread feeds the read end to the bucket. The pipe's buffer provides
    /// back-pressure in both directions.
    ///
    /// The serializer thread is joined after the upload returns and its
    /// outcome decides the overall result: a serializer failure is reported
    /// as [`Error::BlockSerialize`] even when the upload of the truncated
    /// body succeeded. Without a configured bucket this is a no-op.
    pub fn persist(&self) -> Result<()> {
        let Some(bucket) = self.table.db().bucket() else {
            return Ok(());
        };
        let key = block_key(self.table.name(), &self.id);
        let (reader, writer) = io::pipe()?;
        let token = CancelToken::new();

        thread::scope(|scope| {
            let serializer = scope.spawn(|| self.serialize(writer));

            let mut reader = reader;
            let upload_result = bucket.upload(&token, &key, &mut reader);
            // Dropping the read end unblocks a serializer stuck on pipe
            // back-pressure after an early upload failure.
            drop(reader);

            let serialize_result = match serializer.join() {
                Ok(result) => result,
                Err(_) => Err(Error::Internal(
                    "block serializer thread panicked".to_string(),
                )),
            };

            match (serialize_result, upload_result) {
                (Ok(()), Ok(())) => Ok(()),
                (Err(cause), Ok(())) => Err(Error::block_serialize(cause)),
                (Ok(()), Err(cause)) => Err(Error::block_upload(cause)),
                (Err(serialize_cause), Err(upload_cause)) => {
                    // A broken pipe on the serializer side means the uploader
                    // hung up first; the upload failure is the original cause.
                    if is_broken_pipe(&serialize_cause) {
                        Err(Error::block_upload(upload_cause))
                    } else {
                        Err(Error::block_serialize(serialize_cause))
                    }
                }
            }
        })
    }
}

fn is_broken_pipe(err: &Error) -> bool {
    match err {
        Error::Io(e) => e.kind() == io::ErrorKind::BrokenPipe,
        Error::Parquet(ParquetError::External(source)) => source
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use arrow::array::{StringArray, UInt64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use boreal_storage::{Bucket, MemBucket};

    fn sample_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::UInt64, false),
            Field::new("name", DataType::Utf8, false),
        ]));
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(UInt64Array::from(vec![1, 2, 3])),
                Arc::new(StringArray::from(vec!["a", "b", "c"])),
            ],
        )
        .unwrap()
    }

    fn mismatched_batch() -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "other",
            DataType::Int64,
            false,
        )]));
        RecordBatch::try_new(
            schema,
            vec![Arc::new(arrow::array::Int64Array::from(vec![9]))],
        )
        .unwrap()
    }

    #[test]
    fn serialize_produces_a_parquet_file() {
        let db = Database::in_memory();
        let table = db.table("t").unwrap();
        let block = table.new_block(vec![sample_batch()]);

        let mut buf = Vec::new();
        block.serialize(&mut buf).expect("serialize");
        assert_eq!(&buf[0..4], b"PAR1");
        assert_eq!(&buf[buf.len() - 4..], b"PAR1");
    }

    #[test]
    fn serialize_rejects_an_empty_block() {
        let db = Database::in_memory();
        let table = db.table("t").unwrap();
        let block = table.new_block(Vec::new());

        let err = block.serialize(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgumentError(_)));
    }

    #[test]
    fn persist_without_a_bucket_is_a_successful_noop() {
        let db = Database::in_memory();
        let table = db.table("t").unwrap();
        table.new_block(vec![sample_batch()]).persist().expect("noop");
    }

    #[test]
    fn persist_uploads_under_the_block_key() {
        let bucket = Arc::new(MemBucket::new());
        let db = Database::with_bucket(bucket.clone());
        let table = db.table("metrics").unwrap();
        let block = table.new_block(vec![sample_batch()]);

        block.persist().expect("persist");

        let key = block_key("metrics", &block.id());
        assert_eq!(bucket.keys(), vec![key.clone()]);
        let attrs = bucket
            .attributes(&CancelToken::new(), &key)
            .expect("attributes");
        assert!(attrs.size > 0);
    }

    #[test]
    fn persist_reports_the_serializer_as_the_cause() {
        let bucket = Arc::new(MemBucket::new());
        let db = Database::with_bucket(bucket);
        let table = db.table("metrics").unwrap();
        // The second batch's schema does not match the first, so the encoder
        // fails midway while the upload side keeps draining the pipe.
        let block = table.new_block(vec![sample_batch(), mismatched_batch()]);

        let err = block.persist().unwrap_err();
        assert!(matches!(err, Error::BlockSerialize(_)), "got {err}");
    }
}
