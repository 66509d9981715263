//! Opened block files and their row-group views.

use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use boreal_result::{Error, Result};
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReaderBuilder,
};
use parquet::file::metadata::RowGroupMetaData;

use crate::reader::BucketRangeReader;

/// A block opened for reading: footer metadata loaded through the range
/// reader, rows untouched until a row group is decoded.
pub struct BlockFile {
    reader: BucketRangeReader,
    metadata: ArrowReaderMetadata,
}

impl BlockFile {
    /// Load the parquet footer through `reader` and keep it for row-group
    /// access. This is the only eager I/O an open performs.
    pub fn open(reader: BucketRangeReader) -> Result<Self> {
        let metadata = ArrowReaderMetadata::load(&reader, ArrowReaderOptions::new())?;
        Ok(Self { reader, metadata })
    }

    pub fn num_row_groups(&self) -> usize {
        self.metadata.metadata().num_row_groups()
    }

    /// The block's Arrow schema, dynamic columns included.
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(self.metadata.schema())
    }

    /// The `index`-th row group as a lazily decoded view.
    pub fn row_group(&self, index: usize) -> BlockRowGroup {
        BlockRowGroup {
            reader: self.reader.clone(),
            metadata: self.metadata.clone(),
            index,
        }
    }
}

/// One row group of an opened block.
///
/// Carries the statistics a pruning filter consults plus everything needed
/// to decode the rows; nothing is fetched until [`BlockRowGroup::read`].
/// The scan layer treats the column set as opaque.
pub struct BlockRowGroup {
    reader: BucketRangeReader,
    metadata: ArrowReaderMetadata,
    index: usize,
}

impl BlockRowGroup {
    /// Position of this row group within its block file.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn num_rows(&self) -> usize {
        self.row_group_metadata().num_rows() as usize
    }

    /// The block's Arrow schema (row groups share it).
    pub fn schema(&self) -> SchemaRef {
        Arc::clone(self.metadata.schema())
    }

    /// Parquet metadata for this row group, column-chunk statistics included.
    pub fn row_group_metadata(&self) -> &RowGroupMetaData {
        self.metadata.metadata().row_group(self.index)
    }

    /// Decode this row group into record batches through the range reader.
    pub fn read(&self) -> Result<Vec<RecordBatch>> {
        let reader =
            ParquetRecordBatchReaderBuilder::new_with_metadata(self.reader.clone(), self.metadata.clone())
                .with_row_groups(vec![self.index])
                .build()?;
        reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}
