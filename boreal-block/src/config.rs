//! Writer and database configuration.

use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};

/// Controls how blocks are encoded into parquet.
#[derive(Clone, Debug)]
pub struct WriterConfig {
    pub compression: Compression,
    pub max_row_group_size: usize,
    pub statistics: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            max_row_group_size: 8192,
            statistics: true,
        }
    }
}

impl WriterConfig {
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_max_row_group_size(mut self, rows: usize) -> Self {
        self.max_row_group_size = rows;
        self
    }

    /// Enable or disable column chunk statistics. Pruning filters consult
    /// them, so disabling trades scan selectivity for write throughput.
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics = enabled;
        self
    }

    pub(crate) fn writer_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.max_row_group_size)
            .set_statistics_enabled(if self.statistics {
                EnabledStatistics::Chunk
            } else {
                EnabledStatistics::None
            })
            .build()
    }
}

/// Database-wide behavior toggles.
#[derive(Clone, Debug, Default)]
pub struct DatabaseConfig {
    /// When set, queries never touch the bucket; only in-memory blocks serve
    /// reads. Persistence is unaffected.
    pub ignore_storage_on_query: bool,
    /// Encoding configuration applied to every persisted block.
    pub writer: WriterConfig,
}

impl DatabaseConfig {
    pub fn with_ignore_storage_on_query(mut self, ignore: bool) -> Self {
        self.ignore_storage_on_query = ignore;
        self
    }

    pub fn with_writer(mut self, writer: WriterConfig) -> Self {
        self.writer = writer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WriterConfig::default();
        assert_eq!(config.compression, Compression::SNAPPY);
        assert_eq!(config.max_row_group_size, 8192);
        assert!(config.statistics);
        assert!(!DatabaseConfig::default().ignore_storage_on_query);
    }

    #[test]
    fn builders_chain() {
        let config = DatabaseConfig::default()
            .with_ignore_storage_on_query(true)
            .with_writer(WriterConfig::default().with_max_row_group_size(64));
        assert!(config.ignore_storage_on_query);
        assert_eq!(config.writer.max_row_group_size, 64);
    }
}
