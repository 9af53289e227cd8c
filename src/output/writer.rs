//! Parquet encoding
//!
//! Tables are encoded into memory and handed to the object store as one
//! `put` per file. Dictionary encoding and page statistics stay on.

use crate::error::{Error, Result};
use crate::types::CompressionCodec;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::sync::Arc;

/// Rows per row group unless overridden
pub const DEFAULT_ROW_GROUP_SIZE: usize = 1024 * 1024;

/// How data files are encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParquetWriterConfig {
    codec: CompressionCodec,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }
}

impl ParquetWriterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Cap the rows per row group; zero is treated as one
    #[must_use]
    pub fn with_row_group_size(mut self, rows: usize) -> Self {
        self.row_group_size = rows.max(1);
        self
    }

    pub fn codec(&self) -> CompressionCodec {
        self.codec
    }

    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Data file suffix, e.g. `.snappy.parquet`
    pub fn file_suffix(&self) -> &'static str {
        self.codec.file_suffix()
    }

    fn properties(&self) -> WriterProperties {
        let compression = match self.codec {
            CompressionCodec::Snappy => Compression::SNAPPY,
            CompressionCodec::Zstd => Compression::ZSTD(ZstdLevel::default()),
            CompressionCodec::Gzip => Compression::GZIP(GzipLevel::default()),
            CompressionCodec::None => Compression::UNCOMPRESSED,
        };

        WriterProperties::builder()
            .set_compression(compression)
            .set_max_row_group_size(self.row_group_size)
            .set_created_by(format!("{} {}", crate::NAME, crate::VERSION))
            .build()
    }
}

/// One Parquet file being built in memory
pub struct ParquetWriter {
    inner: ArrowWriter<Vec<u8>>,
    rows: usize,
}

impl ParquetWriter {
    pub fn new(schema: &SchemaRef, config: &ParquetWriterConfig) -> Result<Self> {
        let inner = ArrowWriter::try_new(Vec::new(), Arc::clone(schema), Some(config.properties()))
            .map_err(|e| Error::output(format!("cannot start Parquet file: {e}")))?;
        Ok(Self { inner, rows: 0 })
    }

    /// Append a batch; it must carry the writer's schema
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.inner
            .write(batch)
            .map_err(|e| Error::output(format!("cannot encode batch: {e}")))?;
        self.rows += batch.num_rows();
        Ok(())
    }

    /// Close the file, returning its bytes and row count
    pub fn finish(self) -> Result<(Bytes, usize)> {
        let rows = self.rows;
        let buffer = self
            .inner
            .into_inner()
            .map_err(|e| Error::output(format!("cannot close Parquet file: {e}")))?;
        Ok((Bytes::from(buffer), rows))
    }
}

/// Encode batches sharing `schema` into a single Parquet file
pub fn encode_batches(
    schema: &SchemaRef,
    batches: &[RecordBatch],
    config: &ParquetWriterConfig,
) -> Result<(Bytes, usize)> {
    let mut file = ParquetWriter::new(schema, config)?;
    for batch in batches {
        file.write(batch)?;
    }
    file.finish()
}
