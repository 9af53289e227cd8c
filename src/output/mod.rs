//! Output module
//!
//! Writes frames as Parquet datasets.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Encoding Arrow RecordBatches as Parquet bytes
//! - Overwriting a table location with Hive-style partition directories
//! - Reporting what was written

mod partitioned;
mod writer;

pub use partitioned::{
    escape_partition_value, partition_dir, TableWriter, DEFAULT_PARTITION_VALUE, SUCCESS_MARKER,
};
pub use writer::{encode_batches, ParquetWriter, ParquetWriterConfig, DEFAULT_ROW_GROUP_SIZE};
