//! Overwrite writes with Hive-style partition directories
//!
//! Layout of a table written with `partition_by(["year", "month"])`:
//!
//! ```text
//! songplays.parquet/
//!   year=2018/month=11/part-00000.snappy.parquet
//!   _SUCCESS
//! ```
//!
//! Partition columns live only in the directory names, not in the files.

use super::writer::{encode_batches, ParquetWriterConfig};
use crate::error::{Error, Result};
use crate::frame::{resolve_column, Frame};
use crate::storage::Location;
use crate::types::TableReport;
use arrow::array::{Array, AsArray, UInt32Array};
use arrow::compute::{cast, take_record_batch};
use arrow::datatypes::DataType;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Directory value used for null or empty partition values
pub const DEFAULT_PARTITION_VALUE: &str = "__HIVE_DEFAULT_PARTITION__";

/// Marker object written after all data files of a table
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Percent-escape characters that are unsafe in a partition directory name
pub fn escape_partition_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        let needs_escape = c.is_ascii_control()
            || matches!(
                c,
                '"' | '#' | '%' | '\'' | '*' | '/' | ':' | '=' | '?' | '\\' | '{' | '[' | ']' | '^'
            );
        if needs_escape {
            let _ = write!(escaped, "%{:02X}", c as u32);
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// `col1=v1/col2=v2` for one partition
pub fn partition_dir(columns: &[String], values: &[Option<&str>]) -> String {
    columns
        .iter()
        .zip(values)
        .map(|(column, value)| {
            let rendered = match value {
                Some(v) if !v.is_empty() => escape_partition_value(v),
                _ => DEFAULT_PARTITION_VALUE.to_string(),
            };
            format!("{}={rendered}", escape_partition_value(column))
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Writes frames to a table location, replacing whatever was there
#[derive(Debug, Clone)]
pub struct TableWriter {
    location: Location,
    partition_by: Vec<String>,
    config: ParquetWriterConfig,
}

impl TableWriter {
    /// Writer for one table location
    pub fn new(location: Location, config: ParquetWriterConfig) -> Self {
        Self {
            location,
            partition_by: Vec::new(),
            config,
        }
    }

    /// Partition the output by these columns, in order
    #[must_use]
    pub fn partition_by(mut self, columns: &[&str]) -> Self {
        self.partition_by = columns.iter().map(ToString::to_string).collect();
        self
    }

    /// Table location
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Replace the table contents with `frame`
    pub async fn overwrite(&self, table: &str, frame: &Frame) -> Result<TableReport> {
        let removed = self.location.clear().await?;
        if removed > 0 {
            tracing::debug!(table, removed, location = %self.location, "Cleared previous output");
        }

        let (rows, files) = if self.partition_by.is_empty() {
            self.write_unpartitioned(frame).await?
        } else {
            self.write_partitioned(table, frame).await?
        };

        self.location.write(SUCCESS_MARKER, Bytes::new()).await?;

        let report = TableReport {
            table: table.to_string(),
            location: self.location.to_string(),
            rows,
            files,
        };
        tracing::info!(
            table,
            rows,
            files,
            location = %report.location,
            "Wrote table"
        );
        Ok(report)
    }

    fn file_name(&self, index: usize) -> String {
        format!("part-{index:05}{}", self.config.file_suffix())
    }

    /// One file, written even when empty so the schema survives
    async fn write_unpartitioned(&self, frame: &Frame) -> Result<(usize, usize)> {
        let schema = frame.schema();
        let (data, rows) = encode_batches(&schema, frame.partitions(), &self.config)?;
        self.location.write(&self.file_name(0), data).await?;
        Ok((rows, 1))
    }

    async fn write_partitioned(&self, table: &str, frame: &Frame) -> Result<(usize, usize)> {
        let schema = frame.schema();

        let mut key_indices = Vec::with_capacity(self.partition_by.len());
        for column in &self.partition_by {
            let idx = resolve_column(&schema, column)?.ok_or_else(|| {
                Error::output(format!("partition column '{column}' not found in {table}"))
            })?;
            key_indices.push(idx);
        }

        let data_indices: Vec<usize> = (0..schema.fields().len())
            .filter(|idx| !key_indices.contains(idx))
            .collect();
        if data_indices.is_empty() {
            return Err(Error::output(format!(
                "cannot partition {table} by every one of its columns"
            )));
        }

        let batch = frame.collect()?;
        let key_columns = key_indices
            .iter()
            .map(|&idx| cast(batch.column(idx), &DataType::Utf8))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut groups: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for row in 0..batch.num_rows() {
            let values: Vec<Option<&str>> = key_columns
                .iter()
                .map(|keys| {
                    let keys = keys.as_string::<i32>();
                    keys.is_valid(row).then(|| keys.value(row))
                })
                .collect();
            groups
                .entry(partition_dir(&self.partition_by, &values))
                .or_default()
                .push(row as u32);
        }

        let data = batch.project(&data_indices)?;
        let data_schema = data.schema();
        let files = groups.len();
        let mut rows = 0;

        for (index, (dir, indices)) in groups.into_iter().enumerate() {
            let part = take_record_batch(&data, &UInt32Array::from(indices))?;
            let (bytes, written) =
                encode_batches(&data_schema, std::slice::from_ref(&part), &self.config)?;
            let path = format!("{dir}/{}", self.file_name(index));
            self.location.write(&path, bytes).await?;
            tracing::debug!(table, partition = %dir, rows = written, "Wrote partition");
            rows += written;
        }

        Ok((rows, files))
    }
}
