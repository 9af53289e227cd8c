//! Common types used throughout songplay-etl
//!
//! This module contains shared type definitions and type aliases
//! used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Output Compression
// ============================================================================

/// Parquet compression codec selectable from config and CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    /// Snappy (default, matches the usual lake layout)
    #[default]
    Snappy,
    /// Zstandard
    Zstd,
    /// Gzip
    Gzip,
    /// No compression
    None,
}

impl CompressionCodec {
    /// File name suffix used for data files written with this codec
    pub fn file_suffix(self) -> &'static str {
        match self {
            CompressionCodec::Snappy => ".snappy.parquet",
            CompressionCodec::Zstd => ".zstd.parquet",
            CompressionCodec::Gzip => ".gz.parquet",
            CompressionCodec::None => ".parquet",
        }
    }
}

// ============================================================================
// Table Reports
// ============================================================================

/// Summary of one table written by a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    /// Table name (songs, artists, users, time, songplays)
    pub table: String,
    /// Where the table was written
    pub location: String,
    /// Rows written across all files
    pub rows: usize,
    /// Data files written (markers excluded)
    pub files: usize,
}

impl fmt::Display for TableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} rows in {} files at {}",
            self.table, self.rows, self.files, self.location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_default() {
        assert_eq!(CompressionCodec::default(), CompressionCodec::Snappy);
    }

    #[test]
    fn test_compression_serde() {
        let codec: CompressionCodec = serde_json::from_str("\"gzip\"").unwrap();
        assert_eq!(codec, CompressionCodec::Gzip);
        assert_eq!(codec.file_suffix(), ".gz.parquet");
    }

    #[test]
    fn test_table_report_display() {
        let report = TableReport {
            table: "songs".to_string(),
            location: "file:///tmp/out/songs/songs.parquet".to_string(),
            rows: 3,
            files: 2,
        };
        assert_eq!(
            report.to_string(),
            "songs: 3 rows in 2 files at file:///tmp/out/songs/songs.parquet"
        );
    }
}
