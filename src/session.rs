//! Job session
//!
//! A [`Session`] carries everything the stages share: storage credentials
//! scoped to this run and the Parquet writer settings. Nothing is exported
//! into the process environment; every store client is built from the
//! session's [`StorageOptions`].

use crate::config::Settings;
use crate::decode::read_json_records;
use crate::error::Result;
use crate::frame::Frame;
use crate::output::{ParquetWriterConfig, TableWriter};
use crate::storage::{Location, StorageOptions};

/// Shared state of one ETL run
#[derive(Debug, Clone)]
pub struct Session {
    storage: StorageOptions,
    writer_config: ParquetWriterConfig,
}

impl Session {
    /// Create a session from explicit parts
    pub fn new(storage: StorageOptions, writer_config: ParquetWriterConfig) -> Self {
        Self {
            storage,
            writer_config,
        }
    }

    /// Create a session from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        let storage = StorageOptions::with_credentials(settings.credentials.clone());
        let writer_config = ParquetWriterConfig::new().with_codec(settings.compression);

        tracing::debug!(
            region = settings.credentials.region.as_deref().unwrap_or("default"),
            compression = ?settings.compression,
            "Session initialized"
        );

        Self::new(storage, writer_config)
    }

    /// Parquet settings for every table write
    pub fn writer_config(&self) -> &ParquetWriterConfig {
        &self.writer_config
    }

    /// Open a location (URL or local path) with this session's credentials
    pub fn open(&self, location: &str) -> Result<Location> {
        Location::parse(location, &self.storage)
    }

    /// Read newline-delimited JSON files matching `pattern` below `location`
    ///
    /// Each file becomes one partition of the frame.
    pub async fn read_json(&self, location: &Location, pattern: &str) -> Result<Frame> {
        let files = read_json_records(location, pattern).await?;
        let partitions: Vec<_> = files.into_iter().map(|f| f.records).collect();
        Frame::from_json_partitions(&partitions)
    }

    /// Overwrite writer for the table stored at `relative` below `root`
    pub fn table_writer(&self, root: &Location, relative: &str) -> TableWriter {
        TableWriter::new(root.child(relative), self.writer_config.clone())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(StorageOptions::new(), ParquetWriterConfig::default())
    }
}
