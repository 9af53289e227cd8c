//! CLI arguments

use crate::types::CompressionCodec;
use clap::Parser;
use std::path::PathBuf;

/// Load song and event JSON into a Parquet star schema
#[derive(Parser, Debug)]
#[command(name = "songplay-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Input root holding song_data/ and log_data/
    /// Supports: /path, file:///path, s3://bucket/path, s3a://bucket/path, gs://bucket/path, az://container/path
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output root for the Parquet tables
    #[arg(short, long)]
    pub output: Option<String>,

    /// Parquet compression codec
    #[arg(long)]
    pub compression: Option<CompressionCodec>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
