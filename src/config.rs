//! Job configuration
//!
//! The job reads a small YAML file with a credentials section plus optional
//! path and Parquet settings:
//!
//! ```yaml
//! AWS_CREDENTIALS:
//!   AWS_ACCESS_KEY_ID: AKIA...
//!   AWS_SECRET_ACCESS_KEY: ...
//! paths:
//!   input: s3a://udacity-dend/
//!   output: s3a://my-bucket/lake/
//! parquet:
//!   compression: snappy
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::types::CompressionCodec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dl.yaml";

/// Input root used when neither the config file nor the CLI provide one
pub const DEFAULT_INPUT: &str = "s3a://udacity-dend/";

/// Output root used when neither the config file nor the CLI provide one.
/// Empty on purpose: the job refuses to run until an output is configured.
pub const DEFAULT_OUTPUT: &str = "";

const CREDENTIALS_SECTION: &str = "AWS_CREDENTIALS";

// ============================================================================
// Raw file layout
// ============================================================================

/// Configuration file as written on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Object store credentials
    #[serde(rename = "AWS_CREDENTIALS", default)]
    pub credentials: Option<CredentialsSection>,

    /// Input/output roots
    #[serde(default)]
    pub paths: PathsSection,

    /// Parquet output settings
    #[serde(default)]
    pub parquet: ParquetSection,
}

/// `AWS_CREDENTIALS` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsSection {
    #[serde(rename = "AWS_ACCESS_KEY_ID", default)]
    pub access_key_id: Option<String>,

    #[serde(rename = "AWS_SECRET_ACCESS_KEY", default)]
    pub secret_access_key: Option<String>,

    #[serde(rename = "AWS_DEFAULT_REGION", default)]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...)
    #[serde(rename = "AWS_ENDPOINT", default)]
    pub endpoint: Option<String>,
}

/// `paths` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsSection {
    #[serde(default)]
    pub input: Option<String>,

    #[serde(default)]
    pub output: Option<String>,
}

/// `parquet` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParquetSection {
    #[serde(default)]
    pub compression: CompressionCodec,
}

// ============================================================================
// Validated settings
// ============================================================================

/// Credentials handed to object store clients
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Validated job settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub input: String,
    pub output: String,
    pub compression: CompressionCodec,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        Self::from_file(file)
    }

    /// Validate a parsed config file
    pub fn from_file(file: ConfigFile) -> Result<Self> {
        let section = file
            .credentials
            .ok_or_else(|| Error::missing_field(CREDENTIALS_SECTION))?;

        let access_key_id = required(section.access_key_id, "AWS_ACCESS_KEY_ID")?;
        let secret_access_key = required(section.secret_access_key, "AWS_SECRET_ACCESS_KEY")?;

        Ok(Self {
            credentials: Credentials {
                access_key_id,
                secret_access_key,
                region: section.region.filter(|r| !r.is_empty()),
                endpoint: section.endpoint.filter(|e| !e.is_empty()),
            },
            input: file
                .paths
                .input
                .unwrap_or_else(|| DEFAULT_INPUT.to_string()),
            output: file
                .paths
                .output
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
            compression: file.parquet.compression,
        })
    }

    /// Replace the input root
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    /// Replace the output root
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Replace the compression codec
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionCodec) -> Self {
        self.compression = compression;
        self
    }
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    let field = format!("{CREDENTIALS_SECTION}.{key}");
    match value {
        None => Err(Error::missing_field(field)),
        Some(v) if v.trim().is_empty() => Err(Error::invalid_value(field, "value is empty")),
        Some(v) => Ok(v),
    }
}
