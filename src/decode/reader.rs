//! Dataset reader: glob listing plus per-file decoding

use super::decoders::JsonlDecoder;
use crate::error::{Error, Result, ResultExt};
use crate::storage::{GlobPattern, Location};
use crate::types::JsonValue;

/// Records read from one input file
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Full path of the file, for logs
    pub path: String,
    /// Decoded records, corrupt placeholders included
    pub records: Vec<JsonValue>,
}

/// Read every file below `location` matching `pattern`
///
/// Files come back sorted by path, one entry per file. A pattern that matches
/// nothing is an error, the same way a read of a missing path fails.
pub async fn read_json_records(location: &Location, pattern: &str) -> Result<Vec<InputFile>> {
    let glob = GlobPattern::new(pattern)?;
    let paths = location.list_matching(&glob).await?;

    if paths.is_empty() {
        return Err(Error::NoInputFiles {
            location: location.to_string(),
            pattern: pattern.to_string(),
        });
    }

    let decoder = JsonlDecoder::new();
    let mut files = Vec::with_capacity(paths.len());
    let mut corrupt_total = 0usize;

    for path in paths {
        let file_path = location.display_path(&path);
        let body = location
            .read(&path)
            .await
            .with_context(|| format!("Failed to read {file_path}"))?;
        let decoded = decoder.decode_bytes(&body);

        if decoded.corrupt > 0 {
            tracing::warn!(
                file = %file_path,
                corrupt = decoded.corrupt,
                "Kept undecodable lines as corrupt records"
            );
        }
        corrupt_total += decoded.corrupt;

        tracing::debug!(file = %file_path, records = decoded.records.len(), "Decoded file");
        files.push(InputFile {
            path: file_path,
            records: decoded.records,
        });
    }

    tracing::info!(
        location = %location,
        pattern,
        files = files.len(),
        records = files.iter().map(|f| f.records.len()).sum::<usize>(),
        corrupt = corrupt_total,
        "Read JSON dataset"
    );

    Ok(files)
}
