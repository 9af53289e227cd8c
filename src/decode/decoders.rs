//! Line-delimited JSON decoder

use crate::types::{JsonObject, JsonValue};
use serde_json::Value;

/// Column that receives the raw text of lines that could not be decoded
pub const CORRUPT_RECORD_COLUMN: &str = "_corrupt_record";

/// Records decoded from one body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRecords {
    /// One JSON object per record
    pub records: Vec<JsonValue>,
    /// How many of the records are corrupt placeholders
    pub corrupt: usize,
}

/// JSONL decoder in permissive mode
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonlDecoder;

impl JsonlDecoder {
    /// Create a new JSONL decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode a body with one JSON value per line
    ///
    /// Objects become records, arrays contribute their object elements, and
    /// anything else becomes a `_corrupt_record` placeholder.
    pub fn decode(&self, body: &str) -> DecodedRecords {
        let mut out = DecodedRecords::default();

        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(line) {
                Ok(Value::Object(obj)) => out.records.push(Value::Object(obj)),
                Ok(Value::Array(items)) if items.iter().all(Value::is_object) => {
                    out.records.extend(items);
                }
                Ok(_) | Err(_) => {
                    out.records.push(corrupt_record(line));
                    out.corrupt += 1;
                }
            }
        }

        out
    }

    /// Decode raw bytes, replacing invalid UTF-8 sequences
    pub fn decode_bytes(&self, body: &[u8]) -> DecodedRecords {
        self.decode(&String::from_utf8_lossy(body))
    }
}

fn corrupt_record(line: &str) -> JsonValue {
    let mut obj = JsonObject::new();
    obj.insert(
        CORRUPT_RECORD_COLUMN.to_string(),
        Value::String(line.to_string()),
    );
    Value::Object(obj)
}
