//! Input decoder module
//!
//! Reads newline-delimited JSON datasets from a storage location.
//!
//! # Overview
//!
//! Decoding is permissive: a line that is not a JSON object is kept as a
//! record holding only the raw text under [`CORRUPT_RECORD_COLUMN`], so a
//! bad line never aborts the job and never invents values for real columns.

mod decoders;
mod reader;

pub use decoders::{DecodedRecords, JsonlDecoder, CORRUPT_RECORD_COLUMN};
pub use reader::{read_json_records, InputFile};
