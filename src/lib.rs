//! # songplay-etl
//!
//! A batch job that turns raw song metadata and user activity logs (newline
//! delimited JSON) into a star schema of Parquet tables.
//!
//! ## Tables
//!
//! - **songs**: distinct songs, partitioned by `year` and `artist_id`
//! - **artists**: distinct artists
//! - **users**: distinct users seen in song play events
//! - **time**: distinct play start times broken into calendar fields,
//!   partitioned by `year` and `month`
//! - **songplays**: play events matched to songs by artist name, partitioned
//!   by `year` and `month`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use songplay_etl::{config::Settings, pipeline, session::Session, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = Settings::load("dl.yaml")?.with_output("s3a://my-lake/");
//!     let session = Session::from_settings(&settings);
//!
//!     let input = session.open(&settings.input)?;
//!     let output = session.open(&settings.output)?;
//!
//!     for report in pipeline::run(&session, &input, &output).await? {
//!         println!("{report}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  cli::Runner     Settings → Session → song stage → log stage │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────┬──────────┬──────┴──────┬───────────┬────────────┐
//! │  Storage  │  Decode  │    Frame    │  Output   │  Config    │
//! ├───────────┼──────────┼─────────────┼───────────┼────────────┤
//! │ S3 / GCS  │ JSONL    │ Select      │ Parquet   │ YAML       │
//! │ Azure     │ Corrupt  │ Filter      │ Hive dirs │ Credentials│
//! │ Local     │ records  │ Distinct    │ Overwrite │ Overrides  │
//! │ Globs     │          │ Join, Ids   │ _SUCCESS  │            │
//! └───────────┴──────────┴─────────────┴───────────┴────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the job
pub mod error;

/// Common types and type aliases
pub mod types;

/// Configuration file and settings
pub mod config;

/// Object store locations and glob listing
pub mod storage;

/// Newline-delimited JSON input
pub mod decode;

/// Partitioned Arrow dataframe
pub mod frame;

/// Parquet output
pub mod output;

/// Shared state of a run
pub mod session;

/// Song and log stages
pub mod pipeline;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::Settings;
pub use frame::Frame;
pub use session::Session;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
