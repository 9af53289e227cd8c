//! Storage module
//!
//! Object store access for job input and output.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Parsing locations (S3, GCS, Azure, local) into object store clients
//! - Listing input files with Hadoop-style glob patterns
//! - Reading, writing and clearing objects below a location

mod glob;
mod location;

pub use glob::GlobPattern;
pub use location::{Location, Scheme, StorageOptions};
