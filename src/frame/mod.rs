//! Frame module
//!
//! A small partitioned dataframe over Arrow RecordBatches, enough to express
//! the job's table derivations.
//!
//! # Overview
//!
//! This module provides:
//! - Schema inference and JSON to Arrow conversion
//! - Projection with column expressions and scalar functions
//! - Equality filters, exact-row deduplication and hash inner joins
//! - Synthetic monotonically increasing row ids

mod dataframe;
mod expr;
pub mod functions;
mod join;
mod schema;

pub use dataframe::Frame;
pub use expr::{col, resolve_column, Expr, ScalarFunction};
pub use schema::{arrow_to_json, infer_schema, json_to_arrow};

#[cfg(test)]
mod tests;
