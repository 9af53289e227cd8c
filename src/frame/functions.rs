//! Scalar functions over Arrow arrays
//!
//! Every function takes one column and returns a column of the same length.
//! Nulls in, nulls out: a null or unparsable input never fails the call.

use super::expr::{Expr, ScalarFunction};
use crate::error::Result;
use arrow::array::{ArrayRef, AsArray, Int32Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::sync::Arc;

/// Format used for the datetime strings derived from event timestamps
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Timestamp conversions
// ============================================================================

/// Epoch milliseconds to fractional epoch seconds (Float64)
pub fn epoch_millis_to_seconds(values: &ArrayRef) -> Result<ArrayRef> {
    let millis = cast(values, &DataType::Float64)?;
    let seconds = millis
        .as_primitive::<Float64Type>()
        .unary::<_, Float64Type>(|ms| ms / 1000.0);
    Ok(Arc::new(seconds))
}

/// Epoch seconds to a `YYYY-MM-DD HH:MM:SS` string (UTC)
///
/// Fractional seconds are truncated before formatting.
pub fn format_epoch_seconds(values: &ArrayRef) -> Result<ArrayRef> {
    let seconds = cast(values, &DataType::Float64)?;
    let formatted: StringArray = seconds
        .as_primitive::<Float64Type>()
        .iter()
        .map(|value| {
            value
                .filter(|s| s.is_finite())
                .and_then(|s| DateTime::from_timestamp(s.trunc() as i64, 0))
                .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        })
        .collect();
    Ok(Arc::new(formatted))
}

// ============================================================================
// Calendar extraction
// ============================================================================

/// Parse the datetime shapes the job produces or accepts as input
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn extract(values: &ArrayRef, field: impl Fn(&NaiveDateTime) -> i32) -> Result<ArrayRef> {
    let strings = cast(values, &DataType::Utf8)?;
    let extracted: Int32Array = strings
        .as_string::<i32>()
        .iter()
        .map(|value| value.and_then(parse_datetime).map(|dt| field(&dt)))
        .collect();
    Ok(Arc::new(extracted))
}

/// Hour of day (0-23)
pub fn hour_of(values: &ArrayRef) -> Result<ArrayRef> {
    extract(values, |dt| dt.hour() as i32)
}

/// Day of month (1-31)
pub fn day_of_month_of(values: &ArrayRef) -> Result<ArrayRef> {
    extract(values, |dt| dt.day() as i32)
}

/// ISO-8601 week of year (1-53)
pub fn week_of_year_of(values: &ArrayRef) -> Result<ArrayRef> {
    extract(values, |dt| dt.iso_week().week() as i32)
}

/// Month (1-12)
pub fn month_of(values: &ArrayRef) -> Result<ArrayRef> {
    extract(values, |dt| dt.month() as i32)
}

/// Calendar year
pub fn year_of(values: &ArrayRef) -> Result<ArrayRef> {
    extract(values, |dt| dt.year())
}

/// Day of week, 1 = Sunday through 7 = Saturday
pub fn day_of_week_of(values: &ArrayRef) -> Result<ArrayRef> {
    extract(values, |dt| dt.weekday().number_from_sunday() as i32)
}

// ============================================================================
// Expression helpers
// ============================================================================

/// `hour(expr)`
pub fn hour(expr: Expr) -> Expr {
    ScalarFunction::new("hour", hour_of).call(expr)
}

/// `dayofmonth(expr)`
pub fn dayofmonth(expr: Expr) -> Expr {
    ScalarFunction::new("dayofmonth", day_of_month_of).call(expr)
}

/// `weekofyear(expr)`
pub fn weekofyear(expr: Expr) -> Expr {
    ScalarFunction::new("weekofyear", week_of_year_of).call(expr)
}

/// `month(expr)`
pub fn month(expr: Expr) -> Expr {
    ScalarFunction::new("month", month_of).call(expr)
}

/// `year(expr)`
pub fn year(expr: Expr) -> Expr {
    ScalarFunction::new("year", year_of).call(expr)
}

/// `dayofweek(expr)`
pub fn dayofweek(expr: Expr) -> Expr {
    ScalarFunction::new("dayofweek", day_of_week_of).call(expr)
}
