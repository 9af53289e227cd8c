//! Hash inner join

use super::dataframe::Frame;
use super::expr::col;
use crate::error::Result;
use arrow::array::{ArrayRef, AsArray, RecordBatch, RecordBatchOptions, StringArray, UInt32Array};
use arrow::compute::{cast, take};
use arrow::datatypes::{DataType, FieldRef, Schema};
use std::collections::HashMap;
use std::sync::Arc;

/// Join keys of one batch rendered as strings
fn key_strings(batch: &RecordBatch, column: &str) -> Result<StringArray> {
    let keys = cast(&col(column).evaluate(batch)?, &DataType::Utf8)?;
    Ok(keys.as_string::<i32>().clone())
}

fn take_all(columns: &[ArrayRef], indices: &UInt32Array) -> Result<Vec<ArrayRef>> {
    columns
        .iter()
        .map(|c| Ok(take(c.as_ref(), indices, None)?))
        .collect()
}

/// Build side is `right`, probed by every partition of `left`
///
/// The output keeps `left`'s partitioning.
pub(super) fn inner_join(
    left: &Frame,
    right: &Frame,
    left_on: &str,
    right_on: &str,
) -> Result<Frame> {
    let build = right.collect()?;
    let build_keys = key_strings(&build, right_on)?;

    let mut table: HashMap<&str, Vec<u32>> = HashMap::new();
    for (row, key) in build_keys.iter().enumerate() {
        if let Some(key) = key {
            table.entry(key).or_default().push(row as u32);
        }
    }

    let fields: Vec<FieldRef> = left
        .schema()
        .fields()
        .iter()
        .chain(right.schema().fields().iter())
        .cloned()
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let mut partitions = Vec::with_capacity(left.num_partitions());
    let mut matched = 0usize;

    for batch in left.partitions() {
        let probe_keys = key_strings(batch, left_on)?;
        let mut left_rows: Vec<u32> = Vec::new();
        let mut right_rows: Vec<u32> = Vec::new();

        for (row, key) in probe_keys.iter().enumerate() {
            if let Some(hits) = key.and_then(|k| table.get(k)) {
                for &hit in hits {
                    left_rows.push(row as u32);
                    right_rows.push(hit);
                }
            }
        }

        let rows = left_rows.len();
        let mut columns = take_all(batch.columns(), &UInt32Array::from(left_rows))?;
        columns.extend(take_all(build.columns(), &UInt32Array::from(right_rows))?);

        let options = RecordBatchOptions::new().with_row_count(Some(rows));
        partitions.push(RecordBatch::try_new_with_options(
            Arc::clone(&schema),
            columns,
            &options,
        )?);
        matched += rows;
    }

    tracing::debug!(
        left_on,
        right_on,
        build_rows = build.num_rows(),
        matched,
        "Inner join complete"
    );

    Frame::try_new(schema, partitions)
}
