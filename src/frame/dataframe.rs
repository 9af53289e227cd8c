//! Partitioned in-memory frame

use super::expr::{col, resolve_column, Expr};
use super::join;
use super::schema::{arrow_to_json, infer_schema, json_to_arrow};
use crate::error::{Error, Result};
use arrow::array::{
    ArrayRef, AsArray, BooleanArray, Int64Array, RecordBatch, RecordBatchOptions, UInt32Array,
};
use arrow::compute::{cast, concat_batches, filter_record_batch, take_record_batch};
use arrow::datatypes::{DataType, Field, FieldRef, Schema, SchemaRef};
use arrow::row::{RowConverter, SortField};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Bits reserved for the row index in ids produced by [`Frame::with_monotonic_id`]
const ROW_ID_BITS: u32 = 33;

/// Columnar table split into partitions that share one schema
///
/// Reading produces one partition per input file. Row-wise operations keep the
/// partitioning; `distinct` gathers everything into a single partition.
#[derive(Debug, Clone)]
pub struct Frame {
    schema: SchemaRef,
    partitions: Vec<RecordBatch>,
}

/// Build a batch, keeping the row count even when there are no columns
fn batch_with_rows(schema: &SchemaRef, columns: Vec<ArrayRef>, rows: usize) -> Result<RecordBatch> {
    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    Ok(RecordBatch::try_new_with_options(
        Arc::clone(schema),
        columns,
        &options,
    )?)
}

impl Frame {
    /// Create a frame from batches that all carry `schema`
    pub fn try_new(schema: SchemaRef, partitions: Vec<RecordBatch>) -> Result<Self> {
        if let Some(bad) = partitions.iter().position(|b| b.schema() != schema) {
            return Err(Error::frame(format!(
                "partition {bad} does not match the frame schema"
            )));
        }
        Ok(Self { schema, partitions })
    }

    /// A frame with no rows
    pub fn empty(schema: SchemaRef) -> Self {
        Self {
            schema,
            partitions: Vec::new(),
        }
    }

    /// Build a frame from JSON records grouped into partitions
    ///
    /// One schema is inferred across all partitions.
    pub fn from_json_partitions(partitions: &[Vec<Value>]) -> Result<Self> {
        let schema = Arc::new(infer_schema(partitions.iter().flatten()));
        let batches = partitions
            .iter()
            .map(|records| json_to_arrow(records, &schema))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            schema,
            partitions: batches,
        })
    }

    /// Build a single-partition frame from JSON records
    pub fn from_json(records: &[Value]) -> Result<Self> {
        Self::from_json_partitions(std::slice::from_ref(&records.to_vec()))
    }

    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.fields().iter().map(|f| f.name().clone()).collect()
    }

    pub fn partitions(&self) -> &[RecordBatch] {
        &self.partitions
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    pub fn num_rows(&self) -> usize {
        self.partitions.iter().map(RecordBatch::num_rows).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Project columns by name
    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        let exprs: Vec<Expr> = columns.iter().map(|c| col(*c)).collect();
        self.select_exprs(&exprs)
    }

    /// Project expressions; each output column is named after its expression
    pub fn select_exprs(&self, exprs: &[Expr]) -> Result<Self> {
        if exprs.is_empty() {
            return Err(Error::frame("select needs at least one expression"));
        }

        for expr in exprs {
            let missing = expr.missing_columns(&self.schema);
            if !missing.is_empty() {
                tracing::warn!(
                    column = %expr.name(),
                    missing = ?missing,
                    "Selecting absent columns as nulls"
                );
            }
        }

        // Output types do not depend on the data, so probe them on an empty batch
        let probe = RecordBatch::new_empty(self.schema());
        let fields: Vec<Field> = exprs
            .iter()
            .map(|expr| {
                let array = expr.evaluate(&probe)?;
                Ok(Field::new(expr.name(), array.data_type().clone(), true))
            })
            .collect::<Result<_>>()?;
        let schema = Arc::new(Schema::new(fields));

        let partitions = self
            .partitions
            .iter()
            .map(|batch| {
                let columns = exprs
                    .iter()
                    .map(|expr| expr.evaluate(batch))
                    .collect::<Result<Vec<_>>>()?;
                batch_with_rows(&schema, columns, batch.num_rows())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { schema, partitions })
    }

    /// Add a column, or replace it if one with that name exists
    pub fn with_column(&self, name: &str, expr: Expr) -> Result<Self> {
        let existing = resolve_column(&self.schema, name)?;
        let probe = expr.evaluate(&RecordBatch::new_empty(self.schema()))?;
        let field: FieldRef = Arc::new(Field::new(name, probe.data_type().clone(), true));

        let mut fields: Vec<FieldRef> = self.schema.fields().iter().cloned().collect();
        match existing {
            Some(idx) => fields[idx] = field,
            None => fields.push(field),
        }
        let schema = Arc::new(Schema::new(fields));

        let partitions = self
            .partitions
            .iter()
            .map(|batch| {
                let array = expr.evaluate(batch)?;
                let mut columns = batch.columns().to_vec();
                match existing {
                    Some(idx) => columns[idx] = array,
                    None => columns.push(array),
                }
                batch_with_rows(&schema, columns, batch.num_rows())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { schema, partitions })
    }

    /// Rename a column; renaming an absent column is a no-op
    pub fn with_column_renamed(&self, from: &str, to: &str) -> Result<Self> {
        if !self.schema.fields().iter().any(|f| f.name() == from) {
            return Ok(self.clone());
        }

        let fields: Vec<FieldRef> = self
            .schema
            .fields()
            .iter()
            .map(|f| {
                if f.name() == from {
                    Arc::new(f.as_ref().clone().with_name(to))
                } else {
                    Arc::clone(f)
                }
            })
            .collect();
        let schema = Arc::new(Schema::new(fields));

        let partitions = self
            .partitions
            .iter()
            .map(|batch| batch_with_rows(&schema, batch.columns().to_vec(), batch.num_rows()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { schema, partitions })
    }

    /// Keep rows whose `column` equals `value`; nulls never match
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<Self> {
        let partitions = self
            .partitions
            .iter()
            .map(|batch| {
                let strings = cast(&col(column).evaluate(batch)?, &DataType::Utf8)?;
                let mask: BooleanArray = strings
                    .as_string::<i32>()
                    .iter()
                    .map(|v| Some(v == Some(value)))
                    .collect();
                Ok(filter_record_batch(batch, &mask)?)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            schema: self.schema(),
            partitions,
        })
    }

    /// Remove exact-duplicate rows, keeping the first occurrence
    ///
    /// All columns take part in the comparison. The result has a single
    /// partition (none when empty).
    pub fn distinct(&self) -> Result<Self> {
        let batch = self.collect()?;
        if batch.num_rows() == 0 {
            return Ok(Self::empty(self.schema()));
        }
        if batch.num_columns() == 0 {
            let single = batch_with_rows(&self.schema, Vec::new(), 1)?;
            return Ok(Self {
                schema: self.schema(),
                partitions: vec![single],
            });
        }

        let sort_fields = self
            .schema
            .fields()
            .iter()
            .map(|f| SortField::new(f.data_type().clone()))
            .collect();
        let converter = RowConverter::new(sort_fields)?;
        let rows = converter.convert_columns(batch.columns())?;

        let mut seen = HashSet::with_capacity(rows.num_rows());
        let keep: Vec<u32> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| seen.insert(*row))
            .map(|(idx, _)| idx as u32)
            .collect();

        let deduped = take_record_batch(&batch, &UInt32Array::from(keep))?;
        Ok(Self {
            schema: self.schema(),
            partitions: vec![deduped],
        })
    }

    /// Inner equality join on `self.left_on == right.right_on`
    ///
    /// Output columns are this frame's followed by `right`'s. Keys compare as
    /// strings; null keys never match.
    pub fn inner_join(&self, right: &Frame, left_on: &str, right_on: &str) -> Result<Self> {
        join::inner_join(self, right, left_on, right_on)
    }

    /// Append an Int64 id column that increases within each partition
    ///
    /// The id is `(partition_index << 33) + row_index`: unique and increasing
    /// across the frame, but neither dense nor stable between runs.
    pub fn with_monotonic_id(&self, name: &str) -> Result<Self> {
        let mut fields: Vec<FieldRef> = self.schema.fields().iter().cloned().collect();
        fields.push(Arc::new(Field::new(name, DataType::Int64, false)));
        let schema = Arc::new(Schema::new(fields));

        let partitions = self
            .partitions
            .iter()
            .enumerate()
            .map(|(partition, batch)| {
                let base = (partition as i64) << ROW_ID_BITS;
                let ids = Int64Array::from_iter_values(
                    (0..batch.num_rows()).map(|row| base + row as i64),
                );
                let mut columns = batch.columns().to_vec();
                columns.push(Arc::new(ids));
                batch_with_rows(&schema, columns, batch.num_rows())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { schema, partitions })
    }

    /// Concatenate all partitions into one batch
    pub fn collect(&self) -> Result<RecordBatch> {
        if self.schema.fields().is_empty() {
            return batch_with_rows(&self.schema, Vec::new(), self.num_rows());
        }
        Ok(concat_batches(&self.schema, &self.partitions)?)
    }

    /// All rows as JSON objects, in partition order
    pub fn to_json(&self) -> Result<Vec<Value>> {
        let mut records = Vec::with_capacity(self.num_rows());
        for batch in &self.partitions {
            records.extend(arrow_to_json(batch)?);
        }
        Ok(records)
    }
}
