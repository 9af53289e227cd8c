//! Column expressions evaluated against a RecordBatch

use crate::error::{Error, Result};
use arrow::array::{new_null_array, ArrayRef, RecordBatch};
use arrow::datatypes::{DataType, Schema};
use std::fmt;

/// A named one-argument column function
#[derive(Clone, Copy)]
pub struct ScalarFunction {
    name: &'static str,
    eval: fn(&ArrayRef) -> Result<ArrayRef>,
}

impl ScalarFunction {
    /// Wrap a column function under a name
    pub const fn new(name: &'static str, eval: fn(&ArrayRef) -> Result<ArrayRef>) -> Self {
        Self { name, eval }
    }

    /// Function name, used in derived column names
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the function to an expression
    pub fn call(self, arg: Expr) -> Expr {
        Expr::Function {
            func: self,
            arg: Box::new(arg),
        }
    }
}

impl fmt::Debug for ScalarFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScalarFunction").field(&self.name).finish()
    }
}

/// Column expression
#[derive(Debug, Clone)]
pub enum Expr {
    /// Reference to an input column
    Column(String),
    /// Renamed expression
    Alias { expr: Box<Expr>, name: String },
    /// Scalar function applied per row
    Function { func: ScalarFunction, arg: Box<Expr> },
}

/// Reference a column by name
pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

impl Expr {
    /// Give the expression an output name
    #[must_use]
    pub fn alias(self, name: impl Into<String>) -> Expr {
        Expr::Alias {
            expr: Box::new(self),
            name: name.into(),
        }
    }

    /// Output column name
    pub fn name(&self) -> String {
        match self {
            Expr::Column(name) | Expr::Alias { name, .. } => name.clone(),
            Expr::Function { func, arg } => format!("{}({})", func.name, arg.name()),
        }
    }

    /// Input columns this expression reads that are absent from `schema`
    pub fn missing_columns(&self, schema: &Schema) -> Vec<String> {
        match self {
            Expr::Column(name) => {
                if schema.fields().iter().any(|f| f.name() == name) {
                    Vec::new()
                } else {
                    vec![name.clone()]
                }
            }
            Expr::Alias { expr, .. } => expr.missing_columns(schema),
            Expr::Function { arg, .. } => arg.missing_columns(schema),
        }
    }

    /// Evaluate against a batch
    ///
    /// A column absent from the batch evaluates to all nulls; a column name
    /// present more than once is an error.
    pub fn evaluate(&self, batch: &RecordBatch) -> Result<ArrayRef> {
        match self {
            Expr::Column(name) => match resolve_column(batch.schema_ref(), name)? {
                Some(idx) => Ok(batch.column(idx).clone()),
                None => Ok(new_null_array(&DataType::Null, batch.num_rows())),
            },
            Expr::Alias { expr, .. } => expr.evaluate(batch),
            Expr::Function { func, arg } => {
                let input = arg.evaluate(batch)?;
                (func.eval)(&input).map_err(|e| Error::function(func.name, e.to_string()))
            }
        }
    }
}

/// Find a column by name; `None` when absent, an error when ambiguous
pub fn resolve_column(schema: &Schema, name: &str) -> Result<Option<usize>> {
    let mut matches = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| f.name() == name)
        .map(|(idx, _)| idx);

    match (matches.next(), matches.next()) {
        (Some(idx), None) => Ok(Some(idx)),
        (None, _) => Ok(None),
        (Some(_), Some(_)) => Err(Error::AmbiguousColumn {
            column: name.to_string(),
        }),
    }
}
