//! Typed in-memory column table
//!
//! The extraction job holds the query result as columns rather than rows, so
//! it maps directly onto Arrow arrays when written out. The value model is
//! deliberately small: everything the JDBC reader decodes lands in one of
//! six shapes, with nulls carried per cell.

use chrono::{DateTime, Utc};
use lakeflow_common::{LakeflowError, Result};

/// Column name added to every result before writing.
pub const INGESTION_TIMESTAMP_COLUMN: &str = "ingestion_timestamp";

/// Directory name Spark-compatible readers use for a null partition value.
pub const NULL_PARTITION_VALUE: &str = "__HIVE_DEFAULT_PARTITION__";

/// The values of one column, with per-cell nulls.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Bool(Vec<Option<bool>>),
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
    /// Microseconds since the Unix epoch.
    TimestampMicros(Vec<Option<i64>>),
    /// Days since the Unix epoch.
    Date32(Vec<Option<i32>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Bool(v) => v.len(),
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::Float64(v) => v.len(),
            ColumnValues::Utf8(v) => v.len(),
            ColumnValues::TimestampMicros(v) => v.len(),
            ColumnValues::Date32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out the cells at `indices`, preserving order.
    fn gather(&self, indices: &[usize]) -> ColumnValues {
        match self {
            ColumnValues::Bool(v) => {
                ColumnValues::Bool(indices.iter().map(|&i| v[i]).collect())
            },
            ColumnValues::Int64(v) => {
                ColumnValues::Int64(indices.iter().map(|&i| v[i]).collect())
            },
            ColumnValues::Float64(v) => {
                ColumnValues::Float64(indices.iter().map(|&i| v[i]).collect())
            },
            ColumnValues::Utf8(v) => {
                ColumnValues::Utf8(indices.iter().map(|&i| v[i].clone()).collect())
            },
            ColumnValues::TimestampMicros(v) => {
                ColumnValues::TimestampMicros(indices.iter().map(|&i| v[i]).collect())
            },
            ColumnValues::Date32(v) => {
                ColumnValues::Date32(indices.iter().map(|&i| v[i]).collect())
            },
        }
    }

    fn slice(&self, offset: usize, len: usize) -> ColumnValues {
        match self {
            ColumnValues::Bool(v) => ColumnValues::Bool(v[offset..offset + len].to_vec()),
            ColumnValues::Int64(v) => ColumnValues::Int64(v[offset..offset + len].to_vec()),
            ColumnValues::Float64(v) => ColumnValues::Float64(v[offset..offset + len].to_vec()),
            ColumnValues::Utf8(v) => ColumnValues::Utf8(v[offset..offset + len].to_vec()),
            ColumnValues::TimestampMicros(v) => {
                ColumnValues::TimestampMicros(v[offset..offset + len].to_vec())
            },
            ColumnValues::Date32(v) => ColumnValues::Date32(v[offset..offset + len].to_vec()),
        }
    }

    /// Render one cell for use in a partition directory name.
    fn render_cell(&self, index: usize) -> String {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| NULL_PARTITION_VALUE.to_string())
        }

        match self {
            ColumnValues::Bool(v) => opt(&v[index]),
            ColumnValues::Int64(v) => opt(&v[index]),
            ColumnValues::Float64(v) => opt(&v[index]),
            ColumnValues::Utf8(v) => opt(&v[index]),
            ColumnValues::TimestampMicros(v) => opt(&v[index]),
            ColumnValues::Date32(v) => opt(&v[index]),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

/// A query result held column-wise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnTable {
    pub columns: Vec<Column>,
}

impl ColumnTable {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.values.len();
            if columns.iter().any(|c| c.values.len() != rows) {
                return Err(LakeflowError::Unknown(
                    "column lengths differ within one table".to_string(),
                ));
            }
        }
        Ok(Self { columns })
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Append the `ingestion_timestamp` column, one constant value per row.
    pub fn with_ingestion_timestamp(mut self, now: DateTime<Utc>) -> Self {
        let micros = now.timestamp_micros();
        let rows = self.row_count();
        self.columns.push(Column {
            name: INGESTION_TIMESTAMP_COLUMN.to_string(),
            values: ColumnValues::TimestampMicros(vec![Some(micros); rows]),
        });
        self
    }

    /// A contiguous row slice as a new table.
    pub fn slice(&self, offset: usize, len: usize) -> ColumnTable {
        ColumnTable {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values.slice(offset, len),
                })
                .collect(),
        }
    }

    /// Split rows into groups by the rendered value of `partition_column`,
    /// removing that column from each group's payload. Group order follows
    /// first appearance.
    ///
    /// Returns `None` when the column is not present.
    pub fn partition_by(&self, partition_column: &str) -> Option<Vec<(String, ColumnTable)>> {
        let partition = self.columns.iter().find(|c| c.name == partition_column)?;

        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for row in 0..self.row_count() {
            let value = partition.values.render_cell(row);
            match groups.iter_mut().find(|(v, _)| *v == value) {
                Some((_, indices)) => indices.push(row),
                None => groups.push((value, vec![row])),
            }
        }

        let tables = groups
            .into_iter()
            .map(|(value, indices)| {
                let columns = self
                    .columns
                    .iter()
                    .filter(|c| c.name != partition_column)
                    .map(|c| Column {
                        name: c.name.clone(),
                        values: c.values.gather(&indices),
                    })
                    .collect();
                (value, ColumnTable { columns })
            })
            .collect();

        Some(tables)
    }
}
