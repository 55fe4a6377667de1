//! Parquet encoding/decoding for extraction output
//!
//! One [`ColumnTable`] becomes one Parquet file. Reads are projected to a
//! single column, which is all the watermark computation needs.

use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use lakeflow_common::{LakeflowError, Result};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::arrow::ProjectionMask;
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;

use crate::table::{ColumnTable, ColumnValues};

fn writer_properties() -> WriterProperties {
    let created_by = KeyValue {
        key: "created_by".to_string(),
        value: Some("lakeflow-extract".to_string()),
    };
    WriterProperties::builder()
        .set_key_value_metadata(Some(vec![created_by]))
        .build()
}

fn arrow_schema(table: &ColumnTable) -> Arc<Schema> {
    let fields: Vec<Field> = table
        .columns
        .iter()
        .map(|c| {
            let data_type = match &c.values {
                ColumnValues::Bool(_) => DataType::Boolean,
                ColumnValues::Int64(_) => DataType::Int64,
                ColumnValues::Float64(_) => DataType::Float64,
                ColumnValues::Utf8(_) => DataType::Utf8,
                ColumnValues::TimestampMicros(_) => {
                    DataType::Timestamp(TimeUnit::Microsecond, None)
                },
                ColumnValues::Date32(_) => DataType::Date32,
            };
            Field::new(&c.name, data_type, true)
        })
        .collect();
    Arc::new(Schema::new(fields))
}

fn arrow_array(values: &ColumnValues) -> ArrayRef {
    match values {
        ColumnValues::Bool(v) => Arc::new(BooleanArray::from(v.clone())),
        ColumnValues::Int64(v) => Arc::new(Int64Array::from(v.clone())),
        ColumnValues::Float64(v) => Arc::new(Float64Array::from(v.clone())),
        ColumnValues::Utf8(v) => Arc::new(StringArray::from(v.clone())),
        ColumnValues::TimestampMicros(v) => Arc::new(TimestampMicrosecondArray::from(v.clone())),
        ColumnValues::Date32(v) => Arc::new(Date32Array::from(v.clone())),
    }
}

/// Encode one table as a single-row-group Parquet file.
pub fn write_table(table: &ColumnTable) -> Result<Bytes> {
    let schema = arrow_schema(table);
    let arrays: Vec<ArrayRef> = table.columns.iter().map(|c| arrow_array(&c.values)).collect();

    let batch = RecordBatch::try_new(schema.clone(), arrays)
        .map_err(|e| LakeflowError::parquet(format!("record batch build failed: {e}")))?;

    let mut cursor = Cursor::new(Vec::<u8>::new());
    let props = writer_properties();
    let mut writer = ArrowWriter::try_new(&mut cursor, schema, Some(props))
        .map_err(|e| LakeflowError::parquet(format!("parquet writer init failed: {e}")))?;
    writer
        .write(&batch)
        .map_err(|e| LakeflowError::parquet(format!("parquet write failed: {e}")))?;
    writer
        .close()
        .map_err(|e| LakeflowError::parquet(format!("parquet close failed: {e}")))?;

    Ok(Bytes::from(cursor.into_inner()))
}

/// Read one column out of a Parquet file.
///
/// Returns the column's array chunks, or `None` when the file's schema does
/// not carry the column at all.
pub fn read_column(data: Bytes, column: &str) -> Result<Option<Vec<ArrayRef>>> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)
        .map_err(|e| LakeflowError::parquet(format!("parquet reader init failed: {e}")))?;

    let Some((index, _)) = builder.schema().column_with_name(column) else {
        return Ok(None);
    };

    let mask = ProjectionMask::roots(builder.parquet_schema(), [index]);
    let reader = builder
        .with_projection(mask)
        .build()
        .map_err(|e| LakeflowError::parquet(format!("parquet reader build failed: {e}")))?;

    let mut arrays = Vec::new();
    for batch in reader {
        let batch =
            batch.map_err(|e| LakeflowError::parquet(format!("parquet read failed: {e}")))?;
        arrays.push(batch.column(0).clone());
    }

    Ok(Some(arrays))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::table::Column;
    use arrow::array::Array;

    fn table() -> ColumnTable {
        ColumnTable::new(vec![
            Column {
                name: "id".to_string(),
                values: ColumnValues::Int64(vec![Some(1), Some(2), None]),
            },
            Column {
                name: "updated_at".to_string(),
                values: ColumnValues::TimestampMicros(vec![
                    Some(1_700_000_000_000_000),
                    Some(1_700_000_060_000_000),
                    Some(1_700_000_120_000_000),
                ]),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_write_then_read_column() {
        let data = write_table(&table()).unwrap();

        let arrays = read_column(data, "updated_at").unwrap().unwrap();
        let total: usize = arrays.iter().map(|a| a.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_read_missing_column() {
        let data = write_table(&table()).unwrap();
        assert!(read_column(data, "nope").unwrap().is_none());
    }

    #[test]
    fn test_write_empty_table() {
        let empty = ColumnTable::new(vec![Column {
            name: "id".to_string(),
            values: ColumnValues::Int64(vec![]),
        }])
        .unwrap();

        let data = write_table(&empty).unwrap();
        let arrays = read_column(data, "id").unwrap().unwrap();
        let total: usize = arrays.iter().map(|a| a.len()).sum();
        assert_eq!(total, 0);
    }
}
