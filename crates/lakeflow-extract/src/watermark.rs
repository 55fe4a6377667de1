//! Delta-column watermark computation
//!
//! The watermark is the maximum delta-column value across everything already
//! written to the destination. It is recomputed from the existing Parquet
//! output on every run; there is no cached or persisted watermark state.

use arrow::array::{
    Array, ArrayRef, Date32Array, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array,
    Int8Array, StringArray, TimestampMicrosecondArray, TimestampMillisecondArray,
    TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::compute;
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{DateTime, NaiveDate};
use lakeflow_common::{LakeflowError, Result};

/// Maximum observed delta-column value, typed per the Parquet schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Watermark {
    Int(i64),
    Float(f64),
    Text(String),
    /// Microseconds since the Unix epoch.
    TimestampMicros(i64),
    /// Days since the Unix epoch.
    Date(i32),
}

impl Watermark {
    /// Render the watermark the way it is interpolated into the extraction
    /// query. Timestamps use `YYYY-MM-DD HH:MM:SS.ffffff`.
    pub fn render(&self) -> String {
        match self {
            Watermark::Int(v) => v.to_string(),
            Watermark::Float(v) => v.to_string(),
            Watermark::Text(v) => v.clone(),
            Watermark::TimestampMicros(micros) => DateTime::from_timestamp_micros(*micros)
                .map(|dt| dt.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f").to_string())
                .unwrap_or_else(|| micros.to_string()),
            Watermark::Date(days) => NaiveDate::from_num_days_from_ce_opt(days + 719_163)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| days.to_string()),
        }
    }

    /// The greater of two watermarks of the same type.
    fn merge_max(self, other: Watermark) -> Result<Watermark> {
        let merged = match (self, other) {
            (Watermark::Int(a), Watermark::Int(b)) => Watermark::Int(a.max(b)),
            (Watermark::Float(a), Watermark::Float(b)) => Watermark::Float(a.max(b)),
            (Watermark::Text(a), Watermark::Text(b)) => Watermark::Text(a.max(b)),
            (Watermark::TimestampMicros(a), Watermark::TimestampMicros(b)) => {
                Watermark::TimestampMicros(a.max(b))
            },
            (Watermark::Date(a), Watermark::Date(b)) => Watermark::Date(a.max(b)),
            _ => {
                return Err(LakeflowError::parquet(
                    "delta column type differs across destination files",
                ))
            },
        };
        Ok(merged)
    }
}

/// Maximum delta-column value across all array chunks, or `None` when the
/// existing output holds no non-null rows.
pub fn compute_watermark(arrays: &[ArrayRef]) -> Result<Option<Watermark>> {
    let mut result: Option<Watermark> = None;

    for array in arrays {
        let Some(chunk_max) = array_max(array)? else {
            continue;
        };
        result = Some(match result {
            Some(current) => current.merge_max(chunk_max)?,
            None => chunk_max,
        });
    }

    Ok(result)
}

fn array_max(array: &ArrayRef) -> Result<Option<Watermark>> {
    macro_rules! downcast {
        ($ty:ty) => {
            array
                .as_any()
                .downcast_ref::<$ty>()
                .ok_or_else(|| LakeflowError::parquet("delta column downcast failed"))?
        };
    }

    let max = match array.data_type() {
        DataType::Int8 => compute::max(downcast!(Int8Array)).map(|v| Watermark::Int(v as i64)),
        DataType::Int16 => compute::max(downcast!(Int16Array)).map(|v| Watermark::Int(v as i64)),
        DataType::Int32 => compute::max(downcast!(Int32Array)).map(|v| Watermark::Int(v as i64)),
        DataType::Int64 => compute::max(downcast!(Int64Array)).map(Watermark::Int),
        DataType::Float32 => {
            compute::max(downcast!(Float32Array)).map(|v| Watermark::Float(v as f64))
        },
        DataType::Float64 => compute::max(downcast!(Float64Array)).map(Watermark::Float),
        DataType::Utf8 => {
            compute::max_string(downcast!(StringArray)).map(|v| Watermark::Text(v.to_string()))
        },
        DataType::Timestamp(TimeUnit::Second, _) => compute::max(downcast!(TimestampSecondArray))
            .map(|v| Watermark::TimestampMicros(v * 1_000_000)),
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            compute::max(downcast!(TimestampMillisecondArray))
                .map(|v| Watermark::TimestampMicros(v * 1_000))
        },
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            compute::max(downcast!(TimestampMicrosecondArray)).map(Watermark::TimestampMicros)
        },
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            compute::max(downcast!(TimestampNanosecondArray))
                .map(|v| Watermark::TimestampMicros(v / 1_000))
        },
        DataType::Date32 => compute::max(downcast!(Date32Array)).map(Watermark::Date),
        other => {
            return Err(LakeflowError::parquet(format!(
                "unsupported delta column type in destination output: {other}"
            )))
        },
    };

    Ok(max)
}
