//! Source table reads over PostgreSQL
//!
//! The extraction query is dynamic, so rows are decoded by inspecting the
//! column type names rather than through compile-time checked queries.
//! Numeric values keep their full precision by landing as text.

use crate::secrets::DbSecret;
use crate::table::{Column, ColumnTable, ColumnValues};
use chrono::Datelike;
use lakeflow_common::{LakeflowError, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{Column as _, PgPool, Row, TypeInfo};
use tracing::{debug, info};

/// Connection options derived from the secret record.
pub fn connect_options(secret: &DbSecret) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&secret.host)
        .port(secret.port)
        .database(&secret.dbname)
        .username(&secret.username)
        .password(&secret.password)
}

/// Open a small connection pool against the source database.
pub async fn connect(secret: &DbSecret) -> Result<PgPool> {
    debug!(host = %secret.host, dbname = %secret.dbname, "Connecting to source database");

    PgPoolOptions::new()
        .max_connections(2)
        .connect_with(connect_options(secret))
        .await
        .map_err(|e| LakeflowError::database(format!("failed to connect to source: {e}")))
}

/// Run the extraction query and decode the result into a column table.
///
/// An empty result yields an empty table with no columns; the caller skips
/// the write in that case.
pub async fn fetch_table(pool: &PgPool, sql: &str) -> Result<ColumnTable> {
    info!(sql, "Reading source table");

    let rows: Vec<PgRow> = sqlx::query(sql)
        .fetch_all(pool)
        .await
        .map_err(|e| LakeflowError::database(format!("extraction query failed: {e}")))?;

    let Some(first) = rows.first() else {
        return Ok(ColumnTable::default());
    };

    let mut columns = Vec::with_capacity(first.columns().len());
    for (index, column) in first.columns().iter().enumerate() {
        let values = decode_column(&rows, index, column.type_info().name())?;
        columns.push(Column {
            name: column.name().to_string(),
            values,
        });
    }

    let table = ColumnTable::new(columns)?;
    debug!(columns = ?table.column_names(), "Decoded result schema");
    info!(rows = table.row_count(), "Source read complete");
    Ok(table)
}

fn decode_column(rows: &[PgRow], index: usize, type_name: &str) -> Result<ColumnValues> {
    fn decode<'r, T>(rows: &'r [PgRow], index: usize) -> Result<Vec<Option<T>>>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        rows.iter()
            .map(|row| {
                row.try_get::<Option<T>, _>(index)
                    .map_err(|e| LakeflowError::database(format!("column decode failed: {e}")))
            })
            .collect()
    }

    let values = match type_name {
        "BOOL" => ColumnValues::Bool(decode::<bool>(rows, index)?),
        "INT2" => ColumnValues::Int64(
            decode::<i16>(rows, index)?
                .into_iter()
                .map(|v| v.map(i64::from))
                .collect(),
        ),
        "INT4" => ColumnValues::Int64(
            decode::<i32>(rows, index)?
                .into_iter()
                .map(|v| v.map(i64::from))
                .collect(),
        ),
        "INT8" => ColumnValues::Int64(decode::<i64>(rows, index)?),
        "FLOAT4" => ColumnValues::Float64(
            decode::<f32>(rows, index)?
                .into_iter()
                .map(|v| v.map(f64::from))
                .collect(),
        ),
        "FLOAT8" => ColumnValues::Float64(decode::<f64>(rows, index)?),
        // Full precision survives the trip through text.
        "NUMERIC" => ColumnValues::Utf8(
            decode::<sqlx::types::BigDecimal>(rows, index)?
                .into_iter()
                .map(|v| v.map(|d| d.to_string()))
                .collect(),
        ),
        "VARCHAR" | "TEXT" | "BPCHAR" | "CHAR" | "NAME" => {
            ColumnValues::Utf8(decode::<String>(rows, index)?)
        },
        "UUID" => ColumnValues::Utf8(
            decode::<sqlx::types::Uuid>(rows, index)?
                .into_iter()
                .map(|v| v.map(|u| u.to_string()))
                .collect(),
        ),
        "JSON" | "JSONB" => ColumnValues::Utf8(
            decode::<serde_json::Value>(rows, index)?
                .into_iter()
                .map(|v| v.map(|j| j.to_string()))
                .collect(),
        ),
        "TIMESTAMP" => ColumnValues::TimestampMicros(
            decode::<chrono::NaiveDateTime>(rows, index)?
                .into_iter()
                .map(|v| v.map(|dt| dt.and_utc().timestamp_micros()))
                .collect(),
        ),
        "TIMESTAMPTZ" => ColumnValues::TimestampMicros(
            decode::<chrono::DateTime<chrono::Utc>>(rows, index)?
                .into_iter()
                .map(|v| v.map(|dt| dt.timestamp_micros()))
                .collect(),
        ),
        "DATE" => ColumnValues::Date32(
            decode::<chrono::NaiveDate>(rows, index)?
                .into_iter()
                .map(|v| v.map(|d| d.num_days_from_ce() - 719_163))
                .collect(),
        ),
        other => {
            return Err(LakeflowError::database(format!(
                "unsupported source column type: {other}"
            )))
        },
    };

    Ok(values)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn secret() -> DbSecret {
        crate::secrets::parse_secret(
            br#"{"host": "db.internal", "port": 5432, "dbname": "mydb",
                "username": "ingest", "password": "s3cret"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_connect_options_from_secret() {
        let options = connect_options(&secret());
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_database(), Some("mydb"));
        assert_eq!(options.get_username(), "ingest");
    }
}
