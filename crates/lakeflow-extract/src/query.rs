//! Extraction query construction
//!
//! First loads read the whole table; incremental loads bound the read below
//! by the watermark. The watermark is interpolated as a single-quoted
//! literal with no type-aware quoting — delta columns are expected to be
//! numeric or timestamp-like, never free text.

use crate::watermark::Watermark;

/// The unfiltered first-load query.
pub fn base_query(source_table: &str) -> String {
    format!("select * from {}", source_table)
}

/// The incremental query, reading only rows past the watermark.
pub fn incremental_query(source_table: &str, delta_col: &str, watermark: &Watermark) -> String {
    format!(
        "{} where {} > '{}'",
        base_query(source_table),
        delta_col,
        watermark.render()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_query() {
        assert_eq!(base_query("public.regions"), "select * from public.regions");
    }

    #[test]
    fn test_incremental_query_with_int_watermark() {
        let sql = incremental_query("public.orders", "seq", &Watermark::Int(42));
        assert_eq!(sql, "select * from public.orders where seq > '42'");
    }

    #[test]
    fn test_incremental_query_with_timestamp_watermark() {
        let watermark = Watermark::TimestampMicros(1_700_000_000_123_456);
        let sql = incremental_query("public.orders", "updated_at", &watermark);
        assert_eq!(
            sql,
            "select * from public.orders where updated_at > '2023-11-14 22:13:20.123456'"
        );
    }
}
