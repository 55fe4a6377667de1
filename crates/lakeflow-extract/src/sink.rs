//! Parquet output writing
//!
//! Append-only: every run adds new files under the destination prefix and
//! never touches existing ones. Output is optionally coalesced to a fixed
//! file count and optionally partitioned into `{column}={value}/` sub-paths.

use crate::codec;
use crate::destination::Destination;
use crate::table::ColumnTable;
use lakeflow_common::Result;
use tracing::info;
use uuid::Uuid;

/// Output shaping options resolved from the job arguments.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Coalesce output into this many files per partition group.
    pub file_count: Option<usize>,
    /// Partition output by this column when it exists in the result.
    pub partition_column: Option<String>,
}

/// What one run wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteSummary {
    pub files_written: usize,
    pub rows_written: usize,
}

/// Row ranges for coalescing `row_count` rows into at most `file_count`
/// files. Without a file count everything lands in one file. Ranges are
/// near-even; fewer rows than files means fewer files, never empty ones.
pub fn coalesce_ranges(row_count: usize, file_count: Option<usize>) -> Vec<(usize, usize)> {
    if row_count == 0 {
        return Vec::new();
    }

    let files = file_count.unwrap_or(1).min(row_count).max(1);
    let base = row_count / files;
    let remainder = row_count % files;

    let mut ranges = Vec::with_capacity(files);
    let mut offset = 0;
    for index in 0..files {
        let len = base + usize::from(index < remainder);
        ranges.push((offset, len));
        offset += len;
    }
    ranges
}

fn part_file_name(index: usize) -> String {
    format!("part-{:05}-{}.parquet", index, Uuid::new_v4())
}

/// Write one table to the destination.
///
/// Partitioning applies only when the configured column actually exists in
/// the result; otherwise the output is written unpartitioned, without error.
pub async fn write_table(
    destination: &Destination,
    table: ColumnTable,
    options: &WriteOptions,
) -> Result<WriteSummary> {
    let rows_written = table.row_count();

    let groups: Vec<(Option<String>, ColumnTable)> = match &options.partition_column {
        Some(column) => match table.partition_by(column) {
            Some(parts) => {
                info!(column, groups = parts.len(), "Partitioning output");
                parts
                    .into_iter()
                    .map(|(value, part)| (Some(format!("{}={}", column, value)), part))
                    .collect()
            },
            None => vec![(None, table)],
        },
        None => vec![(None, table)],
    };

    let mut files_written = 0;
    for (sub_path, group) in groups {
        for (offset, len) in coalesce_ranges(group.row_count(), options.file_count) {
            let chunk = group.slice(offset, len);
            let data = codec::write_table(&chunk)?;

            let file_name = part_file_name(files_written);
            let relative = match &sub_path {
                Some(dir) => format!("{}/{}", dir, file_name),
                None => file_name,
            };
            destination.upload(&destination.object_key(&relative), data).await?;
            files_written += 1;
        }
    }

    info!(
        files = files_written,
        rows = rows_written,
        location = %destination.location(),
        "Write complete"
    );

    Ok(WriteSummary {
        files_written,
        rows_written,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_coalesce_to_one_file() {
        assert_eq!(coalesce_ranges(10, Some(1)), vec![(0, 10)]);
    }

    #[test]
    fn test_coalesce_without_file_count() {
        assert_eq!(coalesce_ranges(10, None), vec![(0, 10)]);
    }

    #[test]
    fn test_coalesce_even_split() {
        assert_eq!(coalesce_ranges(9, Some(3)), vec![(0, 3), (3, 3), (6, 3)]);
    }

    #[test]
    fn test_coalesce_uneven_split() {
        assert_eq!(coalesce_ranges(10, Some(3)), vec![(0, 4), (4, 3), (7, 3)]);
    }

    #[test]
    fn test_coalesce_fewer_rows_than_files() {
        assert_eq!(coalesce_ranges(2, Some(8)), vec![(0, 1), (1, 1)]);
    }

    #[test]
    fn test_coalesce_empty() {
        assert_eq!(coalesce_ranges(0, Some(3)), Vec::<(usize, usize)>::new());
    }

    #[test]
    fn test_part_file_names_are_unique() {
        let a = part_file_name(0);
        let b = part_file_name(0);
        assert!(a.starts_with("part-00000-"));
        assert!(a.ends_with(".parquet"));
        assert_ne!(a, b);
    }
}
