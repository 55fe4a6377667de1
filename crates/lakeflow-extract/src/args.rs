//! Extraction job parameters
//!
//! The platform hands parameters over as string-valued job arguments; this
//! maps them onto an explicit structure with named optional fields. The two
//! optional arguments may arrive as empty strings (the layout generator
//! forwards config fields verbatim), so "present but blank" means unset.

use clap::Parser;
use lakeflow_common::{LakeflowError, Result};

/// JDBC-to-S3 extraction job
#[derive(Parser, Debug, Clone)]
#[command(name = "lakeflow-extract")]
#[command(author, version, about = "Incremental JDBC to S3 extraction job")]
pub struct JobArgs {
    /// Job name, used for log file naming
    #[arg(long)]
    pub job_name: String,

    /// Destination bucket for Parquet output
    #[arg(long)]
    pub destination_bucket: String,

    /// Secrets Manager secret holding database credentials
    #[arg(long)]
    pub secret_name: String,

    /// Source table, possibly schema-qualified
    #[arg(long)]
    pub source_table_name: String,

    /// Monotonically increasing column used for incremental filtering
    #[arg(long)]
    pub delta_col_name: String,

    /// Number of output files to coalesce into (blank = writer default)
    #[arg(long, default_value = "")]
    pub file_count: String,

    /// Column to partition output by (blank = unpartitioned)
    #[arg(long, default_value = "")]
    pub output_table_partition_column: String,
}

impl JobArgs {
    /// Output file count, if one was supplied.
    pub fn effective_file_count(&self) -> Result<Option<usize>> {
        let raw = self.file_count.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let count: usize = raw.parse().map_err(|_| {
            LakeflowError::config(format!(
                "file_count must be a positive integer, got '{}'",
                self.file_count
            ))
        })?;
        if count == 0 {
            return Err(LakeflowError::config("file_count must be at least 1"));
        }
        Ok(Some(count))
    }

    /// Output partition column, lowercased, if one was supplied.
    pub fn effective_partition_column(&self) -> Option<String> {
        let column = self.output_table_partition_column.trim().to_lowercase();
        if column.is_empty() {
            None
        } else {
            Some(column)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn args(file_count: &str, partition_column: &str) -> JobArgs {
        JobArgs {
            job_name: "wf_jdbc_to_s3_public_regions".to_string(),
            destination_bucket: "data-lake-raw".to_string(),
            secret_name: "DemoDBSecret".to_string(),
            source_table_name: "public.regions".to_string(),
            delta_col_name: "updated_at".to_string(),
            file_count: file_count.to_string(),
            output_table_partition_column: partition_column.to_string(),
        }
    }

    #[test]
    fn test_parse_required_args() {
        let parsed = JobArgs::try_parse_from([
            "lakeflow-extract",
            "--job-name",
            "wf",
            "--destination-bucket",
            "data-lake-raw",
            "--secret-name",
            "DemoDBSecret",
            "--source-table-name",
            "public.regions",
            "--delta-col-name",
            "updated_at",
        ])
        .unwrap();

        assert_eq!(parsed.source_table_name, "public.regions");
        assert_eq!(parsed.effective_file_count().unwrap(), None);
        assert_eq!(parsed.effective_partition_column(), None);
    }

    #[test]
    fn test_missing_required_arg_rejected() {
        let result = JobArgs::try_parse_from(["lakeflow-extract", "--job-name", "wf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_effective_file_count() {
        assert_eq!(args("1", "").effective_file_count().unwrap(), Some(1));
        assert_eq!(args("8", "").effective_file_count().unwrap(), Some(8));
        assert_eq!(args("", "").effective_file_count().unwrap(), None);
        assert_eq!(args("  ", "").effective_file_count().unwrap(), None);
        assert!(args("0", "").effective_file_count().is_err());
        assert!(args("many", "").effective_file_count().is_err());
    }

    #[test]
    fn test_effective_partition_column_lowercases() {
        assert_eq!(
            args("", "Region").effective_partition_column(),
            Some("region".to_string())
        );
        assert_eq!(args("", "  ").effective_partition_column(), None);
    }
}
