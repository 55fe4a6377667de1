//! Lakeflow Extract Library
//!
//! Run-time half of Lakeflow: the extraction job that copies one JDBC table
//! into the S3 data lake as Parquet. The job is stateless across runs — the
//! destination prefix itself is the only record of what has been ingested,
//! and the incremental watermark is recomputed from it on every run.
//!
//! # Run flow
//!
//! 1. Resolve database credentials from Secrets Manager (`secrets`)
//! 2. Inspect the destination prefix for prior output (`destination`)
//! 3. Compute the delta-column watermark from existing Parquet (`watermark`)
//! 4. Build the extraction query, filtered on incremental runs (`query`)
//! 5. Read the source table into a typed column table (`jdbc`, `table`)
//! 6. Stamp `ingestion_timestamp` and write Parquet output (`sink`, `codec`)

pub mod args;
pub mod codec;
pub mod destination;
pub mod jdbc;
pub mod query;
pub mod secrets;
pub mod sink;
pub mod table;
pub mod watermark;

// Re-export commonly used types
pub use args::JobArgs;
pub use destination::{Destination, RunLock};
pub use secrets::DbSecret;
pub use table::{Column, ColumnTable, ColumnValues};
pub use watermark::Watermark;
