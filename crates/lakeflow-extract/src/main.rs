//! Lakeflow Extract - incremental JDBC to S3 extraction job

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use lakeflow_common::logging::{init_logging, LogConfig};
use lakeflow_extract::destination::{Destination, RunLock};
use lakeflow_extract::sink::{self, WriteOptions};
use lakeflow_extract::watermark::{compute_watermark, Watermark};
use lakeflow_extract::{codec, jdbc, query, secrets, JobArgs};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = JobArgs::parse();

    let log_config = LogConfig::builder()
        .log_file_prefix(args.job_name.clone())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    info!(job_name = %args.job_name, "Starting extraction job");
    run(args).await?;
    info!("Extraction job complete");
    Ok(())
}

async fn run(args: JobArgs) -> Result<()> {
    // Validate the optional output shaping arguments up front.
    let write_options = WriteOptions {
        file_count: args.effective_file_count()?,
        partition_column: args.effective_partition_column(),
    };

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let s3 = aws_sdk_s3::Client::new(&aws_config);
    let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);

    let secret = secrets::fetch_secret(&secrets_client, &args.secret_name).await?;

    let destination = Destination::new(
        s3.clone(),
        &args.destination_bucket,
        &secret.dbname,
        &args.source_table_name,
    );

    // Check if the table has been ingested before
    let has_prior_output = destination.exists_and_not_empty().await?;
    info!(
        has_prior_output,
        location = %destination.location(),
        "Checked destination prefix"
    );

    // Rewrite the SQL query if this is not the first load
    let mut sql = query::base_query(&args.source_table_name);
    if has_prior_output {
        if let Some(watermark) = destination_watermark(&destination, &args.delta_col_name).await? {
            info!(watermark = %watermark.render(), "Rewriting the extraction query for incremental load");
            sql = query::incremental_query(&args.source_table_name, &args.delta_col_name, &watermark);
        }
    }

    // Serialize runs against this prefix from here on: the watermark above
    // is only safe to act on while no concurrent run can append behind it.
    let lock = RunLock::acquire(s3.clone(), &destination).await?;
    let result = extract_and_write(&secret, &destination, &sql, &write_options).await;
    lock.release().await;
    result
}

/// Recompute the delta-column watermark from existing destination output.
async fn destination_watermark(
    destination: &Destination,
    delta_col: &str,
) -> Result<Option<Watermark>> {
    let mut arrays = Vec::new();
    for key in destination.list_data_files().await? {
        let data = destination.download(&key).await?;
        if let Some(chunks) = codec::read_column(data, delta_col)? {
            arrays.extend(chunks);
        }
    }
    Ok(compute_watermark(&arrays)?)
}

async fn extract_and_write(
    secret: &secrets::DbSecret,
    destination: &Destination,
    sql: &str,
    write_options: &WriteOptions,
) -> Result<()> {
    // Read the source table into a column table
    let pool = jdbc::connect(secret).await?;
    let table = jdbc::fetch_table(&pool, sql).await?;

    if table.is_empty() {
        info!("No new rows to ingest");
        return Ok(());
    }

    // Add the ingestion timestamp column
    let table = table.with_ingestion_timestamp(Utc::now());

    // Write the output to S3
    let summary = sink::write_table(destination, table, write_options).await?;
    info!(
        files = summary.files_written,
        rows = summary.rows_written,
        "Wrote extraction output"
    );

    Ok(())
}
