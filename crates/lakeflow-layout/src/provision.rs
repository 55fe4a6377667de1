//! Idempotent S3 bucket provisioning
//!
//! The layout generator owns two buckets per account/region: one for the
//! uploaded extraction scripts and one for job temp space. Both are created
//! on first use and found on every run after that.

use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use lakeflow_common::{LakeflowError, Result};
use tracing::{error, info};

/// Name of the bucket holding uploaded extraction scripts.
pub fn script_bucket_name(account_id: &str, region: &str) -> String {
    format!("aws-glue-scripts-{}-{}", account_id, region)
}

/// Name of the bucket holding per-workflow job temp space.
pub fn temp_bucket_name(account_id: &str, region: &str) -> String {
    format!("aws-glue-temporary-{}-{}", account_id, region)
}

/// Create an S3 bucket if it does not exist yet.
///
/// A bucket that already exists (either found by `HeadBucket` or raced into
/// existence by a concurrent run) is fine. Any other cloud API error aborts
/// layout generation.
pub async fn create_bucket_if_needed(client: &Client, bucket: &str, region: &str) -> Result<()> {
    match client.head_bucket().bucket(bucket).send().await {
        Ok(_) => {
            info!(bucket, "S3 bucket already exists");
            Ok(())
        },
        Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => {
            info!(bucket, "Creating S3 bucket");
            create_bucket(client, bucket, region).await
        },
        Err(err) => {
            error!(bucket, error = %err, "Unexpected error occurred when heading S3 bucket");
            Err(LakeflowError::storage(format!(
                "failed to head bucket '{}': {}",
                bucket, err
            )))
        },
    }
}

async fn create_bucket(client: &Client, bucket: &str, region: &str) -> Result<()> {
    let mut request = client.create_bucket().bucket(bucket);

    // us-east-1 is the one region that rejects an explicit LocationConstraint.
    if region != "us-east-1" {
        let constraint = CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build();
        request = request.create_bucket_configuration(constraint);
    }

    match request.send().await {
        Ok(_) => {
            info!(bucket, "Created S3 bucket");
            Ok(())
        },
        Err(err)
            if err
                .as_service_error()
                .is_some_and(|e| e.is_bucket_already_owned_by_you()) =>
        {
            info!(bucket, "S3 bucket already exists");
            Ok(())
        },
        Err(err) => {
            error!(bucket, error = %err, "Unexpected error occurred when creating S3 bucket");
            Err(LakeflowError::storage(format!(
                "failed to create bucket '{}': {}",
                bucket, err
            )))
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_names() {
        assert_eq!(
            script_bucket_name("123456789012", "eu-west-1"),
            "aws-glue-scripts-123456789012-eu-west-1"
        );
        assert_eq!(
            temp_bucket_name("123456789012", "eu-west-1"),
            "aws-glue-temporary-123456789012-eu-west-1"
        );
    }
}
