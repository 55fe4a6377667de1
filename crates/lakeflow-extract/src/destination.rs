//! Destination storage access and the per-table run lock
//!
//! The destination prefix (`{dbname}/{table}/`) is both the write target and
//! the only record of prior ingestion: its contents decide between first and
//! incremental load, and its Parquet files feed the watermark.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use lakeflow_common::{LakeflowError, Result};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Object key of the run-lock marker, relative to the destination prefix.
const LOCK_FILE: &str = ".lakeflow.lock";

/// One table's destination location in the lake.
#[derive(Clone)]
pub struct Destination {
    client: Client,
    bucket: String,
    prefix: String,
}

impl Destination {
    pub fn new(client: Client, bucket: impl Into<String>, dbname: &str, table: &str) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: format!("{}/{}/", dbname, table),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Full S3 URI of the destination location.
    pub fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.prefix)
    }

    /// Key of an output file directly under the prefix (or a partition
    /// sub-path when `relative` carries one).
    pub fn object_key(&self, relative: &str) -> String {
        format!("{}{}", self.prefix, relative)
    }

    /// Whether the destination prefix exists and holds at least one object.
    ///
    /// This is the first/incremental load decision: a single listed key is
    /// enough to know the table has been ingested before.
    pub async fn exists_and_not_empty(&self) -> Result<bool> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&self.prefix)
            .max_keys(1)
            .send()
            .await
            .map_err(|e| {
                LakeflowError::storage(format!(
                    "failed to list destination prefix {}: {e}",
                    self.location()
                ))
            })?;

        Ok(response.key_count().unwrap_or(0) > 0)
    }

    /// All Parquet data files under the prefix, including partition
    /// sub-paths. The run-lock marker is not a data file.
    pub async fn list_data_files(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&self.prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                LakeflowError::storage(format!(
                    "failed to list destination prefix {}: {e}",
                    self.location()
                ))
            })?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|obj| obj.key())
                    .filter(|key| key.ends_with(".parquet"))
                    .map(|key| key.to_string()),
            );
        }

        debug!(count = keys.len(), location = %self.location(), "Listed destination data files");
        Ok(keys)
    }

    pub async fn download(&self, key: &str) -> Result<Bytes> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                LakeflowError::storage(format!("failed to download s3://{}/{key}: {e}", self.bucket))
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| LakeflowError::storage(format!("failed to read S3 response body: {e}")))?
            .into_bytes();

        debug!(key, size = data.len(), "Downloaded destination object");
        Ok(data)
    }

    pub async fn upload(&self, key: &str, data: Bytes) -> Result<()> {
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                LakeflowError::storage(format!("failed to upload s3://{}/{key}: {e}", self.bucket))
            })?;

        info!(key, size, "Uploaded output file");
        Ok(())
    }
}

/// Exclusive marker serializing extraction runs for one destination prefix.
///
/// Acquired with a conditional put (`If-None-Match: *`): whichever run
/// creates the marker first wins, and a concurrent run fails with
/// [`LakeflowError::LockHeld`] instead of computing a stale watermark and
/// appending overlapping data.
pub struct RunLock {
    client: Client,
    bucket: String,
    key: String,
    token: String,
}

impl RunLock {
    /// Try to acquire the lock for a destination prefix.
    pub async fn acquire(client: Client, destination: &Destination) -> Result<RunLock> {
        let key = destination.object_key(LOCK_FILE);
        let token = Uuid::new_v4().to_string();

        let result = client
            .put_object()
            .bucket(destination.bucket())
            .key(&key)
            .if_none_match("*")
            .body(ByteStream::from(token.clone().into_bytes()))
            .send()
            .await;

        match result {
            Ok(_) => {
                info!(key, token, "Acquired run lock");
                Ok(RunLock {
                    client,
                    bucket: destination.bucket().to_string(),
                    key,
                    token,
                })
            },
            Err(err) if is_precondition_failed(&err) => {
                Err(LakeflowError::LockHeld(destination.prefix().to_string()))
            },
            Err(err) => Err(LakeflowError::storage(format!(
                "failed to acquire run lock at s3://{}/{}: {}",
                destination.bucket(),
                key,
                err
            ))),
        }
    }

    /// Release the lock. Failure to delete the marker is logged, not fatal;
    /// the marker must then be removed by hand before the next run.
    pub async fn release(self) {
        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
        {
            Ok(_) => info!(key = %self.key, token = %self.token, "Released run lock"),
            Err(err) => warn!(key = %self.key, error = %err, "Failed to release run lock"),
        }
    }
}

fn is_precondition_failed<E>(err: &aws_sdk_s3::error::SdkError<E, aws_sdk_s3::config::http::HttpResponse>) -> bool {
    err.raw_response()
        .map(|response| response.status().as_u16() == 412)
        .unwrap_or(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn destination() -> Destination {
        let config = aws_sdk_s3::Config::builder().build();
        Destination::new(Client::from_conf(config), "data-lake-raw", "mydb", "public.regions")
    }

    #[test]
    fn test_prefix_and_location() {
        let dest = destination();
        assert_eq!(dest.prefix(), "mydb/public.regions/");
        assert_eq!(dest.location(), "s3://data-lake-raw/mydb/public.regions/");
    }

    #[test]
    fn test_object_key() {
        let dest = destination();
        assert_eq!(
            dest.object_key("part-00000-abc.parquet"),
            "mydb/public.regions/part-00000-abc.parquet"
        );
        assert_eq!(
            dest.object_key("region=eu/part-00000-abc.parquet"),
            "mydb/public.regions/region=eu/part-00000-abc.parquet"
        );
    }
}
