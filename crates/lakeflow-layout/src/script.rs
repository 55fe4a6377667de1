//! Extraction script upload

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use lakeflow_common::{LakeflowError, Result};
use tracing::{debug, info};

/// File name of the extraction script for one source table.
pub fn script_file_name(source_table_flat: &str) -> String {
    format!("jdbc_to_s3_{}.py", source_table_flat)
}

/// Object key the script is uploaded under, scoped per workflow.
pub fn script_key(workflow_name: &str, source_table_flat: &str) -> String {
    format!("{}/{}", workflow_name, script_file_name(source_table_flat))
}

/// Upload the extraction script to the script bucket.
pub async fn upload_script(client: &Client, bucket: &str, key: &str, data: Vec<u8>) -> Result<()> {
    let checksum = calculate_sha256(&data);
    let size = data.len();

    debug!("Uploading {} bytes to s3://{}/{}", size, bucket, key);

    client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .send()
        .await
        .map_err(|err| {
            LakeflowError::storage(format!(
                "failed to upload script to s3://{}/{}: {}",
                bucket, key, err
            ))
        })?;

    info!(
        bucket,
        key, checksum, size, "Successfully uploaded extraction script"
    );

    Ok(())
}

fn calculate_sha256(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_script_file_name() {
        assert_eq!(
            script_file_name("public_regions"),
            "jdbc_to_s3_public_regions.py"
        );
    }

    #[test]
    fn test_script_key() {
        assert_eq!(
            script_key("rds_to_s3_public_regions_0", "public_regions"),
            "rds_to_s3_public_regions_0/jdbc_to_s3_public_regions.py"
        );
    }

    #[test]
    fn test_calculate_sha256() {
        let checksum = calculate_sha256(b"Hello, World!");
        assert_eq!(
            checksum,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }
}
