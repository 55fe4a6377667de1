//! Database credential retrieval
//!
//! Credentials live in AWS Secrets Manager under the standard RDS secret
//! shape and are fetched fresh on every run, never persisted. Retrieval
//! failures are logged with their specific failure class and re-raised;
//! there is no retry and no fallback credential source.

use aws_sdk_secretsmanager::Client;
use lakeflow_common::{LakeflowError, Result};
use serde::Deserialize;
use tracing::error;

/// The secret record: `{host, port, dbname, username, password}`.
///
/// `port` appears as either a JSON number or a string depending on how the
/// secret was created, so both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct DbSecret {
    pub host: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u16,
    pub dbname: String,
    pub username: String,
    pub password: String,
}

fn port_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u16),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(port) => Ok(port),
        Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

/// Parse the secret payload (JSON from either the string or binary field).
pub fn parse_secret(payload: &[u8]) -> Result<DbSecret> {
    serde_json::from_slice(payload)
        .map_err(|e| LakeflowError::secret(format!("secret payload is not a valid record: {e}")))
}

/// Fetch a secret from Secrets Manager by name.
pub async fn fetch_secret(client: &Client, secret_name: &str) -> Result<DbSecret> {
    let response = match client
        .get_secret_value()
        .secret_id(secret_name)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            if let Some(service_err) = err.as_service_error() {
                if service_err.is_decryption_failure() {
                    error!(
                        secret_name,
                        "The requested secret can't be decrypted using the provided KMS key"
                    );
                } else if service_err.is_internal_service_error() {
                    error!(secret_name, "An error occurred on the service side");
                } else if service_err.is_invalid_parameter_exception() {
                    error!(secret_name, "The request had invalid params");
                } else if service_err.is_invalid_request_exception() {
                    error!(
                        secret_name,
                        "The request was invalid for the current state of the resource"
                    );
                } else if service_err.is_resource_not_found_exception() {
                    error!(secret_name, "The requested secret was not found");
                } else {
                    error!(secret_name, error = %err, "Secret retrieval failed");
                }
            } else {
                error!(secret_name, error = %err, "Secret retrieval failed");
            }
            return Err(LakeflowError::secret(format!(
                "failed to retrieve secret '{}': {}",
                secret_name, err
            )));
        },
    };

    if let Some(secret_string) = response.secret_string() {
        parse_secret(secret_string.as_bytes())
    } else if let Some(secret_binary) = response.secret_binary() {
        parse_secret(secret_binary.as_ref())
    } else {
        Err(LakeflowError::secret(format!(
            "secret '{}' carries neither a string nor a binary payload",
            secret_name
        )))
    }
}
