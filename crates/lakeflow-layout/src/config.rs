//! Workflow configuration file handling
//!
//! `workflow_config.json` carries one entry per source table under a
//! top-level `WorkflowList` key. Field names follow the deployed JSON schema,
//! so serde renames map them onto idiomatic Rust fields here.

use lakeflow_common::{LakeflowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// How the generated workflow is started.
///
/// Anything other than `Cron` in the config is treated as on-demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScheduleType {
    Cron,
    #[default]
    #[serde(other)]
    OnDemand,
}

/// One workflow entry: a single source table and its destination settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(rename = "WorkflowName")]
    pub workflow_name: String,

    #[serde(rename = "GlueExecutionRole")]
    pub glue_execution_role: String,

    #[serde(rename = "NetworkConnectionName")]
    pub network_connection_name: String,

    #[serde(rename = "SecretName")]
    pub secret_name: String,

    /// Source table identifier, possibly schema-qualified ("public.regions").
    #[serde(rename = "SourceTable")]
    pub source_table: String,

    #[serde(rename = "DestinationBucketName")]
    pub destination_bucket_name: String,

    /// Desired output file count, as carried in job arguments. Empty means
    /// "let the job decide".
    #[serde(rename = "DestinationFileCount", default)]
    pub destination_file_count: String,

    #[serde(rename = "delta_col_name")]
    pub delta_col_name: String,

    /// Optional output partition column. Blank disables partitioning.
    #[serde(rename = "S3PartitionColumnName", default)]
    pub s3_partition_column_name: String,

    #[serde(rename = "JobScheduleType", default)]
    pub job_schedule_type: ScheduleType,

    #[serde(rename = "ScheduleCronPattern", default)]
    pub schedule_cron_pattern: String,

    #[serde(rename = "NumberOfWorkers")]
    pub number_of_workers: String,
}

impl WorkflowConfig {
    /// Source table with dots flattened, usable in object keys and job names.
    pub fn source_table_flat(&self) -> String {
        self.source_table.replace('.', "_")
    }

    /// Worker count parsed out of the config's string field.
    pub fn worker_count(&self) -> Result<u32> {
        self.number_of_workers.parse().map_err(|_| {
            LakeflowError::config(format!(
                "NumberOfWorkers must be a positive integer, got '{}' (workflow '{}')",
                self.number_of_workers, self.workflow_name
            ))
        })
    }
}

/// The parsed `workflow_config.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfigFile {
    #[serde(rename = "WorkflowList")]
    pub workflow_list: Vec<WorkflowConfig>,
}

impl WorkflowConfigFile {
    /// Load and validate a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let file: WorkflowConfigFile = serde_json::from_str(&raw)?;
        file.validate()?;
        Ok(file)
    }

    /// Check the invariants the layout generator relies on.
    ///
    /// - `WorkflowName` present and unique across the list
    /// - worker count parses
    /// - cron-scheduled workflows carry a cron pattern
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for workflow in &self.workflow_list {
            if workflow.workflow_name.trim().is_empty() {
                return Err(LakeflowError::config("WorkflowName must not be empty"));
            }

            if !seen.insert(workflow.workflow_name.as_str()) {
                return Err(LakeflowError::config(format!(
                    "duplicate WorkflowName '{}'",
                    workflow.workflow_name
                )));
            }

            workflow.worker_count()?;

            if workflow.job_schedule_type == ScheduleType::Cron
                && workflow.schedule_cron_pattern.trim().is_empty()
            {
                return Err(LakeflowError::config(format!(
                    "workflow '{}' is Cron-scheduled but has no ScheduleCronPattern",
                    workflow.workflow_name
                )));
            }
        }

        Ok(())
    }

    /// Serialize back to the on-disk JSON shape.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A representative workflow entry used by the config generator.
pub fn sample_workflow() -> WorkflowConfig {
    WorkflowConfig {
        workflow_name: "rds_to_s3_public_regions_11".to_string(),
        glue_execution_role: "arn:aws:iam::123456789012:role/AWSGlueServiceRole-data-lake-landing"
            .to_string(),
        network_connection_name: "rds-vpc".to_string(),
        secret_name: "DemoDBSecret".to_string(),
        source_table: "public.regions".to_string(),
        destination_bucket_name: "data-lake-raw-layer-123456789012-eu-west-1".to_string(),
        destination_file_count: "1".to_string(),
        delta_col_name: "updated_at".to_string(),
        s3_partition_column_name: String::new(),
        job_schedule_type: ScheduleType::Cron,
        schedule_cron_pattern: "10 21 * * ? *".to_string(),
        number_of_workers: "2".to_string(),
    }
}

/// Generate a config file with `count` copies of the sample workflow, each
/// renamed with a distinct `_<index>` suffix in place of the sample's own.
pub fn generate_sample_config(count: usize) -> WorkflowConfigFile {
    let sample = sample_workflow();
    let base = sample
        .workflow_name
        .rsplit_once('_')
        .map(|(base, _)| base.to_string())
        .unwrap_or_else(|| sample.workflow_name.clone());

    let workflow_list = (0..count)
        .map(|i| {
            let mut workflow = sample.clone();
            workflow.workflow_name = format!("{}_{}", base, i);
            workflow
        })
        .collect();

    WorkflowConfigFile { workflow_list }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn config_json() -> &'static str {
        r#"{
            "WorkflowList": [
                {
                    "WorkflowName": "rds_to_s3_public_regions_0",
                    "GlueExecutionRole": "arn:aws:iam::123456789012:role/GlueRole",
                    "NetworkConnectionName": "rds-vpc",
                    "SecretName": "DemoDBSecret",
                    "SourceTable": "public.regions",
                    "DestinationBucketName": "data-lake-raw",
                    "DestinationFileCount": "1",
                    "delta_col_name": "updated_at",
                    "S3PartitionColumnName": "",
                    "JobScheduleType": "Cron",
                    "ScheduleCronPattern": "10 21 * * ? *",
                    "NumberOfWorkers": "2"
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_workflow_config() {
        let file: WorkflowConfigFile = serde_json::from_str(config_json()).unwrap();
        assert_eq!(file.workflow_list.len(), 1);

        let workflow = &file.workflow_list[0];
        assert_eq!(workflow.workflow_name, "rds_to_s3_public_regions_0");
        assert_eq!(workflow.source_table, "public.regions");
        assert_eq!(workflow.job_schedule_type, ScheduleType::Cron);
        assert_eq!(workflow.worker_count().unwrap(), 2);
        file.validate().unwrap();
    }

    #[test]
    fn test_unknown_schedule_type_is_on_demand() {
        let json = config_json().replace("\"Cron\"", "\"Manual\"");
        let file: WorkflowConfigFile = serde_json::from_str(&json).unwrap();
        assert_eq!(
            file.workflow_list[0].job_schedule_type,
            ScheduleType::OnDemand
        );
    }

    #[test]
    fn test_duplicate_workflow_name_rejected() {
        let mut file: WorkflowConfigFile = serde_json::from_str(config_json()).unwrap();
        file.workflow_list.push(file.workflow_list[0].clone());

        let err = file.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate WorkflowName"));
    }

    #[test]
    fn test_cron_without_pattern_rejected() {
        let mut file: WorkflowConfigFile = serde_json::from_str(config_json()).unwrap();
        file.workflow_list[0].schedule_cron_pattern = String::new();

        assert!(file.validate().is_err());
    }

    #[test]
    fn test_bad_worker_count_rejected() {
        let mut file: WorkflowConfigFile = serde_json::from_str(config_json()).unwrap();
        file.workflow_list[0].number_of_workers = "two".to_string();

        assert!(file.validate().is_err());
    }

    #[test]
    fn test_source_table_flat() {
        let file: WorkflowConfigFile = serde_json::from_str(config_json()).unwrap();
        assert_eq!(file.workflow_list[0].source_table_flat(), "public_regions");
    }

    #[test]
    fn test_generate_sample_config_suffixes() {
        let file = generate_sample_config(3);
        assert_eq!(file.workflow_list.len(), 3);

        let names: Vec<_> = file
            .workflow_list
            .iter()
            .map(|w| w.workflow_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "rds_to_s3_public_regions_0",
                "rds_to_s3_public_regions_1",
                "rds_to_s3_public_regions_2"
            ]
        );

        // Distinct names, so the generated file passes validation.
        file.validate().unwrap();
    }

    #[test]
    fn test_config_json_round_trip() {
        let file = generate_sample_config(2);
        let json = file.to_json().unwrap();
        assert!(json.contains("\"WorkflowList\""));
        assert!(json.contains("\"delta_col_name\""));

        let reparsed: WorkflowConfigFile = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, file);
    }
}
