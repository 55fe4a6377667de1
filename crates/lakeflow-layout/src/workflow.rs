//! Workflow description assembly
//!
//! Produces the declarative Glue workflow document: one transform job with
//! its default-argument map and, for `Cron` schedules, an `OnSchedule`
//! trigger expression. Serialized field names follow the Glue blueprint
//! schema verbatim.

use crate::config::{ScheduleType, WorkflowConfig};
use crate::{provision, script};
use aws_sdk_s3::Client;
use lakeflow_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Worker type every transform job runs on.
pub const WORKER_TYPE: &str = "G.1X";

/// Glue runtime version the jobs target.
pub const GLUE_VERSION: &str = "3.0";

/// Deploy-time parameters resolved outside the config file.
#[derive(Debug, Clone)]
pub struct SystemParams {
    pub account_id: String,
    pub region: String,
}

/// The `Command` block of a job definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCommand {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "ScriptLocation")]
    pub script_location: String,

    #[serde(rename = "PythonVersion")]
    pub python_version: String,
}

/// Network connections attached to a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConnections {
    #[serde(rename = "Connections")]
    pub connections: Vec<String>,
}

/// One job inside the workflow description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDefinition {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Command")]
    pub command: JobCommand,

    #[serde(rename = "Role")]
    pub role: String,

    #[serde(rename = "DefaultArguments")]
    pub default_arguments: BTreeMap<String, String>,

    #[serde(rename = "Connections")]
    pub connections: JobConnections,

    #[serde(rename = "WorkerType")]
    pub worker_type: String,

    #[serde(rename = "NumberOfWorkers")]
    pub number_of_workers: u32,

    #[serde(rename = "GlueVersion")]
    pub glue_version: String,
}

/// Jobs and crawlers making up the workflow. Crawlers stay empty; they exist
/// so the document shape matches the blueprint schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEntities {
    #[serde(rename = "Jobs")]
    pub jobs: Vec<JobDefinition>,

    #[serde(rename = "Crawlers", default)]
    pub crawlers: Vec<serde_json::Value>,
}

/// The declarative workflow description returned by layout generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Description")]
    pub description: String,

    /// Present only for cron-scheduled workflows, as `cron(<pattern>)`.
    #[serde(rename = "OnSchedule", skip_serializing_if = "Option::is_none")]
    pub on_schedule: Option<String>,

    #[serde(rename = "Entities")]
    pub entities: WorkflowEntities,
}

/// Name of the transform job for one workflow/table pair.
pub fn job_name(workflow_name: &str, source_table_flat: &str) -> String {
    format!("{}_jdbc_to_s3_{}", workflow_name, source_table_flat)
}

/// The standard default-argument map handed to every transform job.
///
/// Carries both the platform switches (temp dir, bookmarks off, SSE-S3,
/// metrics, continuous logging) and the per-table extraction parameters.
pub fn default_arguments(config: &WorkflowConfig, temp_location: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("--TempDir".to_string(), temp_location.to_string()),
        (
            "--job-bookmark-option".to_string(),
            "job-bookmark-disable".to_string(),
        ),
        ("--encryption-type".to_string(), "sse-s3".to_string()),
        ("--job-language".to_string(), "python".to_string()),
        ("--enable-glue-datacatalog".to_string(), String::new()),
        ("--enable-metrics".to_string(), String::new()),
        (
            "--enable-continuous-cloudwatch-log".to_string(),
            "true".to_string(),
        ),
        ("--user-jars-first".to_string(), "true".to_string()),
        ("--secret_name".to_string(), config.secret_name.clone()),
        (
            "--source_table_name".to_string(),
            config.source_table.clone(),
        ),
        (
            "--destination_bucket".to_string(),
            config.destination_bucket_name.clone(),
        ),
        (
            "--file_count".to_string(),
            config.destination_file_count.clone(),
        ),
        ("--delta_col_name".to_string(), config.delta_col_name.clone()),
        (
            "--output_table_partition_column".to_string(),
            config.s3_partition_column_name.clone(),
        ),
    ])
}

/// Generate the deployed layout for one workflow entry.
///
/// Ensures the script and temp buckets exist, uploads the extraction script
/// under a per-workflow key, and returns the workflow description. Bucket
/// and upload failures abort generation; nothing provisioned so far is
/// rolled back.
pub async fn generate_layout(
    s3: &Client,
    user_params: &WorkflowConfig,
    system_params: &SystemParams,
    script_data: Vec<u8>,
) -> Result<Workflow> {
    let source_table_flat = user_params.source_table_flat();
    let workflow_name = &user_params.workflow_name;

    // Creating script bucket
    let script_bucket =
        provision::script_bucket_name(&system_params.account_id, &system_params.region);
    provision::create_bucket_if_needed(s3, &script_bucket, &system_params.region).await?;

    // Creating temp bucket
    let temp_bucket = provision::temp_bucket_name(&system_params.account_id, &system_params.region);
    provision::create_bucket_if_needed(s3, &temp_bucket, &system_params.region).await?;
    let temp_location = format!("s3://{}/{}/", temp_bucket, workflow_name);

    // Upload job script to script bucket
    let script_key = script::script_key(workflow_name, &source_table_flat);
    let script_location = format!("s3://{}/{}", script_bucket, script_key);
    script::upload_script(s3, &script_bucket, &script_key, script_data).await?;

    let job = JobDefinition {
        name: job_name(workflow_name, &source_table_flat),
        command: JobCommand {
            name: "glueetl".to_string(),
            script_location,
            python_version: "3".to_string(),
        },
        role: user_params.glue_execution_role.clone(),
        default_arguments: default_arguments(user_params, &temp_location),
        connections: JobConnections {
            connections: vec![user_params.network_connection_name.clone()],
        },
        worker_type: WORKER_TYPE.to_string(),
        number_of_workers: user_params.worker_count()?,
        glue_version: GLUE_VERSION.to_string(),
    };

    let on_schedule = match user_params.job_schedule_type {
        ScheduleType::Cron => Some(format!("cron({})", user_params.schedule_cron_pattern)),
        ScheduleType::OnDemand => None,
    };

    let workflow = Workflow {
        name: workflow_name.clone(),
        description: format!("Blueprint Workflow for job {}", job.name),
        on_schedule,
        entities: WorkflowEntities {
            jobs: vec![job],
            crawlers: Vec::new(),
        },
    };

    info!(
        workflow = %workflow.name,
        scheduled = workflow.on_schedule.is_some(),
        "Generated workflow layout"
    );

    Ok(workflow)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::sample_workflow;

    #[test]
    fn test_job_name() {
        assert_eq!(
            job_name("rds_to_s3_public_regions_0", "public_regions"),
            "rds_to_s3_public_regions_0_jdbc_to_s3_public_regions"
        );
    }

    #[test]
    fn test_default_arguments() {
        let config = sample_workflow();
        let args = default_arguments(&config, "s3://aws-glue-temporary-123-eu-west-1/wf/");

        assert_eq!(
            args.get("--TempDir").unwrap(),
            "s3://aws-glue-temporary-123-eu-west-1/wf/"
        );
        assert_eq!(
            args.get("--job-bookmark-option").unwrap(),
            "job-bookmark-disable"
        );
        assert_eq!(args.get("--encryption-type").unwrap(), "sse-s3");
        assert_eq!(args.get("--secret_name").unwrap(), "DemoDBSecret");
        assert_eq!(args.get("--source_table_name").unwrap(), "public.regions");
        assert_eq!(args.get("--delta_col_name").unwrap(), "updated_at");
        assert_eq!(args.get("--file_count").unwrap(), "1");
    }

    #[test]
    fn test_cron_workflow_serialization() {
        let config = sample_workflow();
        let workflow = Workflow {
            name: config.workflow_name.clone(),
            description: "Blueprint Workflow for job x".to_string(),
            on_schedule: Some(format!("cron({})", config.schedule_cron_pattern)),
            entities: WorkflowEntities {
                jobs: vec![],
                crawlers: vec![],
            },
        };

        let json = serde_json::to_value(&workflow).unwrap();
        assert_eq!(json["OnSchedule"], "cron(10 21 * * ? *)");
        assert_eq!(json["Entities"]["Crawlers"], serde_json::json!([]));
    }

    #[test]
    fn test_on_demand_workflow_omits_schedule() {
        let workflow = Workflow {
            name: "wf".to_string(),
            description: "Blueprint Workflow for job x".to_string(),
            on_schedule: None,
            entities: WorkflowEntities {
                jobs: vec![],
                crawlers: vec![],
            },
        };

        let json = serde_json::to_value(&workflow).unwrap();
        assert!(json.get("OnSchedule").is_none());
    }

    #[test]
    fn test_job_definition_serialization() {
        let config = sample_workflow();
        let job = JobDefinition {
            name: job_name(&config.workflow_name, &config.source_table_flat()),
            command: JobCommand {
                name: "glueetl".to_string(),
                script_location: "s3://scripts/wf/jdbc_to_s3_public_regions.py".to_string(),
                python_version: "3".to_string(),
            },
            role: config.glue_execution_role.clone(),
            default_arguments: default_arguments(&config, "s3://tmp/wf/"),
            connections: JobConnections {
                connections: vec![config.network_connection_name.clone()],
            },
            worker_type: WORKER_TYPE.to_string(),
            number_of_workers: 2,
            glue_version: GLUE_VERSION.to_string(),
        };

        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["Command"]["Name"], "glueetl");
        assert_eq!(json["WorkerType"], "G.1X");
        assert_eq!(json["NumberOfWorkers"], 2);
        assert_eq!(json["GlueVersion"], "3.0");
        assert_eq!(json["Connections"]["Connections"][0], "rds-vpc");
    }
}
