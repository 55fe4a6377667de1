//! `lakeflow deploy` - generate and deploy workflow layouts

use crate::error::{CliError, Result};
use lakeflow_layout::workflow::SystemParams;
use lakeflow_layout::{generate_layout, WorkflowConfigFile};
use std::path::Path;
use tracing::info;

/// Deploy every workflow in the configuration file.
///
/// For each entry this provisions the script/temp buckets, uploads the
/// extraction script, and writes the workflow description JSON into
/// `output_dir`. Failures abort the remaining entries; already-deployed
/// layouts are not rolled back.
pub async fn run(
    config_path: String,
    script_path: String,
    account_id: String,
    region: Option<String>,
    output_dir: String,
) -> Result<()> {
    let config_file = WorkflowConfigFile::load(&config_path)?;
    let script = std::fs::read(&script_path)?;

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(ref region) = region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    let aws_config = loader.load().await;

    let region = aws_config
        .region()
        .map(|r| r.to_string())
        .ok_or_else(|| CliError::config("no AWS region configured; pass --region"))?;
    let s3 = aws_sdk_s3::Client::new(&aws_config);

    let system_params = SystemParams {
        account_id,
        region,
    };

    std::fs::create_dir_all(&output_dir)?;

    for workflow_config in &config_file.workflow_list {
        info!(workflow = %workflow_config.workflow_name, "Deploying workflow layout");

        let workflow =
            generate_layout(&s3, workflow_config, &system_params, script.clone()).await?;

        let output_path = Path::new(&output_dir).join(format!("{}.json", workflow.name));
        std::fs::write(&output_path, serde_json::to_string_pretty(&workflow)?)?;

        println!(
            "Deployed workflow '{}' ({}) -> {}",
            workflow.name,
            workflow
                .on_schedule
                .as_deref()
                .unwrap_or("on-demand"),
            output_path.display()
        );
    }

    println!(
        "Deployed {} workflow(s) from {}",
        config_file.workflow_list.len(),
        config_path
    );

    Ok(())
}
