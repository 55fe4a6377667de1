//! `lakeflow config` - generate and validate workflow configuration

use crate::error::Result;
use lakeflow_layout::config::generate_sample_config;
use lakeflow_layout::WorkflowConfigFile;

/// Write a sample configuration file with `count` workflow entries.
pub async fn generate(count: usize, output: String) -> Result<()> {
    let config_file = generate_sample_config(count);
    std::fs::write(&output, config_file.to_json()?)?;

    println!(
        "Wrote {} workflow entries to {}",
        config_file.workflow_list.len(),
        output
    );

    Ok(())
}

/// Validate an existing configuration file.
pub async fn validate(config_path: String) -> Result<()> {
    let config_file = WorkflowConfigFile::load(&config_path)?;

    println!(
        "{} is valid ({} workflow(s))",
        config_path,
        config_file.workflow_list.len()
    );

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("workflow_config.json")
            .to_string_lossy()
            .to_string();

        generate(3, path.clone()).await.unwrap();

        let config_file = WorkflowConfigFile::load(&path).unwrap();
        assert_eq!(config_file.workflow_list.len(), 3);
        assert!(config_file.workflow_list[0]
            .workflow_name
            .ends_with("_0"));

        validate(path).await.unwrap();
    }
}
