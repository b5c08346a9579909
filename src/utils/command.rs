/// Functions for building and running external workflow commands

use std::fs::File;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use crate::config::defs::PipelineError;


pub fn arg_generator(config_path: &Path) -> Vec<String> {
    let mut args_vec: Vec<String> = Vec::new();
    args_vec.push(config_path.to_string_lossy().to_string());
    args_vec
}


/// Runs `tool <config>` once and waits for it. Stdout goes to `log_path`, stderr is inherited.
///
/// # Arguments
///
/// * `tool` - Executable name or path.
/// * `config_path` - Workflow configuration handed to the tool.
/// * `log_path` - File receiving the tool's stdout (truncated).
///
pub async fn run_workflow(tool: &str, config_path: &Path, log_path: &Path) -> Result<(), PipelineError> {
    let log_file = File::create(log_path).map_err(|e| PipelineError::io(log_path, e))?;
    let args = arg_generator(config_path);

    let status = Command::new(tool)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| PipelineError::ToolExecution {
            tool: tool.to_string(),
            error: format!("Failed to spawn: {}. Is {} installed?", e, tool),
        })?;

    if !status.success() {
        return Err(PipelineError::ToolExecution {
            tool: tool.to_string(),
            error: format!("exited with {}", status),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_arg_generator() {
        assert_eq!(arg_generator(Path::new("/out/HLA_HBAR.cfg")), vec!["/out/HLA_HBAR.cfg".to_string()]);
    }

    #[tokio::test]
    async fn test_run_workflow_missing_tool() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let result = run_workflow("definitely-not-a-real-tool-hla", &dir.path().join("x.cfg"), &dir.path().join("x.log")).await;
        assert!(matches!(result, Err(PipelineError::ToolExecution { .. })));
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_workflow_exit_status() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let cfg = dir.path().join("x.cfg");
        let log = dir.path().join("x.log");
        std::fs::write(&cfg, "[General]\n")?;

        run_workflow("true", &cfg, &log).await?;
        assert!(log.exists());

        let result = run_workflow("false", &cfg, &log).await;
        assert!(matches!(result, Err(PipelineError::ToolExecution { .. })));
        Ok(())
    }
}
