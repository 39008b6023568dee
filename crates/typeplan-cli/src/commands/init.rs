//! Init command implementation.
//!
//! Writes a starter typeplan.json, or prints the schema of the file.

use std::fs;

use crate::cli::InitArgs;
use crate::commands::utils;
use crate::config::{CONFIG_FILE, TypeplanConfig};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Execute the init command.
///
/// # Errors
///
/// Refuses to replace an existing typeplan.json unless `--force` is given.
pub async fn execute(args: InitArgs) -> Result<()> {
    if args.schema {
        println!(
            "{}",
            serde_json::to_string_pretty(&TypeplanConfig::json_schema())?
        );
        return Ok(());
    }

    let cwd = utils::get_cwd(args.cwd.as_deref())?;
    let path = cwd.join(CONFIG_FILE);
    if path.exists() && !args.force {
        return Err(CliError::InvalidArgument(format!(
            "{} already exists\n\nHint: Pass --force to overwrite it",
            utils::display_path(&path, &cwd)
        )));
    }

    let content = TypeplanConfig::example_config()?;
    fs::write(&path, content + "\n")
        .context(format!("Cannot write {}", path.display()))
        .with_hint("Check that the directory exists and is writable")?;

    ui::success(&format!("Created {}", utils::display_path(&path, &cwd)));
    ui::info("Edit the targets, then run `typeplan check` to see the planned jobs");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(dir: &TempDir, force: bool) -> InitArgs {
        InitArgs {
            cwd: Some(dir.path().to_path_buf()),
            force,
            schema: false,
        }
    }

    #[tokio::test]
    async fn writes_a_loadable_config() {
        let dir = TempDir::new().unwrap();
        execute(args(&dir, false)).await.unwrap();

        let text = fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        let config: TypeplanConfig = serde_json::from_str(&text).unwrap();
        config.validate().unwrap();
        assert!(config.targets.contains_key("app"));
    }

    #[tokio::test]
    async fn existing_config_needs_force() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{}").unwrap();

        let err = execute(args(&dir, false)).await.unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(
            fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap(),
            "{}"
        );

        execute(args(&dir, true)).await.unwrap();
        assert_ne!(
            fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap(),
            "{}"
        );
    }

    #[tokio::test]
    async fn unwritable_directory_reports_hint() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        let err = execute(InitArgs {
            cwd: Some(missing),
            force: false,
            schema: false,
        })
        .await
        .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Cannot write"));
        assert!(message.contains("Hint: Check that the directory exists"));
    }
}
