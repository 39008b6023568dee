use crate::config::TypeplanConfig;
use crate::error::{ConfigError, Result};

impl TypeplanConfig {
    /// Validate configuration for logical consistency.
    ///
    /// Source patterns and destinations are checked again, against the file
    /// system, when targets are planned.
    pub fn validate(&self) -> Result<()> {
        if self.compiler.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "compiler".to_string(),
                value: String::new(),
                hint: "Name a compiler executable such as 'tsc'".to_string(),
            }
            .into());
        }

        if self.jobs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "jobs".to_string(),
                value: "0".to_string(),
                hint: "Use at least 1, or remove it to use every CPU".to_string(),
            }
            .into());
        }

        for (name, target) in &self.targets {
            if target.files.is_empty() {
                return Err(ConfigError::MissingField {
                    field: format!("targets.{name}.files"),
                    hint: "Add at least one { \"src\": [...], \"dest\": \"...\" } mapping"
                        .to_string(),
                }
                .into());
            }
            for (index, mapping) in target.files.iter().enumerate() {
                if mapping.src.is_empty() {
                    return Err(ConfigError::MissingField {
                        field: format!("targets.{name}.files[{index}].src"),
                        hint: "List one or more source patterns".to_string(),
                    }
                    .into());
                }
                if mapping.dest.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: format!("targets.{name}.files[{index}].dest"),
                        value: mapping.dest.clone(),
                        hint: "Use a file path, a directory ending in '/' or a wildcard pattern"
                            .to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}
