//! Configuration module
//!
//! Handles CLI configuration, i.e. where the project's pipelines are stored.

use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding all pipelines of the project
    pub project_dir: PathBuf,
}

impl Config {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    /// Validates the configuration
    ///
    /// The project directory doesn't need to exist yet, it is created along
    /// with the first pipeline.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.project_dir.as_os_str().is_empty() {
            anyhow::bail!("project_dir cannot be empty");
        }

        if self.project_dir.exists() && !self.project_dir.is_dir() {
            anyhow::bail!(
                "project_dir {} is not a directory",
                self.project_dir.display()
            );
        }

        Ok(())
    }
}
