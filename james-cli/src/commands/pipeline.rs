//! Pipeline command handlers
//!
//! Handles creating a pipeline from a repository's configuration file and
//! showing a stored pipeline.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use james_core::{Pipeline, PipelineError};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Create a new pipeline from a configuration file
    Create {
        /// Path to the repository's configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Revision to check out
        #[arg(short, long)]
        revision: String,

        /// E-mail address to contact about the pipeline's status
        #[arg(long)]
        contact: String,
    },
    /// Show a stored pipeline
    Show {
        /// Pipeline ID
        id: u64,

        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle pipeline commands
pub fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    match command {
        PipelineCommands::Create {
            config: path,
            revision,
            contact,
        } => create_pipeline(&config.project_dir, &path, revision, contact).map(|_| ()),
        PipelineCommands::Show { id, json } => show_pipeline(&config.project_dir, id, json),
    }
}

/// Create and save a new pipeline
fn create_pipeline(
    project_dir: &Path,
    path: &Path,
    revision: String,
    contact: String,
) -> Result<Pipeline> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    let data: serde_yaml::Value = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

    let mut pipeline: Pipeline = Pipeline::new(&data, project_dir, revision, contact)
        .context("Failed to create pipeline")?;

    pipeline.save().map_err(|e: PipelineError| {
        if e.is_contention() {
            anyhow::Error::new(e).context("Project is busy, try again later")
        } else {
            anyhow::Error::new(e).context("Failed to save pipeline")
        }
    })?;

    println!("{}", "✓ Pipeline created successfully!".green().bold());
    if let Some(id) = pipeline.id() {
        println!("  ID:   {}", id.to_string().cyan());
    }
    if let Some(pwd) = pipeline.pwd() {
        println!("  Path: {}", pwd.display().to_string().dimmed());
    }
    println!("  Jobs: {}", pipeline.jobs().len().to_string().dimmed());

    Ok(pipeline)
}

/// Load and display a stored pipeline
fn show_pipeline(project_dir: &Path, id: u64, json: bool) -> Result<()> {
    let pipeline: Pipeline = Pipeline::load(project_dir, id)
        .with_context(|| format!("Failed to load pipeline {}", id))?;

    if json {
        println!("{}", to_json(&pipeline)?);
    } else {
        print_pipeline_details(&pipeline);
    }

    Ok(())
}

/// Convert the stored record of a pipeline to pretty-printed JSON
fn to_json(pipeline: &Pipeline) -> Result<String> {
    let value = serde_json::to_value(pipeline.dump()).context("Failed to convert pipeline")?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Print detailed pipeline information
fn print_pipeline_details(pipeline: &Pipeline) {
    println!("{}", "Pipeline Details:".bold());
    if let Some(id) = pipeline.id() {
        println!("  ID:       {}", id.to_string().cyan());
    }
    println!("  Revision: {}", pipeline.revision().bold());
    println!("  Contact:  {}", pipeline.contact());
    match chrono::DateTime::from_timestamp(pipeline.created(), 0) {
        Some(created) => println!("  Created:  {}", created.format("%Y-%m-%d %H:%M:%S")),
        None => println!("  Created:  {}", pipeline.created()),
    }
    if let Some(stages) = pipeline.stages() {
        println!("  Stages:   {}", stages.join(" → "));
    }

    println!("\n{}", "Jobs:".bold());
    for (name, job) in pipeline.jobs() {
        let stage = job.stage().map(|s| format!("[{}]", s)).unwrap_or_default();
        println!(
            "  {} {} {} {}",
            "▸".cyan(),
            name.bold(),
            stage.dimmed(),
            job.status().as_str().yellow()
        );
        for line in job.script() {
            println!("      $ {}", line.dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONFIG: &str = "stages: [build]\njobs:\n  build:\n    stage: build\n    script: make\n";

    #[test]
    fn test_create_then_show() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("proj");
        let config = tmp.path().join(".james-ci.yml");
        std::fs::write(&config, CONFIG).unwrap();

        let pipeline = create_pipeline(
            &project_dir,
            &config,
            "abc123".to_string(),
            "dev@x.org".to_string(),
        )
        .unwrap();

        assert_eq!(pipeline.id(), Some(1));
        assert!(project_dir.join("1/pipeline.yml").is_file());
        assert!(show_pipeline(&project_dir, 1, false).is_ok());
        assert!(show_pipeline(&project_dir, 1, true).is_ok());
        assert!(show_pipeline(&project_dir, 2, false).is_err());
    }

    #[test]
    fn test_json_output() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join(".james-ci.yml");
        std::fs::write(&config, CONFIG).unwrap();

        let project_dir = tmp.path().join("proj");
        let pipeline =
            create_pipeline(&project_dir, &config, "abc123".to_string(), "dev@x.org".to_string())
                .unwrap();
        let json: serde_json::Value = serde_json::from_str(&to_json(&pipeline).unwrap()).unwrap();

        assert_eq!(json["meta"]["revision"], "abc123");
        assert_eq!(json["meta"]["created"], pipeline.created());
        assert_eq!(json["stages"][0], "build");
        assert_eq!(json["jobs"]["build"]["script"][0], "make");
    }

    #[test]
    fn test_foreign_entry_in_project_dir() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join(".james-ci.yml");
        std::fs::write(&config, CONFIG).unwrap();

        // The configuration file is not a pipeline directory.
        let result = create_pipeline(
            tmp.path(),
            &config,
            "abc123".to_string(),
            "dev@x.org".to_string(),
        );

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains(".james-ci.yml"));
    }

    #[test]
    fn test_missing_config_file() {
        let tmp = TempDir::new().unwrap();
        let result = create_pipeline(
            &tmp.path().join("proj"),
            &tmp.path().join("missing.yml"),
            "abc123".to_string(),
            "dev@x.org".to_string(),
        );

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("Failed to read configuration file"));
    }
}
