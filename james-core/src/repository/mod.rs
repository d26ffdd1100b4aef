//! Repository Module
//!
//! Filesystem layout of a project's pipelines. Every pipeline lives in a
//! directory named by its decimal ID below the project directory:
//!
//! ```text
//! <project_dir>/
//!   1/pipeline.yml
//!   2/pipeline.yml
//! ```

pub mod allocator;

pub use allocator::{CreateDir, IdAllocator, MAX_ATTEMPTS, Reserve};

use std::path::{Path, PathBuf};

/// Path convention for the pipelines of one project
///
/// Pure path arithmetic, no I/O is done here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStore {
    project_dir: PathBuf,
}

impl PipelineStore {
    /// Name of a pipeline's configuration file
    pub const CONFIG_FILE: &'static str = "pipeline.yml";

    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    /// Directory holding all pipelines of the project
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Working directory of the pipeline with the given ID
    pub fn pipeline_dir(&self, id: u64) -> PathBuf {
        self.project_dir.join(id.to_string())
    }

    /// Configuration file of the pipeline with the given ID
    pub fn config_path(&self, id: u64) -> PathBuf {
        self.pipeline_dir(id).join(Self::CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_dir() {
        let store = PipelineStore::new("/var/ci/proj");
        assert_eq!(store.pipeline_dir(1), Path::new("/var/ci/proj/1"));
        assert_eq!(store.pipeline_dir(42), Path::new("/var/ci/proj/42"));
    }

    #[test]
    fn test_config_path() {
        let store = PipelineStore::new("/var/ci/proj");
        assert_eq!(store.config_path(7), Path::new("/var/ci/proj/7/pipeline.yml"));
    }

    #[test]
    fn test_distinct_ids_never_share_a_path() {
        let store = PipelineStore::new("proj");
        assert_ne!(store.pipeline_dir(1), store.pipeline_dir(10));
        assert_ne!(store.pipeline_dir(11), store.pipeline_dir(1).join("1"));
    }
}
