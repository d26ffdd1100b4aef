//! Pipeline domain types
//!
//! A pipeline bundles the jobs of one run together with the revision they were
//! built for and a contact address. It is created from the repository's
//! configuration with [`Pipeline::new`], persisted with [`Pipeline::save`] and
//! read back with [`Pipeline::load`].

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::job::{Job, JobContext, JobEntity};
use crate::domain::jobs::{Jobs, JobsMut};
use crate::domain::record::ConfigRecord;
use crate::error::{PipelineError, Result};
use crate::repository::{IdAllocator, PipelineStore};

/// Metadata recorded when a pipeline is created
///
/// The three fields always travel together; a pipeline never has only part
/// of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineMeta {
    /// Creation time as UNIX timestamp
    pub created: i64,
    /// E-mail address of the committer
    pub contact: String,
    /// Revision to check out
    pub revision: String,
}

/// A pipeline and its jobs
#[derive(Debug, Clone)]
pub struct Pipeline<J = Job> {
    id: Option<u64>,
    store: PipelineStore,
    base: ConfigRecord,
    stages: Option<Vec<String>>,
    jobs: BTreeMap<String, J>,
    meta: PipelineMeta,
}

#[derive(Deserialize)]
struct PipelineDocument {
    #[serde(default)]
    stages: Option<Vec<String>>,
    jobs: BTreeMap<String, Value>,
    meta: Option<Value>,
}

impl<J: JobEntity> Pipeline<J> {
    /// Create a new pipeline from the repository's configuration
    ///
    /// Metadata in `data` is ignored: the creation time is set to now, the
    /// revision and contact to the given values. No ID is assigned until the
    /// pipeline is saved.
    ///
    /// # Errors
    /// Returns [`PipelineError::JobImport`] if any job fails to import, or
    /// [`PipelineError::Structure`] if `jobs` is missing or malformed.
    pub fn new(
        data: &Value,
        project_dir: impl Into<PathBuf>,
        revision: impl Into<String>,
        contact: impl Into<String>,
    ) -> Result<Self> {
        let meta = PipelineMeta {
            created: chrono::Utc::now().timestamp(),
            contact: contact.into(),
            revision: revision.into(),
        };
        Self::build(data, project_dir.into(), None, Some(meta))
    }

    /// Build a pipeline from a stored record, including its metadata
    ///
    /// This is the inverse of [`Pipeline::dump`]. The result has no ID: only
    /// [`Pipeline::load`] and [`Pipeline::save`] tie a pipeline to a working
    /// directory.
    pub fn from_config(data: &Value, project_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::build(data, project_dir.into(), None, None)
    }

    /// Load an existing pipeline from its working directory
    ///
    /// # Errors
    /// - [`PipelineError::Io`] if the configuration file can't be read
    /// - [`PipelineError::Syntax`] if it is not valid YAML
    /// - [`PipelineError::Structure`] if a required key (including any of the
    ///   metadata keys) is missing
    /// - [`PipelineError::JobImport`] if a job fails to import
    pub fn load(project_dir: impl Into<PathBuf>, id: u64) -> Result<Self> {
        let store = PipelineStore::new(project_dir);
        let path = store.config_path(id);
        debug!("Loading pipeline {} from {}", id, path.display());

        let content = std::fs::read_to_string(&path)?;
        let data: Value = serde_yaml::from_str(&content)?;

        Self::build(&data, store.project_dir().to_path_buf(), Some(id), None)
    }

    /// Shared constructor; `meta == None` reads the metadata from `data`.
    fn build(
        data: &Value,
        project_dir: PathBuf,
        id: Option<u64>,
        meta: Option<PipelineMeta>,
    ) -> Result<Self> {
        if !data.is_mapping() {
            return Err(PipelineError::structure(
                "pipeline configuration must be a mapping",
            ));
        }

        let base = ConfigRecord::from_config(data)
            .map_err(|e| PipelineError::structure(e.to_string()))?;
        let doc: PipelineDocument = serde_yaml::from_value(data.clone())
            .map_err(|e| PipelineError::structure(e.to_string()))?;

        let with_meta = meta.is_none();
        let ctx = JobContext {
            project_dir: &project_dir,
            pipeline_id: id,
            stages: doc.stages.as_deref(),
            with_meta,
        };

        // Either every job imports or the whole pipeline is rejected.
        let mut jobs = BTreeMap::new();
        for (name, conf) in &doc.jobs {
            let job =
                J::from_config(conf, &ctx).map_err(|e| PipelineError::job_import(name, e))?;
            jobs.insert(name.clone(), job);
        }

        let meta = match meta {
            Some(meta) => meta,
            None => {
                let raw = doc
                    .meta
                    .ok_or_else(|| PipelineError::structure("missing key 'meta'"))?;
                serde_yaml::from_value(raw)
                    .map_err(|e| PipelineError::structure(format!("meta: {e}")))?
            }
        };

        Ok(Self {
            id,
            store: PipelineStore::new(project_dir),
            base,
            stages: doc.stages,
            jobs,
            meta,
        })
    }

    /// Dump the configuration as mapping
    ///
    /// Feeding the result to [`Pipeline::from_config`] yields an equivalent
    /// pipeline.
    pub fn dump(&self) -> Mapping {
        let mut ret = self.base.dump();

        let mut meta = Mapping::new();
        meta.insert("created".into(), self.meta.created.into());
        meta.insert("contact".into(), self.meta.contact.as_str().into());
        meta.insert("revision".into(), self.meta.revision.as_str().into());
        ret.insert("meta".into(), Value::Mapping(meta));

        if let Some(stages) = self.stages() {
            let stages = stages.iter().map(|s| Value::from(s.as_str())).collect();
            ret.insert("stages".into(), Value::Sequence(stages));
        }

        let jobs = self
            .jobs
            .iter()
            .map(|(name, job)| (Value::from(name.as_str()), Value::Mapping(job.dump())))
            .collect();
        ret.insert("jobs".into(), Value::Mapping(jobs));

        ret
    }

    /// Save the configuration to the pipeline's working directory
    ///
    /// A pipeline without ID gets a new one first, which also creates its
    /// working directory. An existing configuration file is overwritten.
    ///
    /// # Errors
    /// Returns [`PipelineError::Contention`] if no ID could be reserved.
    /// A reserved ID is kept even if writing the file fails afterwards.
    pub fn save(&mut self) -> Result<()> {
        let id = match self.id {
            Some(id) => id,
            None => {
                let id = IdAllocator::new(&self.store).allocate()?;
                self.id = Some(id);
                id
            }
        };

        let path = self.store.config_path(id);
        let content = serde_yaml::to_string(&self.dump()).map_err(PipelineError::Serialize)?;
        std::fs::write(&path, content)?;

        info!("Pipeline {} saved to {}", id, path.display());
        Ok(())
    }
}

impl<J> Pipeline<J> {
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Directory holding all pipelines of the project
    pub fn project_dir(&self) -> &Path {
        self.store.project_dir()
    }

    /// Working directory of this pipeline
    ///
    /// `None` as long as no ID is assigned, since the directory doesn't exist
    /// before.
    pub fn pwd(&self) -> Option<PathBuf> {
        self.id.map(|id| self.store.pipeline_dir(id))
    }

    /// Declared stages, in order
    pub fn stages(&self) -> Option<&[String]> {
        self.stages.as_deref().filter(|s| !s.is_empty())
    }

    /// The pipeline's jobs
    ///
    /// Jobs can't be added nor removed through this view.
    pub fn jobs(&self) -> Jobs<'_, J> {
        Jobs::new(&self.jobs)
    }

    /// The pipeline's jobs, each of them modifiable
    pub fn jobs_mut(&mut self) -> JobsMut<'_, J> {
        JobsMut::new(&mut self.jobs)
    }

    pub fn meta(&self) -> &PipelineMeta {
        &self.meta
    }

    /// Creation time as UNIX timestamp
    pub fn created(&self) -> i64 {
        self.meta.created
    }

    pub fn contact(&self) -> &str {
        &self.meta.contact
    }

    pub fn revision(&self) -> &str {
        &self.meta.revision
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.base.env
    }
}
