//! Job domain types
//!
//! A pipeline only talks to its jobs through [`JobEntity`]: build a job from
//! its configuration fragment, and dump it back to one.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;

use crate::domain::record::ConfigRecord;
use crate::error::JobError;

/// Information about the owning pipeline handed to a job while it is built
#[derive(Debug, Clone, Copy)]
pub struct JobContext<'a> {
    /// Directory holding all pipelines of the project
    pub project_dir: &'a Path,
    /// ID of the owning pipeline, if one has been assigned yet
    pub pipeline_id: Option<u64>,
    /// Stages declared by the owning pipeline
    pub stages: Option<&'a [String]>,
    /// Whether metadata must be read from the fragment
    pub with_meta: bool,
}

/// Contract between a pipeline and the jobs it owns
pub trait JobEntity: Sized {
    /// Error raised when a fragment can't be imported
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build a job from its configuration fragment
    fn from_config(fragment: &Value, ctx: &JobContext<'_>) -> Result<Self, Self::Error>;

    /// Dump the job's configuration as a mapping
    fn dump(&self) -> Mapping;
}

/// Job execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Created,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Errored,
}

impl JobStatus {
    /// Name of the status as stored in a pipeline's configuration file
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Errored => "errored",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single build step of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    base: ConfigRecord,
    script: Vec<String>,
    stage: Option<String>,
    status: JobStatus,
}

#[derive(Deserialize)]
struct JobDocument {
    script: Option<Script>,
    stage: Option<String>,
    meta: Option<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Script {
    Line(String),
    Lines(Vec<String>),
}

#[derive(Deserialize)]
struct JobMeta {
    status: JobStatus,
}

impl Job {
    /// Environment variables of this job
    pub fn env(&self) -> &std::collections::BTreeMap<String, String> {
        &self.base.env
    }

    /// Commands to run, in order
    pub fn script(&self) -> &[String] {
        &self.script
    }

    /// Stage this job belongs to
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn set_status(&mut self, status: JobStatus) {
        self.status = status;
    }
}

impl JobEntity for Job {
    type Error = JobError;

    fn from_config(fragment: &Value, ctx: &JobContext<'_>) -> Result<Self, JobError> {
        if !fragment.is_mapping() {
            return Err(JobError::Structure(
                "job configuration must be a mapping".to_string(),
            ));
        }

        let base = ConfigRecord::from_config(fragment)
            .map_err(|e| JobError::Structure(e.to_string()))?;
        let doc: JobDocument = serde_yaml::from_value(fragment.clone())
            .map_err(|e| JobError::Structure(e.to_string()))?;

        let script = match doc.script {
            Some(Script::Line(line)) => vec![line],
            Some(Script::Lines(lines)) => lines,
            None => return Err(JobError::Structure("missing key 'script'".to_string())),
        };

        // Fresh jobs start out as created; stored ones must carry their status.
        let status = if ctx.with_meta {
            let meta = doc
                .meta
                .ok_or_else(|| JobError::Structure("missing key 'meta'".to_string()))?;
            serde_yaml::from_value::<JobMeta>(meta)
                .map_err(|e| JobError::Structure(format!("meta: {e}")))?
                .status
        } else {
            JobStatus::Created
        };

        Ok(Self {
            base,
            script,
            stage: doc.stage,
            status,
        })
    }

    fn dump(&self) -> Mapping {
        let mut ret = self.base.dump();
        if let Some(stage) = &self.stage {
            ret.insert("stage".into(), stage.as_str().into());
        }
        ret.insert(
            "script".into(),
            Value::Sequence(self.script.iter().map(|s| s.as_str().into()).collect()),
        );

        let mut meta = Mapping::new();
        meta.insert("status".into(), self.status.as_str().into());
        ret.insert("meta".into(), Value::Mapping(meta));
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(with_meta: bool) -> JobContext<'static> {
        JobContext {
            project_dir: Path::new("/var/ci/proj"),
            pipeline_id: None,
            stages: None,
            with_meta,
        }
    }

    fn fragment(source: &str) -> Value {
        serde_yaml::from_str(source).unwrap()
    }

    #[test]
    fn test_fresh_job_is_created() {
        let job = Job::from_config(&fragment("script: make"), &ctx(false)).unwrap();

        assert_eq!(job.script(), ["make".to_string()]);
        assert_eq!(job.stage(), None);
        assert_eq!(job.status(), JobStatus::Created);
    }

    #[test]
    fn test_fresh_job_ignores_meta() {
        let job = Job::from_config(
            &fragment("{script: [make], meta: {status: 42}}"),
            &ctx(false),
        )
        .unwrap();

        assert_eq!(job.status(), JobStatus::Created);
    }

    #[test]
    fn test_stored_job_requires_meta() {
        let result = Job::from_config(&fragment("script: [make]"), &ctx(true));
        assert!(matches!(result, Err(JobError::Structure(_))));

        let job = Job::from_config(
            &fragment("{script: [make], meta: {status: running}}"),
            &ctx(true),
        )
        .unwrap();
        assert_eq!(job.status(), JobStatus::Running);
    }

    #[test]
    fn test_missing_script() {
        let result = Job::from_config(&fragment("stage: build"), &ctx(false));
        assert!(result.unwrap_err().to_string().contains("script"));
    }

    #[test]
    fn test_fragment_must_be_mapping() {
        assert!(Job::from_config(&fragment("[make]"), &ctx(false)).is_err());
    }

    #[test]
    fn test_status_names_reimport() {
        let all = [
            JobStatus::Created,
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Success,
            JobStatus::Failed,
            JobStatus::Canceled,
            JobStatus::Errored,
        ];
        for status in all {
            let parsed: JobStatus = serde_yaml::from_str(status.as_str()).unwrap();
            assert_eq!(parsed, status);
        }
        assert_eq!(JobStatus::Canceled.to_string(), "canceled");
    }

    #[test]
    fn test_dump_writes_status() {
        let mut job = Job::from_config(&fragment("script: make"), &ctx(false)).unwrap();
        job.set_status(JobStatus::Errored);

        let dumped = Value::Mapping(job.dump());
        assert_eq!(dumped["meta"]["status"], Value::from("errored"));
    }

    #[test]
    fn test_dump_reimports() {
        let mut job = Job::from_config(
            &fragment(
                r#"
                stage: test
                env:
                  CC: clang
                script:
                  - make
                  - make test
                "#,
            ),
            &ctx(false),
        )
        .unwrap();
        job.set_status(JobStatus::Success);

        let dumped = Value::Mapping(job.dump());
        let again = Job::from_config(&dumped, &ctx(true)).unwrap();
        assert_eq!(again, job);
    }
}
