//! James Core
//!
//! Core types for the James CI system.
//!
//! This crate contains:
//! - Domain types: pipelines, jobs and the configuration keys they share
//! - Repository: the on-disk layout of a project's pipelines and the
//!   allocation of pipeline IDs
//!
//! Scheduling and running jobs is not part of this crate.

pub mod domain;
pub mod error;
pub mod repository;

pub use domain::job::{Job, JobContext, JobEntity, JobStatus};
pub use domain::pipeline::{Pipeline, PipelineMeta};
pub use error::{JobError, PipelineError, Result};
pub use repository::{IdAllocator, PipelineStore};
