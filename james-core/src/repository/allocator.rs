//! Pipeline ID allocation
//!
//! Several independent processes may create pipelines for the same project at
//! the same time, without any lock service between them. A new ID is claimed
//! by creating its directory: creation fails if the directory already exists,
//! so exactly one process wins each ID. Losers recompute the next ID and try
//! again, up to [`MAX_ATTEMPTS`] times.

use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::repository::PipelineStore;

/// Number of reservation attempts before giving up
pub const MAX_ATTEMPTS: u32 = 3;

/// Create-if-absent primitive used to claim an ID
pub trait Reserve {
    /// Create the directory at `path`
    ///
    /// Must fail with [`io::ErrorKind::AlreadyExists`] if it exists and never
    /// succeed into an existing directory.
    fn reserve(&self, path: &Path) -> io::Result<()>;
}

/// Reserves IDs by creating their directories on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateDir;

impl Reserve for CreateDir {
    fn reserve(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir(path)
    }
}

/// Hands out unique pipeline IDs for one project
#[derive(Debug, Clone)]
pub struct IdAllocator<'a, R = CreateDir> {
    store: &'a PipelineStore,
    reserver: R,
}

impl<'a> IdAllocator<'a> {
    pub fn new(store: &'a PipelineStore) -> Self {
        Self::with_reserver(store, CreateDir)
    }
}

impl<'a, R: Reserve> IdAllocator<'a, R> {
    /// Create an allocator with a custom reservation primitive
    pub fn with_reserver(store: &'a PipelineStore, reserver: R) -> Self {
        Self { store, reserver }
    }

    /// Next free ID: one above the highest ID in use, or 1
    ///
    /// Gaps left by removed pipelines are never reused.
    pub fn next_id(&self) -> Result<u64> {
        let dir = self.store.project_dir();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(1),
            Err(e) => return Err(e.into()),
        };

        let mut max = 0;
        for entry in entries {
            let name = entry?.file_name();
            let id = name
                .to_str()
                .and_then(|s| s.parse::<u64>().ok())
                .ok_or_else(|| PipelineError::InvalidLayout {
                    dir: dir.to_path_buf(),
                    entry: name.to_string_lossy().into_owned(),
                })?;
            max = max.max(id);
        }

        // The highest possible ID is taken, there is no ID above it.
        max.checked_add(1).ok_or_else(|| PipelineError::InvalidLayout {
            dir: dir.to_path_buf(),
            entry: max.to_string(),
        })
    }

    /// Claim a new ID by creating its working directory
    ///
    /// # Errors
    /// - [`PipelineError::Contention`] if other processes won the race for
    ///   every candidate
    /// - [`PipelineError::InvalidLayout`] if the project directory contains
    ///   a non-numeric entry or the highest possible ID
    /// - [`PipelineError::Io`] for any other storage failure
    pub fn allocate(&self) -> Result<u64> {
        for attempt in 1..=MAX_ATTEMPTS {
            let id = self.next_id()?;
            let path = self.store.pipeline_dir(id);

            match self.reserver.reserve(&path) {
                Ok(()) => {
                    info!("Reserved pipeline ID {} at {}", id, path.display());
                    return Ok(id);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(
                        "Pipeline ID {} already taken (attempt {}/{})",
                        id, attempt, MAX_ATTEMPTS
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(
            "Giving up ID assignment in {} after {} attempts",
            self.store.project_dir().display(),
            MAX_ATTEMPTS
        );
        Err(PipelineError::Contention {
            attempts: MAX_ATTEMPTS,
        })
    }
}
