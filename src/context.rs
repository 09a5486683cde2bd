//! Run context — per-run namespace handed to tools.
//!
//! One `RunContext` exists per pipeline run (one user session). It carries
//! the session id and the data directory that scopes Paged Record Files, so
//! independent runs never share mutable state.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Context for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Unique run/session id.
    pub run_id: Uuid,
    /// Directory holding this run's record files.
    pub data_dir: PathBuf,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    /// Create a context rooted under `data_root`, namespaced by a fresh run id.
    pub fn new(data_root: &Path) -> Self {
        let run_id = Uuid::new_v4();
        Self {
            data_dir: data_root.join(run_id.to_string()),
            run_id,
            started_at: Utc::now(),
        }
    }

    /// Create a context with an explicit data directory (used by tests).
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            data_dir,
            started_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_get_distinct_data_dirs() {
        let root = Path::new("/tmp/inbox-pilot");
        let a = RunContext::new(root);
        let b = RunContext::new(root);
        assert_ne!(a.run_id, b.run_id);
        assert_ne!(a.data_dir, b.data_dir);
        assert!(a.data_dir.starts_with(root));
    }
}
