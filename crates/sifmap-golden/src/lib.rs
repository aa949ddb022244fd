//! Golden test infrastructure for the Sifmap mapping engine
//!
//! A golden case is a rule document, a record and the scope criteria to map
//! it with. The runner maps the record outbound to XML and the XML back
//! inbound, and compares both results against a stored snapshot.

pub mod corpus;
pub mod diff;
pub mod runner;
pub mod snapshot;

use std::path::PathBuf;
use thiserror::Error;

pub use corpus::{CaseFilter, CorpusManager, CorpusStatistics};
pub use diff::{DiffEngine, DiffOptions};
pub use runner::{GoldenTestRunner, TestResult};
pub use snapshot::{Snapshot, SnapshotManager};

/// Golden test error types
#[derive(Debug, Error)]
pub enum GoldenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Mapping failed: {0}")]
    Mapping(#[from] sifmap_core::Error),

    #[error("Snapshot mismatch: {0}")]
    SnapshotMismatch(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Test failed: {0}")]
    TestFailed(String),
}

pub type Result<T> = std::result::Result<T, GoldenError>;

/// Where the corpus lives and what to do with stale snapshots
#[derive(Debug, Clone)]
pub struct GoldenConfig {
    pub corpus_dir: PathBuf,
    pub snapshot_dir: PathBuf,
    /// Rewrite snapshots that no longer match
    pub update_snapshots: bool,
    /// Write a snapshot for cases that have none yet
    pub create_missing: bool,
    pub diff_options: DiffOptions,
    pub verbose: bool,
}

impl Default for GoldenConfig {
    fn default() -> Self {
        let corpus_dir = PathBuf::from("../../golden-corpus");
        Self {
            snapshot_dir: corpus_dir.join("snapshots"),
            corpus_dir,
            update_snapshots: false,
            create_missing: false,
            diff_options: DiffOptions::default(),
            verbose: false,
        }
    }
}

impl GoldenConfig {
    /// Defaults overridden by `UPDATE_GOLDEN`, `GOLDEN_CORPUS_DIR`,
    /// `GOLDEN_SNAPSHOT_DIR` and `GOLDEN_VERBOSE`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = std::env::var_os("GOLDEN_CORPUS_DIR") {
            config.corpus_dir = PathBuf::from(dir);
            config.snapshot_dir = config.corpus_dir.join("snapshots");
        }
        if let Some(dir) = std::env::var_os("GOLDEN_SNAPSHOT_DIR") {
            config.snapshot_dir = PathBuf::from(dir);
        }

        config.update_snapshots = env_flag("UPDATE_GOLDEN");
        config.create_missing = config.update_snapshots;
        config.verbose = env_flag("GOLDEN_VERBOSE");
        config
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[doc(hidden)]
pub fn runner_from_env() -> GoldenTestRunner {
    GoldenTestRunner::new(GoldenConfig::from_env())
}

/// Define a test that runs one corpus case, e.g. `"basic/student-name"`
#[macro_export]
macro_rules! golden_test {
    ($name:ident, $case:expr) => {
        #[test]
        fn $name() {
            if let Err(e) = $crate::runner_from_env().run_test($case) {
                panic!("golden case {} failed: {}", $case, e);
            }
        }
    };
}

/// Define a test that runs every case matching a pattern, e.g. `"scopes/*"`
#[macro_export]
macro_rules! golden_test_batch {
    ($name:ident, $pattern:expr) => {
        #[test]
        fn $name() {
            if let Err(e) = $crate::runner_from_env().run_batch($pattern) {
                panic!("golden batch {} failed: {}", $pattern, e);
            }
        }
    };
}
