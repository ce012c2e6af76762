use crate::backup::result_error::error::Error;
use crate::backup::tar::WalkStats;
use crate::backup::target::Target;

use derive_more::Display;
use serde::Serialize;

use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArchiveStatus {
    #[display("SUCCESS")]
    Success,
    #[display("FAILED")]
    Failed,
}

/// Figures of a finished archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveStats {
    pub archived_file_count: u64,
    pub archived_byte_count: u64,
    pub ignored_file_count: u64,
    pub archive_size: u64,
    pub archive_path: PathBuf,
}

impl ArchiveStats {
    pub fn new(walk: WalkStats, archive_size: u64, archive_path: PathBuf) -> Self {
        Self {
            archived_file_count: walk.archived_file_count,
            archived_byte_count: walk.archived_byte_count,
            ignored_file_count: walk.ignored_file_count,
            archive_size,
            archive_path,
        }
    }
}

#[derive(Debug)]
pub enum ArchiveOutcome {
    Success(ArchiveStats),
    Failed(Error),
}

/// What happened to one target. Statistics exist only on success, the error only on
/// failure.
#[derive(Debug)]
pub struct ArchiveResult {
    target: Arc<Target>,
    outcome: ArchiveOutcome,
}

impl ArchiveResult {
    pub fn success(target: Arc<Target>, stats: ArchiveStats) -> Self {
        Self {
            target,
            outcome: ArchiveOutcome::Success(stats),
        }
    }

    pub fn failed(target: Arc<Target>, error: Error) -> Self {
        Self {
            target,
            outcome: ArchiveOutcome::Failed(error),
        }
    }

    pub fn target(&self) -> &Arc<Target> {
        &self.target
    }

    pub fn outcome(&self) -> &ArchiveOutcome {
        &self.outcome
    }

    pub fn status(&self) -> ArchiveStatus {
        match self.outcome {
            ArchiveOutcome::Success(_) => ArchiveStatus::Success,
            ArchiveOutcome::Failed(_) => ArchiveStatus::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == ArchiveStatus::Success
    }

    pub fn stats(&self) -> Option<&ArchiveStats> {
        match &self.outcome {
            ArchiveOutcome::Success(stats) => Some(stats),
            ArchiveOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match &self.outcome {
            ArchiveOutcome::Success(_) => None,
            ArchiveOutcome::Failed(e) => Some(e),
        }
    }

    pub fn archived_file_count(&self) -> Option<u64> {
        self.stats().map(|s| s.archived_file_count)
    }

    pub fn archived_byte_count(&self) -> Option<u64> {
        self.stats().map(|s| s.archived_byte_count)
    }

    pub fn ignored_file_count(&self) -> Option<u64> {
        self.stats().map(|s| s.ignored_file_count)
    }

    pub fn archive_size(&self) -> Option<u64> {
        self.stats().map(|s| s.archive_size)
    }

    pub fn archive_path(&self) -> Option<&Path> {
        self.stats().map(|s| s.archive_path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Arc<Target> {
        Arc::new(
            Target::builder()
                .description("Documents")
                .source_path("/home/me/Documents")
                .archive_name("documents")
                .build(),
        )
    }

    #[test]
    fn test_success_populates_stats_only() {
        let walk = WalkStats {
            archived_file_count: 2,
            archived_byte_count: 30,
            ignored_file_count: 1,
        };
        let result = ArchiveResult::success(
            target(),
            ArchiveStats::new(walk, 120, PathBuf::from("/backup/documents.tar.xz")),
        );
        assert_eq!(result.status(), ArchiveStatus::Success);
        assert!(result.is_success());
        assert_eq!(result.archived_file_count(), Some(2));
        assert_eq!(result.archived_byte_count(), Some(30));
        assert_eq!(result.ignored_file_count(), Some(1));
        assert_eq!(result.archive_size(), Some(120));
        assert_eq!(
            result.archive_path(),
            Some(Path::new("/backup/documents.tar.xz"))
        );
        assert!(result.error().is_none());
        assert_eq!(result.target().description(), "Documents");
    }

    #[test]
    fn test_failure_populates_error_only() {
        let result = ArchiveResult::failed(target(), std::io::Error::other("disk full").into());
        assert_eq!(result.status(), ArchiveStatus::Failed);
        assert!(!result.is_success());
        assert_eq!(result.archived_file_count(), None);
        assert_eq!(result.archived_byte_count(), None);
        assert_eq!(result.ignored_file_count(), None);
        assert_eq!(result.archive_size(), None);
        assert!(result.archive_path().is_none());
        assert_eq!(result.error().unwrap().to_string(), "disk full");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ArchiveStatus::Success.to_string(), "SUCCESS");
        assert_eq!(ArchiveStatus::Failed.to_string(), "FAILED");
        assert_eq!(
            serde_json::to_string(&ArchiveStatus::Failed).unwrap(),
            "\"FAILED\""
        );
    }
}
