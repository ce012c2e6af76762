pub mod walkdir_regex;

use crate::backup::result_error::result::Result;
use std::path::Path;
use std::sync::Arc;

/// A file selected for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Source file path on the filesystem
    pub src: Arc<Path>,

    /// Entry name inside the archive, rooted at the source directory's own name.
    pub dst: Arc<Path>,
}

impl ArchiveEntry {
    pub fn new<A: Into<Arc<Path>>, B: Into<Arc<Path>>>(src: A, dst: B) -> ArchiveEntry {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }
}

/// Outcome of running one regular file through the relevance filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEntry {
    Relevant(ArchiveEntry),
    Ignored(Arc<Path>),
}

/// Trait for enumerating every regular file of a backup source
///
/// The iterator yields Results so that errors hit during the walk (permission
/// denied, files vanishing, misconfigured filters) reach the archive writer.
pub trait SourceEntryIterable {
    fn source_entries(&self) -> Result<Box<dyn Iterator<Item = Result<SourceEntry>> + '_>>;
}
