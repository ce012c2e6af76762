use crate::backup::archive::{ArchiveEntry, SourceEntry, SourceEntryIterable};
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use crate::backup::target::Target;

use walkdir::{DirEntry, WalkDir};

use std::path::{Component, Path, PathBuf};

impl SourceEntryIterable for Target {
    /// Walks `source_path` and classifies every regular file with the target's filter.
    ///
    /// Symbolic links are neither followed nor archived, so the walk never leaves the
    /// source tree. Entries come out sorted by file name within each directory.
    fn source_entries(&self) -> Result<Box<dyn Iterator<Item = Result<SourceEntry>> + '_>> {
        let src_dir = self.source_path();
        if !src_dir.is_dir() {
            tracing::error!(
                "Source directory does not exist or is not a directory: {:?}",
                src_dir
            );
            return Err(Error::from(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("source path {:?} is not a directory", src_dir),
            )));
        }

        // Fail before anything is written when the filter cannot decide.
        self.filter_mode()?;

        let root_name = archive_root_name(src_dir)?;
        tracing::debug!(
            "Scanning directory {:?}, archive root {:?}",
            src_dir,
            root_name
        );

        let entries = WalkDir::new(src_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |res| match res {
                Ok(de) => process_dir_entry(self, de, &root_name),
                Err(e) => Some(Err(Error::from(e).with_msg("Walking source directory failed"))),
            });

        Ok(Box::new(entries))
    }
}

/// Name of the source directory itself, used as the top-level archive entry.
///
/// The path is made absolute and `.`/`..` are folded lexically, so a symlinked
/// source keeps the name it is configured under.
fn archive_root_name(src_dir: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(src_dir)
        .map_err(Error::from)
        .with_msg(format!("Resolving {:?} failed", src_dir))?;
    normalize_lexically(&absolute)
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| Error::InvalidSourcePath(src_dir.to_path_buf()))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    path.components()
        .fold(PathBuf::new(), |mut acc, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    acc.pop();
                }
                c => acc.push(c),
            }
            acc
        })
}

fn process_dir_entry(
    target: &Target,
    de: DirEntry,
    root_name: &Path,
) -> Option<Result<SourceEntry>> {
    if !de.file_type().is_file() {
        tracing::trace!("Skipping {:?}, not a regular file", de.path());
        return None;
    }

    let p = de.into_path();
    let relevant = match target.is_relevant(&p) {
        Ok(relevant) => relevant,
        Err(e) => return Some(Err(e)),
    };

    if !relevant {
        tracing::trace!("Ignoring {:?}, filtered out", p);
        return Some(Ok(SourceEntry::Ignored(p.into())));
    }

    let res = match p.strip_prefix(target.source_path()) {
        Ok(stripped) => Ok(ArchiveEntry::new(p.as_path(), root_name.join(stripped))),
        Err(e) => Err(Error::from(e).with_msg(format!(
            "Stripping {:?} from {:?} failed",
            target.source_path(),
            p
        ))),
    };

    Some(res.map(|entry| {
        tracing::trace!("Including file: {:?} -> {:?}", entry.src, entry.dst);
        SourceEntry::Relevant(entry)
    }))
}
