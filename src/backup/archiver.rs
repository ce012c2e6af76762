//! Creation of one compressed archive per backup target.
//!
//! The archive is staged in the temp directory under a unique name, finalized, and
//! then moved into the destination directory. [`Archiver::create_archive`] never
//! returns an error: every failure ends up inside the returned [`ArchiveResult`].

use crate::backup::archive::SourceEntryIterable;
use crate::backup::compress::{CompressorBuilder, XzConfig};
use crate::backup::file_ext::FileExtProvider;
use crate::backup::function_path;
use crate::backup::outcome::{ArchiveResult, ArchiveStats};
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use crate::backup::tar::{append_source_entries, tar_file_ext};
use crate::backup::target::Target;

use bon::Builder;
use chrono::{DateTime, Local};
use function_name::named;
use getset::Getters;
use itertools::Itertools;
use tempfile::{NamedTempFile, PersistError};

use std::fs::File;
use std::io::{BufWriter, ErrorKind, IntoInnerError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

static TIME_FORMAT: &str = "%Y%m%d-%H%M%S";

#[derive(Debug, Clone, Builder, Getters)]
#[getset(get = "pub")]
pub struct Archiver {
    #[builder(into)]
    target: Arc<Target>,
    #[builder(into)]
    temp_dir: PathBuf,
    #[builder(into)]
    destination_dir: PathBuf,
    #[builder(default)]
    compressor: XzConfig,
    /// Appended to the archive file name when set.
    timestamp: Option<DateTime<Local>>,
}

impl Archiver {
    /// Extension of the produced archives, e.g. `tar.xz`.
    pub fn archive_file_ext(&self) -> String {
        std::iter::once(Arc::<str>::from(tar_file_ext()))
            .chain(self.compressor.file_ext())
            .join(".")
    }

    /// Name of the finished archive inside the destination directory.
    pub fn archive_file_name(&self) -> String {
        let base = match &self.timestamp {
            Some(dt) => format!("{}-{}", self.target.archive_name(), dt.format(TIME_FORMAT)),
            None => self.target.archive_name().clone(),
        };
        format!("{}.{}", base, self.archive_file_ext())
    }

    pub fn create_archive(&self) -> ArchiveResult {
        self.archive_source(self.target.as_ref())
    }

    /// Archives the entries of `source` under this archiver's target.
    #[named]
    fn archive_source<S: SourceEntryIterable + ?Sized>(&self, source: &S) -> ArchiveResult {
        tracing::info!("Archiving target {:?}", self.target.description());
        match self.create_archive_intern(source) {
            Ok(stats) => {
                tracing::info!(
                    "Target {:?} archived to {:?}: {} files, {} bytes, {} ignored, archive size {}",
                    self.target.description(),
                    stats.archive_path,
                    stats.archived_file_count,
                    stats.archived_byte_count,
                    stats.ignored_file_count,
                    stats.archive_size
                );
                ArchiveResult::success(self.target.clone(), stats)
            }
            Err(e) => {
                let e = e.with_debug_object_and_fn_name(
                    self.target.description().clone(),
                    function_path!(),
                );
                tracing::error!("{e}");
                ArchiveResult::failed(self.target.clone(), e)
            }
        }
    }

    fn create_archive_intern<S: SourceEntryIterable + ?Sized>(
        &self,
        source: &S,
    ) -> Result<ArchiveStats> {
        let file_name = self.archive_file_name();
        let mut staged = tempfile::Builder::new()
            .prefix(&format!("{}.", self.target.archive_name()))
            .suffix(&format!(".{}", self.archive_file_ext()))
            .tempfile_in(&self.temp_dir)
            .map_err(Error::from)
            .with_msg(format!("Creating staging file in {:?} failed", self.temp_dir))?;
        tracing::debug!("Staging archive at {:?}", staged.path());

        let walk_stats = {
            let encoder = self
                .compressor
                .build_compressor(BufWriter::new(staged.as_file_mut()))?;
            let mut builder = tar::Builder::new(BufWriter::new(encoder));
            let stats = append_source_entries(&mut builder, source.source_entries()?)?;

            builder
                .into_inner()?
                .into_inner()
                .map_err(IntoInnerError::into_error)?
                .finish()?
                .into_inner()
                .map_err(IntoInnerError::into_error)?;
            stats
        };

        staged.as_file().sync_all()?;
        let archive_size = staged.as_file().metadata()?.len();

        let archive_path = relocate(staged, &self.destination_dir.join(file_name))?;
        Ok(ArchiveStats::new(walk_stats, archive_size, archive_path))
    }
}

/// Moves the staged archive to `destination` without replacing an existing file.
///
/// A plain rename is tried first. If that fails for another reason than an existing
/// destination (typically a different file system), the archive is copied next to
/// `destination` and renamed into place, and the staged file is deleted.
fn relocate(staged: NamedTempFile, destination: &Path) -> Result<PathBuf> {
    match staged.persist_noclobber(destination) {
        Ok(_) => Ok(destination.to_path_buf()),
        Err(PersistError { error, .. }) if error.kind() == ErrorKind::AlreadyExists => {
            Err(Error::from(error).with_msg(format!("Archive {:?} already exists", destination)))
        }
        Err(PersistError { error, file }) => {
            tracing::warn!(
                "Renaming {:?} to {:?} failed ({}), copying instead",
                file.path(),
                destination,
                error
            );
            copy_into_place(&file, destination)
                .map(|_| destination.to_path_buf())
                .map_err(|copy_error| {
                    Error::from(error)
                        .chain(copy_error)
                        .with_msg(format!("Moving archive to {:?} failed", destination))
                })
        }
    }
}

fn copy_into_place(staged: &NamedTempFile, destination: &Path) -> Result<()> {
    let dir = destination
        .parent()
        .ok_or_else(|| std::io::Error::other(format!("{:?} has no parent", destination)))?;
    let mut copy = tempfile::Builder::new()
        .prefix(".")
        .suffix(".partial")
        .tempfile_in(dir)?;
    std::io::copy(&mut File::open(staged.path())?, copy.as_file_mut())?;
    copy.as_file().sync_all()?;
    copy.persist_noclobber(destination)
        .map_err(|e| Error::from(e.error))?;
    Ok(())
}
