use crate::backup::archive::SourceEntry;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use std::fs::File;
use std::io::Write;

static TAR_FILE_EXT: &str = "tar";

/// Counters gathered while feeding a source walk into a TAR archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub archived_file_count: u64,
    pub archived_byte_count: u64,
    pub ignored_file_count: u64,
}

pub fn tar_file_ext() -> &'static str {
    TAR_FILE_EXT
}

/// Appends every relevant entry to `builder`, counting ignored ones without reading them.
///
/// Stops at the first error; the archive is then incomplete and must be discarded.
pub fn append_source_entries<W, I>(builder: &mut tar::Builder<W>, entries: I) -> Result<WalkStats>
where
    W: Write,
    I: IntoIterator<Item = Result<SourceEntry>>,
{
    let mut stats = WalkStats::default();
    for entry in entries {
        match entry? {
            SourceEntry::Relevant(entry) => {
                let mut file = File::open(&entry.src)
                    .map_err(Error::from)
                    .with_msg(format!("Opening {:?} failed", entry.src))?;
                let len = file.metadata()?.len();
                builder
                    .append_file(&entry.dst, &mut file)
                    .map_err(Error::from)
                    .with_msg(format!("Appending {:?} as {:?} failed", entry.src, entry.dst))?;
                stats.archived_file_count += 1;
                stats.archived_byte_count += len;
            }
            SourceEntry::Ignored(_) => stats.ignored_file_count += 1,
        }
    }
    tracing::info!(
        "Processed {} archive entries, ignored {}",
        stats.archived_file_count,
        stats.ignored_file_count
    );
    Ok(stats)
}
