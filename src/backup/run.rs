use crate::backup::archiver::Archiver;
use crate::backup::config::Configuration;
use crate::backup::outcome::ArchiveResult;
use crate::backup::result_error::result::Result;

use chrono::Local;
use itertools::Itertools;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use std::sync::Arc;

/// Builds one [`Archiver`] per configured target, in configuration order.
///
/// All archivers of a run share the same timestamp when timestamps are enabled.
pub fn archivers(config: &Configuration) -> Vec<Archiver> {
    let timestamp = config.append_timestamp().then(Local::now);
    config
        .targets()
        .iter()
        .map(|target| {
            Archiver::builder()
                .target(Arc::new(target.clone()))
                .temp_dir(config.temp_dir().as_path())
                .destination_dir(config.destination_dir().as_path())
                .compressor(config.compressor().clone())
                .maybe_timestamp(timestamp)
                .build()
        })
        .collect_vec()
}

/// Archives every target and returns one result per target, in configuration order.
///
/// `jobs` is the number of targets archived at the same time; `1` processes them one
/// after the other on the calling thread and `0` uses one thread per CPU. A failing
/// target never stops the others.
pub fn archive_targets(config: &Configuration, jobs: usize) -> Result<Vec<ArchiveResult>> {
    let archivers = archivers(config);
    if jobs == 1 {
        return Ok(archivers.iter().map(Archiver::create_archive).collect());
    }

    let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
    tracing::info!(
        "Archiving {} targets with {} threads",
        archivers.len(),
        pool.current_num_threads()
    );
    Ok(pool.install(|| archivers.par_iter().map(Archiver::create_archive).collect()))
}
