//! # rudimentary-backup
//!
//! Backs up configured directory trees, one compressed `tar.xz` archive per target.
//!
//! ## Features
//!
//! - **Relevance Filtering**: per-target include *or* exclude regular expressions
//! - **Compression**: XZ (LZMA), optionally multi-threaded
//! - **Safe Relocation**: archives are staged in a temp directory and moved into place
//!   without overwriting earlier backups
//! - **Per-Target Outcomes**: a failing target is reported and never stops the others
//! - **Parallel Processing**: optional concurrent archiving of independent targets
//!
//! ## Quick Start
//!
//! ```no_run
//! use rudimentary_backup::backup::config::Configuration;
//! use rudimentary_backup::backup::report::{render, ReportFormat};
//! use rudimentary_backup::backup::run::archive_targets;
//!
//! let config = Configuration::from_yaml_file("backup.yml")?;
//! let results = archive_targets(&config, 1)?;
//! println!("{}", render(&results, ReportFormat::Table)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
