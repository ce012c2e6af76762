use clap::Parser;
use rudimentary_backup::backup::config::Configuration;
use rudimentary_backup::backup::report::{all_succeeded, render, ReportFormat};
use rudimentary_backup::backup::run::archive_targets;
use std::path::PathBuf;
use std::process::exit;
use tracing::{error, info};

/// Rudimentary backup tool: one compressed archive per configured target
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Location of the YAML configuration file
    config_file: PathBuf,

    /// Number of targets archived concurrently, 0 for one per CPU
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Format of the summary printed on stdout
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Table)]
    format: ReportFormat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let res = Configuration::from_yaml_file(&args.config_file)
        .and_then(|config| archive_targets(&config, args.jobs))
        .and_then(|results| render(&results, args.format).map(|report| (results, report)));

    match res {
        Ok((results, report)) => {
            println!("{report}");
            if all_succeeded(&results) {
                info!("All targets archived.");
                exit(0);
            }
            error!("At least one target failed.");
            exit(1);
        }
        Err(e) => {
            error!("{e}");
            exit(2);
        }
    }
}
