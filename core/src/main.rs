use clap::Parser;
use dcmtidy_core::cli::{Cli, RunReport};
use dcmtidy_core::MigrationDriver;
use log::{error, info};
use std::process;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if !config.in_dir.is_dir() {
        eprintln!("Error: {} is not a directory", config.in_dir.display());
        process::exit(1);
    }

    info!(
        "reorganizing {} into {} ({} mode, {} layout)",
        config.in_dir.display(),
        config.out_dir.display(),
        config.mode,
        config.layout
    );

    let mut driver = match MigrationDriver::new(&config) {
        Ok(driver) => driver,
        Err(e) => {
            error!("cannot start run: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let summary = match driver.run() {
        Ok(summary) => summary,
        Err(e) => {
            error!("run aborted: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if cli.verbose {
        eprintln!("{}", RunReport::new(&summary));
    }

    // partial failure surfaces only through the log; success stays silent
    if let Some(path) = &summary.failure_log {
        println!("{}", path.display());
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Warn)
            .init();
    }
}
