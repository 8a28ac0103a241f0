// src/main.rs

use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion2blog::{
    AppError, Command, CommandLineInput, HttpImageFetcher, NotionHttpClient, SyncConfig,
    SyncReport, Synchronizer,
};
use std::fs;
use std::time::Duration;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("notion2blog.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Prints the run tally and, when nothing at all was found, the usual
/// checklist of configuration mistakes.
fn report_run(config: &SyncConfig, report: &SyncReport) {
    println!("✓ Sync finished: {}", report);

    if report.total == 0 {
        println!("⚠️  No pages found. Please check:");
        println!("   1. the database id ({})", config.database_id);
        println!("   2. that the integration has access to the database");
        println!("   3. that the database contains pages");
    }
}

/// Runs a single sync pass.
async fn run_once(config: &SyncConfig, full_sync: bool) -> Result<SyncReport, AppError> {
    let client = NotionHttpClient::new(&config.token)?;
    let fetcher = HttpImageFetcher::new();
    let synchronizer = Synchronizer::new(&client, &fetcher, config);
    synchronizer.run(full_sync).await
}

/// Runs sync passes forever on a fixed interval. Passes are strictly
/// sequential; a failed pass is logged and the loop continues.
async fn run_watch(config: &SyncConfig, interval_secs: u64, full_sync: bool) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    loop {
        interval.tick().await;
        match run_once(config, full_sync).await {
            Ok(report) => report_run(config, &report),
            Err(e) => log::error!("Sync pass failed: {}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = SyncConfig::resolve(&cli)?;

    match cli.command {
        Command::Sync { full_sync } => {
            let report = run_once(&config, full_sync).await?;
            report_run(&config, &report);
        }
        Command::Watch {
            interval,
            full_sync,
        } => {
            log::info!("Watching for changes every {}s", interval);
            run_watch(&config, interval, full_sync).await;
        }
    }

    Ok(())
}
