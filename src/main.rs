use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Confirm};
use romscout::adapters::{
    ConsoleOutputAdapter, FileSystemAdapter, JsonOutputAdapter, Md5Hasher, ProgressBarAdapter,
};
use romscout::cli::{Cli, OutputFormat};
use romscout::domain::{Platform, ScanReport};
use romscout::ports::OutputPort;
use romscout::services::{suggest, RomScanService};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let abort = Arc::new(AtomicBool::new(false));
    {
        let abort = Arc::clone(&abort);
        let _ = ctrlc::set_handler(move || {
            eprintln!("\nstopping after the current file...");
            abort.store(true, Ordering::Relaxed);
        });
    }

    let config = args.to_scan_config().with_abort_flag(abort);
    let filesystem = FileSystemAdapter::new();
    let hasher = Md5Hasher::new();
    let progress = ProgressBarAdapter::new().with_quiet(args.quiet);
    let scanner = RomScanService::new(filesystem, hasher, progress);

    let report = match scanner.scan(&config) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Error during scan: {}", err);
            process::exit(1);
        }
    };

    if let Some(platforms_file) = &args.platforms_file {
        if let Err(err) = suggest_platform(&args, &report, platforms_file) {
            eprintln!("Platform suggestion skipped: {}", err);
        }
    }

    let output: Box<dyn OutputPort> = match args.output_format {
        OutputFormat::Text => Box::new(ConsoleOutputAdapter::new()),
        OutputFormat::Json => match &args.output_file {
            Some(path) => Box::new(JsonOutputAdapter::with_file(path)),
            None => Box::new(JsonOutputAdapter::with_stdout()),
        },
    };
    if let Err(err) = output.write_report(&report) {
        eprintln!("Error writing results: {}", err);
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "romscout=info",
        1 => "romscout=debug",
        _ => "romscout=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// The heuristic is advisory: show the guess and let the user confirm it.
fn suggest_platform(args: &Cli, report: &ScanReport, platforms_file: &std::path::Path) -> Result<()> {
    let raw = std::fs::read_to_string(platforms_file)
        .with_context(|| format!("could not read {}", platforms_file.display()))?;
    let platforms: Vec<Platform> =
        serde_json::from_str(&raw).context("platform file is not a JSON [{id, name}] array")?;

    let root_name = args
        .root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let filenames: Vec<String> = report
        .results
        .iter()
        .map(|r| {
            r.display_name
                .rsplit('/')
                .next()
                .unwrap_or(&r.display_name)
                .to_string()
        })
        .collect();

    match suggest(&root_name, &filenames, &platforms) {
        Some(platform) => {
            let accepted = args.assume_yes
                || Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!(
                        "This looks like a {} collection (platform id {}). Match against it?",
                        platform.name, platform.id
                    ))
                    .default(true)
                    .interact()
                    .unwrap_or(false);
            if accepted {
                println!("Selected platform: {} (id {})", platform.name, platform.id);
            } else {
                println!("Platform suggestion declined.");
            }
        }
        None => println!("No platform suggestion for this folder."),
    }
    Ok(())
}
