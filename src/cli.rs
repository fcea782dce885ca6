use crate::domain::ScanConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "romscout")]
#[command(about = "Find ROM files and fingerprint them by content hash")]
#[command(version)]
pub struct Cli {
    #[arg(help = "Directory to scan for ROM files and archives")]
    pub root: PathBuf,

    #[arg(short = 'q', long = "quiet", help = "Suppress the progress bar")]
    pub quiet: bool,

    #[arg(
        long = "timeout-minutes",
        help = "Per-file hashing ceiling in minutes",
        default_value = "30"
    )]
    pub timeout_minutes: u64,

    #[arg(
        long = "platforms",
        help = "JSON file with catalog platform candidates ([{\"id\":..,\"name\":..}]) to drive a platform suggestion"
    )]
    pub platforms_file: Option<PathBuf>,

    #[arg(
        short = 'y',
        long = "yes",
        help = "Accept the platform suggestion without prompting"
    )]
    pub assume_yes: bool,

    #[arg(
        short = 'f',
        long = "format",
        help = "Output format",
        value_enum,
        default_value = "text"
    )]
    pub output_format: OutputFormat,

    #[arg(
        short = 'o',
        long = "output",
        help = "Output file path (stdout if not specified)"
    )]
    pub output_file: Option<PathBuf>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Emit diagnostic detail (-v debug, -vv trace)"
    )]
    pub verbose: u8,
}

impl Cli {
    pub fn to_scan_config(&self) -> ScanConfig {
        ScanConfig::new(self.root.clone())
            .with_hash_timeout(Duration::from_secs(self.timeout_minutes * 60))
            .with_quiet(self.quiet)
    }
}
