use crate::domain::ScanReport;
use crate::ports::OutputPort;
use anyhow::Result;
use console::style;
use std::path::Path;

struct OutputWriter {
    output_file: Option<String>,
}

impl OutputWriter {
    fn new() -> Self {
        Self { output_file: None }
    }

    fn with_file(path: &Path) -> Self {
        Self {
            output_file: Some(path.to_string_lossy().to_string()),
        }
    }

    fn write_content(&self, content: &str) -> Result<()> {
        match &self.output_file {
            Some(path) => {
                std::fs::write(path, content)?;
            }
            None => {
                print!("{}", content);
            }
        }
        Ok(())
    }
}

pub struct ConsoleOutputAdapter;

impl ConsoleOutputAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleOutputAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPort for ConsoleOutputAdapter {
    fn write_report(&self, report: &ScanReport) -> Result<()> {
        println!("\n=== ROM Scan Results ===");
        println!("Loose ROM files: {}", report.files_scanned);
        println!("Archives examined: {}", report.archives_scanned);
        println!(
            "Hashed: {} ({:.2} MB)",
            report.hashed_count(),
            report.bytes_hashed as f64 / 1_048_576.0
        );
        println!("Errors: {}", report.error_count());

        for result in &report.results {
            match (&result.hash, &result.error) {
                (Some(hash), _) => {
                    let provenance = match &result.archive_name {
                        Some(archive) => format!(" (from {})", archive),
                        None => String::new(),
                    };
                    println!(
                        "  {} {}{}",
                        style(hash).green(),
                        result.display_name,
                        provenance
                    );
                }
                (None, Some(error)) => {
                    println!(
                        "  {} {}: {}",
                        style("ERROR").red().bold(),
                        result.display_name,
                        error
                    );
                }
                // Unreachable: constructors enforce hash XOR error.
                (None, None) => {}
            }
        }
        Ok(())
    }
}

pub struct JsonOutputAdapter {
    writer: OutputWriter,
}

impl JsonOutputAdapter {
    pub fn with_file(path: &Path) -> Self {
        Self {
            writer: OutputWriter::with_file(path),
        }
    }

    pub fn with_stdout() -> Self {
        Self {
            writer: OutputWriter::new(),
        }
    }
}

impl OutputPort for JsonOutputAdapter {
    fn write_report(&self, report: &ScanReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_content(&format!("{}\n", json))
    }
}
