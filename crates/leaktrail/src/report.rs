use colored::Colorize;
use prettytable::{color, Attr, Cell, Row, Table};
use serde::Serialize;

use crate::record::AllocEvent;

/// One unmatched allocation, as reported at teardown.
#[derive(Debug, Clone, Serialize)]
pub struct LeakEntry {
    pub addr: usize,
    pub size: usize,
    pub tid: u64,
    pub frames: Vec<String>,
}

impl From<&AllocEvent> for LeakEntry {
    fn from(event: &AllocEvent) -> Self {
        Self {
            addr: event.addr,
            size: event.size,
            tid: event.tid,
            frames: event.frames.clone(),
        }
    }
}

/// Result of leak reconciliation for one tracked session.
///
/// `leaks` holds the dangling entries newest-first: the allocations that were
/// never matched by a deallocation before teardown.
#[derive(Debug, Clone, Serialize)]
pub struct LeakReport {
    pub session: String,
    pub allocations: u64,
    pub frees: u64,
    pub leaked_bytes: u64,
    pub leaks: Vec<LeakEntry>,
}

impl LeakReport {
    pub fn is_clean(&self) -> bool {
        self.leaks.is_empty()
    }
}

/// Console output format for the leak report.
///
/// * `Text` - per-leak blocks plus a summary table (default)
/// * `Json` - compact JSON, single line
/// * `JsonPretty` - pretty-printed JSON
#[derive(Clone, Copy, Debug, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// Trait for custom leak report output.
///
/// Implement this to route results into logging systems, CI pipelines, or
/// custom file formats instead of the built-in console output.
///
/// # Examples
///
/// ```rust
/// use leaktrail::{LeakReport, Reporter};
///
/// struct CountOnly;
///
/// impl Reporter for CountOnly {
///     fn report(&self, report: &LeakReport) -> Result<(), Box<dyn std::error::Error>> {
///         println!("{} dangling entries", report.leaks.len());
///         Ok(())
///     }
/// }
/// ```
pub trait Reporter: Send + Sync {
    fn report(&self, report: &LeakReport) -> Result<(), Box<dyn std::error::Error>>;
}

/// Formats a byte count with human-readable units.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    }
}

pub(crate) struct TextReporter;

impl Reporter for TextReporter {
    fn report(&self, report: &LeakReport) -> Result<(), Box<dyn std::error::Error>> {
        if report.is_clean() {
            println!(
                "{} {}: No dangling pointers logged",
                "[leaktrail]".blue().bold(),
                report.session.yellow().bold()
            );
            return Ok(());
        }

        for leak in &report.leaks {
            println!("{}", "===! ERROR !===".red().bold());
            println!("Dangling pointer at memory address: {:#x}", leak.addr);
            println!("Memory leak size: {} bytes", leak.size);
            println!("Stack Trace:");
            for frame in &leak.frames {
                println!("{frame}");
            }
            println!();
        }

        display_summary(report);
        Ok(())
    }
}

fn display_summary(report: &LeakReport) {
    let use_colors = std::env::var("NO_COLOR").is_err();

    let mut table = Table::new();
    let header_cells: Vec<Cell> = ["Address", "Leaked", "Thread", "Top frame"]
        .into_iter()
        .map(|header| {
            if use_colors {
                Cell::new(header)
                    .with_style(Attr::Bold)
                    .with_style(Attr::ForegroundColor(color::CYAN))
            } else {
                Cell::new(header).with_style(Attr::Bold)
            }
        })
        .collect();
    table.add_row(Row::new(header_cells));

    for leak in &report.leaks {
        table.add_row(Row::new(vec![
            Cell::new(&format!("{:#x}", leak.addr)),
            Cell::new(&format_bytes(leak.size as u64)),
            Cell::new(&leak.tid.to_string()),
            Cell::new(leak.frames.first().map(String::as_str).unwrap_or("<no stack>")),
        ]));
    }

    println!(
        "{} {} - {} dangling, {} leaked ({} allocations / {} frees)",
        "[leaktrail]".blue().bold(),
        report.session.yellow().bold(),
        report.leaks.len(),
        format_bytes(report.leaked_bytes),
        report.allocations,
        report.frees,
    );
    table.printstd();
}

pub(crate) struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, report: &LeakReport) -> Result<(), Box<dyn std::error::Error>> {
        println!("{}", serde_json::to_string(report)?);
        Ok(())
    }
}

pub(crate) struct JsonPrettyReporter;

impl Reporter for JsonPrettyReporter {
    fn report(&self, report: &LeakReport) -> Result<(), Box<dyn std::error::Error>> {
        println!("{}", serde_json::to_string_pretty(report)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> LeakReport {
        LeakReport {
            session: "test".to_string(),
            allocations: 3,
            frees: 2,
            leaked_bytes: 64,
            leaks: vec![LeakEntry {
                addr: 0x1000,
                size: 64,
                tid: 1,
                frames: vec!["main [0x1]".to_string()],
            }],
        }
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GB");
    }

    #[test]
    fn report_serializes_leak_fields() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(json["session"], "test");
        assert_eq!(json["leaked_bytes"], 64);
        assert_eq!(json["leaks"][0]["addr"], 0x1000);
        assert_eq!(json["leaks"][0]["size"], 64);
        assert_eq!(json["leaks"][0]["frames"][0], "main [0x1]");
    }

    #[test]
    fn clean_report() {
        let mut report = sample_report();
        report.leaks.clear();
        assert!(report.is_clean());
        assert!(!sample_report().is_clean());
    }
}
