use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::record::AllocEvent;
use crate::report::LeakReport;

/// Writable text destination for event and leak logging.
///
/// Opened in truncate mode once per tracked session, before any report is
/// produced. Hot-path write failures are swallowed: the sink is best-effort
/// diagnostics and must never fail its host process.
#[derive(Debug)]
pub struct LogSink {
    out: BufWriter<File>,
    path: PathBuf,
}

impl LogSink {
    /// Opens (and truncates) the sink file.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = File::create(path).map_err(|source| Error::SinkOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            out: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn write_event(&mut self, label: &str, event: &AllocEvent) {
        let _ = writeln!(self.out, "=={label}==");
        let _ = writeln!(self.out, "Pointer: {:#x}", event.addr);
        if event.size > 0 {
            let _ = writeln!(self.out, "Allocation Size: {} bytes", event.size);
        }
        let _ = writeln!(self.out, "Stack Trace:");
        for frame in &event.frames {
            let _ = writeln!(self.out, "{frame}");
        }
        let _ = writeln!(self.out);
    }

    pub(crate) fn write_report(&mut self, report: &LeakReport) {
        if report.is_clean() {
            let _ = writeln!(self.out, "No dangling pointers logged");
        } else {
            for leak in &report.leaks {
                let _ = writeln!(self.out, "===! ERROR !===");
                let _ = writeln!(
                    self.out,
                    "[ERROR] - Dangling pointer at memory address: {:#x}",
                    leak.addr
                );
                let _ = writeln!(self.out, "[ERROR] - Memory leak size: {} bytes", leak.size);
                let _ = writeln!(self.out, "[ERROR] - Stack Trace:");
                for frame in &leak.frames {
                    let _ = writeln!(self.out, "{frame}");
                }
                let _ = writeln!(self.out);
            }
        }
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::LeakEntry;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("leaktrail-sink-{}-{}", std::process::id(), name))
    }

    #[test]
    fn open_truncates_and_writes() {
        let path = temp_path("truncate.log");
        std::fs::write(&path, "stale contents").unwrap();

        let mut sink = LogSink::open(&path).unwrap();
        let event = AllocEvent::new(0xbeef, 32, 0, 1, vec!["frame_a".to_string()]);
        sink.write_event("ALLOCATION", &event);
        sink.write_report(&LeakReport {
            session: "s".to_string(),
            allocations: 1,
            frees: 0,
            leaked_bytes: 32,
            leaks: vec![LeakEntry::from(&event)],
        });
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("stale contents"));
        assert!(contents.contains("==ALLOCATION=="));
        assert!(contents.contains("Allocation Size: 32 bytes"));
        assert!(contents.contains("[ERROR] - Dangling pointer at memory address: 0xbeef"));
        assert!(contents.contains("frame_a"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn clean_report_line() {
        let path = temp_path("clean.log");
        let mut sink = LogSink::open(&path).unwrap();
        sink.write_report(&LeakReport {
            session: "s".to_string(),
            allocations: 0,
            frees: 0,
            leaked_bytes: 0,
            leaks: Vec::new(),
        });
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("No dangling pointers logged"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn open_fails_on_missing_directory() {
        let path = std::env::temp_dir().join("leaktrail-no-such-dir").join("log.txt");
        let err = LogSink::open(&path).unwrap_err();
        assert!(matches!(err, Error::SinkOpen { .. }));
    }
}
