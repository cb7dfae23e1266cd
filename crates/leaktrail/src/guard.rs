use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::error::Error;
use crate::report::{Format, JsonPrettyReporter, JsonReporter, Reporter, TextReporter};
use crate::sink::LogSink;
use crate::stack;
use crate::tracker::{self, Tracker, TrackerConfig};

/// Whether leak output is mirrored to the console in addition to the sink.
///
/// A clean-run "No dangling pointers logged" line always goes to the console;
/// this mode only gates the error output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConsoleMode {
    #[default]
    Enabled,
    Disabled,
}

impl ConsoleMode {
    /// Recognized values: enabled/disabled, true/false, 1/0 (case-insensitive).
    fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("enabled")
            || value.eq_ignore_ascii_case("true")
            || value == "1"
        {
            Some(Self::Enabled)
        } else if value.eq_ignore_ascii_case("disabled")
            || value.eq_ignore_ascii_case("false")
            || value == "0"
        {
            Some(Self::Disabled)
        } else {
            None
        }
    }
}

enum ReporterConfig {
    Format(Format),
    Custom(Box<dyn Reporter>),
    None, // defaults to Format::Text
}

/// Builder for a tracked session.
///
/// `GuardBuilder` is the explicit init boundary: [`build`](Self::build) opens
/// the log sink, installs the process-wide tracker, and returns a
/// [`LeakGuard`] whose drop is the teardown boundary — reconciliation runs
/// and the leak report is emitted when the guard goes out of scope.
///
/// # Examples
///
/// ```rust,ignore
/// let _guard = leaktrail::GuardBuilder::new("main")
///     .log_path("target/leaks.log")
///     .console(leaktrail::ConsoleMode::Enabled)
///     .build()?;
/// ```
///
/// Only one guard can be active at a time; building a second one panics.
pub struct GuardBuilder {
    session: &'static str,
    log_path: PathBuf,
    log_all: bool,
    console: ConsoleMode,
    max_depth: usize,
    reporter: ReporterConfig,
}

impl GuardBuilder {
    pub fn new(session: &'static str) -> Self {
        Self {
            session,
            log_path: PathBuf::from("log.txt"),
            log_all: true,
            console: ConsoleMode::Enabled,
            max_depth: stack::MAX_DEPTH,
            reporter: ReporterConfig::None,
        }
    }

    /// Sink file location. Default: `log.txt` in the working directory.
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// When enabled, every allocation and deallocation event is written to
    /// the sink as it happens; otherwise only the final leak report is.
    /// Default: enabled. Env override: `LEAKTRAIL_LOG_ALL`.
    pub fn log_all(mut self, log_all: bool) -> Self {
        self.log_all = log_all;
        self
    }

    /// Mirror leak output to the console. Default: enabled. Env override:
    /// `LEAKTRAIL_CONSOLE` (enabled/disabled/true/false/1/0).
    pub fn console(mut self, console: ConsoleMode) -> Self {
        self.console = console;
        self
    }

    /// Stack capture depth per event, clamped to [`MAX_DEPTH`](crate::MAX_DEPTH).
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Console output format for the leak report.
    pub fn format(mut self, format: Format) -> Self {
        self.reporter = ReporterConfig::Format(format);
        self
    }

    /// Custom reporter; overrides any format setting.
    pub fn reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = ReporterConfig::Custom(reporter);
        self
    }

    /// Opens the sink (truncating it) and installs the tracker.
    ///
    /// A sink that cannot be opened is fatal: the error propagates rather
    /// than letting the session run with its diagnostics silently dropped.
    ///
    /// # Panics
    ///
    /// Panics if another leaktrail guard is already active.
    pub fn build(self) -> Result<LeakGuard, Error> {
        tracker::with_tracking_suppressed(|| {
            let slot = tracker::state();
            if slot.load().is_some() {
                panic!("More than one leaktrail guard cannot be alive at the same time.");
            }

            let log_all = match std::env::var("LEAKTRAIL_LOG_ALL") {
                Ok(v) => v.eq_ignore_ascii_case("true") || v == "1",
                Err(_) => self.log_all,
            };
            let console = match std::env::var("LEAKTRAIL_CONSOLE") {
                Ok(v) => ConsoleMode::parse(&v).unwrap_or(self.console),
                Err(_) => self.console,
            };

            let reporter: Box<dyn Reporter> = match self.reporter {
                ReporterConfig::Format(Format::Text) | ReporterConfig::None => {
                    Box::new(TextReporter)
                }
                ReporterConfig::Format(Format::Json) => Box::new(JsonReporter),
                ReporterConfig::Format(Format::JsonPretty) => Box::new(JsonPrettyReporter),
                ReporterConfig::Custom(reporter) => reporter,
            };

            let sink = LogSink::open(&self.log_path)?;
            let config = TrackerConfig {
                session: self.session,
                log_all,
                max_depth: self.max_depth.min(stack::MAX_DEPTH),
            };
            slot.store(Some(Arc::new(RwLock::new(Tracker::with_sink(config, sink)))));

            Ok(LeakGuard { console, reporter })
        })
    }
}

/// Active tracked session. Dropping it runs teardown exactly once:
/// the tracker is removed from the process-wide slot (quiescing the hooks),
/// the leak diff runs, and the report goes to the sink and — per
/// [`ConsoleMode`] — the console.
pub struct LeakGuard {
    console: ConsoleMode,
    reporter: Box<dyn Reporter>,
}

impl Drop for LeakGuard {
    fn drop(&mut self) {
        // Empty the slot first: once it is gone no further events can arrive
        // and the diff below observes a quiesced state.
        let Some(state) = tracker::state().swap(None) else {
            return;
        };

        tracker::with_tracking_suppressed(|| {
            let Ok(mut tracker) = state.write() else {
                return;
            };
            tracker.reconcile();
            let report = tracker.leak_report();
            tracker.write_report_to_sink(&report);

            if report.is_clean() || self.console == ConsoleMode::Enabled {
                if let Err(e) = self.reporter.report(&report) {
                    eprintln!("Failed to report leaktrail results: {e}");
                }
            }
        });
    }
}
