use std::path::PathBuf;

/// Errors surfaced while setting up a tracked session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The log sink could not be opened. Fatal at startup: a tracker without
    /// a sink would drop its diagnostics silently.
    #[error("failed to open log sink at {}", path.display())]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
