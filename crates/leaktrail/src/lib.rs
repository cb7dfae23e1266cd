//! A leak-tracking global allocator.
//!
//! Every heap allocation and deallocation flowing through
//! [`TrackingAllocator`] is recorded with its address, size, and captured call
//! stack. When the [`LeakGuard`] drops, allocations that were never matched by
//! a deallocation are reported as dangling entries — each with its size and
//! originating stack trace — to a truncating log sink and, optionally, the
//! console.
//!
//! ```rust,ignore
//! #[global_allocator]
//! static GLOBAL: leaktrail::TrackingAllocator = leaktrail::TrackingAllocator;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let guard = leaktrail::GuardBuilder::new("main").build()?;
//!
//!     // ... code under test ...
//!
//!     drop(guard); // reconciles and reports
//!     Ok(())
//! }
//! ```
//!
//! Recording carries no internal locking beyond a single `RwLock` around the
//! tracker; the hooks are callable from any thread, but per-thread suppression
//! keeps the tracker's own bookkeeping out of the logs.

mod allocator;
mod error;
mod guard;
mod log;
mod record;
mod report;
mod sink;
mod stack;
mod tid;
mod tracker;

pub use allocator::TrackingAllocator;
pub use error::Error;
pub use guard::{ConsoleMode, GuardBuilder, LeakGuard};
pub use log::EventLog;
pub use record::AllocEvent;
pub use report::{format_bytes, Format, LeakEntry, LeakReport, Reporter};
pub use sink::LogSink;
pub use stack::{capture, MAX_DEPTH};
pub use tracker::{Tracker, TrackerConfig};
