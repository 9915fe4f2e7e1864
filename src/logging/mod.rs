//! Rolling log files for Rollog
//!
//! Provides the size-rolled log writer, archive naming and retention, and the
//! diagnostics setup for the tool's own output.

mod clock;
mod diagnostics;
mod retention;
mod retry;
mod rollover;
mod target;
mod writer;

pub use clock::{format_timestamp, sanitize_timestamp, Clock, FixedClock, SystemClock, TIMESTAMP_FORMAT};
pub use diagnostics::init_diagnostics;
pub use retention::{list_archives, prune_archives};
pub use retry::{retry, WRITE_ATTEMPTS};
pub use rollover::{archive_name, RolloverRecord, DEFAULT_THRESHOLD_BYTES};
pub use target::LogTarget;
pub use writer::{
    format_line, RollingLogWriter, WriteOptions, WriteOutcome, WriteReport, WriterSettings,
    DEFAULT_ROLLOVER_PAUSE, MESSAGE_SEPARATOR,
};
