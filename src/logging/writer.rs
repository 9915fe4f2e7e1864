//! Rolling log writer
//!
//! Appends timestamped, identity-tagged lines to a log file. A file that has reached the
//! size threshold is archived under a timestamped name before the new line is written,
//! and the fresh file starts with header lines pointing back at the archive.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::console::{ConsoleColor, ConsoleSink, TerminalSink};
use crate::error::{IoOp, LogError};
use crate::identity::{EnvIdentity, Identity, IdentityProvider};

use super::clock::{format_timestamp, Clock, SystemClock};
use super::retention::prune_archives;
use super::retry::{retry, WRITE_ATTEMPTS};
use super::rollover::{free_archive_path, needs_rollover, RolloverRecord, DEFAULT_THRESHOLD_BYTES};
use super::target::LogTarget;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Separator between the attribution and the message of every line
pub const MESSAGE_SEPARATOR: &str = "  ::::  ";

/// Default pause after renaming a rolled-over file
pub const DEFAULT_ROLLOVER_PAUSE: Duration = Duration::from_millis(250);

/// Tunables for [`RollingLogWriter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterSettings {
    /// Files at or above this size are archived before the next write
    pub threshold_bytes: u64,
    /// Pause between archiving a file and creating its replacement
    pub rollover_pause: Duration,
    /// Archives of one log to keep; `None` keeps all of them
    pub max_archives: Option<usize>,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            threshold_bytes: DEFAULT_THRESHOLD_BYTES,
            rollover_pause: DEFAULT_ROLLOVER_PAUSE,
            max_archives: None,
        }
    }
}

/// Per-call options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Also print the written line to the console
    pub echo: bool,
    /// Foreground color of the echoed line
    pub color: ConsoleColor,
}

impl WriteOptions {
    /// Options that echo the line in `color`
    pub fn echo(color: ConsoleColor) -> Self {
        Self { echo: true, color }
    }
}

/// What happened to the log file during a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file did not exist and was created
    Created,
    /// The file was archived and a fresh one started
    RolledOver(RolloverRecord),
    /// The line was appended to an existing file
    Appended,
}

/// Result of a successful write
#[derive(Debug, Clone)]
pub struct WriteReport {
    pub target: LogTarget,
    /// The log directory had to be created
    pub directory_created: bool,
    pub outcome: WriteOutcome,
    /// The entry line as written, without line ending
    pub line: String,
}

/// Format one log line: `<timestamp> <domain>\<user>  ::::  <message>`
pub fn format_line(stamp: &str, identity: &Identity, message: &str) -> String {
    format!("{} {}{}{}", stamp, identity, MESSAGE_SEPARATOR, message)
}

/// Appends lines to a log file, rolling it over by size
pub struct RollingLogWriter {
    settings: WriterSettings,
    identity: Box<dyn IdentityProvider>,
    clock: Box<dyn Clock>,
    console: Arc<dyn ConsoleSink>,
    base_dir: Option<PathBuf>,
}

impl Default for RollingLogWriter {
    fn default() -> Self {
        Self::new(WriterSettings::default())
    }
}

impl RollingLogWriter {
    /// Create a writer using the process environment, the wall clock and the terminal
    pub fn new(settings: WriterSettings) -> Self {
        Self {
            settings,
            identity: Box::new(EnvIdentity),
            clock: Box::new(SystemClock),
            console: Arc::new(TerminalSink),
            base_dir: None,
        }
    }

    /// Use a different identity source
    pub fn with_identity(mut self, identity: impl IdentityProvider + 'static) -> Self {
        self.identity = Box::new(identity);
        self
    }

    /// Use a different time source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Echo lines to `console` instead of the terminal
    pub fn with_console(mut self, console: Arc<dyn ConsoleSink>) -> Self {
        self.console = console;
        self
    }

    /// Resolve relative paths against `dir` instead of the working directory
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Append `text` as one entry to the log at `path`
    ///
    /// The whole sequence (resolve, create, roll over, append) is attempted twice. If
    /// both attempts fail the last cause is returned inside [`LogError::MultipleErrors`].
    pub fn write_line(
        &self,
        path: &str,
        text: &str,
        options: &WriteOptions,
    ) -> Result<WriteReport, LogError> {
        let report = retry(WRITE_ATTEMPTS, |_| self.attempt(path, text)).map_err(
            |(attempts, source)| LogError::MultipleErrors {
                path: path.to_string(),
                attempts,
                source: Box::new(source),
            },
        )?;

        tracing::debug!(
            "Wrote to {} ({:?}, directory created: {})",
            report.target.path.display(),
            report.outcome,
            report.directory_created
        );

        if options.echo {
            if let Err(e) = self.console.echo(&report.line, options.color) {
                tracing::warn!("Failed to echo log line to console: {}", e);
            }
        }

        Ok(report)
    }

    fn attempt(&self, path: &str, text: &str) -> Result<WriteReport, LogError> {
        let target = match &self.base_dir {
            Some(base) => LogTarget::resolve_in(path, base)?,
            None => LogTarget::resolve(path)?,
        };
        let identity = self.identity.identity();
        let stamp = format_timestamp(&self.clock.now());

        let directory_created = ensure_directory(&target.directory)?;
        let outcome = self.prepare_file(&target, &identity, &stamp)?;

        let line = format_line(&stamp, &identity, text);
        let mut log = LogFile::append(&target.path)?;
        if directory_created {
            log.line(&format_line(
                &stamp,
                &identity,
                &format!("Log directory created: {}", target.directory.display()),
            ))?;
        }
        if matches!(outcome, WriteOutcome::Created | WriteOutcome::RolledOver(_)) {
            log.line(&format_line(
                &stamp,
                &identity,
                &format!("Log file created: {}", target.path.display()),
            ))?;
        }
        if let WriteOutcome::RolledOver(record) = &outcome {
            log.line(&format_line(
                &stamp,
                &identity,
                &format!("Previous log: {}", record.archive_name),
            ))?;
        }
        log.line(&line)?;
        log.finish()?;

        Ok(WriteReport {
            target,
            directory_created,
            outcome,
            line,
        })
    }

    /// Make sure the log file exists and is under the threshold
    fn prepare_file(
        &self,
        target: &LogTarget,
        identity: &Identity,
        stamp: &str,
    ) -> Result<WriteOutcome, LogError> {
        match fs::metadata(&target.path) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                create_empty(&target.path)?;
                Ok(WriteOutcome::Created)
            }
            Err(e) => Err(LogError::io(IoOp::Metadata, &target.path, e)),
            Ok(meta) if needs_rollover(meta.len(), self.settings.threshold_bytes) => {
                self.roll_over(target, identity, stamp)
            }
            Ok(_) => Ok(WriteOutcome::Appended),
        }
    }

    fn roll_over(
        &self,
        target: &LogTarget,
        identity: &Identity,
        stamp: &str,
    ) -> Result<WriteOutcome, LogError> {
        let record = free_archive_path(target, stamp);

        let mut old = LogFile::append(&target.path)?;
        old.line(&format_line(
            stamp,
            identity,
            &format!(
                "Log size exceeded {} bytes, rolling over to {}",
                self.settings.threshold_bytes, record.archive_name
            ),
        ))?;
        old.line(&format_line(stamp, identity, "End log"))?;
        old.finish()?;

        fs::rename(&target.path, &record.archive_path)
            .map_err(|e| LogError::io(IoOp::Rename, &target.path, e))?;
        if !self.settings.rollover_pause.is_zero() {
            std::thread::sleep(self.settings.rollover_pause);
        }
        create_empty(&target.path)?;

        tracing::info!(
            "Rolled over {} to {}",
            target.path.display(),
            record.archive_path.display()
        );

        if let Some(keep) = self.settings.max_archives {
            match prune_archives(target, keep) {
                Ok(0) => {}
                Ok(count) => tracing::info!("Removed {} old archives of {}", count, target.file_name()),
                Err(e) => tracing::warn!("Failed to prune archives of {}: {}", target.file_name(), e),
            }
        }

        Ok(WriteOutcome::RolledOver(record))
    }
}

/// Create `dir` if missing; returns whether it was created
fn ensure_directory(dir: &Path) -> Result<bool, LogError> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir).map_err(|e| LogError::io(IoOp::CreateDir, dir, e))?;
    Ok(true)
}

fn create_empty(path: &Path) -> Result<(), LogError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(drop)
        .map_err(|e| LogError::io(IoOp::CreateFile, path, e))
}

/// Append handle to a log file, closed when dropped
struct LogFile<'a> {
    path: &'a Path,
    writer: BufWriter<File>,
}

impl<'a> LogFile<'a> {
    fn append(path: &'a Path) -> Result<Self, LogError> {
        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| LogError::io(IoOp::Open, path, e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    fn line(&mut self, line: &str) -> Result<(), LogError> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.write_all(LINE_ENDING.as_bytes()))
            .map_err(|e| LogError::io(IoOp::Write, self.path, e))
    }

    fn finish(mut self) -> Result<(), LogError> {
        self.writer
            .flush()
            .map_err(|e| LogError::io(IoOp::Write, self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MemorySink;
    use crate::identity::FixedIdentity;
    use crate::logging::clock::FixedClock;
    use tempfile::TempDir;

    const STAMP: &str = "10/18/2026 14:03:05";
    const PREFIX: &str = "10/18/2026 14:03:05 .\\alice  ::::  ";

    fn writer(dir: &Path) -> RollingLogWriter {
        let settings = WriterSettings {
            threshold_bytes: 1024,
            rollover_pause: Duration::ZERO,
            max_archives: None,
        };
        RollingLogWriter::new(settings)
            .with_identity(FixedIdentity::new(".", "alice"))
            .with_clock(FixedClock::at("2026-10-18 14:03:05").unwrap())
            .with_console(Arc::new(MemorySink::new()))
            .with_base_dir(dir)
    }

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_format_line() {
        let id = Identity::new("HOST", "alice", "HOST");
        assert_eq!(format_line(STAMP, &id, "started"), format!("{}started", PREFIX));
    }

    #[test]
    fn test_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let report = writer(temp_dir.path())
            .write_line("logs/app.log", "started", &WriteOptions::default())
            .unwrap();

        assert!(report.directory_created);
        assert_eq!(report.outcome, WriteOutcome::Created);

        let path = temp_dir.path().join("logs").join("app.log");
        let lines = read_lines(&path);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(PREFIX));
        assert!(lines[0].contains("Log directory created:"));
        assert!(lines[1].contains("Log file created:"));
        assert_eq!(lines[2], format!("{}started", PREFIX));
    }

    #[test]
    fn test_existing_directory_gets_no_directory_header() {
        let temp_dir = TempDir::new().unwrap();
        let report = writer(temp_dir.path())
            .write_line("app.log", "started", &WriteOptions::default())
            .unwrap();

        assert!(!report.directory_created);
        let lines = read_lines(&temp_dir.path().join("app.log"));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Log file created:"));
    }

    #[test]
    fn test_plain_append_has_no_headers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(&path, "existing line\n").unwrap();

        let w = writer(temp_dir.path());
        let first = w.write_line("app.log", "", &WriteOptions::default()).unwrap();
        let second = w.write_line("app.log", "", &WriteOptions::default()).unwrap();

        assert_eq!(first.outcome, WriteOutcome::Appended);
        assert_eq!(second.outcome, WriteOutcome::Appended);
        let lines = read_lines(&path);
        assert_eq!(
            lines,
            vec!["existing line".to_string(), PREFIX.to_string(), PREFIX.to_string()]
        );
    }

    #[test]
    fn test_entries_keep_call_order() {
        let temp_dir = TempDir::new().unwrap();
        let w = writer(temp_dir.path());
        w.write_line("app.log", "one", &WriteOptions::default()).unwrap();
        w.write_line("app.log", "two", &WriteOptions::default()).unwrap();

        let lines = read_lines(&temp_dir.path().join("app.log"));
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("one"));
        assert!(lines[2].ends_with("two"));
    }

    #[test]
    fn test_rollover_archives_and_starts_fresh() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.log");
        let old_content = "x".repeat(1500);
        fs::write(&path, format!("{}\n", old_content)).unwrap();

        let report = writer(temp_dir.path())
            .write_line("big.log", "x", &WriteOptions::default())
            .unwrap();

        let archive_name = "big_10-18-2026_14.03.05.log_";
        match &report.outcome {
            WriteOutcome::RolledOver(record) => {
                assert_eq!(record.archive_name, archive_name);
                assert_eq!(record.archive_path, temp_dir.path().join(archive_name));
            }
            other => panic!("expected rollover, got {:?}", other),
        }

        let archived = read_lines(&temp_dir.path().join(archive_name));
        assert_eq!(archived.len(), 3);
        assert_eq!(archived[0], old_content);
        assert!(archived[1].contains("rolling over to big_10-18-2026_14.03.05.log_"));
        assert_eq!(archived[2], format!("{}End log", PREFIX));

        let fresh = read_lines(&path);
        assert_eq!(fresh.len(), 3);
        assert!(fresh[0].contains("Log file created:"));
        assert_eq!(fresh[1], format!("{}Previous log: {}", PREFIX, archive_name));
        assert_eq!(fresh[2], format!("{}x", PREFIX));
    }

    #[test]
    fn test_rollover_at_exact_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(&path, vec![b'a'; 1024]).unwrap();

        let report = writer(temp_dir.path())
            .write_line("app.log", "next", &WriteOptions::default())
            .unwrap();
        assert!(matches!(report.outcome, WriteOutcome::RolledOver(_)));
    }

    #[test]
    fn test_under_threshold_appends() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        fs::write(&path, vec![b'a'; 1023]).unwrap();

        let report = writer(temp_dir.path())
            .write_line("app.log", "next", &WriteOptions::default())
            .unwrap();
        assert_eq!(report.outcome, WriteOutcome::Appended);
    }

    #[test]
    fn test_second_rollover_in_same_second_gets_counter() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let w = writer(temp_dir.path());

        fs::write(&path, vec![b'a'; 2048]).unwrap();
        w.write_line("app.log", "first", &WriteOptions::default()).unwrap();
        fs::write(&path, vec![b'b'; 2048]).unwrap();
        let report = w.write_line("app.log", "second", &WriteOptions::default()).unwrap();

        match report.outcome {
            WriteOutcome::RolledOver(record) => {
                assert_eq!(record.archive_name, "app_10-18-2026_14.03.05-2.log_")
            }
            other => panic!("expected rollover, got {:?}", other),
        }
        assert!(temp_dir.path().join("app_10-18-2026_14.03.05.log_").exists());
    }

    #[test]
    fn test_rollover_prunes_archives() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let mut w = writer(temp_dir.path());
        w.settings.max_archives = Some(1);

        for _ in 0..3 {
            fs::write(&path, vec![b'a'; 2048]).unwrap();
            w.write_line("app.log", "entry", &WriteOptions::default()).unwrap();
        }

        let archives: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".log_"))
            .collect();
        assert_eq!(archives.len(), 1);
    }

    #[test]
    fn test_pruning_leaves_other_logs_archives() {
        let temp_dir = TempDir::new().unwrap();
        let sibling = temp_dir.path().join("app_x_10-01-2026_09.00.00.log_");
        fs::write(&sibling, b"archive of app_x.log").unwrap();
        fs::write(temp_dir.path().join("app.log"), vec![b'a'; 2048]).unwrap();

        let mut w = writer(temp_dir.path());
        w.settings.max_archives = Some(1);
        let report = w.write_line("app.log", "entry", &WriteOptions::default()).unwrap();

        assert!(matches!(report.outcome, WriteOutcome::RolledOver(_)));
        assert!(sibling.exists());
        assert!(temp_dir.path().join("app_10-18-2026_14.03.05.log_").exists());
    }

    #[test]
    fn test_echo_goes_to_console() {
        let temp_dir = TempDir::new().unwrap();
        let sink = Arc::new(MemorySink::new());
        let w = writer(temp_dir.path()).with_console(sink.clone());

        w.write_line("app.log", "quiet", &WriteOptions::default()).unwrap();
        assert!(sink.lines().is_empty());

        let report = w
            .write_line("app.log", "loud", &WriteOptions::echo(ConsoleColor::Yellow))
            .unwrap();
        assert_eq!(sink.lines(), vec![(report.line, ConsoleColor::Yellow)]);
    }

    #[test]
    fn test_failure_after_two_attempts() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the log directory should be
        fs::write(temp_dir.path().join("blocker"), b"not a directory").unwrap();

        let err = writer(temp_dir.path())
            .write_line("blocker/app.log", "lost", &WriteOptions::default())
            .unwrap_err();

        match &err {
            LogError::MultipleErrors { attempts, .. } => assert_eq!(*attempts, 2),
            other => panic!("expected MultipleErrors, got {:?}", other),
        }
        assert!(matches!(err.root_cause(), LogError::Io { .. }));
        assert!(err.to_string().contains("multiple errors occurred"));
    }

    /// Blocks the log directory with a regular file on the first lookup only
    struct BlockFirstAttempt {
        dir: PathBuf,
        calls: std::cell::Cell<usize>,
    }

    impl IdentityProvider for BlockFirstAttempt {
        fn identity(&self) -> Identity {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call == 1 {
                fs::write(&self.dir, b"in the way").unwrap();
            } else if self.dir.is_file() {
                fs::remove_file(&self.dir).unwrap();
            }
            Identity::new(".", "alice", "")
        }
    }

    #[test]
    fn test_second_attempt_writes_one_entry() {
        let temp_dir = TempDir::new().unwrap();
        let identity = BlockFirstAttempt {
            dir: temp_dir.path().join("logs"),
            calls: std::cell::Cell::new(0),
        };
        let report = writer(temp_dir.path())
            .with_identity(identity)
            .write_line("logs/app.log", "recovered", &WriteOptions::default())
            .unwrap();

        assert!(report.directory_created);
        assert_eq!(report.outcome, WriteOutcome::Created);
        let lines = read_lines(&temp_dir.path().join("logs").join("app.log"));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().filter(|l| l.ends_with("recovered")).count(), 1);
        assert_eq!(lines[2], format!("{}recovered", PREFIX));
    }

    #[test]
    fn test_invalid_path_fails_after_retry() {
        let temp_dir = TempDir::new().unwrap();
        let err = writer(temp_dir.path())
            .write_line("", "lost", &WriteOptions::default())
            .unwrap_err();
        assert!(matches!(err.root_cause(), LogError::InvalidPath { .. }));
    }
}
