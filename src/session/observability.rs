use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::SessionError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommandSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the command failed).
    Error,
    /// Critical error (reading or writing the table failed at the I/O level).
    Critical,
}

impl CommandSeverity {
    pub fn name(self) -> &'static str {
        match self {
            CommandSeverity::Info => "info",
            CommandSeverity::Warning => "warning",
            CommandSeverity::Error => "error",
            CommandSeverity::Critical => "critical",
        }
    }
}

/// The command a [`super::Session`] ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Open,
    Describe,
    CountNa,
    ListColumns,
    FillNa,
    DropNa,
    DropDuplicates,
    Normalize,
    Evaluate,
    Write,
}

impl CommandKind {
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Open => "open",
            CommandKind::Describe => "describe",
            CommandKind::CountNa => "count_na",
            CommandKind::ListColumns => "list_columns",
            CommandKind::FillNa => "fill_na",
            CommandKind::DropNa => "drop_na",
            CommandKind::DropDuplicates => "drop_duplicates",
            CommandKind::Normalize => "normalize",
            CommandKind::Evaluate => "evaluate",
            CommandKind::Write => "write",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Context about one command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub command: CommandKind,
    /// The file the session was opened from, if any.
    pub input: Option<PathBuf>,
}

/// One observed outcome, rendered as a single `key=value` log line.
enum Event<'a> {
    Ok(CommandStats),
    Failure(CommandSeverity, &'a SessionError),
    Alert(CommandSeverity, &'a SessionError),
}

fn render(ctx: &CommandContext, event: Event<'_>) -> String {
    let input = ctx
        .input
        .as_ref()
        .map_or_else(|| "-".to_string(), |p| p.display().to_string());
    let head = |kind: &str| format!("event={kind} command={} input={input:?}", ctx.command);
    match event {
        Event::Ok(stats) => format!("{} rows={} columns={}", head("ok"), stats.rows, stats.columns),
        Event::Failure(severity, error) => format!(
            "{} severity={} error={:?}",
            head("failure"),
            severity.name(),
            error.to_string()
        ),
        Event::Alert(severity, error) => format!(
            "{} severity={} error={:?}",
            head("alert"),
            severity.name(),
            error.to_string()
        ),
    }
}

/// Shape of the table a successful command produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStats {
    pub rows: usize,
    pub columns: usize,
}

/// Observer interface for command outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait CommandObserver: Send + Sync {
    /// Called when a command succeeds.
    fn on_success(&self, _ctx: &CommandContext, _stats: CommandStats) {}

    /// Called when a command fails.
    fn on_failure(&self, _ctx: &CommandContext, _severity: CommandSeverity, _error: &SessionError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &CommandContext, severity: CommandSeverity, error: &SessionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn CommandObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn CommandObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl CommandObserver for CompositeObserver {
    fn on_success(&self, ctx: &CommandContext, stats: CommandStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &CommandContext, severity: CommandSeverity, error: &SessionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &CommandContext, severity: CommandSeverity, error: &SessionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs command events to stderr, one `cleanse: key=value ...` line each.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl CommandObserver for StdErrObserver {
    fn on_success(&self, ctx: &CommandContext, stats: CommandStats) {
        eprintln!("cleanse: {}", render(ctx, Event::Ok(stats)));
    }

    fn on_failure(&self, ctx: &CommandContext, severity: CommandSeverity, error: &SessionError) {
        eprintln!("cleanse: {}", render(ctx, Event::Failure(severity, error)));
    }

    fn on_alert(&self, ctx: &CommandContext, severity: CommandSeverity, error: &SessionError) {
        eprintln!("cleanse: {}", render(ctx, Event::Alert(severity, error)));
    }
}

/// Appends command events to a local log file, prefixed with a unix timestamp (`ts=...`).
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Writes are best-effort; failures to open or write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn record(&self, ctx: &CommandContext, event: Event<'_>) {
        let line = format!("ts={} {}", unix_ts(), render(ctx, event));
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl CommandObserver for FileObserver {
    fn on_success(&self, ctx: &CommandContext, stats: CommandStats) {
        self.record(ctx, Event::Ok(stats));
    }

    fn on_failure(&self, ctx: &CommandContext, severity: CommandSeverity, error: &SessionError) {
        self.record(ctx, Event::Failure(severity, error));
    }

    fn on_alert(&self, ctx: &CommandContext, severity: CommandSeverity, error: &SessionError) {
        self.record(ctx, Event::Alert(severity, error));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;

    #[test]
    fn lines_are_key_value_fields() {
        let ctx = CommandContext {
            command: CommandKind::DropNa,
            input: Some(PathBuf::from("in.csv")),
        };
        assert_eq!(
            render(&ctx, Event::Ok(CommandStats { rows: 3, columns: 2 })),
            r#"event=ok command=drop_na input="in.csv" rows=3 columns=2"#
        );

        let err = SessionError::from(DataError::InvalidAxis(2));
        let line = render(
            &CommandContext { input: None, ..ctx },
            Event::Alert(CommandSeverity::Error, &err),
        );
        assert!(line.starts_with(r#"event=alert command=drop_na input="-" severity=error error=""#));
    }
}
