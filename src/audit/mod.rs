//! Per-request audit logging.
//!
//! One line per request, appended to an append-only sink after the final
//! status and latency are known, so rejected requests are recorded too.
//! Sink failures are swallowed and reported via tracing; they never block
//! or fail the request pipeline.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

/// Append-only destination for audit lines.
pub trait AuditSink: Send + Sync {
    fn append(&self, line: &str);
}

/// Sink writing to a file opened in append mode.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Open (creating parent directories and the file as needed).
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileSink {
    fn append(&self, line: &str) {
        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(error) = writeln!(file, "{line}") {
            tracing::warn!(path = %self.path.display(), %error, "Audit sink write failed");
        }
    }
}

/// Sink that discards everything. Used when the configured sink cannot be
/// opened, so a broken log destination degrades to silence instead of
/// failing requests.
pub struct NullSink;

impl AuditSink for NullSink {
    fn append(&self, _line: &str) {}
}

/// The audit log: formats request records and hands them to its sink.
pub struct AuditLog {
    sink: Box<dyn AuditSink>,
}

impl AuditLog {
    pub fn new(sink: Box<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Record one completed request.
    pub fn record(&self, client: &str, method: &str, path: &str, status: u16, latency: Duration) {
        let line = format_line(Utc::now(), client, method, path, status, latency);
        self.sink.append(&line);
    }
}

/// `[ISO-timestamp] <client-address> <method> <path> <status> - <latency>ms`
pub fn format_line(
    timestamp: DateTime<Utc>,
    client: &str,
    method: &str,
    path: &str,
    status: u16,
    latency: Duration,
) -> String {
    format!(
        "[{}] {} {} {} {} - {}ms",
        timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        client,
        method,
        path,
        status,
        latency.as_millis(),
    )
}
