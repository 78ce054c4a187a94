//! Logging infrastructure for ransim
//!
//! Process-wide output goes through `tracing`. On top of that, every entity
//! records notable events into an [`EventLog`], the append-only stream the
//! management front end reads and subscribes to.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Number of events retained by an [`EventLog`] before the oldest are dropped.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 1000;

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warn level
    Warn,
    /// Error level - least verbose
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("unknown log level: {s}")),
        }
    }
}

/// Initialize the tracing subscriber with the specified log level.
///
/// `RUST_LOG` overrides `level` when set. Returns `false` if a global
/// subscriber was already installed.
///
/// # Example
///
/// ```
/// use ransim_common::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Debug);
/// ```
pub fn init_logging(level: LogLevel) -> bool {
    init_logging_with_filter(&level.to_string())
}

/// Initialize logging with a custom filter string such as
/// `"info,ransim_nas=debug"`.
pub fn init_logging_with_filter(filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .try_init()
        .is_ok()
}

/// Protocol direction for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Incoming/received message
    Rx,
    /// Outgoing/transmitted message
    Tx,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Rx => f.write_str("RX"),
            Direction::Tx => f.write_str("TX"),
        }
    }
}

/// Log a protocol message at debug level with a hex dump at trace level.
pub fn log_protocol_message(protocol: &str, direction: Direction, msg_type: &str, data: &[u8]) {
    tracing::debug!(
        protocol = protocol,
        direction = %direction,
        msg_type = msg_type,
        len = data.len(),
        "{} {} {}",
        direction,
        protocol,
        msg_type
    );
    tracing::trace!(protocol = protocol, hex = %HexDump(data), "{} payload", protocol);
}

/// Log an NGAP message
pub fn log_ngap_message(direction: Direction, msg_type: &str, data: &[u8]) {
    log_protocol_message("NGAP", direction, msg_type, data);
}

/// Log a NAS message
pub fn log_nas_message(direction: Direction, msg_type: &str, data: &[u8]) {
    log_protocol_message("NAS", direction, msg_type, data);
}

/// Log an RRC message
pub fn log_rrc_message(direction: Direction, msg_type: &str, data: &[u8]) {
    log_protocol_message("RRC", direction, msg_type, data);
}

/// Wrapper for hex dump formatting
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// One entry of the management-facing log stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
}

impl LogEvent {
    /// Creates an event stamped with the current wall-clock time.
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            timestamp_ms,
            level,
            message: message.into(),
        }
    }
}

/// Append-only log-event stream.
///
/// Cloning an `EventLog` yields another handle onto the same stream. Events
/// are kept in a bounded ring for late readers and fanned out to live
/// subscribers.
#[derive(Debug, Clone)]
pub struct EventLog {
    inner: Arc<EventLogInner>,
}

#[derive(Debug)]
struct EventLogInner {
    capacity: usize,
    history: Mutex<VecDeque<LogEvent>>,
    tx: broadcast::Sender<LogEvent>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    /// Creates a stream that retains at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(EventLogInner {
                capacity,
                history: Mutex::new(VecDeque::with_capacity(capacity)),
                tx,
            }),
        }
    }

    /// Records an event, mirroring it to `tracing` at the matching level.
    pub fn record(&self, level: LogLevel, message: impl Into<String>) {
        let event = LogEvent::now(level, message);
        match level {
            LogLevel::Trace => tracing::trace!("{}", event.message),
            LogLevel::Debug => tracing::debug!("{}", event.message),
            LogLevel::Info => tracing::info!("{}", event.message),
            LogLevel::Warn => tracing::warn!("{}", event.message),
            LogLevel::Error => tracing::error!("{}", event.message),
        }

        if let Ok(mut history) = self.inner.history.lock() {
            if history.len() == self.inner.capacity {
                history.pop_front();
            }
            history.push_back(event.clone());
        }
        // No subscribers is not an error.
        let _ = self.inner.tx.send(event);
    }

    /// Shorthand for `record(LogLevel::Info, ..)`.
    pub fn info(&self, message: impl Into<String>) {
        self.record(LogLevel::Info, message);
    }

    /// Shorthand for `record(LogLevel::Warn, ..)`.
    pub fn warn(&self, message: impl Into<String>) {
        self.record(LogLevel::Warn, message);
    }

    /// Shorthand for `record(LogLevel::Error, ..)`.
    pub fn error(&self, message: impl Into<String>) {
        self.record(LogLevel::Error, message);
    }

    /// Subscribes to events recorded from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.inner.tx.subscribe()
    }

    /// Returns up to `limit` of the most recent events, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<LogEvent> {
        match self.inner.history.lock() {
            Ok(history) => {
                let skip = history.len().saturating_sub(limit);
                history.iter().skip(skip).cloned().collect()
            }
            Err(_) => Vec::new(),
        }
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.inner.history.lock().map(|h| h.len()).unwrap_or(0)
    }

    /// Returns true if nothing has been retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Rx.to_string(), "RX");
        assert_eq!(Direction::Tx.to_string(), "TX");
    }

    #[test]
    fn test_hex_dump_wrapper() {
        let data = [0xde, 0xad, 0xbe, 0xef];
        assert_eq!(format!("{}", HexDump(&data)), "deadbeef");
    }

    #[test]
    fn test_event_log_is_bounded() {
        let log = EventLog::new(3);
        for i in 0..5 {
            log.info(format!("event {i}"));
        }
        assert_eq!(log.len(), 3);
        let recent = log.recent(10);
        assert_eq!(recent.first().unwrap().message, "event 2");
        assert_eq!(recent.last().unwrap().message, "event 4");
        assert_eq!(log.recent(1)[0].message, "event 4");
    }

    #[test]
    fn test_event_log_clone_shares_stream() {
        let log = EventLog::default();
        let other = log.clone();
        other.warn("from clone");
        assert_eq!(log.len(), 1);
        assert_eq!(log.recent(1)[0].level, LogLevel::Warn);
    }

    #[tokio::test]
    async fn test_event_log_subscription() {
        let log = EventLog::default();
        let mut rx = log.subscribe();
        log.error("AMF unreachable");
        let event = rx.recv().await.unwrap();
        assert_eq!(event.level, LogLevel::Error);
        assert_eq!(event.message, "AMF unreachable");
        assert!(event.timestamp_ms > 0);
    }
}
