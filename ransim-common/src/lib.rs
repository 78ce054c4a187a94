//! Common types and utilities for ransim
//!
//! Shared by every crate in the workspace: the [`OctetString`] byte buffer,
//! the error taxonomy, logging and the log-event stream, configuration
//! records, and identity types.

pub mod config;
pub mod error;
pub mod logging;
pub mod octet_string;
pub mod types;

pub use config::{GnbConfig, TransportKind, UeConfig, DEFAULT_AMF_PORT, DEFAULT_IDLE_INTERVAL_MS};
pub use error::{Error, Result};
pub use logging::{
    init_logging, init_logging_with_filter, log_nas_message, log_ngap_message,
    log_protocol_message, log_rrc_message, Direction, EventLog, HexDump, LogEvent, LogLevel,
    DEFAULT_EVENT_LOG_CAPACITY,
};
pub use octet_string::OctetString;
pub use types::{Plmn, SNssai, Supi};
