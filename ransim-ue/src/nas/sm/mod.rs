//! 5GSM (5G Session Management) state

pub mod session;

pub use session::{session_type_name, PduSession, SmState, DEFAULT_PDU_SESSION_ID};
