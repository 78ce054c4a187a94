//! PDU session state
//!
//! The UE runs at most one PDU session. Its establishment is supervised by
//! T3580; the descriptor is recorded once the network accepts it.

use std::fmt;
use std::net::Ipv4Addr;

use ransim_common::SNssai;
use ransim_nas::PduSessionType;
use serde::Serialize;

/// PDU session identity used for the default session
pub const DEFAULT_PDU_SESSION_ID: u8 = 1;

/// Session management state of the UE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SmState {
    /// No session and no establishment in progress
    #[default]
    Null,
    /// Establishment Request sent, waiting for the network
    Pending,
    /// Session established
    Active,
}

impl fmt::Display for SmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmState::Null => write!(f, "SM-NULL"),
            SmState::Pending => write!(f, "SM-PENDING"),
            SmState::Active => write!(f, "SM-ACTIVE"),
        }
    }
}

/// Descriptor of an established PDU session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PduSession {
    pub id: u8,
    #[serde(rename = "type")]
    pub session_type: String,
    pub dnn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s_nssai: Option<SNssai>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Ipv4Addr>,
}

/// Display name of a PDU session type.
pub fn session_type_name(session_type: PduSessionType) -> &'static str {
    match session_type {
        PduSessionType::Ipv4 => "IPv4",
        PduSessionType::Ipv6 => "IPv6",
        PduSessionType::Ipv4v6 => "IPv4v6",
        PduSessionType::Unstructured => "Unstructured",
        PduSessionType::Ethernet => "Ethernet",
    }
}
