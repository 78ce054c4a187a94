//! 5GSM (5G Session Management) Messages

pub mod pdu_session_establishment;

pub use pdu_session_establishment::{
    PduSessionEstablishmentAccept, PduSessionEstablishmentReject, PduSessionEstablishmentRequest,
};
