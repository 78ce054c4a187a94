//! NAS (Non-Access Stratum) protocol library
//!
//! Implements 5G NAS message encoding/decoding for:
//! - 5GMM (Mobility Management)
//! - 5GSM (Session Management)
//!
//! # Message Structure
//!
//! Every message is `security_header(1) || message_type(1) || payload`.
//! Plain payloads are IE sequences of `tag(1) || length(1) || value`;
//! protected payloads go through [`security::unprotect`] first.
//!
//! # Example
//!
//! ```rust
//! use ransim_nas::{NasMessageBody, NasPdu, PduSessionEstablishmentRequest};
//!
//! let bytes = PduSessionEstablishmentRequest::ipv4(1, "internet").encode().unwrap();
//! assert_eq!(bytes[1], 0xA1);
//!
//! match NasPdu::decode(&bytes).unwrap() {
//!     NasPdu::PduSessionEstablishmentRequest(req) => assert_eq!(req.dnn.as_deref(), Some("internet")),
//!     other => panic!("unexpected {:?}", other.message_type()),
//! }
//! ```

pub mod codec;
pub mod enums;
pub mod iei;
pub mod message;
pub mod messages;
pub mod security;

pub use codec::{CodecError, CodecResult, IeSet, IeWriter, NasMessageBody};
pub use enums::{
    MessageType, MmCause, PayloadContainerType, PduSessionType, RegistrationType, RequestType, SmCause,
};
pub use message::{NasMessage, NasPdu};
pub use messages::*;
pub use security::{
    protect, unprotect, AlgorithmType, NasDirection, NasSecurityContext, SecurityError,
};
