//! NAS message envelope and typed dispatch

use crate::codec::{split_header, CodecResult, NasMessageBody};
use crate::enums::MessageType;
use crate::messages::*;

/// Raw NAS message: `security_header || message_type || payload`.
///
/// The payload is the plaintext IE sequence when the security header is 0,
/// otherwise the protected content that [`crate::security::unprotect`]
/// understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NasMessage {
    pub security_header: u8,
    pub message_type: MessageType,
    pub payload: Vec<u8>,
}

impl NasMessage {
    /// Plain message with the given IE payload.
    pub fn plain(message_type: MessageType, payload: Vec<u8>) -> Self {
        Self {
            security_header: 0,
            message_type,
            payload,
        }
    }

    /// Splits a NAS PDU. Unknown message types are a decode error.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let (security_header, message_type, payload) = split_header(bytes)?;
        Ok(Self {
            security_header,
            message_type,
            payload: payload.to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.payload.len());
        out.push(self.security_header);
        out.push(self.message_type.into());
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn is_protected(&self) -> bool {
        self.security_header != 0
    }
}

/// Decoded plain NAS message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NasPdu {
    RegistrationRequest(RegistrationRequest),
    RegistrationAccept(RegistrationAccept),
    RegistrationComplete(RegistrationComplete),
    RegistrationReject(RegistrationReject),
    DeregistrationRequest(DeregistrationRequest),
    DeregistrationAccept(DeregistrationAccept),
    AuthenticationRequest(AuthenticationRequest),
    AuthenticationResponse(AuthenticationResponse),
    AuthenticationReject(AuthenticationReject),
    AuthenticationFailure(AuthenticationFailure),
    SecurityModeCommand(SecurityModeCommand),
    SecurityModeComplete(SecurityModeComplete),
    SecurityModeReject(SecurityModeReject),
    UlNasTransport(UlNasTransport),
    DlNasTransport(DlNasTransport),
    PduSessionEstablishmentRequest(PduSessionEstablishmentRequest),
    PduSessionEstablishmentAccept(PduSessionEstablishmentAccept),
    PduSessionEstablishmentReject(PduSessionEstablishmentReject),
    /// Known message type without a typed record
    Other(NasMessage),
}

macro_rules! nas_pdu_dispatch {
    ($($variant:ident),* $(,)?) => {
        impl NasPdu {
            /// Decodes a plain NAS message into its typed record.
            pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
                let (security_header, message_type, _) = split_header(bytes)?;
                if security_header != 0 {
                    return Err(crate::codec::CodecError::ProtectedMessage(security_header));
                }
                match message_type {
                    $(MessageType::$variant => Ok(NasPdu::$variant($variant::decode(bytes)?)),)*
                    MessageType::DeregistrationAcceptUeOriginating => {
                        Ok(NasPdu::DeregistrationAccept(DeregistrationAccept::decode(bytes)?))
                    }
                    _ => Ok(NasPdu::Other(NasMessage::decode(bytes)?)),
                }
            }

            /// Encodes the plain NAS message.
            pub fn encode(&self) -> CodecResult<Vec<u8>> {
                match self {
                    $(NasPdu::$variant(msg) => msg.encode(),)*
                    NasPdu::DeregistrationAccept(msg) => msg.encode(),
                    NasPdu::Other(msg) => Ok(msg.encode()),
                }
            }

            pub fn message_type(&self) -> MessageType {
                match self {
                    $(NasPdu::$variant(_) => MessageType::$variant,)*
                    NasPdu::DeregistrationAccept(_) => MessageType::DeregistrationAcceptUeOriginating,
                    NasPdu::Other(msg) => msg.message_type,
                }
            }
        }
    };
}

nas_pdu_dispatch!(
    RegistrationRequest,
    RegistrationAccept,
    RegistrationComplete,
    RegistrationReject,
    DeregistrationRequest,
    AuthenticationRequest,
    AuthenticationResponse,
    AuthenticationReject,
    AuthenticationFailure,
    SecurityModeCommand,
    SecurityModeComplete,
    SecurityModeReject,
    UlNasTransport,
    DlNasTransport,
    PduSessionEstablishmentRequest,
    PduSessionEstablishmentAccept,
    PduSessionEstablishmentReject,
);
