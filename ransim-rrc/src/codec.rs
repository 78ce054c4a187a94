//! RRC message codec
//!
//! Every RRC message is `((transaction_id << 2) | 0x01) || message_type ||
//! payload`. Payload fields after any fixed prefix are IEs of
//! `tag(1) || length(2, big endian) || value`.

use bytes::{Buf, BufMut};
use thiserror::Error;

use crate::enums::RrcMessageType;

/// Marker bit set in the first octet of every RRC message
const RRC_HEADER_MARKER: u8 = 0x01;

/// RRC codec error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RrcError {
    /// Buffer does not have enough bytes for decoding
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    /// Unknown message type
    #[error("Invalid message type: 0x{0:02X}")]
    InvalidMessageType(u8),

    /// Message type differs from the one being decoded
    #[error("Invalid message type: expected {expected:?}, got {actual:?}")]
    UnexpectedMessageType {
        expected: RrcMessageType,
        actual: RrcMessageType,
    },

    /// Missing mandatory field
    #[error("Missing mandatory field: {0}")]
    MissingMandatoryField(&'static str),

    /// Invalid field value
    #[error("Invalid field value: {0}")]
    InvalidFieldValue(String),

    /// IE value longer than a two-octet length can express
    #[error("IE 0x{iei:02X} too long: {length} bytes")]
    IeTooLong { iei: u8, length: usize },
}

pub type RrcResult<T> = Result<T, RrcError>;

impl From<RrcError> for ransim_common::Error {
    fn from(err: RrcError) -> Self {
        ransim_common::Error::ProtocolDecode(err.to_string())
    }
}

/// Raw RRC message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrcMessage {
    /// Transaction identifier (0-3)
    pub transaction_id: u8,
    pub message_type: RrcMessageType,
    pub payload: Vec<u8>,
}

impl RrcMessage {
    pub fn new(transaction_id: u8, message_type: RrcMessageType, payload: Vec<u8>) -> Self {
        Self {
            transaction_id: transaction_id & 0x03,
            message_type,
            payload,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.payload.len());
        out.put_u8(((self.transaction_id & 0x03) << 2) | RRC_HEADER_MARKER);
        out.put_u8(self.message_type.into());
        out.put_slice(&self.payload);
        out
    }

    /// Splits an RRC PDU. Unknown message types are a decode error.
    pub fn decode(bytes: &[u8]) -> RrcResult<Self> {
        if bytes.len() < 2 {
            return Err(RrcError::BufferTooShort {
                expected: 2,
                actual: bytes.len(),
            });
        }
        let message_type =
            RrcMessageType::try_from(bytes[1]).map_err(|_| RrcError::InvalidMessageType(bytes[1]))?;
        Ok(Self {
            transaction_id: (bytes[0] >> 2) & 0x03,
            message_type,
            payload: bytes[2..].to_vec(),
        })
    }
}

/// Builds an RRC IE sequence.
#[derive(Debug, Default)]
pub struct RrcIeWriter {
    buf: Vec<u8>,
}

impl RrcIeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes raw octets ahead of the IEs.
    pub fn put_fixed(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn put(&mut self, iei: u8, value: &[u8]) -> RrcResult<()> {
        let length = u16::try_from(value.len()).map_err(|_| RrcError::IeTooLong {
            iei,
            length: value.len(),
        })?;
        self.buf.put_u8(iei);
        self.buf.put_u16(length);
        self.buf.put_slice(value);
        Ok(())
    }

    pub fn put_opt(&mut self, iei: u8, value: Option<&[u8]>) -> RrcResult<()> {
        match value {
            Some(value) => self.put(iei, value),
            None => Ok(()),
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Parsed RRC IE sequence; unknown tags are kept but ignored by decoders.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RrcIeSet {
    ies: Vec<(u8, Vec<u8>)>,
}

impl RrcIeSet {
    pub fn parse(mut buf: &[u8]) -> RrcResult<Self> {
        let mut ies = Vec::new();
        while buf.has_remaining() {
            if buf.remaining() < 3 {
                return Err(RrcError::BufferTooShort {
                    expected: 3,
                    actual: buf.remaining(),
                });
            }
            let iei = buf.get_u8();
            let length = buf.get_u16() as usize;
            if buf.remaining() < length {
                return Err(RrcError::BufferTooShort {
                    expected: length,
                    actual: buf.remaining(),
                });
            }
            ies.push((iei, buf[..length].to_vec()));
            buf.advance(length);
        }
        Ok(Self { ies })
    }

    pub fn get(&self, iei: u8) -> Option<&[u8]> {
        self.ies
            .iter()
            .find(|(tag, _)| *tag == iei)
            .map(|(_, value)| value.as_slice())
    }

    pub fn get_vec(&self, iei: u8) -> Option<Vec<u8>> {
        self.get(iei).map(<[u8]>::to_vec)
    }

    pub fn require(&self, iei: u8, name: &'static str) -> RrcResult<&[u8]> {
        self.get(iei).ok_or(RrcError::MissingMandatoryField(name))
    }
}

/// An RRC message with a fixed message type.
pub trait RrcMessageBody: Sized {
    const MESSAGE_TYPE: RrcMessageType;

    fn encode_payload(&self) -> RrcResult<Vec<u8>>;

    fn decode_payload(payload: &[u8]) -> RrcResult<Self>;

    /// Encodes the full message with the given transaction id.
    fn encode(&self, transaction_id: u8) -> RrcResult<Vec<u8>> {
        Ok(RrcMessage::new(transaction_id, Self::MESSAGE_TYPE, self.encode_payload()?).encode())
    }

    /// Decodes a full message, returning its transaction id.
    fn decode(bytes: &[u8]) -> RrcResult<(u8, Self)> {
        let msg = RrcMessage::decode(bytes)?;
        Self::from_message(&msg).map(|body| (msg.transaction_id, body))
    }

    /// Decodes the payload of an already split message.
    fn from_message(msg: &RrcMessage) -> RrcResult<Self> {
        if msg.message_type != Self::MESSAGE_TYPE {
            return Err(RrcError::UnexpectedMessageType {
                expected: Self::MESSAGE_TYPE,
                actual: msg.message_type,
            });
        }
        Self::decode_payload(&msg.payload)
    }
}
