//! NGAP message codec
//!
//! An NGAP message is `message_type(1)` followed by protocol IE blocks of
//! `iei(2) || length(2) || value`, all big endian. [`NgapMessageBuilder`]
//! collects every IE before the message is serialized, so no length field is
//! ever patched after the fact.

use bytes::{Buf, BufMut};
use thiserror::Error;

use crate::enums::{Cause, CauseGroup, NgapMessageType};

/// NGAP codec error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NgapError {
    /// Buffer does not have enough bytes for decoding
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    /// Unknown message type octet
    #[error("Invalid message type: 0x{0:02X}")]
    InvalidMessageType(u8),

    /// Message type differs from the one being decoded
    #[error("Invalid message type: expected {expected:?}, got {actual:?}")]
    UnexpectedMessageType {
        expected: NgapMessageType,
        actual: NgapMessageType,
    },

    /// Missing mandatory IE
    #[error("Missing mandatory IE: {0}")]
    MissingMandatoryIe(&'static str),

    /// Invalid IE value
    #[error("Invalid IE value: {0}")]
    InvalidIeValue(String),

    /// IE value longer than a two-octet length can express
    #[error("IE {iei} too long: {length} bytes")]
    IeTooLong { iei: u16, length: usize },
}

pub type NgapResult<T> = Result<T, NgapError>;

impl From<NgapError> for ransim_common::Error {
    fn from(err: NgapError) -> Self {
        ransim_common::Error::ProtocolDecode(err.to_string())
    }
}

/// Raw NGAP message: type plus undecoded IE blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgapMessage {
    pub message_type: NgapMessageType,
    pub payload: Vec<u8>,
}

impl NgapMessage {
    pub fn decode(bytes: &[u8]) -> NgapResult<Self> {
        let Some((&first, rest)) = bytes.split_first() else {
            return Err(NgapError::BufferTooShort {
                expected: 1,
                actual: 0,
            });
        };
        let message_type =
            NgapMessageType::try_from(first).map_err(|_| NgapError::InvalidMessageType(first))?;
        Ok(Self {
            message_type,
            payload: rest.to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.payload.len());
        out.put_u8(self.message_type.into());
        out.put_slice(&self.payload);
        out
    }
}

/// Assembles one NGAP message.
#[derive(Debug)]
pub struct NgapMessageBuilder {
    message_type: NgapMessageType,
    ies: Vec<(u16, Vec<u8>)>,
}

impl NgapMessageBuilder {
    pub fn new(message_type: NgapMessageType) -> Self {
        Self {
            message_type,
            ies: Vec::new(),
        }
    }

    pub fn ie(&mut self, iei: u16, value: impl Into<Vec<u8>>) -> NgapResult<&mut Self> {
        let value = value.into();
        if value.len() > usize::from(u16::MAX) {
            return Err(NgapError::IeTooLong {
                iei,
                length: value.len(),
            });
        }
        self.ies.push((iei, value));
        Ok(self)
    }

    pub fn opt_ie(&mut self, iei: u16, value: Option<impl Into<Vec<u8>>>) -> NgapResult<&mut Self> {
        match value {
            Some(value) => self.ie(iei, value),
            None => Ok(self),
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let size = 1 + self.ies.iter().map(|(_, v)| 4 + v.len()).sum::<usize>();
        let mut out = Vec::with_capacity(size);
        out.put_u8(self.message_type.into());
        for (iei, value) in &self.ies {
            out.put_u16(*iei);
            // Bounded by the check in `ie`.
            out.put_u16(value.len() as u16);
            out.put_slice(value);
        }
        out
    }
}

/// Parsed IE blocks of one message. A repeated IE keeps its first occurrence.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NgapIeSet {
    ies: Vec<(u16, Vec<u8>)>,
}

impl NgapIeSet {
    pub fn parse(mut buf: &[u8]) -> NgapResult<Self> {
        let mut ies = Vec::new();
        while buf.has_remaining() {
            if buf.remaining() < 4 {
                return Err(NgapError::BufferTooShort {
                    expected: 4,
                    actual: buf.remaining(),
                });
            }
            let iei = buf.get_u16();
            let length = buf.get_u16() as usize;
            if buf.remaining() < length {
                return Err(NgapError::BufferTooShort {
                    expected: length,
                    actual: buf.remaining(),
                });
            }
            ies.push((iei, buf[..length].to_vec()));
            buf.advance(length);
        }
        Ok(Self { ies })
    }

    pub fn get(&self, iei: u16) -> Option<&[u8]> {
        self.ies
            .iter()
            .find(|(tag, _)| *tag == iei)
            .map(|(_, value)| value.as_slice())
    }

    pub fn require(&self, iei: u16, name: &'static str) -> NgapResult<&[u8]> {
        self.get(iei).ok_or(NgapError::MissingMandatoryIe(name))
    }

    pub fn get_u8(&self, iei: u16) -> Option<u8> {
        self.get(iei).and_then(|v| v.first().copied())
    }

    pub fn require_u8(&self, iei: u16, name: &'static str) -> NgapResult<u8> {
        match self.require(iei, name)? {
            [value] => Ok(*value),
            other => Err(NgapError::InvalidIeValue(format!("{name}: length {}", other.len()))),
        }
    }

    pub fn get_string(&self, iei: u16) -> NgapResult<Option<String>> {
        self.get(iei)
            .map(|v| {
                String::from_utf8(v.to_vec())
                    .map_err(|_| NgapError::InvalidIeValue(format!("IE {iei}: not UTF-8")))
            })
            .transpose()
    }

    pub fn len(&self) -> usize {
        self.ies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ies.is_empty()
    }
}

/// An NGAP message with a fixed message type.
pub trait NgapMessageBody: Sized {
    const MESSAGE_TYPE: NgapMessageType;

    fn encode_ies(&self, builder: &mut NgapMessageBuilder) -> NgapResult<()>;

    fn decode_ies(ies: &NgapIeSet) -> NgapResult<Self>;

    fn encode(&self) -> NgapResult<Vec<u8>> {
        let mut builder = NgapMessageBuilder::new(Self::MESSAGE_TYPE);
        self.encode_ies(&mut builder)?;
        Ok(builder.build())
    }

    fn decode(bytes: &[u8]) -> NgapResult<Self> {
        Self::from_message(&NgapMessage::decode(bytes)?)
    }

    fn from_message(msg: &NgapMessage) -> NgapResult<Self> {
        if msg.message_type != Self::MESSAGE_TYPE {
            return Err(NgapError::UnexpectedMessageType {
                expected: Self::MESSAGE_TYPE,
                actual: msg.message_type,
            });
        }
        Self::decode_ies(&NgapIeSet::parse(&msg.payload)?)
    }
}

// ============================================================================
// Shared value encodings
// ============================================================================

/// AMF UE NGAP ID is 40 bits, carried in 5 octets.
pub const AMF_UE_NGAP_ID_MAX: u64 = (1 << 40) - 1;

pub fn encode_amf_ue_ngap_id(id: u64) -> NgapResult<Vec<u8>> {
    if id > AMF_UE_NGAP_ID_MAX {
        return Err(NgapError::InvalidIeValue(format!("AMF UE NGAP ID {id} exceeds 40 bits")));
    }
    Ok(id.to_be_bytes()[3..].to_vec())
}

pub fn decode_amf_ue_ngap_id(value: &[u8]) -> NgapResult<u64> {
    match value {
        [a, b, c, d, e] => Ok(u64::from_be_bytes([0, 0, 0, *a, *b, *c, *d, *e])),
        other => Err(NgapError::InvalidIeValue(format!("AMF UE NGAP ID length {}", other.len()))),
    }
}

pub fn encode_ran_ue_ngap_id(id: u32) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

pub fn decode_ran_ue_ngap_id(value: &[u8]) -> NgapResult<u32> {
    <[u8; 4]>::try_from(value)
        .map(u32::from_be_bytes)
        .map_err(|_| NgapError::InvalidIeValue(format!("RAN UE NGAP ID length {}", value.len())))
}

pub fn encode_cause(cause: Cause) -> Vec<u8> {
    vec![cause.group.into(), cause.value]
}

pub fn decode_cause(value: &[u8]) -> NgapResult<Cause> {
    match value {
        [group, value] => {
            let group = CauseGroup::try_from(*group)
                .map_err(|_| NgapError::InvalidIeValue(format!("Unknown cause group: {group}")))?;
            Ok(Cause::new(group, *value))
        }
        other => Err(NgapError::InvalidIeValue(format!("Cause length {}", other.len()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_layout() {
        let bytes = NgapMessageBuilder::new(NgapMessageType::DownlinkNasTransport)
            .ie(85, vec![0x00, 0x00, 0x00, 0x01])
            .unwrap()
            .ie(38, vec![0x7E])
            .unwrap()
            .build();
        assert_eq!(
            bytes,
            vec![0x07, 0x00, 0x55, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01, 0x00, 0x26, 0x00, 0x01, 0x7E]
        );
    }

    #[test]
    fn test_builder_rejects_oversized_ie() {
        let mut builder = NgapMessageBuilder::new(NgapMessageType::NgSetupRequest);
        let err = builder.ie(38, vec![0u8; 70_000]).unwrap_err();
        assert_eq!(err, NgapError::IeTooLong { iei: 38, length: 70_000 });
    }

    #[test]
    fn test_ie_set_parse() {
        let ies = NgapIeSet::parse(&[0x00, 0x56, 0x00, 0x01, 0x0A, 0x00, 0x56, 0x00, 0x01, 0x0B]).unwrap();
        assert_eq!(ies.len(), 2);
        assert_eq!(ies.get_u8(86), Some(0x0A));
        assert!(ies.get(1).is_none());
        assert!(NgapIeSet::parse(&[0x00, 0x56, 0x00]).is_err());
        assert!(NgapIeSet::parse(&[0x00, 0x56, 0x00, 0x05, 0x01]).is_err());
    }

    #[test]
    fn test_decode_unknown_type() {
        assert_eq!(NgapMessage::decode(&[0x03]), Err(NgapError::InvalidMessageType(0x03)));
        assert!(NgapMessage::decode(&[]).is_err());
    }

    #[test]
    fn test_ngap_ids() {
        assert_eq!(encode_amf_ue_ngap_id(AMF_UE_NGAP_ID_MAX).unwrap(), vec![0xFF; 5]);
        assert!(encode_amf_ue_ngap_id(AMF_UE_NGAP_ID_MAX + 1).is_err());
        assert_eq!(decode_amf_ue_ngap_id(&[0, 0, 0, 1, 0]).unwrap(), 256);
        assert_eq!(decode_ran_ue_ngap_id(&encode_ran_ue_ngap_id(7)).unwrap(), 7);
        assert!(decode_ran_ue_ngap_id(&[1, 2]).is_err());
    }

    #[test]
    fn test_cause_encoding() {
        assert_eq!(encode_cause(Cause::NAS_NORMAL_RELEASE), vec![0x02, 0x00]);
        assert_eq!(decode_cause(&[0x04, 0x05]).unwrap(), Cause::MISC_UNSPECIFIED);
        assert!(decode_cause(&[0x09, 0x00]).is_err());
    }
}
