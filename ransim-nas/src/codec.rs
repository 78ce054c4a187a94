//! NAS information element codec
//!
//! Plain NAS messages are `security_header(1) || message_type(1) || IEs`,
//! each IE being `tag(1) || length(1) || value`. Messages write their
//! populated IEs in declaration order through [`IeWriter`] and read them back
//! from an [`IeSet`], which accepts any subset and any order.

use bytes::Buf;
use thiserror::Error;
use tracing::trace;

use ransim_common::{OctetString, SNssai};

use crate::enums::MessageType;

/// Maximum value length of a one-octet-length IE
pub const MAX_IE_LENGTH: usize = u8::MAX as usize;

/// Errors that can occur during NAS encoding/decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Buffer does not have enough bytes for decoding
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    BufferTooShort {
        /// Expected minimum bytes
        expected: usize,
        /// Actual bytes available
        actual: usize,
    },

    /// Length field exceeds remaining buffer
    #[error("Length exceeds buffer: length field is {length}, but only {remaining} bytes remain")]
    LengthExceedsBuffer {
        /// Length specified in the length field
        length: usize,
        /// Remaining bytes in buffer
        remaining: usize,
    },

    /// IE value does not fit the one-octet length field
    #[error("IE 0x{iei:02X} too long: {length} bytes")]
    IeTooLong {
        /// IE tag
        iei: u8,
        /// Value length
        length: usize,
    },

    /// Mandatory IE absent
    #[error("Missing mandatory IE 0x{iei:02X} ({name})")]
    MissingIe {
        /// IE tag
        iei: u8,
        /// IE name
        name: &'static str,
    },

    /// Invalid value encountered during decoding
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Unknown message type
    #[error("Invalid message type: 0x{0:02X}")]
    InvalidMessageType(u8),

    /// Message type differs from the one being decoded
    #[error("Unexpected message type: expected {expected:?}, got {actual:?}")]
    UnexpectedMessageType {
        /// Type the decoder handles
        expected: MessageType,
        /// Type found on the wire
        actual: MessageType,
    },

    /// Security protected message handed to a plain decoder
    #[error("Message is security protected (header 0x{0:02X})")]
    ProtectedMessage(u8),
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

impl From<CodecError> for ransim_common::Error {
    fn from(err: CodecError) -> Self {
        ransim_common::Error::ProtocolDecode(err.to_string())
    }
}

/// Builds an IE sequence.
#[derive(Debug, Default)]
pub struct IeWriter {
    buf: OctetString,
}

impl IeWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one IE.
    pub fn put(&mut self, iei: u8, value: &[u8]) -> CodecResult<()> {
        if value.len() > MAX_IE_LENGTH {
            return Err(CodecError::IeTooLong {
                iei,
                length: value.len(),
            });
        }
        self.buf.append_octet(iei);
        self.buf.append_octet(value.len() as u8);
        self.buf.append(value);
        Ok(())
    }

    /// Appends a single-octet IE.
    pub fn put_u8(&mut self, iei: u8, value: u8) -> CodecResult<()> {
        self.put(iei, &[value])
    }

    /// Appends the IE only when `value` is set.
    pub fn put_opt(&mut self, iei: u8, value: Option<&[u8]>) -> CodecResult<()> {
        match value {
            Some(value) => self.put(iei, value),
            None => Ok(()),
        }
    }

    /// Appends a single-octet IE only when `value` is set.
    pub fn put_opt_u8(&mut self, iei: u8, value: Option<u8>) -> CodecResult<()> {
        match value {
            Some(value) => self.put_u8(iei, value),
            None => Ok(()),
        }
    }

    /// Appends an NSSAI list, each S-NSSAI prefixed by its own length.
    pub fn put_nssai(&mut self, iei: u8, list: Option<&[SNssai]>) -> CodecResult<()> {
        let Some(list) = list else {
            return Ok(());
        };
        let mut value = Vec::new();
        for s_nssai in list {
            let encoded = s_nssai.encode();
            value.push(encoded.len() as u8);
            value.extend_from_slice(&encoded);
        }
        self.put(iei, &value)
    }

    /// Encoded IEs.
    pub fn finish(self) -> OctetString {
        self.buf
    }
}

/// Parsed IE sequence.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IeSet {
    ies: Vec<(u8, Vec<u8>)>,
}

impl IeSet {
    /// Splits `buf` into IEs. A repeated tag keeps its first occurrence.
    pub fn parse(mut buf: &[u8]) -> CodecResult<Self> {
        let mut ies: Vec<(u8, Vec<u8>)> = Vec::new();
        while buf.has_remaining() {
            if buf.remaining() < 2 {
                return Err(CodecError::BufferTooShort {
                    expected: 2,
                    actual: buf.remaining(),
                });
            }
            let iei = buf.get_u8();
            let length = buf.get_u8() as usize;
            if buf.remaining() < length {
                return Err(CodecError::LengthExceedsBuffer {
                    length,
                    remaining: buf.remaining(),
                });
            }
            let value = buf[..length].to_vec();
            buf.advance(length);
            if ies.iter().any(|(tag, _)| *tag == iei) {
                trace!("Ignoring repeated IE 0x{:02X}", iei);
                continue;
            }
            ies.push((iei, value));
        }
        Ok(Self { ies })
    }

    /// Value of an IE, if present.
    pub fn get(&self, iei: u8) -> Option<&[u8]> {
        self.ies
            .iter()
            .find(|(tag, _)| *tag == iei)
            .map(|(_, value)| value.as_slice())
    }

    /// Value of a mandatory IE.
    pub fn require(&self, iei: u8, name: &'static str) -> CodecResult<&[u8]> {
        self.get(iei).ok_or(CodecError::MissingIe { iei, name })
    }

    /// Owned copy of an optional IE.
    pub fn get_vec(&self, iei: u8) -> Option<Vec<u8>> {
        self.get(iei).map(<[u8]>::to_vec)
    }

    /// Optional single-octet IE.
    pub fn get_u8(&self, iei: u8) -> CodecResult<Option<u8>> {
        self.get(iei).map(|value| single_octet(iei, value)).transpose()
    }

    /// Mandatory single-octet IE.
    pub fn require_u8(&self, iei: u8, name: &'static str) -> CodecResult<u8> {
        single_octet(iei, self.require(iei, name)?)
    }

    /// Optional fixed-size IE.
    pub fn get_array<const N: usize>(&self, iei: u8) -> CodecResult<Option<[u8; N]>> {
        self.get(iei)
            .map(|value| {
                <[u8; N]>::try_from(value).map_err(|_| {
                    CodecError::InvalidValue(format!(
                        "IE 0x{:02X} must be {} bytes, got {}",
                        iei,
                        N,
                        value.len()
                    ))
                })
            })
            .transpose()
    }

    /// Optional ASCII/UTF-8 text IE.
    pub fn get_string(&self, iei: u8) -> CodecResult<Option<String>> {
        self.get(iei)
            .map(|value| {
                String::from_utf8(value.to_vec())
                    .map_err(|_| CodecError::InvalidValue(format!("IE 0x{iei:02X} is not valid text")))
            })
            .transpose()
    }

    /// Optional single S-NSSAI IE.
    pub fn get_s_nssai(&self, iei: u8) -> CodecResult<Option<SNssai>> {
        self.get(iei)
            .map(|value| {
                SNssai::decode(value)
                    .ok_or_else(|| CodecError::InvalidValue(format!("bad S-NSSAI length {}", value.len())))
            })
            .transpose()
    }

    /// Optional NSSAI list IE written by [`IeWriter::put_nssai`].
    pub fn get_nssai(&self, iei: u8) -> CodecResult<Option<Vec<SNssai>>> {
        let Some(mut value) = self.get(iei) else {
            return Ok(None);
        };
        let mut list = Vec::new();
        while value.has_remaining() {
            let length = value.get_u8() as usize;
            if value.remaining() < length {
                return Err(CodecError::LengthExceedsBuffer {
                    length,
                    remaining: value.remaining(),
                });
            }
            let s_nssai = SNssai::decode(&value[..length])
                .ok_or_else(|| CodecError::InvalidValue(format!("bad S-NSSAI length {length}")))?;
            value.advance(length);
            list.push(s_nssai);
        }
        Ok(Some(list))
    }

    /// Number of IEs present.
    pub fn len(&self) -> usize {
        self.ies.len()
    }

    /// Returns true when no IE is present.
    pub fn is_empty(&self) -> bool {
        self.ies.is_empty()
    }
}

fn single_octet(iei: u8, value: &[u8]) -> CodecResult<u8> {
    match value {
        [octet] => Ok(*octet),
        _ => Err(CodecError::InvalidValue(format!(
            "IE 0x{:02X} must be 1 byte, got {}",
            iei,
            value.len()
        ))),
    }
}

/// Decodes a one-octet enumerated value.
pub(crate) fn decode_enum<T: TryFrom<u8>>(name: &str, value: u8) -> CodecResult<T> {
    T::try_from(value).map_err(|_| CodecError::InvalidValue(format!("unknown {name} 0x{value:02X}")))
}

/// A plain NAS message with a fixed message type.
pub trait NasMessageBody: Sized {
    /// Message type written in the second octet
    const MESSAGE_TYPE: MessageType;

    /// Writes the populated IEs in declaration order.
    fn encode_ies(&self, writer: &mut IeWriter) -> CodecResult<()>;

    /// Reads the message from its IEs.
    fn decode_ies(ies: &IeSet) -> CodecResult<Self>;

    /// Encodes the full plain message.
    fn encode(&self) -> CodecResult<Vec<u8>> {
        let mut writer = IeWriter::new();
        self.encode_ies(&mut writer)?;
        let message_type: u8 = Self::MESSAGE_TYPE.into();
        let mut out = writer.finish();
        out.prefix([0x00, message_type]);
        Ok(out.into_vec())
    }

    /// Decodes a full plain message.
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let (security_header, message_type, payload) = split_header(bytes)?;
        if security_header != 0 {
            return Err(CodecError::ProtectedMessage(security_header));
        }
        if message_type != Self::MESSAGE_TYPE {
            return Err(CodecError::UnexpectedMessageType {
                expected: Self::MESSAGE_TYPE,
                actual: message_type,
            });
        }
        Self::decode_ies(&IeSet::parse(payload)?)
    }
}

/// Splits `security_header || message_type || rest`.
pub fn split_header(bytes: &[u8]) -> CodecResult<(u8, MessageType, &[u8])> {
    if bytes.len() < 2 {
        return Err(CodecError::BufferTooShort {
            expected: 2,
            actual: bytes.len(),
        });
    }
    let message_type =
        MessageType::try_from(bytes[1]).map_err(|_| CodecError::InvalidMessageType(bytes[1]))?;
    Ok((bytes[0], message_type, &bytes[2..]))
}
