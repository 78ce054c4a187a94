//! NAS security context and message protection
//!
//! A protected NAS message has the layout
//!
//! ```text
//! header(1) | message type(1) | SQN(1) | COUNT(4) | bearer/direction(1) | [MAC(4)] | payload
//! ```
//!
//! where `header` is `0x40 | alg` for integrity protection and `0x20 | alg`
//! for ciphering, `SQN` is the low byte of COUNT and the bearer/direction
//! octet packs the 5-bit bearer with the direction in bit 5. The MAC is only
//! present for integrity protection. Algorithm id 0 leaves the message plain.
//!
//! The MAC and ciphering are the placeholder primitives from
//! [`ransim_crypto::placeholder`]; they are not NIA/NEA compliant.

use ransim_crypto::{derive_knas_enc, derive_knas_int, placeholder_cipher, placeholder_mac, MAC_SIZE};
use thiserror::Error;
use tracing::trace;

/// Plain NAS message
pub const SECURITY_HEADER_PLAIN: u8 = 0x00;
/// Integrity protected
pub const SECURITY_HEADER_INTEGRITY: u8 = 0x40;
/// Ciphered
pub const SECURITY_HEADER_CIPHERED: u8 = 0x20;

/// NAS signalling bearer
pub const NAS_BEARER: u8 = 0x01;

/// Length of `SQN || COUNT || bearer/direction`
const SEQUENCE_FIELDS_LEN: usize = 6;

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum NasDirection {
    #[default]
    Uplink = 0,
    Downlink = 1,
}

/// Which protection a non-zero algorithm id applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmType {
    Integrity,
    Ciphering,
}

/// Security-related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SecurityError {
    /// Security context has no integrity key
    #[error("Security context not established")]
    NoSecurityContext,
    /// Ciphering requested without a ciphering key
    #[error("No ciphering key in security context")]
    NoCipheringKey,
    /// Input is not a plain NAS message
    #[error("Message is not plain (header 0x{0:02X})")]
    NotPlain(u8),
    /// Header is neither plain, integrity protected nor ciphered
    #[error("Invalid security header type: 0x{0:02X}")]
    InvalidSecurityHeaderType(u8),
    /// Message shorter than its header
    #[error("Protected message truncated: {0} bytes")]
    Truncated(usize),
    /// SQN does not match the low byte of COUNT
    #[error("Sequence number mismatch")]
    SequenceNumberMismatch,
    /// MAC verification failed
    #[error("MAC verification failed")]
    MacVerificationFailed,
}

impl From<SecurityError> for ransim_common::Error {
    fn from(err: SecurityError) -> Self {
        ransim_common::Error::ProtocolDecode(err.to_string())
    }
}

/// NAS security context of one UE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NasSecurityContext {
    integrity_key: Vec<u8>,
    ciphering_key: Vec<u8>,
    integrity_algorithm: u8,
    ciphering_algorithm: u8,
    count: u32,
    bearer: u8,
    direction: NasDirection,
}

impl NasSecurityContext {
    /// Empty (invalid) context for the uplink direction.
    pub fn new() -> Self {
        Self {
            bearer: NAS_BEARER,
            ..Default::default()
        }
    }

    /// Context with explicit keys and algorithms.
    pub fn with_keys(
        integrity_key: &[u8],
        ciphering_key: &[u8],
        integrity_algorithm: u8,
        ciphering_algorithm: u8,
    ) -> Self {
        Self {
            integrity_key: integrity_key.to_vec(),
            ciphering_key: ciphering_key.to_vec(),
            integrity_algorithm,
            ciphering_algorithm,
            ..Self::new()
        }
    }

    /// Derives and installs `KNASint`/`KNASenc` for the selected algorithms.
    /// COUNT restarts at zero.
    pub fn install_keys(&mut self, kamf: &[u8; 32], integrity_algorithm: u8, ciphering_algorithm: u8) {
        self.integrity_key = derive_knas_int(kamf, integrity_algorithm).to_vec();
        self.ciphering_key = derive_knas_enc(kamf, ciphering_algorithm).to_vec();
        self.integrity_algorithm = integrity_algorithm;
        self.ciphering_algorithm = ciphering_algorithm;
        self.count = 0;
    }

    /// Valid iff an integrity key is present.
    pub fn is_valid(&self) -> bool {
        !self.integrity_key.is_empty()
    }

    pub fn integrity_algorithm(&self) -> u8 {
        self.integrity_algorithm
    }

    pub fn ciphering_algorithm(&self) -> u8 {
        self.ciphering_algorithm
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn bearer(&self) -> u8 {
        self.bearer
    }

    pub fn set_bearer(&mut self, bearer: u8) {
        self.bearer = bearer & 0x1F;
    }

    pub fn direction(&self) -> NasDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: NasDirection) {
        self.direction = direction;
    }

    /// Drops keys and algorithms; COUNT restarts at zero.
    pub fn reset(&mut self) {
        *self = Self {
            bearer: self.bearer,
            direction: self.direction,
            ..Self::new()
        };
    }
}

/// Protects a plain NAS message (`0x00 || type || IEs`).
///
/// With `algorithm_id == 0` the message is returned unchanged and COUNT is
/// not touched. Otherwise COUNT increments after the message is built.
pub fn protect(
    ctx: &mut NasSecurityContext,
    message: &[u8],
    algorithm_type: AlgorithmType,
    algorithm_id: u8,
) -> Result<Vec<u8>, SecurityError> {
    if message.len() < 2 {
        return Err(SecurityError::Truncated(message.len()));
    }
    if message[0] != SECURITY_HEADER_PLAIN {
        return Err(SecurityError::NotPlain(message[0]));
    }
    if algorithm_id == 0 {
        return Ok(message.to_vec());
    }
    if !ctx.is_valid() {
        return Err(SecurityError::NoSecurityContext);
    }

    let message_type = message[1];
    let mut payload = message[2..].to_vec();
    let count = ctx.count;
    let direction = ctx.direction as u8;

    let header = match algorithm_type {
        AlgorithmType::Integrity => SECURITY_HEADER_INTEGRITY,
        AlgorithmType::Ciphering => SECURITY_HEADER_CIPHERED,
    } | (algorithm_id & 0x0F);

    let mut out = Vec::with_capacity(2 + SEQUENCE_FIELDS_LEN + MAC_SIZE + payload.len());
    out.push(header);
    out.push(message_type);
    out.push(count as u8);
    out.extend_from_slice(&count.to_be_bytes());
    out.push((ctx.bearer & 0x1F) | (direction << 5));

    match algorithm_type {
        AlgorithmType::Integrity => {
            let input = mac_input(message_type, &payload);
            let mac = placeholder_mac(count, ctx.bearer, direction, &ctx.integrity_key, &input);
            out.extend_from_slice(&mac);
        }
        AlgorithmType::Ciphering => {
            if ctx.ciphering_key.is_empty() {
                return Err(SecurityError::NoCipheringKey);
            }
            placeholder_cipher(count, ctx.bearer, direction, &ctx.ciphering_key, &mut payload);
        }
    }
    out.extend_from_slice(&payload);

    ctx.count = ctx.count.wrapping_add(1);
    trace!(count, header, "NAS message protected");
    Ok(out)
}

/// Reverses [`protect`], returning the plain message.
///
/// Plain input is returned unchanged. COUNT increments for every protected
/// message accepted.
pub fn unprotect(ctx: &mut NasSecurityContext, data: &[u8]) -> Result<Vec<u8>, SecurityError> {
    if data.len() < 2 {
        return Err(SecurityError::Truncated(data.len()));
    }
    let header = data[0];
    if header == SECURITY_HEADER_PLAIN {
        return Ok(data.to_vec());
    }
    let algorithm_type = match header & 0xF0 {
        SECURITY_HEADER_INTEGRITY => AlgorithmType::Integrity,
        SECURITY_HEADER_CIPHERED => AlgorithmType::Ciphering,
        _ => return Err(SecurityError::InvalidSecurityHeaderType(header)),
    };
    if !ctx.is_valid() {
        return Err(SecurityError::NoSecurityContext);
    }

    let fixed_len = 2
        + SEQUENCE_FIELDS_LEN
        + match algorithm_type {
            AlgorithmType::Integrity => MAC_SIZE,
            AlgorithmType::Ciphering => 0,
        };
    if data.len() < fixed_len {
        return Err(SecurityError::Truncated(data.len()));
    }

    let message_type = data[1];
    let sqn = data[2];
    let count = u32::from_be_bytes([data[3], data[4], data[5], data[6]]);
    if sqn != count as u8 {
        return Err(SecurityError::SequenceNumberMismatch);
    }
    let bearer = data[7] & 0x1F;
    let direction = (data[7] >> 5) & 0x01;
    let mut payload = data[fixed_len..].to_vec();

    match algorithm_type {
        AlgorithmType::Integrity => {
            let input = mac_input(message_type, &payload);
            let expected = placeholder_mac(count, bearer, direction, &ctx.integrity_key, &input);
            if expected[..] != data[8..8 + MAC_SIZE] {
                return Err(SecurityError::MacVerificationFailed);
            }
        }
        AlgorithmType::Ciphering => {
            if ctx.ciphering_key.is_empty() {
                return Err(SecurityError::NoCipheringKey);
            }
            placeholder_cipher(count, bearer, direction, &ctx.ciphering_key, &mut payload);
        }
    }

    ctx.count = ctx.count.wrapping_add(1);
    let mut out = Vec::with_capacity(2 + payload.len());
    out.push(SECURITY_HEADER_PLAIN);
    out.push(message_type);
    out.extend_from_slice(&payload);
    Ok(out)
}

fn mac_input(message_type: u8, payload: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(1 + payload.len());
    input.push(message_type);
    input.extend_from_slice(payload);
    input
}
