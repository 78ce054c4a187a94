//! Registration Messages
//!
//! - Registration Request (UE to network)
//! - Registration Accept (network to UE)
//! - Registration Complete (UE to network)
//! - Registration Reject (network to UE)

use ransim_common::SNssai;

use crate::codec::{decode_enum, CodecError, CodecResult, IeSet, IeWriter, NasMessageBody};
use crate::enums::{MessageType, MmCause, RegistrationType};
use crate::iei;

// ============================================================================
// 5GS Mobile Identity
// ============================================================================

/// Identity type octet of the mobile identity IE
const IDENTITY_TYPE_SUPI: u8 = 0x01;
const IDENTITY_TYPE_GUTI: u8 = 0x02;

/// Mobile identity carried in registration and deregistration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MobileIdentity {
    /// Permanent identity as IMSI digits, packed as BCD
    Supi(String),
    /// Opaque 5G-GUTI assigned by the network
    Guti(Vec<u8>),
}

impl MobileIdentity {
    /// Encodes `type || value`.
    pub fn encode(&self) -> CodecResult<Vec<u8>> {
        match self {
            MobileIdentity::Supi(digits) => {
                let mut out = vec![IDENTITY_TYPE_SUPI];
                out.extend_from_slice(&encode_bcd(digits)?);
                Ok(out)
            }
            MobileIdentity::Guti(guti) => {
                let mut out = vec![IDENTITY_TYPE_GUTI];
                out.extend_from_slice(guti);
                Ok(out)
            }
        }
    }

    /// Decodes `type || value`.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        match bytes.split_first() {
            Some((&IDENTITY_TYPE_SUPI, rest)) => Ok(MobileIdentity::Supi(decode_bcd(rest)?)),
            Some((&IDENTITY_TYPE_GUTI, rest)) => Ok(MobileIdentity::Guti(rest.to_vec())),
            Some((other, _)) => Err(CodecError::InvalidValue(format!(
                "unknown identity type 0x{other:02X}"
            ))),
            None => Err(CodecError::InvalidValue("empty mobile identity".to_string())),
        }
    }
}

/// Packs decimal digits two per octet, low nibble first, odd count padded
/// with 0xF.
fn encode_bcd(digits: &str) -> CodecResult<Vec<u8>> {
    let nibbles = digits
        .chars()
        .map(|c| {
            c.to_digit(10)
                .map(|d| d as u8)
                .ok_or_else(|| CodecError::InvalidValue(format!("non-digit '{c}' in identity")))
        })
        .collect::<CodecResult<Vec<u8>>>()?;
    Ok(nibbles
        .chunks(2)
        .map(|pair| match pair {
            [low, high] => (high << 4) | low,
            [low] => 0xF0 | low,
            _ => 0xFF,
        })
        .collect())
}

fn decode_bcd(bytes: &[u8]) -> CodecResult<String> {
    let mut digits = String::with_capacity(bytes.len() * 2);
    for (index, octet) in bytes.iter().enumerate() {
        for nibble in [octet & 0x0F, octet >> 4] {
            match nibble {
                0..=9 => digits.push(char::from(b'0' + nibble)),
                0x0F if index == bytes.len() - 1 => {}
                _ => {
                    return Err(CodecError::InvalidValue(format!(
                        "bad BCD octet 0x{octet:02X}"
                    )))
                }
            }
        }
    }
    Ok(digits)
}

// ============================================================================
// Registration Request
// ============================================================================

/// Registration Request (UE to network)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub registration_type: RegistrationType,
    pub ng_ksi: Option<u8>,
    pub mobile_identity: MobileIdentity,
    pub mm_capability: Option<Vec<u8>>,
    pub ue_security_capability: Option<Vec<u8>>,
    pub requested_nssai: Option<Vec<SNssai>>,
    pub requested_drx: Option<u8>,
}

impl RegistrationRequest {
    /// Initial registration for a SUPI with no optional IEs.
    pub fn initial(supi_digits: impl Into<String>) -> Self {
        Self {
            registration_type: RegistrationType::InitialRegistration,
            ng_ksi: None,
            mobile_identity: MobileIdentity::Supi(supi_digits.into()),
            mm_capability: None,
            ue_security_capability: None,
            requested_nssai: None,
            requested_drx: None,
        }
    }
}

impl NasMessageBody for RegistrationRequest {
    const MESSAGE_TYPE: MessageType = MessageType::RegistrationRequest;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_u8(iei::REGISTRATION_TYPE, self.registration_type.into())?;
        w.put_opt_u8(iei::NGKSI, self.ng_ksi)?;
        w.put(iei::MOBILE_IDENTITY, &self.mobile_identity.encode()?)?;
        w.put_opt(iei::MM_CAPABILITY, self.mm_capability.as_deref())?;
        w.put_opt(iei::UE_SECURITY_CAPABILITY, self.ue_security_capability.as_deref())?;
        w.put_nssai(iei::REQUESTED_NSSAI, self.requested_nssai.as_deref())?;
        w.put_opt_u8(iei::REQUESTED_DRX, self.requested_drx)
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            registration_type: decode_enum(
                "registration type",
                ies.require_u8(iei::REGISTRATION_TYPE, "registration type")?,
            )?,
            ng_ksi: ies.get_u8(iei::NGKSI)?,
            mobile_identity: MobileIdentity::decode(ies.require(iei::MOBILE_IDENTITY, "mobile identity")?)?,
            mm_capability: ies.get_vec(iei::MM_CAPABILITY),
            ue_security_capability: ies.get_vec(iei::UE_SECURITY_CAPABILITY),
            requested_nssai: ies.get_nssai(iei::REQUESTED_NSSAI)?,
            requested_drx: ies.get_u8(iei::REQUESTED_DRX)?,
        })
    }
}

// ============================================================================
// Registration Accept
// ============================================================================

/// Registration Accept (network to UE)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationAccept {
    /// Assigned 5G-GUTI
    pub guti: Option<Vec<u8>>,
    pub tai_list: Option<Vec<u8>>,
    pub allowed_nssai: Option<Vec<SNssai>>,
    pub configured_nssai: Option<Vec<SNssai>>,
    /// Periodic registration timer, GPRS timer 3 encoding
    pub t3512: Option<u8>,
}

impl NasMessageBody for RegistrationAccept {
    const MESSAGE_TYPE: MessageType = MessageType::RegistrationAccept;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_opt(iei::MOBILE_IDENTITY, self.guti.as_deref())?;
        w.put_opt(iei::TAI_LIST, self.tai_list.as_deref())?;
        w.put_nssai(iei::ALLOWED_NSSAI, self.allowed_nssai.as_deref())?;
        w.put_nssai(iei::CONFIGURED_NSSAI, self.configured_nssai.as_deref())?;
        w.put_opt_u8(iei::T3512_VALUE, self.t3512)
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            guti: ies.get_vec(iei::MOBILE_IDENTITY),
            tai_list: ies.get_vec(iei::TAI_LIST),
            allowed_nssai: ies.get_nssai(iei::ALLOWED_NSSAI)?,
            configured_nssai: ies.get_nssai(iei::CONFIGURED_NSSAI)?,
            t3512: ies.get_u8(iei::T3512_VALUE)?,
        })
    }
}

// ============================================================================
// Registration Complete / Reject
// ============================================================================

/// Registration Complete (UE to network)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationComplete;

impl NasMessageBody for RegistrationComplete {
    const MESSAGE_TYPE: MessageType = MessageType::RegistrationComplete;

    fn encode_ies(&self, _w: &mut IeWriter) -> CodecResult<()> {
        Ok(())
    }

    fn decode_ies(_ies: &IeSet) -> CodecResult<Self> {
        Ok(Self)
    }
}

/// Registration Reject (network to UE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationReject {
    pub cause: MmCause,
}

impl NasMessageBody for RegistrationReject {
    const MESSAGE_TYPE: MessageType = MessageType::RegistrationReject;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_u8(iei::MM_CAUSE, self.cause.into())
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            cause: decode_enum("5GMM cause", ies.require_u8(iei::MM_CAUSE, "5GMM cause")?)?,
        })
    }
}
