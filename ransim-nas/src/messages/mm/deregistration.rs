//! Deregistration Messages (UE originating)

use crate::codec::{CodecResult, IeSet, IeWriter, NasMessageBody};
use crate::enums::MessageType;
use crate::iei;
use crate::messages::mm::registration::MobileIdentity;

/// Switch-off bit of the de-registration type
pub const DEREGISTRATION_SWITCH_OFF: u8 = 0x08;
/// 3GPP access type
pub const ACCESS_TYPE_3GPP: u8 = 0x01;

/// Deregistration Request (UE originating)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeregistrationRequest {
    /// Switch-off flag (bit 4) and access type (bits 1-2)
    pub deregistration_type: u8,
    pub ng_ksi: Option<u8>,
    pub mobile_identity: MobileIdentity,
}

impl DeregistrationRequest {
    /// Normal de-registration over 3GPP access.
    pub fn normal(mobile_identity: MobileIdentity) -> Self {
        Self {
            deregistration_type: ACCESS_TYPE_3GPP,
            ng_ksi: None,
            mobile_identity,
        }
    }

    pub fn is_switch_off(&self) -> bool {
        self.deregistration_type & DEREGISTRATION_SWITCH_OFF != 0
    }
}

impl NasMessageBody for DeregistrationRequest {
    const MESSAGE_TYPE: MessageType = MessageType::DeregistrationRequest;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_u8(iei::DEREGISTRATION_TYPE, self.deregistration_type)?;
        w.put_opt_u8(iei::NGKSI, self.ng_ksi)?;
        w.put(iei::MOBILE_IDENTITY, &self.mobile_identity.encode()?)
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            deregistration_type: ies.require_u8(iei::DEREGISTRATION_TYPE, "de-registration type")?,
            ng_ksi: ies.get_u8(iei::NGKSI)?,
            mobile_identity: MobileIdentity::decode(ies.require(iei::MOBILE_IDENTITY, "mobile identity")?)?,
        })
    }
}

/// Deregistration Accept (UE originating)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeregistrationAccept;

impl NasMessageBody for DeregistrationAccept {
    const MESSAGE_TYPE: MessageType = MessageType::DeregistrationAcceptUeOriginating;

    fn encode_ies(&self, _w: &mut IeWriter) -> CodecResult<()> {
        Ok(())
    }

    fn decode_ies(_ies: &IeSet) -> CodecResult<Self> {
        Ok(Self)
    }
}
