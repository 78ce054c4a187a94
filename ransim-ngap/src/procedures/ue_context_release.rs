//! UE Context Release Procedures
//!
//! Implements the UE Context Release procedures as defined in 3GPP TS 38.413:
//! - UE Context Release Request (gNB initiated), Section 8.3.2
//! - UE Context Release Command / Complete (AMF initiated), Section 8.3.3

use bytes::BufMut;

use crate::codec::{
    decode_amf_ue_ngap_id, decode_cause, decode_ran_ue_ngap_id, encode_amf_ue_ngap_id, encode_cause,
    encode_ran_ue_ngap_id, NgapError, NgapIeSet, NgapMessageBody, NgapMessageBuilder, NgapResult,
};
use crate::enums::{Cause, NgapMessageType};
use crate::iei;

// ============================================================================
// UE Context Release Request
// ============================================================================

/// UE Context Release Request (gNB to AMF)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UeContextReleaseRequest {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub cause: Cause,
}

impl NgapMessageBody for UeContextReleaseRequest {
    const MESSAGE_TYPE: NgapMessageType = NgapMessageType::UeContextReleaseRequest;

    fn encode_ies(&self, builder: &mut NgapMessageBuilder) -> NgapResult<()> {
        builder
            .ie(iei::AMF_UE_NGAP_ID, encode_amf_ue_ngap_id(self.amf_ue_ngap_id)?)?
            .ie(iei::RAN_UE_NGAP_ID, encode_ran_ue_ngap_id(self.ran_ue_ngap_id))?
            .ie(iei::CAUSE, encode_cause(self.cause))?;
        Ok(())
    }

    fn decode_ies(ies: &NgapIeSet) -> NgapResult<Self> {
        Ok(Self {
            amf_ue_ngap_id: decode_amf_ue_ngap_id(ies.require(iei::AMF_UE_NGAP_ID, "AMF-UE-NGAP-ID")?)?,
            ran_ue_ngap_id: decode_ran_ue_ngap_id(ies.require(iei::RAN_UE_NGAP_ID, "RAN-UE-NGAP-ID")?)?,
            cause: decode_cause(ies.require(iei::CAUSE, "Cause")?)?,
        })
    }
}

// ============================================================================
// UE Context Release Command
// ============================================================================

/// UE NGAP IDs choice in the Release Command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UeNgapIds {
    /// Both AMF and RAN UE NGAP IDs
    Pair { amf_ue_ngap_id: u64, ran_ue_ngap_id: u32 },
    /// Only AMF UE NGAP ID
    AmfOnly(u64),
}

impl UeNgapIds {
    pub fn amf_ue_ngap_id(&self) -> u64 {
        match self {
            UeNgapIds::Pair { amf_ue_ngap_id, .. } => *amf_ue_ngap_id,
            UeNgapIds::AmfOnly(id) => *id,
        }
    }

    pub fn ran_ue_ngap_id(&self) -> Option<u32> {
        match self {
            UeNgapIds::Pair { ran_ue_ngap_id, .. } => Some(*ran_ue_ngap_id),
            UeNgapIds::AmfOnly(_) => None,
        }
    }

    fn encode(&self) -> NgapResult<Vec<u8>> {
        let mut out = Vec::with_capacity(10);
        match self {
            UeNgapIds::Pair {
                amf_ue_ngap_id,
                ran_ue_ngap_id,
            } => {
                out.put_u8(0);
                out.put_slice(&encode_amf_ue_ngap_id(*amf_ue_ngap_id)?);
                out.put_slice(&encode_ran_ue_ngap_id(*ran_ue_ngap_id));
            }
            UeNgapIds::AmfOnly(amf_ue_ngap_id) => {
                out.put_u8(1);
                out.put_slice(&encode_amf_ue_ngap_id(*amf_ue_ngap_id)?);
            }
        }
        Ok(out)
    }

    fn decode(value: &[u8]) -> NgapResult<Self> {
        match value {
            [0, rest @ ..] if rest.len() == 9 => Ok(UeNgapIds::Pair {
                amf_ue_ngap_id: decode_amf_ue_ngap_id(&rest[..5])?,
                ran_ue_ngap_id: decode_ran_ue_ngap_id(&rest[5..])?,
            }),
            [1, rest @ ..] => Ok(UeNgapIds::AmfOnly(decode_amf_ue_ngap_id(rest)?)),
            _ => Err(NgapError::InvalidIeValue(format!("UE-NGAP-IDs: {value:02X?}"))),
        }
    }
}

/// UE Context Release Command (AMF to gNB)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UeContextReleaseCommand {
    pub ue_ngap_ids: UeNgapIds,
    pub cause: Cause,
}

impl NgapMessageBody for UeContextReleaseCommand {
    const MESSAGE_TYPE: NgapMessageType = NgapMessageType::UeContextReleaseCommand;

    fn encode_ies(&self, builder: &mut NgapMessageBuilder) -> NgapResult<()> {
        builder
            .ie(iei::UE_NGAP_IDS, self.ue_ngap_ids.encode()?)?
            .ie(iei::CAUSE, encode_cause(self.cause))?;
        Ok(())
    }

    fn decode_ies(ies: &NgapIeSet) -> NgapResult<Self> {
        Ok(Self {
            ue_ngap_ids: UeNgapIds::decode(ies.require(iei::UE_NGAP_IDS, "UE-NGAP-IDs")?)?,
            cause: decode_cause(ies.require(iei::CAUSE, "Cause")?)?,
        })
    }
}

// ============================================================================
// UE Context Release Complete
// ============================================================================

/// UE Context Release Complete (gNB to AMF)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UeContextReleaseComplete {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
}

impl NgapMessageBody for UeContextReleaseComplete {
    const MESSAGE_TYPE: NgapMessageType = NgapMessageType::UeContextReleaseComplete;

    fn encode_ies(&self, builder: &mut NgapMessageBuilder) -> NgapResult<()> {
        builder
            .ie(iei::AMF_UE_NGAP_ID, encode_amf_ue_ngap_id(self.amf_ue_ngap_id)?)?
            .ie(iei::RAN_UE_NGAP_ID, encode_ran_ue_ngap_id(self.ran_ue_ngap_id))?;
        Ok(())
    }

    fn decode_ies(ies: &NgapIeSet) -> NgapResult<Self> {
        Ok(Self {
            amf_ue_ngap_id: decode_amf_ue_ngap_id(ies.require(iei::AMF_UE_NGAP_ID, "AMF-UE-NGAP-ID")?)?,
            ran_ue_ngap_id: decode_ran_ue_ngap_id(ies.require(iei::RAN_UE_NGAP_ID, "RAN-UE-NGAP-ID")?)?,
        })
    }
}
