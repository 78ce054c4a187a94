//! NAS Transport Procedures
//!
//! Implements the NAS Transport procedures as defined in 3GPP TS 38.413 Section 8.6:
//! - Downlink NAS Transport (AMF to gNB), Section 8.6.2
//! - Uplink NAS Transport (gNB to AMF), Section 8.6.3

use crate::codec::{
    decode_amf_ue_ngap_id, decode_ran_ue_ngap_id, encode_amf_ue_ngap_id, encode_ran_ue_ngap_id,
    NgapIeSet, NgapMessageBody, NgapMessageBuilder, NgapResult,
};
use crate::enums::NgapMessageType;
use crate::iei;
use crate::ies::UserLocationInfoNr;

// ============================================================================
// Downlink NAS Transport
// ============================================================================

/// Downlink NAS Transport (AMF to gNB)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownlinkNasTransport {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub nas_pdu: Vec<u8>,
}

impl NgapMessageBody for DownlinkNasTransport {
    const MESSAGE_TYPE: NgapMessageType = NgapMessageType::DownlinkNasTransport;

    fn encode_ies(&self, builder: &mut NgapMessageBuilder) -> NgapResult<()> {
        builder
            .ie(iei::AMF_UE_NGAP_ID, encode_amf_ue_ngap_id(self.amf_ue_ngap_id)?)?
            .ie(iei::RAN_UE_NGAP_ID, encode_ran_ue_ngap_id(self.ran_ue_ngap_id))?
            .ie(iei::NAS_PDU, self.nas_pdu.clone())?;
        Ok(())
    }

    fn decode_ies(ies: &NgapIeSet) -> NgapResult<Self> {
        Ok(Self {
            amf_ue_ngap_id: decode_amf_ue_ngap_id(ies.require(iei::AMF_UE_NGAP_ID, "AMF-UE-NGAP-ID")?)?,
            ran_ue_ngap_id: decode_ran_ue_ngap_id(ies.require(iei::RAN_UE_NGAP_ID, "RAN-UE-NGAP-ID")?)?,
            nas_pdu: ies.require(iei::NAS_PDU, "NAS-PDU")?.to_vec(),
        })
    }
}

// ============================================================================
// Uplink NAS Transport
// ============================================================================

/// Uplink NAS Transport (gNB to AMF)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UplinkNasTransport {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub nas_pdu: Vec<u8>,
    pub user_location_info: UserLocationInfoNr,
}

impl NgapMessageBody for UplinkNasTransport {
    const MESSAGE_TYPE: NgapMessageType = NgapMessageType::UplinkNasTransport;

    fn encode_ies(&self, builder: &mut NgapMessageBuilder) -> NgapResult<()> {
        builder
            .ie(iei::AMF_UE_NGAP_ID, encode_amf_ue_ngap_id(self.amf_ue_ngap_id)?)?
            .ie(iei::RAN_UE_NGAP_ID, encode_ran_ue_ngap_id(self.ran_ue_ngap_id))?
            .ie(iei::NAS_PDU, self.nas_pdu.clone())?
            .ie(iei::USER_LOCATION_INFORMATION, self.user_location_info.encode())?;
        Ok(())
    }

    fn decode_ies(ies: &NgapIeSet) -> NgapResult<Self> {
        Ok(Self {
            amf_ue_ngap_id: decode_amf_ue_ngap_id(ies.require(iei::AMF_UE_NGAP_ID, "AMF-UE-NGAP-ID")?)?,
            ran_ue_ngap_id: decode_ran_ue_ngap_id(ies.require(iei::RAN_UE_NGAP_ID, "RAN-UE-NGAP-ID")?)?,
            nas_pdu: ies.require(iei::NAS_PDU, "NAS-PDU")?.to_vec(),
            user_location_info: UserLocationInfoNr::decode(
                ies.require(iei::USER_LOCATION_INFORMATION, "UserLocationInformation")?,
            )?,
        })
    }
}
