//! NG Setup Procedure
//!
//! Implements the NG Setup procedure as defined in 3GPP TS 38.413 Section 8.7.1.
//! This procedure is used to exchange application-level data needed for the NG-RAN node
//! and the AMF to correctly interoperate on the NG-C interface.

use crate::codec::{
    decode_cause, encode_cause, NgapError, NgapIeSet, NgapMessageBody, NgapMessageBuilder, NgapResult,
};
use crate::enums::{Cause, NgapMessageType, PagingDrx, TimeToWait};
use crate::iei;
use crate::ies::{
    decode_guami_list, decode_plmn_support_list, decode_supported_ta_list, encode_guami_list,
    encode_plmn_support_list, encode_supported_ta_list, GlobalGnbId, Guami, PlmnSliceItem,
    SupportedTaItem,
};

// ============================================================================
// NG Setup Request
// ============================================================================

/// NG Setup Request (gNB to AMF)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgSetupRequest {
    pub global_ran_node_id: GlobalGnbId,
    pub ran_node_name: Option<String>,
    pub supported_ta_list: Vec<SupportedTaItem>,
    pub default_paging_drx: PagingDrx,
}

impl NgapMessageBody for NgSetupRequest {
    const MESSAGE_TYPE: NgapMessageType = NgapMessageType::NgSetupRequest;

    fn encode_ies(&self, builder: &mut NgapMessageBuilder) -> NgapResult<()> {
        builder
            .ie(iei::GLOBAL_RAN_NODE_ID, self.global_ran_node_id.encode()?)?
            .opt_ie(iei::RAN_NODE_NAME, self.ran_node_name.as_ref().map(|n| n.as_bytes()))?
            .ie(iei::SUPPORTED_TA_LIST, encode_supported_ta_list(&self.supported_ta_list)?)?
            .ie(iei::DEFAULT_PAGING_DRX, vec![self.default_paging_drx.into()])?;
        Ok(())
    }

    fn decode_ies(ies: &NgapIeSet) -> NgapResult<Self> {
        let drx = ies.require_u8(iei::DEFAULT_PAGING_DRX, "DefaultPagingDRX")?;
        Ok(Self {
            global_ran_node_id: GlobalGnbId::decode(ies.require(iei::GLOBAL_RAN_NODE_ID, "GlobalRANNodeID")?)?,
            ran_node_name: ies.get_string(iei::RAN_NODE_NAME)?,
            supported_ta_list: decode_supported_ta_list(ies.require(iei::SUPPORTED_TA_LIST, "SupportedTAList")?)?,
            default_paging_drx: PagingDrx::try_from(drx)
                .map_err(|_| NgapError::InvalidIeValue(format!("Unknown PagingDRX value: {drx}")))?,
        })
    }
}

// ============================================================================
// NG Setup Response
// ============================================================================

/// NG Setup Response (AMF to gNB)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgSetupResponse {
    pub amf_name: String,
    pub served_guami_list: Vec<Guami>,
    /// Relative AMF Capacity (0-255)
    pub relative_amf_capacity: u8,
    pub plmn_support_list: Vec<PlmnSliceItem>,
}

impl NgapMessageBody for NgSetupResponse {
    const MESSAGE_TYPE: NgapMessageType = NgapMessageType::NgSetupResponse;

    fn encode_ies(&self, builder: &mut NgapMessageBuilder) -> NgapResult<()> {
        builder
            .ie(iei::AMF_NAME, self.amf_name.as_bytes())?
            .ie(iei::SERVED_GUAMI_LIST, encode_guami_list(&self.served_guami_list)?)?
            .ie(iei::RELATIVE_AMF_CAPACITY, vec![self.relative_amf_capacity])?
            .ie(iei::PLMN_SUPPORT_LIST, encode_plmn_support_list(&self.plmn_support_list)?)?;
        Ok(())
    }

    fn decode_ies(ies: &NgapIeSet) -> NgapResult<Self> {
        Ok(Self {
            amf_name: ies
                .get_string(iei::AMF_NAME)?
                .ok_or(NgapError::MissingMandatoryIe("AMFName"))?,
            served_guami_list: match ies.get(iei::SERVED_GUAMI_LIST) {
                Some(value) => decode_guami_list(value)?,
                None => Vec::new(),
            },
            relative_amf_capacity: ies.require_u8(iei::RELATIVE_AMF_CAPACITY, "RelativeAMFCapacity")?,
            plmn_support_list: decode_plmn_support_list(ies.require(iei::PLMN_SUPPORT_LIST, "PLMNSupportList")?)?,
        })
    }
}

// ============================================================================
// NG Setup Failure
// ============================================================================

/// NG Setup Failure (AMF to gNB)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgSetupFailure {
    pub cause: Cause,
    pub time_to_wait: Option<TimeToWait>,
}

impl NgapMessageBody for NgSetupFailure {
    const MESSAGE_TYPE: NgapMessageType = NgapMessageType::NgSetupFailure;

    fn encode_ies(&self, builder: &mut NgapMessageBuilder) -> NgapResult<()> {
        builder
            .ie(iei::CAUSE, encode_cause(self.cause))?
            .opt_ie(iei::TIME_TO_WAIT, self.time_to_wait.map(|t| vec![u8::from(t)]))?;
        Ok(())
    }

    fn decode_ies(ies: &NgapIeSet) -> NgapResult<Self> {
        let time_to_wait = ies
            .get_u8(iei::TIME_TO_WAIT)
            .map(|v| {
                TimeToWait::try_from(v)
                    .map_err(|_| NgapError::InvalidIeValue(format!("Unknown TimeToWait value: {v}")))
            })
            .transpose()?;
        Ok(Self {
            cause: decode_cause(ies.require(iei::CAUSE, "Cause")?)?,
            time_to_wait,
        })
    }
}
