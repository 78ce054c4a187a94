//! PDU Session Establishment Messages
//!
//! - PDU Session Establishment Request (UE to network)
//! - PDU Session Establishment Accept (network to UE)
//! - PDU Session Establishment Reject (network to UE)

use ransim_common::SNssai;

use crate::codec::{decode_enum, CodecResult, IeSet, IeWriter, NasMessageBody};
use crate::enums::{MessageType, PduSessionType, RequestType, SmCause};
use crate::iei;

/// PDU Session Establishment Request (UE to network)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduSessionEstablishmentRequest {
    pub pdu_session_type: PduSessionType,
    pub request_type: RequestType,
    pub pdu_session_id: Option<u8>,
    pub s_nssai: Option<SNssai>,
    /// Data network name, ASCII
    pub dnn: Option<String>,
}

impl PduSessionEstablishmentRequest {
    /// Initial IPv4 request.
    pub fn ipv4(pdu_session_id: u8, dnn: impl Into<String>) -> Self {
        Self {
            pdu_session_type: PduSessionType::Ipv4,
            request_type: RequestType::InitialRequest,
            pdu_session_id: Some(pdu_session_id),
            s_nssai: None,
            dnn: Some(dnn.into()),
        }
    }
}

impl NasMessageBody for PduSessionEstablishmentRequest {
    const MESSAGE_TYPE: MessageType = MessageType::PduSessionEstablishmentRequest;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_u8(iei::PDU_SESSION_TYPE, self.pdu_session_type.into())?;
        w.put_u8(iei::REQUEST_TYPE, self.request_type.into())?;
        w.put_opt_u8(iei::PDU_SESSION_ID, self.pdu_session_id)?;
        w.put_opt(iei::S_NSSAI, self.s_nssai.map(|s| s.encode()).as_deref())?;
        w.put_opt(iei::DNN, self.dnn.as_deref().map(str::as_bytes))
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            pdu_session_type: decode_enum(
                "PDU session type",
                ies.require_u8(iei::PDU_SESSION_TYPE, "PDU session type")?,
            )?,
            request_type: decode_enum("request type", ies.require_u8(iei::REQUEST_TYPE, "request type")?)?,
            pdu_session_id: ies.get_u8(iei::PDU_SESSION_ID)?,
            s_nssai: ies.get_s_nssai(iei::S_NSSAI)?,
            dnn: ies.get_string(iei::DNN)?,
        })
    }
}

/// PDU Session Establishment Accept (network to UE)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduSessionEstablishmentAccept {
    pub pdu_session_type: PduSessionType,
    pub pdu_session_id: Option<u8>,
    pub qos_rules: Option<Vec<u8>>,
    pub session_ambr: Option<Vec<u8>>,
    /// Allocated address (type octet followed by the address)
    pub pdu_address: Option<Vec<u8>>,
    pub s_nssai: Option<SNssai>,
    pub dnn: Option<String>,
}

impl PduSessionEstablishmentAccept {
    pub fn new(pdu_session_type: PduSessionType) -> Self {
        Self {
            pdu_session_type,
            pdu_session_id: None,
            qos_rules: None,
            session_ambr: None,
            pdu_address: None,
            s_nssai: None,
            dnn: None,
        }
    }

    /// IPv4 address from the PDU address IE.
    pub fn ipv4_address(&self) -> Option<std::net::Ipv4Addr> {
        match self.pdu_address.as_deref() {
            Some([0x01, a, b, c, d]) => Some(std::net::Ipv4Addr::new(*a, *b, *c, *d)),
            _ => None,
        }
    }
}

impl NasMessageBody for PduSessionEstablishmentAccept {
    const MESSAGE_TYPE: MessageType = MessageType::PduSessionEstablishmentAccept;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_u8(iei::PDU_SESSION_TYPE, self.pdu_session_type.into())?;
        w.put_opt_u8(iei::PDU_SESSION_ID, self.pdu_session_id)?;
        w.put_opt(iei::QOS_RULES, self.qos_rules.as_deref())?;
        w.put_opt(iei::SESSION_AMBR, self.session_ambr.as_deref())?;
        w.put_opt(iei::PDU_ADDRESS, self.pdu_address.as_deref())?;
        w.put_opt(iei::S_NSSAI, self.s_nssai.map(|s| s.encode()).as_deref())?;
        w.put_opt(iei::DNN, self.dnn.as_deref().map(str::as_bytes))
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            pdu_session_type: decode_enum(
                "PDU session type",
                ies.require_u8(iei::PDU_SESSION_TYPE, "PDU session type")?,
            )?,
            pdu_session_id: ies.get_u8(iei::PDU_SESSION_ID)?,
            qos_rules: ies.get_vec(iei::QOS_RULES),
            session_ambr: ies.get_vec(iei::SESSION_AMBR),
            pdu_address: ies.get_vec(iei::PDU_ADDRESS),
            s_nssai: ies.get_s_nssai(iei::S_NSSAI)?,
            dnn: ies.get_string(iei::DNN)?,
        })
    }
}

/// PDU Session Establishment Reject (network to UE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduSessionEstablishmentReject {
    pub pdu_session_id: Option<u8>,
    pub cause: SmCause,
}

impl NasMessageBody for PduSessionEstablishmentReject {
    const MESSAGE_TYPE: MessageType = MessageType::PduSessionEstablishmentReject;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_opt_u8(iei::PDU_SESSION_ID, self.pdu_session_id)?;
        w.put_u8(iei::SM_CAUSE, self.cause.into())
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            pdu_session_id: ies.get_u8(iei::PDU_SESSION_ID)?,
            cause: decode_enum("5GSM cause", ies.require_u8(iei::SM_CAUSE, "5GSM cause")?)?,
        })
    }
}
