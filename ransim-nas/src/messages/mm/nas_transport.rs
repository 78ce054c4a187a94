//! NAS Transport Messages
//!
//! UL/DL NAS Transport carry a payload container between the UE and the
//! AMF; for N1 SM information the container holds a complete 5GSM message.

use ransim_common::SNssai;

use crate::codec::{decode_enum, CodecResult, IeSet, IeWriter, NasMessageBody};
use crate::enums::{MessageType, MmCause, PayloadContainerType};
use crate::iei;

/// UL NAS Transport (UE to network)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UlNasTransport {
    pub payload_container_type: PayloadContainerType,
    pub payload_container: Vec<u8>,
    pub pdu_session_id: Option<u8>,
    pub s_nssai: Option<SNssai>,
    pub dnn: Option<String>,
}

impl UlNasTransport {
    /// Wraps a 5GSM message.
    pub fn n1_sm(pdu_session_id: u8, sm_message: Vec<u8>) -> Self {
        Self {
            payload_container_type: PayloadContainerType::N1SmInformation,
            payload_container: sm_message,
            pdu_session_id: Some(pdu_session_id),
            s_nssai: None,
            dnn: None,
        }
    }
}

impl NasMessageBody for UlNasTransport {
    const MESSAGE_TYPE: MessageType = MessageType::UlNasTransport;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_u8(iei::PAYLOAD_CONTAINER_TYPE, self.payload_container_type.into())?;
        w.put(iei::PAYLOAD_CONTAINER, &self.payload_container)?;
        w.put_opt_u8(iei::PDU_SESSION_ID, self.pdu_session_id)?;
        w.put_opt(iei::S_NSSAI, self.s_nssai.map(|s| s.encode()).as_deref())?;
        w.put_opt(iei::DNN, self.dnn.as_deref().map(str::as_bytes))
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            payload_container_type: decode_enum(
                "payload container type",
                ies.require_u8(iei::PAYLOAD_CONTAINER_TYPE, "payload container type")?,
            )?,
            payload_container: ies.require(iei::PAYLOAD_CONTAINER, "payload container")?.to_vec(),
            pdu_session_id: ies.get_u8(iei::PDU_SESSION_ID)?,
            s_nssai: ies.get_s_nssai(iei::S_NSSAI)?,
            dnn: ies.get_string(iei::DNN)?,
        })
    }
}

/// DL NAS Transport (network to UE)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DlNasTransport {
    pub payload_container_type: PayloadContainerType,
    pub payload_container: Vec<u8>,
    pub pdu_session_id: Option<u8>,
    pub cause: Option<MmCause>,
}

impl DlNasTransport {
    /// Wraps a 5GSM message.
    pub fn n1_sm(pdu_session_id: u8, sm_message: Vec<u8>) -> Self {
        Self {
            payload_container_type: PayloadContainerType::N1SmInformation,
            payload_container: sm_message,
            pdu_session_id: Some(pdu_session_id),
            cause: None,
        }
    }
}

impl NasMessageBody for DlNasTransport {
    const MESSAGE_TYPE: MessageType = MessageType::DlNasTransport;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_u8(iei::PAYLOAD_CONTAINER_TYPE, self.payload_container_type.into())?;
        w.put(iei::PAYLOAD_CONTAINER, &self.payload_container)?;
        w.put_opt_u8(iei::PDU_SESSION_ID, self.pdu_session_id)?;
        w.put_opt_u8(iei::MM_CAUSE, self.cause.map(u8::from))
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            payload_container_type: decode_enum(
                "payload container type",
                ies.require_u8(iei::PAYLOAD_CONTAINER_TYPE, "payload container type")?,
            )?,
            payload_container: ies.require(iei::PAYLOAD_CONTAINER, "payload container")?.to_vec(),
            pdu_session_id: ies.get_u8(iei::PDU_SESSION_ID)?,
            cause: ies
                .get_u8(iei::MM_CAUSE)?
                .map(|value| decode_enum("5GMM cause", value))
                .transpose()?,
        })
    }
}
