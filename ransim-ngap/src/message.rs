//! Decoded NGAP PDUs

use crate::codec::{NgapMessage, NgapMessageBody, NgapResult};
use crate::enums::NgapMessageType;
use crate::procedures::*;

/// Any NGAP message. Types without a codec are kept raw in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NgapPdu {
    NgSetupRequest(NgSetupRequest),
    NgSetupResponse(NgSetupResponse),
    NgSetupFailure(NgSetupFailure),
    InitialUeMessage(InitialUeMessage),
    UplinkNasTransport(UplinkNasTransport),
    DownlinkNasTransport(DownlinkNasTransport),
    UeContextReleaseRequest(UeContextReleaseRequest),
    UeContextReleaseCommand(UeContextReleaseCommand),
    UeContextReleaseComplete(UeContextReleaseComplete),
    Other(NgapMessage),
}

impl NgapPdu {
    pub fn decode(bytes: &[u8]) -> NgapResult<Self> {
        let msg = NgapMessage::decode(bytes)?;
        Ok(match msg.message_type {
            NgapMessageType::NgSetupRequest => Self::NgSetupRequest(NgSetupRequest::from_message(&msg)?),
            NgapMessageType::NgSetupResponse => Self::NgSetupResponse(NgSetupResponse::from_message(&msg)?),
            NgapMessageType::NgSetupFailure => Self::NgSetupFailure(NgSetupFailure::from_message(&msg)?),
            NgapMessageType::InitialUeMessage => Self::InitialUeMessage(InitialUeMessage::from_message(&msg)?),
            NgapMessageType::UplinkNasTransport => {
                Self::UplinkNasTransport(UplinkNasTransport::from_message(&msg)?)
            }
            NgapMessageType::DownlinkNasTransport => {
                Self::DownlinkNasTransport(DownlinkNasTransport::from_message(&msg)?)
            }
            NgapMessageType::UeContextReleaseRequest => {
                Self::UeContextReleaseRequest(UeContextReleaseRequest::from_message(&msg)?)
            }
            NgapMessageType::UeContextReleaseCommand => {
                Self::UeContextReleaseCommand(UeContextReleaseCommand::from_message(&msg)?)
            }
            NgapMessageType::UeContextReleaseComplete => {
                Self::UeContextReleaseComplete(UeContextReleaseComplete::from_message(&msg)?)
            }
            _ => Self::Other(msg),
        })
    }

    pub fn encode(&self) -> NgapResult<Vec<u8>> {
        match self {
            Self::NgSetupRequest(m) => m.encode(),
            Self::NgSetupResponse(m) => m.encode(),
            Self::NgSetupFailure(m) => m.encode(),
            Self::InitialUeMessage(m) => m.encode(),
            Self::UplinkNasTransport(m) => m.encode(),
            Self::DownlinkNasTransport(m) => m.encode(),
            Self::UeContextReleaseRequest(m) => m.encode(),
            Self::UeContextReleaseCommand(m) => m.encode(),
            Self::UeContextReleaseComplete(m) => m.encode(),
            Self::Other(m) => Ok(m.encode()),
        }
    }

    pub fn message_type(&self) -> NgapMessageType {
        match self {
            Self::NgSetupRequest(_) => NgSetupRequest::MESSAGE_TYPE,
            Self::NgSetupResponse(_) => NgSetupResponse::MESSAGE_TYPE,
            Self::NgSetupFailure(_) => NgSetupFailure::MESSAGE_TYPE,
            Self::InitialUeMessage(_) => InitialUeMessage::MESSAGE_TYPE,
            Self::UplinkNasTransport(_) => UplinkNasTransport::MESSAGE_TYPE,
            Self::DownlinkNasTransport(_) => DownlinkNasTransport::MESSAGE_TYPE,
            Self::UeContextReleaseRequest(_) => UeContextReleaseRequest::MESSAGE_TYPE,
            Self::UeContextReleaseCommand(_) => UeContextReleaseCommand::MESSAGE_TYPE,
            Self::UeContextReleaseComplete(_) => UeContextReleaseComplete::MESSAGE_TYPE,
            Self::Other(m) => m.message_type,
        }
    }
}
