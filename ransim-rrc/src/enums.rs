//! RRC enumerations

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// RRC message type, the second octet of every RRC message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RrcMessageType {
    // UE -> gNB
    SetupRequest = 0x01,
    ReestablishmentRequest = 0x08,
    SetupComplete = 0x09,
    ReestablishmentComplete = 0x0B,
    UlInformationTransfer = 0x0C,
    SecurityModeComplete = 0x0D,
    SecurityModeFailure = 0x0E,
    UeCapabilityInformation = 0x10,
    CounterCheckResponse = 0x13,
    UeAssistanceInformation = 0x17,
    ReconfigurationComplete = 0x1B,

    // gNB -> UE
    Setup = 0x02,
    Reconfiguration = 0x03,
    Sib1 = 0x05,
    Release = 0x06,
    DlInformationTransfer = 0x0F,
    UeCapabilityEnquiry = 0x12,
    CounterCheck = 0x14,
}

impl RrcMessageType {
    /// Display name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            RrcMessageType::SetupRequest => "RRCSetupRequest",
            RrcMessageType::ReestablishmentRequest => "RRCReestablishmentRequest",
            RrcMessageType::SetupComplete => "RRCSetupComplete",
            RrcMessageType::ReestablishmentComplete => "RRCReestablishmentComplete",
            RrcMessageType::UlInformationTransfer => "ULInformationTransfer",
            RrcMessageType::SecurityModeComplete => "SecurityModeComplete",
            RrcMessageType::SecurityModeFailure => "SecurityModeFailure",
            RrcMessageType::UeCapabilityInformation => "UECapabilityInformation",
            RrcMessageType::CounterCheckResponse => "CounterCheckResponse",
            RrcMessageType::UeAssistanceInformation => "UEAssistanceInformation",
            RrcMessageType::ReconfigurationComplete => "RRCReconfigurationComplete",
            RrcMessageType::Setup => "RRCSetup",
            RrcMessageType::Reconfiguration => "RRCReconfiguration",
            RrcMessageType::Sib1 => "SIB1",
            RrcMessageType::Release => "RRCRelease",
            RrcMessageType::DlInformationTransfer => "DLInformationTransfer",
            RrcMessageType::UeCapabilityEnquiry => "UECapabilityEnquiry",
            RrcMessageType::CounterCheck => "CounterCheck",
        }
    }
}

/// Establishment cause for RRC Setup Request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum EstablishmentCause {
    Emergency = 0,
    HighPriorityAccess = 1,
    MtAccess = 2,
    #[default]
    MoSignalling = 3,
    MoData = 4,
    MoVoiceCall = 5,
    MoVideoCall = 6,
    MoSms = 7,
    MmtelVoice = 8,
    MmtelVideo = 9,
    MoImsSignalling = 10,
}

/// RRC Release cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ReleaseCause {
    Congestion = 0,
    #[default]
    Normal = 1,
}
