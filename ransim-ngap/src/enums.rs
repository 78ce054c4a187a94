//! NGAP enumerations

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// NGAP message type, the first octet of every NGAP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum NgapMessageType {
    NgSetupRequest = 0x00,
    NgSetupResponse = 0x01,
    NgSetupFailure = 0x02,
    InitialUeMessage = 0x04,
    UplinkNasTransport = 0x06,
    DownlinkNasTransport = 0x07,
    UeContextReleaseRequest = 0x08,
    UeContextReleaseCommand = 0x09,
    UeContextReleaseComplete = 0x0A,
    UeContextModificationRequest = 0x0B,
    UeContextModificationResponse = 0x0C,
    UeContextModificationFailure = 0x0D,
    UeContextSetupRequest = 0x0E,
    UeContextSetupResponse = 0x0F,
    UeContextSetupFailure = 0x10,
    PduSessionResourceSetupRequest = 0x12,
    PduSessionResourceSetupResponse = 0x13,
    PduSessionResourceModifyRequest = 0x15,
    PduSessionResourceModifyResponse = 0x16,
    PduSessionResourceReleaseCommand = 0x19,
    PduSessionResourceReleaseRequest = 0x1A,
    PduSessionResourceReleaseComplete = 0x1B,
}

impl NgapMessageType {
    /// Display name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            NgapMessageType::NgSetupRequest => "NGSetupRequest",
            NgapMessageType::NgSetupResponse => "NGSetupResponse",
            NgapMessageType::NgSetupFailure => "NGSetupFailure",
            NgapMessageType::InitialUeMessage => "InitialUEMessage",
            NgapMessageType::UplinkNasTransport => "UplinkNASTransport",
            NgapMessageType::DownlinkNasTransport => "DownlinkNASTransport",
            NgapMessageType::UeContextReleaseRequest => "UEContextReleaseRequest",
            NgapMessageType::UeContextReleaseCommand => "UEContextReleaseCommand",
            NgapMessageType::UeContextReleaseComplete => "UEContextReleaseComplete",
            NgapMessageType::UeContextModificationRequest => "UEContextModificationRequest",
            NgapMessageType::UeContextModificationResponse => "UEContextModificationResponse",
            NgapMessageType::UeContextModificationFailure => "UEContextModificationFailure",
            NgapMessageType::UeContextSetupRequest => "InitialContextSetupRequest",
            NgapMessageType::UeContextSetupResponse => "InitialContextSetupResponse",
            NgapMessageType::UeContextSetupFailure => "InitialContextSetupFailure",
            NgapMessageType::PduSessionResourceSetupRequest => "PDUSessionResourceSetupRequest",
            NgapMessageType::PduSessionResourceSetupResponse => "PDUSessionResourceSetupResponse",
            NgapMessageType::PduSessionResourceModifyRequest => "PDUSessionResourceModifyRequest",
            NgapMessageType::PduSessionResourceModifyResponse => "PDUSessionResourceModifyResponse",
            NgapMessageType::PduSessionResourceReleaseCommand => "PDUSessionResourceReleaseCommand",
            NgapMessageType::PduSessionResourceReleaseRequest => "PDUSessionResourceReleaseRequest",
            NgapMessageType::PduSessionResourceReleaseComplete => "PDUSessionResourceReleaseComplete",
        }
    }

    /// True for the message types this crate can encode and decode.
    pub fn has_codec(&self) -> bool {
        matches!(
            self,
            NgapMessageType::NgSetupRequest
                | NgapMessageType::NgSetupResponse
                | NgapMessageType::NgSetupFailure
                | NgapMessageType::InitialUeMessage
                | NgapMessageType::UplinkNasTransport
                | NgapMessageType::DownlinkNasTransport
                | NgapMessageType::UeContextReleaseRequest
                | NgapMessageType::UeContextReleaseCommand
                | NgapMessageType::UeContextReleaseComplete
        )
    }
}

/// Paging DRX values as defined in 3GPP TS 38.413
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PagingDrx {
    /// 32 radio frames
    V32 = 0,
    /// 64 radio frames
    #[default]
    V64 = 1,
    /// 128 radio frames
    V128 = 2,
    /// 256 radio frames
    V256 = 3,
}

impl PagingDrx {
    /// Cycle length in radio frames.
    pub fn radio_frames(&self) -> u16 {
        match self {
            PagingDrx::V32 => 32,
            PagingDrx::V64 => 64,
            PagingDrx::V128 => 128,
            PagingDrx::V256 => 256,
        }
    }
}

/// Time to wait before retrying NG Setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TimeToWait {
    V1s = 0,
    V2s = 1,
    V5s = 2,
    V10s = 3,
    V20s = 4,
    V60s = 5,
}

impl TimeToWait {
    pub fn seconds(&self) -> u64 {
        match self {
            TimeToWait::V1s => 1,
            TimeToWait::V2s => 2,
            TimeToWait::V5s => 5,
            TimeToWait::V10s => 10,
            TimeToWait::V20s => 20,
            TimeToWait::V60s => 60,
        }
    }
}

/// RRC establishment cause carried in the Initial UE Message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RrcEstablishmentCause {
    Emergency = 0,
    HighPriorityAccess = 1,
    MtAccess = 2,
    #[default]
    MoSignalling = 3,
    MoData = 4,
    MoVoiceCall = 5,
    MoVideoCall = 6,
    MoSms = 7,
    MpsPriorityAccess = 8,
    McsPriorityAccess = 9,
    NotAvailable = 10,
}

/// Cause group, the first octet of an encoded Cause IE
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum CauseGroup {
    RadioNetwork = 0,
    Transport = 1,
    Nas = 2,
    Protocol = 3,
    Misc = 4,
}

/// NGAP Cause: a group and the value within that group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cause {
    pub group: CauseGroup,
    pub value: u8,
}

impl Cause {
    pub const RADIO_NETWORK_UNSPECIFIED: Cause = Cause::new(CauseGroup::RadioNetwork, 0);
    pub const RADIO_NETWORK_USER_INACTIVITY: Cause = Cause::new(CauseGroup::RadioNetwork, 20);
    pub const RADIO_NETWORK_CONNECTION_WITH_UE_LOST: Cause = Cause::new(CauseGroup::RadioNetwork, 21);
    pub const TRANSPORT_RESOURCE_UNAVAILABLE: Cause = Cause::new(CauseGroup::Transport, 0);
    pub const NAS_NORMAL_RELEASE: Cause = Cause::new(CauseGroup::Nas, 0);
    pub const NAS_DEREGISTER: Cause = Cause::new(CauseGroup::Nas, 2);
    pub const PROTOCOL_UNSPECIFIED: Cause = Cause::new(CauseGroup::Protocol, 6);
    pub const MISC_UNKNOWN_PLMN: Cause = Cause::new(CauseGroup::Misc, 4);
    pub const MISC_UNSPECIFIED: Cause = Cause::new(CauseGroup::Misc, 5);

    pub const fn new(group: CauseGroup, value: u8) -> Self {
        Self { group, value }
    }
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let group = match self.group {
            CauseGroup::RadioNetwork => "radioNetwork",
            CauseGroup::Transport => "transport",
            CauseGroup::Nas => "nas",
            CauseGroup::Protocol => "protocol",
            CauseGroup::Misc => "misc",
        };
        write!(f, "{group}/{}", self.value)
    }
}
