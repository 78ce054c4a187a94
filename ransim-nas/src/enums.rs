//! NAS protocol enumerations
//!
//! Message type values follow 3GPP TS 24.501 where the simplified wire
//! format has an equivalent.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// NAS message type, the second octet of every NAS message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum MessageType {
    // Registration
    RegistrationRequest = 0x41,
    RegistrationAccept = 0x42,
    RegistrationComplete = 0x43,
    RegistrationReject = 0x44,

    // Deregistration
    DeregistrationRequest = 0x45,
    DeregistrationAcceptUeOriginating = 0x46,
    DeregistrationAcceptUeTerminated = 0x47,

    // Service request
    ServiceRequest = 0x48,
    ServiceReject = 0x49,
    ControlPlaneServiceRequest = 0x4C,

    // Authentication
    AuthenticationRequest = 0x56,
    AuthenticationResponse = 0x57,
    AuthenticationReject = 0x58,
    AuthenticationFailure = 0x59,
    AuthenticationResult = 0x5B,

    // Security mode
    SecurityModeCommand = 0x5D,
    SecurityModeComplete = 0x5E,
    SecurityModeReject = 0x5F,

    // NAS transport
    UlNasTransport = 0x67,
    DlNasTransport = 0x68,

    // PDU session
    PduSessionEstablishmentRequest = 0xA1,
    PduSessionEstablishmentAccept = 0xA2,
    PduSessionEstablishmentReject = 0xA3,
    PduSessionReleaseRequest = 0xA5,
    PduSessionReleaseReject = 0xA6,
    PduSessionReleaseComplete = 0xA8,
    PduSessionModificationRequest = 0xA9,
    PduSessionModificationComplete = 0xAA,
    PduSessionModificationCommandReject = 0xAB,
}

impl MessageType {
    /// Returns true for 5GSM (session management) messages.
    pub fn is_session_management(&self) -> bool {
        u8::from(*self) >= 0xA0
    }

    /// Display name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            MessageType::RegistrationRequest => "Registration Request",
            MessageType::RegistrationAccept => "Registration Accept",
            MessageType::RegistrationComplete => "Registration Complete",
            MessageType::RegistrationReject => "Registration Reject",
            MessageType::DeregistrationRequest => "Deregistration Request",
            MessageType::DeregistrationAcceptUeOriginating => "Deregistration Accept",
            MessageType::DeregistrationAcceptUeTerminated => "Deregistration Accept (UE terminated)",
            MessageType::ServiceRequest => "Service Request",
            MessageType::ServiceReject => "Service Reject",
            MessageType::ControlPlaneServiceRequest => "Control Plane Service Request",
            MessageType::AuthenticationRequest => "Authentication Request",
            MessageType::AuthenticationResponse => "Authentication Response",
            MessageType::AuthenticationReject => "Authentication Reject",
            MessageType::AuthenticationFailure => "Authentication Failure",
            MessageType::AuthenticationResult => "Authentication Result",
            MessageType::SecurityModeCommand => "Security Mode Command",
            MessageType::SecurityModeComplete => "Security Mode Complete",
            MessageType::SecurityModeReject => "Security Mode Reject",
            MessageType::UlNasTransport => "UL NAS Transport",
            MessageType::DlNasTransport => "DL NAS Transport",
            MessageType::PduSessionEstablishmentRequest => "PDU Session Establishment Request",
            MessageType::PduSessionEstablishmentAccept => "PDU Session Establishment Accept",
            MessageType::PduSessionEstablishmentReject => "PDU Session Establishment Reject",
            MessageType::PduSessionReleaseRequest => "PDU Session Release Request",
            MessageType::PduSessionReleaseReject => "PDU Session Release Reject",
            MessageType::PduSessionReleaseComplete => "PDU Session Release Complete",
            MessageType::PduSessionModificationRequest => "PDU Session Modification Request",
            MessageType::PduSessionModificationComplete => "PDU Session Modification Complete",
            MessageType::PduSessionModificationCommandReject => {
                "PDU Session Modification Command Reject"
            }
        }
    }
}

/// 5GS registration type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RegistrationType {
    #[default]
    InitialRegistration = 0x01,
    MobilityRegistrationUpdating = 0x02,
    PeriodicRegistrationUpdating = 0x03,
    EmergencyRegistration = 0x04,
}

/// PDU session type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PduSessionType {
    #[default]
    Ipv4 = 0x01,
    Ipv6 = 0x02,
    Ipv4v6 = 0x03,
    Unstructured = 0x04,
    Ethernet = 0x05,
}

/// PDU session request type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RequestType {
    #[default]
    InitialRequest = 0x01,
    ExistingPduSession = 0x02,
    InitialEmergencyRequest = 0x03,
    ExistingEmergencyPduSession = 0x04,
    ModificationRequest = 0x05,
}

/// Payload container type of UL/DL NAS Transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PayloadContainerType {
    #[default]
    N1SmInformation = 0x01,
    Sms = 0x02,
    LppMessage = 0x03,
    SorTransparentContainer = 0x04,
    UePolicyContainer = 0x05,
}

/// 5GMM cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum MmCause {
    ImplicitlyDeregistered = 0x02,
    PlmnNotAllowed = 0x03,
    TrackingAreaNotAllowed = 0x04,
    RoamingNotAllowedInTrackingArea = 0x05,
    NoSuitableCellsInTrackingArea = 0x06,
    CsgNotAuthorized = 0x08,
    ServiceNotAllowed = 0x09,
    TemporarilyNotAuthorized = 0x0A,
    Throttled = 0x0B,
    AuthenticationFailure = 0x14,
    UserAuthenticationFailed = 0x15,
    NetworkAuthenticationFailed = 0x16,
    SynchFailure = 0x17,
    UeSecurityCapabilitiesMismatch = 0x23,
    SecurityModeRejected = 0x24,
    Non5gAuthenticationUnacceptable = 0x26,
    UplinkDataTransfer = 0x27,
}

/// 5GSM cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SmCause {
    InsufficientResources = 0x1A,
    MissingOrUnknownDnn = 0x1B,
    UnknownPduSessionType = 0x1C,
    UserAuthenticationFailed = 0x1D,
    RequestRejectedUnspecified = 0x1E,
    ServiceOptionNotSupported = 0x1F,
    PduSessionIdInUse = 0x20,
    PduSessionContextNotFound = 0x21,
    InvalidPduSessionState = 0x22,
    DnnNotSupported = 0x28,
}
