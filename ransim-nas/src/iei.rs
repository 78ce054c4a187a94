//! Information element tags
//!
//! Tags are unique across all messages so that a decoder never has to know
//! the message type to name an IE.

// 5GMM registration and mobility
pub const REGISTRATION_TYPE: u8 = 0x0E;
pub const DEREGISTRATION_TYPE: u8 = 0x0F;
pub const MM_CAPABILITY: u8 = 0x10;
pub const UE_SECURITY_CAPABILITY: u8 = 0x2E;
pub const MOBILE_IDENTITY: u8 = 0x77;
pub const REQUESTED_NSSAI: u8 = 0x2F;
pub const REQUESTED_DRX: u8 = 0x51;
pub const TAI_LIST: u8 = 0x54;
pub const ALLOWED_NSSAI: u8 = 0x15;
pub const CONFIGURED_NSSAI: u8 = 0x31;
pub const MM_CAUSE: u8 = 0x58;
pub const T3512_VALUE: u8 = 0x5E;

// Authentication
pub const NGKSI: u8 = 0x0D;
pub const ABBA: u8 = 0x38;
pub const RAND: u8 = 0x21;
pub const AUTN: u8 = 0x20;
pub const AUTH_RESPONSE_PARAMETER: u8 = 0x2D;
pub const AUTH_FAILURE_PARAMETER: u8 = 0x30;

// Security mode
pub const SELECTED_ALGORITHMS: u8 = 0x4B;
pub const REPLAYED_UE_SECURITY_CAPABILITY: u8 = 0x4C;
pub const NAS_MESSAGE_CONTAINER: u8 = 0x71;

// 5GSM
pub const PDU_SESSION_TYPE: u8 = 0x09;
pub const REQUEST_TYPE: u8 = 0x08;
pub const S_NSSAI: u8 = 0x39;
pub const DNN: u8 = 0x25;
pub const PDU_SESSION_ID: u8 = 0x12;
pub const QOS_RULES: u8 = 0x57;
pub const SESSION_AMBR: u8 = 0x2A;
pub const PDU_ADDRESS: u8 = 0x29;
pub const SM_CAUSE: u8 = 0x59;

// NAS transport
pub const PAYLOAD_CONTAINER: u8 = 0x7B;
pub const PAYLOAD_CONTAINER_TYPE: u8 = 0x1C;
