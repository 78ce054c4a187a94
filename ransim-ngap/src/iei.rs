//! NGAP protocol IE identifiers (3GPP TS 38.413 section 9.4.7)

pub const AMF_NAME: u16 = 1;
pub const AMF_UE_NGAP_ID: u16 = 10;
pub const CAUSE: u16 = 15;
pub const DEFAULT_PAGING_DRX: u16 = 21;
pub const GLOBAL_RAN_NODE_ID: u16 = 27;
pub const NAS_PDU: u16 = 38;
pub const PLMN_SUPPORT_LIST: u16 = 80;
pub const RAN_NODE_NAME: u16 = 82;
pub const RAN_UE_NGAP_ID: u16 = 85;
pub const RELATIVE_AMF_CAPACITY: u16 = 86;
pub const RRC_ESTABLISHMENT_CAUSE: u16 = 90;
pub const SERVED_GUAMI_LIST: u16 = 96;
pub const SUPPORTED_TA_LIST: u16 = 102;
pub const TIME_TO_WAIT: u16 = 107;
pub const UE_NGAP_IDS: u16 = 114;
pub const USER_LOCATION_INFORMATION: u16 = 121;
