//! RRC information element tags

pub const SELECTED_PLMN_IDENTITY: u8 = 0x01;
pub const REDIRECTED_CARRIER_INFO: u8 = 0x05;
pub const MEAS_CONFIG: u8 = 0x13;
pub const UE_CAPABILITY_RAT_CONTAINER: u8 = 0x1C;
pub const RADIO_BEARER_CONFIG: u8 = 0x1D;
pub const UE_CAPABILITY_RAT_REQUEST: u8 = 0x1E;
pub const MASTER_CELL_GROUP: u8 = 0x24;
pub const DEDICATED_NAS_MESSAGE: u8 = 0x39;

// SIB1
pub const PLMN_IDENTITY_LIST: u8 = 0x40;
pub const TRACKING_AREA_CODE: u8 = 0x41;
pub const CELL_IDENTITY: u8 = 0x42;
pub const CELL_ACCESS: u8 = 0x43;
pub const SSB_PERIODICITY: u8 = 0x44;
