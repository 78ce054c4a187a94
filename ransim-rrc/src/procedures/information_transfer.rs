//! RRC Information Transfer Procedures
//!
//! These procedures transfer NAS messages between the UE and the network:
//! 1. `DLInformationTransfer` - gNB → UE: Downlink NAS message transfer
//! 2. `ULInformationTransfer` - UE → gNB: Uplink NAS message transfer

use crate::codec::{RrcIeSet, RrcIeWriter, RrcMessageBody, RrcResult};
use crate::enums::RrcMessageType;
use crate::iei;

fn encode_nas(dedicated_nas_message: Option<&[u8]>) -> RrcResult<Vec<u8>> {
    let mut w = RrcIeWriter::new();
    w.put_opt(iei::DEDICATED_NAS_MESSAGE, dedicated_nas_message)?;
    Ok(w.finish())
}

fn decode_nas(payload: &[u8]) -> RrcResult<Option<Vec<u8>>> {
    Ok(RrcIeSet::parse(payload)?.get_vec(iei::DEDICATED_NAS_MESSAGE))
}

// ============================================================================
// DL Information Transfer
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DlInformationTransfer {
    pub dedicated_nas_message: Option<Vec<u8>>,
}

impl DlInformationTransfer {
    pub fn new(nas: Vec<u8>) -> Self {
        Self {
            dedicated_nas_message: Some(nas),
        }
    }
}

impl RrcMessageBody for DlInformationTransfer {
    const MESSAGE_TYPE: RrcMessageType = RrcMessageType::DlInformationTransfer;

    fn encode_payload(&self) -> RrcResult<Vec<u8>> {
        encode_nas(self.dedicated_nas_message.as_deref())
    }

    fn decode_payload(payload: &[u8]) -> RrcResult<Self> {
        Ok(Self {
            dedicated_nas_message: decode_nas(payload)?,
        })
    }
}

// ============================================================================
// UL Information Transfer
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UlInformationTransfer {
    pub dedicated_nas_message: Option<Vec<u8>>,
}

impl UlInformationTransfer {
    pub fn new(nas: Vec<u8>) -> Self {
        Self {
            dedicated_nas_message: Some(nas),
        }
    }
}

impl RrcMessageBody for UlInformationTransfer {
    const MESSAGE_TYPE: RrcMessageType = RrcMessageType::UlInformationTransfer;

    fn encode_payload(&self) -> RrcResult<Vec<u8>> {
        encode_nas(self.dedicated_nas_message.as_deref())
    }

    fn decode_payload(payload: &[u8]) -> RrcResult<Self> {
        Ok(Self {
            dedicated_nas_message: decode_nas(payload)?,
        })
    }
}
