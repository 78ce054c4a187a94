//! UE Capability Transfer Procedure

use crate::codec::{RrcIeSet, RrcIeWriter, RrcMessageBody, RrcResult};
use crate::enums::RrcMessageType;
use crate::iei;

/// RAT type requested in the enquiry
pub const RAT_TYPE_NR: u8 = 0x00;

/// Simplified NR capability container reported by simulated UEs
pub const DEFAULT_NR_CAPABILITY: [u8; 9] = [0x40, 0x08, 0x0F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

/// UECapabilityEnquiry (gNB to UE)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UeCapabilityEnquiry {
    pub rat_types: Vec<u8>,
}

impl Default for UeCapabilityEnquiry {
    fn default() -> Self {
        Self {
            rat_types: vec![RAT_TYPE_NR],
        }
    }
}

impl RrcMessageBody for UeCapabilityEnquiry {
    const MESSAGE_TYPE: RrcMessageType = RrcMessageType::UeCapabilityEnquiry;

    fn encode_payload(&self) -> RrcResult<Vec<u8>> {
        let mut w = RrcIeWriter::new();
        w.put(iei::UE_CAPABILITY_RAT_REQUEST, &self.rat_types)?;
        Ok(w.finish())
    }

    fn decode_payload(payload: &[u8]) -> RrcResult<Self> {
        let ies = RrcIeSet::parse(payload)?;
        Ok(Self {
            rat_types: ies.get_vec(iei::UE_CAPABILITY_RAT_REQUEST).unwrap_or_default(),
        })
    }
}

/// UECapabilityInformation (UE to gNB)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UeCapabilityInformation {
    pub nr_capability: Option<Vec<u8>>,
}

impl Default for UeCapabilityInformation {
    fn default() -> Self {
        Self {
            nr_capability: Some(DEFAULT_NR_CAPABILITY.to_vec()),
        }
    }
}

impl RrcMessageBody for UeCapabilityInformation {
    const MESSAGE_TYPE: RrcMessageType = RrcMessageType::UeCapabilityInformation;

    fn encode_payload(&self) -> RrcResult<Vec<u8>> {
        let mut w = RrcIeWriter::new();
        w.put_opt(iei::UE_CAPABILITY_RAT_CONTAINER, self.nr_capability.as_deref())?;
        Ok(w.finish())
    }

    fn decode_payload(payload: &[u8]) -> RrcResult<Self> {
        let ies = RrcIeSet::parse(payload)?;
        Ok(Self {
            nr_capability: ies.get_vec(iei::UE_CAPABILITY_RAT_CONTAINER),
        })
    }
}
