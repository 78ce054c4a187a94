//! RRC Reconfiguration Procedure

use crate::codec::{RrcIeSet, RrcIeWriter, RrcMessageBody, RrcResult};
use crate::enums::RrcMessageType;
use crate::iei;

/// RRCReconfiguration (gNB to UE)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RrcReconfiguration {
    pub radio_bearer_config: Option<Vec<u8>>,
    pub meas_config: Option<Vec<u8>>,
    /// NAS message piggybacked on the reconfiguration
    pub dedicated_nas_message: Option<Vec<u8>>,
}

impl RrcMessageBody for RrcReconfiguration {
    const MESSAGE_TYPE: RrcMessageType = RrcMessageType::Reconfiguration;

    fn encode_payload(&self) -> RrcResult<Vec<u8>> {
        let mut w = RrcIeWriter::new();
        w.put_opt(iei::RADIO_BEARER_CONFIG, self.radio_bearer_config.as_deref())?;
        w.put_opt(iei::MEAS_CONFIG, self.meas_config.as_deref())?;
        w.put_opt(iei::DEDICATED_NAS_MESSAGE, self.dedicated_nas_message.as_deref())?;
        Ok(w.finish())
    }

    fn decode_payload(payload: &[u8]) -> RrcResult<Self> {
        let ies = RrcIeSet::parse(payload)?;
        Ok(Self {
            radio_bearer_config: ies.get_vec(iei::RADIO_BEARER_CONFIG),
            meas_config: ies.get_vec(iei::MEAS_CONFIG),
            dedicated_nas_message: ies.get_vec(iei::DEDICATED_NAS_MESSAGE),
        })
    }
}

/// RRCReconfigurationComplete (UE to gNB)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RrcReconfigurationComplete;

impl RrcMessageBody for RrcReconfigurationComplete {
    const MESSAGE_TYPE: RrcMessageType = RrcMessageType::ReconfigurationComplete;

    fn encode_payload(&self) -> RrcResult<Vec<u8>> {
        Ok(Vec::new())
    }

    fn decode_payload(_payload: &[u8]) -> RrcResult<Self> {
        Ok(Self)
    }
}
