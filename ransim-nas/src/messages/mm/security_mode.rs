//! Security Mode Control messages

use crate::codec::{decode_enum, CodecResult, IeSet, IeWriter, NasMessageBody};
use crate::enums::{MessageType, MmCause};
use crate::iei;

/// NAS security algorithms selected by the network.
///
/// Encoded in one octet: ciphering in the high nibble, integrity in the low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectedAlgorithms {
    pub ciphering: u8,
    pub integrity: u8,
}

impl SelectedAlgorithms {
    pub fn new(ciphering: u8, integrity: u8) -> Self {
        Self {
            ciphering: ciphering & 0x0F,
            integrity: integrity & 0x0F,
        }
    }

    pub fn encode(&self) -> u8 {
        (self.ciphering << 4) | self.integrity
    }

    pub fn decode(value: u8) -> Self {
        Self::new(value >> 4, value & 0x0F)
    }
}

/// Security Mode Command (network to UE)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityModeCommand {
    pub selected_algorithms: SelectedAlgorithms,
    pub ng_ksi: u8,
    pub replayed_ue_security_capability: Option<Vec<u8>>,
}

impl NasMessageBody for SecurityModeCommand {
    const MESSAGE_TYPE: MessageType = MessageType::SecurityModeCommand;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_u8(iei::SELECTED_ALGORITHMS, self.selected_algorithms.encode())?;
        w.put_u8(iei::NGKSI, self.ng_ksi & 0x07)?;
        w.put_opt(
            iei::REPLAYED_UE_SECURITY_CAPABILITY,
            self.replayed_ue_security_capability.as_deref(),
        )
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            selected_algorithms: SelectedAlgorithms::decode(
                ies.require_u8(iei::SELECTED_ALGORITHMS, "selected NAS security algorithms")?,
            ),
            ng_ksi: ies.require_u8(iei::NGKSI, "ngKSI")? & 0x07,
            replayed_ue_security_capability: ies.get_vec(iei::REPLAYED_UE_SECURITY_CAPABILITY),
        })
    }
}

/// Security Mode Complete (UE to network)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityModeComplete {
    /// Complete initial NAS message, resent under protection
    pub nas_message_container: Option<Vec<u8>>,
}

impl NasMessageBody for SecurityModeComplete {
    const MESSAGE_TYPE: MessageType = MessageType::SecurityModeComplete;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_opt(iei::NAS_MESSAGE_CONTAINER, self.nas_message_container.as_deref())
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            nas_message_container: ies.get_vec(iei::NAS_MESSAGE_CONTAINER),
        })
    }
}

/// Security Mode Reject (UE to network)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityModeReject {
    pub cause: MmCause,
}

impl NasMessageBody for SecurityModeReject {
    const MESSAGE_TYPE: MessageType = MessageType::SecurityModeReject;

    fn encode_ies(&self, w: &mut IeWriter) -> CodecResult<()> {
        w.put_u8(iei::MM_CAUSE, self.cause.into())
    }

    fn decode_ies(ies: &IeSet) -> CodecResult<Self> {
        Ok(Self {
            cause: decode_enum("5GMM cause", ies.require_u8(iei::MM_CAUSE, "5GMM cause")?)?,
        })
    }
}
