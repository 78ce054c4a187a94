//! RRC Setup Procedure
//!
//! The procedure consists of three messages:
//! 1. `RRCSetupRequest` - UE → gNB: Initial request to establish RRC connection
//! 2. `RRCSetup` - gNB → UE: Network response with radio bearer configuration
//! 3. `RRCSetupComplete` - UE → gNB: Confirmation with NAS message

use rand::Rng;

use crate::codec::{RrcError, RrcIeSet, RrcIeWriter, RrcMessageBody, RrcResult};
use crate::enums::{EstablishmentCause, RrcMessageType};
use crate::iei;

/// Mask of a 39-bit identity
pub const UE_IDENTITY_MASK: u64 = 0x7F_FFFF_FFFF;

/// Top bit of the 5-octet identity field marks a 5G-S-TMSI part
const TMSI_FLAG: u8 = 0x80;

/// UE Identity for RRC Setup Request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UeIdentity {
    /// 5G-S-TMSI Part 1 (39 bits)
    Ng5gSTmsiPart1(u64),
    /// Random value (39 bits)
    RandomValue(u64),
}

impl UeIdentity {
    /// Draws a random 39-bit identity.
    pub fn random() -> Self {
        UeIdentity::RandomValue(rand::thread_rng().gen::<u64>() & UE_IDENTITY_MASK)
    }

    pub fn value(&self) -> u64 {
        match self {
            UeIdentity::Ng5gSTmsiPart1(v) | UeIdentity::RandomValue(v) => v & UE_IDENTITY_MASK,
        }
    }

    fn encode(&self) -> [u8; 5] {
        let bytes = self.value().to_be_bytes();
        let mut out = [bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]];
        if matches!(self, UeIdentity::Ng5gSTmsiPart1(_)) {
            out[0] |= TMSI_FLAG;
        }
        out
    }

    fn decode(bytes: &[u8; 5]) -> Self {
        let value = u64::from_be_bytes([0, 0, 0, bytes[0], bytes[1], bytes[2], bytes[3], bytes[4]])
            & UE_IDENTITY_MASK;
        if bytes[0] & TMSI_FLAG != 0 {
            UeIdentity::Ng5gSTmsiPart1(value)
        } else {
            UeIdentity::RandomValue(value)
        }
    }
}

// ============================================================================
// RRC Setup Request
// ============================================================================

/// RRCSetupRequest: `spare(1) || cause(1, low nibble) || ue-Identity(5)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrcSetupRequest {
    pub ue_identity: UeIdentity,
    pub establishment_cause: EstablishmentCause,
}

impl RrcSetupRequest {
    pub fn new(ue_identity: UeIdentity, establishment_cause: EstablishmentCause) -> Self {
        Self {
            ue_identity,
            establishment_cause,
        }
    }
}

impl RrcMessageBody for RrcSetupRequest {
    const MESSAGE_TYPE: RrcMessageType = RrcMessageType::SetupRequest;

    fn encode_payload(&self) -> RrcResult<Vec<u8>> {
        let mut payload = Vec::with_capacity(7);
        payload.push(0x00);
        payload.push(u8::from(self.establishment_cause) & 0x0F);
        payload.extend_from_slice(&self.ue_identity.encode());
        Ok(payload)
    }

    fn decode_payload(payload: &[u8]) -> RrcResult<Self> {
        let Some(fixed) = payload.get(..7) else {
            return Err(RrcError::BufferTooShort {
                expected: 7,
                actual: payload.len(),
            });
        };
        let establishment_cause = EstablishmentCause::try_from(fixed[1] & 0x0F).map_err(|_| {
            RrcError::InvalidFieldValue(format!("Unknown establishment cause: {}", fixed[1] & 0x0F))
        })?;
        let identity: [u8; 5] = [fixed[2], fixed[3], fixed[4], fixed[5], fixed[6]];
        Ok(Self {
            ue_identity: UeIdentity::decode(&identity),
            establishment_cause,
        })
    }
}

// ============================================================================
// RRC Setup
// ============================================================================

/// RRCSetup carrying the signalling radio bearer and cell group configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RrcSetup {
    pub radio_bearer_config: Option<Vec<u8>>,
    pub master_cell_group: Option<Vec<u8>>,
}

impl RrcSetup {
    /// SRB1 with an empty DRB list and a minimal serving cell configuration.
    pub fn with_default_config() -> Self {
        Self {
            radio_bearer_config: Some(vec![0x00]),
            master_cell_group: Some(vec![0x00, 0x04, 0x00, 0x40, 0x00, 0x02, 0x02, 0x00]),
        }
    }
}

impl RrcMessageBody for RrcSetup {
    const MESSAGE_TYPE: RrcMessageType = RrcMessageType::Setup;

    fn encode_payload(&self) -> RrcResult<Vec<u8>> {
        let mut w = RrcIeWriter::new();
        w.put_opt(iei::RADIO_BEARER_CONFIG, self.radio_bearer_config.as_deref())?;
        w.put_opt(iei::MASTER_CELL_GROUP, self.master_cell_group.as_deref())?;
        Ok(w.finish())
    }

    fn decode_payload(payload: &[u8]) -> RrcResult<Self> {
        let ies = RrcIeSet::parse(payload)?;
        Ok(Self {
            radio_bearer_config: ies.get_vec(iei::RADIO_BEARER_CONFIG),
            master_cell_group: ies.get_vec(iei::MASTER_CELL_GROUP),
        })
    }
}

// ============================================================================
// RRC Setup Complete
// ============================================================================

/// RRCSetupComplete carrying the initial NAS message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrcSetupComplete {
    /// Index into the SIB1 PLMN list, starting at 1
    pub selected_plmn_id: u8,
    pub dedicated_nas_message: Option<Vec<u8>>,
}

impl RrcSetupComplete {
    pub fn with_nas(dedicated_nas_message: Vec<u8>) -> Self {
        Self {
            selected_plmn_id: 1,
            dedicated_nas_message: Some(dedicated_nas_message),
        }
    }
}

impl RrcMessageBody for RrcSetupComplete {
    const MESSAGE_TYPE: RrcMessageType = RrcMessageType::SetupComplete;

    fn encode_payload(&self) -> RrcResult<Vec<u8>> {
        let mut w = RrcIeWriter::new();
        w.put(iei::SELECTED_PLMN_IDENTITY, &[self.selected_plmn_id])?;
        w.put_opt(iei::DEDICATED_NAS_MESSAGE, self.dedicated_nas_message.as_deref())?;
        Ok(w.finish())
    }

    fn decode_payload(payload: &[u8]) -> RrcResult<Self> {
        let ies = RrcIeSet::parse(payload)?;
        let selected_plmn_id = match ies.require(iei::SELECTED_PLMN_IDENTITY, "selectedPLMN-Identity")? {
            [id] => *id,
            other => {
                return Err(RrcError::InvalidFieldValue(format!(
                    "selectedPLMN-Identity length {}",
                    other.len()
                )))
            }
        };
        Ok(Self {
            selected_plmn_id,
            dedicated_nas_message: ies.get_vec(iei::DEDICATED_NAS_MESSAGE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_request_layout() {
        let req = RrcSetupRequest::new(
            UeIdentity::RandomValue(0x12_3456_789A),
            EstablishmentCause::MoSignalling,
        );
        let bytes = req.encode(0).unwrap();
        assert_eq!(bytes, vec![0x01, 0x01, 0x00, 0x03, 0x12, 0x34, 0x56, 0x78, 0x9A]);
        let (tid, decoded) = RrcSetupRequest::decode(&bytes).unwrap();
        assert_eq!(tid, 0);
        assert_eq!(decoded, req);
    }

    #[test]
    fn test_setup_request_tmsi_identity() {
        let req = RrcSetupRequest::new(UeIdentity::Ng5gSTmsiPart1(0x7F_FFFF_FFFF), EstablishmentCause::MoData);
        let bytes = req.encode(2).unwrap();
        assert_eq!(bytes[0], 0x09);
        assert_eq!(bytes[4], 0xFF);
        assert_eq!(RrcSetupRequest::decode(&bytes).unwrap().1, req);
    }

    #[test]
    fn test_random_identity_is_39_bits() {
        for _ in 0..32 {
            assert!(UeIdentity::random().value() <= UE_IDENTITY_MASK);
        }
    }

    #[test]
    fn test_setup_request_truncated() {
        assert!(RrcSetupRequest::decode(&[0x01, 0x01, 0x00, 0x03]).is_err());
    }

    #[test]
    fn test_setup_round_trip() {
        let setup = RrcSetup::with_default_config();
        let bytes = setup.encode(1).unwrap();
        assert_eq!(bytes[1], 0x02);
        assert_eq!(RrcSetup::decode(&bytes).unwrap(), (1, setup));
        assert_eq!(RrcSetup::default().encode(0).unwrap(), vec![0x01, 0x02]);
    }

    #[test]
    fn test_setup_complete_carries_nas() {
        let complete = RrcSetupComplete::with_nas(vec![0x00, 0x41, 0x0E, 0x01, 0x01]);
        let bytes = complete.encode(0).unwrap();
        let (_, decoded) = RrcSetupComplete::decode(&bytes).unwrap();
        assert_eq!(decoded.dedicated_nas_message.as_ref().map(|nas| nas[1]), Some(0x41));
        assert_eq!(decoded, complete);
    }

    #[test]
    fn test_wrong_message_type() {
        let bytes = RrcSetup::default().encode(0).unwrap();
        assert!(matches!(
            RrcSetupComplete::decode(&bytes),
            Err(RrcError::UnexpectedMessageType { .. })
        ));
    }
}
