//! System Information
//!
//! MIB is broadcast on BCCH-BCH and contains essential system information for initial access.
//! SIB1 is broadcast on BCCH-DL-SCH and contains cell access and selection information.
//!
//! The MIB is packed into 24 bits, most significant first:
//!
//! | bits | field                                  |
//! |------|----------------------------------------|
//! | 1    | message choice (0 = MIB)               |
//! | 6    | systemFrameNumber (6 MSBs of the SFN)  |
//! | 1    | subCarrierSpacingCommon                |
//! | 4    | ssb-SubcarrierOffset                   |
//! | 1    | dmrs-TypeA-Position                    |
//! | 8    | pdcch-ConfigSIB1 (CORESET#0, SS#0)     |
//! | 1    | cellBarred (0 = barred)                |
//! | 1    | intraFreqReselection (0 = allowed)     |
//! | 1    | spare                                  |
//!
//! The 4 LSBs of the SFN travel in the PBCH transport block, not the MIB.

use ransim_common::Plmn;

use crate::codec::{RrcError, RrcIeSet, RrcIeWriter, RrcMessageBody, RrcResult};
use crate::enums::RrcMessageType;
use crate::iei;

/// Encoded MIB size in bytes
pub const MIB_SIZE: usize = 3;

// ============================================================================
// MIB (Master Information Block)
// ============================================================================

/// Subcarrier spacing for common control channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubCarrierSpacingCommon {
    /// 15 kHz or 60 kHz (FR1 or FR2)
    #[default]
    Scs15Or60,
    /// 30 kHz or 120 kHz (FR1 or FR2)
    Scs30Or120,
}

/// DMRS Type-A position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DmrsTypeAPosition {
    #[default]
    Pos2,
    Pos3,
}

/// Cell barred status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellBarredStatus {
    Barred,
    #[default]
    NotBarred,
}

/// Intra-frequency reselection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntraFreqReselection {
    #[default]
    Allowed,
    NotAllowed,
}

/// PDCCH configuration for SIB1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PdcchConfigSib1 {
    /// CORESET zero configuration (0-15)
    pub coreset_zero: u8,
    /// Search space zero configuration (0-15)
    pub search_space_zero: u8,
}

/// Master Information Block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mib {
    /// System Frame Number MSBs (6 bits, 0-63)
    pub system_frame_number: u8,
    pub sub_carrier_spacing_common: SubCarrierSpacingCommon,
    /// SSB subcarrier offset (0-15)
    pub ssb_subcarrier_offset: u8,
    pub dmrs_type_a_position: DmrsTypeAPosition,
    pub pdcch_config_sib1: PdcchConfigSib1,
    pub cell_barred: CellBarredStatus,
    pub intra_freq_reselection: IntraFreqReselection,
}

impl Mib {
    /// MIB for a full 10-bit SFN; the 4 LSBs are dropped.
    pub fn from_sfn(sfn: u16) -> Self {
        Self {
            system_frame_number: ((sfn & 0x3FF) >> 4) as u8,
            ..Default::default()
        }
    }

    pub fn encode(&self) -> RrcResult<[u8; MIB_SIZE]> {
        if self.system_frame_number > 63 {
            return Err(RrcError::InvalidFieldValue(
                "System Frame Number must be 0-63 (6 bits)".to_string(),
            ));
        }
        if self.ssb_subcarrier_offset > 15 {
            return Err(RrcError::InvalidFieldValue("SSB Subcarrier Offset must be 0-15".to_string()));
        }
        if self.pdcch_config_sib1.coreset_zero > 15 || self.pdcch_config_sib1.search_space_zero > 15 {
            return Err(RrcError::InvalidFieldValue(
                "CORESET Zero and Search Space Zero must be 0-15".to_string(),
            ));
        }

        let mut bits: u32 = 0;
        bits |= u32::from(self.system_frame_number) << 17;
        bits |= u32::from(self.sub_carrier_spacing_common == SubCarrierSpacingCommon::Scs30Or120) << 16;
        bits |= u32::from(self.ssb_subcarrier_offset) << 12;
        bits |= u32::from(self.dmrs_type_a_position == DmrsTypeAPosition::Pos3) << 11;
        bits |= u32::from(self.pdcch_config_sib1.coreset_zero) << 7;
        bits |= u32::from(self.pdcch_config_sib1.search_space_zero) << 3;
        bits |= u32::from(self.cell_barred == CellBarredStatus::NotBarred) << 2;
        bits |= u32::from(self.intra_freq_reselection == IntraFreqReselection::NotAllowed) << 1;

        let bytes = bits.to_be_bytes();
        Ok([bytes[1], bytes[2], bytes[3]])
    }

    pub fn decode(bytes: &[u8]) -> RrcResult<Self> {
        let Some(&[a, b, c]) = bytes.get(..MIB_SIZE) else {
            return Err(RrcError::BufferTooShort {
                expected: MIB_SIZE,
                actual: bytes.len(),
            });
        };
        let bits = u32::from_be_bytes([0, a, b, c]);
        if bits & 0x80_0000 != 0 {
            return Err(RrcError::InvalidFieldValue("not a MIB".to_string()));
        }
        let bit = |n: u32| (bits >> n) & 1 == 1;
        Ok(Self {
            system_frame_number: ((bits >> 17) & 0x3F) as u8,
            sub_carrier_spacing_common: if bit(16) {
                SubCarrierSpacingCommon::Scs30Or120
            } else {
                SubCarrierSpacingCommon::Scs15Or60
            },
            ssb_subcarrier_offset: ((bits >> 12) & 0x0F) as u8,
            dmrs_type_a_position: if bit(11) {
                DmrsTypeAPosition::Pos3
            } else {
                DmrsTypeAPosition::Pos2
            },
            pdcch_config_sib1: PdcchConfigSib1 {
                coreset_zero: ((bits >> 7) & 0x0F) as u8,
                search_space_zero: ((bits >> 3) & 0x0F) as u8,
            },
            cell_barred: if bit(2) {
                CellBarredStatus::NotBarred
            } else {
                CellBarredStatus::Barred
            },
            intra_freq_reselection: if bit(1) {
                IntraFreqReselection::NotAllowed
            } else {
                IntraFreqReselection::Allowed
            },
        })
    }
}

// ============================================================================
// SIB1 (System Information Block Type 1)
// ============================================================================

/// Cell access flags in the CELL_ACCESS octet
const CELL_ACCESS_BARRED: u8 = 0x02;
const CELL_ACCESS_INTRA_FREQ_RESELECTION: u8 = 0x01;

/// System Information Block Type 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sib1 {
    pub plmn_list: Vec<Plmn>,
    /// Tracking area code (24 bits)
    pub tac: u32,
    /// NR cell identity (36 bits)
    pub cell_identity: u64,
    pub cell_barred: bool,
    pub intra_freq_reselection: bool,
    /// SSB periodicity of the serving cell in ms
    pub ssb_periodicity: u8,
}

impl Sib1 {
    pub fn new(plmn: Plmn, tac: u32, cell_identity: u64) -> Self {
        Self {
            plmn_list: vec![plmn],
            tac: tac & 0x00FF_FFFF,
            cell_identity: cell_identity & 0xF_FFFF_FFFF,
            cell_barred: false,
            intra_freq_reselection: true,
            ssb_periodicity: 5,
        }
    }
}

impl RrcMessageBody for Sib1 {
    const MESSAGE_TYPE: RrcMessageType = RrcMessageType::Sib1;

    fn encode_payload(&self) -> RrcResult<Vec<u8>> {
        let plmns: Vec<u8> = self.plmn_list.iter().flat_map(|plmn| plmn.encode()).collect();
        let mut access = 0u8;
        if self.cell_barred {
            access |= CELL_ACCESS_BARRED;
        }
        if self.intra_freq_reselection {
            access |= CELL_ACCESS_INTRA_FREQ_RESELECTION;
        }

        let mut w = RrcIeWriter::new();
        w.put(iei::PLMN_IDENTITY_LIST, &plmns)?;
        w.put(iei::TRACKING_AREA_CODE, &self.tac.to_be_bytes()[1..])?;
        w.put(iei::CELL_IDENTITY, &self.cell_identity.to_be_bytes()[3..])?;
        w.put(iei::CELL_ACCESS, &[access])?;
        w.put(iei::SSB_PERIODICITY, &[self.ssb_periodicity])?;
        Ok(w.finish())
    }

    fn decode_payload(payload: &[u8]) -> RrcResult<Self> {
        let ies = RrcIeSet::parse(payload)?;

        let plmns = ies.require(iei::PLMN_IDENTITY_LIST, "plmn-IdentityList")?;
        if plmns.len() % 3 != 0 {
            return Err(RrcError::InvalidFieldValue(format!("PLMN list length {}", plmns.len())));
        }
        let plmn_list = plmns
            .chunks_exact(3)
            .map(|chunk| Plmn::decode([chunk[0], chunk[1], chunk[2]]))
            .collect();

        let tac = match ies.require(iei::TRACKING_AREA_CODE, "trackingAreaCode")? {
            [a, b, c] => u32::from_be_bytes([0, *a, *b, *c]),
            other => return Err(RrcError::InvalidFieldValue(format!("TAC length {}", other.len()))),
        };
        let cell_identity = match ies.require(iei::CELL_IDENTITY, "cellIdentity")? {
            [a, b, c, d, e] => u64::from_be_bytes([0, 0, 0, *a, *b, *c, *d, *e]) & 0xF_FFFF_FFFF,
            other => {
                return Err(RrcError::InvalidFieldValue(format!(
                    "cell identity length {}",
                    other.len()
                )))
            }
        };
        let access = ies.get(iei::CELL_ACCESS).and_then(|v| v.first().copied()).unwrap_or(0);
        let ssb_periodicity = ies.get(iei::SSB_PERIODICITY).and_then(|v| v.first().copied()).unwrap_or(5);

        Ok(Self {
            plmn_list,
            tac,
            cell_identity,
            cell_barred: access & CELL_ACCESS_BARRED != 0,
            intra_freq_reselection: access & CELL_ACCESS_INTRA_FREQ_RESELECTION != 0,
            ssb_periodicity,
        })
    }
}
