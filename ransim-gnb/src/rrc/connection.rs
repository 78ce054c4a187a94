//! RRC Connection Management
//!
//! gNB side of the RRC procedures:
//! - RRC Setup (RRCSetupRequest → RRCSetup → RRCSetupComplete)
//! - RRC Reconfiguration, sent once RRCSetupComplete arrives
//! - Information transfer, passed through to NGAP without inspection
//! - RRC Release
//! - SIB1 broadcast

use tracing::{debug, info, warn};

use ransim_common::{log_rrc_message, Direction, Plmn, Result};
use ransim_rrc::{
    EstablishmentCause, ReleaseCause, RrcMessage, RrcMessageBody, RrcMessageType, RrcReconfiguration,
    RrcRelease, RrcSetup, RrcSetupComplete, RrcSetupRequest, Sib1, UeCapabilityInformation,
    UlInformationTransfer,
};

use super::ue_context::{RrcUeContext, RrcUeContextManager};

/// What the gNB must do after an uplink RRC message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RrcOutput {
    /// Deliver this RRC message to the UE
    Downlink(Vec<u8>),
    /// Forward this NAS PDU to the AMF
    Nas {
        nas: Vec<u8>,
        establishment_cause: EstablishmentCause,
    },
}

/// RRC connection manager
#[derive(Debug)]
pub struct RrcConnectionManager {
    /// Transaction ID counter
    tid_counter: u8,
    /// Whether the cell is barred
    is_barred: bool,
    ues: RrcUeContextManager,
}

impl RrcConnectionManager {
    pub fn new(barred: bool) -> Self {
        Self {
            tid_counter: 0,
            is_barred: barred,
            ues: RrcUeContextManager::new(),
        }
    }

    /// Gets the next transaction ID (cycles 0-3)
    pub fn next_tid(&mut self) -> u8 {
        let tid = self.tid_counter;
        self.tid_counter = (self.tid_counter + 1) % 4;
        tid
    }

    pub fn set_barred(&mut self, barred: bool) {
        self.is_barred = barred;
        if barred {
            info!("Cell is now barred");
        } else {
            info!("Cell is now unbarred");
        }
    }

    pub fn is_barred(&self) -> bool {
        self.is_barred
    }

    pub fn ue(&self, ue_id: u32) -> Option<&RrcUeContext> {
        self.ues.get(ue_id)
    }

    /// UEs that completed RRC reconfiguration.
    pub fn connected_count(&self) -> usize {
        self.ues.connected_count()
    }

    /// Encodes the SIB1 of the serving cell.
    pub fn build_sib1(&self, plmn: Plmn, tac: u32, nci: u64) -> Result<Vec<u8>> {
        let mut sib1 = Sib1::new(plmn, tac, nci);
        sib1.cell_barred = self.is_barred;
        Ok(sib1.encode(0)?)
    }

    /// Processes one uplink RRC message from `ue_id`.
    pub fn process_uplink(&mut self, ue_id: u32, bytes: &[u8]) -> Result<Vec<RrcOutput>> {
        let msg = RrcMessage::decode(bytes)?;
        log_rrc_message(Direction::Rx, msg.message_type.name(), bytes);

        match msg.message_type {
            RrcMessageType::SetupRequest => self.process_setup_request(ue_id, &msg),
            RrcMessageType::SetupComplete => self.process_setup_complete(ue_id, &msg),
            RrcMessageType::ReconfigurationComplete => {
                match self.ues.get_mut(ue_id) {
                    Some(ctx) => {
                        ctx.on_reconfiguration_complete();
                        info!("RRC connected for UE[{}]", ue_id);
                    }
                    None => warn!("RRCReconfigurationComplete from unknown UE[{}]", ue_id),
                }
                Ok(Vec::new())
            }
            RrcMessageType::UlInformationTransfer => {
                let transfer = UlInformationTransfer::from_message(&msg)?;
                let Some(ctx) = self.ues.get(ue_id) else {
                    warn!("ULInformationTransfer from UE[{}] without RRC context", ue_id);
                    return Ok(Vec::new());
                };
                Ok(transfer
                    .dedicated_nas_message
                    .map(|nas| RrcOutput::Nas {
                        nas,
                        establishment_cause: ctx.establishment_cause,
                    })
                    .into_iter()
                    .collect())
            }
            RrcMessageType::UeCapabilityInformation => {
                let info = UeCapabilityInformation::from_message(&msg)?;
                if let Some(ctx) = self.ues.get_mut(ue_id) {
                    ctx.capability = info.nr_capability;
                }
                Ok(Vec::new())
            }
            other => {
                debug!("Ignoring uplink {} from UE[{}]", other.name(), ue_id);
                Ok(Vec::new())
            }
        }
    }

    fn process_setup_request(&mut self, ue_id: u32, msg: &RrcMessage) -> Result<Vec<RrcOutput>> {
        let request = RrcSetupRequest::from_message(msg)?;
        if self.is_barred {
            warn!("Rejecting RRC Setup Request from UE[{}]: cell is barred", ue_id);
            return Ok(Vec::new());
        }
        if self.ues.contains(ue_id) {
            warn!("Discarding RRC Setup Request: UE context already exists for UE[{}]", ue_id);
            return Ok(Vec::new());
        }

        self.ues.insert(RrcUeContext::new(
            ue_id,
            request.ue_identity,
            request.establishment_cause,
        ));
        let tid = self.next_tid();
        let setup = RrcSetup::with_default_config().encode(tid)?;
        info!(
            "RRC Setup for UE[{}], tid={}, initial_id={:x}, cause={:?}",
            ue_id,
            tid,
            request.ue_identity.value(),
            request.establishment_cause
        );
        log_rrc_message(Direction::Tx, RrcMessageType::Setup.name(), &setup);
        Ok(vec![RrcOutput::Downlink(setup)])
    }

    fn process_setup_complete(&mut self, ue_id: u32, msg: &RrcMessage) -> Result<Vec<RrcOutput>> {
        let complete = RrcSetupComplete::from_message(msg)?;
        let Some(ctx) = self.ues.get_mut(ue_id) else {
            warn!("RRCSetupComplete from unknown UE[{}]", ue_id);
            return Ok(Vec::new());
        };
        ctx.on_setup_complete();
        let establishment_cause = ctx.establishment_cause;

        let mut out = Vec::with_capacity(2);
        match complete.dedicated_nas_message {
            Some(nas) => {
                debug!("RRC Setup Complete for UE[{}], nas_pdu_len={}", ue_id, nas.len());
                out.push(RrcOutput::Nas {
                    nas,
                    establishment_cause,
                });
            }
            None => warn!("RRCSetupComplete from UE[{}] without NAS", ue_id),
        }

        let tid = self.next_tid();
        let reconfiguration = RrcReconfiguration::default().encode(tid)?;
        log_rrc_message(Direction::Tx, RrcMessageType::Reconfiguration.name(), &reconfiguration);
        out.push(RrcOutput::Downlink(reconfiguration));
        Ok(out)
    }

    /// Releases the RRC connection of `ue_id`, returning the RRCRelease to
    /// deliver. The context is dropped.
    pub fn release_ue(&mut self, ue_id: u32) -> Result<Option<Vec<u8>>> {
        let Some(mut ctx) = self.ues.remove(ue_id) else {
            debug!("UE[{}] has no RRC context, skipping RRC Release", ue_id);
            return Ok(None);
        };
        ctx.on_release();
        let tid = self.next_tid();
        let release = RrcRelease::new(ReleaseCause::Normal).encode(tid)?;
        info!("RRC Release for UE[{}], tid={}", ue_id, tid);
        log_rrc_message(Direction::Tx, RrcMessageType::Release.name(), &release);
        Ok(Some(release))
    }

    /// Drops every context without signalling.
    pub fn reset(&mut self) {
        self.ues.clear();
    }
}
