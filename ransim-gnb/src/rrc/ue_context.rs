//! RRC UE Context Management
//!
//! Per-UE RRC record kept by the gNB: the identity and cause from
//! RRCSetupRequest, and which of the completion messages have been seen.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use ransim_rrc::{EstablishmentCause, UeIdentity};

/// gNB-side RRC connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RrcUeState {
    /// RRCSetup sent, waiting for RRCSetupComplete
    #[default]
    SetupSent,
    /// RRCSetupComplete received, RRCReconfiguration sent
    Reconfiguring,
    /// RRCReconfigurationComplete received
    Connected,
    /// RRCRelease sent
    Releasing,
}

impl std::fmt::Display for RrcUeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RrcUeState::SetupSent => write!(f, "SetupSent"),
            RrcUeState::Reconfiguring => write!(f, "Reconfiguring"),
            RrcUeState::Connected => write!(f, "Connected"),
            RrcUeState::Releasing => write!(f, "Releasing"),
        }
    }
}

/// RRC UE context
#[derive(Debug, Clone)]
pub struct RrcUeContext {
    pub ue_id: u32,
    /// Identity from RRCSetupRequest
    pub initial_id: UeIdentity,
    pub establishment_cause: EstablishmentCause,
    pub state: RrcUeState,
    pub setup_complete: bool,
    pub reconfiguration_complete: bool,
    /// NR capability container from UECapabilityInformation
    pub capability: Option<Vec<u8>>,
}

impl RrcUeContext {
    pub fn new(ue_id: u32, initial_id: UeIdentity, establishment_cause: EstablishmentCause) -> Self {
        Self {
            ue_id,
            initial_id,
            establishment_cause,
            state: RrcUeState::SetupSent,
            setup_complete: false,
            reconfiguration_complete: false,
            capability: None,
        }
    }

    pub fn on_setup_complete(&mut self) {
        self.setup_complete = true;
        self.state = RrcUeState::Reconfiguring;
    }

    pub fn on_reconfiguration_complete(&mut self) {
        self.reconfiguration_complete = true;
        self.state = RrcUeState::Connected;
    }

    pub fn on_release(&mut self) {
        self.state = RrcUeState::Releasing;
    }

    pub fn is_connected(&self) -> bool {
        self.state == RrcUeState::Connected
    }
}

/// RRC UE contexts keyed by UE id
#[derive(Debug, Default)]
pub struct RrcUeContextManager {
    contexts: HashMap<u32, RrcUeContext>,
}

impl RrcUeContextManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `ctx`, replacing any previous context of the same UE.
    pub fn insert(&mut self, ctx: RrcUeContext) -> &mut RrcUeContext {
        match self.contexts.entry(ctx.ue_id) {
            Entry::Occupied(mut entry) => {
                entry.insert(ctx);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(ctx),
        }
    }

    pub fn get(&self, ue_id: u32) -> Option<&RrcUeContext> {
        self.contexts.get(&ue_id)
    }

    pub fn get_mut(&mut self, ue_id: u32) -> Option<&mut RrcUeContext> {
        self.contexts.get_mut(&ue_id)
    }

    pub fn contains(&self, ue_id: u32) -> bool {
        self.contexts.contains_key(&ue_id)
    }

    pub fn remove(&mut self, ue_id: u32) -> Option<RrcUeContext> {
        self.contexts.remove(&ue_id)
    }

    pub fn connected_count(&self) -> usize {
        self.contexts.values().filter(|ctx| ctx.is_connected()).count()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn clear(&mut self) {
        self.contexts.clear();
    }
}
