//! UE Context Management for NGAP
//!
//! Each UE known to the AMF has a context holding its NGAP ID pair. The RAN
//! UE NGAP ID is allocated by the gNB when the Initial UE Message is sent;
//! the AMF UE NGAP ID is learned from the first downlink message.

use std::collections::HashMap;

/// UE state within NGAP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UeState {
    /// Initial UE Message sent, AMF UE NGAP ID unknown
    #[default]
    Initial,
    /// Both NGAP IDs known
    Active,
    /// UE context release in progress
    Releasing,
}

impl std::fmt::Display for UeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UeState::Initial => write!(f, "Initial"),
            UeState::Active => write!(f, "Active"),
            UeState::Releasing => write!(f, "Releasing"),
        }
    }
}

/// NGAP UE context
#[derive(Debug, Clone)]
pub struct NgapUeContext {
    /// UE ID (internal, same as RRC UE ID)
    pub ue_id: u32,
    /// RAN UE NGAP ID (assigned by gNB)
    pub ran_ue_ngap_id: u32,
    /// AMF UE NGAP ID (assigned by AMF)
    pub amf_ue_ngap_id: Option<u64>,
    pub state: UeState,
}

impl NgapUeContext {
    pub fn new(ue_id: u32, ran_ue_ngap_id: u32) -> Self {
        Self {
            ue_id,
            ran_ue_ngap_id,
            amf_ue_ngap_id: None,
            state: UeState::Initial,
        }
    }

    /// Sets the AMF UE NGAP ID
    pub fn set_amf_ue_ngap_id(&mut self, id: u64) {
        self.amf_ue_ngap_id = Some(id);
        if self.state == UeState::Initial {
            self.state = UeState::Active;
        }
    }

    /// Returns true if the UE has both RAN and AMF NGAP IDs
    pub fn has_ngap_id_pair(&self) -> bool {
        self.amf_ue_ngap_id.is_some()
    }

    pub fn on_context_release(&mut self) {
        self.state = UeState::Releasing;
    }
}

/// NGAP UE contexts keyed by UE id, with a RAN UE NGAP ID allocator
#[derive(Debug)]
pub struct NgapUeContextManager {
    contexts: HashMap<u32, NgapUeContext>,
    next_ran_ue_ngap_id: u32,
}

impl Default for NgapUeContextManager {
    fn default() -> Self {
        Self {
            contexts: HashMap::new(),
            next_ran_ue_ngap_id: 1,
        }
    }
}

impl NgapUeContextManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the context of `ue_id`, creating one with a fresh RAN UE
    /// NGAP ID if needed.
    pub fn get_or_create(&mut self, ue_id: u32) -> &mut NgapUeContext {
        let next = &mut self.next_ran_ue_ngap_id;
        self.contexts.entry(ue_id).or_insert_with(|| {
            let id = *next;
            *next = next.wrapping_add(1).max(1);
            NgapUeContext::new(ue_id, id)
        })
    }

    pub fn get(&self, ue_id: u32) -> Option<&NgapUeContext> {
        self.contexts.get(&ue_id)
    }

    pub fn get_mut(&mut self, ue_id: u32) -> Option<&mut NgapUeContext> {
        self.contexts.get_mut(&ue_id)
    }

    /// Finds the UE owning a RAN UE NGAP ID.
    pub fn find_by_ran_id(&self, ran_ue_ngap_id: u32) -> Option<u32> {
        self.contexts
            .values()
            .find(|ctx| ctx.ran_ue_ngap_id == ran_ue_ngap_id)
            .map(|ctx| ctx.ue_id)
    }

    /// Finds the UE owning an AMF UE NGAP ID.
    pub fn find_by_amf_id(&self, amf_ue_ngap_id: u64) -> Option<u32> {
        self.contexts
            .values()
            .find(|ctx| ctx.amf_ue_ngap_id == Some(amf_ue_ngap_id))
            .map(|ctx| ctx.ue_id)
    }

    pub fn remove(&mut self, ue_id: u32) -> Option<NgapUeContext> {
        self.contexts.remove(&ue_id)
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
