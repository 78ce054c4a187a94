//! MM State Machine
//!
//! 5GMM states as per 3GPP TS 24.501 Section 5.1.3.
//!
//! # RM States (Registration Management)
//!
//! Derived from the MM state: RM-REGISTERED while the network holds a
//! registration (REGISTERED, SERVICE-REQUEST-INITIATED,
//! DEREGISTERED-INITIATED), RM-DEREGISTERED otherwise.
//!
//! # CM States (Connection Management)
//!
//! - CM-IDLE: No NAS signalling connection
//! - CM-CONNECTED: NAS signalling connection established

use std::fmt;

use serde::Serialize;

/// Registration Management (RM) state.
///
/// 3GPP TS 24.501 Section 5.1.3.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RmState {
    #[default]
    Deregistered,
    Registered,
}

impl fmt::Display for RmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RmState::Deregistered => write!(f, "RM-DEREGISTERED"),
            RmState::Registered => write!(f, "RM-REGISTERED"),
        }
    }
}

/// Connection Management (CM) state.
///
/// 3GPP TS 24.501 Section 5.1.3.4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CmState {
    /// CM-IDLE: No NAS signalling connection
    #[default]
    Idle,
    /// CM-CONNECTED: NAS signalling connection established
    Connected,
}

impl fmt::Display for CmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmState::Idle => write!(f, "CM-IDLE"),
            CmState::Connected => write!(f, "CM-CONNECTED"),
        }
    }
}

/// Main MM state.
///
/// 3GPP TS 24.501 Section 5.1.3.2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MmState {
    /// 5GMM-NULL
    #[default]
    Null,
    /// 5GMM-DEREGISTERED
    Deregistered,
    /// 5GMM-REGISTERED-INITIATED
    RegisteredInitiated,
    /// 5GMM-REGISTERED
    Registered,
    /// 5GMM-DEREGISTERED-INITIATED
    DeregisteredInitiated,
    /// 5GMM-SERVICE-REQUEST-INITIATED
    ServiceRequestInitiated,
}

impl fmt::Display for MmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MmState::Null => write!(f, "5GMM-NULL"),
            MmState::Deregistered => write!(f, "5GMM-DEREGISTERED"),
            MmState::RegisteredInitiated => write!(f, "5GMM-REGISTERED-INITIATED"),
            MmState::Registered => write!(f, "5GMM-REGISTERED"),
            MmState::DeregisteredInitiated => write!(f, "5GMM-DEREGISTERED-INITIATED"),
            MmState::ServiceRequestInitiated => write!(f, "5GMM-SERVICE-REQUEST-INITIATED"),
        }
    }
}

/// MM sub-state; the DEREGISTERED and REGISTERED main states are refined,
/// the others map one to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MmSubState {
    #[default]
    Null,
    DeregisteredNormalService,
    DeregisteredLimitedService,
    DeregisteredAttemptingRegistration,
    RegisteredInitiated,
    RegisteredNormalService,
    DeregisteredInitiated,
    ServiceRequestInitiated,
}

impl MmSubState {
    /// Returns the main MM state corresponding to this sub-state.
    pub fn main_state(&self) -> MmState {
        match self {
            MmSubState::Null => MmState::Null,
            MmSubState::DeregisteredNormalService
            | MmSubState::DeregisteredLimitedService
            | MmSubState::DeregisteredAttemptingRegistration => MmState::Deregistered,
            MmSubState::RegisteredInitiated => MmState::RegisteredInitiated,
            MmSubState::RegisteredNormalService => MmState::Registered,
            MmSubState::DeregisteredInitiated => MmState::DeregisteredInitiated,
            MmSubState::ServiceRequestInitiated => MmState::ServiceRequestInitiated,
        }
    }
}

impl fmt::Display for MmSubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MmSubState::DeregisteredNormalService => write!(f, "5GMM-DEREGISTERED.NORMAL-SERVICE"),
            MmSubState::DeregisteredLimitedService => write!(f, "5GMM-DEREGISTERED.LIMITED-SERVICE"),
            MmSubState::DeregisteredAttemptingRegistration => {
                write!(f, "5GMM-DEREGISTERED.ATTEMPTING-REGISTRATION")
            }
            MmSubState::RegisteredNormalService => write!(f, "5GMM-REGISTERED.NORMAL-SERVICE"),
            other => write!(f, "{}", other.main_state()),
        }
    }
}

/// An MM state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmStateTransition {
    pub old_substate: MmSubState,
    pub new_substate: MmSubState,
}

impl fmt::Display for MmStateTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.old_substate, self.new_substate)
    }
}

/// Tracks the RM, CM and MM states of one UE.
///
/// # Example
///
/// ```
/// use ransim_ue::nas::mm::{CmState, MmState, MmStateMachine, MmSubState};
///
/// let mut sm = MmStateMachine::new();
/// assert_eq!(sm.mm_state(), MmState::Null);
///
/// sm.switch_mm_state(MmSubState::RegisteredInitiated);
/// assert!(!sm.is_registered());
/// sm.switch_mm_state(MmSubState::RegisteredNormalService);
/// assert!(sm.is_registered());
///
/// assert!(sm.switch_cm_state(CmState::Connected));
/// assert!(!sm.switch_cm_state(CmState::Connected));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MmStateMachine {
    cm_state: CmState,
    mm_substate: MmSubState,
}

impl MmStateMachine {
    /// Starts in 5GMM-NULL and CM-IDLE.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rm_state(&self) -> RmState {
        match self.mm_state() {
            MmState::Null | MmState::Deregistered | MmState::RegisteredInitiated => {
                RmState::Deregistered
            }
            MmState::Registered | MmState::ServiceRequestInitiated | MmState::DeregisteredInitiated => {
                RmState::Registered
            }
        }
    }

    pub fn cm_state(&self) -> CmState {
        self.cm_state
    }

    pub fn mm_state(&self) -> MmState {
        self.mm_substate.main_state()
    }

    pub fn mm_substate(&self) -> MmSubState {
        self.mm_substate
    }

    pub fn is_registered(&self) -> bool {
        self.rm_state() == RmState::Registered
    }

    pub fn is_connected(&self) -> bool {
        self.cm_state == CmState::Connected
    }

    /// Switches the MM sub-state; `None` if nothing changed.
    pub fn switch_mm_state(&mut self, substate: MmSubState) -> Option<MmStateTransition> {
        if self.mm_substate == substate {
            return None;
        }
        let transition = MmStateTransition {
            old_substate: self.mm_substate,
            new_substate: substate,
        };
        self.mm_substate = substate;
        Some(transition)
    }

    /// Switches the CM state; `false` if it was already `state`.
    pub fn switch_cm_state(&mut self, state: CmState) -> bool {
        if self.cm_state == state {
            return false;
        }
        self.cm_state = state;
        true
    }
}

impl fmt::Display for MmStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MM[{}, {}, {}]", self.rm_state(), self.cm_state, self.mm_substate)
    }
}
