//! RRC State Machine
//!
//! UE side of the RRC connection lifecycle (3GPP TS 38.331, reduced).
//!
//! # State Transitions
//!
//! | From State | Received          | To State   | Reply                      |
//! |------------|-------------------|------------|----------------------------|
//! | Idle       | RRCSetup          | Connecting | RRCSetupComplete           |
//! | Connecting | RRCReconfiguration| Connected  | RRCReconfigurationComplete |
//! | Connected  | RRCRelease        | Idle       | none                       |
//!
//! Every other (state, message) pair leaves the state alone and produces no
//! reply. `Inactive` is representable but no transition enters it.

use std::fmt;

use ransim_rrc::RrcMessageType;
use serde::Serialize;

/// RRC state of one UE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize)]
pub enum RrcState {
    /// No RRC connection.
    #[default]
    Idle,
    /// RRCSetup received, RRCSetupComplete sent, waiting for reconfiguration.
    Connecting,
    /// Connection established and configured.
    Connected,
    /// Suspended connection with context kept.
    Inactive,
}

impl RrcState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RrcState::Idle)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, RrcState::Connected)
    }

    /// True while dedicated signalling can flow (Connecting or Connected).
    pub fn has_signalling_connection(&self) -> bool {
        matches!(self, RrcState::Connecting | RrcState::Connected)
    }
}

impl fmt::Display for RrcState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RrcState::Idle => write!(f, "RRC_IDLE"),
            RrcState::Connecting => write!(f, "RRC_CONNECTING"),
            RrcState::Connected => write!(f, "RRC_CONNECTED"),
            RrcState::Inactive => write!(f, "RRC_INACTIVE"),
        }
    }
}

/// Outcome of feeding a downlink message to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrcTransition {
    pub from: RrcState,
    pub to: RrcState,
    /// Message the UE must answer with, if any.
    pub reply: Option<RrcMessageType>,
}

/// Transition table lookup. `None` means the pair is ignored.
pub fn transition(state: RrcState, received: RrcMessageType) -> Option<RrcTransition> {
    let (to, reply) = match (state, received) {
        (RrcState::Idle, RrcMessageType::Setup) => {
            (RrcState::Connecting, Some(RrcMessageType::SetupComplete))
        }
        (RrcState::Connecting, RrcMessageType::Reconfiguration) => {
            (RrcState::Connected, Some(RrcMessageType::ReconfigurationComplete))
        }
        (RrcState::Connected, RrcMessageType::Release) => (RrcState::Idle, None),
        _ => return None,
    };
    Some(RrcTransition { from: state, to, reply })
}

/// RRC state machine for the UE.
///
/// # Example
///
/// ```
/// use ransim_rrc::RrcMessageType;
/// use ransim_ue::rrc::{RrcState, RrcStateMachine};
///
/// let mut sm = RrcStateMachine::new();
/// let t = sm.on_message(RrcMessageType::Setup).unwrap();
/// assert_eq!(t.reply, Some(RrcMessageType::SetupComplete));
/// assert_eq!(sm.state(), RrcState::Connecting);
///
/// // Ignored in this state
/// assert!(sm.on_message(RrcMessageType::Release).is_none());
/// assert_eq!(sm.state(), RrcState::Connecting);
/// ```
#[derive(Debug, Default)]
pub struct RrcStateMachine {
    state: RrcState,
    previous_state: Option<RrcState>,
    transition_count: u64,
}

impl RrcStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RrcState {
        self.state
    }

    pub fn previous_state(&self) -> Option<RrcState> {
        self.previous_state
    }

    pub fn transition_count(&self) -> u64 {
        self.transition_count
    }

    /// Applies the transition for `received`, if the table has one.
    pub fn on_message(&mut self, received: RrcMessageType) -> Option<RrcTransition> {
        let t = transition(self.state, received)?;
        self.previous_state = Some(self.state);
        self.state = t.to;
        self.transition_count += 1;
        Some(t)
    }

    /// Drops the connection without signalling, e.g. on local detach.
    pub fn reset(&mut self) {
        if self.state != RrcState::Idle {
            self.previous_state = Some(self.state);
            self.state = RrcState::Idle;
            self.transition_count += 1;
        }
    }
}
