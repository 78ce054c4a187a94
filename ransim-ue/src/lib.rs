//! ransim UE (User Equipment) library
//!
//! A UE is a synchronous [`UeEntity`] driven by the gNB radio pump:
//!
//! - RRC state machine (IDLE, CONNECTING, CONNECTED)
//! - 5GMM registration, authentication, security mode and deregistration
//! - 5GSM establishment of a single PDU session
//! - NAS timers T3510 and T3580 with bounded retransmission

pub mod entity;
pub mod nas;
pub mod rrc;
pub mod timer;

pub use entity::{CampedCell, NasTimer, UeEntity, UeMetrics, UeSnapshot, UeStats};
pub use nas::mm::{CmState, MmState, MmStateMachine, MmSubState, RmState};
pub use nas::sm::{PduSession, SmState, DEFAULT_PDU_SESSION_ID};
pub use rrc::{RrcState, RrcStateMachine, RrcTransition};
pub use timer::{GprsTimer3, GprsTimer3Unit, Timer, TimerId, TimerManager};
