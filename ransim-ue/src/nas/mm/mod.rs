//! 5GMM (5G Mobility Management) state

pub mod state;

pub use state::{CmState, MmState, MmStateMachine, MmStateTransition, MmSubState, RmState};
