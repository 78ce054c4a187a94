//! RRC (Radio Resource Control) Module for UE
//!
//! ```text
//!   ┌──────┐  RRCSetup   ┌────────────┐  RRCReconfiguration  ┌───────────┐
//!   │ Idle │────────────►│ Connecting │─────────────────────►│ Connected │
//!   └──────┘             └────────────┘                      └─────┬─────┘
//!      ▲                                                           │
//!      └───────────────────────── RRCRelease ──────────────────────┘
//! ```

pub mod state;

pub use state::{transition, RrcState, RrcStateMachine, RrcTransition};
