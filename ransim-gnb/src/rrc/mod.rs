//! RRC (Radio Resource Control) Module for gNB
//!
//! - RRC connection management (Setup, Reconfiguration, Release)
//! - Per-UE tracking of which completion messages have been observed
//! - NAS pass-through from ULInformationTransfer to NGAP
//!
//! # Message Flow
//!
//! ## RRC Setup Procedure
//! ```text
//! UE                    gNB (RRC)                 NGAP
//!  │                        │                       │
//!  │──RRCSetupRequest──────>│                       │
//!  │<─────────RRCSetup──────│                       │
//!  │──RRCSetupComplete─────>│                       │
//!  │     (NAS PDU)          │──Initial UE Message──>│
//!  │<──RRCReconfiguration───│                       │
//!  │──RRCReconfigComplete──>│                       │
//! ```
//!
//! ## Downlink NAS Delivery
//! ```text
//! NGAP                  gNB (RRC)                   UE
//!  │──DL NAS Transport─────>│                       │
//!  │                        │──DLInformationTransfer│
//!  │                        │     (NAS PDU)────────>│
//! ```

pub mod connection;
pub mod ue_context;

pub use connection::{RrcConnectionManager, RrcOutput};
pub use ue_context::{RrcUeContext, RrcUeContextManager, RrcUeState};
