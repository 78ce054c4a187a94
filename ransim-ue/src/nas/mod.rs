//! NAS (Non-Access Stratum) state of the UE
//!
//! - `mm`: 5GMM, RM and CM states
//! - `sm`: 5GSM state and the PDU session descriptor
//!
//! The procedures driving these states live in [`crate::entity`].

pub mod mm;
pub mod sm;
