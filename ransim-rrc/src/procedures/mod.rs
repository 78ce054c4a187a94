//! RRC Procedures
//!
//! One module per procedure of the connection lifecycle: setup,
//! reconfiguration, release, NAS information transfer, capability transfer
//! and system information broadcast.

pub mod information_transfer;
pub mod rrc_reconfiguration;
pub mod rrc_release;
pub mod rrc_setup;
pub mod system_information;
pub mod ue_capability;

pub use information_transfer::*;
pub use rrc_reconfiguration::*;
pub use rrc_release::*;
pub use rrc_setup::*;
pub use system_information::*;
pub use ue_capability::*;
