//! ransim-gnb - simulated gNB
//!
//! The gNB holds one N2 session to an AMF and a table of simulated UEs. UEs
//! live in-process: their RRC messages go straight into the gNB's RRC
//! handler, NAS is relayed to the AMF over NGAP.
//!
//! ```text
//! ┌──────────────────────────── GnbEntity ────────────────────────────┐
//! │                                                                    │
//! │  UeEntity ──RRC──> RrcConnectionManager ──NAS──> NgapConnection ───┼──> AMF
//! │  UeEntity <──RRC── DLInformationTransfer <──NAS── receive loop <───┼───
//! │                                                                    │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use ransim_common::{GnbConfig, UeConfig};
//! use ransim_gnb::SimulationContext;
//!
//! # async fn run() -> ransim_common::Result<()> {
//! let mut sim = SimulationContext::new();
//! sim.start_gnb(GnbConfig::default()).await?;
//! let ue_id = sim.add_ue(UeConfig::default()).await?;
//! sim.register_ue(ue_id).await?;
//! println!("{:?}", sim.gnb_snapshot().await);
//! sim.stop_gnb().await?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod entity;
pub mod ngap;
pub mod rrc;

pub use context::{AddedUe, SimulationContext, SimulationMetrics};
pub use entity::{GnbEntity, GnbMetrics, GnbSnapshot, GnbState};
pub use ngap::{AmfState, NgapAmfContext, NgapConnection, NgapState, NgapUeContext, NgapUeContextManager};
pub use rrc::{RrcConnectionManager, RrcOutput, RrcUeContext, RrcUeContextManager, RrcUeState};
