//! NGAP side of the gNB
//!
//! - `connection` - the N2 transport session and its state
//! - `amf_context` - what the gNB learned about the AMF during NG Setup
//! - `ue_context` - per-UE NGAP ID pairs
//!
//! ```text
//! RRC handler <---> gNB entity <---> NgapConnection <---> AMF
//! ```

mod amf_context;
mod connection;
mod ue_context;

pub use amf_context::{AmfState, NgapAmfContext};
pub use connection::{NgapConnection, NgapState, NON_UE_STREAM};
pub use ue_context::{NgapUeContext, NgapUeContextManager, UeState};
