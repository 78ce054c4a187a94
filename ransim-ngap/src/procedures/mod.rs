//! NGAP Procedures
//!
//! Message records for the NGAP procedures the simulated gNB takes part in,
//! as defined in 3GPP TS 38.413.

pub mod initial_ue_message;
pub mod nas_transport;
pub mod ng_setup;
pub mod ue_context_release;

pub use initial_ue_message::*;
pub use nas_transport::*;
pub use ng_setup::*;
pub use ue_context_release::*;
