//! RRC (Radio Resource Control) protocol library
//!
//! Byte-level model of the RRC messages exchanged between a simulated UE and
//! gNB over the in-process radio link.
//!
//! # Modules
//!
//! - `codec` - Message envelope, IE writer/parser and the [`RrcMessageBody`] trait
//! - `enums` - Message types and cause values
//! - `iei` - IE tags
//! - `procedures` - One record per RRC message, grouped by procedure

pub mod codec;
pub mod enums;
pub mod iei;
pub mod procedures;

pub use codec::{RrcError, RrcIeSet, RrcIeWriter, RrcMessage, RrcMessageBody, RrcResult};
pub use enums::{EstablishmentCause, ReleaseCause, RrcMessageType};
pub use procedures::*;
