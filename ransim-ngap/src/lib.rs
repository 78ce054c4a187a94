//! NGAP (NG Application Protocol) library
//!
//! Encoding/decoding of the NGAP messages exchanged between the simulated
//! gNB and the AMF.
//!
//! # Modules
//!
//! - `codec` - Message envelope, IE block builder/parser and [`NgapMessageBody`]
//! - `enums` - Message types, causes and small enumerated IEs
//! - `ies` - Structured IE values (node id, location, slice and GUAMI lists)
//! - `message` - [`NgapPdu`] dispatch over every supported message
//! - `procedures` - One record per NGAP message, grouped by procedure

pub mod codec;
pub mod enums;
pub mod iei;
pub mod ies;
pub mod message;
pub mod procedures;

pub use codec::{NgapError, NgapIeSet, NgapMessage, NgapMessageBody, NgapMessageBuilder, NgapResult};
pub use enums::{Cause, CauseGroup, NgapMessageType, PagingDrx, RrcEstablishmentCause, TimeToWait};
pub use ies::{GlobalGnbId, Guami, NrCgi, PlmnSliceItem, SupportedTaItem, Tai, UserLocationInfoNr};
pub use message::NgapPdu;
pub use procedures::*;
