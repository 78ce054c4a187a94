//! AMF Context Management
//!
//! Tracks the single AMF the gNB is attached to:
//! - NG Setup progress
//! - AMF name and relative capacity
//! - Served GUAMIs and supported PLMN/slice list

use ransim_common::{Plmn, SNssai};
use ransim_ngap::{Cause, Guami, NgSetupResponse, PlmnSliceItem, TimeToWait};
use serde::Serialize;

/// AMF association state as seen by the gNB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AmfState {
    /// Not connected
    #[default]
    NotConnected,
    /// NG Setup Request sent
    WaitingNgSetup,
    /// NG Setup complete, ready for operation
    Ready,
    /// NG Setup rejected by the AMF
    Rejected,
}

impl std::fmt::Display for AmfState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmfState::NotConnected => write!(f, "NotConnected"),
            AmfState::WaitingNgSetup => write!(f, "WaitingNgSetup"),
            AmfState::Ready => write!(f, "Ready"),
            AmfState::Rejected => write!(f, "Rejected"),
        }
    }
}

/// AMF context for tracking AMF state and capabilities
#[derive(Debug, Clone, Default)]
pub struct NgapAmfContext {
    pub state: AmfState,
    /// AMF name from NG Setup Response
    pub amf_name: Option<String>,
    /// Relative AMF capacity (0-255)
    pub relative_capacity: u8,
    pub served_guami_list: Vec<Guami>,
    pub plmn_support_list: Vec<PlmnSliceItem>,
    /// Cause and wait time of the last NG Setup Failure
    pub last_failure: Option<(Cause, Option<TimeToWait>)>,
}

impl NgapAmfContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the AMF as waiting for NG Setup response
    pub fn on_ng_setup_sent(&mut self) {
        self.state = AmfState::WaitingNgSetup;
    }

    /// Updates the context with NG Setup Response data
    pub fn on_ng_setup_response(&mut self, response: NgSetupResponse) {
        self.amf_name = Some(response.amf_name);
        self.relative_capacity = response.relative_amf_capacity;
        self.served_guami_list = response.served_guami_list;
        self.plmn_support_list = response.plmn_support_list;
        self.last_failure = None;
        self.state = AmfState::Ready;
    }

    pub fn on_ng_setup_failure(&mut self, cause: Cause, time_to_wait: Option<TimeToWait>) {
        self.last_failure = Some((cause, time_to_wait));
        self.state = AmfState::Rejected;
    }

    /// Forgets everything learned from the AMF
    pub fn on_disconnect(&mut self) {
        self.state = AmfState::NotConnected;
        self.amf_name = None;
        self.relative_capacity = 0;
        self.served_guami_list.clear();
        self.plmn_support_list.clear();
    }

    pub fn is_ready(&self) -> bool {
        self.state == AmfState::Ready
    }

    /// Checks if the AMF supports a given S-NSSAI for a PLMN
    pub fn supports_snssai(&self, plmn: &Plmn, snssai: &SNssai) -> bool {
        self.plmn_support_list
            .iter()
            .filter(|item| &item.plmn == plmn)
            .any(|item| item.slices.iter().any(|s| s == snssai))
    }

    /// Finds a GUAMI that matches the given PLMN
    pub fn find_guami_for_plmn(&self, plmn: &Plmn) -> Option<&Guami> {
        self.served_guami_list.iter().find(|g| &g.plmn == plmn)
    }
}
