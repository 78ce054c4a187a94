//! Integration test framework for ransim
#![allow(missing_docs)]
//!
//! Scenarios run a real [`ransim_gnb::SimulationContext`] against
//! [`MockAmf`], an in-process AMF on loopback TCP.
//!
//! # Components
//!
//! - [`mock_amf`] - Mock AMF answering NG Setup, registration and PDU session
//! - [`test_fixtures`] - gNB and UE configurations used by every scenario
//! - [`test_utils`] - Logging, polling and simulation start-up helpers
//!
//! # Test Categories
//!
//! 1. **gNB Lifecycle Tests** - N2 bring-up, NG Setup outcomes, stop/restart
//! 2. **UE Registration Tests** - Registration, reject, deregistration, removal
//! 3. **PDU Session Tests** - Session accept and reject
//! 4. **Multi-UE Tests** - Bulk creation and concurrent registration

pub mod mock_amf;
pub mod test_fixtures;
pub mod test_utils;

pub use mock_amf::{ue_address, MockAmf, MockAmfConfig, MockAmfError, MockAmfEvent, MockUeContext, NgSetupBehaviour};
pub use test_fixtures::{gnb_config, test_slice, ue_config, TEST_IMSI, TEST_PLMN, TEST_TAC};
pub use test_utils::{
    init_test_logging, start_simulation, unused_port, wait_for_condition, wait_for_ue, TestResult,
    DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT,
};
