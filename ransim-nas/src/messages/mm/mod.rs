//! 5GMM (5G Mobility Management) Messages
//!
//! ## Registration Messages
//!
//! - [`RegistrationRequest`] - UE to network registration request
//! - [`RegistrationAccept`] - Network to UE registration accept
//! - [`RegistrationComplete`] - UE to network registration complete
//! - [`RegistrationReject`] - Network to UE registration reject
//!
//! ## Deregistration Messages
//!
//! - [`DeregistrationRequest`] - UE originating deregistration request
//! - [`DeregistrationAccept`] - Network to UE deregistration accept
//!
//! ## Authentication Messages
//!
//! - [`AuthenticationRequest`] - Network to UE authentication request
//! - [`AuthenticationResponse`] - UE to network authentication response
//! - [`AuthenticationReject`] - Network to UE authentication reject
//! - [`AuthenticationFailure`] - UE to network authentication failure
//!
//! ## Security Mode Messages
//!
//! - [`SecurityModeCommand`] - Network to UE security mode command
//! - [`SecurityModeComplete`] - UE to network security mode complete
//! - [`SecurityModeReject`] - UE to network security mode reject
//!
//! ## NAS Transport Messages
//!
//! - [`UlNasTransport`] - UE to network NAS transport
//! - [`DlNasTransport`] - Network to UE NAS transport

pub mod authentication;
pub mod deregistration;
pub mod nas_transport;
pub mod registration;
pub mod security_mode;

pub use authentication::{
    AuthenticationFailure, AuthenticationReject, AuthenticationRequest, AuthenticationResponse,
};
pub use deregistration::{DeregistrationAccept, DeregistrationRequest};
pub use nas_transport::{DlNasTransport, UlNasTransport};
pub use registration::{
    MobileIdentity, RegistrationAccept, RegistrationComplete, RegistrationReject, RegistrationRequest,
};
pub use security_mode::{SecurityModeCommand, SecurityModeComplete, SecurityModeReject, SelectedAlgorithms};
