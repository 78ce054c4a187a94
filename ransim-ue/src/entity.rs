//! UE entity
//!
//! One simulated UE: the RRC, MM and SM state machines, the USIM, the NAS
//! security context and the NAS timers. The entity is synchronous; every
//! handler consumes one downlink message and returns the uplink reply, if
//! any, for the caller to carry to the gNB.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ransim_common::{
    log_nas_message, log_rrc_message, Direction, Error, EventLog, LogLevel, Result, SNssai, UeConfig,
};
use ransim_crypto::{derive_kamf_surrogate, UsimContext};
use ransim_nas::{
    protect, unprotect, AlgorithmType, AuthenticationResponse, DeregistrationRequest, MmCause,
    MobileIdentity, NasDirection, NasMessageBody, NasPdu, NasSecurityContext, PayloadContainerType,
    PduSessionEstablishmentRequest, RegistrationRequest, SecurityModeComplete, SecurityModeReject,
};
use ransim_rrc::{
    DlInformationTransfer, EstablishmentCause, RrcMessage, RrcMessageBody, RrcMessageType, RrcRelease,
    RrcReconfiguration, RrcReconfigurationComplete, RrcSetup, RrcSetupComplete, RrcSetupRequest, Sib1,
    UeCapabilityEnquiry, UeCapabilityInformation, UeIdentity, UlInformationTransfer,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::nas::mm::{CmState, MmStateMachine, MmSubState};
use crate::nas::sm::{session_type_name, PduSession, SmState, DEFAULT_PDU_SESSION_ID};
use crate::rrc::{RrcState, RrcStateMachine};
use crate::timer::{
    GprsTimer3, TimerId, TimerManager, DEFAULT_T3510_INTERVAL, DEFAULT_T3580_INTERVAL, MAX_T3510_RETRIES,
    MAX_T3580_RETRIES, TIMER_T3510, TIMER_T3580,
};

/// 5GMM capability sent in the Registration Request
const MM_CAPABILITY: [u8; 1] = [0x07];
/// EA0-EA2 and IA0-IA2
const UE_SECURITY_CAPABILITY: [u8; 2] = [0xE0, 0xE0];

/// NAS procedure timers run by the UE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NasTimer {
    /// Registration supervision
    T3510,
    /// PDU session establishment supervision
    T3580,
}

impl NasTimer {
    pub fn code(&self) -> u16 {
        match self {
            NasTimer::T3510 => TIMER_T3510,
            NasTimer::T3580 => TIMER_T3580,
        }
    }
}

impl fmt::Display for NasTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.code())
    }
}

/// Key material left behind by a successful authentication
#[derive(Debug, Clone)]
struct AuthMaterial {
    ck: [u8; 16],
    ik: [u8; 16],
    abba: Vec<u8>,
}

/// Cell the UE is camped on, learned from SIB1
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampedCell {
    pub tac: u32,
    pub cell_identity: u64,
    pub barred: bool,
}

/// Message counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UeStats {
    pub rrc_rx: u64,
    pub rrc_tx: u64,
    pub nas_rx: u64,
    pub nas_tx: u64,
}

/// Read-only view of a UE.
#[derive(Debug, Clone, Serialize)]
pub struct UeSnapshot {
    pub ue_id: u32,
    pub supi: String,
    pub rm_state: String,
    pub cm_state: String,
    pub mm_state: String,
    pub mm_substate: String,
    pub rrc_state: String,
    pub sm_state: String,
    pub connected_gnb: Option<String>,
    pub camped_cell: Option<CampedCell>,
    pub security_active: bool,
    pub pdu_sessions: Vec<PduSession>,
    pub periodic_registration_secs: Option<u32>,
    pub running_timers: Vec<String>,
}

/// Metrics record of a UE.
#[derive(Debug, Clone, Serialize)]
pub struct UeMetrics {
    pub ue_id: u32,
    pub imsi: String,
    pub mm_state: String,
    pub rrc_state: String,
    pub cm_state: String,
    pub sm_state: String,
    pub connected: bool,
    pub pdu_sessions: usize,
    pub registration_attempts: u32,
    /// Milliseconds since the Unix epoch of the last accepted registration
    pub last_registration: Option<u64>,
    pub stats: UeStats,
}

/// A simulated UE.
pub struct UeEntity {
    ue_id: u32,
    config: UeConfig,
    ue_identity: UeIdentity,
    rrc: RrcStateMachine,
    mm: MmStateMachine,
    sm_state: SmState,
    usim: UsimContext,
    security: NasSecurityContext,
    auth: Option<AuthMaterial>,
    timers: TimerManager<NasTimer>,
    t3510: Option<TimerId>,
    t3580: Option<TimerId>,
    t3510_interval: Duration,
    t3580_interval: Duration,
    registration_request: Option<Vec<u8>>,
    pdu_request: Option<Vec<u8>>,
    registration_attempts: u32,
    pdu_attempts: u32,
    guti: Option<Vec<u8>>,
    periodic_registration_secs: Option<u32>,
    last_registration: Option<u64>,
    connected_gnb: Option<String>,
    camped_cell: Option<CampedCell>,
    pdu_sessions: Vec<PduSession>,
    stats: UeStats,
    events: Option<EventLog>,
}

impl UeEntity {
    pub fn new(ue_id: u32, config: UeConfig) -> Self {
        let usim = UsimContext::new(config.supi.digits(), config.key, config.opc, config.amf, config.sqn);
        let mut security = NasSecurityContext::new();
        security.set_direction(NasDirection::Uplink);
        Self {
            ue_id,
            config,
            ue_identity: UeIdentity::random(),
            rrc: RrcStateMachine::new(),
            mm: MmStateMachine::new(),
            sm_state: SmState::Null,
            usim,
            security,
            auth: None,
            timers: TimerManager::new(),
            t3510: None,
            t3580: None,
            t3510_interval: Duration::from_secs(u64::from(DEFAULT_T3510_INTERVAL)),
            t3580_interval: Duration::from_secs(u64::from(DEFAULT_T3580_INTERVAL)),
            registration_request: None,
            pdu_request: None,
            registration_attempts: 0,
            pdu_attempts: 0,
            guti: None,
            periodic_registration_secs: None,
            last_registration: None,
            connected_gnb: None,
            camped_cell: None,
            pdu_sessions: Vec::new(),
            stats: UeStats::default(),
            events: None,
        }
    }

    /// Mirrors state changes into a shared event log.
    pub fn with_event_log(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    /// Overrides the T3510 and T3580 intervals.
    pub fn set_timer_intervals(&mut self, t3510: Duration, t3580: Duration) {
        self.t3510_interval = t3510;
        self.t3580_interval = t3580;
    }

    pub fn ue_id(&self) -> u32 {
        self.ue_id
    }

    pub fn config(&self) -> &UeConfig {
        &self.config
    }

    pub fn rrc_state(&self) -> RrcState {
        self.rrc.state()
    }

    pub fn cm_state(&self) -> CmState {
        self.mm.cm_state()
    }

    pub fn mm_substate(&self) -> MmSubState {
        self.mm.mm_substate()
    }

    pub fn sm_state(&self) -> SmState {
        self.sm_state
    }

    pub fn is_registered(&self) -> bool {
        self.mm.is_registered()
    }

    pub fn pdu_sessions(&self) -> &[PduSession] {
        &self.pdu_sessions
    }

    pub fn registration_attempts(&self) -> u32 {
        self.registration_attempts
    }

    pub fn stats(&self) -> UeStats {
        self.stats
    }

    pub fn connected_gnb(&self) -> Option<&str> {
        self.connected_gnb.as_deref()
    }

    /// Begins registration towards `gnb`, returning the RRCSetupRequest.
    pub fn start(&mut self, gnb: &str) -> Result<Vec<u8>> {
        if !self.rrc.state().is_idle() {
            return Err(Error::InvalidOperation(format!(
                "UE {} already has an RRC connection ({})",
                self.ue_id,
                self.rrc.state()
            )));
        }
        if self.camped_cell.as_ref().is_some_and(|cell| cell.barred) {
            return Err(Error::InvalidOperation(format!("UE {}: serving cell is barred", self.ue_id)));
        }
        if self.mm.mm_substate() == MmSubState::Null {
            self.switch_mm(MmSubState::DeregisteredNormalService);
        }

        self.connected_gnb = Some(gnb.to_string());
        let request = RrcSetupRequest::new(self.ue_identity, EstablishmentCause::MoSignalling);
        let bytes = request.encode(0)?;
        self.count_rrc_tx(RrcMessageType::SetupRequest, &bytes);
        self.event(
            LogLevel::Info,
            format!("[UE-{}] RRC Setup Request sent to {}", self.ue_id, gnb),
        );
        Ok(bytes)
    }

    /// Handles one downlink RRC message.
    ///
    /// Undecodable input is an error and leaves every state untouched.
    pub fn handle_rrc_message(&mut self, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let msg = RrcMessage::decode(bytes)?;
        log_rrc_message(Direction::Rx, msg.message_type.name(), bytes);

        let reply = match msg.message_type {
            RrcMessageType::Setup => self.on_rrc_setup(&msg)?,
            RrcMessageType::Reconfiguration => self.on_rrc_reconfiguration(&msg)?,
            RrcMessageType::Release => self.on_rrc_release(&msg)?,
            RrcMessageType::DlInformationTransfer => self.on_dl_information_transfer(&msg)?,
            RrcMessageType::UeCapabilityEnquiry => {
                UeCapabilityEnquiry::from_message(&msg)?;
                if self.rrc.state().has_signalling_connection() {
                    Some((
                        RrcMessageType::UeCapabilityInformation,
                        UeCapabilityInformation::default().encode(msg.transaction_id)?,
                    ))
                } else {
                    None
                }
            }
            RrcMessageType::Sib1 => {
                let sib1 = Sib1::from_message(&msg)?;
                self.camped_cell = Some(CampedCell {
                    tac: sib1.tac,
                    cell_identity: sib1.cell_identity,
                    barred: sib1.cell_barred,
                });
                None
            }
            other => {
                debug!(ue_id = self.ue_id, "Ignoring RRC {}", other.name());
                None
            }
        };
        self.stats.rrc_rx += 1;

        Ok(reply.map(|(message_type, bytes)| {
            self.count_rrc_tx(message_type, &bytes);
            bytes
        }))
    }

    fn on_rrc_setup(&mut self, msg: &RrcMessage) -> Result<Option<(RrcMessageType, Vec<u8>)>> {
        RrcSetup::from_message(msg)?;
        if self.rrc.on_message(RrcMessageType::Setup).is_none() {
            debug!(ue_id = self.ue_id, state = %self.rrc.state(), "RRCSetup ignored");
            return Ok(None);
        }
        self.mm.switch_cm_state(CmState::Connected);
        self.event(LogLevel::Info, format!("[UE-{}] RRC connection setup", self.ue_id));

        let nas = self.build_registration_request()?;
        self.registration_request = Some(nas.clone());
        self.registration_attempts = 1;
        self.switch_mm(MmSubState::RegisteredInitiated);
        self.arm_timer(NasTimer::T3510);
        self.count_nas_tx("Registration Request", &nas);

        let complete = RrcSetupComplete::with_nas(nas).encode(msg.transaction_id)?;
        Ok(Some((RrcMessageType::SetupComplete, complete)))
    }

    fn on_rrc_reconfiguration(&mut self, msg: &RrcMessage) -> Result<Option<(RrcMessageType, Vec<u8>)>> {
        let reconfiguration = RrcReconfiguration::from_message(msg)?;
        if self.rrc.on_message(RrcMessageType::Reconfiguration).is_none() {
            debug!(ue_id = self.ue_id, state = %self.rrc.state(), "RRCReconfiguration ignored");
            return Ok(None);
        }
        if reconfiguration.dedicated_nas_message.is_some() {
            debug!(ue_id = self.ue_id, "Dedicated NAS in RRCReconfiguration not processed");
        }
        self.event(LogLevel::Info, format!("[UE-{}] RRC connected", self.ue_id));
        let complete = RrcReconfigurationComplete.encode(msg.transaction_id)?;
        Ok(Some((RrcMessageType::ReconfigurationComplete, complete)))
    }

    fn on_rrc_release(&mut self, msg: &RrcMessage) -> Result<Option<(RrcMessageType, Vec<u8>)>> {
        RrcRelease::from_message(msg)?;
        if self.rrc.on_message(RrcMessageType::Release).is_none() {
            debug!(ue_id = self.ue_id, state = %self.rrc.state(), "RRCRelease ignored");
            return Ok(None);
        }
        self.mm.switch_cm_state(CmState::Idle);
        self.connected_gnb = None;
        if self.mm.mm_substate() == MmSubState::DeregisteredInitiated {
            self.complete_deregistration();
        }
        self.event(LogLevel::Info, format!("[UE-{}] RRC connection released", self.ue_id));
        Ok(None)
    }

    fn on_dl_information_transfer(&mut self, msg: &RrcMessage) -> Result<Option<(RrcMessageType, Vec<u8>)>> {
        let transfer = DlInformationTransfer::from_message(msg)?;
        if !self.rrc.state().has_signalling_connection() {
            debug!(ue_id = self.ue_id, "DLInformationTransfer without RRC connection");
            return Ok(None);
        }
        let Some(nas) = transfer.dedicated_nas_message else {
            return Ok(None);
        };
        match self.handle_nas_message(&nas)? {
            Some(uplink) => {
                let ul = UlInformationTransfer::new(uplink).encode(msg.transaction_id)?;
                Ok(Some((RrcMessageType::UlInformationTransfer, ul)))
            }
            None => Ok(None),
        }
    }

    /// Handles one downlink NAS message, returning the uplink NAS reply.
    ///
    /// A message that fails to unprotect, decode or validate is an error and
    /// leaves the security context and counters untouched.
    pub fn handle_nas_message(&mut self, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut security = self.security.clone();
        let plain = unprotect(&mut security, bytes)?;
        let pdu = NasPdu::decode(&plain)?;
        let inner = check_downlink(&pdu)?;

        self.security = security;
        log_nas_message(Direction::Rx, pdu.message_type().name(), bytes);
        self.stats.nas_rx += 1;

        match pdu {
            NasPdu::AuthenticationRequest(request) => {
                let rand = request
                    .rand
                    .ok_or_else(|| Error::ProtocolDecode("Authentication Request without RAND".into()))?;
                let autn = request.autn.unwrap_or_default();
                let result = self.usim.generate_authentication_response(&rand, &autn);
                self.auth = Some(AuthMaterial {
                    ck: result.ck,
                    ik: result.ik,
                    abba: request.abba,
                });
                let response = AuthenticationResponse {
                    response_parameter: Some(result.res.to_vec()),
                };
                self.send_nas("Authentication Response", response.encode()?).map(Some)
            }
            NasPdu::AuthenticationReject(_) => {
                self.disarm_timer(NasTimer::T3510);
                self.switch_mm(MmSubState::DeregisteredLimitedService);
                self.event(LogLevel::Warn, format!("[UE-{}] Authentication rejected", self.ue_id));
                Ok(None)
            }
            NasPdu::SecurityModeCommand(command) => {
                let Some(auth) = self.auth.as_ref() else {
                    warn!(ue_id = self.ue_id, "Security Mode Command before authentication");
                    let reject = SecurityModeReject {
                        cause: MmCause::SecurityModeRejected,
                    };
                    return self.send_nas("Security Mode Reject", reject.encode()?).map(Some);
                };
                let kamf = derive_kamf_surrogate(
                    &auth.ck,
                    &auth.ik,
                    self.config.supi.digits().as_bytes(),
                    &auth.abba,
                );
                let algorithms = command.selected_algorithms;
                self.security.install_keys(&kamf, algorithms.integrity, algorithms.ciphering);
                self.security.set_direction(NasDirection::Uplink);
                self.event(
                    LogLevel::Info,
                    format!(
                        "[UE-{}] NAS security activated (NIA{}, NEA{})",
                        self.ue_id, algorithms.integrity, algorithms.ciphering
                    ),
                );
                let complete = SecurityModeComplete {
                    nas_message_container: None,
                };
                self.send_nas("Security Mode Complete", complete.encode()?).map(Some)
            }
            NasPdu::RegistrationAccept(accept) => {
                self.disarm_timer(NasTimer::T3510);
                self.guti = accept.guti;
                self.periodic_registration_secs = accept
                    .t3512
                    .and_then(|value| GprsTimer3::from_byte(value).to_seconds());
                self.last_registration = Some(now_ms());
                self.switch_mm(MmSubState::RegisteredNormalService);
                self.event(LogLevel::Info, format!("[UE-{}] Registration accepted", self.ue_id));
                self.start_pdu_session().map(Some)
            }
            NasPdu::RegistrationReject(reject) => {
                self.disarm_timer(NasTimer::T3510);
                self.switch_mm(MmSubState::DeregisteredLimitedService);
                self.event(
                    LogLevel::Warn,
                    format!("[UE-{}] Registration rejected: {:?}", self.ue_id, reject.cause),
                );
                Ok(None)
            }
            NasPdu::DeregistrationAccept(_) => {
                self.complete_deregistration();
                Ok(None)
            }
            NasPdu::DlNasTransport(transport) => match inner {
                Some(inner) => self.handle_sm_message(inner),
                None => {
                    debug!(ue_id = self.ue_id, "Ignoring DL NAS Transport payload {:?}", transport.payload_container_type);
                    Ok(None)
                }
            },
            pdu @ (NasPdu::PduSessionEstablishmentAccept(_) | NasPdu::PduSessionEstablishmentReject(_)) => {
                self.handle_sm_message(pdu)
            }
            other => {
                debug!(ue_id = self.ue_id, "Ignoring NAS {}", other.message_type().name());
                Ok(None)
            }
        }
    }

    fn handle_sm_message(&mut self, pdu: NasPdu) -> Result<Option<Vec<u8>>> {
        match pdu {
            NasPdu::PduSessionEstablishmentAccept(accept) => {
                if self.sm_state != SmState::Pending {
                    debug!(ue_id = self.ue_id, state = %self.sm_state, "Unexpected PDU Session Establishment Accept");
                    return Ok(None);
                }
                self.disarm_timer(NasTimer::T3580);
                let session = PduSession {
                    id: accept.pdu_session_id.unwrap_or(DEFAULT_PDU_SESSION_ID),
                    session_type: session_type_name(accept.pdu_session_type).to_string(),
                    dnn: accept.dnn.clone().unwrap_or_else(|| self.config.dnn.clone()),
                    s_nssai: accept.s_nssai.or_else(|| Some(self.config.s_nssai())),
                    address: accept.ipv4_address(),
                };
                self.pdu_sessions.retain(|s| s.id != session.id);
                self.pdu_sessions.push(session);
                self.sm_state = SmState::Active;
                self.event(LogLevel::Info, format!("[UE-{}] PDU session established", self.ue_id));
                Ok(None)
            }
            NasPdu::PduSessionEstablishmentReject(reject) => {
                self.disarm_timer(NasTimer::T3580);
                self.sm_state = SmState::Null;
                self.event(
                    LogLevel::Warn,
                    format!("[UE-{}] PDU session rejected: {:?}", self.ue_id, reject.cause),
                );
                Ok(None)
            }
            other => {
                debug!(ue_id = self.ue_id, "Ignoring 5GSM {}", other.message_type().name());
                Ok(None)
            }
        }
    }

    /// Starts UE-initiated deregistration, returning the uplink NAS message.
    pub fn deregister(&mut self) -> Result<Vec<u8>> {
        if !self.mm.is_registered() {
            return Err(Error::InvalidOperation(format!("UE {} is not registered", self.ue_id)));
        }
        if !self.rrc.state().has_signalling_connection() {
            return Err(Error::InvalidOperation(format!("UE {} has no RRC connection", self.ue_id)));
        }
        let identity = match &self.guti {
            Some(guti) => MobileIdentity::Guti(guti.clone()),
            None => MobileIdentity::Supi(self.config.supi.digits().to_string()),
        };
        let request = DeregistrationRequest::normal(identity).encode()?;
        self.disarm_timer(NasTimer::T3580);
        self.switch_mm(MmSubState::DeregisteredInitiated);
        self.send_nas("Deregistration Request", request)
    }

    /// Processes expired NAS timers, returning any NAS retransmissions.
    pub fn poll_timers(&mut self) -> Result<Vec<Vec<u8>>> {
        let mut uplink = Vec::new();
        for timer in self.timers.check_expired() {
            let kind = *timer.context();
            *self.timer_slot(kind) = None;
            debug!(ue_id = self.ue_id, "{} expired", kind);
            match kind {
                NasTimer::T3510 => {
                    if self.mm.mm_substate() != MmSubState::RegisteredInitiated {
                        continue;
                    }
                    if self.registration_attempts >= MAX_T3510_RETRIES {
                        self.switch_mm(MmSubState::DeregisteredAttemptingRegistration);
                        self.event(
                            LogLevel::Warn,
                            format!("[UE-{}] Registration abandoned after {} attempts", self.ue_id, self.registration_attempts),
                        );
                        continue;
                    }
                    if let Some(request) = self.registration_request.clone() {
                        self.registration_attempts += 1;
                        self.arm_timer(NasTimer::T3510);
                        uplink.push(self.send_nas("Registration Request", request)?);
                    }
                }
                NasTimer::T3580 => {
                    if self.sm_state != SmState::Pending {
                        continue;
                    }
                    if self.pdu_attempts >= MAX_T3580_RETRIES {
                        self.sm_state = SmState::Null;
                        self.event(
                            LogLevel::Warn,
                            format!("[UE-{}] PDU session establishment abandoned", self.ue_id),
                        );
                        continue;
                    }
                    if let Some(request) = self.pdu_request.clone() {
                        self.pdu_attempts += 1;
                        self.arm_timer(NasTimer::T3580);
                        uplink.push(self.send_nas("PDU Session Establishment Request", request)?);
                    }
                }
            }
        }
        Ok(uplink)
    }

    /// Snapshot of every state; does not change the entity.
    pub fn get_state(&self) -> UeSnapshot {
        UeSnapshot {
            ue_id: self.ue_id,
            supi: self.config.supi.to_string(),
            rm_state: self.mm.rm_state().to_string(),
            cm_state: self.mm.cm_state().to_string(),
            mm_state: self.mm.mm_state().to_string(),
            mm_substate: self.mm.mm_substate().to_string(),
            rrc_state: self.rrc.state().to_string(),
            sm_state: self.sm_state.to_string(),
            connected_gnb: self.connected_gnb.clone(),
            camped_cell: self.camped_cell.clone(),
            security_active: self.security.is_valid(),
            pdu_sessions: self.pdu_sessions.clone(),
            periodic_registration_secs: self.periodic_registration_secs,
            running_timers: self.timers.running().iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn get_metrics(&self) -> UeMetrics {
        UeMetrics {
            ue_id: self.ue_id,
            imsi: self.config.supi.digits().to_string(),
            mm_state: self.mm.mm_state().to_string(),
            rrc_state: self.rrc.state().to_string(),
            cm_state: self.mm.cm_state().to_string(),
            sm_state: self.sm_state.to_string(),
            connected: self.rrc.state().is_connected(),
            pdu_sessions: self.pdu_sessions.len(),
            registration_attempts: self.registration_attempts,
            last_registration: self.last_registration,
            stats: self.stats,
        }
    }

    fn build_registration_request(&self) -> Result<Vec<u8>> {
        let mut request = RegistrationRequest::initial(self.config.supi.digits());
        request.mm_capability = Some(MM_CAPABILITY.to_vec());
        request.ue_security_capability = Some(UE_SECURITY_CAPABILITY.to_vec());
        request.requested_nssai = Some(vec![self.config.s_nssai()]);
        Ok(request.encode()?)
    }

    fn start_pdu_session(&mut self) -> Result<Vec<u8>> {
        let mut request = PduSessionEstablishmentRequest::ipv4(DEFAULT_PDU_SESSION_ID, self.config.dnn.clone());
        request.s_nssai = Some(self.requested_slice());
        let bytes = request.encode()?;
        self.pdu_request = Some(bytes.clone());
        self.pdu_attempts = 1;
        self.sm_state = SmState::Pending;
        self.arm_timer(NasTimer::T3580);
        self.send_nas("PDU Session Establishment Request", bytes)
    }

    fn requested_slice(&self) -> SNssai {
        self.config.s_nssai()
    }

    fn complete_deregistration(&mut self) {
        self.disarm_timer(NasTimer::T3510);
        self.disarm_timer(NasTimer::T3580);
        self.pdu_sessions.clear();
        self.sm_state = SmState::Null;
        self.switch_mm(MmSubState::DeregisteredNormalService);
        self.event(LogLevel::Info, format!("[UE-{}] Deregistered", self.ue_id));
    }

    /// Applies integrity protection once a security context exists.
    fn send_nas(&mut self, name: &str, plain: Vec<u8>) -> Result<Vec<u8>> {
        let bytes = if self.security.is_valid() {
            let algorithm = self.security.integrity_algorithm();
            protect(&mut self.security, &plain, AlgorithmType::Integrity, algorithm)?
        } else {
            plain
        };
        self.count_nas_tx(name, &bytes);
        Ok(bytes)
    }

    fn count_nas_tx(&mut self, name: &str, bytes: &[u8]) {
        log_nas_message(Direction::Tx, name, bytes);
        self.stats.nas_tx += 1;
    }

    fn count_rrc_tx(&mut self, message_type: RrcMessageType, bytes: &[u8]) {
        log_rrc_message(Direction::Tx, message_type.name(), bytes);
        self.stats.rrc_tx += 1;
    }

    fn timer_slot(&mut self, kind: NasTimer) -> &mut Option<TimerId> {
        match kind {
            NasTimer::T3510 => &mut self.t3510,
            NasTimer::T3580 => &mut self.t3580,
        }
    }

    fn arm_timer(&mut self, kind: NasTimer) {
        self.disarm_timer(kind);
        let interval = match kind {
            NasTimer::T3510 => self.t3510_interval,
            NasTimer::T3580 => self.t3580_interval,
        };
        let id = self.timers.allocate(interval, kind);
        self.timers.start(id);
        *self.timer_slot(kind) = Some(id);
    }

    fn disarm_timer(&mut self, kind: NasTimer) {
        if let Some(id) = self.timer_slot(kind).take() {
            self.timers.remove(id);
        }
    }

    fn switch_mm(&mut self, substate: MmSubState) {
        if let Some(transition) = self.mm.switch_mm_state(substate) {
            debug!(ue_id = self.ue_id, "MM state {}", transition);
        }
    }

    fn event(&self, level: LogLevel, message: String) {
        match &self.events {
            Some(events) => events.record(level, message),
            None => debug!("{}", message),
        }
    }
}

impl fmt::Debug for UeEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UeEntity")
            .field("ue_id", &self.ue_id)
            .field("supi", &self.config.supi.to_string())
            .field("rrc", &self.rrc.state())
            .field("mm", &self.mm.mm_substate())
            .field("sm", &self.sm_state)
            .finish()
    }
}

/// Rejects downlink messages missing what their handler needs, and decodes
/// the 5GSM message carried in a DL NAS Transport.
fn check_downlink(pdu: &NasPdu) -> Result<Option<NasPdu>> {
    match pdu {
        NasPdu::AuthenticationRequest(request) if request.rand.is_none() => {
            Err(Error::ProtocolDecode("Authentication Request without RAND".into()))
        }
        NasPdu::DlNasTransport(transport)
            if transport.payload_container_type == PayloadContainerType::N1SmInformation =>
        {
            Ok(Some(NasPdu::decode(&transport.payload_container)?))
        }
        _ => Ok(None),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ransim_crypto::derive_authentication_vector;
    use ransim_nas::{
        AuthenticationRequest, DlNasTransport, PduSessionEstablishmentAccept, PduSessionType,
        RegistrationAccept, RegistrationReject, SecurityModeCommand, SelectedAlgorithms,
    };
    use ransim_rrc::{RrcSetupRequest, UeCapabilityEnquiry};

    fn connect(ue: &mut UeEntity) -> Vec<u8> {
        ue.start("gnb-1").unwrap();
        let setup = RrcSetup::with_default_config().encode(0).unwrap();
        ue.handle_rrc_message(&setup).unwrap().unwrap()
    }

    #[test]
    fn test_start_sends_setup_request() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        let bytes = ue.start("gnb-1").unwrap();

        let (_, request) = RrcSetupRequest::decode(&bytes).unwrap();
        assert_eq!(request.establishment_cause, EstablishmentCause::MoSignalling);
        assert_eq!(ue.mm_substate(), MmSubState::DeregisteredNormalService);
        assert_eq!(ue.connected_gnb(), Some("gnb-1"));
    }

    #[test]
    fn test_registration_flow() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        let complete = connect(&mut ue);

        let (_, complete) = RrcSetupComplete::decode(&complete).unwrap();
        let nas = complete.dedicated_nas_message.unwrap();
        assert_eq!(nas[1], 0x41);
        assert_eq!(ue.rrc_state(), RrcState::Connecting);
        assert_eq!(ue.cm_state(), CmState::Connected);
        assert_eq!(ue.mm_substate(), MmSubState::RegisteredInitiated);
        assert_eq!(ue.registration_attempts(), 1);

        let accept = RegistrationAccept::default().encode().unwrap();
        let pdu = ue.handle_nas_message(&accept).unwrap().unwrap();
        assert_eq!(pdu[1], 0xA1);
        match NasPdu::decode(&pdu).unwrap() {
            NasPdu::PduSessionEstablishmentRequest(req) => {
                assert_eq!(req.pdu_session_type, PduSessionType::Ipv4);
                assert_eq!(req.dnn.as_deref(), Some("internet"));
            }
            other => panic!("unexpected {:?}", other.message_type()),
        }
        assert!(ue.is_registered());
        assert_eq!(ue.sm_state(), SmState::Pending);
    }

    #[test]
    fn test_reconfiguration_and_release() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        connect(&mut ue);

        let reconfig = RrcReconfiguration::default().encode(1).unwrap();
        let reply = ue.handle_rrc_message(&reconfig).unwrap().unwrap();
        assert_eq!(RrcMessage::decode(&reply).unwrap().message_type, RrcMessageType::ReconfigurationComplete);
        assert_eq!(ue.rrc_state(), RrcState::Connected);

        let release = RrcRelease::new(ransim_rrc::ReleaseCause::Normal).encode(0).unwrap();
        assert!(ue.handle_rrc_message(&release).unwrap().is_none());
        assert_eq!(ue.rrc_state(), RrcState::Idle);
        assert_eq!(ue.cm_state(), CmState::Idle);
    }

    #[test]
    fn test_undecodable_rrc_leaves_state() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        assert!(ue.handle_rrc_message(&[0x01]).is_err());
        assert!(ue.handle_rrc_message(&[0x01, 0x7F]).is_err());
        assert_eq!(ue.rrc_state(), RrcState::Idle);
        assert_eq!(ue.stats().rrc_rx, 0);
    }

    #[test]
    fn test_release_in_idle_is_ignored() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        let release = RrcRelease::new(ransim_rrc::ReleaseCause::Normal).encode(0).unwrap();
        assert!(ue.handle_rrc_message(&release).unwrap().is_none());
        assert_eq!(ue.rrc_state(), RrcState::Idle);
    }

    #[test]
    fn test_authentication_and_security_mode() {
        let config = UeConfig::default();
        let mut ue = UeEntity::new(1, config.clone());
        connect(&mut ue);

        let rand = [0x5A; 16];
        let request = AuthenticationRequest {
            ng_ksi: 0,
            abba: vec![0x00, 0x00],
            rand: Some(rand),
            autn: Some(vec![0u8; 16]),
        };
        let response = ue.handle_nas_message(&request.encode().unwrap()).unwrap().unwrap();
        let expected = derive_authentication_vector(&config.key, &config.opc, &rand);
        match NasPdu::decode(&response).unwrap() {
            NasPdu::AuthenticationResponse(r) => {
                assert_eq!(r.response_parameter.unwrap(), expected.res.to_vec());
            }
            other => panic!("unexpected {:?}", other.message_type()),
        }

        let command = SecurityModeCommand {
            selected_algorithms: SelectedAlgorithms::new(0, 2),
            ng_ksi: 0,
            replayed_ue_security_capability: None,
        };
        let complete = ue.handle_nas_message(&command.encode().unwrap()).unwrap().unwrap();
        assert_eq!(complete[0], 0x42);

        let kamf = derive_kamf_surrogate(&expected.ck, &expected.ik, config.supi.digits().as_bytes(), &[0, 0]);
        let mut network = NasSecurityContext::new();
        network.install_keys(&kamf, 2, 0);
        let plain = unprotect(&mut network, &complete).unwrap();
        assert!(matches!(NasPdu::decode(&plain).unwrap(), NasPdu::SecurityModeComplete(_)));
        assert!(ue.get_state().security_active);
    }

    /// Runs authentication and security mode, returning the network-side context.
    fn secure(ue: &mut UeEntity, config: &UeConfig) -> NasSecurityContext {
        let rand = [0x3C; 16];
        let request = AuthenticationRequest {
            ng_ksi: 0,
            abba: vec![0x00, 0x00],
            rand: Some(rand),
            autn: Some(vec![0u8; 16]),
        };
        ue.handle_nas_message(&request.encode().unwrap()).unwrap().unwrap();
        let command = SecurityModeCommand {
            selected_algorithms: SelectedAlgorithms::new(0, 2),
            ng_ksi: 0,
            replayed_ue_security_capability: None,
        };
        ue.handle_nas_message(&command.encode().unwrap()).unwrap().unwrap();

        let vector = derive_authentication_vector(&config.key, &config.opc, &rand);
        let kamf = derive_kamf_surrogate(&vector.ck, &vector.ik, config.supi.digits().as_bytes(), &[0, 0]);
        let mut network = NasSecurityContext::new();
        network.install_keys(&kamf, 2, 0);
        network.set_direction(NasDirection::Downlink);
        network
    }

    #[test]
    fn test_undecodable_protected_nas_leaves_state() {
        let config = UeConfig::default();
        let mut ue = UeEntity::new(1, config.clone());
        connect(&mut ue);
        let mut network = secure(&mut ue, &config);

        let count = ue.security.count();
        let stats = ue.stats();

        // Valid MAC around an unknown message type
        let unknown = protect(&mut network, &[0x00, 0x01, 0xAA], AlgorithmType::Integrity, 2).unwrap();
        assert!(ue.handle_nas_message(&unknown).is_err());
        assert_eq!(ue.security.count(), count);
        assert_eq!(ue.stats(), stats);

        // DL NAS Transport whose 5GSM payload does not decode
        let transport = DlNasTransport::n1_sm(1, vec![0x00, 0x01]).encode().unwrap();
        let transport = protect(&mut network, &transport, AlgorithmType::Integrity, 2).unwrap();
        assert!(ue.handle_nas_message(&transport).is_err());
        assert_eq!(ue.security.count(), count);
        assert_eq!(ue.stats(), stats);
        assert_eq!(ue.mm_substate(), MmSubState::RegisteredInitiated);

        // A well-formed message is still accepted afterwards
        let accept = RegistrationAccept::default().encode().unwrap();
        let accept = protect(&mut network, &accept, AlgorithmType::Integrity, 2).unwrap();
        ue.handle_nas_message(&accept).unwrap();
        assert!(ue.is_registered());
        assert_eq!(ue.stats().nas_rx, stats.nas_rx + 1);
    }

    #[test]
    fn test_authentication_request_without_rand_is_dropped() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        connect(&mut ue);
        let stats = ue.stats();

        let request = AuthenticationRequest {
            ng_ksi: 0,
            abba: vec![0x00, 0x00],
            rand: None,
            autn: None,
        };
        assert!(matches!(
            ue.handle_nas_message(&request.encode().unwrap()),
            Err(Error::ProtocolDecode(_))
        ));
        assert_eq!(ue.stats(), stats);
        assert_eq!(ue.mm_substate(), MmSubState::RegisteredInitiated);
    }

    #[test]
    fn test_security_mode_before_authentication_is_rejected() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        let command = SecurityModeCommand {
            selected_algorithms: SelectedAlgorithms::new(0, 2),
            ng_ksi: 0,
            replayed_ue_security_capability: None,
        };
        let reply = ue.handle_nas_message(&command.encode().unwrap()).unwrap().unwrap();
        assert!(matches!(NasPdu::decode(&reply).unwrap(), NasPdu::SecurityModeReject(_)));
    }

    #[test]
    fn test_pdu_session_accept_in_dl_transport() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        connect(&mut ue);
        ue.handle_nas_message(&RegistrationAccept::default().encode().unwrap()).unwrap();

        let mut accept = PduSessionEstablishmentAccept::new(PduSessionType::Ipv4);
        accept.pdu_session_id = Some(1);
        accept.pdu_address = Some(vec![0x01, 10, 45, 0, 2]);
        accept.dnn = Some("internet".to_string());
        let dl = DlNasTransport::n1_sm(1, accept.encode().unwrap()).encode().unwrap();
        assert!(ue.handle_nas_message(&dl).unwrap().is_none());

        assert_eq!(ue.sm_state(), SmState::Active);
        let sessions = ue.pdu_sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_type, "IPv4");
        assert_eq!(sessions[0].dnn, "internet");
        assert_eq!(ue.get_metrics().pdu_sessions, 1);
    }

    #[test]
    fn test_registration_reject() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        connect(&mut ue);
        let reject = RegistrationReject {
            cause: MmCause::PlmnNotAllowed,
        };
        assert!(ue.handle_nas_message(&reject.encode().unwrap()).unwrap().is_none());
        assert_eq!(ue.mm_substate(), MmSubState::DeregisteredLimitedService);
        assert!(ue.get_state().running_timers.is_empty());
    }

    #[test]
    fn test_t3510_retransmits_then_gives_up() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        ue.set_timer_intervals(Duration::ZERO, Duration::ZERO);
        connect(&mut ue);

        for attempt in 2..=MAX_T3510_RETRIES {
            let uplink = ue.poll_timers().unwrap();
            assert_eq!(uplink.len(), 1);
            assert_eq!(uplink[0][1], 0x41);
            assert_eq!(ue.registration_attempts(), attempt);
        }
        assert!(ue.poll_timers().unwrap().is_empty());
        assert_eq!(ue.mm_substate(), MmSubState::DeregisteredAttemptingRegistration);
    }

    #[test]
    fn test_deregistration() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        assert!(ue.deregister().is_err());

        connect(&mut ue);
        ue.handle_nas_message(&RegistrationAccept::default().encode().unwrap()).unwrap();
        let request = ue.deregister().unwrap();
        assert_eq!(request[1], 0x45);
        assert_eq!(ue.mm_substate(), MmSubState::DeregisteredInitiated);

        let accept = ransim_nas::DeregistrationAccept.encode().unwrap();
        ue.handle_nas_message(&accept).unwrap();
        assert_eq!(ue.mm_substate(), MmSubState::DeregisteredNormalService);
        assert_eq!(ue.sm_state(), SmState::Null);
    }

    #[test]
    fn test_capability_enquiry() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        let enquiry = UeCapabilityEnquiry::default().encode(2).unwrap();
        assert!(ue.handle_rrc_message(&enquiry).unwrap().is_none());

        connect(&mut ue);
        let reply = ue.handle_rrc_message(&enquiry).unwrap().unwrap();
        let msg = RrcMessage::decode(&reply).unwrap();
        assert_eq!(msg.message_type, RrcMessageType::UeCapabilityInformation);
        assert_eq!(msg.transaction_id, 2);
    }

    #[test]
    fn test_barred_cell_blocks_start() {
        let mut ue = UeEntity::new(1, UeConfig::default());
        let mut sib1 = Sib1::new(ue.config().hplmn, 1, 0x10);
        sib1.cell_barred = true;
        ue.handle_rrc_message(&sib1.encode(0).unwrap()).unwrap();
        assert!(ue.start("gnb-1").is_err());
        assert_eq!(ue.get_state().camped_cell.unwrap().tac, 1);
    }

    #[test]
    fn test_get_state_does_not_mutate() {
        let mut ue = UeEntity::new(7, UeConfig::default());
        connect(&mut ue);
        let before = ue.stats();
        let a = serde_json::to_value(ue.get_state()).unwrap();
        let b = serde_json::to_value(ue.get_state()).unwrap();
        assert_eq!(a, b);
        assert_eq!(ue.stats(), before);
        assert_eq!(a["rrc_state"], "RRC_CONNECTING");
        assert_eq!(a["mm_state"], "5GMM-REGISTERED-INITIATED");
    }
}
