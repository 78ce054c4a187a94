//! Mock AMF for integration testing
//!
//! Listens on loopback TCP and speaks the length-framed NGAP of
//! [`TcpFramedStream`]. It runs the network half of the procedures the
//! simulator drives:
//!
//! ```text
//! gNB                         MockAmf
//!  │──NGSetupRequest──────────>│
//!  │<─────────NGSetupResponse──│   (or NGSetupFailure)
//!  │──InitialUEMessage────────>│   Registration Request
//!  │<──DownlinkNASTransport────│   Authentication Request
//!  │──UplinkNASTransport──────>│   Authentication Response
//!  │<──DownlinkNASTransport────│   Security Mode Command
//!  │──UplinkNASTransport──────>│   Security Mode Complete (protected)
//!  │<──DownlinkNASTransport────│   Registration Accept (protected)
//!  │──UplinkNASTransport──────>│   PDU Session Establishment Request
//!  │<──DownlinkNASTransport────│   DL NAS Transport / PDU Session Accept
//! ```

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use ransim_common::UeConfig;
use ransim_crypto::{derive_authentication_vector, derive_kamf_surrogate, AuthenticationResult};
use ransim_nas::{
    protect, unprotect, AlgorithmType, AuthenticationReject, AuthenticationRequest, CodecError,
    DeregistrationAccept, DlNasTransport, MmCause, MobileIdentity, NasDirection, NasMessageBody, NasPdu,
    NasSecurityContext, PayloadContainerType, PduSessionEstablishmentAccept, PduSessionEstablishmentReject,
    PduSessionEstablishmentRequest, PduSessionType, RegistrationAccept, RegistrationReject,
    SecurityError, SecurityModeCommand, SelectedAlgorithms, SmCause,
};
use ransim_ngap::{
    Cause, DownlinkNasTransport, Guami, NgSetupFailure, NgSetupResponse, NgapError, NgapPdu, PlmnSliceItem,
    TimeToWait, UeContextReleaseCommand, UeNgapIds,
};
use ransim_sctp::{SctpError, TcpFramedStream};

use crate::test_fixtures::{test_slice, TEST_PLMN};

/// ABBA sent in every Authentication Request
const ABBA: [u8; 2] = [0x00, 0x00];

/// Mock AMF errors
#[derive(Debug, Error)]
pub enum MockAmfError {
    #[error("Bind failed: {0}")]
    Bind(#[from] io::Error),
    #[error("Transport error: {0}")]
    Transport(#[from] SctpError),
    #[error("NGAP error: {0}")]
    Ngap(#[from] NgapError),
    #[error("NAS error: {0}")]
    Nas(#[from] CodecError),
    #[error("NAS security error: {0}")]
    Security(#[from] SecurityError),
    #[error("Unknown RAN-UE-NGAP-ID {0}")]
    UnknownUe(u32),
}

/// How the mock answers NG Setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NgSetupBehaviour {
    Accept,
    Reject {
        cause: Cause,
        time_to_wait: Option<TimeToWait>,
    },
}

/// Mock AMF configuration
#[derive(Debug, Clone)]
pub struct MockAmfConfig {
    pub amf_name: String,
    pub guami: Guami,
    pub plmn_support: Vec<PlmnSliceItem>,
    pub relative_capacity: u8,
    /// Subscriber key shared by every UE the mock authenticates
    pub key: [u8; 16],
    pub opc: [u8; 16],
    pub ng_setup: NgSetupBehaviour,
    /// Reject every Registration Request with this cause
    pub registration_reject: Option<MmCause>,
    pub accept_pdu_sessions: bool,
    /// NIA algorithm selected in the Security Mode Command
    pub integrity_algorithm: u8,
}

impl Default for MockAmfConfig {
    fn default() -> Self {
        let subscriber = UeConfig::default();
        Self {
            amf_name: "mock-amf".to_string(),
            guami: Guami {
                plmn: TEST_PLMN,
                amf_region_id: 0xCA,
                amf_set_id: 0x3F8,
                amf_pointer: 0,
            },
            plmn_support: vec![PlmnSliceItem {
                plmn: TEST_PLMN,
                slices: vec![test_slice()],
            }],
            relative_capacity: 255,
            key: subscriber.key,
            opc: subscriber.opc,
            ng_setup: NgSetupBehaviour::Accept,
            registration_reject: None,
            accept_pdu_sessions: true,
            integrity_algorithm: 2,
        }
    }
}

/// Events emitted by the mock AMF
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAmfEvent {
    GnbConnected(SocketAddr),
    GnbDisconnected(SocketAddr),
    NgSetupReceived { ran_node_name: Option<String> },
    UeRegistered { amf_ue_ngap_id: u64, supi: Option<String> },
    PduSessionEstablished { amf_ue_ngap_id: u64, psi: u8 },
    UeDeregistered { amf_ue_ngap_id: u64 },
    UeContextReleased { amf_ue_ngap_id: u64 },
}

/// UE context as the mock AMF sees it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockUeContext {
    pub amf_ue_ngap_id: u64,
    pub ran_ue_ngap_id: u32,
    pub supi: Option<String>,
    pub authenticated: bool,
    pub registered: bool,
    pub pdu_sessions: Vec<u8>,
    pub released: bool,
}

#[derive(Debug, Default)]
struct SharedState {
    ngap_rx: Vec<String>,
    nas_rx: Vec<String>,
    ues: BTreeMap<u64, MockUeContext>,
    connected_gnbs: usize,
    next_amf_ue_ngap_id: u64,
}

impl SharedState {
    fn allocate_amf_ue_ngap_id(&mut self) -> u64 {
        self.next_amf_ue_ngap_id += 1;
        self.next_amf_ue_ngap_id
    }
}

/// Mock AMF for integration testing
pub struct MockAmf {
    addr: SocketAddr,
    state: Arc<Mutex<SharedState>>,
    event_rx: Mutex<mpsc::UnboundedReceiver<MockAmfEvent>>,
    task: JoinHandle<()>,
}

impl MockAmf {
    /// Starts a mock AMF with the default configuration on an ephemeral port.
    pub async fn start() -> Result<Self, MockAmfError> {
        Self::start_with_config(MockAmfConfig::default()).await
    }

    pub async fn start_with_config(config: MockAmfConfig) -> Result<Self, MockAmfError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(SharedState::default()));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(accept_loop(listener, Arc::new(config), state.clone(), event_tx));
        info!("Mock AMF listening on {}", addr);

        Ok(Self {
            addr,
            state,
            event_rx: Mutex::new(event_rx),
            task,
        })
    }

    /// Listen address to put into the gNB configuration
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Waits for the next event
    pub async fn next_event(&self) -> Option<MockAmfEvent> {
        self.event_rx.lock().await.recv().await
    }

    /// Names of every NGAP message received, in order
    pub async fn received_ngap(&self) -> Vec<String> {
        self.state.lock().await.ngap_rx.clone()
    }

    /// Number of received NGAP messages named `name`
    pub async fn ngap_count(&self, name: &str) -> usize {
        self.state.lock().await.ngap_rx.iter().filter(|n| *n == name).count()
    }

    /// Names of every plain NAS message received, in order
    pub async fn received_nas(&self) -> Vec<String> {
        self.state.lock().await.nas_rx.clone()
    }

    pub async fn connected_gnbs(&self) -> usize {
        self.state.lock().await.connected_gnbs
    }

    pub async fn ue_contexts(&self) -> Vec<MockUeContext> {
        self.state.lock().await.ues.values().cloned().collect()
    }

    pub async fn registered_ue_count(&self) -> usize {
        self.state.lock().await.ues.values().filter(|ue| ue.registered).count()
    }

    pub async fn find_ue_by_supi(&self, supi: &str) -> Option<MockUeContext> {
        self.state
            .lock()
            .await
            .ues
            .values()
            .find(|ue| ue.supi.as_deref() == Some(supi))
            .cloned()
    }

    /// Stops accepting connections and drops every open N2 session
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for MockAmf {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn accept_loop(
    listener: TcpListener,
    config: Arc<MockAmfConfig>,
    state: Arc<Mutex<SharedState>>,
    events: mpsc::UnboundedSender<MockAmfEvent>,
) {
    // Dropped when this task is aborted, closing every open session.
    let mut links = AbortOnDrop(Vec::new());
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Mock AMF accept failed: {}", e);
                return;
            }
        };
        let framed = match TcpFramedStream::from_stream(stream) {
            Ok(framed) => framed,
            Err(e) => {
                warn!("Mock AMF could not wrap connection from {}: {}", peer, e);
                continue;
            }
        };
        let link = GnbLink {
            peer,
            config: config.clone(),
            state: state.clone(),
            events: events.clone(),
            ues: HashMap::new(),
        };
        links.0.push(tokio::spawn(link.run(framed)));
    }
}

struct AbortOnDrop(Vec<JoinHandle<()>>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in self.0.iter() {
            handle.abort();
        }
    }
}

/// Per-UE NAS state kept by one gNB link
struct UeSession {
    amf_ue_ngap_id: u64,
    supi_digits: Option<String>,
    auth: Option<AuthenticationResult>,
    security: NasSecurityContext,
}

/// What a NAS message makes the AMF send back
enum Reply {
    Nas(Vec<u8>),
    Release(Cause),
}

/// One N2 session from a gNB
struct GnbLink {
    peer: SocketAddr,
    config: Arc<MockAmfConfig>,
    state: Arc<Mutex<SharedState>>,
    events: mpsc::UnboundedSender<MockAmfEvent>,
    ues: HashMap<u32, UeSession>,
}

impl GnbLink {
    async fn run(mut self, mut framed: TcpFramedStream) {
        self.state.lock().await.connected_gnbs += 1;
        self.emit(MockAmfEvent::GnbConnected(self.peer));

        'session: loop {
            let message = match framed.recv().await {
                Ok(Some(message)) => message,
                Ok(None) => break,
                Err(e) => {
                    debug!("Mock AMF link to {} failed: {}", self.peer, e);
                    break;
                }
            };
            let replies = match self.handle_ngap(&message.data).await {
                Ok(replies) => replies,
                Err(e) => {
                    warn!("Mock AMF dropped message from {}: {}", self.peer, e);
                    continue;
                }
            };
            for reply in replies {
                if let Err(e) = framed.send(&reply).await {
                    debug!("Mock AMF send to {} failed: {}", self.peer, e);
                    break 'session;
                }
            }
        }

        let _ = framed.shutdown().await;
        self.state.lock().await.connected_gnbs -= 1;
        self.emit(MockAmfEvent::GnbDisconnected(self.peer));
    }

    fn emit(&self, event: MockAmfEvent) {
        let _ = self.events.send(event);
    }

    async fn handle_ngap(&mut self, data: &[u8]) -> Result<Vec<Vec<u8>>, MockAmfError> {
        let pdu = NgapPdu::decode(data)?;
        let name = pdu.message_type().name();
        debug!("Mock AMF <- {}", name);
        self.state.lock().await.ngap_rx.push(name.to_string());

        match pdu {
            NgapPdu::NgSetupRequest(request) => {
                self.emit(MockAmfEvent::NgSetupReceived {
                    ran_node_name: request.ran_node_name,
                });
                let reply = match self.config.ng_setup {
                    NgSetupBehaviour::Accept => NgapPdu::NgSetupResponse(NgSetupResponse {
                        amf_name: self.config.amf_name.clone(),
                        served_guami_list: vec![self.config.guami],
                        relative_amf_capacity: self.config.relative_capacity,
                        plmn_support_list: self.config.plmn_support.clone(),
                    }),
                    NgSetupBehaviour::Reject { cause, time_to_wait } => {
                        NgapPdu::NgSetupFailure(NgSetupFailure { cause, time_to_wait })
                    }
                };
                Ok(vec![reply.encode()?])
            }
            NgapPdu::InitialUeMessage(message) => {
                let amf_ue_ngap_id = {
                    let mut state = self.state.lock().await;
                    let id = state.allocate_amf_ue_ngap_id();
                    state.ues.insert(
                        id,
                        MockUeContext {
                            amf_ue_ngap_id: id,
                            ran_ue_ngap_id: message.ran_ue_ngap_id,
                            ..MockUeContext::default()
                        },
                    );
                    id
                };
                let mut security = NasSecurityContext::new();
                security.set_direction(NasDirection::Downlink);
                self.ues.insert(
                    message.ran_ue_ngap_id,
                    UeSession {
                        amf_ue_ngap_id,
                        supi_digits: None,
                        auth: None,
                        security,
                    },
                );
                self.handle_uplink_nas(message.ran_ue_ngap_id, &message.nas_pdu).await
            }
            NgapPdu::UplinkNasTransport(transport) => {
                self.handle_uplink_nas(transport.ran_ue_ngap_id, &transport.nas_pdu).await
            }
            NgapPdu::UeContextReleaseRequest(request) => {
                let command = UeContextReleaseCommand {
                    ue_ngap_ids: UeNgapIds::Pair {
                        amf_ue_ngap_id: request.amf_ue_ngap_id,
                        ran_ue_ngap_id: request.ran_ue_ngap_id,
                    },
                    cause: request.cause,
                };
                Ok(vec![NgapPdu::UeContextReleaseCommand(command).encode()?])
            }
            NgapPdu::UeContextReleaseComplete(complete) => {
                self.ues.remove(&complete.ran_ue_ngap_id);
                if let Some(ue) = self.state.lock().await.ues.get_mut(&complete.amf_ue_ngap_id) {
                    ue.released = true;
                }
                self.emit(MockAmfEvent::UeContextReleased {
                    amf_ue_ngap_id: complete.amf_ue_ngap_id,
                });
                Ok(Vec::new())
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn handle_uplink_nas(&mut self, ran_ue_ngap_id: u32, nas: &[u8]) -> Result<Vec<Vec<u8>>, MockAmfError> {
        let replies = self.handle_nas(ran_ue_ngap_id, nas).await?;
        let amf_ue_ngap_id = self
            .ues
            .get(&ran_ue_ngap_id)
            .map(|ue| ue.amf_ue_ngap_id)
            .ok_or(MockAmfError::UnknownUe(ran_ue_ngap_id))?;

        let mut out = Vec::with_capacity(replies.len());
        for reply in replies {
            let pdu = match reply {
                Reply::Nas(nas_pdu) => NgapPdu::DownlinkNasTransport(DownlinkNasTransport {
                    amf_ue_ngap_id,
                    ran_ue_ngap_id,
                    nas_pdu,
                }),
                Reply::Release(cause) => NgapPdu::UeContextReleaseCommand(UeContextReleaseCommand {
                    ue_ngap_ids: UeNgapIds::Pair {
                        amf_ue_ngap_id,
                        ran_ue_ngap_id,
                    },
                    cause,
                }),
            };
            out.push(pdu.encode()?);
        }
        Ok(out)
    }

    async fn handle_nas(&mut self, ran_ue_ngap_id: u32, bytes: &[u8]) -> Result<Vec<Reply>, MockAmfError> {
        let config = self.config.clone();
        let session = self
            .ues
            .get_mut(&ran_ue_ngap_id)
            .ok_or(MockAmfError::UnknownUe(ran_ue_ngap_id))?;
        let events = &self.events;
        let plain = unprotect(&mut session.security, bytes)?;
        let pdu = NasPdu::decode(&plain)?;
        let amf_ue_ngap_id = session.amf_ue_ngap_id;

        let mut state = self.state.lock().await;
        state.nas_rx.push(pdu.message_type().name().to_string());
        let Some(ue) = state.ues.get_mut(&amf_ue_ngap_id) else {
            return Ok(Vec::new());
        };

        match pdu {
            NasPdu::RegistrationRequest(request) => {
                if let MobileIdentity::Supi(digits) = &request.mobile_identity {
                    ue.supi = Some(format!("imsi-{digits}"));
                    session.supi_digits = Some(digits.clone());
                }
                if let Some(cause) = config.registration_reject {
                    return Ok(vec![Reply::Nas(RegistrationReject { cause }.encode()?)]);
                }
                let rand: [u8; 16] = rand::random();
                session.auth = Some(derive_authentication_vector(&config.key, &config.opc, &rand));
                let request = AuthenticationRequest {
                    ng_ksi: 0,
                    abba: ABBA.to_vec(),
                    rand: Some(rand),
                    autn: Some(vec![0u8; 16]),
                };
                Ok(vec![Reply::Nas(request.encode()?)])
            }
            NasPdu::AuthenticationResponse(response) => {
                let (Some(vector), Some(digits)) = (session.auth, session.supi_digits.as_deref()) else {
                    return Ok(vec![Reply::Nas(AuthenticationReject.encode()?)]);
                };
                if response.response_parameter.as_deref() != Some(&vector.res[..]) {
                    warn!("Mock AMF: RES mismatch for AMF-UE-NGAP-ID {}", amf_ue_ngap_id);
                    return Ok(vec![Reply::Nas(AuthenticationReject.encode()?)]);
                }
                let kamf = derive_kamf_surrogate(&vector.ck, &vector.ik, digits.as_bytes(), &ABBA);
                session.security.install_keys(&kamf, config.integrity_algorithm, 0);
                session.security.set_direction(NasDirection::Downlink);
                ue.authenticated = true;
                let command = SecurityModeCommand {
                    selected_algorithms: SelectedAlgorithms::new(0, config.integrity_algorithm),
                    ng_ksi: 0,
                    replayed_ue_security_capability: None,
                };
                Ok(vec![Reply::Nas(command.encode()?)])
            }
            NasPdu::SecurityModeComplete(_) => {
                let accept = RegistrationAccept {
                    guti: Some(guti(&config.guami, amf_ue_ngap_id)),
                    allowed_nssai: Some(config.plmn_support.iter().flat_map(|p| p.slices.clone()).collect()),
                    ..RegistrationAccept::default()
                };
                let accept = protect_downlink(&mut session.security, config.integrity_algorithm, &accept.encode()?)?;
                ue.registered = true;
                let _ = events.send(MockAmfEvent::UeRegistered {
                    amf_ue_ngap_id,
                    supi: ue.supi.clone(),
                });
                Ok(vec![Reply::Nas(accept)])
            }
            NasPdu::PduSessionEstablishmentRequest(request) => {
                let (reply, established) = establish_pdu_session(&config, ue, &request)?;
                if let Some(psi) = established {
                    let _ = events.send(MockAmfEvent::PduSessionEstablished { amf_ue_ngap_id, psi });
                }
                let reply = protect_downlink(&mut session.security, config.integrity_algorithm, &reply)?;
                Ok(vec![Reply::Nas(reply)])
            }
            NasPdu::UlNasTransport(transport) => {
                if transport.payload_container_type != PayloadContainerType::N1SmInformation {
                    return Ok(Vec::new());
                }
                let NasPdu::PduSessionEstablishmentRequest(request) = NasPdu::decode(&transport.payload_container)?
                else {
                    return Ok(Vec::new());
                };
                let (reply, established) = establish_pdu_session(&config, ue, &request)?;
                if let Some(psi) = established {
                    let _ = events.send(MockAmfEvent::PduSessionEstablished { amf_ue_ngap_id, psi });
                }
                let reply = protect_downlink(&mut session.security, config.integrity_algorithm, &reply)?;
                Ok(vec![Reply::Nas(reply)])
            }
            NasPdu::DeregistrationRequest(request) => {
                ue.registered = false;
                ue.pdu_sessions.clear();
                let _ = events.send(MockAmfEvent::UeDeregistered { amf_ue_ngap_id });
                let mut replies = Vec::new();
                if !request.is_switch_off() {
                    let accept = DeregistrationAccept.encode()?;
                    replies.push(Reply::Nas(protect_downlink(
                        &mut session.security,
                        config.integrity_algorithm,
                        &accept,
                    )?));
                }
                replies.push(Reply::Release(Cause::NAS_DEREGISTER));
                Ok(replies)
            }
            other => {
                debug!("Mock AMF ignoring NAS {}", other.message_type().name());
                Ok(Vec::new())
            }
        }
    }
}

/// Accepts or rejects a PDU session, returning the plain DL NAS Transport
/// and the id of the session if one was established.
fn establish_pdu_session(
    config: &MockAmfConfig,
    ue: &mut MockUeContext,
    request: &PduSessionEstablishmentRequest,
) -> Result<(Vec<u8>, Option<u8>), MockAmfError> {
    let psi = request.pdu_session_id.unwrap_or(1);
    if !config.accept_pdu_sessions {
        let reject = PduSessionEstablishmentReject {
            pdu_session_id: Some(psi),
            cause: SmCause::InsufficientResources,
        };
        return Ok((DlNasTransport::n1_sm(psi, reject.encode()?).encode()?, None));
    }

    let [a, b, c, d] = ue_address(ue.amf_ue_ngap_id).octets();
    let mut accept = PduSessionEstablishmentAccept::new(PduSessionType::Ipv4);
    accept.pdu_session_id = Some(psi);
    accept.pdu_address = Some(vec![0x01, a, b, c, d]);
    accept.s_nssai = request.s_nssai;
    accept.dnn = request.dnn.clone();
    ue.pdu_sessions.retain(|id| *id != psi);
    ue.pdu_sessions.push(psi);
    Ok((DlNasTransport::n1_sm(psi, accept.encode()?).encode()?, Some(psi)))
}

fn protect_downlink(
    security: &mut NasSecurityContext,
    integrity_algorithm: u8,
    plain: &[u8],
) -> Result<Vec<u8>, MockAmfError> {
    if !security.is_valid() {
        return Ok(plain.to_vec());
    }
    Ok(protect(security, plain, AlgorithmType::Integrity, integrity_algorithm)?)
}

/// Address handed to the UE with AMF-UE-NGAP-ID `id`
pub fn ue_address(id: u64) -> Ipv4Addr {
    Ipv4Addr::new(10, 45, (id >> 8) as u8, id as u8)
}

/// Opaque 5G-GUTI: PLMN, AMF region/set/pointer and a 32-bit 5G-TMSI.
fn guti(guami: &Guami, amf_ue_ngap_id: u64) -> Vec<u8> {
    let mut out = guami.plmn.encode().to_vec();
    out.push(guami.amf_region_id);
    out.push((guami.amf_set_id >> 2) as u8);
    out.push((((guami.amf_set_id & 0x03) as u8) << 6) | (guami.amf_pointer & 0x3F));
    out.extend_from_slice(&(amf_ue_ngap_id as u32).to_be_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guti_layout() {
        let config = MockAmfConfig::default();
        let guti = guti(&config.guami, 0x0102);
        assert_eq!(guti.len(), 10);
        assert_eq!(&guti[..3], &TEST_PLMN.encode());
        assert_eq!(guti[3], 0xCA);
        assert_eq!(&guti[6..], &[0x00, 0x00, 0x01, 0x02]);
    }

    #[test]
    fn test_ue_address() {
        assert_eq!(ue_address(1), Ipv4Addr::new(10, 45, 0, 1));
        assert_eq!(ue_address(0x0203), Ipv4Addr::new(10, 45, 2, 3));
    }

    #[tokio::test]
    async fn test_ng_setup_answered() {
        let amf = MockAmf::start().await.unwrap();
        let stream = tokio::net::TcpStream::connect(amf.addr()).await.unwrap();
        let mut gnb = TcpFramedStream::from_stream(stream).unwrap();

        let request = ransim_ngap::NgSetupRequest {
            global_ran_node_id: ransim_ngap::GlobalGnbId {
                plmn: TEST_PLMN,
                gnb_id: 1,
                gnb_id_length: 32,
            },
            ran_node_name: Some("unit".to_string()),
            supported_ta_list: Vec::new(),
            default_paging_drx: ransim_ngap::PagingDrx::V128,
        };
        gnb.send(&NgapPdu::NgSetupRequest(request).encode().unwrap()).await.unwrap();

        let reply = gnb.recv().await.unwrap().unwrap();
        match NgapPdu::decode(&reply.data).unwrap() {
            NgapPdu::NgSetupResponse(response) => {
                assert_eq!(response.amf_name, "mock-amf");
                assert_eq!(response.served_guami_list.len(), 1);
            }
            other => panic!("unexpected {:?}", other.message_type()),
        }
        assert_eq!(amf.received_ngap().await, ["NGSetupRequest"]);
    }
}
