//! gNB entity
//!
//! Composes the N2 session to the AMF, the gNB-side RRC handler and the table
//! of simulated UEs. All protocol handling happens under one lock on the
//! shared core, so messages for different UEs are processed strictly one
//! after another, whether they come from the management surface or from the
//! NGAP receive loop.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use ransim_common::{
    log_ngap_message, log_rrc_message, Direction, Error, EventLog, GnbConfig, Result, UeConfig,
};
use ransim_ngap::{
    Cause, DownlinkNasTransport, GlobalGnbId, InitialUeMessage, NgSetupRequest, NgapPdu, PagingDrx,
    PlmnSliceItem, RrcEstablishmentCause, SupportedTaItem, UeContextReleaseCommand,
    UeContextReleaseComplete, UeContextReleaseRequest, UplinkNasTransport, UserLocationInfoNr,
};
use ransim_rrc::{
    DlInformationTransfer, EstablishmentCause, RrcMessageBody, RrcMessageType, UlInformationTransfer,
};
use ransim_sctp::DEFAULT_NUM_STREAMS;
use ransim_ue::{SmState, UeEntity, UeMetrics, UeSnapshot};

use crate::ngap::{AmfState, NgapAmfContext, NgapConnection, NgapState, NgapUeContextManager, NON_UE_STREAM};
use crate::rrc::{RrcConnectionManager, RrcOutput};

/// gNB lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GnbState {
    #[default]
    Invalid,
    PoweringOn,
    Configuration,
    WaitingForN2,
    Ready,
    PoweringOff,
    ConnectionRefused,
}

impl fmt::Display for GnbState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GnbState::Invalid => write!(f, "INVALID"),
            GnbState::PoweringOn => write!(f, "POWERING_ON"),
            GnbState::Configuration => write!(f, "CONFIGURATION"),
            GnbState::WaitingForN2 => write!(f, "WAITING_FOR_N2"),
            GnbState::Ready => write!(f, "READY"),
            GnbState::PoweringOff => write!(f, "POWERING_OFF"),
            GnbState::ConnectionRefused => write!(f, "CONNECTION_REFUSED"),
        }
    }
}

/// Point-in-time view of the gNB
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GnbSnapshot {
    pub name: String,
    pub gnb_id: u32,
    pub nci: u64,
    pub tac: u32,
    pub state: GnbState,
    pub ngap_state: NgapState,
    pub amf_connected: bool,
    pub amf_state: AmfState,
    pub amf_name: Option<String>,
    pub cell_barred: bool,
    pub total_ues: usize,
    pub connected_ues: usize,
    pub ue_ids: Vec<u32>,
}

/// gNB counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GnbMetrics {
    pub total_ues: usize,
    /// UEs in RRC_CONNECTED
    pub connected_ues: usize,
    pub registration_requests: u64,
    pub pdu_sessions_established: u64,
    /// RRC/NAS messages crossing the radio side
    pub messages_exchanged: u64,
    pub gnb_state: GnbState,
    pub amf_connected: bool,
    pub ngap_tx: u64,
    pub ngap_rx: u64,
    /// NGAP messages sent, by message name
    pub ngap_tx_by_type: BTreeMap<String, u64>,
}

#[derive(Debug, Default)]
struct Counters {
    registration_requests: u64,
    pdu_sessions_established: u64,
    messages_exchanged: u64,
    ngap_tx: u64,
    ngap_rx: u64,
    ngap_tx_by_type: BTreeMap<String, u64>,
}

/// State shared between the gNB handle and its NGAP receive loop.
#[derive(Debug)]
struct GnbCore {
    config: GnbConfig,
    state: GnbState,
    ngap: NgapConnection,
    amf: NgapAmfContext,
    ngap_ues: NgapUeContextManager,
    rrc: RrcConnectionManager,
    ues: HashMap<u32, UeEntity>,
    next_ue_id: u32,
    counters: Counters,
    events: EventLog,
}

impl GnbCore {
    fn new(config: GnbConfig, events: EventLog) -> Self {
        let rrc = RrcConnectionManager::new(config.cell_barred);
        Self {
            config,
            state: GnbState::Invalid,
            ngap: NgapConnection::new(),
            amf: NgapAmfContext::new(),
            ngap_ues: NgapUeContextManager::new(),
            rrc,
            ues: HashMap::new(),
            next_ue_id: 1,
            counters: Counters::default(),
            events,
        }
    }

    fn set_state(&mut self, state: GnbState) {
        if self.state != state {
            debug!("gNB state {} -> {}", self.state, state);
            self.state = state;
        }
    }

    fn connected_ues(&self) -> usize {
        self.ues.values().filter(|ue| ue.rrc_state().is_connected()).count()
    }

    fn snapshot(&self) -> GnbSnapshot {
        let mut ue_ids: Vec<u32> = self.ues.keys().copied().collect();
        ue_ids.sort_unstable();
        GnbSnapshot {
            name: self.config.name.clone(),
            gnb_id: self.config.gnb_id(),
            nci: self.config.nci,
            tac: self.config.tac,
            state: self.state,
            ngap_state: self.ngap.state(),
            amf_connected: self.ngap.is_connected(),
            amf_state: self.amf.state,
            amf_name: self.amf.amf_name.clone(),
            cell_barred: self.rrc.is_barred(),
            total_ues: self.ues.len(),
            connected_ues: self.connected_ues(),
            ue_ids,
        }
    }

    fn metrics(&self) -> GnbMetrics {
        GnbMetrics {
            total_ues: self.ues.len(),
            connected_ues: self.connected_ues(),
            registration_requests: self.counters.registration_requests,
            pdu_sessions_established: self.counters.pdu_sessions_established,
            messages_exchanged: self.counters.messages_exchanged,
            gnb_state: self.state,
            amf_connected: self.ngap.is_connected(),
            ngap_tx: self.counters.ngap_tx,
            ngap_rx: self.counters.ngap_rx,
            ngap_tx_by_type: self.counters.ngap_tx_by_type.clone(),
        }
    }

    fn ue_mut(&mut self, ue_id: u32) -> Result<&mut UeEntity> {
        self.ues
            .get_mut(&ue_id)
            .ok_or_else(|| Error::InvalidOperation(format!("Unknown UE {ue_id}")))
    }

    fn get_or_create_ue(&mut self, ue_id: u32) -> &mut UeEntity {
        let events = self.events.clone();
        self.next_ue_id = self.next_ue_id.max(ue_id.saturating_add(1));
        self.ues.entry(ue_id).or_insert_with(|| {
            debug!("Creating UE[{}] on first contact", ue_id);
            UeEntity::new(ue_id, UeConfig::default()).with_event_log(events)
        })
    }

    // ------------------------------------------------------------------
    // NGAP send side
    // ------------------------------------------------------------------

    async fn send_ngap(&mut self, stream: u16, pdu: NgapPdu) -> Result<()> {
        let bytes = pdu.encode()?;
        let name = pdu.message_type().name();
        self.ngap.send(stream, &bytes).await?;
        log_ngap_message(Direction::Tx, name, &bytes);
        self.counters.ngap_tx += 1;
        *self.counters.ngap_tx_by_type.entry(name.to_string()).or_default() += 1;
        Ok(())
    }

    async fn send_ng_setup_request(&mut self) -> Result<()> {
        let config = &self.config;
        let slices = if config.nssai.is_empty() {
            vec![ransim_common::SNssai::new(1)]
        } else {
            config.nssai.clone()
        };
        let request = NgSetupRequest {
            global_ran_node_id: GlobalGnbId {
                plmn: config.plmn,
                gnb_id: config.gnb_id(),
                gnb_id_length: config.gnb_id_length,
            },
            ran_node_name: Some(config.name.clone()),
            supported_ta_list: vec![SupportedTaItem {
                tac: config.tac,
                broadcast_plmns: vec![PlmnSliceItem {
                    plmn: config.plmn,
                    slices,
                }],
            }],
            default_paging_drx: PagingDrx::V128,
        };
        self.send_ngap(NON_UE_STREAM, NgapPdu::NgSetupRequest(request)).await?;
        self.amf.on_ng_setup_sent();
        self.events.info(format!("NG Setup Request sent to AMF {}", self.config.amf_addr()));
        Ok(())
    }

    /// Forwards a NAS PDU from `ue_id` to the AMF.
    async fn forward_nas(&mut self, ue_id: u32, nas: Vec<u8>, cause: EstablishmentCause) -> Result<()> {
        let user_location_info = UserLocationInfoNr::new(self.config.plmn, self.config.nci, self.config.tac);
        let ctx = self.ngap_ues.get_or_create(ue_id);
        let ran_ue_ngap_id = ctx.ran_ue_ngap_id;
        let stream = ue_stream(ran_ue_ngap_id);

        let pdu = match ctx.amf_ue_ngap_id {
            Some(amf_ue_ngap_id) => NgapPdu::UplinkNasTransport(UplinkNasTransport {
                amf_ue_ngap_id,
                ran_ue_ngap_id,
                nas_pdu: nas,
                user_location_info,
            }),
            None => {
                info!("Initial UE Message for UE[{}], RAN-UE-NGAP-ID={}", ue_id, ran_ue_ngap_id);
                NgapPdu::InitialUeMessage(InitialUeMessage {
                    ran_ue_ngap_id,
                    nas_pdu: nas,
                    user_location_info,
                    rrc_establishment_cause: ngap_establishment_cause(cause),
                })
            }
        };
        self.send_ngap(stream, pdu).await
    }

    // ------------------------------------------------------------------
    // Radio side
    // ------------------------------------------------------------------

    /// Delivers one downlink RRC message to a UE, returning its reply.
    fn deliver_downlink(&mut self, ue_id: u32, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let ue = self.ue_mut(ue_id)?;
        let before = ue.sm_state();
        let reply = ue.handle_rrc_message(bytes)?;
        let established = before != SmState::Active && ue.sm_state() == SmState::Active;

        self.counters.messages_exchanged += 1;
        if established {
            self.counters.pdu_sessions_established += 1;
            self.events.info(format!("PDU session established for UE[{}]", ue_id));
        }
        Ok(reply)
    }

    /// Runs uplink RRC messages from `ue_id` through the RRC handler until
    /// the exchange settles.
    async fn pump_uplink(&mut self, ue_id: u32, first: Vec<u8>) -> Result<()> {
        let mut queue = VecDeque::from([first]);
        while let Some(uplink) = queue.pop_front() {
            self.counters.messages_exchanged += 1;
            for output in self.rrc.process_uplink(ue_id, &uplink)? {
                match output {
                    RrcOutput::Nas {
                        nas,
                        establishment_cause,
                    } => self.forward_nas(ue_id, nas, establishment_cause).await?,
                    RrcOutput::Downlink(downlink) => {
                        if let Some(reply) = self.deliver_downlink(ue_id, &downlink)? {
                            queue.push_back(reply);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Wraps UE-originated NAS in ULInformationTransfer and sends it up.
    async fn send_ue_nas(&mut self, ue_id: u32, nas: Vec<u8>) -> Result<()> {
        let uplink = UlInformationTransfer::new(nas).encode(0)?;
        log_rrc_message(Direction::Tx, RrcMessageType::UlInformationTransfer.name(), &uplink);
        self.pump_uplink(ue_id, uplink).await
    }

    async fn poll_ue_timers(&mut self) {
        let mut ue_ids: Vec<u32> = self.ues.keys().copied().collect();
        ue_ids.sort_unstable();
        for ue_id in ue_ids {
            let retransmissions = match self.ues.get_mut(&ue_id).map(UeEntity::poll_timers) {
                Some(Ok(nas)) => nas,
                Some(Err(e)) => {
                    warn!("UE[{}] timer handling failed: {}", ue_id, e);
                    continue;
                }
                None => continue,
            };
            for nas in retransmissions {
                if let Err(e) = self.send_ue_nas(ue_id, nas).await {
                    warn!("UE[{}] retransmission failed: {}", ue_id, e);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // NGAP receive side
    // ------------------------------------------------------------------

    async fn handle_ngap(&mut self, bytes: &[u8]) -> Result<()> {
        let pdu = match NgapPdu::decode(bytes) {
            Ok(pdu) => pdu,
            Err(e) => {
                warn!("Dropping undecodable NGAP message: {}", e);
                return Ok(());
            }
        };
        log_ngap_message(Direction::Rx, pdu.message_type().name(), bytes);
        self.counters.ngap_rx += 1;

        match pdu {
            NgapPdu::NgSetupResponse(response) => {
                self.events.info(format!(
                    "NG Setup successful with AMF {} (capacity {})",
                    response.amf_name, response.relative_amf_capacity
                ));
                self.amf.on_ng_setup_response(response);
            }
            NgapPdu::NgSetupFailure(failure) => {
                self.events.error(format!(
                    "NG Setup rejected: {} (time to wait: {:?}s)",
                    failure.cause,
                    failure.time_to_wait.map(|t| t.seconds())
                ));
                self.ngap.disconnect().await;
                self.amf.on_ng_setup_failure(failure.cause, failure.time_to_wait);
                self.set_state(GnbState::ConnectionRefused);
            }
            NgapPdu::DownlinkNasTransport(transport) => self.handle_downlink_nas(transport).await?,
            NgapPdu::UeContextReleaseCommand(command) => self.handle_release_command(command).await?,
            other => debug!("Ignoring NGAP {}", other.message_type().name()),
        }
        Ok(())
    }

    async fn handle_downlink_nas(&mut self, transport: DownlinkNasTransport) -> Result<()> {
        let Some(ue_id) = self.ngap_ues.find_by_ran_id(transport.ran_ue_ngap_id) else {
            warn!(
                "Downlink NAS Transport for unknown RAN-UE-NGAP-ID {}",
                transport.ran_ue_ngap_id
            );
            return Ok(());
        };
        if let Some(ctx) = self.ngap_ues.get_mut(ue_id) {
            if ctx.amf_ue_ngap_id.is_none() {
                debug!("UE[{}] AMF-UE-NGAP-ID={}", ue_id, transport.amf_ue_ngap_id);
            }
            ctx.set_amf_ue_ngap_id(transport.amf_ue_ngap_id);
        }

        let tid = self.rrc.next_tid();
        let downlink = DlInformationTransfer::new(transport.nas_pdu).encode(tid)?;
        log_rrc_message(Direction::Tx, RrcMessageType::DlInformationTransfer.name(), &downlink);
        if let Some(reply) = self.deliver_downlink(ue_id, &downlink)? {
            self.pump_uplink(ue_id, reply).await?;
        }
        Ok(())
    }

    async fn handle_release_command(&mut self, command: UeContextReleaseCommand) -> Result<()> {
        let ids = command.ue_ngap_ids;
        let ue_id = ids
            .ran_ue_ngap_id()
            .and_then(|id| self.ngap_ues.find_by_ran_id(id))
            .or_else(|| self.ngap_ues.find_by_amf_id(ids.amf_ue_ngap_id()));
        let Some(ue_id) = ue_id else {
            warn!("UE Context Release Command for unknown UE ({:?})", ids);
            return Ok(());
        };
        info!("UE Context Release Command for UE[{}], cause {}", ue_id, command.cause);

        if let Some(release) = self.rrc.release_ue(ue_id)? {
            if self.ues.contains_key(&ue_id) {
                self.deliver_downlink(ue_id, &release)?;
            }
        }
        let Some(ctx) = self.ngap_ues.remove(ue_id) else {
            return Ok(());
        };
        let complete = UeContextReleaseComplete {
            amf_ue_ngap_id: ids.amf_ue_ngap_id(),
            ran_ue_ngap_id: ctx.ran_ue_ngap_id,
        };
        self.send_ngap(ue_stream(ctx.ran_ue_ngap_id), NgapPdu::UeContextReleaseComplete(complete))
            .await
    }

    /// Releases the radio side of every UE without signalling the AMF.
    fn release_all_ues(&mut self) {
        let mut ue_ids: Vec<u32> = self.ues.keys().copied().collect();
        ue_ids.sort_unstable();
        for ue_id in ue_ids {
            match self.rrc.release_ue(ue_id) {
                Ok(Some(release)) => {
                    if let Err(e) = self.deliver_downlink(ue_id, &release) {
                        debug!("UE[{}] release delivery failed: {}", ue_id, e);
                    }
                }
                Ok(None) => {}
                Err(e) => debug!("UE[{}] release failed: {}", ue_id, e),
            }
        }
        self.rrc.reset();
        self.ngap_ues.clear();
    }
}

/// SCTP stream for UE-associated signalling; stream 0 is kept for NG Setup.
fn ue_stream(ran_ue_ngap_id: u32) -> u16 {
    let ue_streams = u32::from(DEFAULT_NUM_STREAMS.saturating_sub(1).max(1));
    (1 + ran_ue_ngap_id % ue_streams) as u16
}

fn ngap_establishment_cause(cause: EstablishmentCause) -> RrcEstablishmentCause {
    match cause {
        EstablishmentCause::Emergency => RrcEstablishmentCause::Emergency,
        EstablishmentCause::HighPriorityAccess => RrcEstablishmentCause::HighPriorityAccess,
        EstablishmentCause::MtAccess => RrcEstablishmentCause::MtAccess,
        EstablishmentCause::MoSignalling => RrcEstablishmentCause::MoSignalling,
        EstablishmentCause::MoData => RrcEstablishmentCause::MoData,
        EstablishmentCause::MoVoiceCall | EstablishmentCause::MmtelVoice => RrcEstablishmentCause::MoVoiceCall,
        EstablishmentCause::MoVideoCall | EstablishmentCause::MmtelVideo => RrcEstablishmentCause::MoVideoCall,
        EstablishmentCause::MoSms => RrcEstablishmentCause::MoSms,
        EstablishmentCause::MoImsSignalling => RrcEstablishmentCause::MoSignalling,
    }
}

/// Reads the N2 session until shutdown is signalled or the session ends.
async fn receive_loop(core: Arc<Mutex<GnbCore>>, mut shutdown: watch::Receiver<bool>, idle: Duration) {
    let mut consecutive_errors = 0u32;
    loop {
        if *shutdown.borrow() {
            break;
        }

        let received = {
            let mut core = core.lock().await;
            if !core.ngap.is_connected() {
                if core.state == GnbState::Ready {
                    core.amf.on_disconnect();
                    core.events.warn("Lost N2 connection to AMF");
                }
                break;
            }
            let received = match core.ngap.poll_recv().await {
                Ok(Some(msg)) => {
                    consecutive_errors = 0;
                    if let Err(e) = core.handle_ngap(&msg.data).await {
                        warn!("NGAP message handling failed: {}", e);
                    }
                    true
                }
                Ok(None) => false,
                Err(e) => {
                    consecutive_errors += 1;
                    if consecutive_errors == 1 {
                        warn!("N2 receive error: {}", e);
                    } else {
                        debug!("N2 receive error ({} in a row): {}", consecutive_errors, e);
                    }
                    false
                }
            };
            core.poll_ue_timers().await;
            received
        };

        if !received {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(idle) => {}
            }
        }
    }
    debug!("NGAP receive loop finished");
}

struct ReceiveLoop {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

/// A simulated gNB with its UEs
pub struct GnbEntity {
    core: Arc<Mutex<GnbCore>>,
    receiver: Option<ReceiveLoop>,
}

impl GnbEntity {
    pub fn new(config: GnbConfig) -> Self {
        Self::with_event_log(config, EventLog::default())
    }

    /// Creates a gNB recording management events into `events`.
    pub fn with_event_log(config: GnbConfig, events: EventLog) -> Self {
        Self {
            core: Arc::new(Mutex::new(GnbCore::new(config, events))),
            receiver: None,
        }
    }

    pub async fn state(&self) -> GnbState {
        self.core.lock().await.state
    }

    pub async fn ngap_state(&self) -> NgapState {
        self.core.lock().await.ngap.state()
    }

    pub async fn amf_connected(&self) -> bool {
        self.core.lock().await.ngap.is_connected()
    }

    pub async fn event_log(&self) -> EventLog {
        self.core.lock().await.events.clone()
    }

    /// Powers the gNB on and brings up the N2 session.
    ///
    /// On success NG Setup Request has been sent, the receive loop runs and
    /// the gNB is `Ready`. A failed connection leaves the gNB in
    /// `ConnectionRefused` and is returned as `Error::TransportConnect`.
    pub async fn start(&mut self) -> Result<()> {
        if let Some(running) = &self.receiver {
            if !running.handle.is_finished() {
                return Err(Error::InvalidOperation("gNB is already running".to_string()));
            }
        }
        self.receiver = None;

        let mut core = self.core.lock().await;
        match core.state {
            GnbState::Invalid | GnbState::PoweringOff | GnbState::ConnectionRefused => {}
            other => {
                return Err(Error::InvalidOperation(format!("Cannot start gNB in state {other}")));
            }
        }

        core.set_state(GnbState::PoweringOn);
        core.set_state(GnbState::Configuration);
        if let Err(e) = core.config.validate() {
            core.set_state(GnbState::Invalid);
            core.events.error(format!("Invalid gNB configuration: {e}"));
            return Err(e);
        }

        core.set_state(GnbState::WaitingForN2);
        let config = core.config.clone();
        if let Err(e) = core.ngap.connect(&config).await {
            core.set_state(GnbState::ConnectionRefused);
            core.events.error(format!("Cannot reach AMF at {}: {}", config.amf_addr(), e));
            return Err(e);
        }
        core.events.info(format!("Connected to AMF at {}", config.amf_addr()));

        if let Err(e) = core.send_ng_setup_request().await {
            core.ngap.disconnect().await;
            core.set_state(GnbState::ConnectionRefused);
            core.events.error(format!("NG Setup Request failed: {e}"));
            return Err(e);
        }

        core.set_state(GnbState::Ready);
        core.events.info(format!("gNB {} is ready", config.name));
        drop(core);

        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(receive_loop(self.core.clone(), shutdown_rx, config.idle_interval()));
        self.receiver = Some(ReceiveLoop { handle, shutdown });
        Ok(())
    }

    /// Stops the receive loop, then closes the N2 session.
    ///
    /// Stopping an already stopped gNB does nothing.
    pub async fn stop(&mut self) -> Result<()> {
        let running = self.receiver.take();
        {
            let mut core = self.core.lock().await;
            let idle = running.is_none()
                && !core.ngap.is_connected()
                && matches!(core.state, GnbState::Invalid | GnbState::PoweringOff);
            if idle {
                debug!("gNB already stopped");
                return Ok(());
            }
            core.set_state(GnbState::PoweringOff);
        }

        if let Some(running) = running {
            let _ = running.shutdown.send(true);
            if let Err(e) = running.handle.await {
                warn!("NGAP receive loop ended abnormally: {}", e);
            }
        }

        let mut core = self.core.lock().await;
        core.release_all_ues();
        core.ngap.disconnect().await;
        core.ngap.reset();
        core.amf.on_disconnect();
        core.events.info(format!("gNB {} stopped", core.config.name));
        Ok(())
    }

    /// Adds a UE and lets it camp on the cell, returning its id.
    pub async fn add_ue(&self, config: UeConfig) -> Result<u32> {
        config.validate()?;
        let mut core = self.core.lock().await;
        let ue_id = core.next_ue_id;
        core.next_ue_id += 1;

        let supi = config.supi.to_string();
        let mut ue = UeEntity::new(ue_id, config).with_event_log(core.events.clone());
        let sib1 = core.rrc.build_sib1(core.config.plmn, core.config.tac, core.config.nci)?;
        ue.handle_rrc_message(&sib1)?;
        core.ues.insert(ue_id, ue);
        core.events.info(format!("UE[{}] added ({})", ue_id, supi));
        Ok(ue_id)
    }

    /// Removes a UE, asking the AMF to release its context first.
    pub async fn remove_ue(&self, ue_id: u32) -> Result<()> {
        let mut core = self.core.lock().await;
        if !core.ues.contains_key(&ue_id) {
            return Err(Error::InvalidOperation(format!("Unknown UE {ue_id}")));
        }

        let ids = core
            .ngap_ues
            .get(ue_id)
            .and_then(|ctx| ctx.amf_ue_ngap_id.map(|amf| (amf, ctx.ran_ue_ngap_id)));
        if let (Some((amf_ue_ngap_id, ran_ue_ngap_id)), true) = (ids, core.ngap.is_connected()) {
            let request = UeContextReleaseRequest {
                amf_ue_ngap_id,
                ran_ue_ngap_id,
                cause: Cause::RADIO_NETWORK_USER_INACTIVITY,
            };
            if let Err(e) = core
                .send_ngap(ue_stream(ran_ue_ngap_id), NgapPdu::UeContextReleaseRequest(request))
                .await
            {
                warn!("UE Context Release Request for UE[{}] failed: {}", ue_id, e);
            }
        }

        core.rrc.release_ue(ue_id)?;
        core.ngap_ues.remove(ue_id);
        core.ues.remove(&ue_id);
        core.events.info(format!("UE[{}] removed", ue_id));
        Ok(())
    }

    /// Starts registration of a UE through this gNB.
    pub async fn register_ue(&self, ue_id: u32) -> Result<()> {
        let mut core = self.core.lock().await;
        if core.state != GnbState::Ready || !core.ngap.is_connected() {
            return Err(Error::InvalidOperation(format!(
                "gNB is not ready (state {}, NGAP {})",
                core.state,
                core.ngap.state()
            )));
        }
        let name = core.config.name.clone();
        let request = core.ue_mut(ue_id)?.start(&name)?;
        core.counters.registration_requests += 1;
        core.events.info(format!("Registration started for UE[{}]", ue_id));
        core.pump_uplink(ue_id, request).await
    }

    /// Starts UE-initiated deregistration.
    pub async fn deregister_ue(&self, ue_id: u32) -> Result<()> {
        let mut core = self.core.lock().await;
        if !core.ngap.is_connected() {
            return Err(Error::InvalidOperation("N2 session is down".to_string()));
        }
        let request = core.ue_mut(ue_id)?.deregister()?;
        core.send_ue_nas(ue_id, request).await
    }

    /// Delivers an RRC message to a UE and returns its answer, creating the
    /// UE with the default subscriber on first contact.
    pub async fn handle_ue_rrc(&self, ue_id: u32, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut core = self.core.lock().await;
        let reply = core.get_or_create_ue(ue_id).handle_rrc_message(bytes);
        core.counters.messages_exchanged += 1;
        let reply = reply?;
        if reply.is_some() {
            core.counters.messages_exchanged += 1;
        }
        Ok(reply)
    }

    /// Delivers a NAS message to a UE and returns its answer, creating the
    /// UE with the default subscriber on first contact.
    pub async fn handle_ue_nas(&self, ue_id: u32, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut core = self.core.lock().await;
        let reply = core.get_or_create_ue(ue_id).handle_nas_message(bytes);
        core.counters.messages_exchanged += 1;
        let reply = reply?;
        if reply.is_some() {
            core.counters.messages_exchanged += 1;
        }
        Ok(reply)
    }

    pub async fn snapshot(&self) -> GnbSnapshot {
        self.core.lock().await.snapshot()
    }

    pub async fn metrics(&self) -> GnbMetrics {
        self.core.lock().await.metrics()
    }

    pub async fn ue_snapshot(&self, ue_id: u32) -> Option<UeSnapshot> {
        self.core.lock().await.ues.get(&ue_id).map(UeEntity::get_state)
    }

    pub async fn ue_metrics(&self, ue_id: u32) -> Option<UeMetrics> {
        self.core.lock().await.ues.get(&ue_id).map(UeEntity::get_metrics)
    }

    pub async fn ue_ids(&self) -> Vec<u32> {
        let core = self.core.lock().await;
        let mut ids: Vec<u32> = core.ues.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl Drop for GnbEntity {
    fn drop(&mut self) {
        if let Some(running) = self.receiver.take() {
            let _ = running.shutdown.send(true);
            running.handle.abort();
        }
    }
}

impl fmt::Debug for GnbEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GnbEntity")
            .field("running", &self.receiver.is_some())
            .finish_non_exhaustive()
    }
}
