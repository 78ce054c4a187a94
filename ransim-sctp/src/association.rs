//! SCTP association management for NGAP transport.

use bytes::Bytes;
use sctp_proto::{
    Association, AssociationHandle, ClientConfig, DatagramEvent, Endpoint, EndpointConfig, Event,
    Payload, PayloadProtocolIdentifier, TransportConfig, Transmit,
};
use std::{
    collections::VecDeque,
    io,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{net::UdpSocket, time::timeout};
use tracing::{debug, info, trace, warn};

use crate::{ReceivedMessage, Result, SctpError};

/// Payload Protocol Identifier used on the N2 session
pub const NGAP_PPID: u32 = 0;
/// Default number of SCTP streams for NGAP
pub const DEFAULT_NUM_STREAMS: u16 = 10;
/// Default maximum message size (64KB)
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 65536;
/// Default receive buffer size (256KB)
pub const DEFAULT_RECEIVE_BUFFER_SIZE: u32 = 262144;

/// Largest UDP datagram read in one go
const MAX_DATAGRAM_SIZE: usize = 65536;

/// SCTP association state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationState {
    Closed,
    Connecting,
    Established,
    ShuttingDown,
}

/// Configuration for SCTP association
#[derive(Debug, Clone)]
pub struct SctpConfig {
    pub max_outbound_streams: u16,
    pub max_inbound_streams: u16,
    pub max_message_size: u32,
    pub max_receive_buffer_size: u32,
    pub connect_timeout: Duration,
    pub rto_initial_ms: u64,
    pub rto_min_ms: u64,
    pub rto_max_ms: u64,
}

impl Default for SctpConfig {
    fn default() -> Self {
        Self {
            max_outbound_streams: DEFAULT_NUM_STREAMS,
            max_inbound_streams: DEFAULT_NUM_STREAMS,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
            connect_timeout: Duration::from_secs(30),
            rto_initial_ms: 3000,
            rto_min_ms: 1000,
            rto_max_ms: 60000,
        }
    }
}

impl SctpConfig {
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

/// SCTP association wrapper for NGAP transport (SCTP over UDP)
pub struct SctpAssociation {
    socket: Arc<UdpSocket>,
    remote_addr: SocketAddr,
    local_addr: SocketAddr,
    endpoint: Endpoint,
    handle: AssociationHandle,
    association: Association,
    state: AssociationState,
    pending_transmits: VecDeque<Transmit>,
    open_streams: Vec<u16>,
    config: SctpConfig,
}

impl SctpAssociation {
    /// Connect to a remote SCTP endpoint (AMF) from an ephemeral local port
    pub async fn connect(remote_addr: SocketAddr, config: SctpConfig) -> Result<Self> {
        let local_addr = match remote_addr {
            SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
            SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
        };
        Self::connect_with_local(local_addr, remote_addr, config).await
    }

    /// Connect to a remote SCTP endpoint with a specific local address
    pub async fn connect_with_local(
        local_addr: SocketAddr,
        remote_addr: SocketAddr,
        config: SctpConfig,
    ) -> Result<Self> {
        info!("Connecting to SCTP endpoint at {}", remote_addr);

        let socket = UdpSocket::bind(local_addr).await?;
        let actual_local = socket.local_addr()?;
        debug!("Bound to local address: {}", actual_local);

        let mut endpoint = Endpoint::new(Arc::new(EndpointConfig::new()), None);

        let transport_config = TransportConfig::default()
            .with_max_num_outbound_streams(config.max_outbound_streams)
            .with_max_num_inbound_streams(config.max_inbound_streams)
            .with_max_message_size(config.max_message_size)
            .with_max_receive_buffer_size(config.max_receive_buffer_size)
            .with_rto_initial_ms(config.rto_initial_ms)
            .with_rto_min_ms(config.rto_min_ms)
            .with_rto_max_ms(config.rto_max_ms);

        let mut client_config = ClientConfig::new();
        client_config.transport = Arc::new(transport_config);

        let (handle, association) = endpoint
            .connect(client_config, remote_addr)
            .map_err(|e| SctpError::ConnectionFailed(e.to_string()))?;

        let mut assoc = Self {
            socket: Arc::new(socket),
            remote_addr,
            local_addr: actual_local,
            endpoint,
            handle,
            association,
            state: AssociationState::Connecting,
            pending_transmits: VecDeque::new(),
            open_streams: Vec::new(),
            config,
        };

        assoc.perform_handshake().await?;

        Ok(assoc)
    }

    /// Perform SCTP 4-way handshake
    async fn perform_handshake(&mut self) -> Result<()> {
        let deadline = Instant::now() + self.config.connect_timeout;

        while self.state == AssociationState::Connecting {
            if Instant::now() > deadline {
                self.state = AssociationState::Closed;
                return Err(SctpError::Timeout("Connection handshake timed out".into()));
            }

            self.flush_transmits().await?;
            self.poll_events();

            if !self.association.is_handshaking() {
                self.state = AssociationState::Established;
                info!("SCTP association established with {}", self.remote_addr);
                return Ok(());
            }

            match timeout(Duration::from_millis(100), self.handle_incoming()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Error handling incoming packet: {}", e);
                }
                Err(_) => {
                    trace!("Receive timeout, continuing handshake");
                }
            }
        }

        if self.state == AssociationState::Closed {
            return Err(SctpError::ConnectionFailed(format!(
                "Association with {} lost during handshake",
                self.remote_addr
            )));
        }
        Ok(())
    }

    /// Wait for one UDP packet and feed it to the endpoint
    async fn handle_incoming(&mut self) -> Result<()> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let (len, from) = self.socket.recv_from(&mut buf).await?;
        buf.truncate(len);
        self.handle_datagram(from, buf);
        Ok(())
    }

    fn handle_datagram(&mut self, from: SocketAddr, buf: Vec<u8>) {
        trace!("Received {} bytes from {}", buf.len(), from);

        let now = Instant::now();
        if let Some((handle, event)) = self.endpoint.handle(now, from, None, None, Bytes::from(buf)) {
            if handle == self.handle {
                match event {
                    DatagramEvent::AssociationEvent(assoc_event) => {
                        self.association.handle_event(assoc_event);
                    }
                    DatagramEvent::NewAssociation(_) => {
                        debug!("Ignoring new association event (client mode)");
                    }
                }
            }
        }
    }

    /// Poll for association events and process them
    fn poll_events(&mut self) {
        while let Some(event) = self.association.poll() {
            match event {
                Event::Connected => {
                    debug!("Association connected event");
                    self.state = AssociationState::Established;
                }
                Event::AssociationLost { reason } => {
                    warn!("Association lost: {}", reason);
                    self.state = AssociationState::Closed;
                }
                Event::Stream(stream_event) => {
                    trace!("Stream event: {:?}", stream_event);
                }
                Event::DatagramReceived => {
                    trace!("Datagram received event");
                }
            }
        }

        if let Some(timeout_instant) = self.association.poll_timeout() {
            if Instant::now() >= timeout_instant {
                self.association.handle_timeout(Instant::now());
            }
        }

        while let Some(transmit) = self.association.poll_transmit(Instant::now()) {
            self.pending_transmits.push_back(transmit);
        }

        while let Some(transmit) = self.endpoint.poll_transmit() {
            self.pending_transmits.push_back(transmit);
        }
    }

    /// Flush pending transmits to the network
    async fn flush_transmits(&mut self) -> Result<()> {
        while let Some(transmit) = self.pending_transmits.pop_front() {
            match &transmit.payload {
                Payload::RawEncode(chunks) => {
                    for chunk in chunks {
                        self.socket.send_to(chunk, transmit.remote).await?;
                        trace!("Sent {} bytes to {}", chunk.len(), transmit.remote);
                    }
                }
                Payload::PartialDecode(_) => {
                    trace!("Skipping PartialDecode payload for transmit");
                }
            }
        }
        Ok(())
    }

    /// Send data on a specific stream with the NGAP PPID
    pub async fn send(&mut self, stream_id: u16, data: &[u8]) -> Result<()> {
        self.send_with_ppid(stream_id, data, NGAP_PPID).await
    }

    /// Send data on a specific stream with custom PPID
    pub async fn send_with_ppid(&mut self, stream_id: u16, data: &[u8], ppid: u32) -> Result<()> {
        if self.state != AssociationState::Established {
            return Err(SctpError::InvalidState(
                "Cannot send: association not established".into(),
            ));
        }
        if stream_id >= self.config.max_outbound_streams {
            return Err(SctpError::StreamError(format!(
                "Stream {} outside 0..{}",
                stream_id, self.config.max_outbound_streams
            )));
        }

        let ppi = PayloadProtocolIdentifier::from(ppid);
        let mut stream = self
            .association
            .open_stream(stream_id, ppi)
            .map_err(|e| SctpError::StreamError(e.to_string()))?;
        stream
            .write_with_ppi(data, ppi)
            .map_err(|e| SctpError::StreamError(e.to_string()))?;

        debug!("Queued {} bytes on stream {} with PPID {}", data.len(), stream_id, ppid);

        self.poll_events();
        self.flush_transmits().await?;

        Ok(())
    }

    /// Receive a message, waiting for the network if nothing is buffered
    pub async fn recv(&mut self) -> Result<Option<ReceivedMessage>> {
        if self.state == AssociationState::Closed {
            return Err(SctpError::AssociationClosed);
        }

        loop {
            if let Some(msg) = self.try_recv()? {
                return Ok(Some(msg));
            }

            self.handle_incoming().await?;
            self.poll_events();
            self.flush_transmits().await?;

            if self.state == AssociationState::Closed {
                return Ok(None);
            }
        }
    }

    /// Drain whatever the socket holds without waiting, then return one
    /// buffered message if any.
    pub async fn poll_recv(&mut self) -> Result<Option<ReceivedMessage>> {
        if self.state == AssociationState::Closed {
            return Err(SctpError::AssociationClosed);
        }

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            match self.socket.try_recv_from(&mut buf) {
                Ok((len, from)) => self.handle_datagram(from, buf[..len].to_vec()),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e.into()),
            }
        }
        self.poll_events();
        self.flush_transmits().await?;

        if self.state == AssociationState::Closed {
            return Err(SctpError::AssociationClosed);
        }
        self.try_recv()
    }

    /// Return one message already delivered to a stream (non-blocking)
    pub fn try_recv(&mut self) -> Result<Option<ReceivedMessage>> {
        while let Some(stream) = self.association.accept_stream() {
            let stream_id = stream.stream_identifier();
            debug!("Accepted stream {}", stream_id);
            if !self.open_streams.contains(&stream_id) {
                self.open_streams.push(stream_id);
            }
        }

        for i in 0..self.open_streams.len() {
            let stream_id = self.open_streams[i];
            let Ok(mut stream) = self.association.stream(stream_id) else {
                continue;
            };
            if let Ok(Some(chunks)) = stream.read() {
                let total_len = chunks.len();
                if total_len == 0 {
                    continue;
                }
                let mut buf = vec![0u8; total_len];
                chunks
                    .read(&mut buf)
                    .map_err(|e| SctpError::StreamError(e.to_string()))?;
                let msg = ReceivedMessage {
                    stream_id,
                    data: Bytes::from(buf),
                };
                debug!("Received {} bytes on stream {}", msg.data.len(), stream_id);
                return Ok(Some(msg));
            }
        }

        Ok(None)
    }

    /// Initiate graceful shutdown
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.state == AssociationState::Closed {
            return Ok(());
        }

        info!("Initiating SCTP shutdown");
        self.state = AssociationState::ShuttingDown;

        let _ = self.association.shutdown();
        self.poll_events();
        self.flush_transmits().await?;

        let deadline = Instant::now() + Duration::from_secs(5);
        while self.state == AssociationState::ShuttingDown && Instant::now() < deadline {
            let _ = timeout(Duration::from_millis(100), self.handle_incoming()).await;
            self.poll_events();
            self.flush_transmits().await?;

            if self.association.is_closed() {
                break;
            }
        }

        self.state = AssociationState::Closed;
        info!("SCTP shutdown complete");
        Ok(())
    }

    /// Close the association immediately
    pub fn close(&mut self) {
        if self.state != AssociationState::Closed {
            let _ = self.association.close();
            self.state = AssociationState::Closed;
        }
    }

    pub fn is_established(&self) -> bool {
        self.state == AssociationState::Established
    }

    pub fn state(&self) -> AssociationState {
        self.state
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of outbound streams negotiated for this association
    pub fn num_streams(&self) -> u16 {
        self.config.max_outbound_streams
    }
}

impl Drop for SctpAssociation {
    fn drop(&mut self) {
        self.close();
    }
}
