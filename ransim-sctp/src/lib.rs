//! Message-framed N2 transport for ransim
//!
//! This crate carries NGAP messages between the simulated gNB and the AMF.
//! Two backends are available behind [`AmfTransport`]:
//!
//! - SCTP over UDP through `sctp-proto`'s Sans-IO association, driven with
//!   tokio UDP sockets; multi-stream (10 streams), PPID 0.
//! - TCP with a 4-octet length prefix per message. TCP has no streams, so
//!   every message uses stream 0.
//!
//! # Example (gNB connecting to an AMF over TCP)
//!
//! ```rust,no_run
//! use ransim_common::TransportKind;
//! use ransim_sctp::{AmfTransport, SctpConfig};
//! use std::time::Duration;
//!
//! async fn connect_to_amf() -> Result<(), Box<dyn std::error::Error>> {
//!     let local = "127.0.0.1:0".parse()?;
//!     let amf = "127.0.0.1:38412".parse()?;
//!     let config = SctpConfig::default().with_connect_timeout(Duration::from_secs(2));
//!
//!     let mut transport = AmfTransport::connect(TransportKind::Tcp, local, amf, config).await?;
//!     transport.send(0, b"NGAP message").await?;
//!
//!     if let Some(msg) = transport.poll_recv().await? {
//!         println!("Received on stream {}: {:?}", msg.stream_id, msg.data);
//!     }
//!
//!     transport.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod association;
pub mod tcp;

use std::{io, net::SocketAddr};

use bytes::Bytes;
use ransim_common::TransportKind;
use thiserror::Error;

pub use association::{
    AssociationState, SctpAssociation, SctpConfig, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_NUM_STREAMS,
    DEFAULT_RECEIVE_BUFFER_SIZE, NGAP_PPID,
};
pub use tcp::TcpFramedStream;

/// Transport errors
#[derive(Debug, Error)]
pub enum SctpError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Association closed")]
    AssociationClosed,
    #[error("Stream error: {0}")]
    StreamError(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, SctpError>;

impl From<SctpError> for ransim_common::Error {
    fn from(err: SctpError) -> Self {
        match err {
            SctpError::ConnectionFailed(_) | SctpError::Timeout(_) => {
                ransim_common::Error::TransportConnect(err.to_string())
            }
            other => ransim_common::Error::TransportIo(other.to_string()),
        }
    }
}

/// One received NGAP message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub stream_id: u16,
    pub data: Bytes,
}

/// The N2 session to one AMF
pub enum AmfTransport {
    Sctp(SctpAssociation),
    Tcp(TcpFramedStream),
}

impl AmfTransport {
    pub async fn connect(
        kind: TransportKind,
        local_addr: SocketAddr,
        remote_addr: SocketAddr,
        config: SctpConfig,
    ) -> Result<Self> {
        match kind {
            TransportKind::Sctp => Ok(AmfTransport::Sctp(
                SctpAssociation::connect_with_local(local_addr, remote_addr, config).await?,
            )),
            TransportKind::Tcp => Ok(AmfTransport::Tcp(
                TcpFramedStream::connect(local_addr, remote_addr, config.connect_timeout).await?,
            )),
        }
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            AmfTransport::Sctp(_) => TransportKind::Sctp,
            AmfTransport::Tcp(_) => TransportKind::Tcp,
        }
    }

    /// Send on `stream_id`; TCP ignores the stream.
    pub async fn send(&mut self, stream_id: u16, data: &[u8]) -> Result<()> {
        match self {
            AmfTransport::Sctp(assoc) => assoc.send(stream_id, data).await,
            AmfTransport::Tcp(stream) => stream.send(data).await,
        }
    }

    /// Non-blocking receive: `Ok(None)` when nothing is pending.
    pub async fn poll_recv(&mut self) -> Result<Option<ReceivedMessage>> {
        match self {
            AmfTransport::Sctp(assoc) => assoc.poll_recv().await,
            AmfTransport::Tcp(stream) => stream.try_recv(),
        }
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        match self {
            AmfTransport::Sctp(assoc) => assoc.shutdown().await,
            AmfTransport::Tcp(stream) => stream.shutdown().await,
        }
    }

    pub fn is_established(&self) -> bool {
        match self {
            AmfTransport::Sctp(assoc) => assoc.is_established(),
            AmfTransport::Tcp(stream) => stream.is_established(),
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        match self {
            AmfTransport::Sctp(assoc) => assoc.local_addr(),
            AmfTransport::Tcp(stream) => stream.local_addr(),
        }
    }

    pub fn remote_addr(&self) -> SocketAddr {
        match self {
            AmfTransport::Sctp(assoc) => assoc.remote_addr(),
            AmfTransport::Tcp(stream) => stream.remote_addr(),
        }
    }
}
