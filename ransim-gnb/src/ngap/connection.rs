//! AMF Connection Management
//!
//! `NgapConnection` owns the N2 transport session to the AMF and tracks the
//! NGAP session state `Idle → Connecting → Connected → Shutdown`.

use std::fmt;
use std::net::SocketAddr;

use serde::Serialize;
use tracing::{debug, info, warn};

use ransim_common::{Error, GnbConfig, Result, TransportKind};
use ransim_sctp::{AmfTransport, ReceivedMessage, SctpConfig, SctpError};

/// Stream used for non-UE-associated signalling (NG Setup)
pub const NON_UE_STREAM: u16 = 0;

/// NGAP session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NgapState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Shutdown,
}

impl fmt::Display for NgapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NgapState::Idle => write!(f, "IDLE"),
            NgapState::Connecting => write!(f, "CONNECTING"),
            NgapState::Connected => write!(f, "CONNECTED"),
            NgapState::Shutdown => write!(f, "SHUTDOWN"),
        }
    }
}

/// The N2 session to one AMF
#[derive(Default)]
pub struct NgapConnection {
    transport: Option<AmfTransport>,
    state: NgapState,
}

impl NgapConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NgapState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == NgapState::Connected
    }

    pub fn kind(&self) -> Option<TransportKind> {
        self.transport.as_ref().map(AmfTransport::kind)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.transport.as_ref().map(AmfTransport::local_addr)
    }

    /// Opens the transport session described by `config`.
    ///
    /// On failure the state returns to `Idle` and the error is reported as
    /// `Error::TransportConnect`.
    pub async fn connect(&mut self, config: &GnbConfig) -> Result<()> {
        if self.state == NgapState::Connected {
            return Err(Error::InvalidOperation("NGAP session already connected".to_string()));
        }

        let remote = config.amf_addr();
        info!(
            "Connecting to AMF at {} over {:?} (local {})",
            remote,
            config.transport,
            config.local_addr()
        );
        self.state = NgapState::Connecting;

        let sctp_config = SctpConfig::default().with_connect_timeout(config.connect_timeout());
        match AmfTransport::connect(config.transport, config.local_addr(), remote, sctp_config).await {
            Ok(transport) => {
                info!("Connected to AMF at {} from {}", remote, transport.local_addr());
                self.transport = Some(transport);
                self.state = NgapState::Connected;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to connect to AMF at {}: {}", remote, e);
                self.state = NgapState::Idle;
                Err(Error::TransportConnect(format!("{remote}: {e}")))
            }
        }
    }

    /// Sends one NGAP message on `stream`.
    pub async fn send(&mut self, stream: u16, data: &[u8]) -> Result<()> {
        if self.state != NgapState::Connected {
            return Err(Error::InvalidOperation(format!(
                "Cannot send: NGAP session is {}",
                self.state
            )));
        }
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| Error::TransportIo("No transport session".to_string()))?;
        debug!("Sending {} bytes to AMF on stream {}", data.len(), stream);
        transport.send(stream, data).await?;
        Ok(())
    }

    /// Non-blocking read of one message.
    ///
    /// A closed association moves the session to `Shutdown` and yields
    /// `Ok(None)`; other transport errors are returned.
    pub async fn poll_recv(&mut self) -> Result<Option<ReceivedMessage>> {
        if self.state != NgapState::Connected {
            return Ok(None);
        }
        let Some(transport) = self.transport.as_mut() else {
            return Ok(None);
        };
        match transport.poll_recv().await {
            Ok(msg) => Ok(msg),
            Err(SctpError::AssociationClosed) => {
                warn!("AMF closed the N2 session");
                self.transport = None;
                self.state = NgapState::Shutdown;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Closes the transport session. Calling it again is a no-op.
    pub async fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            info!("Closing N2 session to {}", transport.remote_addr());
            if let Err(e) = transport.shutdown().await {
                debug!("Transport shutdown error: {}", e);
            }
        }
        if self.state != NgapState::Idle {
            self.state = NgapState::Shutdown;
        }
    }

    /// Returns a shut-down session to `Idle`.
    pub fn reset(&mut self) {
        if self.transport.is_none() {
            self.state = NgapState::Idle;
        }
    }
}

impl fmt::Debug for NgapConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NgapConnection")
            .field("state", &self.state)
            .field("kind", &self.kind())
            .field("local_addr", &self.local_addr())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::net::TcpListener;

    fn tcp_config(port: u16) -> GnbConfig {
        GnbConfig {
            amf_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            amf_port: port,
            transport: TransportKind::Tcp,
            connect_timeout_ms: 500,
            ..GnbConfig::default()
        }
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Bind then drop to get a port nobody listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut conn = NgapConnection::new();
        let err = conn.connect(&tcp_config(port)).await.unwrap_err();
        assert!(matches!(err, Error::TransportConnect(_)));
        assert_eq!(conn.state(), NgapState::Idle);
        assert!(conn.send(0, &[0x00]).await.is_err());
    }

    #[tokio::test]
    async fn test_connect_send_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });

        let mut conn = NgapConnection::new();
        conn.connect(&tcp_config(port)).await.unwrap();
        assert_eq!(conn.state(), NgapState::Connected);
        assert_eq!(conn.kind(), Some(TransportKind::Tcp));
        let _peer = accept.await.unwrap();

        conn.send(NON_UE_STREAM, &[0x00, 0x01]).await.unwrap();
        assert!(conn.poll_recv().await.unwrap().is_none());

        conn.disconnect().await;
        assert_eq!(conn.state(), NgapState::Shutdown);
        conn.disconnect().await;
        assert_eq!(conn.state(), NgapState::Shutdown);
        conn.reset();
        assert_eq!(conn.state(), NgapState::Idle);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(NgapState::default().to_string(), "IDLE");
        assert_eq!(NgapState::Connected.to_string(), "CONNECTED");
    }
}
