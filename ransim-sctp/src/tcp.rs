//! Length-framed TCP transport for NGAP.
//!
//! Each message is a 4-octet big-endian length followed by the message.
//! TCP has no streams, so every message travels on stream 0.

use std::{io, net::SocketAddr, time::Duration};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpSocket, TcpStream},
    time::timeout,
};
use tracing::{debug, info, trace};

use crate::association::DEFAULT_MAX_MESSAGE_SIZE;
use crate::{ReceivedMessage, Result, SctpError};

const FRAME_HEADER_SIZE: usize = 4;

/// A TCP connection carrying length-prefixed NGAP messages
pub struct TcpFramedStream {
    stream: TcpStream,
    read_buf: BytesMut,
    local_addr: SocketAddr,
    remote_addr: SocketAddr,
    max_message_size: usize,
    closed: bool,
}

impl TcpFramedStream {
    /// Connect from `local_addr` to `remote_addr`, giving up after `connect_timeout`
    pub async fn connect(
        local_addr: SocketAddr,
        remote_addr: SocketAddr,
        connect_timeout: Duration,
    ) -> Result<Self> {
        info!("Connecting to TCP endpoint at {}", remote_addr);

        let socket = match remote_addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.bind(local_addr)?;

        let stream = timeout(connect_timeout, socket.connect(remote_addr))
            .await
            .map_err(|_| SctpError::Timeout(format!("Connecting to {remote_addr} timed out")))?
            .map_err(|e| SctpError::ConnectionFailed(format!("{remote_addr}: {e}")))?;

        let framed = Self::from_stream(stream)?;
        info!("TCP connection established with {}", remote_addr);
        Ok(framed)
    }

    /// Wrap an already connected stream, e.g. one returned by a listener
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        Ok(Self {
            local_addr: stream.local_addr()?,
            remote_addr: stream.peer_addr()?,
            stream,
            read_buf: BytesMut::with_capacity(8192),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE as usize,
            closed: false,
        })
    }

    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.closed {
            return Err(SctpError::AssociationClosed);
        }
        if data.len() > self.max_message_size {
            return Err(SctpError::Protocol(format!(
                "Message of {} bytes exceeds {}",
                data.len(),
                self.max_message_size
            )));
        }

        let mut frame = BytesMut::with_capacity(FRAME_HEADER_SIZE + data.len());
        frame.put_u32(data.len() as u32);
        frame.put_slice(data);
        self.stream.write_all(&frame).await?;
        debug!("Sent {} bytes to {}", data.len(), self.remote_addr);
        Ok(())
    }

    /// Splits one complete frame off the read buffer.
    fn take_frame(&mut self) -> Result<Option<Bytes>> {
        if self.read_buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }
        let length = u32::from_be_bytes([
            self.read_buf[0],
            self.read_buf[1],
            self.read_buf[2],
            self.read_buf[3],
        ]) as usize;
        if length > self.max_message_size {
            return Err(SctpError::Protocol(format!(
                "Frame of {} bytes exceeds {}",
                length, self.max_message_size
            )));
        }
        if self.read_buf.len() < FRAME_HEADER_SIZE + length {
            return Ok(None);
        }
        self.read_buf.advance(FRAME_HEADER_SIZE);
        Ok(Some(self.read_buf.split_to(length).freeze()))
    }

    fn message(&self, data: Bytes) -> ReceivedMessage {
        debug!("Received {} bytes from {}", data.len(), self.remote_addr);
        ReceivedMessage { stream_id: 0, data }
    }

    /// Read whatever the socket holds without waiting and return one
    /// complete message if any.
    pub fn try_recv(&mut self) -> Result<Option<ReceivedMessage>> {
        if let Some(data) = self.take_frame()? {
            return Ok(Some(self.message(data)));
        }
        if self.closed {
            return Err(SctpError::AssociationClosed);
        }

        loop {
            match self.stream.try_read_buf(&mut self.read_buf) {
                Ok(0) => {
                    self.closed = true;
                    break;
                }
                Ok(n) => trace!("Read {} bytes from {}", n, self.remote_addr),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e.into()),
            }
        }

        match self.take_frame()? {
            Some(data) => Ok(Some(self.message(data))),
            None if self.closed => Err(SctpError::AssociationClosed),
            None => Ok(None),
        }
    }

    /// Wait for one complete message. `None` means the peer closed cleanly.
    pub async fn recv(&mut self) -> Result<Option<ReceivedMessage>> {
        loop {
            if let Some(data) = self.take_frame()? {
                return Ok(Some(self.message(data)));
            }
            if self.closed {
                return Ok(None);
            }
            if self.stream.read_buf(&mut self.read_buf).await? == 0 {
                self.closed = true;
                if !self.read_buf.is_empty() {
                    return Err(SctpError::Protocol(format!(
                        "Connection closed with {} bytes of a partial frame",
                        self.read_buf.len()
                    )));
                }
            }
        }
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            // The peer may already be gone.
            let _ = self.stream.shutdown().await;
            info!("TCP connection to {} closed", self.remote_addr);
        }
        Ok(())
    }

    pub fn is_established(&self) -> bool {
        !self.closed
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }
}
