use std::io;

use async_trait::async_trait;
use byteorder::{BigEndian, ByteOrder};
use chrono::Utc;
use log::{debug, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{ParseError, PingError};
use crate::net_io::packet::{
    create_handshake_packet, create_ping_packet, create_status_request_packet, PacketDecoder,
    RawPacket,
};
use crate::net_io::read_varint;
use crate::network::ParsedServer;
use crate::status::{parse_status, ServerStatus};

/// Byte-stream duplex connection as the session sees it: ordered writes,
/// arbitrarily chunked reads, no message boundaries.
#[async_trait]
pub trait Transport: Send {
    async fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Reads one chunk, returning the number of bytes delivered. Zero
    /// means the peer closed the connection.
    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    async fn close(&mut self) -> io::Result<()>;
}

#[async_trait]
impl Transport for TcpStream {
    async fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes).await
    }

    async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf).await
    }

    async fn close(&mut self) -> io::Result<()> {
        self.shutdown().await
    }
}

const STATUS_RESPONSE_ID: i32 = 0;
const PONG_ID: i32 = 1;

/// Tagged session state; the status rides along once phase one completes.
enum SessionState {
    AwaitingStatus,
    AwaitingPong { status: ServerStatus },
    Done { status: ServerStatus },
}

/// Drives one handshake → status → ping exchange over a [`Transport`].
///
/// Strict request/response: exactly one pending write precedes each
/// expected packet, so phase ordering comes from this state machine and
/// not from the transport.
pub struct PingSession {
    server: ParsedServer,
    protocol_version: i32,
    decoder: PacketDecoder,
}

impl PingSession {
    pub fn new(server: ParsedServer, protocol_version: i32) -> Self {
        Self {
            server,
            protocol_version,
            decoder: PacketDecoder::new(),
        }
    }

    pub async fn run<T: Transport>(mut self, transport: &mut T) -> Result<ServerStatus, PingError> {
        transport
            .write_bytes(&create_handshake_packet(
                self.protocol_version,
                &self.server.hostname,
                self.server.port,
            ))
            .await?;
        transport.write_bytes(&create_status_request_packet()).await?;

        debug!(
            "Handshake and status request sent to {}:{}",
            self.server.hostname, self.server.port
        );

        let mut state = SessionState::AwaitingStatus;
        let mut buffer = [0u8; 1024];

        loop {
            while let Some(packet) = self.decoder.next_packet()? {
                state = match self.dispatch(state, packet, transport).await? {
                    SessionState::Done { status } => return Ok(status),
                    next => next,
                };
            }

            let read = transport.read_chunk(&mut buffer).await?;
            if read == 0 {
                return Err(PingError::Transport(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "Connection closed by server mid-session",
                )));
            }

            self.decoder.digest(&buffer[..read]);
        }
    }

    async fn dispatch<T: Transport>(
        &mut self,
        state: SessionState,
        packet: RawPacket,
        transport: &mut T,
    ) -> Result<SessionState, PingError> {
        match (state, packet.id) {
            (SessionState::AwaitingStatus, STATUS_RESPONSE_ID) => {
                let json = extract_status_json(&packet.payload)?;
                let status = parse_status(&json)?;

                transport
                    .write_bytes(&create_ping_packet(Utc::now().timestamp_millis()))
                    .await?;

                debug!("Status received from {}, awaiting pong", self.server.hostname);

                Ok(SessionState::AwaitingPong { status })
            }
            (SessionState::AwaitingPong { mut status }, PONG_ID) => {
                // Latency is best-effort: a garbled pong payload does not
                // fail a session that already has its status.
                status.ping = decode_pong(&packet.payload);

                Ok(SessionState::Done { status })
            }
            (state, id) => {
                debug!("Ignoring unexpected packet with id {:#01x}", id);
                Ok(state)
            }
        }
    }
}

/// The status response payload is itself length-prefixed JSON:
/// `varint(len) ++ json bytes`.
fn extract_status_json(payload: &[u8]) -> Result<String, ParseError> {
    let (length, prefix_bytes) = read_varint(payload, 0)?.ok_or(ParseError::TruncatedPayload)?;

    if length < 0 {
        return Err(ParseError::InvalidPacketLength(length));
    }

    let end = prefix_bytes + length as usize;
    if payload.len() < end {
        return Err(ParseError::TruncatedPayload);
    }

    Ok(String::from_utf8(payload[prefix_bytes..end].to_vec())?)
}

/// The pong echoes the 8-byte big-endian timestamp the ping carried, so
/// latency is `now - echoed`.
fn decode_pong(payload: &[u8]) -> Option<i64> {
    if payload.len() != 8 {
        warn!(
            "Pong payload has {} bytes instead of 8, reporting no latency",
            payload.len()
        );
        return None;
    }

    let echoed = BigEndian::read_i64(payload);
    Some(Utc::now().timestamp_millis() - echoed)
}
