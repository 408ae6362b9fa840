use byteorder::{BigEndian, WriteBytesExt};

use crate::error::ParseError;
use crate::net_io::{read_varint, varint_length, write_varint};

/// One fully framed packet carved from the receive accumulator.
///
/// `total_bytes` counts the length prefix, the id and the payload; the
/// owner of the accumulator discards exactly that many bytes from the
/// front once the packet has been dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub id: i32,
    pub total_bytes: usize,
    pub payload: Vec<u8>,
}

/// Frames `payload` as `varint(len(id) + len(payload)) ++ varint(id) ++ payload`.
/// The length prefix covers the id and payload, not itself.
pub fn create_packet(id: i32, payload: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(varint_length(id) + payload.len() + MAX_LENGTH_PREFIX);
    write_varint(varint_length(id) as i32 + payload.len() as i32, &mut buffer);
    write_varint(id, &mut buffer);
    buffer.extend_from_slice(payload);
    buffer
}

const MAX_LENGTH_PREFIX: usize = 5;

/// Attempts to carve one packet off the front of `buffer` without
/// mutating it. `Ok(None)` means the frame is incomplete and the caller
/// should accumulate more transport bytes and retry.
pub fn decode_one(buffer: &[u8]) -> Result<Option<RawPacket>, ParseError> {
    let (length, prefix_bytes) = match read_varint(buffer, 0)? {
        Some(decoded) => decoded,
        None => return Ok(None),
    };

    if length < 0 {
        return Err(ParseError::InvalidPacketLength(length));
    }
    let length = length as usize;

    if buffer.len() < prefix_bytes + length {
        return Ok(None);
    }

    let frame = &buffer[prefix_bytes..prefix_bytes + length];
    let (id, id_bytes) = match read_varint(frame, 0)? {
        Some(decoded) => decoded,
        // The length prefix promised more bytes than the id occupies.
        None => return Err(ParseError::InvalidPacketLength(length as i32)),
    };

    Ok(Some(RawPacket {
        id,
        total_bytes: prefix_bytes + length,
        payload: frame[id_bytes..].to_vec(),
    }))
}

/// Receive-side accumulator. The transport digests arbitrarily chunked
/// bytes into it; `next_packet` consumes one whole frame or nothing.
#[derive(Debug, Clone, Default)]
pub struct PacketDecoder {
    staging_buf: Vec<u8>,
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self {
            staging_buf: vec![],
        }
    }

    pub fn digest(&mut self, bytes: &[u8]) {
        self.staging_buf.extend_from_slice(bytes);
    }

    pub fn next_packet(&mut self) -> Result<Option<RawPacket>, ParseError> {
        match decode_one(&self.staging_buf)? {
            Some(packet) => {
                self.staging_buf = self.staging_buf.split_off(packet.total_bytes);
                Ok(Some(packet))
            }
            None => Ok(None),
        }
    }
}

/// Handshake packet (id 0): protocol version, hostname, port, next state 1
/// (status). See https://wiki.vg/Server_List_Ping#Handshake
pub fn create_handshake_packet(protocol_version: i32, hostname: &str, port: u16) -> Vec<u8> {
    let mut payload = vec![];
    write_varint(protocol_version, &mut payload);
    write_varint(hostname.len() as i32, &mut payload);
    payload.extend_from_slice(hostname.as_bytes());
    payload
        .write_u16::<BigEndian>(port)
        .expect("writing to a Vec can not fail");
    write_varint(1, &mut payload);

    create_packet(0, &payload)
}

/// Empty status request packet (id 0).
pub fn create_status_request_packet() -> Vec<u8> {
    create_packet(0, &[])
}

/// Ping packet (id 1) carrying a millisecond timestamp the server echoes
/// back verbatim.
pub fn create_ping_packet(timestamp: i64) -> Vec<u8> {
    let mut payload = vec![];
    payload
        .write_i64::<BigEndian>(timestamp)
        .expect("writing to a Vec can not fail");

    create_packet(1, &payload)
}
