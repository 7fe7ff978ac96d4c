//! Wire format for BASP frames.
//!
//! Frame format: `[header:62][payload:N]`
//!
//! Header layout (all integers little-endian):
//!
//! ```text
//! operation:      1 byte   message type tag
//! flags:          1 byte   bit 0 = named-receiver flag
//! payload_len:    4 bytes  u32 byte count of the following payload
//! operation_data: 8 bytes  u64, meaning depends on the operation
//! source_node:   16 bytes  two u64 halves
//! dest_node:     16 bytes  may be the none sentinel
//! source_actor:   8 bytes  u64
//! dest_actor:     8 bytes  u64
//! ```
//!
//! `operation_data` carries the protocol version in handshake frames and
//! the message id in dispatch frames. A payload is present iff
//! `payload_len > 0`; on stream transports it follows as a separate read,
//! on datagram transports header and payload pairs are concatenated
//! within one packet.

use basp_core::{ActorId, INVALID_ACTOR_ID, NodeId};

pub mod payload;

/// Header size: 1 + 1 + 4 + 8 + 16 + 16 + 8 + 8 = 62 bytes.
pub const HEADER_SIZE: usize = 62;

/// Protocol version carried in `operation_data` of handshake frames.
///
/// Peers with differing versions refuse to complete the handshake.
pub const PROTOCOL_VERSION: u64 = 1;

/// Header flag: the dispatch payload starts with a receiver name instead
/// of addressing `dest_actor` by id.
pub const NAMED_RECEIVER_FLAG: u8 = 0x01;

/// Wire format error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Not enough data to parse a header.
    #[error("malformed header: need {needed} bytes, have {have}")]
    MalformedHeader {
        /// Minimum bytes required to parse.
        needed: usize,
        /// Actual bytes available.
        have: usize,
    },

    /// The operation tag does not name a known message type.
    #[error("unknown operation tag: {tag:#04x}")]
    UnknownOperation {
        /// The offending tag byte.
        tag: u8,
    },

    /// Header fields violate the per-operation validity rules.
    #[error("invalid header for {operation:?}")]
    InvalidHeader {
        /// The operation whose rules were violated.
        operation: MessageType,
    },

    /// A typed payload could not be decoded.
    #[error("payload decode failed: {reason}")]
    PayloadDecode {
        /// What went wrong.
        reason: String,
    },

    /// Payload exceeds the configured maximum.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Declared payload size in bytes.
        size: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// BASP message types.
///
/// The tag values are fixed wire constants; unknown tags close the
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// First message on a stream connection, sent by the accepting side.
    ServerHandshake = 0x00,
    /// Reply to a server handshake, completing the route.
    ClientHandshake = 0x01,
    /// An actor-to-actor message.
    DispatchMessage = 0x02,
    /// The source node created a proxy for a local actor.
    AnnounceProxy = 0x03,
    /// An actor the destination node holds a proxy for has terminated.
    KillProxy = 0x04,
    /// Keep-alive with no payload.
    Heartbeat = 0x05,
    /// Datagram-transport counterpart of [`MessageType::ServerHandshake`].
    UdpServerHandshake = 0x06,
    /// Datagram-transport counterpart of [`MessageType::ClientHandshake`].
    UdpClientHandshake = 0x07,
}

impl MessageType {
    /// Decode a wire tag.
    ///
    /// # Errors
    ///
    /// Returns `UnknownOperation` for tags outside the defined set.
    pub fn from_tag(tag: u8) -> Result<Self, WireError> {
        match tag {
            0x00 => Ok(Self::ServerHandshake),
            0x01 => Ok(Self::ClientHandshake),
            0x02 => Ok(Self::DispatchMessage),
            0x03 => Ok(Self::AnnounceProxy),
            0x04 => Ok(Self::KillProxy),
            0x05 => Ok(Self::Heartbeat),
            0x06 => Ok(Self::UdpServerHandshake),
            0x07 => Ok(Self::UdpClientHandshake),
            _ => Err(WireError::UnknownOperation { tag }),
        }
    }

    /// Whether this operation opens a route (any handshake variant).
    pub const fn is_handshake(&self) -> bool {
        matches!(
            self,
            Self::ServerHandshake
                | Self::ClientHandshake
                | Self::UdpServerHandshake
                | Self::UdpClientHandshake
        )
    }
}

/// Fixed-size frame header.
///
/// Headers are serialized field by field in declaration order; see the
/// module docs for the byte layout. `serialize_into` and `deserialize`
/// are exact inverses for every header that passes [`Header::valid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// The message type tag.
    pub operation: MessageType,
    /// Bitfield; only [`NAMED_RECEIVER_FLAG`] is defined.
    pub flags: u8,
    /// Byte count of the following payload (0 ⇒ no payload).
    pub payload_len: u32,
    /// Operation-specific word: version for handshakes, message id for
    /// dispatch frames, 0 otherwise.
    pub operation_data: u64,
    /// Originating node.
    pub source_node: NodeId,
    /// Destination node; `NodeId::NONE` for handshakes without a fixed
    /// destination.
    pub dest_node: NodeId,
    /// Originating actor, `INVALID_ACTOR_ID` for none.
    pub source_actor: ActorId,
    /// Destination actor, `INVALID_ACTOR_ID` for none.
    pub dest_actor: ActorId,
}

fn put_node_id(buf: &mut [u8], node: NodeId) {
    buf[0..8].copy_from_slice(&node.first.to_le_bytes());
    buf[8..16].copy_from_slice(&node.second.to_le_bytes());
}

fn get_u64(buf: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[..8]);
    u64::from_le_bytes(bytes)
}

fn get_node_id(buf: &[u8]) -> NodeId {
    NodeId::new(get_u64(&buf[0..8]), get_u64(&buf[8..16]))
}

impl Header {
    /// Serialize into a buffer of at least `HEADER_SIZE` bytes.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is smaller than `HEADER_SIZE`.
    pub fn serialize_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= HEADER_SIZE);
        buf[0] = self.operation as u8;
        buf[1] = self.flags;
        buf[2..6].copy_from_slice(&self.payload_len.to_le_bytes());
        buf[6..14].copy_from_slice(&self.operation_data.to_le_bytes());
        put_node_id(&mut buf[14..30], self.source_node);
        put_node_id(&mut buf[30..46], self.dest_node);
        buf[46..54].copy_from_slice(&self.source_actor.to_le_bytes());
        buf[54..62].copy_from_slice(&self.dest_actor.to_le_bytes());
    }

    /// Append the serialized header to a write buffer.
    pub fn append_to(&self, buf: &mut Vec<u8>) {
        let start = buf.len();
        buf.resize(start + HEADER_SIZE, 0);
        self.serialize_into(&mut buf[start..]);
    }

    /// Deserialize a header from a buffer.
    ///
    /// # Errors
    ///
    /// Returns `MalformedHeader` on short input and `UnknownOperation`
    /// for undefined tags.
    pub fn deserialize(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < HEADER_SIZE {
            return Err(WireError::MalformedHeader {
                needed: HEADER_SIZE,
                have: buf.len(),
            });
        }
        let operation = MessageType::from_tag(buf[0])?;
        let flags = buf[1];
        let payload_len = u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]);
        let operation_data = get_u64(&buf[6..14]);
        Ok(Self {
            operation,
            flags,
            payload_len,
            operation_data,
            source_node: get_node_id(&buf[14..30]),
            dest_node: get_node_id(&buf[30..46]),
            source_actor: get_u64(&buf[46..54]),
            dest_actor: get_u64(&buf[54..62]),
        })
    }

    /// Check a header flag.
    pub const fn has(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    /// Per-operation validity rules.
    ///
    /// - handshakes carry a payload and a non-none source node;
    /// - heartbeat and announce-proxy carry no payload;
    /// - announce-proxy names a destination actor;
    /// - kill-proxy and dispatch carry a payload;
    /// - dispatch without the named-receiver flag names a destination
    ///   actor.
    pub fn valid(&self) -> bool {
        match self.operation {
            MessageType::ServerHandshake
            | MessageType::ClientHandshake
            | MessageType::UdpServerHandshake
            | MessageType::UdpClientHandshake => {
                self.payload_len > 0 && !self.source_node.is_none()
            }
            MessageType::DispatchMessage => {
                self.payload_len > 0
                    && (self.has(NAMED_RECEIVER_FLAG) || self.dest_actor != INVALID_ACTOR_ID)
            }
            MessageType::AnnounceProxy => {
                self.payload_len == 0 && self.dest_actor != INVALID_ACTOR_ID
            }
            MessageType::KillProxy => self.payload_len > 0,
            MessageType::Heartbeat => self.payload_len == 0,
        }
    }

    /// Whether this frame is part of a handshake exchange.
    pub const fn is_handshake(&self) -> bool {
        self.operation.is_handshake()
    }

    /// Whether this frame is a keep-alive.
    pub const fn is_heartbeat(&self) -> bool {
        matches!(self.operation, MessageType::Heartbeat)
    }
}
