//! Typed payload codecs.
//!
//! Handshake, dispatch, and kill-proxy frames carry structured payloads;
//! everything else on the wire is opaque. Encoding is little-endian with
//! length-prefixed variable fields:
//!
//! ```text
//! string:     [len: u32][bytes: UTF-8]
//! string set: [count: u32][string]*        (sorted order)
//! ref stack:  [count: u32][node: 16][actor: 8]*
//! bytes:      [len: u32][bytes]
//! ```
//!
//! Decoders consume the entire payload; trailing bytes are a decode
//! failure. Fields are written in struct declaration order.

use std::collections::BTreeSet;
use std::io::{Cursor, Read};

use basp_core::{ActorId, ActorRef, ExitReason, NodeId};

use super::WireError;

fn truncated() -> WireError {
    WireError::PayloadDecode {
        reason: "unexpected end of payload".to_string(),
    }
}

fn read_array<const N: usize>(cur: &mut Cursor<&[u8]>) -> Result<[u8; N], WireError> {
    let mut bytes = [0u8; N];
    cur.read_exact(&mut bytes).map_err(|_| truncated())?;
    Ok(bytes)
}

fn read_u32(cur: &mut Cursor<&[u8]>) -> Result<u32, WireError> {
    Ok(u32::from_le_bytes(read_array::<4>(cur)?))
}

fn read_u64(cur: &mut Cursor<&[u8]>) -> Result<u64, WireError> {
    Ok(u64::from_le_bytes(read_array::<8>(cur)?))
}

fn read_node_id(cur: &mut Cursor<&[u8]>) -> Result<NodeId, WireError> {
    let first = read_u64(cur)?;
    let second = read_u64(cur)?;
    Ok(NodeId::new(first, second))
}

fn remaining(cur: &Cursor<&[u8]>) -> usize {
    (cur.get_ref().len() as u64).saturating_sub(cur.position()) as usize
}

fn read_byte_vec(cur: &mut Cursor<&[u8]>) -> Result<Vec<u8>, WireError> {
    let len = read_u32(cur)? as usize;
    if len > remaining(cur) {
        return Err(truncated());
    }
    let mut bytes = vec![0u8; len];
    cur.read_exact(&mut bytes).map_err(|_| truncated())?;
    Ok(bytes)
}

fn read_string(cur: &mut Cursor<&[u8]>) -> Result<String, WireError> {
    String::from_utf8(read_byte_vec(cur)?).map_err(|_| WireError::PayloadDecode {
        reason: "invalid UTF-8 in string field".to_string(),
    })
}

fn read_string_set(cur: &mut Cursor<&[u8]>) -> Result<BTreeSet<String>, WireError> {
    let count = read_u32(cur)?;
    let mut set = BTreeSet::new();
    for _ in 0..count {
        set.insert(read_string(cur)?);
    }
    Ok(set)
}

fn write_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn write_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn write_node_id(buf: &mut Vec<u8>, node: NodeId) {
    write_u64(buf, node.first);
    write_u64(buf, node.second);
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    write_u32(buf, bytes.len() as u32);
    buf.extend_from_slice(bytes);
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_bytes(buf, s.as_bytes());
}

fn write_string_set(buf: &mut Vec<u8>, set: &BTreeSet<String>) {
    write_u32(buf, set.len() as u32);
    for s in set {
        write_string(buf, s);
    }
}

fn finish(cur: Cursor<&[u8]>) -> Result<(), WireError> {
    if remaining(&cur) != 0 {
        return Err(WireError::PayloadDecode {
            reason: format!("{} trailing bytes after payload", remaining(&cur)),
        });
    }
    Ok(())
}

/// Payload of server-handshake frames (stream and datagram variants).
///
/// Carries the application identifier and a description of the actor
/// published on the contacted port, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHandshake {
    /// Application identifier; must match on both sides.
    pub app_id: String,
    /// Actor published on the contacted port, `INVALID_ACTOR_ID` for none.
    pub published_actor: ActorId,
    /// Interface strings of the published actor, empty for none.
    pub interfaces: BTreeSet<String>,
}

impl ServerHandshake {
    /// Append the encoded payload to a write buffer.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        write_string(buf, &self.app_id);
        write_u64(buf, self.published_actor);
        write_string_set(buf, &self.interfaces);
    }

    /// Decode from a payload buffer.
    ///
    /// # Errors
    ///
    /// Returns `PayloadDecode` on truncation, invalid UTF-8, or trailing
    /// bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let mut cur = Cursor::new(buf);
        let app_id = read_string(&mut cur)?;
        let published_actor = read_u64(&mut cur)?;
        let interfaces = read_string_set(&mut cur)?;
        finish(cur)?;
        Ok(Self {
            app_id,
            published_actor,
            interfaces,
        })
    }
}

/// Payload of client-handshake frames (stream and datagram variants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHandshake {
    /// Application identifier; must match on both sides.
    pub app_id: String,
}

impl ClientHandshake {
    /// Append the encoded payload to a write buffer.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        write_string(buf, &self.app_id);
    }

    /// Decode from a payload buffer.
    ///
    /// # Errors
    ///
    /// Returns `PayloadDecode` on truncation, invalid UTF-8, or trailing
    /// bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let mut cur = Cursor::new(buf);
        let app_id = read_string(&mut cur)?;
        finish(cur)?;
        Ok(Self { app_id })
    }
}

/// Payload of dispatch frames.
///
/// The receiver name is present iff the header carries the
/// named-receiver flag; the message bytes are opaque to the engine and
/// handed to the runtime verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPayload {
    /// Name of the receiving service, for named dispatch.
    pub receiver_name: Option<String>,
    /// Forwarding stack accumulated along the message path.
    pub stack: Vec<ActorRef>,
    /// Opaque serialized message.
    pub message: Vec<u8>,
}

impl DispatchPayload {
    /// Append the encoded payload to a write buffer.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        Self::encode_parts(
            self.receiver_name.as_deref(),
            &self.stack,
            &self.message,
            buf,
        );
    }

    /// Encode from borrowed parts, without building a payload value.
    pub fn encode_parts(
        receiver_name: Option<&str>,
        stack: &[ActorRef],
        message: &[u8],
        buf: &mut Vec<u8>,
    ) {
        if let Some(name) = receiver_name {
            write_string(buf, name);
        }
        write_u32(buf, stack.len() as u32);
        for actor in stack {
            write_node_id(buf, actor.node);
            write_u64(buf, actor.id);
        }
        write_bytes(buf, message);
    }

    /// Decode from a payload buffer.
    ///
    /// `named` mirrors the header's named-receiver flag and selects
    /// whether a receiver name leads the payload.
    ///
    /// # Errors
    ///
    /// Returns `PayloadDecode` on truncation, invalid UTF-8, an
    /// implausible stack count, or trailing bytes.
    pub fn decode(buf: &[u8], named: bool) -> Result<Self, WireError> {
        let mut cur = Cursor::new(buf);
        let receiver_name = if named { Some(read_string(&mut cur)?) } else { None };
        let count = read_u32(&mut cur)? as usize;
        // 24 bytes per entry; reject counts the buffer cannot hold
        if count.saturating_mul(24) > remaining(&cur) {
            return Err(truncated());
        }
        let mut stack = Vec::with_capacity(count);
        for _ in 0..count {
            let node = read_node_id(&mut cur)?;
            let id = read_u64(&mut cur)?;
            stack.push(ActorRef::new(node, id));
        }
        let message = read_byte_vec(&mut cur)?;
        finish(cur)?;
        Ok(Self {
            receiver_name,
            stack,
            message,
        })
    }
}

/// Append an encoded exit reason, the payload of kill-proxy frames.
pub fn encode_exit_reason(reason: &ExitReason, buf: &mut Vec<u8>) {
    write_u32(buf, reason.code);
    write_string(buf, &reason.message);
}

/// Decode an exit reason from a kill-proxy payload.
///
/// # Errors
///
/// Returns `PayloadDecode` on truncation, invalid UTF-8, or trailing
/// bytes.
pub fn decode_exit_reason(buf: &[u8]) -> Result<ExitReason, WireError> {
    let mut cur = Cursor::new(buf);
    let code = read_u32(&mut cur)?;
    let message = read_string(&mut cur)?;
    finish(cur)?;
    Ok(ExitReason { code, message })
}
