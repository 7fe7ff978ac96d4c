//! Outbound frame construction.
//!
//! Every frame goes through [`write_frame`], which keeps the header
//! bit-identical in byte position to what a reader will decode: when a
//! payload writer is supplied, the header region is reserved first, the
//! payload appended, and the header back-patched with the measured
//! payload length.

use std::collections::BTreeSet;

use basp_core::{ActorId, ExitReason, INVALID_ACTOR_ID, NodeId};

use crate::wire::payload::{self, ClientHandshake, ServerHandshake};
use crate::wire::{HEADER_SIZE, Header, MessageType, PROTOCOL_VERSION, WireError};

/// Callback appending a frame's payload to the write buffer.
pub(crate) type PayloadWriter<'a> = Box<dyn FnOnce(&mut Vec<u8>) -> Result<(), WireError> + 'a>;

/// Append a frame to `buf`.
///
/// With a payload writer, `hdr.payload_len` is computed from the bytes
/// the writer produced and patched into the reserved header region. A
/// writer failure is logged and leaves the buffer in whatever state the
/// writer produced; there is no rollback at this layer.
pub(crate) fn write_frame(buf: &mut Vec<u8>, hdr: &mut Header, writer: Option<PayloadWriter<'_>>) {
    match writer {
        Some(writer) => {
            let start = buf.len();
            buf.resize(start + HEADER_SIZE, 0);
            if let Err(err) = writer(buf) {
                tracing::error!(%err, "payload writer failed");
            }
            let payload_len = buf.len() - start - HEADER_SIZE;
            debug_assert!(payload_len <= u32::MAX as usize);
            hdr.payload_len = payload_len as u32;
            hdr.serialize_into(&mut buf[start..start + HEADER_SIZE]);
        }
        None => hdr.append_to(buf),
    }
}

fn published_parts(
    published: Option<&(ActorId, BTreeSet<String>)>,
) -> (ActorId, BTreeSet<String>) {
    match published {
        Some((aid, interfaces)) => (*aid, interfaces.clone()),
        None => (INVALID_ACTOR_ID, BTreeSet::new()),
    }
}

pub(crate) fn server_handshake_frame(
    app_id: &str,
    this_node: NodeId,
    published: Option<&(ActorId, BTreeSet<String>)>,
    buf: &mut Vec<u8>,
) {
    let (aid, interfaces) = published_parts(published);
    let mut hdr = Header {
        operation: MessageType::ServerHandshake,
        flags: 0,
        payload_len: 0,
        operation_data: PROTOCOL_VERSION,
        source_node: this_node,
        dest_node: NodeId::NONE,
        source_actor: aid,
        dest_actor: INVALID_ACTOR_ID,
    };
    let hs = ServerHandshake {
        app_id: app_id.to_string(),
        published_actor: aid,
        interfaces,
    };
    write_frame(
        buf,
        &mut hdr,
        Some(Box::new(move |buf| {
            hs.encode(buf);
            Ok(())
        })),
    );
}

pub(crate) fn udp_server_handshake_frame(
    app_id: &str,
    this_node: NodeId,
    remote: NodeId,
    published: Option<&(ActorId, BTreeSet<String>)>,
    buf: &mut Vec<u8>,
) {
    let (aid, interfaces) = published_parts(published);
    let mut hdr = Header {
        operation: MessageType::UdpServerHandshake,
        flags: 0,
        payload_len: 0,
        operation_data: PROTOCOL_VERSION,
        source_node: this_node,
        dest_node: remote,
        source_actor: aid,
        dest_actor: INVALID_ACTOR_ID,
    };
    let hs = ServerHandshake {
        app_id: app_id.to_string(),
        published_actor: aid,
        interfaces,
    };
    write_frame(
        buf,
        &mut hdr,
        Some(Box::new(move |buf| {
            hs.encode(buf);
            Ok(())
        })),
    );
}

pub(crate) fn client_handshake_frame(
    app_id: &str,
    this_node: NodeId,
    remote: NodeId,
    buf: &mut Vec<u8>,
) {
    let mut hdr = Header {
        operation: MessageType::ClientHandshake,
        flags: 0,
        payload_len: 0,
        operation_data: PROTOCOL_VERSION,
        source_node: this_node,
        dest_node: remote,
        source_actor: INVALID_ACTOR_ID,
        dest_actor: INVALID_ACTOR_ID,
    };
    let hs = ClientHandshake {
        app_id: app_id.to_string(),
    };
    write_frame(
        buf,
        &mut hdr,
        Some(Box::new(move |buf| {
            hs.encode(buf);
            Ok(())
        })),
    );
}

pub(crate) fn udp_client_handshake_frame(app_id: &str, this_node: NodeId, buf: &mut Vec<u8>) {
    let mut hdr = Header {
        operation: MessageType::UdpClientHandshake,
        flags: 0,
        payload_len: 0,
        operation_data: PROTOCOL_VERSION,
        source_node: this_node,
        dest_node: NodeId::NONE,
        source_actor: INVALID_ACTOR_ID,
        dest_actor: INVALID_ACTOR_ID,
    };
    let hs = ClientHandshake {
        app_id: app_id.to_string(),
    };
    write_frame(
        buf,
        &mut hdr,
        Some(Box::new(move |buf| {
            hs.encode(buf);
            Ok(())
        })),
    );
}

pub(crate) fn announce_proxy_frame(
    this_node: NodeId,
    dest_node: NodeId,
    aid: ActorId,
    buf: &mut Vec<u8>,
) {
    let mut hdr = Header {
        operation: MessageType::AnnounceProxy,
        flags: 0,
        payload_len: 0,
        operation_data: 0,
        source_node: this_node,
        dest_node,
        source_actor: INVALID_ACTOR_ID,
        dest_actor: aid,
    };
    write_frame(buf, &mut hdr, None);
}

pub(crate) fn kill_proxy_frame(
    this_node: NodeId,
    dest_node: NodeId,
    aid: ActorId,
    reason: &ExitReason,
    buf: &mut Vec<u8>,
) {
    let mut hdr = Header {
        operation: MessageType::KillProxy,
        flags: 0,
        payload_len: 0,
        operation_data: 0,
        source_node: this_node,
        dest_node,
        source_actor: aid,
        dest_actor: INVALID_ACTOR_ID,
    };
    write_frame(
        buf,
        &mut hdr,
        Some(Box::new(move |buf| {
            payload::encode_exit_reason(reason, buf);
            Ok(())
        })),
    );
}

pub(crate) fn heartbeat_frame(this_node: NodeId, remote: NodeId, buf: &mut Vec<u8>) {
    let mut hdr = Header {
        operation: MessageType::Heartbeat,
        flags: 0,
        payload_len: 0,
        operation_data: 0,
        source_node: this_node,
        dest_node: remote,
        source_actor: INVALID_ACTOR_ID,
        dest_actor: INVALID_ACTOR_ID,
    };
    write_frame(buf, &mut hdr, None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_frame_backpatches_payload_len() {
        let mut buf = vec![0xEE; 3]; // pre-existing bytes stay untouched
        let mut hdr = Header {
            operation: MessageType::DispatchMessage,
            flags: 0,
            payload_len: 0,
            operation_data: 5,
            source_node: NodeId::new(1, 1),
            dest_node: NodeId::new(2, 2),
            source_actor: 1,
            dest_actor: 2,
        };
        write_frame(
            &mut buf,
            &mut hdr,
            Some(Box::new(|buf| {
                buf.extend_from_slice(b"0123456789");
                Ok(())
            })),
        );

        assert_eq!(hdr.payload_len, 10);
        assert_eq!(buf.len(), 3 + HEADER_SIZE + 10);
        let decoded = Header::deserialize(&buf[3..]).expect("decode");
        assert_eq!(decoded, hdr);
        assert_eq!(&buf[3 + HEADER_SIZE..], b"0123456789");
    }

    #[test]
    fn test_write_frame_without_payload() {
        let mut buf = Vec::new();
        let mut hdr = Header {
            operation: MessageType::Heartbeat,
            flags: 0,
            payload_len: 0,
            operation_data: 0,
            source_node: NodeId::new(1, 1),
            dest_node: NodeId::new(2, 2),
            source_actor: INVALID_ACTOR_ID,
            dest_actor: INVALID_ACTOR_ID,
        };
        write_frame(&mut buf, &mut hdr, None);
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(Header::deserialize(&buf).expect("decode"), hdr);
    }

    #[test]
    fn test_server_handshake_frame_is_valid_and_decodable() {
        let mut buf = Vec::new();
        let published = (7u64, BTreeSet::from(["io".to_string()]));
        server_handshake_frame("app", NodeId::new(9, 9), Some(&published), &mut buf);

        let hdr = Header::deserialize(&buf).expect("decode header");
        assert!(hdr.valid());
        assert_eq!(hdr.operation, MessageType::ServerHandshake);
        assert_eq!(hdr.operation_data, PROTOCOL_VERSION);
        assert_eq!(hdr.source_actor, 7);

        let hs = ServerHandshake::decode(&buf[HEADER_SIZE..]).expect("decode payload");
        assert_eq!(hs.app_id, "app");
        assert_eq!(hs.published_actor, 7);
        assert!(hs.interfaces.contains("io"));
    }

    #[test]
    fn test_heartbeat_frame_is_valid() {
        let mut buf = Vec::new();
        heartbeat_frame(NodeId::new(1, 2), NodeId::new(3, 4), &mut buf);
        let hdr = Header::deserialize(&buf).expect("decode");
        assert!(hdr.valid());
        assert_eq!(hdr.operation, MessageType::Heartbeat);
        assert_eq!(hdr.payload_len, 0);
    }
}
