//! The instance dispatcher: parse, validate, classify, dispatch.
//!
//! One [`Instance`] exists per actor system. The broker feeds it raw
//! buffers; it decides per frame whether to forward toward another node,
//! deliver to the local runtime through [`Callee`], or close the
//! channel. All outbound traffic leaves through the routing table's
//! write buffers and the frame writers.
//!
//! ## Stream channels
//!
//! Each stream channel runs a small state machine driven by
//! [`Instance::handle_stream`]:
//!
//! ```text
//! AwaitHeader --[HEADER_SIZE bytes]--> decode
//!   decode fails or invalid      -> CloseConnection
//!   payload_len == 0             -> process -> AwaitHeader
//!   payload_len  > 0             -> AwaitPayload (header retained)
//! AwaitPayload --[payload_len bytes]--> process -> AwaitHeader
//! process fails                  -> CloseConnection
//! ```
//!
//! Entering `CloseConnection` erases every route bound to the handle and
//! purges callee state for each node removed.
//!
//! ## Datagram channels
//!
//! Frames are self-delimiting within one packet: header and payload
//! pairs are concatenated and [`Instance::handle_datagram`] walks them
//! in order. There is no await-payload state; a packet that ends
//! mid-frame fails as a whole.

use std::collections::{BTreeSet, HashMap};

use basp_core::{
    ActorId, ActorRef, Broker, Callee, Handle, INVALID_ACTOR_ID, MessageId, NodeId, Receiver,
};

use crate::config::InstanceConfig;
use crate::error::InstanceError;
use crate::hooks::{Hooks, NoopHooks};
use crate::routing::RoutingTable;
use crate::wire::payload::{ClientHandshake, DispatchPayload, ServerHandshake, decode_exit_reason};
use crate::wire::{HEADER_SIZE, Header, MessageType, NAMED_RECEIVER_FLAG, PROTOCOL_VERSION, WireError};

mod writers;

/// Connection state of one stream channel.
///
/// Tracked by the broker between reads; tells it how many bytes to
/// deliver next and when to tear the channel down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Waiting for exactly `HEADER_SIZE` bytes.
    AwaitHeader,
    /// Waiting for exactly `payload_len` bytes of the retained header.
    AwaitPayload,
    /// Terminal: the channel must be closed.
    CloseConnection,
}

/// Which transport a frame arrived on; selects handshake variants and
/// the forwarding policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportKind {
    Stream,
    Datagram,
}

/// The per-node BASP protocol engine.
///
/// Generic over the runtime's [`Callee`] implementation. All methods run
/// synchronously on the broker's event-loop context and never suspend.
pub struct Instance<C: Callee> {
    config: InstanceConfig,
    this_node: NodeId,
    tbl: RoutingTable,
    callee: C,
    hooks: Box<dyn Hooks>,
    published_actors: HashMap<u16, (ActorId, BTreeSet<String>)>,
}

impl<C: Callee> Instance<C> {
    /// Create an instance for `this_node`.
    ///
    /// # Panics
    ///
    /// Panics if `this_node` is the `none` sentinel; an instance must
    /// know its own identity.
    pub fn new(config: InstanceConfig, this_node: NodeId, callee: C) -> Self {
        assert!(!this_node.is_none(), "instance requires a node identity");
        Self {
            config,
            this_node,
            tbl: RoutingTable::new(),
            callee,
            hooks: Box::new(NoopHooks),
            published_actors: HashMap::new(),
        }
    }

    /// Attach an observer for hook notifications.
    pub fn with_hooks(mut self, hooks: impl Hooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// The local node identity.
    pub fn this_node(&self) -> NodeId {
        self.this_node
    }

    /// The routing table.
    pub fn tbl(&self) -> &RoutingTable {
        &self.tbl
    }

    /// The routing table, mutable.
    pub fn tbl_mut(&mut self) -> &mut RoutingTable {
        &mut self.tbl
    }

    /// The runtime callback surface.
    pub fn callee(&self) -> &C {
        &self.callee
    }

    /// The runtime callback surface, mutable.
    pub fn callee_mut(&mut self) -> &mut C {
        &mut self.callee
    }

    // =========================================================================
    // Inbound: stream transport
    // =========================================================================

    /// Process one read event on a stream channel.
    ///
    /// `hdr` is the per-channel header accumulator owned by the caller:
    /// `None` means the channel awaits a header and `buf` must hold
    /// exactly `HEADER_SIZE` bytes; `Some` means it awaits the retained
    /// header's payload and `buf` must hold exactly `payload_len` bytes.
    /// The accumulator holds a header on return iff the returned state
    /// is [`ConnectionState::AwaitPayload`].
    pub fn handle_stream(
        &mut self,
        broker: &mut dyn Broker,
        handle: Handle,
        buf: &[u8],
        hdr: &mut Option<Header>,
    ) -> ConnectionState {
        match hdr.take() {
            None => {
                if buf.len() != HEADER_SIZE {
                    return self.close_on(
                        handle,
                        WireError::MalformedHeader {
                            needed: HEADER_SIZE,
                            have: buf.len(),
                        }
                        .into(),
                    );
                }
                let decoded = match self.decode_and_check(buf) {
                    Ok(h) => h,
                    Err(err) => return self.close_on(handle, err),
                };
                if decoded.payload_len > 0 {
                    tracing::debug!(?decoded, "awaiting payload");
                    *hdr = Some(decoded);
                    return ConnectionState::AwaitPayload;
                }
                self.process_or_close(broker, handle, &decoded, None, TransportKind::Stream, None)
            }
            Some(retained) => {
                if buf.len() != retained.payload_len as usize {
                    tracing::warn!(
                        expected = retained.payload_len,
                        got = buf.len(),
                        "received invalid payload"
                    );
                    return self.close_on(
                        handle,
                        WireError::PayloadDecode {
                            reason: "payload size does not match header".to_string(),
                        }
                        .into(),
                    );
                }
                self.process_or_close(
                    broker,
                    handle,
                    &retained,
                    Some(buf),
                    TransportKind::Stream,
                    None,
                )
            }
        }
    }

    fn process_or_close(
        &mut self,
        broker: &mut dyn Broker,
        handle: Handle,
        hdr: &Header,
        payload: Option<&[u8]>,
        transport: TransportKind,
        local_port: Option<u16>,
    ) -> ConnectionState {
        match self.process_frame(broker, handle, hdr, payload, transport, local_port) {
            Ok(()) => ConnectionState::AwaitHeader,
            Err(err) => self.close_on(handle, err),
        }
    }

    fn close_on(&mut self, handle: Handle, err: InstanceError) -> ConnectionState {
        tracing::warn!(%handle, %err, "closing connection");
        self.purge(handle);
        ConnectionState::CloseConnection
    }

    fn purge(&mut self, handle: Handle) {
        let callee = &mut self.callee;
        self.tbl.erase_handle(handle, |node| callee.purge_state(node));
    }

    fn decode_and_check(&self, buf: &[u8]) -> Result<Header, InstanceError> {
        let hdr = Header::deserialize(buf)?;
        if !hdr.valid() {
            tracing::warn!(?hdr, "received invalid header");
            return Err(WireError::InvalidHeader {
                operation: hdr.operation,
            }
            .into());
        }
        if hdr.payload_len as usize > self.config.max_payload_len {
            return Err(WireError::PayloadTooLarge {
                size: hdr.payload_len as usize,
                max: self.config.max_payload_len,
            }
            .into());
        }
        Ok(hdr)
    }

    // =========================================================================
    // Inbound: datagram transport
    // =========================================================================

    /// Process one datagram packet.
    ///
    /// A packet carries one or more concatenated `(header | payload)`
    /// pairs; they are processed in order. `local_port` is the port the
    /// packet arrived on, used to look up the published actor for a UDP
    /// handshake reply.
    ///
    /// Returns `false` if the packet was malformed or a frame failed,
    /// in which case all routing state for `handle` has been purged and
    /// the handle should no longer be used.
    pub fn handle_datagram(
        &mut self,
        broker: &mut dyn Broker,
        handle: Handle,
        local_port: Option<u16>,
        buf: &[u8],
    ) -> bool {
        let mut pos = 0;
        loop {
            let Some(hdr_bytes) = buf.get(pos..pos + HEADER_SIZE) else {
                tracing::warn!(%handle, "datagram packet ends mid-header");
                self.purge(handle);
                return false;
            };
            let hdr = match self.decode_and_check(hdr_bytes) {
                Ok(h) => h,
                Err(err) => {
                    tracing::warn!(%handle, %err, "dropping datagram channel");
                    self.purge(handle);
                    return false;
                }
            };
            pos += HEADER_SIZE;
            let payload = if hdr.payload_len > 0 {
                let end = pos + hdr.payload_len as usize;
                let Some(bytes) = buf.get(pos..end) else {
                    tracing::warn!(%handle, "datagram packet ends mid-payload");
                    self.purge(handle);
                    return false;
                };
                pos = end;
                Some(bytes)
            } else {
                None
            };
            if let Err(err) =
                self.process_frame(broker, handle, &hdr, payload, TransportKind::Datagram, local_port)
            {
                tracing::warn!(%handle, %err, "dropping datagram channel");
                self.purge(handle);
                return false;
            }
            if pos >= buf.len() {
                return true;
            }
        }
    }

    // =========================================================================
    // The dispatcher
    // =========================================================================

    fn process_frame(
        &mut self,
        broker: &mut dyn Broker,
        handle: Handle,
        hdr: &Header,
        payload: Option<&[u8]>,
        transport: TransportKind,
        local_port: Option<u16>,
    ) -> Result<(), InstanceError> {
        tracing::debug!(?hdr, "processing frame");
        // needs forwarding?
        if !hdr.is_handshake() && !hdr.is_heartbeat() && hdr.dest_node != self.this_node {
            return match transport {
                TransportKind::Stream => {
                    self.forward(broker, hdr, payload);
                    Ok(())
                }
                // no datagram forwarding; drop the frame and the channel
                TransportKind::Datagram => Err(InstanceError::NoRoute {
                    dest: hdr.dest_node,
                }),
            };
        }
        match hdr.operation {
            MessageType::ServerHandshake => match transport {
                TransportKind::Stream => {
                    self.handle_server_handshake(broker, handle, hdr, payload, transport)
                }
                TransportKind::Datagram => {
                    tracing::warn!("ignoring stream server handshake on datagram channel");
                    Ok(())
                }
            },
            MessageType::UdpServerHandshake => match transport {
                TransportKind::Datagram => {
                    self.handle_server_handshake(broker, handle, hdr, payload, transport)
                }
                TransportKind::Stream => {
                    tracing::warn!("ignoring UDP server handshake on stream channel");
                    Ok(())
                }
            },
            MessageType::ClientHandshake => match transport {
                TransportKind::Stream => self.handle_client_handshake(handle, hdr, payload),
                TransportKind::Datagram => {
                    tracing::warn!("ignoring stream client handshake on datagram channel");
                    Ok(())
                }
            },
            MessageType::UdpClientHandshake => match transport {
                TransportKind::Datagram => {
                    self.handle_udp_client_handshake(broker, handle, hdr, payload, local_port)
                }
                TransportKind::Stream => {
                    tracing::warn!("ignoring UDP client handshake on stream channel");
                    Ok(())
                }
            },
            MessageType::DispatchMessage => self.handle_dispatch(hdr, payload),
            MessageType::AnnounceProxy => {
                self.callee.proxy_announced(hdr.source_node, hdr.dest_actor);
                Ok(())
            }
            MessageType::KillProxy => {
                let reason = decode_exit_reason(require_payload(payload)?)?;
                self.callee.kill_proxy(hdr.source_node, hdr.source_actor, reason);
                Ok(())
            }
            MessageType::Heartbeat => {
                tracing::debug!(node = %hdr.source_node, "received heartbeat");
                self.callee.handle_heartbeat(hdr.source_node);
                Ok(())
            }
        }
    }

    fn forward(&mut self, broker: &mut dyn Broker, hdr: &Header, payload: Option<&[u8]>) {
        if let Some(path) = self.tbl.lookup(hdr.dest_node) {
            tracing::debug!(dest = %hdr.dest_node, next_hop = %path.next_hop, "forwarding frame");
            let buf = self.tbl.wr_buf(path.handle);
            hdr.append_to(buf);
            if let Some(bytes) = payload {
                buf.extend_from_slice(bytes);
            }
            self.tbl.flush(path, broker);
            self.hooks.message_forwarded(hdr, payload);
        } else {
            tracing::info!(dest = %hdr.dest_node, "cannot forward frame, no route to destination");
            if hdr.source_node == self.this_node {
                tracing::warn!("lost frame with probably spoofed source");
            } else if self.tbl.lookup(hdr.source_node).is_none() {
                // a back-signal to the source is not implemented; without
                // a reverse path we could not send one anyway
                tracing::warn!(source = %hdr.source_node, "no reverse path to source");
            }
            self.hooks.message_forwarding_failed(hdr, payload);
        }
    }

    fn check_version(&self, hdr: &Header) -> Result<(), InstanceError> {
        if hdr.operation_data != PROTOCOL_VERSION {
            return Err(InstanceError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                got: hdr.operation_data,
            });
        }
        Ok(())
    }

    fn check_app_id(&self, remote: &str) -> Result<(), InstanceError> {
        if remote != self.config.app_identifier {
            tracing::error!(got = remote, "application identifier mismatch");
            return Err(InstanceError::AppIdMismatch {
                expected: self.config.app_identifier.clone(),
                got: remote.to_string(),
            });
        }
        Ok(())
    }

    /// Server handshake, stream or datagram variant.
    fn handle_server_handshake(
        &mut self,
        broker: &mut dyn Broker,
        handle: Handle,
        hdr: &Header,
        payload: Option<&[u8]>,
        transport: TransportKind,
    ) -> Result<(), InstanceError> {
        self.check_version(hdr)?;
        let hs = ServerHandshake::decode(require_payload(payload)?)?;
        self.check_app_id(&hs.app_id)?;
        // close self connections after the handshake is done
        if hdr.source_node == self.this_node {
            tracing::info!("close connection to self immediately");
            self.callee
                .finalize_handshake(hdr.source_node, hs.published_actor, hs.interfaces);
            return Err(InstanceError::SelfConnection);
        }
        // close this channel if a direct route already exists
        if self.tbl.lookup_hdl(hdr.source_node).is_some() {
            tracing::info!(node = %hdr.source_node, "already directly connected, dropping duplicate");
            self.callee
                .finalize_handshake(hdr.source_node, hs.published_actor, hs.interfaces);
            return Err(InstanceError::DuplicateConnection {
                node: hdr.source_node,
            });
        }
        tracing::info!(node = %hdr.source_node, "new direct connection");
        self.tbl.add(handle, hdr.source_node);
        let path = self
            .tbl
            .lookup(hdr.source_node)
            .ok_or(InstanceError::NoRoute {
                dest: hdr.source_node,
            })?;
        match transport {
            TransportKind::Stream => writers::client_handshake_frame(
                &self.config.app_identifier,
                self.this_node,
                hdr.source_node,
                self.tbl.wr_buf(path.handle),
            ),
            TransportKind::Datagram => writers::udp_client_handshake_frame(
                &self.config.app_identifier,
                self.this_node,
                self.tbl.wr_buf(path.handle),
            ),
        }
        self.callee.learned_new_node_directly(hdr.source_node);
        self.callee
            .finalize_handshake(hdr.source_node, hs.published_actor, hs.interfaces);
        self.tbl.flush(path, broker);
        Ok(())
    }

    fn handle_client_handshake(
        &mut self,
        handle: Handle,
        hdr: &Header,
        payload: Option<&[u8]>,
    ) -> Result<(), InstanceError> {
        if self.tbl.lookup_hdl(hdr.source_node).is_some() {
            tracing::info!(node = %hdr.source_node, "received second client handshake");
            return Ok(());
        }
        self.check_version(hdr)?;
        let hs = ClientHandshake::decode(require_payload(payload)?)?;
        self.check_app_id(&hs.app_id)?;
        if hdr.source_node == self.this_node {
            return Err(InstanceError::SelfConnection);
        }
        tracing::info!(node = %hdr.source_node, "new direct connection");
        self.tbl.add(handle, hdr.source_node);
        self.callee.learned_new_node_directly(hdr.source_node);
        Ok(())
    }

    fn handle_udp_client_handshake(
        &mut self,
        broker: &mut dyn Broker,
        handle: Handle,
        hdr: &Header,
        payload: Option<&[u8]>,
        local_port: Option<u16>,
    ) -> Result<(), InstanceError> {
        if self.tbl.lookup_hdl(hdr.source_node).is_some() {
            tracing::info!(node = %hdr.source_node, "received second client handshake");
            return Ok(());
        }
        self.check_version(hdr)?;
        let hs = ClientHandshake::decode(require_payload(payload)?)?;
        self.check_app_id(&hs.app_id)?;
        if hdr.source_node == self.this_node {
            return Err(InstanceError::SelfConnection);
        }
        tracing::info!(node = %hdr.source_node, "new direct connection");
        self.tbl.add(handle, hdr.source_node);
        let path = self
            .tbl
            .lookup(hdr.source_node)
            .ok_or(InstanceError::NoRoute {
                dest: hdr.source_node,
            })?;
        // reply as server, echoing what we publish on the contacted port
        let published = local_port.and_then(|port| self.published_actors.get(&port));
        writers::udp_server_handshake_frame(
            &self.config.app_identifier,
            self.this_node,
            hdr.source_node,
            published,
            self.tbl.wr_buf(path.handle),
        );
        self.callee.learned_new_node_directly(hdr.source_node);
        self.tbl.flush(path, broker);
        Ok(())
    }

    fn handle_dispatch(&mut self, hdr: &Header, payload: Option<&[u8]>) -> Result<(), InstanceError> {
        let named = hdr.has(NAMED_RECEIVER_FLAG);
        let dp = DispatchPayload::decode(require_payload(payload)?, named)?;
        let receiver = match dp.receiver_name {
            Some(name) => Receiver::Named(name),
            None => Receiver::Id(hdr.dest_actor),
        };
        self.callee.deliver(
            hdr.source_node,
            hdr.source_actor,
            receiver,
            MessageId::from_integer(hdr.operation_data),
            dp.stack,
            dp.message,
        );
        Ok(())
    }

    // =========================================================================
    // Runtime-driven operations
    // =========================================================================

    /// Serialize and send an actor message to a remote receiver.
    ///
    /// Returns `false` (after a `message_sending_failed` notification)
    /// when no route to the receiver's node exists; no bytes are
    /// produced in that case. The receiver must live on another node.
    pub fn dispatch(
        &mut self,
        broker: &mut dyn Broker,
        sender: Option<ActorRef>,
        stack: &[ActorRef],
        receiver: ActorRef,
        mid: MessageId,
        msg: &[u8],
    ) -> bool {
        debug_assert!(receiver.node != self.this_node);
        let Some(path) = self.tbl.lookup(receiver.node) else {
            self.hooks.message_sending_failed(sender.as_ref(), &receiver, mid);
            return false;
        };
        let mut hdr = Header {
            operation: MessageType::DispatchMessage,
            flags: 0,
            payload_len: 0,
            operation_data: mid.integer_value(),
            source_node: sender.map_or(self.this_node, |s| s.node),
            dest_node: receiver.node,
            source_actor: sender.map_or(INVALID_ACTOR_ID, |s| s.id),
            dest_actor: receiver.id,
        };
        writers::write_frame(
            self.tbl.wr_buf(path.handle),
            &mut hdr,
            Some(Box::new(|buf| {
                DispatchPayload::encode_parts(None, stack, msg, buf);
                Ok(())
            })),
        );
        self.tbl.flush(path, broker);
        self.hooks
            .message_sent(sender.as_ref(), path.next_hop, &receiver, mid);
        true
    }

    /// Emit a heartbeat to every directly-connected peer and flush.
    pub fn handle_heartbeat(&mut self, broker: &mut dyn Broker) {
        let routes: Vec<_> = self.tbl.direct_routes().collect();
        for (handle, node) in routes {
            tracing::debug!(%handle, %node, "sending heartbeat");
            writers::heartbeat_frame(self.this_node, node, self.tbl.wr_buf(handle));
            self.tbl.flush(
                crate::routing::Endpoint {
                    handle,
                    next_hop: node,
                },
                broker,
            );
        }
    }

    /// Drop all routes to `affected_node` after a broker-initiated
    /// shutdown, purging callee state for every node removed.
    pub fn handle_node_shutdown(&mut self, affected_node: NodeId) {
        if affected_node.is_none() {
            return;
        }
        tracing::info!(node = %affected_node, "lost direct connection");
        let callee = &mut self.callee;
        self.tbl
            .erase_node(affected_node, |node| callee.purge_state(node));
    }

    // =========================================================================
    // Published actors
    // =========================================================================

    /// Publish `actor` on `port`, replacing any previous publication.
    pub fn add_published_actor(
        &mut self,
        port: u16,
        actor: ActorId,
        interfaces: BTreeSet<String>,
    ) {
        let entry = self.published_actors.entry(port).or_default();
        *entry = (actor, interfaces);
        self.hooks.actor_published(entry.0, &entry.1, port);
    }

    /// Remove the publication on `port`, invoking `cb` for the removed
    /// actor. Returns the number of removed publications (0 or 1).
    pub fn remove_published_actor(
        &mut self,
        port: u16,
        mut cb: impl FnMut(ActorId, u16),
    ) -> usize {
        match self.published_actors.remove(&port) {
            Some((actor, _)) => {
                cb(actor, port);
                1
            }
            None => 0,
        }
    }

    /// Remove publications of `actor`: on `port` alone if nonzero, on
    /// every port otherwise. Invokes `cb` per removal and returns the
    /// count.
    pub fn remove_published_actor_id(
        &mut self,
        actor: ActorId,
        port: u16,
        mut cb: impl FnMut(ActorId, u16),
    ) -> usize {
        if port != 0 {
            match self.published_actors.get(&port) {
                Some((published, _)) if *published == actor => {
                    self.published_actors.remove(&port);
                    cb(actor, port);
                    1
                }
                _ => 0,
            }
        } else {
            let ports: Vec<u16> = self
                .published_actors
                .iter()
                .filter(|(_, (published, _))| *published == actor)
                .map(|(&port, _)| port)
                .collect();
            for port in &ports {
                self.published_actors.remove(port);
                cb(actor, *port);
            }
            ports.len()
        }
    }

    /// The actor published on `port`, if any.
    pub fn published_actor(&self, port: u16) -> Option<&(ActorId, BTreeSet<String>)> {
        self.published_actors.get(&port)
    }

    // =========================================================================
    // Outbound frame writers (external buffers)
    // =========================================================================

    /// Write a server handshake advertising the actor published on
    /// `port` (if any) into `buf`.
    pub fn write_server_handshake(&self, buf: &mut Vec<u8>, port: Option<u16>) {
        let published = port.and_then(|p| self.published_actors.get(&p));
        writers::server_handshake_frame(
            &self.config.app_identifier,
            self.this_node,
            published,
            buf,
        );
    }

    /// Write a client handshake addressed to `remote` into `buf`.
    pub fn write_client_handshake(&self, buf: &mut Vec<u8>, remote: NodeId) {
        writers::client_handshake_frame(&self.config.app_identifier, self.this_node, remote, buf);
    }

    /// Write a UDP server handshake addressed to `remote` into `buf`,
    /// advertising the actor published on `port` (if any).
    pub fn write_udp_server_handshake(&self, buf: &mut Vec<u8>, remote: NodeId, port: Option<u16>) {
        let published = port.and_then(|p| self.published_actors.get(&p));
        writers::udp_server_handshake_frame(
            &self.config.app_identifier,
            self.this_node,
            remote,
            published,
            buf,
        );
    }

    /// Write a UDP client handshake into `buf`.
    pub fn write_udp_client_handshake(&self, buf: &mut Vec<u8>) {
        writers::udp_client_handshake_frame(&self.config.app_identifier, self.this_node, buf);
    }

    /// Write an announce-proxy frame for `aid` to `dest_node` into `buf`.
    pub fn write_announce_proxy(&self, buf: &mut Vec<u8>, dest_node: NodeId, aid: ActorId) {
        writers::announce_proxy_frame(self.this_node, dest_node, aid, buf);
    }

    /// Write a kill-proxy frame for `aid` to `dest_node` into `buf`.
    pub fn write_kill_proxy(
        &self,
        buf: &mut Vec<u8>,
        dest_node: NodeId,
        aid: ActorId,
        reason: &basp_core::ExitReason,
    ) {
        writers::kill_proxy_frame(self.this_node, dest_node, aid, reason, buf);
    }

    /// Write a heartbeat addressed to `remote` into `buf`.
    pub fn write_heartbeat(&self, buf: &mut Vec<u8>, remote: NodeId) {
        writers::heartbeat_frame(self.this_node, remote, buf);
    }
}

fn require_payload<'a>(payload: Option<&'a [u8]>) -> Result<&'a [u8], InstanceError> {
    payload.ok_or_else(|| {
        WireError::PayloadDecode {
            reason: "missing payload".to_string(),
        }
        .into()
    })
}
