//! The callback surface of the actor runtime.
//!
//! The protocol engine never touches mailboxes or proxy registries
//! directly. Every protocol event that concerns the runtime is delivered
//! through [`Callee`], synchronously, on the broker's event-loop context.

use std::collections::BTreeSet;

use crate::ids::{ActorId, ActorRef, MessageId, NodeId};
use crate::reason::ExitReason;

/// Destination of a dispatched message.
///
/// A message either targets an actor by id or a named service registered
/// on the receiving node. On the wire the distinction is the
/// named-receiver header flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// Deliver to the actor with this id.
    Id(ActorId),
    /// Deliver to the service registered under this name.
    Named(String),
}

/// Contract the actor runtime implements for the protocol engine.
///
/// All methods are invoked synchronously while the engine processes a
/// frame; none may block. Implementations typically enqueue work for the
/// runtime rather than executing it inline.
pub trait Callee {
    /// A handshake with `node` completed.
    ///
    /// `aid` and `interfaces` describe the actor the remote node
    /// published on the contacted port, if any (`INVALID_ACTOR_ID` and an
    /// empty set otherwise).
    fn finalize_handshake(&mut self, node: NodeId, aid: ActorId, interfaces: BTreeSet<String>);

    /// All routes to `node` are gone; drop any state held for it.
    ///
    /// Invoked once per node removed from the routing table when a
    /// connection closes or a node shuts down.
    fn purge_state(&mut self, node: NodeId);

    /// `node` announced a proxy for the local actor `aid`.
    fn proxy_announced(&mut self, node: NodeId, aid: ActorId);

    /// `node` reports that its actor `aid` terminated.
    fn kill_proxy(&mut self, node: NodeId, aid: ActorId, reason: ExitReason);

    /// Deliver a dispatched message to a local receiver.
    ///
    /// `stack` is the forwarding stack accumulated along the message's
    /// path; `msg` is the opaque serialized message.
    fn deliver(
        &mut self,
        src_node: NodeId,
        src_actor: ActorId,
        receiver: Receiver,
        mid: MessageId,
        stack: Vec<ActorRef>,
        msg: Vec<u8>,
    );

    /// A direct route to a previously unknown `node` was established.
    fn learned_new_node_directly(&mut self, node: NodeId);

    /// `node` became reachable through another node.
    ///
    /// Indirect routes are storable but never auto-populated by the
    /// engine, so the default implementation does nothing.
    fn learned_new_node_indirectly(&mut self, node: NodeId) {
        let _ = node;
    }

    /// A heartbeat frame arrived from `node`.
    fn handle_heartbeat(&mut self, node: NodeId);
}
