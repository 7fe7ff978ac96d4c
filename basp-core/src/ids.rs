//! Identifier types for nodes, channels, actors, and messages.
//!
//! - [`NodeId`]: 128-bit identifier for a BASP peer
//! - [`Handle`]: broker-supplied identifier for one transport channel
//! - [`ActorId`]: 64-bit actor identifier within a node
//! - [`MessageId`]: correlation id carried in dispatch frames
//! - [`ActorRef`]: node + actor, the unit of cross-node addressing

use serde::{Deserialize, Serialize};

/// 128-bit node identifier.
///
/// Every BASP node carries a process-wide identity assigned at system
/// start. The all-zero value is the `none` sentinel meaning
/// "unknown/absent"; it appears on the wire (handshake frames leave the
/// destination node open) but never identifies a live peer.
///
/// # Examples
///
/// ```
/// use basp_core::NodeId;
///
/// let n = NodeId::new(0xAB, 0xCD);
/// assert!(!n.is_none());
/// assert!(NodeId::NONE.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    /// First 64 bits.
    pub first: u64,
    /// Second 64 bits.
    pub second: u64,
}

impl NodeId {
    /// The `none` sentinel: no node / unknown node.
    pub const NONE: NodeId = NodeId { first: 0, second: 0 };

    /// Create a node id with explicit values.
    pub const fn new(first: u64, second: u64) -> Self {
        Self { first, second }
    }

    /// Check whether this is the `none` sentinel.
    pub const fn is_none(&self) -> bool {
        self.first == 0 && self.second == 0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.first, self.second)
    }
}

/// Broker-supplied identifier for one transport channel.
///
/// A handle names either a stream connection or a datagram socket
/// binding. The engine never creates or closes handles; it only binds
/// them to nodes in its routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle(
    /// Raw broker-assigned channel id.
    pub u64,
);

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hdl:{}", self.0)
    }
}

/// 64-bit actor identifier, unique within its node.
pub type ActorId = u64;

/// Sentinel actor id meaning "no actor".
pub const INVALID_ACTOR_ID: ActorId = 0;

/// Correlation id for a dispatched message.
///
/// Travels in the `operation_data` word of dispatch frames and is
/// reconstructed verbatim on the receiving side, so request/response
/// matching survives the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    /// Reconstruct a message id from its integer representation.
    pub const fn from_integer(value: u64) -> Self {
        Self(value)
    }

    /// The integer representation placed in `operation_data`.
    pub const fn integer_value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node-qualified actor reference.
///
/// The unit of the forwarding stack and of dispatch sender/receiver
/// addressing: enough information to reach an actor from anywhere in the
/// cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorRef {
    /// The node hosting the actor.
    pub node: NodeId,
    /// The actor's id on that node.
    pub id: ActorId,
}

impl ActorRef {
    /// Create a new actor reference.
    pub const fn new(node: NodeId, id: ActorId) -> Self {
        Self { node, id }
    }
}

impl std::fmt::Display for ActorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.id, self.node)
    }
}
