//! Error types for the protocol engine.
//!
//! Every variant except [`InstanceError::NoRoute`] is local-fatal for
//! the connection it occurred on: the dispatcher closes the channel,
//! erases all routes through it, and purges callee state for each node
//! removed. `NoRoute` during stream forwarding only drops the frame;
//! `NoRoute` during outbound dispatch surfaces as a `false` return.

use basp_core::NodeId;

use crate::wire::WireError;

/// Errors raised while processing or emitting frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstanceError {
    /// Header or typed payload failed to decode or validate.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Handshake carried a foreign application identifier.
    #[error("application identifier mismatch: expected {expected:?}, got {got:?}")]
    AppIdMismatch {
        /// Our identifier.
        expected: String,
        /// The identifier the peer sent.
        got: String,
    },

    /// Handshake carried an incompatible protocol version.
    #[error("protocol version mismatch: expected {expected}, got {got}")]
    VersionMismatch {
        /// Our version.
        expected: u64,
        /// The version the peer sent.
        got: u64,
    },

    /// No route to the destination node.
    #[error("no route to node {dest}")]
    NoRoute {
        /// The unreachable destination.
        dest: NodeId,
    },

    /// Handshake from our own node id; the connection loops back to us.
    #[error("handshake from self")]
    SelfConnection,

    /// Handshake on a second channel to an already directly-connected
    /// node; the new channel is closed, the existing route stays.
    #[error("duplicate direct connection to {node}")]
    DuplicateConnection {
        /// The already-connected node.
        node: NodeId,
    },
}
