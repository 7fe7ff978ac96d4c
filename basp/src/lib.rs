//! # BASP protocol engine
//!
//! The per-node core of the Binary Actor System Protocol: frames,
//! parses, routes, and dispatches messages between distributed actor
//! nodes over stream (TCP-like) and datagram (UDP-like) transports.
//!
//! The engine sits between a network broker below it and an actor
//! runtime above it. The broker delivers raw byte buffers and accepts
//! flushed write buffers; the runtime receives protocol events through
//! the [`Callee`] trait. The engine itself performs no I/O and never
//! suspends.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              Actor Runtime (Callee)              │
//! ├─────────────────────────────────────────────────┤
//! │     Instance (dispatch, handshakes, FSM)        │
//! │     • Classifies frames: self / forward         │
//! │     • Drives per-channel connection state       │
//! ├─────────────────────────────────────────────────┤
//! │     RoutingTable (node ↔ handle, buffers)       │
//! │     • Direct and indirect routes                │
//! │     • Per-channel write accumulation            │
//! ├─────────────────────────────────────────────────┤
//! │     Wire Format (header + typed payloads)       │
//! │     • Fixed 62-byte little-endian header        │
//! │     • Length-prefixed payload encoding          │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`Instance`] | Per-message handler and frame writer |
//! | [`RoutingTable`] | Direct/indirect routes and write buffers |
//! | [`wire`] | Bit-exact header codec and payload codecs |
//! | [`hooks`] | Best-effort observer notifications |
//!
//! ## Quick Start
//!
//! ```ignore
//! use basp::{ConnectionState, Instance, InstanceConfig};
//!
//! let mut instance = Instance::new(InstanceConfig::default(), this_node, callee);
//!
//! // Broker read loop, stream transport. `hdr` is the per-channel
//! // header accumulator: None while awaiting a header, Some while
//! // awaiting that header's payload.
//! let mut hdr = None;
//! match instance.handle_stream(&mut broker, handle, &buf, &mut hdr) {
//!     ConnectionState::AwaitHeader => { /* read the next header */ }
//!     ConnectionState::AwaitPayload => { /* read hdr's payload bytes */ }
//!     ConnectionState::CloseConnection => { /* tear the channel down */ }
//! }
//! ```

#![deny(missing_docs)]

// Re-export core types for convenience
pub use basp_core::{
    ActorId, ActorRef, Broker, Callee, ExitReason, Handle, INVALID_ACTOR_ID, MessageId, NodeId,
    Receiver,
};

// =============================================================================
// Modules
// =============================================================================

/// Instance configuration.
pub mod config;

/// Error types for the protocol engine.
pub mod error;

/// Observer notifications emitted by the instance.
pub mod hooks;

/// The instance dispatcher, connection state machine, and frame writers.
pub mod instance;

/// Routing table with per-channel write buffers.
pub mod routing;

/// Wire format: header codec and typed payload codecs.
pub mod wire;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::InstanceConfig;
pub use error::InstanceError;
pub use hooks::Hooks;
pub use instance::{ConnectionState, Instance};
pub use routing::{Endpoint, RoutingTable};
pub use wire::{HEADER_SIZE, Header, MessageType, PROTOCOL_VERSION, WireError};
