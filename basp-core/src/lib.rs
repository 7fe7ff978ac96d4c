//! # basp-core
//!
//! Core abstractions for the BASP protocol engine.
//!
//! BASP (Binary Actor System Protocol) connects distributed actor nodes
//! over stream and datagram transports. This crate provides the
//! foundational identifiers and the trait surface through which the
//! protocol engine talks to its surroundings. The engine itself lives in
//! the `basp` crate; application code depends on these abstractions.
//!
//! ## The boundary traits
//!
//! The engine performs no I/O and owns no actors. Everything it needs
//! from the outside world comes through two traits, and everything it
//! produces for the outside world goes through them as well:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  Actor Runtime                        │
//! │     implements: Callee (deliver, purge, proxies)      │
//! └───────────────────────┬──────────────────────────────┘
//!                         │ protocol events
//! ┌───────────────────────┴──────────────────────────────┐
//! │                  BASP engine (`basp`)                 │
//! └───────────────────────┬──────────────────────────────┘
//!                         │ flushed write buffers
//! ┌───────────────────────┴──────────────────────────────┐
//! │                  Network Broker                       │
//! │     implements: Broker (transmit)                     │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Types
//!
//! - [`NodeId`]: 128-bit identifier for a BASP peer, with a `none` sentinel
//! - [`Handle`]: broker-supplied identifier for one transport channel
//! - [`ActorId`] / [`ActorRef`]: actor addressing within and across nodes
//! - [`MessageId`]: correlation id carried by dispatch frames
//! - [`ExitReason`]: typed payload of kill-proxy frames

#![deny(missing_docs)]

mod broker;
mod callee;
mod ids;
mod reason;

// Trait exports
pub use broker::Broker;
pub use callee::{Callee, Receiver};

// Core type exports
pub use ids::{ActorId, ActorRef, Handle, INVALID_ACTOR_ID, MessageId, NodeId};
pub use reason::ExitReason;
