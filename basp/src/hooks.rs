//! Observer notifications emitted by the instance.
//!
//! Hooks are synchronous, best-effort notifications for monitoring and
//! testing. They carry no back-channel: nothing an implementation does
//! can change how the instance handles a frame.

use std::collections::BTreeSet;

use basp_core::{ActorId, ActorRef, MessageId, NodeId};

use crate::wire::Header;

/// Observer events emitted by the instance.
///
/// All methods default to no-ops, so implementations only override what
/// they observe.
pub trait Hooks {
    /// A frame addressed to another node was forwarded along a route.
    fn message_forwarded(&mut self, hdr: &Header, payload: Option<&[u8]>) {
        let _ = (hdr, payload);
    }

    /// A frame addressed to another node was dropped for lack of a route.
    fn message_forwarding_failed(&mut self, hdr: &Header, payload: Option<&[u8]>) {
        let _ = (hdr, payload);
    }

    /// An outbound dispatch left through `next_hop`.
    fn message_sent(
        &mut self,
        sender: Option<&ActorRef>,
        next_hop: NodeId,
        receiver: &ActorRef,
        mid: MessageId,
    ) {
        let _ = (sender, next_hop, receiver, mid);
    }

    /// An outbound dispatch found no route to its receiver.
    fn message_sending_failed(
        &mut self,
        sender: Option<&ActorRef>,
        receiver: &ActorRef,
        mid: MessageId,
    ) {
        let _ = (sender, receiver, mid);
    }

    /// An actor was published on a port.
    fn actor_published(&mut self, aid: ActorId, interfaces: &BTreeSet<String>, port: u16) {
        let _ = (aid, interfaces, port);
    }
}

/// The default observer: ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl Hooks for NoopHooks {}
