//! The transmission surface of the network broker.

use crate::ids::Handle;

/// Contract the network broker implements for the protocol engine.
///
/// The engine accumulates outbound frames into per-channel write buffers
/// and hands each buffer over in one piece when it flushes. The broker
/// owns the actual sockets and the event loop; transmission ordering per
/// handle must match the order of `transmit` calls.
pub trait Broker {
    /// Transmit an accumulated write buffer on the given channel.
    fn transmit(&mut self, handle: Handle, frame: Vec<u8>);
}
