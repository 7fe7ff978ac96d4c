//! Routing table: node ↔ handle bindings and per-channel write buffers.
//!
//! The table keeps two mutually consistent maps, `node → handle` and
//! `handle → node`, plus an indirect map `dest → {next hops}`. A node is
//! either directly connected (it owns a handle) or indirectly reachable
//! (some directly-connected node forwards to it), never both.
//!
//! Outbound bytes accumulate in a per-handle write buffer owned by the
//! table; [`RoutingTable::flush`] drains a buffer into the broker in one
//! piece. Lookup results carry only copied fields (handle + next hop),
//! so they stay cheap and never pin the table.

use std::collections::{BTreeSet, HashMap};

use basp_core::{Broker, Handle, NodeId};

/// A routing lookup result: where to write and who the next hop is.
///
/// For a direct route `next_hop` equals the destination; for an indirect
/// route it names the relay. Valid until the next table mutation; after
/// that, re-run the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Channel whose write buffer reaches the next hop.
    pub handle: Handle,
    /// The directly-connected node the frame leaves through.
    pub next_hop: NodeId,
}

/// Direct and indirect routes of one BASP instance.
#[derive(Debug, Default)]
pub struct RoutingTable {
    direct_by_node: HashMap<NodeId, Handle>,
    direct_by_handle: HashMap<Handle, NodeId>,
    // dest -> set of directly-connected nodes that can relay to it;
    // storable, never auto-populated by the dispatcher
    indirect: HashMap<NodeId, BTreeSet<NodeId>>,
    buffers: HashMap<Handle, Vec<u8>>,
}

impl RoutingTable {
    /// Create an empty routing table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a direct route, replacing conflicting entries.
    ///
    /// If the handle was bound to another node or the node to another
    /// handle, the stale pairing is removed first so the two maps stay
    /// mutually consistent. Any indirect entry for the node is dropped:
    /// a directly-connected node needs no relay.
    pub fn add(&mut self, handle: Handle, node: NodeId) {
        if let Some(old_node) = self.direct_by_handle.remove(&handle) {
            self.direct_by_node.remove(&old_node);
        }
        if let Some(old_handle) = self.direct_by_node.remove(&node) {
            self.direct_by_handle.remove(&old_handle);
            self.buffers.remove(&old_handle);
        }
        self.indirect.remove(&node);
        self.direct_by_node.insert(node, handle);
        self.direct_by_handle.insert(handle, node);
        self.buffers.entry(handle).or_default();
        tracing::debug!(%handle, %node, "added direct route");
    }

    /// Record that `dest` is reachable through the direct peer `hop`.
    ///
    /// Returns `true` if this created the first route to `dest`. Ignored
    /// (returning `false`) when `dest` already has a direct route.
    pub fn add_indirect(&mut self, hop: NodeId, dest: NodeId) -> bool {
        if self.direct_by_node.contains_key(&dest) {
            return false;
        }
        let hops = self.indirect.entry(dest).or_default();
        let was_unreachable = hops.is_empty();
        hops.insert(hop);
        was_unreachable
    }

    /// Remove the route bound to `handle`, if any.
    ///
    /// `cb` is invoked once for the unbound node and once for every node
    /// that becomes unreachable because that node was its only relay.
    pub fn erase_handle(&mut self, handle: Handle, mut cb: impl FnMut(NodeId)) {
        self.buffers.remove(&handle);
        if let Some(node) = self.direct_by_handle.remove(&handle) {
            self.direct_by_node.remove(&node);
            tracing::debug!(%handle, %node, "erased direct route");
            cb(node);
            self.erase_indirect_via(node, &mut cb);
        }
    }

    /// Remove the routes involving `node`, if any.
    ///
    /// Symmetric to [`RoutingTable::erase_handle`]: removes the direct
    /// entry or the node's own indirect entry, then every indirect entry
    /// relayed through `node`. `cb` runs once per node removed.
    pub fn erase_node(&mut self, node: NodeId, mut cb: impl FnMut(NodeId)) {
        if let Some(handle) = self.direct_by_node.remove(&node) {
            self.direct_by_handle.remove(&handle);
            self.buffers.remove(&handle);
            tracing::debug!(%handle, %node, "erased direct route");
            cb(node);
        } else if self.indirect.remove(&node).is_some() {
            cb(node);
        }
        self.erase_indirect_via(node, &mut cb);
    }

    fn erase_indirect_via(&mut self, hop: NodeId, cb: &mut impl FnMut(NodeId)) {
        let mut unreachable = Vec::new();
        self.indirect.retain(|dest, hops| {
            hops.remove(&hop);
            if hops.is_empty() {
                unreachable.push(*dest);
                false
            } else {
                true
            }
        });
        for dest in unreachable {
            cb(dest);
        }
    }

    /// Find a path to `node`: direct if one exists, otherwise through
    /// the first reachable relay.
    pub fn lookup(&self, node: NodeId) -> Option<Endpoint> {
        if let Some(&handle) = self.direct_by_node.get(&node) {
            return Some(Endpoint {
                handle,
                next_hop: node,
            });
        }
        let hops = self.indirect.get(&node)?;
        hops.iter().find_map(|hop| {
            self.direct_by_node.get(hop).map(|&handle| Endpoint {
                handle,
                next_hop: *hop,
            })
        })
    }

    /// Direct handle for `node`; no indirection.
    pub fn lookup_hdl(&self, node: NodeId) -> Option<Handle> {
        self.direct_by_node.get(&node).copied()
    }

    /// Node bound to `handle`, if known.
    pub fn lookup_node(&self, handle: Handle) -> Option<NodeId> {
        self.direct_by_handle.get(&handle).copied()
    }

    /// The write buffer accumulating outbound bytes for `handle`.
    pub fn wr_buf(&mut self, handle: Handle) -> &mut Vec<u8> {
        self.buffers.entry(handle).or_default()
    }

    /// Hand the endpoint's accumulated write buffer to the broker.
    ///
    /// Empty buffers are not transmitted.
    pub fn flush(&mut self, ep: Endpoint, broker: &mut dyn Broker) {
        if let Some(buf) = self.buffers.get_mut(&ep.handle) {
            if !buf.is_empty() {
                broker.transmit(ep.handle, std::mem::take(buf));
            }
        }
    }

    /// Iterate over all direct routes.
    pub fn direct_routes(&self) -> impl Iterator<Item = (Handle, NodeId)> + '_ {
        self.direct_by_handle.iter().map(|(&h, &n)| (h, n))
    }

    /// Number of direct routes.
    pub fn direct_len(&self) -> usize {
        self.direct_by_node.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingBroker {
        sent: Vec<(Handle, Vec<u8>)>,
    }

    impl RecordingBroker {
        fn new() -> Self {
            Self { sent: Vec::new() }
        }
    }

    impl Broker for RecordingBroker {
        fn transmit(&mut self, handle: Handle, frame: Vec<u8>) {
            self.sent.push((handle, frame));
        }
    }

    fn node(n: u64) -> NodeId {
        NodeId::new(0, n)
    }

    fn assert_consistent(tbl: &RoutingTable) {
        for (h, n) in tbl.direct_routes() {
            assert_eq!(tbl.lookup_hdl(n), Some(h));
            assert_eq!(tbl.lookup_node(h), Some(n));
        }
    }

    #[test]
    fn test_add_and_lookup() {
        let mut tbl = RoutingTable::new();
        tbl.add(Handle(1), node(1));

        let ep = tbl.lookup(node(1)).expect("route exists");
        assert_eq!(ep.handle, Handle(1));
        assert_eq!(ep.next_hop, node(1));
        assert_eq!(tbl.lookup_hdl(node(1)), Some(Handle(1)));
        assert_eq!(tbl.lookup_node(Handle(1)), Some(node(1)));
        assert_consistent(&tbl);
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        let tbl = RoutingTable::new();
        assert!(tbl.lookup(node(9)).is_none());
        assert!(tbl.lookup_hdl(node(9)).is_none());
        assert!(tbl.lookup_node(Handle(9)).is_none());
    }

    #[test]
    fn test_add_rebinds_handle() {
        let mut tbl = RoutingTable::new();
        tbl.add(Handle(1), node(1));
        tbl.add(Handle(1), node(2));

        assert!(tbl.lookup(node(1)).is_none());
        assert_eq!(tbl.lookup_node(Handle(1)), Some(node(2)));
        assert_eq!(tbl.direct_len(), 1);
        assert_consistent(&tbl);
    }

    #[test]
    fn test_add_rebinds_node() {
        let mut tbl = RoutingTable::new();
        tbl.add(Handle(1), node(1));
        tbl.add(Handle(2), node(1));

        assert_eq!(tbl.lookup_hdl(node(1)), Some(Handle(2)));
        assert!(tbl.lookup_node(Handle(1)).is_none());
        assert_eq!(tbl.direct_len(), 1);
        assert_consistent(&tbl);
    }

    #[test]
    fn test_erase_handle_invokes_callback_once() {
        let mut tbl = RoutingTable::new();
        tbl.add(Handle(1), node(1));

        let mut purged = Vec::new();
        tbl.erase_handle(Handle(1), |n| purged.push(n));

        assert_eq!(purged, vec![node(1)]);
        assert!(tbl.lookup(node(1)).is_none());
        assert!(tbl.lookup_node(Handle(1)).is_none());
        assert_eq!(tbl.direct_len(), 0);
    }

    #[test]
    fn test_erase_handle_unknown_is_noop() {
        let mut tbl = RoutingTable::new();
        let mut purged = Vec::new();
        tbl.erase_handle(Handle(7), |n| purged.push(n));
        assert!(purged.is_empty());
    }

    #[test]
    fn test_erase_handle_sweeps_indirect() {
        let mut tbl = RoutingTable::new();
        tbl.add(Handle(1), node(1));
        tbl.add(Handle(2), node(2));
        assert!(tbl.add_indirect(node(1), node(10)));
        // node(11) stays reachable through node(2)
        assert!(tbl.add_indirect(node(1), node(11)));
        assert!(!tbl.add_indirect(node(2), node(11)));

        let mut purged = Vec::new();
        tbl.erase_handle(Handle(1), |n| purged.push(n));
        purged.sort();

        assert_eq!(purged, vec![node(1), node(10)]);
        assert!(tbl.lookup(node(10)).is_none());
        assert!(tbl.lookup(node(11)).is_some());
    }

    #[test]
    fn test_erase_node_direct() {
        let mut tbl = RoutingTable::new();
        tbl.add(Handle(1), node(1));

        let mut purged = Vec::new();
        tbl.erase_node(node(1), |n| purged.push(n));

        assert_eq!(purged, vec![node(1)]);
        assert_eq!(tbl.direct_len(), 0);
        assert!(tbl.lookup_node(Handle(1)).is_none());
    }

    #[test]
    fn test_erase_node_indirect_only() {
        let mut tbl = RoutingTable::new();
        tbl.add(Handle(1), node(1));
        assert!(tbl.add_indirect(node(1), node(10)));

        let mut purged = Vec::new();
        tbl.erase_node(node(10), |n| purged.push(n));

        assert_eq!(purged, vec![node(10)]);
        assert!(tbl.lookup(node(10)).is_none());
        assert!(tbl.lookup(node(1)).is_some());
    }

    #[test]
    fn test_indirect_lookup_uses_relay() {
        let mut tbl = RoutingTable::new();
        tbl.add(Handle(1), node(1));
        assert!(tbl.add_indirect(node(1), node(10)));

        let ep = tbl.lookup(node(10)).expect("indirect route");
        assert_eq!(ep.handle, Handle(1));
        assert_eq!(ep.next_hop, node(1));
    }

    #[test]
    fn test_add_indirect_rejected_for_direct_node() {
        let mut tbl = RoutingTable::new();
        tbl.add(Handle(1), node(1));
        assert!(!tbl.add_indirect(node(2), node(1)));

        let ep = tbl.lookup(node(1)).expect("direct route wins");
        assert_eq!(ep.next_hop, node(1));
    }

    #[test]
    fn test_add_drops_indirect_entry() {
        let mut tbl = RoutingTable::new();
        tbl.add(Handle(1), node(1));
        assert!(tbl.add_indirect(node(1), node(10)));

        tbl.add(Handle(2), node(10));
        let ep = tbl.lookup(node(10)).expect("direct route");
        assert_eq!(ep.handle, Handle(2));
        assert_eq!(ep.next_hop, node(10));

        // erasing the old relay no longer affects node(10)
        let mut purged = Vec::new();
        tbl.erase_handle(Handle(1), |n| purged.push(n));
        assert_eq!(purged, vec![node(1)]);
        assert!(tbl.lookup(node(10)).is_some());
    }

    #[test]
    fn test_flush_drains_buffer() {
        let mut tbl = RoutingTable::new();
        let mut broker = RecordingBroker::new();
        tbl.add(Handle(1), node(1));

        tbl.wr_buf(Handle(1)).extend_from_slice(b"frame bytes");
        let ep = tbl.lookup(node(1)).expect("route");
        tbl.flush(ep, &mut broker);

        assert_eq!(broker.sent.len(), 1);
        assert_eq!(broker.sent[0], (Handle(1), b"frame bytes".to_vec()));
        assert!(tbl.wr_buf(Handle(1)).is_empty());
    }

    #[test]
    fn test_flush_empty_buffer_is_silent() {
        let mut tbl = RoutingTable::new();
        let mut broker = RecordingBroker::new();
        tbl.add(Handle(1), node(1));

        let ep = tbl.lookup(node(1)).expect("route");
        tbl.flush(ep, &mut broker);
        assert!(broker.sent.is_empty());
    }
}
