pub mod constants;
pub mod errors;
pub mod helpers;
pub mod policy;
pub mod record;
pub mod telemetry;
pub mod types;

pub use crate::errors::Error;
pub use crate::record::RouteRecord;
pub use crate::types::{ForwardingTable, Node, NodeId, Origin, Route, TableConfig};

use constants::*;
use helpers::*;
use log::{debug, info, trace, warn};
use metrics::{counter, gauge};
use once_cell::sync::OnceCell;
use std::fmt;
use std::net::Ipv4Addr;

impl Default for ForwardingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ForwardingTable {
    // ---- logging bootstraper -------------------------------------------------
    fn ensure_logging() {
        static INIT: OnceCell<()> = OnceCell::new();
        INIT.get_or_init(|| {
            let _ = env_logger::builder()
                .format_timestamp(None)
                .is_test(std::env::var("RUST_TEST_THREADS").is_ok())
                .try_init();
        });
    }

    /// Empty table with aggregation enabled.
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    pub fn with_config(config: TableConfig) -> Self {
        Self::ensure_logging();
        telemetry::init();
        Self {
            nodes: vec![Node::new(0, None)],
            freelist: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> TableConfig {
        self.config
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id as usize]
    }

    /// Allocate a child slot, reusing a pruned one when available.
    fn alloc_node(&mut self, bit: u8, parent: NodeId) -> NodeId {
        let node = Node::new(bit, Some(parent));
        if let Some(id) = self.freelist.pop() {
            trace!("[ALLOC] Reusing freed node id={}", id);
            self.nodes[id as usize] = node;
            id
        } else {
            let id = self.nodes.len() as NodeId;
            self.nodes.push(node);
            id
        }
    }

    /// Release `id` and everything below it onto the freelist.
    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = std::mem::take(self.node_mut(cur));
            stack.extend(node.children.into_iter().flatten());
            self.freelist.push(cur);
        }
    }

    /// Node for the exact prefix `key/prefix_len`, if the path exists.
    fn locate(&self, key: u32, prefix_len: u8) -> Option<NodeId> {
        let mut node = ROOT;
        for i in 0..prefix_len {
            node = self.node(node).children[get_bit(key, i)]?;
        }
        Some(node)
    }

    /// Insert a route, resolving conflicts with any route already stored for
    /// the same prefix, then try to aggregate upward.
    ///
    /// The netmask is validated before the trie is touched.
    pub fn insert(&mut self, route: Route) -> Result<(), Error> {
        let prefix_len = prefix_length(route.netmask)?;
        let key = masked_prefix(route.network, prefix_len);
        counter!(METRIC_INSERTS).increment(1);
        info!(
            "[INSERT] prefix={} peer={}",
            cidr_repr(int_to_addr(key), route.netmask),
            route.peer
        );

        let mut node = ROOT;
        for i in 0..prefix_len {
            let bit = get_bit(key, i);
            node = match self.node(node).children[bit] {
                Some(child) => child,
                None => {
                    let child = self.alloc_node(bit as u8, node);
                    self.node_mut(node).children[bit] = Some(child);
                    trace!("[INSERT] depth={} bit={} new node id={}", i + 1, bit, child);
                    child
                }
            };
        }

        let slot = self.node_mut(node);
        // a peer has at most one route per prefix: an update replaces it
        let previous = if slot.route.as_ref().is_some_and(|r| r.peer == route.peer) {
            slot.route.take()
        } else if let Some(pos) = slot.alternatives.iter().position(|r| r.peer == route.peer) {
            Some(slot.alternatives.swap_remove(pos))
        } else {
            None
        };
        if previous.is_some() {
            debug!("[INSERT] peer={} replaces its earlier route", route.peer);
        }
        if slot.route.is_none() {
            if let Some(i) = policy::best_index(&slot.alternatives) {
                slot.route = Some(slot.alternatives.swap_remove(i));
            }
        }

        match slot.route.take() {
            None => slot.route = Some(route),
            Some(current) if policy::is_preferred(&route, &current) => {
                debug!(
                    "[INSERT] peer={} replaces peer={} as best route",
                    route.peer, current.peer
                );
                slot.alternatives.push(current);
                slot.route = Some(route);
            }
            Some(current) => {
                debug!(
                    "[INSERT] peer={} kept as alternative to peer={}",
                    route.peer, current.peer
                );
                slot.alternatives.push(route);
                slot.route = Some(current);
            }
        }

        if self.config.aggregate {
            self.aggregate(node, prefix_len);
        }
        Ok(())
    }

    /// Bulk insert; stops at the first rejected route.
    pub fn insert_all<I>(&mut self, routes: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Route>,
    {
        for route in routes {
            self.insert(route)?;
        }
        Ok(())
    }

    /// Validate a raw announcement and insert it.
    pub fn announce(&mut self, record: RouteRecord) -> Result<(), Error> {
        let route = Route::try_from(record).map_err(|e| {
            warn!("[ANNOUNCE] rejected: {} ({})", e.as_str(), e);
            e
        })?;
        self.insert(route)
    }

    /// Walk from `node` (at `depth`) toward the root, merging it with its
    /// sibling into the parent while both carry compatible routes.
    ///
    /// The absorbed subtrees are released, alternatives included.
    fn aggregate(&mut self, mut node: NodeId, mut depth: u8) {
        while let Some(parent) = self.node(node).parent {
            let sibling_bit = 1 - self.node(node).bit as usize;
            let Some(sibling) = self.node(parent).children[sibling_bit] else {
                break;
            };
            let merged = match (&self.node(node).route, &self.node(sibling).route) {
                (Some(a), Some(b)) if policy::can_aggregate(a, b) => {
                    policy::aggregate_route(a, depth - 1)
                }
                _ => break,
            };
            debug!(
                "[AGGREGATE] depth={} merged into {}",
                depth,
                cidr_repr(merged.network, merged.netmask)
            );

            let children = std::mem::take(&mut self.node_mut(parent).children);
            for child in children.into_iter().flatten() {
                self.free_subtree(child);
            }
            let slot = self.node_mut(parent);
            slot.alternatives.retain(|r| r.peer != merged.peer);
            slot.route = Some(merged);
            counter!(METRIC_AGGREGATIONS).increment(1);

            node = parent;
            depth -= 1;
        }
    }

    /// Longest-prefix match: the deepest route on the path to `destination`.
    pub fn search(&self, destination: Ipv4Addr) -> Option<&Route> {
        counter!(METRIC_LOOKUPS).increment(1);
        let key = addr_to_int(destination);
        let mut node = self.node(ROOT);
        let mut best = node.route.as_ref();
        for i in 0..ADDR_BITS {
            match node.children[get_bit(key, i)] {
                Some(child) => node = self.node(child),
                None => break,
            }
            best = node.route.as_ref().or(best);
        }
        if best.is_none() {
            counter!(METRIC_LOOKUP_MISSES).increment(1);
            trace!("[SEARCH] no route for {}", destination);
        }
        best
    }

    /// Same as [`search`](Self::search) for a dotted-quad string.
    pub fn search_str(&self, destination: &str) -> Result<Option<&Route>, Error> {
        Ok(self.search(parse_addr(destination)?))
    }

    /// Remove the route learned from `peer` for exactly `network/netmask`.
    ///
    /// If it was the best route, the best alternative takes its place and
    /// aggregation is retried from that node. Returns the removed route.
    pub fn withdraw(
        &mut self,
        network: Ipv4Addr,
        netmask: Ipv4Addr,
        peer: &str,
    ) -> Result<Option<Route>, Error> {
        let prefix_len = prefix_length(netmask)?;
        let key = masked_prefix(network, prefix_len);
        info!(
            "[WITHDRAW] prefix={} peer={}",
            cidr_repr(int_to_addr(key), netmask),
            peer
        );
        let Some(id) = self.locate(key, prefix_len) else {
            debug!("[WITHDRAW] prefix not present");
            return Ok(None);
        };

        let slot = self.node_mut(id);
        let mut promoted = false;
        let removed = if slot.route.as_ref().is_some_and(|r| r.peer == peer) {
            let removed = slot.route.take();
            if let Some(i) = policy::best_index(&slot.alternatives) {
                let next = slot.alternatives.swap_remove(i);
                debug!("[WITHDRAW] promoting alternative from peer={}", next.peer);
                slot.route = Some(next);
                promoted = true;
            }
            removed
        } else if let Some(pos) = slot.alternatives.iter().position(|r| r.peer == peer) {
            Some(slot.alternatives.swap_remove(pos))
        } else {
            None
        };

        if removed.is_some() {
            counter!(METRIC_WITHDRAWALS).increment(1);
        }
        if promoted && self.config.aggregate {
            self.aggregate(id, prefix_len);
        }
        Ok(removed)
    }

    /// Every stored route: pre-order, a node's best route then its
    /// alternatives, bit-0 subtree before bit-1 subtree.
    pub fn dump(&self) -> Vec<&Route> {
        let mut table = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            table.extend(node.route.iter());
            table.extend(node.alternatives.iter());
            stack.extend(node.children.iter().rev().flatten().copied());
        }
        table
    }

    /// Number of stored routes, alternatives included.
    pub fn len(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| usize::from(n.route.is_some()) + n.alternatives.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.freelist.len()
    }

    /// Drop every route and node; only a fresh root remains.
    pub fn clear(&mut self) {
        info!("[CLEAR] Clearing table.");
        self.nodes.clear();
        self.nodes.push(Node::new(0, None));
        self.freelist.clear();
    }

    /// Emit gauges (caller decides cadence).
    pub fn report_metrics(&self) {
        gauge!(METRIC_NODES).set(self.node_count() as f64);
        gauge!(METRIC_ROUTES).set(self.len() as f64);
    }
}

impl fmt::Display for ForwardingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for route in self.dump() {
            writeln!(f, "{route}")?;
        }
        Ok(())
    }
}
