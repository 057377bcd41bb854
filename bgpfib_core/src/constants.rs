//! Constants for the forwarding table

/// Width of an IPv4 address in bits; also the deepest trie level.
pub const ADDR_BITS: u8 = 32;

/// Arena slot of the root node (never freed).
pub const ROOT: u32 = 0;

// Origin preference ranks, higher wins.
pub const RANK_IGP: u8 = 3;
pub const RANK_EGP: u8 = 2;
pub const RANK_UNK: u8 = 1;

// Metric names
pub const METRIC_INSERTS: &str = "bgpfib_inserts_total";
pub const METRIC_AGGREGATIONS: &str = "bgpfib_aggregations_total";
pub const METRIC_LOOKUPS: &str = "bgpfib_lookups_total";
pub const METRIC_LOOKUP_MISSES: &str = "bgpfib_lookup_misses_total";
pub const METRIC_WITHDRAWALS: &str = "bgpfib_withdrawals_total";
pub const METRIC_NODES: &str = "bgpfib_live_nodes";
pub const METRIC_ROUTES: &str = "bgpfib_stored_routes";
