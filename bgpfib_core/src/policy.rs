//! Route selection and aggregation rules

use crate::helpers::{canonical_netmask, int_to_addr, masked_prefix};
use crate::types::Route;
use std::cmp::Ordering;

/// Rank two routes to the same destination. `Greater` means `a` is preferred.
///
/// First difference decides: higher localpref, self-originated, shorter
/// AS path, better origin, then the lexicographically smaller peer.
pub fn compare(a: &Route, b: &Route) -> Ordering {
    a.local_pref
        .cmp(&b.local_pref)
        .then(a.self_origin.cmp(&b.self_origin))
        .then(b.as_path.len().cmp(&a.as_path.len()))
        .then(a.origin.rank().cmp(&b.origin.rank()))
        .then_with(|| b.peer.cmp(&a.peer))
}

/// Strictly better; a fully equal challenger does not displace the incumbent.
#[inline]
pub fn is_preferred(challenger: &Route, incumbent: &Route) -> bool {
    compare(challenger, incumbent) == Ordering::Greater
}

/// Sibling routes may merge only if they forward identically.
pub fn can_aggregate(a: &Route, b: &Route) -> bool {
    a.peer == b.peer
        && a.as_path == b.as_path
        && a.local_pref == b.local_pref
        && a.origin == b.origin
        && a.self_origin == b.self_origin
}

/// Lift `route` one level up: same attributes, prefix `parent_len`.
pub fn aggregate_route(route: &Route, parent_len: u8) -> Route {
    Route {
        network: int_to_addr(masked_prefix(route.network, parent_len)),
        netmask: canonical_netmask(parent_len),
        ..route.clone()
    }
}

/// Index of the most preferred route in `routes`.
pub fn best_index(routes: &[Route]) -> Option<usize> {
    routes
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| compare(a, b))
        .map(|(i, _)| i)
}
