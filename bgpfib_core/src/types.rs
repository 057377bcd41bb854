//! Data structures for the forwarding table

use crate::constants::{RANK_EGP, RANK_IGP, RANK_UNK};
use crate::errors::Error;
use crate::helpers::{cidr_repr, prefix_length};
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Arena handle: index of a node in `ForwardingTable::nodes`.
pub type NodeId = u32;

/// How a route was learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    #[serde(rename = "IGP")]
    Igp,
    #[serde(rename = "EGP")]
    Egp,
    #[serde(rename = "UNK")]
    Unk,
}

impl Origin {
    /// Fixed preference rank; higher is better.
    pub const fn rank(self) -> u8 {
        match self {
            Origin::Igp => RANK_IGP,
            Origin::Egp => RANK_EGP,
            Origin::Unk => RANK_UNK,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Igp => "IGP",
            Origin::Egp => "EGP",
            Origin::Unk => "UNK",
        }
    }
}

impl FromStr for Origin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IGP" => Ok(Origin::Igp),
            "EGP" => Ok(Origin::Egp),
            "UNK" => Ok(Origin::Unk),
            other => Err(Error::UnknownOrigin(other.to_string())),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A learned route. Fields are fixed; build one directly or validate a
/// [`RouteRecord`](crate::record::RouteRecord) into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub network: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub peer: String,
    #[serde(rename = "ASPath")]
    pub as_path: Vec<u32>,
    #[serde(rename = "localpref")]
    pub local_pref: u32,
    #[serde(rename = "selfOrigin")]
    pub self_origin: bool,
    pub origin: Origin,
}

impl Route {
    pub fn prefix_len(&self) -> Result<u8, Error> {
        prefix_length(self.netmask)
    }

    /// The route's destination as a canonical (host bits cleared) prefix.
    pub fn prefix(&self) -> Result<Ipv4Net, Error> {
        let len = self.prefix_len()?;
        Ipv4Net::new(self.network, len)
            .map(|net| net.trunc())
            .map_err(|_| Error::InvalidNetmask(self.netmask))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} via {} (localpref={}, selfOrigin={}, ASPath={:?}, origin={})",
            cidr_repr(self.network, self.netmask),
            self.peer,
            self.local_pref,
            self.self_origin,
            self.as_path,
            self.origin
        )
    }
}

/// One bit position in the trie.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Branch taken from the parent (0 or 1); meaningless for the root.
    pub bit: u8,
    pub parent: Option<NodeId>,
    pub children: [Option<NodeId>; 2],
    /// Best route for the prefix ending exactly here.
    pub route: Option<Route>,
    /// Routes that lost selection for this exact prefix.
    pub alternatives: Vec<Route>,
}

impl Node {
    pub fn new(bit: u8, parent: Option<NodeId>) -> Self {
        Self {
            bit,
            parent,
            ..Default::default()
        }
    }
}

/// Runtime knobs for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Collapse compatible sibling prefixes after every insert.
    pub aggregate: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { aggregate: true }
    }
}

/// The forwarding table (core handle).
///
/// Nodes live in an arena; children are owned through their slot in the
/// parent, `parent` links are plain handles used only to walk upward.
#[derive(Debug, Clone)]
pub struct ForwardingTable {
    pub(crate) nodes: Vec<Node>,
    pub(crate) freelist: Vec<NodeId>, // slots released by pruning
    pub(crate) config: TableConfig,
}
