//! Loosely-typed route announcements and their validation into [`Route`].

use crate::errors::Error;
use crate::helpers::{parse_addr, prefix_length};
use crate::types::{Origin, Route};
use serde::Deserialize;

/// An announcement as it arrives from the protocol layer: every attribute
/// may be absent. Convert with `Route::try_from`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RouteRecord {
    pub network: Option<String>,
    pub netmask: Option<String>,
    pub peer: Option<String>,
    #[serde(rename = "ASPath")]
    pub as_path: Option<Vec<u32>>,
    #[serde(rename = "localpref")]
    pub local_pref: Option<u32>,
    #[serde(rename = "selfOrigin")]
    pub self_origin: Option<bool>,
    pub origin: Option<String>,
}

#[inline]
fn required<T>(field: Option<T>, name: &'static str) -> Result<T, Error> {
    field.ok_or(Error::MissingAttribute(name))
}

impl TryFrom<RouteRecord> for Route {
    type Error = Error;

    fn try_from(rec: RouteRecord) -> Result<Self, Self::Error> {
        let network = parse_addr(&required(rec.network, "network")?)?;
        let netmask = parse_addr(&required(rec.netmask, "netmask")?)?;
        prefix_length(netmask)?;
        let origin: Origin = required(rec.origin, "origin")?.parse()?;
        Ok(Route {
            network,
            netmask,
            peer: required(rec.peer, "peer")?,
            as_path: required(rec.as_path, "ASPath")?,
            local_pref: required(rec.local_pref, "localpref")?,
            self_origin: required(rec.self_origin, "selfOrigin")?,
            origin,
        })
    }
}
