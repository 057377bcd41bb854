//! Error handling for bgpfib

use std::net::Ipv4Addr;
use thiserror::Error;

/// Everything a caller can get wrong when feeding the table.
///
/// All variants are raised before the trie is touched, so a failed call
/// never leaves a half-built node chain behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed IPv4 address: {0:?}")]
    MalformedAddress(String),
    #[error("netmask {0} is not a contiguous prefix mask")]
    InvalidNetmask(Ipv4Addr),
    #[error("route record is missing required attribute `{0}`")]
    MissingAttribute(&'static str),
    #[error("unknown route origin: {0:?}")]
    UnknownOrigin(String),
}

impl Error {
    /// Short, stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Error::MalformedAddress(_) => "Malformed address",
            Error::InvalidNetmask(_) => "Invalid netmask",
            Error::MissingAttribute(_) => "Missing attribute",
            Error::UnknownOrigin(_) => "Unknown origin",
        }
    }
}
