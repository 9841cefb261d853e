use thiserror::Error;

use crate::RouterId;

/// Usage and internal errors surfaced by topology operations.
///
/// Protocol outcomes (TTL expiry, no route, stale LSAs) are not errors;
/// they are reported as [`crate::network::Delivery`] values.
#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("a router with id {0} already exists")]
    RouterExists(RouterId),

    #[error("no router with id {0}")]
    NoSuchRouter(RouterId),

    #[error("an interface named {0} already exists")]
    InterfaceExists(String),

    #[error("invalid netmask {0} (prefix must be contiguous)")]
    InvalidNetmask(std::net::Ipv4Addr),

    #[error("cannot link router {0} to itself")]
    LinkToSelf(RouterId),

    #[error("internal error: {0}")]
    Internal(&'static str),
}
