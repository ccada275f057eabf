//! Error taxonomy for route configuration
//!
//! Every failure surfaced to the caller maps to one of these variants;
//! nothing is retried internally.

use std::net::{IpAddr, Ipv4Addr};

use thiserror::Error;

/// Errors produced while configuring manager-gateway routing.
#[derive(Error, Debug)]
pub enum Error {
    /// The tenant subnet did not parse as an IPv4 CIDR.
    #[error("invalid subnet {subnet:?}: {source}")]
    InvalidSubnet {
        subnet: String,
        #[source]
        source: ipnet::AddrParseError,
    },

    /// An IP address argument did not parse.
    #[error("invalid IP address {ip:?}")]
    InvalidIp { ip: String },

    /// Malformed or ambiguous tenant configuration in the management cluster.
    #[error("tenant configuration error: {reason}")]
    Configuration {
        reason: String,
        #[source]
        source: Option<kube::Error>,
    },

    /// Reading the kernel routing table failed.
    #[error("failed to query routing table: {detail}")]
    RouteQueryFailed { detail: String },

    /// A host route for the destination already exists but points somewhere
    /// else. Never overwritten automatically; requires operator intervention.
    #[error(
        "route {destination}/32 exists but points to a different gateway \
         (expected {expected}, found {found:?})"
    )]
    RouteConflict {
        destination: Ipv4Addr,
        expected: Ipv4Addr,
        found: Option<Ipv4Addr>,
    },

    /// `ip route add` returned a non-zero exit or failed to run.
    #[error("failed to add route {destination}/32 via {gateway}: {detail}")]
    RouteAddFailed {
        destination: Ipv4Addr,
        gateway: Ipv4Addr,
        detail: String,
    },

    /// Interface enumeration failed.
    #[error("failed to list network interfaces: {detail}")]
    InterfaceListFailed { detail: String },

    /// No host interface owns the given address.
    #[error("no interface found for IP address {ip}")]
    InterfaceNotFound { ip: IpAddr },

    /// ethtool could not disable hardware TX offload.
    #[error("failed to disable TX offload on {interface}: {detail}")]
    OffloadDisableFailed { interface: String, detail: String },

    /// sysctl could not enable TCP MTU probing.
    #[error("failed to enable TCP MTU probing: {detail}")]
    MtuProbingEnableFailed { detail: String },

    /// The `<cluster>-kubeconfig` secret was missing, malformed, or unusable.
    #[error("failed to fetch kubeconfig for cluster {cluster:?}: {reason}")]
    KubeconfigFetchFailed {
        cluster: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
