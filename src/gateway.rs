//! Manager gateway resolution
//!
//! Derives the management gateway address from a tenant subnet. The gateway
//! is by convention the second host of the subnet: the network address with
//! its last octet forced to 2.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use crate::error::{Error, Result};

/// Resolve the manager gateway for a tenant subnet.
///
/// `subnet` must be an IPv4 CIDR (e.g. `10.4.0.0/16`). The result is the
/// subnet's network address with the last octet set to 2, so `10.4.0.0/16`
/// resolves to `10.4.0.2`. Deterministic, no side effects.
pub fn manager_gateway(subnet: &str) -> Result<Ipv4Addr> {
    let net: Ipv4Net = subnet.parse().map_err(|source| Error::InvalidSubnet {
        subnet: subnet.to_string(),
        source,
    })?;

    let mut octets = net.network().octets();
    octets[3] = 2;
    Ok(Ipv4Addr::from(octets))
}
