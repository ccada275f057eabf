//! Host route reconciliation
//!
//! Ensures a `/32` host route to the workload cluster's API server exists via
//! the manager gateway. The routing table is parsed into typed records before
//! comparison; substring matching against `ip route show` output is too
//! fragile for overlapping prefixes.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::host::command::CommandRunner;

/// One parsed line of the kernel routing table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub destination: Ipv4Net,
    pub via: Option<Ipv4Addr>,
    pub device: Option<String>,
}

/// Outcome of a successful reconciliation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The route already exists via the expected gateway; nothing written.
    AlreadyCorrect,
    /// The route was absent and has been added.
    Added,
}

/// Parse `ip route show` output into route entries.
///
/// Host routes print without a prefix length (`203.0.113.5 via ...`), so a
/// bare address is treated as `/32`. Lines that do not start with an IPv4
/// destination (IPv6 tables, `broadcast`/`local` entries) are skipped.
pub fn parse_route_table(output: &str) -> Vec<RouteEntry> {
    let mut entries = Vec::new();

    for line in output.lines() {
        let mut tokens = line.split_whitespace();
        let Some(dst) = tokens.next() else {
            continue;
        };

        let destination = if dst == "default" {
            Ipv4Net::new(Ipv4Addr::UNSPECIFIED, 0).expect("/0 is a valid prefix")
        } else if let Ok(net) = dst.parse::<Ipv4Net>() {
            net
        } else if let Ok(addr) = dst.parse::<Ipv4Addr>() {
            Ipv4Net::new(addr, 32).expect("/32 is a valid prefix")
        } else {
            continue;
        };

        let mut via = None;
        let mut device = None;
        while let Some(token) = tokens.next() {
            match token {
                "via" => via = tokens.next().and_then(|t| t.parse().ok()),
                "dev" => device = tokens.next().map(str::to_string),
                _ => {}
            }
        }

        entries.push(RouteEntry {
            destination,
            via,
            device,
        });
    }

    entries
}

/// Reconciles a single host route against live kernel state.
pub struct RouteReconciler<R> {
    runner: R,
}

impl<R: CommandRunner> RouteReconciler<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Ensure `destination/32 via gateway` exists in the routing table.
    ///
    /// Three-way decision: already correct (no-op), conflicting (hard error,
    /// never overwritten), or absent (route added). Idempotent once kernel
    /// state matches the desired route.
    pub fn ensure(&self, destination: &str, gateway: &str) -> Result<RouteOutcome> {
        let destination: Ipv4Addr = destination.parse().map_err(|_| Error::InvalidIp {
            ip: destination.to_string(),
        })?;
        let gateway: Ipv4Addr = gateway.parse().map_err(|_| Error::InvalidIp {
            ip: gateway.to_string(),
        })?;

        let table = self
            .runner
            .run("ip", &["route", "show"])
            .map_err(|e| Error::RouteQueryFailed {
                detail: e.to_string(),
            })
            .and_then(|out| {
                if out.success {
                    Ok(out.combined)
                } else {
                    Err(Error::RouteQueryFailed {
                        detail: out.combined,
                    })
                }
            })?;
        debug!("current routing table:\n{}", table.trim_end());

        let wanted = Ipv4Net::new(destination, 32).expect("/32 is a valid prefix");
        let existing: Vec<_> = parse_route_table(&table)
            .into_iter()
            .filter(|entry| entry.destination == wanted)
            .collect();

        if existing.iter().any(|entry| entry.via == Some(gateway)) {
            info!("route {}/32 already exists via {}", destination, gateway);
            return Ok(RouteOutcome::AlreadyCorrect);
        }

        if let Some(entry) = existing.first() {
            return Err(Error::RouteConflict {
                destination,
                expected: gateway,
                found: entry.via,
            });
        }

        let dst = format!("{destination}/32");
        let gw = gateway.to_string();
        let add = self
            .runner
            .run("ip", &["route", "add", &dst, "via", &gw])
            .map_err(|e| Error::RouteAddFailed {
                destination,
                gateway,
                detail: e.to_string(),
            })?;
        if !add.success {
            return Err(Error::RouteAddFailed {
                destination,
                gateway,
                detail: add.combined,
            });
        }

        info!("route {}/32 added via {}", destination, gateway);
        Ok(RouteOutcome::Added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::command::fake::FakeRunner;

    const TABLE_WITH_ROUTE: &str = "\
default via 10.0.2.2 dev eth0\n\
10.0.2.0/24 dev eth0 proto kernel scope link src 10.0.2.15\n\
203.0.113.5 via 192.168.10.2 dev net1\n";

    #[test]
    fn parses_host_and_prefix_routes() {
        let entries = parse_route_table(TABLE_WITH_ROUTE);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].destination, "0.0.0.0/0".parse().unwrap());
        assert_eq!(entries[0].via, Some("10.0.2.2".parse().unwrap()));

        assert_eq!(entries[1].destination, "10.0.2.0/24".parse().unwrap());
        assert_eq!(entries[1].via, None);
        assert_eq!(entries[1].device.as_deref(), Some("eth0"));

        assert_eq!(entries[2].destination, "203.0.113.5/32".parse().unwrap());
        assert_eq!(entries[2].via, Some("192.168.10.2".parse().unwrap()));
    }

    #[test]
    fn skips_unparseable_lines() {
        let entries = parse_route_table("unreachable fe80::/64 dev eth0\n\nnonsense line\n");
        assert!(entries.is_empty());
    }

    #[test]
    fn adds_route_when_absent() {
        let runner = FakeRunner::new()
            .respond("ip route show", true, "default via 10.0.2.2 dev eth0\n")
            .respond("ip route add 203.0.113.5/32 via 192.168.10.2", true, "");

        let outcome = RouteReconciler::new(&runner)
            .ensure("203.0.113.5", "192.168.10.2")
            .unwrap();

        assert_eq!(outcome, RouteOutcome::Added);
        assert_eq!(
            runner.calls(),
            vec![
                "ip route show".to_string(),
                "ip route add 203.0.113.5/32 via 192.168.10.2".to_string(),
            ]
        );
    }

    #[test]
    fn no_op_when_route_already_correct() {
        let runner = FakeRunner::new().respond("ip route show", true, TABLE_WITH_ROUTE);

        let outcome = RouteReconciler::new(&runner)
            .ensure("203.0.113.5", "192.168.10.2")
            .unwrap();

        assert_eq!(outcome, RouteOutcome::AlreadyCorrect);
        // Only the read happened; no write was issued.
        assert_eq!(runner.calls(), vec!["ip route show".to_string()]);
    }

    #[test]
    fn conflicting_gateway_is_a_hard_error() {
        let runner = FakeRunner::new().respond("ip route show", true, TABLE_WITH_ROUTE);

        let err = RouteReconciler::new(&runner)
            .ensure("203.0.113.5", "10.99.0.2")
            .unwrap_err();

        match err {
            Error::RouteConflict {
                destination,
                expected,
                found,
            } => {
                assert_eq!(destination, "203.0.113.5".parse::<Ipv4Addr>().unwrap());
                assert_eq!(expected, "10.99.0.2".parse::<Ipv4Addr>().unwrap());
                assert_eq!(found, Some("192.168.10.2".parse().unwrap()));
            }
            other => panic!("expected RouteConflict, got {other:?}"),
        }
        // No modification on conflict.
        assert_eq!(runner.calls(), vec!["ip route show".to_string()]);
    }

    #[test]
    fn overlapping_prefix_is_not_a_match() {
        // A /24 covering the destination must not be mistaken for the /32.
        let runner = FakeRunner::new()
            .respond(
                "ip route show",
                true,
                "203.0.113.0/24 via 192.168.10.2 dev net1\n",
            )
            .respond("ip route add 203.0.113.5/32 via 192.168.10.2", true, "");

        let outcome = RouteReconciler::new(&runner)
            .ensure("203.0.113.5", "192.168.10.2")
            .unwrap();
        assert_eq!(outcome, RouteOutcome::Added);
    }

    #[test]
    fn add_failure_surfaces_command_output() {
        let runner = FakeRunner::new()
            .respond("ip route show", true, "")
            .respond(
                "ip route add 203.0.113.5/32 via 192.168.10.2",
                false,
                "RTNETLINK answers: Network is unreachable\n",
            );

        let err = RouteReconciler::new(&runner)
            .ensure("203.0.113.5", "192.168.10.2")
            .unwrap_err();
        assert!(matches!(err, Error::RouteAddFailed { .. }));
        assert!(err.to_string().contains("Network is unreachable"));
    }

    #[test]
    fn rejects_invalid_addresses() {
        let runner = FakeRunner::new();
        let reconciler = RouteReconciler::new(&runner);

        assert!(matches!(
            reconciler.ensure("not-an-ip", "192.168.10.2"),
            Err(Error::InvalidIp { .. })
        ));
        assert!(matches!(
            reconciler.ensure("203.0.113.5", "bad-gateway"),
            Err(Error::InvalidIp { .. })
        ));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn second_call_after_add_is_idempotent() {
        // After the add, the table reflects the new route and the second
        // reconciliation reads it back without writing.
        let runner = FakeRunner::new().respond("ip route show", true, TABLE_WITH_ROUTE);
        let outcome = RouteReconciler::new(&runner)
            .ensure("203.0.113.5", "192.168.10.2")
            .unwrap();
        assert_eq!(outcome, RouteOutcome::AlreadyCorrect);
    }
}
