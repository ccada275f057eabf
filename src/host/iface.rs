//! Interface lookup by bound address
//!
//! Finds the host interface owning a given IP so it can be handed to the
//! offload tuner. Snapshot of kernel state at lookup time; never cached.

use std::net::IpAddr;

use crate::error::{Error, Result};
use crate::host::command::CommandRunner;

/// Name of an interface plus the addresses bound to it, all families.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub name: String,
    pub addresses: Vec<IpAddr>,
}

/// Parse `ip -o addr show` output into per-interface records.
///
/// Each line looks like `2: eth0    inet 10.0.2.15/24 brd ... scope global`.
/// Interfaces appear once per address; records preserve the host-reported
/// order of first appearance. Names carry an `@peer` suffix for veth pairs,
/// which is stripped.
pub fn parse_interfaces(output: &str) -> Vec<InterfaceRecord> {
    let mut records: Vec<InterfaceRecord> = Vec::new();

    for line in output.lines() {
        let mut tokens = line.split_whitespace();
        let (Some(_index), Some(name), Some(family), Some(addr)) = (
            tokens.next(),
            tokens.next(),
            tokens.next(),
            tokens.next(),
        ) else {
            continue;
        };
        if family != "inet" && family != "inet6" {
            continue;
        }

        let name = name.split('@').next().unwrap_or(name);
        let Ok(address) = addr
            .split('/')
            .next()
            .unwrap_or(addr)
            .parse::<IpAddr>()
        else {
            continue;
        };

        match records.iter_mut().find(|r| r.name == name) {
            Some(record) => record.addresses.push(address),
            None => records.push(InterfaceRecord {
                name: name.to_string(),
                addresses: vec![address],
            }),
        }
    }

    records
}

/// Locates the interface owning a given address.
pub struct InterfaceLocator<R> {
    runner: R,
}

impl<R: CommandRunner> InterfaceLocator<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Return the name of the first interface whose address set contains an
    /// exact match for `ip`. First match wins if several interfaces own the
    /// address.
    pub fn find_by_ip(&self, ip: &str) -> Result<String> {
        let target: IpAddr = ip
            .parse()
            .map_err(|_| Error::InvalidIp { ip: ip.to_string() })?;

        let output = self
            .runner
            .run("ip", &["-o", "addr", "show"])
            .map_err(|e| Error::InterfaceListFailed {
                detail: e.to_string(),
            })
            .and_then(|out| {
                if out.success {
                    Ok(out.combined)
                } else {
                    Err(Error::InterfaceListFailed {
                        detail: out.combined,
                    })
                }
            })?;

        parse_interfaces(&output)
            .into_iter()
            .find(|record| record.addresses.contains(&target))
            .map(|record| record.name)
            .ok_or(Error::InterfaceNotFound { ip: target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::command::fake::FakeRunner;

    const ADDR_OUTPUT: &str = "\
1: lo    inet 127.0.0.1/8 scope host lo\\       valid_lft forever preferred_lft forever\n\
1: lo    inet6 ::1/128 scope host \\       valid_lft forever preferred_lft forever\n\
2: eth0    inet 10.0.2.15/24 brd 10.0.2.255 scope global dynamic eth0\\       valid_lft 85790sec\n\
2: eth0    inet6 fe80::a00:27ff:fe4e:66a1/64 scope link \\       valid_lft forever\n\
3: net1@if7    inet 192.168.10.11/24 brd 192.168.10.255 scope global net1\\       valid_lft forever\n";

    #[test]
    fn parses_interfaces_with_all_families() {
        let records = parse_interfaces(ADDR_OUTPUT);
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].name, "lo");
        assert_eq!(records[0].addresses.len(), 2);

        assert_eq!(records[1].name, "eth0");
        assert!(records[1]
            .addresses
            .contains(&"10.0.2.15".parse::<IpAddr>().unwrap()));
        assert!(records[1]
            .addresses
            .contains(&"fe80::a00:27ff:fe4e:66a1".parse::<IpAddr>().unwrap()));

        // veth peer suffix is stripped
        assert_eq!(records[2].name, "net1");
    }

    #[test]
    fn finds_interface_owning_address() {
        let runner = FakeRunner::new().respond("ip -o addr show", true, ADDR_OUTPUT);
        let name = InterfaceLocator::new(&runner)
            .find_by_ip("192.168.10.11")
            .unwrap();
        assert_eq!(name, "net1");
    }

    #[test]
    fn exact_match_only() {
        // 10.0.2.0/24 covers 10.0.2.99 but no interface owns that address.
        let runner = FakeRunner::new().respond("ip -o addr show", true, ADDR_OUTPUT);
        let err = InterfaceLocator::new(&runner)
            .find_by_ip("10.0.2.99")
            .unwrap_err();
        assert!(matches!(err, Error::InterfaceNotFound { .. }));
    }

    #[test]
    fn rejects_unparseable_ip() {
        let runner = FakeRunner::new();
        let err = InterfaceLocator::new(&runner)
            .find_by_ip("10.0.2.")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIp { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn matches_ipv6_addresses_too() {
        let runner = FakeRunner::new().respond("ip -o addr show", true, ADDR_OUTPUT);
        let name = InterfaceLocator::new(&runner)
            .find_by_ip("fe80::a00:27ff:fe4e:66a1")
            .unwrap();
        assert_eq!(name, "eth0");
    }
}
