//! Host network state
//!
//! The kernel routing table, NIC offload flags, and sysctls are externally
//! owned, process-wide resources. Everything here reaches them through narrow
//! command interfaces so tests can substitute fakes.

mod command;
mod iface;
mod marker;
mod route;
mod tuning;

pub use command::{CommandOutput, CommandRunner, HostCommandRunner};
pub use iface::{parse_interfaces, InterfaceLocator, InterfaceRecord};
pub use marker::{MarkerStore, DEFAULT_MARKER_DIR};
pub use route::{parse_route_table, RouteEntry, RouteOutcome, RouteReconciler};
pub use tuning::InterfaceTuner;

#[cfg(test)]
pub(crate) use command::fake;
