//! One-shot host reconciliation
//!
//! Sequences the individual steps the way the node controller runs them:
//! marker check, route reconciliation, marker write, then best-effort NIC
//! tuning. Route failures are fatal; offload/sysctl failures are logged and
//! tolerated.

use tracing::{info, warn};

use crate::error::Result;
use crate::host::{
    CommandRunner, HostCommandRunner, InterfaceLocator, InterfaceTuner, MarkerStore, RouteOutcome,
    RouteReconciler,
};

/// What a reconciliation pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A marker already existed for the destination; nothing was touched.
    AlreadyConfigured,
    /// The route was reconciled (added or confirmed) this pass.
    Configured(RouteOutcome),
}

/// Drives host network configuration for one destination.
///
/// Single logical caller per node is assumed; concurrent invocations against
/// the same destination race on the marker check.
pub struct HostConfigurator<R = HostCommandRunner> {
    runner: R,
    markers: MarkerStore,
}

impl Default for HostConfigurator {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConfigurator {
    /// Configurator running real host commands with the default marker
    /// directory.
    pub fn new() -> Self {
        Self {
            runner: HostCommandRunner,
            markers: MarkerStore::default(),
        }
    }
}

impl<R: CommandRunner> HostConfigurator<R> {
    pub fn with_runner(runner: R, markers: MarkerStore) -> Self {
        Self { runner, markers }
    }

    /// Ensure control-plane traffic to `destination` goes via `gateway`.
    ///
    /// If a marker exists for the destination the pass is skipped entirely.
    /// Otherwise the route is reconciled (a conflict aborts), the marker is
    /// written, and, when `local_ip` is given, the interface owning that
    /// address gets TX offload disabled and TCP MTU probing is enabled.
    /// Tuning failures do not abort the pass.
    pub fn ensure_manager_route(
        &self,
        destination: &str,
        gateway: &str,
        local_ip: Option<&str>,
    ) -> Result<ReconcileOutcome> {
        if self.markers.is_configured(destination) {
            info!(
                "destination {} already configured (marker in {})",
                destination,
                self.markers.root().display()
            );
            return Ok(ReconcileOutcome::AlreadyConfigured);
        }

        let outcome = RouteReconciler::new(&self.runner).ensure(destination, gateway)?;

        if let Err(e) = self.markers.record(destination, gateway) {
            warn!("failed to write marker for {}: {}", destination, e);
        }

        if let Some(local_ip) = local_ip {
            self.tune_interface_for_ip(local_ip);
        }

        Ok(ReconcileOutcome::Configured(outcome))
    }

    /// Best-effort tuning of the interface owning `local_ip`. Each failure is
    /// logged independently; neither blocks the other.
    fn tune_interface_for_ip(&self, local_ip: &str) {
        let tuner = InterfaceTuner::new(&self.runner);

        match InterfaceLocator::new(&self.runner).find_by_ip(local_ip) {
            Ok(interface) => {
                if let Err(e) = tuner.disable_tx_offload(&interface) {
                    warn!("{}", e);
                }
            }
            Err(e) => warn!("skipping TX offload tuning: {}", e),
        }

        if let Err(e) = tuner.enable_mtu_probing() {
            warn!("{}", e);
        }
    }
}
