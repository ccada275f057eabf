//! Manager-gateway route configuration for workload clusters
//!
//! Forces a workload cluster's control-plane traffic through the management
//! gateway: resolves the gateway from the default tenant's subnet, reconciles
//! a `/32` host route in the kernel routing table, and tunes the carrying
//! interface (TX offload off, TCP MTU probing on). Kubernetes accessors
//! discover the gateway subnet and fetch per-cluster kubeconfig credentials.
//!
//! Consumed as a library by the node reconciliation controller; the binary
//! entrypoint wraps the same workflow for one-shot use.

pub mod error;
pub mod gateway;
pub mod host;
pub mod k8s;
pub mod reconcile;

pub use error::{Error, Result};
pub use gateway::manager_gateway;
pub use reconcile::{HostConfigurator, ReconcileOutcome};
