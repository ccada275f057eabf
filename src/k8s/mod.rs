//! Kubernetes API access
//!
//! Cluster metadata accessors: tenant subnet discovery and workload cluster
//! credentials.

mod cluster;
mod tenant;

pub use cluster::{
    control_plane_host, fetch_kubeconfig, kubeconfig_from_secret, workload_cluster_client,
    ApiEndpoint, Cluster, ClusterSpec,
};
pub use tenant::{
    default_tenant_gateway, default_tenant_subnet, TenantApiServer, TenantApiServerSpec,
    DEFAULT_TENANT, DEFAULT_TENANT_NAMESPACE,
};
