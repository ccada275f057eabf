//! Tenant subnet discovery
//!
//! The management network exposes per-tenant API-server subnet configuration
//! as a namespaced custom resource. The default tenant's subnet is what the
//! manager gateway is derived from.

use std::net::Ipv4Addr;

use kube::api::{Api, ListParams};
use kube::{Client, CustomResource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::gateway::manager_gateway;

/// Name and namespace of the default tenant carrying the management subnet.
pub const DEFAULT_TENANT: &str = "ten-mng";
pub const DEFAULT_TENANT_NAMESPACE: &str = "ten-mng";

/// TenantApiServer custom resource specification
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "net.metastone.io",
    version = "v1",
    kind = "TenantApiServer",
    namespaced
)]
pub struct TenantApiServerSpec {
    /// Tenant owning this subnet configuration
    pub tenant: String,

    /// CIDR assigned to the tenant's API servers
    #[serde(default)]
    pub subnet: String,
}

/// Fetch the default tenant's subnet from the management cluster.
///
/// Lists `TenantApiServer` resources in the default tenant's namespace,
/// filtered on the indexed `spec.tenant` field. Exactly one resource with a
/// non-empty subnet is expected; anything else is a configuration error.
pub async fn default_tenant_subnet(client: Client) -> Result<String> {
    let api: Api<TenantApiServer> = Api::namespaced(client, DEFAULT_TENANT_NAMESPACE);
    let params = ListParams::default().fields(&format!("spec.tenant={DEFAULT_TENANT}"));

    let list = api.list(&params).await.map_err(|source| Error::Configuration {
        reason: "failed to list tenant api servers".to_string(),
        source: Some(source),
    })?;
    debug!(
        "found {} tenant api server(s) for tenant {}",
        list.items.len(),
        DEFAULT_TENANT
    );

    subnet_from_items(list.items)
}

/// Resolve the manager gateway for the default tenant: the second host of
/// the tenant subnet.
pub async fn default_tenant_gateway(client: Client) -> Result<Ipv4Addr> {
    let subnet = default_tenant_subnet(client).await?;
    manager_gateway(&subnet)
}

fn subnet_from_items(items: Vec<TenantApiServer>) -> Result<String> {
    if items.len() != 1 {
        return Err(Error::Configuration {
            reason: format!(
                "tenant {} in namespace {} has {} subnet configuration(s), expected exactly one",
                DEFAULT_TENANT,
                DEFAULT_TENANT_NAMESPACE,
                items.len()
            ),
            source: None,
        });
    }

    let subnet = items
        .into_iter()
        .next()
        .map(|item| item.spec.subnet)
        .unwrap_or_default();
    if subnet.is_empty() {
        return Err(Error::Configuration {
            reason: format!(
                "tenant {} in namespace {} has an empty subnet",
                DEFAULT_TENANT, DEFAULT_TENANT_NAMESPACE
            ),
            source: None,
        });
    }

    Ok(subnet)
}
