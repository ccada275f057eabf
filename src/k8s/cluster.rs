//! Workload cluster access
//!
//! Reads the Cluster API `Cluster` object for the control-plane endpoint and
//! fetches the per-cluster kubeconfig secret so a client can be built for
//! the workload cluster itself.

use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, CustomResource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Cluster API `Cluster` specification (the fields consumed here).
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "cluster.x-k8s.io",
    version = "v1beta1",
    kind = "Cluster",
    namespaced
)]
pub struct ClusterSpec {
    /// Endpoint used to reach the cluster's API server
    #[serde(
        rename = "controlPlaneEndpoint",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub control_plane_endpoint: Option<ApiEndpoint>,
}

/// Host/port pair for an API server endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
pub struct ApiEndpoint {
    pub host: String,

    #[serde(default)]
    pub port: i32,
}

/// The API-server host of a cluster. Pure accessor; an unset endpoint reads
/// as an empty string.
pub fn control_plane_host(cluster: &Cluster) -> String {
    cluster
        .spec
        .control_plane_endpoint
        .as_ref()
        .map(|endpoint| endpoint.host.clone())
        .unwrap_or_default()
}

/// Fetch the kubeconfig blob for a workload cluster.
///
/// The kubeconfig lives in a secret named `<cluster-name>-kubeconfig` in the
/// cluster's namespace, under the `value` key.
pub async fn fetch_kubeconfig(client: Client, namespace: &str, cluster: &str) -> Result<String> {
    let secrets: Api<Secret> = Api::namespaced(client, namespace);
    let secret_name = format!("{cluster}-kubeconfig");

    let secret = secrets
        .get(&secret_name)
        .await
        .map_err(|e| kubeconfig_error(cluster, format!("failed to get secret {secret_name}"), e))?;

    kubeconfig_from_secret(&secret, cluster)
}

/// Build a client for the workload cluster from its kubeconfig secret.
pub async fn workload_cluster_client(
    client: Client,
    namespace: &str,
    cluster: &str,
) -> Result<Client> {
    let raw = fetch_kubeconfig(client, namespace, cluster).await?;
    debug!("building workload cluster client for {}", cluster);

    let kubeconfig = Kubeconfig::from_yaml(&raw)
        .map_err(|e| kubeconfig_error(cluster, "failed to parse kubeconfig".to_string(), e))?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| kubeconfig_error(cluster, "failed to build client config".to_string(), e))?;

    Client::try_from(config)
        .map_err(|e| kubeconfig_error(cluster, "failed to create client".to_string(), e))
}

/// Extract the kubeconfig blob from an already-fetched secret.
pub fn kubeconfig_from_secret(secret: &Secret, cluster: &str) -> Result<String> {
    let value = secret
        .data
        .as_ref()
        .and_then(|data| data.get("value"))
        .ok_or_else(|| Error::KubeconfigFetchFailed {
            cluster: cluster.to_string(),
            reason: "secret value key is missing".to_string(),
            source: None,
        })?;

    String::from_utf8(value.0.clone())
        .map_err(|e| kubeconfig_error(cluster, "kubeconfig is not valid UTF-8".to_string(), e))
}

fn kubeconfig_error(
    cluster: &str,
    reason: String,
    source: impl std::error::Error + Send + Sync + 'static,
) -> Error {
    Error::KubeconfigFetchFailed {
        cluster: cluster.to_string(),
        reason,
        source: Some(Box::new(source)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::ByteString;
    use std::collections::BTreeMap;

    #[test]
    fn control_plane_host_reads_endpoint() {
        let cluster = Cluster::new(
            "wc-1",
            ClusterSpec {
                control_plane_endpoint: Some(ApiEndpoint {
                    host: "203.0.113.5".to_string(),
                    port: 6443,
                }),
            },
        );
        assert_eq!(control_plane_host(&cluster), "203.0.113.5");
    }

    #[test]
    fn control_plane_host_defaults_to_empty() {
        let cluster = Cluster::new("wc-1", ClusterSpec::default());
        assert_eq!(control_plane_host(&cluster), "");
    }

    fn secret_with_data(data: Option<BTreeMap<String, ByteString>>) -> Secret {
        Secret {
            data,
            ..Secret::default()
        }
    }

    #[test]
    fn extracts_kubeconfig_value() {
        let mut data = BTreeMap::new();
        data.insert(
            "value".to_string(),
            ByteString(b"apiVersion: v1\nkind: Config\n".to_vec()),
        );
        let secret = secret_with_data(Some(data));

        let raw = kubeconfig_from_secret(&secret, "wc-1").unwrap();
        assert!(raw.starts_with("apiVersion: v1"));
    }

    #[test]
    fn missing_value_key_fails() {
        let secret = secret_with_data(Some(BTreeMap::new()));
        let err = kubeconfig_from_secret(&secret, "wc-1").unwrap_err();
        assert!(matches!(err, Error::KubeconfigFetchFailed { .. }));
        assert!(err.to_string().contains("value key is missing"));
    }

    #[test]
    fn missing_data_fails() {
        let secret = secret_with_data(None);
        assert!(kubeconfig_from_secret(&secret, "wc-1").is_err());
    }
}
