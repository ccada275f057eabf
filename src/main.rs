//! metastone-route - Manager-gateway route configuration
//!
//! One-shot entrypoint for forcing a workload cluster's control-plane
//! traffic through the management gateway.
//!
//! ## Usage
//!
//! ```bash
//! # Ensure a route with explicit addresses
//! metastone-route ensure --destination 203.0.113.5 --gateway 192.168.10.2
//!
//! # Discover both from the management cluster, then ensure
//! metastone-route discover --cluster wc-1 --namespace tenants
//!
//! # Print the manager gateway for the default tenant
//! metastone-route tenant-gateway
//! ```

use anyhow::{bail, Result};
use clap::Parser;
use kube::api::Api;
use kube::Client;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::{Args, Command, DiscoverArgs, EnsureArgs};
use metastone_route::host::{HostCommandRunner, MarkerStore};
use metastone_route::k8s::{self, Cluster};
use metastone_route::{HostConfigurator, ReconcileOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    match args.command {
        Command::Ensure(ensure_args) => {
            run_ensure(ensure_args)?;
        }
        Command::Discover(discover_args) => {
            run_discover(discover_args).await?;
        }
        Command::TenantGateway => {
            let client = Client::try_default().await?;
            let gateway = k8s::default_tenant_gateway(client).await?;
            println!("{gateway}");
        }
    }

    Ok(())
}

fn run_ensure(args: EnsureArgs) -> Result<()> {
    let configurator =
        HostConfigurator::with_runner(HostCommandRunner, MarkerStore::new(&args.marker_dir));

    let outcome = configurator.ensure_manager_route(
        &args.destination,
        &args.gateway,
        args.local_ip.as_deref(),
    )?;

    report(&args.destination, &args.gateway, outcome);
    Ok(())
}

async fn run_discover(args: DiscoverArgs) -> Result<()> {
    let client = Client::try_default().await?;

    let gateway = k8s::default_tenant_gateway(client.clone()).await?;
    info!("manager gateway resolved to {}", gateway);

    let clusters: Api<Cluster> = Api::namespaced(client, &args.namespace);
    let cluster = clusters.get(&args.cluster).await?;
    let destination = k8s::control_plane_host(&cluster);
    if destination.is_empty() {
        bail!(
            "cluster {}/{} has no control-plane endpoint host",
            args.namespace,
            args.cluster
        );
    }
    info!("control-plane endpoint is {}", destination);

    let configurator =
        HostConfigurator::with_runner(HostCommandRunner, MarkerStore::new(&args.marker_dir));
    let outcome = configurator.ensure_manager_route(
        &destination,
        &gateway.to_string(),
        args.local_ip.as_deref(),
    )?;

    report(&destination, &gateway.to_string(), outcome);
    Ok(())
}

fn report(destination: &str, gateway: &str, outcome: ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::AlreadyConfigured => {
            info!("{} already configured, nothing to do", destination);
        }
        ReconcileOutcome::Configured(route) => {
            info!("{} now routed via {} ({:?})", destination, gateway, route);
        }
    }
}
