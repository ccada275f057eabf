//! CLI argument parsing
//!
//! Defines the command-line interface using clap.

use clap::{Parser, Subcommand};

use metastone_route::host::DEFAULT_MARKER_DIR;

/// Manager-gateway route configuration for workload clusters
#[derive(Parser, Debug)]
#[command(name = "metastone-route")]
#[command(version = "0.1.0")]
#[command(about = "Route workload cluster control-plane traffic via the manager gateway")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ensure a host route with explicit destination and gateway
    Ensure(EnsureArgs),

    /// Discover destination and gateway from the management cluster, then ensure the host route
    Discover(DiscoverArgs),

    /// Print the manager gateway resolved from the default tenant subnet
    TenantGateway,
}

/// Arguments for the ensure command
#[derive(Parser, Debug)]
pub struct EnsureArgs {
    /// Destination IP (the workload cluster API server)
    #[arg(short, long)]
    pub destination: String,

    /// Manager gateway IP
    #[arg(short, long)]
    pub gateway: String,

    /// Local IP owning the interface to tune (tuning is skipped when omitted)
    #[arg(short, long)]
    pub local_ip: Option<String>,

    /// Marker directory
    #[arg(long, default_value = DEFAULT_MARKER_DIR)]
    pub marker_dir: String,
}

/// Arguments for the discover command
#[derive(Parser, Debug)]
pub struct DiscoverArgs {
    /// Name of the workload cluster object
    #[arg(short, long)]
    pub cluster: String,

    /// Namespace of the workload cluster object
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Local IP owning the interface to tune (tuning is skipped when omitted)
    #[arg(short, long)]
    pub local_ip: Option<String>,

    /// Marker directory
    #[arg(long, default_value = DEFAULT_MARKER_DIR)]
    pub marker_dir: String,
}
