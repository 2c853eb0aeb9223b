//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{
    ClientConfig, MapLocation, DEFAULT_MAP_PREFIX, DEFAULT_MAP_ROOT, DEFAULT_SERVER_ADDRESS,
    DEFAULT_TIMEOUT_SECS,
};

#[derive(Parser, Debug)]
#[command(
    name = "agentscope",
    version,
    about = "Inspect the internal state of a running tracing agent",
    after_help = "\
EXAMPLES:
    sudo agentscope dump execve                      Dump the execve table
    sudo agentscope dump policyfilter                Which cgroups each policy covers
    agentscope dump process-cache --skip-zero-refcnt Ask the agent for its process cache
    sudo agentscope dump snapshot                    Every pinned table, continuing past failures"
)]
pub struct Args {
    /// bpffs mount point holding the agent's pinned tables
    #[arg(long, global = true, env = "AGENTSCOPE_BPF_ROOT", default_value = DEFAULT_MAP_ROOT)]
    pub bpf_root: PathBuf,

    /// Directory under the bpf root where the agent pins its tables
    #[arg(long, global = true, env = "AGENTSCOPE_MAP_PREFIX", default_value = DEFAULT_MAP_PREFIX)]
    pub map_prefix: String,

    /// Agent debug endpoint (host:port)
    #[arg(
        long,
        global = true,
        env = "AGENTSCOPE_SERVER_ADDRESS",
        default_value = DEFAULT_SERVER_ADDRESS
    )]
    pub server_address: String,

    /// Debug request timeout in seconds (0 = wait forever)
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn map_location(&self) -> MapLocation {
        MapLocation::new(&self.bpf_root, &self.map_prefix)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.server_address, self.timeout)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dump agent state
    #[command(subcommand)]
    Dump(DumpCommand),

    /// Print the agent's current log level
    LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum DumpCommand {
    /// Dump the execve table
    Execve {
        /// Execve table file (defaults to <bpf-root>/<map-prefix>/execve_map)
        #[arg(long, value_name = "FILE")]
        map_fname: Option<PathBuf>,
    },

    /// Dump policy filter state
    Policyfilter {
        /// Policy filter table file
        #[arg(long, value_name = "FILE")]
        map_fname: Option<PathBuf>,
    },

    /// Dump the agent's process cache
    ProcessCache {
        /// Ask the agent to skip entries with zero refcnt
        #[arg(long)]
        skip_zero_refcnt: bool,

        /// Drop entries with zero refcnt locally, whatever the agent sends
        #[arg(long)]
        filter_zero_refcnt: bool,
    },

    /// Dump every pinned table
    Snapshot,
}
