//! # agentscope - Main Entry Point
//!
//! Parses the command line, runs one command, and is the only place that
//! turns an error into a process exit code.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::io::{self, Write};

use agentscope::cli::{Args, Command, DumpCommand};
use agentscope::debug::{DebugClient, TcpTransport};
use agentscope::domain::{DumpError, TableError};
use agentscope::dump::{self, ProcessCacheOptions};
use agentscope::filter::ProcessFilter;
use agentscope::preflight::run_preflight_checks;
use agentscope::table::{ExecveTable, NestedTableLayout, PolicyFilterTable, TableLayout};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_NOPERM: i32 = 77;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let permission = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<TableError>(),
            Some(TableError::Permission { .. })
        ) || matches!(
            cause.downcast_ref::<DumpError>(),
            Some(DumpError::Table(TableError::Permission { .. }))
        )
    });
    if permission {
        EXIT_NOPERM
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let location = args.map_location();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.command {
        Command::Dump(DumpCommand::Execve { map_fname }) => {
            run_preflight_checks(&location.root);
            let path = location.resolve(map_fname.as_deref(), ExecveTable::NAME);
            dump::execve_map(&path, &mut out).context("Failed to dump execve map")?;
        }
        Command::Dump(DumpCommand::Policyfilter { map_fname }) => {
            run_preflight_checks(&location.root);
            let path = location.resolve(map_fname.as_deref(), PolicyFilterTable::NAME);
            dump::policyfilter_state(&path, &mut out)
                .context("Failed to dump policyfilter map")?;
        }
        Command::Dump(DumpCommand::ProcessCache { skip_zero_refcnt, filter_zero_refcnt }) => {
            let transport = TcpTransport::new(&args.client_config())?;
            let mut client = DebugClient::new(transport);
            let options = ProcessCacheOptions {
                skip_zero_refcnt: *skip_zero_refcnt,
                filter: ProcessFilter::from_flag(*filter_zero_refcnt),
            };
            let summary = dump::dump_process_cache(&mut client, &options, &mut out)
                .context("Failed to dump process cache")?;
            info!(
                "Process cache: {} printed, {} filtered, {} skipped",
                summary.printed, summary.filtered, summary.skipped
            );
        }
        Command::Dump(DumpCommand::Snapshot) => {
            run_preflight_checks(&location.root);
            let report = dump::snapshot(&location, &mut out);
            if !report.is_complete() {
                bail!("Could not dump: {}", report.failed.join(", "));
            }
        }
        Command::LogLevel => {
            let transport = TcpTransport::new(&args.client_config())?;
            let level = DebugClient::new(transport)
                .log_level()
                .context("Failed to query agent log level")?;
            writeln!(out, "{level}")?;
        }
    }

    out.flush()?;
    Ok(())
}
