//! Dump operations
//!
//! Each table dump opens its pinned table, collects every entry, and only
//! then renders, so a failed scan prints nothing. Errors are returned to the
//! caller; deciding whether they end the process is left to `main`.
//!
//! - [`execve_map`]: `<tgid> <fields>` lines or `(empty)`
//! - [`policyfilter_state`]: `<policy>: <cgroups>` lines or `(empty)`
//! - [`namespace_state`]: header plus `<cgroup>: <stable>` lines
//! - [`snapshot`]: all three in sequence, continuing past failures
//! - [`dump_process_cache`]: live query against the agent

use std::io::Write;
use std::path::Path;

use log::warn;

use crate::config::MapLocation;
use crate::domain::DumpError;
use crate::table::{
    ExecveTable, NamespaceTable, NestedTableLayout, PinnedTable, PolicyFilterTable, TableLayout,
    TableSource,
};

pub mod aggregate;
pub mod process_cache;
pub mod render;

pub use aggregate::{collect_map, collect_policyfilter, PolicyFilterState};
pub use process_cache::{dump_process_cache, ProcessCacheOptions, ProcessCacheSummary};
pub use render::{EMPTY, NAMESPACE_HEADER};

/// Dump the execve table pinned at `path`
///
/// # Errors
/// Open, scan, decode and write failures.
pub fn execve_map<W: Write + ?Sized>(path: &Path, out: &mut W) -> Result<usize, DumpError> {
    execve_from(PinnedTable::open(path)?, out)
}

/// Dump execve entries from any table source
///
/// # Errors
/// Scan, decode and write failures.
pub fn execve_from<S, W>(source: S, out: &mut W) -> Result<usize, DumpError>
where
    S: TableSource,
    W: Write + ?Sized,
{
    let entries = collect_map::<ExecveTable, _>(source)?;
    Ok(render::render_execve(out, &entries)?)
}

/// Dump the policy filter table pinned at `path`
///
/// # Errors
/// Open, scan, decode and write failures.
pub fn policyfilter_state<W: Write + ?Sized>(path: &Path, out: &mut W) -> Result<usize, DumpError> {
    policyfilter_from(PinnedTable::open(path)?, out)
}

/// # Errors
/// Scan, decode and write failures.
pub fn policyfilter_from<S, W>(source: S, out: &mut W) -> Result<usize, DumpError>
where
    S: TableSource,
    W: Write + ?Sized,
{
    let state = collect_policyfilter(source)?;
    Ok(render::render_policyfilter(out, &state)?)
}

/// Dump the namespace table pinned at `path`.
///
/// Meant as one step of a larger dump: an unreadable table is logged as a
/// warning and returned, never fatal here.
///
/// # Errors
/// Open, scan, decode and write failures.
pub fn namespace_state<W: Write + ?Sized>(path: &Path, out: &mut W) -> Result<usize, DumpError> {
    let table = PinnedTable::open(path).inspect_err(|err| {
        warn!("Could not open process tree map {}: {err}", path.display());
    })?;
    namespace_from(table, out)
}

/// # Errors
/// Scan, decode and write failures.
pub fn namespace_from<S, W>(source: S, out: &mut W) -> Result<usize, DumpError>
where
    S: TableSource,
    W: Write + ?Sized,
{
    let entries = collect_map::<NamespaceTable, _>(source)?;
    Ok(render::render_namespace(out, &entries)?)
}

/// Outcome of [`snapshot`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    /// Tables that could not be dumped
    pub failed: Vec<&'static str>,
}

impl SnapshotReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Dump every known table under `location`, one `== <table> ==` section
/// each. A failing section is logged and the next one still runs.
pub fn snapshot<W: Write + ?Sized>(location: &MapLocation, out: &mut W) -> SnapshotReport {
    let mut report = SnapshotReport::default();

    section(out, &mut report, ExecveTable::NAME, |out| {
        execve_map(&location.table_path(ExecveTable::NAME), out)
    });
    section(out, &mut report, PolicyFilterTable::NAME, |out| {
        policyfilter_state(&location.table_path(PolicyFilterTable::NAME), out)
    });
    section(out, &mut report, NamespaceTable::NAME, |out| {
        namespace_state(&location.table_path(NamespaceTable::NAME), out)
    });

    report
}

fn section<W, F>(out: &mut W, report: &mut SnapshotReport, name: &'static str, dump: F)
where
    W: Write + ?Sized,
    F: FnOnce(&mut W) -> Result<usize, DumpError>,
{
    let result = writeln!(out, "== {name} ==").map_err(DumpError::from).and_then(|()| dump(out));
    if let Err(err) = result {
        warn!("Failed to dump {name}: {err}");
        report.failed.push(name);
    }
}
