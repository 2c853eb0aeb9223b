//! Line-oriented rendering of collected tables

use std::collections::BTreeMap;
use std::io::{self, Write};

use agentscope_common::execve::ExecveValue;

use crate::domain::{CgroupId, StableId, Tgid};
use crate::dump::aggregate::PolicyFilterState;

/// Printed in place of a table with no entries
pub const EMPTY: &str = "(empty)";

/// First line of a namespace dump
pub const NAMESPACE_HEADER: &str = "cgroupId: stableId";

/// One `<tgid> <fields>` line per entry, or [`EMPTY`].
/// Returns the number of entry lines written.
///
/// # Errors
/// Returns an error if writing to `out` fails
pub fn render_execve<W: Write + ?Sized>(
    out: &mut W,
    entries: &BTreeMap<Tgid, ExecveValue>,
) -> io::Result<usize> {
    if entries.is_empty() {
        writeln!(out, "{EMPTY}")?;
        return Ok(0);
    }
    for (tgid, value) in entries {
        writeln!(out, "{tgid} {value}")?;
    }
    Ok(entries.len())
}

/// One `<policy>: <cgroup>,<cgroup>,...` line per policy, or [`EMPTY`].
///
/// # Errors
/// Returns an error if writing to `out` fails
pub fn render_policyfilter<W: Write + ?Sized>(
    out: &mut W,
    state: &PolicyFilterState,
) -> io::Result<usize> {
    if state.is_empty() {
        writeln!(out, "{EMPTY}")?;
        return Ok(0);
    }
    for (policy, cgroups) in state.iter() {
        let members: Vec<String> = cgroups.iter().map(ToString::to_string).collect();
        writeln!(out, "{policy}: {}", members.join(","))?;
    }
    Ok(state.len())
}

/// [`NAMESPACE_HEADER`] followed by one `<cgroup>: <stable>` line per entry.
/// An empty table prints only the header.
///
/// # Errors
/// Returns an error if writing to `out` fails
pub fn render_namespace<W: Write + ?Sized>(
    out: &mut W,
    entries: &BTreeMap<CgroupId, StableId>,
) -> io::Result<usize> {
    writeln!(out, "{NAMESPACE_HEADER}")?;
    for (cgroup, stable) in entries {
        writeln!(out, "{cgroup}: {stable}")?;
    }
    Ok(entries.len())
}
