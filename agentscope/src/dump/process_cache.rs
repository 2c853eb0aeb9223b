//! Process cache dump from a live agent

use std::io::Write;

use log::error;

use crate::debug::{DebugClient, DebugTransport, DumpProcessCacheArgs, ProcessRecord};
use crate::domain::DumpError;
use crate::filter::ProcessFilter;

/// How to query and filter the process cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessCacheOptions {
    /// Hint sent to the agent
    pub skip_zero_refcnt: bool,
    /// Applied locally after decoding
    pub filter: ProcessFilter,
}

/// What happened to the records of one dump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessCacheSummary {
    pub printed: usize,
    pub filtered: usize,
    pub skipped: usize,
}

/// Print the agent's process cache as one JSON line per record.
///
/// A response that does not answer the request is logged and treated as
/// having no records. A record that fails to decode or render is logged and
/// skipped; the rest are still printed.
///
/// # Errors
/// Transport failures and write errors on `out`.
pub fn dump_process_cache<T, W>(
    client: &mut DebugClient<T>,
    options: &ProcessCacheOptions,
    out: &mut W,
) -> Result<ProcessCacheSummary, DumpError>
where
    T: DebugTransport,
    W: Write + ?Sized,
{
    let args = DumpProcessCacheArgs { skip_zero_refcnt: options.skip_zero_refcnt };
    let raw = match client.process_cache(args) {
        Ok(raw) => raw,
        Err(err) if err.is_protocol() => {
            error!("{err}");
            return Ok(ProcessCacheSummary::default());
        }
        Err(err) => return Err(err.into()),
    };

    let mut summary = ProcessCacheSummary::default();
    let mut records = Vec::with_capacity(raw.len());
    for value in &raw {
        match ProcessRecord::from_value(value) {
            Ok(record) => records.push(record),
            Err(err) => {
                error!("{err} (process={value})");
                summary.skipped += 1;
            }
        }
    }

    let decoded = records.len();
    let records = options.filter.apply(records);
    summary.filtered = decoded - records.len();

    for record in &records {
        match record.to_line() {
            Ok(line) => {
                writeln!(out, "{line}")?;
                summary.printed += 1;
            }
            Err(err) => {
                error!("{err} (process={record:?})");
                summary.skipped += 1;
            }
        }
    }

    Ok(summary)
}
