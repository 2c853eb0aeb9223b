//! # agentscope - Tracing Agent Introspection
//!
//! Diagnostic access to the internal state of a running tracing agent, both
//! offline (the tables the agent pins under bpffs) and live (debug queries
//! answered by the agent process).
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │  Pinned tables (bpffs)   │        │    Running agent         │
//! │  execve / policyfilter / │        │    debug endpoint        │
//! │  namespace               │        │                          │
//! └────────────┬─────────────┘        └────────────┬─────────────┘
//!              │ raw key/value bytes               │ JSON lines
//!              ▼                                   ▼
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │  table: read-only open,  │        │  debug: request/response │
//! │  single-pass scan,       │        │  sum types, selector     │
//! │  length-checked decode   │        │  validation              │
//! └────────────┬─────────────┘        └────────────┬─────────────┘
//!              ▼                                   ▼
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │  dump: aggregate, then   │        │  filter: client-side     │
//! │  render lines / (empty)  │        │  refcnt filtering        │
//! └──────────────────────────┘        └──────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`table`]: `TableLayout` per pinned table, `PinnedTable` reader
//! - [`dump`]: aggregation and line rendering, snapshot, process cache dump
//! - [`debug`]: debug protocol, transport and client
//! - [`filter`]: process cache filtering
//! - [`config`]: table locations and client settings
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: identifier types and error enums
//! - [`preflight`]: environment checks before reading tables
//!
//! Table layouts and their codecs live in the `agentscope-common` crate.
//!
//! ## Typical Usage
//!
//! ```bash
//! # Offline: read what the agent pinned
//! sudo agentscope dump execve
//! sudo agentscope dump policyfilter --map-fname /sys/fs/bpf/tetragon/policy_filter_maps
//!
//! # Live: ask the agent
//! agentscope dump process-cache --skip-zero-refcnt
//! agentscope log-level
//! ```

pub mod cli;
pub mod config;
pub mod debug;
pub mod domain;
pub mod dump;
pub mod filter;
pub mod preflight;
pub mod table;
