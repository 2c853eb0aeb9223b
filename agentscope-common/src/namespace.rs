//! Namespace (cgroup tracking) table
//!
//! Maps each tracked cgroup to the stable id the agent hands out for it.
//! Key is a [`CgroupId`](crate::CgroupId) and value a
//! [`StableId`](crate::StableId), both `u64`.

/// Table name under the agent's pin directory
pub const MAP_NAME: &str = "tg_cgtracker_map";

/// Encoded key size
pub const KEY_SIZE: usize = 8;

/// Encoded value size
pub const VALUE_SIZE: usize = 8;
