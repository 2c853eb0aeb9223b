//! Policy filter table
//!
//! Records which cgroups each tracing policy is scoped to. The pinned table
//! is a hash of maps: each policy id maps to the id of an inner table whose
//! keys are the policy's cgroups.
//!
//! ```text
//! outer  key   (4 bytes): policy_id u32
//!        value (4 bytes): inner map id u32
//! inner  key   (8 bytes): cgroup_id u64
//!        value (1 byte):  marker u8
//! ```

use crate::{DecodeError, FixedLayout};

/// Table name under the agent's pin directory
pub const MAP_NAME: &str = "policy_filter_maps";

/// Encoded size of a [`crate::PolicyId`] outer key
pub const OUTER_KEY_SIZE: usize = 4;

/// Encoded size of a [`crate::MapId`] outer value
pub const OUTER_VALUE_SIZE: usize = 4;

/// Encoded size of a [`crate::CgroupId`] inner key
pub const INNER_KEY_SIZE: usize = 8;

/// Encoded size of [`PolicyFilterValue`]
pub const INNER_VALUE_SIZE: usize = 1;

/// Presence marker stored for each member cgroup (the agent writes 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyFilterValue(pub u8);

impl FixedLayout for PolicyFilterValue {
    const LAYOUT: &'static str = "policy_filter_value";
    const SIZE: usize = INNER_VALUE_SIZE;
    type Bytes = [u8; INNER_VALUE_SIZE];

    fn encode(&self) -> Self::Bytes {
        [self.0]
    }

    fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        Self::check_size(raw)?;
        Ok(Self(raw[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CgroupId, MapId, PolicyId};

    #[test]
    fn test_sizes_match_id_layouts() {
        assert_eq!(PolicyId::SIZE, OUTER_KEY_SIZE);
        assert_eq!(MapId::SIZE, OUTER_VALUE_SIZE);
        assert_eq!(CgroupId::SIZE, INNER_KEY_SIZE);
    }

    #[test]
    fn test_inner_map_id_native_endian() {
        let raw = 42u32.to_ne_bytes();
        assert_eq!(MapId::decode(&raw), Ok(MapId(42)));
    }

    #[test]
    fn test_value_wrong_length() {
        assert!(matches!(
            PolicyFilterValue::decode(&[1, 0]),
            Err(DecodeError::Length { expected: 1, actual: 2, .. })
        ));
    }
}
