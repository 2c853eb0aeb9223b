//! Collect decoded table entries before anything is printed
//!
//! A scan that fails partway returns the error and drops what was collected,
//! so a partial table is never presented as complete.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{CgroupId, PolicyId, TableError};
use crate::table::{PolicyFilterTable, TableLayout, TableSource};

/// Collect every entry keyed by its decoded key
///
/// # Errors
/// Propagates any scan failure.
pub fn collect_map<L, S>(source: S) -> Result<BTreeMap<L::Key, L::Value>, TableError>
where
    L: TableLayout,
    S: TableSource,
{
    let mut entries = BTreeMap::new();
    source.scan::<L, _>(|key, value| {
        entries.insert(key, value);
    })?;
    Ok(entries)
}

/// Cgroups each policy currently applies to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyFilterState {
    policies: BTreeMap<PolicyId, BTreeSet<CgroupId>>,
}

impl PolicyFilterState {
    pub fn insert(&mut self, policy: PolicyId, cgroup: CgroupId) {
        self.policies.entry(policy).or_default().insert(cgroup);
    }

    /// Record `policy` with all of `cgroups`; a policy with no cgroups is
    /// still listed.
    pub fn extend(&mut self, policy: PolicyId, cgroups: impl IntoIterator<Item = CgroupId>) {
        self.policies.entry(policy).or_default().extend(cgroups);
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Number of policies
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn cgroups(&self, policy: PolicyId) -> Option<&BTreeSet<CgroupId>> {
        self.policies.get(&policy)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PolicyId, &BTreeSet<CgroupId>)> {
        self.policies.iter().map(|(policy, cgroups)| (*policy, cgroups))
    }
}

/// Walk the policy filter table's inner tables, grouping cgroups by policy
///
/// # Errors
/// Propagates any scan failure, including an unreadable inner table.
pub fn collect_policyfilter<S: TableSource>(source: S) -> Result<PolicyFilterState, TableError> {
    let mut state = PolicyFilterState::default();
    source.scan_nested::<PolicyFilterTable, _>(|policy, members| {
        state.extend(policy, members.into_iter().map(|(cgroup, _marker)| cgroup));
    })?;
    Ok(state)
}
