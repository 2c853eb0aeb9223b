//! Client-side process filtering
//!
//! Applied after decoding and before rendering, independent of the
//! `skip_zero_refcnt` hint sent to the agent (an agent may ignore the hint).

use crate::debug::ProcessRecord;

/// Which process cache records to keep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessFilter {
    #[default]
    All,
    /// Drop records whose refcnt is zero (or absent)
    SkipZeroRefcnt,
}

impl ProcessFilter {
    #[must_use]
    pub fn from_flag(skip_zero_refcnt: bool) -> Self {
        if skip_zero_refcnt {
            Self::SkipZeroRefcnt
        } else {
            Self::All
        }
    }

    #[must_use]
    pub fn keeps(self, record: &ProcessRecord) -> bool {
        match self {
            Self::All => true,
            Self::SkipZeroRefcnt => record.refcnt() != 0,
        }
    }

    /// Keep matching records, preserving their order
    #[must_use]
    pub fn apply(self, records: Vec<ProcessRecord>) -> Vec<ProcessRecord> {
        records.into_iter().filter(|record| self.keeps(record)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(refcnt: Option<u32>) -> ProcessRecord {
        ProcessRecord { refcnt, ..ProcessRecord::default() }
    }

    #[test]
    fn test_all_keeps_everything() {
        let records = vec![record(Some(0)), record(None), record(Some(3))];
        assert_eq!(ProcessFilter::All.apply(records.clone()), records);
    }

    #[test]
    fn test_skip_zero_keeps_nonzero_subset() {
        let records = vec![record(Some(0)), record(Some(2)), record(None), record(Some(1))];
        let kept = ProcessFilter::SkipZeroRefcnt.apply(records);
        assert_eq!(kept, vec![record(Some(2)), record(Some(1))]);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let records = vec![record(Some(0)), record(Some(2)), record(None), record(Some(1))];
        for filter in [ProcessFilter::All, ProcessFilter::SkipZeroRefcnt] {
            let once = filter.apply(records.clone());
            assert_eq!(filter.apply(once.clone()), once);
        }
    }

    #[test]
    fn test_kept_set_ignores_input_order() {
        let records = vec![record(Some(5)), record(Some(0)), record(Some(2)), record(None)];
        let mut reversed = records.clone();
        reversed.reverse();
        let mut rotated = records.clone();
        rotated.rotate_left(2);

        let refcnts = |kept: Vec<ProcessRecord>| {
            let mut counts: Vec<u32> = kept.iter().map(ProcessRecord::refcnt).collect();
            counts.sort_unstable();
            counts
        };
        let expected = refcnts(ProcessFilter::SkipZeroRefcnt.apply(records));
        assert_eq!(expected, vec![2, 5]);
        assert_eq!(refcnts(ProcessFilter::SkipZeroRefcnt.apply(reversed)), expected);
        assert_eq!(refcnts(ProcessFilter::SkipZeroRefcnt.apply(rotated)), expected);
    }

    #[test]
    fn test_from_flag() {
        assert_eq!(ProcessFilter::from_flag(true), ProcessFilter::SkipZeroRefcnt);
        assert_eq!(ProcessFilter::from_flag(false), ProcessFilter::All);
    }
}
