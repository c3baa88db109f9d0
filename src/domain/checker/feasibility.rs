//! Greedy capacity scans used by the job checker.
//!
//! All scans work on a histogram owned by the caller, typically a copy
//! taken for a single job, and consume the classes they draw nodes from.

use std::collections::BTreeMap;

/// Outcome of a scan: whether the demand was met, and how many nodes were
/// missing if not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fit {
    pub satisfied: bool,
    pub shortfall: u32,
}

impl Fit {
    fn from_shortfall(shortfall: u32) -> Self {
        Self { satisfied: shortfall == 0, shortfall }
    }
}

/// Takes `demand` nodes from the qualifying classes, smallest key first.
pub fn first_fit<K, F>(demand: u32, histogram: &mut BTreeMap<K, u32>, qualifies: F) -> Fit
where
    K: Ord + Copy,
    F: Fn(K) -> bool,
{
    let mut remaining = demand;
    for (key, available) in histogram.iter_mut() {
        if remaining == 0 {
            break;
        }
        if !qualifies(*key) {
            continue;
        }
        let taken = remaining.min(*available);
        *available -= taken;
        remaining -= taken;
    }
    Fit::from_shortfall(remaining)
}

/// `nodes` nodes with at least `ppn` cores each.
pub fn fit_ppn(nodes: u32, ppn: u32, histogram: &mut BTreeMap<u32, u32>) -> Fit {
    first_fit(nodes, histogram, |node_ppn| node_ppn >= ppn)
}

/// `nodes` nodes with more than `node_mem` bytes each.
pub fn fit_node_mem(nodes: u32, node_mem: u64, histogram: &mut BTreeMap<u64, u32>) -> Fit {
    first_fit(nodes, histogram, |mem_size| mem_size > node_mem)
}

/// Memory of a `mem` request left uncovered, if any.
///
/// For every node spec, `class_size * count` is subtracted for each memory
/// class in ascending order until the request is covered. Contributions of
/// node specs are not isolated from each other.
pub fn uncovered_mem(mem: u64, node_counts: &[u32], histogram: &BTreeMap<u64, u32>) -> Option<u64> {
    let mut remaining = i128::from(mem);
    for count in node_counts {
        for mem_size in histogram.keys() {
            remaining -= i128::from(*mem_size) * i128::from(*count);
            if remaining <= 0 {
                break;
            }
        }
    }
    if remaining > 0 { u64::try_from(remaining).ok() } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_ppn_within_single_class() {
        let mut histogram = BTreeMap::from([(4, 5)]);
        assert_eq!(fit_ppn(2, 4, &mut histogram), Fit { satisfied: true, shortfall: 0 });
        assert_eq!(histogram[&4], 3);
    }

    #[test]
    fn test_fit_ppn_too_many_cores() {
        let mut histogram = BTreeMap::from([(36, 100)]);
        assert_eq!(fit_ppn(2, 64, &mut histogram), Fit { satisfied: false, shortfall: 2 });
        assert_eq!(histogram[&36], 100);
    }

    #[test]
    fn test_fit_ppn_spills_into_larger_classes() {
        let mut histogram = BTreeMap::from([(8, 10), (20, 2), (28, 3)]);
        let fit = fit_ppn(4, 16, &mut histogram);
        assert!(fit.satisfied);
        assert_eq!(histogram, BTreeMap::from([(8, 10), (20, 0), (28, 1)]));

        let fit = fit_ppn(2, 20, &mut histogram);
        assert_eq!(fit, Fit { satisfied: false, shortfall: 1 });
    }

    #[test]
    fn test_fit_node_mem_is_strict() {
        let mut histogram = BTreeMap::from([(64, 4), (128, 1)]);
        assert_eq!(fit_node_mem(2, 64, &mut histogram).shortfall, 1);
        let mut histogram = BTreeMap::from([(64, 4), (128, 1)]);
        assert!(fit_node_mem(4, 63, &mut histogram).satisfied);
    }

    #[test]
    fn test_uncovered_mem() {
        let histogram = BTreeMap::from([(64, 4), (128, 1)]);
        assert_eq!(uncovered_mem(100, &[1], &histogram), None);
        assert_eq!(uncovered_mem(500, &[1], &histogram), Some(308));
        assert_eq!(uncovered_mem(300, &[2], &histogram), None);
        assert_eq!(uncovered_mem(10, &[1], &BTreeMap::new()), Some(10));
    }
}
