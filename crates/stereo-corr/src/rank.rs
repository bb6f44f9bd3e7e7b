use stereo_corr_core::MatchRecord;

/// Partial selection sort (spec.md §4.7): descending by `prob`, stopping
/// early once a slot's winner has `prob == 0` (nothing left in the tail can
/// beat it). Reorders `matches` in place and returns the number of slots
/// actually filled, `K = min(ideal, matches.len())`.
///
/// `original_source`'s ranker scans the tail as `[i + 1, possible)` but
/// advances its outer index with an extra decrement, silently re-visiting
/// slot `i` on the next iteration (spec.md's "ranker off-by-one" open
/// question). This is plain partial selection sort with no such bug.
pub fn rank_matches(matches: &mut [MatchRecord], ideal_no_of_matches: usize) -> usize {
    let possible = matches.len();
    let k = ideal_no_of_matches.min(possible);

    for i in 0..k {
        let mut best = i;
        for j in (i + 1)..possible {
            if matches[j].prob > matches[best].prob {
                best = j;
            }
        }
        if best != i {
            matches.swap(i, best);
        }
        if matches[i].prob == 0 {
            return i;
        }
    }
    k
}
