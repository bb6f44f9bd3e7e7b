use stereo_corr_core::{Descriptor, FeatureTable, MatchParams, MatchRecord};

use crate::scratch::Scratch;

/// Ones-minus-zeros tally per bit position, used to build the per-row
/// eigendescriptor masks (spec.md §4.5).
fn bit_tally(descriptors: impl Iterator<Item = Descriptor>, width: u32) -> Vec<i32> {
    let mut tally = vec![0i32; width as usize];
    for desc in descriptors {
        for (b, slot) in tally.iter_mut().enumerate() {
            if (desc.0 >> b) & 1 == 1 {
                *slot += 1;
            } else {
                *slot -= 1;
            }
        }
    }
    tally
}

/// Build the row's left/right eigendescriptor masks from the combined tally
/// of that row's left- and right-camera descriptors. The left mask's bit is
/// set when the tally is `>= 0`; the right mask's bit is set only when the
/// tally is strictly `> 0`. This asymmetric tie-break is faithful to
/// `original_source`'s intent as described by spec.md §4.5 and §8 law 6.
fn eigendescriptor_masks(tally: &[i32]) -> (Descriptor, Descriptor) {
    let mut left = 0u32;
    let mut right = 0u32;
    for (b, &count) in tally.iter().enumerate() {
        if count >= 0 {
            left |= 1 << b;
        }
        if count > 0 {
            right |= 1 << b;
        }
    }
    (Descriptor(left), Descriptor(right))
}

/// Run the row matcher across every scanline shared by `left` and `right`
/// (spec.md §4.5), appending one candidate [`MatchRecord`] per left feature
/// that produced a non-zero probability total. Candidates with `disp <= 0`
/// are never recorded, per spec.md's disparity-range open question.
///
/// `vertical_sampling` recovers the image-space row coordinate `y = 4 +
/// row · vertical_sampling` (spec.md §3's "Row r corresponds to image y ="
/// invariant) from the row index each `FeatureTable` is keyed by; the match
/// output (§6) is an image coordinate, not a row index.
pub fn match_rows(
    left: &FeatureTable,
    right: &FeatureTable,
    width: usize,
    vertical_sampling: u32,
    effective_bits: u32,
    params: &MatchParams,
    scratch: &mut Scratch,
    out: &mut Vec<MatchRecord>,
) {
    out.clear();
    let max_disp = (params.max_disparity_percent as usize * width / 100) as i64;

    let left_spans: Vec<_> = left.row_spans().collect();
    let right_spans: Vec<_> = right.row_spans().collect();
    let row_count = left_spans.len().min(right_spans.len());

    for row in 0..row_count {
        let (l_start, l_count) = left_spans[row];
        let (r_start, r_count) = right_spans[row];
        let l_count = l_count as usize;
        let r_count = r_count as usize;
        if l_count == 0 || r_count == 0 {
            continue;
        }

        let tally = bit_tally(
            (0..l_count)
                .map(|i| left.descriptor_at(l_start + i))
                .chain((0..r_count).map(|i| right.descriptor_at(r_start + i))),
            effective_bits,
        );
        let (left_mask, right_mask) = eigendescriptor_masks(&tally);

        scratch.row_peaks.clear();
        scratch.row_peaks.resize(r_count, 0);

        for li in 0..l_count {
            let l_idx = l_start + li;
            let x_l = left.x_at(l_idx) as i64;
            let mean_l = left.mean_at(l_idx) as i64;
            let desc_l = left.descriptor_at(l_idx).masked(left_mask);
            let anti_l = desc_l.reversed(effective_bits);

            let mut total: u64 = 0;
            for ri in 0..r_count {
                let r_idx = r_start + ri;
                let x_r = right.x_at(r_idx) as i64;
                let disp = x_l - x_r;

                let score = if disp > 0 && disp < max_disp {
                    let desc_r = right.descriptor_at(r_idx).masked(right_mask);
                    let correlation = desc_l.and(desc_r).popcount() as i64;

                    if correlation > params.descriptor_match_threshold as i64 {
                        let anticorrelation = anti_l.and(desc_r).popcount() as i64;
                        let mean_r = right.mean_at(r_idx) as i64;
                        let luma_diff = (mean_r - mean_l).abs();

                        let desc_term =
                            (correlation + (effective_bits as i64 - anticorrelation)) * params.learn_desc as i64;
                        let disp_term = (max_disp - disp) * params.learn_disp as i64;
                        let luma_term = luma_diff * params.learn_luma as i64;

                        (desc_term + disp_term - luma_term).max(0)
                    } else {
                        0
                    }
                } else if (-max_disp..=0).contains(&disp) {
                    ((max_disp - disp) * params.learn_disp as i64).max(0)
                } else {
                    0
                };

                scratch.row_peaks[ri] = score as u32;
                total += score as u64;
            }

            if total == 0 {
                continue;
            }

            let mut best_prob = 0u32;
            let mut best_r = None;
            for ri in 0..r_count {
                let score = scratch.row_peaks[ri] as u64;
                if score == 0 {
                    continue;
                }
                let prob = (score * 1000 / total) as u32;
                if prob > best_prob {
                    best_prob = prob;
                    best_r = Some(ri);
                }
            }

            let (Some(best_ri), true) = (best_r, best_prob > 0 && best_prob < 1000) else {
                continue;
            };

            let x_r = right.x_at(r_start + best_ri) as i64;
            let disp = x_l - x_r;
            if disp <= 0 {
                continue;
            }

            out.push(MatchRecord {
                prob: best_prob,
                x: x_l as u32,
                y: 4 + row as u32 * vertical_sampling,
                disp: disp as u32,
            });

            if out.len() >= stereo_corr_core::MAX_FEATURES {
                return;
            }
        }
    }
}
