use stereo_corr_core::MatchRecord;

use crate::scratch::Scratch;

/// One of the four overlapping image regions the histogram filter votes
/// over (spec.md §4.6): left half, right half, upper half, lower half.
#[derive(Clone, Copy)]
enum Region {
    Left,
    Right,
    Upper,
    Lower,
}

impl Region {
    fn contains(self, x: u32, y: u32, width: usize, height: usize) -> bool {
        match self {
            Region::Left => (x as usize) < width / 2,
            Region::Right => (x as usize) >= width / 2,
            Region::Upper => (y as usize) < height / 2,
            Region::Lower => (y as usize) >= height / 2,
        }
    }
}

const REGIONS: [Region; 4] = [Region::Left, Region::Right, Region::Upper, Region::Lower];

/// Vote one region's histogram over `matches`, incrementing
/// `scratch.valid_quadrants[i]` for every candidate the region keeps.
fn vote_region(
    region: Region,
    matches: &[MatchRecord],
    width: usize,
    height: usize,
    max_disp: usize,
    tolerance: u32,
    scratch: &mut Scratch,
) {
    scratch.reset_histogram(max_disp);

    let member = |m: &MatchRecord| m.prob > 0 && region.contains(m.x, m.y, width, height);

    for m in matches.iter().filter(|m| member(m)) {
        let d = (m.disp as usize).min(max_disp);
        scratch.disparity_histogram[d] += 1;
    }

    let h_max = *scratch.disparity_histogram.iter().max().unwrap_or(&0);
    if h_max == 0 {
        return;
    }
    let threshold = h_max / 4;

    let mut mass = 0u64;
    let mut weighted = 0u64;
    if max_disp >= 4 {
        for d in 3..max_disp - 1 {
            if scratch.disparity_histogram[d] > threshold {
                let m_d = scratch.disparity_histogram[d - 1]
                    + scratch.disparity_histogram[d]
                    + scratch.disparity_histogram[d + 1];
                mass += m_d as u64;
                weighted += d as u64 * m_d as u64;
            }
        }
    }
    let peak_disp = if mass > 0 { (weighted / mass) as u32 } else { 0 };

    let nonzero_bins: Vec<u32> = scratch
        .disparity_histogram
        .iter()
        .copied()
        .filter(|&v| v > 0)
        .collect();
    let mean_nonzero = if nonzero_bins.is_empty() {
        0
    } else {
        nonzero_bins.iter().sum::<u32>() / nonzero_bins.len() as u32
    };
    let near = mean_nonzero * 4 > scratch.disparity_histogram[0];

    for (i, m) in matches.iter().enumerate() {
        if !member(m) {
            continue;
        }
        let keep = if near {
            (m.disp as i64 - peak_disp as i64).unsigned_abs() <= tolerance as u64
        } else {
            m.disp <= 2
        };
        if keep {
            scratch.valid_quadrants[i] = scratch.valid_quadrants[i].saturating_add(1);
        }
    }
}

/// Histogram disparity filter (spec.md §4.6): votes each candidate across
/// four overlapping image regions, then zeroes the probability of every
/// candidate no region voted to keep. Mutates `matches` in place.
pub fn filter_disparity_histogram(
    matches: &mut [MatchRecord],
    width: usize,
    height: usize,
    max_disp: usize,
    tolerance: u32,
    scratch: &mut Scratch,
) {
    scratch.reset_quadrants(matches.len());

    for &region in &REGIONS {
        vote_region(region, matches, width, height, max_disp, tolerance, scratch);
    }

    for (i, m) in matches.iter_mut().enumerate() {
        if scratch.valid_quadrants[i] == 0 {
            m.prob = 0;
        }
    }
}
