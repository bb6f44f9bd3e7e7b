use stereo_corr_core::{MAX_FEATURES, MAX_IMG_W};

/// Scanline and matching scratch space, reused across every row and every
/// call to `detect`/`match_rows` (spec.md §3 "Scanline scratch" / "Filter
/// scratch"). Buffers are preallocated at [`Scratch::new`] time and only
/// ever `clear`+refill or index-written afterwards, so no reallocation
/// happens on the hot path.
#[derive(Clone, Debug)]
pub struct Scratch {
    /// Prefix sum of channel sums along the current row.
    pub row_sum: Vec<i32>,
    /// Edge response (§4.1) reused as per-R matching score (§4.5).
    pub row_peaks: Vec<u32>,
    /// Disparity histogram for the region currently being filtered (§4.6).
    pub disparity_histogram: Vec<u32>,
    /// Per-candidate count of regions that voted "keep" (§4.6).
    pub valid_quadrants: Vec<u8>,
}

impl Scratch {
    pub fn new() -> Self {
        Self {
            row_sum: Vec::with_capacity(MAX_IMG_W),
            row_peaks: Vec::with_capacity(MAX_IMG_W),
            disparity_histogram: Vec::with_capacity(MAX_IMG_W),
            valid_quadrants: Vec::with_capacity(MAX_FEATURES),
        }
    }

    pub fn reset_row(&mut self, width: usize) {
        self.row_sum.clear();
        self.row_sum.resize(width, 0);
        self.row_peaks.clear();
        self.row_peaks.resize(width, 0);
    }

    pub fn reset_histogram(&mut self, max_disp: usize) {
        self.disparity_histogram.clear();
        self.disparity_histogram.resize(max_disp + 1, 0);
    }

    pub fn reset_quadrants(&mut self, candidate_count: usize) {
        self.valid_quadrants.clear();
        self.valid_quadrants.resize(candidate_count, 0);
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}
