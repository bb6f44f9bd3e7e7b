use crate::descriptor::OffsetPattern;

/// Tunables for the detection stage (row accumulator, non-max suppression,
/// descriptor builder, feature collection — spec.md §4.1-§4.4).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DetectParams {
    /// Sample pattern used to build descriptors; also fixes `DESCRIPTOR_BITS`.
    pub pattern: OffsetPattern,
    /// Row stride in `y` between scanned scanlines.
    pub vertical_sampling: u32,
    /// Inhibition radius for non-maximum suppression, in pixels.
    pub inhibition_radius: i32,
    /// Minimum response threshold, as a percent of the row-average peak
    /// (typically 100-200).
    pub minimum_response: u32,
    /// Integer rectification correction applied to this camera's stored
    /// feature x-coordinates at detection time only.
    pub calibration_offset_x: i32,
    /// Integer rectification correction applied to the row walk.
    pub calibration_offset_y: i32,
    /// When `true`, append the three color-dominance flag bits (spec.md
    /// §4.3 step 5). Only meaningful for RGB input.
    pub color_flags: bool,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            pattern: OffsetPattern::BresenhamRing24,
            vertical_sampling: 2,
            inhibition_radius: 16,
            minimum_response: 120,
            calibration_offset_x: -7,
            calibration_offset_y: 3,
            color_flags: false,
        }
    }
}

/// Tunables for the row matcher (spec.md §4.5).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MatchParams {
    /// Upper bound on disparity, as a percent of image width.
    pub max_disparity_percent: u32,
    /// Minimum number of correlation bits required to score a pair at all.
    pub descriptor_match_threshold: u32,
    /// Weight applied to the descriptor correlation term.
    pub learn_desc: u32,
    /// Weight applied to the luminance-difference penalty.
    pub learn_luma: u32,
    /// Weight applied to the disparity terms.
    pub learn_disp: u32,
}

impl MatchParams {
    /// Defaults for a given pattern: `descriptor_match_threshold` is 30% of
    /// the pattern's bit width, matching `original_source`'s
    /// `STEREO_DESCRIPTOR_PIXELS * 30 / 100`.
    pub fn defaults_for(pattern: OffsetPattern) -> Self {
        Self {
            max_disparity_percent: 20,
            descriptor_match_threshold: pattern.bits() * 30 / 100,
            learn_desc: 1,
            learn_luma: 1,
            learn_disp: 1,
        }
    }
}

impl Default for MatchParams {
    fn default() -> Self {
        Self::defaults_for(OffsetPattern::BresenhamRing24)
    }
}

/// Tunables for the histogram disparity filter (spec.md §4.6).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FilterParams {
    /// Tolerance around the region's mass-weighted peak disparity.
    pub tolerance: u32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self { tolerance: 3 }
    }
}

/// Tunables for the ranker (spec.md §4.7).
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct RankParams {
    pub ideal_no_of_matches: usize,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            ideal_no_of_matches: 200,
        }
    }
}
