use stereo_corr_core::{
    DetectParams, FeatureTable, FilterParams, ImageView, MatchParams, MatchRecord, RankParams,
    StereoError, MAX_FEATURES,
};

use crate::detect::{detect_features, max_rows};
use crate::filter::filter_disparity_histogram;
use crate::matcher::match_rows;
use crate::rank::rank_matches;
use crate::scratch::Scratch;

/// Per-frame lifecycle state of a [`StereoEngine`] (spec.md §4.8).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Detected,
    Paired,
    Matched,
    Ready,
}

/// One camera side's pipeline: owns its local and opposite feature tables,
/// the match table, and scratch space, and enforces the
/// `IDLE -> DETECTED -> PAIRED -> MATCHED -> READY -> (consume) -> IDLE`
/// state machine spec.md §4.8 draws for a single side.
pub struct StereoEngine {
    state: EngineState,
    local: FeatureTable,
    opposite: FeatureTable,
    matches: Vec<MatchRecord>,
    scratch: Scratch,
    width: usize,
    height: usize,
    vertical_sampling: u32,
    effective_bits: u32,
}

impl StereoEngine {
    pub fn new(vertical_sampling: u32) -> Self {
        let rows = max_rows(vertical_sampling);
        Self {
            state: EngineState::Idle,
            local: FeatureTable::with_capacity(rows),
            opposite: FeatureTable::with_capacity(rows),
            matches: Vec::with_capacity(MAX_FEATURES),
            scratch: Scratch::new(),
            width: 0,
            height: 0,
            vertical_sampling,
            effective_bits: 0,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn local_table(&self) -> &FeatureTable {
        &self.local
    }

    /// `detect()`: unconditionally resets the local table and runs feature
    /// collection over `image`. Always valid; moves the engine to
    /// `DETECTED` regardless of the prior state.
    pub fn detect(&mut self, image: &ImageView, params: &DetectParams) -> usize {
        self.width = image.width;
        self.height = image.height;
        self.vertical_sampling = params.vertical_sampling;
        self.effective_bits = params.pattern.effective_bits(params.color_flags);
        let count = detect_features(image, params, &mut self.local, &mut self.scratch);
        self.state = EngineState::Detected;
        count
    }

    /// `receive_opposite()`: installs the already-decoded far-side feature
    /// table (transport and CRC verification happen in `stereo-corr-core`'s
    /// wire module before this is called).
    pub fn receive_opposite(&mut self, table: FeatureTable) {
        self.opposite = table;
        self.state = EngineState::Paired;
    }

    /// `match_()`: runs the row matcher and then the histogram filter
    /// (spec.md §4.5 and §4.6 back to back), leaving the match table
    /// already filtered by the time the engine reaches `MATCHED`. Errors
    /// with [`StereoError::StageMisorder`] if `receive_opposite` has not
    /// been called since the last `detect`.
    pub fn match_(&mut self, match_params: &MatchParams, filter_params: &FilterParams) -> Result<(), StereoError> {
        if self.state != EngineState::Paired {
            return Err(StereoError::StageMisorder);
        }

        match_rows(
            &self.local,
            &self.opposite,
            self.width,
            self.vertical_sampling,
            self.effective_bits,
            match_params,
            &mut self.scratch,
            &mut self.matches,
        );

        let max_disp = (match_params.max_disparity_percent as usize * self.width / 100).max(1);
        filter_disparity_histogram(
            &mut self.matches,
            self.width,
            self.height,
            max_disp,
            filter_params.tolerance,
            &mut self.scratch,
        );

        self.state = EngineState::Matched;
        Ok(())
    }

    /// `rank()`: partial selection sort down to the top `K` matches.
    /// Errors with [`StereoError::StageMisorder`] if called before
    /// `match_()`.
    pub fn rank(&mut self, params: &RankParams) -> Result<usize, StereoError> {
        if self.state != EngineState::Matched {
            return Err(StereoError::StageMisorder);
        }
        let k = rank_matches(&mut self.matches, params.ideal_no_of_matches);
        self.matches.truncate(k);
        self.state = EngineState::Ready;
        Ok(k)
    }

    pub fn ranked_matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    /// `consume()`: hands the ranked output to the caller and returns the
    /// engine to `IDLE`, ready for the next frame.
    pub fn consume(&mut self) -> Result<Vec<MatchRecord>, StereoError> {
        if self.state != EngineState::Ready {
            return Err(StereoError::StageMisorder);
        }
        self.state = EngineState::Idle;
        Ok(std::mem::take(&mut self.matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stereo_corr_core::Pixels;

    fn stripe_image(width: usize, height: usize, stripe_x: usize, data: &mut Vec<u8>) {
        data.clear();
        data.resize(width * height, 250);
        for y in 0..height {
            data[y * width + stripe_x] = 5;
        }
    }

    #[test]
    fn matching_before_receiving_the_opposite_table_is_a_stage_misorder() {
        let mut engine = StereoEngine::new(8);
        let data = vec![128u8; 64 * 64];
        let image = ImageView {
            width: 64,
            height: 64,
            channels: Pixels::Gray,
            data: &data,
        };
        engine.detect(&image, &DetectParams::default());
        let err = engine
            .match_(&MatchParams::default(), &FilterParams::default())
            .unwrap_err();
        assert_eq!(err, StereoError::StageMisorder);
    }

    #[test]
    fn consuming_before_ranking_is_a_stage_misorder() {
        let mut engine = StereoEngine::new(8);
        let err = engine.consume().unwrap_err();
        assert_eq!(err, StereoError::StageMisorder);
    }

    #[test]
    fn a_full_frame_round_trip_returns_to_idle() {
        let mut left_data = Vec::new();
        let mut right_data = Vec::new();
        stripe_image(64, 64, 40, &mut left_data);
        stripe_image(64, 64, 35, &mut right_data);

        let detect_params = DetectParams {
            vertical_sampling: 8,
            inhibition_radius: 8,
            minimum_response: 100,
            calibration_offset_x: 0,
            calibration_offset_y: 0,
            ..Default::default()
        };

        let mut left_engine = StereoEngine::new(detect_params.vertical_sampling);
        let left_image = ImageView {
            width: 64,
            height: 64,
            channels: Pixels::Gray,
            data: &left_data,
        };
        left_engine.detect(&left_image, &detect_params);

        let mut right_engine = StereoEngine::new(detect_params.vertical_sampling);
        let right_image = ImageView {
            width: 64,
            height: 64,
            channels: Pixels::Gray,
            data: &right_data,
        };
        right_engine.detect(&right_image, &detect_params);

        let right_table = right_engine.local_table().clone();
        left_engine.receive_opposite(right_table);
        assert_eq!(left_engine.state(), EngineState::Paired);

        left_engine
            .match_(&MatchParams::default(), &FilterParams::default())
            .unwrap();
        assert_eq!(left_engine.state(), EngineState::Matched);

        left_engine.rank(&RankParams::default()).unwrap();
        assert_eq!(left_engine.state(), EngineState::Ready);

        let out = left_engine.consume().unwrap();
        assert_eq!(left_engine.state(), EngineState::Idle);
        assert!(out.windows(2).all(|w| w[0].prob >= w[1].prob));
    }
}
