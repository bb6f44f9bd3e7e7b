use stereo_corr_core::{DetectParams, FeatureTable, ImageView, MAX_FEATURES, MAX_IMG_H};

use crate::accumulate::accumulate_row;
use crate::descriptor_builder::build_descriptor;
use crate::nms::suppress_non_maxima;
use crate::scratch::Scratch;

/// Number of row slots a [`FeatureTable`]'s wire image reserves for a given
/// vertical sampling stride — a fixed capacity (`MAX_IMG_H / VS`),
/// independent of any one frame's actual height.
pub fn max_rows(vertical_sampling: u32) -> usize {
    MAX_IMG_H / vertical_sampling.max(1) as usize
}

/// Feature collection (spec.md §4.4): walks scanlines top to bottom, each
/// scanline right to left, running the row accumulator, non-maximum
/// suppression, and descriptor builder. Overwrites `table` and `scratch`.
///
/// Returns the total number of features stored. If `MAX_FEATURES` is
/// reached mid-frame, the entire pass aborts (not just the current row) and
/// a diagnostic is logged — this is `CapacityExceeded` from spec.md §7,
/// which is not an error: the caller simply gets a truncated table.
pub fn detect_features(
    image: &ImageView,
    params: &DetectParams,
    table: &mut FeatureTable,
    scratch: &mut Scratch,
) -> usize {
    table.clear();

    let width = image.width;
    let height = image.height as i32;
    scratch.reset_row(width);

    let mut y = 4 + params.calibration_offset_y;
    'rows: loop {
        if y > height - 4 {
            break;
        }

        let mut feats_on_row = 0u16;
        if y >= 4 && y <= height - 4 {
            let row_mean = accumulate_row(image, y, &mut scratch.row_sum, &mut scratch.row_peaks);
            suppress_non_maxima(
                &mut scratch.row_peaks,
                params.inhibition_radius,
                params.minimum_response,
            );

            let scan_start = width as i32 - 1 - params.inhibition_radius;
            let mut x = scan_start;
            while x > 0 {
                if scratch.row_peaks[x as usize] > 0 {
                    if let Some((desc, mean)) =
                        build_descriptor(image, x, y, params.pattern, row_mean, params.color_flags)
                    {
                        let stored_x = (x + params.calibration_offset_x) as i16;
                        if !table.push(stored_x, desc, mean) {
                            log::warn!(
                                "stereo feature table full at {} features; truncating frame",
                                MAX_FEATURES
                            );
                            table.end_row(feats_on_row);
                            break 'rows;
                        }
                        feats_on_row += 1;
                    }
                }
                x -= 1;
            }
        }

        table.end_row(feats_on_row);
        y += params.vertical_sampling as i32;
    }

    table.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stereo_corr_core::{OffsetPattern, Pixels};

    fn vertical_stripe_image(width: usize, height: usize, stripe_x: usize) -> Vec<u8> {
        let mut data = vec![250u8; width * height];
        for y in 0..height {
            data[y * width + stripe_x] = 5;
        }
        data
    }

    #[test]
    fn constant_image_yields_no_features() {
        let width = 64;
        let height = 64;
        let data = vec![128u8; width * height];
        let image = ImageView {
            width,
            height,
            channels: Pixels::Gray,
            data: &data,
        };
        let params = DetectParams {
            pattern: OffsetPattern::HorizontalBar30,
            vertical_sampling: 8,
            calibration_offset_x: 0,
            calibration_offset_y: 0,
            ..Default::default()
        };
        let mut table = FeatureTable::with_capacity(max_rows(params.vertical_sampling));
        let mut scratch = Scratch::new();
        let count = detect_features(&image, &params, &mut table, &mut scratch);
        assert_eq!(count, 0);
    }

    #[test]
    fn a_single_stripe_is_detected_as_a_feature() {
        let width = 64;
        let height = 64;
        let data = vertical_stripe_image(width, height, 40);
        let image = ImageView {
            width,
            height,
            channels: Pixels::Gray,
            data: &data,
        };
        let params = DetectParams {
            pattern: OffsetPattern::HorizontalBar30,
            vertical_sampling: 8,
            inhibition_radius: 8,
            minimum_response: 100,
            calibration_offset_x: 0,
            calibration_offset_y: 0,
            color_flags: false,
        };
        let mut table = FeatureTable::with_capacity(max_rows(params.vertical_sampling));
        let mut scratch = Scratch::new();
        let count = detect_features(&image, &params, &mut table, &mut scratch);
        assert!(count > 0);
        let found_near_stripe = (0..table.len()).any(|i| (table.x_at(i) as i32 - 40).abs() <= 2);
        assert!(found_near_stripe);
    }

    #[test]
    fn every_stored_descriptor_has_popcount_in_range() {
        let width = 80;
        let height = 40;
        let mut data = vec![0u8; width * height];
        for y in 0..height {
            for x in 0..width {
                data[y * width + x] = (((x * 37 + y * 91) % 256) as u8) ^ ((x as u8).wrapping_mul(7));
            }
        }
        let image = ImageView {
            width,
            height,
            channels: Pixels::Gray,
            data: &data,
        };
        let params = DetectParams {
            pattern: OffsetPattern::BresenhamRing24,
            vertical_sampling: 6,
            inhibition_radius: 8,
            minimum_response: 100,
            calibration_offset_x: 0,
            calibration_offset_y: 0,
            color_flags: false,
        };
        let bits = params.pattern.bits();
        let mut table = FeatureTable::with_capacity(max_rows(params.vertical_sampling));
        let mut scratch = Scratch::new();
        let count = detect_features(&image, &params, &mut table, &mut scratch);

        let total: usize = table.features_per_row().iter().map(|&c| c as usize).sum();
        assert_eq!(total, count);

        for i in 0..table.len() {
            let popcount = table.descriptor_at(i).popcount();
            assert!(popcount > 3 && popcount < bits - 3);
        }
    }
}
