use stereo_corr_core::ImageView;

/// Row accumulator (spec.md §4.1): fills `row_sum` with the running prefix
/// sum of channel sums along row `y`, fills `row_peaks[4..width-4]` with the
/// combined 2-radius/4-radius second-difference edge response, and returns
/// the row's mean pixel value. Cells of `row_peaks` outside `[4, width-5]`
/// are left at zero and must not be read by the caller.
pub fn accumulate_row(image: &ImageView, y: i32, row_sum: &mut [i32], row_peaks: &mut [u32]) -> i32 {
    let width = image.width;
    debug_assert_eq!(row_sum.len(), width);
    debug_assert_eq!(row_peaks.len(), width);

    row_sum[0] = image.channel_sum(0, y) as i32;
    for x in 1..width {
        row_sum[x] = row_sum[x - 1] + image.channel_sum(x as i32, y) as i32;
    }

    let channels = image.channels.count() as i32;
    let row_mean = row_sum[width - 1] / (width as i32 * channels);

    if width >= 9 {
        for x in 4..(width - 4) {
            let d2 = (row_sum[x] - row_sum[x - 2]) - (row_sum[x + 2] - row_sum[x]);
            let d4 = (row_sum[x] - row_sum[x - 4]) - (row_sum[x + 4] - row_sum[x]);
            row_peaks[x] = d2.unsigned_abs() + d4.unsigned_abs();
        }
    }

    row_mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use stereo_corr_core::Pixels;

    #[test]
    fn constant_row_has_zero_edge_response() {
        let width = 32usize;
        let data = vec![128u8; width];
        let image = ImageView {
            width,
            height: 1,
            channels: Pixels::Gray,
            data: &data,
        };
        let mut row_sum = vec![0i32; width];
        let mut row_peaks = vec![0u32; width];
        let mean = accumulate_row(&image, 0, &mut row_sum, &mut row_peaks);
        assert_eq!(mean, 128);
        assert!(row_peaks[4..width - 4].iter().all(|&p| p == 0));
    }

    #[test]
    fn a_single_dark_column_produces_a_peak_nearby() {
        let width = 32usize;
        let mut data = vec![255u8; width];
        data[16] = 0;
        let image = ImageView {
            width,
            height: 1,
            channels: Pixels::Gray,
            data: &data,
        };
        let mut row_sum = vec![0i32; width];
        let mut row_peaks = vec![0u32; width];
        accumulate_row(&image, 0, &mut row_sum, &mut row_peaks);
        assert!(row_peaks[12..=20].iter().any(|&p| p > 0));
    }
}
