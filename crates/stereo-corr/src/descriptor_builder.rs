use stereo_corr_core::{Descriptor, ImageView, OffsetPattern, Pixels};

/// Build a patch descriptor for a surviving peak at `(px, py)` (spec.md
/// §4.3). Returns `None` when the patch is too flat to be trustworthy
/// (`popcount` outside the open interval `(3, bits - 3)`).
///
/// Resolves spec.md's open question about `original_source`'s `ix =
/// rectified_frame_buf[pixindex(...)]` indirection: each sample reads the
/// channel sum directly at `pixindex(px + dx, py + dy)`, never treating a
/// sampled pixel value as a second index.
pub fn build_descriptor(
    image: &ImageView,
    px: i32,
    py: i32,
    pattern: OffsetPattern,
    row_mean: i32,
    color_flags: bool,
) -> Option<(Descriptor, u8)> {
    let offsets = pattern.offsets();
    let bits = pattern.bits();

    let mut sum = 0i64;
    let mut samples = [0u32; 30];
    for (i, &(dx, dy)) in offsets.iter().enumerate() {
        let v = image.channel_sum(px + dx, py + dy);
        samples[i] = v;
        sum += v as i64;
    }
    let patch_mean = (sum / bits as i64) as i32;

    let mut desc = 0u32;
    let mut bit_count = 0u32;
    for (i, &v) in samples.iter().take(offsets.len()).enumerate() {
        if v as i32 > patch_mean {
            desc |= 1 << i;
            bit_count += 1;
        }
    }

    if bit_count <= 3 || bit_count >= bits - 3 {
        return None;
    }

    if color_flags && image.channels == Pixels::Rgb {
        debug_assert!(
            pattern.blue_bit() < 32,
            "color flags need 3 bits above DESCRIPTOR_BITS; {pattern:?} has no headroom"
        );
        let (mut sr, mut sg, mut sb) = (0i64, 0i64, 0i64);
        for &(dx, dy) in offsets {
            let [r, g, b] = image.channels_rgb(px + dx, py + dy);
            sr += r as i64;
            sg += g as i64;
            sb += b as i64;
        }
        if 2 * sr > sg + sb {
            desc |= 1 << pattern.red_bit();
        }
        if 2 * sg > sr + sb {
            desc |= 1 << pattern.green_bit();
        }
        if 2 * sb > sr + sg {
            desc |= 1 << pattern.blue_bit();
        }
    }

    // Normalize the patch mean against the row mean (spec.md §4.3 step 6):
    // removes per-row exposure bias so left/right comparisons stay fair
    // under illumination differences between the two cameras.
    let mut adjusted = patch_mean / 3 - row_mean + 127;
    adjusted = adjusted.clamp(0, 255);
    let mean_byte = (adjusted / 3) as u8;

    Some((Descriptor(desc), mean_byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard_image(width: usize, height: usize) -> Vec<u8> {
        let mut data = vec![0u8; width * height];
        for y in 0..height {
            for x in 0..width {
                data[y * width + x] = if (x + y) % 2 == 0 { 200 } else { 20 };
            }
        }
        data
    }

    #[test]
    fn textured_patch_is_accepted() {
        let width = 40;
        let height = 40;
        let data = checkerboard_image(width, height);
        let image = ImageView {
            width,
            height,
            channels: Pixels::Gray,
            data: &data,
        };
        let result = build_descriptor(&image, 20, 20, OffsetPattern::BresenhamRing24, 110, false);
        assert!(result.is_some());
        let (desc, _mean) = result.unwrap();
        let popcount = desc.popcount();
        assert!(popcount > 3 && popcount < 24 - 3);
    }

    #[test]
    fn flat_patch_is_rejected() {
        let width = 40;
        let height = 40;
        let data = vec![128u8; width * height];
        let image = ImageView {
            width,
            height,
            channels: Pixels::Gray,
            data: &data,
        };
        let result = build_descriptor(&image, 20, 20, OffsetPattern::BresenhamRing24, 128, false);
        assert!(result.is_none());
    }

    #[test]
    fn color_dominance_flags_are_set_for_a_red_patch() {
        let width = 40;
        let height = 40;
        let mut data = vec![0u8; width * height * 3];
        for y in 0..height {
            for x in 0..width {
                let idx = (y * width + x) * 3;
                let bright = (x + y) % 2 == 0;
                data[idx] = if bright { 220 } else { 180 };
                data[idx + 1] = if bright { 40 } else { 10 };
                data[idx + 2] = if bright { 40 } else { 10 };
            }
        }
        let image = ImageView {
            width,
            height,
            channels: Pixels::Rgb,
            data: &data,
        };
        let result = build_descriptor(&image, 20, 20, OffsetPattern::BresenhamRing24, 100, true);
        let (desc, _mean) = result.expect("textured red patch should be accepted");
        let pattern = OffsetPattern::BresenhamRing24;
        assert!(desc.0 & (1 << pattern.red_bit()) != 0);
        assert!(desc.0 & (1 << pattern.green_bit()) == 0);
    }
}
