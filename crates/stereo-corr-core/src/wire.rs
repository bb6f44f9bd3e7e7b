use crc::{Crc, CRC_16_CCITT_FALSE};

use crate::error::StereoError;
use crate::feature_table::FeatureTable;
use crate::MAX_FEATURES;

const CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_CCITT_FALSE);

/// Serialize a [`FeatureTable`] into the fixed-size wire image described in
/// spec.md §6: `feature_x` (`MAX_FEATURES` i16), `features_per_row` (`rows`
/// u16), `descriptor` (`MAX_FEATURES` u32), `mean` (`MAX_FEATURES` u8),
/// followed by a little-endian CRC-CCITT of the preceding bytes.
///
/// `rows` is the number of scanline slots (`MAX_IMG_H / VERTICAL_SAMPLING`
/// for the caller's configuration); it must match what
/// [`deserialize_feature_table`] is called with on the receiving side.
pub fn serialize_feature_table(table: &FeatureTable, rows: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        MAX_FEATURES * 2 + rows * 2 + MAX_FEATURES * 4 + MAX_FEATURES + 2,
    );

    let xs = table.raw_x();
    for i in 0..MAX_FEATURES {
        let v = xs.get(i).copied().unwrap_or(0);
        out.extend_from_slice(&v.to_le_bytes());
    }

    let fpr = table.raw_features_per_row();
    for i in 0..rows {
        let v = fpr.get(i).copied().unwrap_or(0);
        out.extend_from_slice(&v.to_le_bytes());
    }

    let descs = table.raw_descriptor();
    for i in 0..MAX_FEATURES {
        let v = descs.get(i).copied().unwrap_or(0);
        out.extend_from_slice(&v.to_le_bytes());
    }

    let means = table.raw_mean();
    for i in 0..MAX_FEATURES {
        out.push(means.get(i).copied().unwrap_or(0));
    }

    let crc = CRC.checksum(&out);
    out.extend_from_slice(&crc.to_le_bytes());
    out
}

/// Parse and CRC-verify a wire image produced by [`serialize_feature_table`].
///
/// The true feature count is recovered from `Σ features_per_row` rather than
/// carried separately, so the zero-padded tail of `feature_x`/`descriptor`/
/// `mean` beyond the real features is dropped on the way back in.
pub fn deserialize_feature_table(bytes: &[u8], rows: usize) -> Result<FeatureTable, StereoError> {
    let expected_len = MAX_FEATURES * 2 + rows * 2 + MAX_FEATURES * 4 + MAX_FEATURES + 2;
    if bytes.len() != expected_len {
        return Err(StereoError::WireLength {
            expected: expected_len,
            actual: bytes.len(),
        });
    }

    let (body, trailer) = bytes.split_at(bytes.len() - 2);
    let expected_crc = u16::from_le_bytes([trailer[0], trailer[1]]);
    let computed_crc = CRC.checksum(body);
    if computed_crc != expected_crc {
        return Err(StereoError::WireCorruption {
            expected: expected_crc,
            computed: computed_crc,
        });
    }

    let mut cursor = body;
    let mut feature_x_full = Vec::with_capacity(MAX_FEATURES);
    for _ in 0..MAX_FEATURES {
        let (chunk, rest) = cursor.split_at(2);
        feature_x_full.push(i16::from_le_bytes([chunk[0], chunk[1]]));
        cursor = rest;
    }

    let mut features_per_row = Vec::with_capacity(rows);
    for _ in 0..rows {
        let (chunk, rest) = cursor.split_at(2);
        features_per_row.push(u16::from_le_bytes([chunk[0], chunk[1]]));
        cursor = rest;
    }

    let mut descriptor_full = Vec::with_capacity(MAX_FEATURES);
    for _ in 0..MAX_FEATURES {
        let (chunk, rest) = cursor.split_at(4);
        descriptor_full.push(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        cursor = rest;
    }

    let mean_full = cursor[..MAX_FEATURES].to_vec();

    let total: usize = features_per_row.iter().map(|&c| c as usize).sum();
    feature_x_full.truncate(total);
    descriptor_full.truncate(total);
    let mut mean_full = mean_full;
    mean_full.truncate(total);

    Ok(FeatureTable::from_raw_parts(
        feature_x_full,
        descriptor_full,
        mean_full,
        features_per_row,
    ))
}
