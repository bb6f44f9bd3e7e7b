use crate::descriptor::Descriptor;
use crate::MAX_FEATURES;

/// Row-keyed collection of features for one camera (spec.md §3).
///
/// Features are stored row-major, in the order they were appended within a
/// row (the detector walks each row right-to-left, so within a row the
/// first-inserted feature is the rightmost one accepted). `features_per_row`
/// lets a consumer recover row boundaries by walking a running offset and
/// decrementing a per-row counter, exactly as the original's matcher does
/// with `fL`/`fR`.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct FeatureTable {
    feature_x: Vec<i16>,
    descriptor: Vec<u32>,
    mean: Vec<u8>,
    features_per_row: Vec<u16>,
}

impl FeatureTable {
    /// Build an empty table preallocated to `MAX_FEATURES` / `rows` capacity
    /// so that `detect()` never reallocates on the hot path.
    pub fn with_capacity(rows: usize) -> Self {
        Self {
            feature_x: Vec::with_capacity(MAX_FEATURES),
            descriptor: Vec::with_capacity(MAX_FEATURES),
            mean: Vec::with_capacity(MAX_FEATURES),
            features_per_row: Vec::with_capacity(rows),
        }
    }

    /// Drop all stored features without releasing the underlying capacity.
    pub fn clear(&mut self) {
        self.feature_x.clear();
        self.descriptor.clear();
        self.mean.clear();
        self.features_per_row.clear();
    }

    /// Total number of stored features, `Σ_r features_per_row[r]`.
    pub fn len(&self) -> usize {
        self.feature_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_x.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.feature_x.len() >= MAX_FEATURES
    }

    /// Number of rows with a recorded count so far (including zero-feature
    /// rows the detector has already walked past).
    pub fn row_count(&self) -> usize {
        self.features_per_row.len()
    }

    pub fn features_per_row(&self) -> &[u16] {
        &self.features_per_row
    }

    /// Append one feature to the row currently being built. Returns `false`
    /// (and stores nothing) if `MAX_FEATURES` has already been reached.
    pub fn push(&mut self, x: i16, descriptor: Descriptor, mean: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.feature_x.push(x);
        self.descriptor.push(descriptor.0);
        self.mean.push(mean);
        true
    }

    /// Close out the row currently being built, recording how many features
    /// it contributed.
    pub fn end_row(&mut self, feature_count: u16) {
        self.features_per_row.push(feature_count);
    }

    pub fn x_at(&self, index: usize) -> i16 {
        self.feature_x[index]
    }

    pub fn descriptor_at(&self, index: usize) -> Descriptor {
        Descriptor(self.descriptor[index])
    }

    pub fn mean_at(&self, index: usize) -> u8 {
        self.mean[index]
    }

    /// Iterate `(start_index, count)` per row, in row order — the
    /// bookkeeping a consumer needs to walk both tables in lockstep by row,
    /// as `stereo_match`'s `fL`/`fR` running offsets do.
    pub fn row_spans(&self) -> impl Iterator<Item = (usize, u16)> + '_ {
        let mut offset = 0usize;
        self.features_per_row.iter().map(move |&count| {
            let start = offset;
            offset += count as usize;
            (start, count)
        })
    }

    pub(crate) fn raw_x(&self) -> &[i16] {
        &self.feature_x
    }

    pub(crate) fn raw_descriptor(&self) -> &[u32] {
        &self.descriptor
    }

    pub(crate) fn raw_mean(&self) -> &[u8] {
        &self.mean
    }

    pub(crate) fn raw_features_per_row(&self) -> &[u16] {
        &self.features_per_row
    }

    pub(crate) fn from_raw_parts(
        feature_x: Vec<i16>,
        descriptor: Vec<u32>,
        mean: Vec<u8>,
        features_per_row: Vec<u16>,
    ) -> Self {
        Self {
            feature_x,
            descriptor,
            mean,
            features_per_row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_spans_reconstruct_row_boundaries() {
        let mut table = FeatureTable::with_capacity(4);
        table.push(10, Descriptor(1), 5);
        table.push(9, Descriptor(2), 6);
        table.end_row(2);
        table.push(3, Descriptor(3), 7);
        table.end_row(1);

        let spans: Vec<_> = table.row_spans().collect();
        assert_eq!(spans, vec![(0, 2), (2, 1)]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn push_rejects_once_full() {
        let mut table = FeatureTable::with_capacity(1);
        for i in 0..MAX_FEATURES {
            assert!(table.push(i as i16, Descriptor(0), 0));
        }
        assert!(table.is_full());
        assert!(!table.push(0, Descriptor(0), 0));
        assert_eq!(table.len(), MAX_FEATURES);
    }
}
