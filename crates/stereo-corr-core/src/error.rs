/// Errors surfaced by the stereo correspondence pipeline.
///
/// `CapacityExceeded` is informational: `detect()` still returns `Ok` with
/// the truncated count (spec.md §7 — "detector returns the count actually
/// stored; diagnostic emitted"), so it is not part of this enum. `DegenerateRow`
/// and `NoMatches` are likewise not errors per spec.md and have no variant
/// here; they show up only as an empty result.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StereoError {
    /// `match()` was called before a received opposite-camera feature table
    /// was loaded via `receive_opposite()`.
    #[error("match() called before receive_opposite()")]
    StageMisorder,
    /// The CRC-CCITT trailer of a received feature table wire image did not
    /// match the computed checksum; the frame must be discarded.
    #[error("feature table CRC mismatch: expected {expected:#06x}, computed {computed:#06x}")]
    WireCorruption { expected: u16, computed: u16 },
    /// The wire image was the wrong length for the declared capacities.
    #[error("feature table wire image has length {actual}, expected {expected}")]
    WireLength { expected: usize, actual: usize },
}
