/// Compile-time sample pattern used to build a patch descriptor.
///
/// `original_source` (`stereo.cpp::pixel_offsets`) only ships the Bresenham
/// ring below; its header advertises `STEREO_DESCRIPTOR_PIXELS = 30` but the
/// array itself holds 24 pairs, so the original's sampling loop silently
/// reads 6 entries past the end of `pixel_offsets`. We treat that as a bug
/// (see `SPEC_FULL.md`) and size `BresenhamRing24` at its true length. The
/// "horizontal-bar" variant spec.md names separately is not present in
/// `original_source`; it is reconstructed here as three 10-sample rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OffsetPattern {
    BresenhamRing24,
    HorizontalBar30,
}

/// `(dx, dy)` pairs for the Bresenham-ring pattern, transcribed verbatim
/// from `original_source`'s `pixel_offsets`.
const BRESENHAM_RING_24: [(i32, i32); 24] = [
    (-2, -2),
    (-2, -3),
    (-1, -3),
    (0, -3),
    (1, -3),
    (2, -3),
    (2, -2),
    (3, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (3, 2),
    (2, 2),
    (2, 3),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 3),
    (-2, 2),
    (-3, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-3, -2),
];

/// Three horizontal rows of ten samples each, flanking the peak above,
/// through, and below its own row.
const HORIZONTAL_BAR_30: [(i32, i32); 30] = [
    (-5, -3),
    (-4, -3),
    (-3, -3),
    (-2, -3),
    (-1, -3),
    (1, -3),
    (2, -3),
    (3, -3),
    (4, -3),
    (5, -3),
    (-5, 0),
    (-4, 0),
    (-3, 0),
    (-2, 0),
    (-1, 0),
    (1, 0),
    (2, 0),
    (3, 0),
    (4, 0),
    (5, 0),
    (-5, 3),
    (-4, 3),
    (-3, 3),
    (-2, 3),
    (-1, 3),
    (1, 3),
    (2, 3),
    (3, 3),
    (4, 3),
    (5, 3),
];

impl OffsetPattern {
    /// Number of pattern bits (`DESCRIPTOR_BITS` in spec.md §3), not
    /// counting the optional three color-dominance flag bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            OffsetPattern::BresenhamRing24 => 24,
            OffsetPattern::HorizontalBar30 => 30,
        }
    }

    #[inline]
    pub fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            OffsetPattern::BresenhamRing24 => &BRESENHAM_RING_24,
            OffsetPattern::HorizontalBar30 => &HORIZONTAL_BAR_30,
        }
    }

    /// Bit positions of the "mostly red/green/blue" flags (spec.md §4.3 step
    /// 5): the three bits immediately above `bits()`, so the masking/
    /// anti-descriptor window used by the matcher is exactly the contiguous
    /// range `[0, effective_bits)` whether or not color flags are in play.
    #[inline]
    pub const fn red_bit(self) -> u32 {
        self.bits()
    }

    #[inline]
    pub const fn green_bit(self) -> u32 {
        self.bits() + 1
    }

    #[inline]
    pub const fn blue_bit(self) -> u32 {
        self.bits() + 2
    }

    /// `DESCRIPTOR_BITS + 3` when color flags are enabled, `DESCRIPTOR_BITS`
    /// otherwise — the width the matcher masks, reverses, and scores over.
    /// `HorizontalBar30` has no headroom for color flags in a 32-bit word
    /// (`30 + 3 = 33`); callers must not combine it with `color_flags`.
    #[inline]
    pub const fn effective_bits(self, color_flags: bool) -> u32 {
        if color_flags {
            self.bits() + 3
        } else {
            self.bits()
        }
    }
}

/// A 32-bit bitfield descriptor. Only the low `bits` (24 or 30, per the
/// configured [`OffsetPattern`]) carry pattern information; the three bits
/// immediately above that optionally carry "mostly red/green/blue"
/// color-dominance flags (spec.md §4.3 step 5).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub struct Descriptor(pub u32);

impl Descriptor {
    #[inline]
    pub fn popcount(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub fn masked(self, mask: Descriptor) -> Descriptor {
        Descriptor(self.0 & mask.0)
    }

    #[inline]
    pub fn and(self, other: Descriptor) -> Descriptor {
        Descriptor(self.0 & other.0)
    }

    /// Bit-reverse within the low `width` bits (pattern bits plus the three
    /// color bits when present), building the "anti-descriptor" used for
    /// anti-correlation scoring (spec.md §4.5).
    #[inline]
    pub fn reversed(self, width: u32) -> Descriptor {
        let mut src = self.0;
        let mut out = 0u32;
        for _ in 0..width {
            out = (out << 1) | (src & 1);
            src >>= 1;
        }
        Descriptor(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bresenham_ring_has_24_samples() {
        assert_eq!(OffsetPattern::BresenhamRing24.bits(), 24);
        assert_eq!(OffsetPattern::BresenhamRing24.offsets().len(), 24);
    }

    #[test]
    fn horizontal_bar_has_30_samples() {
        assert_eq!(OffsetPattern::HorizontalBar30.bits(), 30);
        assert_eq!(OffsetPattern::HorizontalBar30.offsets().len(), 30);
    }

    #[test]
    fn reversed_is_involutive_over_its_width() {
        let d = Descriptor(0b1011_0010);
        let width = 8;
        assert_eq!(d.reversed(width).reversed(width), d);
    }

    #[test]
    fn reversed_flips_bit_order() {
        let d = Descriptor(0b0000_0001);
        assert_eq!(d.reversed(8), Descriptor(0b1000_0000));
    }

    #[test]
    fn popcount_matches_rust_builtin() {
        let d = Descriptor(0b1010_1010);
        assert_eq!(d.popcount(), 4);
    }
}
