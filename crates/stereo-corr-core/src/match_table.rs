/// One candidate or final stereo match (spec.md §3 "Match table").
///
/// `prob` is a confidence score in `[0, 999]`; a value of `0` means the
/// candidate has been suppressed by the histogram filter and should not be
/// surfaced to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MatchRecord {
    pub prob: u32,
    pub x: u32,
    pub y: u32,
    pub disp: u32,
}

impl MatchRecord {
    pub fn is_suppressed(&self) -> bool {
        self.prob == 0
    }
}
