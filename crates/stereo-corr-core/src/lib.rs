//! Fixed-capacity data model for a sparse stereo correspondence engine.
//!
//! This crate is intentionally algorithm-free: it defines the image view,
//! the bitwise patch descriptor and its offset patterns, the row-keyed
//! feature table, the match record, the wire format for shipping a feature
//! table between the two camera processors, and the error taxonomy. The
//! pipeline that produces and consumes these types lives in `stereo-corr`.

mod descriptor;
mod error;
mod feature_table;
mod image;
mod match_table;
mod params;
mod wire;

pub use descriptor::{Descriptor, OffsetPattern};
pub use error::StereoError;
pub use feature_table::FeatureTable;
pub use image::{ImageView, Pixels};
pub use match_table::MatchRecord;
pub use params::{DetectParams, FilterParams, MatchParams, RankParams};
pub use wire::{deserialize_feature_table, serialize_feature_table};

/// Upper bound on the number of features held by a single [`FeatureTable`].
pub const MAX_FEATURES: usize = 2000;
/// Upper bound on rectified image width, in pixels.
pub const MAX_IMG_W: usize = 1280;
/// Upper bound on rectified image height, in pixels.
pub const MAX_IMG_H: usize = 1024;
