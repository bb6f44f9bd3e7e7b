mod accumulate;
mod descriptor_builder;
mod detect;
mod engine;
mod filter;
mod matcher;
mod nms;
mod rank;
mod scratch;

pub use detect::{detect_features, max_rows};
pub use engine::{EngineState, StereoEngine};
pub use filter::filter_disparity_histogram;
pub use matcher::match_rows;
pub use rank::rank_matches;
pub use scratch::Scratch;
