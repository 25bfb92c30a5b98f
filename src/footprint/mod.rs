/// Footprint computation module.
///
/// Derives one combined footprint polygon per gazetteer place by buffering
/// its precise locations by their positional accuracy and hulling the result,
/// with a TTL'd on-disk cache keyed by pid.
mod builder;
mod cache;

pub use builder::{FootprintBuilder, RELOCATED_ACCURACY_MARKER};
pub use cache::FootprintCache;
