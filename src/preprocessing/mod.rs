//! # Feature preprocessing
//!
//! Turns gap triples into aligned numeric tensors.
//!
//! - `frame` - labelled tables with a surviving row index
//! - `fill` - missing value placeholders
//! - `normalize` - z-score standardization
//! - `transformer` - the full masking / compression / scaling pipeline

mod fill;
mod frame;
mod normalize;
mod transformer;

pub use fill::{to_tensor, FillMethod};
pub use frame::{Column, Frame, RawBatch, Role};
pub use normalize::{Normalizer, StandardNormalizer};
pub use transformer::{
    clip_extremum, log_compress, percentage_change, presence_mask, FeatureSample,
    FeatureScaler, FeatureTransformer, TransformConfig, TransformedBatch, DEFAULT_EPSILON,
};
