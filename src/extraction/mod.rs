//! Construction of supervised samples from company histories

mod gaps;

pub use gaps::{GapExtractor, GapTriple, DEFAULT_COMPLETENESS_THRESHOLD};
