//! Time bucketing and per-bucket folding.

pub(crate) mod bucket;
pub(crate) mod fold;
