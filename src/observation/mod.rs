//! Raw input records and validated observations.

pub(crate) mod model;
pub(crate) mod record;
