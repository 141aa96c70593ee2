use std::collections::BTreeMap;

use crate::aggregate::bucket::{Granularity, TimeBucket, bucketize, finite_sum};
use crate::foundation::core::BucketKey;
use crate::foundation::error::RaceResult;
use crate::observation::model::Observation;

/// Whether a bucket shows its own values or running totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Each bucket reflects only its own observations.
    #[default]
    Snapshot,
    /// Each bucket reflects the running total over all buckets so far.
    Cumulative,
}

/// Entity/value mapping for one bucket, ready for ranking.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BucketTotals {
    /// Bucket key.
    pub key: BucketKey,
    /// Entity -> value after folding this bucket.
    pub values: BTreeMap<String, f64>,
}

/// Per-run accumulator. A fresh state is created for every aggregation; nothing carries
/// over between statistics or runs.
#[derive(Clone, Debug)]
pub struct AggregationState {
    mode: AggregationMode,
    values: BTreeMap<String, f64>,
}

impl AggregationState {
    /// Create an empty state.
    pub fn new(mode: AggregationMode) -> Self {
        Self {
            mode,
            values: BTreeMap::new(),
        }
    }

    /// Fold one bucket (buckets must arrive in ascending order) and return the mapping
    /// for it.
    ///
    /// A total that overflows to a non-finite value is a [`crate::RaceError::Validation`]; the
    /// state is left as it was before the failing entity.
    pub fn fold(&mut self, bucket: &TimeBucket<'_>) -> RaceResult<BucketTotals> {
        let sums = bucket.entity_sums()?;
        match self.mode {
            AggregationMode::Snapshot => self.values = sums,
            AggregationMode::Cumulative => {
                for (entity, v) in sums {
                    let total = self.values.get(&entity).copied().unwrap_or(0.0);
                    let total = finite_sum(total, v, &entity, &bucket.key)?;
                    self.values.insert(entity, total);
                }
            }
        }
        Ok(BucketTotals {
            key: bucket.key.clone(),
            values: self.values.clone(),
        })
    }

    /// Current accumulated values.
    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }
}

/// Bucket the observations of `statistic` and fold them through a fresh
/// [`AggregationState`].
#[tracing::instrument(skip(observations), fields(count = observations.len()))]
pub fn aggregate(
    observations: &[Observation],
    statistic: &str,
    mode: AggregationMode,
    granularity: Granularity,
) -> RaceResult<Vec<BucketTotals>> {
    let buckets = bucketize(observations, statistic, granularity)?;
    let mut state = AggregationState::new(mode);
    let out = buckets
        .iter()
        .map(|b| state.fold(b))
        .collect::<RaceResult<Vec<_>>>()?;
    tracing::debug!(buckets = out.len(), entities = state.values().len(), "aggregated");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/aggregate/fold.rs"]
mod tests;
