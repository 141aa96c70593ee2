use std::collections::BTreeMap;

use crate::foundation::core::BucketKey;
use crate::foundation::error::{RaceError, RaceResult};
use crate::observation::model::Observation;

/// How observation timestamps map onto buckets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One bucket per distinct timestamp.
    #[default]
    ExactTimestamp,
    /// Date-times collapse to their calendar day. Labels are unaffected.
    Day,
}

impl Granularity {
    /// Bucket key for a timestamp under this granularity.
    pub fn bucket_key(self, ts: &BucketKey) -> BucketKey {
        match self {
            Self::ExactTimestamp => ts.clone(),
            Self::Day => ts.truncate_to_day(),
        }
    }
}

/// Observations of one statistic that share a bucket key, in input order.
#[derive(Clone, Debug)]
pub struct TimeBucket<'a> {
    /// Bucket key after granularity truncation.
    pub key: BucketKey,
    /// Member observations in input order.
    pub observations: Vec<&'a Observation>,
}

impl TimeBucket<'_> {
    /// Per-entity sums for this bucket alone. Duplicate rows for an entity add up.
    ///
    /// Fails with [`RaceError::Validation`] when a sum leaves the finite range.
    pub fn entity_sums(&self) -> RaceResult<BTreeMap<String, f64>> {
        let mut sums = BTreeMap::<String, f64>::new();
        for obs in &self.observations {
            match sums.get_mut(obs.entity()) {
                Some(v) => *v = finite_sum(*v, obs.value(), obs.entity(), &self.key)?,
                None => {
                    sums.insert(obs.entity().to_owned(), obs.value());
                }
            }
        }
        Ok(sums)
    }
}

/// `a + b`, or a validation error naming the entity and bucket when the sum overflows.
pub(crate) fn finite_sum(a: f64, b: f64, entity: &str, key: &BucketKey) -> RaceResult<f64> {
    let sum = a + b;
    if sum.is_finite() {
        Ok(sum)
    } else {
        Err(RaceError::validation(format!(
            "total for '{entity}' at {key} is not finite"
        )))
    }
}

/// Group the observations of `statistic` into ascending time buckets.
///
/// Fails with [`RaceError::EmptySelection`] when no observation carries `statistic`.
pub fn bucketize<'a>(
    observations: &'a [Observation],
    statistic: &str,
    granularity: Granularity,
) -> RaceResult<Vec<TimeBucket<'a>>> {
    let mut groups = BTreeMap::<BucketKey, Vec<&'a Observation>>::new();
    for obs in observations.iter().filter(|o| o.statistic() == statistic) {
        groups
            .entry(granularity.bucket_key(obs.timestamp()))
            .or_default()
            .push(obs);
    }

    if groups.is_empty() {
        return Err(RaceError::empty_selection(statistic));
    }

    Ok(groups
        .into_iter()
        .map(|(key, observations)| TimeBucket { key, observations })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/aggregate/bucket.rs"]
mod tests;
