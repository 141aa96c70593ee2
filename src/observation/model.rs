use std::collections::BTreeSet;

use crate::foundation::core::BucketKey;
use crate::foundation::error::{RaceError, RaceResult};
use crate::observation::record::RawRecord;

/// One validated, immutable data point.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Observation {
    entity: String,
    statistic: String,
    timestamp: BucketKey,
    value: f64,
}

impl Observation {
    /// Create a validated observation.
    ///
    /// `entity` and `statistic` are trimmed and must be non-empty; `value` must be finite.
    pub fn new(
        entity: impl Into<String>,
        statistic: impl Into<String>,
        timestamp: BucketKey,
        value: f64,
    ) -> RaceResult<Self> {
        let entity = entity.into().trim().to_owned();
        let statistic = statistic.into().trim().to_owned();
        if entity.is_empty() {
            return Err(RaceError::validation("entity must be non-empty"));
        }
        if statistic.is_empty() {
            return Err(RaceError::validation("statistic must be non-empty"));
        }
        if !value.is_finite() {
            return Err(RaceError::validation(format!(
                "value for '{entity}' must be finite"
            )));
        }
        Ok(Self {
            entity,
            statistic,
            timestamp,
            value,
        })
    }

    /// Build an observation from a raw record.
    pub fn from_raw(raw: &RawRecord) -> RaceResult<Self> {
        let value = raw
            .value
            .as_ref()
            .ok_or_else(|| RaceError::validation("value is missing"))?
            .to_finite()?;
        let timestamp = BucketKey::parse(&raw.date)?;
        Self::new(raw.player.as_str(), raw.stat.as_str(), timestamp, value)
    }

    /// Ranked subject (player).
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Statistic key this observation belongs to.
    pub fn statistic(&self) -> &str {
        &self.statistic
    }

    /// Time-bucket key.
    pub fn timestamp(&self) -> &BucketKey {
        &self.timestamp
    }

    /// Finite value.
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// A raw record that was dropped during normalization.
#[derive(Debug)]
pub struct Rejection {
    /// Position of the record in the input.
    pub index: usize,
    /// Why it was dropped (always [`RaceError::Validation`]).
    pub error: RaceError,
}

/// Output of [`normalize`]: accepted observations plus the records that were dropped.
#[derive(Debug, Default)]
pub struct Normalized {
    /// Accepted observations in input order.
    pub observations: Vec<Observation>,
    /// Dropped records in input order.
    pub rejected: Vec<Rejection>,
}

impl Normalized {
    /// Number of dropped records.
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Turn raw records into observations, dropping (and reporting) the ones that fail
/// validation instead of aborting.
pub fn normalize(records: &[RawRecord]) -> Normalized {
    let mut out = Normalized::default();
    for (index, raw) in records.iter().enumerate() {
        match Observation::from_raw(raw) {
            Ok(obs) => out.observations.push(obs),
            Err(error) => out.rejected.push(Rejection { index, error }),
        }
    }

    if !out.rejected.is_empty() {
        tracing::warn!(
            dropped = out.rejected.len(),
            accepted = out.observations.len(),
            "dropped invalid records"
        );
    }
    out
}

/// Distinct statistic keys present in `observations`, sorted.
pub fn statistics(observations: &[Observation]) -> Vec<String> {
    observations
        .iter()
        .map(|o| o.statistic.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/observation/model.rs"]
mod tests;
