use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::aggregate::fold::BucketTotals;
use crate::foundation::core::BucketKey;

/// Default leaderboard length.
pub const DEFAULT_TOP_K: usize = 10;

/// One row of a leaderboard.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RankedEntry {
    /// Entity identifier.
    pub entity: String,
    /// Value shown for the entity in this frame.
    pub value: f64,
    /// 1-based position within the frame.
    pub rank: u32,
}

/// Ranked leaderboard for one bucket. Immutable once built.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    /// Bucket this frame depicts.
    pub bucket_key: BucketKey,
    /// At most `k` rows, best first.
    pub ranked: Vec<RankedEntry>,
}

impl Frame {
    /// Largest value in the frame (the axis domain upper bound), or `0.0` when empty.
    pub fn max_value(&self) -> f64 {
        self.ranked.first().map_or(0.0, |e| e.value)
    }

    /// Entity ids in rank order.
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.ranked.iter().map(|e| e.entity.as_str())
    }

    /// Return `true` when no entity is ranked.
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

// `-0.0` folds into `0.0` so signed zeros tie; NaN sorts with `-inf`, below every number.
fn order_key(v: f64) -> f64 {
    if v.is_nan() { f64::NEG_INFINITY } else { v + 0.0 }
}

fn leaderboard_order(a: (&str, f64), b: (&str, f64)) -> Ordering {
    order_key(b.1)
        .total_cmp(&order_key(a.1))
        .then_with(|| a.0.cmp(b.0))
}

/// Rank an entity/value mapping: descending value, ties broken by ascending entity id,
/// truncated to the first `k` rows.
///
/// Equal values always order by id, so `{B: 5, A: 5}` ranks A first regardless of which
/// entity reached the value earlier. `aggregate` never yields non-finite values;
/// when a caller passes one anyway, NaN ranks with `-inf` at the bottom.
pub fn rank(values: &BTreeMap<String, f64>, k: usize) -> Vec<RankedEntry> {
    let mut rows: Vec<(&str, f64)> = values.iter().map(|(e, v)| (e.as_str(), *v)).collect();
    rows.sort_by(|a, b| leaderboard_order(*a, *b));
    rows.truncate(k);

    rows.into_iter()
        .enumerate()
        .map(|(i, (entity, value))| RankedEntry {
            entity: entity.to_owned(),
            value,
            rank: u32::try_from(i + 1).unwrap_or(u32::MAX),
        })
        .collect()
}

/// Build the frame for one aggregated bucket.
pub fn frame(bucket: &BucketTotals, k: usize) -> Frame {
    Frame {
        bucket_key: bucket.key.clone(),
        ranked: rank(&bucket.values, k),
    }
}

/// Build frames for every bucket, preserving bucket order.
pub fn build_frames(buckets: &[BucketTotals], k: usize) -> Vec<Frame> {
    buckets.iter().map(|b| frame(b, k)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/rank/ranker.rs"]
mod tests;
