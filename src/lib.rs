//! racebar is the ranking-and-playback engine behind an animated "racing bar chart".
//!
//! Raw time-stamped records go in; an ordered stream of ranked leaderboards comes out, one
//! per time bucket, delivered to a [`FrameSink`] on a fixed cadence.
//!
//! # Pipeline overview
//!
//! 1. **Normalize**: `RawRecord -> Observation` ([`normalize`]); bad rows are dropped and
//!    reported, never fatal.
//! 2. **Aggregate**: `Observation -> BucketTotals` ([`aggregate`]), ascending buckets in
//!    snapshot or cumulative mode.
//! 3. **Rank**: `BucketTotals -> Frame` ([`build_frames`]), top-K with a deterministic tie-break.
//! 4. **Play**: `Frame -> FrameSink` ([`Scheduler`]), cancellable and race-safe across runs.
//!
//! [`RaceSession`] wires the four steps together behind a single `play(statistic)` call.
//!
//! Rendering (bars, axes, colors, easing) is the sink's business; nothing here draws.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod aggregate;
mod foundation;
mod observation;
mod playback;
mod rank;

/// Playback configuration.
pub mod config;
/// Session-oriented playback API.
pub mod session;

pub use crate::aggregate::bucket::{Granularity, TimeBucket, bucketize};
pub use crate::aggregate::fold::{AggregationMode, AggregationState, BucketTotals, aggregate};
pub use crate::config::RaceConfig;
pub use crate::foundation::core::{BucketKey, FrameIndex, RunId};
pub use crate::foundation::error::{RaceError, RaceResult};
pub use crate::observation::model::{Normalized, Observation, Rejection, normalize, statistics};
pub use crate::observation::record::{RawRecord, RawValue};
pub use crate::playback::run::{PlaybackRun, PlaybackState, RunInfo};
pub use crate::playback::scheduler::{DEFAULT_FRAME_DELAY, Scheduler};
pub use crate::playback::sink::{FrameSink, InMemorySink, JsonLinesSink, SinkEvent};
pub use crate::rank::ranker::{DEFAULT_TOP_K, Frame, RankedEntry, build_frames, frame, rank};
pub use crate::session::RaceSession;
