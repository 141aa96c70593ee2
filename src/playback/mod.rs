//! Frame playback.
//!
//! A [`run::PlaybackRun`] is the clock-free state machine, the [`scheduler::Scheduler`]
//! supplies the timing, and a [`sink::FrameSink`] receives the frames.

pub(crate) mod run;
pub(crate) mod scheduler;
pub(crate) mod sink;
