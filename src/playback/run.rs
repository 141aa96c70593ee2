use std::time::Duration;

use crate::foundation::core::{FrameIndex, RunId};
use crate::rank::ranker::Frame;

/// Lifecycle of a playback run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing has been started.
    #[default]
    Idle,
    /// Frames are being emitted.
    Running,
    /// Every frame was emitted and its display window elapsed.
    Finished,
    /// Stopped early by an explicit cancel or by a superseding run.
    Cancelled,
}

impl PlaybackState {
    /// `Finished` and `Cancelled` are terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

/// Description of a run handed to [`crate::FrameSink::begin`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RunInfo {
    /// Run identity.
    pub run: RunId,
    /// Statistic being played.
    pub statistic: String,
    /// Number of frames the run will emit if not cancelled.
    pub frame_count: usize,
    /// Time each frame stays on screen before the next one.
    pub frame_delay_ms: u64,
}

/// Ordered frames for one selection plus a cursor and lifecycle state.
///
/// The run itself is clock-free; [`crate::Scheduler`] decides when to call
/// [`PlaybackRun::advance`].
#[derive(Clone, Debug)]
pub struct PlaybackRun {
    id: RunId,
    statistic: String,
    frames: Vec<Frame>,
    cursor: usize, // next frame to emit
    state: PlaybackState,
}

impl PlaybackRun {
    /// Create an idle run.
    pub fn new(id: RunId, statistic: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            id,
            statistic: statistic.into(),
            frames,
            cursor: 0,
            state: PlaybackState::Idle,
        }
    }

    /// Run identity.
    pub fn id(&self) -> RunId {
        self.id
    }

    /// Statistic being played.
    pub fn statistic(&self) -> &str {
        &self.statistic
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Total number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of frames already emitted.
    pub fn emitted(&self) -> usize {
        self.cursor
    }

    /// Describe the run for a sink.
    pub fn info(&self, frame_delay: Duration) -> RunInfo {
        RunInfo {
            run: self.id,
            statistic: self.statistic.clone(),
            frame_count: self.frames.len(),
            frame_delay_ms: u64::try_from(frame_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// `Idle -> Running`, returning the first frame.
    ///
    /// A run without frames goes straight to `Finished`. Calling this on a run that is not
    /// idle does nothing.
    pub fn begin(&mut self) -> Option<(FrameIndex, &Frame)> {
        if self.state != PlaybackState::Idle {
            return None;
        }
        self.state = PlaybackState::Running;
        self.advance()
    }

    /// Emit the next frame, or move to `Finished` once the cursor has passed the last one.
    ///
    /// Returns `None` whenever the run is not `Running`.
    pub fn advance(&mut self) -> Option<(FrameIndex, &Frame)> {
        if self.state != PlaybackState::Running {
            return None;
        }
        let Some(frame) = self.frames.get(self.cursor) else {
            self.state = PlaybackState::Finished;
            return None;
        };
        let idx = FrameIndex(self.cursor as u64);
        self.cursor += 1;
        Some((idx, frame))
    }

    /// `Running -> Cancelled`. Returns `false` (and changes nothing) in any other state.
    pub fn cancel(&mut self) -> bool {
        if self.state != PlaybackState::Running {
            return false;
        }
        self.state = PlaybackState::Cancelled;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/run.rs"]
mod tests;
