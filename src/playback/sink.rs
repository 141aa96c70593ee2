use std::io::Write;

use crate::foundation::core::{FrameIndex, RunId};
use crate::foundation::error::{RaceError, RaceResult};
use crate::playback::run::{PlaybackState, RunInfo};
use crate::rank::ranker::Frame;

/// Sink contract for the rendering layer.
///
/// Ordering contract: for one run, `begin` is called once, then `on_frame` once per frame in
/// strictly increasing `FrameIndex` order, then `end` once. A superseded run always receives
/// its `end` before the next run's `begin`. Calls come synchronously from the scheduler's
/// emission step; the sink gets the inter-frame delay (see [`RunInfo::frame_delay_ms`]) to
/// animate a frame and is never waited on.
pub trait FrameSink: Send {
    /// Called once before the first frame of a run.
    fn begin(&mut self, _info: &RunInfo) -> RaceResult<()> {
        Ok(())
    }
    /// Called once per frame, in frame order.
    fn on_frame(&mut self, run: RunId, idx: FrameIndex, frame: &Frame) -> RaceResult<()>;
    /// Called once when the run reaches `Finished` or `Cancelled`.
    fn end(&mut self, _run: RunId, _outcome: PlaybackState) -> RaceResult<()> {
        Ok(())
    }
}

impl<T: FrameSink + ?Sized> FrameSink for Box<T> {
    fn begin(&mut self, info: &RunInfo) -> RaceResult<()> {
        (**self).begin(info)
    }

    fn on_frame(&mut self, run: RunId, idx: FrameIndex, frame: &Frame) -> RaceResult<()> {
        (**self).on_frame(run, idx, frame)
    }

    fn end(&mut self, run: RunId, outcome: PlaybackState) -> RaceResult<()> {
        (**self).end(run, outcome)
    }
}

/// One call received by a sink.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SinkEvent {
    /// A run began.
    Begin(RunInfo),
    /// A frame was emitted.
    Frame {
        /// Emitting run.
        run: RunId,
        /// Position within the run.
        index: FrameIndex,
        /// The frame itself.
        frame: Frame,
    },
    /// A run ended.
    End {
        /// Ending run.
        run: RunId,
        /// Terminal state.
        outcome: PlaybackState,
    },
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    events: Vec<SinkEvent>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event received, in arrival order.
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Frames received, in arrival order, with their run and index.
    pub fn frames(&self) -> impl Iterator<Item = (RunId, FrameIndex, &Frame)> {
        self.events.iter().filter_map(|e| match e {
            SinkEvent::Frame { run, index, frame } => Some((*run, *index, frame)),
            _ => None,
        })
    }

    /// Frames received from one run.
    pub fn frames_of(&self, run: RunId) -> Vec<&Frame> {
        self.frames()
            .filter(|(r, _, _)| *r == run)
            .map(|(_, _, f)| f)
            .collect()
    }

    /// Terminal state reported for `run`, if its `end` arrived.
    pub fn outcome_of(&self, run: RunId) -> Option<PlaybackState> {
        self.events.iter().find_map(|e| match e {
            SinkEvent::End { run: r, outcome } if *r == run => Some(*outcome),
            _ => None,
        })
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, info: &RunInfo) -> RaceResult<()> {
        self.events.push(SinkEvent::Begin(info.clone()));
        Ok(())
    }

    fn on_frame(&mut self, run: RunId, idx: FrameIndex, frame: &Frame) -> RaceResult<()> {
        self.events.push(SinkEvent::Frame {
            run,
            index: idx,
            frame: frame.clone(),
        });
        Ok(())
    }

    fn end(&mut self, run: RunId, outcome: PlaybackState) -> RaceResult<()> {
        self.events.push(SinkEvent::End { run, outcome });
        Ok(())
    }
}

/// Sink that writes one JSON object per event and flushes after each line.
pub struct JsonLinesSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: &SinkEvent) -> RaceResult<()> {
        serde_json::to_writer(&mut self.out, event)
            .map_err(|e| RaceError::serde(format!("encode sink event: {e}")))?;
        self.out
            .write_all(b"\n")
            .and_then(|()| self.out.flush())
            .map_err(|e| RaceError::sink(format!("write sink event: {e}")))
    }
}

impl<W: Write + Send> FrameSink for JsonLinesSink<W> {
    fn begin(&mut self, info: &RunInfo) -> RaceResult<()> {
        self.write_event(&SinkEvent::Begin(info.clone()))
    }

    fn on_frame(&mut self, run: RunId, idx: FrameIndex, frame: &Frame) -> RaceResult<()> {
        self.write_event(&SinkEvent::Frame {
            run,
            index: idx,
            frame: frame.clone(),
        })
    }

    fn end(&mut self, run: RunId, outcome: PlaybackState) -> RaceResult<()> {
        self.write_event(&SinkEvent::End { run, outcome })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/sink.rs"]
mod tests;
