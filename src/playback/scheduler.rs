use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::foundation::core::RunId;
use crate::foundation::error::{RaceError, RaceResult};
use crate::playback::run::{PlaybackRun, PlaybackState};
use crate::playback::sink::FrameSink;
use crate::rank::ranker::Frame;

/// Default time each frame stays on screen.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(1500);

struct Inner<S> {
    sink: S,
    run: Option<PlaybackRun>,
    last_id: RunId,
    sink_error: Option<RaceError>,
}

struct Shared<S> {
    inner: Mutex<Inner<S>>,
    wake: Condvar,
}

impl<S> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: FrameSink> Inner<S> {
    fn is_running(&self, id: RunId) -> bool {
        self.run
            .as_ref()
            .is_some_and(|r| r.id() == id && r.state() == PlaybackState::Running)
    }

    /// Begin the current run and emit its first frame. Returns whether it is still running.
    fn begin_current(&mut self, frame_delay: Duration) -> RaceResult<bool> {
        let Some(run) = self.run.as_mut() else {
            return Ok(false);
        };
        let id = run.id();
        self.sink.begin(&run.info(frame_delay))?;
        match run.begin() {
            Some((idx, frame)) => {
                tracing::debug!(run = %id, frame = idx.0, bucket = %frame.bucket_key, "emit");
                self.sink.on_frame(id, idx, frame)?;
                Ok(true)
            }
            None => {
                tracing::info!(run = %id, "playback finished (no frames)");
                self.sink.end(id, PlaybackState::Finished)?;
                Ok(false)
            }
        }
    }

    /// Emit the next frame of run `id`, or finish it. Returns whether it is still running.
    ///
    /// Does nothing unless `id` is the current run and still `Running`.
    fn step(&mut self, id: RunId) -> RaceResult<bool> {
        let Some(run) = self
            .run
            .as_mut()
            .filter(|r| r.id() == id && r.state() == PlaybackState::Running)
        else {
            return Ok(false);
        };
        match run.advance() {
            Some((idx, frame)) => {
                tracing::debug!(run = %id, frame = idx.0, bucket = %frame.bucket_key, "emit");
                self.sink.on_frame(id, idx, frame)?;
                Ok(true)
            }
            None => {
                tracing::info!(run = %id, frames = run.emitted(), "playback finished");
                self.sink.end(id, PlaybackState::Finished)?;
                Ok(false)
            }
        }
    }

    /// Cancel the current run if it is running. Returns whether anything changed.
    fn cancel_current(&mut self) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };
        if !run.cancel() {
            return false;
        }
        let id = run.id();
        tracing::info!(run = %id, emitted = run.emitted(), "playback cancelled");
        if let Err(e) = self.sink.end(id, PlaybackState::Cancelled) {
            tracing::warn!(run = %id, error = %e, "sink rejected end of cancelled run");
        }
        true
    }

    fn fail(&mut self, id: RunId, err: RaceError) {
        tracing::error!(run = %id, error = %err, "sink failed; cancelling playback");
        if self.run.as_ref().is_some_and(|r| r.id() == id) {
            self.cancel_current();
        }
        self.sink_error = Some(err);
    }
}

/// Drives frames into a [`FrameSink`] on a fixed cadence.
///
/// The first frame of a run is emitted synchronously by [`Scheduler::start`]; the rest are
/// emitted by a timer thread that waits `frame_delay` between frames. Exactly one run is
/// current. Starting a new run cancels the previous one, and every emission checks the run
/// identity under the same lock that `start` and `cancel` take, so a superseded run never
/// emits again, even when its timer has already fired.
pub struct Scheduler<S: FrameSink + 'static> {
    shared: Arc<Shared<S>>,
    frame_delay: Duration,
    timer: Option<JoinHandle<()>>,
}

impl<S: FrameSink + 'static> Scheduler<S> {
    /// Create an idle scheduler. `frame_delay` must be non-zero.
    pub fn new(sink: S, frame_delay: Duration) -> RaceResult<Self> {
        if frame_delay.is_zero() {
            return Err(RaceError::invalid_config("frame delay must be > 0"));
        }
        Ok(Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    sink,
                    run: None,
                    last_id: RunId(0),
                    sink_error: None,
                }),
                wake: Condvar::new(),
            }),
            frame_delay,
            timer: None,
        })
    }

    /// Inter-frame delay.
    pub fn frame_delay(&self) -> Duration {
        self.frame_delay
    }

    /// Start playing `frames`, superseding any running run.
    ///
    /// The first frame reaches the sink before this returns. Errors from the sink during
    /// `begin` or the first frame abort the new run and are returned.
    pub fn start(&mut self, statistic: &str, frames: Vec<Frame>) -> RaceResult<RunId> {
        let (id, begun) = {
            let mut inner = self.shared.lock();
            inner.cancel_current();
            let id = inner.last_id.next();
            inner.last_id = id;
            tracing::info!(run = %id, statistic, frames = frames.len(), "playback started");
            inner.run = Some(PlaybackRun::new(id, statistic, frames));
            let begun = inner.begin_current(self.frame_delay);
            if let Err(e) = &begun {
                tracing::warn!(run = %id, error = %e, "sink rejected start of run");
                if !inner.cancel_current() {
                    inner.run = None;
                }
            }
            (id, begun)
        };

        // The superseded timer (if any) wakes, sees it is no longer current, and exits.
        self.shared.wake.notify_all();
        self.join_timer();

        if begun? {
            self.spawn_timer(id)?;
        }
        Ok(id)
    }

    /// Cancel the current run. No-op (returning `false`) unless it is running.
    pub fn cancel(&mut self) -> bool {
        let changed = self.shared.lock().cancel_current();
        self.shared.wake.notify_all();
        self.join_timer();
        changed
    }

    /// Block until the current run leaves `Running` and return its final state.
    pub fn wait(&mut self) -> PlaybackState {
        self.join_timer();
        self.state()
    }

    /// State of the current run, `Idle` before the first `start`.
    pub fn state(&self) -> PlaybackState {
        self.shared
            .lock()
            .run
            .as_ref()
            .map_or(PlaybackState::Idle, PlaybackRun::state)
    }

    /// Identity of the current run.
    pub fn current_run(&self) -> Option<RunId> {
        self.shared.lock().run.as_ref().map(PlaybackRun::id)
    }

    /// Inspect the sink.
    pub fn with_sink<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.shared.lock().sink)
    }

    /// Take the error that made the timer thread stop a run, if any.
    pub fn take_sink_error(&mut self) -> Option<RaceError> {
        self.shared.lock().sink_error.take()
    }

    fn spawn_timer(&mut self, id: RunId) -> RaceResult<()> {
        let shared = Arc::clone(&self.shared);
        let delay = self.frame_delay;
        let handle = std::thread::Builder::new()
            .name(format!("racebar-{id}"))
            .spawn(move || timer_loop(&shared, id, delay))
            .map_err(|e| {
                self.shared.lock().cancel_current();
                RaceError::Other(anyhow::Error::new(e).context("spawn playback timer"))
            })?;
        self.timer = Some(handle);
        Ok(())
    }

    fn join_timer(&mut self) {
        if let Some(handle) = self.timer.take()
            && handle.join().is_err()
        {
            tracing::error!("playback timer thread panicked");
        }
    }
}

impl<S: FrameSink + 'static> Drop for Scheduler<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn timer_loop<S: FrameSink>(shared: &Shared<S>, id: RunId, delay: Duration) {
    let mut inner = shared.lock();
    loop {
        let deadline = Instant::now() + delay;
        loop {
            if !inner.is_running(id) {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let (guard, _) = shared
                .wake
                .wait_timeout(inner, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            inner = guard;
        }

        match inner.step(id) {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                inner.fail(id, e);
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/scheduler.rs"]
mod tests;
