use crate::aggregate::fold::aggregate;
use crate::config::RaceConfig;
use crate::foundation::core::RunId;
use crate::foundation::error::RaceResult;
use crate::observation::model::{Normalized, Observation, normalize, statistics};
use crate::observation::record::RawRecord;
use crate::playback::run::PlaybackState;
use crate::playback::scheduler::Scheduler;
use crate::playback::sink::FrameSink;
use crate::rank::ranker::{Frame, build_frames};

/// Observations, configuration and a scheduler bound together.
///
/// `play(statistic)` is the "start playback" trigger: it aggregates with a fresh state,
/// ranks, and hands the frames to the scheduler, superseding whatever was playing.
pub struct RaceSession<S: FrameSink + 'static> {
    observations: Vec<Observation>,
    config: RaceConfig,
    scheduler: Scheduler<S>,
}

impl<S: FrameSink + 'static> RaceSession<S> {
    /// Validate `config` and create an idle session.
    pub fn new(observations: Vec<Observation>, config: RaceConfig, sink: S) -> RaceResult<Self> {
        config.validate()?;
        let scheduler = Scheduler::new(sink, config.frame_delay())?;
        Ok(Self {
            observations,
            config,
            scheduler,
        })
    }

    /// Normalize raw records and create a session from the accepted ones.
    ///
    /// The returned [`Normalized`] carries the rejected records (its `observations` are moved
    /// into the session and left empty).
    pub fn from_records(
        records: &[RawRecord],
        config: RaceConfig,
        sink: S,
    ) -> RaceResult<(Self, Normalized)> {
        let mut norm = normalize(records);
        let observations = std::mem::take(&mut norm.observations);
        Ok((Self::new(observations, config, sink)?, norm))
    }

    /// Active configuration.
    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Observations the session plays from.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Statistic keys available for selection.
    pub fn statistics(&self) -> Vec<String> {
        statistics(&self.observations)
    }

    /// Frames for `statistic`, without playing them.
    pub fn frames(&self, statistic: &str) -> RaceResult<Vec<Frame>> {
        let buckets = aggregate(
            &self.observations,
            statistic,
            self.config.mode,
            self.config.granularity,
        )?;
        Ok(build_frames(&buckets, self.config.top_k))
    }

    /// Start playing `statistic`.
    ///
    /// When the statistic has no observations the error is returned and the scheduler is
    /// left untouched.
    #[tracing::instrument(skip(self))]
    pub fn play(&mut self, statistic: &str) -> RaceResult<RunId> {
        let frames = self.frames(statistic)?;
        self.scheduler.start(statistic, frames)
    }

    /// Cancel the current run.
    pub fn stop(&mut self) -> bool {
        self.scheduler.cancel()
    }

    /// Block until the current run stops running.
    pub fn wait(&mut self) -> PlaybackState {
        self.scheduler.wait()
    }

    /// State of the current run.
    pub fn state(&self) -> PlaybackState {
        self.scheduler.state()
    }

    /// The underlying scheduler.
    pub fn scheduler(&self) -> &Scheduler<S> {
        &self.scheduler
    }

    /// The underlying scheduler, mutably.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<S> {
        &mut self.scheduler
    }
}

#[cfg(test)]
#[path = "../tests/unit/session/session.rs"]
mod tests;
