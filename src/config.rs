use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::aggregate::bucket::Granularity;
use crate::aggregate::fold::AggregationMode;
use crate::foundation::error::{RaceError, RaceResult};
use crate::rank::ranker::DEFAULT_TOP_K;

const DEFAULT_FRAME_DELAY_MS: u64 = 1500;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_frame_delay_ms() -> u64 {
    DEFAULT_FRAME_DELAY_MS
}

/// Playback options. Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RaceConfig {
    /// Snapshot or cumulative aggregation.
    #[serde(default)]
    pub mode: AggregationMode,
    /// Leaderboard length per frame.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Time each frame stays on screen.
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u64,
    /// Bucketing granularity.
    #[serde(default)]
    pub granularity: Granularity,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            mode: AggregationMode::default(),
            top_k: DEFAULT_TOP_K,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            granularity: Granularity::default(),
        }
    }
}

impl RaceConfig {
    /// Reject configurations that could not produce a playback.
    pub fn validate(&self) -> RaceResult<()> {
        if self.top_k == 0 {
            return Err(RaceError::invalid_config("top_k must be > 0"));
        }
        if self.frame_delay_ms == 0 {
            return Err(RaceError::invalid_config("frame_delay_ms must be > 0"));
        }
        Ok(())
    }

    /// Inter-frame delay as a [`Duration`].
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    /// Parse and validate a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> RaceResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| RaceError::serde(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> RaceResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            RaceError::serde(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
