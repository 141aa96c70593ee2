use super::*;
use crate::aggregate::fold::AggregationMode;
use crate::foundation::error::RaceError;
use crate::observation::record::RawValue;
use crate::playback::sink::InMemorySink;

fn records() -> Vec<RawRecord> {
    vec![
        RawRecord::new("A", "goals", "2021-01-01", RawValue::Number(3.0)),
        RawRecord::new("B", "goals", "2021-01-01", RawValue::Number(5.0)),
        RawRecord::new("A", "goals", "2021-01-02", RawValue::Number(2.0)),
        RawRecord::new("B", "assists", "2021-01-02", RawValue::Text("x".into())),
    ]
}

fn fast(mode: AggregationMode) -> RaceConfig {
    RaceConfig {
        mode,
        frame_delay_ms: 5,
        ..RaceConfig::default()
    }
}

#[test]
fn from_records_reports_rejections() {
    let (sess, norm) =
        RaceSession::from_records(&records(), fast(AggregationMode::Snapshot), InMemorySink::new())
            .unwrap();
    assert_eq!(sess.observations().len(), 3);
    assert_eq!(norm.rejected_count(), 1);
    assert_eq!(norm.rejected[0].index, 3);
    assert_eq!(sess.statistics(), vec!["goals"]);
}

#[test]
fn invalid_config_fails_before_any_frame() {
    let cfg = RaceConfig {
        top_k: 0,
        ..RaceConfig::default()
    };
    let err = RaceSession::from_records(&records(), cfg, InMemorySink::new())
        .err()
        .unwrap();
    assert!(matches!(err, RaceError::InvalidConfig(_)));
}

#[test]
fn frames_follow_the_configured_mode() {
    let (sess, _) =
        RaceSession::from_records(&records(), fast(AggregationMode::Snapshot), InMemorySink::new())
            .unwrap();
    let frames = sess.frames("goals").unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1].entities().collect::<Vec<_>>(), vec!["A"]);
    assert_eq!(frames[1].max_value(), 2.0);
}

#[test]
fn empty_selection_leaves_the_current_run_alone() {
    let cfg = RaceConfig {
        frame_delay_ms: 60_000,
        ..RaceConfig::default()
    };
    let (mut sess, _) = RaceSession::from_records(&records(), cfg, InMemorySink::new()).unwrap();
    let run = sess.play("goals").unwrap();
    let err = sess.play("assists").unwrap_err();
    assert!(matches!(err, RaceError::EmptySelection { .. }));
    assert_eq!(sess.state(), PlaybackState::Running);
    assert_eq!(sess.scheduler().current_run(), Some(run));
    assert!(sess.stop());
}

#[test]
fn play_runs_to_completion() {
    let (mut sess, _) = RaceSession::from_records(
        &records(),
        fast(AggregationMode::Cumulative),
        InMemorySink::new(),
    )
    .unwrap();
    let run = sess.play("goals").unwrap();
    assert_eq!(sess.wait(), PlaybackState::Finished);
    let count = sess.scheduler().with_sink(|s| s.frames_of(run).len());
    assert_eq!(count, 2);
}
