use super::*;
use crate::foundation::core::BucketKey;

fn frames(n: usize) -> Vec<Frame> {
    (0..n)
        .map(|i| Frame {
            bucket_key: BucketKey::Label(format!("p{i}")),
            ranked: vec![],
        })
        .collect()
}

#[test]
fn run_walks_idle_running_finished() {
    let mut run = PlaybackRun::new(RunId(1), "goals", frames(2));
    assert_eq!(run.state(), PlaybackState::Idle);
    assert!(run.advance().is_none());

    let (idx, f) = run.begin().unwrap();
    assert_eq!(idx, FrameIndex(0));
    assert_eq!(f.bucket_key, BucketKey::Label("p0".into()));
    assert_eq!(run.state(), PlaybackState::Running);

    let (idx, _) = run.advance().unwrap();
    assert_eq!(idx, FrameIndex(1));
    assert_eq!(run.emitted(), 2);
    assert_eq!(run.state(), PlaybackState::Running);

    assert!(run.advance().is_none());
    assert_eq!(run.state(), PlaybackState::Finished);
    assert!(run.state().is_terminal());
    assert!(!run.cancel());
}

#[test]
fn empty_run_finishes_on_begin() {
    let mut run = PlaybackRun::new(RunId(1), "goals", vec![]);
    assert!(run.begin().is_none());
    assert_eq!(run.state(), PlaybackState::Finished);
}

#[test]
fn begin_is_only_valid_once() {
    let mut run = PlaybackRun::new(RunId(1), "goals", frames(3));
    assert!(run.begin().is_some());
    assert!(run.begin().is_none());
    assert_eq!(run.emitted(), 1);
}

#[test]
fn cancel_stops_emission_and_is_idempotent() {
    let mut run = PlaybackRun::new(RunId(1), "goals", frames(3));
    assert!(!run.cancel());
    run.begin();
    assert!(run.cancel());
    assert!(!run.cancel());
    assert_eq!(run.state(), PlaybackState::Cancelled);
    assert!(run.advance().is_none());
    assert_eq!(run.emitted(), 1);
}

#[test]
fn info_reports_delay_in_millis() {
    let run = PlaybackRun::new(RunId(4), "goals", frames(3));
    let info = run.info(Duration::from_millis(1500));
    assert_eq!(info.run, RunId(4));
    assert_eq!(info.statistic, "goals");
    assert_eq!(info.frame_count, 3);
    assert_eq!(info.frame_delay_ms, 1500);
}
