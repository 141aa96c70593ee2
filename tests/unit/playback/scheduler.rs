use super::*;
use crate::foundation::core::{BucketKey, FrameIndex};
use crate::playback::run::RunInfo;
use crate::playback::sink::{InMemorySink, SinkEvent};

const TICK: Duration = Duration::from_millis(5);

fn frames(prefix: &str, n: usize) -> Vec<Frame> {
    (0..n)
        .map(|i| Frame {
            bucket_key: BucketKey::Label(format!("{prefix}{i:03}")),
            ranked: vec![],
        })
        .collect()
}

#[test]
fn zero_delay_is_rejected() {
    let err = Scheduler::new(InMemorySink::new(), Duration::ZERO).err().unwrap();
    assert!(matches!(err, RaceError::InvalidConfig(_)));
}

#[test]
fn starts_idle() {
    let sched = Scheduler::new(InMemorySink::new(), TICK).unwrap();
    assert_eq!(sched.state(), PlaybackState::Idle);
    assert_eq!(sched.current_run(), None);
}

#[test]
fn first_frame_is_emitted_before_start_returns() {
    let mut sched = Scheduler::new(InMemorySink::new(), Duration::from_secs(60)).unwrap();
    let run = sched.start("goals", frames("p", 3)).unwrap();
    assert_eq!(sched.state(), PlaybackState::Running);
    sched.with_sink(|s| {
        assert!(matches!(&s.events()[0], SinkEvent::Begin(RunInfo { run: r, .. }) if *r == run));
        assert_eq!(s.frames_of(run).len(), 1);
    });
    assert!(sched.cancel());
}

#[test]
fn playback_emits_every_frame_in_order_then_finishes() {
    let mut sched = Scheduler::new(InMemorySink::new(), TICK).unwrap();
    let run = sched.start("goals", frames("p", 4)).unwrap();
    assert_eq!(sched.wait(), PlaybackState::Finished);

    sched.with_sink(|s| {
        let idx: Vec<FrameIndex> = s.frames().map(|(_, i, _)| i).collect();
        assert_eq!(idx, (0..4).map(FrameIndex).collect::<Vec<_>>());
        let keys: Vec<String> = s.frames_of(run).iter().map(|f| f.bucket_key.to_string()).collect();
        assert_eq!(keys, vec!["p000", "p001", "p002", "p003"]);
        assert_eq!(s.outcome_of(run), Some(PlaybackState::Finished));
    });
    assert!(!sched.cancel());
}

#[test]
fn cancel_right_after_start_keeps_only_the_first_frame() {
    let mut sched = Scheduler::new(InMemorySink::new(), Duration::from_millis(100)).unwrap();
    let run = sched.start("goals", frames("p", 5)).unwrap();
    assert!(sched.cancel());
    assert!(!sched.cancel());
    assert_eq!(sched.state(), PlaybackState::Cancelled);

    std::thread::sleep(Duration::from_millis(250));
    sched.with_sink(|s| {
        assert_eq!(s.frames_of(run).len(), 1);
        assert_eq!(s.outcome_of(run), Some(PlaybackState::Cancelled));
    });
}

#[test]
fn empty_frame_list_finishes_immediately() {
    let mut sched = Scheduler::new(InMemorySink::new(), TICK).unwrap();
    let run = sched.start("goals", vec![]).unwrap();
    assert_eq!(sched.state(), PlaybackState::Finished);
    assert_eq!(sched.wait(), PlaybackState::Finished);
    sched.with_sink(|s| {
        assert_eq!(s.events().len(), 2);
        assert_eq!(s.outcome_of(run), Some(PlaybackState::Finished));
    });
}

#[test]
fn restart_after_finish_gets_a_new_identity() {
    let mut sched = Scheduler::new(InMemorySink::new(), TICK).unwrap();
    let a = sched.start("goals", frames("a", 1)).unwrap();
    assert_eq!(sched.wait(), PlaybackState::Finished);
    let b = sched.start("goals", frames("b", 1)).unwrap();
    assert!(b > a);
    assert_eq!(sched.current_run(), Some(b));
    assert_eq!(sched.wait(), PlaybackState::Finished);
}

#[test]
fn superseded_run_never_emits_after_the_new_one_begins() {
    let mut sched = Scheduler::new(InMemorySink::new(), Duration::from_millis(1)).unwrap();
    let old = sched.start("goals", frames("old", 500)).unwrap();
    std::thread::sleep(Duration::from_millis(15));
    let new = sched.start("assists", frames("new", 3)).unwrap();
    assert_eq!(sched.wait(), PlaybackState::Finished);

    sched.with_sink(|s| {
        let begin_new = s
            .events()
            .iter()
            .position(|e| matches!(e, SinkEvent::Begin(info) if info.run == new))
            .unwrap();
        for e in &s.events()[begin_new..] {
            if let SinkEvent::Frame { run, .. } = e {
                assert_eq!(*run, new);
            }
        }
        assert_eq!(s.outcome_of(old), Some(PlaybackState::Cancelled));
        assert_eq!(s.frames_of(new).len(), 3);
        assert!(s.frames_of(old).len() < 500);
    });
}

struct FailingSink {
    fail_at: u64,
    seen: usize,
}

impl FrameSink for FailingSink {
    fn on_frame(&mut self, _run: RunId, idx: FrameIndex, _frame: &Frame) -> RaceResult<()> {
        if idx.0 == self.fail_at {
            return Err(RaceError::sink("display gone"));
        }
        self.seen += 1;
        Ok(())
    }
}

#[test]
fn sink_failure_on_a_later_frame_cancels_the_run() {
    let sink = FailingSink {
        fail_at: 2,
        seen: 0,
    };
    let mut sched = Scheduler::new(sink, TICK).unwrap();
    sched.start("goals", frames("p", 5)).unwrap();
    assert_eq!(sched.wait(), PlaybackState::Cancelled);
    assert_eq!(sched.with_sink(|s| s.seen), 2);
    assert!(matches!(sched.take_sink_error(), Some(RaceError::Sink(_))));
    assert!(sched.take_sink_error().is_none());
}

#[test]
fn sink_failure_on_the_first_frame_is_returned_by_start() {
    let sink = FailingSink {
        fail_at: 0,
        seen: 0,
    };
    let mut sched = Scheduler::new(sink, TICK).unwrap();
    assert!(sched.start("goals", frames("p", 5)).is_err());
    assert_eq!(sched.state(), PlaybackState::Cancelled);
}
