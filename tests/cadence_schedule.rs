use std::time::{Duration, Instant};
use tally::cadence::{CadenceScheduler, CheckpointCadence, SummaryCadence};
use tally::config::CadenceConfig;
use tally::report::{ProgressReporter, ReportContext, StepSnapshot};
use tally::TallyError;

/// Threshold 1000, epoch 1000: 999 does not fire, 1000 fires and moves the
/// threshold to 2000.
#[test]
fn checkpoint_fires_when_threshold_reached() {
    let mut cadence = CheckpointCadence::starting_at(1000, 1000).unwrap();

    assert!(!cadence.should_save(999));
    assert_eq!(cadence.next_save_step(), 1000);

    assert!(cadence.should_save(1000));
    assert_eq!(cadence.next_save_step(), 2000);
}

/// Over an increasing step sequence the cadence fires once per crossed
/// multiple of `epoch_len` and the threshold never moves back.
#[test]
fn checkpoint_cadence_is_monotonic() {
    let epoch_len = 250;
    let mut cadence = CheckpointCadence::starting_at(epoch_len, epoch_len).unwrap();
    let mut last_threshold = cadence.next_save_step();
    let mut fired = Vec::new();

    for step in (0..=2_000u64).step_by(8) {
        if cadence.should_save(step) {
            fired.push(step);
        }
        assert!(cadence.next_save_step() >= last_threshold);
        last_threshold = cadence.next_save_step();
    }

    // First step at or past each multiple of 250
    assert_eq!(fired, vec![256, 504, 752, 1000, 1256, 1504, 1752, 2000]);
}

/// Fast-forwarding twice with the same start gives the same threshold.
#[test]
fn resume_fast_forward_is_idempotent() {
    for initial in [1u64, 999, 1000, 1001, 123_456] {
        let mut once = CheckpointCadence::new(1000).unwrap();
        once.fast_forward(initial);
        let mut twice = once.clone();
        twice.fast_forward(initial);

        assert_eq!(once.next_save_step(), twice.next_save_step());
        assert!(once.next_save_step() > initial);
        assert!(once.next_save_step() - initial <= 1000);
    }
}

/// Zero epoch length or an unusable summary period fail at construction.
#[test]
fn degenerate_cadence_fails_fast() {
    for (epoch_len, secs) in [(0, 1.0), (100, 0.0), (100, -3.0), (100, 1e20)] {
        let err = CadenceScheduler::new(&CadenceConfig {
            epoch_len,
            summary_frequency_secs: secs,
        })
        .unwrap_err();
        assert!(
            matches!(err, TallyError::DegenerateCadence(_)),
            "epoch_len={epoch_len} secs={secs}: got {err:?}"
        );
    }
}

/// The summary trigger is wall-clock based and self-resetting.
#[test]
fn summary_cadence_rate_limits() {
    let start = Instant::now();
    let mut cadence = SummaryCadence::starting_at(1.0, start).unwrap();

    let fired = (1..=40u64)
        .map(|i| start + Duration::from_millis(i * 100))
        .filter(|&now| cadence.should_summarize(now))
        .count();

    // Fires at 1.1s, 2.2s, 3.3s
    assert_eq!(fired, 3);
}

/// An empty completion list produces no report.
#[test]
fn empty_completions_report_nothing() {
    let reporter = ProgressReporter::new();
    assert_eq!(
        reporter.report(&[], StepSnapshot::single(100, 0), ReportContext::Single),
        None
    );
}
