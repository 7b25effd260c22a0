use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tally::env::{EnvironmentBatch, StepInfo, VecEnv};
use tally::episode::{EvaluationAccumulator, RewardAccumulator};
use tally::eval::EvaluationDriver;
use tally::sim::{Countdown, LinearController, LinearParams, RandomPolicy};
use tally::TallyError;

/// One random lockstep step: rewards, terminals and infos for `n` slots.
fn random_step(rng: &mut StdRng, n: usize) -> (Vec<f64>, Vec<bool>, Vec<StepInfo>) {
    let rewards = (0..n).map(|_| rng.gen_range(-1.0..2.0)).collect();
    let terminals: Vec<bool> = (0..n).map(|_| rng.gen_bool(0.2)).collect();
    let infos = terminals
        .iter()
        .map(|&t| {
            if t && rng.gen_bool(0.5) {
                StepInfo::with("episode", true)
            } else {
                StepInfo::empty()
            }
        })
        .collect();
    (rewards, terminals, infos)
}

/// Emitted episode rewards plus what is still buffered equals everything
/// ingested, per slot.
#[test]
fn training_mode_conserves_reward() {
    let mut rng = StdRng::seed_from_u64(17);

    for n in [1usize, 3, 8] {
        let mut acc = RewardAccumulator::new(n);
        let mut ingested = vec![0.0; n];
        let mut emitted = vec![0.0; n];

        for _ in 0..500 {
            let (rewards, terminals, infos) = random_step(&mut rng, n);
            for (total, r) in ingested.iter_mut().zip(&rewards) {
                *total += r;
            }

            let completed = acc.ingest(&rewards, &terminals, &infos).unwrap();
            let finished: Vec<usize> = (0..n)
                .filter(|&i| terminals[i] && !infos[i].is_empty())
                .collect();
            assert_eq!(completed.len(), finished.len());
            for (slot, reward) in finished.iter().zip(&completed.rewards) {
                emitted[*slot] += reward;
            }
        }

        for slot in 0..n {
            let accounted = emitted[slot] + acc.buffer().get(slot);
            assert!(
                (accounted - ingested[slot]).abs() < 1e-9,
                "slot {slot}: {accounted} != {}",
                ingested[slot]
            );
        }
        assert_eq!(acc.local_step_count(), 500 * n as u64);
    }
}

/// Each slot reports exactly once and its score stops changing afterwards.
#[test]
fn evaluation_mode_reports_each_slot_once() {
    let mut rng = StdRng::seed_from_u64(5);
    let n = 6;
    let mut acc = EvaluationAccumulator::new(n);
    let mut reported = 0;
    let mut frozen: Vec<Option<f64>> = vec![None; n];

    for _ in 0..400 {
        let (rewards, terminals, infos) = random_step(&mut rng, n);
        reported += acc.ingest(&rewards, &terminals, &infos).unwrap().len();

        for slot in 0..n {
            if let Some(score) = frozen[slot] {
                assert_eq!(acc.buffer().get(slot), score, "slot {slot} changed after completing");
            } else if acc.completion_status()[slot] {
                frozen[slot] = Some(acc.buffer().get(slot));
            }
        }
    }

    assert!(acc.is_complete(), "400 steps should finish every slot");
    assert_eq!(reported, n);
    assert_eq!(acc.final_rewards().unwrap().len(), n);
}

/// A terminal flag without info neither resets nor completes.
#[test]
fn terminal_without_info_is_not_a_completion() {
    let mut training = RewardAccumulator::new(1);
    let mut evaluation = EvaluationAccumulator::new(1);

    for (reward, terminal) in [(1.0, false), (2.0, true), (3.0, false)] {
        let infos = [StepInfo::empty()];
        assert!(training.ingest(&[reward], &[terminal], &infos).unwrap().is_empty());
        assert!(evaluation.ingest(&[reward], &[terminal], &infos).unwrap().is_empty());
    }

    assert_eq!(training.buffer().get(0), 6.0);
    assert_eq!(evaluation.buffer().get(0), 6.0);
    assert!(!evaluation.is_complete());
}

/// Mismatched batch vectors fail instead of being truncated.
#[test]
fn length_mismatch_is_rejected() {
    let mut acc = RewardAccumulator::new(2);
    let err = acc
        .ingest(&[1.0, 2.0], &[false], &[StepInfo::empty(), StepInfo::empty()])
        .unwrap_err();
    assert!(
        matches!(
            err,
            TallyError::InvalidBatchSize {
                field: "terminals",
                expected: 2,
                actual: 1
            }
        ),
        "got {err:?}"
    );
    assert_eq!(acc.local_step_count(), 0);
}

/// Life losses must not end an evaluation episode early: the score covers
/// every life.
#[test]
fn evaluation_pass_spans_all_lives() {
    let mut env = VecEnv::from_fn(3, |_| Countdown::new(3, 4));
    let mut always_score = LinearController::from_params(LinearParams {
        weight: vec![0.0, 0.0],
        bias: 1.0,
    });

    let outcome = EvaluationDriver::new(&mut env, &mut always_score)
        .run()
        .unwrap();

    assert_eq!(outcome.rewards, vec![12.0, 12.0, 12.0]);
    assert_eq!(outcome.mean, 12.0);
    assert_eq!(outcome.std_dev, 0.0);
    assert_eq!(outcome.steps, 12);
}

/// An evaluation pass on a batch left mid-game starts every slot from a
/// full set of lives.
#[test]
fn evaluation_pass_resets_partly_played_batch() {
    let mut env = VecEnv::from_fn(2, |_| Countdown::new(3, 4));
    env.reset().unwrap();
    for _ in 0..6 {
        let batch = env.step(&[1, 1]).unwrap();
        assert!(batch.infos.iter().all(|info| info.is_empty()));
    }
    assert!(env.envs().iter().all(|slot| slot.lives_left() == 2));

    let mut always_score = LinearController::from_params(LinearParams {
        weight: vec![0.0, 0.0],
        bias: 1.0,
    });
    let outcome = EvaluationDriver::new(&mut env, &mut always_score)
        .run()
        .unwrap();

    assert_eq!(outcome.rewards, vec![12.0, 12.0]);
    assert_eq!(outcome.steps, 12);
}

/// A random baseline finishes one full game per slot with a score between
/// zero and the maximum.
#[test]
fn random_baseline_evaluation_is_bounded() {
    let mut env = VecEnv::from_fn(4, |_| Countdown::new(3, 4));
    let max_score = env.envs()[0].max_score();
    let mut baseline: RandomPolicy<Vec<f64>> = RandomPolicy::new(2, 9);

    let outcome = EvaluationDriver::new(&mut env, &mut baseline)
        .run()
        .unwrap();

    assert_eq!(outcome.steps, 12);
    assert_eq!(outcome.rewards.len(), 4);
    for score in &outcome.rewards {
        assert!(
            (0.0..=max_score).contains(score) && score.fract() == 0.0,
            "got score {score}"
        );
    }
}
