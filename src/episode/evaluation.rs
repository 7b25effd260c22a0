//! Once-per-slot reward counting for evaluation passes.

use super::accumulator::{validate_inputs, Completed};
use super::buffer::RewardBuffer;
use crate::env::{ends_episode, StepInfo};
use crate::error::Result;

/// Reward sums for an evaluation pass where each slot scores exactly one
/// episode.
///
/// A slot's final value is its cumulative reward up to and including its
/// first completing step. After that the slot is frozen: later rewards are
/// discarded and no further completion is reported for it.
#[derive(Debug, Clone)]
pub struct EvaluationAccumulator {
    buffer: RewardBuffer,
    complete: Vec<bool>,
}

impl EvaluationAccumulator {
    pub fn new(nb_env: usize) -> Self {
        Self {
            buffer: RewardBuffer::new(nb_env),
            complete: vec![false; nb_env],
        }
    }

    pub fn nb_env(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &RewardBuffer {
        &self.buffer
    }

    pub fn completion_status(&self) -> &[bool] {
        &self.complete
    }

    pub fn completed_count(&self) -> usize {
        self.complete.iter().filter(|&&c| c).count()
    }

    /// True once every slot has reported its episode
    pub fn is_complete(&self) -> bool {
        self.complete.iter().all(|&c| c)
    }

    /// Final per-slot scores, available only once every slot is complete
    pub fn final_rewards(&self) -> Option<&[f64]> {
        self.is_complete().then(|| self.buffer.values())
    }

    /// Add one step of rewards; returns the slots that completed on this step.
    pub fn ingest(
        &mut self,
        rewards: &[f64],
        terminals: &[bool],
        infos: &[StepInfo],
    ) -> Result<Completed> {
        validate_inputs(self.nb_env(), rewards, terminals, infos)?;

        let mut newly = Completed::default();
        for slot in 0..self.nb_env() {
            if self.complete[slot] {
                continue;
            }
            self.buffer.add(slot, rewards[slot]);
            if ends_episode(terminals[slot], &infos[slot]) {
                self.complete[slot] = true;
                newly.rewards.push(self.buffer.get(slot));
                newly.infos.push(infos[slot].clone());
            }
        }
        Ok(newly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done(tag: &str) -> StepInfo {
        StepInfo::with("tag", tag)
    }

    #[test]
    fn test_two_slot_pass() {
        let mut acc = EvaluationAccumulator::new(2);
        let none = StepInfo::empty();

        acc.ingest(&[1.0, 1.0], &[false, false], &[none.clone(), none.clone()])
            .unwrap();
        let c = acc
            .ingest(&[2.0, 3.0], &[true, false], &[done("x"), none.clone()])
            .unwrap();
        assert_eq!(c.rewards, vec![3.0]);
        assert!(!acc.is_complete());
        assert_eq!(acc.final_rewards(), None);

        let c = acc
            .ingest(&[0.0, 5.0], &[false, true], &[none.clone(), done("y")])
            .unwrap();
        assert_eq!(c.rewards, vec![9.0]);
        assert!(acc.is_complete());
        assert_eq!(acc.final_rewards(), Some(&[3.0, 9.0][..]));
        assert_eq!(acc.buffer().mean(), Some(6.0));
    }

    #[test]
    fn test_frozen_slot_discards_rewards() {
        let mut acc = EvaluationAccumulator::new(2);
        let none = StepInfo::empty();

        acc.ingest(&[4.0, 1.0], &[true, false], &[done("a"), none.clone()])
            .unwrap();
        for _ in 0..5 {
            let c = acc
                .ingest(&[100.0, 1.0], &[true, false], &[done("again"), none.clone()])
                .unwrap();
            assert!(c.is_empty(), "frozen slot must not complete twice");
        }

        assert_eq!(acc.buffer().get(0), 4.0);
        assert_eq!(acc.buffer().get(1), 6.0);
        assert_eq!(acc.completed_count(), 1);
    }

    #[test]
    fn test_terminal_without_info_is_not_completion() {
        let mut acc = EvaluationAccumulator::new(1);
        let none = StepInfo::empty();

        for (r, t) in [(1.0, false), (2.0, true), (3.0, false)] {
            acc.ingest(&[r], &[t], &[none.clone()]).unwrap();
        }
        assert_eq!(acc.buffer().get(0), 6.0);
        assert_eq!(acc.completion_status(), &[false]);
    }

    #[test]
    fn test_exactly_one_entry_per_slot() {
        let n = 5;
        let mut acc = EvaluationAccumulator::new(n);
        let mut reported = 0;

        // slot i finishes every (i + 2) steps
        for step in 1..=40usize {
            let terminals: Vec<bool> = (0..n).map(|i| step % (i + 2) == 0).collect();
            let infos: Vec<StepInfo> = terminals
                .iter()
                .map(|&t| if t { done("ep") } else { StepInfo::empty() })
                .collect();
            reported += acc.ingest(&vec![1.0; n], &terminals, &infos).unwrap().len();
        }

        assert!(acc.is_complete());
        assert_eq!(reported, n);
        let expected: Vec<f64> = (0..n).map(|i| (i + 2) as f64).collect();
        assert_eq!(acc.final_rewards().unwrap(), expected.as_slice());
    }
}
