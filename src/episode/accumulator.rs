//! Continuous episode reward counting for training rollouts.

use super::buffer::{mean, RewardBuffer};
use crate::env::{ends_episode, EpisodeResult, StepInfo};
use crate::error::{ensure_batch_len, Result};

/// Episodes that finished during one ingest, in slot order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completed {
    pub rewards: Vec<f64>,
    pub infos: Vec<StepInfo>,
}

impl Completed {
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn mean_reward(&self) -> Option<f64> {
        mean(&self.rewards)
    }

    pub fn episodes(&self) -> impl Iterator<Item = EpisodeResult> + '_ {
        self.rewards
            .iter()
            .zip(&self.infos)
            .map(|(&reward, info)| EpisodeResult {
                reward,
                info: info.clone(),
            })
    }

    fn push(&mut self, reward: f64, info: &StepInfo) {
        self.rewards.push(reward);
        self.infos.push(info.clone());
    }
}

/// Check that all three per-slot inputs have `nb_env` entries.
pub(crate) fn validate_inputs(
    nb_env: usize,
    rewards: &[f64],
    terminals: &[bool],
    infos: &[StepInfo],
) -> Result<()> {
    ensure_batch_len("rewards", nb_env, rewards.len())?;
    ensure_batch_len("terminals", nb_env, terminals.len())?;
    ensure_batch_len("infos", nb_env, infos.len())
}

/// Running episode returns for a batch whose slots restart after every
/// episode.
///
/// Every completed episode is reported, so a slot may contribute many
/// rewards over a rollout. Each ingest also advances the local step count
/// by the batch size.
#[derive(Debug, Clone)]
pub struct RewardAccumulator {
    buffer: RewardBuffer,
    local_step_count: u64,
}

impl RewardAccumulator {
    pub fn new(nb_env: usize) -> Self {
        Self {
            buffer: RewardBuffer::new(nb_env),
            local_step_count: 0,
        }
    }

    pub fn nb_env(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &RewardBuffer {
        &self.buffer
    }

    pub fn local_step_count(&self) -> u64 {
        self.local_step_count
    }

    /// Start counting from an earlier run's step count
    pub fn set_local_step_count(&mut self, step_count: u64) {
        self.local_step_count = step_count;
    }

    /// Add one step of rewards and collect the episodes it completed.
    ///
    /// A slot completes when it is terminal AND its info is non-empty; its
    /// running sum (including this step's reward) is emitted and reset.
    /// Terminal slots with empty info keep accumulating.
    pub fn ingest(
        &mut self,
        rewards: &[f64],
        terminals: &[bool],
        infos: &[StepInfo],
    ) -> Result<Completed> {
        validate_inputs(self.nb_env(), rewards, terminals, infos)?;

        let mut completed = Completed::default();
        for slot in 0..self.nb_env() {
            self.buffer.add(slot, rewards[slot]);
            if ends_episode(terminals[slot], &infos[slot]) {
                completed.push(self.buffer.take(slot), &infos[slot]);
            }
        }

        self.local_step_count += self.nb_env() as u64;
        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TallyError;

    fn done() -> StepInfo {
        StepInfo::with("episode", true)
    }

    #[test]
    fn test_completion_emits_and_resets() {
        let mut acc = RewardAccumulator::new(2);
        let none = StepInfo::empty();

        let c = acc
            .ingest(&[1.0, 2.0], &[false, false], &[none.clone(), none.clone()])
            .unwrap();
        assert!(c.is_empty());

        let c = acc
            .ingest(&[3.0, 4.0], &[true, false], &[done(), none.clone()])
            .unwrap();
        assert_eq!(c.rewards, vec![4.0]);
        assert_eq!(c.infos, vec![done()]);
        assert_eq!(acc.buffer().values(), &[0.0, 6.0]);
        assert_eq!(acc.local_step_count(), 4);
    }

    #[test]
    fn test_terminal_without_info_keeps_accumulating() {
        let mut acc = RewardAccumulator::new(1);
        let none = StepInfo::empty();

        let mut completions = 0;
        for (r, t) in [(1.0, false), (2.0, true), (3.0, false)] {
            completions += acc.ingest(&[r], &[t], &[none.clone()]).unwrap().len();
        }

        assert_eq!(completions, 0);
        assert_eq!(acc.buffer().get(0), 6.0);
    }

    #[test]
    fn test_slot_can_complete_repeatedly() {
        let mut acc = RewardAccumulator::new(1);
        let mut all = Vec::new();
        for _ in 0..3 {
            let c = acc.ingest(&[2.0], &[true], &[done()]).unwrap();
            all.extend(c.rewards);
        }
        assert_eq!(all, vec![2.0, 2.0, 2.0]);
        assert_eq!(acc.local_step_count(), 3);
    }

    #[test]
    fn test_conservation_of_reward() {
        let mut acc = RewardAccumulator::new(3);
        let mut emitted = [0.0f64; 3];
        let mut ingested = [0.0f64; 3];

        for step in 0..50usize {
            let rewards: Vec<f64> = (0..3).map(|i| ((step * 7 + i * 3) % 5) as f64 - 1.5).collect();
            let terminals: Vec<bool> = (0..3).map(|i| (step + i) % 4 == 0).collect();
            let infos: Vec<StepInfo> = (0..3)
                .map(|i| if (step + i) % 8 == 0 { done() } else { StepInfo::empty() })
                .collect();

            for i in 0..3 {
                ingested[i] += rewards[i];
            }

            // completions come back in slot order
            let c = acc.ingest(&rewards, &terminals, &infos).unwrap();
            let mut it = c.rewards.iter();
            for i in 0..3 {
                if terminals[i] && !infos[i].is_empty() {
                    emitted[i] += it.next().unwrap();
                }
            }
        }

        for i in 0..3 {
            let total = emitted[i] + acc.buffer().get(i);
            assert!((total - ingested[i]).abs() < 1e-9, "slot {i}");
        }
    }

    #[test]
    fn test_length_mismatch_leaves_state_untouched() {
        let mut acc = RewardAccumulator::new(2);
        let err = acc
            .ingest(&[1.0], &[false, false], &[StepInfo::empty(), StepInfo::empty()])
            .unwrap_err();
        assert!(matches!(err, TallyError::InvalidBatchSize { field: "rewards", .. }));

        let err = acc
            .ingest(&[1.0, 1.0], &[false, false], &[StepInfo::empty()])
            .unwrap_err();
        assert!(matches!(err, TallyError::InvalidBatchSize { field: "infos", .. }));

        assert_eq!(acc.buffer().values(), &[0.0, 0.0]);
        assert_eq!(acc.local_step_count(), 0);
    }

    #[test]
    fn test_set_local_step_count() {
        let mut acc = RewardAccumulator::new(4);
        acc.set_local_step_count(1_000);
        acc.ingest(&[0.0; 4], &[false; 4], &vec![StepInfo::empty(); 4])
            .unwrap();
        assert_eq!(acc.local_step_count(), 1_004);
    }
}
