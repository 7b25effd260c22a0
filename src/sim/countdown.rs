//! Lives-based toy environment.
//!
//! Losing a life is reported as `terminal` with an empty info and the
//! restart that follows only restores the life timer. The episode really
//! ends when the last life is lost; that step carries an info. `reset`
//! always starts a new game with every life.

use crate::env::{Environment, Step, StepInfo};
use crate::error::{Result, TallyError};

/// Each life lasts `life_len` steps. Action 1 scores 1, action 0 scores 0.
#[derive(Debug, Clone)]
pub struct Countdown {
    lives: u32,
    life_len: u32,
    lives_left: u32,
    remaining: u32,
}

impl Countdown {
    pub fn new(lives: u32, life_len: u32) -> Self {
        let lives = lives.max(1);
        let life_len = life_len.max(1);
        Self {
            lives,
            life_len,
            lives_left: lives,
            remaining: life_len,
        }
    }

    pub fn lives_left(&self) -> u32 {
        self.lives_left
    }

    /// Highest score an episode can reach
    pub fn max_score(&self) -> f64 {
        f64::from(self.lives * self.life_len)
    }

    fn observation(&self) -> Vec<f64> {
        vec![f64::from(self.remaining), f64::from(self.lives_left)]
    }
}

impl Environment for Countdown {
    type Observation = Vec<f64>;
    type Action = usize;

    fn reset(&mut self) -> Result<Vec<f64>> {
        self.lives_left = self.lives;
        self.remaining = self.life_len;
        Ok(self.observation())
    }

    fn step(&mut self, action: usize) -> Result<Step<Vec<f64>>> {
        if self.remaining == 0 {
            return Err(TallyError::Environment(
                "countdown stepped after a terminal without reset".to_string(),
            ));
        }
        let reward = match action {
            0 => 0.0,
            1 => 1.0,
            other => {
                return Err(TallyError::Environment(format!(
                    "countdown action must be 0 or 1, got {other}"
                )))
            }
        };

        self.remaining -= 1;
        let life_lost = self.remaining == 0;
        if life_lost {
            self.lives_left -= 1;
        }

        let info = if life_lost && self.lives_left == 0 {
            StepInfo::with("lives", self.lives)
        } else {
            StepInfo::empty()
        };

        Ok(Step {
            obs: self.observation(),
            reward,
            terminal: life_lost,
            info,
        })
    }

    fn restart_after_terminal(&mut self) -> Result<Vec<f64>> {
        if self.lives_left == 0 {
            return self.reset();
        }
        self.remaining = self.life_len;
        Ok(self.observation())
    }
}
