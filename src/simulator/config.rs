//! Simulation configuration.

use crate::combat::types::{Difficulty, GravitationStage};

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of battles to simulate
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Simulated seconds before a battle counts as timed out
    pub max_seconds_per_battle: f64,

    /// Party composition as (unit id, level) pairs
    pub party: Vec<(String, u32)>,

    /// Enemy composition as (unit id, level) pairs
    pub enemies: Vec<(String, u32)>,

    pub difficulty: Difficulty,
    pub is_boss: bool,

    /// Companion corruption stage, or None to fight without the companion
    pub companion_stage: Option<GravitationStage>,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per-battle)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 1000,
            seed: None,
            max_seconds_per_battle: 600.0,
            party: vec![("ashpup".to_string(), 3), ("marsh-wisp".to_string(), 3)],
            enemies: vec![
                ("hollow-shade".to_string(), 3),
                ("rust-golem".to_string(), 3),
            ],
            difficulty: Difficulty::Normal,
            is_boss: false,
            companion_stage: Some(GravitationStage::Normal),
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Quick config for a fast balance check
    pub fn quick_check() -> Self {
        Self {
            num_runs: 100,
            ..Default::default()
        }
    }

    /// Boss encounter at the given difficulty
    pub fn boss_gauntlet(difficulty: Difficulty) -> Self {
        Self {
            enemies: vec![
                ("rust-golem".to_string(), 6),
                ("hollow-shade".to_string(), 5),
            ],
            difficulty,
            is_boss: true,
            ..Default::default()
        }
    }

    /// Same fight at a different corruption stage, for sweeping the
    /// misfire impact
    pub fn at_stage(stage: GravitationStage) -> Self {
        Self {
            companion_stage: Some(stage),
            ..Default::default()
        }
    }
}
