//! Main simulation runner driving the real battle engine.
//!
//! Each battle is played by a simple scripted party: use the first ready
//! ability, otherwise basic attack. Statistics are collected from the
//! published `BattleOutcome` plus timing observed along the way.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::config::SimConfig;
use super::report::SimReport;
use crate::combat::engine::BattleState;
use crate::combat::rewards::RewardTier;
use crate::combat::types::{ActionType, Companion, EncounterMeta, Phase};
use crate::units;

/// Simulated frame length in seconds.
const SIM_STEP: f64 = 0.25;

/// Outcome of one simulated battle.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub phase: Phase,
    pub seconds: f64,
    pub player_turns: u32,
    pub experience: u64,
    pub currency: u64,
    pub reward_tier: Option<RewardTier>,
    pub recruit_offered: bool,
    pub party_survivors: u32,
    pub timed_out: bool,
}

/// Run the full simulation and return a report.
pub fn run_simulation(config: &SimConfig) -> SimReport {
    let mut all_runs = Vec::with_capacity(config.num_runs as usize);

    for run_idx in 0..config.num_runs {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed + run_idx as u64),
            None => StdRng::from_entropy(),
        };

        let run_stats = simulate_single_battle(config, &mut rng);

        if config.verbosity >= 2 {
            println!(
                "Battle {}/{} - {:?} in {:.1}s, {} turns, {} xp",
                run_idx + 1,
                config.num_runs,
                run_stats.phase,
                run_stats.seconds,
                run_stats.player_turns,
                run_stats.experience
            );
        }
        all_runs.push(run_stats);
    }

    SimReport::from_runs(all_runs)
}

fn simulate_single_battle(config: &SimConfig, rng: &mut impl Rng) -> RunStats {
    let party: Vec<(&str, u32)> = config
        .party
        .iter()
        .map(|(id, lvl)| (id.as_str(), *lvl))
        .collect();
    let enemies: Vec<(&str, u32)> = config
        .enemies
        .iter()
        .map(|(id, lvl)| (id.as_str(), *lvl))
        .collect();
    let encounter = EncounterMeta {
        difficulty: config.difficulty,
        is_boss: config.is_boss,
        companion: match config.companion_stage {
            Some(stage) => Companion::with_stage(stage),
            None => Companion::default(),
        },
    };

    let mut battle = BattleState::new(
        &units::roster_from_ids(&party),
        &units::roster_from_ids(&enemies),
        encounter,
    )
    .expect("simulation rosters are never empty");

    let mut seconds = 0.0;
    let mut player_turns = 0u32;
    let mut timed_out = false;

    loop {
        if battle.phase() == Phase::SelectingAction {
            player_turns += 1;
            play_turn(&mut battle, rng);
            continue;
        }
        if let Some(outcome) = battle.poll_outcome() {
            let survivors = battle
                .party()
                .iter()
                .filter(|p| p.is_active_in_battle())
                .count() as u32;
            return RunStats {
                phase: outcome.phase,
                seconds,
                player_turns,
                experience: outcome.experience,
                currency: outcome.currency,
                reward_tier: outcome.reward_tier,
                recruit_offered: outcome.recruit.is_some(),
                party_survivors: survivors,
                timed_out,
            };
        }
        if seconds > config.max_seconds_per_battle && !battle.phase().is_terminal() {
            timed_out = true;
            return RunStats {
                phase: battle.phase(),
                seconds,
                player_turns,
                experience: 0,
                currency: 0,
                reward_tier: None,
                recruit_offered: false,
                party_survivors: battle
                    .party()
                    .iter()
                    .filter(|p| p.is_active_in_battle())
                    .count() as u32,
                timed_out,
            };
        }
        battle.update(SIM_STEP, rng);
        seconds += SIM_STEP;
    }
}

/// Scripted party policy: first ready ability, else basic attack. The
/// engine seeds the target pointer, so confirming immediately hits the
/// first valid candidate.
fn play_turn(battle: &mut BattleState, rng: &mut impl Rng) {
    let ready_slot = battle
        .available_abilities()
        .iter()
        .position(|(_, ready)| *ready);

    match ready_slot {
        Some(slot) => {
            battle.select_action(ActionType::Ability, rng);
            battle.select_ability(slot, rng);
            if battle.phase() == Phase::SelectingTarget {
                battle.confirm_target(rng);
            }
        }
        None => battle.select_action(ActionType::Attack, rng),
    }
}
