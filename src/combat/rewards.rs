//! Victory reward computation: experience, currency, rarity roll, and the
//! recruitment opportunity check.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::types::{Combatant, Difficulty, EncounterMeta, Phase};
use crate::constants::*;

/// Reward rarity tier, shared by every rollable reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RewardTier {
    Common,
    Magic,
    Rare,
    Epic,
    Legendary,
}

/// A defeated recruitable enemy the caller may offer to the player.
/// Recruitment itself is handled outside the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecruitOffer {
    pub unit_id: String,
    pub name: String,
    pub level: u32,
}

/// Terminal result published exactly once per battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub phase: Phase,
    pub experience: u64,
    pub currency: u64,
    pub reward_tier: Option<RewardTier>,
    pub recruit: Option<RecruitOffer>,
}

impl BattleOutcome {
    /// Outcome for Defeat/Fled terminals: nothing earned.
    pub fn empty(phase: Phase) -> Self {
        Self {
            phase,
            experience: 0,
            currency: 0,
            reward_tier: None,
            recruit: None,
        }
    }
}

/// Roll a reward tier from a uniform draw plus situational bonuses.
/// Thresholds: > 0.95 legendary, > 0.85 epic, > 0.65 rare, > 0.40 magic,
/// else common. Bonuses shift the draw upward, never past legendary.
pub fn roll_reward_tier(is_boss: bool, difficulty: Difficulty, rng: &mut impl Rng) -> RewardTier {
    let mut roll = rng.gen::<f64>();
    if is_boss {
        roll += REWARD_BOSS_BONUS;
    }
    roll += difficulty.ordinal() as f64 * REWARD_DIFFICULTY_BONUS_PER_RANK;

    if roll > RARITY_LEGENDARY_THRESHOLD {
        RewardTier::Legendary
    } else if roll > RARITY_EPIC_THRESHOLD {
        RewardTier::Epic
    } else if roll > RARITY_RARE_THRESHOLD {
        RewardTier::Rare
    } else if roll > RARITY_MAGIC_THRESHOLD {
        RewardTier::Magic
    } else {
        RewardTier::Common
    }
}

/// Compute the full victory reward from the defeated enemy roster.
pub fn victory_rewards(
    enemies: &[&Combatant],
    encounter: &EncounterMeta,
    rng: &mut impl Rng,
) -> BattleOutcome {
    let defeated: Vec<&&Combatant> = enemies.iter().filter(|e| e.is_defeated()).collect();
    let level_sum: u64 = defeated.iter().map(|e| e.level as u64).sum();

    let experience =
        (level_sum as f64 * XP_PER_ENEMY_LEVEL as f64 * encounter.difficulty.xp_multiplier()) as u64;
    let currency = (level_sum as f64
        * CURRENCY_PER_ENEMY_LEVEL as f64
        * encounter.difficulty.xp_multiplier()) as u64;

    let reward_tier = Some(roll_reward_tier(encounter.is_boss, encounter.difficulty, rng));

    // Independent recruitment roll if any defeated enemy is recruitable
    let recruit = defeated
        .iter()
        .find(|e| e.recruitable)
        .filter(|_| rng.gen::<f64>() < RECRUIT_BASE_CHANCE)
        .map(|e| RecruitOffer {
            unit_id: e.unit_id.clone(),
            name: e.name.clone(),
            level: e.level,
        });

    BattleOutcome {
        phase: Phase::Victory,
        experience,
        currency,
        reward_tier,
        recruit,
    }
}
