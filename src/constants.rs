//! Tunable battle constants.
//!
//! Every magic number in the engine lives here so balance passes never
//! touch resolution logic. The damage formula, ATB fill rate, and flee
//! curve are documented contracts; the exact values are configuration.

// ATB turn scheduling
pub const ATB_GAUGE_THRESHOLD: f64 = 100.0;
pub const ATB_FILL_RATE: f64 = 4.0;

// Damage resolution
pub const BASIC_ATTACK_POWER: f64 = 1.0;
pub const MIN_DAMAGE: u32 = 1;
pub const CRIT_MULTIPLIER: f64 = 2.0;
pub const ELEMENT_WEAKNESS_MULT: f64 = 1.5;
pub const ELEMENT_RESIST_MULT: f64 = 0.5;
pub const BACK_ROW_DAMAGE_DEALT_MULT: f64 = 0.75;
pub const BACK_ROW_DAMAGE_TAKEN_MULT: f64 = 0.75;
pub const DEFEND_DAMAGE_TAKEN_MULT: f64 = 0.5;

// Restorative abilities (self/ally target) heal attack * power * this factor
pub const HEAL_POWER_FACTOR: f64 = 1.0;

// Flee: base + factor * (actor speed - fastest living enemy speed), clamped
pub const FLEE_BASE_CHANCE: f64 = 0.5;
pub const FLEE_SPEED_FACTOR: f64 = 0.04;
pub const FLEE_MIN_CHANCE: f64 = 0.10;
pub const FLEE_MAX_CHANCE: f64 = 0.95;

// Companion Gravitation intervention
pub const GRAVITATION_CHECK_INTERVAL_SECONDS: f64 = 1.0;
pub const GRAVITATION_TRIGGER_CHANCE: f64 = 0.15;
pub const GRAVITATION_ATTACK: u32 = 14;
pub const GRAVITATION_POWER: f64 = 1.25;
pub const GRAVITATION_CRIT_CHANCE: f64 = 0.10;
// Ally-misfire chance per stage: Normal, Flickering, Unstable, Corrupted
pub const GRAVITATION_ALLY_CHANCE: [f64; 4] = [0.0, 0.10, 0.25, 0.50];

// Rewards
pub const XP_PER_ENEMY_LEVEL: u64 = 12;
pub const CURRENCY_PER_ENEMY_LEVEL: u64 = 5;
pub const RECRUIT_BASE_CHANCE: f64 = 0.35;
pub const REWARD_BOSS_BONUS: f64 = 0.10;
pub const REWARD_DIFFICULTY_BONUS_PER_RANK: f64 = 0.02;

// Reward rarity breakpoints (roll + bonuses, uniform in [0, 1))
pub const RARITY_LEGENDARY_THRESHOLD: f64 = 0.95;
pub const RARITY_EPIC_THRESHOLD: f64 = 0.85;
pub const RARITY_RARE_THRESHOLD: f64 = 0.65;
pub const RARITY_MAGIC_THRESHOLD: f64 = 0.40;

// Seconds the terminal phase lingers before the outcome is published
pub const TERMINAL_LINGER_SECONDS: f64 = 1.5;

// Fallback Stray synthesis: (base, per-level step)
pub const FALLBACK_HP: (u32, u32) = (40, 8);
pub const FALLBACK_ATTACK: (u32, u32) = (8, 2);
pub const FALLBACK_DEFENSE: (u32, u32) = (2, 1);
pub const FALLBACK_SPEED: (u32, u32) = (8, 1);
pub const FALLBACK_ENERGY: (u32, u32) = (20, 4);
pub const FALLBACK_CRIT_CHANCE: f64 = 0.05;
