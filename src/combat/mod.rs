//! Battle system: the phase machine, combat math, and companion logic.

pub mod companion;
pub mod engine;
pub mod math;
pub mod rewards;
pub mod targeting;
pub mod types;

pub use engine::{BattleError, BattleState};
pub use rewards::{BattleOutcome, RecruitOffer, RewardTier};
pub use types::*;
