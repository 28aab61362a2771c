//! Companion Gravitation interventions.
//!
//! While the battle is in its running phase the companion's presence is a
//! slow dice clock: every whole second it may lash out with a bonus
//! Gravitation strike, and the more corrupted the companion, the more
//! likely that strike lands on the party instead of the enemy line. The
//! controller knows nothing about whose turn is open; it only accumulates
//! time and rolls.

use rand::Rng;

use crate::combat::types::GravitationStage;
use crate::constants::*;

/// A single intervention decision: the strike fires at the enemy line,
/// or at the party on a misfire.
#[derive(Debug, Clone, Copy)]
pub struct Intervention {
    pub stage: GravitationStage,
    pub targets_ally: bool,
}

/// Accumulates running-phase time and rolls interventions at each whole
/// check-interval boundary crossed.
#[derive(Debug, Clone, Default)]
pub struct InterventionController {
    elapsed: f64,
}

impl InterventionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `dt` seconds of running-phase time and return
    /// every intervention that fired. Multiple boundaries can be crossed
    /// in one large step; each gets an independent trigger roll.
    pub fn advance(
        &mut self,
        dt: f64,
        stage: GravitationStage,
        rng: &mut impl Rng,
    ) -> Vec<Intervention> {
        self.elapsed += dt;
        let mut fired = Vec::new();
        while self.elapsed >= GRAVITATION_CHECK_INTERVAL_SECONDS {
            self.elapsed -= GRAVITATION_CHECK_INTERVAL_SECONDS;
            if rng.gen::<f64>() < GRAVITATION_TRIGGER_CHANCE {
                let targets_ally = rng.gen::<f64>() < stage.ally_target_chance();
                fired.push(Intervention {
                    stage,
                    targets_ally,
                });
            }
        }
        fired
    }
}
