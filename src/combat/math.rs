//! Pure combat math shared by the engine and the simulator.
//!
//! These functions compute outcomes without touching battle state, so the
//! damage formula and flee curve can be tested in isolation.

use rand::Rng;

use crate::combat::types::{Combatant, Element, Row};
use crate::constants::*;

/// Result of one resolved strike.
#[derive(Debug, Clone, Copy)]
pub struct AttackOutcome {
    pub damage: u32,
    pub was_crit: bool,
}

/// Elemental multiplier from the target's weakness/resistance tables.
/// Weakness wins if an element somehow appears in both lists.
pub fn elemental_multiplier(element: Element, weaknesses: &[Element], resistances: &[Element]) -> f64 {
    if element == Element::Neutral {
        return 1.0;
    }
    if weaknesses.contains(&element) {
        ELEMENT_WEAKNESS_MULT
    } else if resistances.contains(&element) {
        ELEMENT_RESIST_MULT
    } else {
        1.0
    }
}

pub fn row_damage_dealt_multiplier(row: Row) -> f64 {
    match row {
        Row::Front => 1.0,
        Row::Back => BACK_ROW_DAMAGE_DEALT_MULT,
    }
}

pub fn row_damage_taken_multiplier(row: Row) -> f64 {
    match row {
        Row::Front => 1.0,
        Row::Back => BACK_ROW_DAMAGE_TAKEN_MULT,
    }
}

pub fn roll_crit(crit_chance: f64, rng: &mut impl Rng) -> bool {
    rng.gen::<f64>() < crit_chance
}

/// Full damage pipeline: raw attack * power, elemental and row modifiers,
/// defend mitigation, defense subtraction, min-1 clamp, then the crit
/// multiplier on the final value.
pub fn resolve_strike(
    attack: u32,
    power: f64,
    element: Element,
    attacker_row: Row,
    crit_chance: f64,
    target: &Combatant,
    rng: &mut impl Rng,
) -> AttackOutcome {
    let raw = attack as f64 * power;
    let elem = elemental_multiplier(element, &target.weaknesses, &target.resistances);
    let dealt = row_damage_dealt_multiplier(attacker_row);
    let taken = row_damage_taken_multiplier(target.row);
    let guard = if target.is_defending {
        DEFEND_DAMAGE_TAKEN_MULT
    } else {
        1.0
    };

    let mitigated = raw * elem * dealt * taken * guard - target.defense as f64;
    let mut damage = (mitigated.max(MIN_DAMAGE as f64)) as u32;

    let was_crit = roll_crit(crit_chance, rng);
    if was_crit {
        damage = (damage as f64 * CRIT_MULTIPLIER) as u32;
    }

    AttackOutcome { damage, was_crit }
}

/// Healing from a restorative ability: attack * power * factor.
pub fn resolve_heal(attack: u32, power: f64) -> u32 {
    (attack as f64 * power * HEAL_POWER_FACTOR).max(1.0) as u32
}

/// Flee success chance: monotonic in the actor's speed advantage over the
/// fastest living enemy, clamped to the configured floor/ceiling.
pub fn flee_chance(actor_speed: u32, fastest_enemy_speed: u32) -> f64 {
    let advantage = actor_speed as f64 - fastest_enemy_speed as f64;
    (FLEE_BASE_CHANCE + FLEE_SPEED_FACTOR * advantage).clamp(FLEE_MIN_CHANCE, FLEE_MAX_CHANCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::types::Side;
    use crate::units;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn target_with(
        defense: u32,
        row: Row,
        defending: bool,
        weaknesses: Vec<Element>,
        resistances: Vec<Element>,
    ) -> Combatant {
        let mut unit = units::fallback("dummy", 1);
        unit.defense = defense;
        unit.row = row;
        unit.weaknesses = weaknesses;
        unit.resistances = resistances;
        let mut c = Combatant::from_unit(&unit, Side::Enemy);
        c.is_defending = defending;
        c
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    #[test]
    fn test_elemental_multiplier() {
        let weak = vec![Element::Fire];
        let resist = vec![Element::Ice];
        assert_eq!(elemental_multiplier(Element::Fire, &weak, &resist), ELEMENT_WEAKNESS_MULT);
        assert_eq!(elemental_multiplier(Element::Ice, &weak, &resist), ELEMENT_RESIST_MULT);
        assert_eq!(elemental_multiplier(Element::Storm, &weak, &resist), 1.0);
        assert_eq!(elemental_multiplier(Element::Neutral, &weak, &resist), 1.0);
    }

    #[test]
    fn test_row_multipliers() {
        assert_eq!(row_damage_dealt_multiplier(Row::Front), 1.0);
        assert!(row_damage_dealt_multiplier(Row::Back) < 1.0);
        assert_eq!(row_damage_taken_multiplier(Row::Front), 1.0);
        assert!(row_damage_taken_multiplier(Row::Back) < 1.0);
    }

    #[test]
    fn test_strike_baseline_damage() {
        // 20 attack * 1.0 power, no modifiers, 0 defense, 0% crit -> 20
        let target = target_with(0, Row::Front, false, vec![], vec![]);
        let out = resolve_strike(20, 1.0, Element::Neutral, Row::Front, 0.0, &target, &mut rng());
        assert_eq!(out.damage, 20);
        assert!(!out.was_crit);
    }

    #[test]
    fn test_strike_subtracts_defense() {
        let target = target_with(5, Row::Front, false, vec![], vec![]);
        let out = resolve_strike(20, 1.0, Element::Neutral, Row::Front, 0.0, &target, &mut rng());
        assert_eq!(out.damage, 15);
    }

    #[test]
    fn test_strike_minimum_one_damage() {
        let target = target_with(500, Row::Front, false, vec![], vec![]);
        let out = resolve_strike(5, 1.0, Element::Neutral, Row::Front, 0.0, &target, &mut rng());
        assert_eq!(out.damage, MIN_DAMAGE);
    }

    #[test]
    fn test_strike_weakness_amplifies() {
        let neutral = target_with(0, Row::Front, false, vec![], vec![]);
        let weak = target_with(0, Row::Front, false, vec![Element::Fire], vec![]);
        let base = resolve_strike(20, 1.0, Element::Fire, Row::Front, 0.0, &neutral, &mut rng());
        let amped = resolve_strike(20, 1.0, Element::Fire, Row::Front, 0.0, &weak, &mut rng());
        assert!(amped.damage > base.damage);
        assert_eq!(amped.damage, (20.0 * ELEMENT_WEAKNESS_MULT) as u32);
    }

    #[test]
    fn test_strike_back_row_reduces_both_ways() {
        let front = target_with(0, Row::Front, false, vec![], vec![]);
        let back = target_with(0, Row::Back, false, vec![], vec![]);

        let from_back =
            resolve_strike(20, 1.0, Element::Neutral, Row::Back, 0.0, &front, &mut rng());
        assert_eq!(from_back.damage, (20.0 * BACK_ROW_DAMAGE_DEALT_MULT) as u32);

        let into_back =
            resolve_strike(20, 1.0, Element::Neutral, Row::Front, 0.0, &back, &mut rng());
        assert_eq!(into_back.damage, (20.0 * BACK_ROW_DAMAGE_TAKEN_MULT) as u32);
    }

    #[test]
    fn test_strike_defend_halves() {
        let guarded = target_with(0, Row::Front, true, vec![], vec![]);
        let out = resolve_strike(20, 1.0, Element::Neutral, Row::Front, 0.0, &guarded, &mut rng());
        assert_eq!(out.damage, (20.0 * DEFEND_DAMAGE_TAKEN_MULT) as u32);
    }

    #[test]
    fn test_strike_crit_multiplies_final() {
        let target = target_with(0, Row::Front, false, vec![], vec![]);
        let out = resolve_strike(20, 1.0, Element::Neutral, Row::Front, 1.0, &target, &mut rng());
        assert!(out.was_crit);
        assert_eq!(out.damage, (20.0 * CRIT_MULTIPLIER) as u32);
    }

    #[test]
    fn test_roll_crit_extremes() {
        let mut r = rng();
        for _ in 0..10 {
            assert!(roll_crit(1.0, &mut r));
            assert!(!roll_crit(0.0, &mut r));
        }
    }

    #[test]
    fn test_resolve_heal() {
        assert_eq!(resolve_heal(10, 1.2), (12.0 * HEAL_POWER_FACTOR) as u32);
        // Never heals zero
        assert!(resolve_heal(0, 0.1) >= 1);
    }

    #[test]
    fn test_flee_chance_monotonic_and_clamped() {
        let slow = flee_chance(5, 20);
        let even = flee_chance(20, 20);
        let fast = flee_chance(35, 20);
        assert!(slow < even);
        assert!(even < fast);
        assert!(flee_chance(0, 200) >= FLEE_MIN_CHANCE);
        assert!(flee_chance(200, 0) <= FLEE_MAX_CHANCE);
    }
}
