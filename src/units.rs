//! Stray unit definitions consumed by the battle engine.
//!
//! The content layer normally ships these as data; the built-in catalog
//! covers the core cast and gives tests stable fixtures. Unknown ids fall
//! back to a synthesized generic Stray scaled by level, so a data-lookup
//! miss is never a battle-breaking error.

use serde::{Deserialize, Serialize};

use crate::combat::types::{Ability, Element, Row, TargetType};
use crate::constants::*;

/// Plain unit definition, snapshotted into a `Combatant` at battle start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitData {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub crit_chance: f64,
    pub max_energy: u32,
    pub row: Row,
    pub abilities: Vec<Ability>,
    pub weaknesses: Vec<Element>,
    pub resistances: Vec<Element>,
    pub recruitable: bool,
}

impl UnitData {
    /// Rescale a level-1 definition to the requested level using the
    /// shared per-level step table.
    pub fn at_level(mut self, level: u32) -> Self {
        let steps = level.saturating_sub(self.level);
        self.level = level;
        self.max_hp += steps * FALLBACK_HP.1;
        self.attack += steps * FALLBACK_ATTACK.1;
        self.defense += steps * FALLBACK_DEFENSE.1;
        self.speed += steps * FALLBACK_SPEED.1;
        self.max_energy += steps * FALLBACK_ENERGY.1;
        self
    }
}

fn ability(
    name: &str,
    description: &str,
    energy_cost: u32,
    cooldown_max: u32,
    element: Element,
    target_type: TargetType,
    power: f64,
) -> Ability {
    Ability {
        name: name.to_string(),
        description: description.to_string(),
        energy_cost,
        cooldown_max,
        element,
        target_type,
        power,
    }
}

/// Built-in Stray catalog. Level-1 baselines; callers rescale with
/// `at_level`.
pub fn lookup(id: &str) -> Option<UnitData> {
    let unit = match id {
        "ashpup" => UnitData {
            id: id.to_string(),
            name: "Ashpup".to_string(),
            level: 1,
            max_hp: 46,
            attack: 9,
            defense: 2,
            speed: 10,
            crit_chance: 0.08,
            max_energy: 24,
            row: Row::Front,
            abilities: vec![ability(
                "Ember Lash",
                "A whip of cinders that scorches one foe.",
                8,
                2,
                Element::Fire,
                TargetType::SingleEnemy,
                1.4,
            )],
            weaknesses: vec![Element::Ice],
            resistances: vec![Element::Fire],
            recruitable: true,
        },
        "marsh-wisp" => UnitData {
            id: id.to_string(),
            name: "Marsh Wisp".to_string(),
            level: 1,
            max_hp: 34,
            attack: 7,
            defense: 1,
            speed: 13,
            crit_chance: 0.05,
            max_energy: 32,
            row: Row::Back,
            abilities: vec![
                ability(
                    "Still Glow",
                    "A soft light that knits wounds closed.",
                    10,
                    2,
                    Element::Light,
                    TargetType::SingleAlly,
                    1.2,
                ),
                ability(
                    "Fen Spark",
                    "A crackling arc across every foe.",
                    14,
                    3,
                    Element::Storm,
                    TargetType::AllEnemies,
                    0.8,
                ),
            ],
            weaknesses: vec![Element::Shadow],
            resistances: vec![Element::Storm],
            recruitable: true,
        },
        "hollow-shade" => UnitData {
            id: id.to_string(),
            name: "Hollow Shade".to_string(),
            level: 1,
            max_hp: 40,
            attack: 11,
            defense: 1,
            speed: 9,
            crit_chance: 0.12,
            max_energy: 20,
            row: Row::Front,
            abilities: vec![ability(
                "Gloom Bite",
                "A lunge from the dark.",
                6,
                1,
                Element::Shadow,
                TargetType::SingleEnemy,
                1.3,
            )],
            weaknesses: vec![Element::Light],
            resistances: vec![Element::Shadow],
            recruitable: false,
        },
        "rust-golem" => UnitData {
            id: id.to_string(),
            name: "Rust Golem".to_string(),
            level: 1,
            max_hp: 70,
            attack: 8,
            defense: 6,
            speed: 5,
            crit_chance: 0.02,
            max_energy: 16,
            row: Row::Front,
            abilities: vec![ability(
                "Brace",
                "Locks joints and shrugs off the next blows.",
                4,
                3,
                Element::Neutral,
                TargetType::SelfOnly,
                0.6,
            )],
            weaknesses: vec![Element::Storm],
            resistances: vec![Element::Fire, Element::Ice],
            recruitable: false,
        },
        _ => return None,
    };
    Some(unit)
}

/// Synthesize a generic Stray scaled by level for ids the catalog does
/// not know. Keeps battles running when content and engine drift apart.
pub fn fallback(id: &str, level: u32) -> UnitData {
    let steps = level.saturating_sub(1);
    UnitData {
        id: id.to_string(),
        name: format!("Stray ({})", id),
        level,
        max_hp: FALLBACK_HP.0 + steps * FALLBACK_HP.1,
        attack: FALLBACK_ATTACK.0 + steps * FALLBACK_ATTACK.1,
        defense: FALLBACK_DEFENSE.0 + steps * FALLBACK_DEFENSE.1,
        speed: FALLBACK_SPEED.0 + steps * FALLBACK_SPEED.1,
        crit_chance: FALLBACK_CRIT_CHANCE,
        max_energy: FALLBACK_ENERGY.0 + steps * FALLBACK_ENERGY.1,
        row: Row::Front,
        abilities: Vec::new(),
        weaknesses: Vec::new(),
        resistances: Vec::new(),
        recruitable: false,
    }
}

/// Resolve an id to a definition at the given level, falling back to the
/// synthesized generic on a catalog miss.
pub fn resolve(id: &str, level: u32) -> UnitData {
    match lookup(id) {
        Some(unit) => unit.at_level(level),
        None => fallback(id, level),
    }
}

/// Build a roster from encounter composition (id, level) pairs.
pub fn roster_from_ids(specs: &[(&str, u32)]) -> Vec<UnitData> {
    specs.iter().map(|(id, level)| resolve(id, *level)).collect()
}
