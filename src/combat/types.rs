use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::*;
use crate::units::UnitData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Party,
    Enemy,
}

impl Side {
    pub fn opposing(self) -> Side {
        match self {
            Side::Party => Side::Enemy,
            Side::Enemy => Side::Party,
        }
    }
}

/// Front row is baseline; Back row deals and takes reduced damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Row {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    Neutral,
    Fire,
    Ice,
    Storm,
    Shadow,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    SingleEnemy,
    SingleAlly,
    AllEnemies,
    SelfOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    Attack,
    Ability,
    Defend,
    Flee,
    Gravitation,
}

/// Battle phase. Selection phases open only for party combatants;
/// Victory/Defeat/Fled are terminal and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    SelectingAction,
    SelectingAbility,
    SelectingTarget,
    Running,
    Victory,
    Defeat,
    Fled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Victory | Phase::Defeat | Phase::Fled)
    }

    pub fn is_selection(self) -> bool {
        matches!(
            self,
            Phase::SelectingAction | Phase::SelectingAbility | Phase::SelectingTarget
        )
    }
}

/// Companion corruption severity. Higher stages make the Gravitation
/// strike more likely to misfire into the party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GravitationStage {
    Normal,
    Flickering,
    Unstable,
    Corrupted,
}

impl GravitationStage {
    pub fn ally_target_chance(self) -> f64 {
        GRAVITATION_ALLY_CHANCE[self as usize]
    }
}

/// Companion presence and corruption, consumed from the roster layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Companion {
    pub present: bool,
    pub stage: GravitationStage,
}

impl Default for Companion {
    fn default() -> Self {
        Self {
            present: false,
            stage: GravitationStage::Normal,
        }
    }
}

impl Companion {
    pub fn with_stage(stage: GravitationStage) -> Self {
        Self {
            present: true,
            stage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Story,
    Normal,
    Hard,
    Nightmare,
}

impl Difficulty {
    pub fn xp_multiplier(self) -> f64 {
        match self {
            Difficulty::Story => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
            Difficulty::Nightmare => 1.5,
        }
    }

    pub fn ordinal(self) -> u32 {
        self as u32
    }
}

/// Encounter composition metadata supplied by the overworld layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterMeta {
    pub difficulty: Difficulty,
    pub is_boss: bool,
    pub companion: Companion,
}

impl Default for EncounterMeta {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            is_boss: false,
            companion: Companion::default(),
        }
    }
}

/// Ability definition, snapshotted from the Stray definition at battle start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub description: String,
    pub energy_cost: u32,
    pub cooldown_max: u32,
    pub element: Element,
    pub target_type: TargetType,
    pub power: f64,
}

/// Per-combatant readiness tracker for one ability slot.
/// `current_cooldown == 0` means the slot is off cooldown; usability
/// additionally requires the owner to afford the energy cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityInstance {
    pub ability: Ability,
    pub current_cooldown: u32,
}

impl AbilityInstance {
    pub fn new(ability: Ability) -> Self {
        Self {
            ability,
            current_cooldown: 0,
        }
    }

    pub fn is_ready(&self, current_energy: u32) -> bool {
        self.current_cooldown == 0 && current_energy >= self.ability.energy_cost
    }

    pub fn tick_cooldown(&mut self) {
        self.current_cooldown = self.current_cooldown.saturating_sub(1);
    }
}

/// Mutable runtime wrapper around one unit for the duration of a battle.
///
/// HP and energy are clamped with saturating arithmetic; defeat is derived
/// from `current_hp == 0` rather than stored, so the two can never disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub id: Uuid,
    pub unit_id: String,
    pub name: String,
    pub side: Side,
    pub row: Row,
    pub level: u32,
    pub max_hp: u32,
    pub current_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub crit_chance: f64,
    pub max_energy: u32,
    pub current_energy: u32,
    pub abilities: Vec<AbilityInstance>,
    pub weaknesses: Vec<Element>,
    pub resistances: Vec<Element>,
    pub recruitable: bool,
    pub is_defending: bool,
    pub has_fled: bool,
    /// ATB readiness. Fills proportional to speed; a turn opens at threshold.
    pub(crate) gauge: f64,
}

impl Combatant {
    /// Snapshot a Stray definition into a battle-local combatant.
    pub fn from_unit(unit: &UnitData, side: Side) -> Self {
        Self {
            id: Uuid::new_v4(),
            unit_id: unit.id.clone(),
            name: unit.name.clone(),
            side,
            row: unit.row,
            level: unit.level,
            max_hp: unit.max_hp,
            current_hp: unit.max_hp,
            attack: unit.attack,
            defense: unit.defense,
            speed: unit.speed,
            crit_chance: unit.crit_chance,
            max_energy: unit.max_energy,
            current_energy: unit.max_energy,
            abilities: unit
                .abilities
                .iter()
                .cloned()
                .map(AbilityInstance::new)
                .collect(),
            weaknesses: unit.weaknesses.clone(),
            resistances: unit.resistances.clone(),
            recruitable: unit.recruitable,
            is_defending: false,
            has_fled: false,
            gauge: 0.0,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.current_hp == 0
    }

    /// Alive and still present: able to act and be targeted.
    pub fn is_active_in_battle(&self) -> bool {
        !self.is_defeated() && !self.has_fled
    }

    pub fn apply_damage(&mut self, amount: u32) {
        self.current_hp = self.current_hp.saturating_sub(amount);
    }

    pub fn restore_hp(&mut self, amount: u32) {
        self.current_hp = (self.current_hp + amount).min(self.max_hp);
    }

    /// Advance all ability cooldowns by one. Called once per this
    /// combatant's own resolved turn, never per engine tick.
    pub fn tick_cooldowns(&mut self) {
        for slot in &mut self.abilities {
            slot.tick_cooldown();
        }
    }

    /// Consume a ready ability slot: deduct energy, put the used slot on
    /// full cooldown, tick the remaining slots by one use.
    ///
    /// Calling this on a not-ready slot is an engine bug, not user input;
    /// the `BattleState` boundary filters those before they get here.
    pub fn use_ability(&mut self, slot: usize) {
        debug_assert!(slot < self.abilities.len(), "ability slot out of range");
        debug_assert!(
            self.abilities[slot].is_ready(self.current_energy),
            "use_ability on a not-ready slot"
        );
        let cost = self.abilities[slot].ability.energy_cost;
        self.current_energy = self.current_energy.saturating_sub(cost);
        for (i, other) in self.abilities.iter_mut().enumerate() {
            if i != slot {
                other.tick_cooldown();
            }
        }
        let used = &mut self.abilities[slot];
        used.current_cooldown = used.ability.cooldown_max;
    }
}

/// Transient per-turn action. Built at selection time, discarded after
/// resolution.
#[derive(Debug, Clone)]
pub struct CombatAction {
    pub action: ActionType,
    pub actor: usize,
    pub ability_slot: Option<usize>,
    pub target: Option<usize>,
}

/// Feedback payload for the presentation layer. Carries no engine state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatActionResult {
    pub message: String,
    pub was_critical: bool,
    pub caused_defeat: bool,
    pub action: ActionType,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_ability(cost: u32, cooldown: u32) -> Ability {
        Ability {
            name: "Ember Lash".to_string(),
            description: "A whip of cinders.".to_string(),
            energy_cost: cost,
            cooldown_max: cooldown,
            element: Element::Fire,
            target_type: TargetType::SingleEnemy,
            power: 1.4,
        }
    }

    fn test_combatant() -> Combatant {
        let unit = UnitData {
            id: "test".to_string(),
            name: "Test Stray".to_string(),
            level: 3,
            max_hp: 50,
            attack: 10,
            defense: 2,
            speed: 8,
            crit_chance: 0.05,
            max_energy: 30,
            row: Row::Front,
            abilities: vec![test_ability(10, 2), test_ability(5, 3)],
            weaknesses: vec![Element::Ice],
            resistances: vec![Element::Fire],
            recruitable: false,
        };
        Combatant::from_unit(&unit, Side::Party)
    }

    #[test]
    fn test_snapshot_starts_full() {
        let c = test_combatant();
        assert_eq!(c.current_hp, c.max_hp);
        assert_eq!(c.current_energy, c.max_energy);
        assert!(!c.is_defeated());
        assert_eq!(c.abilities.len(), 2);
        assert_eq!(c.abilities[0].current_cooldown, 0);
        assert_eq!(c.gauge, 0.0);
    }

    #[test]
    fn test_apply_damage_clamps_and_defeats() {
        let mut c = test_combatant();
        c.apply_damage(20);
        assert_eq!(c.current_hp, 30);
        assert!(!c.is_defeated());

        c.apply_damage(100);
        assert_eq!(c.current_hp, 0);
        assert!(c.is_defeated());
    }

    #[test]
    fn test_restore_hp_caps_at_max() {
        let mut c = test_combatant();
        c.apply_damage(10);
        c.restore_hp(500);
        assert_eq!(c.current_hp, c.max_hp);
    }

    #[test]
    fn test_ability_readiness_gated_by_energy_and_cooldown() {
        let mut c = test_combatant();
        assert!(c.abilities[0].is_ready(c.current_energy));

        c.current_energy = 9; // cost is 10
        assert!(!c.abilities[0].is_ready(c.current_energy));

        c.current_energy = 30;
        c.abilities[0].current_cooldown = 1;
        assert!(!c.abilities[0].is_ready(c.current_energy));
    }

    #[test]
    fn test_use_ability_spends_energy_and_sets_cooldown() {
        let mut c = test_combatant();
        let energy_before = c.current_energy;
        c.abilities[1].current_cooldown = 2;

        c.use_ability(0);

        assert_eq!(c.current_energy, energy_before - 10);
        assert_eq!(c.abilities[0].current_cooldown, 2);
        // The other slot ticked down by one use
        assert_eq!(c.abilities[1].current_cooldown, 1);
    }

    #[test]
    fn test_tick_cooldowns_saturates_at_zero() {
        let mut c = test_combatant();
        c.abilities[0].current_cooldown = 1;
        c.tick_cooldowns();
        c.tick_cooldowns();
        assert_eq!(c.abilities[0].current_cooldown, 0);
    }

    #[test]
    fn test_phase_classification() {
        assert!(Phase::Victory.is_terminal());
        assert!(Phase::Defeat.is_terminal());
        assert!(Phase::Fled.is_terminal());
        assert!(!Phase::Running.is_terminal());
        assert!(Phase::SelectingAction.is_selection());
        assert!(Phase::SelectingTarget.is_selection());
        assert!(!Phase::Running.is_selection());
    }

    #[test]
    fn test_gravitation_stage_ally_chance_monotonic() {
        let stages = [
            GravitationStage::Normal,
            GravitationStage::Flickering,
            GravitationStage::Unstable,
            GravitationStage::Corrupted,
        ];
        for pair in stages.windows(2) {
            assert!(pair[0].ally_target_chance() < pair[1].ally_target_chance());
        }
    }

    #[test]
    fn test_side_opposing() {
        assert_eq!(Side::Party.opposing(), Side::Enemy);
        assert_eq!(Side::Enemy.opposing(), Side::Party);
    }
}
