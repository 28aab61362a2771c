//! The battle orchestrator.
//!
//! `BattleState` owns the combatant roster and the phase machine. A host
//! loop drives it with `update(dt)` once per frame; player input arrives
//! through the selection calls, which are silent no-ops whenever they are
//! out of phase so the engine is safe to drive from any input loop.
//!
//! Turn scheduling is ATB: every combatant's gauge fills proportional to
//! speed, and gauges freeze while a party member has a selection phase
//! open, so the player is never forced to react to a second turn firing
//! mid-selection.

use rand::Rng;
use thiserror::Error;

use crate::combat::companion::InterventionController;
use crate::combat::math;
use crate::combat::rewards::{self, BattleOutcome};
use crate::combat::targeting;
use crate::combat::types::{
    ActionType, Combatant, CombatAction, CombatActionResult, Element, EncounterMeta,
    GravitationStage, Phase, Side, TargetType,
};
use crate::constants::*;
use crate::units::UnitData;

/// Configuration errors. The battle never starts with a bad roster.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BattleError {
    #[error("party roster is empty")]
    EmptyParty,
    #[error("enemy roster is empty")]
    EmptyEnemyRoster,
}

#[derive(Debug)]
pub struct BattleState {
    /// Party first, then enemies; insertion order is the ATB tie-break.
    combatants: Vec<Combatant>,
    party_len: usize,
    phase: Phase,
    /// Index of the combatant whose turn is open.
    active: Option<usize>,
    /// Ability slot chosen while selecting a target.
    pending_ability: Option<usize>,
    /// Position of the target pointer within the current candidate pool.
    target_pos: usize,
    last_result: Option<CombatActionResult>,
    encounter: EncounterMeta,
    intervention: InterventionController,
    /// Post-terminal countdown before the outcome is published.
    linger: f64,
    outcome: Option<BattleOutcome>,
    published: bool,
}

impl BattleState {
    /// Snapshot the rosters into battle-local combatants. Gauges start at
    /// zero; the first turn goes to the fastest unit.
    pub fn new(
        party: &[UnitData],
        enemies: &[UnitData],
        encounter: EncounterMeta,
    ) -> Result<Self, BattleError> {
        if party.is_empty() {
            return Err(BattleError::EmptyParty);
        }
        if enemies.is_empty() {
            return Err(BattleError::EmptyEnemyRoster);
        }

        let mut combatants: Vec<Combatant> = party
            .iter()
            .map(|u| Combatant::from_unit(u, Side::Party))
            .collect();
        let party_len = combatants.len();
        combatants.extend(enemies.iter().map(|u| Combatant::from_unit(u, Side::Enemy)));

        Ok(Self {
            combatants,
            party_len,
            phase: Phase::Running,
            active: None,
            pending_ability: None,
            target_pos: 0,
            last_result: None,
            encounter,
            intervention: InterventionController::new(),
            linger: 0.0,
            outcome: None,
            published: false,
        })
    }

    // ── Read-only contract ────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn party(&self) -> &[Combatant] {
        &self.combatants[..self.party_len]
    }

    pub fn enemies(&self) -> &[Combatant] {
        &self.combatants[self.party_len..]
    }

    pub fn active_combatant(&self) -> Option<&Combatant> {
        self.active.map(|i| &self.combatants[i])
    }

    pub fn targeted_combatant(&self) -> Option<&Combatant> {
        if self.phase != Phase::SelectingTarget {
            return None;
        }
        let pool = self.current_pool()?;
        pool.get(self.target_pos).map(|&i| &self.combatants[i])
    }

    pub fn last_action_result(&self) -> Option<&CombatActionResult> {
        self.last_result.as_ref()
    }

    // ── Host loop ─────────────────────────────────────────────────────────

    /// Advance the battle by `dt` seconds. Ordering inside one update is
    /// fixed: gauge advancement, then enemy and companion auto-resolution,
    /// then terminal checks, so the battle never ends mid-action without
    /// an emitted result. Selection phases freeze everything.
    pub fn update(&mut self, dt: f64, rng: &mut impl Rng) {
        if self.published {
            return;
        }
        if self.phase.is_terminal() {
            self.linger -= dt;
            return;
        }
        if self.phase.is_selection() {
            return;
        }

        self.advance_gauges(dt);
        self.resolve_ready_turns(rng);

        if self.phase == Phase::Running && self.encounter.companion.present {
            let stage = self.encounter.companion.stage;
            let fired = self.intervention.advance(dt, stage, rng);
            for iv in fired {
                if self.phase.is_terminal() {
                    break;
                }
                self.trigger_gravitation(iv.stage, iv.targets_ally, rng);
            }
        }
    }

    /// The terminal result, delivered exactly once after the linger
    /// countdown has elapsed. Repeated polling returns `None` thereafter.
    pub fn poll_outcome(&mut self) -> Option<BattleOutcome> {
        if self.published || !self.phase.is_terminal() || self.linger > 0.0 {
            return None;
        }
        self.published = true;
        self.outcome.take()
    }

    // ── Player selection contract ─────────────────────────────────────────

    /// Ordered action menu for the active combatant. Flee only appears on
    /// party-initiated turns, which is every turn that opens a menu.
    pub fn available_actions(&self) -> Vec<ActionType> {
        if self.phase != Phase::SelectingAction {
            return Vec::new();
        }
        let Some(actor) = self.active else {
            return Vec::new();
        };
        let mut menu = vec![ActionType::Attack];
        if !self.combatants[actor].abilities.is_empty() {
            menu.push(ActionType::Ability);
        }
        menu.push(ActionType::Defend);
        menu.push(ActionType::Flee);
        menu
    }

    /// Valid only in `SelectingAction`; anything else is a silent no-op.
    pub fn select_action(&mut self, action: ActionType, rng: &mut impl Rng) {
        if self.phase != Phase::SelectingAction {
            return;
        }
        let Some(actor) = self.active else {
            return;
        };
        match action {
            ActionType::Attack => {
                let target = self.first_living(Side::Enemy);
                let result = match target {
                    Some(t) => self.perform_basic_attack(actor, t, rng),
                    None => self.miss_result(actor, ActionType::Attack),
                };
                self.last_result = Some(result);
                self.finish_turn(actor, false, rng);
            }
            ActionType::Defend => {
                self.combatants[actor].is_defending = true;
                self.last_result = Some(CombatActionResult {
                    message: format!("{} braces for the next blow.", self.combatants[actor].name),
                    was_critical: false,
                    caused_defeat: false,
                    action: ActionType::Defend,
                });
                self.finish_turn(actor, false, rng);
            }
            ActionType::Flee => self.attempt_flee(actor, rng),
            ActionType::Ability => {
                if !self.combatants[actor].abilities.is_empty() {
                    self.phase = Phase::SelectingAbility;
                }
            }
            // Gravitation is never player-selectable
            ActionType::Gravitation => {}
        }
    }

    /// Every ability slot of the active combatant with its readiness flag,
    /// so the menu can grey out unready entries instead of hiding them.
    pub fn available_abilities(&self) -> Vec<(&crate::combat::types::AbilityInstance, bool)> {
        let Some(actor) = self.active else {
            return Vec::new();
        };
        let c = &self.combatants[actor];
        c.abilities
            .iter()
            .map(|slot| (slot, slot.is_ready(c.current_energy)))
            .collect()
    }

    /// Out-of-range or not-ready selections are ignored and the menu
    /// stays open. Self-target abilities resolve immediately.
    pub fn select_ability(&mut self, index: usize, rng: &mut impl Rng) {
        if self.phase != Phase::SelectingAbility {
            return;
        }
        let Some(actor) = self.active else {
            return;
        };
        let c = &self.combatants[actor];
        let Some(slot) = c.abilities.get(index) else {
            return;
        };
        if !slot.is_ready(c.current_energy) {
            return;
        }

        if slot.ability.target_type == TargetType::SelfOnly {
            let result = self.perform_ability(actor, index, vec![actor], rng);
            self.last_result = Some(result);
            self.finish_turn(actor, true, rng);
        } else {
            self.pending_ability = Some(index);
            self.phase = Phase::SelectingTarget;
            self.target_pos = self
                .current_pool()
                .and_then(|pool| {
                    let refs: Vec<&Combatant> =
                        pool.iter().map(|&i| &self.combatants[i]).collect();
                    targeting::first_valid(&refs)
                })
                .unwrap_or(0);
        }
    }

    /// Lossless: returns to the action menu without consuming the turn.
    pub fn cancel_ability_selection(&mut self) {
        if self.phase == Phase::SelectingAbility {
            self.phase = Phase::SelectingAction;
        }
    }

    /// Lossless: returns to the ability menu; no energy or cooldown spent.
    pub fn cancel_target_selection(&mut self) {
        if self.phase == Phase::SelectingTarget {
            self.pending_ability = None;
            self.phase = Phase::SelectingAbility;
        }
    }

    /// Move the target pointer ±1 with wraparound over live candidates.
    pub fn cycle_target(&mut self, direction: i32) {
        if self.phase != Phase::SelectingTarget {
            return;
        }
        let Some(pool) = self.current_pool() else {
            return;
        };
        let refs: Vec<&Combatant> = pool.iter().map(|&i| &self.combatants[i]).collect();
        if let Some(pos) = targeting::cycle(&refs, self.target_pos, direction) {
            self.target_pos = pos;
        }
    }

    /// Execute the pending ability on the confirmed target. A pool with
    /// no valid target left auto-resolves as a miss; the turn is spent
    /// but no energy or cooldown is.
    pub fn confirm_target(&mut self, rng: &mut impl Rng) {
        if self.phase != Phase::SelectingTarget {
            return;
        }
        let (Some(actor), Some(slot)) = (self.active, self.pending_ability) else {
            return;
        };
        let target_type = self.combatants[actor].abilities[slot].ability.target_type;

        let targets: Vec<usize> = match target_type {
            TargetType::AllEnemies => self
                .side_indices(self.combatants[actor].side.opposing())
                .into_iter()
                .filter(|&i| self.combatants[i].is_active_in_battle())
                .collect(),
            _ => {
                let pool = self.current_pool().unwrap_or_default();
                let refs: Vec<&Combatant> = pool.iter().map(|&i| &self.combatants[i]).collect();
                let pos = if refs
                    .get(self.target_pos)
                    .is_some_and(|c| c.is_active_in_battle())
                {
                    Some(self.target_pos)
                } else {
                    targeting::first_valid(&refs)
                };
                pos.map(|p| vec![pool[p]]).unwrap_or_default()
            }
        };

        let (result, spent) = if targets.is_empty() {
            (self.miss_result(actor, ActionType::Ability), false)
        } else {
            (self.perform_ability(actor, slot, targets, rng), true)
        };
        self.last_result = Some(result);
        self.finish_turn(actor, spent, rng);
    }

    // ── Companion intervention ────────────────────────────────────────────

    /// A Gravitation strike from the companion. Fires immediately and
    /// consumes no turn or gauge. On a misfire (`targets_ally`) the pool
    /// is the party instead of the enemy line.
    pub fn trigger_gravitation(
        &mut self,
        stage: GravitationStage,
        targets_ally: bool,
        rng: &mut impl Rng,
    ) {
        if self.phase.is_terminal() || self.published {
            return;
        }
        let side = if targets_ally { Side::Party } else { Side::Enemy };
        let pool: Vec<usize> = self
            .side_indices(side)
            .into_iter()
            .filter(|&i| self.combatants[i].is_active_in_battle())
            .collect();
        if pool.is_empty() {
            return;
        }
        let target = pool[rng.gen_range(0..pool.len())];

        let outcome = math::resolve_strike(
            GRAVITATION_ATTACK,
            GRAVITATION_POWER,
            Element::Shadow,
            crate::combat::types::Row::Front,
            GRAVITATION_CRIT_CHANCE,
            &self.combatants[target],
            rng,
        );
        self.combatants[target].apply_damage(outcome.damage);
        let died = self.combatants[target].is_defeated();

        let mut message = format!(
            "Gravitation crashes into {} for {} damage.",
            self.combatants[target].name, outcome.damage
        );
        if targets_ally {
            message.push_str(" The companion's aim has slipped.");
        }
        if died {
            message.push_str(&format!(" {} falls!", self.combatants[target].name));
        }
        let _ = stage; // severity already shaped the misfire roll upstream
        self.last_result = Some(CombatActionResult {
            message,
            was_critical: outcome.was_crit,
            caused_defeat: died,
            action: ActionType::Gravitation,
        });

        self.check_terminal(rng);

        // A misfire can kill the combatant whose menu is open; close the
        // selection rather than leave a dead unit holding the turn.
        if !self.phase.is_terminal() {
            if let Some(actor) = self.active {
                if !self.combatants[actor].is_active_in_battle() {
                    self.active = None;
                    self.pending_ability = None;
                    self.phase = Phase::Running;
                }
            }
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn advance_gauges(&mut self, dt: f64) {
        for c in &mut self.combatants {
            if c.is_active_in_battle() {
                c.gauge += c.speed as f64 * ATB_FILL_RATE * dt;
            }
        }
    }

    /// Resolve turns for everyone whose gauge has filled, in insertion
    /// order (party before enemies). Stops when a party member opens a
    /// selection phase or the battle ends.
    fn resolve_ready_turns(&mut self, rng: &mut impl Rng) {
        loop {
            if self.phase != Phase::Running {
                return;
            }
            let ready = self
                .combatants
                .iter()
                .position(|c| c.is_active_in_battle() && c.gauge >= ATB_GAUGE_THRESHOLD);
            let Some(idx) = ready else {
                return;
            };

            // Defend lasts until the combatant's next turn comes around
            self.combatants[idx].is_defending = false;

            if self.combatants[idx].side == Side::Party {
                self.active = Some(idx);
                self.phase = Phase::SelectingAction;
                return;
            }
            self.enemy_auto_action(idx, rng);
        }
    }

    /// Enemy policy: first ready ability if any, otherwise basic attack
    /// on a random living party member.
    fn enemy_auto_action(&mut self, actor: usize, rng: &mut impl Rng) {
        let slot = {
            let c = &self.combatants[actor];
            c.abilities
                .iter()
                .position(|s| s.is_ready(c.current_energy))
        };

        let mut used_ability = false;
        if let Some(slot) = slot {
            let target_type = self.combatants[actor].abilities[slot].ability.target_type;
            let targets = self.auto_targets(actor, target_type, rng);
            if !targets.is_empty() {
                let result = self.perform_ability(actor, slot, targets, rng);
                self.last_result = Some(result);
                used_ability = true;
            }
        }

        if !used_ability {
            let result = match self.random_living(Side::Party, rng) {
                Some(t) => self.perform_basic_attack(actor, t, rng),
                None => self.miss_result(actor, ActionType::Attack),
            };
            self.last_result = Some(result);
        }

        self.finish_turn(actor, used_ability, rng);
    }

    fn auto_targets(
        &self,
        actor: usize,
        target_type: TargetType,
        rng: &mut impl Rng,
    ) -> Vec<usize> {
        let side = self.combatants[actor].side;
        match target_type {
            TargetType::SelfOnly => vec![actor],
            TargetType::SingleAlly => {
                // Heal the most wounded living ally
                self.side_indices(side)
                    .into_iter()
                    .filter(|&i| self.combatants[i].is_active_in_battle())
                    .min_by_key(|&i| self.combatants[i].current_hp)
                    .map(|i| vec![i])
                    .unwrap_or_default()
            }
            TargetType::SingleEnemy => {
                let pool: Vec<usize> = self
                    .side_indices(side.opposing())
                    .into_iter()
                    .filter(|&i| self.combatants[i].is_active_in_battle())
                    .collect();
                if pool.is_empty() {
                    Vec::new()
                } else {
                    vec![pool[rng.gen_range(0..pool.len())]]
                }
            }
            TargetType::AllEnemies => self
                .side_indices(side.opposing())
                .into_iter()
                .filter(|&i| self.combatants[i].is_active_in_battle())
                .collect(),
        }
    }

    fn perform_basic_attack(
        &mut self,
        actor: usize,
        target: usize,
        rng: &mut impl Rng,
    ) -> CombatActionResult {
        let action = CombatAction {
            action: ActionType::Attack,
            actor,
            ability_slot: None,
            target: Some(target),
        };
        let (attack, row, crit) = {
            let a = &self.combatants[actor];
            (a.attack, a.row, a.crit_chance)
        };
        let outcome = math::resolve_strike(
            attack,
            BASIC_ATTACK_POWER,
            Element::Neutral,
            row,
            crit,
            &self.combatants[target],
            rng,
        );
        self.combatants[target].apply_damage(outcome.damage);
        let died = self.combatants[target].is_defeated();

        let mut message = format!(
            "{} strikes {} for {} damage.",
            self.combatants[actor].name, self.combatants[target].name, outcome.damage
        );
        if outcome.was_crit {
            message.push_str(" Critical hit!");
        }
        if died {
            message.push_str(&format!(" {} falls!", self.combatants[target].name));
        }
        CombatActionResult {
            message,
            was_critical: outcome.was_crit,
            caused_defeat: died,
            action: action.action,
        }
    }

    /// Spend the slot (energy, cooldowns) and apply it to each target.
    /// Damaging abilities strike; restorative ones (ally or self target)
    /// heal.
    fn perform_ability(
        &mut self,
        actor: usize,
        slot: usize,
        targets: Vec<usize>,
        rng: &mut impl Rng,
    ) -> CombatActionResult {
        let ability = self.combatants[actor].abilities[slot].ability.clone();
        self.combatants[actor].use_ability(slot);

        let (attack, row, crit) = {
            let a = &self.combatants[actor];
            (a.attack, a.row, a.crit_chance)
        };
        let restorative = matches!(
            ability.target_type,
            TargetType::SingleAlly | TargetType::SelfOnly
        );

        let mut any_crit = false;
        let mut any_death = false;
        let mut segments = Vec::new();
        for target in targets {
            if restorative {
                let amount = math::resolve_heal(attack, ability.power);
                self.combatants[target].restore_hp(amount);
                segments.push(format!(
                    "restores {} HP to {}",
                    amount, self.combatants[target].name
                ));
            } else {
                let outcome = math::resolve_strike(
                    attack,
                    ability.power,
                    ability.element,
                    row,
                    crit,
                    &self.combatants[target],
                    rng,
                );
                self.combatants[target].apply_damage(outcome.damage);
                any_crit |= outcome.was_crit;
                let died = self.combatants[target].is_defeated();
                any_death |= died;
                let mut seg = format!(
                    "hits {} for {} damage",
                    self.combatants[target].name, outcome.damage
                );
                if died {
                    seg.push_str(&format!(" ({} falls!)", self.combatants[target].name));
                }
                segments.push(seg);
            }
        }

        let mut message = format!(
            "{} uses {}: {}.",
            self.combatants[actor].name,
            ability.name,
            segments.join(", ")
        );
        if any_crit {
            message.push_str(" Critical hit!");
        }
        CombatActionResult {
            message,
            was_critical: any_crit,
            caused_defeat: any_death,
            action: ActionType::Ability,
        }
    }

    fn attempt_flee(&mut self, actor: usize, rng: &mut impl Rng) {
        let fastest = self
            .enemies()
            .iter()
            .filter(|e| e.is_active_in_battle())
            .map(|e| e.speed)
            .max()
            .unwrap_or(0);
        let chance = math::flee_chance(self.combatants[actor].speed, fastest);

        if rng.gen::<f64>() < chance {
            self.combatants[actor].has_fled = true;
            self.last_result = Some(CombatActionResult {
                message: format!(
                    "{} breaks away and the party flees!",
                    self.combatants[actor].name
                ),
                was_critical: false,
                caused_defeat: false,
                action: ActionType::Flee,
            });
            self.enter_terminal(Phase::Fled, rng);
        } else {
            self.last_result = Some(CombatActionResult {
                message: format!("{} fails to escape.", self.combatants[actor].name),
                was_critical: false,
                caused_defeat: false,
                action: ActionType::Flee,
            });
            self.finish_turn(actor, false, rng);
        }
    }

    /// Close out a resolved turn: cooldowns advance once per the actor's
    /// own turn (ability use already ticked them), gauge resets, and the
    /// phase returns to Running unless a terminal was reached.
    fn finish_turn(&mut self, actor: usize, cooldowns_ticked: bool, rng: &mut impl Rng) {
        if !cooldowns_ticked {
            self.combatants[actor].tick_cooldowns();
        }
        self.combatants[actor].gauge = 0.0;
        self.active = None;
        self.pending_ability = None;

        if !self.check_terminal(rng) {
            self.phase = Phase::Running;
        }
    }

    /// Victory beats Defeat when both sides fall in the same resolution,
    /// mirroring the convention that the player wins even if both die.
    fn check_terminal(&mut self, rng: &mut impl Rng) -> bool {
        if self.phase.is_terminal() {
            return true;
        }
        if self.enemies().iter().all(|e| e.is_defeated()) {
            self.enter_terminal(Phase::Victory, rng);
            return true;
        }
        if self.party().iter().all(|p| p.is_defeated()) {
            self.enter_terminal(Phase::Defeat, rng);
            return true;
        }
        false
    }

    fn enter_terminal(&mut self, phase: Phase, rng: &mut impl Rng) {
        self.phase = phase;
        self.active = None;
        self.pending_ability = None;
        self.linger = TERMINAL_LINGER_SECONDS;
        self.outcome = Some(match phase {
            Phase::Victory => {
                let enemies: Vec<&Combatant> = self.enemies().iter().collect();
                rewards::victory_rewards(&enemies, &self.encounter, rng)
            }
            _ => BattleOutcome::empty(phase),
        });
    }

    fn side_indices(&self, side: Side) -> Vec<usize> {
        match side {
            Side::Party => (0..self.party_len).collect(),
            Side::Enemy => (self.party_len..self.combatants.len()).collect(),
        }
    }

    /// Candidate pool for the pending ability's target type, as indices
    /// into the roster. `None` outside target selection.
    fn current_pool(&self) -> Option<Vec<usize>> {
        let actor = self.active?;
        let slot = self.pending_ability?;
        let side = self.combatants[actor].side;
        let pool = match self.combatants[actor].abilities[slot].ability.target_type {
            TargetType::SingleEnemy | TargetType::AllEnemies => {
                self.side_indices(side.opposing())
            }
            TargetType::SingleAlly => self.side_indices(side),
            TargetType::SelfOnly => vec![actor],
        };
        Some(pool)
    }

    fn first_living(&self, side: Side) -> Option<usize> {
        self.side_indices(side)
            .into_iter()
            .find(|&i| self.combatants[i].is_active_in_battle())
    }

    fn random_living(&self, side: Side, rng: &mut impl Rng) -> Option<usize> {
        let pool: Vec<usize> = self
            .side_indices(side)
            .into_iter()
            .filter(|&i| self.combatants[i].is_active_in_battle())
            .collect();
        if pool.is_empty() {
            None
        } else {
            Some(pool[rng.gen_range(0..pool.len())])
        }
    }

    fn miss_result(&self, actor: usize, action: ActionType) -> CombatActionResult {
        CombatActionResult {
            message: format!("{} finds no target.", self.combatants[actor].name),
            was_critical: false,
            caused_defeat: false,
            action,
        }
    }
}
