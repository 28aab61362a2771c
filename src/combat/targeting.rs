//! Stateless target cycling.
//!
//! The engine owns the current target pointer; this module only knows how
//! to move it over a candidate list, skipping combatants that can no
//! longer be targeted.

use crate::combat::types::Combatant;

/// Move the target pointer by `direction` (±1) with wraparound over the
/// candidates that are still targetable. Returns `None` when the pool is
/// exhausted (every candidate defeated or fled).
///
/// `current` may point at a combatant that has since died; the cycle
/// starts from that position and lands on the nearest valid candidate in
/// the requested direction.
pub fn cycle(candidates: &[&Combatant], current: usize, direction: i32) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    let len = candidates.len();
    let step = if direction < 0 { len - 1 } else { 1 };

    // Stepping len times visits every slot, ending back at `current`
    let mut index = current % len;
    for _ in 0..len {
        index = (index + step) % len;
        if candidates[index].is_active_in_battle() {
            return Some(index);
        }
    }
    None
}

/// First targetable candidate, used to seed the pointer when target
/// selection opens.
pub fn first_valid(candidates: &[&Combatant]) -> Option<usize> {
    candidates.iter().position(|c| c.is_active_in_battle())
}
