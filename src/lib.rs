//! Lazarus battle engine library.
//!
//! A real-time ATB battle system: combatants accumulate turn gauge by
//! speed, party turns open selection menus while the clock freezes, and
//! a probabilistic companion intervenes with Gravitation strikes that
//! grow less trustworthy as its corruption deepens.
//!
//! The engine is headless. A frontend drives `combat::BattleState` with
//! frame deltas and player input; the simulator drives it with a script.

pub mod combat;
pub mod constants;
pub mod simulator;
pub mod units;
