//! Battle balance simulator for Monte Carlo analysis.
//!
//! Runs thousands of scripted battles to analyze:
//! - Win / defeat / flee rates for an encounter setup
//! - Battle duration and turn pacing
//! - Reward tier and recruitment frequencies
//! - Companion intervention impact across corruption stages
//!
//! The simulator drives the real `BattleState` engine, so its numbers
//! match live gameplay behavior.

mod config;
mod report;
mod runner;

pub use config::SimConfig;
pub use report::SimReport;
pub use runner::run_simulation;
