//! Simulation report generation.

use std::collections::BTreeMap;

use serde::Serialize;

use super::runner::RunStats;
use crate::combat::types::Phase;

/// Aggregated results from multiple simulated battles.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub num_runs: u32,
    pub victories: u32,
    pub defeats: u32,
    pub timed_out: u32,

    pub win_rate: f64,
    pub avg_seconds: f64,
    pub avg_player_turns: f64,
    pub avg_experience: f64,
    pub avg_currency: f64,
    pub avg_party_survivors: f64,
    pub recruit_rate: f64,

    /// Reward tier name -> count across victorious runs
    pub tier_counts: BTreeMap<String, u32>,

    /// Individual run stats for detailed analysis
    pub run_stats: Vec<RunStats>,
}

impl SimReport {
    /// Aggregate completed run stats into a report.
    pub fn from_runs(runs: Vec<RunStats>) -> Self {
        let num_runs = runs.len() as u32;
        let denom = num_runs.max(1) as f64;

        let victories = runs.iter().filter(|r| r.phase == Phase::Victory).count() as u32;
        let defeats = runs.iter().filter(|r| r.phase == Phase::Defeat).count() as u32;
        let timed_out = runs.iter().filter(|r| r.timed_out).count() as u32;

        let avg_seconds = runs.iter().map(|r| r.seconds).sum::<f64>() / denom;
        let avg_player_turns =
            runs.iter().map(|r| r.player_turns as f64).sum::<f64>() / denom;
        let avg_experience = runs.iter().map(|r| r.experience as f64).sum::<f64>() / denom;
        let avg_currency = runs.iter().map(|r| r.currency as f64).sum::<f64>() / denom;
        let avg_party_survivors =
            runs.iter().map(|r| r.party_survivors as f64).sum::<f64>() / denom;

        let recruit_rate = runs.iter().filter(|r| r.recruit_offered).count() as f64
            / (victories.max(1) as f64);

        let mut tier_counts = BTreeMap::new();
        for run in &runs {
            if let Some(tier) = run.reward_tier {
                *tier_counts.entry(format!("{:?}", tier)).or_insert(0) += 1;
            }
        }

        Self {
            num_runs,
            victories,
            defeats,
            timed_out,
            win_rate: victories as f64 / denom,
            avg_seconds,
            avg_player_turns,
            avg_experience,
            avg_currency,
            avg_party_survivors,
            recruit_rate,
            tier_counts,
            run_stats: runs,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("═══════════════════════════════════════════\n");
        out.push_str("           BATTLE SIMULATION REPORT\n");
        out.push_str("═══════════════════════════════════════════\n\n");

        out.push_str(&format!("Battles:          {}\n", self.num_runs));
        out.push_str(&format!(
            "Victories:        {} ({:.1}%)\n",
            self.victories,
            self.win_rate * 100.0
        ));
        out.push_str(&format!("Defeats:          {}\n", self.defeats));
        if self.timed_out > 0 {
            out.push_str(&format!("Timed out:        {}\n", self.timed_out));
        }
        out.push('\n');

        out.push_str(&format!("Avg duration:     {:.1}s\n", self.avg_seconds));
        out.push_str(&format!(
            "Avg party turns:  {:.1}\n",
            self.avg_player_turns
        ));
        out.push_str(&format!(
            "Avg survivors:    {:.2}\n",
            self.avg_party_survivors
        ));
        out.push('\n');

        out.push_str(&format!("Avg experience:   {:.0}\n", self.avg_experience));
        out.push_str(&format!("Avg currency:     {:.0}\n", self.avg_currency));
        out.push_str(&format!(
            "Recruit rate:     {:.1}% of victories\n",
            self.recruit_rate * 100.0
        ));
        out.push('\n');

        if !self.tier_counts.is_empty() {
            out.push_str("Reward tiers:\n");
            for (tier, count) in &self.tier_counts {
                out.push_str(&format!(
                    "  {:<10} {:>5} ({:.1}%)\n",
                    tier,
                    count,
                    *count as f64 / self.victories.max(1) as f64 * 100.0
                ));
            }
        }

        out
    }

    /// Serialize the full report, including per-run stats.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(phase: Phase, xp: u64) -> RunStats {
        RunStats {
            phase,
            seconds: 30.0,
            player_turns: 6,
            experience: xp,
            currency: xp / 2,
            reward_tier: None,
            recruit_offered: false,
            party_survivors: if phase == Phase::Victory { 2 } else { 0 },
            timed_out: false,
        }
    }

    #[test]
    fn test_aggregation() {
        let report = SimReport::from_runs(vec![
            run(Phase::Victory, 100),
            run(Phase::Victory, 50),
            run(Phase::Defeat, 0),
        ]);
        assert_eq!(report.num_runs, 3);
        assert_eq!(report.victories, 2);
        assert_eq!(report.defeats, 1);
        assert_eq!(report.avg_experience, 50.0);
        assert!((report.win_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_text_and_json_render() {
        let report = SimReport::from_runs(vec![run(Phase::Victory, 100)]);
        let text = report.to_text();
        assert!(text.contains("Victories"));
        let json = report.to_json();
        assert!(json.contains("\"victories\""));
    }

    #[test]
    fn test_empty_runs_do_not_divide_by_zero() {
        let report = SimReport::from_runs(Vec::new());
        assert_eq!(report.num_runs, 0);
        assert_eq!(report.win_rate, 0.0);
    }
}
