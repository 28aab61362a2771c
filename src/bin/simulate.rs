//! Battle balance simulator CLI.
//!
//! Run Monte Carlo battle simulations to analyze encounter balance.
//!
//! Usage:
//!   cargo run --bin simulate -- [OPTIONS]
//!
//! Examples:
//!   cargo run --bin simulate                    # Default: 1000 battles
//!   cargo run --bin simulate -- -n 100          # 100 battles
//!   cargo run --bin simulate -- --seed 42       # Reproducible run
//!   cargo run --bin simulate -- --stage 3       # Corrupted companion

use lazarus_battle::combat::types::{Difficulty, GravitationStage};
use lazarus_battle::simulator::{run_simulation, SimConfig};
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args);

    println!("╔═══════════════════════════════════════════════╗");
    println!("║        LAZARUS BATTLE SIMULATOR               ║");
    println!("╚═══════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Battles:        {}", config.num_runs);
    println!("  Difficulty:     {:?}", config.difficulty);
    println!("  Boss fight:     {}", config.is_boss);
    match config.companion_stage {
        Some(stage) => println!("  Companion:      {:?}", stage),
        None => println!("  Companion:      absent"),
    }
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!();
    println!("Running simulation...");
    println!();

    let report = run_simulation(&config);

    println!("{}", report.to_text());

    if args.iter().any(|a| a == "--json") {
        let json = report.to_json();
        let filename = format!(
            "battle_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        std::fs::write(&filename, json).expect("Failed to write JSON report");
        println!("JSON report saved to: {}", filename);
    }
}

fn parse_args(args: &[String]) -> SimConfig {
    let mut config = SimConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--runs" => {
                if i + 1 < args.len() {
                    config.num_runs = args[i + 1].parse().unwrap_or(1000);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-d" | "--difficulty" => {
                if i + 1 < args.len() {
                    config.difficulty = match args[i + 1].as_str() {
                        "story" => Difficulty::Story,
                        "hard" => Difficulty::Hard,
                        "nightmare" => Difficulty::Nightmare,
                        _ => Difficulty::Normal,
                    };
                    i += 1;
                }
            }
            "--stage" => {
                if i + 1 < args.len() {
                    config.companion_stage = match args[i + 1].as_str() {
                        "0" | "normal" => Some(GravitationStage::Normal),
                        "1" | "flickering" => Some(GravitationStage::Flickering),
                        "2" | "unstable" => Some(GravitationStage::Unstable),
                        "3" | "corrupted" => Some(GravitationStage::Corrupted),
                        _ => config.companion_stage,
                    };
                    i += 1;
                }
            }
            "--no-companion" => {
                config.companion_stage = None;
            }
            "--boss" => {
                config.is_boss = true;
            }
            "--quick" => {
                config = SimConfig::quick_check();
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("Lazarus Battle Simulator");
    println!();
    println!("USAGE:");
    println!("    cargo run --bin simulate -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -n, --runs <N>          Number of battles (default: 1000)");
    println!("    -s, --seed <S>          Random seed for reproducibility");
    println!("    -d, --difficulty <D>    story | normal | hard | nightmare");
    println!("    --stage <S>             Companion stage 0-3 or by name");
    println!("    --no-companion          Fight without the companion");
    println!("    --boss                  Mark the encounter as a boss fight");
    println!("    --quick                 Quick check (100 battles)");
    println!("    -v, --verbose           Per-battle output");
    println!("    --json                  Save JSON report");
    println!("    -h, --help              Show this help");
    println!();
    println!("EXAMPLES:");
    println!("    cargo run --bin simulate                     # Default run");
    println!("    cargo run --bin simulate -- --stage 3        # Corrupted companion");
    println!("    cargo run --bin simulate -- --boss -d hard   # Hard boss fight");
}
