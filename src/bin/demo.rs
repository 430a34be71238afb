//! Developer harness for exercising the dartboard aiming solver against a
//! small synthetic target.
//!
//! Uses `clap` subcommands and `colored` + `prettytable-rs` output.
//! Reading a real dartboard file from disk is left to an external
//! parser; this binary builds a synthetic target in-process.

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use prettytable::Table;
use serde::Serialize;

use dart_aim_solver::{
    BivariateNormal, Bed, DpSolver, Game, GameVariant, GreedySolver, HeatMap, HitData, HitType,
    IntegrationMode, Polygon, SolverConfig, Target, Vec2,
};
use nalgebra::Matrix2;

#[derive(Serialize)]
struct SolveReport {
    state: u64,
    variant: String,
    expected_throws: f64,
    optimal_aim: Vec2,
    greedy_expected_points: f64,
    greedy_aim: Vec2,
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("static template is valid"),
    );
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    bar.set_message(message);
    bar
}

#[derive(Parser)]
#[command(name = "dart-aim-demo")]
#[command(about = "Dartboard aiming solver demo", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the minimum-expected-throws DP for one state and print the
    /// optimal aim.
    Solve {
        /// Countdown state to solve for.
        #[arg(short, long, default_value_t = 40)]
        state: i64,

        /// Finish rule: "any" or "double".
        #[arg(short, long, default_value = "any")]
        variant: String,

        /// Candidate-aim sample count (grid is sqrt(n) x sqrt(n)).
        #[arg(short = 'n', long, default_value_t = 2_500)]
        samples: usize,

        /// Print the result as JSON instead of a formatted report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print a small heat map of solver values over the target bounds.
    Heatmap {
        #[arg(short, long, default_value_t = 40)]
        state: i64,

        #[arg(short, long, default_value = "any")]
        variant: String,

        #[arg(long, default_value_t = 8)]
        rows: usize,

        #[arg(long, default_value_t = 8)]
        cols: usize,
    },
}

/// A synthetic target: a 20cm "double" ring around a 5cm bullseye, both
/// scoring beds sitting inside a larger "normal" scoring square — enough
/// structure to exercise both game variants without reading a file.
fn synthetic_target() -> Target {
    let bullseye = Polygon::new(vec![
        Vec2::new(-2.5, -2.5),
        Vec2::new(2.5, -2.5),
        Vec2::new(2.5, 2.5),
        Vec2::new(-2.5, 2.5),
    ]);
    let double_ring = Polygon::new(vec![
        Vec2::new(-10.0, -10.0),
        Vec2::new(10.0, -10.0),
        Vec2::new(10.0, 10.0),
        Vec2::new(-10.0, 10.0),
    ]);
    let outer = Polygon::new(vec![
        Vec2::new(-50.0, -50.0),
        Vec2::new(50.0, -50.0),
        Vec2::new(50.0, 50.0),
        Vec2::new(-50.0, 50.0),
    ]);

    Target::new(vec![
        Bed::new(bullseye, HitData::new(HitType::Treble, -50)),
        Bed::new(double_ring, HitData::new(HitType::Double, -40)),
        Bed::new(outer, HitData::new(HitType::Normal, -20)),
    ])
    .expect("synthetic target is well-formed")
}

fn parse_variant(s: &str) -> GameVariant {
    match s {
        "double" => GameVariant::FinishOnDouble,
        _ => GameVariant::FinishOnAny,
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let target = synthetic_target();
    let distribution =
        BivariateNormal::with_mode(Vec2::ZERO, Matrix2::new(100.0, 0.0, 0.0, 100.0), IntegrationMode::Quadrature)
            .expect("covariance is positive definite");

    match cli.command {
        Commands::Solve { state, variant, samples, json } => {
            let state = dart_aim_solver::checked_state(state).unwrap_or_else(|e| {
                eprintln!("{}: {e}", "error".red().bold());
                std::process::exit(1);
            });
            let game_variant = parse_variant(&variant);
            let game = Game::new(&target, &distribution, game_variant);
            let config = SolverConfig::new(samples, 10_000).unwrap_or_default();
            let solver = DpSolver::new(&game, config);

            let bar = spinner("solving DP...");
            let (value, aim) = solver.solve(state);
            bar.finish_and_clear();

            let greedy = GreedySolver::new(&game, SolverConfig::default());
            let (points, greedy_aim) = greedy.solve(state);

            if json {
                let report = SolveReport {
                    state,
                    variant,
                    expected_throws: value,
                    optimal_aim: aim,
                    greedy_expected_points: points,
                    greedy_aim,
                };
                println!("{}", serde_json::to_string_pretty(&report).expect("report serializes"));
            } else {
                println!("{}", format!("Solving state {state} ({variant})").bold());
                println!("  expected throws: {:.4}", value);
                println!("  optimal aim:     ({:.2}, {:.2})", aim.x, aim.y);
                println!(
                    "  greedy expected points: {:.4} at ({:.2}, {:.2})",
                    points, greedy_aim.x, greedy_aim.y
                );
            }
        }
        Commands::Heatmap { state, variant, rows, cols } => {
            let state = dart_aim_solver::checked_state(state).unwrap_or_else(|e| {
                eprintln!("{}: {e}", "error".red().bold());
                std::process::exit(1);
            });
            let game_variant = parse_variant(&variant);
            let game = Game::new(&target, &distribution, game_variant);
            let solver = DpSolver::new(&game, SolverConfig::default());
            let heatmap = HeatMap::new(&solver);

            let bar = spinner("evaluating heat map...");
            let grid = heatmap.heat_map(state, rows, cols).unwrap_or_else(|e| {
                bar.finish_and_clear();
                eprintln!("{}: {e}", "error".red().bold());
                std::process::exit(1);
            });
            bar.finish_and_clear();

            let mut table = Table::new();
            for r in 0..grid.rows {
                let cells: Vec<prettytable::Cell> = (0..grid.cols)
                    .map(|c| prettytable::Cell::new(&format!("{:.2}", grid.get(r, c))))
                    .collect();
                table.add_row(prettytable::Row::new(cells));
            }
            table.printstd();
        }
    }
}
