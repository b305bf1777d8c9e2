use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use draughts::board::State;
use draughts::engine::{pick_move, AiConfig, Difficulty};
use draughts::error::DraughtsResult;
use draughts::piece::Color;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Level {
    Easy,
    Medium,
    Hard,
}

impl From<Level> for Difficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Easy => Difficulty::Easy,
            Level::Medium => Difficulty::Medium,
            Level::Hard => Difficulty::Hard,
        }
    }
}

/// Play one engine-vs-engine game of draughts.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Difficulty of the Red engine
    #[arg(long, value_enum, default_value = "medium")]
    red: Level,

    /// Difficulty of the Black engine
    #[arg(long, value_enum, default_value = "medium")]
    black: Level,

    /// Stop after this many plies and call the game drawn
    #[arg(long, default_value_t = 150)]
    max_moves: u32,

    /// Random plies played before the engines take over
    #[arg(long, default_value_t = 0)]
    random_openings: u32,

    /// Seed for the random openings
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final state and a summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Summary {
    winner: Option<Color>,
    plies: u32,
    total_evals: u64,
    history: Vec<String>,
    final_state: State,
}

fn play(args: &Args) -> DraughtsResult<Summary> {
    let red = AiConfig::from_difficulty(args.red.into());
    let black = AiConfig::from_difficulty(args.black.into());
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut state = State::initial();
    let mut history = Vec::new();
    let mut total_evals = 0;
    let mut plies = 0;

    while plies < args.max_moves {
        let moves = state.generate_moves();
        if state.is_goal_state(state.turn(), &moves) {
            let winner = state.turn().opposite();
            info!(?winner, plies, "game over");
            return Ok(Summary {
                winner: Some(winner),
                plies,
                total_evals,
                history,
                final_state: state,
            });
        }

        let side = state.turn();
        let (next, description) = if plies < args.random_openings {
            let index = rng.gen_range(0..moves.len());
            let description = moves.describe(index).unwrap_or_default();
            match moves.get(index) {
                Some(mv) => (mv.after, description),
                None => break,
            }
        } else {
            let config = match side {
                Color::Red => &red,
                Color::Black => &black,
            };
            let result = pick_move(&state, config)?;
            total_evals += result.evals;
            info!(?side, evals = result.evals, value = result.value, "engine moved");
            (result.mv.after, result.moves.describe(result.index).unwrap_or_default())
        };

        info!(ply = plies + 1, ?side, "{description}");
        history.push(format!("{side:?} {description}"));
        state = next;
        plies += 1;
    }

    warn!(plies, "move limit reached, game drawn");
    Ok(Summary {
        winner: None,
        plies,
        total_evals,
        history,
        final_state: state,
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!(build = draughts::BUILD_TIMESTAMP, red = ?args.red, black = ?args.black, "starting self-play");

    match play(&args) {
        Ok(summary) => {
            if args.json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{json}"),
                    Err(err) => eprintln!("failed to encode summary: {err}"),
                }
            } else {
                let result = summary
                    .winner
                    .map(|c| format!("{c:?} wins"))
                    .unwrap_or_else(|| "Draw".to_string());
                println!(
                    "{result} after {} plies ({} evaluations)",
                    summary.plies, summary.total_evals
                );
            }
        }
        Err(err) => {
            eprintln!("self-play failed: {err}");
            std::process::exit(1);
        }
    }
}
