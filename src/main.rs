use battleship_rules::{
    init_logging, rules_from_env, run_match, service, Board, Lobby, MemoryStore, RandomPlayer, Seat,
    SystemClock,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a full bot-versus-bot game through the lobby and game services.
    Simulate {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, help = "Board side length (overrides BATTLESHIP_BOARD_SIDE)")]
        side: Option<usize>,
        #[arg(long, help = "Shots per turn (overrides BATTLESHIP_SHOTS_PER_TURN)")]
        shots: Option<usize>,
        #[arg(long, default_value_t = 10_000)]
        max_plays: usize,
    },
    /// Print the active game rules as JSON.
    Rules,
    /// Parse a board layout string and describe it.
    CheckLayout {
        /// Row-major layout using '#', 'B', 'O' and 'X'.
        layout: String,
    },
}

fn seeded_rng(seed: Option<u64>, offset: u64) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s.wrapping_add(offset)),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            seed,
            side,
            shots,
            max_plays,
        } => {
            let mut rules = rules_from_env()?;
            if let Some(side) = side {
                rules.board_side = side;
            }
            if let Some(shots) = shots {
                rules.shots_per_turn = shots;
            }
            rules.validate().context("invalid rules")?;
            if let Some(s) = seed {
                println!("Using fixed seed: {} (game will be reproducible)", s);
            }

            let store = MemoryStore::new();
            let clock = SystemClock;
            let lobby = Lobby::new(rules);
            let first = Seat::new(1, Box::new(RandomPlayer::new()), seeded_rng(seed, 0));
            let second = Seat::new(2, Box::new(RandomPlayer::new()), seeded_rng(seed, 1));

            let report = run_match(&store, &clock, &lobby, first, second, max_plays).await?;
            let game = service::game(&store, 1, report.game_id).await?;
            for player in game.players() {
                if let Some(board) = game.board(player) {
                    println!("Player {player}:\n{board:?}");
                }
            }
            match report.winner {
                Some(winner) => println!(
                    "Game {} {:?} after {} plays, player {} won",
                    report.game_id, report.state, report.plays, winner
                ),
                None => println!(
                    "Game {} {:?} after {} plays",
                    report.game_id, report.state, report.plays
                ),
            }
        }
        Commands::Rules => {
            let rules = rules_from_env()?;
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
        Commands::CheckLayout { layout } => {
            let board = Board::from_layout(&layout)?;
            print!("{board:?}");
            for (size, count) in board.fleet_composition() {
                println!("{count} ship(s) of size {size}");
            }
            if board.is_fleet_destroyed() {
                println!("Fleet destroyed");
            }
        }
    }

    Ok(())
}
