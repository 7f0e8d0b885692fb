use battleship_rules::prelude::*;
use battleship_rules::{run_match, RandomPlayer, Seat, SystemClock};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let store = MemoryStore::new();
    let lobby = Lobby::new(default_rules());
    let p1 = Seat::new(1, Box::new(RandomPlayer::new()), SmallRng::seed_from_u64(seed1));
    let p2 = Seat::new(2, Box::new(RandomPlayer::new()), SmallRng::seed_from_u64(seed2));

    let report = run_match(&store, &SystemClock, &lobby, p1, p2, 10_000).await?;

    let winner = match report.winner {
        Some(1) => Some("player1"),
        Some(2) => Some("player2"),
        _ => None,
    };

    let result = json!({
        "game": report.game_id,
        "state": format!("{:?}", report.state),
        "plays": report.plays,
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
