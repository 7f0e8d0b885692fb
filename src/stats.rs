use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::{Game, GameState, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    pub rank: usize,
    pub player: PlayerId,
    pub total_games: usize,
    pub wins: usize,
}

/// Rank every player who finished at least one game: most wins first, then
/// fewest games played, then player id. Players with equal wins and games
/// share a rank.
pub fn leaderboard(games: &[Game]) -> Vec<PlayerStatistics> {
    let mut tally: BTreeMap<PlayerId, (usize, usize)> = BTreeMap::new();
    for game in games.iter().filter(|g| g.state() == GameState::Finished) {
        let winner = game.winner().ok();
        for player in game.players() {
            let (total, wins) = tally.entry(player).or_default();
            *total += 1;
            if winner == Some(player) {
                *wins += 1;
            }
        }
    }

    let mut rows: Vec<_> = tally
        .into_iter()
        .map(|(player, (total_games, wins))| PlayerStatistics {
            rank: 0,
            player,
            total_games,
            wins,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(a.total_games.cmp(&b.total_games))
            .then(a.player.cmp(&b.player))
    });

    let mut previous: Option<(usize, usize, usize)> = None;
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = match previous {
            Some((wins, total, rank)) if wins == row.wins && total == row.total_games => rank,
            _ => i + 1,
        };
        previous = Some((row.wins, row.total_games, row.rank));
    }
    rows
}
