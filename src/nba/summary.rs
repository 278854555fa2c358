use tabled::{Table, Tabled};

use crate::nba::first_basket::FirstBasketRecord;

#[derive(Tabled, Debug, PartialEq)]
pub struct PlayerTotal {
    player: String,
    team: String,
    first_baskets: usize,
}

/// One line per player, most first baskets first, ties by name. Baskets
/// with no scorer name are left off.
pub fn leaderboard(first_baskets: &[FirstBasketRecord]) -> Vec<PlayerTotal> {
    let mut totals: Vec<PlayerTotal> = Vec::new();
    for record in first_baskets {
        if record.player_name.trim().is_empty() || totals.iter().any(|t| t.player == record.player_name) {
            continue;
        }
        totals.push(PlayerTotal {
            player: record.player_name.clone(),
            team: record.team.clone(),
            first_baskets: record.player_first_basket_total,
        });
    }
    totals.sort_by(|a, b| b.first_baskets.cmp(&a.first_baskets).then_with(|| a.player.cmp(&b.player)));
    totals
}

pub fn print_leaderboard(first_baskets: &[FirstBasketRecord]) {
    let totals = leaderboard(first_baskets);
    if totals.is_empty() {
        return;
    }
    println!("{}", Table::new(totals));
}
