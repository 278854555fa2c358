use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::nba::endpoints::StatsFetcher;
use crate::nba::error::Result;
use crate::nba::first_basket::{attach_player_totals, collect_first_baskets, Pacing};
use crate::nba::game_log::{fetch_game_logs, select_recent_games};
use crate::nba::params::{Season, SeasonType};
use crate::nba::summary::print_leaderboard;
use crate::nba::teams::TeamTable;
use crate::nba::writer::write_first_baskets;

pub const DEFAULT_RECENT_GAMES: usize = 30;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub season: Season,
    pub season_types: Vec<SeasonType>,
    pub recent_games: usize,
    pub pacing: Pacing,
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            season: Default::default(),
            season_types: SeasonType::ALL.to_vec(),
            recent_games: DEFAULT_RECENT_GAMES,
            pacing: Default::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum RunOutcome {
    Written { path: PathBuf, records: usize },
    NothingRecorded,
}

/// Shows the available codes and reads one line of input.
pub fn prompt_team(input: &mut dyn BufRead, output: &mut dyn Write, teams: &TeamTable) -> Result<String> {
    writeln!(output, "\nAvailable Teams:")?;
    writeln!(output, "{}\n", teams.abbreviations().join(" | "))?;
    write!(output, "Enter team abbreviation (e.g. CLE, LAL, BOS): ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub fn run(config: &RunConfig, teams: &TeamTable, team_input: &str, fetcher: &dyn StatsFetcher) -> Result<RunOutcome> {
    let team = teams.resolve(team_input)?;
    log::info!("Looking up first baskets for {} ({}) in {}", team.full_name, team.abbreviation, config.season.as_str());

    let game_logs = fetch_game_logs(fetcher, team, &config.season, &config.season_types)?;
    let recent_games = select_recent_games(game_logs, config.recent_games)?;
    for game in &recent_games {
        log::debug!("{} {} {} ({})", game.game_id, game.game_date, game.matchup, game.season_type.name());
    }

    let first_baskets = collect_first_baskets(fetcher, &recent_games, &config.pacing, Vec::new());
    if first_baskets.is_empty() {
        println!("\nNo first baskets were recorded.");
        return Ok(RunOutcome::NothingRecorded);
    }
    let first_baskets = attach_player_totals(first_baskets);

    let path = write_first_baskets(&config.output_dir, team.abbreviation, &first_baskets)?;
    println!("\nSaved results with total counts to {}", path.display());
    print_leaderboard(&first_baskets);
    Ok(RunOutcome::Written { path, records: first_baskets.len() })
}
