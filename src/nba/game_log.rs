use core::fmt;
use std::collections::HashSet;
use std::fmt::Display;

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::Serialize;

use crate::nba::endpoints::{str_column, take_result_set, SaveToDataframe, StatsFetcher, TeamGameLog};
use crate::nba::error::{FirstBasketError, Result};
use crate::nba::params::{Season, SeasonType};
use crate::nba::teams::Team;

const PLAYOFF_MARKER: &str = "- P";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameType {
    Regular,
    Playoff,
}

impl Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameType::Regular => write!(f, "Regular"),
            GameType::Playoff => write!(f, "Playoff"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameLogRow {
    pub game_id: String,
    pub game_date: NaiveDate,
    pub matchup: String,
    pub season_type: SeasonType,
    pub opponent: String,
    pub game_type: GameType,
}

/// Reads the opponent out of a matchup like `CLE vs. BOS` or `CLE @ BOS - P`.
/// The team has to be one of the two codes on either side of the separator.
pub fn get_opponent(matchup: &str, team_abbr: &str) -> Result<String> {
    let malformed = || FirstBasketError::MalformedMatchup {
        matchup: matchup.to_string(),
        team: team_abbr.to_string(),
    };
    let parts: Vec<&str> = matchup.split_whitespace().collect();
    let (first, separator, second) = match parts.as_slice() {
        [first, separator, second, ..] => (*first, *separator, *second),
        _ => return Err(malformed()),
    };
    if separator != "vs." && separator != "@" {
        return Err(malformed());
    }
    if first == team_abbr {
        Ok(second.to_string())
    } else if second == team_abbr {
        Ok(first.to_string())
    } else {
        Err(malformed())
    }
}

pub fn get_game_type(matchup: &str) -> GameType {
    if matchup.contains(PLAYOFF_MARKER) {
        GameType::Playoff
    } else {
        GameType::Regular
    }
}

/// Game logs print dates as `APR 13, 2025`; ISO dates are accepted too.
pub fn parse_game_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%b %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d"))
        .map_err(|_| FirstBasketError::InvalidGameDate(raw.to_string()))
}

/// Turns a `TeamGameLog` result set into rows. Rows that can't be parsed
/// are logged and left out.
pub fn rows_from_dataframe(df: &DataFrame, team_abbr: &str, season_type: SeasonType) -> Result<Vec<GameLogRow>> {
    let game_ids = str_column(df, "Game_ID")?;
    let game_dates = str_column(df, "GAME_DATE")?;
    let matchups = str_column(df, "MATCHUP")?;

    let mut rows = Vec::with_capacity(game_ids.len());
    for ((game_id, game_date), matchup) in game_ids.into_iter().zip(game_dates).zip(matchups) {
        let (game_id, game_date, matchup) = match (game_id, game_date, matchup) {
            (Some(id), Some(date), Some(matchup)) => (id, date, matchup),
            _ => {
                log::warn!("Skipping {} game log row with missing fields", season_type.name());
                continue;
            }
        };
        let parsed = parse_game_date(&game_date)
            .and_then(|date| get_opponent(&matchup, team_abbr).map(|opponent| (date, opponent)));
        match parsed {
            Ok((game_date, opponent)) => rows.push(GameLogRow {
                game_type: get_game_type(&matchup),
                game_id,
                game_date,
                matchup,
                season_type,
                opponent,
            }),
            Err(e) => log::warn!("Skipping game {}: {}", game_id, e),
        }
    }
    Ok(rows)
}

fn fetch_season_type(fetcher: &dyn StatsFetcher, team: &Team, season: &Season, season_type: SeasonType) -> Result<Vec<GameLogRow>> {
    let endpoint = TeamGameLog::new(team.id, season.clone(), season_type);
    let frames = endpoint.load_dataframes(fetcher)?;
    let df = take_result_set(frames, "TeamGameLog")?;
    rows_from_dataframe(&df, team.abbreviation, season_type)
}

/// Pulls the team's games for each season type. A season type that fails is
/// logged and skipped; it's only an error when nothing comes back at all.
pub fn fetch_game_logs(fetcher: &dyn StatsFetcher, team: &Team, season: &Season, season_types: &[SeasonType]) -> Result<Vec<GameLogRow>> {
    let mut game_logs = Vec::new();
    for &season_type in season_types {
        match fetch_season_type(fetcher, team, season, season_type) {
            Ok(rows) if rows.is_empty() => {
                log::warn!("No games found for {}", season_type.name());
            }
            Ok(rows) => {
                println!("Loaded {} {} games", rows.len(), season_type.name());
                game_logs.extend(rows);
            }
            Err(e) => {
                log::warn!("Skipping {} due to error: {}", season_type.name(), e);
            }
        }
    }
    if game_logs.is_empty() {
        return Err(FirstBasketError::NoGamesFound);
    }
    Ok(game_logs)
}

/// Most recent `limit` games, newest first, each game id once.
pub fn select_recent_games(mut game_logs: Vec<GameLogRow>, limit: usize) -> Result<Vec<GameLogRow>> {
    game_logs.sort_by(|a, b| b.game_date.cmp(&a.game_date));
    let mut seen = HashSet::new();
    game_logs.retain(|row| seen.insert(row.game_id.clone()));
    game_logs.truncate(limit);
    if game_logs.is_empty() {
        return Err(FirstBasketError::NoRecentGames);
    }
    Ok(game_logs)
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::testing::*;
    use crate::nba::endpoints::testing::CannedFetcher;
    use chrono::Duration;

    fn bos() -> Team {
        Team { id: 2, abbreviation: "BOS", full_name: "Boston Celtics" }
    }

    fn row(game_id: &str, date: NaiveDate) -> GameLogRow {
        GameLogRow {
            game_id: game_id.to_string(),
            game_date: date,
            matchup: "BOS vs. NYK".to_string(),
            season_type: SeasonType::RegularSeason,
            opponent: "NYK".to_string(),
            game_type: GameType::Regular,
        }
    }

    #[test]
    fn opponent_is_the_other_code() {
        for matchup in ["CLE vs. BOS", "CLE @ BOS", "CLE @ BOS - P", "CLE vs. BOS - P"] {
            assert_eq!(get_opponent(matchup, "CLE").unwrap(), "BOS", "{}", matchup);
            assert_eq!(get_opponent(matchup, "BOS").unwrap(), "CLE", "{}", matchup);
        }
    }

    #[test]
    fn playoff_matchup_scenario() {
        assert_eq!(get_opponent("CLE @ BOS - P", "CLE").unwrap(), "BOS");
        assert_eq!(get_game_type("CLE @ BOS - P"), GameType::Playoff);
        assert_eq!(get_game_type("CLE @ BOS - P").to_string(), "Playoff");
    }

    #[test]
    fn game_type_depends_only_on_marker() {
        assert_eq!(get_game_type("CLE vs. BOS"), GameType::Regular);
        assert_eq!(get_game_type("CLE @ BOS"), GameType::Regular);
        assert_eq!(get_game_type("CLE vs. BOS - P"), GameType::Playoff);
    }

    #[test]
    fn malformed_matchups_are_errors() {
        for matchup in ["", "CLE", "CLE BOS", "CLE v BOS", "NYK @ MIA"] {
            assert!(
                matches!(get_opponent(matchup, "CLE"), Err(FirstBasketError::MalformedMatchup { .. })),
                "{:?}",
                matchup
            );
        }
    }

    #[test]
    fn game_dates_parse_in_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 4, 13).unwrap();
        assert_eq!(parse_game_date("APR 13, 2025").unwrap(), expected);
        assert_eq!(parse_game_date("Apr 13, 2025").unwrap(), expected);
        assert_eq!(parse_game_date("2025-04-13").unwrap(), expected);
        assert_eq!(parse_game_date("2025-04-13T00:00:00").unwrap(), expected);
        assert!(parse_game_date("yesterday").is_err());
    }

    #[test]
    fn selection_is_newest_first_without_duplicates() {
        let start = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap();
        let mut rows: Vec<GameLogRow> = (0..12)
            .map(|i| row(&format!("g{:02}", i), start + Duration::days(i * 2)))
            .collect();
        rows.push(row("g11", start + Duration::days(22)));
        let selected = select_recent_games(rows, 5).unwrap();
        let ids: Vec<&str> = selected.iter().map(|r| r.game_id.as_str()).collect();
        assert_eq!(ids, vec!["g11", "g10", "g09", "g08", "g07"]);
        assert!(selected.windows(2).all(|w| w[0].game_date >= w[1].game_date));
    }

    #[test]
    fn selection_takes_everything_when_short() {
        let start = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap();
        let rows = vec![row("a", start), row("b", start + Duration::days(1))];
        assert_eq!(select_recent_games(rows, 30).unwrap().len(), 2);
        assert!(matches!(select_recent_games(Vec::new(), 30), Err(FirstBasketError::NoRecentGames)));
    }

    #[test]
    fn thirty_five_games_across_season_types_select_thirty() {
        let start = NaiveDate::from_ymd_opt(2024, 10, 22).unwrap();
        let regular: Vec<_> = (0..30)
            .map(|i| {
                let date = (start + Duration::days(i * 3)).format("%b %d, %Y").to_string().to_uppercase();
                game_log_row(2, &format!("00224{:05}", i), &date, "BOS vs. NYK")
            })
            .collect();
        let playoffs: Vec<_> = (0..5)
            .map(|i| {
                let date = (start + Duration::days(200 + i)).format("%b %d, %Y").to_string().to_uppercase();
                game_log_row(2, &format!("00424{:05}", i), &date, "BOS @ MIA - P")
            })
            .collect();
        let fetcher = CannedFetcher::default()
            .with("SeasonType=Regular+Season", game_log_body(regular))
            .with("SeasonType=Playoffs", game_log_body(playoffs));

        let logs = fetch_game_logs(&fetcher, &bos(), &Season::S("2024-25".to_string()), &SeasonType::ALL).unwrap();
        assert_eq!(logs.len(), 35);
        let selected = select_recent_games(logs, 30).unwrap();
        assert_eq!(selected.len(), 30);
        assert_eq!(selected[0].game_id, "0042400004");
        assert_eq!(selected[0].game_type, GameType::Playoff);
        assert_eq!(selected[0].opponent, "MIA");
        assert_eq!(selected[0].season_type, SeasonType::Playoffs);
        // the five oldest regular season games fall off
        assert!(selected.iter().all(|r| r.game_id.as_str() >= "0022400005"));
    }

    #[test]
    fn failed_season_type_is_skipped() {
        let fetcher = CannedFetcher::default().with(
            "SeasonType=Regular+Season",
            game_log_body(vec![game_log_row(2, "0022400001", "OCT 22, 2024", "BOS vs. NYK")]),
        );
        let logs = fetch_game_logs(&fetcher, &bos(), &Season::S("2024-25".to_string()), &SeasonType::ALL).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(fetcher.requested.borrow().len(), 2);
    }

    #[test]
    fn nothing_fetched_is_no_games_found() {
        let fetcher = CannedFetcher::default().with("SeasonType=Playoffs", game_log_body(Vec::new()));
        let err = fetch_game_logs(&fetcher, &bos(), &Season::S("2024-25".to_string()), &SeasonType::ALL).unwrap_err();
        assert!(matches!(err, FirstBasketError::NoGamesFound));
    }

    #[test]
    fn unparseable_rows_are_dropped() {
        let fetcher = CannedFetcher::default().with(
            "SeasonType=Regular+Season",
            game_log_body(vec![
                game_log_row(2, "0022400001", "OCT 22, 2024", "BOS vs. NYK"),
                game_log_row(2, "0022400002", "not a date", "BOS vs. NYK"),
                game_log_row(2, "0022400003", "OCT 26, 2024", "garbage"),
            ]),
        );
        let logs = fetch_game_logs(&fetcher, &bos(), &Season::S("2024-25".to_string()), &[SeasonType::RegularSeason]).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].game_id, "0022400001");
    }
}
