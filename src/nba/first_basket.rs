use std::cmp::Reverse;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::Serialize;

use crate::nba::endpoints::{int_column, str_column, take_result_set, PlayByPlayV2, SaveToDataframe, StatsFetcher};
use crate::nba::error::{FirstBasketError, Result};
use crate::nba::game_log::{GameLogRow, GameType};

/// EVENTMSGTYPE for a made field goal.
pub const FIELD_GOAL_MADE: i64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    pub event_num: Option<i64>,
    pub event_type: Option<i64>,
    pub period: Option<i64>,
    /// Tenths of a second left in the period.
    pub clock_remaining: Option<u32>,
    pub player_name: Option<String>,
    pub team_abbreviation: Option<String>,
    pub home_description: Option<String>,
    pub visitor_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstBasketRecord {
    #[serde(rename = "GAME_ID")]
    pub game_id: String,
    #[serde(rename = "GAME_DATE")]
    pub game_date: NaiveDate,
    #[serde(rename = "GAME_TYPE")]
    pub game_type: GameType,
    #[serde(rename = "PLAYER_NAME")]
    pub player_name: String,
    #[serde(rename = "TEAM")]
    pub team: String,
    #[serde(rename = "OPPONENT")]
    pub opponent: String,
    #[serde(rename = "PLAY_DESC")]
    pub play_desc: String,
    #[serde(rename = "PLAYER_FIRST_BASKET_TOTAL")]
    pub player_first_basket_total: usize,
}

/// Blocking pause taken before every play-by-play request so the stats
/// endpoint doesn't start refusing us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub delay: Duration,
}

impl Pacing {
    pub fn fixed(delay: Duration) -> Self {
        Pacing { delay }
    }

    pub fn none() -> Self {
        Pacing { delay: Duration::ZERO }
    }

    pub fn wait(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::fixed(Duration::from_secs(1))
    }
}

/// `PCTIMESTRING` is `M:SS`, sometimes with tenths in the last minute.
pub fn parse_clock(raw: &str) -> Option<u32> {
    let (minutes, seconds) = raw.trim().split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: f64 = seconds.parse().ok()?;
    if !(0.0..60.0).contains(&seconds) {
        return None;
    }
    minutes.checked_mul(600)?.checked_add((seconds * 10.0).round() as u32)
}

pub fn events_from_dataframe(df: &DataFrame) -> Result<Vec<PlayEvent>> {
    let event_nums = int_column(df, "EVENTNUM")?;
    let event_types = int_column(df, "EVENTMSGTYPE")?;
    let periods = int_column(df, "PERIOD")?;
    let clocks = str_column(df, "PCTIMESTRING")?;
    let names = str_column(df, "PLAYER1_NAME")?;
    let teams = str_column(df, "PLAYER1_TEAM_ABBREVIATION")?;
    let home = str_column(df, "HOMEDESCRIPTION")?;
    let visitor = str_column(df, "VISITORDESCRIPTION")?;

    let events = (0..df.height())
        .map(|i| PlayEvent {
            event_num: event_nums[i],
            event_type: event_types[i],
            period: periods[i],
            clock_remaining: clocks[i].as_deref().and_then(parse_clock),
            player_name: names[i].clone(),
            team_abbreviation: teams[i].clone(),
            home_description: home[i].clone(),
            visitor_description: visitor[i].clone(),
        })
        .collect();
    Ok(events)
}

/// Puts events in game order: period, then clock counting down, then event
/// number. Without a period and clock on every event there is nothing to
/// check against, so the provider's order is kept.
pub fn order_chronologically(game_id: &str, events: &mut [PlayEvent]) {
    if events.iter().any(|e| e.period.is_none() || e.clock_remaining.is_none()) {
        log::warn!("Game {} has events without period or clock, keeping feed order", game_id);
        return;
    }
    let in_order = events.windows(2).all(|w| chronological_key(&w[0]) <= chronological_key(&w[1]));
    if !in_order {
        log::debug!("Reordering play-by-play for game {}", game_id);
        events.sort_by_key(chronological_key);
    }
}

fn chronological_key(event: &PlayEvent) -> (Option<i64>, Reverse<Option<u32>>, Option<i64>) {
    (event.period, Reverse(event.clock_remaining), event.event_num)
}

pub fn first_field_goal(events: &[PlayEvent]) -> Option<&PlayEvent> {
    events.iter().find(|e| e.event_type == Some(FIELD_GOAL_MADE))
}

fn non_empty(desc: &Option<String>) -> Option<&str> {
    desc.as_deref().map(str::trim).filter(|d| !d.is_empty())
}

/// Home description unless it's blank, then the visitor's.
pub fn play_description(event: &PlayEvent) -> String {
    non_empty(&event.home_description)
        .or_else(|| non_empty(&event.visitor_description))
        .unwrap_or_default()
        .to_string()
}

/// Builds the record for one game. Totals are filled in by the aggregator.
pub fn first_basket_for_game(fetcher: &dyn StatsFetcher, game: &GameLogRow) -> Result<FirstBasketRecord> {
    let frames = PlayByPlayV2::new(&game.game_id).load_dataframes(fetcher)?;
    let df = take_result_set(frames, "PlayByPlay")?;
    let mut events = events_from_dataframe(&df)?;
    order_chronologically(&game.game_id, &mut events);

    let first_fg = first_field_goal(&events)
        .ok_or_else(|| FirstBasketError::NoScoringPlay(game.game_id.clone()))?;

    if first_fg.player_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        log::warn!("First basket in game {} has no player name", game.game_id);
    }

    Ok(FirstBasketRecord {
        game_id: game.game_id.clone(),
        game_date: game.game_date,
        game_type: game.game_type,
        player_name: first_fg.player_name.clone().unwrap_or_default(),
        team: first_fg.team_abbreviation.clone().unwrap_or_default(),
        opponent: game.opponent.clone(),
        play_desc: play_description(first_fg),
        player_first_basket_total: 0,
    })
}

/// Walks the selected games one at a time, pausing before each request.
/// Games that fail or have no made basket are logged and contribute nothing.
pub fn collect_first_baskets(
    fetcher: &dyn StatsFetcher,
    games: &[GameLogRow],
    pacing: &Pacing,
    mut first_baskets: Vec<FirstBasketRecord>,
) -> Vec<FirstBasketRecord> {
    let total = games.len();
    for (i, game) in games.iter().enumerate() {
        pacing.wait();
        match first_basket_for_game(fetcher, game) {
            Ok(record) => {
                println!("[{}/{}] {} scored first in a {} game vs {}", i + 1, total, record.player_name, record.game_type, record.opponent);
                first_baskets.push(record);
            }
            Err(e) => {
                println!("[{}/{}] Error in game {}: {}", i + 1, total, game.game_id, e);
                log::debug!("game {} skipped: {:?}", game.game_id, e);
            }
        }
    }
    first_baskets
}

/// Counts first baskets per player and stamps every record with its
/// player's count. Record order is unchanged.
pub fn attach_player_totals(mut first_baskets: Vec<FirstBasketRecord>) -> Vec<FirstBasketRecord> {
    let mut player_counts: HashMap<String, usize> = HashMap::new();
    for record in &first_baskets {
        *player_counts.entry(record.player_name.clone()).or_insert(0) += 1;
    }
    for record in &mut first_baskets {
        record.player_first_basket_total = player_counts[&record.player_name];
    }
    first_baskets
}
