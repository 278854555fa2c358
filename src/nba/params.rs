use core::fmt;
use std::fmt::Display;

use chrono::{Datelike, NaiveDate};

pub enum GameID {
    ID(String)
}

pub enum TeamID {
    ID(i64)
}

pub enum Period {
    P(i8)
}

pub enum LeagueID {
    NBA,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Season {
    S(String)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeasonType {
    RegularSeason,
    Playoffs,
}

pub struct StartPeriod(Period);
pub struct EndPeriod(Period);

impl SeasonType {
    pub const ALL: [SeasonType; 2] = [SeasonType::RegularSeason, SeasonType::Playoffs];

    pub fn name(&self) -> &'static str {
        match self {
            SeasonType::RegularSeason => "Regular Season",
            SeasonType::Playoffs => "Playoffs",
        }
    }
}

impl Season {
    /// The season in progress on `date`. Seasons tip off in October, so
    /// anything before that belongs to the season that started the year before.
    pub fn containing(date: NaiveDate) -> Self {
        let first_year = if date.month() >= 10 { date.year() } else { date.year() - 1 };
        Season::S(format!("{}-{:02}", first_year, (first_year + 1) % 100))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Season::S(season) => season,
        }
    }
}

impl Display for GameID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameID::ID(id) => {
                write!(f, "GameID={}", id)
            }
        }
    }
}

impl Display for TeamID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TeamID::ID(id) => write!(f, "TeamID={}", id)
        }
    }
}

impl Display for StartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Period::P(period_num) => write!(f, "StartPeriod={}",period_num)
        }
    }
}

impl Display for EndPeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Period::P(period_num) => write!(f, "EndPeriod={}",period_num)
        }
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Season::S(season) => write!(f, "Season={}", season)
        }
    }
}

impl Display for SeasonType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SeasonType={}", self.name().replace(' ', "+"))
    }
}

impl Display for LeagueID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LeagueID::NBA => write!(f, "LeagueID=00")
        }
    }
}

impl Default for LeagueID {
    fn default() -> Self { LeagueID::NBA }
}

impl Default for Season {
    fn default() -> Self {
        Season::containing(chrono::Local::now().date_naive())
    }
}

// Period 0 asks for the whole game.
impl Default for StartPeriod {
    fn default() -> Self { StartPeriod(Period::P(0)) }
}

impl Default for EndPeriod {
    fn default() -> Self { EndPeriod(Period::P(0)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_rolls_over_in_october() {
        let april = NaiveDate::from_ymd_opt(2025, 4, 13).unwrap();
        let october = NaiveDate::from_ymd_opt(2025, 10, 21).unwrap();
        assert_eq!(Season::containing(april).as_str(), "2024-25");
        assert_eq!(Season::containing(october).as_str(), "2025-26");
    }

    #[test]
    fn season_handles_century_turn() {
        let date = NaiveDate::from_ymd_opt(2099, 11, 1).unwrap();
        assert_eq!(Season::containing(date).as_str(), "2099-00");
    }

    #[test]
    fn params_render_as_query_pairs() {
        assert_eq!(SeasonType::RegularSeason.to_string(), "SeasonType=Regular+Season");
        assert_eq!(SeasonType::Playoffs.to_string(), "SeasonType=Playoffs");
        assert_eq!(TeamID::ID(1610612739).to_string(), "TeamID=1610612739");
        assert_eq!(GameID::ID("0042400101".to_string()).to_string(), "GameID=0042400101");
        assert_eq!(StartPeriod::default().to_string(), "StartPeriod=0");
        assert_eq!(LeagueID::default().to_string(), "LeagueID=00");
    }
}
