use std::collections::BTreeMap;

use crate::nba::error::{FirstBasketError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    pub id: i64,
    pub abbreviation: &'static str,
    pub full_name: &'static str,
}

// Franchise ids never change, so they live here instead of behind a request.
pub const NBA_TEAMS: &[Team] = &[
    Team { id: 1610612737, abbreviation: "ATL", full_name: "Atlanta Hawks" },
    Team { id: 1610612738, abbreviation: "BOS", full_name: "Boston Celtics" },
    Team { id: 1610612739, abbreviation: "CLE", full_name: "Cleveland Cavaliers" },
    Team { id: 1610612740, abbreviation: "NOP", full_name: "New Orleans Pelicans" },
    Team { id: 1610612741, abbreviation: "CHI", full_name: "Chicago Bulls" },
    Team { id: 1610612742, abbreviation: "DAL", full_name: "Dallas Mavericks" },
    Team { id: 1610612743, abbreviation: "DEN", full_name: "Denver Nuggets" },
    Team { id: 1610612744, abbreviation: "GSW", full_name: "Golden State Warriors" },
    Team { id: 1610612745, abbreviation: "HOU", full_name: "Houston Rockets" },
    Team { id: 1610612746, abbreviation: "LAC", full_name: "Los Angeles Clippers" },
    Team { id: 1610612747, abbreviation: "LAL", full_name: "Los Angeles Lakers" },
    Team { id: 1610612748, abbreviation: "MIA", full_name: "Miami Heat" },
    Team { id: 1610612749, abbreviation: "MIL", full_name: "Milwaukee Bucks" },
    Team { id: 1610612750, abbreviation: "MIN", full_name: "Minnesota Timberwolves" },
    Team { id: 1610612751, abbreviation: "BKN", full_name: "Brooklyn Nets" },
    Team { id: 1610612752, abbreviation: "NYK", full_name: "New York Knicks" },
    Team { id: 1610612753, abbreviation: "ORL", full_name: "Orlando Magic" },
    Team { id: 1610612754, abbreviation: "IND", full_name: "Indiana Pacers" },
    Team { id: 1610612755, abbreviation: "PHI", full_name: "Philadelphia 76ers" },
    Team { id: 1610612756, abbreviation: "PHX", full_name: "Phoenix Suns" },
    Team { id: 1610612757, abbreviation: "POR", full_name: "Portland Trail Blazers" },
    Team { id: 1610612758, abbreviation: "SAC", full_name: "Sacramento Kings" },
    Team { id: 1610612759, abbreviation: "SAS", full_name: "San Antonio Spurs" },
    Team { id: 1610612760, abbreviation: "OKC", full_name: "Oklahoma City Thunder" },
    Team { id: 1610612761, abbreviation: "TOR", full_name: "Toronto Raptors" },
    Team { id: 1610612762, abbreviation: "UTA", full_name: "Utah Jazz" },
    Team { id: 1610612763, abbreviation: "MEM", full_name: "Memphis Grizzlies" },
    Team { id: 1610612764, abbreviation: "WAS", full_name: "Washington Wizards" },
    Team { id: 1610612765, abbreviation: "DET", full_name: "Detroit Pistons" },
    Team { id: 1610612766, abbreviation: "CHA", full_name: "Charlotte Hornets" },
];

/// Abbreviation to team lookup. Keys are stored uppercase.
pub struct TeamTable {
    teams: BTreeMap<String, Team>,
}

impl TeamTable {
    pub fn new(teams: &[Team]) -> Self {
        let teams = teams.iter()
            .map(|t| (t.abbreviation.to_uppercase(), *t))
            .collect();
        TeamTable { teams }
    }

    pub fn nba() -> Self {
        TeamTable::new(NBA_TEAMS)
    }

    /// Sorted abbreviations, for showing the user what they can pick.
    pub fn abbreviations(&self) -> Vec<&str> {
        self.teams.keys().map(String::as_str).collect()
    }

    pub fn resolve(&self, input: &str) -> Result<&Team> {
        let abbr = input.trim().to_uppercase();
        self.teams.get(&abbr).ok_or(FirstBasketError::InvalidTeam(abbr))
    }
}
