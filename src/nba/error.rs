use thiserror::Error;

#[derive(Error, Debug)]
pub enum FirstBasketError {
    #[error("invalid team abbreviation: {0}")]
    InvalidTeam(String),

    #[error("no games found across any season type")]
    NoGamesFound,

    #[error("no recent game ids found")]
    NoRecentGames,

    #[error("malformed matchup {matchup:?} for team {team}")]
    MalformedMatchup { matchup: String, team: String },

    #[error("invalid game date: {0}")]
    InvalidGameDate(String),

    #[error("result set {0} missing from response")]
    MissingResultSet(String),

    #[error("column {0} missing from result set")]
    MissingColumn(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no made field goal in game {0}")]
    NoScoringPlay(String),

    #[error("request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("dataframe error: {0}")]
    DataFrame(#[from] polars::prelude::PolarsError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ureq::Error> for FirstBasketError {
    fn from(e: ureq::Error) -> Self {
        FirstBasketError::Http(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, FirstBasketError>;
