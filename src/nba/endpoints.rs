use crate::nba::error::{FirstBasketError, Result};
use crate::nba::params::*;
use polars::prelude::*;
use serde_json::Value;
use std::{collections::HashMap, time::{Duration, Instant}};

const NBA_BASE_URL: &str = "https://stats.nba.com/stats";

static JSON_NULL: Value = Value::Null;

/// Anything that can turn a stats URL into its JSON body. The live
/// implementation is [`StatsClient`]; tests swap in canned responses.
pub trait StatsFetcher {
    fn fetch_json(&self, endpoint_url: &str) -> Result<Value>;
}

pub trait NBAEndpoint {
    fn endpoint_url(&self) -> String;

    fn send_request(&self, fetcher: &dyn StatsFetcher) -> Result<Value> {
        fetcher.fetch_json(&self.endpoint_url())
    }
}

pub trait SaveToDataframe: NBAEndpoint {
    fn load_dataframes(&self, fetcher: &dyn StatsFetcher) -> Result<HashMap<String, DataFrame>> {
        let endpoint_json = self.send_request(fetcher)?;
        let load_start = Instant::now();
        let stats_dataframes = result_sets_to_dataframes(&endpoint_json)?;
        log::debug!("dataframe loading took {:?}", load_start.elapsed());
        Ok(stats_dataframes)
    }
}

pub struct TeamGameLog {
    pub team_id: TeamID,
    pub season: Season,
    pub season_type: SeasonType,
    pub league_id: LeagueID,
}

pub struct PlayByPlayV2 {
    pub start_period: StartPeriod,
    pub end_period: EndPeriod,
    pub game_id: GameID,
}

impl TeamGameLog {
    pub fn new(team_id: i64, season: Season, season_type: SeasonType) -> Self {
        TeamGameLog {
            team_id: TeamID::ID(team_id),
            season,
            season_type,
            league_id: Default::default(),
        }
    }
}

impl PlayByPlayV2 {
    pub fn new(game_id: &str) -> Self {
        PlayByPlayV2 {
            start_period: Default::default(),
            end_period: Default::default(),
            game_id: GameID::ID(game_id.to_string()),
        }
    }
}

impl NBAEndpoint for TeamGameLog {
    fn endpoint_url(&self) -> String {
        format!("{}/teamgamelog?{}&{}&{}&{}&DateFrom=&DateTo=", NBA_BASE_URL, self.team_id, self.season, self.season_type, self.league_id)
    }
}

impl NBAEndpoint for PlayByPlayV2 {
    fn endpoint_url(&self) -> String {
        format!("{}/playbyplayv2?{}&{}&{}", NBA_BASE_URL, self.game_id, self.end_period, self.start_period)
    }
}

impl SaveToDataframe for TeamGameLog {
}

impl SaveToDataframe for PlayByPlayV2 {
}

/// Blocking client for stats.nba.com. The endpoint refuses requests that
/// don't look like they came from a browser.
pub struct StatsClient {
    agent: ureq::Agent,
}

impl StatsClient {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        StatsClient { agent }
    }
}

impl StatsFetcher for StatsClient {
    fn fetch_json(&self, endpoint_url: &str) -> Result<Value> {
        log::debug!("GET {}", endpoint_url);
        let r = self.agent.get(endpoint_url)
        .set("Host","stats.nba.com")
        .set("User-Agent","Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:72.0) Gecko/20100101 Firefox/72.0")
        .set("Accept","application/json, text/plain, */*")
        .set("Accept-Language","en-US,en;q=0.5")
        .set("Connection","keep-alive")
        .set("Referer","https://stats.nba.com/")
        .set("Pragma","no-cache")
        .set("Cache-Control","no-cache")
        .call()?;
        Ok(r.into_json()?)
    }
}

/// Loads every `resultSets` entry into a DataFrame keyed by its name. Column
/// types come from the first non-null value; nulls are kept as nulls.
pub fn result_sets_to_dataframes(endpoint_json: &Value) -> Result<HashMap<String, DataFrame>> {
    let result_sets = endpoint_json["resultSets"].as_array()
        .ok_or_else(|| FirstBasketError::MalformedResponse("no resultSets array".to_string()))?;
    let mut stats_dataframes: HashMap<String, DataFrame> = HashMap::new();
    for data_set in result_sets {
        let data_set_name = data_set["name"].as_str()
            .ok_or_else(|| FirstBasketError::MalformedResponse("result set without a name".to_string()))?;
        let data_set_headers = data_set["headers"].as_array()
            .ok_or_else(|| FirstBasketError::MalformedResponse(format!("{} has no headers", data_set_name)))?;
        let data_set_values = data_set["rowSet"].as_array()
            .ok_or_else(|| FirstBasketError::MalformedResponse(format!("{} has no rowSet", data_set_name)))?;

        let mut columns: Vec<Vec<&Value>> = vec![Vec::with_capacity(data_set_values.len()); data_set_headers.len()];
        for row in data_set_values {
            let row_array = row.as_array()
                .ok_or_else(|| FirstBasketError::MalformedResponse(format!("{} row is not an array", data_set_name)))?;
            for (pos, column) in columns.iter_mut().enumerate() {
                column.push(row_array.get(pos).unwrap_or(&JSON_NULL));
            }
        }

        let mut df_series: Vec<Series> = Vec::with_capacity(columns.len());
        for (header, json_values) in data_set_headers.iter().zip(columns) {
            let col_name = header.as_str()
                .ok_or_else(|| FirstBasketError::MalformedResponse(format!("{} has a non-string header", data_set_name)))?;
            df_series.push(json_values_to_series(col_name, &json_values));
        }
        stats_dataframes.insert(data_set_name.to_string(), DataFrame::new(df_series)?);
    }
    Ok(stats_dataframes)
}

fn json_values_to_series(col_name: &str, json_values: &[&Value]) -> Series {
    match json_values.iter().find(|v| !v.is_null()) {
        Some(v) if v.is_i64() => {
            let typed_data = json_values.iter().map(|v| v.as_i64()).collect::<Vec<Option<i64>>>();
            Series::new(col_name, typed_data)
        }
        Some(v) if v.is_f64() => {
            let typed_data = json_values.iter().map(|v| v.as_f64()).collect::<Vec<Option<f64>>>();
            Series::new(col_name, typed_data)
        }
        _ => {
            let typed_data = json_values.iter().map(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            }).collect::<Vec<Option<String>>>();
            Series::new(col_name, typed_data)
        }
    }
}

pub fn take_result_set(mut frames: HashMap<String, DataFrame>, name: &str) -> Result<DataFrame> {
    frames.remove(name).ok_or_else(|| FirstBasketError::MissingResultSet(name.to_string()))
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    if !df.get_column_names().contains(&name) {
        return Err(FirstBasketError::MissingColumn(name.to_string()));
    }
    Ok(df.column(name)?)
}

pub fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let typed = column(df, name)?.cast(&DataType::Int64)?;
    Ok(typed.i64()?.into_iter().collect())
}

pub fn str_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let typed = column(df, name)?.cast(&DataType::Utf8)?;
    Ok(typed.utf8()?.into_iter().map(|v| v.map(str::to_string)).collect())
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::RefCell;

    /// Answers with the first canned body whose fragment appears in the URL
    /// (e.g. `GameID=0022400001`) and records every URL it was asked for.
    #[derive(Default)]
    pub struct CannedFetcher {
        responses: Vec<(String, Value)>,
        pub requested: RefCell<Vec<String>>,
    }

    impl CannedFetcher {
        pub fn with(mut self, url_fragment: &str, body: Value) -> Self {
            self.responses.push((url_fragment.to_string(), body));
            self
        }
    }

    impl StatsFetcher for CannedFetcher {
        fn fetch_json(&self, endpoint_url: &str) -> Result<Value> {
            self.requested.borrow_mut().push(endpoint_url.to_string());
            self.responses.iter()
                .find(|(fragment, _)| endpoint_url.contains(fragment.as_str()))
                .map(|(_, body)| body.clone())
                .ok_or_else(|| FirstBasketError::MalformedResponse(format!("no canned response for {}", endpoint_url)))
        }
    }

    pub fn result_set(name: &str, headers: &[&str], rows: Vec<Value>) -> Value {
        serde_json::json!({
            "resource": name.to_lowercase(),
            "resultSets": [{ "name": name, "headers": headers, "rowSet": rows }]
        })
    }
}
