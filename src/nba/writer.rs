use std::path::{Path, PathBuf};

use csv::Writer;

use crate::nba::error::Result;
use crate::nba::first_basket::FirstBasketRecord;

pub fn output_file_name(team_abbr: &str) -> String {
    format!("{}_recent_first_baskets_all_games.csv", team_abbr)
}

/// Writes one row per record under `output_dir`, replacing any earlier run
/// for the same team. Headers come from the record's serde names.
pub fn write_first_baskets(output_dir: &Path, team_abbr: &str, first_baskets: &[FirstBasketRecord]) -> Result<PathBuf> {
    let path = output_dir.join(output_file_name(team_abbr));
    let mut wtr = Writer::from_path(&path)?;
    for record in first_baskets {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(path)
}
