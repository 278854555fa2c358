mod nba;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use nba::endpoints::StatsClient;
use nba::first_basket::Pacing;
use nba::params::{Season, SeasonType};
use nba::pipeline::{RunConfig, RunOutcome, DEFAULT_RECENT_GAMES};
use nba::teams::TeamTable;

/// Who scored first in a team's most recent games.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct FirstBasketCli {
    /// Team abbreviation, e.g. CLE. Prompted for when left out.
    #[clap(short, long)]
    team: Option<String>,

    /// Season as YYYY-YY. Defaults to the season in progress.
    #[clap(short, long)]
    season: Option<String>,

    #[clap(short, long, default_value_t = DEFAULT_RECENT_GAMES)]
    games: usize,

    /// Pause before each play-by-play request, in milliseconds.
    #[clap(long, env = "FIRSTBASKET_DELAY_MS", default_value_t = 1000)]
    delay_ms: u64,

    #[clap(long, default_value_t = 30)]
    timeout_secs: u64,

    #[clap(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Skip the playoffs request.
    #[clap(long)]
    regular_only: bool,
}

impl FirstBasketCli {
    fn run_config(&self) -> RunConfig {
        let season = self.season.clone().map(Season::S).unwrap_or_default();
        let season_types = if self.regular_only {
            vec![SeasonType::RegularSeason]
        } else {
            SeasonType::ALL.to_vec()
        };
        RunConfig {
            season,
            season_types,
            recent_games: self.games,
            pacing: Pacing::fixed(Duration::from_millis(self.delay_ms)),
            output_dir: self.output_dir.clone(),
        }
    }
}

fn init_logging() {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "firstbasket=info");
    }
    pretty_env_logger::init();
}

fn main() -> Result<()> {
    init_logging();
    let args = FirstBasketCli::parse();
    let config = args.run_config();
    let teams = TeamTable::nba();

    let team_input = match &args.team {
        Some(t) => t.clone(),
        None => {
            let stdin = io::stdin();
            nba::pipeline::prompt_team(&mut stdin.lock(), &mut io::stdout(), &teams)
                .context("failed to read team abbreviation")?
        }
    };

    let client = StatsClient::new(Duration::from_secs(args.timeout_secs));
    let outcome = nba::pipeline::run(&config, &teams, &team_input, &client)
        .with_context(|| format!("first basket run for {} failed", team_input.trim().to_uppercase()))?;
    if let RunOutcome::Written { path, records } = outcome {
        log::info!("{} first baskets written to {}", records, path.display());
    }
    Ok(())
}
