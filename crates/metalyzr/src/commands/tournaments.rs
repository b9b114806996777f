//! Tournaments command

use anyhow::Result;
use metalyzr_client::api::TournamentQuery;
use metalyzr_core::types::Tournament;
use tabled::{settings::Style, Table, Tabled};

use super::{api, load_config, request_failed};
use crate::cli::TournamentsArgs;
use crate::output;

#[derive(Tabled)]
struct TournamentRow {
    id: u64,
    name: String,
    format: String,
    date: String,
    players: String,
    complete: String,
}

impl From<&Tournament> for TournamentRow {
    fn from(t: &Tournament) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            format: t.format.clone(),
            date: t.date.clone(),
            players: t
                .total_players
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            complete: if t.is_complete { "yes" } else { "no" }.to_string(),
        }
    }
}

pub async fn run(args: TournamentsArgs, api_url: Option<&str>) -> Result<()> {
    let config = load_config(api_url)?;
    let api = api(&config)?;
    let query = TournamentQuery {
        format: args.format,
        limit: args.limit,
        offset: args.offset,
    };

    let spinner = output::spinner("Fetching tournaments...");
    let result = api.tournaments(&query).await;
    spinner.finish_and_clear();
    let tournaments = result.map_err(request_failed)?;

    if args.json {
        return output::json(&tournaments);
    }

    if tournaments.is_empty() {
        output::info("No tournaments found");
        return Ok(());
    }

    let rows: Vec<TournamentRow> = tournaments.iter().map(TournamentRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);
    output::info(&format!("{} tournament(s)", tournaments.len()));
    Ok(())
}
