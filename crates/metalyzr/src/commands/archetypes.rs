//! Archetypes command

use anyhow::Result;
use metalyzr_client::api::ArchetypeQuery;
use metalyzr_core::types::Archetype;
use tabled::{settings::Style, Table, Tabled};

use super::{api, load_config, request_failed};
use crate::cli::ArchetypesArgs;
use crate::output;

#[derive(Tabled)]
struct ArchetypeRow {
    id: u64,
    name: String,
    format: String,
    category: String,
    colors: String,
    decks: String,
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

impl From<&Archetype> for ArchetypeRow {
    fn from(a: &Archetype) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            format: a.format.clone(),
            category: or_dash(a.category.as_deref()),
            colors: or_dash(a.color_identity.as_deref()),
            decks: a
                .deck_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub async fn run(args: ArchetypesArgs, api_url: Option<&str>) -> Result<()> {
    let config = load_config(api_url)?;
    let api = api(&config)?;
    let query = ArchetypeQuery {
        format: args.format,
        category: args.category,
    };

    let spinner = output::spinner("Fetching archetypes...");
    let result = api.archetypes(&query).await;
    spinner.finish_and_clear();
    let archetypes = result.map_err(request_failed)?;

    if args.json {
        return output::json(&archetypes);
    }

    if archetypes.is_empty() {
        output::info("No archetypes found");
        return Ok(());
    }

    let rows: Vec<ArchetypeRow> = archetypes.iter().map(ArchetypeRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);
    Ok(())
}
