//! Live lookup against TheTVDB.
//!
//! Usage: `TVDB_API_KEY=... cargo run --example live_lookup -- 81189 1 5 [end]`

use tokio_util::sync::CancellationToken;
use tvdb_core::{ClientConfig, EpisodeLocator, EpisodeProvider, TvdbClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("TVDB_API_KEY")?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    let series_id = args.first().cloned().unwrap_or_else(|| "81189".to_string());
    let season = args.get(1).map(|s| s.parse::<i32>()).transpose()?.unwrap_or(1);
    let episode = args.get(2).map(|s| s.parse::<i32>()).transpose()?.unwrap_or(1);
    let end = args.get(3).map(|s| s.parse::<i32>()).transpose()?;

    let provider = EpisodeProvider::new(TvdbClient::new(ClientConfig::with_api_key(api_key))?);

    let mut locator = EpisodeLocator {
        index_number: Some(episode),
        parent_index_number: Some(season),
        index_number_end: end,
        ..EpisodeLocator::default()
    };
    locator
        .series_provider_ids
        .insert("Tvdb".to_string(), series_id.clone());

    println!("Looking up series {} S{:02}E{:02}...\n", series_id, season, episode);

    let result = provider.get_metadata(&locator, &CancellationToken::new()).await?;
    if !result.has_metadata {
        println!("No metadata found.");
        return Ok(());
    }

    let item = &result.item;
    println!("Name: {}", item.name.as_deref().unwrap_or("-"));
    println!("Overview: {}", item.overview.as_deref().unwrap_or("-"));
    println!("Premiere: {:?}", item.premiere_date);
    println!("Provider ids: {:?}", item.provider_ids);
    for person in &item.people {
        if person.role.is_empty() {
            println!("  {:?}: {}", person.kind, person.name);
        } else {
            println!("  {:?}: {} as {}", person.kind, person.name, person.role);
        }
    }

    Ok(())
}
