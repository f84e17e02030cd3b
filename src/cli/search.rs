//! Search command handler
//!
//! Prints address candidates for a free-text query.

use crate::config::Config;
use crate::constants::timing::SUGGESTION_LIMIT;
use crate::error::Result;
use crate::geo::Geocoder;
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Free-text address query
    pub query: String,

    /// Maximum number of candidates
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    let config = Config::load()?;
    let geocoder = config.geocode.backend();

    let limit = args.limit.unwrap_or(SUGGESTION_LIMIT);
    let candidates = geocoder.search(&args.query, limit).await?;

    if candidates.is_empty() {
        println!("No matches for '{}'", args.query);
        return Ok(());
    }

    for (i, place) in candidates.iter().enumerate() {
        println!(
            "{}. {} ({:.5}, {:.5})",
            i + 1,
            place.display_name,
            place.lat,
            place.lng
        );
    }

    Ok(())
}
