//! Locate command handler
//!
//! Shows the device's current position.

use crate::error::Result;
use crate::geo::{get_locator, Locator};
use clap::Args;

/// Locate command arguments
#[derive(Args)]
pub struct LocateArgs {
    /// Print coordinates only
    #[arg(long)]
    pub coords_only: bool,
}

/// Run the locate command
pub async fn run(args: LocateArgs) -> Result<()> {
    let locator = get_locator();
    let location = locator.locate().await?;

    if args.coords_only {
        println!("{:.6},{:.6}", location.lat, location.lng);
    } else {
        println!(
            "{} ({:.6}, {:.6})",
            location.display_name, location.lat, location.lng
        );
    }

    Ok(())
}
