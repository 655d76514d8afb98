use anyhow::{Context, Result};
use classroom_sync::{RemoteListing, dedupe};

use super::format::{listing_table, print_feedback};

pub async fn run(listing: &dyn RemoteListing, folder_id: &str) -> Result<()> {
    let files = listing
        .list_files(folder_id)
        .await
        .with_context(|| format!("failed to list folder {folder_id} on {}", listing.label()))?;

    let out = dedupe(files);
    print_feedback(&out.feedback);
    print!("{}", listing_table(&out.submissions));

    Ok(())
}
