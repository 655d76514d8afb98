use anyhow::{Context, Result};
use classroom_sync::{Destination, RemoteListing, SyncResult, Synchronizer};

use super::format::{print_feedback, sync_summary};

/// List the assignment folder, synchronize it into `destination`, and print
/// the summary. Returns the result so callers can set an exit status.
pub async fn run(
    listing: &dyn RemoteListing,
    synchronizer: &Synchronizer,
    folder_id: &str,
    destination: &Destination,
) -> Result<SyncResult> {
    let files = listing
        .list_files(folder_id)
        .await
        .with_context(|| format!("failed to list folder {folder_id} on {}", listing.label()))?;
    println!("There are {} files in this assignment.", files.len());

    let result = synchronizer
        .synchronize(files, destination)
        .await
        .context("sync aborted")?;

    print_feedback(&result.feedback);
    print!("{}", sync_summary(&result));

    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use classroom_sync::test_support::{FakeDrive, InMemoryListing, binary_file};
    use classroom_sync::Roster;

    use super::*;

    #[tokio::test]
    async fn syncs_listed_folder() {
        let root = tempfile::tempdir().unwrap();
        let t = Utc.with_ymd_and_hms(2019, 10, 28, 9, 0, 0).unwrap();
        let mut listing = InMemoryListing::new("memory");
        listing.add("folder", binary_file("a", "Ann Berg", "lab.py", t));
        listing.add("folder", binary_file("b", "Bo Ek", "lab.py", t));
        let drive = FakeDrive::new().with_content("a", "x").failing("b");
        let mut roster = Roster::default();
        roster.insert("Prog 1", ["Ann Berg", "Bo Ek", "Cy Lund"]);
        let synchronizer = Synchronizer::new(Arc::new(drive)).with_roster(roster);
        let dest = Destination::new(root.path(), "Prog 1", "Lab 1");

        let result = run(&listing, &synchronizer, "folder", &dest).await.unwrap();

        assert_eq!(result.total_processed, 1);
        assert_eq!(result.failures.len(), 1);
        assert!(dest.student_dir("Ann Berg").join("lab.py").exists());
        assert_eq!(
            result.missing_students.into_iter().collect::<Vec<_>>(),
            vec!["Cy Lund"]
        );
    }

    #[tokio::test]
    async fn listing_failure_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let listing = InMemoryListing::new("memory");
        let synchronizer = Synchronizer::new(Arc::new(FakeDrive::new()));
        let dest = Destination::new(root.path(), "Prog 1", "Lab 1");

        let err = run(&listing, &synchronizer, "missing", &dest).await.unwrap_err();
        assert!(err.to_string().contains("failed to list folder missing"));
    }
}
