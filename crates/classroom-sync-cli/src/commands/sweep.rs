use anyhow::{Context, Result};
use classroom_sync::{Destination, sweep_by_size};

/// Remove earlier copies that match their current file in size.
pub fn run(destination: &Destination) -> Result<()> {
    let dir = destination.assignment_dir();
    let removed = sweep_by_size(&dir)
        .with_context(|| format!("failed to sweep {}", dir.display()))?;

    for path in &removed {
        println!("Deleting identical file: {}", path.display());
    }
    println!("Removed {} earlier copies.", removed.len());

    Ok(())
}
