pub mod dedup;
pub mod feedback;
pub mod file;
pub mod placement;
pub mod revision;
pub mod roster;
pub mod sync;
pub mod transfer;

pub use dedup::{Deduplicated, dedupe};
pub use feedback::Feedback;
pub use file::{FileId, Person, RemoteFile, Submission, TransferKind};
pub use placement::{Destination, LocalPlacement, resolve_placement, sanitize_filename};
pub use revision::{collapse_by_size, collapse_by_timestamp, sweep_by_size};
pub use roster::{Roster, RosterError, normalize_name};
pub use sync::{FileFailure, SyncError, SyncOptions, SyncResult, Synchronizer};
pub use transfer::{ListingError, RemoteListing, Transfer, TransferError};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
