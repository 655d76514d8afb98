pub mod client;
pub mod types;

pub use client::{DriveClient, DriveClientConfig};
pub use types::{DriveFile, DriveUser, FileList};
