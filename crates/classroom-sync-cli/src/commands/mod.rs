pub mod format;
pub mod list;
pub mod sweep;
pub mod sync;
