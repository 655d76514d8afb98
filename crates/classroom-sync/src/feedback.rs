/// A note for the instructor running the sync, about one submission or about
/// the run as a whole.
///
/// Collected on [`SyncResult`](crate::SyncResult) and returned by
/// [`Roster::load_or_empty`](crate::Roster::load_or_empty); the CLI prints
/// them ahead of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Bookkeeping, such as a stale revision dropped from the listing.
    Info(String),
    /// Every submission was placed, but something needs a look.
    Warning(String),
    /// One submission could not be placed; the others were.
    Error(String),
}

impl Feedback {
    /// E.g. `ignored duplicate: ann@x.com::Essay.docx::2019-10-28T09:00:00+00:00`.
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    /// E.g. a missing roster, or two submissions sharing a filename.
    pub fn warning(msg: impl Into<String>) -> Self {
        Self::Warning(msg.into())
    }

    /// E.g. a listed file with no owner, which is skipped.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }

    /// Text without the severity prefix that `Display` adds.
    pub fn message(&self) -> &str {
        match self {
            Self::Info(msg) | Self::Warning(msg) | Self::Error(msg) => msg,
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info(msg) => write!(f, "{msg}"),
            Self::Warning(msg) => write!(f, "warning: {msg}"),
            Self::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}
