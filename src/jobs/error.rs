use thiserror::Error;

/// Failures surfaced by [`JobStore`](super::JobStore) queries.
///
/// An empty search result is not an error; it comes back as an empty `Vec`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The CSV source could not be opened, parsed, or had a malformed row.
    /// The store stays unloaded and the next query retries.
    #[error("job data unavailable from {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// The requested column is not part of the loaded header.
    #[error("no such column: {column:?}")]
    InvalidColumn { column: String },
}

impl JobError {
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        JobError::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_column(column: &str) -> Self {
        JobError::InvalidColumn {
            column: column.to_string(),
        }
    }
}

pub type JobResult<T> = std::result::Result<T, JobError>;
