//! Timetable loading errors.

use std::path::PathBuf;

/// Errors that can occur while loading the timetable.
///
/// All of them are fatal: the estimator cannot be initialised without a
/// timetable.
#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// A file could not be opened
    #[error("failed to open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be read as CSV (bad header, bad encoding)
    #[error("failed to read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required table has no usable rows
    #[error("timetable table {0} is empty")]
    Empty(&'static str),
}
