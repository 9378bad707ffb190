use std::num::ParseFloatError;
use std::path::PathBuf;
use thiserror::Error;

/// Category of a fatal error, used by the caller to decide how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Input,
    Database,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Input => "input error",
            ErrorKind::Database => "database error",
        };
        f.write_str(label)
    }
}

/// Errors that abort a seeding run.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("DATABASE_URL env var is not set.")]
    MissingDatabaseUrl,
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("missing columns in CSV: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("failed to read CSV header: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl SeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SeedError::MissingDatabaseUrl => ErrorKind::Configuration,
            SeedError::FileNotFound(_) | SeedError::MissingColumns(_) | SeedError::Csv(_) => {
                ErrorKind::Input
            }
            SeedError::Database(_) => ErrorKind::Database,
        }
    }
}

/// A data row that cannot be turned into a venue. The row is skipped.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("could not convert {field} to float: {value:?}")]
    InvalidCoordinate {
        field: &'static str,
        value: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("malformed record: {0}")]
    Malformed(#[from] csv::Error),
}
