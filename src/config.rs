use std::path::PathBuf;

use crate::domain::MatchPolicy;
use crate::error::SeedError;

pub const DEFAULT_CSV_PATH: &str = "data/venues.sample.csv";

/// Connection settings resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
}

impl Config {
    /// Load `.env` if present, then read `DATABASE_URL` from the environment.
    pub fn from_env() -> Result<Self, SeedError> {
        dotenvy::dotenv().ok();
        Self::from_database_url(std::env::var("DATABASE_URL").ok())
    }

    pub fn from_database_url(database_url: Option<String>) -> Result<Self, SeedError> {
        match database_url {
            Some(url) if !url.trim().is_empty() => Ok(Self { database_url: url }),
            _ => Err(SeedError::MissingDatabaseUrl),
        }
    }
}

/// What to seed and how.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub file: PathBuf,
    pub update_existing: bool,
    pub dry_run: bool,
}

impl SeedOptions {
    pub fn match_policy(&self) -> MatchPolicy {
        if self.update_existing {
            MatchPolicy::Update
        } else {
            MatchPolicy::InsertDuplicate
        }
    }
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_CSV_PATH),
            update_existing: false,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_database_url(None).unwrap_err();
        assert!(matches!(err, SeedError::MissingDatabaseUrl));
    }

    #[test]
    fn test_blank_database_url_is_missing() {
        let err = Config::from_database_url(Some("  ".to_string())).unwrap_err();
        assert!(matches!(err, SeedError::MissingDatabaseUrl));
    }

    #[test]
    fn test_database_url_kept_verbatim() {
        let config =
            Config::from_database_url(Some("postgres://u:p@localhost/venues".to_string())).unwrap();
        assert_eq!(config.database_url, "postgres://u:p@localhost/venues");
    }

    #[test]
    fn test_match_policy_follows_flag() {
        let mut options = SeedOptions::default();
        assert_eq!(options.match_policy(), MatchPolicy::InsertDuplicate);
        options.update_existing = true;
        assert_eq!(options.match_policy(), MatchPolicy::Update);
    }
}
