pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod importer;

pub use config::{Config, SeedOptions};
pub use error::{ErrorKind, RowError, SeedError};
