pub mod reader;
pub mod upsert;

use std::fmt;

use sqlx::{PgPool, Postgres, Transaction};

use crate::config::{Config, SeedOptions};
use crate::db::{self, repository};
use crate::domain::{MatchPolicy, UpsertOutcome, VenueRecord};
use crate::error::SeedError;

pub use reader::VenueRows;

/// Counts of one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub dry_run: bool,
}

impl SeedSummary {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted(_) => self.inserted += 1,
            UpsertOutcome::Updated(_) => self.updated += 1,
        }
    }
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            write!(
                f,
                "[DRY-RUN] would insert: {}, update: {}",
                self.inserted, self.updated
            )
        } else {
            write!(f, "done. inserted: {}, updated: {}", self.inserted, self.updated)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The file held no valid row; the database was never contacted.
    NoRows { skipped: usize },
    Completed(SeedSummary),
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::NoRows { .. } => f.write_str("No valid rows to process."),
            RunOutcome::Completed(summary) => write!(f, "{}", summary),
        }
    }
}

/// Read `options.file` and seed every valid row into the database named by
/// `config`.
pub async fn run(config: &Config, options: &SeedOptions) -> Result<RunOutcome, SeedError> {
    let mut rows = VenueRows::open(&options.file)?;

    let Some(first) = rows.next() else {
        tracing::info!("No valid rows found in {}", options.file.display());
        return Ok(RunOutcome::NoRows {
            skipped: rows.skipped(),
        });
    };

    tracing::info!("Connecting to database...");
    let pool = db::connect(config).await?;
    tracing::info!("Database connection established");

    let result = seed_venues(&pool, std::iter::once(first).chain(rows.by_ref()), options).await;
    pool.close().await;

    let mut summary = result?;
    summary.skipped = rows.skipped();
    if summary.skipped > 0 {
        tracing::warn!("Skipped {} invalid rows", summary.skipped);
    }

    Ok(RunOutcome::Completed(summary))
}

/// Upsert `rows` in a single transaction. A dry run always rolls back; any
/// database error rolls back everything written so far.
pub async fn seed_venues<I>(
    pool: &PgPool,
    rows: I,
    options: &SeedOptions,
) -> Result<SeedSummary, SeedError>
where
    I: IntoIterator<Item = VenueRecord>,
{
    let mut tx = pool.begin().await?;

    let mut summary = match upsert_all(&mut tx, rows, options.match_policy()).await {
        Ok(summary) => summary,
        Err(err) => {
            tracing::error!("Seeding failed, rolling back: {}", err);
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!("Rollback failed: {}", rollback_err);
            }
            return Err(err.into());
        }
    };
    summary.dry_run = options.dry_run;

    if options.dry_run {
        tx.rollback().await?;
        tracing::info!("Dry run: transaction rolled back");
    } else {
        tx.commit().await?;
        tracing::info!(
            "Committed {} inserts and {} updates",
            summary.inserted,
            summary.updated
        );
    }

    Ok(summary)
}

async fn upsert_all<I>(
    tx: &mut Transaction<'_, Postgres>,
    rows: I,
    policy: MatchPolicy,
) -> Result<SeedSummary, sqlx::Error>
where
    I: IntoIterator<Item = VenueRecord>,
{
    repository::ensure_postgis(&mut **tx).await?;

    let mut summary = SeedSummary::default();
    for record in rows {
        let outcome = upsert::upsert_one(tx, &record, policy).await?;
        summary.record(outcome);
    }

    Ok(summary)
}
