use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::db::repository;
use crate::domain::{MatchPolicy, UpsertOutcome, VenueRecord};

/// Write one record: update the venue sharing its natural key when the policy
/// allows it, insert a new venue otherwise.
pub async fn upsert_one(
    tx: &mut Transaction<'_, Postgres>,
    record: &VenueRecord,
    policy: MatchPolicy,
) -> Result<UpsertOutcome, sqlx::Error> {
    let existing = repository::find_existing_id(&mut **tx, &record.name, &record.address).await?;

    if let (Some(id), MatchPolicy::Update) = (existing, policy) {
        repository::update_venue(&mut **tx, id, record).await?;
        tracing::debug!("Updated venue {} ({}, {})", id, record.name, record.address);
        return Ok(UpsertOutcome::Updated(id));
    }

    if let Some(existing_id) = existing {
        tracing::warn!(
            "Venue ({}, {}) already exists as {}; inserting a duplicate (pass --update-existing to update it instead)",
            record.name,
            record.address,
            existing_id
        );
    }

    let id = Uuid::new_v4();
    repository::insert_venue(&mut **tx, id, record).await?;
    tracing::debug!("Inserted venue {} ({}, {})", id, record.name, record.address);

    Ok(UpsertOutcome::Inserted(id))
}
