use crate::domain::{Venue, VenueRecord};
use chrono::{DateTime, Utc};
use geo::Point;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct VenueRow {
    id: Uuid,
    name: String,
    address: String,
    time_zone: String,
    lon: f64,
    lat: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VenueRow> for Venue {
    fn from(row: VenueRow) -> Self {
        Venue {
            id: row.id,
            name: row.name,
            address: row.address,
            time_zone: row.time_zone,
            location: Point::new(row.lon, row.lat),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn ensure_postgis(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE EXTENSION IF NOT EXISTS postgis")
        .execute(conn)
        .await?;
    Ok(())
}

/// Look up a venue by its natural key. With duplicates present, whichever row
/// the database returns first wins.
pub async fn find_existing_id(
    conn: &mut PgConnection,
    name: &str,
    address: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row = sqlx::query_as::<_, (Uuid,)>(
        "SELECT id FROM venues WHERE name = $1 AND address = $2 LIMIT 1",
    )
    .bind(name)
    .bind(address)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(|(id,)| id))
}

pub async fn insert_venue(
    conn: &mut PgConnection,
    id: Uuid,
    record: &VenueRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO venues (id, name, address, time_zone, geom, created_at, updated_at)
        VALUES ($1, $2, $3, $4, ST_SetSRID(ST_MakePoint($5, $6), 4326), NOW(), NOW())
        "#,
    )
    .bind(id)
    .bind(&record.name)
    .bind(&record.address)
    .bind(&record.time_zone)
    .bind(record.lon()) // lon first for ST_MakePoint
    .bind(record.lat())
    .execute(conn)
    .await?;

    Ok(())
}

/// Refresh the mutable columns of an existing venue. Returns the number of
/// rows touched.
pub async fn update_venue(
    conn: &mut PgConnection,
    id: Uuid,
    record: &VenueRecord,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE venues
        SET time_zone = $1,
            geom = ST_SetSRID(ST_MakePoint($2, $3), 4326),
            updated_at = NOW()
        WHERE id = $4
        "#,
    )
    .bind(&record.time_zone)
    .bind(record.lon())
    .bind(record.lat())
    .bind(id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn find_by_natural_key(
    pool: &PgPool,
    name: &str,
    address: &str,
) -> Result<Vec<Venue>, sqlx::Error> {
    let rows = sqlx::query_as::<_, VenueRow>(
        r#"
        SELECT
            id, name, address, time_zone,
            ST_X(geom) as lon,
            ST_Y(geom) as lat,
            created_at, updated_at
        FROM venues
        WHERE name = $1 AND address = $2
        ORDER BY created_at, id
        "#,
    )
    .bind(name)
    .bind(address)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Venue::from).collect())
}

pub async fn count_venues(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM venues")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
