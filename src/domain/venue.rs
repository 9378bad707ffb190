use chrono::{DateTime, Utc};
use geo::Point;
use uuid::Uuid;

/// A validated input row, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueRecord {
    pub name: String,
    pub address: String,
    pub time_zone: String,
    /// x = longitude, y = latitude (SRID 4326)
    pub location: Point<f64>,
}

impl VenueRecord {
    pub fn new(name: &str, address: &str, time_zone: &str, lon: f64, lat: f64) -> Self {
        Self {
            name: name.trim().to_string(),
            address: address.trim().to_string(),
            time_zone: time_zone.trim().to_string(),
            location: Point::new(lon, lat),
        }
    }

    pub fn lon(&self) -> f64 {
        self.location.x()
    }

    pub fn lat(&self) -> f64 {
        self.location.y()
    }
}

/// A row of the `venues` table.
#[derive(Debug, Clone)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub time_zone: String,
    pub location: Point<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What to do when a record's (name, address) already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Insert a new row anyway, leaving two rows with the same natural key.
    InsertDuplicate,
    /// Overwrite time zone and location of the matched row.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(Uuid),
    Updated(Uuid),
}

impl UpsertOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Inserted(id) | Self::Updated(id) => *id,
        }
    }
}
