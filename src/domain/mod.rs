pub mod venue;

pub use venue::{MatchPolicy, UpsertOutcome, Venue, VenueRecord};
