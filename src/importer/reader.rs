use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};

use crate::domain::VenueRecord;
use crate::error::{RowError, SeedError};

pub const REQUIRED_COLUMNS: [&str; 5] = ["name", "address", "time_zone", "lon", "lat"];

/// Positions of the required columns in the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    name: usize,
    address: usize,
    time_zone: usize,
    lon: usize,
    lat: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, SeedError> {
        let position = |column: &str| headers.iter().position(|h| h == column);

        let mut missing: Vec<String> = REQUIRED_COLUMNS
            .into_iter()
            .filter(|column| position(*column).is_none())
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(SeedError::MissingColumns(missing));
        }

        let index = |column: &str| position(column).unwrap_or_default();
        Ok(Self {
            name: index("name"),
            address: index("address"),
            time_zone: index("time_zone"),
            lon: index("lon"),
            lat: index("lat"),
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<VenueRecord, RowError> {
        let field = |idx: usize, column: &'static str| {
            record.get(idx).ok_or(RowError::MissingField(column))
        };

        let name = field(self.name, "name")?;
        let address = field(self.address, "address")?;
        let time_zone = field(self.time_zone, "time_zone")?;
        let lon = parse_coordinate(field(self.lon, "lon")?, "lon")?;
        let lat = parse_coordinate(field(self.lat, "lat")?, "lat")?;

        Ok(VenueRecord::new(name, address, time_zone, lon, lat))
    }
}

fn parse_coordinate(value: &str, field: &'static str) -> Result<f64, RowError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|source| RowError::InvalidCoordinate {
            field,
            value: value.to_string(),
            source,
        })
}

/// Forward-only sequence of validated venue rows. Invalid rows are logged and
/// skipped as they are reached.
pub struct VenueRows<R> {
    records: StringRecordsIntoIter<R>,
    columns: ColumnIndex,
    skipped: usize,
}

impl VenueRows<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SeedError::FileNotFound(path.to_path_buf()));
        }

        tracing::info!("Reading venues from {}", path.display());
        let file = File::open(path).map_err(csv::Error::from)?;
        Self::from_reader(file)
    }
}

impl<R: Read> VenueRows<R> {
    pub fn from_reader(reader: R) -> Result<Self, SeedError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let columns = ColumnIndex::from_headers(reader.headers()?)?;

        Ok(Self {
            records: reader.into_records(),
            columns,
            skipped: 0,
        })
    }

    /// Rows skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: Read> Iterator for VenueRows<R> {
    type Item = VenueRecord;

    fn next(&mut self) -> Option<VenueRecord> {
        for result in self.records.by_ref() {
            let (row, err) = match result {
                Ok(record) => match self.columns.parse(&record) {
                    Ok(venue) => return Some(venue),
                    Err(err) => (describe(&record), err),
                },
                Err(err) => (line_of(err.position()), RowError::from(err)),
            };
            self.skipped += 1;
            tracing::warn!("SKIP: invalid row {} ({})", row, err);
        }
        None
    }
}

fn line_of(position: Option<&csv::Position>) -> String {
    match position {
        Some(pos) => format!("at line {}", pos.line()),
        None => "at unknown line".to_string(),
    }
}

fn describe(record: &StringRecord) -> String {
    format!(
        "{}: {:?}",
        line_of(record.position()),
        record.iter().collect::<Vec<_>>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rows(csv: &str) -> VenueRows<&[u8]> {
        VenueRows::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_reads_valid_rows() {
        let mut venues = rows("name,address,time_zone,lon,lat\nHall A,1 Main St,UTC,-73.99,40.73\n");

        let venue = venues.next().unwrap();
        assert_eq!(venue.name, "Hall A");
        assert_eq!(venue.address, "1 Main St");
        assert_eq!(venue.time_zone, "UTC");
        assert_eq!(venue.lon(), -73.99);
        assert_eq!(venue.lat(), 40.73);
        assert!(venues.next().is_none());
        assert_eq!(venues.skipped(), 0);
    }

    #[test]
    fn test_trims_fields_and_headers() {
        let mut venues =
            rows(" name , address ,time_zone, lon ,lat\n  Hall A , 1 Main St ,UTC , -73.99 , 40.73 \n");

        let venue = venues.next().unwrap();
        assert_eq!(venue.name, "Hall A");
        assert_eq!(venue.address, "1 Main St");
        assert_eq!(venue.time_zone, "UTC");
        assert_eq!(venue.lon(), -73.99);
        assert_eq!(venue.lat(), 40.73);
    }

    #[test]
    fn test_skips_non_numeric_coordinates() {
        let venues = rows(
            "name,address,time_zone,lon,lat\n\
             Hall A,1 Main St,UTC,-73.99,40.73\n\
             Hall B,2 Main St,UTC,west,40.73\n\
             Hall C,3 Main St,UTC,-73.99,\n\
             Hall D,4 Main St,UTC,-73.98,40.74\n",
        );

        let names: Vec<String> = venues.map(|v| v.name).collect();
        assert_eq!(names, vec!["Hall A", "Hall D"]);
    }

    #[test]
    fn test_skipped_count() {
        let mut venues = rows(
            "name,address,time_zone,lon,lat\n\
             Hall B,2 Main St,UTC,west,40.73\n\
             Hall C,3 Main St\n",
        );

        assert!(venues.next().is_none());
        assert_eq!(venues.skipped(), 2);
    }

    #[test]
    fn test_ignores_extra_columns() {
        let mut venues = rows(
            "id,name,capacity,address,time_zone,lon,lat\n\
             7,Hall A,300,1 Main St,UTC,-73.99,40.73\n",
        );

        let venue = venues.next().unwrap();
        assert_eq!(venue.name, "Hall A");
        assert_eq!(venue.address, "1 Main St");
    }

    #[test]
    fn test_header_only_yields_nothing() {
        let mut venues = rows("name,address,time_zone,lon,lat\n");
        assert!(venues.next().is_none());
        assert_eq!(venues.skipped(), 0);
    }

    #[test]
    fn test_missing_columns_sorted() {
        let err = VenueRows::from_reader("name,address,time_zone\nHall A,1 Main St,UTC\n".as_bytes())
            .err()
            .unwrap();

        match err {
            SeedError::MissingColumns(columns) => assert_eq!(columns, vec!["lat", "lon"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_misses_every_column() {
        let err = VenueRows::from_reader("".as_bytes()).err().unwrap();
        match err {
            SeedError::MissingColumns(columns) => assert_eq!(columns.len(), 5),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");

        let err = VenueRows::open(&path).err().unwrap();
        assert!(matches!(err, SeedError::FileNotFound(p) if p == path));
    }

    #[test]
    fn test_open_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name,address,time_zone,lon,lat").unwrap();
        writeln!(file, "\"Hall A\",\"1 Main St\",\"UTC\",-73.99,40.73").unwrap();

        let venues: Vec<VenueRecord> = VenueRows::open(file.path()).unwrap().collect();
        assert_eq!(
            venues,
            vec![VenueRecord::new("Hall A", "1 Main St", "UTC", -73.99, 40.73)]
        );
    }
}
