//! CSV loaders for the census and neighbourhood-location tables.
//!
//! Both loaders validate headers up front and fail on the first row that
//! cannot be coerced, naming the offending line and column.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::census::{CensusRecord, DwellingCounts, DwellingType, NeighbourhoodLocation};

const CENSUS_COLUMNS: [&str; 13] = [
    "year",
    "neighbourhood",
    "single_detached_house",
    "apartment_five_storeys_plus",
    "movable_dwelling",
    "semi_detached_house",
    "row_house",
    "duplex",
    "apartment_five_storeys_less",
    "other_house",
    "shelter_costs_owned",
    "shelter_costs_rented",
    "average_house_value",
];

const LOCATION_COLUMNS: [&str; 3] = ["neighbourhood", "lat", "lon"];

/// Input-validation failures. Any of these aborts before aggregation starts.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {source_name}: {source}")]
    Io {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}: missing required column `{column}`")]
    MissingColumn { source_name: String, column: String },

    #[error("{source_name}: line {line}, column `{column}`: {message}")]
    Malformed {
        source_name: String,
        line: u64,
        column: String,
        message: String,
    },

    #[error("{source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },
}

/// Cell values read as null in the optional house-value column, matching the
/// markers pandas treats as missing by default.
const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A census row exactly as it appears in the CSV.
#[derive(Debug, Deserialize)]
struct CensusRow {
    year: i32,
    neighbourhood: String,
    single_detached_house: u64,
    apartment_five_storeys_plus: u64,
    movable_dwelling: u64,
    semi_detached_house: u64,
    row_house: u64,
    duplex: u64,
    apartment_five_storeys_less: u64,
    other_house: u64,
    shelter_costs_owned: f64,
    shelter_costs_rented: f64,
    average_house_value: Option<String>,
}

impl CensusRow {
    /// Validates the row and converts it into a [`CensusRecord`].
    fn into_record(self, source_name: &str, line: u64) -> Result<CensusRecord, LoadError> {
        let malformed = |column: &str, message: String| LoadError::Malformed {
            source_name: source_name.to_string(),
            line,
            column: column.to_string(),
            message,
        };

        for (column, value) in [
            ("shelter_costs_owned", self.shelter_costs_owned),
            ("shelter_costs_rented", self.shelter_costs_rented),
        ] {
            if !value.is_finite() {
                return Err(malformed(column, format!("expected a finite amount, got {value}")));
            }
        }

        let average_house_value = parse_nullable(self.average_house_value.as_deref())
            .map_err(|message| malformed("average_house_value", message))?;

        let dwellings = DwellingCounts::default()
            .with(DwellingType::SingleDetachedHouse, self.single_detached_house)
            .with(DwellingType::ApartmentFiveStoreysPlus, self.apartment_five_storeys_plus)
            .with(DwellingType::MovableDwelling, self.movable_dwelling)
            .with(DwellingType::SemiDetachedHouse, self.semi_detached_house)
            .with(DwellingType::RowHouse, self.row_house)
            .with(DwellingType::Duplex, self.duplex)
            .with(DwellingType::ApartmentFiveStoreysLess, self.apartment_five_storeys_less)
            .with(DwellingType::OtherHouse, self.other_house);

        Ok(CensusRecord {
            year: self.year,
            neighbourhood: self.neighbourhood,
            dwellings,
            shelter_costs_owned: self.shelter_costs_owned,
            shelter_costs_rented: self.shelter_costs_rented,
            average_house_value,
        })
    }
}

/// Parses an optional numeric cell. Empty cells, null markers and non-finite
/// numbers become `None`; anything else that is not a number is an error.
fn parse_nullable(raw: Option<&str>) -> Result<Option<f64>, String> {
    let Some(raw) = raw.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if NULL_TOKENS.contains(&raw) {
        return Ok(None);
    }

    let value: f64 = raw
        .parse()
        .map_err(|e| format!("{e}: {raw:?}"))?;

    Ok(value.is_finite().then_some(value))
}

/// Loads the census table from a CSV file.
pub fn load_census(path: impl AsRef<Path>) -> Result<Vec<CensusRecord>, LoadError> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let file = File::open(path).map_err(|source| LoadError::Io {
        source_name: source_name.clone(),
        source,
    })?;
    read_census(file, &source_name)
}

/// Parses census rows from any reader. `source_name` is used in error messages.
pub fn read_census<R: Read>(reader: R, source_name: &str) -> Result<Vec<CensusRecord>, LoadError> {
    let records = read_rows(reader, source_name, &CENSUS_COLUMNS, |row: CensusRow, line| {
        row.into_record(source_name, line)
    })?;
    debug!(source = source_name, rows = records.len(), "Census table loaded");
    Ok(records)
}

/// Loads the neighbourhood-location table from a CSV file.
pub fn load_locations(path: impl AsRef<Path>) -> Result<Vec<NeighbourhoodLocation>, LoadError> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let file = File::open(path).map_err(|source| LoadError::Io {
        source_name: source_name.clone(),
        source,
    })?;
    read_locations(file, &source_name)
}

pub fn read_locations<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Vec<NeighbourhoodLocation>, LoadError> {
    let rows = read_rows(reader, source_name, &LOCATION_COLUMNS, |row: NeighbourhoodLocation, _| {
        Ok(row)
    })?;
    debug!(source = source_name, rows = rows.len(), "Location table loaded");
    Ok(rows)
}

/// Reads every row as `T` and hands it to `convert` along with its 1-based line.
fn read_rows<R, T, U, F>(
    reader: R,
    source_name: &str,
    required: &[&str],
    mut convert: F,
) -> Result<Vec<U>, LoadError>
where
    R: Read,
    T: DeserializeOwned,
    F: FnMut(T, u64) -> Result<U, LoadError>,
{
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| csv_error(source_name, None, e))?
        .clone();

    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(LoadError::MissingColumn {
                source_name: source_name.to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| csv_error(source_name, Some(&headers), e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| csv_error(source_name, Some(&headers), e))?;
        rows.push(convert(row, line)?);
    }

    Ok(rows)
}

/// Turns a csv error into a [`LoadError`], resolving the field index to its header name.
fn csv_error(source_name: &str, headers: Option<&csv::StringRecord>, err: csv::Error) -> LoadError {
    if let csv::ErrorKind::Deserialize { pos, err: de } = err.kind() {
        let column = de
            .field()
            .and_then(|i| headers.and_then(|h| h.get(i as usize)))
            .unwrap_or("<unknown>");

        return LoadError::Malformed {
            source_name: source_name.to_string(),
            line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
            column: column.to_string(),
            message: de.kind().to_string(),
        };
    }

    LoadError::Csv {
        source_name: source_name.to_string(),
        source: err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "year,neighbourhood,single_detached_house,apartment_five_storeys_plus,movable_dwelling,semi_detached_house,row_house,duplex,apartment_five_storeys_less,other_house,average_house_value,shelter_costs_owned,shelter_costs_rented";

    #[test]
    fn test_read_census_valid_rows() {
        let data = format!(
            "{HEADER}\n2001,Agincourt North,3435,1947,0,2,586,57,626,0,200388,810,870\n2006,Agincourt North,3420,1965,0,5,605,45,640,0,258580,1010,945\n"
        );

        let records = read_census(data.as_bytes(), "census.csv").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, 2001);
        assert_eq!(records[0].neighbourhood, "Agincourt North");
        assert_eq!(records[0].dwellings.get(DwellingType::SingleDetachedHouse), 3435);
        assert_eq!(records[0].dwellings.get(DwellingType::ApartmentFiveStoreysLess), 626);
        assert_eq!(records[0].average_house_value, Some(200388.0));
        assert_eq!(records[1].shelter_costs_rented, 945.0);
    }

    #[test]
    fn test_empty_house_value_is_null() {
        let data = format!("{HEADER}\n2001,Alderwood,3175,315,0,470,50,185,370,0,,1060,1010\n");

        let records = read_census(data.as_bytes(), "census.csv").unwrap();

        assert_eq!(records[0].average_house_value, None);
    }

    #[test]
    fn test_null_markers_in_house_value_are_null() {
        let data = format!(
            "{HEADER}\n2001,A,1,0,0,0,0,0,0,0,NaN,900,800\n2006,A,1,0,0,0,0,0,0,0,NA,900,800\n2011,A,1,0,0,0,0,0,0,0,n/a,900,800\n2016,A,1,0,0,0,0,0,0,0,null,900,800\n2016,B,1,0,0,0,0,0,0,0,inf,900,800\n"
        );

        let records = read_census(data.as_bytes(), "census.csv").unwrap();

        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.average_house_value.is_none()));
    }

    #[test]
    fn test_nan_house_value_excluded_from_means() {
        use crate::analyzers::aggregate::{mean_house_value_by_neighbourhood, top_n_by_value};

        let data = format!(
            "{HEADER}\n2001,A,1,0,0,0,0,0,0,0,100,900,800\n2001,B,1,0,0,0,0,0,0,0,300,900,800\n2006,A,1,0,0,0,0,0,0,0,NaN,900,800\n"
        );

        let records = read_census(data.as_bytes(), "census.csv").unwrap();
        let means = mean_house_value_by_neighbourhood(&records);

        assert_eq!(means["A"], 100.0);
        assert_eq!(top_n_by_value(&means, 1)[0].neighbourhood, "B");
    }

    #[test]
    fn test_nan_shelter_cost_is_malformed() {
        let data = format!("{HEADER}\n2001,A,1,0,0,0,0,0,0,0,100,NaN,800\n");

        let err = read_census(data.as_bytes(), "census.csv").unwrap_err();

        match err {
            LoadError::Malformed { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "shelter_costs_owned");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_house_value_is_malformed() {
        let data = format!("{HEADER}\n2001,A,1,0,0,0,0,0,0,0,abc,900,800\n");

        let err = read_census(data.as_bytes(), "census.csv").unwrap_err();

        assert!(matches!(
            err,
            LoadError::Malformed { line: 2, ref column, .. } if column == "average_house_value"
        ));
    }

    #[test]
    fn test_non_numeric_value_names_line_and_column() {
        let data = format!(
            "{HEADER}\n2001,Alderwood,3175,315,0,470,50,185,370,0,406853,1060,1010\n2001,Annex,lots,315,0,470,50,185,370,0,406853,1060,1010\n"
        );

        let err = read_census(data.as_bytes(), "census.csv").unwrap_err();

        match err {
            LoadError::Malformed { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "single_detached_house");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_required_cost_is_malformed() {
        let data = format!("{HEADER}\n2001,Alderwood,3175,315,0,470,50,185,370,0,406853,,1010\n");

        let err = read_census(data.as_bytes(), "census.csv").unwrap_err();

        assert!(matches!(
            err,
            LoadError::Malformed { ref column, .. } if column == "shelter_costs_owned"
        ));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let data = "year,neighbourhood,duplex\n2001,Annex,5\n";

        let err = read_census(data.as_bytes(), "census.csv").unwrap_err();

        assert!(matches!(
            err,
            LoadError::MissingColumn { ref column, .. } if column == "single_detached_house"
        ));
        assert!(err.to_string().contains("census.csv"));
    }

    #[test]
    fn test_read_locations() {
        let data = "neighbourhood,lat,lon\nAgincourt North,43.805441,-79.266712\nAnnex,43.671585,-79.404001\n";

        let locations = read_locations(data.as_bytes(), "coords.csv").unwrap();

        assert_eq!(locations.len(), 2);
        assert_eq!(locations[1].neighbourhood, "Annex");
        assert_eq!(locations[0].lon, -79.266712);
    }

    #[test]
    fn test_load_census_missing_file() {
        let err = load_census("/nonexistent/census.csv").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
