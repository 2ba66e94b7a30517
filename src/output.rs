//! Output formatting and persistence for derived census tables.
//!
//! Supports pretty-printing, the dwelling-totals CSV export, and the JSON report.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::analyzers::analyzer::{DerivedTables, Report};
use crate::census::{DwellingCounts, DwellingType};
use csv::Writer;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;

/// Logs derived tables using Rust's debug pretty-print format.
pub fn print_pretty(tables: &DerivedTables) {
    debug!("{:#?}", tables);
}

/// Logs a one-line summary per year and the ranked neighbourhoods.
pub fn print_summary(tables: &DerivedTables) {
    for (year, totals) in &tables.dwelling_totals_by_year {
        let costs = tables.shelter_costs_by_year.get(year);
        info!(
            year,
            dwelling_units = totals.total(),
            mean_house_value = tables.mean_house_value_by_year.get(year).copied(),
            shelter_costs_owned = costs.map(|c| c.owned),
            shelter_costs_rented = costs.map(|c| c.rented),
            "Year"
        );
    }

    for (rank, entry) in tables.top_neighbourhoods.iter().enumerate() {
        info!(
            rank = rank + 1,
            neighbourhood = %entry.neighbourhood,
            mean_house_value = entry.value,
            "Top neighbourhood"
        );
    }

    info!(
        map_points = tables.locations.points.len(),
        unmatched = tables.locations.unmatched(),
        "Location join"
    );
}

/// Logs derived tables as pretty-printed JSON.
pub fn print_json(tables: &DerivedTables) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(tables)?);
    Ok(())
}

/// Writes dwelling totals per year as CSV: `year` followed by the eight
/// dwelling-type columns, one row per year ascending. Overwrites `path`.
pub fn write_dwelling_totals(path: &Path, totals: &BTreeMap<i32, DwellingCounts>) -> Result<()> {
    ensure_parent(path)?;
    debug!(path = %path.display(), years = totals.len(), "Writing dwelling totals CSV");

    let mut writer = Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut header = vec!["year"];
    header.extend(DwellingType::ALL.iter().map(|k| k.column()));
    writer.write_record(&header)?;

    for (year, counts) in totals {
        let mut row = vec![year.to_string()];
        row.extend(counts.iter().map(|(_, units)| units.to_string()));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the report as pretty JSON. Overwrites `path`.
pub fn write_report(path: &Path, report: &Report) -> Result<()> {
    ensure_parent(path)?;
    debug!(path = %path.display(), "Writing JSON report");

    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)?;

    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::{CensusRecord, NeighbourhoodLocation};

    fn tables() -> DerivedTables {
        let records = vec![
            CensusRecord::new(2006, "A")
                .with_house_value(200.0)
                .with_dwellings(DwellingCounts::default().with(DwellingType::Duplex, 4)),
            CensusRecord::new(2001, "A")
                .with_house_value(100.0)
                .with_dwellings(
                    DwellingCounts::default()
                        .with(DwellingType::SingleDetachedHouse, 5)
                        .with(DwellingType::OtherHouse, 1),
                ),
        ];
        let locations = vec![NeighbourhoodLocation {
            neighbourhood: "A".to_string(),
            lat: 43.7,
            lon: -79.4,
        }];
        DerivedTables::build(&records, &locations, 10)
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&tables());
    }

    #[test]
    fn test_print_summary_does_not_panic() {
        print_summary(&tables());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&tables()).unwrap();
    }

    #[test]
    fn test_write_dwelling_totals_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sum_of_dwelling_by_year.csv");

        write_dwelling_totals(&path, &tables().dwelling_totals_by_year).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "year,single_detached_house,apartment_five_storeys_plus,movable_dwelling,semi_detached_house,row_house,duplex,apartment_five_storeys_less,other_house"
        );
        assert_eq!(lines[1], "2001,5,0,0,0,0,0,0,1");
        assert_eq!(lines[2], "2006,0,0,0,0,0,4,0,0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_dwelling_totals_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("totals.csv");
        let totals = tables().dwelling_totals_by_year;

        write_dwelling_totals(&path, &totals).unwrap();
        write_dwelling_totals(&path, &totals).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        write_report(&path, &Report::new(tables(), false)).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["map_token_configured"], false);
        assert_eq!(json["tables"]["locations"]["points"][0]["neighbourhood"], "A");
    }
}
