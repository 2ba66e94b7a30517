use crate::analyzers::types::{LocationJoin, NeighbourhoodPoint, NeighbourhoodValue, ShelterCosts};
use crate::analyzers::utility::{mean, top_n_desc};
use crate::census::{CensusRecord, DwellingCounts, NeighbourhoodLocation};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Mean `average_house_value` per neighbourhood, all years collapsed.
///
/// Null values are skipped. A neighbourhood with no non-null value is absent.
pub fn mean_house_value_by_neighbourhood(records: &[CensusRecord]) -> BTreeMap<String, f64> {
    let mut series: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for record in records {
        if let Some(value) = record.average_house_value {
            series
                .entry(record.neighbourhood.as_str())
                .or_default()
                .push(value);
        }
    }

    series
        .into_iter()
        .map(|(name, values)| (name.to_string(), mean(&values)))
        .collect()
}

/// The `n` neighbourhoods with the highest mean value, highest first.
///
/// Ties keep the map's iteration order (ascending neighbourhood name).
pub fn top_n_by_value(means: &BTreeMap<String, f64>, n: usize) -> Vec<NeighbourhoodValue> {
    let pairs: Vec<(String, f64)> = means
        .iter()
        .map(|(name, value)| (name.clone(), *value))
        .collect();

    top_n_desc(pairs, n)
        .into_iter()
        .map(NeighbourhoodValue::from)
        .collect()
}

/// Sum of each dwelling-type count across all neighbourhoods, per year.
pub fn dwelling_type_totals_by_year(records: &[CensusRecord]) -> BTreeMap<i32, DwellingCounts> {
    let mut totals: BTreeMap<i32, DwellingCounts> = BTreeMap::new();

    for record in records {
        totals
            .entry(record.year)
            .or_default()
            .accumulate(&record.dwellings);
    }

    totals
}

/// Mean owned and rented shelter costs per year.
pub fn mean_shelter_costs_by_year(records: &[CensusRecord]) -> BTreeMap<i32, ShelterCosts> {
    let mut series: BTreeMap<i32, (Vec<f64>, Vec<f64>)> = BTreeMap::new();

    for record in records {
        let (owned, rented) = series.entry(record.year).or_default();
        owned.push(record.shelter_costs_owned);
        rented.push(record.shelter_costs_rented);
    }

    series
        .into_iter()
        .map(|(year, (owned, rented))| {
            (
                year,
                ShelterCosts {
                    owned: mean(&owned),
                    rented: mean(&rented),
                },
            )
        })
        .collect()
}

/// Mean `average_house_value` per year. Null values are skipped.
pub fn mean_house_value_by_year(records: &[CensusRecord]) -> BTreeMap<i32, f64> {
    let mut series: BTreeMap<i32, Vec<f64>> = BTreeMap::new();

    for record in records {
        if let Some(value) = record.average_house_value {
            series.entry(record.year).or_default().push(value);
        }
    }

    series
        .into_iter()
        .map(|(year, values)| (year, mean(&values)))
        .collect()
}

/// Joins mean values onto neighbourhood coordinates by name.
///
/// Only neighbourhoods present on both sides produce a point; the rest are
/// listed in the result and logged. A repeated location row is ignored after
/// its first occurrence.
pub fn join_locations(
    means: &BTreeMap<String, f64>,
    locations: &[NeighbourhoodLocation],
) -> LocationJoin {
    let mut join = LocationJoin::default();
    let mut located: HashSet<&str> = HashSet::new();

    for location in locations {
        if !located.insert(location.neighbourhood.as_str()) {
            debug!(neighbourhood = %location.neighbourhood, "Duplicate location row ignored");
            continue;
        }

        match means.get(&location.neighbourhood) {
            Some(value) => join.points.push(NeighbourhoodPoint {
                neighbourhood: location.neighbourhood.clone(),
                lat: location.lat,
                lon: location.lon,
                mean_house_value: *value,
            }),
            None => join.missing_value.push(location.neighbourhood.clone()),
        }
    }

    join.missing_location = means
        .keys()
        .filter(|name| !located.contains(name.as_str()))
        .cloned()
        .collect();

    if join.unmatched() > 0 {
        let unmatched: Vec<&String> = join
            .missing_location
            .iter()
            .chain(&join.missing_value)
            .collect();
        warn!(
            matched = join.points.len(),
            missing_location = join.missing_location.len(),
            missing_value = join.missing_value.len(),
            ?unmatched,
            "Neighbourhood names did not match between census and location tables"
        );
    }

    join
}

/// Per-neighbourhood series of mean house value by year.
pub fn house_value_by_neighbourhood_year(
    records: &[CensusRecord],
) -> BTreeMap<String, BTreeMap<i32, f64>> {
    let mut series: BTreeMap<&str, BTreeMap<i32, Vec<f64>>> = BTreeMap::new();

    for record in records {
        if let Some(value) = record.average_house_value {
            series
                .entry(record.neighbourhood.as_str())
                .or_default()
                .entry(record.year)
                .or_default()
                .push(value);
        }
    }

    series
        .into_iter()
        .map(|(name, by_year)| {
            let by_year: BTreeMap<i32, f64> = by_year
                .into_iter()
                .map(|(year, values)| (year, mean(&values)))
                .collect();
            (name.to_string(), by_year)
        })
        .collect()
}

/// Per-neighbourhood dwelling-type counts by year. Repeated rows for the same
/// neighbourhood and year are summed.
pub fn dwelling_counts_by_neighbourhood_year(
    records: &[CensusRecord],
) -> BTreeMap<String, BTreeMap<i32, DwellingCounts>> {
    let mut counts: BTreeMap<String, BTreeMap<i32, DwellingCounts>> = BTreeMap::new();

    for record in records {
        counts
            .entry(record.neighbourhood.clone())
            .or_default()
            .entry(record.year)
            .or_default()
            .accumulate(&record.dwellings);
    }

    counts
}

/// For each year, the `n` rows with the highest owned shelter cost, highest first.
///
/// Ties keep input order.
pub fn top_shelter_costs_owned_by_year(
    records: &[CensusRecord],
    n: usize,
) -> BTreeMap<i32, Vec<NeighbourhoodValue>> {
    let mut by_year: BTreeMap<i32, Vec<(String, f64)>> = BTreeMap::new();

    for record in records {
        by_year
            .entry(record.year)
            .or_default()
            .push((record.neighbourhood.clone(), record.shelter_costs_owned));
    }

    by_year
        .into_iter()
        .map(|(year, rows)| {
            let top: Vec<NeighbourhoodValue> = top_n_desc(rows, n)
                .into_iter()
                .map(NeighbourhoodValue::from)
                .collect();
            (year, top)
        })
        .collect()
}
