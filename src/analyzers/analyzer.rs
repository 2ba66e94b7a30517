use crate::analyzers::aggregate::{
    dwelling_counts_by_neighbourhood_year, dwelling_type_totals_by_year,
    house_value_by_neighbourhood_year, join_locations, mean_house_value_by_neighbourhood,
    mean_house_value_by_year, mean_shelter_costs_by_year, top_n_by_value,
    top_shelter_costs_owned_by_year,
};
use crate::analyzers::types::{LocationJoin, NeighbourhoodValue, ShelterCosts};
use crate::census::{CensusRecord, DwellingCounts, NeighbourhoodLocation};
use crate::parser::{load_census, load_locations};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Every derived view, computed once from the raw tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedTables {
    pub mean_house_value_by_neighbourhood: BTreeMap<String, f64>,
    pub top_neighbourhoods: Vec<NeighbourhoodValue>,
    pub dwelling_totals_by_year: BTreeMap<i32, DwellingCounts>,
    pub shelter_costs_by_year: BTreeMap<i32, ShelterCosts>,
    pub mean_house_value_by_year: BTreeMap<i32, f64>,
    pub house_value_by_neighbourhood_year: BTreeMap<String, BTreeMap<i32, f64>>,
    pub dwelling_counts_by_neighbourhood_year: BTreeMap<String, BTreeMap<i32, DwellingCounts>>,
    pub top_shelter_costs_owned_by_year: BTreeMap<i32, Vec<NeighbourhoodValue>>,
    pub locations: LocationJoin,
}

impl DerivedTables {
    /// Builds all views. `top_n` bounds both ranked views.
    pub fn build(
        records: &[CensusRecord],
        locations: &[NeighbourhoodLocation],
        top_n: usize,
    ) -> Self {
        let means = mean_house_value_by_neighbourhood(records);
        let top_neighbourhoods = top_n_by_value(&means, top_n);
        let joined = join_locations(&means, locations);

        DerivedTables {
            top_neighbourhoods,
            dwelling_totals_by_year: dwelling_type_totals_by_year(records),
            shelter_costs_by_year: mean_shelter_costs_by_year(records),
            mean_house_value_by_year: mean_house_value_by_year(records),
            house_value_by_neighbourhood_year: house_value_by_neighbourhood_year(records),
            dwelling_counts_by_neighbourhood_year: dwelling_counts_by_neighbourhood_year(records),
            top_shelter_costs_owned_by_year: top_shelter_costs_owned_by_year(records, top_n),
            locations: joined,
            mean_house_value_by_neighbourhood: means,
        }
    }
}

/// Load both tables and build the derived views.
pub fn analyze(census_path: &Path, locations_path: &Path, top_n: usize) -> Result<DerivedTables> {
    let records = load_census(census_path)?;
    let locations = load_locations(locations_path)?;

    info!(
        census_rows = records.len(),
        location_rows = locations.len(),
        "Input tables loaded"
    );

    let tables = DerivedTables::build(&records, &locations, top_n);

    info!(
        neighbourhoods = tables.mean_house_value_by_neighbourhood.len(),
        years = tables.dwelling_totals_by_year.len(),
        map_points = tables.locations.points.len(),
        "Derived tables built"
    );

    Ok(tables)
}

/// JSON document handed to the presentation layer.
#[derive(Debug, Serialize)]
pub struct Report {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    /// Whether a map access token was configured; the token itself is never written.
    pub map_token_configured: bool,
    pub tables: DerivedTables,
}

impl Report {
    pub fn new(tables: DerivedTables, map_token_configured: bool) -> Self {
        Report {
            schema_version: 1,
            generated_at: Utc::now(),
            map_token_configured,
            tables,
        }
    }
}
