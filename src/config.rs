//! Runtime settings read from the environment.
//!
//! Call [`dotenvy::dotenv`] before [`Settings::from_env`] so values from a
//! local `.env` file are visible.

use std::path::PathBuf;

pub const DEFAULT_CENSUS_PATH: &str = "Data/toronto_neighbourhoods_census_data.csv";
pub const DEFAULT_LOCATION_PATH: &str = "Data/toronto_neighbourhoods_coordinates.csv";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/dwelling_stats.log";

/// Input locations and the optional map access token.
#[derive(Clone)]
pub struct Settings {
    pub census_path: PathBuf,
    pub location_path: PathBuf,
    pub log_file_path: PathBuf,
    mapbox_token: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Settings {
            census_path: get("CENSUS_DATA_PATH")
                .unwrap_or_else(|| DEFAULT_CENSUS_PATH.to_string())
                .into(),
            location_path: get("LOCATION_DATA_PATH")
                .unwrap_or_else(|| DEFAULT_LOCATION_PATH.to_string())
                .into(),
            log_file_path: get("LOG_FILE_PATH")
                .unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string())
                .into(),
            mapbox_token: get("mapbox"),
        }
    }

    /// Input files to read: explicit overrides win over the configured paths.
    pub fn input_paths(
        &self,
        census: Option<PathBuf>,
        locations: Option<PathBuf>,
    ) -> (PathBuf, PathBuf) {
        (
            census.unwrap_or_else(|| self.census_path.clone()),
            locations.unwrap_or_else(|| self.location_path.clone()),
        )
    }

    pub fn has_mapbox_token(&self) -> bool {
        self.mapbox_token.is_some()
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("census_path", &self.census_path)
            .field("location_path", &self.location_path)
            .field("log_file_path", &self.log_file_path)
            .field("mapbox_token", &self.mapbox_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
