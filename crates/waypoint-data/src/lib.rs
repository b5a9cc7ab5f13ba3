//! POI catalog data for the waypoint search index.
//!
//! A catalog is two tables: the places themselves (`places.csv`) and the POI
//! type registry (`poi_types.csv`) that maps type keys to display names and
//! their parent categories. Both are loaded into polars frames, cleaned and
//! validated before they are handed to the index.
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub mod catalog;
pub mod embedded;
mod error;

pub use catalog::{CatalogData, PLACES_FILE, POI_TYPES_FILE};
pub use error::{DataError, Result};

pub const DATA_DIR_DEFAULT: &str = "./waypoint_data";

/// Global data directory, resolved once.
///
/// `WAYPOINT_DATA_DIR` wins, then the platform data directory (with the
/// `system-dirs` feature), then [`DATA_DIR_DEFAULT`].
pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    if let Ok(dir) = std::env::var("WAYPOINT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    system_data_dir().unwrap_or_else(|| PathBuf::from(DATA_DIR_DEFAULT))
});

#[cfg(feature = "system-dirs")]
fn system_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "waypoint").map(|dirs| dirs.data_dir().to_path_buf())
}

#[cfg(not(feature = "system-dirs"))]
fn system_data_dir() -> Option<PathBuf> {
    None
}

pub fn get_data_dir() -> &'static Path {
    DATA_DIR.as_path()
}

/// Load the catalog from the data directory, falling back to the embedded
/// sample when no catalog files are present there.
pub fn load_default_catalog() -> Result<CatalogData> {
    let dir = get_data_dir();
    if CatalogData::exists_in(dir) {
        info!(path = ?dir, "Loading POI catalog from data directory");
        CatalogData::from_dir(dir)
    } else {
        warn!(path = ?dir, "No catalog files found, using embedded sample catalog");
        CatalogData::embedded()
    }
}
