//! Catalog data, re-exported from the `waypoint-data` subcrate.

pub use waypoint_data::{
    CatalogData, DATA_DIR, DATA_DIR_DEFAULT, DataError, PLACES_FILE, POI_TYPES_FILE, embedded,
    get_data_dir, load_default_catalog,
};
