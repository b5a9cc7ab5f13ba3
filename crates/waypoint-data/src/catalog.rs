use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info, instrument};

use crate::error::{DataError, Result};

pub const PLACES_FILE: &str = "places.csv";
pub const POI_TYPES_FILE: &str = "poi_types.csv";

const PLACES_SCHEMA: [(&str, DataType); 6] = [
    ("id", DataType::UInt64),
    ("name", DataType::String),
    ("type", DataType::String),
    ("lat", DataType::Float64),
    ("lon", DataType::Float64),
    ("tags", DataType::String),
];

const POI_TYPES_SCHEMA: [(&str, DataType); 5] = [
    ("key", DataType::String),
    ("name", DataType::String),
    ("category", DataType::String),
    ("category_name", DataType::String),
    ("additional", DataType::Boolean),
];

/// A cleaned POI catalog: places plus the POI type registry.
///
/// `places` columns: `id` (u64), `name`, `type` (POI type key), `lat`, `lon`,
/// `tags` (`;`-separated `key:value` pairs).
/// `poi_types` columns: `key`, `name`, `category`, `category_name`,
/// `additional` (true for subtypes such as cuisines that refine a category).
#[derive(Debug, Clone)]
pub struct CatalogData {
    places: DataFrame,
    poi_types: DataFrame,
}

impl CatalogData {
    /// Load `places.csv` and `poi_types.csv` from `dir`.
    #[instrument(name = "Load catalog from directory", level = "info")]
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let places = read_csv(&dir.join(PLACES_FILE), &PLACES_SCHEMA)?;
        let poi_types = read_csv(&dir.join(POI_TYPES_FILE), &POI_TYPES_SCHEMA)?;
        let catalog = Self {
            places: clean_places(places).collect()?,
            poi_types: clean_poi_types(poi_types).collect()?,
        };
        info!(
            places = catalog.places.height(),
            poi_types = catalog.poi_types.height(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    pub fn exists_in(dir: &Path) -> bool {
        dir.join(PLACES_FILE).exists() && dir.join(POI_TYPES_FILE).exists()
    }

    /// The small sample catalog compiled into the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_frames(
            crate::embedded::sample_places()?,
            crate::embedded::sample_poi_types()?,
        )
    }

    /// Build a catalog from in-memory frames, casting and cleaning them the
    /// same way as CSV input.
    pub fn from_frames(places: DataFrame, poi_types: DataFrame) -> Result<Self> {
        ensure_columns(&places, "places", &PLACES_SCHEMA)?;
        ensure_columns(&poi_types, "poi_types", &POI_TYPES_SCHEMA)?;

        let places = clean_places(cast_to_schema(places.lazy(), &PLACES_SCHEMA)).collect()?;
        let poi_types =
            clean_poi_types(cast_to_schema(poi_types.lazy(), &POI_TYPES_SCHEMA)).collect()?;
        debug!(
            places = places.height(),
            poi_types = poi_types.height(),
            "Catalog built from frames"
        );
        Ok(Self { places, poi_types })
    }

    pub fn places(&self) -> &DataFrame {
        &self.places
    }

    pub fn poi_types(&self) -> &DataFrame {
        &self.poi_types
    }

    pub fn len(&self) -> usize {
        self.places.height()
    }

    pub fn is_empty(&self) -> bool {
        self.places.height() == 0
    }
}

fn read_csv(path: &Path, schema: &[(&'static str, DataType)]) -> Result<LazyFrame> {
    if !path.exists() {
        return Err(DataError::RequiredFileNotFound(path.to_path_buf()));
    }
    let schema = Schema::from_iter(
        schema
            .iter()
            .map(|(name, dtype)| (PlSmallStr::from_static(*name), dtype.clone())),
    );
    Ok(LazyCsvReader::new(path)
        .with_has_header(true)
        .with_schema(Some(schema.into()))
        .finish()?)
}

fn ensure_columns(
    df: &DataFrame,
    table: &'static str,
    schema: &[(&'static str, DataType)],
) -> Result<()> {
    match schema.iter().find(|(name, _)| df.column(name).is_err()) {
        Some((column, _)) => Err(DataError::MissingColumn {
            table,
            column: *column,
        }),
        None => Ok(()),
    }
}

fn cast_to_schema(lf: LazyFrame, schema: &[(&'static str, DataType)]) -> LazyFrame {
    lf.select(
        schema
            .iter()
            .map(|(name, dtype)| col(*name).cast(dtype.clone()))
            .collect::<Vec<_>>(),
    )
}

fn clean_places(lf: LazyFrame) -> LazyFrame {
    lf.filter(
        col("id")
            .is_not_null()
            .and(col("name").is_not_null())
            .and(col("lat").is_not_null())
            .and(col("lon").is_not_null())
            .and(col("lat").gt_eq(lit(-90.0)))
            .and(col("lat").lt_eq(lit(90.0)))
            .and(col("lon").gt_eq(lit(-180.0)))
            .and(col("lon").lt_eq(lit(180.0))),
    )
    .with_columns([
        col("type").fill_null(lit("")),
        col("tags").fill_null(lit("")),
    ])
}

fn clean_poi_types(lf: LazyFrame) -> LazyFrame {
    lf.filter(col("key").is_not_null().and(col("name").is_not_null()))
        .with_columns([
            col("category").fill_null(lit("")),
            col("category_name").fill_null(lit("")),
            col("additional").fill_null(lit(false)),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACES_CSV: &str = "id,name,type,lat,lon,tags\n\
        1,Cafe Central,cafe,52.37,4.89,\n\
        2,Pizza Roma,restaurant,52.36,4.88,cuisine:pizza\n\
        3,Nowhere,cafe,,4.88,\n\
        4,,cafe,52.36,4.88,\n";

    const POI_TYPES_CSV: &str = "key,name,category,category_name,additional\n\
        cafe,Cafe,food,Food,false\n\
        restaurant,Restaurant,food,Food,false\n\
        cuisine_pizza,Pizza,food,Food,true\n";

    fn write_catalog(dir: &Path) {
        std::fs::write(dir.join(PLACES_FILE), PLACES_CSV).unwrap();
        std::fs::write(dir.join(POI_TYPES_FILE), POI_TYPES_CSV).unwrap();
    }

    #[test]
    fn test_from_dir_drops_incomplete_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());

        let catalog = CatalogData::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.len(), 2, "rows without coordinates or name are dropped");
        assert_eq!(catalog.poi_types().height(), 3);

        let tags = catalog.places().column("tags").unwrap().str().unwrap();
        assert_eq!(tags.get(0), Some(""), "null tags become empty strings");
    }

    #[test]
    fn test_from_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PLACES_FILE), PLACES_CSV).unwrap();

        assert!(!CatalogData::exists_in(dir.path()));
        let err = CatalogData::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, DataError::RequiredFileNotFound(_)));
    }

    #[test]
    fn test_from_frames_requires_columns() {
        let places = df!("id" => [1u64], "name" => ["Cafe"]).unwrap();
        let poi_types = crate::embedded::sample_poi_types().unwrap();

        let err = CatalogData::from_frames(places, poi_types).unwrap_err();
        assert!(matches!(
            err,
            DataError::MissingColumn {
                table: "places",
                column: "type"
            }
        ));
    }

    #[test]
    fn test_from_frames_casts_columns() {
        let places = df!(
            "id" => [7i32],
            "name" => ["Cafe"],
            "type" => ["cafe"],
            "lat" => [52.0f32],
            "lon" => [4.0f32],
            "tags" => [None::<&str>]
        )
        .unwrap();
        let poi_types = crate::embedded::sample_poi_types().unwrap();

        let catalog = CatalogData::from_frames(places, poi_types).unwrap();
        let ids = catalog.places().column("id").unwrap();
        assert_eq!(ids.dtype(), &DataType::UInt64);
        assert_eq!(ids.u64().unwrap().get(0), Some(7));
    }

    #[test]
    fn test_embedded_catalog_is_valid() {
        let catalog = CatalogData::embedded().unwrap();
        assert!(!catalog.is_empty());
        let additional = catalog.poi_types().column("additional").unwrap();
        assert!(
            additional.bool().unwrap().into_iter().any(|v| v == Some(true)),
            "sample carries at least one additional subtype"
        );
    }
}
