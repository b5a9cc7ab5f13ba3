//! POI type registry: type keys, their display names and parent categories.

use ahash::AHashMap;
use itertools::{Itertools, izip};
use polars::prelude::DataFrame;

use super::error::Result;
use crate::search::{
    ObjectType, PoiCategory, PoiType, RawHit, SEARCH_AMENITY_TYPE_PRIORITY, SearchObject,
};

#[derive(Debug, Clone, Default)]
pub(super) struct PoiRegistry {
    categories: Vec<PoiCategory>,
    types: Vec<PoiType>,
    by_key: AHashMap<String, PoiType>,
}

impl PoiRegistry {
    pub(super) fn from_frame(df: &DataFrame) -> Result<Self> {
        let keys = df.column("key")?.str()?;
        let names = df.column("name")?.str()?;
        let categories = df.column("category")?.str()?;
        let category_names = df.column("category_name")?.str()?;
        let additional = df.column("additional")?.bool()?;

        let mut types = Vec::with_capacity(df.height());
        for (key, name, category, category_name, additional) in
            izip!(keys, names, categories, category_names, additional)
        {
            let Some(key) = key.filter(|k| !k.is_empty()) else {
                continue;
            };
            let parent = category.filter(|c| !c.is_empty()).map(|category| {
                PoiCategory::new(category, category_name.unwrap_or(category))
            });
            types.push(PoiType {
                key_name: key.to_string(),
                translation: name.unwrap_or(key).to_string(),
                additional: additional.unwrap_or(false),
                parent,
            });
        }

        let categories = types
            .iter()
            .filter_map(|t| t.parent.clone())
            .unique_by(|c| c.key_name.clone())
            .collect();
        let by_key = types
            .iter()
            .map(|t| (t.key_name.clone(), t.clone()))
            .collect();

        Ok(Self {
            categories,
            types,
            by_key,
        })
    }

    pub(super) fn get(&self, key: &str) -> Option<&PoiType> {
        self.by_key.get(key)
    }

    pub(super) fn category_of(&self, type_key: &str) -> Option<&str> {
        self.get(type_key)
            .and_then(|t| t.parent.as_ref())
            .map(|c| c.key_name.as_str())
    }

    pub(super) fn len(&self) -> usize {
        self.types.len()
    }

    /// Categories and types whose display name has a word starting with
    /// `text`, categories first.
    pub(super) fn matching(&self, text: &str) -> Vec<RawHit> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let categories = self
            .categories
            .iter()
            .filter(|c| name_matches(&c.translation, &needle))
            .map(|c| {
                RawHit::new(
                    SearchObject::Category(c.clone()),
                    ObjectType::PoiType,
                    c.translation.clone(),
                )
            });
        let types = self
            .types
            .iter()
            .filter(|t| name_matches(&t.translation, &needle))
            .map(|t| {
                RawHit::new(
                    SearchObject::PoiType(t.clone()),
                    ObjectType::PoiType,
                    t.translation.clone(),
                )
            });

        categories
            .chain(types)
            .map(|hit| hit.with_priority(SEARCH_AMENITY_TYPE_PRIORITY, 0.0))
            .collect()
    }
}

fn name_matches(name: &str, needle: &str) -> bool {
    let name = name.to_lowercase();
    name.starts_with(needle) || name.split_whitespace().any(|word| word.starts_with(needle))
}
