//! Reference [`SearchIndex`] over a POI catalog.
//!
//! Place names, type names and tags are indexed with Tantivy in memory. POI
//! categories and types are matched against the typed text by word prefix.
//! Searches run on the rayon pool and report through the handler that was
//! registered when they were issued.
//!
//! The radius searched at level `L` is `base_radius_meters * 2^(L-1)`. More
//! results are available when a matching place lies beyond that radius and
//! the level is below the configured maximum.

mod registry;
mod text;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ahash::AHashMap;
pub use error::IndexError;
use error::Result;
use itertools::izip;
use tracing::{debug, info, instrument, trace};
use waypoint_data::CatalogData;

use crate::{
    geo::LatLon,
    search::{
        MAX_DEFAULT_SEARCH_RADIUS, ObjectType, Place, RawHit, ResultsCompleteHandler,
        SearchError, SearchIndex, SearchObject, SearchPhrase, SearchSettings, display_name,
    },
};
use registry::PoiRegistry;
use text::PlaceTextIndex;

/// Parameters of the reference index.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogIndexParams {
    /// Radius searched at level 1
    pub base_radius_meters: f64,
    pub max_radius_level: u32,
    /// Maximum number of text matches considered per search
    pub candidate_limit: usize,
    /// Whether to enable fuzzy matching of longer words.
    pub fuzzy_search: bool,
}

impl Default for CatalogIndexParams {
    fn default() -> Self {
        Self {
            base_radius_meters: 1000.0,
            max_radius_level: MAX_DEFAULT_SEARCH_RADIUS,
            candidate_limit: 200,
            fuzzy_search: true,
        }
    }
}

impl CatalogIndexParams {
    pub fn radius_for_level(&self, level: u32) -> f64 {
        let level = level.clamp(1, self.max_radius_level.max(1));
        self.base_radius_meters * f64::from(1u32 << (level - 1).min(31))
    }
}

#[derive(Debug, Clone)]
struct PlaceRecord {
    id: u64,
    name: String,
    type_key: String,
    location: LatLon,
    tags: Vec<String>,
}

/// What the selected words of the phrase restrict results to.
#[derive(Debug, Clone, PartialEq)]
enum Selection {
    Category(String),
    PoiType(String),
    Filter {
        categories: Vec<String>,
        name_filter: Option<String>,
    },
}

impl Selection {
    fn from_object(object: &SearchObject) -> Option<Self> {
        match object {
            SearchObject::Category(category) => Some(Self::Category(category.key_name.clone())),
            SearchObject::PoiType(poi_type) if poi_type.additional => {
                poi_type.parent.as_ref().map(|parent| Self::Filter {
                    categories: vec![parent.key_name.clone()],
                    name_filter: Some(poi_type.name_filter_key()),
                })
            }
            SearchObject::PoiType(poi_type) => Some(Self::PoiType(poi_type.key_name.clone())),
            SearchObject::Filter(filter) => Some(Self::Filter {
                categories: filter.accepted_categories.clone(),
                name_filter: filter.name_filter.clone(),
            }),
            SearchObject::Place(_) | SearchObject::Other => None,
        }
    }

    fn accepts(&self, place: &PlaceRecord, category: Option<&str>) -> bool {
        match self {
            Self::Category(key) => category == Some(key.as_str()),
            Self::PoiType(key) => place.type_key == *key,
            Self::Filter {
                categories,
                name_filter,
            } => {
                let category_ok = categories.is_empty()
                    || category.is_some_and(|c| categories.iter().any(|k| k == c));
                category_ok
                    && name_filter
                        .as_deref()
                        .is_none_or(|filter| matches_name_filter(place, filter))
            }
        }
    }
}

fn matches_name_filter(place: &PlaceRecord, filter: &str) -> bool {
    let filter = filter.to_lowercase();
    place.tags.iter().any(|tag| tag.to_lowercase() == filter)
        || place.name.to_lowercase().contains(&filter)
}

/// Snapshot of one search, handed to the worker.
struct SearchRequest {
    sequence: u64,
    text: String,
    selection: Option<Selection>,
    origin: LatLon,
    radius_level: u32,
    handler: Option<ResultsCompleteHandler>,
}

struct Found {
    hits: Vec<RawHit>,
    more_available: bool,
}

#[derive(Default)]
struct IndexState {
    handler: Option<ResultsCompleteHandler>,
    phrase: SearchPhrase,
    selection: Option<Selection>,
    sequence: u64,
    results: Vec<RawHit>,
    more_available: bool,
}

struct Shared {
    text: PlaceTextIndex,
    registry: PoiRegistry,
    places: AHashMap<u64, PlaceRecord>,
    params: CatalogIndexParams,
    state: Mutex<IndexState>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, IndexState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[instrument(name = "Execute catalog search", skip_all, level = "debug", fields(sequence = request.sequence, radius_level = request.radius_level))]
    fn execute(&self, request: &SearchRequest) -> Result<Found> {
        let radius = self.params.radius_for_level(request.radius_level);
        let text = request.text.trim();

        let mut hits = if request.selection.is_none() {
            self.registry.matching(text)
        } else {
            Vec::new()
        };

        let candidates: Vec<(&PlaceRecord, f32)> = if text.is_empty() {
            if request.selection.is_some() {
                self.places.values().map(|place| (place, 0.0)).collect()
            } else {
                Vec::new()
            }
        } else {
            self.text
                .search(text, &self.params)?
                .into_iter()
                .filter_map(|(id, score)| self.places.get(&id).map(|place| (place, score)))
                .collect()
        };

        let mut more_available = false;
        let mut places = Vec::new();
        for (place, score) in candidates {
            let category = self.registry.category_of(&place.type_key);
            if let Some(selection) = &request.selection
                && !selection.accepts(place, category)
            {
                continue;
            }
            let distance = place.location.distance_to(&request.origin);
            if distance > radius {
                more_available = true;
                continue;
            }
            places.push(self.place_hit(place, f64::from(score), distance));
        }
        places.sort_by(|a, b| a.priority_distance.total_cmp(&b.priority_distance));
        hits.extend(places);

        let more_available = more_available && request.radius_level < self.params.max_radius_level;
        debug!(num_hits = hits.len(), radius, more_available, "Catalog search complete");
        Ok(Found {
            hits,
            more_available,
        })
    }

    fn place_hit(&self, place: &PlaceRecord, score: f64, distance: f64) -> RawHit {
        let type_label = self
            .registry
            .get(&place.type_key)
            .map(|t| t.translation.clone());
        RawHit::new(
            SearchObject::Place(Place {
                id: place.id,
                type_key: (!place.type_key.is_empty()).then(|| place.type_key.clone()),
                type_label,
                tags: place.tags.clone(),
            }),
            ObjectType::Poi,
            place.name.clone(),
        )
        .with_location(place.location)
        .with_priority(score, distance)
    }

    /// Store the results unless a newer search was issued meanwhile, then
    /// report through the handler captured with the request.
    fn complete(&self, request: SearchRequest, found: Result<Found>) {
        let outcome = {
            let mut state = self.state();
            if state.sequence != request.sequence {
                debug!(
                    sequence = request.sequence,
                    current = state.sequence,
                    "Discarding results of superseded search"
                );
                return;
            }
            match found {
                Ok(found) => {
                    state.results = found.hits;
                    state.more_available = found.more_available;
                    Ok(())
                }
                Err(err) => {
                    state.results.clear();
                    state.more_available = false;
                    Err(SearchError::from(err))
                }
            }
        };
        if let Some(handler) = request.handler {
            handler(outcome);
        }
    }
}

/// In-memory search index over a [`CatalogData`].
#[derive(Clone)]
pub struct CatalogSearchIndex {
    shared: Arc<Shared>,
}

impl CatalogSearchIndex {
    pub fn new(catalog: &CatalogData) -> Result<Self> {
        Self::with_params(catalog, CatalogIndexParams::default())
    }

    #[instrument(name = "Build CatalogSearchIndex", skip(catalog), fields(num_places = catalog.len()))]
    pub fn with_params(catalog: &CatalogData, params: CatalogIndexParams) -> Result<Self> {
        let t_build = std::time::Instant::now();
        let registry = PoiRegistry::from_frame(catalog.poi_types())?;
        let places = load_places(catalog)?;

        let text = PlaceTextIndex::build(places.values().map(|place| {
            let label = registry.get(&place.type_key).map(|t| t.translation.as_str());
            (place, label)
        }))?;

        info!(
            num_places = places.len(),
            num_poi_types = registry.len(),
            elapsed_seconds = ?t_build.elapsed(),
            "Catalog index ready"
        );
        Ok(Self {
            shared: Arc::new(Shared {
                text,
                registry,
                places,
                params,
                state: Mutex::new(IndexState::default()),
            }),
        })
    }

    pub fn params(&self) -> &CatalogIndexParams {
        &self.shared.params
    }

    /// Split `text` into the part covered by the selected words and the
    /// typed remainder. Text that no longer starts with the selected words
    /// drops the selection.
    fn update_phrase(state: &mut IndexState, text: &str, radius_level: u32) {
        let selected = state.phrase.text();
        if state.selection.is_some()
            && !selected.is_empty()
            && let Some(rest) = text.strip_prefix(&selected)
        {
            state.phrase.unknown_search = rest.to_string();
        } else {
            if state.selection.is_some() {
                trace!("Typed text no longer covers the selection, dropping it");
            }
            state.selection = None;
            state.phrase.selected_words.clear();
            state.phrase.unknown_search = text.to_string();
        }
        state.phrase.radius_level = radius_level;
    }
}

fn load_places(catalog: &CatalogData) -> Result<AHashMap<u64, PlaceRecord>> {
    let df = catalog.places();
    let ids = df.column("id")?.u64()?;
    let names = df.column("name")?.str()?;
    let types = df.column("type")?.str()?;
    let lats = df.column("lat")?.f64()?;
    let lons = df.column("lon")?.f64()?;
    let tags = df.column("tags")?.str()?;

    let mut places = AHashMap::with_capacity(df.height());
    for (id, name, type_key, lat, lon, tags) in izip!(ids, names, types, lats, lons, tags) {
        let (Some(id), Some(name), Some(lat), Some(lon)) = (id, name, lat, lon) else {
            continue;
        };
        places.insert(
            id,
            PlaceRecord {
                id,
                name: name.to_string(),
                type_key: type_key.unwrap_or_default().to_string(),
                location: LatLon::new(lat, lon),
                tags: tags
                    .unwrap_or_default()
                    .split(';')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
        );
    }
    Ok(places)
}

impl SearchIndex for CatalogSearchIndex {
    fn set_on_results_complete(&self, handler: ResultsCompleteHandler) {
        self.shared.state().handler = Some(handler);
    }

    fn search(
        &self,
        text: &str,
        settings: &SearchSettings,
    ) -> std::result::Result<(), SearchError> {
        let request = {
            let mut state = self.shared.state();
            state.sequence += 1;
            Self::update_phrase(&mut state, text, settings.radius_level);
            SearchRequest {
                sequence: state.sequence,
                text: state.phrase.unknown_search.clone(),
                selection: state.selection.clone(),
                origin: settings.origin,
                radius_level: settings.radius_level,
                handler: state.handler.clone(),
            }
        };
        debug!(sequence = request.sequence, text, "Scheduling catalog search");

        let shared = Arc::clone(&self.shared);
        rayon::spawn(move || {
            let found = shared.execute(&request);
            shared.complete(request, found);
        });
        Ok(())
    }

    fn current_results(&self) -> Vec<RawHit> {
        self.shared.state().results.clone()
    }

    fn phrase(&self) -> SearchPhrase {
        self.shared.state().phrase.clone()
    }

    fn is_search_more_available(&self, phrase: &SearchPhrase) -> bool {
        self.shared.state().more_available
            && phrase.radius_level < self.shared.params.max_radius_level
    }

    fn minimal_search_radius(&self, phrase: &SearchPhrase) -> Option<u32> {
        if phrase.is_empty() || phrase.radius_level == 0 {
            return None;
        }
        Some(self.shared.params.radius_for_level(phrase.radius_level) as u32)
    }

    fn select_result(&self, hit: &RawHit) {
        let mut state = self.shared.state();
        let name = display_name(hit);
        match Selection::from_object(&hit.object) {
            Some(selection) => {
                state.selection = Some(selection);
                state.phrase.selected_words = vec![name];
                state.phrase.unknown_search.clear();
            }
            None => {
                state.selection = None;
                state.phrase.selected_words.clear();
                state.phrase.unknown_search = name;
            }
        }
        debug!(phrase = %state.phrase.text(), "Selection committed");
    }

    fn reset_phrase(&self) {
        let mut state = self.shared.state();
        state.phrase = SearchPhrase::default();
        state.selection = None;
    }
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum IndexError {
        #[error("Tantivy error: {0}")]
        Tantivy(#[from] tantivy::TantivyError),
        #[error("DataFrame error: {0}")]
        DataFrame(#[from] polars::prelude::PolarsError),
        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }
    pub type Result<T> = std::result::Result<T, IndexError>;
}
