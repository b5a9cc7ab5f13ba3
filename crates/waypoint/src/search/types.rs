//! Value types flowing through a search cycle: raw hits coming out of the
//! index and the projected, display-ready page going out to the listener.

use crate::geo::LatLon;
use crate::sources::HistoryEntry;

/// Priority given to POI type results, including the synthesized filter
/// result produced when an additional subtype is selected.
pub const SEARCH_AMENITY_TYPE_PRIORITY: f64 = 100.0;

/// Highest radius level the search index supports.
pub const MAX_DEFAULT_SEARCH_RADIUS: u32 = 7;

/// A top-level POI category such as "food" or "transport".
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoiCategory {
    pub key_name: String,
    pub translation: String,
}

impl PoiCategory {
    pub fn new(key_name: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            translation: translation.into(),
        }
    }
}

/// A POI type. Additional types (cuisines, amenities' attributes) refine a
/// parent category rather than standing on their own.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoiType {
    pub key_name: String,
    pub translation: String,
    pub additional: bool,
    pub parent: Option<PoiCategory>,
}

impl PoiType {
    /// Tag form of the key used for name filtering: `cuisine_pizza` becomes
    /// `cuisine:pizza`.
    pub fn name_filter_key(&self) -> String {
        self.key_name.replace('_', ":").to_lowercase()
    }
}

/// A POI filter: a set of accepted categories, optionally narrowed by a name
/// or tag filter.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiFilter {
    pub id: String,
    pub name: String,
    pub accepted_categories: Vec<String>,
    pub name_filter: Option<String>,
}

impl PoiFilter {
    /// Id prefix of the standard per-category filters.
    pub const STD_PREFIX: &'static str = "std_";

    pub fn standard_id(category_key: &str) -> String {
        format!("{}{category_key}", Self::STD_PREFIX)
    }

    /// The standard filter accepting everything in `category`.
    pub fn standard(category: &PoiCategory) -> Self {
        Self {
            id: Self::standard_id(&category.key_name),
            name: category.translation.clone(),
            accepted_categories: vec![category.key_name.clone()],
            name_filter: None,
        }
    }

    pub fn clear_filter(&mut self) {
        self.accepted_categories.clear();
        self.name_filter = None;
    }

    pub fn update_types_to_accept(&mut self, category: &PoiCategory) {
        self.accepted_categories = vec![category.key_name.clone()];
    }

    pub fn set_filter_by_name(&mut self, filter: impl Into<String>) {
        self.name_filter = Some(filter.into());
    }

    pub fn accepts_category(&self, category_key: &str) -> bool {
        self.accepted_categories.iter().any(|c| c == category_key)
    }
}

/// A concrete place from the catalog.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: u64,
    pub type_key: Option<String>,
    pub type_label: Option<String>,
    pub tags: Vec<String>,
}

/// What a hit refers to.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum SearchObject {
    Category(PoiCategory),
    PoiType(PoiType),
    Filter(PoiFilter),
    Place(Place),
    Other,
}

impl SearchObject {
    /// History entry for objects that are remembered when selected.
    pub fn history_entry(&self) -> Option<HistoryEntry> {
        match self {
            Self::Category(category) => Some(HistoryEntry::Category(category.clone())),
            Self::PoiType(poi_type) => Some(HistoryEntry::PoiType(poi_type.clone())),
            Self::Filter(filter) => Some(HistoryEntry::Filter(filter.clone())),
            Self::Place(_) | Self::Other => None,
        }
    }

    /// Key of the icon representing this object.
    pub fn icon_key(&self) -> Option<&str> {
        match self {
            Self::Category(category) => Some(&category.key_name),
            Self::PoiType(poi_type) => Some(&poi_type.key_name),
            Self::Filter(filter) => filter.accepted_categories.first().map(String::as_str),
            Self::Place(place) => place.type_key.as_deref(),
            Self::Other => None,
        }
    }

    /// Whether selecting this object narrows the phrase instead of picking a
    /// destination.
    pub fn is_refinement(&self) -> bool {
        matches!(self, Self::Category(_) | Self::PoiType(_) | Self::Filter(_))
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    PoiType,
    Poi,
    Filter,
    City,
    Street,
    Location,
}

/// A ranked match as returned by the search index.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
    pub object: SearchObject,
    pub object_type: ObjectType,
    pub local_name: String,
    pub priority: f64,
    pub priority_distance: f64,
    pub location: Option<LatLon>,
}

impl RawHit {
    pub fn new(
        object: SearchObject,
        object_type: ObjectType,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            object,
            object_type,
            local_name: local_name.into(),
            priority: 0.0,
            priority_distance: 0.0,
            location: None,
        }
    }

    pub fn with_location(mut self, location: LatLon) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_priority(mut self, priority: f64, priority_distance: f64) -> Self {
        self.priority = priority;
        self.priority_distance = priority_distance;
        self
    }
}

/// The index's view of what has been typed and selected so far.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPhrase {
    /// Words committed by selecting results.
    pub selected_words: Vec<String>,
    /// Text typed after the last selected word.
    pub unknown_search: String,
    pub radius_level: u32,
}

impl SearchPhrase {
    /// Full phrase text. Selected words are always followed by a space so
    /// that the next typed word starts a new term.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for word in &self.selected_words {
            text.push_str(word);
            text.push(' ');
        }
        text.push_str(&self.unknown_search);
        text
    }

    pub fn is_empty(&self) -> bool {
        self.selected_words.is_empty() && self.unknown_search.trim().is_empty()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Distance {
    pub meters: f64,
    pub text: String,
}

/// A hit ready for display.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedResult {
    pub name: String,
    pub type_label: Option<String>,
    pub distance: Option<Distance>,
    pub location: Option<LatLon>,
    pub icon: Option<String>,
    /// Selecting this result opens a sub-list instead of a destination.
    pub browsable: bool,
    pub hit: RawHit,
}

/// "Nothing found within D" annotation on the expansion affordance.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NothingFound {
    pub radius_meters: f64,
    pub text: String,
}

/// The "increase search radius" affordance.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusExpansion {
    pub title: String,
    pub nothing_found: Option<NothingFound>,
}

/// One page of projected results.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub results: Vec<ProjectedResult>,
    pub expansion: Option<RadiusExpansion>,
    /// Shown by the client when `results` is empty.
    pub no_items_message: String,
}

impl ResultPage {
    pub fn can_expand_radius(&self) -> bool {
        self.expansion.is_some()
    }

    pub fn nothing_found(&self) -> Option<&NothingFound> {
        self.expansion.as_ref().and_then(|e| e.nothing_found.as_ref())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
