//! Collaborators the session reads from or reports to.
//!
//! The session never owns device location, user preferences, search history
//! or saved filters. It talks to them through these traits so the host
//! application can plug in its own implementations.

use crate::{
    format::MetricSystem,
    geo::LatLon,
    search::{PoiCategory, PoiFilter, PoiType},
};

/// Device location and current map viewport.
pub trait LocationSource: Send + Sync {
    fn last_known_location(&self) -> Option<LatLon>;
    fn map_view_center(&self) -> LatLon;
}

/// Read-only user preferences relevant to searching.
pub trait PreferenceStore: Send + Sync {
    fn locale(&self) -> String;
    fn transliterate(&self) -> bool;
    fn metric_system(&self) -> MetricSystem;
}

/// An item recorded into search history after a confirmed selection.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    Category(PoiCategory),
    PoiType(PoiType),
    Filter(PoiFilter),
}

/// Search history sink. Fire and forget.
pub trait HistoryStore: Send + Sync {
    fn add_item(&self, entry: HistoryEntry);
}

/// Lookup of saved and standard POI filters by id.
pub trait PoiFilterRegistry: Send + Sync {
    fn filter_by_id(&self, id: &str) -> Option<PoiFilter>;
}

/// Preferences with fixed values.
#[derive(Debug, Clone)]
pub struct StaticPreferences {
    pub locale: String,
    pub transliterate: bool,
    pub metric_system: MetricSystem,
}

impl Default for StaticPreferences {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            transliterate: false,
            metric_system: MetricSystem::Kilometers,
        }
    }
}

impl PreferenceStore for StaticPreferences {
    fn locale(&self) -> String {
        self.locale.clone()
    }

    fn transliterate(&self) -> bool {
        self.transliterate
    }

    fn metric_system(&self) -> MetricSystem {
        self.metric_system
    }
}

/// Location source with a fixed device location and map center.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    pub last_known: Option<LatLon>,
    pub map_center: LatLon,
}

impl LocationSource for FixedLocation {
    fn last_known_location(&self) -> Option<LatLon> {
        self.last_known
    }

    fn map_view_center(&self) -> LatLon {
        self.map_center
    }
}

/// History store that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistoryStore for NoHistory {
    fn add_item(&self, _entry: HistoryEntry) {}
}

/// Registry without any saved filters; standard filters are built on demand.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSavedFilters;

impl PoiFilterRegistry for NoSavedFilters {
    fn filter_by_id(&self, _id: &str) -> Option<PoiFilter> {
        None
    }
}
