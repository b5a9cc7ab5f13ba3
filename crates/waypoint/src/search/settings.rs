use std::sync::Arc;

use tracing::trace;

use super::ObjectType;
use crate::{
    config::{Messages, SessionConfig},
    format::DistanceFormatter,
    geo::LatLon,
    sources::{LocationSource, PreferenceStore},
};

/// Immutable settings for one search call.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    /// Anchor all distances and radius checks are measured from
    pub origin: LatLon,
    /// True when the map center was used because the device location was
    /// unknown or too far away
    pub using_fallback_center: bool,
    /// Radius level clamped into `[1, max_radius_level]`
    pub radius_level: u32,
    pub locale: String,
    pub transliterate: bool,
    pub empty_query_allowed: bool,
    pub sort_by_name: bool,
    /// Object types to search for; empty means all of them
    pub search_types: Vec<ObjectType>,
}

/// Text shown in the search box before anything is typed.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum SearchHint {
    /// Searching around the map center while the device is elsewhere.
    DistanceFromMyLocation { meters: f64, text: String },
    Category { text: String },
}

impl SearchHint {
    pub fn text(&self) -> &str {
        match self {
            Self::DistanceFromMyLocation { text, .. } | Self::Category { text } => text,
        }
    }
}

/// Derives the search origin and radius level into a [`SearchSettings`]
/// snapshot.
#[derive(Clone)]
pub struct SearchSettingsBuilder {
    location: Arc<dyn LocationSource>,
    preferences: Arc<dyn PreferenceStore>,
    formatter: Arc<dyn DistanceFormatter>,
    distance_threshold_meters: f64,
    max_radius_level: u32,
    messages: Messages,
}

impl SearchSettingsBuilder {
    pub fn new(
        location: Arc<dyn LocationSource>,
        preferences: Arc<dyn PreferenceStore>,
        formatter: Arc<dyn DistanceFormatter>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            location,
            preferences,
            formatter,
            distance_threshold_meters: config.distance_threshold_meters,
            max_radius_level: config.max_radius_level.max(1),
            messages: config.messages.clone(),
        }
    }

    /// Build a snapshot for the given stored (possibly out of range) radius
    /// level. Never fails: a missing device location selects the map center.
    pub fn build(&self, stored_radius_level: u32) -> (SearchSettings, SearchHint) {
        let device = self.location.last_known_location();
        let center = self.location.map_view_center();

        let (origin, using_fallback_center) = match device {
            Some(device) if device.distance_to(&center) < self.distance_threshold_meters => {
                (device, false)
            }
            _ => (center, true),
        };

        let settings = SearchSettings {
            origin,
            using_fallback_center,
            radius_level: stored_radius_level.clamp(1, self.max_radius_level),
            locale: self.preferences.locale(),
            transliterate: self.preferences.transliterate(),
            empty_query_allowed: false,
            sort_by_name: false,
            search_types: Vec::new(),
        };
        trace!(
            origin = %settings.origin,
            using_fallback_center,
            radius_level = settings.radius_level,
            "Search settings built"
        );

        let hint = self.hint(&settings, device);
        (settings, hint)
    }

    fn hint(&self, settings: &SearchSettings, device: Option<LatLon>) -> SearchHint {
        match device {
            Some(device) if settings.using_fallback_center => {
                let meters = settings.origin.distance_to(&device);
                SearchHint::DistanceFromMyLocation {
                    meters,
                    text: self
                        .messages
                        .away_from_my_location(&self.formatter.format(meters)),
                }
            }
            _ => SearchHint::Category {
                text: self.messages.category_hint.clone(),
            },
        }
    }
}
