use crate::{error::WaypointError, search::MAX_DEFAULT_SEARCH_RADIUS};

/// Device locations closer than this to the map center are used as search
/// origin; farther ones fall back to the map center.
pub const DISTANCE_THRESHOLD_METERS: f64 = 70_000.0;

const DISTANCE_PLACEHOLDER: &str = "{distance}";

/// User facing strings produced by the session.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub nothing_found: String,
    pub increase_search_radius: String,
    pub nothing_found_in_radius: String,
    /// Must contain a `{distance}` placeholder.
    pub away_from_my_location: String,
    pub category_hint: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            nothing_found: "Nothing found".to_string(),
            increase_search_radius: "Increase search radius".to_string(),
            nothing_found_in_radius: "Nothing found within".to_string(),
            away_from_my_location: "{distance} away from my location".to_string(),
            category_hint: "Search for a place or category".to_string(),
        }
    }
}

impl Messages {
    pub fn away_from_my_location(&self, distance: &str) -> String {
        self.away_from_my_location
            .replace(DISTANCE_PLACEHOLDER, distance)
    }

    pub fn nothing_found_within(&self, distance: &str) -> String {
        format!("{} {distance}", self.nothing_found_in_radius)
    }
}

/// Configuration of a search session.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Maximum number of result rows per page
    pub content_limit: usize,
    /// Include type labels ("Cafe", "Food") under result names
    pub show_description: bool,
    /// Maximum device-to-map-center distance for using the device location
    pub distance_threshold_meters: f64,
    /// Upper bound the stored radius level is clamped to when searching
    pub max_radius_level: u32,
    pub messages: Messages,
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            content_limit: 10,
            show_description: true,
            distance_threshold_meters: DISTANCE_THRESHOLD_METERS,
            max_radius_level: MAX_DEFAULT_SEARCH_RADIUS,
            messages: Messages::default(),
        }
    }
}

/// Builder for creating session configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
        }
    }

    /// Short lists without descriptions, for head units and small screens
    pub fn compact() -> Self {
        let mut builder = Self::new();
        builder.config.content_limit = 6;
        builder.config.show_description = false;
        builder
    }

    /// Long lists with type labels
    pub fn detailed() -> Self {
        let mut builder = Self::new();
        builder.config.content_limit = 20;
        builder.config.show_description = true;
        builder
    }

    /// Set the maximum number of rows per page (at least one)
    pub fn content_limit(mut self, limit: usize) -> Self {
        self.config.content_limit = limit.max(1);
        self
    }

    pub fn show_description(mut self, enabled: bool) -> Self {
        self.config.show_description = enabled;
        self
    }

    pub fn distance_threshold(mut self, meters: f64) -> Self {
        self.config.distance_threshold_meters = meters.max(0.0);
        self
    }

    /// Set the highest radius level used for searching (at least one)
    pub fn max_radius_level(mut self, level: u32) -> Self {
        self.config.max_radius_level = level.max(1);
        self
    }

    /// Replace the user facing strings
    pub fn messages(mut self, messages: Messages) -> Result<Self, WaypointError> {
        if !messages.away_from_my_location.contains(DISTANCE_PLACEHOLDER) {
            return Err(WaypointError::ConfigError(format!(
                "away_from_my_location message must contain {DISTANCE_PLACEHOLDER}, got '{}'",
                messages.away_from_my_location
            )));
        }
        self.config.messages = messages;
        Ok(self)
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.content_limit, 10);
        assert!(config.show_description);
        assert_eq!(config.distance_threshold_meters, 70_000.0);
        assert_eq!(config.max_radius_level, MAX_DEFAULT_SEARCH_RADIUS);
    }

    #[test]
    fn test_presets() {
        let compact = SessionConfigBuilder::compact().build();
        assert_eq!(compact.content_limit, 6);
        assert!(!compact.show_description);

        let detailed = SessionConfigBuilder::detailed().build();
        assert_eq!(detailed.content_limit, 20);
        assert!(detailed.show_description);
    }

    #[test]
    fn test_override_preset() {
        let config = SessionConfigBuilder::compact()
            .content_limit(3)
            .show_description(true)
            .max_radius_level(4)
            .build();

        assert_eq!(config.content_limit, 3);
        assert!(config.show_description);
        assert_eq!(config.max_radius_level, 4);
    }

    #[test]
    fn test_edge_case_values() {
        let config = SessionConfig::builder()
            .content_limit(0)
            .max_radius_level(0)
            .distance_threshold(-1.0)
            .build();

        assert_eq!(config.content_limit, 1);
        assert_eq!(config.max_radius_level, 1);
        assert_eq!(config.distance_threshold_meters, 0.0);
    }

    #[test]
    fn test_messages_validation() {
        let messages = Messages {
            away_from_my_location: "{distance} von meinem Standort".to_string(),
            ..Messages::default()
        };
        let config = SessionConfig::builder().messages(messages).unwrap().build();
        assert_eq!(
            config.messages.away_from_my_location("3 km"),
            "3 km von meinem Standort"
        );

        let broken = Messages {
            away_from_my_location: "away from my location".to_string(),
            ..Messages::default()
        };
        assert!(SessionConfig::builder().messages(broken).is_err());
    }

    #[test]
    fn test_nothing_found_within() {
        let messages = Messages::default();
        assert_eq!(
            messages.nothing_found_within("5 km"),
            "Nothing found within 5 km"
        );
    }
}
