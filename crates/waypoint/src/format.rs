//! Human readable distances.

use std::sync::Arc;

use crate::sources::PreferenceStore;

const METERS_IN_KILOMETER: f64 = 1000.0;
const METERS_IN_MILE: f64 = 1609.344;
const METERS_IN_FOOT: f64 = 0.3048;

/// Unit system used when rendering distances.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricSystem {
    #[default]
    Kilometers,
    MilesAndFeet,
}

/// Renders distances for display.
pub trait DistanceFormatter: Send + Sync {
    /// Format a distance given in meters, including its unit.
    fn format(&self, meters: f64) -> String;

    /// Round a distance down to a 1-2-5 step (1, 2, 5, 10, 20, 50, ...) of
    /// the display unit. Used for "nothing found within" annotations.
    fn round(&self, meters: f64) -> f64 {
        round_to_step(meters, 1.0)
    }
}

/// Formatter that follows the metric system from the user's preferences,
/// read at every call.
#[derive(Clone)]
pub struct StandardDistanceFormatter {
    preferences: Arc<dyn PreferenceStore>,
}

impl StandardDistanceFormatter {
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { preferences }
    }
}

impl DistanceFormatter for StandardDistanceFormatter {
    fn format(&self, meters: f64) -> String {
        format_distance(meters, self.preferences.metric_system())
    }

    fn round(&self, meters: f64) -> f64 {
        match self.preferences.metric_system() {
            MetricSystem::Kilometers => round_to_step(meters, 1.0),
            MetricSystem::MilesAndFeet if meters < METERS_IN_MILE => {
                round_to_step(meters, METERS_IN_FOOT)
            }
            MetricSystem::MilesAndFeet => round_to_step(meters, METERS_IN_MILE),
        }
    }
}

pub fn format_distance(meters: f64, system: MetricSystem) -> String {
    let meters = meters.max(0.0);
    match system {
        MetricSystem::Kilometers if meters < METERS_IN_KILOMETER => {
            format!("{} m", meters.round() as u64)
        }
        MetricSystem::Kilometers => format!("{} km", large_unit(meters / METERS_IN_KILOMETER)),
        MetricSystem::MilesAndFeet if meters < METERS_IN_MILE / 10.0 => {
            format!("{} ft", (meters / METERS_IN_FOOT).round() as u64)
        }
        MetricSystem::MilesAndFeet => format!("{} mi", large_unit(meters / METERS_IN_MILE)),
    }
}

// One decimal below ten units unless it would print ".0".
fn large_unit(value: f64) -> String {
    let one_decimal = (value * 10.0).round() / 10.0;
    if value >= 10.0 || one_decimal.fract() == 0.0 {
        format!("{}", value.round() as u64)
    } else {
        format!("{one_decimal:.1}")
    }
}

/// Largest step of the 1-2-5 series (in `unit_meters` units) that does not
/// exceed `meters`; never below one unit.
pub fn round_to_step(meters: f64, unit_meters: f64) -> f64 {
    let value = meters / unit_meters;
    let mut generator = 1.0;
    let mut pointer = 1u32;
    let mut rounded = 1.0;
    while value >= generator {
        rounded = generator;
        if pointer % 3 == 2 {
            generator = generator * 5.0 / 2.0;
        } else {
            generator *= 2.0;
        }
        pointer += 1;
    }
    rounded * unit_meters
}
