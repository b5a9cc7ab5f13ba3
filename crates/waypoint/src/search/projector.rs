use std::sync::Arc;

use super::{Distance, ProjectedResult, RawHit, SearchObject};
use crate::{format::DistanceFormatter, geo::LatLon};

/// Turns raw hits into display-ready results.
#[derive(Clone)]
pub struct ResultProjector {
    formatter: Arc<dyn DistanceFormatter>,
    show_description: bool,
}

impl ResultProjector {
    pub fn new(formatter: Arc<dyn DistanceFormatter>, show_description: bool) -> Self {
        Self {
            formatter,
            show_description,
        }
    }

    pub fn formatter(&self) -> &dyn DistanceFormatter {
        self.formatter.as_ref()
    }

    /// Project `hit` relative to `origin`. Hits whose display name is empty
    /// are discarded.
    pub fn project(&self, hit: &RawHit, origin: Option<LatLon>) -> Option<ProjectedResult> {
        let name = display_name(hit);
        if name.is_empty() {
            return None;
        }

        let type_label = if self.show_description {
            type_label(hit).filter(|label| !label.is_empty() && *label != name)
        } else {
            None
        };

        let (distance, browsable) = match (hit.location, origin) {
            (Some(location), Some(origin)) => {
                let meters = location.distance_to(&origin);
                let text = self.formatter.format(meters);
                (Some(Distance { meters, text }), false)
            }
            _ => (None, true),
        };

        Some(ProjectedResult {
            name,
            type_label,
            distance,
            location: hit.location,
            icon: hit.object.icon_key().map(str::to_owned),
            browsable,
            hit: hit.clone(),
        })
    }
}

/// Name shown for a hit: the object's own name for POI types and filters,
/// the localized hit name otherwise.
pub fn display_name(hit: &RawHit) -> String {
    let own = match &hit.object {
        SearchObject::Category(category) => category.translation.as_str(),
        SearchObject::PoiType(poi_type) => poi_type.translation.as_str(),
        SearchObject::Filter(filter) => filter.name.as_str(),
        SearchObject::Place(_) | SearchObject::Other => "",
    };
    let name = if own.trim().is_empty() {
        hit.local_name.trim()
    } else {
        own.trim()
    };
    name.to_string()
}

fn type_label(hit: &RawHit) -> Option<String> {
    match &hit.object {
        SearchObject::Place(place) => place.type_label.clone(),
        SearchObject::PoiType(poi_type) => {
            poi_type.parent.as_ref().map(|parent| parent.translation.clone())
        }
        SearchObject::Category(_) | SearchObject::Filter(_) | SearchObject::Other => None,
    }
}
