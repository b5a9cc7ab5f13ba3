//! Waypoint - Incremental Geo-Search Sessions
//!
//! Waypoint drives a text/geo search index the way a search screen does: the
//! user types, results stream in for the current radius, "search more" widens
//! the radius step by step, and picking a category or cuisine refines the
//! query. Results come back as a capped, display-ready page with distances,
//! type labels and an "increase search radius" affordance.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use waypoint::{
//!     CatalogSearchIndex, FixedLocation, LatLon, SearchSession, StaticPreferences,
//!     data::CatalogData, owner_channel,
//! };
//!
//! let index = Arc::new(CatalogSearchIndex::new(&CatalogData::embedded()?)?);
//! let (dispatcher, inbox) = owner_channel();
//! let dam = LatLon::new(52.3731, 4.8922);
//!
//! let mut session = SearchSession::builder(
//!     index,
//!     Arc::new(dispatcher),
//!     Arc::new(FixedLocation { last_known: Some(dam), map_center: dam }),
//!     Arc::new(StaticPreferences::default()),
//! )
//! .build();
//!
//! session.run_search("museum");
//! session.wait_for_search(&inbox, Duration::from_secs(5));
//! if let Some(page) = session.last_page() {
//!     for result in &page.results {
//!         println!("{} {:?}", result.name, result.distance.as_ref().map(|d| &d.text));
//!     }
//!     if page.can_expand_radius() {
//!         session.search_more();
//!     }
//! }
//! # Ok::<(), waypoint::error::WaypointError>(())
//! ```
//!
//! # Threading
//!
//! A [`SearchSession`] lives on one owner thread. The index completes
//! searches on its own threads and posts a [`Completion`] through an
//! [`OwnerDispatcher`]; the owner feeds completions back with
//! [`SearchSession::handle_completion`] (or [`SearchSession::pump`]).
//! Completions of superseded searches are dropped.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod data;
pub mod error;
mod format;
mod geo;
mod index;
mod search;
mod sources;

pub use crate::core::{SearchListener, SearchSession, SearchSessionBuilder};

pub use config::{DISTANCE_THRESHOLD_METERS, Messages, SessionConfig, SessionConfigBuilder};
pub use format::{
    DistanceFormatter, MetricSystem, StandardDistanceFormatter, format_distance, round_to_step,
};
pub use geo::{LatLon, distance_meters};
pub use index::{CatalogIndexParams, CatalogSearchIndex, IndexError};
pub use polars;
pub use search::{
    ChannelDispatcher, CompletedSearch, Completion, Distance, IncrementalSearchEngine,
    MAX_DEFAULT_SEARCH_RADIUS, NothingFound, ObjectType, OwnerDispatcher, OwnerInbox, Place,
    PoiCategory, PoiFilter, PoiType, ProjectedResult, RadiusExpansion, RadiusLevel, RawHit,
    ResultPage, ResultProjector, ResultsCompleteHandler, SEARCH_AMENITY_TYPE_PRIORITY,
    SearchError, SearchHint, SearchIndex, SearchObject, SearchPhrase, SearchSettings,
    SearchSettingsBuilder, SelectionResolver, display_name, owner_channel,
};
pub use sources::{
    FixedLocation, HistoryEntry, HistoryStore, LocationSource, NoHistory, NoSavedFilters,
    PoiFilterRegistry, PreferenceStore, StaticPreferences,
};
pub use waypoint_data as data_processing;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Waypoint library.
///
/// Installs a `tracing` fmt subscriber once. `RUST_LOG` takes precedence over
/// `level`; Tantivy is kept at `warn`.
///
/// # Examples
///
/// ```rust
/// use tracing::Level;
/// use waypoint::init_logging;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), waypoint::error::WaypointError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::WaypointError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("tantivy=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    fn session() -> (SearchSession, OwnerInbox) {
        let index = CatalogSearchIndex::new(&data::CatalogData::embedded().unwrap()).unwrap();
        let (dispatcher, inbox) = owner_channel();
        let dam = LatLon::new(52.3731, 4.8922);
        let session = SearchSession::builder(
            Arc::new(index),
            Arc::new(dispatcher),
            Arc::new(FixedLocation {
                last_known: Some(dam),
                map_center: dam,
            }),
            Arc::new(StaticPreferences::default()),
        )
        .build();
        (session, inbox)
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        setup_test_env();
        assert!(init_logging(tracing::Level::DEBUG).is_ok());
    }

    #[test]
    fn test_session_over_embedded_catalog() {
        setup_test_env();
        let (mut session, inbox) = session();

        session.run_search("cafe");
        assert!(session.wait_for_search(&inbox, Duration::from_secs(10)));

        let page = session.last_page().unwrap();
        assert!(!page.is_empty());
        assert!(page.len() <= session.content_limit());
        assert!(page.can_expand_radius());
    }

    #[test]
    fn test_search_more_reaches_utrecht() {
        setup_test_env();
        let (mut session, inbox) = session();

        session.run_search("cafe utrecht");
        assert!(session.wait_for_search(&inbox, Duration::from_secs(10)));
        while session
            .last_page()
            .is_some_and(|page| !page.results.iter().any(|r| r.name == "Cafe Utrecht Centraal"))
        {
            assert!(session.last_page().unwrap().can_expand_radius());
            session.search_more();
            assert!(session.wait_for_search(&inbox, Duration::from_secs(10)));
        }
        // Utrecht is ~35 km out, only the 64 km radius of level 7 reaches it
        assert_eq!(session.radius_level(), 7);
    }
}
