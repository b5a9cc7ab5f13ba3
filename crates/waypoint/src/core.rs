//! The owner-side search session.
//!
//! [`SearchSession`] wires the settings builder, the incremental engine, the
//! result projector and the selection resolver together and keeps the state
//! of one search screen: the current query, the radius level, the last page
//! and the search hint.
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
//! let location = FixedLocation {
//!     last_known: Some(LatLon::new(52.3731, 4.8922)),
//!     map_center: LatLon::new(52.3731, 4.8922),
//! };
//!
//! let mut session = SearchSession::builder(
//!     index,
//!     Arc::new(dispatcher),
//!     Arc::new(location),
//!     Arc::new(StaticPreferences::default()),
//! )
//! .build();
//!
//! session.run_search("cafe");
//! session.wait_for_search(&inbox, Duration::from_secs(5));
//! println!("{} results", session.search_results().len());
//! # Ok::<(), waypoint::error::WaypointError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::{
    config::SessionConfig,
    format::{DistanceFormatter, StandardDistanceFormatter},
    geo::LatLon,
    search::{
        Completion, IncrementalSearchEngine, OwnerDispatcher, OwnerInbox, RadiusLevel, RawHit,
        ResultPage, ResultProjector, SearchError, SearchHint, SearchIndex, SearchPhrase,
        SearchSettings, SearchSettingsBuilder, SelectionResolver,
    },
    sources::{
        HistoryStore, LocationSource, NoHistory, NoSavedFilters, PoiFilterRegistry,
        PreferenceStore,
    },
};

/// Receives the outcome of searches and user clicks. Called on the owner
/// context only.
pub trait SearchListener: Send {
    fn on_search_done(
        &mut self,
        phrase: &SearchPhrase,
        hits: &[RawHit],
        page: &ResultPage,
        results_count: usize,
    );

    fn on_click_search_result(&mut self, _hit: &RawHit) {}

    fn on_click_search_more(&mut self) {}

    /// The index failed. Reported once per failed search.
    fn on_search_unavailable(&mut self, _error: &SearchError) {}
}

/// A search screen session. Not shared between threads: completions from the
/// index reach it through an [`OwnerInbox`].
pub struct SearchSession {
    engine: IncrementalSearchEngine,
    settings_builder: SearchSettingsBuilder,
    projector: ResultProjector,
    resolver: SelectionResolver,
    config: SessionConfig,
    radius_level: RadiusLevel,
    search_results: Vec<RawHit>,
    last_page: Option<ResultPage>,
    search_location: Option<LatLon>,
    search_hint: Option<SearchHint>,
    listener: Option<Box<dyn SearchListener>>,
}

impl SearchSession {
    pub fn builder(
        index: Arc<dyn SearchIndex>,
        dispatcher: Arc<dyn OwnerDispatcher>,
        location: Arc<dyn LocationSource>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> SearchSessionBuilder {
        SearchSessionBuilder::new(index, dispatcher, location, preferences)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn content_limit(&self) -> usize {
        self.engine.content_limit()
    }

    pub fn is_searching(&self) -> bool {
        self.engine.is_searching()
    }

    pub fn search_query(&self) -> Option<&str> {
        self.engine.search_query()
    }

    /// Origin of the most recent settings snapshot.
    pub fn search_location(&self) -> Option<LatLon> {
        self.search_location
    }

    pub fn search_hint(&self) -> Option<&SearchHint> {
        self.search_hint.as_ref()
    }

    /// Hits backing the last delivered page.
    pub fn search_results(&self) -> &[RawHit] {
        &self.search_results
    }

    pub fn last_page(&self) -> Option<&ResultPage> {
        self.last_page.as_ref()
    }

    /// Stored radius level, not clamped.
    pub fn radius_level(&self) -> u32 {
        self.radius_level.get()
    }

    pub fn reset_search_radius(&mut self) {
        self.radius_level.reset();
    }

    pub fn set_listener(&mut self, listener: impl SearchListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Build a fresh settings snapshot, updating the search location and
    /// hint. With `reset_phrase` the index forgets typed and selected words.
    pub fn setup_search_settings(&mut self, reset_phrase: bool) -> SearchSettings {
        if reset_phrase {
            self.engine.index().reset_phrase();
        }
        let (settings, hint) = self.settings_builder.build(self.radius_level.get());
        self.search_location = Some(settings.origin);
        self.search_hint = Some(hint);
        settings
    }

    /// Search for `query`, superseding any search in flight. Index failures
    /// are reported to the listener.
    #[instrument(name = "Run search", skip(self), level = "debug")]
    pub fn run_search(&mut self, query: &str) {
        let settings = self.setup_search_settings(false);
        if let Err(err) = self.engine.search(query, settings) {
            warn!(error = %err, query, "Search could not be started");
            if let Some(listener) = self.listener.as_mut() {
                listener.on_search_unavailable(&err);
            }
        }
    }

    /// Handle a completion received from the inbox. Returns `false` when it
    /// belonged to a superseded search and was dropped.
    pub fn handle_completion(&mut self, completion: Completion) -> bool {
        let Some(outcome) = self.engine.accept(completion) else {
            return false;
        };

        match outcome {
            Ok(settings) => {
                let completed = self.engine.build_page(&settings, &self.projector);
                if let Some(listener) = self.listener.as_mut() {
                    listener.on_search_done(
                        &completed.phrase,
                        &completed.hits,
                        &completed.page,
                        completed.results_count,
                    );
                }
                self.search_results = completed.hits;
                self.last_page = Some(completed.page);
            }
            Err(err) => {
                warn!(error = %err, "Search failed");
                if let Some(listener) = self.listener.as_mut() {
                    listener.on_search_unavailable(&err);
                }
            }
        }
        self.engine.finish();
        true
    }

    /// Handle every completion already waiting in `inbox`. Returns how many
    /// were delivered.
    pub fn pump(&mut self, inbox: &OwnerInbox) -> usize {
        let mut delivered = 0;
        while let Some(completion) = inbox.try_next() {
            if self.handle_completion(completion) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Block until the current search completes or `timeout` elapses.
    /// Returns whether the session is idle afterwards.
    pub fn wait_for_search(&mut self, inbox: &OwnerInbox, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_searching() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match inbox.recv_timeout(remaining) {
                Some(completion) => {
                    self.handle_completion(completion);
                }
                None => break,
            }
        }
        !self.is_searching()
    }

    /// Widen the search radius by one level and repeat the last query.
    pub fn search_more(&mut self) {
        let level = self.radius_level.increment();
        debug!(radius_level = level, "Searching more");
        let query = self
            .engine
            .search_query()
            .filter(|query| !query.is_empty())
            .map(str::to_owned);
        if let Some(query) = query {
            self.run_search(&query);
        }
        if let Some(listener) = self.listener.as_mut() {
            listener.on_click_search_more();
        }
    }

    /// Commit `hit` into the phrase and search for the refined query.
    pub fn complete_query_with_object(&mut self, hit: RawHit) {
        let query = self
            .resolver
            .resolve_selection(hit, &mut self.radius_level);
        self.run_search(&query);
    }

    /// Report a click on the result at `position` of the last page.
    pub fn click_result(&mut self, position: usize) -> Option<RawHit> {
        let hit = self.search_results.get(position)?.clone();
        if let Some(listener) = self.listener.as_mut() {
            listener.on_click_search_result(&hit);
        }
        Some(hit)
    }
}

/// Builder for [`SearchSession`]. History, filter registry, formatter and
/// configuration have usable defaults.
pub struct SearchSessionBuilder {
    index: Arc<dyn SearchIndex>,
    dispatcher: Arc<dyn OwnerDispatcher>,
    location: Arc<dyn LocationSource>,
    preferences: Arc<dyn PreferenceStore>,
    history: Arc<dyn HistoryStore>,
    filters: Arc<dyn PoiFilterRegistry>,
    formatter: Option<Arc<dyn DistanceFormatter>>,
    config: SessionConfig,
    listener: Option<Box<dyn SearchListener>>,
}

impl SearchSessionBuilder {
    pub fn new(
        index: Arc<dyn SearchIndex>,
        dispatcher: Arc<dyn OwnerDispatcher>,
        location: Arc<dyn LocationSource>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            index,
            dispatcher,
            location,
            preferences,
            history: Arc::new(NoHistory),
            filters: Arc::new(NoSavedFilters),
            formatter: None,
            config: SessionConfig::default(),
            listener: None,
        }
    }

    pub fn history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    pub fn filters(mut self, filters: Arc<dyn PoiFilterRegistry>) -> Self {
        self.filters = filters;
        self
    }

    /// Override the formatter; defaults to one following the preferences'
    /// metric system.
    pub fn formatter(mut self, formatter: Arc<dyn DistanceFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn listener(mut self, listener: impl SearchListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Build the session. The index phrase is reset.
    #[instrument(name = "Create SearchSession", skip(self), level = "info")]
    pub fn build(self) -> SearchSession {
        let formatter = self.formatter.unwrap_or_else(|| {
            Arc::new(StandardDistanceFormatter::new(Arc::clone(&self.preferences)))
        });

        let mut session = SearchSession {
            engine: IncrementalSearchEngine::new(
                Arc::clone(&self.index),
                self.dispatcher,
                &self.config,
            ),
            settings_builder: SearchSettingsBuilder::new(
                self.location,
                self.preferences,
                Arc::clone(&formatter),
                &self.config,
            ),
            projector: ResultProjector::new(formatter, self.config.show_description),
            resolver: SelectionResolver::new(self.index, self.history, self.filters),
            config: self.config,
            radius_level: RadiusLevel::default(),
            search_results: Vec::new(),
            last_page: None,
            search_location: None,
            search_hint: None,
            listener: self.listener,
        };
        session.setup_search_settings(true);

        info!(
            content_limit = session.config.content_limit,
            show_description = session.config.show_description,
            "Search session ready"
        );
        session
    }
}
