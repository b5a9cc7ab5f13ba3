use std::sync::Arc;

use tracing::{debug, instrument, trace};

use super::{
    Completion, NothingFound, OwnerDispatcher, RadiusExpansion, RawHit, ResultPage,
    ResultProjector, ResultsCompleteHandler, SearchError, SearchIndex, SearchPhrase,
    SearchSettings,
};
use crate::config::{Messages, SessionConfig};

/// A search that has been issued and not yet completed.
#[derive(Debug)]
struct ActiveSearch {
    generation: u64,
    settings: SearchSettings,
}

/// Everything the listener receives for one completed search.
#[derive(Debug, Clone)]
pub struct CompletedSearch {
    pub phrase: SearchPhrase,
    /// Hits backing `page.results`, in the same order
    pub hits: Vec<RawHit>,
    pub page: ResultPage,
    pub results_count: usize,
}

/// Issues searches against the index and turns completions into pages.
///
/// Each search gets a new generation. The completion handler registered on
/// the index captures that generation, and registering it overwrites the
/// previous handler. Completions of older generations that were already
/// posted to the owner are dropped by [`Self::accept`].
pub struct IncrementalSearchEngine {
    index: Arc<dyn SearchIndex>,
    dispatcher: Arc<dyn OwnerDispatcher>,
    generation: u64,
    active: Option<ActiveSearch>,
    searching: bool,
    search_query: Option<String>,
    content_limit: usize,
    max_radius_level: u32,
    messages: Messages,
}

impl IncrementalSearchEngine {
    pub fn new(
        index: Arc<dyn SearchIndex>,
        dispatcher: Arc<dyn OwnerDispatcher>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            index,
            dispatcher,
            generation: 0,
            active: None,
            searching: false,
            search_query: None,
            content_limit: config.content_limit,
            max_radius_level: config.max_radius_level,
            messages: config.messages.clone(),
        }
    }

    pub fn index(&self) -> &Arc<dyn SearchIndex> {
        &self.index
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn content_limit(&self) -> usize {
        self.content_limit
    }

    /// Start a search, superseding any search still in flight.
    #[instrument(name = "Issue search", skip(self, settings), level = "debug", fields(radius_level = settings.radius_level))]
    pub fn search(&mut self, query: &str, settings: SearchSettings) -> Result<(), SearchError> {
        self.searching = true;
        self.search_query = Some(query.to_string());
        self.generation += 1;
        let generation = self.generation;

        let dispatcher = Arc::clone(&self.dispatcher);
        let handler: ResultsCompleteHandler = Arc::new(move |outcome| {
            dispatcher.dispatch(Completion {
                generation,
                outcome,
            });
        });
        self.index.set_on_results_complete(handler);

        if let Err(err) = self.index.search(query, &settings) {
            self.searching = false;
            self.active = None;
            return Err(err);
        }
        self.active = Some(ActiveSearch {
            generation,
            settings,
        });
        debug!(generation, "Search issued");
        Ok(())
    }

    /// Match a completion against the active search. Returns `None` for
    /// completions of superseded searches, otherwise the outcome together
    /// with the settings the search was issued with.
    pub fn accept(
        &mut self,
        completion: Completion,
    ) -> Option<Result<SearchSettings, SearchError>> {
        let current = self.active.as_ref().map(|active| active.generation);
        if current != Some(completion.generation) {
            debug!(
                generation = completion.generation,
                current = ?current,
                "Dropping completion of superseded search"
            );
            return None;
        }
        let active = self.active.take()?;
        Some(completion.outcome.map(|()| active.settings))
    }

    /// Build the result page from the index's current results.
    pub fn build_page(
        &self,
        settings: &SearchSettings,
        projector: &ResultProjector,
    ) -> CompletedSearch {
        let origin = Some(settings.origin);
        let mut results = Vec::new();
        let mut hits = Vec::new();
        for hit in self.index.current_results() {
            if results.len() >= self.content_limit {
                break;
            }
            match projector.project(&hit, origin) {
                Some(projected) => {
                    results.push(projected);
                    hits.push(hit);
                }
                None => trace!(object_type = ?hit.object_type, "Skipping hit without name"),
            }
        }

        let phrase = self.index.phrase();
        let expansion = (settings.radius_level < self.max_radius_level
            && self.index.is_search_more_available(&phrase))
        .then(|| RadiusExpansion {
            title: self.messages.increase_search_radius.clone(),
            nothing_found: if results.is_empty() {
                self.nothing_found(&phrase, projector)
            } else {
                None
            },
        });

        let results_count = results.len();
        debug!(
            query = self.search_query.as_deref().unwrap_or_default(),
            results_count,
            can_expand_radius = expansion.is_some(),
            "Result page built"
        );
        CompletedSearch {
            phrase,
            hits,
            page: ResultPage {
                results,
                expansion,
                no_items_message: self.messages.nothing_found.clone(),
            },
            results_count,
        }
    }

    fn nothing_found(
        &self,
        phrase: &SearchPhrase,
        projector: &ResultProjector,
    ) -> Option<NothingFound> {
        let radius = self.index.minimal_search_radius(phrase)?;
        let radius_meters = projector.formatter().round(f64::from(radius));
        Some(NothingFound {
            radius_meters,
            text: self
                .messages
                .nothing_found_within(&projector.formatter().format(radius_meters)),
        })
    }

    /// Mark the current search as done. Called after the listener has been
    /// notified.
    pub fn finish(&mut self) {
        self.searching = false;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        format::StandardDistanceFormatter,
        geo::LatLon,
        search::{
            OwnerInbox, owner_channel,
            testing::{FakeIndex, place_hit},
        },
        sources::StaticPreferences,
    };

    fn settings(radius_level: u32) -> SearchSettings {
        SearchSettings {
            origin: LatLon::new(52.3731, 4.8922),
            using_fallback_center: false,
            radius_level,
            locale: "en".to_string(),
            transliterate: false,
            empty_query_allowed: false,
            sort_by_name: false,
            search_types: Vec::new(),
        }
    }

    fn projector() -> ResultProjector {
        ResultProjector::new(
            Arc::new(StandardDistanceFormatter::new(Arc::new(
                StaticPreferences::default(),
            ))),
            true,
        )
    }

    fn engine(index: &Arc<FakeIndex>, limit: usize) -> (IncrementalSearchEngine, OwnerInbox) {
        let (dispatcher, inbox) = owner_channel();
        let config = SessionConfig::builder().content_limit(limit).build();
        (
            IncrementalSearchEngine::new(index.clone(), Arc::new(dispatcher), &config),
            inbox,
        )
    }

    #[test]
    fn test_search_sets_state_and_delegates() {
        let index = Arc::new(FakeIndex::default());
        let (mut engine, _inbox) = engine(&index, 10);

        engine.search("cafe", settings(2)).unwrap();

        assert!(engine.is_searching());
        assert_eq!(engine.search_query(), Some("cafe"));
        let searches = index.searches();
        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].0, "cafe");
        assert_eq!(searches[0].1.radius_level, 2);
    }

    #[test]
    fn test_page_is_capped_at_content_limit() {
        let index = Arc::new(FakeIndex::default());
        index.set_results((0..12).map(|i| place_hit(&format!("Cafe {i}"))).collect());
        index.set_more_available(true);
        let (mut engine, inbox) = engine(&index, 10);

        engine.search("cafe", settings(1)).unwrap();
        index.complete(Ok(()));

        let completion = inbox.recv_timeout(Duration::from_secs(1)).unwrap();
        let settings = engine.accept(completion).unwrap().unwrap();
        let completed = engine.build_page(&settings, &projector());

        assert_eq!(completed.page.len(), 10);
        assert_eq!(completed.results_count, 10);
        assert_eq!(completed.hits.len(), 10);
        assert_eq!(completed.hits[9].local_name, "Cafe 9");
        assert!(completed.page.can_expand_radius());
        assert!(completed.page.nothing_found().is_none());
    }

    #[test]
    fn test_empty_names_do_not_count() {
        let index = Arc::new(FakeIndex::default());
        index.set_results(vec![
            place_hit(""),
            place_hit("Cafe A"),
            place_hit(""),
            place_hit("Cafe B"),
            place_hit("Cafe C"),
        ]);
        let (engine, _inbox) = engine(&index, 2);

        let completed = engine.build_page(&settings(1), &projector());
        let names: Vec<_> = completed.page.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Cafe A", "Cafe B"]);
        assert_eq!(completed.results_count, 2);
    }

    #[test]
    fn test_zero_hits_with_minimal_radius() {
        let index = Arc::new(FakeIndex::default());
        index.set_more_available(true);
        index.set_minimal_radius(Some(5000));
        let (engine, _inbox) = engine(&index, 10);

        let completed = engine.build_page(&settings(1), &projector());
        assert!(completed.page.is_empty());
        assert_eq!(completed.page.no_items_message, "Nothing found");
        let nothing_found = completed.page.nothing_found().unwrap();
        assert_eq!(nothing_found.radius_meters, 5000.0);
        assert_eq!(nothing_found.text, "Nothing found within 5 km");
    }

    #[test]
    fn test_zero_hits_unknown_radius_has_no_annotation() {
        let index = Arc::new(FakeIndex::default());
        index.set_more_available(true);
        index.set_minimal_radius(None);
        let (engine, _inbox) = engine(&index, 10);

        let completed = engine.build_page(&settings(1), &projector());
        assert!(completed.page.can_expand_radius());
        assert!(completed.page.nothing_found().is_none());
    }

    #[test]
    fn test_expansion_mirrors_more_available() {
        let index = Arc::new(FakeIndex::default());
        let (engine, _inbox) = engine(&index, 10);

        index.set_more_available(false);
        assert!(!engine.build_page(&settings(1), &projector()).page.can_expand_radius());

        index.set_more_available(true);
        assert!(engine.build_page(&settings(1), &projector()).page.can_expand_radius());

        // Already at the highest level
        assert!(!engine.build_page(&settings(7), &projector()).page.can_expand_radius());
    }

    #[test]
    fn test_superseded_completion_is_dropped() {
        let index = Arc::new(FakeIndex::default());
        let (mut engine, inbox) = engine(&index, 10);

        engine.search("caf", settings(1)).unwrap();
        let stale_handler = index.handler().unwrap();
        engine.search("cafe", settings(1)).unwrap();

        // The first search finishes late, through the handler it registered
        stale_handler(Ok(()));
        let stale = inbox.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(engine.accept(stale).is_none());
        assert!(engine.is_searching());

        index.complete(Ok(()));
        let current = inbox.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(current.generation(), engine.generation());
        assert!(engine.accept(current).is_some());
    }

    #[test]
    fn test_synchronous_failure_clears_searching() {
        let index = Arc::new(FakeIndex::default());
        index.fail_next_search();
        let (mut engine, _inbox) = engine(&index, 10);

        let err = engine.search("cafe", settings(1)).unwrap_err();
        assert!(matches!(err, SearchError::Unavailable(_)));
        assert!(!engine.is_searching());

        engine.search("cafe", settings(1)).unwrap();
        assert!(engine.is_searching());
    }

    #[test]
    fn test_asynchronous_failure_is_returned_once() {
        let index = Arc::new(FakeIndex::default());
        let (mut engine, inbox) = engine(&index, 10);

        engine.search("cafe", settings(1)).unwrap();
        index.complete(Err(SearchError::Unavailable("index closed".to_string())));

        let completion = inbox.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(matches!(engine.accept(completion), Some(Err(_))));
        engine.finish();
        assert!(!engine.is_searching());
    }
}
