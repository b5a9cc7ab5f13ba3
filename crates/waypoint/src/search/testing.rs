//! In-memory [`SearchIndex`] for unit tests. Searches are recorded and only
//! complete when the test calls [`FakeIndex::complete`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{
    ObjectType, Place, RawHit, ResultsCompleteHandler, SearchError, SearchIndex, SearchObject,
    SearchPhrase, SearchSettings, projector::display_name,
};
use crate::geo::LatLon;

#[derive(Default)]
struct FakeState {
    handler: Option<ResultsCompleteHandler>,
    results: Vec<RawHit>,
    more_available: bool,
    minimal_radius: Option<u32>,
    phrase: SearchPhrase,
    searches: Vec<(String, SearchSettings)>,
    selected: Vec<RawHit>,
    resets: usize,
    fail_next: bool,
}

#[derive(Default)]
pub(crate) struct FakeIndex {
    state: Mutex<FakeState>,
}

impl FakeIndex {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_results(&self, results: Vec<RawHit>) {
        self.state().results = results;
    }

    pub(crate) fn set_more_available(&self, more: bool) {
        self.state().more_available = more;
    }

    pub(crate) fn set_minimal_radius(&self, radius: Option<u32>) {
        self.state().minimal_radius = radius;
    }

    pub(crate) fn fail_next_search(&self) {
        self.state().fail_next = true;
    }

    pub(crate) fn searches(&self) -> Vec<(String, SearchSettings)> {
        self.state().searches.clone()
    }

    pub(crate) fn selected(&self) -> Vec<RawHit> {
        self.state().selected.clone()
    }

    pub(crate) fn resets(&self) -> usize {
        self.state().resets
    }

    pub(crate) fn handler(&self) -> Option<ResultsCompleteHandler> {
        self.state().handler.clone()
    }

    /// Finish the pending search through the currently registered handler.
    pub(crate) fn complete(&self, outcome: Result<(), SearchError>) {
        // Invoke outside the lock, the handler may call back into the index
        let handler = self.handler();
        if let Some(handler) = handler {
            handler(outcome);
        }
    }
}

impl SearchIndex for FakeIndex {
    fn set_on_results_complete(&self, handler: ResultsCompleteHandler) {
        self.state().handler = Some(handler);
    }

    fn search(&self, text: &str, settings: &SearchSettings) -> Result<(), SearchError> {
        let mut state = self.state();
        if std::mem::take(&mut state.fail_next) {
            return Err(SearchError::Unavailable("fake index failure".to_string()));
        }
        state.phrase.radius_level = settings.radius_level;
        state.searches.push((text.to_string(), settings.clone()));
        Ok(())
    }

    fn current_results(&self) -> Vec<RawHit> {
        self.state().results.clone()
    }

    fn phrase(&self) -> SearchPhrase {
        self.state().phrase.clone()
    }

    fn is_search_more_available(&self, _phrase: &SearchPhrase) -> bool {
        self.state().more_available
    }

    fn minimal_search_radius(&self, _phrase: &SearchPhrase) -> Option<u32> {
        self.state().minimal_radius
    }

    fn select_result(&self, hit: &RawHit) {
        let mut state = self.state();
        let name = display_name(hit);
        if hit.object.is_refinement() {
            state.phrase.selected_words.push(name);
            state.phrase.unknown_search.clear();
        } else {
            state.phrase.unknown_search = name;
        }
        state.selected.push(hit.clone());
    }

    fn reset_phrase(&self) {
        let mut state = self.state();
        state.phrase = SearchPhrase::default();
        state.resets += 1;
    }
}

/// A named place a few hundred meters from central Amsterdam.
pub(crate) fn place_hit(name: &str) -> RawHit {
    RawHit::new(
        SearchObject::Place(Place {
            id: 1,
            type_key: Some("cafe".to_string()),
            type_label: Some("Cafe".to_string()),
            tags: vec![],
        }),
        ObjectType::Poi,
        name,
    )
    .with_location(LatLon::new(52.3776, 4.8922))
}
