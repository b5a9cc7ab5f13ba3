use std::sync::Arc;

use super::{RawHit, SearchError, SearchPhrase, SearchSettings};

/// Completion callback registered on a [`SearchIndex`]. Invoked from
/// whatever thread the index finishes its work on.
pub type ResultsCompleteHandler = Arc<dyn Fn(Result<(), SearchError>) + Send + Sync>;

/// The text/geo search core driven by a session.
///
/// Ranking, phrase parsing and radius handling are the index's business; the
/// session only issues queries, reads the ranked results back and commits
/// selections.
pub trait SearchIndex: Send + Sync {
    /// Register the completion handler. There is a single slot: registering
    /// replaces the previous handler, so only the most recent search's
    /// handler can ever fire.
    fn set_on_results_complete(&self, handler: ResultsCompleteHandler);

    /// Start a search. Returns once the work is scheduled; the outcome is
    /// reported through the registered handler.
    fn search(&self, text: &str, settings: &SearchSettings) -> Result<(), SearchError>;

    /// Ranked hits of the last completed search, in display order.
    fn current_results(&self) -> Vec<RawHit>;

    fn phrase(&self) -> SearchPhrase;

    /// Whether a larger radius level could produce more results.
    fn is_search_more_available(&self, phrase: &SearchPhrase) -> bool;

    /// Radius in meters that was searched without success, `None` when
    /// unknown.
    fn minimal_search_radius(&self, phrase: &SearchPhrase) -> Option<u32>;

    /// Commit a selected result into the phrase.
    fn select_result(&self, hit: &RawHit);

    fn reset_phrase(&self);
}
