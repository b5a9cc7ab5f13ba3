//! Incremental search flow.
//!
//! This module holds the pieces a [`crate::SearchSession`] is assembled from:
//! settings derivation, the supersession aware engine, result projection,
//! radius expansion state and selection handling. The search index itself is
//! abstracted behind [`SearchIndex`].

pub use error::SearchError;
mod backend;
mod dispatch;
mod engine;
mod expansion;
mod projector;
mod selection;
mod settings;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{ResultsCompleteHandler, SearchIndex};
pub use dispatch::{ChannelDispatcher, Completion, OwnerDispatcher, OwnerInbox, owner_channel};
pub use engine::{CompletedSearch, IncrementalSearchEngine};
pub use expansion::RadiusLevel;
pub use projector::{ResultProjector, display_name};
pub use selection::SelectionResolver;
pub use settings::{SearchHint, SearchSettings, SearchSettingsBuilder};
pub use types::{
    Distance, MAX_DEFAULT_SEARCH_RADIUS, NothingFound, ObjectType, Place, PoiCategory, PoiFilter,
    PoiType, ProjectedResult, RadiusExpansion, RawHit, ResultPage, SEARCH_AMENITY_TYPE_PRIORITY,
    SearchObject, SearchPhrase,
};

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum SearchError {
        #[error("Search unavailable: {0}")]
        Unavailable(String),
        #[error("Index error: {0}")]
        IndexError(#[from] crate::index::IndexError),
        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }
}
