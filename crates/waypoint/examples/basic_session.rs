//! A search session over the embedded sample catalog
//!
//! This example demonstrates:
//! - Building a session around the reference catalog index
//! - Receiving pages through a listener
//! - Widening the radius with "search more"
//! - Refining the query by selecting a POI type

use std::sync::Arc;
use std::time::Duration;

use waypoint::{
    CatalogSearchIndex, FixedLocation, LatLon, RawHit, ResultPage, SearchListener, SearchObject,
    SearchPhrase, SearchSession, SessionConfigBuilder, StaticPreferences, data::CatalogData,
    owner_channel,
};

struct PrintingListener;

impl SearchListener for PrintingListener {
    fn on_search_done(
        &mut self,
        phrase: &SearchPhrase,
        _hits: &[RawHit],
        page: &ResultPage,
        results_count: usize,
    ) {
        println!("\n'{}': {results_count} results", phrase.text());
        for result in &page.results {
            let distance = result
                .distance
                .as_ref()
                .map_or_else(String::new, |d| format!(" ({})", d.text));
            let label = result
                .type_label
                .as_ref()
                .map_or_else(String::new, |l| format!(" - {l}"));
            println!("  {}{label}{distance}", result.name);
        }
        if page.is_empty() {
            println!("  {}", page.no_items_message);
        }
        if let Some(expansion) = &page.expansion {
            match &expansion.nothing_found {
                Some(nothing_found) => println!("  [{}] {}", expansion.title, nothing_found.text),
                None => println!("  [{}]", expansion.title),
            }
        }
    }

    fn on_click_search_more(&mut self) {
        println!("  -> searching a wider radius");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    waypoint::init_logging(tracing::Level::WARN)?;

    let index = Arc::new(CatalogSearchIndex::new(&CatalogData::embedded()?)?);
    let (dispatcher, inbox) = owner_channel();
    let dam = LatLon::new(52.3731, 4.8922);

    let mut session = SearchSession::builder(
        index,
        Arc::new(dispatcher),
        Arc::new(FixedLocation {
            last_known: Some(dam),
            map_center: dam,
        }),
        Arc::new(StaticPreferences::default()),
    )
    .config(SessionConfigBuilder::detailed().build())
    .listener(PrintingListener)
    .build();

    if let Some(hint) = session.search_hint() {
        println!("Hint: {}", hint.text());
    }
    let wait = Duration::from_secs(5);

    session.run_search("cafe");
    session.wait_for_search(&inbox, wait);

    session.run_search("utrecht");
    session.wait_for_search(&inbox, wait);
    while session.last_page().is_some_and(ResultPage::can_expand_radius) {
        session.search_more();
        session.wait_for_search(&inbox, wait);
    }

    session.reset_search_radius();
    session.run_search("resta");
    session.wait_for_search(&inbox, wait);
    let restaurant = session
        .search_results()
        .iter()
        .find(|hit| matches!(hit.object, SearchObject::PoiType(_)))
        .cloned();
    if let Some(restaurant) = restaurant {
        session.complete_query_with_object(restaurant);
        session.wait_for_search(&inbox, wait);
    }

    Ok(())
}
