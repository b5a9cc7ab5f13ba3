use std::sync::Arc;

use tracing::debug;

use super::{
    ObjectType, PoiFilter, RadiusLevel, RawHit, SEARCH_AMENITY_TYPE_PRIORITY, SearchIndex,
    SearchObject,
};
use crate::sources::{HistoryStore, PoiFilterRegistry};

/// Commits a picked result into the index phrase and produces the refined
/// query to search next.
#[derive(Clone)]
pub struct SelectionResolver {
    index: Arc<dyn SearchIndex>,
    history: Arc<dyn HistoryStore>,
    filters: Arc<dyn PoiFilterRegistry>,
}

impl SelectionResolver {
    pub fn new(
        index: Arc<dyn SearchIndex>,
        history: Arc<dyn HistoryStore>,
        filters: Arc<dyn PoiFilterRegistry>,
    ) -> Self {
        Self {
            index,
            history,
            filters,
        }
    }

    /// Resolve `hit` into the next query and reset the radius level. The
    /// caller is expected to search with the returned text.
    pub fn resolve_selection(&self, hit: RawHit, radius_level: &mut RadiusLevel) -> String {
        if let Some(entry) = hit.object.history_entry() {
            self.history.add_item(entry);
        }

        let effective = self.substitute_additional(&hit).unwrap_or(hit);
        self.index.select_result(&effective);
        let query = self.index.phrase().text();

        if !radius_level.is_initial() {
            radius_level.reset();
        }
        debug!(query, "Selection resolved");
        query
    }

    /// An additional subtype (a cuisine, say) is searched as its parent
    /// category filtered by the subtype's tag.
    fn substitute_additional(&self, hit: &RawHit) -> Option<RawHit> {
        let SearchObject::PoiType(subtype) = &hit.object else {
            return None;
        };
        if !subtype.additional {
            return None;
        }
        let parent = subtype.parent.as_ref()?;

        let mut filter = self
            .filters
            .filter_by_id(&PoiFilter::standard_id(&parent.key_name))
            .unwrap_or_else(|| PoiFilter::standard(parent));
        filter.clear_filter();
        filter.update_types_to_accept(parent);
        filter.set_filter_by_name(subtype.name_filter_key());

        let name = filter.name.clone();
        Some(
            RawHit::new(SearchObject::Filter(filter), ObjectType::PoiType, name)
                .with_priority(SEARCH_AMENITY_TYPE_PRIORITY, 0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        search::{Place, PoiCategory, PoiType, testing::FakeIndex},
        sources::{HistoryEntry, NoSavedFilters},
    };

    #[derive(Default)]
    struct RecordingHistory(Mutex<Vec<HistoryEntry>>);

    impl HistoryStore for RecordingHistory {
        fn add_item(&self, entry: HistoryEntry) {
            self.0.lock().unwrap().push(entry);
        }
    }

    struct SavedFilters(PoiFilter);

    impl PoiFilterRegistry for SavedFilters {
        fn filter_by_id(&self, id: &str) -> Option<PoiFilter> {
            (id == self.0.id).then(|| self.0.clone())
        }
    }

    fn pizza() -> RawHit {
        RawHit::new(
            SearchObject::PoiType(PoiType {
                key_name: "cuisine_pizza".to_string(),
                translation: "Pizza".to_string(),
                additional: true,
                parent: Some(PoiCategory::new("food", "Food")),
            }),
            ObjectType::PoiType,
            "Pizza",
        )
    }

    #[test]
    fn test_additional_subtype_becomes_parent_filter() {
        let index = Arc::new(FakeIndex::default());
        let history = Arc::new(RecordingHistory::default());
        let resolver =
            SelectionResolver::new(index.clone(), history.clone(), Arc::new(NoSavedFilters));
        let mut radius = RadiusLevel::default();
        radius.increment();
        radius.increment();

        let query = resolver.resolve_selection(pizza(), &mut radius);

        assert_eq!(query, "Food ");
        assert_eq!(radius.get(), 1);

        let selected = index.selected();
        assert_eq!(selected.len(), 1);
        let hit = &selected[0];
        assert_eq!(hit.object_type, ObjectType::PoiType);
        assert_eq!(hit.priority, SEARCH_AMENITY_TYPE_PRIORITY);
        assert_eq!(hit.priority_distance, 0.0);
        let SearchObject::Filter(filter) = &hit.object else {
            panic!("expected a filter, got {:?}", hit.object);
        };
        assert_eq!(filter.id, "std_food");
        assert_eq!(filter.accepted_categories, ["food"]);
        assert_eq!(filter.name_filter.as_deref(), Some("cuisine:pizza"));

        // History records what the user picked, not the substitute
        let recorded = history.0.lock().unwrap();
        assert!(matches!(
            recorded.as_slice(),
            [HistoryEntry::PoiType(t)] if t.key_name == "cuisine_pizza"
        ));
    }

    #[test]
    fn test_saved_filter_is_reset_before_reuse() {
        let index = Arc::new(FakeIndex::default());
        let saved = PoiFilter {
            id: "std_food".to_string(),
            name: "Eat & drink".to_string(),
            accepted_categories: vec!["food".to_string(), "shop".to_string()],
            name_filter: Some("vegan".to_string()),
        };
        let resolver = SelectionResolver::new(
            index.clone(),
            Arc::new(RecordingHistory::default()),
            Arc::new(SavedFilters(saved)),
        );

        let query = resolver.resolve_selection(pizza(), &mut RadiusLevel::default());
        assert_eq!(query, "Eat & drink ");

        let selected = index.selected();
        let SearchObject::Filter(filter) = &selected[0].object else {
            panic!("expected a filter");
        };
        assert_eq!(filter.accepted_categories, ["food"]);
        assert_eq!(filter.name_filter.as_deref(), Some("cuisine:pizza"));
    }

    #[test]
    fn test_category_is_recorded_and_selected_as_is() {
        let index = Arc::new(FakeIndex::default());
        let history = Arc::new(RecordingHistory::default());
        let resolver =
            SelectionResolver::new(index.clone(), history.clone(), Arc::new(NoSavedFilters));
        let cafe = RawHit::new(
            SearchObject::PoiType(PoiType {
                key_name: "cafe".to_string(),
                translation: "Cafe".to_string(),
                additional: false,
                parent: Some(PoiCategory::new("food", "Food")),
            }),
            ObjectType::PoiType,
            "Cafe",
        );

        let query = resolver.resolve_selection(cafe.clone(), &mut RadiusLevel::default());

        assert_eq!(query, "Cafe ");
        assert_eq!(index.selected(), [cafe]);
        assert_eq!(history.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_place_is_not_recorded() {
        let index = Arc::new(FakeIndex::default());
        let history = Arc::new(RecordingHistory::default());
        let resolver =
            SelectionResolver::new(index.clone(), history.clone(), Arc::new(NoSavedFilters));
        let place = RawHit::new(
            SearchObject::Place(Place {
                id: 9,
                type_key: None,
                type_label: None,
                tags: vec![],
            }),
            ObjectType::Poi,
            "Rijksmuseum",
        );

        let mut radius = RadiusLevel::default();
        radius.increment();
        let query = resolver.resolve_selection(place, &mut radius);

        assert_eq!(query, "Rijksmuseum");
        assert!(radius.is_initial());
        assert!(history.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_additional_without_parent_is_selected_as_is() {
        let index = Arc::new(FakeIndex::default());
        let resolver = SelectionResolver::new(
            index.clone(),
            Arc::new(RecordingHistory::default()),
            Arc::new(NoSavedFilters),
        );
        let mut orphan = pizza();
        if let SearchObject::PoiType(t) = &mut orphan.object {
            t.parent = None;
        }

        resolver.resolve_selection(orphan.clone(), &mut RadiusLevel::default());
        assert_eq!(index.selected(), [orphan]);
    }
}
