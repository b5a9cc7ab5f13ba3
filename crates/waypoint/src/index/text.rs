//! Tantivy full-text index over place names, type names and tags.

use tantivy::{
    Index, IndexReader, IndexWriter, TantivyDocument, Term,
    collector::TopDocs,
    query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, QueryParser},
    schema::{
        FAST, Field, INDEXED, IndexRecordOption, STORED, Schema, TextFieldIndexing, TextOptions,
        Value,
    },
};
use tracing::{debug, instrument, trace, warn};

use super::{CatalogIndexParams, PlaceRecord, error::Result};

const WRITER_MEMORY_BUDGET: usize = 50_000_000;

#[derive(Clone)]
pub(super) struct PlaceTextIndex {
    index: Index,
    reader: IndexReader,
    id: Field,
    name: Field,
    type_name: Field,
    tags: Field,
}

impl PlaceTextIndex {
    #[instrument(name = "Build place text index", skip_all, fields(num_places = places.len()))]
    pub(super) fn build<'a>(
        places: impl ExactSizeIterator<Item = (&'a PlaceRecord, Option<&'a str>)>,
    ) -> Result<Self> {
        let mut schema_builder = Schema::builder();
        let text_options = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer("default")
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );
        let id = schema_builder.add_u64_field("id", STORED | INDEXED | FAST);
        let name = schema_builder.add_text_field("name", text_options.clone());
        let type_name = schema_builder.add_text_field("type_name", text_options.clone());
        let tags = schema_builder.add_text_field("tags", text_options);
        let index = Index::create_in_ram(schema_builder.build());

        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BUDGET)?;
        for (place, type_label) in places {
            let mut doc = TantivyDocument::default();
            doc.add_u64(id, place.id);
            doc.add_text(name, &place.name);
            if let Some(label) = type_label {
                doc.add_text(type_name, label);
            }
            for tag in &place.tags {
                doc.add_text(tags, tag);
            }
            writer.add_document(doc)?;
        }
        writer.commit()?;

        Ok(Self {
            reader: index.reader()?,
            index,
            id,
            name,
            type_name,
            tags,
        })
    }

    /// Place ids matching `text` with their scores, best first. The last word
    /// also matches as a prefix so partially typed names are found.
    #[instrument(name = "Search place text index", skip(self, params), level = "debug")]
    pub(super) fn search(
        &self,
        text: &str,
        params: &CatalogIndexParams,
    ) -> Result<Vec<(u64, f32)>> {
        let text = text.trim();
        if text.is_empty() || params.candidate_limit == 0 {
            return Ok(Vec::new());
        }

        let query = self.build_query(text, params);
        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(params.candidate_limit))?;
        debug!(num_results = top_docs.len(), "Text search complete");

        top_docs
            .into_iter()
            .map(|(score, address)| {
                let doc = searcher.doc::<TantivyDocument>(address)?;
                let id = doc
                    .get_first(self.id)
                    .and_then(|v| v.as_u64())
                    .ok_or_else(|| anyhow::anyhow!("Document without place id: {doc:?}"))?;
                Ok((id, score))
            })
            .collect::<Result<Vec<_>>>()
    }

    fn build_query(&self, text: &str, params: &CatalogIndexParams) -> BooleanQuery {
        let mut parser =
            QueryParser::for_index(&self.index, vec![self.name, self.type_name, self.tags]);
        parser.set_field_boost(self.name, 3.0);
        parser.set_field_boost(self.type_name, 2.0);
        parser.set_field_boost(self.tags, 1.0);
        let (parsed, errors) = parser.parse_query_lenient(text);
        if !errors.is_empty() {
            warn!(?errors, "Query parsing errors occurred");
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Should, parsed)];

        let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        if let Some(last) = words.last() {
            for field in [self.name, self.type_name] {
                let prefix =
                    FuzzyTermQuery::new_prefix(Term::from_field_text(field, last), 0, true);
                clauses.push((Occur::Should, Box::new(BoostQuery::new(Box::new(prefix), 2.0))));
            }
        }

        if params.fuzzy_search {
            for word in words.iter().filter(|w| w.len() > 3) {
                let term = Term::from_field_text(self.name, word);
                clauses.push((
                    Occur::Should,
                    Box::new(BoostQuery::new(
                        Box::new(FuzzyTermQuery::new(term, 1, true)),
                        1.5,
                    )),
                ));
            }
        }

        trace!(num_clauses = clauses.len(), "Place query constructed");
        BooleanQuery::new(clauses)
    }
}
