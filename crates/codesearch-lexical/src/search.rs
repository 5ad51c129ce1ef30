//! Filtered ranked retrieval over the lexical index.

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::Term;

use crate::error::LexicalError;
use crate::index::LexicalIndex;

#[derive(Debug, Clone, Default)]
pub struct LexicalFilter {
    pub source_type: Option<String>,
    pub source_id: Option<i64>,
    pub repository_name: Option<String>,
    pub extension: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LexicalHit {
    pub doc_id: String,
    pub score: f32,
}

/// Searches `content`/`file_name`/`folder_name` (the configured searchable
/// fields) for `query`, intersected with `filter`'s attributes. Ranking is
/// tantivy's BM25, which already rewards term proximity and exactness; the
/// filter clauses enforce attribute priority ahead of scoring.
pub fn search(
    index: &LexicalIndex,
    query: &str,
    filter: &LexicalFilter,
    limit: usize,
) -> Result<Vec<LexicalHit>, LexicalError> {
    let reader = index.tantivy_index().reader()?;
    reader.reload()?;
    let searcher = reader.searcher();
    let fields = index.fields();

    let query_parser = QueryParser::for_index(
        index.tantivy_index(),
        vec![fields.file_name, fields.folder_name, fields.content],
    );
    let text_query = query_parser
        .parse_query(query)
        .map_err(|e| LexicalError::QueryParse(e.to_string()))?;

    let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, text_query)];

    if let Some(source_type) = &filter.source_type {
        clauses.push((
            Occur::Must,
            Box::new(TermQuery::new(
                Term::from_field_text(fields.source_type, source_type),
                IndexRecordOption::Basic,
            )),
        ));
    }
    if let Some(source_id) = filter.source_id {
        clauses.push((
            Occur::Must,
            Box::new(TermQuery::new(
                Term::from_field_i64(fields.source_id, source_id),
                IndexRecordOption::Basic,
            )),
        ));
    }
    if let Some(repository_name) = &filter.repository_name {
        clauses.push((
            Occur::Must,
            Box::new(TermQuery::new(
                Term::from_field_text(fields.repository_name, repository_name),
                IndexRecordOption::Basic,
            )),
        ));
    }
    if let Some(extension) = &filter.extension {
        clauses.push((
            Occur::Must,
            Box::new(TermQuery::new(
                Term::from_field_text(fields.extension, extension),
                IndexRecordOption::Basic,
            )),
        ));
    }

    let combined = BooleanQuery::new(clauses);
    let top_docs = searcher.search(&combined, &TopDocs::with_limit(limit))?;

    let mut hits = Vec::with_capacity(top_docs.len());
    for (score, address) in top_docs {
        let retrieved: tantivy::TantivyDocument = searcher.doc(address)?;
        if let Some(doc_id) = retrieved
            .get_first(fields.doc_id)
            .and_then(|v| v.as_str())
        {
            hits.push(LexicalHit {
                doc_id: doc_id.to_string(),
                score,
            });
        }
    }
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexMode, LexicalDocument};
    use chrono::Utc;

    fn doc(doc_id: &str, source_id: i64, content: &str) -> LexicalDocument {
        LexicalDocument {
            doc_id: doc_id.to_string(),
            file_name: "main.rs".to_string(),
            folder_name: "src".to_string(),
            content: content.to_string(),
            source_type: "directory".to_string(),
            source_id,
            repository_name: String::new(),
            extension: "rs".to_string(),
            mtime: Utc::now(),
            size: content.len() as u64,
        }
    }

    #[test]
    fn finds_matching_document_by_content() {
        let index = LexicalIndex::create_in_ram().unwrap();
        index
            .index_source(1, IndexMode::Full, vec![doc("a", 1, "implements hybrid search fusion")])
            .unwrap();

        let hits = search(&index, "hybrid", &LexicalFilter::default(), 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "a");
    }

    #[test]
    fn filter_by_source_id_excludes_other_sources() {
        let index = LexicalIndex::create_in_ram().unwrap();
        index.index_source(1, IndexMode::Full, vec![doc("a", 1, "search engine")]).unwrap();
        index.index_source(2, IndexMode::Full, vec![doc("b", 2, "search engine")]).unwrap();

        let filter = LexicalFilter { source_id: Some(1), ..Default::default() };
        let hits = search(&index, "search", &filter, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "a");
    }

    #[test]
    fn no_match_returns_empty() {
        let index = LexicalIndex::create_in_ram().unwrap();
        index.index_source(1, IndexMode::Full, vec![doc("a", 1, "search engine")]).unwrap();
        let hits = search(&index, "nonexistentterm", &LexicalFilter::default(), 10).unwrap();
        assert!(hits.is_empty());
    }
}
