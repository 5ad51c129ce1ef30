//! Tantivy document schema (§4.4). The field vocabulary here must match
//! exactly between the writer (`index.rs`) and the query builder
//! (`search.rs`) — both import this module rather than naming fields as
//! string literals.

use tantivy::schema::{Schema, FAST, INDEXED, STORED, STRING, TEXT};

#[derive(Clone)]
pub struct LexicalFields {
    pub doc_id: tantivy::schema::Field,
    pub file_name: tantivy::schema::Field,
    pub folder_name: tantivy::schema::Field,
    pub content: tantivy::schema::Field,
    pub source_type: tantivy::schema::Field,
    pub source_id: tantivy::schema::Field,
    pub repository_name: tantivy::schema::Field,
    pub extension: tantivy::schema::Field,
    pub mtime: tantivy::schema::Field,
    pub size: tantivy::schema::Field,
}

pub fn build_schema() -> (Schema, LexicalFields) {
    let mut builder = Schema::builder();

    let doc_id = builder.add_text_field("doc_id", STRING | STORED);
    let file_name = builder.add_text_field("file_name", TEXT | STORED);
    let folder_name = builder.add_text_field("folder_name", TEXT | STORED);
    let content = builder.add_text_field("content", TEXT);
    let source_type = builder.add_text_field("source_type", STRING | FAST | STORED);
    let source_id = builder.add_i64_field("source_id", INDEXED | FAST | STORED);
    let repository_name = builder.add_text_field("repository_name", STRING | FAST | STORED);
    let extension = builder.add_text_field("extension", STRING | FAST | STORED);
    let mtime = builder.add_date_field("mtime", INDEXED | FAST | STORED);
    let size = builder.add_u64_field("size", INDEXED | FAST | STORED);

    let schema = builder.build();
    let fields = LexicalFields {
        doc_id,
        file_name,
        folder_name,
        content,
        source_type,
        source_id,
        repository_name,
        extension,
        mtime,
        size,
    };
    (schema, fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_field_count_matches_vocabulary() {
        let (schema, _) = build_schema();
        assert_eq!(schema.fields().count(), 10);
    }
}
