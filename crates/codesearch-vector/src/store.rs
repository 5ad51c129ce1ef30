//! Qdrant-backed vector store (§4.5): upsert-by-`doc_id` semantics, filtered
//! top-K retrieval, deletion by `doc_id`.

use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use uuid::Uuid;

use crate::chunking::TextChunk;
use crate::error::VectorError;

/// Namespace for deriving a deterministic point UUID from `(doc_id, ordinal)`,
/// so re-embedding the same chunk twice overwrites the same point.
const POINT_NAMESPACE: Uuid = Uuid::from_bytes([
    0x9e, 0x1a, 0x3f, 0x60, 0x4c, 0x21, 0x4a, 0x0d, 0x8b, 0x77, 0x5e, 0x2f, 0x61, 0x9c, 0x0a, 0xd1,
]);

pub struct EmbeddedChunk {
    pub chunk: TextChunk,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct VectorFilter {
    pub source_type: Option<String>,
    pub source_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct VectorHit {
    pub doc_id: String,
    pub ordinal: u32,
    pub score: f32,
    pub snippet: Option<String>,
}

pub struct VectorStore {
    client: Qdrant,
    collection: String,
}

impl VectorStore {
    pub fn new(url: &str, collection: &str) -> Result<Self, VectorError> {
        let client = Qdrant::from_url(url).build()?;
        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }

    pub async fn ensure_collection(&self, dim: u64) -> Result<(), VectorError> {
        if self.client.collection_exists(&self.collection).await? {
            return Ok(());
        }
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dim, Distance::Cosine)),
            )
            .await?;
        Ok(())
    }

    /// Deletes every existing point for `doc_id`, then inserts `chunks` —
    /// observers never see a partial rewrite of one document's chunks.
    pub async fn upsert_doc(
        &self,
        doc_id: &str,
        source_type: &str,
        source_id: i64,
        chunks: Vec<EmbeddedChunk>,
    ) -> Result<(), VectorError> {
        self.delete_by_doc_ids(&[doc_id.to_string()]).await?;

        if chunks.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = chunks
            .into_iter()
            .map(|embedded| {
                let point_id = point_id_for(doc_id, embedded.chunk.ordinal);
                let mut payload = std::collections::HashMap::new();
                payload.insert("doc_id".to_string(), QdrantValue::from(doc_id));
                payload.insert("source_type".to_string(), QdrantValue::from(source_type));
                payload.insert("source_id".to_string(), QdrantValue::from(source_id));
                payload.insert(
                    "ordinal".to_string(),
                    QdrantValue::from(embedded.chunk.ordinal as i64),
                );
                payload.insert("text".to_string(), QdrantValue::from(embedded.chunk.text));
                PointStruct::new(point_id, embedded.vector, payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;
        Ok(())
    }

    pub async fn delete_by_doc_ids(&self, doc_ids: &[String]) -> Result<(), VectorError> {
        if doc_ids.is_empty() {
            return Ok(());
        }
        let filter = Filter::must(doc_ids.iter().map(|id| Condition::matches("doc_id", id.clone())));
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(filter)
                    .wait(true),
            )
            .await?;
        Ok(())
    }

    pub async fn search(
        &self,
        vector: Vec<f32>,
        filter: &VectorFilter,
        limit: u64,
    ) -> Result<Vec<VectorHit>, VectorError> {
        let mut conditions = Vec::new();
        if let Some(source_type) = &filter.source_type {
            conditions.push(Condition::matches("source_type", source_type.clone()));
        }
        if let Some(source_id) = filter.source_id {
            conditions.push(Condition::matches("source_id", source_id));
        }

        let mut builder = SearchPointsBuilder::new(&self.collection, vector, limit).with_payload(true);
        if !conditions.is_empty() {
            builder = builder.filter(Filter::must(conditions));
        }

        let response = self.client.search_points(builder).await?;

        let hits = response
            .result
            .into_iter()
            .filter_map(|point| {
                let doc_id = point
                    .payload
                    .get("doc_id")
                    .and_then(|v| v.as_str().map(str::to_string))?;
                let ordinal = point
                    .payload
                    .get("ordinal")
                    .and_then(|v| v.as_integer())
                    .unwrap_or(0) as u32;
                let snippet = point
                    .payload
                    .get("text")
                    .and_then(|v| v.as_str().map(str::to_string));
                Some(VectorHit {
                    doc_id,
                    ordinal,
                    score: point.score,
                    snippet,
                })
            })
            .collect();
        Ok(hits)
    }
}

fn point_id_for(doc_id: &str, ordinal: u32) -> Uuid {
    Uuid::new_v5(&POINT_NAMESPACE, format!("{doc_id}:{ordinal}").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_id_is_deterministic_for_same_doc_and_ordinal() {
        let a = point_id_for("doc-1", 0);
        let b = point_id_for("doc-1", 0);
        assert_eq!(a, b);
    }

    #[test]
    fn point_id_differs_across_ordinals() {
        let a = point_id_for("doc-1", 0);
        let b = point_id_for("doc-1", 1);
        assert_ne!(a, b);
    }

    #[test]
    fn point_id_differs_across_docs() {
        let a = point_id_for("doc-1", 0);
        let b = point_id_for("doc-2", 0);
        assert_ne!(a, b);
    }
}
