//! Sentence-embedding wrapper around `fastembed` (§4.5).
//!
//! `fastembed`'s ONNX runtime is synchronous; callers on the async path run
//! [`Embedder::embed_batch`] via `tokio::task::spawn_blocking`, matching the
//! pattern fastembed's own examples recommend.

use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};

use crate::error::VectorError;

pub struct Embedder {
    model: TextEmbedding,
    max_input_tokens: usize,
}

impl Embedder {
    pub fn new(model_id: &str, max_input_tokens: usize) -> Result<Self, VectorError> {
        let model = resolve_model(model_id);
        let text_embedding = TextEmbedding::try_new(TextInitOptions::new(model))
            .map_err(|e| VectorError::Embedding(e.to_string()))?;
        Ok(Self {
            model: text_embedding,
            max_input_tokens,
        })
    }

    /// Embeds a batch of chunk texts, L2-normalizing each vector so the
    /// store's cosine and inner-product modes are equivalent. Truncates
    /// each text to the model's maximum input length (approximated by
    /// whitespace-separated tokens) before embedding.
    pub fn embed_batch(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>, VectorError> {
        let truncated: Vec<String> = texts
            .iter()
            .map(|t| truncate_to_max_tokens(t, self.max_input_tokens))
            .collect();

        let embeddings = self
            .model
            .embed(truncated, None)
            .map_err(|e| VectorError::Embedding(e.to_string()))?;

        Ok(embeddings.into_iter().map(|mut v| {
            normalize_l2(&mut v);
            v
        }).collect())
    }
}

fn resolve_model(model_id: &str) -> EmbeddingModel {
    match model_id {
        "sentence-transformers/all-MiniLM-L6-v2" => EmbeddingModel::AllMiniLML6V2,
        _ => EmbeddingModel::BGESmallENV15,
    }
}

fn truncate_to_max_tokens(text: &str, max_tokens: usize) -> String {
    let mut words = text.split_whitespace();
    let truncated: Vec<&str> = (&mut words).take(max_tokens).collect();
    truncated.join(" ")
}

fn normalize_l2(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_caps_word_count() {
        let text = "one two three four five";
        assert_eq!(truncate_to_max_tokens(text, 3), "one two three");
    }

    #[test]
    fn truncate_is_noop_under_limit() {
        let text = "one two";
        assert_eq!(truncate_to_max_tokens(text, 10), "one two");
    }

    #[test]
    fn normalize_produces_unit_vector() {
        let mut v = vec![3.0, 4.0];
        normalize_l2(&mut v);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn normalize_handles_zero_vector_without_panicking() {
        let mut v = vec![0.0, 0.0];
        normalize_l2(&mut v);
        assert_eq!(v, vec![0.0, 0.0]);
    }
}
