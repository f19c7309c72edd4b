/// Deterministic embedder for tests and model-less runs.
use std::hash::{DefaultHasher, Hash, Hasher};

use super::{Embedder, EmbedderError};

/// Produces L2-normalized vectors seeded from a hash of the input text.
///
/// Identical strings map to identical vectors (distance 0); anything else
/// lands somewhere arbitrary, which is enough to exercise ranking and
/// persistence without loading an ONNX model.
pub struct MockEmbedder {
    pub dimensions: usize,
    model_id: String,
}

impl MockEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            model_id: format!("mock-{dimensions}"),
        }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let bytes = hasher.finish().to_le_bytes();

        // Offset by one so no component is zero and the norm never vanishes
        let mut embedding: Vec<f32> = (0..self.dimensions)
            .map(|i| (f32::from(bytes[i % 8]) + 1.0) / 256.0 * if i % 3 == 0 { -1.0 } else { 1.0 })
            .collect();

        let norm_sq: f32 = embedding.iter().map(|v| v * v).sum();
        if norm_sq > 0.0 {
            let inv = 1.0 / norm_sq.sqrt();
            for v in &mut embedding {
                *v *= inv;
            }
        }

        Ok(embedding)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_embed_dimensions() {
        let embedder = MockEmbedder::new(384);
        let result = embedder.embed("Qual o horário?").unwrap();
        assert_eq!(result.len(), 384);
    }

    #[test]
    fn test_mock_embed_deterministic() {
        let embedder = MockEmbedder::new(64);
        let a = embedder.embed("Qual o horário?").unwrap();
        let b = embedder.embed("Qual o horário?").unwrap();
        assert_eq!(a, b, "same input should produce same output");
    }

    #[test]
    fn test_mock_embed_different_inputs() {
        let embedder = MockEmbedder::new(64);
        let a = embedder.embed("Qual o horário?").unwrap();
        let b = embedder.embed("Aceita convênio?").unwrap();
        assert_ne!(a, b, "different inputs should produce different outputs");
    }

    #[test]
    fn test_mock_embed_normalized() {
        let embedder = MockEmbedder::new(384);
        let vec = embedder.embed("normalização").unwrap();
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!(
            (norm - 1.0).abs() < 0.01,
            "vector should be approximately unit length, got {norm}"
        );
    }

    #[test]
    fn test_mock_embed_batch_preserves_order() {
        let embedder = MockEmbedder::new(16);
        let results = embedder.embed_batch(&["a", "b", "c"]).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1], embedder.embed("b").unwrap());
    }

    #[test]
    fn test_mock_model_id_tracks_dimensions() {
        assert_eq!(MockEmbedder::default().model_id(), "mock-384");
        assert_eq!(MockEmbedder::new(8).model_id(), "mock-8");
    }
}
