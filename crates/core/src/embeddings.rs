use crate::error::InferenceError;
use async_trait::async_trait;

pub const DEFAULT_NGRAM_DIMENSIONS: usize = 128;

/// Sentence-embedding capability: one fixed-length vector per input, in order.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, InferenceError>;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| InferenceError::Request("embedder returned no vector".to_string()))
    }
}

/// Hashed character-trigram embedder. Deterministic and offline.
#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    pub dimensions: usize,
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_NGRAM_DIMENSIONS,
        }
    }
}

impl CharacterNgramEmbedder {
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

#[async_trait]
impl Embedder for CharacterNgramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions.max(1)
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, InferenceError> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{CharacterNgramEmbedder, Embedder};

    #[test]
    fn embedder_is_deterministic() {
        let embedder = CharacterNgramEmbedder::default();
        let first = embedder.embed_text("Machine learning learns patterns");
        let second = embedder.embed_text("Machine learning learns patterns");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn batch_embedding_preserves_order_and_length() {
        let embedder = CharacterNgramEmbedder { dimensions: 32 };
        let texts = vec!["abc".to_string(), "robotics and vision".to_string()];
        let vectors = embedder.embed(&texts).await.expect("local embedder never fails");

        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|vector| vector.len() == 32));
        assert_eq!(vectors[1], embedder.embed_text("robotics and vision"));
    }

    #[tokio::test]
    async fn embed_one_matches_batch_output() {
        let embedder = CharacterNgramEmbedder::default();
        let single = embedder.embed_one("pump pressure").await.expect("embeds");
        assert_eq!(single, embedder.embed_text("pump pressure"));
    }
}
