use crate::chunking::{chunk_text, ChunkingConfig};
use crate::embeddings::Embedder;
use crate::error::{AssistantError, InferenceError};
use crate::index::FlatL2Index;

/// Chunks of one document with their embeddings and the index built over them.
#[derive(Debug, Clone)]
pub struct RetrievalSet {
    chunks: Vec<String>,
    embeddings: Vec<Vec<f32>>,
    index: FlatL2Index,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    /// 1-based position in the result list.
    pub rank: usize,
    /// Position of the chunk in the document's chunk sequence.
    pub chunk_index: usize,
    pub distance: f32,
    pub text: String,
}

impl RetrievalSet {
    pub async fn build<E: Embedder + ?Sized>(
        text: &str,
        embedder: &E,
        config: ChunkingConfig,
    ) -> Result<Self, AssistantError> {
        let chunks = chunk_text(text, config);
        let embeddings = if chunks.is_empty() {
            Vec::new()
        } else {
            embedder.embed(&chunks).await?
        };

        if embeddings.len() != chunks.len() {
            return Err(InferenceError::Request(format!(
                "embedding count {} doesn't match chunk count {}",
                embeddings.len(),
                chunks.len()
            ))
            .into());
        }

        let index = FlatL2Index::build(embedder.dimensions(), &embeddings)?;

        Ok(Self {
            chunks,
            embeddings,
            index,
        })
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    pub fn index(&self) -> &FlatL2Index {
        &self.index
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Top-`top_k` chunks for `question`, nearest first. A set without
    /// chunks returns nothing and never calls the embedder.
    pub async fn retrieve<E: Embedder + ?Sized>(
        &self,
        question: &str,
        embedder: &E,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, AssistantError> {
        if self.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = embedder.embed_one(question).await?;
        let neighbors = self.index.search(&query_vector, top_k)?;

        Ok(neighbors
            .into_iter()
            .enumerate()
            .map(|(position, neighbor)| RetrievedChunk {
                rank: position + 1,
                chunk_index: neighbor.index,
                distance: neighbor.distance,
                text: self.chunks[neighbor.index].clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::CharacterNgramEmbedder;

    const TEXT: &str = "Artificial Intelligence is transforming industries.\n\n\
        It includes areas like NLP, computer vision, and robotics.\n\n\
        Machine learning is a subset of AI that learns patterns from data.\n\n\
        AI can help automate tasks, improve decision-making, and boost efficiency.";

    #[tokio::test]
    async fn index_size_matches_chunk_count() {
        let embedder = CharacterNgramEmbedder::default();
        let set = RetrievalSet::build(TEXT, &embedder, ChunkingConfig::default())
            .await
            .expect("build");

        assert_eq!(set.chunks().len(), 4);
        assert_eq!(set.embeddings().len(), 4);
        assert_eq!(set.index().len(), 4);
    }

    #[tokio::test]
    async fn searching_a_chunk_returns_itself_first() {
        let embedder = CharacterNgramEmbedder::default();
        let set = RetrievalSet::build(TEXT, &embedder, ChunkingConfig::default())
            .await
            .expect("build");

        for (position, chunk) in set.chunks().iter().enumerate() {
            let hits = set.retrieve(chunk, &embedder, 3).await.expect("retrieve");
            assert_eq!(hits.len(), 3);
            assert_eq!(hits[0].chunk_index, position);
            assert_eq!(hits[0].rank, 1);
            assert!(hits[0].distance.abs() < 1e-6);
            assert!(hits.windows(2).all(|pair| pair[0].distance <= pair[1].distance));
        }
    }

    #[tokio::test]
    async fn empty_text_builds_an_empty_set() {
        let embedder = CharacterNgramEmbedder::default();
        let set = RetrievalSet::build("", &embedder, ChunkingConfig::default())
            .await
            .expect("build");

        assert!(set.is_empty());
        let hits = set.retrieve("anything?", &embedder, 3).await.expect("retrieve");
        assert!(hits.is_empty());
    }
}
