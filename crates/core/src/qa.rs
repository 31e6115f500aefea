use crate::error::InferenceError;
use crate::models::{Justification, JustifiedAnswer};
use crate::retrieval::RetrievedChunk;
use crate::traits::QuestionAnswerer;

pub const NO_CHUNK_MESSAGE: &str = "No relevant chunk found.";

pub fn empty_answer() -> JustifiedAnswer {
    JustifiedAnswer {
        answer: String::new(),
        confidence: 0.0,
        justification: Justification {
            paragraph: -1,
            text: NO_CHUNK_MESSAGE.to_string(),
        },
    }
}

/// Runs extractive QA on the best retrieved chunk. Lower-ranked chunks are
/// ignored; the justification paragraph is the chunk's retrieval rank.
pub async fn answer_with_justification<Q: QuestionAnswerer + ?Sized>(
    qa: &Q,
    question: &str,
    retrieved: &[RetrievedChunk],
) -> Result<JustifiedAnswer, InferenceError> {
    let Some(best) = retrieved.first() else {
        return Ok(empty_answer());
    };

    let extracted = qa.answer(question, &best.text).await?;

    Ok(JustifiedAnswer {
        answer: extracted.answer,
        confidence: extracted.score,
        justification: Justification {
            paragraph: best.rank as i64,
            text: best.text.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractedAnswer;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FirstWordQa {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuestionAnswerer for FirstWordQa {
        async fn answer(
            &self,
            _question: &str,
            context: &str,
        ) -> Result<ExtractedAnswer, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ExtractedAnswer {
                answer: context.split_whitespace().next().unwrap_or_default().to_string(),
                score: 0.75,
            })
        }
    }

    fn retrieved(rank: usize, chunk_index: usize, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            rank,
            chunk_index,
            distance: rank as f32,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn no_chunks_yields_the_sentinel_without_calling_the_model() {
        let qa = FirstWordQa::default();
        let answer = answer_with_justification(&qa, "What?", &[]).await.expect("answer");

        assert_eq!(answer, empty_answer());
        assert_eq!(answer.justification.paragraph, -1);
        assert_eq!(qa.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn best_chunk_is_paragraph_one_regardless_of_position() {
        let qa = FirstWordQa::default();
        let chunks = vec![
            retrieved(1, 7, "Robotics uses sensors."),
            retrieved(2, 0, "Intro text."),
            retrieved(3, 2, "Other text."),
        ];

        let answer = answer_with_justification(&qa, "What uses sensors?", &chunks)
            .await
            .expect("answer");

        assert_eq!(answer.answer, "Robotics");
        assert_eq!(answer.confidence, 0.75);
        assert_eq!(answer.justification.paragraph, 1);
        assert_eq!(answer.justification.text, "Robotics uses sensors.");
        assert_eq!(qa.calls.load(Ordering::SeqCst), 1);
    }
}
