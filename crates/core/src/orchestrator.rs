use crate::challenge::{generate_questions, grade_answer, QuestionParser};
use crate::chunking::ChunkingConfig;
use crate::embeddings::Embedder;
use crate::error::{AssistantError, InferenceError, IngestError, Result};
use crate::extractor::parse_document;
use crate::qa::{answer_with_justification, empty_answer};
use crate::retrieval::RetrievalSet;
use crate::store::{digest_bytes, DocumentRepository, NewDocument, StoredDocument};
use crate::summarizer::generate_summary;
use crate::traits::{QuestionAnswerer, Summarizer, TextGenerator};
use crate::{
    AskResponse, AssistantOptions, ChallengeQuestions, DocumentSummary, EvaluationReport,
    EvaluationRequest, EvaluationResult, UploadReceipt,
};
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, warn};

pub const UPLOAD_MESSAGE: &str = "Upload and processing successful!";

/// Model services the assistant delegates to.
#[derive(Clone)]
pub struct ModelSuite {
    pub embedder: Arc<dyn Embedder>,
    pub summarizer: Arc<dyn Summarizer>,
    pub qa: Arc<dyn QuestionAnswerer>,
    pub generator: Arc<dyn TextGenerator>,
}

/// Routes upload, ask, challenge and evaluate requests through the parsing,
/// retrieval and model layers, keeping documents in one repository.
pub struct Assistant {
    models: ModelSuite,
    repository: DocumentRepository,
    question_parser: QuestionParser,
    inference: Semaphore,
    options: AssistantOptions,
}

impl Assistant {
    pub fn new(models: ModelSuite, options: AssistantOptions) -> Result<Self> {
        let question_parser = QuestionParser::new(options.max_questions)
            .map_err(|error| AssistantError::InvalidRequest(error.to_string()))?;

        Ok(Self {
            models,
            repository: DocumentRepository::new(),
            question_parser,
            inference: Semaphore::new(options.inference_permits.max(1)),
            options,
        })
    }

    pub fn options(&self) -> &AssistantOptions {
        &self.options
    }

    pub fn repository(&self) -> &DocumentRepository {
        &self.repository
    }

    async fn inference_permit(&self) -> Result<SemaphorePermit<'_>> {
        self.inference
            .acquire()
            .await
            .map_err(|_| InferenceError::Request("inference gate closed".to_string()).into())
    }

    fn document(&self, doc_id: &str) -> Result<Arc<StoredDocument>> {
        self.repository
            .get(doc_id)
            .ok_or_else(|| AssistantError::DocumentNotFound(doc_id.to_string()))
    }

    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadReceipt> {
        let checksum = digest_bytes(&bytes);
        let owned_name = file_name.to_string();
        let parsed = tokio::task::spawn_blocking(move || parse_document(&owned_name, &bytes))
            .await
            .map_err(|error| IngestError::Io(std::io::Error::other(error.to_string())))??;

        let _permit = self.inference_permit().await?;

        let summary = generate_summary(
            self.models.summarizer.as_ref(),
            &parsed.text,
            self.options.summary_input_chars,
            &self.options.summary_params(),
        )
        .await?;

        let retrieval = RetrievalSet::build(
            &parsed.text,
            self.models.embedder.as_ref(),
            ChunkingConfig::from(&self.options),
        )
        .await?;

        let chunk_count = retrieval.chunks().len();
        let paragraph_count = parsed.page_map.len();
        let stored = self.repository.insert(NewDocument {
            file_name: file_name.to_string(),
            checksum,
            text: parsed.text,
            page_map: parsed.page_map,
            retrieval,
        });

        info!(
            doc_id = %stored.fingerprint.document_id,
            file_name = %file_name,
            paragraphs = paragraph_count,
            chunks = chunk_count,
            "document uploaded"
        );
        debug!(
            doc_id = %stored.fingerprint.document_id,
            checksum = %stored.fingerprint.checksum,
            uploaded_at = %stored.fingerprint.uploaded_at.to_rfc3339(),
            "document fingerprint"
        );

        Ok(UploadReceipt {
            doc_id: stored.fingerprint.document_id.clone(),
            summary,
            message: UPLOAD_MESSAGE.to_string(),
        })
    }

    pub fn document_summary(&self, doc_id: &str) -> Result<DocumentSummary> {
        Ok(self.document(doc_id)?.summary())
    }

    pub async fn ask(&self, doc_id: &str, question: &str) -> Result<AskResponse> {
        let document = self.document(doc_id)?;
        if question.trim().is_empty() {
            return Err(AssistantError::InvalidRequest("question is empty".to_string()));
        }

        let _permit = self.inference_permit().await?;

        let retrieved = document
            .retrieval
            .retrieve(question, self.models.embedder.as_ref(), self.options.ask_top_k)
            .await?;
        if retrieved.is_empty() {
            warn!(doc_id = %doc_id, "no chunks available for question");
        }

        let result = answer_with_justification(self.models.qa.as_ref(), question, &retrieved).await?;

        info!(
            doc_id = %doc_id,
            retrieved = retrieved.len(),
            confidence = result.confidence,
            "question answered"
        );

        Ok(AskResponse {
            question: question.to_string(),
            answer: result.answer,
            confidence: result.confidence,
            justification: result.justification,
            message: format!("Answer generated from {doc_id}."),
        })
    }

    pub async fn challenge(&self, doc_id: &str) -> Result<ChallengeQuestions> {
        let document = self.document(doc_id)?;
        let _permit = self.inference_permit().await?;

        let questions = generate_questions(
            self.models.generator.as_ref(),
            &self.question_parser,
            &document.text,
            self.options.prompt_chars,
            &self.options.generation_params(),
        )
        .await?;

        if questions.len() < self.options.max_questions {
            warn!(
                doc_id = %doc_id,
                parsed = questions.len(),
                "generated text yielded fewer questions than requested"
            );
        }

        Ok(ChallengeQuestions { questions })
    }

    /// Grades each (question, answer) pair against a fresh extractive answer.
    /// Unpaired trailing questions or answers are ignored. Without a chunk the
    /// model is skipped and the expected answer is empty.
    pub async fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationReport> {
        let document = self.document(&request.doc_id)?;
        let _permit = self.inference_permit().await?;

        let mut results = Vec::with_capacity(request.questions.len().min(request.answers.len()));
        for (question, user_answer) in request.questions.iter().zip(&request.answers) {
            let retrieved = document
                .retrieval
                .retrieve(question, self.models.embedder.as_ref(), self.options.evaluate_top_k)
                .await?;
            let (model_answer, context) = match retrieved.into_iter().next() {
                Some(best) => {
                    let extracted = self.models.qa.answer(question, &best.text).await?;
                    (extracted.answer, best.text)
                }
                None => (empty_answer().answer, String::new()),
            };
            let grade = grade_answer(user_answer, &model_answer);

            results.push(EvaluationResult {
                question: question.clone(),
                your_answer: user_answer.clone(),
                feedback: grade.feedback,
                correct: grade.correct,
                justification: context,
            });
        }

        info!(
            doc_id = %request.doc_id,
            graded = results.len(),
            correct = results.iter().filter(|result| result.correct).count(),
            "challenge evaluated"
        );

        Ok(EvaluationReport { results })
    }
}
