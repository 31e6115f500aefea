use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Paragraph index to 1-based page number, in order of appearance.
pub type PageMap = BTreeMap<usize, u32>;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub text: String,
    pub page_map: PageMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFingerprint {
    pub document_id: String,
    pub file_name: String,
    pub checksum: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Raw output of an extractive QA model for one context passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAnswer {
    pub answer: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Justification {
    /// Rank of the supporting chunk among the retrieved chunks, or -1 when
    /// nothing was retrieved.
    pub paragraph: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustifiedAnswer {
    pub answer: String,
    pub confidence: f64,
    pub justification: Justification,
}

/// Metadata view of a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub doc_id: String,
    pub file_name: String,
    /// Hex sha256 of the uploaded bytes.
    pub checksum: String,
    pub uploaded_at: DateTime<Utc>,
    pub paragraphs: usize,
    pub pages: usize,
    pub chunks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub doc_id: String,
    pub summary: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub confidence: f64,
    pub justification: Justification,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeQuestions {
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub doc_id: String,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub question: String,
    pub your_answer: String,
    pub feedback: String,
    pub correct: bool,
    pub justification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub results: Vec<EvaluationResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryParams {
    pub min_tokens: usize,
    pub max_tokens: usize,
    pub do_sample: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_new_tokens: usize,
    pub do_sample: bool,
}

#[derive(Debug, Clone)]
pub struct AssistantOptions {
    pub chunk_max_chars: usize,
    pub ask_top_k: usize,
    pub evaluate_top_k: usize,
    pub summary_input_chars: usize,
    pub summary_min_tokens: usize,
    pub summary_max_tokens: usize,
    pub prompt_chars: usize,
    pub question_max_new_tokens: usize,
    pub max_questions: usize,
    pub inference_permits: usize,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            chunk_max_chars: 500,
            ask_top_k: 3,
            evaluate_top_k: 1,
            summary_input_chars: 3_000,
            summary_min_tokens: 60,
            summary_max_tokens: 150,
            prompt_chars: 800,
            question_max_new_tokens: 300,
            max_questions: 3,
            inference_permits: 1,
        }
    }
}

impl AssistantOptions {
    pub fn summary_params(&self) -> SummaryParams {
        SummaryParams {
            min_tokens: self.summary_min_tokens,
            max_tokens: self.summary_max_tokens,
            do_sample: false,
        }
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.question_max_new_tokens,
            do_sample: true,
        }
    }
}
