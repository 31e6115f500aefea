pub mod backends;
pub mod challenge;
pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod index;
pub mod models;
pub mod orchestrator;
pub mod qa;
pub mod retrieval;
pub mod store;
pub mod summarizer;
pub mod traits;

pub use backends::{HuggingFaceClient, HuggingFaceConfig};
pub use challenge::{build_challenge_prompt, generate_questions, grade_answer, Grade, QuestionParser};
pub use chunking::{chunk_text, split_paragraphs, ChunkingConfig, DEFAULT_CHUNK_MAX_CHARS};
pub use embeddings::{CharacterNgramEmbedder, Embedder, DEFAULT_NGRAM_DIMENSIONS};
pub use error::{AssistantError, IndexError, InferenceError, IngestError};
pub use extractor::{
    parse_document, parse_document_with, DocumentFormat, LopdfExtractor, PageText, PdfExtractor,
};
pub use index::{FlatL2Index, Neighbor};
pub use models::{
    AskResponse, AssistantOptions, ChallengeQuestions, DocumentFingerprint, DocumentSummary,
    EvaluationReport, EvaluationRequest, EvaluationResult, ExtractedAnswer, GenerationParams,
    Justification, JustifiedAnswer, PageMap, ParsedDocument, SummaryParams, UploadReceipt,
};
pub use orchestrator::{Assistant, ModelSuite};
pub use qa::{answer_with_justification, empty_answer};
pub use retrieval::{RetrievalSet, RetrievedChunk};
pub use store::{DocumentRepository, StoredDocument};
pub use summarizer::generate_summary;
pub use traits::{QuestionAnswerer, Summarizer, TextGenerator};
