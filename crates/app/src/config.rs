use clap::{Args, ValueEnum};
use docqa_core::backends::huggingface::{
    DEFAULT_EMBEDDING_DIMENSIONS, DEFAULT_EMBEDDING_MODEL, DEFAULT_GENERATION_MODEL,
    DEFAULT_HF_ENDPOINT, DEFAULT_QA_MODEL, DEFAULT_SUMMARIZATION_MODEL,
};
use docqa_core::{AssistantOptions, HuggingFaceConfig, DEFAULT_CHUNK_MAX_CHARS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbeddingBackend {
    /// Sentence-embedding model served by the inference endpoint.
    Huggingface,
    /// Local hashed character-trigram vectors, no network.
    Ngram,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "DOCQA_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind
    #[arg(long, env = "DOCQA_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Largest accepted upload body in bytes
    #[arg(long, env = "DOCQA_MAX_UPLOAD_BYTES", default_value_t = 100 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Maximum characters per retrieval chunk
    #[arg(long, env = "DOCQA_CHUNK_MAX_CHARS", default_value_t = DEFAULT_CHUNK_MAX_CHARS)]
    pub chunk_max_chars: usize,

    /// Number of requests allowed to run model inference at once
    #[arg(long, env = "DOCQA_INFERENCE_PERMITS", default_value_t = 1)]
    pub inference_permits: usize,

    /// Where chunk and question embeddings come from
    #[arg(long, env = "DOCQA_EMBEDDING_BACKEND", value_enum, default_value_t = EmbeddingBackend::Huggingface)]
    pub embedding_backend: EmbeddingBackend,

    /// Inference API base URL; model ids are appended to it
    #[arg(long, env = "DOCQA_HF_ENDPOINT", default_value = DEFAULT_HF_ENDPOINT)]
    pub hf_endpoint: String,

    /// Bearer token for the inference API
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Sentence-embedding model id
    #[arg(long, env = "DOCQA_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    /// Embedding vector length; must match the model for the huggingface backend
    #[arg(long, env = "DOCQA_EMBEDDING_DIMENSIONS", default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
    pub embedding_dimensions: usize,

    /// Summarization model id
    #[arg(long, env = "DOCQA_SUMMARIZATION_MODEL", default_value = DEFAULT_SUMMARIZATION_MODEL)]
    pub summarization_model: String,

    /// Extractive question-answering model id
    #[arg(long, env = "DOCQA_QA_MODEL", default_value = DEFAULT_QA_MODEL)]
    pub qa_model: String,

    /// Text-generation model id used for challenge questions
    #[arg(long, env = "DOCQA_GENERATION_MODEL", default_value = DEFAULT_GENERATION_MODEL)]
    pub generation_model: String,

    /// Timeout for a single inference call, in seconds
    #[arg(long, env = "DOCQA_TIMEOUT_SECS", default_value_t = 120)]
    pub timeout_secs: u64,
}

impl ServeArgs {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn assistant_options(&self) -> AssistantOptions {
        AssistantOptions {
            chunk_max_chars: self.chunk_max_chars,
            inference_permits: self.inference_permits,
            ..AssistantOptions::default()
        }
    }

    pub fn huggingface_config(&self) -> HuggingFaceConfig {
        HuggingFaceConfig {
            endpoint: self.hf_endpoint.clone(),
            api_token: self
                .hf_token
                .as_ref()
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
            embedding_model: self.embedding_model.clone(),
            embedding_dimensions: self.embedding_dimensions,
            summarization_model: self.summarization_model.clone(),
            qa_model: self.qa_model.clone(),
            generation_model: self.generation_model.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}
