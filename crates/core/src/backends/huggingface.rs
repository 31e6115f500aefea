use crate::embeddings::Embedder;
use crate::traits::{QuestionAnswerer, Summarizer, TextGenerator};
use crate::{ExtractedAnswer, GenerationParams, InferenceError, SummaryParams};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_HF_ENDPOINT: &str = "https://router.huggingface.co/hf-inference/models/";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_QA_MODEL: &str = "deepset/roberta-base-squad2";
pub const DEFAULT_GENERATION_MODEL: &str = "gpt2";

const BACKEND: &str = "huggingface";

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub summarization_model: String,
    pub qa_model: String,
    pub generation_model: String,
    pub timeout_secs: u64,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_HF_ENDPOINT.to_string(),
            api_token: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            summarization_model: DEFAULT_SUMMARIZATION_MODEL.to_string(),
            qa_model: DEFAULT_QA_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            timeout_secs: 120,
        }
    }
}

/// Client for Hugging Face Inference API style endpoints. One instance
/// serves all four model capabilities, each with its own model id.
pub struct HuggingFaceClient {
    client: Client,
    endpoint: Url,
    config: HuggingFaceConfig,
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct QaOutput {
    answer: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_first(self) -> Option<T> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.into_iter().next(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeneratedOutput {
    generated_text: String,
}

impl HuggingFaceClient {
    pub fn new(config: HuggingFaceConfig) -> Result<Self, InferenceError> {
        let mut endpoint = config.endpoint.trim().to_string();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: Url::parse(&endpoint)?,
            config,
        })
    }

    pub fn config(&self) -> &HuggingFaceConfig {
        &self.config
    }

    fn model_url(&self, model: &str, pipeline: Option<&str>) -> Result<Url, InferenceError> {
        let path = match pipeline {
            Some(task) => format!("{}/pipeline/{task}", model.trim_matches('/')),
            None => model.trim_matches('/').to_string(),
        };
        Ok(self.endpoint.join(&path)?)
    }

    async fn invoke<T: DeserializeOwned>(&self, url: Url, payload: &Value) -> Result<T, InferenceError> {
        debug!(url = %url, "inference request");

        let mut request = self.client.post(url.clone()).json(payload);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!("{url} returned {status}: {body}"),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn embedding_payload(texts: &[String]) -> Value {
    json!({ "inputs": texts })
}

fn summarization_payload(text: &str, params: &SummaryParams) -> Value {
    json!({
        "inputs": text,
        "parameters": {
            "min_length": params.min_tokens,
            "max_length": params.max_tokens,
            "do_sample": params.do_sample,
        },
    })
}

fn qa_payload(question: &str, context: &str) -> Value {
    json!({
        "inputs": {
            "question": question,
            "context": context,
        },
    })
}

fn generation_payload(prompt: &str, params: &GenerationParams) -> Value {
    json!({
        "inputs": prompt,
        "parameters": {
            "max_new_tokens": params.max_new_tokens,
            "do_sample": params.do_sample,
            "return_full_text": true,
        },
    })
}

fn empty_response(task: &str) -> InferenceError {
    InferenceError::BackendResponse {
        backend: BACKEND.to_string(),
        details: format!("{task} response was empty"),
    }
}

#[async_trait]
impl Embedder for HuggingFaceClient {
    fn dimensions(&self) -> usize {
        self.config.embedding_dimensions
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, InferenceError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.model_url(&self.config.embedding_model, Some("feature-extraction"))?;
        let vectors: Vec<Vec<f32>> = self.invoke(url, &embedding_payload(texts)).await?;

        if vectors.len() != texts.len() {
            return Err(InferenceError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!(
                    "expected {} embeddings, received {}",
                    texts.len(),
                    vectors.len()
                ),
            });
        }

        Ok(vectors)
    }
}

#[async_trait]
impl Summarizer for HuggingFaceClient {
    async fn summarize(
        &self,
        text: &str,
        params: &SummaryParams,
    ) -> Result<String, InferenceError> {
        let url = self.model_url(&self.config.summarization_model, None)?;
        let outputs: Vec<SummaryOutput> =
            self.invoke(url, &summarization_payload(text, params)).await?;

        outputs
            .into_iter()
            .next()
            .map(|output| output.summary_text)
            .ok_or_else(|| empty_response("summarization"))
    }
}

#[async_trait]
impl QuestionAnswerer for HuggingFaceClient {
    async fn answer(
        &self,
        question: &str,
        context: &str,
    ) -> Result<ExtractedAnswer, InferenceError> {
        let url = self.model_url(&self.config.qa_model, None)?;
        let output: OneOrMany<QaOutput> = self.invoke(url, &qa_payload(question, context)).await?;

        output
            .into_first()
            .map(|best| ExtractedAnswer {
                answer: best.answer,
                score: best.score.clamp(0.0, 1.0),
            })
            .ok_or_else(|| empty_response("question-answering"))
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceClient {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let url = self.model_url(&self.config.generation_model, None)?;
        let outputs: Vec<GeneratedOutput> =
            self.invoke(url, &generation_payload(prompt, params)).await?;

        outputs
            .into_iter()
            .next()
            .map(|output| output.generated_text)
            .ok_or_else(|| empty_response("text-generation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> HuggingFaceClient {
        HuggingFaceClient::new(HuggingFaceConfig {
            endpoint: endpoint.to_string(),
            ..HuggingFaceConfig::default()
        })
        .expect("client builds")
    }

    #[test]
    fn model_urls_keep_the_endpoint_path() {
        let client = client("http://localhost:8080/models");

        let summary = client
            .model_url("facebook/bart-large-cnn", None)
            .expect("url");
        assert_eq!(summary.as_str(), "http://localhost:8080/models/facebook/bart-large-cnn");

        let embedding = client
            .model_url(DEFAULT_EMBEDDING_MODEL, Some("feature-extraction"))
            .expect("url");
        assert_eq!(
            embedding.as_str(),
            "http://localhost:8080/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction"
        );
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let result = HuggingFaceClient::new(HuggingFaceConfig {
            endpoint: "not a url".to_string(),
            ..HuggingFaceConfig::default()
        });
        assert!(matches!(result, Err(InferenceError::Url(_))));
    }

    #[test]
    fn summary_payload_disables_sampling_and_bounds_length() {
        let payload = summarization_payload(
            "text",
            &SummaryParams {
                min_tokens: 60,
                max_tokens: 150,
                do_sample: false,
            },
        );
        assert_eq!(payload["parameters"]["min_length"], 60);
        assert_eq!(payload["parameters"]["max_length"], 150);
        assert_eq!(payload["parameters"]["do_sample"], false);
    }

    #[test]
    fn generation_payload_samples_and_echoes_prompt() {
        let payload = generation_payload(
            "prompt",
            &GenerationParams {
                max_new_tokens: 300,
                do_sample: true,
            },
        );
        assert_eq!(payload["inputs"], "prompt");
        assert_eq!(payload["parameters"]["max_new_tokens"], 300);
        assert_eq!(payload["parameters"]["do_sample"], true);
        assert_eq!(payload["parameters"]["return_full_text"], true);
    }

    #[test]
    fn qa_payload_nests_question_and_context() {
        let payload = qa_payload("Who?", "Ada did.");
        assert_eq!(payload["inputs"]["question"], "Who?");
        assert_eq!(payload["inputs"]["context"], "Ada did.");
    }

    #[test]
    fn qa_output_accepts_object_or_list() -> Result<(), serde_json::Error> {
        let single: OneOrMany<QaOutput> =
            serde_json::from_str(r#"{"answer":"Ada","score":0.9,"start":0,"end":3}"#)?;
        let listed: OneOrMany<QaOutput> =
            serde_json::from_str(r#"[{"answer":"Ada","score":0.9},{"answer":"Bob","score":0.1}]"#)?;

        assert_eq!(single.into_first().map(|output| output.answer), Some("Ada".to_string()));
        assert_eq!(listed.into_first().map(|output| output.answer), Some("Ada".to_string()));
        Ok(())
    }

    #[test]
    fn embedding_payload_lists_inputs() {
        let payload = embedding_payload(&["a".to_string(), "b".to_string()]);
        assert_eq!(payload, json!({ "inputs": ["a", "b"] }));
    }
}
