use anyhow::{anyhow, Context};
use docqa_core::{
    AskResponse, ChallengeQuestions, DocumentSummary, EvaluationReport, EvaluationRequest,
    UploadReceipt,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

/// Thin HTTP client for a running docqa server.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn upload(&self, path: &Path) -> anyhow::Result<UploadReceipt> {
        let (file_name, bytes) = read_upload(path).await?;
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

        let response = self.http.post(self.url("/upload")).multipart(form).send().await?;
        decode(response).await
    }

    pub async fn ask(&self, doc_id: &str, question: &str) -> anyhow::Result<AskResponse> {
        let response = self
            .http
            .get(self.url("/ask"))
            .query(&[("doc_id", doc_id), ("question", question)])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn document(&self, doc_id: &str) -> anyhow::Result<DocumentSummary> {
        let response = self
            .http
            .get(self.url(&format!("/documents/{doc_id}")))
            .send()
            .await?;
        decode(response).await
    }

    pub async fn challenge(&self, doc_id: &str) -> anyhow::Result<ChallengeQuestions> {
        let response = self
            .http
            .post(self.url("/challenge"))
            .query(&[("doc_id", doc_id)])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn evaluate(&self, request: &EvaluationRequest) -> anyhow::Result<EvaluationReport> {
        let response = self
            .http
            .post(self.url("/challenge/evaluate"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }
}

pub async fn read_upload(path: &Path) -> anyhow::Result<(String, Vec<u8>)> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("path has no file name: {}", path.display()))?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok((file_name, bytes))
}

async fn decode<T: DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(anyhow!("server returned {status}: {}", error_message(&body)));
    }

    serde_json::from_slice(&body).context("decoding server response")
}

fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}
