use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Multipart, Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use docqa_core::{
    AskResponse, Assistant, AssistantError, ChallengeQuestions, DocumentSummary,
    EvaluationReport, EvaluationRequest, IngestError, UploadReceipt,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

pub type SharedAssistant = Arc<Assistant>;

pub fn router(assistant: SharedAssistant, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/ask", get(ask))
        .route("/challenge", post(challenge))
        .route("/challenge/evaluate", post(evaluate))
        .route("/documents/:doc_id", get(document))
        .with_state(assistant)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[derive(Debug)]
pub enum ApiError {
    Assistant(AssistantError),
    /// Request rejected before reaching the assistant, with the status axum chose.
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(value: AssistantError) -> Self {
        Self::Assistant(value)
    }
}

impl From<MultipartError> for ApiError {
    fn from(value: MultipartError) -> Self {
        Self::Rejected {
            status: value.status(),
            message: value.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::Rejected {
            status: value.status(),
            message: value.body_text(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Rejected {
            status: value.status(),
            message: value.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::Rejected { status, message } => {
                let kind = match *status {
                    StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
                    StatusCode::UNSUPPORTED_MEDIA_TYPE => "unsupported_media_type",
                    _ => "invalid_request",
                };
                (*status, kind, message.clone())
            }
            ApiError::Assistant(inner) => {
                let (status, kind) = match inner {
                    AssistantError::DocumentNotFound(_) => (StatusCode::NOT_FOUND, "document_not_found"),
                    AssistantError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
                    AssistantError::Ingest(IngestError::UnsupportedFormat(_)) => {
                        (StatusCode::BAD_REQUEST, "unsupported_file_format")
                    }
                    AssistantError::Ingest(IngestError::PdfParse(_)) => {
                        (StatusCode::BAD_REQUEST, "parse_error")
                    }
                    AssistantError::Ingest(IngestError::Io(_)) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "io_error")
                    }
                    AssistantError::Inference(_) => (StatusCode::BAD_GATEWAY, "inference_error"),
                    AssistantError::Index(_) => (StatusCode::INTERNAL_SERVER_ERROR, "index_error"),
                };
                (status, kind, inner.to_string())
            }
        };

        if status.is_server_error() {
            error!(kind, %message, "request failed");
        }

        let body = Json(json!({
            "error": {
                "type": kind,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn upload(
    State(assistant): State<SharedAssistant>,
    mut multipart: Multipart,
) -> Result<Json<UploadReceipt>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        let receipt = assistant.upload(&file_name, bytes.to_vec()).await?;
        return Ok(Json(receipt));
    }

    Err(ApiError::bad_request("multipart field 'file' is required"))
}

#[derive(Debug, Deserialize)]
struct AskParams {
    doc_id: String,
    question: String,
}

async fn ask(
    State(assistant): State<SharedAssistant>,
    params: Result<Query<AskParams>, QueryRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Query(params) = params?;
    Ok(Json(assistant.ask(&params.doc_id, &params.question).await?))
}

#[derive(Debug, Deserialize)]
struct ChallengeParams {
    doc_id: String,
}

async fn challenge(
    State(assistant): State<SharedAssistant>,
    params: Result<Query<ChallengeParams>, QueryRejection>,
) -> Result<Json<ChallengeQuestions>, ApiError> {
    let Query(params) = params?;
    Ok(Json(assistant.challenge(&params.doc_id).await?))
}

async fn evaluate(
    State(assistant): State<SharedAssistant>,
    request: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Result<Json<EvaluationReport>, ApiError> {
    let Json(request) = request?;
    Ok(Json(assistant.evaluate(&request).await?))
}

async fn document(
    State(assistant): State<SharedAssistant>,
    Path(doc_id): Path<String>,
) -> Result<Json<DocumentSummary>, ApiError> {
    Ok(Json(assistant.document_summary(&doc_id)?))
}
