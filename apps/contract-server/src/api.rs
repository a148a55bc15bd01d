//! API handlers for the contract analysis server
//!
//! Provides REST endpoints for:
//! - Document upload analysis (multipart)
//! - Plain-text analysis
//! - Rule taxonomy listing

use std::path::Path;
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use clause_engine::RuleTable;
use shared_types::types::{MIME_DOCX, MIME_MSWORD, MIME_PDF};
use shared_types::AnalysisReport;

use crate::error::ServerError;
use crate::AppState;

/// Multipart field carrying the document
pub const UPLOAD_FIELD: &str = "file";

const OCTET_STREAM: &str = "application/octet-stream";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contract-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Rule taxonomy response
#[derive(Serialize)]
pub struct RulesResponse {
    pub success: bool,
    pub rules: RuleTable,
    pub count: usize,
}

/// Handler: GET /api/rules
pub async fn handle_list_rules(State(state): State<AppState>) -> Json<RulesResponse> {
    let rules = state.analyzer.engine().rules();
    Json(RulesResponse {
        success: true,
        rules: RuleTable::from(rules),
        count: rules.len(),
    })
}

/// Analysis response: the report plus request metadata
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

/// Handler: POST /api/analysis
pub async fn handle_analyze_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ServerError> {
    let request_id = Uuid::new_v4();

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!(%request_id, field = ?field.name(), "Skipping multipart field");
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let declared = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        upload = Some((file_name, declared, bytes));
        break;
    }

    let (file_name, declared, bytes) = upload.ok_or_else(|| {
        ServerError::InvalidRequest(format!("Missing '{}' field", UPLOAD_FIELD))
    })?;
    if bytes.is_empty() {
        return Err(ServerError::InvalidRequest("Uploaded file is empty".into()));
    }

    let mime_type = resolve_mime(declared.as_deref(), file_name.as_deref());
    info!(
        %request_id,
        file_name = ?file_name,
        mime_type = %mime_type,
        size = bytes.len(),
        "Analysis request"
    );

    let analyzer = state.analyzer.clone();
    let report = run_blocking(state.timeout_ms, move || {
        analyzer.analyze(&bytes, &mime_type)
    })
    .await?
    .map_err(|e| {
        warn!(%request_id, error = %e, "Analysis failed");
        ServerError::from(e)
    })?;

    info!(
        %request_id,
        risks = report.summary.total,
        risk_score = report.risk_score,
        "Analysis complete"
    );

    Ok(Json(AnalysisResponse {
        success: true,
        file_name,
        report,
    }))
}

/// Text analysis request body
#[derive(Deserialize)]
pub struct TextAnalysisRequest {
    pub text: String,
}

/// Handler: POST /api/analysis/text
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(req): Json<TextAnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ServerError> {
    if req.text.trim().is_empty() {
        return Err(ServerError::InvalidRequest("Text is empty".into()));
    }
    debug!(chars = req.text.len(), "Text analysis request");

    let analyzer = state.analyzer.clone();
    let report = run_blocking(state.timeout_ms, move || analyzer.analyze_text(&req.text)).await?;

    Ok(Json(AnalysisResponse {
        success: true,
        file_name: None,
        report,
    }))
}

/// Run CPU-bound or subprocess-bound work off the async runtime under the
/// request deadline. On timeout the blocking task is left to finish on its
/// own; its result is discarded.
async fn run_blocking<T, F>(timeout_ms: u64, work: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);
    match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ServerError::Internal(format!("Analysis task failed: {}", e))),
        Err(_) => {
            warn!(timeout_ms, "Analysis exceeded request deadline");
            Err(ServerError::Timeout(timeout_ms))
        }
    }
}

/// Declared content type, or a guess from the file name when the client sent
/// none or a generic octet stream. Unknown extensions fall through to the
/// dispatcher, which rejects them.
pub fn resolve_mime(declared: Option<&str>, file_name: Option<&str>) -> String {
    match declared.map(str::trim) {
        Some(mime) if !mime.is_empty() && !mime.eq_ignore_ascii_case(OCTET_STREAM) => {
            mime.to_string()
        }
        _ => file_name
            .and_then(mime_from_extension)
            .unwrap_or(OCTET_STREAM)
            .to_string(),
    }
}

fn mime_from_extension(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => MIME_PDF,
        "docx" => MIME_DOCX,
        "doc" => MIME_MSWORD,
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(mime)
}
