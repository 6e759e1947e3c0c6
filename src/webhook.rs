use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{Result, ScanError};
use crate::models::{AnalysisResponse, CalorieSummary};
use crate::services::summarizer::{format_report, Summarizer};

/// Successful reply for a posted analysis response
#[cfg_attr(not(feature = "results-server"), allow(dead_code))]
#[derive(Debug, Serialize)]
pub struct ResultsReply {
    pub summary: CalorieSummary,
    pub report: String,
}

#[cfg_attr(not(feature = "results-server"), allow(dead_code))]
#[derive(Debug, Serialize)]
pub struct ErrorReply {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&ScanError> for ErrorReply {
    fn from(err: &ScanError) -> Self {
        let detail = match err {
            ScanError::InvalidResponse => None,
            other => Some(other.to_string()),
        };
        Self {
            error: err.user_message().to_string(),
            detail,
        }
    }
}

/// Parse, summarize and format a raw analysis response body
#[cfg_attr(not(feature = "results-server"), allow(dead_code))]
pub fn handle_results_payload(body: &[u8], summarizer: &Summarizer) -> Result<ResultsReply> {
    let response = AnalysisResponse::parse_bytes(body)?;
    let summary = summarizer.summarize(&response)?;
    let report = format_report(&summary);

    Ok(ResultsReply { summary, report })
}

/// Verify an HMAC-SHA256 hex signature, with or without a "sha256=" prefix
#[cfg_attr(not(feature = "results-server"), allow(dead_code))]
fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    let provided = signature.strip_prefix("sha256=").unwrap_or(signature);
    match hex::decode(provided) {
        Ok(bytes) => mac.verify_slice(&bytes).is_ok(),
        Err(_) => false,
    }
}

#[cfg(feature = "results-server")]
pub mod server {
    use super::*;
    use axum::{
        body::Bytes,
        extract::{DefaultBodyLimit, State},
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use std::sync::Arc;

    const MAX_BODY_BYTES: usize = 1024 * 1024;

    pub struct AppState {
        pub summarizer: Summarizer,
        pub secret: Option<String>,
    }

    pub fn create_results_router(summarizer: Summarizer, secret: Option<String>) -> Router {
        let state = Arc::new(AppState { summarizer, secret });

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route("/results", post(results_handler))
            .route("/results/report", post(report_handler))
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .with_state(state)
    }

    fn authorize(headers: &HeaderMap, body: &[u8], secret: Option<&str>) -> std::result::Result<(), StatusCode> {
        let Some(secret) = secret else {
            return Ok(());
        };

        let signature = headers
            .get("x-signature")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        if signature.is_empty() {
            log::warn!("⚠️ Unsigned result post rejected");
            return Err(StatusCode::UNAUTHORIZED);
        }

        if !verify_signature(body, signature, secret) {
            log::error!("❌ Result post signature verification failed");
            return Err(StatusCode::UNAUTHORIZED);
        }

        log::debug!("✅ Result post signature verified");
        Ok(())
    }

    fn error_response(err: ScanError) -> Response {
        let status = match err {
            ScanError::Parse(_) => StatusCode::BAD_REQUEST,
            ScanError::InvalidResponse | ScanError::InvalidCalories { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ScanError::MissingSummary => StatusCode::INTERNAL_SERVER_ERROR,
        };
        log::warn!("⚠️ Result post failed ({}): {}", status, err);

        (status, Json(ErrorReply::from(&err))).into_response()
    }

    async fn results_handler(
        headers: HeaderMap,
        State(state): State<Arc<AppState>>,
        body: Bytes,
    ) -> Response {
        log::info!("🔔 Analysis response received ({} bytes)", body.len());

        if let Err(status) = authorize(&headers, &body, state.secret.as_deref()) {
            return status.into_response();
        }

        match handle_results_payload(&body, &state.summarizer) {
            Ok(reply) => {
                log::info!(
                    "✅ Summarized {} items, {} kcal",
                    reply.summary.item_count(),
                    reply.summary.total
                );
                (StatusCode::OK, Json(reply)).into_response()
            }
            Err(e) => error_response(e),
        }
    }

    async fn report_handler(
        headers: HeaderMap,
        State(state): State<Arc<AppState>>,
        body: Bytes,
    ) -> Response {
        if let Err(status) = authorize(&headers, &body, state.secret.as_deref()) {
            return status.into_response();
        }

        match handle_results_payload(&body, &state.summarizer) {
            Ok(reply) => reply.report.into_response(),
            Err(e) => error_response(e),
        }
    }

    async fn root_handler() -> &'static str {
        "Bill Calorie Scanner - POST analysis responses to /results"
    }

    async fn health_check() -> &'static str {
        "OK"
    }

}
