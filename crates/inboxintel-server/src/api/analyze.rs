use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use inboxintel_core::{Campaign, RawCampaign};
use inboxintel_engine::{build_report, EngineError, IntelligenceReport};
use serde::Deserialize;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct AnalyzeRequest {
    pub brand: String,
    pub campaigns: Vec<RawCampaign>,
}

pub(super) async fn analyze_emails(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<IntelligenceReport>>, ApiError> {
    let request_id = req_id.0;

    let Json(body) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "rejected malformed analyze request");
        ApiError::new(request_id.clone(), "bad_request", rejection.body_text())
    })?;

    if body.campaigns.len() > state.max_campaigns {
        tracing::warn!(
            received = body.campaigns.len(),
            max = state.max_campaigns,
            "analyze request exceeds campaign limit"
        );
        return Err(ApiError::new(
            request_id,
            "payload_too_large",
            format!(
                "received {} campaigns; at most {} are accepted per request",
                body.campaigns.len(),
                state.max_campaigns
            ),
        ));
    }

    let campaigns = validate_campaigns(body.campaigns).map_err(|message| {
        tracing::warn!(error = %message, "rejected invalid campaign");
        ApiError::new(request_id.clone(), "validation_error", message)
    })?;

    let report = build_report(&body.brand, &campaigns, &state.policy).map_err(|e| {
        tracing::warn!(error = %e, brand = %body.brand, "report generation rejected input");
        map_engine_error(request_id.clone(), &e)
    })?;

    tracing::info!(
        brand = %report.brand,
        campaigns = report.total_campaigns,
        overall_score = report.overall_score,
        "analyzed email campaigns"
    );

    let message = format!(
        "Successfully analyzed {} email campaigns for {}",
        report.total_campaigns, report.brand
    );
    Ok(Json(ApiResponse {
        data: report,
        message: Some(message),
        meta: ResponseMeta::new(request_id),
    }))
}

/// Validates each raw campaign, naming the first offender by position.
fn validate_campaigns(raw: Vec<RawCampaign>) -> Result<Vec<Campaign>, String> {
    raw.into_iter()
        .enumerate()
        .map(|(idx, campaign)| {
            campaign
                .validate()
                .map_err(|e| format!("campaigns[{idx}].{}: {}", e.field, e.reason))
        })
        .collect()
}

fn map_engine_error(request_id: String, error: &EngineError) -> ApiError {
    match error {
        EngineError::Validation(v) => ApiError::new(
            request_id,
            "validation_error",
            format!("{}: {}", v.field, v.reason),
        ),
        EngineError::EmptyInput => ApiError::new(request_id, "empty_input", error.to_string()),
    }
}

#[cfg(test)]
#[path = "analyze_test.rs"]
mod tests;
