//! REST handlers and request shapes for the `/api/v1` surface.
//!
//! Chat-family endpoints never map agent failures onto HTTP status codes:
//! the envelope carries `success` and the transport stays 200.

use super::AppState;
use axum::extract::State;
use axum::response::Json;
use serde::Deserialize;

use crate::agents::{AgentKind, ChatOutcome, RequestContext};

// ── Request shapes ───────────────────────────────────────────────

/// POST /api/v1/chat
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub agent_type: String,
    pub message: String,
    #[serde(default)]
    pub context: Option<RequestContext>,
}

/// POST /api/v1/auto-chat
#[derive(Debug, Deserialize)]
pub struct AutoChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: Option<RequestContext>,
}

/// POST /api/v1/generate
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub app_name: String,
    pub app_type: String,
    #[serde(default)]
    pub data_types: Vec<String>,
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
    #[serde(default)]
    pub requirements: Option<String>,
}

fn default_regions() -> Vec<String> {
    vec!["中国".to_string()]
}

/// POST /api/v1/check-compliance
#[derive(Debug, Deserialize)]
pub struct ComplianceCheckRequest {
    pub privacy_policy: String,
    #[serde(default)]
    pub target_regions: Option<Vec<String>>,
    #[serde(default)]
    pub check_points: Option<Vec<String>>,
}

/// POST /api/v1/check-readability
#[derive(Debug, Deserialize)]
pub struct ReadabilityCheckRequest {
    pub privacy_policy: String,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub check_dimensions: Option<Vec<String>>,
}

// ── Message composition ──────────────────────────────────────────

fn compose_generate_message(request: &GenerateRequest) -> String {
    let mut message = format!(
        "Generate a privacy policy for the mobile app \"{}\" ({}).",
        request.app_name, request.app_type
    );
    if !request.data_types.is_empty() {
        message.push_str(&format!("\nData collected: {}.", request.data_types.join(", ")));
    }
    if !request.regions.is_empty() {
        message.push_str(&format!("\nTarget regions: {}.", request.regions.join(", ")));
    }
    if let Some(requirements) = &request.requirements {
        if !requirements.trim().is_empty() {
            message.push_str(&format!("\nAdditional requirements: {requirements}"));
        }
    }
    message
}

fn compose_compliance_message(request: &ComplianceCheckRequest) -> String {
    let mut message = String::from("Review the following privacy policy for compliance.");
    if let Some(regions) = &request.target_regions {
        if !regions.is_empty() {
            message.push_str(&format!("\nTarget regions: {}.", regions.join(", ")));
        }
    }
    if let Some(points) = &request.check_points {
        if !points.is_empty() {
            message.push_str(&format!("\nFocus points: {}.", points.join(", ")));
        }
    }
    message.push_str("\n\n");
    message.push_str(&request.privacy_policy);
    message
}

fn compose_readability_message(request: &ReadabilityCheckRequest) -> String {
    let mut message =
        String::from("Assess the readability of the following privacy policy.");
    if let Some(audience) = &request.target_audience {
        if !audience.trim().is_empty() {
            message.push_str(&format!("\nTarget audience: {audience}."));
        }
    }
    if let Some(dimensions) = &request.check_dimensions {
        if !dimensions.is_empty() {
            message.push_str(&format!("\nDimensions to score: {}.", dimensions.join(", ")));
        }
    }
    message.push_str("\n\n");
    message.push_str(&request.privacy_policy);
    message
}

// ── Handlers ────────────────────────────────────────────────────

/// GET / — service banner
pub async fn handle_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "policygen privacy policy agent service",
        "version": env!("CARGO_PKG_VERSION"),
        "api": "/api/v1",
    }))
}

/// GET /health (also nested under /api/v1)
pub async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/v1/agents — display info for every supported agent
pub async fn handle_agents(State(state): State<AppState>) -> Json<serde_json::Value> {
    let agents = state.manager.available_agents();
    Json(serde_json::json!({
        "agents": agents,
        "total": agents.len(),
    }))
}

/// GET /api/v1/agents/status — supported types and cache population
pub async fn handle_agent_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = state.manager.status();
    Json(serde_json::json!(status))
}

/// POST /api/v1/chat — one turn against an explicitly chosen agent
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatOutcome> {
    let outcome = state
        .manager
        .process_request(&request.agent_type, &request.message, request.context.as_ref())
        .await;
    Json(outcome)
}

/// POST /api/v1/auto-chat — intent-routed turn
pub async fn handle_auto_chat(
    State(state): State<AppState>,
    Json(request): Json<AutoChatRequest>,
) -> Json<ChatOutcome> {
    let outcome =
        state.manager.auto_process_request(&request.message, request.context.as_ref()).await;
    Json(outcome)
}

/// POST /api/v1/generate — structured policy generation
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Json<ChatOutcome> {
    let message = compose_generate_message(&request);
    let outcome = state
        .manager
        .process_request(AgentKind::PrivacyPolicyGenerator.as_str(), &message, None)
        .await;
    Json(outcome)
}

/// POST /api/v1/check-compliance — structured compliance review
pub async fn handle_check_compliance(
    State(state): State<AppState>,
    Json(request): Json<ComplianceCheckRequest>,
) -> Json<ChatOutcome> {
    let message = compose_compliance_message(&request);
    let outcome = state
        .manager
        .process_request(AgentKind::ComplianceChecker.as_str(), &message, None)
        .await;
    Json(outcome)
}

/// POST /api/v1/check-readability — structured readability review
pub async fn handle_check_readability(
    State(state): State<AppState>,
    Json(request): Json<ReadabilityCheckRequest>,
) -> Json<ChatOutcome> {
    let message = compose_readability_message(&request);
    let outcome = state
        .manager
        .process_request(AgentKind::ReadabilityChecker.as_str(), &message, None)
        .await;
    Json(outcome)
}
