use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::settings::Config;
use crate::console::{interpret, CommandRegistry, Outcome};
use crate::llm::{assistant, vision};
use crate::quiz::tiers::RECOMMENDATIONS;
use crate::quiz::Industry;
use crate::workflows;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub registry: CommandRegistry,
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/command", post(run_command))
        .route("/api/quiz/tiers", get(tiers))
        .route("/api/workflows", get(list_workflows))
        .route("/api/chat", post(chat))
        .route("/api/analyze-image", post(analyze_image))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

#[derive(Deserialize)]
struct CommandBody {
    #[serde(default)]
    command: String,
}

async fn run_command(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CommandBody>,
) -> Json<Value> {
    let (lines, cleared) = match interpret(&state.registry, &body.command) {
        Some(Outcome::Cleared(lines)) => (lines, true),
        Some(outcome) => (outcome.lines().to_vec(), false),
        None => (Vec::new(), false),
    };
    Json(json!({ "lines": lines, "cleared": cleared }))
}

async fn tiers() -> Json<Value> {
    Json(json!({ "tiers": RECOMMENDATIONS }))
}

#[derive(Deserialize)]
struct WorkflowFilter {
    industry: Option<String>,
}

async fn list_workflows(Query(filter): Query<WorkflowFilter>) -> ApiResult {
    let industry = match filter.industry.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<Industry>()
                .map_err(|e| error(StatusCode::BAD_REQUEST, &e.to_string()))?,
        ),
    };
    Ok(Json(json!({ "templates": workflows::for_industry(industry) })))
}

#[derive(Deserialize)]
struct ChatBody {
    message: Option<String>,
    #[serde(default)]
    history: Vec<assistant::ChatTurn>,
}

async fn chat(State(state): State<Arc<AppState>>, Json(body): Json<ChatBody>) -> ApiResult {
    let message = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "Message is required"))?;

    match assistant::reply(&state.config.llm, message, &body.history).await {
        Ok(reply) => Ok(Json(json!({ "reply": reply }))),
        Err(e) => {
            log::warn!("chat request failed: {:#}", e);
            Err(error(StatusCode::INTERNAL_SERVER_ERROR, "AI service error"))
        }
    }
}

#[derive(Deserialize)]
struct ImageBody {
    image: Option<String>,
}

async fn analyze_image(State(state): State<Arc<AppState>>, Json(body): Json<ImageBody>) -> ApiResult {
    let image = body
        .image
        .filter(|i| !i.trim().is_empty())
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "Image is required"))?;

    match vision::analyze(&state.config.llm, &image).await {
        Ok(analysis) => Ok(Json(json!(analysis))),
        Err(e) => {
            log::warn!("image analysis failed: {:#}", e);
            Err(error(StatusCode::INTERNAL_SERVER_ERROR, "Analysis failed"))
        }
    }
}
