use axum::Json;
use axum::extract::{Form, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateContextForm {
    #[serde(default)]
    words: Option<String>,
}

/// POST /generate_context — turn recognized words into one corrected
/// sentence via the local LLM. Blocks for the whole streamed response.
pub async fn generate_context(
    State(state): State<AppState>,
    Form(form): Form<GenerateContextForm>,
) -> AppResult<Json<Value>> {
    let words = form
        .words
        .map(|words| words.trim().to_string())
        .filter(|words| !words.is_empty())
        .ok_or_else(|| AppError::BadRequest("No words provided".to_string()))?;

    log::info!("generating sentence for words: {words}");
    let sentence = state.agent.generate(&words).await?;

    Ok(Json(json!({ "generated_sentence": sentence })))
}
