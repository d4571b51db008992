//! Session workflow: enhance a prompt, execute the improved prompt, follow up
//! on a result, and edit the improved prompt.
//!
//! Every operation makes at most one model call and touches the store only
//! after that call succeeded. Persisting the store is left to the caller.

use crate::core::history::{HistoryError, HistoryStore};
use crate::core::llm::{ModelClient, ModelError};
use crate::core::text::{SegmentedResponse, segment};

/// Instructions sent ahead of the user's prompt when asking for an improvement.
pub const ENHANCE_INSTRUCTIONS: &str = include_str!("../../config/enhance-instructions.md");

#[derive(Debug, thiserror::Error)]
pub enum BoosterError {
    #[error("Prompt is empty")]
    EmptyPrompt,
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("Session {0} has no execution result yet (run `execute` first)")]
    NotExecuted(String),
}

/// A freshly enhanced prompt and the id it was saved under.
#[derive(Debug, Clone)]
pub struct Enhanced {
    pub id: String,
    pub segmented: SegmentedResponse,
}

fn non_empty(prompt: &str) -> Result<&str, BoosterError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        Err(BoosterError::EmptyPrompt)
    } else {
        Ok(prompt)
    }
}

/// Full text sent to the model for an enhancement request.
pub fn enhancement_prompt(prompt: &str) -> String {
    format!(
        "{}\n\nOriginal prompt: {}",
        ENHANCE_INSTRUCTIONS.trim_end(),
        prompt
    )
}

/// Text sent to the model for a follow-up on an executed session.
fn follow_up_prompt(previous_prompt: &str, previous_result: &str, request: &str) -> String {
    format!(
        "Previous prompt: {previous_prompt}\n\nPrevious response: {previous_result}\n\n---\n\nUser request: {request}"
    )
}

/// Ask the model to improve `prompt`, then save the session.
pub async fn enhance<M: ModelClient>(
    model: &M,
    store: &mut HistoryStore,
    prompt: &str,
) -> Result<Enhanced, BoosterError> {
    let prompt = non_empty(prompt)?;
    let response = model.complete(&enhancement_prompt(prompt)).await?;
    let segmented = segment(Some(&response));
    let id = store.add(prompt, &response);
    log::info!("Saved enhanced prompt as session {}", id);
    Ok(Enhanced { id, segmented })
}

/// Run the improved prompt of session `id` and store the raw result.
pub async fn execute<M: ModelClient>(
    model: &M,
    store: &mut HistoryStore,
    id: &str,
) -> Result<String, BoosterError> {
    let session = store
        .get(id)
        .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
    let segmented = session.segmented();
    let artifact = non_empty(&segmented.main_artifact)?;

    let result = model.complete(artifact).await?;
    store.update_execution_result(id, &result)?;
    Ok(result)
}

/// Continue an executed session: the previous prompt and result go to the
/// model as context, and the answer is appended to the stored result.
pub async fn follow_up<M: ModelClient>(
    model: &M,
    store: &mut HistoryStore,
    id: &str,
    request: &str,
) -> Result<String, BoosterError> {
    let request = non_empty(request)?;
    let session = store
        .get(id)
        .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
    let previous = session
        .execution_result
        .clone()
        .ok_or_else(|| BoosterError::NotExecuted(id.to_string()))?;
    let artifact = session.segmented().main_artifact;

    let answer = model
        .complete(&follow_up_prompt(&artifact, &previous, request))
        .await?;
    let combined = format!("{previous}\n\n---\n\n**Follow-up:** {request}\n\n**Response:**\n{answer}");
    store.update_execution_result(id, &combined)?;
    Ok(combined)
}

/// Replace the improved prompt of session `id`, keeping its rationale.
pub fn edit(
    store: &mut HistoryStore,
    id: &str,
    new_prompt: &str,
) -> Result<SegmentedResponse, BoosterError> {
    let new_prompt = non_empty(new_prompt)?;
    let session = store
        .get(id)
        .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
    let edited = SegmentedResponse {
        main_artifact: new_prompt.to_string(),
        rationale: session.segmented().rationale,
    };
    store.update_enhanced(id, &edited.to_canonical())?;
    Ok(edited)
}
