pub mod catalog_repository;
pub mod diary_repository;
pub mod progress_repository;
pub mod questionnaire_repository;
pub mod settings_repository;
pub mod task_repository;
pub mod tip_repository;

use crate::error::AppResult;

/// List-valued fields are persisted as JSON text columns.
pub(crate) fn encode_list(values: &[String]) -> AppResult<String> {
    Ok(serde_json::to_string(values)?)
}

pub(crate) fn decode_list(raw: &str) -> AppResult<Vec<String>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}
