use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventCategoryDto {
    Error,
    Warning,
}

/// One entry of the event catalog file, keyed by event id.
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct EventDefinitionDto {
    pub category: EventCategoryDto,
    pub message: String,
    pub remedy: String,
}
