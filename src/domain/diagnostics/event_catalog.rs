use std::collections::HashMap;
use std::path::Path;

use crate::api::event_catalog_dto::EventDefinitionDto;
use crate::domain::diagnostics::event::{Event, EventId, Extra, Severity};
use crate::error::{Error, Result};
use crate::loader::parser::parse_json_file;

/// Event definitions keyed by event id, as read from the catalog file.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    definitions: HashMap<String, EventDefinitionDto>,
}

impl EventCatalog {
    pub fn new(definitions: HashMap<String, EventDefinitionDto>) -> Self {
        Self { definitions }
    }

    pub fn from_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let definitions: HashMap<String, EventDefinitionDto> = parse_json_file(file_path)?;
        log::debug!("Event catalog loaded with {} definitions.", definitions.len());
        Ok(Self::new(definitions))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn contains(&self, id: EventId) -> bool {
        self.definitions.contains_key(id.as_str())
    }

    pub fn definition(&self, id: EventId) -> Result<&EventDefinitionDto> {
        self.definitions.get(id.as_str()).ok_or_else(|| Error::UndefinedEvent(id.as_str().to_string()))
    }

    pub fn severity(&self, id: EventId) -> Result<Severity> {
        Ok(self.definition(id)?.category.into())
    }

    pub fn message(&self, event: &Event) -> Result<String> {
        Ok(render_template(&self.definition(event.id)?.message, &event.extra))
    }

    pub fn remedy(&self, event: &Event) -> Result<String> {
        Ok(render_template(&self.definition(event.id)?.remedy, &event.extra))
    }
}

/// Substitutes `{name}` placeholders with the event's parameters.
/// Unknown placeholders are left untouched.
pub fn render_template(template: &str, extra: &Extra) -> String {
    let mut rendered = template.to_string();
    for (name, value) in extra {
        rendered = rendered.replace(&format!("{{{}}}", name), value);
    }
    rendered
}
