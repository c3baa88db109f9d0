use std::sync::Arc;

use crate::domain::diagnostics::event::{Event, EventId, Extra};
use crate::domain::diagnostics::event_catalog::EventCatalog;
use crate::error::Result;

/// Whether events carry the line number they were raised on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventContext {
    /// Syntax diagnostics, attributed to a script line.
    File,
    /// Semantic diagnostics, no line.
    Global,
}

/// Append-only sink of events for one parser or checker run.
#[derive(Debug, Clone)]
pub struct EventLog {
    catalog: Arc<EventCatalog>,
    context: EventContext,
    line_nr: Option<usize>,
    events: Vec<Event>,
}

impl EventLog {
    pub fn new(catalog: Arc<EventCatalog>, context: EventContext) -> Self {
        Self { catalog, context, line_nr: None, events: Vec::new() }
    }

    pub fn context(&self) -> EventContext {
        self.context
    }

    pub fn catalog(&self) -> &Arc<EventCatalog> {
        &self.catalog
    }

    /// Line that subsequently registered events are attributed to.
    pub fn set_line(&mut self, line_nr: usize) {
        self.line_nr = Some(line_nr);
    }

    pub fn register<K>(&mut self, id: EventId, extra: impl IntoIterator<Item = (K, String)>) -> Result<()>
    where
        K: Into<String>,
    {
        let extra: Extra = extra.into_iter().map(|(key, value)| (key.into(), value)).collect();
        self.push(id, self.line_nr, extra)
    }

    pub fn register_plain(&mut self, id: EventId) -> Result<()> {
        self.push(id, self.line_nr, Extra::new())
    }

    /// Re-registers events of another log, attributing them to the current
    /// line unless they already carry one.
    pub fn merge(&mut self, events: impl IntoIterator<Item = Event>) -> Result<()> {
        for event in events {
            let line = event.line.or(self.line_nr);
            self.push(event.id, line, event.extra)?;
        }
        Ok(())
    }

    fn push(&mut self, id: EventId, line: Option<usize>, extra: Extra) -> Result<()> {
        let severity = self.catalog.severity(id)?;
        let line = match self.context {
            EventContext::File => line,
            EventContext::Global => None,
        };
        self.events.push(Event { id, line, severity, extra });
        Ok(())
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Hands out the collected events and leaves the log empty.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn nr_errors(&self) -> usize {
        self.events.iter().filter(|event| event.is_error()).count()
    }

    pub fn nr_warnings(&self) -> usize {
        self.events.iter().filter(|event| event.is_warning()).count()
    }
}
