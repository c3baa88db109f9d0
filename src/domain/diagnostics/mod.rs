//! Diagnostic events produced by the parsers and the checker.
//!
//! Every finding is an [`Event`] identified by an [`EventId`]. Its severity,
//! message and remedy live in an external [`EventCatalog`]; an id the
//! catalog does not define is an internal fault, reported as
//! [`crate::error::Error::UndefinedEvent`] rather than as a diagnostic.

pub mod event;
pub mod event_catalog;
pub mod event_log;

pub use event::{Event, EventId, Extra, Severity};
pub use event_catalog::EventCatalog;
pub use event_log::{EventContext, EventLog};
