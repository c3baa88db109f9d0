//! Rendering of diagnostic events for people and for spreadsheets.

use std::fmt::Write as _;
use std::io;

use colored::Colorize;

use crate::domain::diagnostics::{Event, EventCatalog, Severity};
use crate::error::Result;

const CSV_HEADERS: [&str; 5] = ["severity", "id", "line", "problem", "remedy"];

/// One rendered event.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub severity: Severity,
    pub id: String,
    pub line: Option<usize>,
    pub problem: String,
    pub remedy: String,
}

impl ReportEntry {
    fn header(&self) -> String {
        match self.line {
            Some(line) => format!("{} line {}:", self.severity.tag(), line),
            None => format!("{}:", self.severity.tag()),
        }
    }
}

/// Events of a run resolved against the catalog, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new(events: &[Event], catalog: &EventCatalog) -> Result<Self> {
        let entries = events
            .iter()
            .map(|event| {
                Ok(ReportEntry {
                    severity: event.severity,
                    id: event.id.to_string(),
                    line: event.line,
                    problem: catalog.message(event)?,
                    remedy: catalog.remedy(event)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn nr_errors(&self) -> usize {
        self.entries.iter().filter(|entry| entry.severity == Severity::Error).count()
    }

    pub fn nr_warnings(&self) -> usize {
        self.entries.iter().filter(|entry| entry.severity == Severity::Warning).count()
    }

    pub fn summary(&self) -> String {
        format!("{} errors, {} warnings", self.nr_errors(), self.nr_warnings())
    }

    /// Plain text, one block per event followed by the summary.
    pub fn render(&self) -> String {
        self.render_with(|entry| entry.header())
    }

    /// Same as [`Report::render`] with the headers colored by severity.
    pub fn render_colored(&self) -> String {
        self.render_with(|entry| match entry.severity {
            Severity::Error => entry.header().red().bold().to_string(),
            Severity::Warning => entry.header().yellow().bold().to_string(),
        })
    }

    fn render_with(&self, header: impl Fn(&ReportEntry) -> String) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out, "{}", header(entry));
            let _ = writeln!(out, "  problem: {}", entry.problem);
            let _ = writeln!(out, "  remedy: {}", entry.remedy);
        }
        let _ = writeln!(out, "{}", self.summary());
        out
    }

    /// Writes the entries as `;`-separated CSV.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
        csv_wtr.write_record(CSV_HEADERS)?;

        for entry in &self.entries {
            let line = entry.line.map(|line| line.to_string()).unwrap_or_default();
            csv_wtr.write_record([entry.severity.tag(), entry.id.as_str(), line.as_str(), entry.problem.as_str(), entry.remedy.as_str()])?;
        }
        csv_wtr.flush()?;
        Ok(())
    }
}
