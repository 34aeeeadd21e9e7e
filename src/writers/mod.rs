//! Report writers. Every format renders from the same projected tree:
//! [`render`] compiles the filter and projects exactly once, so text, CSV,
//! and XML output always agree on counters for the same filter.

pub mod csv;
pub mod text;
pub mod xml;

use crate::error::{FlowcovError, Result};
use crate::filter::{project, FilterSpec};
use crate::model::Node;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Csv,
    Xml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Csv => "csv",
            Format::Xml => "xml",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = FlowcovError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Format::Text),
            "csv" => Ok(Format::Csv),
            "xml" => Ok(Format::Xml),
            _ => Err(FlowcovError::UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every format writer implements this trait. Writers receive an
/// already-projected bundle; they never filter themselves.
pub trait ReportWriter {
    /// Render the bundle tree to the format's textual output.
    fn write(&self, bundle: &Node) -> Result<String>;
}

/// Project `bundle` through `filter` and render it in `format`.
///
/// Returns `Ok(None)` when the filter leaves nothing to report; writers are
/// never handed an empty tree.
pub fn render(bundle: &Node, format: Format, filter: &FilterSpec) -> Result<Option<String>> {
    let compiled = filter.compile()?;
    let Some(projected) = project(bundle, compiled.as_ref()) else {
        return Ok(None);
    };
    let output = match format {
        Format::Text => text::TextWriter.write(&projected)?,
        Format::Csv => csv::CsvWriter.write(&projected)?,
        Format::Xml => xml::XmlWriter.write(&projected)?,
    };
    Ok(Some(output))
}
