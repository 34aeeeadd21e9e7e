use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowcovError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sample parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot codec error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Unknown report format: '{0}'. Supported: text, csv, xml")]
    UnknownFormat(String),

    #[error("Invalid name pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Duplicate child '{child}' under node '{parent}'")]
    DuplicateChild { child: String, parent: String },

    #[error("Group '{0}' used after visit_end")]
    GroupClosed(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),
}

pub type Result<T> = std::result::Result<T, FlowcovError>;
