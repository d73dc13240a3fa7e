use thiserror::Error;

/// Failure to turn a raw descriptor token into a [`classpeek_api::TypeId`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed descriptor {descriptor:?}: {reason}")]
    Malformed { descriptor: String, reason: String },
}

/// A constant-pool reference that does not lead to a qualified symbol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("unresolved constant #{index}: {reason}")]
    Unresolved { index: u16, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The bytes are not a readable compiled unit. Recovered per unit.
    #[error("malformed unit {unit}: {reason}")]
    MalformedUnit { unit: String, reason: String },
    /// The builder produced an inconsistent skeleton. Fatal for the run.
    #[error("internal invariant violated in {class}: {reason}")]
    InternalInvariant { class: String, reason: String },
}

/// A serialized document that breaks its schema. Always fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{document} does not match its schema: {reason}")]
    Invalid { document: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ClasspeekError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("input directory not found: {}", .0.display())]
    MissingInput(std::path::PathBuf),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XML writer error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ClasspeekError>;
