//! Error types for rust-ormgen

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the collaborators around the resolver (project and
/// declaration reading, output writing)
#[derive(Error, Debug)]
pub enum OrmGenError {
    #[error("Failed to read project file: {path}")]
    ProjectReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse project file: {path}")]
    ProjectParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid project file format: {message}")]
    InvalidProjectFormat { message: String },

    #[error("Failed to read declaration file: {path}")]
    DeclarationReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse declaration file: {path}")]
    DeclarationParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid declaration in {path}: {message}")]
    InvalidDeclaration { path: PathBuf, message: String },

    #[error("Failed to write output to {path}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Category of a mapping error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingErrorKind {
    /// A named field, class or extent target does not exist or is not reachable
    UnresolvedReference,
    /// Foreign-key / primary-key / remote-foreign-key list lengths disagree
    ArityMismatch,
    /// JDBC-type or subtype disagreement
    TypeMismatch,
    /// An option holds a value outside its accepted domain
    InvalidOptionValue,
    /// Conflicting or impossible declarations
    StructuralConflict,
    /// collection-class incompatible with the declared container type
    ContainerCompatibility,
}

impl fmt::Display for MappingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MappingErrorKind::UnresolvedReference => "unresolved reference",
            MappingErrorKind::ArityMismatch => "arity mismatch",
            MappingErrorKind::TypeMismatch => "type mismatch",
            MappingErrorKind::InvalidOptionValue => "invalid option value",
            MappingErrorKind::StructuralConflict => "structural conflict",
            MappingErrorKind::ContainerCompatibility => "container compatibility violation",
        };
        f.write_str(s)
    }
}

/// Errors detected while resolving the class hierarchy into mapping metadata.
///
/// Every variant is fatal: the run produces no output at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("{class}: unresolved {what} '{name}' ({context})")]
    UnresolvedReference {
        class: String,
        what: &'static str,
        name: String,
        context: String,
    },

    #[error(
        "{class}.{member}: {left_label} has {left} entries but {right_label} has {right}"
    )]
    ArityMismatch {
        class: String,
        member: String,
        left_label: &'static str,
        left: usize,
        right_label: &'static str,
        right: usize,
    },

    #[error("{class}.{member}: {message}")]
    TypeMismatch {
        class: String,
        member: String,
        message: String,
    },

    #[error("{class}: invalid value '{value}' for option '{option}' of {tag} ({reason})")]
    InvalidOptionValue {
        class: String,
        tag: String,
        option: String,
        value: String,
        reason: String,
    },

    #[error("{class}: {message}")]
    StructuralConflict { class: String, message: String },

    #[error("{class}.{member}: collection-class '{collection_class}' {message}")]
    ContainerCompatibility {
        class: String,
        member: String,
        collection_class: String,
        message: String,
    },
}

impl MappingError {
    pub fn kind(&self) -> MappingErrorKind {
        match self {
            MappingError::UnresolvedReference { .. } => MappingErrorKind::UnresolvedReference,
            MappingError::ArityMismatch { .. } => MappingErrorKind::ArityMismatch,
            MappingError::TypeMismatch { .. } => MappingErrorKind::TypeMismatch,
            MappingError::InvalidOptionValue { .. } => MappingErrorKind::InvalidOptionValue,
            MappingError::StructuralConflict { .. } => MappingErrorKind::StructuralConflict,
            MappingError::ContainerCompatibility { .. } => {
                MappingErrorKind::ContainerCompatibility
            }
        }
    }

    pub(crate) fn conflict(class: &str, message: impl Into<String>) -> Self {
        MappingError::StructuralConflict {
            class: class.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unresolved(
        class: &str,
        what: &'static str,
        name: &str,
        context: impl Into<String>,
    ) -> Self {
        MappingError::UnresolvedReference {
            class: class.to_string(),
            what,
            name: name.to_string(),
            context: context.into(),
        }
    }
}

pub type MappingResult<T> = std::result::Result<T, MappingError>;
