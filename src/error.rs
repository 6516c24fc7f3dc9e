//! Error families: validation errors raised while walking a record's fields,
//! and environment errors raised while loading declarations.

use std::path::PathBuf;

use thiserror::Error;

use crate::ir::QualifiedName;

/// A field declaration that breaks one of the structural rules.
///
/// Displayed as `type <T>: field <F>: <message>`. When the violation sits
/// inside an embedded record, the outer error names the embedding field and
/// carries the inner one as [`ValidationErrorKind::Nested`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("type {type_name}: field {field_name}: {kind}")]
pub struct ValidationError {
    pub type_name: QualifiedName,
    pub field_name: String,
    pub kind: ValidationErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    #[error("structs must be embedded")]
    NotEmbedded,
    #[error("must be struct, got {found}")]
    NotAStruct { found: String },
    #[error("must be exported")]
    NotExported,
    #[error("embedded basic types are not allowed")]
    EmbeddedBasicType,
    #[error("embeds {record}, which is already being embedded")]
    RecursiveEmbedding { record: QualifiedName },
    #[error("type of field must be one of {allowed}, got {found}")]
    UnsupportedType { allowed: String, found: String },
    #[error(transparent)]
    Doc(DocError),
    #[error("already exists in {owner}")]
    Duplicate { owner: QualifiedName },
    #[error(transparent)]
    Nested(Box<ValidationError>),
}

/// Doc comment lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocError {
    #[error("doc string not found")]
    NotFound,
    #[error("doc string not found (empty after trimming)")]
    Empty,
    #[error("failed to load doc comments from module {module}: {source}")]
    Module { module: String, source: LoadError },
}

/// Failures of the environment: files, modules and types that cannot be read
/// or resolved. Fatal to the run, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("module {module} not found under {}", .root.display())]
    ModuleNotFound { module: String, root: PathBuf },
    #[error("type {0} not found")]
    TypeNotFound(QualifiedName),
    #[error("expected struct, got {found}")]
    NotAStruct { name: QualifiedName, found: String },
    #[error("failed to read {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid manifest {}: {message}", .path.display())]
    Manifest { path: PathBuf, message: String },
}

/// Anything that can stop an extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Settings or field names that cannot be written into an IDL document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdlError {
    #[error("invalid IDL {what} `{value}`: expected {expected}")]
    InvalidName { what: &'static str, value: String, expected: &'static str },
    #[error("IDL field name `{name}` of field {field} is already used by {owner}")]
    DuplicateField { name: String, field: String, owner: String },
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ValidationError {
    pub fn new(type_name: &QualifiedName, field_name: &str, kind: ValidationErrorKind) -> Self {
        Self { type_name: type_name.clone(), field_name: field_name.to_string(), kind }
    }

    /// The innermost error of a nested chain.
    pub fn root(&self) -> &ValidationError {
        match &self.kind {
            ValidationErrorKind::Nested(inner) => inner.root(),
            _ => self,
        }
    }
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io { path: path.into(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_errors_chain_their_prefixes() {
        let inner = ValidationError::new(
            &QualifiedName::parse("crate::Inner"),
            "counter",
            ValidationErrorKind::Duplicate { owner: QualifiedName::parse("crate::Outer") },
        );
        let outer = ValidationError::new(
            &QualifiedName::parse("crate::Outer"),
            "inner",
            ValidationErrorKind::Nested(Box::new(inner.clone())),
        );
        assert_eq!(
            outer.to_string(),
            "type crate::Outer: field inner: type crate::Inner: field counter: already exists in crate::Outer"
        );
        assert_eq!(outer.root(), &inner);
    }

    #[test]
    fn empty_doc_reads_as_not_found() {
        assert!(DocError::Empty.to_string().contains("doc string not found"));
    }
}
