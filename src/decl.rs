//! Declaration-side capabilities consumed by the extractor.
//!
//! A front end turns some description of a record (Rust source, a manifest
//! file, a test fixture) into a flat member list. The extractor never sees
//! where the members came from.

use std::collections::HashMap;

use crate::error::LoadError;
use crate::ir::QualifiedName;

/// Structural shape of a declared member, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// A basic type, spelled as declared (`i64`, `String`, `u32`, ...).
    Scalar(String),
    /// A list whose element is spelled as declared.
    List(String),
    /// A reference to another named type.
    Record(QualifiedName),
    /// Anything else, kept as a printable description for error messages.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub exported: bool,
    pub embedded: bool,
    pub shape: Shape,
}

/// What a qualified name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Struct { members: Vec<Member> },
    /// A type that exists but is not a struct with named fields.
    Other { description: String },
}

/// `(record name, field name) → raw doc text` for one module.
pub type DocTable = HashMap<(String, String), String>;

/// Resolves qualified type names to their member lists.
pub trait DeclarationLoader {
    fn load(&self, name: &QualifiedName) -> Result<Declaration, LoadError>;
}

/// Produces the doc table of a whole module at once.
pub trait ModuleDocs {
    fn module_docs(&self, module: &str) -> Result<DocTable, LoadError>;
}

impl Member {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self { name: name.into(), exported: true, embedded: false, shape }
    }

    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    /// The member's type as it would be written in Rust, for error messages.
    pub fn type_description(&self) -> String {
        match &self.shape {
            Shape::Scalar(ty) | Shape::Other(ty) => ty.clone(),
            Shape::List(elem) => format!("Vec<{elem}>"),
            Shape::Record(name) => name.to_string(),
        }
    }
}

impl<T: DeclarationLoader + ?Sized> DeclarationLoader for &T {
    fn load(&self, name: &QualifiedName) -> Result<Declaration, LoadError> {
        (**self).load(name)
    }
}

impl<T: ModuleDocs + ?Sized> ModuleDocs for &T {
    fn module_docs(&self, module: &str) -> Result<DocTable, LoadError> {
        (**self).module_docs(module)
    }
}
