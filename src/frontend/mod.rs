//! Declaration front ends: where record definitions come from.

pub mod manifest;
pub mod rust_src;

use crate::decl::{Declaration, DeclarationLoader, DocTable, ModuleDocs};
use crate::error::LoadError;
use crate::ir::QualifiedName;

pub use manifest::Manifest;
pub use rust_src::RustSource;

/// The front end picked on the command line.
#[derive(Debug)]
pub enum Frontend {
    Rust(RustSource),
    Manifest(Manifest),
}

impl DeclarationLoader for Frontend {
    fn load(&self, name: &QualifiedName) -> Result<Declaration, LoadError> {
        match self {
            Self::Rust(source) => source.load(name),
            Self::Manifest(manifest) => manifest.load(name),
        }
    }
}

impl ModuleDocs for Frontend {
    fn module_docs(&self, module: &str) -> Result<DocTable, LoadError> {
        match self {
            Self::Rust(source) => source.module_docs(module),
            Self::Manifest(manifest) => manifest.module_docs(module),
        }
    }
}
