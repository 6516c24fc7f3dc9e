//! Declaration manifests: a serializable description of records, for front
//! ends that do not read Rust source.
//!
//! ```toml
//! [[records]]
//! module = "crate::telemetry"
//! name = "Data"
//!
//! [[records.members]]
//! name = "cluster_id"
//! type = "String"
//! doc = "ClusterID is the unique id of the cluster."
//!
//! [[records.members]]
//! name = "base"
//! record = "Base"          # same module; or fully qualified
//! embedded = true
//! ```
//!
//! Each member sets exactly one of `type`, `list`, `record` or `other`.
//! JSON files use the same layout.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::decl::{Declaration, DeclarationLoader, DocTable, Member, ModuleDocs, Shape};
use crate::error::LoadError;
use crate::ir::QualifiedName;

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));
static MODULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^crate(::[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid regex"));

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    records: Vec<RecordDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordDecl {
    #[serde(default = "crate_root")]
    module: String,
    name: String,
    /// Set to something other than `struct` to declare a non-struct type.
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    members: Vec<MemberDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MemberDecl {
    name: String,
    #[serde(default = "yes")]
    exported: bool,
    #[serde(default)]
    embedded: bool,
    #[serde(default, rename = "type")]
    ty: Option<String>,
    #[serde(default)]
    list: Option<String>,
    #[serde(default)]
    record: Option<String>,
    #[serde(default)]
    other: Option<String>,
    #[serde(default)]
    doc: Option<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    declaration: Declaration,
    docs: Vec<(String, String)>,
}

/// Records loaded from one or more manifest files, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    records: IndexMap<QualifiedName, Entry>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Manifest {
    pub fn from_toml_str(source: &str, path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file: ManifestFile = toml::from_str(source).map_err(|err| manifest_error(path, err))?;
        Self::from_file(file, path)
    }

    pub fn from_json_str(source: &str, path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let de = &mut serde_json::Deserializer::from_str(source);
        let file: ManifestFile = serde_path_to_error::deserialize(de).map_err(|err| manifest_error(path, err))?;
        Self::from_file(file, path)
    }

    /// Load one file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let source = std::fs::read_to_string(path).map_err(|err| LoadError::io(path, err))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source, path),
            _ => Self::from_toml_str(&source, path),
        }
    }

    /// Load and merge every file matched by `patterns` (literal paths or globs).
    pub fn load_patterns<I>(patterns: I) -> Result<Self, LoadError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut manifest = Self::default();
        for path in resolve_file_path_patterns(patterns)? {
            debug!(path = %path.display(), "loading manifest");
            manifest.merge(Self::load(&path)?, &path)?;
        }
        Ok(manifest)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_names(&self) -> impl Iterator<Item = &QualifiedName> {
        self.records.keys()
    }

    fn merge(&mut self, other: Self, path: &Path) -> Result<(), LoadError> {
        for (name, entry) in other.records {
            if self.records.contains_key(&name) {
                return Err(LoadError::Manifest {
                    path: path.to_path_buf(),
                    message: format!("record {name} is declared more than once"),
                });
            }
            self.records.insert(name, entry);
        }
        Ok(())
    }

    fn from_file(file: ManifestFile, path: &Path) -> Result<Self, LoadError> {
        let mut manifest = Self::default();
        for record in file.records {
            let (name, entry) = record.into_entry(path)?;
            manifest.merge(Self { records: IndexMap::from([(name, entry)]) }, path)?;
        }
        Ok(manifest)
    }
}

impl RecordDecl {
    fn into_entry(self, path: &Path) -> Result<(QualifiedName, Entry), LoadError> {
        let invalid = |message: String| LoadError::Manifest { path: path.to_path_buf(), message };

        if !MODULE.is_match(&self.module) {
            return Err(invalid(format!("invalid module path `{}`", self.module)));
        }
        if !IDENT.is_match(&self.name) {
            return Err(invalid(format!("invalid record name `{}`", self.name)));
        }
        let name = QualifiedName::new(&self.module, &self.name);

        if let Some(kind) = self.kind.filter(|k| k != "struct") {
            let entry = Entry { declaration: Declaration::Other { description: kind }, docs: Vec::new() };
            return Ok((name, entry));
        }

        let mut members = Vec::with_capacity(self.members.len());
        let mut docs = Vec::new();
        for decl in self.members {
            if !IDENT.is_match(&decl.name) {
                return Err(invalid(format!("{name}: invalid field name `{}`", decl.name)));
            }
            let shape = match (decl.ty, decl.list, decl.record, decl.other) {
                (Some(ty), None, None, None) => Shape::Scalar(ty),
                (None, Some(elem), None, None) => Shape::List(elem),
                (None, None, Some(target), None) => Shape::Record(resolve_record(&self.module, &target)),
                (None, None, None, Some(desc)) => Shape::Other(desc),
                _ => {
                    return Err(invalid(format!(
                        "{name}: field `{}` must set exactly one of `type`, `list`, `record`, `other`",
                        decl.name
                    )));
                }
            };
            if let Some(doc) = decl.doc {
                docs.push((decl.name.clone(), doc));
            }
            members.push(Member { name: decl.name, exported: decl.exported, embedded: decl.embedded, shape });
        }

        Ok((name, Entry { declaration: Declaration::Struct { members }, docs }))
    }
}

impl DeclarationLoader for Manifest {
    fn load(&self, name: &QualifiedName) -> Result<Declaration, LoadError> {
        self.records
            .get(name)
            .map(|entry| entry.declaration.clone())
            .ok_or_else(|| LoadError::TypeNotFound(name.clone()))
    }
}

impl ModuleDocs for Manifest {
    fn module_docs(&self, module: &str) -> Result<DocTable, LoadError> {
        let mut table = DocTable::new();
        for (name, entry) in self.records.iter().filter(|(name, _)| name.module == module) {
            for (field, doc) in &entry.docs {
                table.insert((name.name.clone(), field.clone()), doc.clone());
            }
        }
        Ok(table)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn crate_root() -> String {
    QualifiedName::CRATE_ROOT.to_string()
}

fn yes() -> bool {
    true
}

fn resolve_record(module: &str, target: &str) -> QualifiedName {
    if target.contains("::") {
        QualifiedName::parse(target)
    } else {
        QualifiedName::new(module, target)
    }
}

fn manifest_error(path: &Path, err: impl std::fmt::Display) -> LoadError {
    LoadError::Manifest { path: path.to_path_buf(), message: err.to_string() }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, LoadError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let entries = glob::glob(pattern).map_err(|err| manifest_error(Path::new(pattern), err))?;
            let mut matched_any = false;
            for entry in entries {
                let path = entry.map_err(|err| {
                    let path = err.path().to_path_buf();
                    LoadError::io(path, std::io::Error::from(err))
                })?;
                matched_any = true;
                out.push(path);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                return Err(manifest_error(Path::new(pattern), "glob pattern matched no files"));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
