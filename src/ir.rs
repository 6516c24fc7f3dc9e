// Strongly-typed schema model shared by the extractor and both renderers.

use std::fmt;

use serde::Serialize;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Fully qualified record name: the module path it was declared in plus its
/// bare type name. `crate::telemetry` + `Data` prints as `crate::telemetry::Data`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QualifiedName {
    pub module: String,
    pub name: String,
}

/// The scalar kinds an exported field may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Int64,
    Float64,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Scalar { scalar: ScalarKind },
    List { element: ScalarKind },
    Embedded {
        record: QualifiedName,
        children: Vec<Field>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Always `Some` for scalar and list fields, `None` for embedded ones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Result of one extraction: the target record and its fields in declaration
/// order, embedded records kept as nested subtrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSchema {
    pub record: QualifiedName,
    pub fields: Vec<Field>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl QualifiedName {
    pub const CRATE_ROOT: &'static str = "crate";

    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self { module: module.into(), name: name.into() }
    }

    /// Split `a::b::Name` into module `a::b` and name `Name`. A bare name is
    /// placed in the crate root.
    pub fn parse(path: &str) -> Self {
        match path.rsplit_once("::") {
            Some((module, name)) => Self::new(module, name),
            None => Self::new(Self::CRATE_ROOT, path),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

impl ScalarKind {
    /// Every supported kind, sorted by its canonical name.
    pub const ALL: [ScalarKind; 4] = [Self::Bool, Self::Float64, Self::Int64, Self::String];

    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
        }
    }

    /// Map a declared type name onto a supported kind. Both the Rust spelling
    /// (`i64`, `f64`, `String`, `bool`) and the canonical one are accepted.
    /// Platform-sized and narrower numbers are rejected.
    pub fn from_declared(ty: &str) -> Option<Self> {
        match ty {
            "String" | "string" => Some(Self::String),
            "i64" | "int64" => Some(Self::Int64),
            "f64" | "float64" => Some(Self::Float64),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }

    /// `bool, float64, int64, string`
    pub fn supported_list() -> String {
        let mut names: Vec<&str> = Self::ALL.iter().map(|k| k.canonical_name()).collect();
        names.sort_unstable();
        names.join(", ")
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl Field {
    pub fn scalar(name: impl Into<String>, scalar: ScalarKind, doc: impl Into<String>) -> Self {
        Self { name: name.into(), kind: FieldKind::Scalar { scalar }, doc: Some(doc.into()) }
    }

    pub fn list(name: impl Into<String>, element: ScalarKind, doc: impl Into<String>) -> Self {
        Self { name: name.into(), kind: FieldKind::List { element }, doc: Some(doc.into()) }
    }

    pub fn embedded(name: impl Into<String>, record: QualifiedName, children: Vec<Field>) -> Self {
        Self { name: name.into(), kind: FieldKind::Embedded { record, children }, doc: None }
    }

    pub fn doc_str(&self) -> &str {
        self.doc.as_deref().unwrap_or_default()
    }
}

impl RecordSchema {
    /// Scalar and list fields of the whole tree, depth-first, embedded fields
    /// replaced by their children.
    pub fn leaves(&self) -> Vec<&Field> {
        fn walk<'a>(fields: &'a [Field], out: &mut Vec<&'a Field>) {
            for f in fields {
                match &f.kind {
                    FieldKind::Embedded { children, .. } => walk(children, out),
                    _ => out.push(f),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.fields, &mut out);
        out
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_splits_on_last_segment() {
        let q = QualifiedName::parse("crate::telemetry::Data");
        assert_eq!(q.module, "crate::telemetry");
        assert_eq!(q.name, "Data");
        assert_eq!(q.to_string(), "crate::telemetry::Data");

        let bare = QualifiedName::parse("Data");
        assert_eq!(bare.module, "crate");
    }

    #[test]
    fn supported_kinds_are_sorted() {
        assert_eq!(ScalarKind::supported_list(), "bool, float64, int64, string");
    }

    #[test]
    fn declared_names_map_to_kinds() {
        assert_eq!(ScalarKind::from_declared("i64"), Some(ScalarKind::Int64));
        assert_eq!(ScalarKind::from_declared("float64"), Some(ScalarKind::Float64));
        assert_eq!(ScalarKind::from_declared("i32"), None);
        assert_eq!(ScalarKind::from_declared("usize"), None);
    }

    #[test]
    fn leaves_skip_embedded_nodes() {
        let schema = RecordSchema {
            record: QualifiedName::parse("crate::Data"),
            fields: vec![
                Field::scalar("a", ScalarKind::String, "A."),
                Field::embedded(
                    "inner",
                    QualifiedName::parse("crate::Inner"),
                    vec![
                        Field::list("b", ScalarKind::Int64, "B."),
                        Field::embedded(
                            "deeper",
                            QualifiedName::parse("crate::Deeper"),
                            vec![Field::scalar("c", ScalarKind::Bool, "C.")],
                        ),
                    ],
                ),
                Field::scalar("d", ScalarKind::Float64, "D."),
            ],
        };
        let names: Vec<&str> = schema.leaves().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
    }
}
