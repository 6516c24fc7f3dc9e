//! Avro IDL rendering.
//!
//! Unlike the code renderer, embedded records are flattened here: the wire
//! record carries every leaf field of the tree directly, after three fixed
//! preamble fields.

use std::collections::HashMap;
use std::fmt::Write;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::IdlError;
use crate::ir::{Field, FieldKind, RecordSchema, ScalarKind};

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));
static NAMESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid regex"));

const PREAMBLE: [&str; 3] = ["dataType", "eventTime", "ingestTime"];

/// How field identifiers are spelled in the IDL document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum IdlFieldNaming {
    /// Lower-case the first character (`SomeField` → `someField`).
    #[default]
    LowerFirst,
    /// Keep the declared name.
    Verbatim,
}

#[derive(Debug, Clone, Default)]
pub struct IdlConfig {
    pub namespace: String,
    pub protocol: String,
    pub data_fabric_type: String,
    pub record: String,
    pub naming: IdlFieldNaming,
}

impl IdlConfig {
    /// Namespace, protocol and record are written unquoted, so they must be
    /// IDL names. The data type tag is quoted and escaped instead.
    pub fn validate(&self) -> Result<(), IdlError> {
        check_name("namespace", &self.namespace, &NAMESPACE, "dot-separated identifiers")?;
        check_name("protocol", &self.protocol, &IDENT, "an identifier")?;
        check_name("record", &self.record, &IDENT, "an identifier")
    }
}

/// Render the IDL document for `schema`.
///
/// Fails when a name in `config` is not a valid IDL name, or when two leaves
/// (or a leaf and a preamble field) end up with the same IDL field name.
pub fn render(schema: &RecordSchema, config: &IdlConfig) -> Result<String, IdlError> {
    config.validate()?;
    let leaves = schema.leaves();
    let names = field_names(&leaves, config.naming)?;

    let mut out = String::new();

    let _ = writeln!(out, "@namespace(\"{}\") protocol {} {{", config.namespace, config.protocol);
    let _ = writeln!(
        out,
        "\t@df_datatype({}) record {} {{",
        string_literal(&config.data_fabric_type),
        config.record
    );
    let _ = writeln!(out, "\t\t/** The field that identifies what type of data this is. */");
    let _ = writeln!(out, "\t\tstring dataType;");
    let _ = writeln!(out, "\t\t/** The time the event occurred */");
    let _ = writeln!(out, "\t\tlong eventTime;");
    let _ = writeln!(out, "\t\t/** The time our edge ingested the event */");
    let _ = writeln!(out, "\t\tlong ingestTime;");

    for (field, name) in leaves.iter().zip(&names) {
        let _ = writeln!(out);
        let _ = writeln!(out, "\t\t/** {} */", comment_text(field.doc_str()));
        let _ = writeln!(out, "\t\t{} {} = null;", wire_type(field), name);
    }

    let _ = writeln!(out, "\t}}");
    let _ = writeln!(out, "}}");
    Ok(out)
}

/// `<type>.avdl`, lower-cased.
pub fn file_name(type_name: &str) -> String {
    format!("{}.avdl", type_name.to_lowercase())
}

pub fn primitive(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Int64 => "long",
        ScalarKind::Float64 => "double",
        ScalarKind::String => "string",
        ScalarKind::Bool => "boolean",
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn wire_type(field: &Field) -> String {
    match &field.kind {
        FieldKind::Scalar { scalar } => format!("{}?", primitive(*scalar)),
        FieldKind::List { element } => format!("union {{null, array<{}>}}", primitive(*element)),
        // leaves() never yields embedded fields
        FieldKind::Embedded { .. } => unreachable!("embedded field {} is not a leaf", field.name),
    }
}

fn check_name(what: &'static str, value: &str, pattern: &Regex, expected: &'static str) -> Result<(), IdlError> {
    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(IdlError::InvalidName { what, value: value.to_string(), expected })
    }
}

// the extractor rejects equal declared names; casing can still merge two
fn field_names(leaves: &[&Field], naming: IdlFieldNaming) -> Result<Vec<String>, IdlError> {
    let mut owners: HashMap<String, String> =
        PREAMBLE.iter().map(|name| (name.to_string(), "the preamble".to_string())).collect();
    let mut names = Vec::with_capacity(leaves.len());
    for field in leaves {
        let name = field_name(&field.name, naming);
        if let Some(owner) = owners.get(&name) {
            return Err(IdlError::DuplicateField { name, field: field.name.clone(), owner: owner.clone() });
        }
        owners.insert(name.clone(), format!("field {}", field.name));
        names.push(name);
    }
    Ok(names)
}

fn string_literal(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

fn field_name(name: &str, naming: IdlFieldNaming) -> String {
    match naming {
        IdlFieldNaming::Verbatim => name.to_string(),
        IdlFieldNaming::LowerFirst => {
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

// multi-line docs keep their line breaks, aligned under the opening marker
fn comment_text(doc: &str) -> String {
    doc.replace("*/", "*\\/").replace('\n', "\n\t\t * ")
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
