//! Rust code generation for the `Exportable` capability.
//!
//! Top-level fields are rendered one `KeyValue` per field. Embedded fields are
//! not flattened: they delegate to the embedded value's own generated
//! `attributes()`, so every record is generated independently.

use std::fmt::Write;

use crate::ir::{Field, FieldKind, RecordSchema, ScalarKind};

/// Key of the optional leading discriminator attribute.
pub const DATA_TYPE_KEY: &str = "dataType";

#[derive(Debug, Clone)]
pub struct CodeConfig {
    /// Path the generated code uses to reach the runtime types.
    /// `crate` when generating inside the runtime crate itself.
    pub runtime_path: String,
    /// Value of the leading `dataType` attribute; omitted when `None`.
    pub data_type: Option<String>,
    /// Features every generated item is gated behind.
    pub cfg_features: Vec<String>,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            runtime_path: "::telemetry_codegen".to_string(),
            data_type: None,
            cfg_features: Vec::new(),
        }
    }
}

pub struct Codegen<'a> {
    config: &'a CodeConfig,
    out: String,
}

impl<'a> Codegen<'a> {
    pub fn new(config: &'a CodeConfig) -> Self {
        Self { config, out: String::new() }
    }

    pub fn emit(&mut self, schema: &RecordSchema) {
        let rt = &self.config.runtime_path;
        let target = type_path(schema);
        let cfg = cfg_attribute(&self.config.cfg_features);

        let _ = writeln!(self.out, "// This is a generated file. DO NOT EDIT.");
        let _ = writeln!(self.out, "// Source: {}", schema.record);
        let _ = writeln!(self.out);

        if let Some(cfg) = &cfg {
            let _ = writeln!(self.out, "{cfg}");
        }
        let _ = writeln!(self.out, "impl {rt}::Exportable for {target} {{");
        let _ = writeln!(self.out, "    fn attributes(&self) -> ::std::vec::Vec<{rt}::KeyValue> {{");
        let _ = writeln!(self.out, "        let mut attrs = ::std::vec::Vec::new();");
        if let Some(data_type) = &self.config.data_type {
            let _ = writeln!(
                self.out,
                "        attrs.push({rt}::KeyValue::string({DATA_TYPE_KEY:?}, {data_type:?}));"
            );
        }
        for field in &schema.fields {
            let line = self.field_source(field);
            let _ = writeln!(self.out, "        {line}");
        }
        let _ = writeln!(self.out, "        attrs");
        let _ = writeln!(self.out, "    }}");
        let _ = writeln!(self.out, "}}");
        let _ = writeln!(self.out);

        if let Some(cfg) = &cfg {
            let _ = writeln!(self.out, "{cfg}");
        }
        let _ = writeln!(self.out, "const _: fn() = || {{");
        let _ = writeln!(self.out, "    fn assert_exportable<T: {rt}::Exportable>() {{}}");
        let _ = writeln!(self.out, "    assert_exportable::<{target}>();");
        let _ = writeln!(self.out, "}};");
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn field_source(&self, field: &Field) -> String {
        let rt = &self.config.runtime_path;
        let key = &field.name;
        let access = field_access(&field.name);
        match &field.kind {
            FieldKind::Scalar { scalar } => {
                let ctor = constructor(*scalar);
                let value = match scalar {
                    ScalarKind::String => format!("self.{access}.clone()"),
                    _ => format!("self.{access}"),
                };
                format!("attrs.push({rt}::KeyValue::{ctor}({key:?}, {value}));")
            }
            FieldKind::List { element } => {
                let ctor = constructor(*element);
                format!("attrs.push({rt}::KeyValue::{ctor}_slice({key:?}, self.{access}.clone()));")
            }
            FieldKind::Embedded { .. } => {
                format!("attrs.extend({rt}::Exportable::attributes(&self.{access}));")
            }
        }
    }
}

/// Render the generated source for one record.
pub fn render(schema: &RecordSchema, config: &CodeConfig) -> String {
    let mut cg = Codegen::new(config);
    cg.emit(schema);
    cg.into_string()
}

/// `<type>_attributes_generated.rs`, lower-cased.
pub fn file_name(type_name: &str) -> String {
    format!("{}_attributes_generated.rs", type_name.to_lowercase())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn constructor(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::String => "string",
        ScalarKind::Int64 => "int64",
        ScalarKind::Float64 => "float64",
        ScalarKind::Bool => "bool",
    }
}

fn type_path(schema: &RecordSchema) -> String {
    format!("{}::{}", schema.record.module, schema.record.name)
}

// keywords need the raw form to be usable as field names
fn field_access(name: &str) -> String {
    if syn::parse_str::<syn::Ident>(name).is_ok() || name.starts_with("r#") {
        name.to_string()
    } else {
        format!("r#{name}")
    }
}

fn cfg_attribute(features: &[String]) -> Option<String> {
    let preds: Vec<String> = features.iter().map(|f| format!("feature = {f:?}")).collect();
    match preds.len() {
        0 => None,
        1 => Some(format!("#[cfg({})]", preds[0])),
        _ => Some(format!("#[cfg(all({}))]", preds.join(", "))),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
