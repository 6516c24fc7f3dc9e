//! Schema-driven code generation for telemetry records.
//!
//! A record is a plain struct whose fields are basic types, lists of basic
//! types, or embedded records. From its declaration this crate produces:
//!
//! - an implementation of [`Exportable`] that turns a value into an ordered
//!   list of [`KeyValue`] attributes ([`codegen`]);
//! - an Avro IDL document describing the flattened wire record ([`idl`]).
//!
//! Declarations come from Rust source or from a manifest file
//! ([`frontend`]); [`extract`] validates them into a [`ir::RecordSchema`]
//! that both renderers consume.

pub mod attribute;
pub mod cli;
pub mod codegen;
pub mod decl;
pub mod docs;
pub mod error;
pub mod extract;
pub mod frontend;
pub mod generate;
pub mod idl;
pub mod ir;

pub use attribute::{Exportable, KeyValue, Value};
pub use error::{DocError, ExtractError, IdlError, LoadError, ValidationError, ValidationErrorKind};
pub use telemetry_codegen_macros::Record;
