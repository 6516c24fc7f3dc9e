// Records exercised end to end. The tests include this file at the crate
// root, so `crate::Data` names the struct below.

use telemetry_codegen::Record;

#[derive(Debug, Default, Record)]
pub struct Data {
    /// SomeString is a string field.
    pub some_string: String,
    /// SomeInt is an int64 field.
    pub some_int: i64,
    #[telemetry(embed)]
    pub another: Another,
}

#[derive(Debug, Default, Record)]
pub struct Another {
    /// Y is a string field.
    pub y: String,
}

/// Covers the remaining kinds and the discriminator.
#[derive(Debug, Default, Record)]
pub struct Sample {
    /// Ratio of something.
    pub ratio: f64,
    /// Enabled reports whether something is on.
    pub enabled: bool,
    /// Counts is a list of int64.
    pub counts: Vec<i64>,
    /// Names is a list of strings.
    pub names: Vec<String>,
}
