// Parsed by tests/parser.rs, never compiled.

pub mod telemetry;

pub trait SomeTrait {}

pub enum Kind {
    A,
    B,
}

pub type IntType = i32;

struct Hidden {}

pub struct SomeStruct {}

pub struct Base {
    /// BaseField is a float64 field.
    /// More comments.
    pub base_field: f64,
}

pub struct TupleRecord(pub i64);

pub struct DataUnexportedBasicTypeField {
    /// ClusterID is the id of the cluster.
    cluster_id: String,
}

pub struct DataUnexportedListField {
    /// SomeStrings is a list of strings.
    some_strings: Vec<String>,
}

pub struct DataUnexportedEmbeddedStructField {
    #[telemetry(embed)]
    hidden: Hidden,
}

pub struct DataNotEmbeddedStructField {
    pub some_field: SomeStruct,
}

pub struct DataEmbeddedEnum {
    #[telemetry(embed)]
    pub kind: Kind,
}

pub struct DataEmbeddedTrait {
    #[telemetry(embed)]
    pub some_trait: SomeTrait,
}

pub struct UnsupportedEmbeddedType {
    #[telemetry(embed)]
    pub int_type: IntType,
}

pub struct EmbeddedBasicType {
    #[telemetry(embed)]
    pub int64: i64,
}

pub struct UnsupportedBasicType {
    /// Counter is a counter.
    pub counter: i32,
}

pub struct MissingBasicFieldDocString {
    pub counter: i64,
}

pub struct MissingListFieldDocString {
    pub counters: Vec<i64>,
}

pub struct EmptyFieldDocString {
    ///
    pub counter: i64,
}

pub struct UnsupportedListType {
    /// Structs is a list of structs.
    pub structs: Vec<SomeStruct>,
}

pub struct UnsupportedBasicTypeList {
    /// Counters is a list of counters.
    pub counters: Vec<i32>,
}

pub struct OptionalField {
    /// Maybe is optional.
    pub maybe: Option<i64>,
}

pub struct Dup {
    /// Counter is a counter.
    pub counter: i64,
}

pub struct DuplicateFields {
    /// Counter is a counter.
    pub counter: i64,
    #[telemetry(embed)]
    pub dup: Dup,
}

#[cfg(feature = "generator")]
pub struct Gated {
    /// A is only seen with the generator feature.
    pub a: i64,
}

#[cfg(not(feature = "generator"))]
pub struct Gated {
    /// B is seen without it.
    pub b: bool,
}
