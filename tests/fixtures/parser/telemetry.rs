use super::Base;

pub struct MoreData {
    /// StringField is a string field.
    pub string_field: String,
    #[telemetry(embed)]
    pub base: Base,
    /** Flags is a list of bools. */
    pub flags: Vec<bool>,
    #[cfg(feature = "extra")]
    /// Extra only exists with the extra feature.
    pub extra: i64,
}
