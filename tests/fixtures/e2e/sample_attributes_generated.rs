// This is a generated file. DO NOT EDIT.
// Source: crate::Sample

impl ::telemetry_codegen::Exportable for crate::Sample {
    fn attributes(&self) -> ::std::vec::Vec<::telemetry_codegen::KeyValue> {
        let mut attrs = ::std::vec::Vec::new();
        attrs.push(::telemetry_codegen::KeyValue::string("dataType", "sample-data"));
        attrs.push(::telemetry_codegen::KeyValue::float64("ratio", self.ratio));
        attrs.push(::telemetry_codegen::KeyValue::bool("enabled", self.enabled));
        attrs.push(::telemetry_codegen::KeyValue::int64_slice("counts", self.counts.clone()));
        attrs.push(::telemetry_codegen::KeyValue::string_slice("names", self.names.clone()));
        attrs
    }
}

const _: fn() = || {
    fn assert_exportable<T: ::telemetry_codegen::Exportable>() {}
    assert_exportable::<crate::Sample>();
};
