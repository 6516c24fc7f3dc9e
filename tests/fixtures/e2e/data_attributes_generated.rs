// This is a generated file. DO NOT EDIT.
// Source: crate::Data

impl ::telemetry_codegen::Exportable for crate::Data {
    fn attributes(&self) -> ::std::vec::Vec<::telemetry_codegen::KeyValue> {
        let mut attrs = ::std::vec::Vec::new();
        attrs.push(::telemetry_codegen::KeyValue::string("some_string", self.some_string.clone()));
        attrs.push(::telemetry_codegen::KeyValue::int64("some_int", self.some_int));
        attrs.extend(::telemetry_codegen::Exportable::attributes(&self.another));
        attrs
    }
}

const _: fn() = || {
    fn assert_exportable<T: ::telemetry_codegen::Exportable>() {}
    assert_exportable::<crate::Data>();
};
