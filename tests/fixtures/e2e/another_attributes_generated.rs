// This is a generated file. DO NOT EDIT.
// Source: crate::Another

impl ::telemetry_codegen::Exportable for crate::Another {
    fn attributes(&self) -> ::std::vec::Vec<::telemetry_codegen::KeyValue> {
        let mut attrs = ::std::vec::Vec::new();
        attrs.push(::telemetry_codegen::KeyValue::string("y", self.y.clone()));
        attrs
    }
}

const _: fn() = || {
    fn assert_exportable<T: ::telemetry_codegen::Exportable>() {}
    assert_exportable::<crate::Another>();
};
