use apisig::{
    raw::{markers, RawAnnotation, RawValue},
    Api, ClassConverter, ConversionOptions, Visibility,
};

/// Signature marker, split into fragments the way compilers emit them
#[allow(dead_code)]
pub fn signature(fragments: &[&str]) -> RawAnnotation {
    RawAnnotation::new(markers::SIGNATURE).with_element(
        markers::VALUE,
        RawValue::Array(
            fragments
                .iter()
                .map(|f| RawValue::String(f.to_string()))
                .collect(),
        ),
    )
}

#[allow(dead_code)]
pub fn throws(exceptions: &[&str]) -> RawAnnotation {
    type_list(markers::THROWS, exceptions)
}

#[allow(dead_code)]
pub fn member_classes(members: &[&str]) -> RawAnnotation {
    type_list(markers::MEMBER_CLASSES, members)
}

fn type_list(marker: &str, descriptors: &[&str]) -> RawAnnotation {
    RawAnnotation::new(marker).with_element(
        markers::VALUE,
        RawValue::Array(
            descriptors
                .iter()
                .map(|d| RawValue::Type(d.to_string()))
                .collect(),
        ),
    )
}

#[allow(dead_code)]
pub fn enclosing_class(outer: &str) -> RawAnnotation {
    RawAnnotation::new(markers::ENCLOSING_CLASS)
        .with_element(markers::VALUE, RawValue::Type(outer.to_string()))
}

#[allow(dead_code)]
pub fn enclosing_method() -> RawAnnotation {
    RawAnnotation::new(markers::ENCLOSING_METHOD)
}

/// AnnotationDefault marker for an annotation type named `annotation_type`
#[allow(dead_code)]
pub fn annotation_default(annotation_type: &str, defaults: Vec<(&str, RawValue)>) -> RawAnnotation {
    let mut nested = RawAnnotation::new(annotation_type);
    for (name, value) in defaults {
        nested = nested.with_element(name, value);
    }
    RawAnnotation::new(markers::ANNOTATION_DEFAULT)
        .with_element(markers::VALUE, RawValue::Annotation(nested))
}

#[allow(dead_code)]
pub fn convert(classes: &[apisig::raw::RawClass], visibility: Visibility) -> Api {
    ClassConverter::new(ConversionOptions { visibility })
        .convert("test", classes)
        .unwrap_or_else(|e| panic!("{:#?}", e))
}
