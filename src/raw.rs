//! Raw class records as delivered by a container reader
//!
//! These mirror what a DEX reader exposes: names are type descriptors
//! (`Ljava/lang/String;`, `[I`), modifiers are the raw access-flag bits and
//! everything a richer class-file format would carry natively (generic
//! signatures, throws clauses, nesting) arrives as one of the reserved
//! [`markers`] annotations.

/// Access-flag bits as found in class files and DEX containers
pub mod flags {
    pub const PUBLIC: u32 = 0x0001;
    pub const PRIVATE: u32 = 0x0002;
    pub const PROTECTED: u32 = 0x0004;
    pub const STATIC: u32 = 0x0008;
    pub const FINAL: u32 = 0x0010;
    pub const SYNCHRONIZED: u32 = 0x0020;
    /// Fields only; shares its bit with `BRIDGE` on methods
    pub const VOLATILE: u32 = 0x0040;
    pub const BRIDGE: u32 = 0x0040;
    /// Fields only; shares its bit with `VARARGS` on methods
    pub const TRANSIENT: u32 = 0x0080;
    pub const VARARGS: u32 = 0x0080;
    pub const NATIVE: u32 = 0x0100;
    pub const INTERFACE: u32 = 0x0200;
    pub const ABSTRACT: u32 = 0x0400;
    pub const STRICT: u32 = 0x0800;
    pub const SYNTHETIC: u32 = 0x1000;
    pub const ANNOTATION: u32 = 0x2000;
    pub const ENUM: u32 = 0x4000;
    pub const CONSTRUCTOR: u32 = 0x10000;
    pub const DECLARED_SYNCHRONIZED: u32 = 0x20000;
}

/// Reserved annotation types standing in for class-file attributes
pub mod markers {
    /// Every annotation under this prefix is reader metadata, never API
    pub const PREFIX: &str = "Ldalvik/annotation/";

    pub const SIGNATURE: &str = "Ldalvik/annotation/Signature;";
    pub const THROWS: &str = "Ldalvik/annotation/Throws;";
    pub const ANNOTATION_DEFAULT: &str = "Ldalvik/annotation/AnnotationDefault;";
    pub const ENCLOSING_CLASS: &str = "Ldalvik/annotation/EnclosingClass;";
    pub const ENCLOSING_METHOD: &str = "Ldalvik/annotation/EnclosingMethod;";
    pub const MEMBER_CLASSES: &str = "Ldalvik/annotation/MemberClasses;";

    /// Name of the element carrying a marker's payload
    pub const VALUE: &str = "value";

    /// Whether an annotation type is reader metadata rather than API
    pub fn is_marker(type_name: &str) -> bool {
        type_name.starts_with(PREFIX)
    }
}

/// Descriptor of the root of the class hierarchy
pub const OBJECT_DESCRIPTOR: &str = "Ljava/lang/Object;";

/// Simple name of the pseudo class carrying package-level annotations
pub const PACKAGE_INFO: &str = "package-info";

/// Reserved name of instance constructors
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Reserved name of static initializers
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";

/// Split a class descriptor into its dotted package and binary simple name
///
/// `Lcom/example/Outer$Inner;` becomes `("com.example", "Outer$Inner")`.
/// Returns `None` for anything that is not a class descriptor.
pub fn class_name_parts(descriptor: &str) -> Option<(String, String)> {
    let body = descriptor.strip_prefix('L')?.strip_suffix(';')?;
    if body.is_empty() || body.starts_with('/') || body.ends_with('/') {
        return None;
    }
    match body.rsplit_once('/') {
        Some((package, name)) => Some((package.replace('/', "."), name.to_string())),
        None => Some((String::new(), body.to_string())),
    }
}

/// A compiled class as produced by the container reader
///
/// `access_flags` are the effective flags of the class, i.e. for a member
/// class the flags recorded for it by its enclosing class (which is where
/// `STATIC`, `PRIVATE` and `PROTECTED` live for nested classes).
#[derive(Debug, Clone, PartialEq)]
pub struct RawClass {
    /// Type descriptor, e.g. `Ljava/util/Map$Entry;`
    pub name: String,
    pub access_flags: u32,
    /// Superclass descriptor (`None` only for `java.lang.Object`)
    pub superclass: Option<String>,
    /// Interface descriptors in declaration order
    pub interfaces: Vec<String>,
    pub fields: Vec<RawField>,
    pub methods: Vec<RawMethod>,
    pub annotations: Vec<RawAnnotation>,
}

impl RawClass {
    /// Create a class record with no supertypes or members
    pub fn new(name: impl Into<String>, access_flags: u32) -> Self {
        RawClass {
            name: name.into(),
            access_flags,
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_field(mut self, field: RawField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: RawMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Binary simple name (`Outer$Inner`), empty for a malformed descriptor
    pub fn simple_name(&self) -> String {
        class_name_parts(&self.name)
            .map(|(_, name)| name)
            .unwrap_or_default()
    }

    pub fn find_annotation(&self, type_name: &str) -> Option<&RawAnnotation> {
        find_annotation(&self.annotations, type_name)
    }
}

/// A field of a [`RawClass`]
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub name: String,
    pub access_flags: u32,
    /// Type descriptor
    pub type_name: String,
    pub annotations: Vec<RawAnnotation>,
    pub is_enum_constant: bool,
}

impl RawField {
    pub fn new(name: impl Into<String>, access_flags: u32, type_name: impl Into<String>) -> Self {
        RawField {
            name: name.into(),
            access_flags,
            type_name: type_name.into(),
            annotations: Vec::new(),
            is_enum_constant: false,
        }
    }

    /// Mark this field as a constant of its enum class
    pub fn enum_constant(mut self) -> Self {
        self.is_enum_constant = true;
        self
    }

    pub fn with_annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A method or constructor of a [`RawClass`]
#[derive(Debug, Clone, PartialEq)]
pub struct RawMethod {
    /// Method name, or one of the reserved `<init>` / `<clinit>` names
    pub name: String,
    pub access_flags: u32,
    pub parameters: Vec<RawParameter>,
    /// Return type descriptor (`V` for constructors)
    pub return_type: String,
    pub annotations: Vec<RawAnnotation>,
}

impl RawMethod {
    pub fn new(name: impl Into<String>, access_flags: u32, return_type: impl Into<String>) -> Self {
        RawMethod {
            name: name.into(),
            access_flags,
            parameters: Vec::new(),
            return_type: return_type.into(),
            annotations: Vec::new(),
        }
    }

    /// Create an instance constructor record
    pub fn constructor(access_flags: u32) -> Self {
        RawMethod::new(CONSTRUCTOR_NAME, access_flags | flags::CONSTRUCTOR, "V")
    }

    pub fn with_parameter(mut self, parameter: RawParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name == STATIC_INITIALIZER_NAME
    }
}

/// A single formal parameter of a [`RawMethod`]
#[derive(Debug, Clone, PartialEq)]
pub struct RawParameter {
    /// Type descriptor
    pub type_name: String,
    pub annotations: Vec<RawAnnotation>,
}

impl RawParameter {
    pub fn new(type_name: impl Into<String>) -> Self {
        RawParameter {
            type_name: type_name.into(),
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: RawAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// An annotation instance attached to a class, member or parameter
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnnotation {
    /// Descriptor of the annotation type
    pub type_name: String,
    pub elements: Vec<RawAnnotationElement>,
}

impl RawAnnotation {
    pub fn new(type_name: impl Into<String>) -> Self {
        RawAnnotation {
            type_name: type_name.into(),
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, name: impl Into<String>, value: RawValue) -> Self {
        self.elements.push(RawAnnotationElement {
            name: name.into(),
            value,
        });
        self
    }

    pub fn element(&self, name: &str) -> Option<&RawValue> {
        self.elements
            .iter()
            .find(|element| element.name == name)
            .map(|element| &element.value)
    }
}

/// One `name = value` pair of a [`RawAnnotation`]
#[derive(Debug, Clone, PartialEq)]
pub struct RawAnnotationElement {
    pub name: String,
    pub value: RawValue,
}

/// Reference to a field or enum constant from an annotation value
#[derive(Debug, Clone, PartialEq)]
pub struct RawMemberRef {
    /// Descriptor of the declaring class
    pub declaring_class: String,
    pub name: String,
    /// Descriptor of the member's type
    pub type_name: String,
}

/// An encoded annotation value
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Int(i32),
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Double(f64),
    Float(f32),
    Long(i64),
    Null,
    String(String),
    Short(i16),
    Array(Vec<RawValue>),
    Annotation(RawAnnotation),
    Field(RawMemberRef),
    Enum(RawMemberRef),
    /// Class literal, as a type descriptor
    Type(String),
}

pub(crate) fn find_annotation<'a>(
    annotations: &'a [RawAnnotation],
    type_name: &str,
) -> Option<&'a RawAnnotation> {
    annotations.iter().find(|a| a.type_name == type_name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_class_name_parts() {
        assert_eq!(
            class_name_parts("Ljava/util/Map$Entry;"),
            Some(("java.util".to_string(), "Map$Entry".to_string()))
        );
        assert_eq!(
            class_name_parts("LTopLevel;"),
            Some((String::new(), "TopLevel".to_string()))
        );
        assert_eq!(class_name_parts("I"), None);
        assert_eq!(class_name_parts("[Ljava/lang/String;"), None);
        assert_eq!(class_name_parts("Ljava/lang/String"), None);
        assert_eq!(class_name_parts("L;"), None);
        assert_eq!(class_name_parts("L/java/Foo;"), None);
    }

    #[test]
    fn test_markers() {
        assert!(markers::is_marker(markers::SIGNATURE));
        assert!(markers::is_marker("Ldalvik/annotation/InnerClass;"));
        assert!(!markers::is_marker("Ljava/lang/Deprecated;"));
    }
}
