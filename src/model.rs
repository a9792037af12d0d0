//! The canonical API signature model
//!
//! Entities reference each other through copyable ids into the arenas held by
//! [`Model`], so cyclic structures (a class and its members, a type variable
//! bounded by its own declaration) need no shared ownership.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::pool::{FieldPool, TypePool};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                $name(index as u32)
            }

            /// Position of this entry within its arena
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Handle to a [`ClassDefinition`] in the [`TypePool`]
    ClassId
);
define_id!(
    /// Handle to a pooled [`TypeReference`]
    TypeId
);
define_id!(
    /// Handle to a [`TypeVariableDefinition`]
    TypeVarId
);
define_id!(
    /// Handle to a [`FieldDefinition`] in the [`FieldPool`]
    FieldId
);
define_id!(
    /// Handle to an [`Executable`] (method or constructor)
    ExecutableId
);

/// A primitive java type, plus `void` for return types and class literals
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primitive {
    Boolean, // Z
    Byte,    // B
    Char,    // C
    Double,  // D
    Float,   // F
    Int,     // I
    Long,    // J
    Short,   // S
    Void,    // V
}

impl Primitive {
    /// All primitives, in pool order
    pub const ALL: [Primitive; 9] = [
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Char,
        Primitive::Double,
        Primitive::Float,
        Primitive::Int,
        Primitive::Long,
        Primitive::Short,
        Primitive::Void,
    ];

    pub fn from_descriptor(c: char) -> Option<Self> {
        Some(match c {
            'Z' => Primitive::Boolean,
            'B' => Primitive::Byte,
            'C' => Primitive::Char,
            'D' => Primitive::Double,
            'F' => Primitive::Float,
            'I' => Primitive::Int,
            'J' => Primitive::Long,
            'S' => Primitive::Short,
            'V' => Primitive::Void,
            _ => return None,
        })
    }

    pub fn java_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Double => "double",
            Primitive::Float => "float",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Short => "short",
            Primitive::Void => "void",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.java_name())
    }
}

/// The category of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

/// Source-level modifiers of classes and members
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Synchronized,
    Volatile,
    Transient,
    Native,
    Abstract,
    Strictfp,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Synchronized => "synchronized",
            Modifier::Volatile => "volatile",
            Modifier::Transient => "transient",
            Modifier::Native => "native",
            Modifier::Abstract => "abstract",
            Modifier::Strictfp => "strictfp",
        };
        f.write_str(name)
    }
}

/// A reference to a type, canonicalized by the [`TypePool`]
///
/// Two equal `TypeReference`s always share one [`TypeId`], so id equality is
/// structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeReference {
    Primitive(Primitive),
    Array(TypeId),
    Class(ClassId),
    Parameterized {
        /// Enclosing parameterized type, for `Outer<T>.Inner<U>`
        owner: Option<TypeId>,
        /// Always a [`TypeReference::Class`]
        raw: TypeId,
        arguments: Vec<TypeId>,
    },
    Wildcard {
        lower_bound: Option<TypeId>,
        upper_bounds: Vec<TypeId>,
    },
    TypeVariable(TypeVarId),
}

/// A class, method or constructor that can introduce type variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GenericDeclaration {
    Class(ClassId),
    Executable(ExecutableId),
}

/// A formal type parameter, scoped to the declaration that introduced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeVariableDefinition {
    pub name: String,
    pub declaration: GenericDeclaration,
    pub upper_bounds: Vec<TypeId>,
}

/// Initialization state of a pooled [`ClassDefinition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassState {
    /// Created to satisfy a reference; its shape is not known yet
    Placeholder,
    /// Fully converted from its raw record
    Initialized,
    /// Never initialized during the run (filtered out or absent from the
    /// input); all collections are empty
    External,
}

/// A class, interface, enum or annotation type
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    /// Dotted package name (`java.util`)
    pub package: String,
    /// Binary simple name (`Map$Entry`)
    pub name: String,
    pub state: ClassState,
    pub kind: Kind,
    pub modifiers: BTreeSet<Modifier>,
    pub declaring_class: Option<ClassId>,
    pub superclass: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    pub type_parameters: Vec<TypeVarId>,
    pub fields: Vec<FieldId>,
    pub enum_constants: Vec<FieldId>,
    pub annotation_fields: Vec<FieldId>,
    pub constructors: Vec<ExecutableId>,
    pub methods: Vec<ExecutableId>,
    pub inner_classes: BTreeSet<ClassId>,
    pub annotations: Vec<Annotation>,
}

impl ClassDefinition {
    pub(crate) fn placeholder(package: &str, name: &str) -> Self {
        ClassDefinition {
            package: package.to_string(),
            name: name.to_string(),
            state: ClassState::Placeholder,
            kind: Kind::Class,
            modifiers: BTreeSet::new(),
            declaring_class: None,
            superclass: None,
            interfaces: Vec::new(),
            type_parameters: Vec::new(),
            fields: Vec::new(),
            enum_constants: Vec::new(),
            annotation_fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            inner_classes: BTreeSet::new(),
            annotations: Vec::new(),
        }
    }

    /// Fully-qualified name in source form (`java.util.Map.Entry`)
    pub fn qualified_name(&self) -> String {
        let name = self.name.replace('$', ".");
        if self.package.is_empty() {
            name
        } else {
            format!("{}.{}", self.package, name)
        }
    }

    /// Last segment of the binary name (`Entry` for `Map$Entry`)
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('$').next().unwrap_or(&self.name)
    }

    pub fn is_placeholder(&self) -> bool {
        self.state == ClassState::Placeholder
    }
}

/// What a pooled [`FieldDefinition`] represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Field,
    EnumConstant,
    AnnotationField,
}

/// A field, enum constant or annotation field, canonicalized by the
/// [`FieldPool`] on `(declaring class, name)`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
    pub declaring_class: ClassId,
    pub modifiers: BTreeSet<Modifier>,
    /// `None` while the node has only been referenced, never declared
    pub ty: Option<TypeId>,
    pub annotations: Vec<Annotation>,
    /// Annotation fields only
    pub default_value: Option<AnnotationValue>,
}

/// Distinguishes constructors from methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableKind {
    Constructor,
    Method { return_type: TypeId },
}

/// A method or constructor
#[derive(Debug, Clone, PartialEq)]
pub struct Executable {
    pub name: String,
    pub kind: ExecutableKind,
    pub declaring_class: ClassId,
    pub modifiers: BTreeSet<Modifier>,
    pub type_parameters: Vec<TypeVarId>,
    pub parameters: Vec<Parameter>,
    pub exceptions: Vec<TypeId>,
    pub annotations: Vec<Annotation>,
}

impl Executable {
    pub fn is_constructor(&self) -> bool {
        self.kind == ExecutableKind::Constructor
    }

    pub fn return_type(&self) -> Option<TypeId> {
        match self.kind {
            ExecutableKind::Method { return_type } => Some(return_type),
            ExecutableKind::Constructor => None,
        }
    }
}

/// A formal parameter of an [`Executable`]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub ty: TypeId,
    pub annotations: Vec<Annotation>,
}

/// An annotation instance
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Reference to the annotation type
    pub ty: TypeId,
    pub elements: Vec<AnnotationElement>,
}

/// One `name = value` pair, keyed by the declaring annotation field
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationElement {
    pub field: FieldId,
    pub value: AnnotationValue,
}

/// A value stored in an annotation element or as an annotation default
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
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
    Array(Vec<AnnotationValue>),
    Annotation(Box<Annotation>),
    Field(FieldId),
    EnumConstant(FieldId),
    /// Class literal
    Type(TypeId),
}

/// A package and the classes published in it
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub classes: BTreeSet<ClassId>,
    /// Harvested from the package's `package-info` pseudo class
    pub annotations: Vec<Annotation>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Package {
            name: name.into(),
            classes: BTreeSet::new(),
            annotations: Vec::new(),
        }
    }
}

/// Arenas backing every id in an [`Api`]
#[derive(Debug, Default)]
pub struct Model {
    pub(crate) types: TypePool,
    pub(crate) fields: FieldPool,
    pub(crate) executables: Vec<Executable>,
}

impl Model {
    pub fn types(&self) -> &TypePool {
        &self.types
    }

    pub fn fields(&self) -> &FieldPool {
        &self.fields
    }

    pub fn class(&self, id: ClassId) -> &ClassDefinition {
        self.types.class(id)
    }

    pub fn type_ref(&self, id: TypeId) -> &TypeReference {
        self.types.type_ref(id)
    }

    pub fn type_variable(&self, id: TypeVarId) -> &TypeVariableDefinition {
        self.types.type_variable(id)
    }

    pub fn field(&self, id: FieldId) -> &FieldDefinition {
        self.fields.field(id)
    }

    pub fn executable(&self, id: ExecutableId) -> &Executable {
        &self.executables[id.index()]
    }

    /// Render a type in java source form, e.g. `java.util.List<? extends T>`
    pub fn display_type(&self, id: TypeId) -> String {
        match self.type_ref(id) {
            TypeReference::Primitive(p) => p.java_name().to_string(),
            TypeReference::Array(element) => format!("{}[]", self.display_type(*element)),
            TypeReference::Class(class) => self.class(*class).qualified_name(),
            TypeReference::Parameterized {
                owner,
                raw,
                arguments,
            } => {
                let mut out = match (owner, self.type_ref(*raw)) {
                    (Some(owner), TypeReference::Class(class)) => format!(
                        "{}.{}",
                        self.display_type(*owner),
                        self.class(*class).simple_name()
                    ),
                    _ => self.display_type(*raw),
                };
                if !arguments.is_empty() {
                    let arguments: Vec<String> =
                        arguments.iter().map(|a| self.display_type(*a)).collect();
                    out.push('<');
                    out.push_str(&arguments.join(", "));
                    out.push('>');
                }
                out
            }
            TypeReference::Wildcard {
                lower_bound: Some(lower),
                ..
            } => format!("? super {}", self.display_type(*lower)),
            TypeReference::Wildcard {
                lower_bound: None,
                upper_bounds,
            } => {
                let bounds: Vec<String> = upper_bounds
                    .iter()
                    .map(|b| self.display_type(*b))
                    .filter(|b| b != "java.lang.Object")
                    .collect();
                if bounds.is_empty() {
                    "?".to_string()
                } else {
                    format!("? extends {}", bounds.join(" & "))
                }
            }
            TypeReference::TypeVariable(var) => self.type_variable(*var).name.clone(),
        }
    }
}

/// The root of a converted API surface
#[derive(Debug)]
pub struct Api {
    name: String,
    packages: BTreeMap<String, Package>,
    model: Model,
}

impl Api {
    pub(crate) fn new(name: String, packages: BTreeMap<String, Package>, model: Model) -> Self {
        Api {
            name,
            packages,
            model,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// Look up a class published in the API by package and binary name
    pub fn find_class(&self, package: &str, name: &str) -> Option<ClassId> {
        let id = self.model.types.find_class(package, name)?;
        self.packages
            .get(package)
            .filter(|p| p.classes.contains(&id))
            .map(|_| id)
    }

    pub fn class(&self, id: ClassId) -> &ClassDefinition {
        self.model.class(id)
    }

    pub fn type_ref(&self, id: TypeId) -> &TypeReference {
        self.model.type_ref(id)
    }

    pub fn type_variable(&self, id: TypeVarId) -> &TypeVariableDefinition {
        self.model.type_variable(id)
    }

    pub fn field(&self, id: FieldId) -> &FieldDefinition {
        self.model.field(id)
    }

    pub fn executable(&self, id: ExecutableId) -> &Executable {
        self.model.executable(id)
    }

    pub fn display_type(&self, id: TypeId) -> String {
        self.model.display_type(id)
    }

    pub(crate) fn retain_packages<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.packages.retain(|name, _| keep(name));
    }
}
