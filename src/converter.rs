//! Conversion of raw class records into the canonical model
//!
//! [`ClassConverter::convert`] runs in phases over the complete input set:
//!
//! 1. group the raw classes by package
//! 2. convert every visible class (and each package's `package-info`)
//! 3. move `package-info` annotations onto their package
//! 4. link member classes that survived visibility filtering
//! 5. drop classes nested, at any depth, inside an invisible class
//!
//! Classes can also be converted out of order: resolving a type variable may
//! need the type parameters of an enclosing class that has not been reached
//! yet, in which case [`ConversionContext`] converts it on demand.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::errors::{Error, Result};
use crate::model::{
    Annotation, AnnotationElement, AnnotationValue, Api, ClassId, ClassState, Executable,
    ExecutableId, ExecutableKind, FieldId, FieldKind, Kind, Model, Modifier, Package, Parameter,
    Primitive,
};
use crate::pool::{FieldPool, TypePool};
use crate::raw::{
    self, class_name_parts, flags, markers, RawAnnotation, RawClass, RawField, RawMethod,
    RawParameter, RawValue,
};
use crate::signature::{GenericSignatureParser, SignatureContext};
use crate::visibility::{Visibility, VisibilityPolicy};

/// Options for a conversion run
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Widest access level included in the output (default: public)
    pub visibility: Visibility,
}

impl Kind {
    /// Enum wins over annotation, which wins over interface (an annotation
    /// type is also flagged as an interface)
    pub fn from_access_flags(access_flags: u32) -> Kind {
        if access_flags & flags::ENUM != 0 {
            Kind::Enum
        } else if access_flags & flags::ANNOTATION != 0 {
            Kind::Annotation
        } else if access_flags & flags::INTERFACE != 0 {
            Kind::Interface
        } else {
            Kind::Class
        }
    }
}

fn common_modifiers(access_flags: u32) -> BTreeSet<Modifier> {
    let mut modifiers = BTreeSet::new();
    for (mask, modifier) in [
        (flags::PUBLIC, Modifier::Public),
        (flags::PROTECTED, Modifier::Protected),
        (flags::PRIVATE, Modifier::Private),
        (flags::STATIC, Modifier::Static),
        (flags::FINAL, Modifier::Final),
        (flags::ABSTRACT, Modifier::Abstract),
        (flags::STRICT, Modifier::Strictfp),
    ] {
        if access_flags & mask != 0 {
            modifiers.insert(modifier);
        }
    }
    modifiers
}

fn class_modifiers(access_flags: u32) -> BTreeSet<Modifier> {
    common_modifiers(access_flags)
}

fn field_modifiers(access_flags: u32) -> BTreeSet<Modifier> {
    let mut modifiers = common_modifiers(access_flags);
    if access_flags & flags::VOLATILE != 0 {
        modifiers.insert(Modifier::Volatile);
    }
    if access_flags & flags::TRANSIENT != 0 {
        modifiers.insert(Modifier::Transient);
    }
    modifiers
}

fn method_modifiers(access_flags: u32) -> BTreeSet<Modifier> {
    let mut modifiers = common_modifiers(access_flags);
    if access_flags & (flags::SYNCHRONIZED | flags::DECLARED_SYNCHRONIZED) != 0 {
        modifiers.insert(Modifier::Synchronized);
    }
    if access_flags & flags::NATIVE != 0 {
        modifiers.insert(Modifier::Native);
    }
    modifiers
}

/// Concatenated payload of a Signature marker, if present
fn signature_of(annotations: &[RawAnnotation]) -> Result<Option<String>> {
    let Some(marker) = raw::find_annotation(annotations, markers::SIGNATURE) else {
        return Ok(None);
    };
    match marker.element(markers::VALUE) {
        Some(RawValue::String(signature)) => Ok(Some(signature.clone())),
        Some(RawValue::Array(parts)) => parts
            .iter()
            .map(|part| match part {
                RawValue::String(s) => Ok(s.as_str()),
                other => Err(Error::InvariantViolation(format!(
                    "Signature marker holds a non-string fragment: {other:?}"
                ))),
            })
            .collect::<Result<String>>()
            .map(Some),
        other => Err(Error::InvariantViolation(format!(
            "Malformed Signature marker value: {other:?}"
        ))),
    }
}

/// Type descriptors listed by a marker whose value is an array of class
/// literals (Throws, MemberClasses)
fn type_list_of<'a>(annotations: &'a [RawAnnotation], marker: &str) -> Result<Vec<&'a str>> {
    let Some(annotation) = raw::find_annotation(annotations, marker) else {
        return Ok(Vec::new());
    };
    match annotation.element(markers::VALUE) {
        Some(RawValue::Array(values)) => values
            .iter()
            .map(|value| match value {
                RawValue::Type(descriptor) => Ok(descriptor.as_str()),
                other => Err(Error::InvariantViolation(format!(
                    "{marker} marker lists a non-type value: {other:?}"
                ))),
            })
            .collect(),
        other => Err(Error::InvariantViolation(format!(
            "Malformed {marker} marker value: {other:?}"
        ))),
    }
}

fn is_package_info(class: &RawClass) -> bool {
    class.simple_name() == raw::PACKAGE_INFO
}

/// State of one conversion run: the pools, the policy, the raw records
/// and the guard against re-entering a class that is being converted
pub struct ConversionContext<'r> {
    policy: VisibilityPolicy,
    types: TypePool,
    fields: FieldPool,
    executables: Vec<Executable>,
    raw_classes: HashMap<ClassId, &'r RawClass>,
    initializing: HashSet<ClassId>,
}

impl SignatureContext for ConversionContext<'_> {
    fn type_pool(&mut self) -> &mut TypePool {
        &mut self.types
    }

    fn initialize_class(&mut self, class: ClassId) -> Result<()> {
        if !self.types.class(class).is_placeholder() || self.initializing.contains(&class) {
            return Ok(());
        }
        let Some(raw) = self.raw_classes.get(&class).copied() else {
            log::trace!(
                "{} is not part of the input set",
                self.types.class(class).qualified_name()
            );
            return Ok(());
        };
        log::debug!("converting {}", raw.name);
        self.initializing.insert(class);
        let result = self.build_class(class, raw);
        self.initializing.remove(&class);
        result?;
        self.types.class_mut(class).state = ClassState::Initialized;
        Ok(())
    }
}

impl<'r> ConversionContext<'r> {
    /// Register every raw class with the pool, keyed by package and name
    pub fn new(policy: VisibilityPolicy, classes: &'r [RawClass]) -> Result<Self> {
        let mut types = TypePool::new();
        let mut raw_classes = HashMap::with_capacity(classes.len());
        for class in classes {
            let (package, name) = class_name_parts(&class.name).ok_or_else(|| {
                Error::InvariantViolation(format!("Malformed class name '{}'", class.name))
            })?;
            let id = types.get_class(&package, &name);
            if raw_classes.insert(id, class).is_some() {
                log::warn!("duplicate class record {}, keeping the last one", class.name);
            }
        }
        Ok(ConversionContext {
            policy,
            types,
            fields: FieldPool::new(),
            executables: Vec::new(),
            raw_classes,
            initializing: HashSet::new(),
        })
    }

    pub fn types(&self) -> &TypePool {
        &self.types
    }

    /// The raw record a pooled class was registered from, if any
    pub fn raw_class(&self, class: ClassId) -> Option<&'r RawClass> {
        self.raw_classes.get(&class).copied()
    }

    /// Finalize the pools and hand them over as a [`Model`]
    pub fn into_model(mut self) -> Model {
        self.types.finalize();
        Model {
            types: self.types,
            fields: self.fields,
            executables: self.executables,
        }
    }

    fn parser(&mut self) -> GenericSignatureParser<'_, Self> {
        GenericSignatureParser::new(self)
    }

    /// Resolve a class descriptor to its pooled class
    fn class_from_descriptor(&mut self, descriptor: &str) -> Result<ClassId> {
        let (package, name) = class_name_parts(descriptor).ok_or_else(|| {
            Error::InvariantViolation(format!("'{descriptor}' is not a class descriptor"))
        })?;
        Ok(self.types.get_class(&package, &name))
    }

    fn build_class(&mut self, id: ClassId, raw: &'r RawClass) -> Result<()> {
        let kind = Kind::from_access_flags(raw.access_flags);
        let declaring_class = self.enclosing_class(id, raw)?;
        {
            let class = self.types.class_mut(id);
            class.kind = kind;
            class.modifiers = class_modifiers(raw.access_flags);
            class.declaring_class = declaring_class;
        }

        self.convert_supertypes(id, raw, kind)?;

        let annotations = self.convert_annotations(&raw.annotations)?;
        self.types.class_mut(id).annotations = annotations;

        match kind {
            Kind::Annotation => self.convert_annotation_fields(id, raw)?,
            Kind::Enum => {
                self.convert_fields(id, raw, true)?;
                self.convert_executables(id, raw)?;
            }
            Kind::Class | Kind::Interface => {
                self.convert_fields(id, raw, false)?;
                self.convert_executables(id, raw)?;
            }
        }
        Ok(())
    }

    /// The declaring class named by an EnclosingClass marker, resolved in
    /// this class's package
    fn enclosing_class(&mut self, id: ClassId, raw: &RawClass) -> Result<Option<ClassId>> {
        let Some(marker) = raw.find_annotation(markers::ENCLOSING_CLASS) else {
            return Ok(None);
        };
        let Some(RawValue::Type(descriptor)) = marker.element(markers::VALUE) else {
            return Err(Error::InvariantViolation(format!(
                "Malformed EnclosingClass marker on {}",
                raw.name
            )));
        };
        let (_, name) = class_name_parts(descriptor).ok_or_else(|| {
            Error::InvariantViolation(format!(
                "Unresolvable enclosing class '{descriptor}' of {}",
                raw.name
            ))
        })?;
        let package = self.types.class(id).package.clone();
        Ok(Some(self.types.get_class(&package, &name)))
    }

    fn convert_supertypes(&mut self, id: ClassId, raw: &RawClass, kind: Kind) -> Result<()> {
        let is_interface = matches!(kind, Kind::Interface | Kind::Annotation);
        let (type_parameters, superclass, interfaces) = match signature_of(&raw.annotations)? {
            Some(signature) => {
                let parsed = self.parser().parse_for_class(id, &signature)?;
                let superclass = (!is_interface).then_some(parsed.superclass);
                (parsed.type_parameters, superclass, parsed.interfaces)
            }
            None => {
                let superclass = match &raw.superclass {
                    Some(name) if !is_interface && raw.name != raw::OBJECT_DESCRIPTOR => {
                        Some(self.parser().parse_non_generic_type(name)?)
                    }
                    _ => None,
                };
                let interfaces = raw
                    .interfaces
                    .iter()
                    .map(|name| self.parser().parse_non_generic_type(name))
                    .collect::<Result<Vec<_>>>()?;
                (Vec::new(), superclass, interfaces)
            }
        };
        let class = self.types.class_mut(id);
        class.type_parameters = type_parameters;
        class.superclass = superclass;
        class.interfaces = interfaces;
        Ok(())
    }

    fn convert_fields(&mut self, id: ClassId, raw: &RawClass, is_enum: bool) -> Result<()> {
        for field in &raw.fields {
            if !self.policy.is_visible(field.access_flags) {
                continue;
            }
            let mut modifiers = field_modifiers(field.access_flags);
            let field_id = if is_enum && field.is_enum_constant {
                modifiers.insert(Modifier::Static);
                self.fields.get_enum_constant(id, &field.name)
            } else {
                self.fields.get_field(id, &field.name)
            };
            self.declare_field(field_id, id, field, modifiers)?;

            let class = self.types.class_mut(id);
            if is_enum && field.is_enum_constant {
                class.enum_constants.push(field_id);
            } else {
                class.fields.push(field_id);
            }
        }
        Ok(())
    }

    fn declare_field(
        &mut self,
        field_id: FieldId,
        declaring_class: ClassId,
        raw: &RawField,
        modifiers: BTreeSet<Modifier>,
    ) -> Result<()> {
        let ty = match signature_of(&raw.annotations)? {
            Some(signature) => self.parser().parse_for_field(declaring_class, &signature)?,
            None => self.parser().parse_non_generic_type(&raw.type_name)?,
        };
        let annotations = self.convert_annotations(&raw.annotations)?;
        let field = self.fields.field_mut(field_id);
        field.modifiers = modifiers;
        field.ty = Some(ty);
        field.annotations = annotations;
        Ok(())
    }

    fn convert_annotation_fields(&mut self, id: ClassId, raw: &RawClass) -> Result<()> {
        let defaults = annotation_defaults(raw)?;
        for method in &raw.methods {
            if method.is_constructor()
                || method.is_static_initializer()
                || !self.policy.is_visible(method.access_flags)
            {
                continue;
            }
            let field_id = self.fields.get_annotation_field(id, &method.name);
            let ty = match signature_of(&method.annotations)? {
                Some(signature) => self.parser().parse_for_annotation_field(id, &signature)?,
                None => self
                    .parser()
                    .parse_non_generic_return_type(&method.return_type)?,
            };
            let default_value = match defaults.get(method.name.as_str()) {
                Some(value) => Some(self.convert_value(value)?),
                None => None,
            };
            let annotations = self.convert_annotations(&method.annotations)?;

            let field = self.fields.field_mut(field_id);
            field.kind = FieldKind::AnnotationField;
            field.modifiers = method_modifiers(method.access_flags);
            field.ty = Some(ty);
            field.annotations = annotations;
            field.default_value = default_value;
            self.types.class_mut(id).annotation_fields.push(field_id);
        }
        Ok(())
    }

    /// Constructors of non-static member classes take the enclosing instance
    /// as a hidden first parameter
    fn has_outer_instance_parameter(&self, id: ClassId) -> bool {
        let class = self.types.class(id);
        class.kind == Kind::Class
            && class.declaring_class.is_some()
            && !class.modifiers.contains(&Modifier::Static)
    }

    fn convert_executables(&mut self, id: ClassId, raw: &RawClass) -> Result<()> {
        for method in &raw.methods {
            if method.is_static_initializer() || !self.policy.is_visible(method.access_flags) {
                continue;
            }
            let executable = self.convert_executable(id, method)?;
            let class = self.types.class_mut(id);
            if method.is_constructor() {
                class.constructors.push(executable);
            } else {
                class.methods.push(executable);
            }
        }
        Ok(())
    }

    fn convert_executable(
        &mut self,
        declaring_class: ClassId,
        raw: &RawMethod,
    ) -> Result<ExecutableId> {
        let is_constructor = raw.is_constructor();
        let void = self.types.primitive(Primitive::Void);
        // Allocated up front: the signature's type variables are keyed on it
        let id = ExecutableId::new(self.executables.len());
        self.executables.push(Executable {
            name: raw.name.clone(),
            kind: if is_constructor {
                ExecutableKind::Constructor
            } else {
                ExecutableKind::Method { return_type: void }
            },
            declaring_class,
            modifiers: method_modifiers(raw.access_flags),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            exceptions: Vec::new(),
            annotations: Vec::new(),
        });

        let has_outer = is_constructor && self.has_outer_instance_parameter(declaring_class);
        let (type_parameters, parameter_types, return_type, mut exceptions, raw_parameters) =
            match signature_of(&raw.annotations)? {
                Some(signature) => {
                    let parsed = if is_constructor {
                        self.parser()
                            .parse_for_constructor(id, declaring_class, &signature)?
                    } else {
                        self.parser().parse_for_method(id, declaring_class, &signature)?
                    };
                    // The signature omits the outer instance; the raw
                    // parameter list (and its annotations) still has it
                    let skip = usize::from(
                        has_outer && raw.parameters.len() == parsed.parameters.len() + 1,
                    );
                    (
                        parsed.type_parameters,
                        parsed.parameters,
                        parsed.return_type,
                        parsed.exceptions,
                        &raw.parameters[skip..],
                    )
                }
                None => {
                    let raw_parameters = if has_outer {
                        self.strip_outer_instance(declaring_class, raw)?
                    } else {
                        &raw.parameters[..]
                    };
                    let parameter_types = raw_parameters
                        .iter()
                        .map(|p| self.parser().parse_non_generic_type(&p.type_name))
                        .collect::<Result<Vec<_>>>()?;
                    let return_type = if is_constructor {
                        void
                    } else {
                        self.parser().parse_non_generic_return_type(&raw.return_type)?
                    };
                    (Vec::new(), parameter_types, return_type, Vec::new(), raw_parameters)
                }
            };

        if exceptions.is_empty() {
            for descriptor in type_list_of(&raw.annotations, markers::THROWS)? {
                exceptions.push(self.parser().parse_non_generic_type(descriptor)?);
            }
        }

        let mut parameters = Vec::with_capacity(parameter_types.len());
        for (index, ty) in parameter_types.into_iter().enumerate() {
            let annotations = match raw_parameters.get(index) {
                Some(parameter) => self.convert_annotations(&parameter.annotations)?,
                None => Vec::new(),
            };
            parameters.push(Parameter { ty, annotations });
        }
        let annotations = self.convert_annotations(&raw.annotations)?;

        let executable = &mut self.executables[id.index()];
        if !is_constructor {
            executable.kind = ExecutableKind::Method { return_type };
        }
        executable.type_parameters = type_parameters;
        executable.parameters = parameters;
        executable.exceptions = exceptions;
        executable.annotations = annotations;
        Ok(id)
    }

    /// Check and drop the hidden outer-instance parameter of a non-generic
    /// inner class constructor
    fn strip_outer_instance<'m>(
        &mut self,
        declaring_class: ClassId,
        raw: &'m RawMethod,
    ) -> Result<&'m [RawParameter]> {
        let class_name = self.types.class(declaring_class).qualified_name();
        let Some((first, rest)) = raw.parameters.split_first() else {
            return Err(Error::InvariantViolation(format!(
                "Constructor of inner class {class_name} lacks the outer instance parameter"
            )));
        };
        let outer = self.types.class(declaring_class).declaring_class.ok_or_else(|| {
            Error::InvariantViolation(format!("Inner class {class_name} has no declaring class"))
        })?;
        let expected = self.types.get_class_reference(outer);
        let actual = self.parser().parse_non_generic_type(&first.type_name)?;
        if actual != expected {
            return Err(Error::InvariantViolation(format!(
                "First constructor parameter of inner class {class_name} is {}, expected {}",
                first.type_name,
                self.types.class(outer).qualified_name()
            )));
        }
        Ok(rest)
    }

    fn convert_annotations(&mut self, annotations: &[RawAnnotation]) -> Result<Vec<Annotation>> {
        annotations
            .iter()
            .filter(|annotation| !markers::is_marker(&annotation.type_name))
            .map(|annotation| self.convert_annotation(annotation))
            .collect()
    }

    fn convert_annotation(&mut self, raw: &RawAnnotation) -> Result<Annotation> {
        let annotation_class = self.class_from_descriptor(&raw.type_name)?;
        let ty = self.types.get_class_reference(annotation_class);
        let mut elements = Vec::with_capacity(raw.elements.len());
        for element in &raw.elements {
            let field = self.fields.get_annotation_field(annotation_class, &element.name);
            let value = self.convert_value(&element.value)?;
            elements.push(AnnotationElement { field, value });
        }
        Ok(Annotation { ty, elements })
    }

    fn convert_value(&mut self, value: &RawValue) -> Result<AnnotationValue> {
        Ok(match value {
            RawValue::Int(v) => AnnotationValue::Int(*v),
            RawValue::Boolean(v) => AnnotationValue::Boolean(*v),
            RawValue::Byte(v) => AnnotationValue::Byte(*v),
            RawValue::Char(v) => AnnotationValue::Char(*v),
            RawValue::Double(v) => AnnotationValue::Double(*v),
            RawValue::Float(v) => AnnotationValue::Float(*v),
            RawValue::Long(v) => AnnotationValue::Long(*v),
            RawValue::Null => AnnotationValue::Null,
            RawValue::String(v) => AnnotationValue::String(v.clone()),
            RawValue::Short(v) => AnnotationValue::Short(*v),
            RawValue::Array(values) => AnnotationValue::Array(
                values
                    .iter()
                    .map(|v| self.convert_value(v))
                    .collect::<Result<Vec<_>>>()?,
            ),
            RawValue::Annotation(annotation) => {
                AnnotationValue::Annotation(Box::new(self.convert_annotation(annotation)?))
            }
            RawValue::Field(member) => {
                let class = self.class_from_descriptor(&member.declaring_class)?;
                AnnotationValue::Field(self.fields.get_field(class, &member.name))
            }
            RawValue::Enum(member) => {
                let class = self.class_from_descriptor(&member.declaring_class)?;
                AnnotationValue::EnumConstant(self.fields.get_enum_constant(class, &member.name))
            }
            RawValue::Type(descriptor) => {
                AnnotationValue::Type(self.parser().parse_non_generic_return_type(descriptor)?)
            }
        })
    }

    /// Member classes listed by the MemberClasses marker of `class`
    fn member_classes(&mut self, class: &RawClass) -> Result<Vec<ClassId>> {
        type_list_of(&class.annotations, markers::MEMBER_CLASSES)?
            .into_iter()
            .map(|descriptor| {
                self.class_from_descriptor(descriptor).map_err(|_| {
                    Error::InvariantViolation(format!(
                        "Unresolvable member class '{descriptor}' of {}",
                        class.name
                    ))
                })
            })
            .collect()
    }
}

/// Name → default value pairs from an AnnotationDefault marker
fn annotation_defaults(class: &RawClass) -> Result<HashMap<&str, &RawValue>> {
    let Some(marker) = class.find_annotation(markers::ANNOTATION_DEFAULT) else {
        return Ok(HashMap::new());
    };
    match marker.element(markers::VALUE) {
        Some(RawValue::Annotation(defaults)) => Ok(defaults
            .elements
            .iter()
            .map(|element| (element.name.as_str(), &element.value))
            .collect()),
        other => Err(Error::InvariantViolation(format!(
            "Malformed AnnotationDefault marker on {}: {other:?}",
            class.name
        ))),
    }
}

/// Converts a closed set of raw classes into an [`Api`]
#[derive(Debug, Clone, Default)]
pub struct ClassConverter {
    options: ConversionOptions,
}

impl ClassConverter {
    pub fn new(options: ConversionOptions) -> Self {
        ClassConverter { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert `classes` into an API named `name`
    ///
    /// Deterministic: the same input always yields the same tree, ids
    /// included.
    pub fn convert(&self, name: &str, classes: &[RawClass]) -> Result<Api> {
        let policy = VisibilityPolicy::new(self.options.visibility);
        let mut context = ConversionContext::new(policy, classes)?;

        // Phase 1: group by package
        let mut by_package: BTreeMap<String, Vec<ClassId>> = BTreeMap::new();
        for class in classes {
            let (package, simple_name) = class_name_parts(&class.name).ok_or_else(|| {
                Error::InvariantViolation(format!("Malformed class name '{}'", class.name))
            })?;
            let id = context.types.get_class(&package, &simple_name);
            by_package.entry(package).or_default().push(id);
        }

        // Phase 2: convert visible classes
        let mut packages: BTreeMap<String, Package> = BTreeMap::new();
        let mut visible: BTreeSet<ClassId> = BTreeSet::new();
        for (package_name, ids) in &by_package {
            for &id in ids {
                let Some(raw) = context.raw_class(id) else {
                    continue;
                };
                if !policy.is_class_visible(raw) && !is_package_info(raw) {
                    log::trace!("skipping invisible class {}", raw.name);
                    continue;
                }
                context.initialize_class(id)?;
                packages
                    .entry(package_name.clone())
                    .or_insert_with(|| Package::new(package_name.clone()))
                    .classes
                    .insert(id);
                visible.insert(id);
            }
        }

        // Phase 3: package-info annotations move onto the package
        for package in packages.values_mut() {
            let Some(id) = context.types.find_class(&package.name, raw::PACKAGE_INFO) else {
                continue;
            };
            if package.classes.remove(&id) {
                visible.remove(&id);
                package.annotations = std::mem::take(&mut context.types.class_mut(id).annotations);
            }
        }

        // Phase 4: link member classes that survived filtering
        for &id in &visible {
            let Some(raw) = context.raw_class(id) else {
                continue;
            };
            for member in context.member_classes(raw)? {
                if visible.contains(&member) {
                    context.types.class_mut(id).inner_classes.insert(member);
                } else {
                    log::trace!(
                        "member class {} of {} is not visible",
                        context.types.class(member).qualified_name(),
                        raw.name
                    );
                }
            }
        }

        // Phase 5: drop classes nested inside an invisible class
        for &id in &visible {
            let mut enclosing = context.types.class(id).declaring_class;
            while let Some(outer) = enclosing {
                if let Some(raw) = context.raw_class(outer) {
                    if !policy.is_class_visible(raw) {
                        let class = context.types.class(id);
                        log::debug!(
                            "pruning {}: enclosing {} is not visible",
                            class.qualified_name(),
                            raw.name
                        );
                        if let Some(package) = packages.get_mut(&class.package) {
                            package.classes.remove(&id);
                        }
                        break;
                    }
                }
                enclosing = context.types.class(outer).declaring_class;
            }
        }

        let published: usize = packages.values().map(|p| p.classes.len()).sum();
        log::debug!(
            "converted {} classes into {} packages, {published} published at {} visibility",
            classes.len(),
            packages.len(),
            policy.level()
        );
        Ok(Api::new(name.to_string(), packages, context.into_model()))
    }
}
