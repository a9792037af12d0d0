//! Generic signature parsing and type resolution
//!
//! [`grammar`] turns signature strings into syntax trees;
//! [`GenericSignatureParser`] resolves those trees into pooled types. Type
//! variables are resolved against the declaration being parsed first and then
//! against its enclosing classes, which may require converting a class that
//! has only been referenced so far (see [`SignatureContext::initialize_class`]).

pub mod grammar;

use crate::errors::{Error, Result};
use crate::model::{
    ClassId, ExecutableId, GenericDeclaration, Primitive, TypeId, TypeReference, TypeVarId,
};
use crate::pool::TypePool;

use self::grammar::{ClassTypeSignature, FormalTypeParameter, TypeArgument, TypeSignature};

/// What the parser needs from the conversion it runs in
pub trait SignatureContext {
    fn type_pool(&mut self) -> &mut TypePool;

    /// Convert `class` from its raw record if it is still a placeholder
    ///
    /// Must be idempotent and tolerate being called for a class whose
    /// conversion is already in progress further up the stack.
    fn initialize_class(&mut self, class: ClassId) -> Result<()>;
}

/// Resolved form of a class signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignatureTypes {
    pub type_parameters: Vec<TypeVarId>,
    pub superclass: TypeId,
    pub interfaces: Vec<TypeId>,
}

/// Resolved form of a method or constructor signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableSignatureTypes {
    pub type_parameters: Vec<TypeVarId>,
    pub parameters: Vec<TypeId>,
    /// `void` for constructors
    pub return_type: TypeId,
    pub exceptions: Vec<TypeId>,
}

/// Where type variables are looked up
#[derive(Debug, Clone, Copy)]
struct Scope {
    /// The generic declaration being parsed, checked first
    declaration: Option<GenericDeclaration>,
    /// First class of the enclosing chain to search next
    enclosing: Option<ClassId>,
}

impl Scope {
    const NONE: Scope = Scope {
        declaration: None,
        enclosing: None,
    };
}

/// Resolves signatures into types of a [`SignatureContext`]'s pool
pub struct GenericSignatureParser<'c, C: ?Sized> {
    context: &'c mut C,
}

impl<'c, C> GenericSignatureParser<'c, C>
where
    C: SignatureContext + ?Sized,
{
    pub fn new(context: &'c mut C) -> Self {
        GenericSignatureParser { context }
    }

    fn types(&mut self) -> &mut TypePool {
        self.context.type_pool()
    }

    /// Parse the signature of `class`, declaring its type parameters
    pub fn parse_for_class(&mut self, class: ClassId, signature: &str) -> Result<ClassSignatureTypes> {
        let parsed = grammar::parse_class_signature(signature)?;
        let scope = Scope {
            declaration: Some(GenericDeclaration::Class(class)),
            enclosing: self.types().class(class).declaring_class,
        };
        let type_parameters = self.declare_type_parameters(&parsed.type_parameters, scope)?;
        let superclass = self.resolve_class_type(&parsed.superclass, scope)?;
        let interfaces = parsed
            .interfaces
            .iter()
            .map(|interface| self.resolve_class_type(interface, scope))
            .collect::<Result<Vec<_>>>()?;
        Ok(ClassSignatureTypes {
            type_parameters,
            superclass,
            interfaces,
        })
    }

    /// Parse the signature of `method`, a member of `declaring_class`
    pub fn parse_for_method(
        &mut self,
        method: ExecutableId,
        declaring_class: ClassId,
        signature: &str,
    ) -> Result<ExecutableSignatureTypes> {
        let scope = Scope {
            declaration: Some(GenericDeclaration::Executable(method)),
            enclosing: Some(declaring_class),
        };
        self.parse_executable(signature, scope)
    }

    /// Parse the signature of `constructor`, a member of `declaring_class`
    pub fn parse_for_constructor(
        &mut self,
        constructor: ExecutableId,
        declaring_class: ClassId,
        signature: &str,
    ) -> Result<ExecutableSignatureTypes> {
        let scope = Scope {
            declaration: Some(GenericDeclaration::Executable(constructor)),
            enclosing: Some(declaring_class),
        };
        let resolved = self.parse_executable(signature, scope)?;
        let void = self.types().primitive(Primitive::Void);
        if resolved.return_type != void {
            return Err(Error::ParseFailed(format!(
                "Constructor signature '{signature}' does not return void"
            )));
        }
        Ok(resolved)
    }

    /// Parse the type signature of a field of `declaring_class`
    pub fn parse_for_field(&mut self, declaring_class: ClassId, signature: &str) -> Result<TypeId> {
        let parsed = grammar::parse_field_signature(signature)?;
        let scope = Scope {
            declaration: None,
            enclosing: Some(declaring_class),
        };
        self.resolve(&parsed, scope)
    }

    /// Parse the method-style signature of an annotation field and return
    /// its value type
    pub fn parse_for_annotation_field(
        &mut self,
        declaring_class: ClassId,
        signature: &str,
    ) -> Result<TypeId> {
        let parsed = grammar::parse_method_signature(signature)?;
        if !parsed.type_parameters.is_empty() || !parsed.parameters.is_empty() {
            return Err(Error::ParseFailed(format!(
                "Annotation field signature '{signature}' declares parameters"
            )));
        }
        let scope = Scope {
            declaration: None,
            enclosing: Some(declaring_class),
        };
        self.resolve(&parsed.return_type, scope)
    }

    /// Interpret a plain descriptor such as `[Ljava/lang/String;`
    pub fn parse_non_generic_type(&mut self, descriptor: &str) -> Result<TypeId> {
        let parsed = grammar::parse_type_descriptor(descriptor)?;
        self.resolve(&parsed, Scope::NONE)
    }

    /// Interpret a plain return descriptor, which may also be `V`
    pub fn parse_non_generic_return_type(&mut self, descriptor: &str) -> Result<TypeId> {
        let parsed = grammar::parse_return_descriptor(descriptor)?;
        self.resolve(&parsed, Scope::NONE)
    }

    fn parse_executable(&mut self, signature: &str, scope: Scope) -> Result<ExecutableSignatureTypes> {
        let parsed = grammar::parse_method_signature(signature)?;
        let type_parameters = self.declare_type_parameters(&parsed.type_parameters, scope)?;
        let parameters = parsed
            .parameters
            .iter()
            .map(|parameter| self.resolve(parameter, scope))
            .collect::<Result<Vec<_>>>()?;
        let return_type = self.resolve(&parsed.return_type, scope)?;
        let exceptions = parsed
            .throws
            .iter()
            .map(|exception| self.resolve(exception, scope))
            .collect::<Result<Vec<_>>>()?;
        Ok(ExecutableSignatureTypes {
            type_parameters,
            parameters,
            return_type,
            exceptions,
        })
    }

    /// Create the variables first so bounds can refer to any of them
    /// (`<T::Ljava/lang/Comparable<TT;>;>`), then resolve the bounds.
    fn declare_type_parameters(
        &mut self,
        parameters: &[FormalTypeParameter],
        scope: Scope,
    ) -> Result<Vec<TypeVarId>> {
        let Some(declaration) = scope.declaration else {
            if parameters.is_empty() {
                return Ok(Vec::new());
            }
            return Err(Error::ParseFailed(
                "Type parameters are only allowed on classes, methods and constructors".into(),
            ));
        };
        let variables: Vec<TypeVarId> = parameters
            .iter()
            .map(|parameter| self.types().get_type_variable(&parameter.name, declaration))
            .collect();
        for (parameter, variable) in parameters.iter().zip(&variables) {
            let mut upper_bounds = Vec::new();
            if let Some(bound) = &parameter.class_bound {
                upper_bounds.push(self.resolve(bound, scope)?);
            }
            for bound in &parameter.interface_bounds {
                upper_bounds.push(self.resolve(bound, scope)?);
            }
            self.types().type_variable_mut(*variable).upper_bounds = upper_bounds;
        }
        Ok(variables)
    }

    fn resolve(&mut self, signature: &TypeSignature, scope: Scope) -> Result<TypeId> {
        match signature {
            TypeSignature::Base(primitive) => Ok(self.types().primitive(*primitive)),
            TypeSignature::Array(element) => {
                let element = self.resolve(element, scope)?;
                Ok(self.types().get_array_type(element))
            }
            TypeSignature::Class(class) => self.resolve_class_type(class, scope),
            TypeSignature::TypeVariable(name) => self.resolve_type_variable(name, scope),
        }
    }

    fn resolve_class_type(&mut self, signature: &ClassTypeSignature, scope: Scope) -> Result<TypeId> {
        let package = signature.package.join(".");
        let mut binary_name = String::new();
        let mut owner: Option<TypeId> = None;
        let mut resolved = None;
        for segment in &signature.segments {
            if !binary_name.is_empty() {
                binary_name.push('$');
            }
            binary_name.push_str(&segment.name);

            let arguments = segment
                .arguments
                .iter()
                .map(|argument| self.resolve_argument(argument, scope))
                .collect::<Result<Vec<_>>>()?;
            let types = self.types();
            let class = types.get_class(&package, &binary_name);
            let raw = types.get_class_reference(class);
            let ty = if arguments.is_empty() && owner.is_none() {
                raw
            } else {
                types.get_parameterized_type(owner, raw, arguments)
            };
            owner = matches!(types.type_ref(ty), TypeReference::Parameterized { .. }).then_some(ty);
            resolved = Some(ty);
        }
        resolved.ok_or_else(|| Error::ParseFailed("Class type signature without a class name".into()))
    }

    fn resolve_argument(&mut self, argument: &TypeArgument, scope: Scope) -> Result<TypeId> {
        match argument {
            TypeArgument::Exact(signature) => self.resolve(signature, scope),
            TypeArgument::Any => {
                let object = self.object_type();
                Ok(self.types().get_wildcard_type(None, vec![object]))
            }
            TypeArgument::Extends(signature) => {
                let bound = self.resolve(signature, scope)?;
                Ok(self.types().get_wildcard_type(None, vec![bound]))
            }
            TypeArgument::Super(signature) => {
                let bound = self.resolve(signature, scope)?;
                let object = self.object_type();
                Ok(self.types().get_wildcard_type(Some(bound), vec![object]))
            }
        }
    }

    fn object_type(&mut self) -> TypeId {
        let types = self.types();
        let object = types.get_class("java.lang", "Object");
        types.get_class_reference(object)
    }

    fn resolve_type_variable(&mut self, name: &str, scope: Scope) -> Result<TypeId> {
        if let Some(declaration) = scope.declaration {
            if self.types().contains_type_variable_definition(name, declaration) {
                return Ok(self.types().get_type_variable_reference(name, declaration));
            }
        }
        let class = self.find_declaring_class(name, scope.enclosing)?;
        Ok(self
            .types()
            .get_type_variable_reference(name, GenericDeclaration::Class(class)))
    }

    /// Walk outwards from `start` to the class that declares `name`,
    /// converting placeholder classes on the way
    fn find_declaring_class(&mut self, name: &str, start: Option<ClassId>) -> Result<ClassId> {
        let mut candidate = start;
        while let Some(class) = candidate {
            if self.types().class(class).is_placeholder() {
                log::trace!(
                    "resolving type variable {name} requires {}",
                    self.types().class(class).qualified_name()
                );
                self.context.initialize_class(class)?;
            }
            if self
                .types()
                .contains_type_variable_definition(name, GenericDeclaration::Class(class))
            {
                return Ok(class);
            }
            candidate = self.types().class(class).declaring_class;
        }
        Err(Error::InvariantViolation(format!(
            "Type variable '{name}' is not declared by any enclosing declaration"
        )))
    }
}
