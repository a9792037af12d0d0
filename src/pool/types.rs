use std::collections::HashMap;

use crate::model::{
    ClassDefinition, ClassId, ClassState, GenericDeclaration, Primitive, TypeId, TypeReference,
    TypeVarId, TypeVariableDefinition,
};

/// Per-conversion store of classes, type references and type variables
///
/// Every request with structurally equal arguments yields the same id. Class
/// definitions are created on first reference as [`ClassState::Placeholder`]
/// entries so that mutually-referencing classes can be linked before either
/// one is converted.
#[derive(Debug)]
pub struct TypePool {
    classes: Vec<ClassDefinition>,
    class_index: HashMap<(String, String), ClassId>,
    types: Vec<TypeReference>,
    type_index: HashMap<TypeReference, TypeId>,
    type_variables: Vec<TypeVariableDefinition>,
    type_variable_index: HashMap<(String, GenericDeclaration), TypeVarId>,
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

impl TypePool {
    /// Create a pool with every primitive pre-interned
    pub fn new() -> Self {
        let mut pool = TypePool {
            classes: Vec::new(),
            class_index: HashMap::new(),
            types: Vec::new(),
            type_index: HashMap::new(),
            type_variables: Vec::new(),
            type_variable_index: HashMap::new(),
        };
        for primitive in Primitive::ALL {
            let id = pool.intern(TypeReference::Primitive(primitive));
            debug_assert_eq!(id, Self::primitive_id(primitive));
        }
        pool
    }

    fn primitive_id(primitive: Primitive) -> TypeId {
        TypeId::new(primitive as usize)
    }

    fn intern(&mut self, ty: TypeReference) -> TypeId {
        let next_id = TypeId::new(self.types.len());
        *self.type_index.entry(ty.clone()).or_insert_with(|| {
            self.types.push(ty);
            next_id
        })
    }

    /// Get the class for `(package, name)`, creating a placeholder on first use
    pub fn get_class(&mut self, package: &str, name: &str) -> ClassId {
        let key = (package.to_string(), name.to_string());
        if let Some(id) = self.class_index.get(&key) {
            return *id;
        }
        let id = ClassId::new(self.classes.len());
        log::trace!("new class placeholder {package}.{name}");
        self.classes.push(ClassDefinition::placeholder(package, name));
        self.class_index.insert(key, id);
        id
    }

    /// Look up a class without creating it
    pub fn find_class(&self, package: &str, name: &str) -> Option<ClassId> {
        self.class_index
            .get(&(package.to_string(), name.to_string()))
            .copied()
    }

    pub fn class(&self, id: ClassId) -> &ClassDefinition {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDefinition {
        &mut self.classes[id.index()]
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDefinition)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(index, class)| (ClassId::new(index), class))
    }

    pub fn type_ref(&self, id: TypeId) -> &TypeReference {
        &self.types[id.index()]
    }

    /// Number of distinct type references in the pool
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn primitive(&self, primitive: Primitive) -> TypeId {
        Self::primitive_id(primitive)
    }

    /// Wrap a class as a type reference, whatever its initialization state
    pub fn get_class_reference(&mut self, class: ClassId) -> TypeId {
        self.intern(TypeReference::Class(class))
    }

    pub fn get_array_type(&mut self, element: TypeId) -> TypeId {
        self.intern(TypeReference::Array(element))
    }

    pub fn get_parameterized_type(
        &mut self,
        owner: Option<TypeId>,
        raw: TypeId,
        arguments: Vec<TypeId>,
    ) -> TypeId {
        debug_assert!(matches!(self.type_ref(raw), TypeReference::Class(_)));
        self.intern(TypeReference::Parameterized {
            owner,
            raw,
            arguments,
        })
    }

    pub fn get_wildcard_type(
        &mut self,
        lower_bound: Option<TypeId>,
        upper_bounds: Vec<TypeId>,
    ) -> TypeId {
        self.intern(TypeReference::Wildcard {
            lower_bound,
            upper_bounds,
        })
    }

    /// Get the variable `name` introduced by `declaration`, creating it with
    /// no bounds on first use
    pub fn get_type_variable(&mut self, name: &str, declaration: GenericDeclaration) -> TypeVarId {
        let key = (name.to_string(), declaration);
        if let Some(id) = self.type_variable_index.get(&key) {
            return *id;
        }
        let id = TypeVarId::new(self.type_variables.len());
        self.type_variables.push(TypeVariableDefinition {
            name: name.to_string(),
            declaration,
            upper_bounds: Vec::new(),
        });
        self.type_variable_index.insert(key, id);
        id
    }

    pub fn get_type_variable_reference(
        &mut self,
        name: &str,
        declaration: GenericDeclaration,
    ) -> TypeId {
        let var = self.get_type_variable(name, declaration);
        self.intern(TypeReference::TypeVariable(var))
    }

    pub fn contains_type_variable_definition(
        &self,
        name: &str,
        declaration: GenericDeclaration,
    ) -> bool {
        self.type_variable_index
            .contains_key(&(name.to_string(), declaration))
    }

    pub fn type_variable(&self, id: TypeVarId) -> &TypeVariableDefinition {
        &self.type_variables[id.index()]
    }

    pub fn type_variable_mut(&mut self, id: TypeVarId) -> &mut TypeVariableDefinition {
        &mut self.type_variables[id.index()]
    }

    /// Mark every class that was never initialized as external
    ///
    /// Run once after the whole input set is converted: any placeholder left
    /// was filtered out or absent from the input and will stay empty.
    pub fn finalize(&mut self) {
        let mut external = 0;
        for class in self.classes.iter_mut().filter(|c| c.is_placeholder()) {
            class.state = ClassState::External;
            external += 1;
        }
        log::debug!(
            "type pool finalized: {} classes ({external} external), {} types",
            self.classes.len(),
            self.types.len()
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_class_identity() {
        let mut pool = TypePool::new();
        let a = pool.get_class("java.util", "List");
        let b = pool.get_class("java.util", "List");
        let c = pool.get_class("java.awt", "List");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(pool.class(a).is_placeholder());
        assert_eq!(pool.find_class("java.util", "List"), Some(a));
        assert_eq!(pool.find_class("java.util", "Map"), None);
    }

    #[test]
    fn test_structural_identity() {
        let mut pool = TypePool::new();
        let list = pool.get_class("java.util", "List");
        let string = pool.get_class("java.lang", "String");
        let list_ref = pool.get_class_reference(list);
        let string_ref = pool.get_class_reference(string);
        assert_eq!(list_ref, pool.get_class_reference(list));

        let a = pool.get_parameterized_type(None, list_ref, vec![string_ref]);
        let b = pool.get_parameterized_type(None, list_ref, vec![string_ref]);
        assert_eq!(a, b);
        assert_ne!(a, pool.get_parameterized_type(None, list_ref, vec![]));

        let array = pool.get_array_type(a);
        assert_eq!(array, pool.get_array_type(b));

        let w1 = pool.get_wildcard_type(None, vec![string_ref]);
        let w2 = pool.get_wildcard_type(None, vec![string_ref]);
        let w3 = pool.get_wildcard_type(Some(string_ref), vec![]);
        assert_eq!(w1, w2);
        assert_ne!(w1, w3);
    }

    #[test]
    fn test_primitives_are_preinterned() {
        let pool = TypePool::new();
        for primitive in Primitive::ALL {
            assert_matches!(
                pool.type_ref(pool.primitive(primitive)),
                TypeReference::Primitive(p) if *p == primitive
            );
        }
        assert_eq!(pool.type_count(), Primitive::ALL.len());
    }

    #[test]
    fn test_type_variables_scoped_by_declaration() {
        let mut pool = TypePool::new();
        let outer = pool.get_class("p", "Outer");
        let inner = pool.get_class("p", "Outer$Inner");
        let decl = GenericDeclaration::Class(outer);

        assert!(!pool.contains_type_variable_definition("T", decl));
        let t = pool.get_type_variable("T", decl);
        assert!(pool.contains_type_variable_definition("T", decl));
        assert!(!pool.contains_type_variable_definition("T", GenericDeclaration::Class(inner)));
        assert_eq!(t, pool.get_type_variable("T", decl));
        assert_ne!(t, pool.get_type_variable("T", GenericDeclaration::Class(inner)));

        let r1 = pool.get_type_variable_reference("T", decl);
        let r2 = pool.get_type_variable_reference("T", decl);
        assert_eq!(r1, r2);
        assert_eq!(pool.type_ref(r1), &TypeReference::TypeVariable(t));
    }

    #[test]
    fn test_finalize_marks_placeholders_external() {
        let mut pool = TypePool::new();
        let done = pool.get_class("p", "Done");
        let absent = pool.get_class("p", "Absent");
        pool.class_mut(done).state = ClassState::Initialized;
        pool.finalize();
        assert_eq!(pool.class(done).state, ClassState::Initialized);
        assert_eq!(pool.class(absent).state, ClassState::External);
        assert!(pool.class(absent).fields.is_empty());
        assert!(pool.class(absent).type_parameters.is_empty());
    }
}
