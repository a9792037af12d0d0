use std::collections::{BTreeSet, HashMap};

use crate::model::{ClassId, FieldDefinition, FieldId, FieldKind};

/// Canonical store of fields, enum constants and annotation fields
///
/// Nodes are keyed by `(declaring class, name)`, so an enum constant named
/// from an annotation value and the same constant declared by its enum class
/// end up as one node.
#[derive(Debug, Default)]
pub struct FieldPool {
    fields: Vec<FieldDefinition>,
    index: HashMap<(ClassId, String), FieldId>,
}

impl FieldPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_field(&mut self, class: ClassId, name: &str) -> FieldId {
        self.get(class, name, FieldKind::Field)
    }

    pub fn get_enum_constant(&mut self, class: ClassId, name: &str) -> FieldId {
        self.get(class, name, FieldKind::EnumConstant)
    }

    pub fn get_annotation_field(&mut self, class: ClassId, name: &str) -> FieldId {
        self.get(class, name, FieldKind::AnnotationField)
    }

    fn get(&mut self, class: ClassId, name: &str, kind: FieldKind) -> FieldId {
        if let Some(id) = self.index.get(&(class, name.to_string())).copied() {
            let field = &mut self.fields[id.index()];
            // A node that was only ever referenced takes the kind of its
            // first declaration.
            if field.ty.is_none() && field.kind != kind {
                field.kind = kind;
            }
            return id;
        }
        let id = FieldId::new(self.fields.len());
        self.fields.push(FieldDefinition {
            name: name.to_string(),
            kind,
            declaring_class: class,
            modifiers: BTreeSet::new(),
            ty: None,
            annotations: Vec::new(),
            default_value: None,
        });
        self.index.insert((class, name.to_string()), id);
        id
    }

    pub fn find(&self, class: ClassId, name: &str) -> Option<FieldId> {
        self.index.get(&(class, name.to_string())).copied()
    }

    pub fn field(&self, id: FieldId) -> &FieldDefinition {
        &self.fields[id.index()]
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut FieldDefinition {
        &mut self.fields[id.index()]
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
