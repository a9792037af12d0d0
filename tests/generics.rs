use apisig::{
    model::{GenericDeclaration, TypeReference},
    raw::{flags, RawAnnotation, RawClass, RawField, RawMethod, RawParameter},
    Api, Error, Visibility,
};
use assert_matches::assert_matches;

mod util;
use util::{convert, enclosing_class, member_classes, signature, throws};

const OBJECT: &str = "Ljava/lang/Object;";
const INTERFACE: u32 = flags::PUBLIC | flags::INTERFACE | flags::ABSTRACT;

fn collections() -> Vec<RawClass> {
    vec![
        RawClass::new("Ljava/util/List;", INTERFACE)
            .with_superclass(OBJECT)
            .with_interface("Ljava/util/Collection;")
            .with_annotation(signature(&[
                "<E:",
                "Ljava/lang/Object;",
                ">",
                "Ljava/lang/Object;",
                "Ljava/util/Collection<TE;>;",
            ]))
            .with_method(
                RawMethod::new("get", flags::PUBLIC | flags::ABSTRACT, OBJECT)
                    .with_parameter(RawParameter::new("I"))
                    .with_annotation(signature(&["(I)TE;"])),
            )
            .with_method(
                RawMethod::new("toArray", flags::PUBLIC | flags::ABSTRACT, "[Ljava/lang/Object;")
                    .with_parameter(RawParameter::new("[Ljava/lang/Object;"))
                    .with_annotation(signature(&["<T:Ljava/lang/Object;>([TT;)[TT;"])),
            )
            .with_method(
                RawMethod::new("addAll", flags::PUBLIC | flags::ABSTRACT, "Z")
                    .with_parameter(RawParameter::new("Ljava/util/Collection;"))
                    .with_annotation(signature(&["(Ljava/util/Collection<+TE;>;)Z"])),
            ),
        RawClass::new("Ljava/util/Map;", INTERFACE)
            .with_superclass(OBJECT)
            .with_annotation(signature(&["<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/lang/Object;"]))
            .with_annotation(member_classes(&["Ljava/util/Map$Entry;"]))
            .with_method(
                RawMethod::new("entrySet", flags::PUBLIC | flags::ABSTRACT, "Ljava/util/Set;")
                    .with_annotation(signature(&["()Ljava/util/Set<Ljava/util/Map$Entry<TK;TV;>;>;"])),
            ),
        RawClass::new("Ljava/util/Map$Entry;", INTERFACE | flags::STATIC)
            .with_superclass(OBJECT)
            .with_annotation(enclosing_class("Ljava/util/Map;"))
            .with_annotation(signature(&["<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/lang/Object;"]))
            .with_method(
                RawMethod::new("getKey", flags::PUBLIC | flags::ABSTRACT, OBJECT)
                    .with_annotation(signature(&["()TK;"])),
            ),
    ]
}

fn method_types(api: &Api, package: &str, class: &str, method: &str) -> (Vec<String>, String) {
    let class = api.class(api.find_class(package, class).unwrap());
    let method = class
        .methods
        .iter()
        .map(|m| api.executable(*m))
        .find(|m| m.name == method)
        .unwrap();
    let parameters = method
        .parameters
        .iter()
        .map(|p| api.display_type(p.ty))
        .collect();
    (parameters, api.display_type(method.return_type().unwrap()))
}

#[test]
pub fn class_signature_round_trip() {
    let api = convert(&collections(), Visibility::Public);
    let list_id = api.find_class("java.util", "List").unwrap();
    let list = api.class(list_id);

    assert_eq!(list.type_parameters.len(), 1);
    let e = api.type_variable(list.type_parameters[0]);
    assert_eq!(e.name, "E");
    assert_eq!(e.declaration, GenericDeclaration::Class(list_id));
    assert_eq!(api.display_type(e.upper_bounds[0]), "java.lang.Object");

    assert_eq!(list.superclass, None);
    assert_eq!(api.display_type(list.interfaces[0]), "java.util.Collection<E>");
}

#[test]
pub fn method_signatures_resolve_variables() {
    let api = convert(&collections(), Visibility::Public);

    assert_eq!(
        method_types(&api, "java.util", "List", "get"),
        (vec!["int".to_string()], "E".to_string())
    );
    assert_eq!(
        method_types(&api, "java.util", "List", "toArray"),
        (vec!["T[]".to_string()], "T[]".to_string())
    );
    assert_eq!(
        method_types(&api, "java.util", "List", "addAll"),
        (
            vec!["java.util.Collection<? extends E>".to_string()],
            "boolean".to_string()
        )
    );
    assert_eq!(
        method_types(&api, "java.util", "Map", "entrySet"),
        (vec![], "java.util.Set<java.util.Map.Entry<K, V>>".to_string())
    );

    let list = api.class(api.find_class("java.util", "List").unwrap());
    let to_array = api.executable(list.methods[1]);
    assert_eq!(to_array.type_parameters.len(), 1);
    assert_eq!(
        api.type_variable(to_array.type_parameters[0]).declaration,
        GenericDeclaration::Executable(list.methods[1])
    );
}

#[test]
pub fn nested_class_uses_its_own_variables() {
    let api = convert(&collections(), Visibility::Public);
    let map = api.find_class("java.util", "Map").unwrap();
    let entry_id = api.find_class("java.util", "Map$Entry").unwrap();
    let entry = api.class(entry_id);

    assert!(api.class(map).inner_classes.contains(&entry_id));
    let get_key = api.executable(entry.methods[0]);
    assert_matches!(
        api.type_ref(get_key.return_type().unwrap()),
        TypeReference::TypeVariable(v) if api.type_variable(*v).declaration == GenericDeclaration::Class(entry_id)
    );
}

#[test]
pub fn pooled_generic_types_are_shared() {
    let classes = vec![RawClass::new("Lp/Names;", flags::PUBLIC)
        .with_superclass(OBJECT)
        .with_field(
            RawField::new("first", flags::PUBLIC, "Ljava/util/List;")
                .with_annotation(signature(&["Ljava/util/List<Ljava/lang/String;>;"])),
        )
        .with_field(
            RawField::new("second", flags::PUBLIC, "Ljava/util/List;")
                .with_annotation(signature(&["Ljava/util/List<", "Ljava/lang/String;", ">;"])),
        )];
    let api = convert(&classes, Visibility::Public);
    let names = api.class(api.find_class("p", "Names").unwrap());

    let first = api.field(names.fields[0]).ty.unwrap();
    assert_eq!(Some(first), api.field(names.fields[1]).ty);
    assert_eq!(api.display_type(first), "java.util.List<java.lang.String>");
}

/// The inner class comes first in the input, so resolving `T` has to
/// convert its enclosing class on demand.
fn outer_and_inner(outer_flags: u32) -> Vec<RawClass> {
    vec![
        RawClass::new("Lp/Outer$Inner;", flags::PUBLIC)
            .with_superclass(OBJECT)
            .with_annotation(enclosing_class("Lp/Outer;"))
            .with_field(
                RawField::new("value", flags::PUBLIC, OBJECT)
                    .with_annotation(signature(&["TT;"])),
            )
            .with_method(
                RawMethod::constructor(flags::PUBLIC)
                    .with_parameter(RawParameter::new("Lp/Outer;"))
                    .with_parameter(
                        RawParameter::new(OBJECT).with_annotation(RawAnnotation::new("Lp/NonNull;")),
                    )
                    .with_annotation(signature(&["(TT;)V"])),
            ),
        RawClass::new("Lp/Outer;", outer_flags)
            .with_superclass(OBJECT)
            .with_annotation(signature(&["<T:Ljava/lang/Number;>Ljava/lang/Object;"]))
            .with_annotation(member_classes(&["Lp/Outer$Inner;"])),
    ]
}

#[test]
pub fn enclosing_class_is_converted_on_demand() {
    let api = convert(&outer_and_inner(flags::PUBLIC), Visibility::Public);
    let outer = api.find_class("p", "Outer").unwrap();
    let inner = api.class(api.find_class("p", "Outer$Inner").unwrap());

    let value = api.field(inner.fields[0]).ty.unwrap();
    assert_matches!(
        api.type_ref(value),
        TypeReference::TypeVariable(v) if api.type_variable(*v).declaration == GenericDeclaration::Class(outer)
    );
    assert_eq!(api.class(outer).type_parameters.len(), 1);
    let t = api.type_variable(api.class(outer).type_parameters[0]);
    assert_eq!(api.display_type(t.upper_bounds[0]), "java.lang.Number");

    // The generic signature leaves out the outer instance, the raw
    // parameter list does not
    let constructor = api.executable(inner.constructors[0]);
    assert_eq!(constructor.parameters.len(), 1);
    assert_eq!(api.display_type(constructor.parameters[0].ty), "T");
    assert_eq!(constructor.parameters[0].annotations.len(), 1);
}

#[test]
pub fn invisible_enclosing_class_still_resolves() {
    let api = convert(&outer_and_inner(0), Visibility::Public);

    assert!(api.find_class("p", "Outer").is_none());
    // Pruned with its enclosing class, but its types were resolved
    assert!(api.find_class("p", "Outer$Inner").is_none());
    let outer = api.model().types().find_class("p", "Outer").unwrap();
    assert_eq!(api.class(outer).type_parameters.len(), 1);
}

#[test]
pub fn self_referential_bound() {
    let classes = vec![RawClass::new("Lp/Node;", flags::PUBLIC | flags::ABSTRACT)
        .with_superclass(OBJECT)
        .with_annotation(signature(&[
            "<N:Lp/Node<TN;>;>Ljava/lang/Object;Ljava/lang/Comparable<TN;>;",
        ]))];
    let api = convert(&classes, Visibility::Public);
    let node = api.class(api.find_class("p", "Node").unwrap());

    let n = api.type_variable(node.type_parameters[0]);
    assert_eq!(api.display_type(n.upper_bounds[0]), "p.Node<N>");
    assert_eq!(api.display_type(node.interfaces[0]), "java.lang.Comparable<N>");
}

#[test]
pub fn exceptions_from_signature_or_marker() {
    let classes = vec![RawClass::new("Lp/Io;", flags::PUBLIC)
        .with_superclass(OBJECT)
        .with_method(
            RawMethod::new("read", flags::PUBLIC, "I")
                .with_annotation(throws(&["Ljava/io/IOException;"])),
        )
        .with_method(
            RawMethod::new("call", flags::PUBLIC, OBJECT)
                .with_annotation(signature(&[
                    "<X:Ljava/lang/Exception;>()Ljava/lang/Object;^TX;",
                ]))
                .with_annotation(throws(&["Ljava/lang/Exception;"])),
        )];
    let api = convert(&classes, Visibility::Public);
    let io = api.class(api.find_class("p", "Io").unwrap());

    let read = api.executable(io.methods[0]);
    let exceptions: Vec<_> = read.exceptions.iter().map(|e| api.display_type(*e)).collect();
    assert_eq!(exceptions, ["java.io.IOException"]);
    // Markers never show up as annotations
    assert!(read.annotations.is_empty());

    let call = api.executable(io.methods[1]);
    let exceptions: Vec<_> = call.exceptions.iter().map(|e| api.display_type(*e)).collect();
    assert_eq!(exceptions, ["X"]);
}

#[test]
pub fn undeclared_type_variable_is_fatal() {
    let classes = vec![RawClass::new("Lp/Broken;", flags::PUBLIC)
        .with_superclass(OBJECT)
        .with_field(
            RawField::new("value", flags::PUBLIC, OBJECT).with_annotation(signature(&["TQ;"])),
        )];
    let result = apisig::ClassConverter::default().convert("test", &classes);
    assert_matches!(result, Err(Error::InvariantViolation(_)));
}

#[test]
pub fn malformed_signature_is_fatal() {
    let classes = vec![RawClass::new("Lp/Broken;", flags::PUBLIC)
        .with_superclass(OBJECT)
        .with_annotation(signature(&["<T:Ljava/lang/Object;Ljava/lang/Object;"]))];
    let result = apisig::ClassConverter::default().convert("test", &classes);
    assert_matches!(result, Err(Error::ParseFailed(_)));
}

#[test]
pub fn cyclic_bounds_and_early_inner_class() {
    let classes = vec![
        // Bounded by a variable of its enclosing class, which is not
        // converted yet
        RawClass::new("Lp/Outer$Inner;", flags::PUBLIC)
            .with_superclass(OBJECT)
            .with_annotation(enclosing_class("Lp/Outer;"))
            .with_annotation(signature(&["<U:TT;>Ljava/lang/Object;"]))
            .with_field(
                RawField::new("value", flags::PUBLIC, OBJECT).with_annotation(signature(&["TU;"])),
            ),
        RawClass::new("Lp/Outer;", flags::PUBLIC)
            .with_superclass(OBJECT)
            .with_annotation(signature(&["<T:Lp/Outer$Inner<*>;>Ljava/lang/Object;"]))
            .with_annotation(member_classes(&["Lp/Outer$Inner;"]))
            .with_field(
                RawField::new("inner", flags::PUBLIC, OBJECT).with_annotation(signature(&["TT;"])),
            ),
        RawClass::new("Lp/A;", flags::PUBLIC)
            .with_superclass(OBJECT)
            .with_annotation(signature(&["<X:Lp/B<*>;>Ljava/lang/Object;"]))
            .with_field(RawField::new("x", flags::PUBLIC, OBJECT).with_annotation(signature(&["TX;"]))),
        RawClass::new("Lp/B;", flags::PUBLIC)
            .with_superclass(OBJECT)
            .with_annotation(signature(&["<Y:Lp/A<*>;>Ljava/lang/Object;"]))
            .with_field(RawField::new("y", flags::PUBLIC, OBJECT).with_annotation(signature(&["TY;"]))),
    ];
    let api = convert(&classes, Visibility::Public);

    let outer_id = api.find_class("p", "Outer").unwrap();
    let inner_id = api.find_class("p", "Outer$Inner").unwrap();
    let outer = api.class(outer_id);
    let inner = api.class(inner_id);
    assert!(outer.inner_classes.contains(&inner_id));

    // Converted exactly once: members are not duplicated
    for name in ["Outer", "Outer$Inner", "A", "B"] {
        let class = api.class(api.find_class("p", name).unwrap());
        assert_eq!(class.type_parameters.len(), 1, "{name}");
        assert_eq!(class.fields.len(), 1, "{name}");
    }

    let t = api.type_variable(outer.type_parameters[0]);
    assert_eq!(api.display_type(t.upper_bounds[0]), "p.Outer.Inner<?>");
    let u = api.type_variable(inner.type_parameters[0]);
    assert_matches!(
        api.type_ref(u.upper_bounds[0]),
        TypeReference::TypeVariable(v) if *v == outer.type_parameters[0]
    );
    assert_eq!(api.display_type(u.upper_bounds[0]), "T");
    assert_matches!(
        api.type_ref(api.field(inner.fields[0]).ty.unwrap()),
        TypeReference::TypeVariable(v) if *v == inner.type_parameters[0]
    );

    let a = api.class(api.find_class("p", "A").unwrap());
    let b = api.class(api.find_class("p", "B").unwrap());
    let x = api.type_variable(a.type_parameters[0]);
    let y = api.type_variable(b.type_parameters[0]);
    assert_eq!(api.display_type(x.upper_bounds[0]), "p.B<?>");
    assert_eq!(api.display_type(y.upper_bounds[0]), "p.A<?>");
}
