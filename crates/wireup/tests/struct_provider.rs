// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_docs, reason = "This is a test module")]

//! Integration tests for struct providers using only public API.

use std::sync::Arc;

use rstest::rstest;
use wireup::{
    Issue, ParamConfig, ProviderBuilder, ProviderKind, Reflect, ReturnConfig, Scope, Slot, StructProviderBuilder, Symbol,
    TypeDescriptor, Value, Valuer, structure,
};

#[derive(Clone)]
struct Listener {
    address: String,
    backlog: u32,
    filters: Vec<String>,
}

impl Reflect for Listener {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::structure::<Self>()
            .field::<String>("address")
            .field::<u32>("backlog")
            .field::<Vec<String>>("filters")
            .construct(|fields| {
                Ok(Self {
                    address: fields.take()?,
                    backlog: fields.take()?,
                    filters: fields.take()?,
                })
            })
    }
}

trait Acceptor {}

impl Reflect for dyn Acceptor {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::interface::<Self>().implemented_by::<Listener>().build()
    }
}

trait Closer {}

impl Reflect for dyn Closer {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::interface::<Self>().build()
    }
}

#[test]
fn derives_dependencies_from_fields() {
    let edge = Symbol::new("edge");
    let mut builder = structure::<Listener>();
    builder
        .field("address", ParamConfig::new().by_name("listen_address"))
        .field("backlog", ParamConfig::new().optional(true))
        .field("filters", ParamConfig::new().by_tags([edge.clone()]).as_collector(true));

    let provider = builder.provider();
    assert!(provider.validate().is_ok());
    assert_eq!(provider.kind(), ProviderKind::Struct);

    let dependencies = provider.dependencies();
    assert_eq!(dependencies.len(), 3);

    let address = dependencies.get(0).unwrap();
    assert_eq!(address.name(), Some("listen_address"));
    assert_eq!(address.ty(), &TypeDescriptor::of::<String>());
    assert_eq!(address.valuer(), &Valuer::Param(0));

    let backlog = dependencies.get(1).unwrap();
    assert!(backlog.is_optional());
    assert_eq!(backlog.ty(), &TypeDescriptor::of::<u32>());

    let filters = dependencies.get(2).unwrap();
    assert!(filters.is_collector());
    assert!(filters.tags().unwrap().contains(&edge));
    assert_eq!(filters.ty(), &TypeDescriptor::of::<String>());

    for dependency in dependencies {
        assert!(dependency.consumer().unwrap().ptr_eq(&provider));
    }
}

#[test]
fn struct_becomes_single_component() {
    let mut builder = structure::<Listener>();
    builder.component(
        ReturnConfig::new()
            .name("public")
            .expose_as([TypeDescriptor::of::<dyn Acceptor>()]),
    );

    let provider = builder.provider();
    assert!(provider.validate().is_ok());

    let components = provider.components();
    assert_eq!(components.len(), 1);

    let component = components.get(0).unwrap();
    assert_eq!(component.ty(), &TypeDescriptor::of::<Listener>());
    assert_eq!(component.name(), Some("public"));
    assert_eq!(component.valuer(), &Valuer::Index(0));
    assert!(component.exposed_as().unwrap().contains(&TypeDescriptor::of::<dyn Acceptor>()));
    assert!(component.provider().unwrap().ptr_eq(&provider));
}

#[test]
fn valuer_constructs_struct() {
    let provider = structure::<Listener>().provider();
    let inputs: Vec<Value> = vec![
        Arc::new(String::from("0.0.0.0:8080")),
        Arc::new(128_u32),
        Arc::new(vec![String::from("auth")]),
    ];

    let output = provider.valuer().value(&inputs);
    let values = output.values().unwrap();
    let listener = values[0].downcast_ref::<Listener>().unwrap();

    assert_eq!(listener.address, "0.0.0.0:8080");
    assert_eq!(listener.backlog, 128);
    assert_eq!(listener.filters, vec![String::from("auth")]);
}

#[test]
fn valuer_rejects_mismatched_inputs() {
    let provider = structure::<Listener>().provider();
    let inputs: Vec<Value> = vec![Arc::new(1_u8)];

    assert!(provider.valuer().value(&inputs).is_error());
}

#[rstest]
#[case::int(TypeDescriptor::of::<i32>())]
#[case::string(TypeDescriptor::of::<String>())]
#[case::sequence(TypeDescriptor::of::<Vec<Listener>>())]
#[case::pointer(TypeDescriptor::of::<Box<Listener>>())]
fn non_struct_targets_fail_validation(#[case] target: TypeDescriptor) {
    let provider = StructProviderBuilder::new(Some(target.clone())).provider();

    let error = provider.validate().unwrap_err();
    assert_eq!(error.issues(), &[Issue::NotConstructible { found: Some(target) }]);
    assert!(matches!(provider.valuer(), Valuer::Error(_)));
    assert!(provider.components().is_empty());
}

#[test]
fn unknown_field_fails_validation() {
    let mut builder = structure::<Listener>();
    builder.field("port", ParamConfig::new().by_name("port"));

    let error = builder.provider().validate().unwrap_err();
    assert_eq!(
        error.issues(),
        &[Issue::FieldNotFound {
            ty: TypeDescriptor::of::<Listener>(),
            name: "port".into(),
        }]
    );
}

#[test]
fn collector_on_scalar_field_fails_validation() {
    let mut builder = structure::<Listener>();
    builder.field("backlog", ParamConfig::new().as_collector(true));

    let error = builder.provider().validate().unwrap_err();
    assert!(matches!(
        error.issues(),
        [Issue::ParamConfigInvalid { slot: Slot::Field(name), .. }] if name == "backlog"
    ));
}

#[test]
fn exposing_as_unimplemented_interface_fails_validation() {
    let mut builder = structure::<Listener>();
    builder.component(ReturnConfig::new().expose_as([TypeDescriptor::of::<dyn Closer>()]));

    let error = builder.provider().validate().unwrap_err();
    assert_eq!(
        error.issues(),
        &[Issue::ExposedTypeMismatch {
            slot: Slot::Index(0),
            produced: TypeDescriptor::of::<Listener>(),
            exposed: TypeDescriptor::of::<dyn Closer>(),
        }]
    );
}

#[test]
fn display_and_equality() {
    let scope = Scope::new("connection");
    let mut builder = structure::<Listener>();
    builder.in_scope(scope.clone());

    let target = TypeDescriptor::of::<Listener>();
    assert_eq!(builder.provider().to_string(), format!("Struct[{target}] in connection"));

    let clone = builder.clone();
    assert_eq!(clone, builder);

    let mut renamed = builder.clone();
    renamed.field("address", ParamConfig::new().by_name("bind"));
    assert_ne!(renamed, builder);
    assert_eq!(builder.provider().dependencies().get(0).unwrap().name(), None);
}
