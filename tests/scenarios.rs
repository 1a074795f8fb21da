//! Crate-level integration tests for the six concrete scenarios (S1–S6)
//! and a few of the universal properties (§8). Each test builds its AST by
//! hand — there is no parser in this crate — and calls `validate` directly,
//! the same way a caller assembling a file from some other front end would.

use proto3_descriptor_core::ast::{
    Comments, Enum, EnumValue, Field, File, Import, ImportModifier, Label, Message, OptionEntry,
    OptionName, OptionValue, Reserved, Rpc, Scalar, Service, Span, Type,
};
use proto3_descriptor_core::state::ImportedTypes;
use proto3_descriptor_core::{validate, Config, ValidationError};

fn span() -> Span {
    Span::default()
}

fn scalar_field(name: &str, number: i32, scalar: Scalar) -> Field {
    Field {
        name: name.into(),
        number,
        ty: Type::Scalar(scalar),
        label: Label::Singular,
        oneof_index: None,
        options: vec![],
        comments: Comments::default(),
        span: span(),
    }
}

fn named_field(name: &str, number: i32, reference: &str) -> Field {
    Field {
        name: name.into(),
        number,
        ty: Type::Named(reference.into()),
        label: Label::Singular,
        oneof_index: None,
        options: vec![],
        comments: Comments::default(),
        span: span(),
    }
}

fn map_field(name: &str, number: i32, key: Scalar, value: Type) -> Field {
    Field {
        name: name.into(),
        number,
        ty: Type::Map { key, value: Box::new(value) },
        label: Label::Singular,
        oneof_index: None,
        options: vec![],
        comments: Comments::default(),
        span: span(),
    }
}

fn message(name: &str, fields: Vec<Field>) -> Message {
    Message {
        name: name.into(),
        fields,
        oneofs: vec![],
        nested_messages: vec![],
        nested_enums: vec![],
        options: vec![],
        reserved: vec![],
        comments: Comments::default(),
        span: span(),
    }
}

fn base_file() -> File {
    File {
        syntax: "proto3".into(),
        package: None,
        imports: vec![],
        options: vec![],
        messages: vec![],
        enums: vec![],
        services: vec![],
    }
}

fn bool_option(name: &str, value: bool) -> OptionEntry {
    OptionEntry {
        name: OptionName { name: name.into(), is_custom: false, path_parts: vec![] },
        value: OptionValue::Bool(value),
        span: span(),
    }
}

/// S1 — cross-package passthrough: a service whose RPCs reference both a
/// local message and an imported well-known type; the local reference is
/// package-qualified, the imported one passes through unqualified (§4.2).
#[test]
fn s1_cross_package_passthrough() {
    let mut file = base_file();
    file.package = Some("mattis.dev.v1.regionspy".into());
    file.messages = vec![message("R", vec![scalar_field("n", 1, Scalar::String)])];

    let mut imported = ImportedTypes::new();
    imported.insert("Empty", "google/protobuf/empty.proto");
    file.imports = vec![Import {
        path: "google/protobuf/empty.proto".into(),
        modifier: ImportModifier::Plain,
        span: span(),
    }];

    file.services = vec![Service {
        name: "S".into(),
        rpcs: vec![
            Rpc {
                name: "Status".into(),
                input_type: "google.protobuf.Empty".into(),
                output_type: "R".into(),
                client_streaming: false,
                server_streaming: false,
                options: vec![],
                comments: Comments::default(),
                span: span(),
            },
            Rpc {
                name: "Analyze".into(),
                input_type: "R".into(),
                output_type: "google.protobuf.Empty".into(),
                client_streaming: false,
                server_streaming: false,
                options: vec![],
                comments: Comments::default(),
                span: span(),
            },
        ],
        options: vec![],
        comments: Comments::default(),
        span: span(),
    }];

    let validated = validate(&file, imported).expect("S1 should validate");
    let descriptor = validated.to_descriptor(&Config::new());

    let svc = &descriptor.service[0];
    assert_eq!(svc.method[0].input_type.as_deref(), Some(".google.protobuf.Empty"));
    assert_eq!(svc.method[0].output_type.as_deref(), Some(".mattis.dev.v1.regionspy.R"));
    assert_eq!(svc.method[1].input_type.as_deref(), Some(".mattis.dev.v1.regionspy.R"));
    assert_eq!(svc.method[1].output_type.as_deref(), Some(".google.protobuf.Empty"));
}

/// S2 — map expansion: a `map<string,string>` field expands to a synthetic
/// `MetadataEntry` message and a rewritten repeated-message field (§4.9 rule 2).
#[test]
fn s2_map_expansion() {
    let mut file = base_file();
    file.messages = vec![message(
        "Req",
        vec![map_field("metadata", 1, Scalar::String, Type::Scalar(Scalar::String))],
    )];

    let validated = validate(&file, ImportedTypes::new()).expect("S2 should validate");
    let descriptor = validated.to_descriptor(&Config::new());

    let req = &descriptor.message_type[0];
    let entry = &req.nested_type[0];
    assert_eq!(entry.name.as_deref(), Some("MetadataEntry"));
    assert_eq!(entry.options.as_ref().unwrap().map_entry, Some(true));
    assert_eq!(entry.field[0].name.as_deref(), Some("key"));
    assert_eq!(entry.field[0].number, Some(1));
    assert_eq!(entry.field[1].name.as_deref(), Some("value"));
    assert_eq!(entry.field[1].number, Some(2));

    let outer = &req.field[0];
    assert_eq!(
        outer.r#type,
        Some(prost_types::field_descriptor_proto::Type::Message as i32)
    );
    assert_eq!(outer.type_name.as_deref(), Some(".Req.MetadataEntry"));
    assert_eq!(
        outer.label,
        Some(prost_types::field_descriptor_proto::Label::Repeated as i32)
    );
}

/// S3 — cycle detection: two messages referencing each other by singular
/// (non-repeated) fields form a cycle that must be rejected (§4.5, invariant 6).
#[test]
fn s3_cycle_detection() {
    let mut file = base_file();
    file.messages = vec![
        message("A", vec![named_field("b", 1, "B")]),
        message("B", vec![named_field("a", 1, "A")]),
    ];

    let err = validate(&file, ImportedTypes::new()).expect_err("S3 should reject the cycle");
    match err {
        ValidationError::CyclicDependency { path } => {
            assert_eq!(path.first(), path.last());
            assert!(path.contains(&"A".to_string()));
            assert!(path.contains(&"B".to_string()));
        }
        other => panic!("expected CyclicDependency, got {other:?}"),
    }
}

/// S4 — reserved collision: a field number colliding with a `reserved`
/// declaration in the same message is rejected (§4.4).
#[test]
fn s4_reserved_collision() {
    let mut m = message("M", vec![scalar_field("x", 5, Scalar::Int32)]);
    m.reserved = vec![Reserved::Number(5)];
    let mut file = base_file();
    file.messages = vec![m];

    let err = validate(&file, ImportedTypes::new()).expect_err("S4 should reject the collision");
    assert!(matches!(err, ValidationError::ReservedFieldNumber { number: 5, .. }));
}

/// S5 — enum first value: proto3 requires the first enum value to be 0 (§4.8).
#[test]
fn s5_enum_first_value_not_zero() {
    let e = Enum {
        name: "E".into(),
        values: vec![
            EnumValue { name: "A".into(), number: 1, options: vec![], comments: Comments::default(), span: span() },
            EnumValue { name: "B".into(), number: 0, options: vec![], comments: Comments::default(), span: span() },
        ],
        options: vec![],
        comments: Comments::default(),
        span: span(),
    };
    let mut file = base_file();
    file.enums = vec![e];

    let err = validate(&file, ImportedTypes::new()).expect_err("S5 should reject");
    assert!(matches!(err, ValidationError::FirstEnumValueNotZero { ref enum_name, .. } if enum_name == "E"));
}

/// S6 — invalid map key: `float`/`double`/`bytes` are not legal map key
/// types (§4.3).
#[test]
fn s6_invalid_map_key() {
    let mut file = base_file();
    file.messages = vec![message(
        "M",
        vec![map_field("bad", 1, Scalar::Float, Type::Scalar(Scalar::Int32))],
    )];

    let err = validate(&file, ImportedTypes::new()).expect_err("S6 should reject");
    assert!(matches!(err, ValidationError::InvalidMapKeyType { ref key_type, .. } if key_type == "float"));
}

/// Universal property 3 (§8): every successfully validated enum's first
/// value has number 0.
#[test]
fn property_enum_zero_invariant_holds_across_multiple_enums() {
    let mut file = base_file();
    file.enums = vec![
        Enum {
            name: "First".into(),
            values: vec![EnumValue {
                name: "FIRST_UNSPECIFIED".into(),
                number: 0,
                options: vec![],
                comments: Comments::default(),
                span: span(),
            }],
            options: vec![],
            comments: Comments::default(),
            span: span(),
        },
        Enum {
            name: "Second".into(),
            values: vec![EnumValue {
                name: "SECOND_UNSPECIFIED".into(),
                number: 0,
                options: vec![],
                comments: Comments::default(),
                span: span(),
            }],
            options: vec![],
            comments: Comments::default(),
            span: span(),
        },
    ];

    let validated = validate(&file, ImportedTypes::new()).unwrap();
    let descriptor = validated.to_descriptor(&Config::new());
    for e in &descriptor.enum_type {
        assert_eq!(e.value[0].number, Some(0));
    }
}

/// Universal property 4 (§8): a field inside a `oneof` can never be
/// repeated, explicitly optional, or map-typed.
#[test]
fn property_oneof_exclusivity_rejects_repeated_member() {
    use proto3_descriptor_core::ast::Oneof;

    let mut repeated_member = scalar_field("x", 1, Scalar::Int32);
    repeated_member.label = Label::Repeated;

    let mut m = message("M", vec![]);
    m.oneofs = vec![Oneof {
        name: "choice".into(),
        fields: vec![repeated_member],
        options: vec![],
        comments: Comments::default(),
        span: span(),
    }];
    let mut file = base_file();
    file.messages = vec![m];

    let err = validate(&file, ImportedTypes::new()).expect_err("repeated oneof member is illegal");
    assert!(matches!(err, ValidationError::RepeatedOneof { .. }));
}

/// Universal property 8 (§8): re-running validation on the same input is
/// idempotent — byte-identical success or error.
#[test]
fn property_validation_is_idempotent() {
    let mut file = base_file();
    file.package = Some("pkg".into());
    file.messages = vec![message("M", vec![scalar_field("x", 1, Scalar::Int32)])];

    let first = validate(&file, ImportedTypes::new()).unwrap().to_descriptor(&Config::new());
    let second = validate(&file, ImportedTypes::new()).unwrap().to_descriptor(&Config::new());
    assert_eq!(first, second);
}

/// File-level options validate with their specific shapes (§4.7), and an
/// `optimize_for` value outside the closed identifier set is rejected.
#[test]
fn file_options_reject_unrecognized_optimize_for_value() {
    let mut file = base_file();
    file.options = vec![OptionEntry {
        name: OptionName { name: "optimize_for".into(), is_custom: false, path_parts: vec![] },
        value: OptionValue::Identifier("FASTEST".into()),
        span: span(),
    }];

    let err = validate(&file, ImportedTypes::new()).expect_err("unknown optimize_for value");
    assert!(matches!(err, ValidationError::InvalidOptionValue { .. }));
}

/// `message_set_wire_format`/`deprecated` are message-level options; this
/// also exercises `build_message_options` returning a populated
/// `MessageOptions` on the descriptor.
#[test]
fn message_deprecated_option_reaches_the_descriptor() {
    let mut m = message("Old", vec![scalar_field("x", 1, Scalar::Int32)]);
    m.options = vec![bool_option("deprecated", true)];
    let mut file = base_file();
    file.messages = vec![m];

    let validated = validate(&file, ImportedTypes::new()).unwrap();
    let descriptor = validated.to_descriptor(&Config::new());
    assert_eq!(descriptor.message_type[0].options.as_ref().unwrap().deprecated, Some(true));
}

/// A custom option (parenthesized dotted path) on a field is preserved as
/// an uninterpreted option rather than rejected (§4.7, §4.9 rule 5).
#[test]
fn custom_field_option_becomes_uninterpreted() {
    let mut f = scalar_field("x", 1, Scalar::Int32);
    f.options = vec![OptionEntry {
        name: OptionName { name: "my.custom.opt".into(), is_custom: true, path_parts: vec![] },
        value: OptionValue::Bool(true),
        span: span(),
    }];
    let mut file = base_file();
    file.messages = vec![message("M", vec![f])];

    let validated = validate(&file, ImportedTypes::new()).unwrap();
    let descriptor = validated.to_descriptor(&Config::new());
    let opts = descriptor.message_type[0].field[0].options.as_ref().unwrap();
    assert_eq!(opts.uninterpreted_option.len(), 1);
    assert!(opts.uninterpreted_option[0].name[0].is_extension);
}
