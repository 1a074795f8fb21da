//! Coordinator (C6): `validate(file) -> ValidatedFile | ValidationError`.
//!
//! Runs the ten passes of §4.1 in order, each observing every state change
//! of the one before it: reset state, check `syntax`, validate the
//! package, validate file options, register every type, validate enums,
//! validate messages (pushing/popping scope around nested ones), validate
//! services and resolve their RPC types, build the dependency graph and
//! detect cycles, then re-sweep every field's `Named` type (and
//! re-confirm every RPC type) against the now-finalized Symbol Table. The
//! register-then-validate split is what lets two messages in the same
//! file refer to each other regardless of declaration order.

use std::collections::HashMap;

use crate::ast::{self, Type};
use crate::dependency_graph::DependencyGraph;
use crate::error::Result;
use crate::fqn::Fqn;
use crate::resolver::{self, Resolved};
use crate::state::{Definition, ImportedTypes, ValidationState};
use crate::validators::{self, enum_, field, message, option, service};

/// The output of a successful `validate` call: the (unchanged) input AST,
/// the finished `ValidationState` (Symbol Table + Dependency Set, per
/// §6's "Output on success"), and the per-definition validated option
/// tables and resolved type references the descriptor builder needs.
pub struct ValidatedFile<'a> {
    pub file: &'a ast::File,
    pub state: ValidationState<'a>,
    pub file_options: option::FileOptionValues<'a>,
    /// Keyed by message FQN (dotless).
    pub messages: HashMap<String, message::ValidatedMessage<'a>>,
    /// Keyed by enum FQN (dotless).
    pub enums: HashMap<String, enum_::ValidatedEnum<'a>>,
    /// Keyed by service simple name (services never nest).
    pub services: HashMap<String, service::ValidatedService<'a>>,
    /// Keyed by (declaring message FQN, field name); holds every `Named`
    /// field's resolution, including a map field's `Named` value type.
    pub field_types: HashMap<(String, String), Resolved>,
    /// Keyed by (service name, RPC name).
    pub rpc_types: HashMap<(String, String), (Resolved, Resolved)>,
}

pub fn validate<'a>(file: &'a ast::File, imported_types: ImportedTypes) -> Result<ValidatedFile<'a>> {
    // Pass 2: syntax.
    validators::file::validate_syntax(file)?;

    // Pass 1 (state reset) + pass 3 (package).
    let package = file.package.clone().unwrap_or_default();
    validators::file::validate_package(&package)?;
    for import in &file.imports {
        validators::file::validate_import(import)?;
    }
    let mut state = ValidationState::new(package.clone(), imported_types);
    let root = Fqn::from_str(&package);

    // Pass 4: file options.
    let file_options = option::validate_file_options(&file.options, "file")?;

    // Pass 5: register every top-level and nested message/enum.
    for top_message in &file.messages {
        resolver::register_message(&mut state, &root, top_message)?;
    }
    for top_enum in &file.enums {
        resolver::register_enum(&mut state, &root, top_enum)?;
    }

    // Pass 6: top-level enums. Nested enums validate during pass 7.
    let mut enums = HashMap::new();
    for top_enum in &file.enums {
        let fqn = root.join(&top_enum.name);
        enums.insert(fqn.as_str().to_owned(), enum_::validate_enum(top_enum)?);
    }

    // Pass 7: messages, depth-first, pushing/popping scope around nesting.
    let mut messages = HashMap::new();
    for top_message in &file.messages {
        walk_message(&mut state, &root, top_message, &mut messages, &mut enums)?;
    }

    // Pass 8: services, resolving RPC input/output types immediately.
    let mut services = HashMap::new();
    let mut rpc_types = HashMap::new();
    for svc in &file.services {
        services.insert(svc.name.clone(), service::validate_service(svc)?);
        for rpc in &svc.rpcs {
            let referenced_in = format!("service {}", svc.name);
            let input = resolver::resolve(&state, &rpc.input_type, &referenced_in, rpc.span)?;
            let output = resolver::resolve(&state, &rpc.output_type, &referenced_in, rpc.span)?;
            rpc_types.insert((svc.name.clone(), rpc.name.clone()), (input, output));
        }
    }

    // Pass 9: dependency graph + cycle detection.
    let graph = DependencyGraph::build(&mut state);
    graph.detect_cycle(&state)?;

    // Pass 10: re-sweep every field's `Named` type (first resolution for
    // fields, since §4.3 defers it here) and re-confirm every RPC type.
    let mut field_types = HashMap::new();
    for top_message in &file.messages {
        resolve_message_fields(&mut state, &root, top_message, &messages, &mut field_types)?;
    }
    for svc in &file.services {
        let referenced_in = format!("service {}", svc.name);
        for rpc in &svc.rpcs {
            resolver::resolve(&state, &rpc.input_type, &referenced_in, rpc.span)?;
            resolver::resolve(&state, &rpc.output_type, &referenced_in, rpc.span)?;
        }
    }

    Ok(ValidatedFile {
        file,
        state,
        file_options,
        messages,
        enums,
        services,
        field_types,
        rpc_types,
    })
}

fn walk_message<'a>(
    state: &mut ValidationState<'a>,
    parent: &Fqn,
    msg: &'a ast::Message,
    messages: &mut HashMap<String, message::ValidatedMessage<'a>>,
    enums: &mut HashMap<String, enum_::ValidatedEnum<'a>>,
) -> Result<()> {
    let fqn = parent.join(&msg.name);
    state.push_scope(fqn.clone());

    let validated = message::validate_message(msg)?;
    messages.insert(fqn.as_str().to_owned(), validated);

    for nested_enum in &msg.nested_enums {
        let nested_fqn = fqn.join(&nested_enum.name);
        enums.insert(nested_fqn.as_str().to_owned(), enum_::validate_enum(nested_enum)?);
    }
    for nested_message in &msg.nested_messages {
        walk_message(state, &fqn, nested_message, messages, enums)?;
    }

    state.pop_scope();
    Ok(())
}

fn resolve_message_fields<'a>(
    state: &mut ValidationState<'a>,
    parent: &Fqn,
    msg: &'a ast::Message,
    messages: &HashMap<String, message::ValidatedMessage<'a>>,
    field_types: &mut HashMap<(String, String), Resolved>,
) -> Result<()> {
    let fqn = parent.join(&msg.name);
    state.push_scope(fqn.clone());

    let field_options = messages.get(fqn.as_str()).map(|v| &v.field_options);

    for f in &msg.fields {
        resolve_field_type(state, &fqn, f, field_options, field_types)?;
    }
    for oneof in &msg.oneofs {
        for f in &oneof.fields {
            resolve_field_type(state, &fqn, f, field_options, field_types)?;
        }
    }
    for nested in &msg.nested_messages {
        resolve_message_fields(state, &fqn, nested, messages, field_types)?;
    }

    state.pop_scope();
    Ok(())
}

/// Resolves a single field's `Named` type (or a `Named` map value type),
/// records the resolution, and — for a packed `Named` field — runs the
/// packability check that had to wait until resolution told us whether the
/// reference is an enum (§4.3).
fn resolve_field_type<'a>(
    state: &mut ValidationState<'a>,
    enclosing: &Fqn,
    f: &'a ast::Field,
    field_options: Option<&HashMap<String, option::FieldOptionValues<'a>>>,
    field_types: &mut HashMap<(String, String), Resolved>,
) -> Result<()> {
    let named_ref = match &f.ty {
        Type::Named(r) => Some(r),
        Type::Map { value, .. } => match value.as_ref() {
            Type::Named(r) => Some(r),
            _ => None,
        },
        Type::Scalar(_) => None,
    };

    let Some(reference) = named_ref else { return Ok(()) };
    let resolved = resolver::resolve(state, reference, enclosing.as_str(), f.span)?;

    if matches!(f.ty, Type::Named(_)) {
        let is_enum = matches!(state.symbols.get(&resolved.fqn), Some(Definition::Enum(_)));
        let packed = field_options
            .and_then(|opts| opts.get(&f.name))
            .and_then(|o| o.packed)
            .unwrap_or(false);
        field::validate_packed_legality(enclosing.as_str(), f, packed, is_enum)?;
    }

    field_types.insert((enclosing.as_str().to_owned(), f.name.clone()), resolved);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Comments, Field, ImportModifier, Import, Label, Message, Rpc, Scalar, Service, Span};
    use crate::error::ValidationError;

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

    fn base_file() -> ast::File {
        ast::File {
            syntax: "proto3".into(),
            package: None,
            imports: vec![],
            options: vec![],
            messages: vec![],
            enums: vec![],
            services: vec![],
        }
    }

    #[test]
    fn validates_simple_message() {
        let mut file = base_file();
        file.package = Some("pkg".into());
        file.messages = vec![message("M", vec![scalar_field("x", 1, Scalar::Int32)])];
        let validated = validate(&file, ImportedTypes::new()).unwrap();
        assert!(validated.messages.contains_key("pkg.M"));
    }

    #[test]
    fn resolves_forward_reference_between_sibling_messages() {
        let mut file = base_file();
        file.messages = vec![
            message("A", vec![named_field("b", 1, "B")]),
            message("B", vec![scalar_field("x", 1, Scalar::Int32)]),
        ];
        let validated = validate(&file, ImportedTypes::new()).unwrap();
        let resolved = validated.field_types.get(&("A".to_string(), "b".to_string())).unwrap();
        assert_eq!(resolved.canonical, ".B");
    }

    #[test]
    fn detects_cyclic_message_dependency() {
        let mut file = base_file();
        file.messages = vec![
            message("A", vec![named_field("b", 1, "B")]),
            message("B", vec![named_field("a", 1, "A")]),
        ];
        let err = validate(&file, ImportedTypes::new()).unwrap_err();
        assert!(matches!(err, ValidationError::CyclicDependency { .. }));
    }

    #[test]
    fn undefined_type_reference_rejected() {
        let mut file = base_file();
        file.messages = vec![message("A", vec![named_field("b", 1, "Nope")])];
        let err = validate(&file, ImportedTypes::new()).unwrap_err();
        assert!(matches!(err, ValidationError::UndefinedType { .. }));
    }

    #[test]
    fn cross_package_service_reference_passes_through() {
        let mut file = base_file();
        file.package = Some("mattis.dev.v1.regionspy".into());
        file.messages = vec![message("R", vec![scalar_field("n", 1, Scalar::String)])];
        let mut imported = ImportedTypes::new();
        imported.insert("Empty", "google/protobuf/empty.proto");
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

        let validated = validate(&file, imported).unwrap();
        let (input, output) =
            validated.rpc_types.get(&("S".to_string(), "Status".to_string())).unwrap();
        assert_eq!(input.canonical, ".google.protobuf.Empty");
        assert_eq!(output.canonical, ".mattis.dev.v1.regionspy.R");
    }

    #[test]
    fn weak_import_with_unresolved_target_is_tolerated() {
        let mut file = base_file();
        file.imports = vec![Import {
            path: "optional/missing.proto".into(),
            modifier: ImportModifier::Weak,
            span: span(),
        }];
        file.messages = vec![message("M", vec![])];
        assert!(validate(&file, ImportedTypes::new()).is_ok());
    }
}
