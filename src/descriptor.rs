//! Descriptor Builder (C7, contract-level per §4.9).
//!
//! A pure, infallible translation from an already-validated file into the
//! canonical `prost_types::FileDescriptorProto` wire shape. `build` is never
//! called on a file that hasn't already gone through `coordinator::validate`
//! — so where `validators::option` fails fast on a malformed well-known
//! option value (§4.7), that path and this one never fire on the same
//! input: by the time a file reaches here, every recognized option has
//! already been shape-checked, and everything else was already routed to
//! `uninterpreted` by the option validator. This module's only remaining
//! job for options is translating those two buckets into the descriptor's
//! typed option fields and its `uninterpreted_option` list.
//!
//! Every `prost_types` struct literal below ends in `..Default::default()`:
//! `descriptor.proto` gains fields across protobuf releases, and pinning to
//! exactly the fields this crate cares about (rather than enumerating every
//! field the vendored version happens to have) keeps this module working
//! across `prost-types` point releases.

use prost_types::field_descriptor_proto::{Label as ProtoLabel, Type as ProtoType};
use prost_types::{
    descriptor_proto, field_options, file_options, method_options, source_code_info,
    uninterpreted_option, DescriptorProto, EnumDescriptorProto, EnumOptions,
    EnumValueDescriptorProto, EnumValueOptions, FieldDescriptorProto, FieldOptions,
    FileDescriptorProto, FileOptions, MessageOptions, MethodDescriptorProto, MethodOptions,
    OneofDescriptorProto, ServiceDescriptorProto, ServiceOptions, SourceCodeInfo,
    UninterpretedOption,
};

use crate::ast::{self, Label, OptionValue, Reserved, Scalar};
use crate::coordinator::ValidatedFile;
use crate::fqn::Fqn;
use crate::state::Definition;
use crate::validators::option::{
    EnumOptionValues, EnumValueOptionValues, FieldOptionValues, FileOptionValues,
    MessageOptionValues, MethodOptionValues, ServiceOptionValues,
};

/// Builds the `FileDescriptorProto` for an already-validated file. Source
/// info is attached only when `generate_source_info` is set, mirroring the
/// `Config` knob of the same name (§6).
pub fn build(validated: &ValidatedFile, generate_source_info: bool) -> FileDescriptorProto {
    let package = validated.file.package.clone();
    let root = Fqn::from_str(package.as_deref().unwrap_or(""));
    let mut locations = Vec::new();

    let mut message_type = Vec::new();
    for (i, message) in validated.file.messages.iter().enumerate() {
        let path = vec![4, i as i32];
        message_type.push(build_message(
            validated,
            &root,
            message,
            &path,
            generate_source_info,
            &mut locations,
        ));
    }

    let mut enum_type = Vec::new();
    for (i, e) in validated.file.enums.iter().enumerate() {
        let path = vec![5, i as i32];
        enum_type.push(build_enum(validated, &root, e, &path, generate_source_info, &mut locations));
    }

    let mut service = Vec::new();
    for (i, svc) in validated.file.services.iter().enumerate() {
        let path = vec![6, i as i32];
        service.push(build_service(validated, svc, &path, generate_source_info, &mut locations));
    }

    let (public_dependency, weak_dependency) = dependency_indexes(&validated.file.imports);

    FileDescriptorProto {
        name: None,
        package,
        dependency: validated.file.imports.iter().map(|i| i.path.clone()).collect(),
        public_dependency,
        weak_dependency,
        message_type,
        enum_type,
        service,
        options: build_file_options(&validated.file_options),
        source_code_info: generate_source_info.then(|| SourceCodeInfo { location: locations }),
        syntax: Some(validated.file.syntax.clone()),
        ..Default::default()
    }
}

fn dependency_indexes(imports: &[ast::Import]) -> (Vec<i32>, Vec<i32>) {
    let mut public = Vec::new();
    let mut weak = Vec::new();
    for (i, import) in imports.iter().enumerate() {
        match import.modifier {
            ast::ImportModifier::Public => public.push(i as i32),
            ast::ImportModifier::Weak => weak.push(i as i32),
            ast::ImportModifier::Plain => {}
        }
    }
    (public, weak)
}

fn record(
    locations: &mut Vec<source_code_info::Location>,
    enabled: bool,
    path: &[i32],
    span: ast::Span,
    comments: &ast::Comments,
) {
    if !enabled {
        return;
    }
    locations.push(source_code_info::Location {
        path: path.to_vec(),
        span: vec![span.line as i32, span.col as i32],
        leading_comments: (!comments.leading.is_empty()).then(|| comments.leading.clone()),
        trailing_comments: (!comments.trailing.is_empty()).then(|| comments.trailing.clone()),
        leading_detached_comments: comments.leading_detached.clone(),
        ..Default::default()
    });
}

/// One declared-or-synthetic (field, owning oneof index) pair in the order
/// they're emitted to `DescriptorProto.field`. The AST keeps oneof member
/// fields nested under their `Oneof`, so plain fields and oneof fields are
/// necessarily re-flattened here; true interleaving with plain fields as
/// written in source is not reconstructible from this AST shape.
fn flatten_fields(message: &ast::Message) -> Vec<(&ast::Field, Option<i32>)> {
    let mut out: Vec<(&ast::Field, Option<i32>)> = message.fields.iter().map(|f| (f, None)).collect();
    for (oidx, oneof) in message.oneofs.iter().enumerate() {
        out.extend(oneof.fields.iter().map(move |f| (f, Some(oidx as i32))));
    }
    out
}

fn build_message(
    validated: &ValidatedFile,
    parent: &Fqn,
    message: &ast::Message,
    path: &[i32],
    gen_info: bool,
    locations: &mut Vec<source_code_info::Location>,
) -> DescriptorProto {
    record(locations, gen_info, path, message.span, &message.comments);

    let fqn = parent.join(&message.name);
    let validated_msg = validated.messages.get(fqn.as_str());

    let mut field = Vec::new();
    let mut synthetic_nested = Vec::new();
    for (i, (f, oneof_index)) in flatten_fields(message).into_iter().enumerate() {
        let mut fpath = path.to_vec();
        fpath.push(2);
        fpath.push(i as i32);
        record(locations, gen_info, &fpath, f.span, &f.comments);

        let opts = validated_msg.and_then(|m| m.field_options.get(&f.name));
        match &f.ty {
            ast::Type::Map { key, value } => {
                let (entry, descriptor_field) =
                    build_map_field(validated, &fqn, f, *key, value, opts);
                synthetic_nested.push(entry);
                field.push(descriptor_field);
            }
            ast::Type::Scalar(s) => field.push(FieldDescriptorProto {
                name: Some(f.name.clone()),
                number: Some(f.number),
                label: Some(label_to_proto(f.label)),
                r#type: Some(scalar_to_proto_type(*s) as i32),
                oneof_index,
                json_name: Some(json_name_for(&f.name, opts)),
                options: build_field_options(opts),
                ..Default::default()
            }),
            ast::Type::Named(_) => {
                let resolved = validated.field_types.get(&(fqn.as_str().to_owned(), f.name.clone()));
                let is_enum = resolved
                    .map(|r| matches!(validated.state.symbols.get(&r.fqn), Some(Definition::Enum(_))))
                    .unwrap_or(false);
                field.push(FieldDescriptorProto {
                    name: Some(f.name.clone()),
                    number: Some(f.number),
                    label: Some(label_to_proto(f.label)),
                    r#type: Some(if is_enum { ProtoType::Enum } else { ProtoType::Message } as i32),
                    type_name: resolved.map(|r| r.canonical.clone()),
                    oneof_index,
                    json_name: Some(json_name_for(&f.name, opts)),
                    options: build_field_options(opts),
                    ..Default::default()
                });
            }
        }
    }

    let mut nested_type = Vec::new();
    for (i, nested) in message.nested_messages.iter().enumerate() {
        let mut npath = path.to_vec();
        npath.push(3);
        npath.push(i as i32);
        nested_type.push(build_message(validated, &fqn, nested, &npath, gen_info, locations));
    }
    nested_type.extend(synthetic_nested);

    let mut enum_type = Vec::new();
    for (i, e) in message.nested_enums.iter().enumerate() {
        let mut epath = path.to_vec();
        epath.push(4);
        epath.push(i as i32);
        enum_type.push(build_enum(validated, &fqn, e, &epath, gen_info, locations));
    }

    let mut oneof_decl = Vec::new();
    for (i, oneof) in message.oneofs.iter().enumerate() {
        let mut opath = path.to_vec();
        opath.push(8);
        opath.push(i as i32);
        record(locations, gen_info, &opath, oneof.span, &oneof.comments);
        oneof_decl.push(OneofDescriptorProto {
            name: Some(oneof.name.clone()),
            ..Default::default()
        });
    }

    let (reserved_range, reserved_name) = compress_reserved(&message.reserved);

    DescriptorProto {
        name: Some(message.name.clone()),
        field,
        nested_type,
        enum_type,
        oneof_decl,
        options: validated_msg.map(|m| build_message_options(&m.options)),
        reserved_range,
        reserved_name,
        ..Default::default()
    }
}

/// Expands one `map<K, V>` field per §4.9 rule 2: a synthetic `*Entry`
/// nested message (`key`@1, `value`@2, both optional, `map_entry = true`)
/// plus the field itself rewritten to `repeated Entry`.
fn build_map_field(
    validated: &ValidatedFile,
    enclosing: &Fqn,
    f: &ast::Field,
    key: Scalar,
    value: &ast::Type,
    opts: Option<&FieldOptionValues>,
) -> (DescriptorProto, FieldDescriptorProto) {
    let entry_name = map_entry_name(&f.name);
    let entry_fqn = enclosing.join(&entry_name);

    let (value_proto_type, value_type_name) = match value {
        ast::Type::Scalar(s) => (scalar_to_proto_type(*s), None),
        ast::Type::Named(_) => {
            let resolved = validated.field_types.get(&(enclosing.as_str().to_owned(), f.name.clone()));
            let is_enum = resolved
                .map(|r| matches!(validated.state.symbols.get(&r.fqn), Some(Definition::Enum(_))))
                .unwrap_or(false);
            let ty = if is_enum { ProtoType::Enum } else { ProtoType::Message };
            (ty, resolved.map(|r| r.canonical.clone()))
        }
        ast::Type::Map { .. } => unreachable!("a map value that is itself a map is rejected during validation"),
    };

    let key_field = FieldDescriptorProto {
        name: Some("key".to_owned()),
        number: Some(1),
        label: Some(ProtoLabel::Optional as i32),
        r#type: Some(scalar_to_proto_type(key) as i32),
        json_name: Some("key".to_owned()),
        ..Default::default()
    };
    let value_field = FieldDescriptorProto {
        name: Some("value".to_owned()),
        number: Some(2),
        label: Some(ProtoLabel::Optional as i32),
        r#type: Some(value_proto_type as i32),
        type_name: value_type_name,
        json_name: Some("value".to_owned()),
        ..Default::default()
    };

    let entry = DescriptorProto {
        name: Some(entry_name),
        field: vec![key_field, value_field],
        options: Some(MessageOptions { map_entry: Some(true), ..Default::default() }),
        ..Default::default()
    };

    let descriptor_field = FieldDescriptorProto {
        name: Some(f.name.clone()),
        number: Some(f.number),
        label: Some(ProtoLabel::Repeated as i32),
        r#type: Some(ProtoType::Message as i32),
        type_name: Some(entry_fqn.to_canonical()),
        json_name: Some(json_name_for(&f.name, opts)),
        options: build_field_options(opts),
        ..Default::default()
    };

    (entry, descriptor_field)
}

fn build_enum(
    validated: &ValidatedFile,
    parent: &Fqn,
    e: &ast::Enum,
    path: &[i32],
    gen_info: bool,
    locations: &mut Vec<source_code_info::Location>,
) -> EnumDescriptorProto {
    record(locations, gen_info, path, e.span, &e.comments);

    let fqn = parent.join(&e.name);
    let validated_enum = validated.enums.get(fqn.as_str());

    let mut value = Vec::new();
    for (i, v) in e.values.iter().enumerate() {
        let mut vpath = path.to_vec();
        vpath.push(2);
        vpath.push(i as i32);
        record(locations, gen_info, &vpath, v.span, &v.comments);

        let opts = validated_enum.and_then(|ve| ve.value_options.get(&v.name));
        value.push(EnumValueDescriptorProto {
            name: Some(v.name.clone()),
            number: Some(v.number),
            options: build_enum_value_options(opts),
            ..Default::default()
        });
    }

    EnumDescriptorProto {
        name: Some(e.name.clone()),
        value,
        options: validated_enum.map(|ve| build_enum_options(&ve.options)),
        ..Default::default()
    }
}

fn build_service(
    validated: &ValidatedFile,
    svc: &ast::Service,
    path: &[i32],
    gen_info: bool,
    locations: &mut Vec<source_code_info::Location>,
) -> ServiceDescriptorProto {
    record(locations, gen_info, path, svc.span, &svc.comments);

    let validated_svc = validated.services.get(&svc.name);

    let mut method = Vec::new();
    for (i, rpc) in svc.rpcs.iter().enumerate() {
        let mut mpath = path.to_vec();
        mpath.push(2);
        mpath.push(i as i32);
        record(locations, gen_info, &mpath, rpc.span, &rpc.comments);

        let (input, output) = validated
            .rpc_types
            .get(&(svc.name.clone(), rpc.name.clone()))
            .expect("every RPC type was resolved during coordinator pass 8");
        let opts = validated_svc.and_then(|vs| vs.method_options.get(&rpc.name));

        method.push(MethodDescriptorProto {
            name: Some(rpc.name.clone()),
            input_type: Some(input.canonical.clone()),
            output_type: Some(output.canonical.clone()),
            options: build_method_options(opts),
            client_streaming: Some(rpc.client_streaming),
            server_streaming: Some(rpc.server_streaming),
            ..Default::default()
        });
    }

    ServiceDescriptorProto {
        name: Some(svc.name.clone()),
        method,
        options: validated_svc.map(|vs| build_service_options(&vs.options)),
        ..Default::default()
    }
}

fn label_to_proto(label: Label) -> i32 {
    match label {
        Label::Singular | Label::Optional => ProtoLabel::Optional as i32,
        Label::Repeated => ProtoLabel::Repeated as i32,
    }
}

fn scalar_to_proto_type(s: Scalar) -> ProtoType {
    match s {
        Scalar::Double => ProtoType::Double,
        Scalar::Float => ProtoType::Float,
        Scalar::Int32 => ProtoType::Int32,
        Scalar::Int64 => ProtoType::Int64,
        Scalar::Uint32 => ProtoType::Uint32,
        Scalar::Uint64 => ProtoType::Uint64,
        Scalar::Sint32 => ProtoType::Sint32,
        Scalar::Sint64 => ProtoType::Sint64,
        Scalar::Fixed32 => ProtoType::Fixed32,
        Scalar::Fixed64 => ProtoType::Fixed64,
        Scalar::Sfixed32 => ProtoType::Sfixed32,
        Scalar::Sfixed64 => ProtoType::Sfixed64,
        Scalar::Bool => ProtoType::Bool,
        Scalar::String => ProtoType::String,
        Scalar::Bytes => ProtoType::Bytes,
    }
}

/// §4.9 rule 2: capitalize the first letter of the field name and append
/// `Entry` — not a full camelCase conversion, exactly as spelled out.
fn map_entry_name(field_name: &str) -> String {
    let mut chars = field_name.chars();
    let mut out = String::new();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
    }
    out.push_str(chars.as_str());
    out.push_str("Entry");
    out
}

fn json_name_for(name: &str, opts: Option<&FieldOptionValues>) -> String {
    if let Some(explicit) = opts.and_then(|o| o.json_name.clone()) {
        return explicit;
    }
    to_camel_case(name)
}

fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// §4.9 rule 4: sort, merge overlapping/adjacent numeric entries into
/// maximal contiguous ranges, exclusive end.
fn compress_reserved(reserved: &[Reserved]) -> (Vec<descriptor_proto::ReservedRange>, Vec<String>) {
    let mut numeric: Vec<(i32, i32)> = Vec::new();
    let mut names = Vec::new();
    for r in reserved {
        match r {
            Reserved::Number(n) => numeric.push((*n, *n)),
            Reserved::Range { start, end } => numeric.push((*start, *end)),
            Reserved::Name(n) => names.push(n.clone()),
        }
    }
    numeric.sort_unstable();

    let mut merged: Vec<(i32, i32)> = Vec::new();
    for (lo, hi) in numeric {
        match merged.last_mut() {
            Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }

    let ranges = merged
        .into_iter()
        .map(|(lo, hi)| descriptor_proto::ReservedRange { start: Some(lo), end: Some(hi + 1) })
        .collect();
    (ranges, names)
}

fn build_file_options(v: &FileOptionValues) -> Option<FileOptions> {
    let built = FileOptions {
        java_package: v.java_package.clone(),
        java_outer_classname: v.java_outer_classname.clone(),
        java_multiple_files: v.java_multiple_files,
        optimize_for: v.optimize_for.as_deref().map(optimize_mode_to_i32),
        go_package: v.go_package.clone(),
        cc_generic_services: v.cc_generic_services,
        java_generic_services: v.java_generic_services,
        py_generic_services: v.py_generic_services,
        cc_enable_arenas: v.cc_enable_arenas,
        objc_class_prefix: v.objc_class_prefix.clone(),
        csharp_namespace: v.csharp_namespace.clone(),
        swift_prefix: v.swift_prefix.clone(),
        php_class_prefix: v.php_class_prefix.clone(),
        php_namespace: v.php_namespace.clone(),
        php_metadata_namespace: v.php_metadata_namespace.clone(),
        ruby_package: v.ruby_package.clone(),
        uninterpreted_option: build_uninterpreted(&v.uninterpreted),
        ..Default::default()
    };
    (built != FileOptions::default()).then_some(built)
}

fn build_message_options(v: &MessageOptionValues) -> MessageOptions {
    MessageOptions {
        message_set_wire_format: v.message_set_wire_format,
        no_standard_descriptor_accessor: v.no_standard_descriptor_accessor,
        deprecated: v.deprecated,
        map_entry: v.map_entry,
        uninterpreted_option: build_uninterpreted(&v.uninterpreted),
        ..Default::default()
    }
}

fn build_field_options(opts: Option<&FieldOptionValues>) -> Option<FieldOptions> {
    let v = opts?;
    let built = FieldOptions {
        ctype: v.ctype.as_deref().map(ctype_to_i32),
        packed: v.packed,
        jstype: v.jstype.as_deref().map(jstype_to_i32),
        lazy: v.lazy,
        deprecated: v.deprecated,
        weak: v.weak,
        uninterpreted_option: build_uninterpreted(&v.uninterpreted),
        ..Default::default()
    };
    (built != FieldOptions::default()).then_some(built)
}

fn build_enum_options(v: &EnumOptionValues) -> EnumOptions {
    EnumOptions {
        allow_alias: v.allow_alias,
        deprecated: v.deprecated,
        uninterpreted_option: build_uninterpreted(&v.uninterpreted),
        ..Default::default()
    }
}

fn build_enum_value_options(opts: Option<&EnumValueOptionValues>) -> Option<EnumValueOptions> {
    let v = opts?;
    let built = EnumValueOptions {
        deprecated: v.deprecated,
        uninterpreted_option: build_uninterpreted(&v.uninterpreted),
        ..Default::default()
    };
    (built != EnumValueOptions::default()).then_some(built)
}

fn build_service_options(v: &ServiceOptionValues) -> ServiceOptions {
    ServiceOptions {
        deprecated: v.deprecated,
        uninterpreted_option: build_uninterpreted(&v.uninterpreted),
        ..Default::default()
    }
}

fn build_method_options(opts: Option<&MethodOptionValues>) -> Option<MethodOptions> {
    let v = opts?;
    let built = MethodOptions {
        deprecated: v.deprecated,
        idempotency_level: v.idempotency_level.as_deref().map(idempotency_to_i32),
        uninterpreted_option: build_uninterpreted(&v.uninterpreted),
        ..Default::default()
    };
    (built != MethodOptions::default()).then_some(built)
}

fn optimize_mode_to_i32(mode: &str) -> i32 {
    use file_options::OptimizeMode;
    match mode {
        "CODE_SIZE" => OptimizeMode::CodeSize as i32,
        "LITE_RUNTIME" => OptimizeMode::LiteRuntime as i32,
        _ => OptimizeMode::Speed as i32,
    }
}

fn ctype_to_i32(ctype: &str) -> i32 {
    use field_options::CType;
    match ctype {
        "CORD" => CType::Cord as i32,
        "STRING_PIECE" => CType::StringPiece as i32,
        _ => CType::String as i32,
    }
}

fn jstype_to_i32(jstype: &str) -> i32 {
    use field_options::JsType;
    match jstype {
        "JS_STRING" => JsType::JsString as i32,
        "JS_NUMBER" => JsType::JsNumber as i32,
        _ => JsType::JsNormal as i32,
    }
}

fn idempotency_to_i32(level: &str) -> i32 {
    use method_options::IdempotencyLevel;
    match level {
        "NO_SIDE_EFFECTS" => IdempotencyLevel::NoSideEffects as i32,
        "IDEMPOTENT" => IdempotencyLevel::Idempotent as i32,
        _ => IdempotencyLevel::IdempotencyUnknown as i32,
    }
}

/// Translates both well-known options whose value failed no check here (they
/// can't have — §4.7 already rejected those) and genuine custom options into
/// `UninterpretedOption` entries (§4.9 rule 5).
fn build_uninterpreted(entries: &[&ast::OptionEntry]) -> Vec<UninterpretedOption> {
    entries.iter().map(|opt| uninterpreted_option_from(opt)).collect()
}

fn uninterpreted_option_from(opt: &ast::OptionEntry) -> UninterpretedOption {
    let mut name = Vec::new();
    if opt.name.is_custom {
        name.push(uninterpreted_option::NamePart {
            name_part: opt.name.name.clone(),
            is_extension: true,
        });
        for part in &opt.name.path_parts {
            name.push(uninterpreted_option::NamePart { name_part: part.clone(), is_extension: false });
        }
    } else {
        name.push(uninterpreted_option::NamePart { name_part: opt.name.name.clone(), is_extension: false });
    }

    let mut out = UninterpretedOption { name, ..Default::default() };
    match &opt.value {
        OptionValue::String(s) => out.string_value = Some(s.clone().into_bytes()),
        OptionValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 => {
            out.positive_int_value = Some(*n as u64)
        }
        OptionValue::Number(n) if n.fract() == 0.0 => out.negative_int_value = Some(*n as i64),
        OptionValue::Number(n) => out.double_value = Some(*n),
        OptionValue::Identifier(id) => out.identifier_value = Some(id.clone()),
        OptionValue::Bool(b) => out.identifier_value = Some(b.to_string()),
        OptionValue::Array(_) | OptionValue::Map(_) => {
            out.aggregate_value = Some(format_aggregate(&opt.value))
        }
    }
    out
}

fn format_aggregate(value: &OptionValue) -> String {
    match value {
        OptionValue::String(s) => format!("{s:?}"),
        OptionValue::Number(n) => n.to_string(),
        OptionValue::Identifier(id) => id.clone(),
        OptionValue::Bool(b) => b.to_string(),
        OptionValue::Array(items) => {
            let inner: Vec<String> = items.iter().map(format_aggregate).collect();
            format!("[{}]", inner.join(", "))
        }
        OptionValue::Map(entries) => {
            let inner: Vec<String> =
                entries.iter().map(|(k, v)| format!("{k}: {}", format_aggregate(v))).collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}
