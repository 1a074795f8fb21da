//! Option Validator (§4.7).
//!
//! Options form a small typed language: a name (plain identifier, or a
//! parenthesized, possibly dotted, custom path) plus a typed value. This
//! module enforces (a) no duplicate option per target, (b) a specific value
//! shape for each well-known option, and (c) a syntactic check on custom
//! option path components. Custom options are never rejected for being
//! unrecognized — §4.9 Open Question 2 and the Non-goals both point the
//! same way: an option family this core doesn't know about is preserved,
//! not an error.
//!
//! One `validate_*_options` function per target (§4.7's table), each a
//! plain loop over the option list that either routes an entry to the
//! custom-option syntax check or matches it against that target's
//! well-known names, populating a struct of typed `Option<T>` fields ready
//! for the descriptor builder (§4.9.5) to translate.

use std::collections::HashSet;

use crate::ast::{self, OptionValue};
use crate::error::{Result, ValidationError};
use crate::ident;

fn check_duplicate(seen: &mut HashSet<String>, name: &str, target: &str, span: ast::Span) -> Result<()> {
    if !seen.insert(name.to_owned()) {
        return Err(ValidationError::DuplicateOption {
            target: target.to_owned(),
            name: name.to_owned(),
            span,
        });
    }
    Ok(())
}

fn validate_custom_path(opt: &ast::OptionEntry) -> Result<()> {
    for component in opt.name.name.split('.').chain(opt.name.path_parts.iter().map(String::as_str)) {
        if !ident::is_valid_identifier(component) {
            return Err(ValidationError::InvalidOptionName {
                name: opt.name.name.clone(),
                span: opt.span,
            });
        }
    }
    Ok(())
}

fn expect_string(opt: &ast::OptionEntry, target: &str) -> Result<String> {
    match &opt.value {
        OptionValue::String(s) => Ok(s.clone()),
        _ => Err(ValidationError::InvalidOptionValue {
            target: target.to_owned(),
            name: opt.name.name.clone(),
            reason: "expected a string value".into(),
            span: opt.span,
        }),
    }
}

fn expect_bool(opt: &ast::OptionEntry, target: &str) -> Result<bool> {
    match &opt.value {
        OptionValue::Bool(b) => Ok(*b),
        _ => Err(ValidationError::InvalidOptionValue {
            target: target.to_owned(),
            name: opt.name.name.clone(),
            reason: "expected a bool value".into(),
            span: opt.span,
        }),
    }
}

fn expect_identifier_in(opt: &ast::OptionEntry, target: &str, allowed: &[&str]) -> Result<String> {
    match &opt.value {
        OptionValue::Identifier(id) if allowed.iter().any(|a| a == id) => Ok(id.clone()),
        OptionValue::Identifier(id) => Err(ValidationError::InvalidOptionValue {
            target: target.to_owned(),
            name: opt.name.name.clone(),
            reason: format!("{id:?} is not one of {allowed:?}"),
            span: opt.span,
        }),
        _ => Err(ValidationError::InvalidOptionValue {
            target: target.to_owned(),
            name: opt.name.name.clone(),
            reason: "expected an identifier value".into(),
            span: opt.span,
        }),
    }
}

#[derive(Debug, Default, Clone)]
pub struct FileOptionValues<'a> {
    pub java_package: Option<String>,
    pub java_outer_classname: Option<String>,
    pub java_multiple_files: Option<bool>,
    pub optimize_for: Option<String>,
    pub cc_enable_arenas: Option<bool>,
    pub go_package: Option<String>,
    pub cc_generic_services: Option<bool>,
    pub java_generic_services: Option<bool>,
    pub py_generic_services: Option<bool>,
    pub objc_class_prefix: Option<String>,
    pub csharp_namespace: Option<String>,
    pub swift_prefix: Option<String>,
    pub php_class_prefix: Option<String>,
    pub php_namespace: Option<String>,
    pub php_metadata_namespace: Option<String>,
    pub ruby_package: Option<String>,
    pub uninterpreted: Vec<&'a ast::OptionEntry>,
}

pub fn validate_file_options<'a>(
    options: &'a [ast::OptionEntry],
    target: &str,
) -> Result<FileOptionValues<'a>> {
    let mut out = FileOptionValues::default();
    let mut seen = HashSet::new();
    for opt in options {
        if opt.name.is_custom {
            validate_custom_path(opt)?;
            out.uninterpreted.push(opt);
            continue;
        }
        check_duplicate(&mut seen, &opt.name.name, target, opt.span)?;
        match opt.name.name.as_str() {
            "java_package" => out.java_package = Some(expect_string(opt, target)?),
            "java_outer_classname" => out.java_outer_classname = Some(expect_string(opt, target)?),
            "java_multiple_files" => out.java_multiple_files = Some(expect_bool(opt, target)?),
            "optimize_for" => {
                out.optimize_for =
                    Some(expect_identifier_in(opt, target, &["SPEED", "CODE_SIZE", "LITE_RUNTIME"])?)
            }
            "cc_enable_arenas" => out.cc_enable_arenas = Some(expect_bool(opt, target)?),
            "go_package" => out.go_package = Some(expect_string(opt, target)?),
            "cc_generic_services" => out.cc_generic_services = Some(expect_bool(opt, target)?),
            "java_generic_services" => out.java_generic_services = Some(expect_bool(opt, target)?),
            "py_generic_services" => out.py_generic_services = Some(expect_bool(opt, target)?),
            "objc_class_prefix" => out.objc_class_prefix = Some(expect_string(opt, target)?),
            "csharp_namespace" => out.csharp_namespace = Some(expect_string(opt, target)?),
            "swift_prefix" => out.swift_prefix = Some(expect_string(opt, target)?),
            "php_class_prefix" => out.php_class_prefix = Some(expect_string(opt, target)?),
            "php_namespace" => out.php_namespace = Some(expect_string(opt, target)?),
            "php_metadata_namespace" => {
                out.php_metadata_namespace = Some(expect_string(opt, target)?)
            }
            "ruby_package" => out.ruby_package = Some(expect_string(opt, target)?),
            other => {
                return Err(ValidationError::UnknownOption {
                    target: target.to_owned(),
                    name: other.to_owned(),
                    span: opt.span,
                })
            }
        }
    }
    Ok(out)
}

#[derive(Debug, Default, Clone)]
pub struct MessageOptionValues<'a> {
    pub message_set_wire_format: Option<bool>,
    pub no_standard_descriptor_accessor: Option<bool>,
    pub deprecated: Option<bool>,
    pub map_entry: Option<bool>,
    pub uninterpreted: Vec<&'a ast::OptionEntry>,
}

pub fn validate_message_options<'a>(
    options: &'a [ast::OptionEntry],
    target: &str,
) -> Result<MessageOptionValues<'a>> {
    let mut out = MessageOptionValues::default();
    let mut seen = HashSet::new();
    for opt in options {
        if opt.name.is_custom {
            validate_custom_path(opt)?;
            out.uninterpreted.push(opt);
            continue;
        }
        check_duplicate(&mut seen, &opt.name.name, target, opt.span)?;
        match opt.name.name.as_str() {
            "message_set_wire_format" => {
                out.message_set_wire_format = Some(expect_bool(opt, target)?)
            }
            "no_standard_descriptor_accessor" => {
                out.no_standard_descriptor_accessor = Some(expect_bool(opt, target)?)
            }
            "deprecated" => out.deprecated = Some(expect_bool(opt, target)?),
            "map_entry" => out.map_entry = Some(expect_bool(opt, target)?),
            other => {
                return Err(ValidationError::UnknownOption {
                    target: target.to_owned(),
                    name: other.to_owned(),
                    span: opt.span,
                })
            }
        }
    }
    Ok(out)
}

#[derive(Debug, Default, Clone)]
pub struct FieldOptionValues<'a> {
    pub ctype: Option<String>,
    pub packed: Option<bool>,
    pub jstype: Option<String>,
    pub lazy: Option<bool>,
    pub deprecated: Option<bool>,
    pub weak: Option<bool>,
    pub json_name: Option<String>,
    pub uninterpreted: Vec<&'a ast::OptionEntry>,
}

pub fn validate_field_options<'a>(
    options: &'a [ast::OptionEntry],
    target: &str,
) -> Result<FieldOptionValues<'a>> {
    let mut out = FieldOptionValues::default();
    let mut seen = HashSet::new();
    for opt in options {
        if opt.name.is_custom {
            validate_custom_path(opt)?;
            out.uninterpreted.push(opt);
            continue;
        }
        check_duplicate(&mut seen, &opt.name.name, target, opt.span)?;
        match opt.name.name.as_str() {
            "ctype" => {
                out.ctype =
                    Some(expect_identifier_in(opt, target, &["STRING", "CORD", "STRING_PIECE"])?)
            }
            "packed" => out.packed = Some(expect_bool(opt, target)?),
            "jstype" => {
                out.jstype = Some(expect_identifier_in(
                    opt,
                    target,
                    &["JS_NORMAL", "JS_STRING", "JS_NUMBER"],
                )?)
            }
            "lazy" => out.lazy = Some(expect_bool(opt, target)?),
            "deprecated" => out.deprecated = Some(expect_bool(opt, target)?),
            "weak" => out.weak = Some(expect_bool(opt, target)?),
            "json_name" => out.json_name = Some(expect_string(opt, target)?),
            other => {
                return Err(ValidationError::UnknownOption {
                    target: target.to_owned(),
                    name: other.to_owned(),
                    span: opt.span,
                })
            }
        }
    }
    Ok(out)
}

#[derive(Debug, Default, Clone)]
pub struct EnumOptionValues<'a> {
    pub allow_alias: Option<bool>,
    pub deprecated: Option<bool>,
    pub uninterpreted: Vec<&'a ast::OptionEntry>,
}

pub fn validate_enum_options<'a>(
    options: &'a [ast::OptionEntry],
    target: &str,
) -> Result<EnumOptionValues<'a>> {
    let mut out = EnumOptionValues::default();
    let mut seen = HashSet::new();
    for opt in options {
        if opt.name.is_custom {
            validate_custom_path(opt)?;
            out.uninterpreted.push(opt);
            continue;
        }
        check_duplicate(&mut seen, &opt.name.name, target, opt.span)?;
        match opt.name.name.as_str() {
            "allow_alias" => out.allow_alias = Some(expect_bool(opt, target)?),
            "deprecated" => out.deprecated = Some(expect_bool(opt, target)?),
            other => {
                return Err(ValidationError::UnknownOption {
                    target: target.to_owned(),
                    name: other.to_owned(),
                    span: opt.span,
                })
            }
        }
    }
    Ok(out)
}

#[derive(Debug, Default, Clone)]
pub struct EnumValueOptionValues<'a> {
    pub deprecated: Option<bool>,
    pub uninterpreted: Vec<&'a ast::OptionEntry>,
}

pub fn validate_enum_value_options<'a>(
    options: &'a [ast::OptionEntry],
    target: &str,
) -> Result<EnumValueOptionValues<'a>> {
    let mut out = EnumValueOptionValues::default();
    let mut seen = HashSet::new();
    for opt in options {
        if opt.name.is_custom {
            validate_custom_path(opt)?;
            out.uninterpreted.push(opt);
            continue;
        }
        check_duplicate(&mut seen, &opt.name.name, target, opt.span)?;
        match opt.name.name.as_str() {
            "deprecated" => out.deprecated = Some(expect_bool(opt, target)?),
            other => {
                return Err(ValidationError::UnknownOption {
                    target: target.to_owned(),
                    name: other.to_owned(),
                    span: opt.span,
                })
            }
        }
    }
    Ok(out)
}

#[derive(Debug, Default, Clone)]
pub struct ServiceOptionValues<'a> {
    pub deprecated: Option<bool>,
    pub uninterpreted: Vec<&'a ast::OptionEntry>,
}

pub fn validate_service_options<'a>(
    options: &'a [ast::OptionEntry],
    target: &str,
) -> Result<ServiceOptionValues<'a>> {
    let mut out = ServiceOptionValues::default();
    let mut seen = HashSet::new();
    for opt in options {
        if opt.name.is_custom {
            validate_custom_path(opt)?;
            out.uninterpreted.push(opt);
            continue;
        }
        check_duplicate(&mut seen, &opt.name.name, target, opt.span)?;
        match opt.name.name.as_str() {
            "deprecated" => out.deprecated = Some(expect_bool(opt, target)?),
            other => {
                return Err(ValidationError::UnknownOption {
                    target: target.to_owned(),
                    name: other.to_owned(),
                    span: opt.span,
                })
            }
        }
    }
    Ok(out)
}

#[derive(Debug, Default, Clone)]
pub struct MethodOptionValues<'a> {
    pub deprecated: Option<bool>,
    pub idempotency_level: Option<String>,
    pub uninterpreted: Vec<&'a ast::OptionEntry>,
}

pub fn validate_method_options<'a>(
    options: &'a [ast::OptionEntry],
    target: &str,
) -> Result<MethodOptionValues<'a>> {
    let mut out = MethodOptionValues::default();
    let mut seen = HashSet::new();
    for opt in options {
        if opt.name.is_custom {
            validate_custom_path(opt)?;
            out.uninterpreted.push(opt);
            continue;
        }
        check_duplicate(&mut seen, &opt.name.name, target, opt.span)?;
        match opt.name.name.as_str() {
            "deprecated" => out.deprecated = Some(expect_bool(opt, target)?),
            "idempotency_level" => {
                out.idempotency_level = Some(expect_identifier_in(
                    opt,
                    target,
                    &["IDEMPOTENCY_UNKNOWN", "NO_SIDE_EFFECTS", "IDEMPOTENT"],
                )?)
            }
            other => {
                return Err(ValidationError::UnknownOption {
                    target: target.to_owned(),
                    name: other.to_owned(),
                    span: opt.span,
                })
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{OptionEntry, OptionName, Span};

    fn opt(name: &str, value: OptionValue) -> OptionEntry {
        OptionEntry {
            name: OptionName { name: name.into(), is_custom: false, path_parts: vec![] },
            value,
            span: Span::default(),
        }
    }

    fn custom_opt(name: &str, value: OptionValue) -> OptionEntry {
        OptionEntry {
            name: OptionName { name: name.into(), is_custom: true, path_parts: vec![] },
            value,
            span: Span::default(),
        }
    }

    #[test]
    fn recognizes_well_known_file_options() {
        let opts = vec![
            opt("java_package", OptionValue::String("com.example".into())),
            opt("cc_enable_arenas", OptionValue::Bool(true)),
        ];
        let out = validate_file_options(&opts, "file").unwrap();
        assert_eq!(out.java_package.as_deref(), Some("com.example"));
        assert_eq!(out.cc_enable_arenas, Some(true));
    }

    #[test]
    fn unknown_option_name_errors() {
        let opts = vec![opt("not_a_real_option", OptionValue::Bool(true))];
        let err = validate_file_options(&opts, "file").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownOption { .. }));
    }

    #[test]
    fn duplicate_option_errors() {
        let opts = vec![
            opt("deprecated", OptionValue::Bool(true)),
            opt("deprecated", OptionValue::Bool(false)),
        ];
        let err = validate_message_options(&opts, "message M").unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateOption { .. }));
    }

    #[test]
    fn bad_value_shape_errors() {
        let opts = vec![opt("optimize_for", OptionValue::String("SPEED".into()))];
        let err = validate_file_options(&opts, "file").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidOptionValue { .. }));
    }

    #[test]
    fn unrecognized_identifier_in_closed_set_errors() {
        let opts = vec![opt("optimize_for", OptionValue::Identifier("FASTEST".into()))];
        let err = validate_file_options(&opts, "file").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidOptionValue { .. }));
    }

    #[test]
    fn custom_options_are_preserved_not_rejected() {
        let opts = vec![custom_opt("my.custom.opt", OptionValue::Bool(true))];
        let out = validate_message_options(&opts, "message M").unwrap();
        assert_eq!(out.uninterpreted.len(), 1);
    }

    #[test]
    fn custom_option_with_illegal_path_component_errors() {
        let opts = vec![custom_opt("my.2bad.opt", OptionValue::Bool(true))];
        let err = validate_message_options(&opts, "message M").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidOptionName { .. }));
    }
}
