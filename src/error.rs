//! The `ValidationError` taxonomy (spec §7).
//!
//! A single `#[non_exhaustive]` sum of small, `Display`-implementing variants, each
//! carrying exactly the context needed to locate and explain the fault.
//! Validation is fail-fast (§7 propagation policy) — the coordinator and
//! every rule validator return `Result<T, ValidationError>` and bail on the
//! first `Err` via `?`; nothing here attempts recovery.

use std::fmt;

use crate::ast::Span;

/// A single proto3 semantic-validation failure.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ValidationError {
    // --- Lexical / structural ---
    InvalidSyntaxVersion { found: String },
    InvalidPackageName { package: String, reason: String },
    InvalidImport { path: String, reason: String },
    CircularImport { path: String },

    // --- Naming ---
    InvalidMessageName { name: String, span: Span },
    InvalidEnumName { name: String, span: Span },
    InvalidEnumValueName { name: String, span: Span },
    InvalidServiceName { name: String, span: Span },
    InvalidMethodName { name: String, span: Span },
    InvalidFieldName { name: String, span: Span },
    InvalidOptionName { name: String, span: Span },

    // --- Uniqueness ---
    DuplicateTypeName { fqn: String },
    DuplicateNestedTypeName { parent: String, name: String, span: Span },
    DuplicateFieldName { message: String, name: String, span: Span },
    DuplicateMessageFieldNumber { message: String, number: i32, span: Span },
    DuplicateEnumValue { enum_name: String, number: i32, span: Span },
    DuplicateMethodName { service: String, name: String, span: Span },
    DuplicateOption { target: String, name: String, span: Span },

    // --- Field rules ---
    InvalidFieldNumber { message: String, number: i32, span: Span },
    ReservedFieldName { message: String, name: String, span: Span },
    ReservedFieldNumber { message: String, number: i32, span: Span },
    InvalidMapKeyType { message: String, field: String, key_type: String, span: Span },
    InvalidMapValueType { message: String, field: String, value_type: String, span: Span },
    RepeatedMapField { message: String, field: String, span: Span },
    OptionalMapField { message: String, field: String, span: Span },
    RepeatedOneof { message: String, oneof: String, field: String, span: Span },
    OptionalOneof { message: String, oneof: String, field: String, span: Span },
    MapOneof { message: String, oneof: String, field: String, span: Span },
    EmptyOneof { message: String, oneof: String, span: Span },
    UnpackableFieldType { message: String, field: String, span: Span },

    // --- Message rules ---
    MalformedReservedRange { message: String, start: i32, end: i32, span: Span },
    OverlappingReservedRange { message: String, span: Span },
    DuplicateReservedName { message: String, name: String, span: Span },

    // --- Enum rules ---
    FirstEnumValueNotZero { enum_name: String, span: Span },
    EmptyEnum { enum_name: String, span: Span },

    // --- Options ---
    InvalidOptionValue { target: String, name: String, reason: String, span: Span },
    UnknownOption { target: String, name: String, span: Span },

    // --- References ---
    UndefinedType { reference: String, referenced_in: String, span: Span },

    // --- Graph ---
    CyclicDependency { path: Vec<String> },

    // --- Catch-all ---
    Custom { message: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ValidationError::*;
        match self {
            InvalidSyntaxVersion { found } => write!(
                f,
                "unsupported syntax {found:?}: this core only accepts \"proto3\""
            ),
            InvalidPackageName { package, reason } => {
                write!(f, "invalid package name {package:?}: {reason}")
            }
            InvalidImport { path, reason } => write!(f, "invalid import {path:?}: {reason}"),
            CircularImport { path } => write!(f, "circular import involving {path:?}"),

            InvalidMessageName { name, span } => {
                write!(f, "{}:{}: invalid message name {name:?}", span.line, span.col)
            }
            InvalidEnumName { name, span } => {
                write!(f, "{}:{}: invalid enum name {name:?}", span.line, span.col)
            }
            InvalidEnumValueName { name, span } => write!(
                f,
                "{}:{}: invalid enum value name {name:?}",
                span.line, span.col
            ),
            InvalidServiceName { name, span } => {
                write!(f, "{}:{}: invalid service name {name:?}", span.line, span.col)
            }
            InvalidMethodName { name, span } => {
                write!(f, "{}:{}: invalid method name {name:?}", span.line, span.col)
            }
            InvalidFieldName { name, span } => {
                write!(f, "{}:{}: invalid field name {name:?}", span.line, span.col)
            }
            InvalidOptionName { name, span } => {
                write!(f, "{}:{}: invalid option name {name:?}", span.line, span.col)
            }

            DuplicateTypeName { fqn } => write!(f, "duplicate type name {fqn:?}"),
            DuplicateNestedTypeName { parent, name, span } => write!(
                f,
                "{}:{}: {parent:?} already declares a nested type named {name:?}",
                span.line, span.col
            ),
            DuplicateFieldName { message, name, span } => write!(
                f,
                "{}:{}: {message:?} already declares a field named {name:?}",
                span.line, span.col
            ),
            DuplicateMessageFieldNumber { message, number, span } => write!(
                f,
                "{}:{}: {message:?} already uses field number {number}",
                span.line, span.col
            ),
            DuplicateEnumValue { enum_name, number, span } => write!(
                f,
                "{}:{}: {enum_name:?} already uses value {number} (set allow_alias to permit this)",
                span.line, span.col
            ),
            DuplicateMethodName { service, name, span } => write!(
                f,
                "{}:{}: service {service:?} already declares a method named {name:?}",
                span.line, span.col
            ),
            DuplicateOption { target, name, span } => write!(
                f,
                "{}:{}: {target} already sets option {name:?}",
                span.line, span.col
            ),

            InvalidFieldNumber { message, number, span } => write!(
                f,
                "{}:{}: field number {number} in {message:?} is out of the legal range \
                 [1, 536870911] \\ [19000, 19999]",
                span.line, span.col
            ),
            ReservedFieldName { message, name, span } => write!(
                f,
                "{}:{}: {message:?} uses field name {name:?}, which is reserved",
                span.line, span.col
            ),
            ReservedFieldNumber { message, number, span } => write!(
                f,
                "{}:{}: {message:?} uses field number {number}, which is reserved",
                span.line, span.col
            ),
            InvalidMapKeyType { message, field, key_type, span } => write!(
                f,
                "{}:{}: {message:?}.{field} has invalid map key type {key_type}",
                span.line, span.col
            ),
            InvalidMapValueType { message, field, value_type, span } => write!(
                f,
                "{}:{}: {message:?}.{field} has invalid map value type {value_type}",
                span.line, span.col
            ),
            RepeatedMapField { message, field, span } => write!(
                f,
                "{}:{}: {message:?}.{field} is a map field and cannot also be repeated",
                span.line, span.col
            ),
            OptionalMapField { message, field, span } => write!(
                f,
                "{}:{}: {message:?}.{field} is a map field and cannot also be optional",
                span.line, span.col
            ),
            RepeatedOneof { message, oneof, field, span } => write!(
                f,
                "{}:{}: {message:?}.{oneof}.{field} is repeated, which is not allowed in a oneof",
                span.line, span.col
            ),
            OptionalOneof { message, oneof, field, span } => write!(
                f,
                "{}:{}: {message:?}.{oneof}.{field} is explicitly optional, which is redundant \
                 in a oneof",
                span.line, span.col
            ),
            MapOneof { message, oneof, field, span } => write!(
                f,
                "{}:{}: {message:?}.{oneof}.{field} is a map field, which is not allowed in a oneof",
                span.line, span.col
            ),
            EmptyOneof { message, oneof, span } => write!(
                f,
                "{}:{}: oneof {oneof:?} in {message:?} has no fields",
                span.line, span.col
            ),
            UnpackableFieldType { message, field, span } => write!(
                f,
                "{}:{}: {message:?}.{field} is marked packed but its type cannot be packed",
                span.line, span.col
            ),

            MalformedReservedRange { message, start, end, span } => write!(
                f,
                "{}:{}: {message:?} declares a malformed reserved range {start}..{end}",
                span.line, span.col
            ),
            OverlappingReservedRange { message, span } => write!(
                f,
                "{}:{}: {message:?} declares overlapping reserved numbers",
                span.line, span.col
            ),
            DuplicateReservedName { message, name, span } => write!(
                f,
                "{}:{}: {message:?} reserves the name {name:?} more than once",
                span.line, span.col
            ),

            FirstEnumValueNotZero { enum_name, span } => write!(
                f,
                "{}:{}: the first value of enum {enum_name:?} must be 0 in proto3",
                span.line, span.col
            ),
            EmptyEnum { enum_name, span } => {
                write!(f, "{}:{}: enum {enum_name:?} has no values", span.line, span.col)
            }

            InvalidOptionValue { target, name, reason, span } => write!(
                f,
                "{}:{}: option {name:?} on {target} is invalid: {reason}",
                span.line, span.col
            ),
            UnknownOption { target, name, span } => write!(
                f,
                "{}:{}: unknown option {name:?} on {target}",
                span.line, span.col
            ),

            UndefinedType { reference, referenced_in, span } => write!(
                f,
                "{}:{}: undefined type {reference:?} referenced in {referenced_in}",
                span.line, span.col
            ),

            CyclicDependency { path } => {
                write!(f, "cyclic message dependency: {}", path.join(" -> "))
            }

            Custom { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type Result<T> = std::result::Result<T, ValidationError>;
