//! Field Validator (§4.3).
//!
//! Owns field number range/uniqueness/reserved checks, name grammar, map
//! key/value shape, oneof-membership restrictions, and the `packed` option
//! legality check. `Named` type resolution itself is deferred to the
//! coordinator's cross-reference sweep (§4.1 step 10) — this validator only
//! checks the shape of the field, not whether its type exists.

use crate::ast::{self, Label, Scalar, Type};
use crate::error::{Result, ValidationError};
use crate::ident;
use crate::validators::option::{self, FieldOptionValues};

const FIELD_NUMBER_MIN: i32 = 1;
const FIELD_NUMBER_MAX: i32 = 536_870_911;
const RESERVED_RANGE_START: i32 = 19_000;
const RESERVED_RANGE_END: i32 = 19_999;

fn in_reserved_system_range(number: i32) -> bool {
    (RESERVED_RANGE_START..=RESERVED_RANGE_END).contains(&number)
}

/// Numeric range/legality checks for a field number, independent of the
/// enclosing message's own reserved declarations (those are cross-checked
/// by the message validator, which owns the full reserved-entry list).
pub fn validate_field_number(message: &str, number: i32, span: ast::Span) -> Result<()> {
    if number < FIELD_NUMBER_MIN || number > FIELD_NUMBER_MAX || in_reserved_system_range(number) {
        return Err(ValidationError::InvalidFieldNumber {
            message: message.to_owned(),
            number,
            span,
        });
    }
    Ok(())
}

pub fn validate_field_name(message: &str, field: &ast::Field) -> Result<()> {
    if !ident::is_valid_field_name(&field.name) {
        return Err(ValidationError::InvalidFieldName { name: field.name.clone(), span: field.span });
    }
    let _ = message;
    Ok(())
}

/// Map key/value shape (§4.3's `Map(k, v)` bullet). `repeated`/`optional`
/// map fields are rejected by the caller, which already has direct access
/// to the field's label.
pub fn validate_map_type(message: &str, field_name: &str, key: Scalar, value: &Type, span: ast::Span) -> Result<()> {
    if !key.is_valid_map_key() {
        return Err(ValidationError::InvalidMapKeyType {
            message: message.to_owned(),
            field: field_name.to_owned(),
            key_type: format!("{key:?}").to_lowercase(),
            span,
        });
    }
    match value {
        Type::Map { .. } => Err(ValidationError::InvalidMapValueType {
            message: message.to_owned(),
            field: field_name.to_owned(),
            value_type: "map".to_owned(),
            span,
        }),
        _ => Ok(()),
    }
}

/// `packed` is legal only on repeated fields of packable scalar/enum types
/// (§4.3). `is_enum` is supplied by the caller, which alone knows whether a
/// `Named` type resolved to an enum (the field validator itself never
/// resolves references).
pub fn validate_packed_legality(
    message: &str,
    field: &ast::Field,
    packed: bool,
    is_enum: bool,
) -> Result<()> {
    if !packed {
        return Ok(());
    }
    let packable = match &field.ty {
        Type::Scalar(s) => s.is_packable(),
        Type::Named(_) => is_enum,
        Type::Map { .. } => false,
    };
    if !matches!(field.label, Label::Repeated) || !packable {
        return Err(ValidationError::UnpackableFieldType {
            message: message.to_owned(),
            field: field.name.clone(),
            span: field.span,
        });
    }
    Ok(())
}

/// Full per-field validation, given the field's enclosing message name
/// (for error context only). Returns the field's validated option values
/// for the descriptor builder; does not resolve `Named` types.
pub fn validate_field<'a>(message: &str, field: &'a ast::Field) -> Result<FieldOptionValues<'a>> {
    validate_field_number(message, field.number, field.span)?;
    validate_field_name(message, field)?;

    match &field.ty {
        Type::Map { key, value } => {
            validate_map_type(message, &field.name, *key, value, field.span)?;
            if matches!(field.label, Label::Repeated) {
                return Err(ValidationError::RepeatedMapField {
                    message: message.to_owned(),
                    field: field.name.clone(),
                    span: field.span,
                });
            }
            if matches!(field.label, Label::Optional) {
                return Err(ValidationError::OptionalMapField {
                    message: message.to_owned(),
                    field: field.name.clone(),
                    span: field.span,
                });
            }
            if let Type::Map { .. } = value.as_ref() {
                return Err(ValidationError::InvalidMapValueType {
                    message: message.to_owned(),
                    field: field.name.clone(),
                    value_type: "map".to_owned(),
                    span: field.span,
                });
            }
        }
        Type::Scalar(_) | Type::Named(_) => {}
    }

    // Oneof-membership shape (§4.3) is checked by the caller when it knows
    // the owning oneof's name (`validate_oneof_member`); a bare field has
    // no oneof to name here.

    let target = format!("field {message}.{}", field.name);
    let opts = option::validate_field_options(&field.options, &target)?;
    // A `Named` field's packability depends on whether it resolves to an
    // enum, which isn't known until the reference resolver runs (§4.1 step
    // 10); the coordinator calls `validate_packed_legality` again once that
    // answer is in. Scalar fields need no such deferral.
    if matches!(field.ty, Type::Scalar(_)) {
        validate_packed_legality(message, field, opts.packed.unwrap_or(false), false)?;
    }
    Ok(opts)
}

/// §4.3 oneof-membership restrictions, reusable by both the field loop
/// above (informational `oneof_index`) and the message validator's
/// per-oneof pass (which knows the oneof's actual name).
pub fn validate_oneof_member(message: &str, oneof: &str, field: &ast::Field) -> Result<()> {
    if matches!(field.label, Label::Repeated) {
        return Err(ValidationError::RepeatedOneof {
            message: message.to_owned(),
            oneof: oneof.to_owned(),
            field: field.name.clone(),
            span: field.span,
        });
    }
    if matches!(field.label, Label::Optional) {
        return Err(ValidationError::OptionalOneof {
            message: message.to_owned(),
            oneof: oneof.to_owned(),
            field: field.name.clone(),
            span: field.span,
        });
    }
    if matches!(field.ty, Type::Map { .. }) {
        return Err(ValidationError::MapOneof {
            message: message.to_owned(),
            oneof: oneof.to_owned(),
            field: field.name.clone(),
            span: field.span,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Comments, Span};

    fn field(name: &str, number: i32, ty: Type, label: Label) -> ast::Field {
        ast::Field {
            name: name.into(),
            number,
            ty,
            label,
            oneof_index: None,
            options: vec![],
            comments: Comments::default(),
            span: Span::default(),
        }
    }

    #[test]
    fn field_number_out_of_range_rejected() {
        assert!(validate_field_number("M", 0, Span::default()).is_err());
        assert!(validate_field_number("M", 536_870_912, Span::default()).is_err());
        assert!(validate_field_number("M", 19_500, Span::default()).is_err());
        assert!(validate_field_number("M", 1, Span::default()).is_ok());
    }

    #[test]
    fn map_with_float_key_rejected() {
        let err =
            validate_map_type("M", "bad", Scalar::Float, &Type::Scalar(Scalar::Int32), Span::default())
                .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMapKeyType { .. }));
    }

    #[test]
    fn map_with_map_value_rejected() {
        let nested = Type::Map { key: Scalar::Int32, value: Box::new(Type::Scalar(Scalar::Int32)) };
        let err = validate_map_type("M", "bad", Scalar::String, &nested, Span::default()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMapValueType { .. }));
    }

    #[test]
    fn repeated_map_field_rejected() {
        let f = field(
            "m",
            1,
            Type::Map { key: Scalar::String, value: Box::new(Type::Scalar(Scalar::String)) },
            Label::Repeated,
        );
        let err = validate_field("M", &f).unwrap_err();
        assert!(matches!(err, ValidationError::RepeatedMapField { .. }));
    }

    #[test]
    fn packed_on_string_field_rejected() {
        let mut f = field("xs", 1, Type::Scalar(Scalar::String), Label::Repeated);
        f.options = vec![ast::OptionEntry {
            name: ast::OptionName { name: "packed".into(), is_custom: false, path_parts: vec![] },
            value: ast::OptionValue::Bool(true),
            span: Span::default(),
        }];
        let err = validate_field("M", &f).unwrap_err();
        assert!(matches!(err, ValidationError::UnpackableFieldType { .. }));
    }

    #[test]
    fn packed_on_repeated_int32_accepted() {
        let mut f = field("xs", 1, Type::Scalar(Scalar::Int32), Label::Repeated);
        f.options = vec![ast::OptionEntry {
            name: ast::OptionName { name: "packed".into(), is_custom: false, path_parts: vec![] },
            value: ast::OptionValue::Bool(true),
            span: Span::default(),
        }];
        assert!(validate_field("M", &f).is_ok());
    }

    #[test]
    fn oneof_member_cannot_be_repeated() {
        let f = field("x", 1, Type::Scalar(Scalar::Int32), Label::Repeated);
        let err = validate_oneof_member("M", "o", &f).unwrap_err();
        assert!(matches!(err, ValidationError::RepeatedOneof { .. }));
    }
}
