//! Enum Validator (§4.8, enum half).
//!
//! Name grammar, non-empty value list, first-value-is-zero, value-name
//! grammar, unconditional name uniqueness, and number uniqueness gated by
//! `allow_alias` (§9 Open Question 1: aliasing is permitted for any
//! numeric value, including zero — the later of the source's overlapping
//! drafts, per the spec's resolution).

use std::collections::HashMap;

use crate::ast;
use crate::error::{Result, ValidationError};
use crate::ident;
use crate::validators::option::{self, EnumOptionValues, EnumValueOptionValues};

pub fn validate_enum_name(e: &ast::Enum) -> Result<()> {
    if !ident::is_valid_message_or_service_name(&e.name) {
        return Err(ValidationError::InvalidEnumName { name: e.name.clone(), span: e.span });
    }
    Ok(())
}

pub struct ValidatedEnum<'a> {
    pub options: EnumOptionValues<'a>,
    pub value_options: HashMap<String, EnumValueOptionValues<'a>>,
}

pub fn validate_enum<'a>(e: &'a ast::Enum) -> Result<ValidatedEnum<'a>> {
    validate_enum_name(e)?;

    if e.values.is_empty() {
        return Err(ValidationError::EmptyEnum { enum_name: e.name.clone(), span: e.span });
    }

    let target = format!("enum {}", e.name);
    let options = option::validate_enum_options(&e.options, &target)?;
    let allow_alias = options.allow_alias.unwrap_or(false);

    if e.values[0].number != 0 {
        return Err(ValidationError::FirstEnumValueNotZero {
            enum_name: e.name.clone(),
            span: e.values[0].span,
        });
    }

    let mut names = std::collections::HashSet::new();
    let mut numbers = std::collections::HashSet::new();
    let mut value_options = HashMap::new();

    for value in &e.values {
        if !ident::is_valid_enum_value_name(&value.name) {
            return Err(ValidationError::InvalidEnumValueName {
                name: value.name.clone(),
                span: value.span,
            });
        }
        if !names.insert(value.name.clone()) {
            return Err(ValidationError::DuplicateEnumValue {
                enum_name: e.name.clone(),
                number: value.number,
                span: value.span,
            });
        }
        if !allow_alias && !numbers.insert(value.number) {
            return Err(ValidationError::DuplicateEnumValue {
                enum_name: e.name.clone(),
                number: value.number,
                span: value.span,
            });
        }

        let value_target = format!("enum value {}.{}", e.name, value.name);
        let v_opts = option::validate_enum_value_options(&value.options, &value_target)?;
        value_options.insert(value.name.clone(), v_opts);
    }

    Ok(ValidatedEnum { options, value_options })
}
