//! Message Validator (§4.4).
//!
//! Owns message name grammar, oneof non-emptiness, nested-type uniqueness,
//! and reserved-entry validation. Per-field rules are delegated to
//! `validators::field`; cross-message concerns (registration, dependency
//! edges, recursion into nested messages) stay with the coordinator, which
//! alone knows about scope push/pop.

use std::collections::{HashMap, HashSet};

use crate::ast::{self, Reserved};
use crate::error::{Result, ValidationError};
use crate::ident;
use crate::validators::field;
use crate::validators::option::{self, FieldOptionValues, MessageOptionValues};

const FIELD_NUMBER_MIN: i32 = 1;
const FIELD_NUMBER_MAX: i32 = 536_870_911;
const RESERVED_RANGE_START: i32 = 19_000;
const RESERVED_RANGE_END: i32 = 19_999;

fn overlaps_reserved_system_range(lo: i32, hi: i32) -> bool {
    lo <= RESERVED_RANGE_END && hi >= RESERVED_RANGE_START
}

pub fn validate_message_name(message: &ast::Message) -> Result<()> {
    if !ident::is_valid_message_or_service_name(&message.name)
        || ident::is_screaming_snake_case(&message.name)
    {
        return Err(ValidationError::InvalidMessageName {
            name: message.name.clone(),
            span: message.span,
        });
    }
    Ok(())
}

/// Validates `message.reserved` in isolation (§4.4): range legality,
/// overlap-freedom among numeric entries, and no duplicate reserved names.
/// Returns the validated reserved numbers/ranges and names so the field
/// loop can cross-check live fields against them in one pass.
struct ReservedSet {
    numbers: Vec<(i32, i32)>, // inclusive [start, end], a lone number is (n, n)
    names: HashSet<String>,
}

impl ReservedSet {
    fn contains_number(&self, n: i32) -> bool {
        self.numbers.iter().any(|&(lo, hi)| n >= lo && n <= hi)
    }
}

fn validate_reserved(message: &ast::Message) -> Result<ReservedSet> {
    let mut numbers: Vec<(i32, i32)> = Vec::new();
    let mut names = HashSet::new();

    for entry in &message.reserved {
        match entry {
            Reserved::Number(n) => {
                check_reserved_number_range(&message.name, *n, *n, message.span)?;
                numbers.push((*n, *n));
            }
            Reserved::Range { start, end } => {
                if start >= end {
                    return Err(ValidationError::MalformedReservedRange {
                        message: message.name.clone(),
                        start: *start,
                        end: *end,
                        span: message.span,
                    });
                }
                check_reserved_number_range(&message.name, *start, *end, message.span)?;
                numbers.push((*start, *end));
            }
            Reserved::Name(name) => {
                if !names.insert(name.clone()) {
                    return Err(ValidationError::DuplicateReservedName {
                        message: message.name.clone(),
                        name: name.clone(),
                        span: message.span,
                    });
                }
            }
        }
    }

    numbers.sort_unstable();
    for window in numbers.windows(2) {
        let (_, prev_end) = window[0];
        let (next_start, _) = window[1];
        if next_start <= prev_end {
            return Err(ValidationError::OverlappingReservedRange {
                message: message.name.clone(),
                span: message.span,
            });
        }
    }

    Ok(ReservedSet { numbers, names })
}

fn check_reserved_number_range(message: &str, lo: i32, hi: i32, span: ast::Span) -> Result<()> {
    if lo < FIELD_NUMBER_MIN || hi > FIELD_NUMBER_MAX || overlaps_reserved_system_range(lo, hi) {
        return Err(ValidationError::MalformedReservedRange {
            message: message.to_owned(),
            start: lo,
            end: hi,
            span,
        });
    }
    Ok(())
}

/// The options and field-option table produced by fully validating one
/// message, handed to the descriptor builder alongside the (unchanged) AST.
pub struct ValidatedMessage<'a> {
    pub options: MessageOptionValues<'a>,
    pub field_options: HashMap<String, FieldOptionValues<'a>>,
}

/// Validates everything about `message` that doesn't require type
/// resolution: name, nested-type uniqueness, reserved entries, oneof
/// shape, and every field's own shape rules (§4.3). Does not recurse into
/// `nested_messages`/`nested_enums` — the coordinator does that so it can
/// push/pop scope around each (§4.1 step 7).
pub fn validate_message<'a>(message: &'a ast::Message) -> Result<ValidatedMessage<'a>> {
    validate_message_name(message)?;
    let reserved = validate_reserved(message)?;

    let mut nested_type_names = HashSet::new();
    for nested in message.nested_messages.iter().map(|m| &m.name) {
        if !nested_type_names.insert(nested.clone()) {
            return Err(ValidationError::DuplicateNestedTypeName {
                parent: message.name.clone(),
                name: nested.clone(),
                span: message.span,
            });
        }
    }
    for nested in message.nested_enums.iter().map(|e| &e.name) {
        if !nested_type_names.insert(nested.clone()) {
            return Err(ValidationError::DuplicateNestedTypeName {
                parent: message.name.clone(),
                name: nested.clone(),
                span: message.span,
            });
        }
    }

    let mut field_names = HashSet::new();
    let mut field_numbers = HashSet::new();
    let mut field_options = HashMap::new();

    for f in &message.fields {
        validate_one_field(message, f, &reserved, &mut field_names, &mut field_numbers)?;
        field_options.insert(f.name.clone(), field::validate_field(&message.name, f)?);
    }

    for oneof in &message.oneofs {
        if oneof.fields.is_empty() {
            return Err(ValidationError::EmptyOneof {
                message: message.name.clone(),
                oneof: oneof.name.clone(),
                span: oneof.span,
            });
        }
        for f in &oneof.fields {
            validate_one_field(message, f, &reserved, &mut field_names, &mut field_numbers)?;
            field::validate_oneof_member(&message.name, &oneof.name, f)?;
            field_options.insert(f.name.clone(), field::validate_field(&message.name, f)?);
        }
    }

    let target = format!("message {}", message.name);
    let options = option::validate_message_options(&message.options, &target)?;

    Ok(ValidatedMessage { options, field_options })
}

fn validate_one_field(
    message: &ast::Message,
    f: &ast::Field,
    reserved: &ReservedSet,
    field_names: &mut HashSet<String>,
    field_numbers: &mut HashSet<i32>,
) -> Result<()> {
    if !field_names.insert(f.name.clone()) {
        return Err(ValidationError::DuplicateFieldName {
            message: message.name.clone(),
            name: f.name.clone(),
            span: f.span,
        });
    }
    if !field_numbers.insert(f.number) {
        return Err(ValidationError::DuplicateMessageFieldNumber {
            message: message.name.clone(),
            number: f.number,
            span: f.span,
        });
    }
    if reserved.names.contains(&f.name) {
        return Err(ValidationError::ReservedFieldName {
            message: message.name.clone(),
            name: f.name.clone(),
            span: f.span,
        });
    }
    if reserved.contains_number(f.number) {
        return Err(ValidationError::ReservedFieldNumber {
            message: message.name.clone(),
            number: f.number,
            span: f.span,
        });
    }
    Ok(())
}
