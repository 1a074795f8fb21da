//! Reference Resolver (C3).
//!
//! Implements proto3 name resolution (§4.2): registering every message and
//! enum into the Symbol Table under its fully qualified name, and resolving
//! bare, dotted, and leading-dot references against the layered environment
//! in `ValidationState`. The walk-outward-looking-for-the-longest-registered-
//! prefix shape is a common one for dotted-path resolution; here it is
//! generalized to proto3's full four-layer search order instead of a single
//! flat path table.

use crate::ast::{self, Span};
use crate::error::{Result, ValidationError};
use crate::fqn::Fqn;
use crate::state::{Definition, ValidationState};

/// A resolved reference: the Symbol-Table FQN (used for dependency edges
/// and further internal lookups) plus the canonical, leading-dot form that
/// the descriptor builder emits (§4.2's "Canonical form" rule).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub fqn: Fqn,
    pub canonical: String,
}

/// Registers a message and its nested messages/enums into the Symbol Table
/// under `ParentFqn.Name` (coordinator pass 5, §4.1 step 5).
pub fn register_message<'a>(
    state: &mut ValidationState<'a>,
    parent: &Fqn,
    message: &'a ast::Message,
) -> Result<()> {
    let fqn = parent.join(&message.name);
    if !state.symbols.insert(fqn.clone(), Definition::Message(message)) {
        return Err(ValidationError::DuplicateTypeName { fqn: fqn.as_str().to_owned() });
    }
    log::debug!("registered message {fqn}");
    for nested in &message.nested_messages {
        register_message(state, &fqn, nested)?;
    }
    for nested in &message.nested_enums {
        register_enum(state, &fqn, nested)?;
    }
    Ok(())
}

pub fn register_enum<'a>(
    state: &mut ValidationState<'a>,
    parent: &Fqn,
    e: &'a ast::Enum,
) -> Result<()> {
    let fqn = parent.join(&e.name);
    if !state.symbols.insert(fqn.clone(), Definition::Enum(e)) {
        return Err(ValidationError::DuplicateTypeName { fqn: fqn.as_str().to_owned() });
    }
    log::debug!("registered enum {fqn}");
    Ok(())
}

/// The root scope FQN: the file's package, or the dotless empty root if
/// the file has no package.
fn root(state: &ValidationState) -> Fqn {
    Fqn::from_str(&state.package)
}

/// Accepts a resolution that the literal Symbol-Table walk in §4.2 cannot
/// reach, but that invariant 5 (§3.3) nonetheless requires to succeed: a
/// reference whose simple (final) name component is a registered imported
/// type. This reconciles the prose of §4.2 steps 1 and 3 (Symbol Table
/// only) with invariant 5's broader "Symbol Table or Imported-Types"
/// requirement — see DESIGN.md for the rationale.
fn accept_as_imported(state: &ValidationState, reference_no_dot: &str) -> Option<Resolved> {
    let simple = reference_no_dot.rsplit('.').next().unwrap_or(reference_no_dot);
    if state.imported_types.contains(simple) {
        Some(Resolved {
            fqn: Fqn::from_str(reference_no_dot),
            canonical: format!(".{reference_no_dot}"),
        })
    } else {
        None
    }
}

/// Resolves `reference` as it appears inside `enclosing` (the dotless FQN
/// of the message the reference occurs in), or `None` for a reference at
/// service/RPC scope. `referenced_in` and `span` are only used to build the
/// `UndefinedType` error.
pub fn resolve(
    state: &ValidationState,
    reference: &str,
    referenced_in: &str,
    span: Span,
) -> Result<Resolved> {
    if let Some(rest) = reference.strip_prefix('.') {
        return resolve_leading_dot(state, rest, reference, referenced_in, span);
    }

    let components: Vec<&str> = reference.split('.').collect();
    if components.len() >= 2 {
        resolve_qualified(state, reference, &components, referenced_in, span)
    } else {
        resolve_bare(state, reference, referenced_in, span)
    }
}

fn resolve_leading_dot(
    state: &ValidationState,
    rest: &str,
    original: &str,
    referenced_in: &str,
    span: Span,
) -> Result<Resolved> {
    let fqn = Fqn::from_str(rest);
    if state.symbols.contains(&fqn) {
        return Ok(Resolved { fqn, canonical: format!(".{rest}") });
    }
    accept_as_imported(state, rest).ok_or_else(|| ValidationError::UndefinedType {
        reference: original.to_owned(),
        referenced_in: referenced_in.to_owned(),
        span,
    })
}

fn resolve_qualified(
    state: &ValidationState,
    original: &str,
    components: &[&str],
    referenced_in: &str,
    span: Span,
) -> Result<Resolved> {
    let undefined = |prefix: &str| ValidationError::UndefinedType {
        reference: prefix.to_owned(),
        referenced_in: referenced_in.to_owned(),
        span,
    };

    let first = components[0];
    let mut base = if !state.package.is_empty() && state.symbols.contains(&root(state).join(first))
    {
        root(state).join(first)
    } else if state.symbols.contains(&Fqn::from_str(first)) {
        Fqn::from_str(first)
    } else {
        return accept_as_imported(state, original).ok_or_else(|| undefined(first));
    };

    for component in &components[1..] {
        base = base.join(component);
        if !state.symbols.contains(&base) {
            return accept_as_imported(state, original)
                .ok_or_else(|| undefined(base.as_str()));
        }
    }

    // Cross-package rule (§4.2): a dotted, non-leading-dot reference is
    // always emitted as `.<as-written>`, regardless of how it resolved.
    Ok(Resolved { fqn: base, canonical: format!(".{original}") })
}

fn resolve_bare(
    state: &ValidationState,
    reference: &str,
    referenced_in: &str,
    span: Span,
) -> Result<Resolved> {
    for scope in state.scopes_innermost_first() {
        let candidate = scope.join(reference);
        if state.symbols.contains(&candidate) {
            return Ok(Resolved {
                fqn: candidate.clone(),
                canonical: candidate.to_canonical(),
            });
        }
    }

    if !state.package.is_empty() {
        let candidate = root(state).join(reference);
        if state.symbols.contains(&candidate) {
            return Ok(Resolved { fqn: candidate.clone(), canonical: candidate.to_canonical() });
        }
    }

    let root_candidate = Fqn::from_str(reference);
    if state.symbols.contains(&root_candidate) {
        return Ok(Resolved {
            fqn: root_candidate.clone(),
            canonical: root_candidate.to_canonical(),
        });
    }

    if state.imported_types.contains(reference) {
        return Ok(Resolved {
            fqn: root_candidate,
            canonical: format!(".{reference}"),
        });
    }

    Err(ValidationError::UndefinedType {
        reference: reference.to_owned(),
        referenced_in: referenced_in.to_owned(),
        span,
    })
}

/// Resolution restricted to the Symbol Table, with no Imported-Types
/// fallback — used by the dependency analyzer (§4.5), which treats any
/// reference it can't resolve this way as a foreign leaf rather than an
/// error. `enclosing` is the dotless FQN of the message declaring the field.
pub(crate) fn resolve_for_dependency_graph(
    state: &ValidationState,
    reference: &str,
    enclosing: &Fqn,
) -> Option<Fqn> {
    if let Some(rest) = reference.strip_prefix('.') {
        let fqn = Fqn::from_str(rest);
        return state.symbols.contains(&fqn).then_some(fqn);
    }

    let components: Vec<&str> = reference.split('.').collect();
    if components.len() >= 2 {
        let first = components[0];
        let mut base = if !state.package.is_empty()
            && state.symbols.contains(&root(state).join(first))
        {
            root(state).join(first)
        } else if state.symbols.contains(&Fqn::from_str(first)) {
            Fqn::from_str(first)
        } else {
            return None;
        };
        for component in &components[1..] {
            base = base.join(component);
            if !state.symbols.contains(&base) {
                return None;
            }
        }
        return Some(base);
    }

    // Bare name: walk outward from `enclosing` exactly as resolve_bare does,
    // minus the Imported-Types step.
    let mut scope = Some(enclosing.clone());
    while let Some(current) = scope {
        let candidate = current.join(reference);
        if state.symbols.contains(&candidate) {
            return Some(candidate);
        }
        scope = current.as_str().rsplit_once('.').map(|(parent, _)| Fqn::from_str(parent));
    }
    if !state.package.is_empty() {
        let candidate = root(state).join(reference);
        if state.symbols.contains(&candidate) {
            return Some(candidate);
        }
    }
    let root_candidate = Fqn::from_str(reference);
    state.symbols.contains(&root_candidate).then_some(root_candidate)
}
