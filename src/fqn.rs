//! Fully qualified names.
//!
//! Per spec §3.2, Symbol Table keys never carry a leading dot — that's
//! reserved for the *canonical reference form* emitted to the descriptor
//! (§4.2), which is computed separately in `resolver`/`descriptor`. This
//! type only ever represents the dotless, Symbol-Table form.

use itertools::Itertools;

/// Invariant: never begins with a `.`.
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord)]
pub struct Fqn(String);

impl Fqn {
    /// Builds `package.component1.component2...name`, skipping empty
    /// segments (an absent package, or a root-scope definition).
    pub fn new(package: &str, path: &[impl AsRef<str>], name: &str) -> Self {
        let segments = std::iter::once(package)
            .filter(|s| !s.is_empty())
            .chain(path.iter().map(AsRef::as_ref).filter(|s| !s.is_empty()))
            .chain(std::iter::once(name).filter(|s| !s.is_empty()));
        Fqn(segments.join("."))
    }

    pub fn from_str(name: &str) -> Self {
        Fqn(name.trim_start_matches('.').to_string())
    }

    /// Extends this FQN with one more path component.
    pub fn join(&self, component: &str) -> Self {
        if self.0.is_empty() {
            Fqn(component.to_string())
        } else {
            Fqn(format!("{}.{}", self.0, component))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical leading-dot reference form for descriptor output.
    pub fn to_canonical(&self) -> String {
        format!(".{}", self.0)
    }
}

impl AsRef<str> for Fqn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fqn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
