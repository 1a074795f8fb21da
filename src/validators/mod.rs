//! Rule Validators (C4): one module per AST category, each owning a closed
//! set of rules (§4.3–§4.8). All share the coordinator's `ValidationState`
//! and call into `resolver` for type lookups; none of them recurse across
//! message boundaries or touch scope — that stays with the coordinator.

pub mod enum_;
pub mod field;
pub mod file;
pub mod message;
pub mod option;
pub mod service;
