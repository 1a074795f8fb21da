#![doc(html_root_url = "https://docs.rs/proto3-descriptor-core/0.1.0")]

//! Semantic validation, reference resolution, dependency analysis, and
//! descriptor construction for proto3 descriptor trees.
//!
//! This crate does not parse `.proto` source and does not resolve import
//! paths on disk — it consumes an already-built [`ast::File`] (the job of
//! an external lexer/parser) plus an externally-resolved
//! [`state::ImportedTypes`] table (the job of an external import
//! resolver), and produces either a validated, resolved
//! [`coordinator::ValidatedFile`] or the first [`error::ValidationError`]
//! encountered.
//!
//! ```
//! use proto3_descriptor_core::ast::{Comments, File, Message, Span};
//! use proto3_descriptor_core::state::ImportedTypes;
//! use proto3_descriptor_core::{validate, Config};
//!
//! let file = File {
//!     syntax: "proto3".into(),
//!     package: Some("greet".into()),
//!     imports: vec![],
//!     options: vec![],
//!     messages: vec![Message {
//!         name: "Greeting".into(),
//!         fields: vec![],
//!         oneofs: vec![],
//!         nested_messages: vec![],
//!         nested_enums: vec![],
//!         options: vec![],
//!         reserved: vec![],
//!         comments: Comments::default(),
//!         span: Span::default(),
//!     }],
//!     enums: vec![],
//!     services: vec![],
//! };
//!
//! let validated = validate(&file, ImportedTypes::new()).unwrap();
//! let descriptor = validated.to_descriptor(&Config::new());
//! assert_eq!(descriptor.message_type[0].name.as_deref(), Some("Greeting"));
//! ```

pub mod ast;
pub mod config;
pub mod coordinator;
pub mod dependency_graph;
pub mod descriptor;
pub mod error;
pub mod fqn;
pub mod ident;
pub mod resolver;
pub mod state;
pub mod validators;

pub use config::Config;
pub use coordinator::{validate, ValidatedFile};
pub use error::{Result, ValidationError};
pub use fqn::Fqn;

impl<'a> ValidatedFile<'a> {
    /// Translates this validated file into its canonical
    /// `prost_types::FileDescriptorProto` wire shape (§4.9), honoring
    /// `config.generate_source_info`.
    pub fn to_descriptor(&self, config: &Config) -> prost_types::FileDescriptorProto {
        descriptor::build(self, config.generate_source_info)
    }
}
