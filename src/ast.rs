//! The input AST this crate validates.
//!
//! Construction of these nodes — lexing, parsing, import-path search — is an
//! external collaborator's job; this crate only consumes an already-built
//! tree. The shapes below follow proto3's grammar closely enough for a
//! parser to build them directly, while staying plain, owned Rust values
//! (no arena, no `dyn` dispatch) since a single `.proto` file is small.

/// A 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: u32,
    pub col: u32,
}

impl Span {
    pub fn new(line: u32, col: u32) -> Self {
        Span { line, col }
    }
}

/// Comments on a Protobuf item, carried through to source-code-info
/// (§4.9.6) verbatim. Nothing here reformats markdown — there is no
/// doc-comment target to format for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    pub leading_detached: Vec<String>,
    pub leading: String,
    pub trailing: String,
}

/// How an `import` statement was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportModifier {
    Plain,
    Public,
    Weak,
}

#[derive(Debug, Clone)]
pub struct Import {
    pub path: String,
    pub modifier: ImportModifier,
    pub span: Span,
}

/// Proto3 scalar field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl Scalar {
    /// Scalars permitted as a `map` key (proto3 forbids `float`/`double`/`bytes` keys).
    pub fn is_valid_map_key(self) -> bool {
        !matches!(self, Scalar::Float | Scalar::Double | Scalar::Bytes)
    }

    /// Scalars whose wire representation admits the `packed` option on a repeated field.
    pub fn is_packable(self) -> bool {
        !matches!(self, Scalar::String | Scalar::Bytes)
    }
}

/// A field's type, as written in source. Symbolic `Named` references are
/// resolved later by the reference resolver (§4.2), not here.
#[derive(Debug, Clone)]
pub enum Type {
    Scalar(Scalar),
    /// An unresolved symbolic reference, exactly as it appeared in source
    /// (bare, dotted, or leading-dotted).
    Named(String),
    Map { key: Scalar, value: Box<Type> },
}

/// A field's cardinality label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Singular,
    Repeated,
    Optional,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub number: i32,
    pub ty: Type,
    pub label: Label,
    /// Index into the owning message's `oneofs`, if this field is a oneof member.
    pub oneof_index: Option<usize>,
    pub options: Vec<OptionEntry>,
    pub comments: Comments,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Oneof {
    pub name: String,
    pub fields: Vec<Field>,
    pub options: Vec<OptionEntry>,
    pub comments: Comments,
    pub span: Span,
}

/// A single `reserved` declaration: a closed numeric range, a lone number,
/// or a reserved field name.
#[derive(Debug, Clone)]
pub enum Reserved {
    Number(i32),
    Range { start: i32, end: i32 },
    Name(String),
}

#[derive(Debug, Clone)]
pub struct Message {
    pub name: String,
    pub fields: Vec<Field>,
    pub oneofs: Vec<Oneof>,
    pub nested_messages: Vec<Message>,
    pub nested_enums: Vec<Enum>,
    pub options: Vec<OptionEntry>,
    pub reserved: Vec<Reserved>,
    pub comments: Comments,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
    pub options: Vec<OptionEntry>,
    pub comments: Comments,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub name: String,
    pub values: Vec<EnumValue>,
    pub options: Vec<OptionEntry>,
    pub comments: Comments,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Rpc {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub options: Vec<OptionEntry>,
    pub comments: Comments,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub rpcs: Vec<Rpc>,
    pub options: Vec<OptionEntry>,
    pub comments: Comments,
    pub span: Span,
}

/// The name half of an option assignment: either a plain identifier
/// (`deprecated`) or a parenthesized, possibly dotted, custom option path
/// (`(my.custom.opt).field`).
#[derive(Debug, Clone)]
pub struct OptionName {
    /// The dotted extension name for custom options (without parens); the
    /// bare identifier for well-known options.
    pub name: String,
    pub is_custom: bool,
    /// Additional dotted path components following a custom option, e.g.
    /// `["field", "subfield"]` in `(my.opt).field.subfield`.
    pub path_parts: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum OptionValue {
    String(String),
    Number(f64),
    Identifier(String),
    Bool(bool),
    Array(Vec<OptionValue>),
    Map(Vec<(String, OptionValue)>),
}

#[derive(Debug, Clone)]
pub struct OptionEntry {
    pub name: OptionName,
    pub value: OptionValue,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct File {
    pub syntax: String,
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub options: Vec<OptionEntry>,
    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
    pub services: Vec<Service>,
}
