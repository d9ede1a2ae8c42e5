//! Target dialect (C#) syntax tree.
//!
//! The converter builds these nodes; an external printer emits them. The
//! tree is construct-level, not token-level: shapes the printer needs are
//! represented, formatting is not.
//!
//! A few nodes can carry a trailing marker comment — that is the degraded-
//! output channel (`/* TODO ... */`) the converter prefers over aborting.

use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Built-in C# keyword types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Keyword {
    Bool,
    Byte,
    SByte,
    Char,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
    String,
    Object,
    Void,
}

impl Keyword {
    pub fn text(self) -> &'static str {
        match self {
            Keyword::Bool => "bool",
            Keyword::Byte => "byte",
            Keyword::SByte => "sbyte",
            Keyword::Char => "char",
            Keyword::Short => "short",
            Keyword::UShort => "ushort",
            Keyword::Int => "int",
            Keyword::UInt => "uint",
            Keyword::Long => "long",
            Keyword::ULong => "ulong",
            Keyword::Float => "float",
            Keyword::Double => "double",
            Keyword::Decimal => "decimal",
            Keyword::String => "string",
            Keyword::Object => "object",
            Keyword::Void => "void",
        }
    }
}

// ---------------------------------------------------------------------------
// Names and types
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Name {
    Identifier(String),
    Generic { ident: String, args: Vec<Type> },
    Qualified { left: Box<Name>, right: Box<Name> },
    /// `alias::name`, e.g. `global::System`.
    AliasQualified { alias: String, name: Box<Name> },
}

impl Name {
    pub fn identifier(text: impl Into<String>) -> Self {
        Name::Identifier(text.into())
    }

    pub fn qualified(left: Name, right: Name) -> Self {
        Name::Qualified {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Identifier(t) => f.write_str(t),
            Name::Generic { ident, args } => {
                write!(f, "{ident}<")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(">")
            }
            Name::Qualified { left, right } => write!(f, "{left}.{right}"),
            Name::AliasQualified { alias, name } => write!(f, "{alias}::{name}"),
        }
    }
}

/// Re-parse a dotted qualified string (as produced by symbol display
/// formatting) into a name. Handles top-level generic argument lists; the
/// argument names themselves parse recursively.
pub fn parse_name(text: &str) -> Name {
    let segments = split_top_level(text, '.');
    let mut name: Option<Name> = None;
    for seg in segments {
        let simple = parse_simple_name(seg.trim());
        name = Some(match name {
            None => simple,
            Some(left) => Name::qualified(left, simple),
        });
    }
    name.unwrap_or_else(|| Name::identifier(text))
}

fn parse_simple_name(seg: &str) -> Name {
    match seg.find('<') {
        Some(open) if seg.ends_with('>') => {
            let ident = seg[..open].to_string();
            let inner = &seg[open + 1..seg.len() - 1];
            let args = split_top_level(inner, ',')
                .into_iter()
                .map(|a| Type::Name(parse_name(a.trim())))
                .collect();
            Name::Generic { ident, args }
        }
        _ => Name::identifier(seg),
    }
}

/// Split on `sep` ignoring separators nested inside `<...>`.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Type {
    Predefined(Keyword),
    Name(Name),
    Array {
        element: Box<Type>,
        /// Rank counts only; sizes are always omitted.
        ranks: SmallVec<[usize; 1]>,
    },
    Nullable(Box<Type>),
    /// `var` — inferred, used where the source supplies no type.
    Var,
}

impl Type {
    pub fn named(text: &str) -> Self {
        Type::Name(parse_name(text))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Predefined(k) => f.write_str(k.text()),
            Type::Name(n) => write!(f, "{n}"),
            Type::Array { element, ranks } => {
                write!(f, "{element}")?;
                for rank in ranks {
                    f.write_str("[")?;
                    for _ in 1..*rank {
                        f.write_str(",")?;
                    }
                    f.write_str("]")?;
                }
                Ok(())
            }
            Type::Nullable(e) => write!(f, "{e}?"),
            Type::Var => f.write_str("var"),
        }
    }
}

// ---------------------------------------------------------------------------
// Attributes and modifiers
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AttrTarget {
    Assembly,
    Module,
    Return,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributeArgument {
    /// `name =` for named attribute arguments.
    pub name: Option<String>,
    pub expr: Expr,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attribute {
    pub name: Name,
    pub arguments: Vec<AttributeArgument>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributeList {
    pub target: Option<AttrTarget>,
    pub attributes: Vec<Attribute>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Internal,
    Static,
    Abstract,
    Sealed,
    Virtual,
    Override,
    Readonly,
    Const,
    Partial,
    Async,
    New,
    Ref,
    Out,
    Params,
    Implicit,
    Explicit,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    BitAnd,
    LogicalAnd,
    BitOr,
    LogicalOr,
    Xor,
    LeftShift,
    RightShift,
    Coalesce,
    As,
    Is,
}

impl BinaryOp {
    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::BitAnd => "&",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::BitOr => "|",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Xor => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::Coalesce => "??",
            BinaryOp::As => "as",
            BinaryOp::Is => "is",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    LogicalNot,
    BitNot,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ArgMode {
    Ref,
    Out,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Argument {
    /// `name:` prefix for named arguments.
    pub name: Option<String>,
    pub mode: Option<ArgMode>,
    pub expr: Expr,
}

impl Argument {
    pub fn positional(expr: Expr) -> Self {
        Argument {
            name: None,
            mode: None,
            expr,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum InitializerKind {
    Object,
    Collection,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Initializer {
    pub kind: InitializerKind,
    pub expressions: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum LambdaParams {
    /// Single bare parameter: `x => ...`. Boxed: the parameter's default
    /// value closes an expression cycle.
    Simple(Box<Parameter>),
    Parenthesized(Vec<Parameter>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum LambdaBody {
    Expression(Box<Expr>),
    Statement(Box<Stmt>),
    Block(Vec<Stmt>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum InterpolatedContent {
    Text(String),
    Interpolation {
        expr: Expr,
        alignment: Option<Expr>,
        format: Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    /// `default(T)` for a null of value type.
    Default(Type),
    Name(Name),
    This,
    Base,
    MemberAccess {
        base: Box<Expr>,
        name: Name,
    },
    /// Receiver-less `.name` continuation inside a conditional access.
    MemberBinding {
        name: Name,
    },
    ConditionalAccess {
        base: Box<Expr>,
        when_not_null: Box<Expr>,
    },
    Invocation {
        callee: Box<Expr>,
        arguments: Vec<Argument>,
    },
    ElementAccess {
        base: Box<Expr>,
        arguments: Vec<Argument>,
    },
    Cast {
        ty: Type,
        expr: Box<Expr>,
    },
    /// `x is T` / `x as T` ride on `Binary` with a type right operand.
    TypeBinary {
        op: BinaryOp,
        expr: Box<Expr>,
        ty: Type,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
    },
    ObjectCreation {
        ty: Type,
        arguments: Vec<Argument>,
        initializer: Option<Initializer>,
    },
    AnonymousObjectCreation {
        declarators: Vec<AnonymousMember>,
    },
    ArrayCreation {
        element: Type,
        /// Length expressions for the first rank; empty when sizes are
        /// carried by an initializer instead.
        lengths: Vec<Expr>,
        ranks: SmallVec<[usize; 1]>,
        initializer: Option<Initializer>,
    },
    ImplicitArrayCreation(Initializer),
    InitializerExpr(Initializer),
    TypeOf(Type),
    Await(Box<Expr>),
    Lambda {
        params: LambdaParams,
        body: LambdaBody,
    },
    Interpolated(Vec<InterpolatedContent>),
    Parenthesized(Box<Expr>),
    /// `expr /* comment */` — human-reviewable degradation marker.
    Commented {
        expr: Box<Expr>,
        comment: String,
    },
}

impl Expr {
    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn ident(text: impl Into<String>) -> Self {
        Expr::Name(Name::identifier(text))
    }

    pub fn invocation(callee: Expr, arguments: Vec<Argument>) -> Self {
        Expr::Invocation {
            callee: Box::new(callee),
            arguments,
        }
    }

    pub fn with_comment(self, comment: impl Into<String>) -> Self {
        Expr::Commented {
            expr: Box::new(self),
            comment: comment.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnonymousMember {
    /// `Name = value`; `None` for projection-style members.
    pub name: Option<String>,
    pub value: Expr,
}

// ---------------------------------------------------------------------------
// Statements (the small surface the engine itself produces; full statement
// trees come from the external body converter)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Stmt {
    Expression(Expr),
    Return(Option<Expr>),
    /// `var name = init;`
    LocalVar {
        name: String,
        initializer: Expr,
    },
    Block(Vec<Stmt>),
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Parameter {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    /// `None` only in bare lambda heads.
    pub ty: Option<Type>,
    pub name: String,
    pub default: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeParameter {
    pub variance: Option<VarianceKind>,
    pub name: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum VarianceKind {
    In,
    Out,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Constraint {
    Type(Type),
    Constructor,
    Class,
    Struct,
}

/// `where T : ...` — one clause per constrained parameter, ordered.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConstraintClause {
    pub param: String,
    pub constraints: Vec<Constraint>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AccessorKind {
    Get,
    Set,
    Add,
    Remove,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    /// `None` prints as `get;` (auto/abstract form).
    pub body: Option<Vec<Stmt>>,
}

impl Accessor {
    pub fn auto(kind: AccessorKind) -> Self {
        Accessor {
            kind,
            attributes: Vec::new(),
            modifiers: Vec::new(),
            body: None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CtorInitializerKind {
    Base,
    This,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CtorInitializer {
    pub kind: CtorInitializerKind,
    pub arguments: Vec<Argument>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TypeDeclKind {
    Class,
    Struct,
    Interface,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnumMember {
    pub attributes: Vec<AttributeList>,
    pub name: String,
    pub initializer: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum MemberDecl {
    Namespace {
        name: Name,
        members: Vec<MemberDecl>,
    },
    Type {
        kind: TypeDeclKind,
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        name: String,
        type_params: Vec<TypeParameter>,
        bases: Vec<Type>,
        constraints: Vec<ConstraintClause>,
        members: Vec<MemberDecl>,
    },
    Enum {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        name: String,
        base: Option<Type>,
        members: Vec<EnumMember>,
    },
    Delegate {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        return_type: Type,
        name: String,
        type_params: Vec<TypeParameter>,
        parameters: Vec<Parameter>,
        constraints: Vec<ConstraintClause>,
    },
    Field {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        ty: Type,
        name: String,
        initializer: Option<Expr>,
        /// Degradation marker for source modifiers with no mapping.
        trailing_comment: Option<String>,
    },
    Property {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        ty: Type,
        name: String,
        accessors: Vec<Accessor>,
        initializer: Option<Expr>,
    },
    Indexer {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        ty: Type,
        parameters: Vec<Parameter>,
        accessors: Vec<Accessor>,
    },
    Method {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        return_type: Type,
        name: String,
        type_params: Vec<TypeParameter>,
        parameters: Vec<Parameter>,
        constraints: Vec<ConstraintClause>,
        body: Option<Vec<Stmt>>,
    },
    Constructor {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        name: String,
        parameters: Vec<Parameter>,
        initializer: Option<CtorInitializer>,
        body: Vec<Stmt>,
    },
    Destructor {
        attributes: Vec<AttributeList>,
        name: String,
        body: Option<Vec<Stmt>>,
    },
    Operator {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        return_type: Type,
        /// Operator token text (`+`, `==`, ...).
        token: String,
        parameters: Vec<Parameter>,
        body: Vec<Stmt>,
    },
    /// Field-like event: `event D Name;`
    EventField {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        ty: Type,
        name: String,
    },
    /// Event with explicit add/remove accessors.
    Event {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        ty: Type,
        name: String,
        accessors: Vec<Accessor>,
    },
}

impl MemberDecl {
    pub fn name(&self) -> Option<&str> {
        match self {
            MemberDecl::Type { name, .. }
            | MemberDecl::Enum { name, .. }
            | MemberDecl::Delegate { name, .. }
            | MemberDecl::Field { name, .. }
            | MemberDecl::Property { name, .. }
            | MemberDecl::Method { name, .. }
            | MemberDecl::Constructor { name, .. }
            | MemberDecl::Destructor { name, .. }
            | MemberDecl::EventField { name, .. }
            | MemberDecl::Event { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UsingDirective {
    pub alias: Option<String>,
    pub name: Name,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompilationUnit {
    pub usings: Vec<UsingDirective>,
    pub attributes: Vec<AttributeList>,
    pub members: Vec<MemberDecl>,
}
