//! Source dialect (Visual Basic) syntax tree.
//!
//! A closed, tagged tree: every construct the converter dispatches over is a
//! variant here, and grammar constructs with no declared mapping surface as
//! the `Unknown` variants so conversion can fail fast with a typed error
//! instead of degrading silently.
//!
//! Nodes that the semantic binder answers queries about — expressions,
//! declarations, types, names, statements — carry a [`NodeId`].

use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;
use vbcs_common::NodeId;

/// A raw identifier token, before reserved-word escaping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ident {
    pub text: String,
}

impl Ident {
    pub fn new(text: impl Into<String>) -> Self {
        Ident { text: text.into() }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Declaration and parameter modifiers as they appear in source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Modifier {
    Public,
    Private,
    Friend,
    Protected,
    Shared,
    Shadows,
    Overloads,
    Overrides,
    Overridable,
    NotOverridable,
    MustOverride,
    MustInherit,
    NotInheritable,
    ReadOnly,
    WriteOnly,
    Const,
    Dim,
    Default,
    WithEvents,
    Partial,
    Iterator,
    Async,
    ByVal,
    ByRef,
    Optional,
    ParamArray,
    Widening,
    Narrowing,
}

impl Modifier {
    /// Source spelling, used in marker comments for dropped modifiers.
    pub fn text(self) -> &'static str {
        match self {
            Modifier::Public => "Public",
            Modifier::Private => "Private",
            Modifier::Friend => "Friend",
            Modifier::Protected => "Protected",
            Modifier::Shared => "Shared",
            Modifier::Shadows => "Shadows",
            Modifier::Overloads => "Overloads",
            Modifier::Overrides => "Overrides",
            Modifier::Overridable => "Overridable",
            Modifier::NotOverridable => "NotOverridable",
            Modifier::MustOverride => "MustOverride",
            Modifier::MustInherit => "MustInherit",
            Modifier::NotInheritable => "NotInheritable",
            Modifier::ReadOnly => "ReadOnly",
            Modifier::WriteOnly => "WriteOnly",
            Modifier::Const => "Const",
            Modifier::Dim => "Dim",
            Modifier::Default => "Default",
            Modifier::WithEvents => "WithEvents",
            Modifier::Partial => "Partial",
            Modifier::Iterator => "Iterator",
            Modifier::Async => "Async",
            Modifier::ByVal => "ByVal",
            Modifier::ByRef => "ByRef",
            Modifier::Optional => "Optional",
            Modifier::ParamArray => "ParamArray",
            Modifier::Widening => "Widening",
            Modifier::Narrowing => "Narrowing",
        }
    }
}

// ---------------------------------------------------------------------------
// Names and types
// ---------------------------------------------------------------------------

/// A (possibly qualified, possibly generic) name reference.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NameRef {
    pub id: NodeId,
    pub kind: NameKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum NameKind {
    Identifier(Ident),
    /// The `Global` root-namespace keyword.
    Global,
    Generic {
        ident: Ident,
        type_args: Vec<TypeRef>,
    },
    Qualified {
        left: Box<NameRef>,
        right: Box<NameRef>,
    },
}

impl NameRef {
    pub fn identifier(id: NodeId, text: impl Into<String>) -> Self {
        NameRef {
            id,
            kind: NameKind::Identifier(Ident::new(text)),
        }
    }
}

impl fmt::Display for NameRef {
    /// The as-written source spelling (trivia-free), used by the
    /// qualification resolver's suffix check.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NameKind::Identifier(id) => f.write_str(&id.text),
            NameKind::Global => f.write_str("Global"),
            NameKind::Generic { ident, type_args } => {
                write!(f, "{ident}(Of ")?;
                for (i, arg) in type_args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            NameKind::Qualified { left, right } => write!(f, "{left}.{right}"),
        }
    }
}

/// Built-in keyword types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum PredefinedTy {
    Boolean,
    Byte,
    SByte,
    Char,
    Short,
    UShort,
    Integer,
    UInteger,
    Long,
    ULong,
    Single,
    Double,
    Decimal,
    Date,
    String,
    Object,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeRef {
    pub id: NodeId,
    pub kind: TypeKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum TypeKind {
    Predefined(PredefinedTy),
    Name(NameRef),
    /// Array shape; each entry is the rank count of one specifier.
    Array {
        element: Box<TypeRef>,
        ranks: SmallVec<[usize; 1]>,
    },
    Nullable(Box<TypeRef>),
    /// A type construct with no declared mapping.
    Unknown {
        kind_name: String,
    },
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Predefined(p) => f.write_str(match p {
                PredefinedTy::Boolean => "Boolean",
                PredefinedTy::Byte => "Byte",
                PredefinedTy::SByte => "SByte",
                PredefinedTy::Char => "Char",
                PredefinedTy::Short => "Short",
                PredefinedTy::UShort => "UShort",
                PredefinedTy::Integer => "Integer",
                PredefinedTy::UInteger => "UInteger",
                PredefinedTy::Long => "Long",
                PredefinedTy::ULong => "ULong",
                PredefinedTy::Single => "Single",
                PredefinedTy::Double => "Double",
                PredefinedTy::Decimal => "Decimal",
                PredefinedTy::Date => "Date",
                PredefinedTy::String => "String",
                PredefinedTy::Object => "Object",
            }),
            TypeKind::Name(n) => write!(f, "{n}"),
            TypeKind::Array { element, ranks } => {
                write!(f, "{element}")?;
                for rank in ranks {
                    f.write_str("(")?;
                    for _ in 1..*rank {
                        f.write_str(",")?;
                    }
                    f.write_str(")")?;
                }
                Ok(())
            }
            TypeKind::Nullable(e) => write!(f, "{e}?"),
            TypeKind::Unknown { kind_name } => write!(f, "<{kind_name}>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AttributeTarget {
    Assembly,
    Module,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attribute {
    pub id: NodeId,
    pub target: Option<AttributeTarget>,
    pub name: NameRef,
    pub arguments: Option<ArgumentList>,
}

/// One source attribute list (`<A, B>`); flattened to one target list per
/// attribute during conversion.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributeList {
    pub attributes: Vec<Attribute>,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind) -> Self {
        Expr { id, kind }
    }

    pub fn is_nothing_literal(&self) -> bool {
        matches!(self.kind, ExprKind::Literal(Literal::Nothing))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Literal {
    Nothing,
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
    IntegerDivide,
    Modulo,
    Concatenate,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Is,
    IsNot,
    And,
    AndAlso,
    Or,
    OrElse,
    Xor,
    LeftShift,
    RightShift,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    /// Disappears during conversion; the bare delegate reference remains.
    AddressOf,
}

/// Predefined cast keywords (`CInt(x)`, `CStr(x)`, ...).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CastKeyword {
    CBool,
    CByte,
    CSByte,
    CChar,
    CShort,
    CUShort,
    CInt,
    CUInt,
    CLng,
    CULng,
    CSng,
    CDbl,
    CDec,
    CDate,
    CStr,
    CObj,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArgumentList {
    pub arguments: Vec<Argument>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Argument {
    Simple {
        /// `name:=` prefix when the argument is named.
        name: Option<Ident>,
        expr: Expr,
    },
    Omitted,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum LambdaBody {
    Expression(Box<Expr>),
    Statement(Box<Statement>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LambdaHeader {
    pub is_function: bool,
    pub parameters: Vec<Parameter>,
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
pub enum ExprKind {
    Literal(Literal),
    Name(NameRef),
    /// `base.name`; `base` is `None` for the receiver-less `.name` form that
    /// with-blocks and conditional-access continuations use.
    MemberAccess {
        base: Option<Box<Expr>>,
        name: NameRef,
    },
    ConditionalAccess {
        base: Box<Expr>,
        when_not_null: Box<Expr>,
    },
    Invocation {
        callee: Box<Expr>,
        arguments: ArgumentList,
    },
    ObjectCreation {
        ty: TypeRef,
        /// VB permits omitting empty argument lists.
        arguments: Option<ArgumentList>,
        initializer: Option<Box<Expr>>,
    },
    AnonymousObjectCreation {
        initializers: Vec<Expr>,
    },
    ArrayCreation {
        element: TypeRef,
        /// Inclusive upper-bound expressions, one per dimension.
        bounds: Option<ArgumentList>,
        ranks: SmallVec<[usize; 1]>,
        initializer: Option<Box<Expr>>,
    },
    CollectionInitializer {
        initializers: Vec<Expr>,
    },
    ObjectMemberInitializer {
        initializers: Vec<Expr>,
    },
    NamedFieldInitializer {
        name: Ident,
        value: Box<Expr>,
    },
    /// `CType(expr, T)`.
    Cast {
        expr: Box<Expr>,
        ty: TypeRef,
    },
    /// `CInt(expr)` and friends; type queries go against the cast node.
    PredefinedCast {
        keyword: CastKeyword,
        expr: Box<Expr>,
    },
    TryCast {
        expr: Box<Expr>,
        ty: TypeRef,
    },
    GetType(TypeRef),
    TypeOfIs {
        expr: Box<Expr>,
        ty: TypeRef,
        negated: bool,
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
    /// `If(a, b)` — null coalescing.
    BinaryConditional {
        first: Box<Expr>,
        second: Box<Expr>,
    },
    /// `If(cond, a, b)`.
    TernaryConditional {
        condition: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
    },
    Await(Box<Expr>),
    SingleLineLambda {
        header: LambdaHeader,
        body: LambdaBody,
    },
    MultiLineLambda {
        header: LambdaHeader,
        statements: Vec<Statement>,
    },
    InterpolatedString(Vec<InterpolatedContent>),
    Me,
    MyBase,
    MyClass,
    NameOf(Box<Expr>),
    Parenthesized(Box<Expr>),
    /// An expression kind with no declared mapping.
    Unknown {
        kind_name: String,
    },
}

// ---------------------------------------------------------------------------
// Statements (only the surface the declaration converter inspects; full
// statement conversion lives behind the body-converter seam)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Statement {
    pub id: NodeId,
    pub kind: StatementKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum StatementKind {
    Expression(Expr),
    Assign {
        target: Expr,
        value: Expr,
    },
    Return(Option<Expr>),
    /// Implicit-context block: establishes an ambient receiver for
    /// receiver-less member accesses lexically inside it.
    With {
        expr: Expr,
        statements: Vec<Statement>,
    },
    Unknown {
        kind_name: String,
    },
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TypeBlockKind {
    Class,
    Module,
    Structure,
    Interface,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AsClause {
    /// Attributes on the clause re-target to `return:` in the output.
    pub attributes: Vec<AttributeList>,
    pub ty: TypeRef,
}

/// The type half of a declarator: `As T`, or the `As New T(...)` shorthand
/// that supplies the initializer and the type from the same sub-expression.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum TypedAs {
    Simple(AsClause),
    New { object_creation: Expr },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeclaratorName {
    pub ident: Ident,
    pub nullable: bool,
    pub array_ranks: SmallVec<[usize; 1]>,
}

/// `a, b, c As Integer = 0` — several names sharing one type and initializer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariableDeclarator {
    pub names: Vec<DeclaratorName>,
    pub as_clause: Option<TypedAs>,
    pub initializer: Option<Expr>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Variance {
    In,
    Out,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Constraint {
    Type(TypeRef),
    New,
    Class,
    Structure,
}

/// Type parameter with its inline constraints; the target dialect splits the
/// constraints off into separate clauses.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeParameter {
    pub ident: Ident,
    pub variance: Option<Variance>,
    pub constraints: Vec<Constraint>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeParameterList {
    pub parameters: Vec<TypeParameter>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Parameter {
    pub id: NodeId,
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub ident: Ident,
    pub nullable: bool,
    pub array_ranks: SmallVec<[usize; 1]>,
    pub as_clause: Option<TypeRef>,
    pub default: Option<Expr>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AccessorKind {
    Get,
    Set,
    AddHandler,
    RemoveHandler,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AccessorBlock {
    pub id: NodeId,
    pub kind: AccessorKind,
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub statements: Vec<Statement>,
}

/// Operator tokens that can head an `Operator` block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum OperatorToken {
    Plus,
    Minus,
    Multiply,
    Divide,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Not,
    And,
    Or,
    Xor,
    Concatenate,
    LeftShift,
    RightShift,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Decl {
    pub id: NodeId,
    pub kind: DeclKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DeclKind {
    Namespace {
        name: NameRef,
        members: Vec<Decl>,
    },
    TypeBlock {
        kind: TypeBlockKind,
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        ident: Ident,
        type_params: Option<TypeParameterList>,
        inherits: Vec<TypeRef>,
        implements: Vec<TypeRef>,
        members: Vec<Decl>,
    },
    EnumBlock {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        ident: Ident,
        underlying: Option<AsClause>,
        members: Vec<Decl>,
    },
    EnumMember {
        attributes: Vec<AttributeList>,
        ident: Ident,
        initializer: Option<Expr>,
    },
    Delegate {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        is_function: bool,
        ident: Ident,
        type_params: Option<TypeParameterList>,
        parameters: Vec<Parameter>,
        as_clause: Option<AsClause>,
    },
    Field {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        declarators: Vec<VariableDeclarator>,
    },
    Property {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        ident: Ident,
        parameters: Vec<Parameter>,
        as_clause: Option<TypedAs>,
        initializer: Option<Expr>,
        /// `None` for the bodiless (auto/abstract) form.
        accessors: Option<Vec<AccessorBlock>>,
    },
    Method {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        is_function: bool,
        ident: Ident,
        type_params: Option<TypeParameterList>,
        parameters: Vec<Parameter>,
        as_clause: Option<AsClause>,
        /// `None` for bodiless statements (interface members, externs).
        body: Option<Vec<Statement>>,
    },
    Constructor {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        parameters: Vec<Parameter>,
        body: Vec<Statement>,
    },
    Operator {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        op: OperatorToken,
        parameters: Vec<Parameter>,
        as_clause: Option<AsClause>,
        body: Vec<Statement>,
    },
    Event {
        attributes: Vec<AttributeList>,
        modifiers: Vec<Modifier>,
        ident: Ident,
        parameters: Vec<Parameter>,
        as_clause: Option<AsClause>,
        /// Explicit AddHandler/RemoveHandler accessors, when present.
        accessors: Option<Vec<AccessorBlock>>,
    },
    /// A declaration kind with no declared mapping.
    Unknown {
        kind_name: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImportsClause {
    pub alias: Option<Ident>,
    pub name: NameRef,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompilationUnit {
    pub imports: Vec<ImportsClause>,
    pub attributes: Vec<AttributeList>,
    pub members: Vec<Decl>,
}
