//! Collaborator seams the engine delegates to.
//!
//! Full statement conversion, identifier escaping, and token mapping are
//! separate concerns with their own replaceable implementations. The
//! defaults here cover exactly what declaration and expression conversion
//! need on their own: expression statements, returns, with blocks,
//! reserved-word escaping, and the token tables.

use std::rc::Rc;

use vbcs_common::{ConvertError, ConvertResult};
use vbcs_syntax::{cs, vb};

use crate::engine::Converter;

/// Where a modifier list sits in the output; decides which tokens survive
/// and which implicit ones get synthesized.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenContext {
    Global,
    InterfaceOrModule,
    Local,
    Member,
    MemberInModule,
    MemberInClass,
    MemberInStruct,
    MemberInInterface,
    VariableOrConst,
}

/// Source identifier to target identifier.
pub trait IdentifierConverter {
    fn convert(&self, ident: &vb::Ident) -> String;
}

/// Modifier, operator, and attribute-target token mapping.
pub trait TokenConverter {
    fn convert_modifiers(
        &self,
        modifiers: &[vb::Modifier],
        context: TokenContext,
    ) -> Vec<cs::Modifier>;

    fn convert_binary_op(&self, op: vb::BinaryOp) -> cs::BinaryOp;

    fn convert_unary_op(&self, op: vb::UnaryOp) -> ConvertResult<cs::UnaryOp>;

    fn convert_operator_token(&self, op: vb::OperatorToken) -> &'static str;

    fn convert_attribute_target(&self, target: vb::AttributeTarget) -> cs::AttrTarget;
}

/// Statement-sequence conversion.
///
/// The engine hands bodies here and expects the implementation to push and
/// pop with-block receivers on the engine around each implicit-context
/// block, so receiver-less member accesses inside resolve correctly.
pub trait BodyConverter {
    fn convert_block(
        &self,
        engine: &mut Converter<'_>,
        statements: &[vb::Statement],
        is_iterator: bool,
    ) -> ConvertResult<Vec<cs::Stmt>>;
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Escapes target reserved words with `@`.
pub struct DefaultIdentifiers;

const RESERVED: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed",
    "short", "sizeof", "stackalloc", "static", "string", "struct", "switch", "this",
    "throw", "true", "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort",
    "using", "virtual", "void", "volatile", "while",
];

impl IdentifierConverter for DefaultIdentifiers {
    fn convert(&self, ident: &vb::Ident) -> String {
        if RESERVED.contains(&ident.text.as_str()) {
            format!("@{}", ident.text)
        } else {
            ident.text.clone()
        }
    }
}

/// Table-driven token mapping with per-context filtering.
pub struct DefaultTokens;

fn map_modifier(modifier: vb::Modifier) -> Option<cs::Modifier> {
    use vb::Modifier as M;
    Some(match modifier {
        M::Public => cs::Modifier::Public,
        M::Private => cs::Modifier::Private,
        M::Friend => cs::Modifier::Internal,
        M::Protected => cs::Modifier::Protected,
        M::Shared => cs::Modifier::Static,
        M::Shadows => cs::Modifier::New,
        M::Overrides => cs::Modifier::Override,
        M::Overridable => cs::Modifier::Virtual,
        M::NotOverridable | M::NotInheritable => cs::Modifier::Sealed,
        M::MustOverride | M::MustInherit => cs::Modifier::Abstract,
        M::ReadOnly => cs::Modifier::Readonly,
        M::Const => cs::Modifier::Const,
        M::Partial => cs::Modifier::Partial,
        M::Async => cs::Modifier::Async,
        M::ByRef => cs::Modifier::Ref,
        M::ParamArray => cs::Modifier::Params,
        M::Widening => cs::Modifier::Implicit,
        M::Narrowing => cs::Modifier::Explicit,
        // No counterpart token; the construct shape carries the meaning.
        M::Overloads
        | M::WriteOnly
        | M::Dim
        | M::Default
        | M::WithEvents
        | M::Iterator
        | M::ByVal
        | M::Optional => return None,
    })
}

fn visible_in_context(modifier: cs::Modifier, context: TokenContext) -> bool {
    use cs::Modifier as M;
    match context {
        TokenContext::Local => !matches!(
            modifier,
            M::Public | M::Private | M::Protected | M::Internal | M::Static
        ),
        TokenContext::MemberInInterface => !matches!(
            modifier,
            M::Public
                | M::Private
                | M::Protected
                | M::Internal
                | M::Abstract
                | M::Virtual
                | M::Sealed
                | M::Override
        ),
        _ => true,
    }
}

impl TokenConverter for DefaultTokens {
    fn convert_modifiers(
        &self,
        modifiers: &[vb::Modifier],
        context: TokenContext,
    ) -> Vec<cs::Modifier> {
        let mut out = Vec::new();
        for modifier in modifiers {
            let Some(mapped) = map_modifier(*modifier) else {
                continue;
            };
            if visible_in_context(mapped, context) && !out.contains(&mapped) {
                out.push(mapped);
            }
        }
        if context == TokenContext::MemberInModule && !out.contains(&cs::Modifier::Static) {
            out.push(cs::Modifier::Static);
        }
        out
    }

    fn convert_binary_op(&self, op: vb::BinaryOp) -> cs::BinaryOp {
        use vb::BinaryOp as V;
        match op {
            V::Add | V::Concatenate => cs::BinaryOp::Add,
            V::Subtract => cs::BinaryOp::Subtract,
            V::Multiply => cs::BinaryOp::Multiply,
            V::Divide | V::IntegerDivide => cs::BinaryOp::Divide,
            V::Modulo => cs::BinaryOp::Modulo,
            V::Equals | V::Is => cs::BinaryOp::Equals,
            V::NotEquals | V::IsNot => cs::BinaryOp::NotEquals,
            V::LessThan => cs::BinaryOp::LessThan,
            V::LessThanOrEqual => cs::BinaryOp::LessThanOrEqual,
            V::GreaterThan => cs::BinaryOp::GreaterThan,
            V::GreaterThanOrEqual => cs::BinaryOp::GreaterThanOrEqual,
            V::And => cs::BinaryOp::BitAnd,
            V::AndAlso => cs::BinaryOp::LogicalAnd,
            V::Or => cs::BinaryOp::BitOr,
            V::OrElse => cs::BinaryOp::LogicalOr,
            V::Xor => cs::BinaryOp::Xor,
            V::LeftShift => cs::BinaryOp::LeftShift,
            V::RightShift => cs::BinaryOp::RightShift,
        }
    }

    fn convert_unary_op(&self, op: vb::UnaryOp) -> ConvertResult<cs::UnaryOp> {
        match op {
            vb::UnaryOp::Plus => Ok(cs::UnaryOp::Plus),
            vb::UnaryOp::Minus => Ok(cs::UnaryOp::Minus),
            vb::UnaryOp::Not => Ok(cs::UnaryOp::LogicalNot),
            // The engine strips this before token mapping.
            vb::UnaryOp::AddressOf => Err(ConvertError::unsupported("AddressOfExpression")),
        }
    }

    fn convert_operator_token(&self, op: vb::OperatorToken) -> &'static str {
        use vb::OperatorToken as O;
        match op {
            O::Plus => "+",
            O::Minus => "-",
            O::Multiply => "*",
            O::Divide => "/",
            O::Equals => "==",
            O::NotEquals => "!=",
            O::LessThan => "<",
            O::LessThanOrEqual => "<=",
            O::GreaterThan => ">",
            O::GreaterThanOrEqual => ">=",
            O::Not => "!",
            O::And => "&",
            O::Or => "|",
            O::Xor => "^",
            O::Concatenate => "+",
            O::LeftShift => "<<",
            O::RightShift => ">>",
        }
    }

    fn convert_attribute_target(&self, target: vb::AttributeTarget) -> cs::AttrTarget {
        match target {
            vb::AttributeTarget::Assembly => cs::AttrTarget::Assembly,
            vb::AttributeTarget::Module => cs::AttrTarget::Module,
        }
    }
}

/// Minimal body conversion: expression statements, assignments, returns, and
/// with blocks. Anything else needs a full statement converter and surfaces
/// as [`ConvertError::UnsupportedStatement`].
pub struct DefaultBodies;

impl BodyConverter for DefaultBodies {
    fn convert_block(
        &self,
        engine: &mut Converter<'_>,
        statements: &[vb::Statement],
        is_iterator: bool,
    ) -> ConvertResult<Vec<cs::Stmt>> {
        let mut out = Vec::new();
        for statement in statements {
            match &statement.kind {
                vb::StatementKind::Expression(expr) => {
                    out.push(cs::Stmt::Expression(engine.convert_expr(expr)?));
                }
                vb::StatementKind::Assign { target, value } => {
                    out.push(cs::Stmt::Expression(cs::Expr::Assignment {
                        target: Box::new(engine.convert_expr(target)?),
                        value: Box::new(engine.convert_expr(value)?),
                    }));
                }
                vb::StatementKind::Return(expr) => {
                    let expr = match expr {
                        Some(e) => Some(engine.convert_expr(e)?),
                        None => None,
                    };
                    out.push(cs::Stmt::Return(expr));
                }
                vb::StatementKind::With {
                    expr,
                    statements: inner,
                } => {
                    let depth = engine.with_depth();
                    let receiver = if depth == 0 {
                        "withBlock".to_string()
                    } else {
                        format!("withBlock{depth}")
                    };
                    let initializer = engine.convert_expr(expr)?;
                    out.push(cs::Stmt::LocalVar {
                        name: receiver.clone(),
                        initializer,
                    });
                    engine.push_with_receiver(receiver);
                    let converted = self.convert_block(engine, inner, is_iterator);
                    engine.pop_with_receiver();
                    out.extend(converted?);
                }
                vb::StatementKind::Unknown { kind_name } => {
                    return Err(ConvertError::statement_level(kind_name.clone()));
                }
            }
        }
        Ok(out)
    }
}

/// Shared handle type the engine stores bodies behind; cloning lets body
/// conversion re-enter the engine mutably.
pub(crate) type BodyHandle = Rc<dyn BodyConverter>;
