//! Expression conversion.
//!
//! Exhaustive over the source expression kinds; the semantic context
//! settles everything syntax alone cannot: null spelling, call versus
//! element access, implicit zero-argument calls, by-ref argument modes, and
//! constant folding of array bounds.

use vbcs_common::{ConvertError, ConvertResult, NodeId};
use vbcs_semantic::{ConstValue, RefMode, Symbol, SymbolKind, Ty};
use vbcs_syntax::{cs, vb};

use crate::convert_table;
use crate::engine::Converter;
use crate::types::type_from_semantic;

impl Converter<'_> {
    pub fn convert_expr(&mut self, expr: &vb::Expr) -> ConvertResult<cs::Expr> {
        match &expr.kind {
            vb::ExprKind::Literal(literal) => self.convert_literal(expr.id, literal),
            vb::ExprKind::Name(name) => Ok(cs::Expr::Name(self.convert_name(name, true)?)),
            vb::ExprKind::MemberAccess { base, name } => {
                self.convert_member_access(expr.id, base.as_deref(), name, true)
            }
            vb::ExprKind::ConditionalAccess {
                base,
                when_not_null,
            } => {
                let base = self.convert_expr(base)?;
                self.conditional_access_depth += 1;
                let continuation = self.convert_expr(when_not_null);
                self.conditional_access_depth -= 1;
                Ok(cs::Expr::ConditionalAccess {
                    base: Box::new(base),
                    when_not_null: Box::new(continuation?),
                })
            }
            vb::ExprKind::Invocation { callee, arguments } => {
                self.convert_invocation(expr.id, callee, arguments)
            }
            vb::ExprKind::ObjectCreation {
                ty,
                arguments,
                initializer,
            } => {
                let symbol = self.sem.symbol_info(expr.id).extract_match();
                let converted_args = match arguments {
                    Some(list) => self.convert_argument_list(list, symbol.as_deref())?,
                    // The source permits omitting empty argument lists.
                    None => Vec::new(),
                };
                let initializer = match initializer {
                    Some(init) => Some(self.convert_initializer(init)?),
                    None => None,
                };
                Ok(cs::Expr::ObjectCreation {
                    ty: self.convert_type(ty)?,
                    arguments: converted_args,
                    initializer,
                })
            }
            vb::ExprKind::AnonymousObjectCreation { initializers } => {
                let declarators = initializers
                    .iter()
                    .map(|init| match &init.kind {
                        vb::ExprKind::NamedFieldInitializer { name, value } => {
                            Ok(cs::AnonymousMember {
                                name: Some(self.identifiers.convert(name)),
                                value: self.convert_expr(value)?,
                            })
                        }
                        _ => Ok(cs::AnonymousMember {
                            name: None,
                            value: self.convert_expr(init)?,
                        }),
                    })
                    .collect::<ConvertResult<_>>()?;
                Ok(cs::Expr::AnonymousObjectCreation { declarators })
            }
            vb::ExprKind::ArrayCreation {
                element,
                bounds,
                ranks,
                initializer,
            } => self.convert_array_creation(element, bounds.as_ref(), ranks, initializer.as_deref()),
            vb::ExprKind::CollectionInitializer { initializers } => {
                self.convert_bare_collection(expr.id, initializers)
            }
            vb::ExprKind::ObjectMemberInitializer { .. } => {
                Ok(cs::Expr::InitializerExpr(self.convert_initializer(expr)?))
            }
            vb::ExprKind::NamedFieldInitializer { name, value } => Ok(cs::Expr::Assignment {
                target: Box::new(cs::Expr::ident(self.identifiers.convert(name))),
                value: Box::new(self.convert_expr(value)?),
            }),
            vb::ExprKind::Cast { expr: operand, ty } => {
                let operand = self.convert_expr(operand)?;
                match self.conversion_function_for(ty.id) {
                    Some(helper) => Ok(helper_invocation(helper, operand)),
                    None => Ok(cs::Expr::Cast {
                        ty: self.convert_type(ty)?,
                        expr: Box::new(operand),
                    }),
                }
            }
            vb::ExprKind::PredefinedCast { keyword, expr: operand } => {
                let operand = self.convert_expr(operand)?;
                if *keyword == vb::CastKeyword::CDate {
                    // Date has no table entry; native cast.
                    return Ok(cs::Expr::Cast {
                        ty: cs::Type::named("DateTime"),
                        expr: Box::new(operand),
                    });
                }
                match self.conversion_function_for(expr.id) {
                    Some(helper) => Ok(helper_invocation(helper, operand)),
                    None => Ok(cs::Expr::Cast {
                        ty: predefined_cast_type(*keyword),
                        expr: Box::new(operand),
                    }),
                }
            }
            vb::ExprKind::TryCast { expr: operand, ty } => Ok(cs::Expr::TypeBinary {
                op: cs::BinaryOp::As,
                expr: Box::new(self.convert_expr(operand)?),
                ty: self.convert_type(ty)?,
            }),
            vb::ExprKind::GetType(ty) => Ok(cs::Expr::TypeOf(self.convert_type(ty)?)),
            vb::ExprKind::TypeOfIs { expr: operand, ty, negated } => {
                let test = cs::Expr::TypeBinary {
                    op: cs::BinaryOp::Is,
                    expr: Box::new(self.convert_expr(operand)?),
                    ty: self.convert_type(ty)?,
                };
                Ok(if *negated {
                    cs::Expr::Unary {
                        op: cs::UnaryOp::LogicalNot,
                        operand: Box::new(cs::Expr::Parenthesized(Box::new(test))),
                    }
                } else {
                    test
                })
            }
            vb::ExprKind::Binary { op, left, right } => self.convert_binary(*op, left, right),
            vb::ExprKind::Unary { op, operand } => {
                if *op == vb::UnaryOp::AddressOf {
                    // Delegate references need no operator on the target side.
                    return self.convert_expr(operand);
                }
                Ok(cs::Expr::Unary {
                    op: self.tokens.convert_unary_op(*op)?,
                    operand: Box::new(self.convert_expr(operand)?),
                })
            }
            vb::ExprKind::BinaryConditional { first, second } => Ok(cs::Expr::Binary {
                op: cs::BinaryOp::Coalesce,
                left: Box::new(self.convert_expr(first)?),
                right: Box::new(self.convert_expr(second)?),
            }),
            vb::ExprKind::TernaryConditional {
                condition,
                when_true,
                when_false,
            } => Ok(cs::Expr::Conditional {
                condition: Box::new(self.convert_expr(condition)?),
                when_true: Box::new(self.convert_expr(when_true)?),
                when_false: Box::new(self.convert_expr(when_false)?),
            }),
            vb::ExprKind::Await(operand) => {
                Ok(cs::Expr::Await(Box::new(self.convert_expr(operand)?)))
            }
            vb::ExprKind::SingleLineLambda { header, body } => {
                let params = self.convert_lambda_params(&header.parameters)?;
                let body = match body {
                    vb::LambdaBody::Expression(e) => {
                        cs::LambdaBody::Expression(Box::new(self.convert_expr(e)?))
                    }
                    vb::LambdaBody::Statement(statement) => {
                        let bodies = self.body_handle();
                        let mut converted = bodies.convert_block(
                            self,
                            std::slice::from_ref(statement.as_ref()),
                            false,
                        )?;
                        if converted.len() == 1 {
                            cs::LambdaBody::Statement(Box::new(converted.remove(0)))
                        } else {
                            cs::LambdaBody::Block(converted)
                        }
                    }
                };
                Ok(cs::Expr::Lambda { params, body })
            }
            vb::ExprKind::MultiLineLambda { header, statements } => {
                let params = self.convert_lambda_params(&header.parameters)?;
                let bodies = self.body_handle();
                let block = bodies.convert_block(self, statements, false)?;
                Ok(cs::Expr::Lambda {
                    params,
                    body: cs::LambdaBody::Block(block),
                })
            }
            vb::ExprKind::InterpolatedString(contents) => {
                let contents = contents
                    .iter()
                    .map(|content| self.convert_interpolated_content(content))
                    .collect::<ConvertResult<_>>()?;
                Ok(cs::Expr::Interpolated(contents))
            }
            vb::ExprKind::Me | vb::ExprKind::MyClass => Ok(cs::Expr::This),
            vb::ExprKind::MyBase => Ok(cs::Expr::Base),
            vb::ExprKind::NameOf(operand) => Ok(cs::Expr::invocation(
                cs::Expr::ident("nameof"),
                vec![cs::Argument::positional(self.convert_expr(operand)?)],
            )),
            vb::ExprKind::Parenthesized(inner) => Ok(cs::Expr::Parenthesized(Box::new(
                self.convert_expr(inner)?,
            ))),
            vb::ExprKind::Unknown { kind_name } => {
                Err(ConvertError::unsupported(kind_name.clone()))
            }
        }
    }

    fn convert_literal(&mut self, node: NodeId, literal: &vb::Literal) -> ConvertResult<cs::Expr> {
        Ok(match literal {
            vb::Literal::Nothing => match self.sem.type_info(node).converted_ty {
                None => cs::Expr::null()
                    .with_comment("TODO Change to default(_) if this is not a reference type"),
                Some(ty) if !ty.is_reference_type() => cs::Expr::Default(type_from_semantic(&ty)),
                Some(_) => cs::Expr::null(),
            },
            vb::Literal::Bool(b) => cs::Expr::Literal(cs::Literal::Bool(*b)),
            vb::Literal::Int(i) => cs::Expr::Literal(cs::Literal::Int(*i)),
            vb::Literal::Float(f) => cs::Expr::Literal(cs::Literal::Float(*f)),
            vb::Literal::Str(s) => cs::Expr::Literal(cs::Literal::Str(s.clone())),
            vb::Literal::Char(c) => cs::Expr::Literal(cs::Literal::Char(*c)),
        })
    }

    /// Member access. A missing receiver resolves against the innermost
    /// with-block receiver; outside any with block (or inside a conditional
    /// access) it stays a `.name` member binding. `allow_implicit_invocation`
    /// is off when the access is already the callee of a call.
    pub(crate) fn convert_member_access(
        &mut self,
        node: NodeId,
        base: Option<&vb::Expr>,
        name: &vb::NameRef,
        allow_implicit_invocation: bool,
    ) -> ConvertResult<cs::Expr> {
        let member = self.render_name(name)?;
        let left = match base {
            None => {
                if self.conditional_access_depth > 0 {
                    return Ok(cs::Expr::MemberBinding { name: member });
                }
                match self.with_receivers.last() {
                    Some(receiver) => cs::Expr::ident(receiver.clone()),
                    None => return Ok(cs::Expr::MemberBinding { name: member }),
                }
            }
            Some(receiver)
                if matches!(
                    &receiver.kind,
                    vb::ExprKind::Name(n) if matches!(n.kind, vb::NameKind::Global)
                ) =>
            {
                return Ok(cs::Expr::Name(cs::Name::AliasQualified {
                    alias: "global".into(),
                    name: Box::new(member),
                }));
            }
            Some(receiver) => self.convert_expr(receiver)?,
        };
        let access = cs::Expr::MemberAccess {
            base: Box::new(left),
            name: member,
        };
        if allow_implicit_invocation {
            if let Some(symbol) = self.sem.symbol_info(node).extract_match() {
                if let SymbolKind::Method {
                    parameters,
                    return_ty,
                } = &symbol.kind
                {
                    // The source omits empty argument lists; a bare access
                    // that already has the method's return type is a call.
                    if parameters.is_empty()
                        && self.sem.type_info(node).converted_ty.as_ref() == Some(return_ty)
                    {
                        return Ok(cs::Expr::invocation(access, Vec::new()));
                    }
                }
            }
        }
        Ok(access)
    }

    fn convert_invocation(
        &mut self,
        node: NodeId,
        callee: &vb::Expr,
        arguments: &vb::ArgumentList,
    ) -> ConvertResult<cs::Expr> {
        let invocation_symbol = self.sem.symbol_info(node).extract_match();
        let callee_symbol = self.sem.symbol_info(callee.id).extract_match();
        let is_element_access = invocation_symbol.as_deref().is_some_and(Symbol::is_indexer)
            || callee_symbol
                .as_deref()
                .is_some_and(|s| !s.is_method() && s.return_ty().is_some_and(Ty::is_array));
        let target = match &callee.kind {
            vb::ExprKind::MemberAccess { base, name } => {
                self.convert_member_access(callee.id, base.as_deref(), name, false)?
            }
            _ => self.convert_expr(callee)?,
        };
        let converted_args = self.convert_argument_list(arguments, invocation_symbol.as_deref())?;
        Ok(if is_element_access {
            cs::Expr::ElementAccess {
                base: Box::new(target),
                arguments: converted_args,
            }
        } else {
            cs::Expr::Invocation {
                callee: Box::new(target),
                arguments: converted_args,
            }
        })
    }

    pub(crate) fn convert_argument_list(
        &mut self,
        list: &vb::ArgumentList,
        symbol: Option<&Symbol>,
    ) -> ConvertResult<Vec<cs::Argument>> {
        list.arguments
            .iter()
            .enumerate()
            .map(|(position, argument)| match argument {
                vb::Argument::Simple { name, expr } => {
                    let mode = symbol.and_then(|s| match s.parameters().get(position) {
                        Some(param) => match param.mode {
                            RefMode::ByValue => None,
                            RefMode::Ref => Some(cs::ArgMode::Ref),
                            RefMode::Out => Some(cs::ArgMode::Out),
                        },
                        // Past the declared list: the variadic tail.
                        None => None,
                    });
                    Ok(cs::Argument {
                        name: name.as_ref().map(|n| self.identifiers.convert(n)),
                        mode,
                        expr: self.convert_expr(expr)?,
                    })
                }
                vb::Argument::Omitted => Err(ConvertError::unsupported("OmittedArgument")),
            })
            .collect()
    }

    fn convert_array_creation(
        &mut self,
        element: &vb::TypeRef,
        bounds: Option<&vb::ArgumentList>,
        ranks: &smallvec::SmallVec<[usize; 1]>,
        initializer: Option<&vb::Expr>,
    ) -> ConvertResult<cs::Expr> {
        let lengths = match bounds {
            Some(list) => list
                .arguments
                .iter()
                .map(|argument| match argument {
                    vb::Argument::Simple { expr, .. } => self.increase_upper_bound(expr),
                    vb::Argument::Omitted => Err(ConvertError::unsupported("OmittedArgument")),
                })
                .collect::<ConvertResult<_>>()?,
            None => Vec::new(),
        };
        let initializer = match initializer {
            Some(init) => {
                let converted = self.convert_initializer(init)?;
                // An empty brace pair under a sized creation adds nothing.
                if converted.expressions.is_empty() && !lengths.is_empty() {
                    None
                } else {
                    Some(converted)
                }
            }
            None => None,
        };
        Ok(cs::Expr::ArrayCreation {
            element: self.convert_type(element)?,
            lengths,
            ranks: ranks.clone(),
            initializer,
        })
    }

    /// Inclusive upper bound to length: fold `k` to the literal `k + 1` when
    /// the binder can, otherwise emit the runtime `bound + 1`.
    fn increase_upper_bound(&mut self, bound: &vb::Expr) -> ConvertResult<cs::Expr> {
        if let Some(ConstValue::Int(k)) = self.sem.const_value(bound.id) {
            return Ok(cs::Expr::Literal(cs::Literal::Int(i64::from(k) + 1)));
        }
        Ok(cs::Expr::Binary {
            op: cs::BinaryOp::Add,
            left: Box::new(self.convert_expr(bound)?),
            right: Box::new(cs::Expr::Literal(cs::Literal::Int(1))),
        })
    }

    fn convert_bare_collection(
        &mut self,
        node: NodeId,
        initializers: &[vb::Expr],
    ) -> ConvertResult<cs::Expr> {
        let expressions = initializers
            .iter()
            .map(|e| self.convert_expr(e))
            .collect::<ConvertResult<_>>()?;
        let initializer = cs::Initializer {
            kind: cs::InitializerKind::Collection,
            expressions,
        };
        let info = self.sem.type_info(node);
        let implicit_array = info.ty.is_none()
            && matches!(
                info.converted_ty,
                Some(Ty::Enumerable) | Some(Ty::Array(_))
            );
        Ok(if implicit_array {
            cs::Expr::ImplicitArrayCreation(initializer)
        } else {
            cs::Expr::InitializerExpr(initializer)
        })
    }

    /// Brace-initializer conversion for creations: collection entries stay
    /// expressions, object-member entries become assignments.
    pub(crate) fn convert_initializer(&mut self, expr: &vb::Expr) -> ConvertResult<cs::Initializer> {
        match &expr.kind {
            vb::ExprKind::CollectionInitializer { initializers } => Ok(cs::Initializer {
                kind: cs::InitializerKind::Collection,
                expressions: initializers
                    .iter()
                    .map(|e| self.convert_expr(e))
                    .collect::<ConvertResult<_>>()?,
            }),
            vb::ExprKind::ObjectMemberInitializer { initializers } => Ok(cs::Initializer {
                kind: cs::InitializerKind::Object,
                expressions: initializers
                    .iter()
                    .map(|e| self.convert_expr(e))
                    .collect::<ConvertResult<_>>()?,
            }),
            _ => Err(ConvertError::unsupported("ObjectCreationInitializer")),
        }
    }

    fn convert_binary(
        &mut self,
        op: vb::BinaryOp,
        left: &vb::Expr,
        right: &vb::Expr,
    ) -> ConvertResult<cs::Expr> {
        if matches!(op, vb::BinaryOp::Is | vb::BinaryOp::IsNot) {
            let other = if right.is_nothing_literal() {
                Some(left)
            } else if left.is_nothing_literal() {
                Some(right)
            } else {
                None
            };
            if let Some(operand) = other {
                let op = if op == vb::BinaryOp::Is {
                    cs::BinaryOp::Equals
                } else {
                    cs::BinaryOp::NotEquals
                };
                return Ok(cs::Expr::Binary {
                    op,
                    left: Box::new(self.convert_expr(operand)?),
                    right: Box::new(cs::Expr::null()),
                });
            }
        }
        Ok(cs::Expr::Binary {
            op: self.tokens.convert_binary_op(op),
            left: Box::new(self.convert_expr(left)?),
            right: Box::new(self.convert_expr(right)?),
        })
    }

    fn convert_lambda_params(
        &mut self,
        parameters: &[vb::Parameter],
    ) -> ConvertResult<cs::LambdaParams> {
        let mut converted = parameters
            .iter()
            .map(|p| self.convert_parameter(p, false))
            .collect::<ConvertResult<Vec<_>>>()?;
        let bare = converted.len() == 1
            && converted[0].ty.is_none()
            && converted[0].attributes.is_empty()
            && converted[0].modifiers.is_empty();
        Ok(if bare {
            cs::LambdaParams::Simple(Box::new(converted.remove(0)))
        } else {
            cs::LambdaParams::Parenthesized(converted)
        })
    }

    fn convert_interpolated_content(
        &mut self,
        content: &vb::InterpolatedContent,
    ) -> ConvertResult<cs::InterpolatedContent> {
        Ok(match content {
            vb::InterpolatedContent::Text(text) => cs::InterpolatedContent::Text(text.clone()),
            vb::InterpolatedContent::Interpolation {
                expr,
                alignment,
                format,
            } => cs::InterpolatedContent::Interpolation {
                expr: self.convert_expr(expr)?,
                alignment: match alignment {
                    Some(a) => Some(self.convert_expr(a)?),
                    None => None,
                },
                format: format.clone(),
            },
        })
    }

    fn conversion_function_for(&self, node: NodeId) -> Option<&'static str> {
        self.sem
            .type_info(node)
            .converted_ty
            .as_ref()
            .and_then(convert_table::conversion_function)
    }
}

fn helper_invocation(helper: &str, operand: cs::Expr) -> cs::Expr {
    cs::Expr::invocation(
        cs::Expr::Name(cs::parse_name(helper)),
        vec![cs::Argument::positional(operand)],
    )
}

fn predefined_cast_type(keyword: vb::CastKeyword) -> cs::Type {
    use vb::CastKeyword as C;
    let kw = match keyword {
        C::CBool => cs::Keyword::Bool,
        C::CByte => cs::Keyword::Byte,
        C::CSByte => cs::Keyword::SByte,
        C::CChar => cs::Keyword::Char,
        C::CShort => cs::Keyword::Short,
        C::CUShort => cs::Keyword::UShort,
        C::CInt => cs::Keyword::Int,
        C::CUInt => cs::Keyword::UInt,
        C::CLng => cs::Keyword::Long,
        C::CULng => cs::Keyword::ULong,
        C::CSng => cs::Keyword::Float,
        C::CDbl => cs::Keyword::Double,
        C::CDec => cs::Keyword::Decimal,
        C::CStr => cs::Keyword::String,
        C::CObj => cs::Keyword::Object,
        C::CDate => return cs::Type::named("DateTime"),
    };
    cs::Type::Predefined(kw)
}
