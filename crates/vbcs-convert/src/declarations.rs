//! Declaration conversion.
//!
//! Compilation units, namespaces, type blocks, and their members. One
//! source declaration can map onto several target members (field declarator
//! splitting, synthesized event delegates); [`Converted`] carries the extras
//! and the member-list walk flattens them in place.

use tracing::{debug, trace};
use vbcs_common::{ConvertError, ConvertResult, NodeId};
use vbcs_semantic::TypeSymbolKind;
use vbcs_syntax::{cs, vb};

use crate::collaborators::TokenContext;
use crate::engine::{Converted, Converter, EnclosingType};
use crate::types::distribute_nullable;

impl Converter<'_> {
    /// Convert a whole compilation unit. Seeds the imported-namespace table
    /// from the compilation (root namespace, implicit imports) and the
    /// unit's own import statements before touching any member.
    pub fn convert_unit(&mut self, unit: &vb::CompilationUnit) -> ConvertResult<cs::CompilationUnit> {
        debug!(
            imports = unit.imports.len(),
            members = unit.members.len(),
            "converting compilation unit"
        );
        self.imported_namespaces.clear();
        if let Some(root) = self.sem.root_namespace() {
            self.imported_namespaces.insert(root.to_string(), String::new());
        }
        let mut usings = Vec::new();
        let sem = self.sem;
        for import in sem.global_imports() {
            self.imported_namespaces.insert(
                import.namespace.clone(),
                import.alias.clone().unwrap_or_default(),
            );
            usings.push(cs::UsingDirective {
                alias: import.alias.clone(),
                name: cs::parse_name(&import.namespace),
            });
        }
        for import in &unit.imports {
            let alias = import.alias.as_ref().map(|a| self.identifiers.convert(a));
            let name = self.render_name(&import.name)?;
            self.imported_namespaces
                .insert(name.to_string(), alias.clone().unwrap_or_default());
            usings.push(cs::UsingDirective { alias, name });
        }
        let attributes = self.convert_attribute_lists(&unit.attributes)?;
        let members = self.convert_members(&unit.members)?;
        Ok(cs::CompilationUnit {
            usings,
            attributes,
            members,
        })
    }

    pub(crate) fn convert_members(
        &mut self,
        members: &[vb::Decl],
    ) -> ConvertResult<Vec<cs::MemberDecl>> {
        let mut out = Vec::new();
        for member in members {
            let converted = self.convert_decl(member)?;
            out.push(converted.primary);
            out.extend(converted.auxiliary);
        }
        Ok(out)
    }

    pub fn convert_decl(&mut self, decl: &vb::Decl) -> ConvertResult<Converted> {
        trace!(kind = decl_kind_name(&decl.kind), "converting declaration");
        match &decl.kind {
            vb::DeclKind::Namespace { name, members } => {
                // Heads are never qualified; the block registers its own
                // name so members can refer to siblings without a prefix.
                let converted_name = self.render_name(name)?;
                self.imported_namespaces
                    .insert(converted_name.to_string(), String::new());
                let members = self.convert_members(members)?;
                Ok(Converted::single(cs::MemberDecl::Namespace {
                    name: converted_name,
                    members,
                }))
            }
            vb::DeclKind::TypeBlock {
                kind,
                attributes,
                modifiers,
                ident,
                type_params,
                inherits,
                implements,
                members,
            } => self.convert_type_block(
                decl.id, *kind, attributes, modifiers, ident, type_params.as_ref(), inherits,
                implements, members,
            ),
            vb::DeclKind::EnumBlock {
                attributes,
                modifiers,
                ident,
                underlying,
                members,
            } => {
                let mut attrs = self.convert_attribute_lists(attributes)?;
                let base = match underlying {
                    Some(clause) => {
                        if let Some(list) = self.return_attribute_list(&clause.attributes)? {
                            attrs.push(list);
                        }
                        Some(self.convert_type(&clause.ty)?)
                    }
                    None => None,
                };
                Ok(Converted::single(cs::MemberDecl::Enum {
                    attributes: attrs,
                    modifiers: self.tokens.convert_modifiers(modifiers, TokenContext::Global),
                    name: self.identifiers.convert(ident),
                    base,
                    members: self.convert_enum_members(members)?,
                }))
            }
            vb::DeclKind::EnumMember { .. } => {
                Err(ConvertError::unsupported("EnumMemberDeclaration"))
            }
            vb::DeclKind::Delegate {
                attributes,
                modifiers,
                is_function: _,
                ident,
                type_params,
                parameters,
                as_clause,
            } => {
                let mut attrs = self.convert_attribute_lists(attributes)?;
                let return_type = match as_clause {
                    Some(clause) => {
                        if let Some(list) = self.return_attribute_list(&clause.attributes)? {
                            attrs.push(list);
                        }
                        self.convert_type(&clause.ty)?
                    }
                    None => cs::Type::Predefined(cs::Keyword::Void),
                };
                let (params, constraints) = self.split_type_parameters(type_params.as_ref())?;
                Ok(Converted::single(cs::MemberDecl::Delegate {
                    attributes: attrs,
                    modifiers: self.tokens.convert_modifiers(modifiers, TokenContext::Global),
                    return_type,
                    name: self.identifiers.convert(ident),
                    type_params: params,
                    parameters: self.convert_parameters(parameters, false)?,
                    constraints,
                }))
            }
            vb::DeclKind::Field {
                attributes,
                modifiers,
                declarators,
            } => self.convert_field(attributes, modifiers, declarators),
            vb::DeclKind::Property {
                attributes,
                modifiers,
                ident,
                parameters,
                as_clause,
                initializer,
                accessors,
            } => self.convert_property(
                decl.id, attributes, modifiers, ident, parameters, as_clause.as_ref(),
                initializer.as_ref(), accessors.as_deref(),
            ),
            vb::DeclKind::Method {
                attributes,
                modifiers,
                is_function: _,
                ident,
                type_params,
                parameters,
                as_clause,
                body,
            } => self.convert_method(
                decl.id, attributes, modifiers, ident, type_params.as_ref(), parameters,
                as_clause.as_ref(), body.as_deref(),
            ),
            vb::DeclKind::Constructor {
                attributes,
                modifiers,
                parameters,
                body,
            } => {
                let name = self
                    .enclosing_types
                    .last()
                    .map(|t| t.name.clone())
                    .unwrap_or_default();
                let (initializer, rest) = self.extract_ctor_initializer(body)?;
                let bodies = self.body_handle();
                let converted_body = bodies.convert_block(self, rest, false)?;
                Ok(Converted::single(cs::MemberDecl::Constructor {
                    attributes: self.convert_attribute_lists(attributes)?,
                    modifiers: self.tokens.convert_modifiers(modifiers, TokenContext::Member),
                    name,
                    parameters: self.convert_parameters(parameters, false)?,
                    initializer,
                    body: converted_body,
                }))
            }
            vb::DeclKind::Operator {
                attributes,
                modifiers,
                op,
                parameters,
                as_clause,
                body,
            } => {
                let mut attrs = self.convert_attribute_lists(attributes)?;
                let return_type = match as_clause {
                    Some(clause) => {
                        if let Some(list) = self.return_attribute_list(&clause.attributes)? {
                            attrs.push(list);
                        }
                        self.convert_type(&clause.ty)?
                    }
                    None => cs::Type::Predefined(cs::Keyword::Void),
                };
                let bodies = self.body_handle();
                let converted_body = bodies.convert_block(self, body, false)?;
                Ok(Converted::single(cs::MemberDecl::Operator {
                    attributes: attrs,
                    modifiers: self
                        .tokens
                        .convert_modifiers(modifiers, TokenContext::Member),
                    return_type,
                    token: self.tokens.convert_operator_token(*op).to_string(),
                    parameters: self.convert_parameters(parameters, false)?,
                    body: converted_body,
                }))
            }
            vb::DeclKind::Event {
                attributes,
                modifiers,
                ident,
                parameters,
                as_clause,
                accessors,
            } => self.convert_event(
                attributes, modifiers, ident, parameters, as_clause.as_ref(),
                accessors.as_deref(),
            ),
            vb::DeclKind::Unknown { kind_name } => {
                Err(ConvertError::unsupported(kind_name.clone()))
            }
        }
    }

    fn convert_type_block(
        &mut self,
        node: NodeId,
        kind: vb::TypeBlockKind,
        attributes: &[vb::AttributeList],
        modifiers: &[vb::Modifier],
        ident: &vb::Ident,
        type_params: Option<&vb::TypeParameterList>,
        inherits: &[vb::TypeRef],
        implements: &[vb::TypeRef],
        members: &[vb::Decl],
    ) -> ConvertResult<Converted> {
        let attrs = self.convert_attribute_lists(attributes)?;
        let name = self.identifiers.convert(ident);
        let (params, constraints) = self.split_type_parameters(type_params)?;
        let context = match kind {
            vb::TypeBlockKind::Module | vb::TypeBlockKind::Interface => {
                TokenContext::InterfaceOrModule
            }
            _ => TokenContext::Global,
        };
        let mut mods = self.tokens.convert_modifiers(modifiers, context);
        if kind == vb::TypeBlockKind::Module && !mods.contains(&cs::Modifier::Static) {
            mods.push(cs::Modifier::Static);
        }

        self.enclosing_types.push(EnclosingType {
            symbol: self.sem.declared_symbol(node),
            block_kind: kind,
            name: name.clone(),
        });
        let body = self.convert_type_block_body(inherits, implements, members);
        self.enclosing_types.pop();
        let (bases, members) = body?;

        let decl_kind = match kind {
            vb::TypeBlockKind::Class | vb::TypeBlockKind::Module => cs::TypeDeclKind::Class,
            vb::TypeBlockKind::Structure => cs::TypeDeclKind::Struct,
            vb::TypeBlockKind::Interface => cs::TypeDeclKind::Interface,
        };
        Ok(Converted::single(cs::MemberDecl::Type {
            kind: decl_kind,
            attributes: attrs,
            modifiers: mods,
            name,
            type_params: params,
            bases,
            constraints,
            members,
        }))
    }

    fn convert_type_block_body(
        &mut self,
        inherits: &[vb::TypeRef],
        implements: &[vb::TypeRef],
        members: &[vb::Decl],
    ) -> ConvertResult<(Vec<cs::Type>, Vec<cs::MemberDecl>)> {
        let mut bases = Vec::new();
        for base in inherits.iter().chain(implements) {
            bases.push(self.convert_type(base)?);
        }
        let members = self.convert_members(members)?;
        Ok((bases, members))
    }

    fn convert_enum_members(&mut self, members: &[vb::Decl]) -> ConvertResult<Vec<cs::EnumMember>> {
        members
            .iter()
            .map(|member| match &member.kind {
                vb::DeclKind::EnumMember {
                    attributes,
                    ident,
                    initializer,
                } => Ok(cs::EnumMember {
                    attributes: self.convert_attribute_lists(attributes)?,
                    name: self.identifiers.convert(ident),
                    initializer: match initializer {
                        Some(e) => Some(self.convert_expr(e)?),
                        None => None,
                    },
                }),
                other => Err(ConvertError::unsupported(decl_kind_name(other))),
            })
            .collect()
    }

    fn convert_field(
        &mut self,
        attributes: &[vb::AttributeList],
        modifiers: &[vb::Modifier],
        declarators: &[vb::VariableDeclarator],
    ) -> ConvertResult<Converted> {
        let attrs = self.convert_attribute_lists(attributes)?;
        let dropped: Vec<&'static str> = modifiers
            .iter()
            .filter(|m| matches!(m, vb::Modifier::WithEvents))
            .map(|m| m.text())
            .collect();
        let kept: Vec<vb::Modifier> = modifiers
            .iter()
            .copied()
            .filter(|m| !matches!(m, vb::Modifier::WithEvents))
            .collect();
        let mods = self
            .tokens
            .convert_modifiers(&kept, TokenContext::VariableOrConst);
        let comment = (!dropped.is_empty())
            .then(|| format!("TODO ERROR didn't convert: {}", dropped.join(", ")));

        let mut fields = Vec::new();
        for declarator in declarators {
            for declarator_name in &declarator.names {
                let (ty, initializer) =
                    self.declarator_type_and_initializer(declarator, declarator_name)?;
                fields.push(cs::MemberDecl::Field {
                    attributes: attrs.clone(),
                    modifiers: mods.clone(),
                    ty,
                    name: self.identifiers.convert(&declarator_name.ident),
                    initializer,
                    trailing_comment: comment.clone(),
                });
            }
        }
        let mut fields = fields.into_iter();
        let primary = fields
            .next()
            .ok_or_else(|| ConvertError::unsupported("FieldDeclaration"))?;
        Ok(Converted {
            primary,
            auxiliary: fields.collect(),
        })
    }

    /// The type and initializer of one declared name. The `As New T(...)`
    /// shorthand yields both from the same sub-expression: the creation is
    /// converted per name, and its type reference a second time for the
    /// declaration slot.
    fn declarator_type_and_initializer(
        &mut self,
        declarator: &vb::VariableDeclarator,
        name: &vb::DeclaratorName,
    ) -> ConvertResult<(cs::Type, Option<cs::Expr>)> {
        let (base_ty, as_new_initializer) = match &declarator.as_clause {
            Some(vb::TypedAs::Simple(clause)) => (Some(self.convert_type(&clause.ty)?), None),
            Some(vb::TypedAs::New { object_creation }) => {
                let creation = self.convert_expr(object_creation)?;
                let ty = match &object_creation.kind {
                    vb::ExprKind::ObjectCreation { ty, .. } => self.convert_type(ty)?,
                    _ => return Err(ConvertError::unsupported("AsNewClause")),
                };
                (Some(ty), Some(creation))
            }
            None => (None, None),
        };
        let initializer = match &declarator.initializer {
            Some(e) => Some(self.convert_expr(e)?),
            None => as_new_initializer,
        };
        let mut ty = base_ty.unwrap_or(cs::Type::Var);
        if !name.array_ranks.is_empty() {
            ty = cs::Type::Array {
                element: Box::new(ty),
                ranks: name.array_ranks.clone(),
            };
        }
        if name.nullable {
            ty = distribute_nullable(ty);
        }
        Ok((ty, initializer))
    }

    fn convert_property(
        &mut self,
        node: NodeId,
        attributes: &[vb::AttributeList],
        modifiers: &[vb::Modifier],
        ident: &vb::Ident,
        parameters: &[vb::Parameter],
        as_clause: Option<&vb::TypedAs>,
        initializer: Option<&vb::Expr>,
        accessors: Option<&[vb::AccessorBlock]>,
    ) -> ConvertResult<Converted> {
        let attrs = self.convert_attribute_lists(attributes)?;
        let is_readonly = modifiers.contains(&vb::Modifier::ReadOnly);
        // Conventional-name heuristic: only a Default property spelled
        // `Items` renders as an indexer.
        let is_indexer = modifiers.contains(&vb::Modifier::Default)
            && ident.text.eq_ignore_ascii_case("Items");
        let kept: Vec<vb::Modifier> = modifiers
            .iter()
            .copied()
            .filter(|m| {
                !matches!(
                    m,
                    vb::Modifier::ReadOnly
                        | vb::Modifier::WriteOnly
                        | vb::Modifier::Default
                        | vb::Modifier::Dim
                )
            })
            .collect();
        let mods = self
            .tokens
            .convert_modifiers(&kept, self.member_context(node));

        let (ty, mut converted_initializer) = match as_clause {
            Some(vb::TypedAs::Simple(clause)) => (self.convert_type(&clause.ty)?, None),
            Some(vb::TypedAs::New { object_creation }) => {
                let creation = self.convert_expr(object_creation)?;
                let ty = match &object_creation.kind {
                    vb::ExprKind::ObjectCreation { ty, .. } => self.convert_type(ty)?,
                    _ => return Err(ConvertError::unsupported("AsNewClause")),
                };
                (ty, Some(creation))
            }
            None => (cs::Type::Var, None),
        };
        if converted_initializer.is_none() {
            if let Some(e) = initializer {
                converted_initializer = Some(self.convert_expr(e)?);
            }
        }

        let accessor_list = match accessors {
            Some(blocks) => blocks
                .iter()
                .map(|block| self.convert_accessor(block))
                .collect::<ConvertResult<Vec<_>>>()?,
            None => {
                // The getter is unconditional; only ReadOnly drops the setter.
                let mut list = vec![cs::Accessor::auto(cs::AccessorKind::Get)];
                if !is_readonly {
                    list.push(cs::Accessor::auto(cs::AccessorKind::Set));
                }
                list
            }
        };

        if is_indexer {
            Ok(Converted::single(cs::MemberDecl::Indexer {
                attributes: attrs,
                modifiers: mods,
                ty,
                parameters: self.convert_parameters(parameters, false)?,
                accessors: accessor_list,
            }))
        } else {
            Ok(Converted::single(cs::MemberDecl::Property {
                attributes: attrs,
                modifiers: mods,
                ty,
                name: self.identifiers.convert(ident),
                accessors: accessor_list,
                initializer: converted_initializer,
            }))
        }
    }

    fn convert_accessor(&mut self, block: &vb::AccessorBlock) -> ConvertResult<cs::Accessor> {
        let is_iterator = block.modifiers.contains(&vb::Modifier::Iterator);
        let bodies = self.body_handle();
        let body = bodies.convert_block(self, &block.statements, is_iterator)?;
        Ok(cs::Accessor {
            kind: match block.kind {
                vb::AccessorKind::Get => cs::AccessorKind::Get,
                vb::AccessorKind::Set => cs::AccessorKind::Set,
                vb::AccessorKind::AddHandler => cs::AccessorKind::Add,
                vb::AccessorKind::RemoveHandler => cs::AccessorKind::Remove,
            },
            attributes: self.convert_attribute_lists(&block.attributes)?,
            modifiers: self
                .tokens
                .convert_modifiers(&block.modifiers, TokenContext::Local),
            body: Some(body),
        })
    }

    fn convert_method(
        &mut self,
        node: NodeId,
        attributes: &[vb::AttributeList],
        modifiers: &[vb::Modifier],
        ident: &vb::Ident,
        type_params: Option<&vb::TypeParameterList>,
        parameters: &[vb::Parameter],
        as_clause: Option<&vb::AsClause>,
        body: Option<&[vb::Statement]>,
    ) -> ConvertResult<Converted> {
        if modifiers.contains(&vb::Modifier::Overrides)
            && ident.text.eq_ignore_ascii_case("Finalize")
        {
            let name = self
                .enclosing_types
                .last()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| self.identifiers.convert(ident));
            let converted_body = match body {
                Some(statements) => {
                    let bodies = self.body_handle();
                    Some(bodies.convert_block(self, statements, false)?)
                }
                None => None,
            };
            return Ok(Converted::single(cs::MemberDecl::Destructor {
                attributes: self.convert_attribute_lists(attributes)?,
                name,
                body: converted_body,
            }));
        }

        let mut attrs = self.convert_attribute_lists(attributes)?;
        let return_type = match as_clause {
            Some(clause) => {
                if let Some(list) = self.return_attribute_list(&clause.attributes)? {
                    attrs.push(list);
                }
                self.convert_type(&clause.ty)?
            }
            None => cs::Type::Predefined(cs::Keyword::Void),
        };
        let (params, constraints) = self.split_type_parameters(type_params)?;
        let is_iterator = modifiers.contains(&vb::Modifier::Iterator);
        let converted_body = match body {
            Some(statements) => {
                let bodies = self.body_handle();
                Some(bodies.convert_block(self, statements, is_iterator)?)
            }
            None => None,
        };
        Ok(Converted::single(cs::MemberDecl::Method {
            attributes: attrs,
            modifiers: self
                .tokens
                .convert_modifiers(modifiers, self.member_context(node)),
            return_type,
            name: self.identifiers.convert(ident),
            type_params: params,
            parameters: self.convert_parameters(parameters, true)?,
            constraints,
            body: converted_body,
        }))
    }

    fn convert_event(
        &mut self,
        attributes: &[vb::AttributeList],
        modifiers: &[vb::Modifier],
        ident: &vb::Ident,
        parameters: &[vb::Parameter],
        as_clause: Option<&vb::AsClause>,
        accessors: Option<&[vb::AccessorBlock]>,
    ) -> ConvertResult<Converted> {
        let attrs = self.convert_attribute_lists(attributes)?;
        // Events and operators take the plain member context: the construct
        // shapes carry their own staticness.
        let mods = self.tokens.convert_modifiers(modifiers, TokenContext::Member);
        let name = self.identifiers.convert(ident);

        if let Some(blocks) = accessors {
            let ty = match as_clause {
                Some(clause) => self.convert_type(&clause.ty)?,
                None => cs::Type::Var,
            };
            let accessor_list = blocks
                .iter()
                .map(|block| self.convert_accessor(block))
                .collect::<ConvertResult<Vec<_>>>()?;
            return Ok(Converted::single(cs::MemberDecl::Event {
                attributes: attrs,
                modifiers: mods,
                ty,
                name,
                accessors: accessor_list,
            }));
        }

        match as_clause {
            Some(clause) => Ok(Converted::single(cs::MemberDecl::EventField {
                attributes: attrs,
                modifiers: mods,
                ty: self.convert_type(&clause.ty)?,
                name,
            })),
            None => {
                // No delegate type given: synthesize one from the event's
                // parameter list and declare the event against it.
                let delegate_name = format!("{name}Handler");
                let delegate = cs::MemberDecl::Delegate {
                    attributes: Vec::new(),
                    modifiers: mods.clone(),
                    return_type: cs::Type::Predefined(cs::Keyword::Void),
                    name: delegate_name.clone(),
                    type_params: Vec::new(),
                    parameters: self.convert_parameters(parameters, false)?,
                    constraints: Vec::new(),
                };
                let event = cs::MemberDecl::EventField {
                    attributes: attrs,
                    modifiers: mods,
                    ty: cs::Type::Name(cs::Name::identifier(delegate_name)),
                    name,
                };
                Ok(Converted {
                    primary: event,
                    auxiliary: vec![delegate],
                })
            }
        }
    }

    /// A first body statement calling `New` through `Me`/`MyClass`/`MyBase`
    /// is the chained-constructor call; it becomes the initializer and
    /// leaves the body.
    fn extract_ctor_initializer<'b>(
        &mut self,
        body: &'b [vb::Statement],
    ) -> ConvertResult<(Option<cs::CtorInitializer>, &'b [vb::Statement])> {
        let Some(first) = body.first() else {
            return Ok((None, body));
        };
        let vb::StatementKind::Expression(expr) = &first.kind else {
            return Ok((None, body));
        };
        let vb::ExprKind::Invocation { callee, arguments } = &expr.kind else {
            return Ok((None, body));
        };
        let vb::ExprKind::MemberAccess {
            base: Some(receiver),
            name,
        } = &callee.kind
        else {
            return Ok((None, body));
        };
        let is_new = matches!(
            &name.kind,
            vb::NameKind::Identifier(ident) if ident.text.eq_ignore_ascii_case("New")
        );
        if !is_new {
            return Ok((None, body));
        }
        let kind = match receiver.kind {
            vb::ExprKind::MyBase => cs::CtorInitializerKind::Base,
            vb::ExprKind::Me | vb::ExprKind::MyClass => cs::CtorInitializerKind::This,
            _ => return Ok((None, body)),
        };
        let symbol = self.sem.symbol_info(expr.id).extract_match();
        let converted_args = self.convert_argument_list(arguments, symbol.as_deref())?;
        Ok((
            Some(cs::CtorInitializer {
                kind,
                arguments: converted_args,
            }),
            &body[1..],
        ))
    }

    // -- shared pieces ------------------------------------------------------

    pub(crate) fn convert_parameters(
        &mut self,
        parameters: &[vb::Parameter],
        default_to_object: bool,
    ) -> ConvertResult<Vec<cs::Parameter>> {
        parameters
            .iter()
            .map(|p| self.convert_parameter(p, default_to_object))
            .collect()
    }

    pub(crate) fn convert_parameter(
        &mut self,
        parameter: &vb::Parameter,
        default_to_object: bool,
    ) -> ConvertResult<cs::Parameter> {
        let mut ty = match &parameter.as_clause {
            Some(t) => Some(self.convert_type(t)?),
            None if default_to_object => Some(cs::Type::Predefined(cs::Keyword::Object)),
            None => None,
        };
        if let Some(inner) = ty.take() {
            let mut shaped = inner;
            if !parameter.array_ranks.is_empty() {
                shaped = cs::Type::Array {
                    element: Box::new(shaped),
                    ranks: parameter.array_ranks.clone(),
                };
            }
            if parameter.nullable {
                shaped = distribute_nullable(shaped);
            }
            ty = Some(shaped);
        }
        let mut attributes = self.convert_attribute_lists(&parameter.attributes)?;
        let mut modifiers = self
            .tokens
            .convert_modifiers(&parameter.modifiers, TokenContext::Local);
        // The interop marker attribute is the source spelling of `out`.
        if let Some(index) = attributes.iter().position(is_out_marker) {
            attributes.remove(index);
            if let Some(slot) = modifiers.iter_mut().find(|m| **m == cs::Modifier::Ref) {
                *slot = cs::Modifier::Out;
            } else if !modifiers.contains(&cs::Modifier::Out) {
                modifiers.push(cs::Modifier::Out);
            }
        }
        let default = match &parameter.default {
            Some(e) => Some(self.convert_expr(e)?),
            None => None,
        };
        Ok(cs::Parameter {
            attributes,
            modifiers,
            ty,
            name: self.identifiers.convert(&parameter.ident),
            default,
        })
    }

    /// Flatten list-of-lists: one target list per source attribute, each
    /// keeping its own target specifier.
    pub(crate) fn convert_attribute_lists(
        &mut self,
        lists: &[vb::AttributeList],
    ) -> ConvertResult<Vec<cs::AttributeList>> {
        let mut out = Vec::new();
        for list in lists {
            for attribute in &list.attributes {
                out.push(cs::AttributeList {
                    target: attribute
                        .target
                        .map(|t| self.tokens.convert_attribute_target(t)),
                    attributes: vec![self.convert_attribute(attribute)?],
                });
            }
        }
        Ok(out)
    }

    fn convert_attribute(&mut self, attribute: &vb::Attribute) -> ConvertResult<cs::Attribute> {
        let arguments = match &attribute.arguments {
            Some(list) => list
                .arguments
                .iter()
                .map(|argument| match argument {
                    vb::Argument::Simple { name, expr } => Ok(cs::AttributeArgument {
                        name: name.as_ref().map(|n| self.identifiers.convert(n)),
                        expr: self.convert_expr(expr)?,
                    }),
                    vb::Argument::Omitted => Err(ConvertError::unsupported("OmittedArgument")),
                })
                .collect::<ConvertResult<_>>()?,
            None => Vec::new(),
        };
        Ok(cs::Attribute {
            name: self.convert_name(&attribute.name, true)?,
            arguments,
        })
    }

    /// As-clause attributes re-target to `return:` as one merged list.
    fn return_attribute_list(
        &mut self,
        lists: &[vb::AttributeList],
    ) -> ConvertResult<Option<cs::AttributeList>> {
        if lists.is_empty() {
            return Ok(None);
        }
        let mut attributes = Vec::new();
        for list in lists {
            for attribute in &list.attributes {
                attributes.push(self.convert_attribute(attribute)?);
            }
        }
        Ok(Some(cs::AttributeList {
            target: Some(cs::AttrTarget::Return),
            attributes,
        }))
    }

    pub(crate) fn split_type_parameters(
        &mut self,
        list: Option<&vb::TypeParameterList>,
    ) -> ConvertResult<(Vec<cs::TypeParameter>, Vec<cs::ConstraintClause>)> {
        let mut params = Vec::new();
        let mut clauses = Vec::new();
        let Some(list) = list else {
            return Ok((params, clauses));
        };
        for parameter in &list.parameters {
            let name = self.identifiers.convert(&parameter.ident);
            params.push(cs::TypeParameter {
                variance: parameter.variance.map(|v| match v {
                    vb::Variance::In => cs::VarianceKind::In,
                    vb::Variance::Out => cs::VarianceKind::Out,
                }),
                name: name.clone(),
            });
            if !parameter.constraints.is_empty() {
                let constraints = parameter
                    .constraints
                    .iter()
                    .map(|constraint| {
                        Ok(match constraint {
                            vb::Constraint::Type(ty) => cs::Constraint::Type(self.convert_type(ty)?),
                            vb::Constraint::New => cs::Constraint::Constructor,
                            vb::Constraint::Class => cs::Constraint::Class,
                            vb::Constraint::Structure => cs::Constraint::Struct,
                        })
                    })
                    .collect::<ConvertResult<_>>()?;
                clauses.push(cs::ConstraintClause {
                    param: name,
                    constraints,
                });
            }
        }
        Ok((params, clauses))
    }

    fn member_context(&self, node: NodeId) -> TokenContext {
        let container_kind = self
            .sem
            .declared_symbol(node)
            .and_then(|s| s.container.as_ref().and_then(|c| c.type_kind()));
        if let Some(kind) = container_kind {
            return match kind {
                TypeSymbolKind::Module => TokenContext::MemberInModule,
                TypeSymbolKind::Class => TokenContext::MemberInClass,
                TypeSymbolKind::Interface => TokenContext::MemberInInterface,
                TypeSymbolKind::Structure => TokenContext::MemberInStruct,
                _ => TokenContext::Member,
            };
        }
        match self.enclosing_types.last().map(|t| t.block_kind) {
            Some(vb::TypeBlockKind::Module) => TokenContext::MemberInModule,
            Some(vb::TypeBlockKind::Class) => TokenContext::MemberInClass,
            Some(vb::TypeBlockKind::Interface) => TokenContext::MemberInInterface,
            Some(vb::TypeBlockKind::Structure) => TokenContext::MemberInStruct,
            None => TokenContext::Member,
        }
    }
}

fn is_out_marker(list: &cs::AttributeList) -> bool {
    if list.target.is_some() || list.attributes.len() != 1 || !list.attributes[0].arguments.is_empty()
    {
        return false;
    }
    let text = list.attributes[0].name.to_string();
    matches!(
        text.as_str(),
        "Out"
            | "OutAttribute"
            | "System.Runtime.InteropServices.Out"
            | "System.Runtime.InteropServices.OutAttribute"
    )
}

fn decl_kind_name(kind: &vb::DeclKind) -> &'static str {
    match kind {
        vb::DeclKind::Namespace { .. } => "NamespaceBlock",
        vb::DeclKind::TypeBlock { .. } => "TypeBlock",
        vb::DeclKind::EnumBlock { .. } => "EnumBlock",
        vb::DeclKind::EnumMember { .. } => "EnumMemberDeclaration",
        vb::DeclKind::Delegate { .. } => "DelegateStatement",
        vb::DeclKind::Field { .. } => "FieldDeclaration",
        vb::DeclKind::Property { .. } => "PropertyBlock",
        vb::DeclKind::Method { .. } => "MethodBlock",
        vb::DeclKind::Constructor { .. } => "ConstructorBlock",
        vb::DeclKind::Operator { .. } => "OperatorBlock",
        vb::DeclKind::Event { .. } => "EventBlock",
        vb::DeclKind::Unknown { .. } => "UnknownDeclaration",
    }
}
