//! Type and name conversion, including the minimal-qualification resolver.

use vbcs_common::{ConvertError, ConvertResult};
use vbcs_semantic::Ty;
use vbcs_syntax::{cs, vb};

use crate::engine::Converter;

impl Converter<'_> {
    pub fn convert_type(&mut self, ty: &vb::TypeRef) -> ConvertResult<cs::Type> {
        match &ty.kind {
            vb::TypeKind::Predefined(p) => Ok(convert_predefined(*p)),
            vb::TypeKind::Name(name) => Ok(cs::Type::Name(self.convert_name(name, true)?)),
            vb::TypeKind::Array { element, ranks } => Ok(cs::Type::Array {
                element: Box::new(self.convert_type(element)?),
                ranks: ranks.clone(),
            }),
            vb::TypeKind::Nullable(element) => {
                Ok(distribute_nullable(self.convert_type(element)?))
            }
            vb::TypeKind::Unknown { kind_name } => {
                Err(ConvertError::unsupported(kind_name.clone()))
            }
        }
    }

    /// Convert a name reference; `qualify` runs the minimal-qualification
    /// resolver over the result. Import headers, namespace-statement heads,
    /// and member-access right-hand sides pass `false`.
    pub(crate) fn convert_name(
        &mut self,
        name: &vb::NameRef,
        qualify: bool,
    ) -> ConvertResult<cs::Name> {
        let rendered = self.render_name(name)?;
        if qualify {
            Ok(self.qualify_name(name, rendered))
        } else {
            Ok(rendered)
        }
    }

    /// Structural conversion only, no qualification.
    pub(crate) fn render_name(&mut self, name: &vb::NameRef) -> ConvertResult<cs::Name> {
        Ok(match &name.kind {
            vb::NameKind::Identifier(ident) => {
                cs::Name::Identifier(self.identifiers.convert(ident))
            }
            vb::NameKind::Global => cs::Name::Identifier("global".into()),
            vb::NameKind::Generic { ident, type_args } => cs::Name::Generic {
                ident: self.identifiers.convert(ident),
                args: type_args
                    .iter()
                    .map(|arg| self.convert_type(arg))
                    .collect::<ConvertResult<_>>()?,
            },
            vb::NameKind::Qualified { left, right } => {
                if matches!(left.kind, vb::NameKind::Global) {
                    cs::Name::AliasQualified {
                        alias: "global".into(),
                        name: Box::new(self.render_name(right)?),
                    }
                } else {
                    cs::Name::Qualified {
                        left: Box::new(self.render_name(left)?),
                        right: Box::new(self.render_name(right)?),
                    }
                }
            }
        })
    }

    /// Minimal qualification: qualify just enough that the reference still
    /// resolves, preferring the as-written spelling wherever it is already
    /// unambiguous.
    ///
    /// The resolved symbol's maximally qualified display is the starting
    /// point; the enclosing scope chain and the imported-namespace table
    /// strip the prefixes the target scope makes redundant; the converted
    /// source spelling is substituted back over the trailing segment so
    /// escaping survives. Names whose qualified form does not end in the
    /// source spelling (aliases, conversions) stay as written.
    pub(crate) fn qualify_name(&self, name: &vb::NameRef, rendered: cs::Name) -> cs::Name {
        let Some(symbol) = self.sem.resolve_in_document(name.id) else {
            return rendered;
        };
        let mut qualified = symbol.qualified_display();
        let source_text = name.to_string();
        if !qualified.ends_with(&source_text) || source_text.len() >= qualified.len() {
            return rendered;
        }

        let mut stripped = false;
        if let Some(enclosing) = self
            .enclosing_types
            .last()
            .and_then(|t| t.symbol.as_ref())
        {
            // Innermost scope first; its display is the longest prefix.
            for scope in enclosing.chain() {
                if scope.name.is_empty() {
                    continue;
                }
                let prefix = format!("{}.", scope.qualified_display());
                if let Some(rest) = qualified.strip_prefix(prefix.as_str()) {
                    qualified = rest.to_string();
                    stripped = true;
                    break;
                }
            }
        }
        if !stripped && !symbol.is_namespace() {
            if let Some(namespace) = symbol.containing_namespace_display() {
                if self.imported_namespaces.contains_key(&namespace) {
                    let prefix = format!("{namespace}.");
                    if let Some(rest) = qualified.strip_prefix(prefix.as_str()) {
                        qualified = rest.to_string();
                    }
                }
            }
        }

        let rendered_text = rendered.to_string();
        if qualified == source_text || qualified == rendered_text {
            return rendered;
        }
        let minimal = match qualified.strip_suffix(source_text.as_str()) {
            Some(head) => format!("{head}{rendered_text}"),
            None => qualified,
        };
        cs::parse_name(&minimal)
    }
}

fn convert_predefined(p: vb::PredefinedTy) -> cs::Type {
    use vb::PredefinedTy as P;
    let keyword = match p {
        P::Boolean => cs::Keyword::Bool,
        P::Byte => cs::Keyword::Byte,
        P::SByte => cs::Keyword::SByte,
        P::Char => cs::Keyword::Char,
        P::Short => cs::Keyword::Short,
        P::UShort => cs::Keyword::UShort,
        P::Integer => cs::Keyword::Int,
        P::UInteger => cs::Keyword::UInt,
        P::Long => cs::Keyword::Long,
        P::ULong => cs::Keyword::ULong,
        P::Single => cs::Keyword::Float,
        P::Double => cs::Keyword::Double,
        P::Decimal => cs::Keyword::Decimal,
        P::String => cs::Keyword::String,
        P::Object => cs::Keyword::Object,
        // No keyword spelling exists for this one.
        P::Date => return cs::Type::named("System.DateTime"),
    };
    cs::Type::Predefined(keyword)
}

/// Nullable wraps its element, except over an array shape, where it
/// distributes onto the element type (`T?()` reads as array-of-nullable).
pub(crate) fn distribute_nullable(ty: cs::Type) -> cs::Type {
    match ty {
        cs::Type::Array { element, ranks } => cs::Type::Array {
            element: Box::new(cs::Type::Nullable(element)),
            ranks,
        },
        other => cs::Type::Nullable(Box::new(other)),
    }
}

/// Target-tree spelling of a semantic type, for `default(T)` emission.
pub(crate) fn type_from_semantic(ty: &Ty) -> cs::Type {
    let keyword = match ty {
        Ty::Boolean => cs::Keyword::Bool,
        Ty::Byte => cs::Keyword::Byte,
        Ty::SByte => cs::Keyword::SByte,
        Ty::Char => cs::Keyword::Char,
        Ty::Int16 => cs::Keyword::Short,
        Ty::UInt16 => cs::Keyword::UShort,
        Ty::Int32 => cs::Keyword::Int,
        Ty::UInt32 => cs::Keyword::UInt,
        Ty::Int64 => cs::Keyword::Long,
        Ty::UInt64 => cs::Keyword::ULong,
        Ty::Single => cs::Keyword::Float,
        Ty::Double => cs::Keyword::Double,
        Ty::Decimal => cs::Keyword::Decimal,
        Ty::String => cs::Keyword::String,
        Ty::Object => cs::Keyword::Object,
        Ty::Void => cs::Keyword::Void,
        Ty::Array(element) => {
            return cs::Type::Array {
                element: Box::new(type_from_semantic(element)),
                ranks: smallvec::smallvec![1],
            };
        }
        Ty::DateTime | Ty::Named(_) | Ty::Enumerable => {
            return cs::Type::named(&ty.minimal_display());
        }
    };
    cs::Type::Predefined(keyword)
}
