//! Semantic model seam for the vbcs converter.
//!
//! The converter never resolves symbols itself; it asks a [`SemanticContext`]
//! bound to one compilation and one source tree. The real binder lives
//! outside this workspace — what lives here is the data model the engine
//! consumes (types, symbols, display formatting) plus [`TableContext`], a
//! programmable table-backed implementation used by tests and tooling.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use vbcs_common::NodeId;

/// Semantic type identity.
///
/// This is the key space of the conversion-function lookup table, so it has
/// to be hashable and comparable; named types compare by qualified name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Ty {
    Boolean,
    Byte,
    SByte,
    Char,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    String,
    DateTime,
    Object,
    Void,
    /// A non-special named type; the string is the qualified display name.
    Named(String),
    Array(Box<Ty>),
    /// `System.Collections.IEnumerable` — special-cased for bare collection
    /// initializers.
    Enumerable,
}

impl Ty {
    pub fn is_reference_type(&self) -> bool {
        matches!(
            self,
            Ty::String | Ty::Object | Ty::Named(_) | Ty::Array(_) | Ty::Enumerable
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Ty::Array(_))
    }

    /// Shortest display form that still names the type, for `default(T)`
    /// emission and catch declarations.
    pub fn minimal_display(&self) -> String {
        match self {
            Ty::Boolean => "bool".into(),
            Ty::Byte => "byte".into(),
            Ty::SByte => "sbyte".into(),
            Ty::Char => "char".into(),
            Ty::Int16 => "short".into(),
            Ty::UInt16 => "ushort".into(),
            Ty::Int32 => "int".into(),
            Ty::UInt32 => "uint".into(),
            Ty::Int64 => "long".into(),
            Ty::UInt64 => "ulong".into(),
            Ty::Single => "float".into(),
            Ty::Double => "double".into(),
            Ty::Decimal => "decimal".into(),
            Ty::String => "string".into(),
            Ty::DateTime => "DateTime".into(),
            Ty::Object => "object".into(),
            Ty::Void => "void".into(),
            Ty::Named(name) => name
                .rsplit('.')
                .next()
                .unwrap_or(name.as_str())
                .to_string(),
            Ty::Array(e) => format!("{}[]", e.minimal_display()),
            Ty::Enumerable => "IEnumerable".into(),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.minimal_display())
    }
}

/// Argument/parameter passing mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum RefMode {
    ByValue,
    Ref,
    Out,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParamSymbol {
    pub name: String,
    pub mode: RefMode,
    pub ty: Ty,
    /// Trailing variadic (`ParamArray`) parameter.
    pub is_param_array: bool,
}

impl ParamSymbol {
    pub fn by_value(name: impl Into<String>, ty: Ty) -> Self {
        ParamSymbol {
            name: name.into(),
            mode: RefMode::ByValue,
            ty,
            is_param_array: false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TypeSymbolKind {
    Class,
    Module,
    Structure,
    Interface,
    Enum,
    Delegate,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SymbolKind {
    Namespace,
    Type(TypeSymbolKind),
    Method {
        parameters: Vec<ParamSymbol>,
        return_ty: Ty,
    },
    Property {
        is_indexer: bool,
        parameters: Vec<ParamSymbol>,
        ty: Ty,
    },
    Field {
        ty: Ty,
    },
    Event,
    Local {
        ty: Ty,
    },
    Parameter {
        ty: Ty,
    },
}

/// A resolved symbol with its containing-symbol chain.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub container: Option<Arc<Symbol>>,
}

impl Symbol {
    pub fn namespace(name: impl Into<String>, container: Option<Arc<Symbol>>) -> Arc<Self> {
        Arc::new(Symbol {
            name: name.into(),
            kind: SymbolKind::Namespace,
            container,
        })
    }

    pub fn ty(
        name: impl Into<String>,
        kind: TypeSymbolKind,
        container: Option<Arc<Symbol>>,
    ) -> Arc<Self> {
        Arc::new(Symbol {
            name: name.into(),
            kind: SymbolKind::Type(kind),
            container,
        })
    }

    pub fn method(
        name: impl Into<String>,
        parameters: Vec<ParamSymbol>,
        return_ty: Ty,
        container: Option<Arc<Symbol>>,
    ) -> Arc<Self> {
        Arc::new(Symbol {
            name: name.into(),
            kind: SymbolKind::Method {
                parameters,
                return_ty,
            },
            container,
        })
    }

    pub fn indexer(
        parameters: Vec<ParamSymbol>,
        ty: Ty,
        container: Option<Arc<Symbol>>,
    ) -> Arc<Self> {
        Arc::new(Symbol {
            name: "Items".into(),
            kind: SymbolKind::Property {
                is_indexer: true,
                parameters,
                ty,
            },
            container,
        })
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self.kind, SymbolKind::Namespace)
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, SymbolKind::Method { .. })
    }

    pub fn is_indexer(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Property {
                is_indexer: true,
                ..
            }
        )
    }

    pub fn type_kind(&self) -> Option<TypeSymbolKind> {
        match self.kind {
            SymbolKind::Type(k) => Some(k),
            _ => None,
        }
    }

    /// The result type of reading this symbol, when that is meaningful.
    pub fn return_ty(&self) -> Option<&Ty> {
        match &self.kind {
            SymbolKind::Method { return_ty, .. } => Some(return_ty),
            SymbolKind::Property { ty, .. }
            | SymbolKind::Field { ty }
            | SymbolKind::Local { ty }
            | SymbolKind::Parameter { ty } => Some(ty),
            _ => None,
        }
    }

    pub fn parameters(&self) -> &[ParamSymbol] {
        match &self.kind {
            SymbolKind::Method { parameters, .. }
            | SymbolKind::Property { parameters, .. } => parameters,
            _ => &[],
        }
    }

    /// Whether the last parameter is variadic.
    pub fn is_params(&self) -> bool {
        self.parameters().last().is_some_and(|p| p.is_param_array)
    }

    /// The containing-symbol chain, innermost (self) first.
    pub fn chain(&self) -> impl Iterator<Item = &Symbol> {
        std::iter::successors(Some(self), |s| s.container.as_deref())
    }

    /// Maximally qualified display: global namespace omitted, containing
    /// types and namespaces included, type arguments included (they are part
    /// of the symbol name text).
    pub fn qualified_display(&self) -> String {
        let mut parts: Vec<&str> = self
            .chain()
            .filter(|s| !s.name.is_empty())
            .map(|s| s.name.as_str())
            .collect();
        parts.reverse();
        parts.join(".")
    }

    /// Qualified display of the containing namespace, skipping containing
    /// types.
    pub fn containing_namespace_display(&self) -> Option<String> {
        self.chain()
            .skip(1)
            .find(|s| s.is_namespace() && !s.name.is_empty())
            .map(|s| s.qualified_display())
    }
}

/// Resolution result for one reference: the unique symbol if the binder
/// found one, otherwise the candidate set.
#[derive(Clone, Debug, Default)]
pub struct SymbolInfo {
    pub symbol: Option<Arc<Symbol>>,
    pub candidates: Vec<Arc<Symbol>>,
}

impl SymbolInfo {
    pub fn resolved(symbol: Arc<Symbol>) -> Self {
        SymbolInfo {
            symbol: Some(symbol),
            candidates: Vec::new(),
        }
    }

    /// Unique-match policy: the resolved symbol, else a single candidate,
    /// else nothing. The converter never guesses among several candidates.
    pub fn extract_match(&self) -> Option<Arc<Symbol>> {
        if let Some(s) = &self.symbol {
            return Some(s.clone());
        }
        if self.candidates.len() == 1 {
            return Some(self.candidates[0].clone());
        }
        None
    }
}

/// Resolved and converted type of an expression or type reference.
#[derive(Clone, Debug, Default)]
pub struct TypeInfo {
    pub ty: Option<Ty>,
    pub converted_ty: Option<Ty>,
}

impl TypeInfo {
    pub fn both(ty: Ty) -> Self {
        TypeInfo {
            ty: Some(ty.clone()),
            converted_ty: Some(ty),
        }
    }
}

/// Compile-time constant values the binder can fold.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Int(i32),
    Bool(bool),
    Str(String),
}

/// One compilation-wide implicit import: namespace name plus optional alias.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalImport {
    pub namespace: String,
    pub alias: Option<String>,
}

/// Read-only binder facade, bound to one compilation and one source tree.
///
/// The engine owns none of this state; it only reads. Every method is keyed
/// by the [`NodeId`] the parser stamped on the node.
pub trait SemanticContext {
    /// The symbol a declaration node declares.
    fn declared_symbol(&self, node: NodeId) -> Option<Arc<Symbol>>;

    /// Symbol resolution for a reference node.
    fn symbol_info(&self, node: NodeId) -> SymbolInfo;

    /// Like [`symbol_info`](Self::symbol_info), but answers only for nodes
    /// of the tree this context is bound to.
    fn resolve_in_document(&self, node: NodeId) -> Option<Arc<Symbol>> {
        self.symbol_info(node).symbol
    }

    /// Resolved and converted type of an expression or type node.
    fn type_info(&self, node: NodeId) -> TypeInfo;

    /// Compile-time constant folding.
    fn const_value(&self, node: NodeId) -> Option<ConstValue>;

    /// The compilation's implicit imports.
    fn global_imports(&self) -> &[GlobalImport];

    /// The compilation's root namespace, if one is configured.
    fn root_namespace(&self) -> Option<&str>;
}

/// Table-backed [`SemanticContext`].
///
/// Everything is programmed up front with the builder methods; lookups are
/// plain map reads. Tests use this in place of the real binder.
#[derive(Default)]
pub struct TableContext {
    declared: FxHashMap<NodeId, Arc<Symbol>>,
    symbols: FxHashMap<NodeId, SymbolInfo>,
    out_of_document: FxHashMap<NodeId, bool>,
    types: FxHashMap<NodeId, TypeInfo>,
    consts: FxHashMap<NodeId, ConstValue>,
    global_imports: Vec<GlobalImport>,
    root_namespace: Option<String>,
}

impl TableContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_declared(mut self, node: NodeId, symbol: Arc<Symbol>) -> Self {
        self.declared.insert(node, symbol);
        self
    }

    pub fn with_symbol(mut self, node: NodeId, symbol: Arc<Symbol>) -> Self {
        self.symbols.insert(node, SymbolInfo::resolved(symbol));
        self
    }

    pub fn with_candidates(mut self, node: NodeId, candidates: Vec<Arc<Symbol>>) -> Self {
        self.symbols.insert(
            node,
            SymbolInfo {
                symbol: None,
                candidates,
            },
        );
        self
    }

    /// Mark a node as belonging to a different tree than this context.
    pub fn with_foreign_node(mut self, node: NodeId) -> Self {
        self.out_of_document.insert(node, true);
        self
    }

    pub fn with_type(mut self, node: NodeId, info: TypeInfo) -> Self {
        self.types.insert(node, info);
        self
    }

    pub fn with_converted_type(mut self, node: NodeId, ty: Ty) -> Self {
        self.types.insert(
            node,
            TypeInfo {
                ty: None,
                converted_ty: Some(ty),
            },
        );
        self
    }

    pub fn with_const(mut self, node: NodeId, value: ConstValue) -> Self {
        self.consts.insert(node, value);
        self
    }

    pub fn with_global_import(mut self, namespace: impl Into<String>) -> Self {
        self.global_imports.push(GlobalImport {
            namespace: namespace.into(),
            alias: None,
        });
        self
    }

    pub fn with_root_namespace(mut self, name: impl Into<String>) -> Self {
        self.root_namespace = Some(name.into());
        self
    }
}

impl SemanticContext for TableContext {
    fn declared_symbol(&self, node: NodeId) -> Option<Arc<Symbol>> {
        self.declared.get(&node).cloned()
    }

    fn symbol_info(&self, node: NodeId) -> SymbolInfo {
        self.symbols.get(&node).cloned().unwrap_or_default()
    }

    fn resolve_in_document(&self, node: NodeId) -> Option<Arc<Symbol>> {
        if self.out_of_document.get(&node).copied().unwrap_or(false) {
            return None;
        }
        self.symbol_info(node).symbol
    }

    fn type_info(&self, node: NodeId) -> TypeInfo {
        self.types.get(&node).cloned().unwrap_or_default()
    }

    fn const_value(&self, node: NodeId) -> Option<ConstValue> {
        self.consts.get(&node).cloned()
    }

    fn global_imports(&self) -> &[GlobalImport] {
        &self.global_imports
    }

    fn root_namespace(&self) -> Option<&str> {
        self.root_namespace.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chain() -> Arc<Symbol> {
        let ns = Symbol::namespace("Namespace1", None);
        let outer = Symbol::ty("Outer", TypeSymbolKind::Class, Some(ns));
        Symbol::ty("Inner", TypeSymbolKind::Class, Some(outer))
    }

    #[test]
    fn qualified_display_walks_containers() {
        assert_eq!(sample_chain().qualified_display(), "Namespace1.Outer.Inner");
    }

    #[test]
    fn containing_namespace_skips_types() {
        assert_eq!(
            sample_chain().containing_namespace_display().as_deref(),
            Some("Namespace1")
        );
    }

    #[test]
    fn global_namespace_is_omitted() {
        let global = Symbol::namespace("", None);
        let ns = Symbol::namespace("System", Some(global));
        assert_eq!(ns.qualified_display(), "System");
    }

    #[test]
    fn extract_match_refuses_multiple_candidates() {
        let a = Symbol::namespace("A", None);
        let b = Symbol::namespace("B", None);
        let info = SymbolInfo {
            symbol: None,
            candidates: vec![a.clone(), b],
        };
        assert!(info.extract_match().is_none());

        let single = SymbolInfo {
            symbol: None,
            candidates: vec![a.clone()],
        };
        assert_eq!(single.extract_match().as_deref(), Some(a.as_ref()));
    }

    #[test]
    fn params_flag_reads_trailing_parameter() {
        let mut p = ParamSymbol::by_value("values", Ty::Array(Box::new(Ty::Int32)));
        p.is_param_array = true;
        let m = Symbol::method("Log", vec![ParamSymbol::by_value("x", Ty::Int32), p], Ty::Void, None);
        assert!(m.is_params());
    }
}
