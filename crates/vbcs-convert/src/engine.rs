//! Engine state.
//!
//! One [`Converter`] per compilation unit, bound to one semantic context.
//! All conversion state that crosses node boundaries lives here as explicit
//! stacks and tables rather than as side maps keyed by node identity.

use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use vbcs_semantic::{SemanticContext, Symbol};
use vbcs_syntax::cs;
use vbcs_syntax::vb;

use crate::collaborators::{
    BodyConverter, BodyHandle, DefaultBodies, DefaultIdentifiers, DefaultTokens,
    IdentifierConverter, TokenConverter,
};

/// Result of converting one source declaration: the member it maps onto plus
/// any declarations the conversion synthesizes alongside it (extra field
/// declarators, synthesized event delegates). The member-list walk flattens
/// auxiliaries immediately after their origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Converted {
    pub primary: cs::MemberDecl,
    pub auxiliary: Vec<cs::MemberDecl>,
}

impl Converted {
    pub fn single(primary: cs::MemberDecl) -> Self {
        Converted {
            primary,
            auxiliary: Vec::new(),
        }
    }
}

/// One entry of the enclosing-type stack: the converted type name (for
/// constructor and destructor naming) plus what the binder knows about the
/// declaration (for the qualification resolver and modifier contexts).
pub(crate) struct EnclosingType {
    pub symbol: Option<Arc<Symbol>>,
    pub block_kind: vb::TypeBlockKind,
    pub name: String,
}

/// The conversion engine. Single-threaded recursive descent; every
/// conversion allocates new target nodes.
pub struct Converter<'a> {
    pub(crate) sem: &'a dyn SemanticContext,
    pub(crate) identifiers: Box<dyn IdentifierConverter>,
    pub(crate) tokens: Box<dyn TokenConverter>,
    pub(crate) bodies: BodyHandle,
    /// Namespaces usable without qualification: name -> alias, "" for a
    /// plain import. Insertion order is the declaration order of the unit.
    pub(crate) imported_namespaces: IndexMap<String, String>,
    pub(crate) with_receivers: Vec<String>,
    pub(crate) enclosing_types: Vec<EnclosingType>,
    pub(crate) conditional_access_depth: u32,
}

impl<'a> Converter<'a> {
    pub fn new(sem: &'a dyn SemanticContext) -> Self {
        Converter {
            sem,
            identifiers: Box::new(DefaultIdentifiers),
            tokens: Box::new(DefaultTokens),
            bodies: Rc::new(DefaultBodies),
            imported_namespaces: IndexMap::new(),
            with_receivers: Vec::new(),
            enclosing_types: Vec::new(),
            conditional_access_depth: 0,
        }
    }

    pub fn with_identifiers(mut self, identifiers: impl IdentifierConverter + 'static) -> Self {
        self.identifiers = Box::new(identifiers);
        self
    }

    pub fn with_tokens(mut self, tokens: impl TokenConverter + 'static) -> Self {
        self.tokens = Box::new(tokens);
        self
    }

    pub fn with_bodies(mut self, bodies: impl BodyConverter + 'static) -> Self {
        self.bodies = Rc::new(bodies);
        self
    }

    /// Ambient receiver for receiver-less member accesses. The body seam
    /// pushes around each implicit-context block and pops on the way out.
    pub fn push_with_receiver(&mut self, name: String) {
        self.with_receivers.push(name);
    }

    pub fn pop_with_receiver(&mut self) {
        self.with_receivers.pop();
    }

    pub fn with_depth(&self) -> usize {
        self.with_receivers.len()
    }

    pub(crate) fn body_handle(&self) -> BodyHandle {
        Rc::clone(&self.bodies)
    }
}
