//! Common types for the vbcs converter.
//!
//! This crate is the leaf of the workspace: node identity and the typed
//! error surface shared by the syntax, semantic, and conversion crates.

use serde::Serialize;

/// Identity of a syntax node within one parsed compilation unit.
///
/// The parser assigns ids; the semantic binder answers queries keyed by them.
/// Ids are only meaningful within the unit they were assigned in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Id for synthesized nodes that no binder has seen.
    pub const SYNTHETIC: NodeId = NodeId(u32::MAX);
}

/// Errors produced while converting a source tree.
///
/// Conversion prefers degraded, comment-marked output over failure wherever
/// partial correctness is acceptable; these errors are reserved for node
/// kinds with no declared mapping at all. They abort only the smallest
/// enclosing subtree and are expected to be caught and reported upstream
/// per top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    /// A declaration- or expression-position node kind with no mapping.
    #[error("unsupported construct: {kind}")]
    UnsupportedConstruct { kind: String },

    /// A construct that is only representable as part of a statement
    /// sequence; the body converter has to handle it, the declaration and
    /// expression converters cannot.
    #[error("construct requires statement-level handling: {kind}")]
    UnsupportedStatement { kind: String },

    /// More than one candidate symbol resolved and no unique match exists.
    #[error("ambiguous symbol for `{name}`: {candidates} candidates")]
    AmbiguousSymbol { name: String, candidates: usize },
}

impl ConvertError {
    pub fn unsupported(kind: impl Into<String>) -> Self {
        ConvertError::UnsupportedConstruct { kind: kind.into() }
    }

    pub fn statement_level(kind: impl Into<String>) -> Self {
        ConvertError::UnsupportedStatement { kind: kind.into() }
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;
