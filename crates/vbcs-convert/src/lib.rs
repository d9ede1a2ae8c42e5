//! Declaration- and expression-level tree conversion engine.
//!
//! [`Converter`] walks a [`vbcs_syntax::vb`] compilation unit and produces
//! the [`vbcs_syntax::cs`] counterpart, asking a
//! [`vbcs_semantic::SemanticContext`] whenever syntax alone does not decide
//! the output shape (by-ref argument modes, indexer detection, null
//! spelling, minimal qualification).
//!
//! Statement bodies, identifier escaping, and token mapping sit behind the
//! collaborator seams; the defaults cover what declaration conversion
//! itself needs (constructor initializers, lambda bodies, with blocks).

mod collaborators;
mod convert_table;
mod declarations;
mod engine;
mod expressions;
mod types;

pub use collaborators::{
    BodyConverter, DefaultBodies, DefaultIdentifiers, DefaultTokens, IdentifierConverter,
    TokenContext, TokenConverter,
};
pub use convert_table::conversion_function;
pub use engine::{Converted, Converter};

pub use vbcs_common::{ConvertError, ConvertResult, NodeId};
