//! Syntax trees for the vbcs converter.
//!
//! Two independent tree families live here:
//! - [`vb`] — the source dialect (Visual Basic), produced by an external
//!   parser. Nodes the binder can be queried about carry a
//!   [`vbcs_common::NodeId`].
//! - [`cs`] — the target dialect (C#), produced by the converter and handed
//!   to an external printer.
//!
//! Both are immutable, node-kind-tagged trees; conversion never mutates a
//! node in place, it always allocates new target nodes.

pub mod cs;
pub mod vb;

pub use vbcs_common::NodeId;
