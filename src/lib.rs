//! Tools for rewriting character-level recognition lattices into word-level
//! lattices by collapsing the arc runs between separator symbols into single
//! word arcs.

pub mod archive;
pub mod expand;
pub mod lattice;
pub mod registry;
pub mod symbols;
pub mod weight;
