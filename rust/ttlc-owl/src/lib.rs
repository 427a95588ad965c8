// rust/ttlc-owl/src/lib.rs
// OWL closure engine: subclass and subproperty bit matrices, property
// characteristics, disjointness consistency checks

mod closure;
mod matrix;

pub use closure::{Closure, ClosureBuilder, Contradiction, DenseIndex, OwlError, PropertyFlags};
pub use matrix::BitMatrix;
