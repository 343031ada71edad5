//! Lattice machinery for the primal and Babai attacks.
//!
//! # Overview
//!
//! LWE samples `b = A·s + e mod q` with a small `e` put the vector `[e, q]`
//! into the embedding lattice built by [`build_embedding`]. Reducing that
//! lattice with [`LllReducer`] brings such short vectors into the basis,
//! where the attack reads them off.
//!
//! The alternative route treats `b` as a closest-vector target in the
//! q-ary lattice of A ([`qary_basis`]) and rounds it to a lattice point
//! with [`nearest_plane`].

mod babai;
mod embedding;
mod lll;

pub use babai::{nearest_plane, GramSchmidt};
pub use embedding::{build_embedding, qary_basis};
pub use lll::{LllReducer, LllStats, ReducedBasis};
