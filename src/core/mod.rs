//! Core types: the lattice session value, matrices and errors

pub mod error;
pub mod lattice;
pub mod matrix;
pub mod types;

pub use error::*;
pub use lattice::*;
pub use matrix::*;
pub use types::*;
