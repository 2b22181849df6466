//! Sparse linear algebra used by the activation-rate solver and the sparse
//! graph encoding.
//!
//! - [`csr`]: `CsrMatrix` storage, mat-vec, row 0 / column 0 reduction
//! - [`bicgstab`]: Jacobi-preconditioned BiCGSTAB with convergence report

pub mod bicgstab;
pub mod csr;

pub use bicgstab::{bicgstab, SolveReport};
pub use csr::CsrMatrix;
