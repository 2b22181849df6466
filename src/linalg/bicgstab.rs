//! Stabilized bi-conjugate gradient (BiCGSTAB) with a Jacobi preconditioner.
//!
//! Suited to the large, sparse, non-symmetric activation-pattern systems.
//! The solver never fails: it returns the best iterate together with the
//! iteration count, the relative residual `‖b − Ax‖ / ‖b‖` and a convergence
//! flag, and leaves the accept/reject decision to the caller.

use tracing::debug;

use super::csr::CsrMatrix;
use crate::config::SolverConfig;

/// Floor for the default iteration cap on very small systems.
const MIN_DEFAULT_ITERATIONS: usize = 100;

/// Outcome of one linear solve.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub solution: Vec<f64>,
    pub iterations: usize,
    /// Relative residual of the returned solution.
    pub residual: f64,
    pub converged: bool,
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Solve `A x = b` starting from `x = 0`.
pub fn bicgstab(a: &CsrMatrix, b: &[f64], config: &SolverConfig) -> SolveReport {
    let n = b.len();
    debug_assert_eq!(a.rows(), n);
    debug_assert_eq!(a.cols(), n);

    let max_iterations = config
        .max_iterations
        .unwrap_or((2 * n).max(MIN_DEFAULT_ITERATIONS))
        .max(1);
    let b_norm = dot(b, b).sqrt();
    if b_norm == 0.0 {
        return SolveReport {
            solution: vec![0.0; n],
            iterations: 0,
            residual: 0.0,
            converged: true,
        };
    }

    // Jacobi preconditioner; rows with an empty diagonal are left unscaled
    let inv_diag: Vec<f64> = a
        .diagonal()
        .into_iter()
        .map(|d| if d != 0.0 { 1.0 / d } else { 1.0 })
        .collect();

    let threshold = (config.tolerance * b_norm).powi(2);
    let restart_floor = f64::EPSILON * f64::EPSILON;

    let mut x = vec![0.0; n];
    let mut r = b.to_vec();
    let mut r_hat = r.clone();
    let mut r0_sqnorm = dot(&r, &r);
    let mut rho = 1.0;
    let mut alpha = 1.0;
    let mut omega = 1.0;
    let mut v = vec![0.0; n];
    let mut p = vec![0.0; n];
    let mut y = vec![0.0; n];
    let mut z = vec![0.0; n];
    let mut s = vec![0.0; n];
    let mut t = vec![0.0; n];
    let mut iterations = 0;
    let mut restarts = 0;

    while dot(&r, &r) > threshold && iterations < max_iterations {
        let rho_old = rho;
        rho = dot(&r_hat, &r);

        if rho.abs() < restart_floor * r0_sqnorm {
            // shadow residual became orthogonal: restart from the current iterate
            let ax = a.matvec(&x);
            for i in 0..n {
                r[i] = b[i] - ax[i];
            }
            r_hat.copy_from_slice(&r);
            rho = dot(&r, &r);
            r0_sqnorm = rho;
            p.fill(0.0);
            v.fill(0.0);
            restarts += 1;
            if rho == 0.0 {
                break;
            }
        }

        let beta = (rho / rho_old) * (alpha / omega);
        for i in 0..n {
            p[i] = r[i] + beta * (p[i] - omega * v[i]);
            y[i] = inv_diag[i] * p[i];
        }
        a.matvec_into(&y, &mut v);

        let denom = dot(&r_hat, &v);
        if denom == 0.0 || !denom.is_finite() {
            debug!(iterations, "BiCGSTAB breakdown: r_hat orthogonal to A·p");
            break;
        }
        alpha = rho / denom;

        for i in 0..n {
            s[i] = r[i] - alpha * v[i];
            z[i] = inv_diag[i] * s[i];
        }
        a.matvec_into(&z, &mut t);

        let tt = dot(&t, &t);
        omega = if tt > 0.0 { dot(&t, &s) / tt } else { 0.0 };

        for i in 0..n {
            x[i] += alpha * y[i] + omega * z[i];
            r[i] = s[i] - omega * t[i];
        }
        iterations += 1;

        if omega == 0.0 {
            // s is already (numerically) zero or the step stagnated
            break;
        }
    }

    let residual = a.residual_norm(&x, b) / b_norm;
    let converged = residual.is_finite() && residual <= config.tolerance;
    debug!(
        iterations,
        restarts,
        residual,
        converged,
        "BiCGSTAB finished (dim {})",
        n
    );

    SolveReport {
        solution: x,
        iterations,
        residual,
        converged,
    }
}
