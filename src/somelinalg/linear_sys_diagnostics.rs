// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
//! diagnostics for linear systems: is the system consistent, is it singular or
//! poorly conditioned, how well does a computed solution satisfy the equations
use log::{info, warn};
use nalgebra::{DMatrix, DVector, stack};

/// split augmented matrix [A | b] into A and b
pub fn split_augmented(augmented: &DMatrix<f64>) -> (DMatrix<f64>, DVector<f64>) {
    let n = augmented.ncols() - 1;
    let A = augmented.columns(0, n).into_owned();
    let b = augmented.column(n).into_owned();
    (A, b)
}

/// r = A*x - b
pub fn residuals(A: &DMatrix<f64>, b: &DVector<f64>, x: &DVector<f64>) -> DVector<f64> {
    A * x - b
}

/// max_i |(A*x - b)_i| / max(|b_i|, sum_j |A_ij * x_j|, 1)
pub fn max_relative_residual(A: &DMatrix<f64>, b: &DVector<f64>, x: &DVector<f64>) -> f64 {
    let r = residuals(A, b, x);
    let mut max_rel: f64 = 0.0;
    for i in 0..A.nrows() {
        let row_scale: f64 = (0..A.ncols()).map(|j| (A[(i, j)] * x[j]).abs()).sum();
        let scale = b[i].abs().max(row_scale).max(1.0);
        max_rel = max_rel.max(r[i].abs() / scale);
    }
    max_rel
}

/// In mathematics, the Rouché–Capelli theorem gives a necessary and sufficient condition for a system of
/// linear equations to have a solution: Ax = b is solvable if and only if rank(A) == rank([A b]).
pub fn Rouche_Capelli_theorem(A: &DMatrix<f64>, b: &DVector<f64>) -> bool {
    let Ab: DMatrix<f64> = stack![A, b];
    let eps = 1e-10 * A.amax().max(1.0);
    let rank_A = A.rank(eps);
    let rank_Ab = Ab.rank(eps);

    let result = rank_A == rank_Ab;
    if !result {
        warn!(
            "The system has no solution. rank(A) = {} != rank([A b]) = {}",
            rank_A, rank_Ab
        );
    }
    result
}

pub fn is_singular(A: &DMatrix<f64>, epsilon: f64) -> bool {
    let det = A.determinant();
    let is_singular = det.abs() < epsilon;
    if is_singular {
        warn!("Matrix is singular. Determinant = {:.8}", det);
    }
    is_singular
}

/// ratio of the largest singular value to the smallest one
pub fn condition_number(A: &DMatrix<f64>) -> f64 {
    let singular_values = A.singular_values();
    let max_sigma = singular_values.max();
    let min_sigma = singular_values.min();
    if min_sigma == 0.0 {
        f64::INFINITY
    } else {
        max_sigma / min_sigma
    }
}

pub fn poorly_conditioned(A: &DMatrix<f64>, threshold: f64) -> bool {
    let cond = condition_number(A);
    let poorly_conditioned = cond > threshold;
    if poorly_conditioned {
        warn!(
            "The system of linear equations is poorly conditioned. Condition number = {:.2e}",
            cond
        );
    }
    poorly_conditioned
}

/// true if the system has a solution and is not poorly conditioned
pub fn linear_system_diagnostics(A: &DMatrix<f64>, b: &DVector<f64>, threshold: f64) -> bool {
    let consistent = Rouche_Capelli_theorem(A, b);
    let bad_conditioning = poorly_conditioned(A, threshold);
    match (consistent, bad_conditioning) {
        (true, false) => {
            info!("The system of linear equations is consistent and well conditioned.");
            true
        }
        (true, true) => {
            warn!(
                "The system of linear equations has a solution and the coefficient matrix is poorly conditioned."
            );
            false
        }
        (false, _) => {
            warn!("The system of linear equations does not have a solution.");
            false
        }
    }
}

/// famous example of ill-conditioned matrix
pub fn hilbert_matrix(n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| 1.0 / (i as f64 + j as f64 + 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::somelinalg::gauss_elimination::{GaussElimination, PivotStrategy};
    use approx::relative_eq;

    #[test]
    fn test_split_augmented() {
        let Ab = DMatrix::from_row_slice(2, 3, &[2.0, 1.0, 5.0, 1.0, 3.0, 10.0]);
        let (A, b) = split_augmented(&Ab);
        assert_eq!(A, DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]));
        assert_eq!(b, DVector::from_vec(vec![5.0, 10.0]));
    }

    #[test]
    fn test_residuals_of_exact_solution() {
        let A = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![5.0, 10.0]);
        let x = DVector::from_vec(vec![1.0, 3.0]);
        assert_eq!(residuals(&A, &b, &x), DVector::zeros(2));
        assert_eq!(max_relative_residual(&A, &b, &x), 0.0);
    }

    #[test]
    fn test_Rouche_Capelli_theorem() {
        // example https://en.wikipedia.org/wiki/Rouché–Capelli_theorem
        let A = DMatrix::from_vec(3, 3, vec![1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 2.0, 1.0, 2.0]);
        let b = DVector::from_vec(vec![3.0, 1.0, 5.0]);
        assert!(!Rouche_Capelli_theorem(&A, &b));
        let b = DVector::from_vec(vec![3.0, 3.0, 6.0]);
        assert!(Rouche_Capelli_theorem(&A, &b));
    }

    #[test]
    fn test_poorly_conditioned() {
        let A = DMatrix::from_vec(2, 2, vec![1.0, 1.0, 1.00001, 1.0]);
        assert!(poorly_conditioned(&A, 1e5));
        assert!(!poorly_conditioned(&DMatrix::identity(3, 3), 1e5));
    }

    #[test]
    fn test_poorly_conditioned_hilbert() {
        let A = hilbert_matrix(6);
        assert!(relative_eq!(A[(1, 2)], 0.25));
        assert!(poorly_conditioned(&A, 1e5));
    }

    #[test]
    fn test_is_singular() {
        let A = DMatrix::from_vec(2, 2, vec![1.0, 1.0, 1.00001, 1.0]);
        assert!(is_singular(&A, 1e-4));
        assert!(!is_singular(&DMatrix::identity(2, 2), 1e-4));
    }

    #[test]
    fn test_singular_condition_number_is_huge() {
        let A = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert!(condition_number(&A) > 1e14);
    }

    #[test]
    fn solve_hilbert_with_both_strategies() {
        // x = (1, ..., 1), b = row sums of H
        let n = 6;
        let A = hilbert_matrix(n);
        let b = &A * DVector::from_element(n, 1.0);
        assert!(!linear_system_diagnostics(&A, &b, 1e5));
        for strategy in [PivotStrategy::ZeroAvoidance, PivotStrategy::Partial] {
            let x = GaussElimination::new()
                .with_pivoting(strategy)
                .solve_system(&A, &b)
                .unwrap();
            assert!(max_relative_residual(&A, &b, &x) < 1e-9);
            for xi in x.iter() {
                assert!(relative_eq!(*xi, 1.0, epsilon = 1e-4));
            }
        }
    }
}
