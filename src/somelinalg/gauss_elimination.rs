// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
//! # Gaussian elimination for dense linear systems
//!
//! Solves A*x = b given as augmented matrix [A | b] with n rows and n+1 columns.
//! Forward elimination brings the matrix to row-echelon form, back-substitution
//! recovers the solution vector from the last unknown to the first.
//!
//! ## Pivoting
//! - `PivotStrategy::ZeroAvoidance` (default): rows are swapped only when the diagonal
//!   element is zero; the first row below with a nonzero element in the pivot column is taken.
//!   This is NOT partial pivoting in the numerical-stability sense.
//! - `PivotStrategy::Partial`: the row with the largest element (in absolute value) of the
//!   pivot column is taken. More robust for ill-conditioned systems, may give slightly
//!   different rounding than the default.
//!
//! ## Singular systems
//! - `SingularPolicy::Strict` (default): a pivot that is still zero (or below
//!   `tolerance * max_j |A_rj|`, r being the row the pivot stands in) after the row search is
//!   reported as `GaussError::SingularSystem`. Entries that are NaN or infinite are rejected
//!   before elimination, and a solution that overflowed during elimination is rejected with
//!   `GaussError::NonFiniteResult`.
//! - `SingularPolicy::Permissive`: compatibility mode. Only exact zero pivots trigger the row
//!   search and a missing replacement row is ignored, so the solution may contain inf/NaN.
//!
//! Matrix dimensions are validated in both modes.
//!
//! ## Example
//! ```
//! use RustedGauss::somelinalg::gauss_elimination::GaussElimination;
//! use nalgebra::DMatrix;
//! // 2x + y = 5
//! // x + 3y = 10
//! let Ab = DMatrix::from_row_slice(2, 3, &[2.0, 1.0, 5.0, 1.0, 3.0, 10.0]);
//! let x = GaussElimination::new().solve(&Ab).unwrap();
//! assert!((x[0] - 1.0).abs() < 1e-12);
//! assert!((x[1] - 3.0).abs() < 1e-12);
//! ```
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// how the pivot row is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum PivotStrategy {
    /// swap only if the pivot is zero, take the first suitable row below
    #[default]
    #[strum(to_string = "ZeroAvoidance", serialize = "zero_avoidance")]
    ZeroAvoidance,
    /// take the row with max |A[j][i]|, j >= i
    Partial,
}

/// what to do when no usable pivot exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum SingularPolicy {
    #[default]
    Strict,
    Permissive,
}

/// Error types for Gaussian elimination
#[derive(Debug, Clone, PartialEq)]
pub enum GaussError {
    /// matrix has no rows
    EmptySystem,
    /// augmented matrix must have n rows and n+1 columns
    DimensionMismatch { rows: usize, cols: usize },
    /// right-hand side length differs from the number of equations
    RhsLengthMismatch { expected: usize, got: usize },
    /// NaN or infinity found in the input
    NonFiniteInput { row: usize, col: usize },
    /// no usable pivot in this column
    SingularSystem { column: usize, pivot: f64 },
    /// finite input, but elimination overflowed and the unknown is inf or NaN
    NonFiniteResult { index: usize },
}

impl fmt::Display for GaussError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GaussError::EmptySystem => write!(f, "System of equations is empty"),
            GaussError::DimensionMismatch { rows, cols } => write!(
                f,
                "Augmented matrix must be n x (n+1), got {} x {}",
                rows, cols
            ),
            GaussError::RhsLengthMismatch { expected, got } => write!(
                f,
                "Right-hand side must have {} elements, got {}",
                expected, got
            ),
            GaussError::NonFiniteInput { row, col } => {
                write!(f, "Non-finite coefficient at ({}, {})", row, col)
            }
            GaussError::SingularSystem { column, pivot } => write!(
                f,
                "System is singular or nearly singular: no usable pivot in column {} (pivot = {:e})",
                column, pivot
            ),
            GaussError::NonFiniteResult { index } => write!(
                f,
                "Overflow during elimination: unknown {} is not finite",
                index
            ),
        }
    }
}

impl std::error::Error for GaussError {}

/// Result of an in-place solve with some statistics
#[derive(Debug, Clone)]
pub struct GaussReport {
    pub solution: DVector<f64>,
    /// number of row interchanges made during elimination
    pub row_swaps: usize,
    /// smallest |pivot| met on the diagonal
    pub min_pivot: f64,
}

/// Gaussian elimination solver settings
#[derive(Debug, Clone, PartialEq)]
pub struct GaussElimination {
    pub pivoting: PivotStrategy,
    pub singular_policy: SingularPolicy,
    /// relative tolerance: pivots with |p| <= tolerance * (max |coefficient| of the pivot row)
    /// count as zero (Strict only)
    pub tolerance: f64,
}

impl Default for GaussElimination {
    fn default() -> Self {
        GaussElimination {
            pivoting: PivotStrategy::ZeroAvoidance,
            singular_policy: SingularPolicy::Strict,
            tolerance: 1e-12,
        }
    }
}

impl GaussElimination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pivoting(mut self, pivoting: PivotStrategy) -> Self {
        self.pivoting = pivoting;
        self
    }

    pub fn with_singular_policy(mut self, policy: SingularPolicy) -> Self {
        self.singular_policy = policy;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Solve the system given as augmented matrix [A | b].
    /// The input is not modified: elimination runs on an owned copy.
    pub fn solve(&self, augmented: &DMatrix<f64>) -> Result<DVector<f64>, GaussError> {
        let mut Ab = augmented.clone();
        self.solve_in_place(&mut Ab).map(|report| report.solution)
    }

    /// Solve A*x = b with A and b passed separately.
    pub fn solve_system(
        &self,
        A: &DMatrix<f64>,
        b: &DVector<f64>,
    ) -> Result<DVector<f64>, GaussError> {
        let n = A.nrows();
        if b.len() != n {
            return Err(GaussError::RhsLengthMismatch {
                expected: n,
                got: b.len(),
            });
        }
        let mut Ab = A.clone().insert_column(A.ncols(), 0.0);
        Ab.set_column(A.ncols(), b);
        self.solve(&Ab)
    }

    /// Destructive solve: on return `augmented` holds the row-echelon form
    /// (rows possibly interchanged).
    pub fn solve_in_place(&self, augmented: &mut DMatrix<f64>) -> Result<GaussReport, GaussError> {
        validate_dimensions(augmented)?;
        if self.singular_policy == SingularPolicy::Strict {
            validate_finite(augmented)?;
        }
        let (row_swaps, min_pivot) = self.eliminate(augmented)?;
        let solution = back_substitution(augmented);
        if self.singular_policy == SingularPolicy::Strict {
            if let Some(index) = solution.iter().position(|v| !v.is_finite()) {
                return Err(GaussError::NonFiniteResult { index });
            }
        }
        info!(
            "system of {} equations solved, {} row swaps, min |pivot| = {:e}",
            augmented.nrows(),
            row_swaps,
            min_pivot
        );
        Ok(GaussReport {
            solution,
            row_swaps,
            min_pivot,
        })
    }

    /// Solve a batch of independent systems in parallel.
    pub fn solve_many(&self, systems: &[DMatrix<f64>]) -> Vec<Result<DVector<f64>, GaussError>> {
        systems.par_iter().map(|Ab| self.solve(Ab)).collect()
    }

    // per-row thresholds below which a pivot standing in that row is treated as zero;
    // they travel with the rows on every swap
    fn zero_thresholds(&self, Ab: &DMatrix<f64>) -> Vec<f64> {
        let n = Ab.nrows();
        match self.singular_policy {
            SingularPolicy::Permissive => vec![0.0; n],
            SingularPolicy::Strict => (0..n)
                .map(|r| self.tolerance * Ab.view((r, 0), (1, n)).amax())
                .collect(),
        }
    }

    /// forward elimination, returns (number of swaps, min |pivot|)
    fn eliminate(&self, Ab: &mut DMatrix<f64>) -> Result<(usize, f64), GaussError> {
        let n = Ab.nrows();
        let mut thresholds = self.zero_thresholds(Ab);
        let mut row_swaps = 0;
        let mut min_pivot = f64::INFINITY;

        for i in 0..n {
            let candidate = match self.pivoting {
                PivotStrategy::ZeroAvoidance => {
                    if Ab[(i, i)].abs() <= thresholds[i] {
                        (i + 1..n).find(|&j| Ab[(j, i)].abs() > thresholds[j])
                    } else {
                        None
                    }
                }
                PivotStrategy::Partial => {
                    let mut best = i;
                    for j in i + 1..n {
                        if Ab[(j, i)].abs() > Ab[(best, i)].abs() {
                            best = j;
                        }
                    }
                    if best != i { Some(best) } else { None }
                }
            };
            if let Some(j) = candidate {
                debug!("column {}: swapping rows {} and {}", i, i, j);
                Ab.swap_rows(i, j);
                thresholds.swap(i, j);
                row_swaps += 1;
            }

            let pivot = Ab[(i, i)];
            if pivot.abs() <= thresholds[i] {
                match self.singular_policy {
                    SingularPolicy::Strict => {
                        return Err(GaussError::SingularSystem { column: i, pivot });
                    }
                    SingularPolicy::Permissive => {
                        warn!(
                            "no nonzero pivot in column {}, solution will contain inf or NaN",
                            i
                        );
                    }
                }
            }
            debug!("column {}: pivot = {}", i, pivot);
            min_pivot = min_pivot.min(pivot.abs());
            eliminate_below(Ab, i);
        }
        Ok((row_swaps, min_pivot))
    }
}

/// Solve augmented system with default settings (zero-avoidance pivoting, strict singularity check).
pub fn solve_augmented(augmented: &DMatrix<f64>) -> Result<DVector<f64>, GaussError> {
    GaussElimination::new().solve(augmented)
}

/// Forward elimination with default settings, leaves `augmented` in row-echelon form.
/// Returns number of row swaps.
pub fn forward_elimination(augmented: &mut DMatrix<f64>) -> Result<usize, GaussError> {
    validate_dimensions(augmented)?;
    let solver = GaussElimination::new();
    validate_finite(augmented)?;
    solver.eliminate(augmented).map(|(swaps, _)| swaps)
}

/// Back-substitution on a matrix already in row-echelon form.
/// Division by the diagonal is not guarded.
pub fn back_substitution(echelon: &DMatrix<f64>) -> DVector<f64> {
    let n = echelon.nrows();
    let mut X = DVector::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in i + 1..n {
            sum += echelon[(i, j)] * X[j];
        }
        X[i] = (echelon[(i, n)] - sum) / echelon[(i, i)];
    }
    X
}

// row_k -= A[k][i]/A[i][i] * row_i for all k below i, across all n+1 columns
fn eliminate_below(Ab: &mut DMatrix<f64>, i: usize) {
    let (n, m) = Ab.shape();
    let pivot = Ab[(i, i)];
    for k in i + 1..n {
        let ratio = Ab[(k, i)] / pivot;
        for j in 0..m {
            Ab[(k, j)] -= ratio * Ab[(i, j)];
        }
        if ratio.is_finite() {
            // rounding may leave a tiny residue
            Ab[(k, i)] = 0.0;
        }
    }
}

fn validate_dimensions(Ab: &DMatrix<f64>) -> Result<(), GaussError> {
    let (rows, cols) = Ab.shape();
    if rows == 0 {
        return Err(GaussError::EmptySystem);
    }
    if cols != rows + 1 {
        return Err(GaussError::DimensionMismatch { rows, cols });
    }
    Ok(())
}

fn validate_finite(Ab: &DMatrix<f64>) -> Result<(), GaussError> {
    for i in 0..Ab.nrows() {
        for j in 0..Ab.ncols() {
            if !Ab[(i, j)].is_finite() {
                return Err(GaussError::NonFiniteInput { row: i, col: j });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_2x2() {
        // 2x + y = 5, x + 3y = 10
        let Ab = DMatrix::from_row_slice(2, 3, &[2.0, 1.0, 5.0, 1.0, 3.0, 10.0]);
        let x = solve_augmented(&Ab).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_equation() {
        let Ab = DMatrix::from_row_slice(1, 2, &[4.0, 3.0]);
        let x = solve_augmented(&Ab).unwrap();
        assert_eq!(x[0], 3.0 / 4.0);
    }

    #[test]
    fn test_row_interchange() {
        // 0x + 2y = 4, 3x + y = 5
        let Ab = DMatrix::from_row_slice(2, 3, &[0.0, 2.0, 4.0, 3.0, 1.0, 5.0]);
        let mut work = Ab.clone();
        let report = GaussElimination::new().solve_in_place(&mut work).unwrap();
        assert_eq!(report.row_swaps, 1);
        assert_relative_eq!(report.solution[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.solution[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_first_nonzero_row_is_taken() {
        // column 0 is zero in row 0, nonzero in rows 1 and 2: row 1 must be swapped in
        let Ab = DMatrix::from_row_slice(
            3,
            4,
            &[0.0, 1.0, 1.0, 2.0, 1.0, 1.0, 0.0, 2.0, 5.0, 0.0, 1.0, 6.0],
        );
        let mut work = Ab.clone();
        let report = GaussElimination::new().solve_in_place(&mut work).unwrap();
        assert_eq!(work.row(0), Ab.row(1));
        assert_relative_eq!(report.solution[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.solution[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.solution[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_input_is_not_modified() {
        let Ab = DMatrix::from_row_slice(2, 3, &[0.0, 2.0, 4.0, 3.0, 1.0, 5.0]);
        let copy = Ab.clone();
        let _ = GaussElimination::new().solve(&Ab).unwrap();
        assert_eq!(Ab, copy);
    }

    #[test]
    fn test_in_place_leaves_echelon_form() {
        let mut Ab = DMatrix::from_row_slice(
            3,
            4,
            &[2.0, 1.0, -1.0, 8.0, -3.0, -1.0, 2.0, -11.0, -2.0, 1.0, 2.0, -3.0],
        );
        let report = GaussElimination::new().solve_in_place(&mut Ab).unwrap();
        for i in 0..3 {
            for j in 0..i {
                assert_eq!(Ab[(i, j)], 0.0);
            }
        }
        assert_relative_eq!(report.solution[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(report.solution[1], 3.0, epsilon = 1e-12);
        assert_relative_eq!(report.solution[2], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_strict() {
        // 0x + 0y = 1
        let Ab = DMatrix::from_row_slice(2, 3, &[0.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let res = GaussElimination::new().solve(&Ab);
        match res {
            Err(GaussError::SingularSystem { column, .. }) => assert_eq!(column, 1),
            other => panic!("expected SingularSystem, got {:?}", other),
        }
    }

    #[test]
    fn test_singular_permissive_propagates_non_finite() {
        let Ab = DMatrix::from_row_slice(2, 3, &[0.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let x = GaussElimination::new()
            .with_singular_policy(SingularPolicy::Permissive)
            .solve(&Ab)
            .unwrap();
        assert!(x.iter().any(|v| !v.is_finite()));
        assert!(x[1].is_infinite());
    }

    #[test]
    fn test_dependent_rows_strict() {
        let Ab = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0]);
        assert!(matches!(
            GaussElimination::new().solve(&Ab),
            Err(GaussError::SingularSystem { column: 1, .. })
        ));
    }

    #[test]
    fn test_row_scaled_system_is_not_singular() {
        // 1e-13 x = 1e-13, y = 1: tiny row, but a regular system
        let Ab = DMatrix::from_row_slice(2, 3, &[1e-13, 0.0, 1e-13, 0.0, 1.0, 1.0]);
        let x = solve_augmented(&Ab).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);

        // rows spanning 30 orders of magnitude
        let scales = [1e-15, 1.0, 1e15];
        let mut Ab = DMatrix::zeros(3, 4);
        for (i, s) in scales.iter().enumerate() {
            Ab[(i, i)] = *s;
            Ab[(i, 3)] = (i + 1) as f64 * s;
        }
        Ab[(0, 1)] = 1e-16;
        for pivoting in [PivotStrategy::ZeroAvoidance, PivotStrategy::Partial] {
            let x = GaussElimination::new().with_pivoting(pivoting).solve(&Ab).unwrap();
            assert_relative_eq!(x[0], 1.0 - 0.2, epsilon = 1e-10);
            assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
            assert_relative_eq!(x[2], 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_overflow_in_elimination_strict() {
        // finite input, 1e308 + 1e308 overflows in the right-hand side of row 1
        let Ab = DMatrix::from_row_slice(2, 3, &[1.0, 1.0, 1e308, -1.0, 1.0, 1e308]);
        let res = solve_augmented(&Ab);
        assert!(matches!(res, Err(GaussError::NonFiniteResult { .. })));
        assert!(res.unwrap_err().to_string().contains("not finite"));

        let x = GaussElimination::new()
            .with_singular_policy(SingularPolicy::Permissive)
            .solve(&Ab)
            .unwrap();
        assert!(x[1].is_infinite());
    }

    #[test]
    fn test_dimension_checks() {
        let empty = DMatrix::<f64>::zeros(0, 1);
        assert_eq!(solve_augmented(&empty), Err(GaussError::EmptySystem));
        let square = DMatrix::<f64>::identity(3, 3);
        assert_eq!(
            solve_augmented(&square),
            Err(GaussError::DimensionMismatch { rows: 3, cols: 3 })
        );
        let permissive = GaussElimination::new().with_singular_policy(SingularPolicy::Permissive);
        assert!(permissive.solve(&square).is_err());
    }

    #[test]
    fn test_non_finite_input() {
        let Ab = DMatrix::from_row_slice(2, 3, &[1.0, f64::NAN, 1.0, 1.0, 1.0, 2.0]);
        assert_eq!(
            solve_augmented(&Ab),
            Err(GaussError::NonFiniteInput { row: 0, col: 1 })
        );
        let x = GaussElimination::new()
            .with_singular_policy(SingularPolicy::Permissive)
            .solve(&Ab)
            .unwrap();
        assert!(x.iter().any(|v| v.is_nan()));
    }

    #[test]
    fn test_solve_system_split_form() {
        let A = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![5.0, 10.0]);
        let x = GaussElimination::new().solve_system(&A, &b).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-12);
        let short = DVector::from_vec(vec![5.0]);
        assert_eq!(
            GaussElimination::new().solve_system(&A, &short),
            Err(GaussError::RhsLengthMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_partial_pivoting_picks_largest() {
        let mut Ab = DMatrix::from_row_slice(
            3,
            4,
            &[1.0, 1.0, 1.0, 6.0, 2.0, 1.0, -1.0, 1.0, 4.0, -1.0, 1.0, 5.0],
        );
        let report = GaussElimination::new()
            .with_pivoting(PivotStrategy::Partial)
            .solve_in_place(&mut Ab)
            .unwrap();
        assert_eq!(Ab[(0, 0)], 4.0);
        assert!(report.row_swaps >= 1);
    }

    #[test]
    fn test_error_display() {
        let e = GaussError::SingularSystem {
            column: 2,
            pivot: 0.0,
        };
        assert!(e.to_string().contains("column 2"));
        let e = GaussError::DimensionMismatch { rows: 2, cols: 2 };
        assert_eq!(e.to_string(), "Augmented matrix must be n x (n+1), got 2 x 2");
    }

    #[test]
    fn test_parse_enums() {
        use std::str::FromStr;
        assert_eq!(
            PivotStrategy::from_str("partial").unwrap(),
            PivotStrategy::Partial
        );
        assert_eq!(
            PivotStrategy::from_str("zero_avoidance").unwrap(),
            PivotStrategy::ZeroAvoidance
        );
        assert_eq!(
            SingularPolicy::from_str("permissive").unwrap(),
            SingularPolicy::Permissive
        );
        assert!(SingularPolicy::from_str("lenient").is_err());
    }
}
