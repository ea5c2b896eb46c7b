// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::Utils::logger::solution_table;
use crate::somelinalg::gauss_elimination::{
    GaussElimination, PivotStrategy, SingularPolicy, solve_augmented,
};
use crate::somelinalg::gauss_task::{GaussTask, template};
use crate::somelinalg::linear_sys_diagnostics::{
    hilbert_matrix, max_relative_residual, split_augmented,
};
use nalgebra::{DMatrix, DVector};
use std::str::FromStr;

/// number of available examples
pub const N_EXAMPLES: usize = 6;

/// diagonally dominant n x (n+1) system with solution x_i = i + 1
pub fn diagonally_dominant_system(n: usize) -> DMatrix<f64> {
    let A = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            2.0 * n as f64
        } else {
            1.0 / (1.0 + (i as f64 - j as f64).abs())
        }
    });
    let x = DVector::from_fn(n, |i, _| (i + 1) as f64);
    let b = &A * x;
    let mut Ab = A.insert_column(n, 0.0);
    Ab.set_column(n, &b);
    Ab
}

/// runs example number `example`, returns solution (None if the example ends with an error)
pub fn gauss_examples(example: usize) -> Option<DVector<f64>> {
    match example {
        0 => {
            // 2x + y = 5
            // x + 3y = 10
            let Ab = DMatrix::from_row_slice(2, 3, &[2.0, 1.0, 5.0, 1.0, 3.0, 10.0]);
            let x = solve_augmented(&Ab).ok()?;
            println!("2x + y = 5, x + 3y = 10 \n {}", solution_table(&x));
            Some(x)
        }
        1 => {
            // zero on the diagonal: rows are interchanged
            // 0x + 2y = 4
            // 3x + y = 5
            let mut Ab = DMatrix::from_row_slice(2, 3, &[0.0, 2.0, 4.0, 3.0, 1.0, 5.0]);
            let report = GaussElimination::new().solve_in_place(&mut Ab).ok()?;
            println!(
                "row swaps: {}, echelon form: {} solution: \n {}",
                report.row_swaps,
                Ab,
                solution_table(&report.solution)
            );
            Some(report.solution)
        }
        2 => {
            // singular system: strict mode reports error, permissive one gives inf/NaN
            let Ab = DMatrix::from_row_slice(2, 3, &[0.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
            match GaussElimination::new().solve(&Ab) {
                Ok(x) => println!("unexpected solution {}", x),
                Err(e) => println!("strict mode: {}", e),
            }
            let x = GaussElimination::new()
                .with_singular_policy(SingularPolicy::Permissive)
                .solve(&Ab)
                .ok()?;
            println!("permissive mode: {}", solution_table(&x));
            Some(x)
        }
        3 => {
            // ill-conditioned Hilbert matrix, x = (1, ..., 1)
            let n = 8;
            let A = hilbert_matrix(n);
            let b = &A * DVector::from_element(n, 1.0);
            let mut last = None;
            for strategy in [PivotStrategy::ZeroAvoidance, PivotStrategy::Partial] {
                let x = GaussElimination::new()
                    .with_pivoting(strategy)
                    .solve_system(&A, &b)
                    .ok()?;
                let error = (&x - DVector::from_element(n, 1.0)).amax();
                println!(
                    "{}: max error {:e}, max relative residual {:e}",
                    strategy,
                    error,
                    max_relative_residual(&A, &b, &x)
                );
                last = Some(x);
            }
            last
        }
        4 => {
            // batch of independent systems solved in parallel
            let systems: Vec<DMatrix<f64>> = (1..=50).map(diagonally_dominant_system).collect();
            let solutions = GaussElimination::new().solve_many(&systems);
            let mut worst: f64 = 0.0;
            for (Ab, x) in systems.iter().zip(solutions.iter()) {
                let x = x.as_ref().ok()?;
                let (A, b) = split_augmented(Ab);
                worst = worst.max(max_relative_residual(&A, &b, x));
            }
            println!("{} systems solved, worst relative residual {:e}", systems.len(), worst);
            solutions.last().and_then(|x| x.as_ref().ok().cloned())
        }
        5 => {
            // task given as a string
            let mut task = GaussTask::from_str(template()).ok()?;
            task.run().ok()
        }
        _ => {
            println!("no example with number {}", example);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_diagonally_dominant_system() {
        let Ab = diagonally_dominant_system(5);
        let x = solve_augmented(&Ab).unwrap();
        for i in 0..5 {
            assert_relative_eq!(x[i], (i + 1) as f64, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_examples() {
        let x = gauss_examples(0).unwrap();
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-12);
        let x = gauss_examples(1).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        let x = gauss_examples(2).unwrap();
        assert!(!x[1].is_finite());
        assert!(gauss_examples(3).is_some());
        assert_eq!(gauss_examples(4).unwrap().len(), 50);
        assert!(gauss_examples(N_EXAMPLES).is_none());
    }
}
