//! linear algebra: dense linear systems solved by Gaussian elimination
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// Gaussian elimination with zero-avoidance (or partial) pivoting and back-substitution
pub mod gauss_elimination;
/// task-file front-end: settings, system and postprocessing from a text document
pub mod gauss_task;
/// diagnostics for linear systems and matrices: if it is singular
/// or poorly conditioned, residuals of a solution
pub mod linear_sys_diagnostics;
