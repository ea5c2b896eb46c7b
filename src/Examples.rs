//! examples of usage of RustedGauss
/// Gaussian elimination examples
pub mod gauss_examples;
