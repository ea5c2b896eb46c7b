//! reader for the plain input format of a linear system:
//! number of equations n followed by n*(n+1) coefficients of the augmented matrix, row by row.
//! Tokens may be separated by whitespace, commas or semicolons.
//! ```text
//! 2
//! 2 1 5
//! 1 3 10
//! ```
use nalgebra::DMatrix;
use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::multispace0,
    multi::separated_list0,
    number::complete::double,
    sequence::preceded,
};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub enum ReaderError {
    /// number of equations must be a positive integer
    InvalidSize(f64),
    NotEnoughValues { expected: usize, got: usize },
    /// something left after the last coefficient
    TrailingInput(String),
    Parse(String),
    Io(std::io::Error),
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReaderError::InvalidSize(n) => {
                write!(f, "Number of equations must be a positive integer, got {}", n)
            }
            ReaderError::NotEnoughValues { expected, got } => write!(
                f,
                "Expected {} coefficients of the augmented matrix, got {}",
                expected, got
            ),
            ReaderError::TrailingInput(rest) => write!(f, "Unexpected input: '{}'", rest),
            ReaderError::Parse(msg) => write!(f, "Parsing error: {}", msg),
            ReaderError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ReaderError {}

impl From<std::io::Error> for ReaderError {
    fn from(e: std::io::Error) -> Self {
        ReaderError::Io(e)
    }
}

fn separator(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_whitespace() || c == ',' || c == ';').parse(input)
}

fn number_list(input: &str) -> IResult<&str, Vec<f64>> {
    let mut parser = preceded(multispace0, separated_list0(separator, double));
    parser.parse(input)
}

/// Parses all numbers of a string, fails on anything that is not a number
pub fn parse_numbers(input: &str) -> Result<Vec<f64>, ReaderError> {
    let (remaining, values) =
        number_list(input).map_err(|e| ReaderError::Parse(format!("{:?}", e)))?;
    let remaining = remaining.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == ';');
    if !remaining.is_empty() {
        return Err(ReaderError::TrailingInput(remaining.to_string()));
    }
    Ok(values)
}

/// number of equations from the first token
pub fn system_size(value: f64) -> Result<usize, ReaderError> {
    if value >= 1.0 && value.fract() == 0.0 && value <= usize::MAX as f64 {
        Ok(value as usize)
    } else {
        Err(ReaderError::InvalidSize(value))
    }
}

/// number of coefficients n*(n+1) of the augmented matrix, error if it does not fit into usize
pub fn coefficient_count(n: usize) -> Result<usize, ReaderError> {
    n.checked_add(1)
        .and_then(|m| m.checked_mul(n))
        .ok_or(ReaderError::InvalidSize(n as f64))
}

/// Builds n x (n+1) augmented matrix from row-major coefficients
pub fn system_from_values(n: usize, values: &[f64]) -> Result<DMatrix<f64>, ReaderError> {
    let expected = coefficient_count(n)?;
    if values.len() < expected {
        return Err(ReaderError::NotEnoughValues {
            expected,
            got: values.len(),
        });
    }
    if values.len() > expected {
        let rest: Vec<String> = values[expected..].iter().map(|v| v.to_string()).collect();
        return Err(ReaderError::TrailingInput(rest.join(" ")));
    }
    Ok(DMatrix::from_row_slice(n, n + 1, values))
}

/// Parses "n a00 a01 ... a0n a10 ..." into augmented matrix
pub fn parse_system(input: &str) -> Result<DMatrix<f64>, ReaderError> {
    let values = parse_numbers(input)?;
    let Some((&first, coeffs)) = values.split_first() else {
        return Err(ReaderError::Parse("empty input".to_string()));
    };
    let n = system_size(first)?;
    system_from_values(n, coeffs)
}

pub fn read_system_from_file<P: AsRef<Path>>(path: P) -> Result<DMatrix<f64>, ReaderError> {
    let content = fs::read_to_string(path)?;
    parse_system(&content)
}
