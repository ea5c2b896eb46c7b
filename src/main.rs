#![allow(non_snake_case)]
use RustedGauss::Examples::gauss_examples::gauss_examples;
use RustedGauss::Utils::logger::solution_lines;
use RustedGauss::Utils::system_reader::{
    ReaderError, coefficient_count, parse_numbers, system_from_values, system_size,
};
use RustedGauss::somelinalg::gauss_elimination::solve_augmented;
use RustedGauss::somelinalg::gauss_task::{GaussTask, create_template_file};
use nalgebra::DMatrix;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

const USAGE: &str = "usage: RustedGauss [<task file> | --example <k> | --template [<path>]]
without arguments the system is read from the console";

/// reads lines until at least `count` numbers are collected
fn read_numbers(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    count: usize,
) -> Result<Vec<f64>, ReaderError> {
    let mut values = Vec::new();
    while values.len() < count {
        let Some(line) = lines.next() else {
            return Err(ReaderError::NotEnoughValues {
                expected: count,
                got: values.len(),
            });
        };
        values.extend(parse_numbers(&line?)?);
    }
    Ok(values)
}

/// console mode: number of equations, then coefficients row by row
fn interactive() -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("number of equations: ");
    io::stdout().flush()?;
    let first = read_numbers(&mut lines, 1)?;
    let n = system_size(first[0])?;

    println!("enter coeffs: ");
    io::stdout().flush()?;
    // the rest of the first line may already contain coefficients
    let mut values: Vec<f64> = first[1..].to_vec();
    let missing = coefficient_count(n)?.saturating_sub(values.len());
    values.extend(read_numbers(&mut lines, missing)?);
    let Ab: DMatrix<f64> = system_from_values(n, &values)?;

    let x = solve_augmented(&Ab)?;
    println!("Solution: ");
    println!("{}", solution_lines(&x));
    Ok(())
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    match args {
        [] => interactive(),
        [flag, k] if flag == "--example" => {
            let example: usize = k.parse()?;
            gauss_examples(example);
            Ok(())
        }
        [flag] if flag == "--template" => Ok(create_template_file(None)?),
        [flag, path] if flag == "--template" => Ok(create_template_file(Some(path.into()))?),
        [flag] if flag == "--help" || flag == "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        [path] => {
            let mut task = GaussTask::from_file(path)?;
            let x = task.run()?;
            println!("Solution: ");
            println!("{}", solution_lines(&x));
            Ok(())
        }
        _ => Err(USAGE.into()),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
