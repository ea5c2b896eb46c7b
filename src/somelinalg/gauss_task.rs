// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
//! # Gauss task
//!
//! File/string driven front-end of the Gaussian elimination solver: solver settings,
//! the system itself and postprocessing options are read from a task document
//! (see `Utils::task_parser` for the format), the system is solved with logging and the
//! requested postprocessing (table, diagnostics, txt/csv output) is done.
//!
//! ## Task structure
//! ### solver_settings section (optional)
//! - `pivoting`: ZeroAvoidance (default) or Partial
//! - `singular_policy`: Strict (default) or Permissive
//! - `tolerance`: relative pivot tolerance, default 1e-12
//! - `loglevel`: off/none, error, warn, info (default), debug
//! - `save_log`: write log into log_<date>.txt, default false
//! ### system section
//! - `n`: number of equations, and rows `row0` ... `row{n-1}`, each with n+1 values, or
//! - `file`: path to a file with the plain format "n a00 a01 ... "
//! ### postprocessing section (optional)
//! - `print_table`, `diagnostics`, `save`, `save_to_csv` (booleans, default false),
//!   `filename` (default "solution"), `condition_threshold` (default 1e12)
//!
//! Common alternative names of sections are accepted: "settings", "solve_settings" for
//! solver_settings, "equations", "matrix" for system, "postprocess", "output" for postprocessing.
use crate::Utils::logger::{
    init_logger, parse_loglevel, save_solution_to_csv, save_solution_to_file, solution_table,
    timestamped_log_name,
};
use crate::Utils::system_reader::{
    ReaderError, coefficient_count, read_system_from_file, system_from_values, system_size,
};
use crate::Utils::task_parser::{DocumentMap, SectionMap, Value, parse_document_as};
use crate::somelinalg::gauss_elimination::{
    GaussElimination, GaussError, PivotStrategy, SingularPolicy,
};
use crate::somelinalg::linear_sys_diagnostics::{
    linear_system_diagnostics, max_relative_residual, split_augmented,
};
use log::{error, info};
use nalgebra::{DMatrix, DVector};
use simplelog::LevelFilter;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

#[derive(Debug)]
pub enum TaskError {
    Parse(String),
    MissingKey { section: String, key: String },
    InvalidValue { key: String, value: String },
    Reader(ReaderError),
    Solver(GaussError),
    Io(std::io::Error),
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskError::Parse(msg) => write!(f, "{}", msg),
            TaskError::MissingKey { section, key } => {
                write!(f, "Missing key '{}' in section '{}'", key, section)
            }
            TaskError::InvalidValue { key, value } => {
                write!(f, "Invalid value '{}' for key '{}'", value, key)
            }
            TaskError::Reader(e) => write!(f, "{}", e),
            TaskError::Solver(e) => write!(f, "{}", e),
            TaskError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for TaskError {}

impl From<ReaderError> for TaskError {
    fn from(e: ReaderError) -> Self {
        TaskError::Reader(e)
    }
}

impl From<GaussError> for TaskError {
    fn from(e: GaussError) -> Self {
        TaskError::Solver(e)
    }
}

impl From<std::io::Error> for TaskError {
    fn from(e: std::io::Error) -> Self {
        TaskError::Io(e)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Postprocessing {
    pub print_table: bool,
    pub diagnostics: bool,
    pub save: bool,
    pub save_to_csv: bool,
    pub filename: String,
    pub condition_threshold: f64,
}

impl Default for Postprocessing {
    fn default() -> Self {
        Postprocessing {
            print_table: false,
            diagnostics: false,
            save: false,
            save_to_csv: false,
            filename: "solution".to_string(),
            condition_threshold: 1e12,
        }
    }
}

pub struct GaussTask {
    pub solver: GaussElimination,
    pub system: Option<DMatrix<f64>>,
    pub loglevel: LevelFilter,
    pub save_log: bool,
    pub postprocessing: Postprocessing,
    result: Option<DVector<f64>>,
}

impl Default for GaussTask {
    fn default() -> Self {
        GaussTask {
            solver: GaussElimination::default(),
            system: None,
            loglevel: LevelFilter::Info,
            save_log: false,
            postprocessing: Postprocessing::default(),
            result: None,
        }
    }
}

fn section_pseudonyms() -> HashMap<&'static str, Vec<&'static str>> {
    HashMap::from([
        ("solver_settings", vec!["settings", "solve_settings", "solving_settings"]),
        ("system", vec!["equations", "matrix", "linear_system"]),
        ("postprocessing", vec!["postprocess", "output"]),
    ])
}

/// lower-case section titles and keys, replace alternative section names with the canonical ones
fn normalize_document(doc: DocumentMap) -> DocumentMap {
    let pseudonyms = section_pseudonyms();
    let mut normalized: DocumentMap = HashMap::new();
    for (title, section) in doc {
        let title = title.to_lowercase();
        let canonical = pseudonyms
            .iter()
            .find(|(_, alternatives)| alternatives.contains(&title.as_str()))
            .map(|(name, _)| name.to_string())
            .unwrap_or(title);
        let entry = normalized.entry(canonical).or_default();
        for (key, values) in section {
            entry.insert(key.to_lowercase(), values);
        }
    }
    normalized
}

fn first_value<'a>(section: &'a SectionMap, key: &str) -> Option<&'a Value> {
    section
        .get(key)
        .and_then(|values| values.as_ref())
        .and_then(|values| values.first())
}

fn invalid(key: &str, value: &Value) -> TaskError {
    TaskError::InvalidValue {
        key: key.to_string(),
        value: value.to_string_value(),
    }
}

fn get_bool(section: &SectionMap, key: &str, default: bool) -> Result<bool, TaskError> {
    match first_value(section, key) {
        None => Ok(default),
        Some(v) => v.as_boolean().ok_or_else(|| invalid(key, v)),
    }
}

fn get_float(section: &SectionMap, key: &str, default: f64) -> Result<f64, TaskError> {
    match first_value(section, key) {
        None => Ok(default),
        Some(v) => v.as_float().ok_or_else(|| invalid(key, v)),
    }
}

fn get_enum<T: FromStr>(section: &SectionMap, key: &str, default: T) -> Result<T, TaskError> {
    match first_value(section, key) {
        None => Ok(default),
        Some(v) => T::from_str(&v.to_string_value()).map_err(|_| invalid(key, v)),
    }
}

impl FromStr for GaussTask {
    type Err = TaskError;

    fn from_str(input: &str) -> Result<Self, TaskError> {
        let doc = parse_document_as(input, None).map_err(TaskError::Parse)?;
        let mut task = GaussTask::new();
        task.set_params_from_hashmap(normalize_document(doc))?;
        Ok(task)
    }
}

impl GaussTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// relative `file` paths of the system section are resolved against the task file directory
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TaskError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let doc = parse_document_as(&content, None).map_err(TaskError::Parse)?;
        let mut task = GaussTask::new();
        task.set_params_from_hashmap_at(normalize_document(doc), path.parent())?;
        Ok(task)
    }

    pub fn set_system(&mut self, augmented: DMatrix<f64>) {
        self.system = Some(augmented);
    }

    pub fn get_result(&self) -> Option<DVector<f64>> {
        self.result.clone()
    }

    pub fn set_params_from_hashmap(&mut self, doc: DocumentMap) -> Result<(), TaskError> {
        self.set_params_from_hashmap_at(doc, None)
    }

    fn set_params_from_hashmap_at(
        &mut self,
        doc: DocumentMap,
        base_dir: Option<&Path>,
    ) -> Result<(), TaskError> {
        if let Some(settings) = doc.get("solver_settings") {
            let pivoting = get_enum(settings, "pivoting", PivotStrategy::default())?;
            let policy = get_enum(settings, "singular_policy", SingularPolicy::default())?;
            let tolerance = get_float(settings, "tolerance", self.solver.tolerance)?;
            self.solver = GaussElimination::new()
                .with_pivoting(pivoting)
                .with_singular_policy(policy)
                .with_tolerance(tolerance);
            if let Some(level) = first_value(settings, "loglevel") {
                self.loglevel = parse_loglevel(&level.to_string_value())
                    .ok_or_else(|| invalid("loglevel", level))?;
            }
            self.save_log = get_bool(settings, "save_log", false)?;
        }

        let system = doc.get("system").ok_or_else(|| TaskError::MissingKey {
            section: "system".to_string(),
            key: "n".to_string(),
        })?;
        self.system = Some(Self::system_from_section(system, base_dir)?);

        if let Some(post) = doc.get("postprocessing") {
            let defaults = Postprocessing::default();
            let filename = match first_value(post, "filename") {
                Some(v) => v.to_string_value(),
                None => defaults.filename.clone(),
            };
            self.postprocessing = Postprocessing {
                print_table: get_bool(post, "print_table", defaults.print_table)?,
                diagnostics: get_bool(post, "diagnostics", defaults.diagnostics)?,
                save: get_bool(post, "save", defaults.save)?,
                save_to_csv: get_bool(post, "save_to_csv", defaults.save_to_csv)?,
                filename,
                condition_threshold: get_float(
                    post,
                    "condition_threshold",
                    defaults.condition_threshold,
                )?,
            };
        }
        Ok(())
    }

    fn system_from_section(
        section: &SectionMap,
        base_dir: Option<&Path>,
    ) -> Result<DMatrix<f64>, TaskError> {
        if let Some(file) = first_value(section, "file") {
            let file = file.to_string_value();
            let path = match base_dir {
                Some(dir) => dir.join(&file),
                None => Path::new(&file).to_path_buf(),
            };
            return Ok(read_system_from_file(path)?);
        }
        let n_value = first_value(section, "n").ok_or_else(|| TaskError::MissingKey {
            section: "system".to_string(),
            key: "n".to_string(),
        })?;
        let n = n_value
            .as_float()
            .ok_or_else(|| invalid("n", n_value))
            .and_then(|n| system_size(n).map_err(TaskError::from))?;

        coefficient_count(n)?;
        // rows are collected before anything of size n is allocated
        let mut values: Vec<f64> = Vec::new();
        for i in 0..n {
            let key = format!("row{}", i);
            let row = section
                .get(&key)
                .and_then(|values| values.as_ref())
                .ok_or_else(|| TaskError::MissingKey {
                    section: "system".to_string(),
                    key: key.clone(),
                })?;
            if row.len() != n + 1 {
                return Err(TaskError::InvalidValue {
                    key: key.clone(),
                    value: format!("{} values, expected {}", row.len(), n + 1),
                });
            }
            for v in row {
                values.push(v.as_float().ok_or_else(|| invalid(&key, v))?);
            }
        }
        Ok(system_from_values(n, &values)?)
    }

    fn solver(&mut self) -> Result<DVector<f64>, GaussError> {
        let Ab = self.system.as_ref().ok_or(GaussError::EmptySystem)?;
        let begin = Instant::now();
        info!(
            "solving system of {} equations: pivoting {}, singular policy {}",
            Ab.nrows(),
            self.solver.pivoting,
            self.solver.singular_policy
        );
        let res = self.solver.solve(Ab);
        match &res {
            Ok(x) => {
                info!("solved in {} mks", begin.elapsed().as_micros());
                self.result = Some(x.clone());
            }
            Err(e) => error!("{}", e),
        }
        res
    }

    /// wrapper around solver function to implement logging
    pub fn solve(&mut self) -> Result<DVector<f64>, GaussError> {
        if self.loglevel == LevelFilter::Off {
            return self.solver();
        }
        let log_file = if self.save_log {
            Some(timestamped_log_name())
        } else {
            None
        };
        if init_logger(self.loglevel, log_file.as_deref()) {
            info!(" \n \n Program started with loglevel: {}", self.loglevel);
        }
        let res = self.solver();
        info!(" \n \n Program ended");
        res
    }

    /// solve and do the postprocessing requested in the task
    pub fn run(&mut self) -> Result<DVector<f64>, TaskError> {
        let x = self.solve()?;
        self.postprocessing(&x)?;
        Ok(x)
    }

    fn postprocessing(&self, x: &DVector<f64>) -> Result<(), TaskError> {
        let post = &self.postprocessing;
        if post.print_table {
            println!("{}", solution_table(x));
        }
        if post.diagnostics {
            if let Some(Ab) = &self.system {
                let (A, b) = split_augmented(Ab);
                let residual = max_relative_residual(&A, &b, x);
                info!("max relative residual = {:e}", residual);
                let healthy = linear_system_diagnostics(&A, &b, post.condition_threshold);
                info!("diagnostics passed: {}", healthy);
            }
        }
        if post.save {
            let name = format!("{}.txt", post.filename);
            save_solution_to_file(x, &name)?;
            info!("solution saved to {}", name);
        }
        if post.save_to_csv {
            let name = format!("{}.csv", post.filename);
            save_solution_to_csv(x, &name)?;
            info!("solution saved to {}", name);
        }
        Ok(())
    }
}

pub fn template() -> &'static str {
    r#"
    // Gaussian elimination task template
    solver_settings
    // pivot choice - ZeroAvoidance (swap only on zero pivot) or Partial (largest |pivot|)
    pivoting: ZeroAvoidance
    // Strict - report singular systems as error, Permissive - let inf/NaN through
    singular_policy: Strict
    // relative pivot tolerance (Strict only)
    tolerance: 1e-12
    // off, error, warn, info, debug
    loglevel: info
    save_log: false
    // the system: n equations, row_i = a_i0, ..., a_i(n-1), b_i
    // or instead of rows -  file: path_to_file with "n a00 a01 ... "
    system
    n: 2
    row0: 2.0, 1.0, 5.0
    row1: 1.0, 3.0, 10.0
    postprocessing
    print_table: true
    diagnostics: true
    save: false
    save_to_csv: false
    filename: solution
    condition_threshold: 1e12
    "#
}

/// Writes task template into file (default name "gauss_task.txt")
pub fn create_template_file(path: Option<std::path::PathBuf>) -> Result<(), TaskError> {
    let path = path.unwrap_or_else(|| std::path::PathBuf::from("gauss_task.txt"));
    fs::write(path, template())?;
    Ok(())
}
