//! logger initialization and saving of the solution vector
use chrono::Local;
use csv::Writer;
use itertools::Itertools;
use nalgebra::DVector;
use simplelog::*;
use std::fs::File;
use std::io::{self, Write};
use tabled::{builder::Builder, settings::Style};

/// "off"/"none" -> Off, "error", "warn", "info", "debug", "trace"; None for anything else
pub fn parse_loglevel(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "off" | "none" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// name of the log file with date and time: log_2024-01-31_12-00-00.txt
pub fn timestamped_log_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Initialize terminal logger and (optionally) file logger.
/// Returns false if logging is off or a global logger was already set.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> bool {
    if level == LevelFilter::Off {
        return false;
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(filename) = log_file {
        match File::create(filename) {
            Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
            Err(e) => eprintln!("cannot create log file {}: {}", filename, e),
        }
    }
    CombinedLogger::init(loggers).is_ok()
}

fn unknown_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("x{}", i)).collect()
}

/// pretty table: unknown | value
pub fn solution_table(x: &DVector<f64>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["unknown", "value"]);
    for (name, value) in unknown_names(x.len()).iter().zip(x.iter()) {
        builder.push_record([name.clone(), value.to_string()]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

/// one value per line, as printed by the console program
pub fn solution_lines(x: &DVector<f64>) -> String {
    x.iter().map(|v| v.to_string()).join("\n")
}

/// tab separated text file with header
pub fn save_solution_to_file(x: &DVector<f64>, filename: &str) -> io::Result<()> {
    let mut file = File::create(filename)?;
    writeln!(file, "unknown\tvalue")?;
    for (name, value) in unknown_names(x.len()).iter().zip(x.iter()) {
        writeln!(file, "{}\t{}", name, value)?;
    }
    Ok(())
}

pub fn save_solution_to_csv(x: &DVector<f64>, filename: &str) -> io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);
    writer.write_record(["unknown", "value"])?;
    for (name, value) in unknown_names(x.len()).iter().zip(x.iter()) {
        writer.write_record([name.clone(), value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
