//! different utility modules used throughout the project
/// logger setup and saving of the solution into file
pub mod logger;
/// reader of the plain "n, then coefficients" input format
pub mod system_reader;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" into HashMap
pub mod task_parser;
