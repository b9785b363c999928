pub mod cli;
pub mod config;
pub mod core;
pub mod device;
pub mod engine;
pub mod observability;
pub mod parser;
pub mod points;
pub mod sink;
