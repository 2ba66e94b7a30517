pub mod analyzers;
pub mod census;
pub mod config;
pub mod output;
pub mod parser;
