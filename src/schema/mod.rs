pub mod config;
pub mod line;
