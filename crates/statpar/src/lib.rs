//! statpar library: application logic for the statistics engine binary.

pub mod app;
pub mod config;
pub mod errors;
