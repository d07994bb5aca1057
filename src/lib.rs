pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod scanner;
pub mod scheduler;
pub mod telegram;
pub mod utils;
pub mod web;

pub use error::{Error, Result};

#[cfg(test)]
pub mod tests;
