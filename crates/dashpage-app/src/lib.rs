//! dashpage application
//!
//! The application context wiring the board, drag engine, search and
//! trending data together, plus a headless shell for the command line.

mod app;
mod config;
mod console;
mod error;

pub use app::App;
pub use config::{AppConfig, ConfigError};
pub use console::StdoutNavigator;
pub use error::AppError;
