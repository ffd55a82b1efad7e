pub mod args;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod projection;
pub mod reconcile;
pub mod report;
pub mod state;
pub mod store;
mod utils;


pub use config::Config;
pub use error::{Error, ErrorType, IntoResult, Result};
