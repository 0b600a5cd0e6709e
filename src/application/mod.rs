mod application;
pub mod data;
mod report;
mod runner;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use report::Report;
pub use runner::{RunError, Runner};
pub use runtime_config::RuntimeConfig;
