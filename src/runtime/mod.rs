//! Custom handler runtime: the HTTP listener the host invokes.

mod config;
mod server;

pub use config::{ConfigError, HandlerConfig};
pub use server::{shutdown_signal, FunctionApp, RuntimeError};
