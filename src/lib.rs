//! # custom-handler
//!
//! Run Rust functions behind a function host as a custom handler.
//!
//! The host forwards every invocation as one HTTP request whose body is a
//! JSON envelope: a `Data` object holding one wire value per input binding
//! and a free-form `Metadata` object. The handler decodes the binding the
//! function is triggered by, runs the function, and answers with an
//! envelope of output bindings, a return value and log lines.
//!
//! ```text
//!   host ──POST /{function}──▶ FunctionApp ──▶ FunctionRegistry
//!                                                   │
//!                           Invocation::decode ◀────┤ dispatch
//!                                   │               │
//!                             Trigger (typed) ──▶ Function::run(ctx)
//!                                                   │
//!   host ◀──{"Outputs","Logs","ReturnValue"}── Output::serialize
//! ```
//!
//! Binding payloads carry no type tag. They may arrive as escaped JSON,
//! doubly escaped JSON, plain text or base64 binary; [`RawValue`] resolves
//! them to the bytes the sender meant and encodes outputs back.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use custom_handler::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let registry = FunctionRegistry::builder()
//!         .function(FunctionDefinition::http(
//!             "hello",
//!             handler_fn(|ctx: &mut Context, req: HttpTrigger| {
//!                 let http = ctx.output.http();
//!                 http.set_header("Content-Type", "text/plain");
//!                 http.write(format!("Hello, {}!", req.method));
//!                 Ok(())
//!             }),
//!         ))?
//!         .build()?;
//!
//!     FunctionApp::new(HandlerConfig::from_env()?, registry).run().await?;
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod envelope;
pub mod eventgrid;
pub mod function;
pub mod http;
pub mod output;
pub mod runtime;
pub mod trigger;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::data::RawValue;
    pub use crate::eventgrid::{CloudEvent, Event, EventProvider};
    pub use crate::function::{
        handler_fn, Context, Function, FunctionDefinition, FunctionError, FunctionRegistry,
    };
    pub use crate::output::{GenericOutput, HttpOutput, Output};
    pub use crate::runtime::{FunctionApp, HandlerConfig};
    pub use crate::trigger::{
        EventGridTrigger, GenericTrigger, HttpTrigger, QueueTrigger, ServiceBusTrigger,
        TimerTrigger, Trigger,
    };
    pub use async_trait::async_trait;
}

pub use data::RawValue;
pub use envelope::Invocation;
pub use function::{FunctionDefinition, FunctionError, FunctionRegistry};
pub use runtime::{FunctionApp, HandlerConfig};
