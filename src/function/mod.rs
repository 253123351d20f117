//! Function registration and dispatch.

mod context;
mod definition;
pub mod dispatch;
pub mod handler;
pub mod manifest;
pub mod registry;

pub use context::{Context, Services};
pub use definition::{FunctionDefinition, TriggerHandler};
pub use dispatch::{dispatch, DispatchError};
pub use handler::{handler_fn, FnHandler, Function, FunctionError};
pub use manifest::{BindingManifest, Direction, FunctionManifest};
pub use registry::{FunctionRegistry, RegistryBuilder, RegistryError};
