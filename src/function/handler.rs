//! Function trait and error type.

use crate::eventgrid::EventError;
use crate::function::Context;
use crate::trigger::{Trigger, TriggerError};
use async_trait::async_trait;
use std::marker::PhantomData;

/// A function bound to trigger kind `T`.
///
/// The function receives the decoded trigger and the invocation context.
/// Anything it writes to `ctx.output` is sent back to the host once it
/// returns `Ok`.
#[async_trait]
pub trait Function<T: Trigger>: Send + Sync {
    async fn run(&self, ctx: &mut Context, trigger: T) -> Result<(), FunctionError>;
}

/// A [`Function`] backed by a plain closure.
pub struct FnHandler<F, T> {
    f: F,
    _trigger: PhantomData<fn() -> T>,
}

/// Wrap a closure as a [`Function`].
pub fn handler_fn<F, T>(f: F) -> FnHandler<F, T>
where
    F: Fn(&mut Context, T) -> Result<(), FunctionError> + Send + Sync,
    T: Trigger,
{
    FnHandler {
        f,
        _trigger: PhantomData,
    }
}

#[async_trait]
impl<F, T> Function<T> for FnHandler<F, T>
where
    F: Fn(&mut Context, T) -> Result<(), FunctionError> + Send + Sync,
    T: Trigger,
{
    async fn run(&self, ctx: &mut Context, trigger: T) -> Result<(), FunctionError> {
        (self.f)(ctx, trigger)
    }
}

/// Error returned by a function. The message becomes the response body.
#[derive(Debug, Clone)]
pub struct FunctionError {
    pub message: String,
    /// Status code of the failure response.
    pub code: u16,
}

impl FunctionError {
    /// Create a new FunctionError with status 500.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 500,
        }
    }

    /// Create a FunctionError with a specific code.
    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

impl std::fmt::Display for FunctionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FunctionError {}

impl From<TriggerError> for FunctionError {
    fn from(err: TriggerError) -> Self {
        FunctionError::new(err.to_string())
    }
}

impl From<EventError> for FunctionError {
    fn from(err: EventError) -> Self {
        FunctionError::new(err.to_string())
    }
}

impl From<std::io::Error> for FunctionError {
    fn from(err: std::io::Error) -> Self {
        FunctionError::new(err.to_string())
    }
}

impl From<serde_json::Error> for FunctionError {
    fn from(err: serde_json::Error) -> Self {
        FunctionError::new(err.to_string())
    }
}
