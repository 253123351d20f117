//! Runs one invocation: decode the trigger, call the function, collect the
//! outputs.

use crate::function::{Context, Function, FunctionDefinition, FunctionError, Services, TriggerHandler};
use crate::http::StatusCode;
use crate::output::Output;
use crate::trigger::{Trigger, TriggerError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info_span, Instrument};
use uuid::Uuid;

/// Why an invocation produced no outputs.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request could not be decoded; the function never ran.
    #[error(transparent)]
    Trigger(#[from] TriggerError),
    /// The function returned an error; its outputs are discarded.
    #[error(transparent)]
    Function(#[from] FunctionError),
}

impl DispatchError {
    /// Status code of the failure response.
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Trigger(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DispatchError::Function(err) => StatusCode(err.code),
        }
    }
}

/// Dispatch a request body to `definition` and return the collected outputs.
pub async fn dispatch(
    definition: &FunctionDefinition,
    services: Arc<Services>,
    body: &[u8],
) -> Result<Output, DispatchError> {
    let invocation_id = Uuid::new_v4();
    let span = info_span!(
        "invocation",
        function = %definition.name(),
        trigger = %definition.kind(),
        %invocation_id
    );

    async move {
        let ctx = Context::new(
            definition.name(),
            Output::with_bindings(definition.outputs().iter().cloned()),
            services,
        )
        .with_invocation_id(invocation_id);
        let trigger_name = definition.trigger_name();

        let result = match definition.handler() {
            TriggerHandler::Http(f) => invoke(f.as_ref(), ctx, body, trigger_name).await,
            TriggerHandler::Queue(f) => invoke(f.as_ref(), ctx, body, trigger_name).await,
            TriggerHandler::ServiceBus(f) => invoke(f.as_ref(), ctx, body, trigger_name).await,
            TriggerHandler::Timer(f) => invoke(f.as_ref(), ctx, body, trigger_name).await,
            TriggerHandler::EventGrid(f) => invoke(f.as_ref(), ctx, body, trigger_name).await,
            TriggerHandler::Generic(f) => invoke(f.as_ref(), ctx, body, trigger_name).await,
        };

        match &result {
            Ok(_) => debug!("Invocation completed"),
            Err(DispatchError::Trigger(err)) => error!("Failed to decode trigger: {}", err),
            Err(DispatchError::Function(err)) => error!("Function returned an error: {}", err),
        }
        result
    }
    .instrument(span)
    .await
}

async fn invoke<T: Trigger>(
    function: &dyn Function<T>,
    mut ctx: Context,
    body: &[u8],
    trigger_name: &str,
) -> Result<Output, DispatchError> {
    let trigger = T::decode(body, trigger_name)?;
    function.run(&mut ctx, trigger).await?;
    Ok(ctx.output)
}
