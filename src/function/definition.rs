//! Function definitions: a name, a typed trigger handler and declared outputs.

use crate::function::manifest::{BindingManifest, Direction, FunctionManifest};
use crate::function::Function;
use crate::output::OutputBinding;
use crate::trigger::{
    EventGridTrigger, GenericTrigger, HttpTrigger, QueueTrigger, ServiceBusTrigger, TimerTrigger,
    TriggerKind, TIMER_BINDING,
};
use std::fmt;
use std::sync::Arc;

const HTTP_TRIGGER_NAME: &str = "req";

/// A function handler together with the trigger kind it accepts.
#[derive(Clone)]
pub enum TriggerHandler {
    Http(Arc<dyn Function<HttpTrigger>>),
    Queue(Arc<dyn Function<QueueTrigger>>),
    ServiceBus(Arc<dyn Function<ServiceBusTrigger>>),
    Timer(Arc<dyn Function<TimerTrigger>>),
    EventGrid(Arc<dyn Function<EventGridTrigger>>),
    Generic(Arc<dyn Function<GenericTrigger>>),
}

impl TriggerHandler {
    pub fn kind(&self) -> TriggerKind {
        match self {
            TriggerHandler::Http(_) => TriggerKind::Http,
            TriggerHandler::Queue(_) => TriggerKind::Queue,
            TriggerHandler::ServiceBus(_) => TriggerKind::ServiceBus,
            TriggerHandler::Timer(_) => TriggerKind::Timer,
            TriggerHandler::EventGrid(_) => TriggerKind::EventGrid,
            TriggerHandler::Generic(_) => TriggerKind::Generic,
        }
    }
}

impl fmt::Debug for TriggerHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TriggerHandler({})", self.kind())
    }
}

/// Everything the registry knows about one function.
#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    name: String,
    trigger_name: String,
    trigger_type: Option<String>,
    handler: TriggerHandler,
    outputs: Vec<OutputBinding>,
}

impl FunctionDefinition {
    fn new(name: impl Into<String>, trigger_name: impl Into<String>, handler: TriggerHandler) -> Self {
        Self {
            name: name.into(),
            trigger_name: trigger_name.into(),
            trigger_type: None,
            handler,
            outputs: Vec::new(),
        }
    }

    /// An HTTP triggered function. The trigger binding is named `req`.
    pub fn http(name: impl Into<String>, function: impl Function<HttpTrigger> + 'static) -> Self {
        Self::new(name, HTTP_TRIGGER_NAME, TriggerHandler::Http(Arc::new(function)))
    }

    /// A timer triggered function. The trigger binding is named `timer`.
    pub fn timer(name: impl Into<String>, function: impl Function<TimerTrigger> + 'static) -> Self {
        Self::new(name, TIMER_BINDING, TriggerHandler::Timer(Arc::new(function)))
    }

    pub fn queue(
        name: impl Into<String>,
        trigger_name: impl Into<String>,
        function: impl Function<QueueTrigger> + 'static,
    ) -> Self {
        Self::new(name, trigger_name, TriggerHandler::Queue(Arc::new(function)))
    }

    pub fn service_bus(
        name: impl Into<String>,
        trigger_name: impl Into<String>,
        function: impl Function<ServiceBusTrigger> + 'static,
    ) -> Self {
        Self::new(name, trigger_name, TriggerHandler::ServiceBus(Arc::new(function)))
    }

    pub fn event_grid(
        name: impl Into<String>,
        trigger_name: impl Into<String>,
        function: impl Function<EventGridTrigger> + 'static,
    ) -> Self {
        Self::new(name, trigger_name, TriggerHandler::EventGrid(Arc::new(function)))
    }

    /// A function bound to any other trigger kind, such as a blob trigger.
    /// Set the `function.json` type with [`with_trigger_type`](Self::with_trigger_type).
    pub fn generic(
        name: impl Into<String>,
        trigger_name: impl Into<String>,
        function: impl Function<GenericTrigger> + 'static,
    ) -> Self {
        Self::new(name, trigger_name, TriggerHandler::Generic(Arc::new(function)))
    }

    pub fn with_trigger_name(mut self, trigger_name: impl Into<String>) -> Self {
        self.trigger_name = trigger_name.into();
        self
    }

    /// Override the trigger's `function.json` binding type.
    pub fn with_trigger_type(mut self, trigger_type: impl Into<String>) -> Self {
        self.trigger_type = Some(trigger_type.into());
        self
    }

    /// Declare an output binding. Each invocation starts with a fresh copy.
    pub fn with_output(mut self, output: impl Into<OutputBinding>) -> Self {
        self.outputs.push(output.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger_name(&self) -> &str {
        &self.trigger_name
    }

    pub fn kind(&self) -> TriggerKind {
        self.handler.kind()
    }

    pub fn handler(&self) -> &TriggerHandler {
        &self.handler
    }

    pub fn outputs(&self) -> &[OutputBinding] {
        &self.outputs
    }

    /// The `function.json` document for this function. Bindings without a
    /// known type are left out.
    pub fn manifest(&self) -> FunctionManifest {
        let mut manifest = FunctionManifest::default();

        let trigger_type = self
            .trigger_type
            .as_deref()
            .or_else(|| self.kind().binding_type());
        if let Some(trigger_type) = trigger_type {
            let mut trigger = BindingManifest::new(&self.trigger_name, trigger_type, Direction::In);
            if self.kind() == TriggerKind::Http {
                trigger.auth_level = Some("anonymous".to_string());
                trigger.methods = Some(vec!["get".to_string(), "post".to_string()]);
            }
            manifest.bindings.push(trigger);
        }

        for output in &self.outputs {
            let binding_type = match output {
                OutputBinding::Http(_) => Some("http"),
                OutputBinding::Generic(generic) => generic.binding_type(),
            };
            if let Some(binding_type) = binding_type {
                manifest
                    .bindings
                    .push(BindingManifest::new(output.name(), binding_type, Direction::Out));
            }
        }

        manifest
    }
}
