//! Per-invocation context handed to functions.

use crate::output::Output;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Shared, read-only handles registered with the application, such as
/// clients for downstream services.
#[derive(Clone, Default)]
pub struct Services {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Services {
    pub fn insert<T: Any + Send + Sync>(&mut self, name: impl Into<String>, service: T) {
        self.entries.insert(name.into(), Arc::new(service));
    }

    /// The service registered under `name`, if it has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.entries.get(name).cloned()?.downcast::<T>().ok()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

/// Execution context of one invocation.
#[derive(Debug)]
pub struct Context {
    /// Outputs sent back to the host.
    pub output: Output,
    function_name: String,
    invocation_id: Uuid,
    services: Arc<Services>,
}

impl Context {
    pub fn new(function_name: impl Into<String>, output: Output, services: Arc<Services>) -> Self {
        Self {
            output,
            function_name: function_name.into(),
            invocation_id: Uuid::new_v4(),
            services,
        }
    }

    pub(crate) fn with_invocation_id(mut self, invocation_id: Uuid) -> Self {
        self.invocation_id = invocation_id;
        self
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn invocation_id(&self) -> Uuid {
        self.invocation_id
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.services.get(name)
    }

    /// Log locally and ship the message to the host with the response.
    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(function = %self.function_name, "{}", message);
        self.output.log(message);
    }
}
