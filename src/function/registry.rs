//! Function registry mapping function names to definitions.

use crate::function::dispatch::dispatch;
use crate::function::manifest::FunctionManifest;
use crate::function::{FunctionDefinition, Services};
use crate::http::{HostRequest, HostResponse, StatusCode};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Registration failure.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("function '{0}' is already registered")]
    Duplicate(String),
    #[error("at least one function must be registered")]
    NoFunctions,
}

/// Collects functions and services before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    functions: HashMap<String, FunctionDefinition>,
    services: Services,
}

impl RegistryBuilder {
    /// Register a function. Names must be unique.
    pub fn register(&mut self, definition: FunctionDefinition) -> Result<(), RegistryError> {
        let name = definition.name().to_string();
        if self.functions.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }

        info!(
            "Registered function: {} ({} trigger '{}')",
            name,
            definition.kind(),
            definition.trigger_name()
        );
        self.functions.insert(name, definition);
        Ok(())
    }

    /// Chaining form of [`register`](Self::register).
    pub fn function(mut self, definition: FunctionDefinition) -> Result<Self, RegistryError> {
        self.register(definition)?;
        Ok(self)
    }

    /// Make a shared service available to every function.
    pub fn service<T: Any + Send + Sync>(mut self, name: impl Into<String>, service: T) -> Self {
        self.services.insert(name, service);
        self
    }

    pub fn build(self) -> Result<FunctionRegistry, RegistryError> {
        if self.functions.is_empty() {
            return Err(RegistryError::NoFunctions);
        }
        Ok(FunctionRegistry {
            functions: self.functions,
            services: Arc::new(self.services),
        })
    }
}

/// Read-only registry shared by all invocations.
#[derive(Debug)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDefinition>,
    services: Arc<Services>,
}

impl FunctionRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name)
    }

    /// Registered function names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// `function.json` documents for every registered function, by name.
    pub fn manifests(&self) -> Vec<(&str, FunctionManifest)> {
        self.list()
            .into_iter()
            .filter_map(|name| self.get(name).map(|def| (name, def.manifest())))
            .collect()
    }

    /// Run the named function against an invocation request.
    pub async fn execute(&self, name: &str, request: HostRequest) -> HostResponse {
        let Some(definition) = self.functions.get(name) else {
            warn!("Function '{}' not found", name);
            return HostResponse::error(
                StatusCode::NOT_FOUND,
                format!("function '{}' not found", name),
            );
        };

        debug!("Executing function '{}' ({} bytes)", name, request.body_bytes().len());
        match dispatch(definition, self.services.clone(), request.body_bytes()).await {
            Ok(output) => HostResponse::envelope(output.serialize()),
            Err(err) => HostResponse::error(err.status(), err.to_string()),
        }
    }
}
