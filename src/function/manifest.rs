//! `function.json` documents describing how the host binds a function.

use serde::{Deserialize, Serialize};

/// Direction of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// One entry of the `bindings` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingManifest {
    pub name: String,
    #[serde(rename = "type")]
    pub binding_type: String,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_name: Option<String>,
}

impl BindingManifest {
    pub fn new(name: impl Into<String>, binding_type: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            binding_type: binding_type.into(),
            direction,
            auth_level: None,
            methods: None,
            route: None,
            connection: None,
            queue_name: None,
            topic_name: None,
        }
    }
}

/// A `function.json` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionManifest {
    pub bindings: Vec<BindingManifest>,
}

impl FunctionManifest {
    /// The binding called `name`, for filling in connection details.
    pub fn binding_mut(&mut self, name: &str) -> Option<&mut BindingManifest> {
        self.bindings.iter_mut().find(|binding| binding.name == name)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
