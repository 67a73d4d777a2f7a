//! Blueprint (flow definition) types.
//!
//! A blueprint is kept twice: the verbatim JSON document, which is copied
//! into task artifacts untouched, and a typed tree of modules used for
//! traversal. The typed tree is built once when the file is read.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Maximum number of nested route levels accepted in a flow.
///
/// Each route level is four JSON nesting levels, so files at the limit
/// stay well inside serde_json's parse limit of 128.
pub const MAX_FLOW_DEPTH: usize = 24;

/// A list of modules executed in order.
pub type Flow = Vec<FlowNode>;

/// Errors raised while normalizing a flow definition.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The document does not have the expected shape.
    #[error("Malformed flow: {0}")]
    Malformed(String),

    /// Routes are nested deeper than [`MAX_FLOW_DEPTH`].
    #[error("Malformed flow: routes nested deeper than {max} levels")]
    TooDeep { max: usize },
}

/// One module (step) in a flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Module type tag, e.g. `http:ActionSendData`
    #[serde(default)]
    pub module: Option<String>,

    /// Branches leaving this module (routers only)
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// A branch of a router module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Modules on this branch; a missing flow is an empty branch
    #[serde(default)]
    pub flow: Flow,
}

impl FlowNode {
    /// Create a plain module.
    pub fn module(module: impl Into<String>) -> Self {
        Self { module: Some(module.into()), routes: Vec::new() }
    }

    /// Create a router module with the given branches.
    pub fn router(routes: Vec<Flow>) -> Self {
        Self {
            module: Some("builtin:BasicRouter".to_string()),
            routes: routes.into_iter().map(|flow| Route { flow }).collect(),
        }
    }
}

/// A parsed scenario blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    raw: Value,
    flow: Flow,
}

impl Blueprint {
    /// Read and normalize a blueprint file.
    pub fn load(path: &Path) -> Result<Self, crate::task::TaskError> {
        let content = std::fs::read_to_string(path)?;
        let raw: Value = serde_json::from_str(&content).map_err(|e| {
            if is_recursion_limit(&e) {
                crate::task::TaskError::Flow(FlowError::TooDeep { max: MAX_FLOW_DEPTH })
            } else {
                e.into()
            }
        })?;
        Ok(Self::from_value(raw)?)
    }

    /// Normalize a JSON document into a blueprint.
    ///
    /// The top level must be an object; a missing `flow` key is an empty flow.
    pub fn from_value(raw: Value) -> Result<Self, FlowError> {
        let object = raw
            .as_object()
            .ok_or_else(|| FlowError::Malformed("blueprint is not a JSON object".to_string()))?;

        let flow = match object.get("flow") {
            None | Some(Value::Null) => Flow::new(),
            Some(value) => {
                check_depth(value, 0)?;
                Flow::deserialize(value).map_err(|e| FlowError::Malformed(e.to_string()))?
            }
        };

        Ok(Self { raw, flow })
    }

    /// The verbatim JSON document.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The typed top-level flow.
    pub fn flow(&self) -> &[FlowNode] {
        &self.flow
    }

    /// Consume the blueprint, returning the verbatim document.
    pub fn into_raw(self) -> Value {
        self.raw
    }
}

/// serde_json reports its nesting limit as a plain syntax error.
fn is_recursion_limit(err: &serde_json::Error) -> bool {
    err.to_string().starts_with("recursion limit exceeded")
}

/// Reject flows whose route nesting exceeds [`MAX_FLOW_DEPTH`].
///
/// Runs on the raw value so the limit holds before any recursive
/// deserialization happens.
fn check_depth(flow: &Value, depth: usize) -> Result<(), FlowError> {
    if depth > MAX_FLOW_DEPTH {
        return Err(FlowError::TooDeep { max: MAX_FLOW_DEPTH });
    }

    let Some(nodes) = flow.as_array() else {
        return Ok(());
    };

    for routes in nodes.iter().filter_map(|node| node.get("routes")).filter_map(Value::as_array) {
        for nested in routes.iter().filter_map(|route| route.get("flow")) {
            check_depth(nested, depth + 1)?;
        }
    }

    Ok(())
}
