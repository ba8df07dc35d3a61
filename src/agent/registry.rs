//! Tool registry: the callable surface the model may invoke.
//!
//! Tools are registered once at startup with a [`ToolSpec`] describing their
//! parameters. Arguments are checked against those parameters before a tool
//! runs, so tool functions only ever see well-formed input.

use crate::agent::message::ToolInvocation;
use crate::error::{ArgumentParseError, DispatchError, RegistryError, ToolFailure};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Primitive JSON-Schema types a parameter may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(dead_code)] // Full JSON-Schema primitive set; the built-in tools only take strings
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    fn matches(self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Array => value.is_array(),
            ParamType::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Object => "object",
        };
        f.write_str(name)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One named parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub param_type: ParamType,
    pub description: Option<String>,
    pub required: bool,
}

/// Declarative description of a tool, shown to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a required parameter.
    pub fn required(self, name: impl Into<String>, param_type: ParamType) -> Self {
        self.param(name, param_type, None, true)
    }

    /// Add an optional parameter.
    #[allow(dead_code)] // Builder counterpart of required(); no built-in tool has optional params
    pub fn optional(self, name: impl Into<String>, param_type: ParamType) -> Self {
        self.param(name, param_type, None, false)
    }

    /// Attach a description to the most recently added parameter.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        if let Some(last) = self.parameters.last_mut() {
            last.description = Some(description.into());
        }
        self
    }

    fn param(
        mut self,
        name: impl Into<String>,
        param_type: ParamType,
        description: Option<String>,
        required: bool,
    ) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            param_type,
            description,
            required,
        });
        self
    }

    /// JSON Schema object for the `parameters` field of a function tool.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(param.param_type.to_string()));
            if let Some(ref description) = param.description {
                property.insert("description".to_string(), json!(description));
            }
            properties.insert(param.name.clone(), Value::Object(property));
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check `arguments` against the declared parameters.
    pub fn check_arguments(&self, arguments: &Map<String, Value>) -> Result<(), String> {
        for param in &self.parameters {
            match arguments.get(&param.name) {
                None if param.required => {
                    return Err(format!("missing required argument `{}`", param.name));
                }
                None => {}
                Some(Value::Null) if !param.required => {}
                Some(value) if !param.param_type.matches(value) => {
                    return Err(format!(
                        "argument `{}` must be {}, got {}",
                        param.name,
                        param.param_type,
                        json_type_name(value)
                    ));
                }
                Some(_) => {}
            }
        }

        if let Some(unexpected) = arguments
            .keys()
            .find(|key| !self.parameters.iter().any(|p| &p.name == *key))
        {
            return Err(format!("unexpected argument `{}`", unexpected));
        }

        Ok(())
    }
}

/// Parse the model's argument text into a name/value mapping.
///
/// An empty string is treated as "no arguments".
pub fn parse_arguments(call: &ToolInvocation) -> Result<Map<String, Value>, ArgumentParseError> {
    let text = call.arguments.trim();
    if text.is_empty() {
        return Ok(Map::new());
    }

    let value: Value = serde_json::from_str(text).map_err(|e| ArgumentParseError {
        tool: call.name.clone(),
        message: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ArgumentParseError {
            tool: call.name.clone(),
            message: format!("expected a JSON object, got {}", json_type_name(&other)),
        }),
    }
}

type Handler = Box<dyn Fn(Map<String, Value>) -> Result<Value, DispatchError> + Send + Sync>;

/// Name-keyed registry of tools. Read-only once startup registration is done.
#[derive(Default)]
pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
    handlers: HashMap<String, Handler>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool taking the raw argument map.
    #[allow(dead_code)] // Untyped entry point; the built-in tools go through register_typed
    pub fn register<F>(&mut self, spec: ToolSpec, tool: F) -> Result<(), RegistryError>
    where
        F: Fn(Map<String, Value>) -> Result<Value, ToolFailure> + Send + Sync + 'static,
    {
        let name = spec.name.clone();
        self.insert(
            spec,
            Box::new(move |args| {
                tool(args).map_err(|source| DispatchError::ToolFailed {
                    tool: name.clone(),
                    source,
                })
            }),
        )
    }

    /// Register a tool whose arguments deserialize into `A` and whose result
    /// serializes from `R`.
    pub fn register_typed<A, R, F>(&mut self, spec: ToolSpec, tool: F) -> Result<(), RegistryError>
    where
        A: DeserializeOwned,
        R: Serialize,
        F: Fn(A) -> Result<R, ToolFailure> + Send + Sync + 'static,
    {
        let name = spec.name.clone();
        self.insert(
            spec,
            Box::new(move |args| {
                let bound: A = serde_json::from_value(Value::Object(args)).map_err(|e| {
                    DispatchError::ArgumentBinding {
                        tool: name.clone(),
                        message: e.to_string(),
                    }
                })?;
                let result = tool(bound).map_err(|source| DispatchError::ToolFailed {
                    tool: name.clone(),
                    source,
                })?;
                serde_json::to_value(result).map_err(|e| DispatchError::ToolFailed {
                    tool: name.clone(),
                    source: ToolFailure::new(format!("result is not serializable: {}", e)),
                })
            }),
        )
    }

    fn insert(&mut self, spec: ToolSpec, handler: Handler) -> Result<(), RegistryError> {
        if self.handlers.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateTool(spec.name));
        }
        debug!("Registered tool: {}", spec.name);
        self.handlers.insert(spec.name.clone(), handler);
        self.specs.push(spec);
        Ok(())
    }

    /// All tool specs, in registration order.
    pub fn catalog(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Run a tool by name. Errors from the tool itself are returned, not swallowed.
    pub fn dispatch(&self, name: &str, arguments: Map<String, Value>) -> Result<Value, DispatchError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        if let Some(spec) = self.specs.iter().find(|s| s.name == name) {
            spec.check_arguments(&arguments)
                .map_err(|message| DispatchError::ArgumentBinding {
                    tool: name.to_string(),
                    message,
                })?;
        }

        debug!("Dispatching tool {} with args: {:?}", name, arguments);
        handler(arguments)
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.specs.iter().map(|s| &s.name).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
    }

    fn echo_spec() -> ToolSpec {
        ToolSpec::new("echo", "Echo the input").required("text", ParamType::String)
    }

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register_typed(echo_spec(), |args: EchoArgs| Ok(json!({ "echo": args.text })))
            .unwrap();
        registry
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = echo_registry();
        let err = registry
            .register(echo_spec(), |_| Ok(Value::Null))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("echo".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_catalog_is_registration_ordered_and_stable() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(ToolSpec::new(name, "t"), |_| Ok(Value::Null))
                .unwrap();
        }
        let names: Vec<_> = registry.catalog().iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.catalog(), registry.catalog());
    }

    #[test]
    fn test_dispatch_success() {
        let registry = echo_registry();
        let result = registry.dispatch("echo", args(json!({"text": "hi"}))).unwrap();
        assert_eq!(result, json!({"echo": "hi"}));
    }

    #[test]
    fn test_dispatch_unknown_tool() {
        let registry = echo_registry();
        let err = registry.dispatch("nope", Map::new()).unwrap_err();
        assert_eq!(err, DispatchError::UnknownTool("nope".to_string()));
    }

    #[test]
    fn test_dispatch_binding_errors() {
        let registry = echo_registry();

        let missing = registry.dispatch("echo", Map::new()).unwrap_err();
        assert!(matches!(missing, DispatchError::ArgumentBinding { ref message, .. }
            if message.contains("missing required argument `text`")));

        let extra = registry
            .dispatch("echo", args(json!({"text": "hi", "loud": true})))
            .unwrap_err();
        assert!(matches!(extra, DispatchError::ArgumentBinding { ref message, .. }
            if message.contains("unexpected argument `loud`")));

        let wrong = registry.dispatch("echo", args(json!({"text": 3}))).unwrap_err();
        assert!(matches!(wrong, DispatchError::ArgumentBinding { ref message, .. }
            if message.contains("must be string, got integer")));
    }

    #[test]
    fn test_tool_failure_is_propagated() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolSpec::new("fail", "Always fails"), |_| {
                Err(ToolFailure::new("boom"))
            })
            .unwrap();
        let err = registry.dispatch("fail", Map::new()).unwrap_err();
        assert_eq!(
            err,
            DispatchError::ToolFailed {
                tool: "fail".to_string(),
                source: ToolFailure::new("boom"),
            }
        );
    }

    #[test]
    fn test_optional_null_is_accepted() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolSpec::new("opt", "t").optional("limit", ParamType::Integer),
                |args| Ok(json!({ "has_limit": args.get("limit").map_or(false, |v| !v.is_null()) })),
            )
            .unwrap();
        let result = registry.dispatch("opt", args(json!({"limit": null}))).unwrap();
        assert_eq!(result, json!({"has_limit": false}));
    }

    #[test]
    fn test_parameters_schema() {
        let spec = ToolSpec::new("ab", "A/B")
            .required("goal", ParamType::String)
            .describe("Business goal")
            .optional("limit", ParamType::Integer);
        assert_eq!(
            spec.parameters_schema(),
            json!({
                "type": "object",
                "properties": {
                    "goal": {"type": "string", "description": "Business goal"},
                    "limit": {"type": "integer"}
                },
                "required": ["goal"]
            })
        );
    }

    #[test]
    fn test_parse_arguments() {
        let ok = ToolInvocation::new("1", "echo", r#"{"text": "hi"}"#);
        assert_eq!(parse_arguments(&ok).unwrap(), args(json!({"text": "hi"})));

        let empty = ToolInvocation::new("2", "echo", "  ");
        assert!(parse_arguments(&empty).unwrap().is_empty());

        let broken = ToolInvocation::new("3", "echo", r#"{"text": "#);
        assert_eq!(parse_arguments(&broken).unwrap_err().tool, "echo");

        let array = ToolInvocation::new("4", "echo", "[1, 2]");
        assert!(parse_arguments(&array)
            .unwrap_err()
            .message
            .contains("expected a JSON object, got array"));
    }
}
