use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// AgentIdentity
// ---------------------------------------------------------------------------

/// The declared name of an agent variant.
///
/// Identities are fixed at variant definition time and serve as the exact
/// resolution key into persona storage. Two instances of the same variant
/// share the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentIdentity(String);

impl AgentIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

// ---------------------------------------------------------------------------
// ProcessingInput
// ---------------------------------------------------------------------------

/// An open-ended keyed bag of arguments supplied to one pipeline run.
///
/// The bag has no fixed shape; each `process_data` behavior validates
/// whatever keys it requires and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessingInput {
    values: HashMap<String, Value>,
}

impl ProcessingInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Convenience accessor for string-valued keys.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Flatten the bag into string variables suitable for template
    /// rendering. String values are used verbatim; everything else is
    /// rendered as compact JSON.
    pub fn to_template_vars(&self) -> HashMap<String, String> {
        self.values
            .iter()
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), rendered)
            })
            .collect()
    }
}

impl From<HashMap<String, Value>> for ProcessingInput {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}

// ---------------------------------------------------------------------------
// ParsedResult
// ---------------------------------------------------------------------------

/// The structured output of a pipeline's processing stage.
///
/// The payload shape is behavior-defined; the base contract guarantees only
/// that whatever `process_data` returns reaches `save_parsed_result`
/// unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedResult {
    /// Identity of the agent that produced this result.
    pub identity: AgentIdentity,
    /// Behavior-defined payload; `Value::Null` for the minimal result.
    pub payload: Value,
    pub produced_at: DateTime<Utc>,
}

impl ParsedResult {
    pub fn new(identity: AgentIdentity, payload: Value) -> Self {
        Self {
            identity,
            payload,
            produced_at: Utc::now(),
        }
    }

    /// The minimal valid result: produced by the base processing stage,
    /// which assumes no domain-specific extraction logic.
    pub fn empty(identity: AgentIdentity) -> Self {
        Self::new(identity, Value::Null)
    }

    pub fn is_minimal(&self) -> bool {
        self.payload.is_null()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identity_display_and_eq() {
        let a = AgentIdentity::new("Summarizer");
        let b = AgentIdentity::from("Summarizer");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Summarizer");
        assert_eq!(a.as_str(), "Summarizer");
    }

    #[test]
    fn identity_serde_transparent() {
        let id = AgentIdentity::new("Plain");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"Plain\"");
        let back: AgentIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn input_with_and_get() {
        let input = ProcessingInput::new()
            .with("text", "hello")
            .with("limit", 10);
        assert_eq!(input.get_str("text"), Some("hello"));
        assert_eq!(input.get("limit"), Some(&json!(10)));
        assert_eq!(input.len(), 2);
        assert!(input.get("missing").is_none());
    }

    #[test]
    fn input_get_str_rejects_non_strings() {
        let input = ProcessingInput::new().with("n", 42);
        assert_eq!(input.get_str("n"), None);
    }

    #[test]
    fn input_template_vars_flatten_json() {
        let input = ProcessingInput::new()
            .with("text", "hello")
            .with("count", 3);
        let vars = input.to_template_vars();
        assert_eq!(vars.get("text").unwrap(), "hello");
        assert_eq!(vars.get("count").unwrap(), "3");
    }

    #[test]
    fn input_from_map_and_serde() {
        let mut map = HashMap::new();
        map.insert("k".to_string(), json!("v"));
        let input = ProcessingInput::from(map);
        let text = serde_json::to_string(&input).unwrap();
        assert_eq!(text, r#"{"k":"v"}"#);
        let back: ProcessingInput = serde_json::from_str(&text).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn parsed_result_empty_is_minimal() {
        let result = ParsedResult::empty(AgentIdentity::new("Plain"));
        assert!(result.is_minimal());
        assert_eq!(result.identity.as_str(), "Plain");
    }

    #[test]
    fn parsed_result_carries_payload() {
        let result = ParsedResult::new(
            AgentIdentity::new("Summarizer"),
            json!({ "summary": "hello worl" }),
        );
        assert!(!result.is_minimal());
        assert_eq!(result.payload["summary"], "hello worl");
    }
}
