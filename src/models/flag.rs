use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A row of the key-value `feature_flags` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl FeatureFlag {
    /// Interpret the value as a switch. Strings `"true"`, `"on"`, `"yes"` and
    /// `"1"` and non-zero numbers count as enabled.
    pub fn enabled(&self) -> bool {
        match &self.value {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "on" | "yes" | "1"
            ),
            _ => false,
        }
    }
}
