use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fixed expected values attached to a section (titles, counts, ...).
///
/// These encode what the page *should* show; they are never filled from the
/// live page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    values: BTreeMap<String, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let props = Properties::new()
            .with("creditIconCount", 3)
            .with("title", "Carina Nebula");
        assert_eq!(props.get_u64("creditIconCount"), Some(3));
        assert_eq!(props.get_str("title"), Some("Carina Nebula"));
        assert_eq!(props.get_u64("title"), None);
        assert_eq!(props.get_str("missing"), None);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let props = Properties::new().with("tabCount", 2);
        assert_eq!(serde_json::to_value(&props).unwrap(), serde_json::json!({ "tabCount": 2 }));
    }
}
