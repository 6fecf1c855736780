use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One raw message from the agent pipeline.
///
/// `author` and `timestamp` are lifted out of the JSON object; every other
/// field stays in `fields` untouched. Conversion from JSON is total: a
/// non-object payload becomes an event with an empty author whose `fields`
/// hold the original value under `"value"`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct AgentEvent {
    pub author: String,
    pub timestamp: String,
    pub fields: Map<String, Value>,
}

impl AgentEvent {
    pub fn new(author: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            timestamp: timestamp.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style setter used by producers and tests.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Returns a field unless it is missing or JSON `null`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// First non-null field among `keys`; used for snake/camel spellings.
    pub fn first_field(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|key| self.field(key))
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    /// A non-null field as text; non-string values keep their JSON form.
    pub fn text_field(&self, key: &str) -> Option<String> {
        self.field(key).cloned().map(value_to_text)
    }

    pub fn first_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.str_field(key))
    }

    /// String elements of an array field; non-string elements are skipped.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.field(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Length of an array field, 0 when absent or not an array.
    pub fn array_len(&self, key: &str) -> usize {
        self.field(key)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Unsigned integer from a number or a numeric string.
    pub fn u32_field(&self, keys: &[&str]) -> Option<u32> {
        keys.iter().find_map(|key| self.field(key).and_then(value_as_u32))
    }

    /// The event as a single JSON object, author and timestamp included.
    pub fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

pub(crate) fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<Value> for AgentEvent {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut fields) => {
                let author = fields.remove("author").map(value_to_text).unwrap_or_default();
                let timestamp = fields
                    .remove("timestamp")
                    .map(value_to_text)
                    .unwrap_or_default();
                Self {
                    author,
                    timestamp,
                    fields,
                }
            }
            other => {
                let mut fields = Map::new();
                fields.insert("value".to_string(), other);
                Self {
                    author: String::new(),
                    timestamp: String::new(),
                    fields,
                }
            }
        }
    }
}

impl From<AgentEvent> for Value {
    fn from(event: AgentEvent) -> Self {
        let mut object = event.fields;
        object.insert("author".to_string(), Value::String(event.author));
        object.insert("timestamp".to_string(), Value::String(event.timestamp));
        Value::Object(object)
    }
}
