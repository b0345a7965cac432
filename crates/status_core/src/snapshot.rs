use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// One loosely-typed snapshot field as the agent sent it.
///
/// The producer may send a record, a bare value, or nothing at all for the
/// same key across snapshots. Consumers never look at the raw shape: they go
/// through [`RawField::project`] or the normalizer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawField {
    /// A JSON object.
    Structured(Map<String, Value>),
    /// Any other non-null value (string, number, bool, list).
    Scalar(Value),
    /// Missing key or explicit `null`.
    #[default]
    Absent,
}

impl RawField {
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawField::Absent,
            Some(Value::Object(map)) => RawField::Structured(map),
            Some(other) => RawField::Scalar(other),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RawField::Structured(map) => Value::Object(map.clone()),
            RawField::Scalar(value) => value.clone(),
            RawField::Absent => Value::Null,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RawField::Absent)
    }

    /// Resolves the field to a typed value: a record yields its sub-field, a
    /// bare value of the right primitive yields itself, anything else is `None`.
    pub fn project<T>(&self, projection: &Projection<T>) -> Option<T> {
        match self {
            RawField::Structured(map) => projection
                .sub_keys
                .iter()
                .find_map(|key| map.get(*key))
                .and_then(projection.primitive),
            RawField::Scalar(value) => (projection.primitive)(value),
            RawField::Absent => None,
        }
    }
}

/// Which sub-key of a record to read, and which primitive a bare value must be.
#[derive(Debug, Clone, Copy)]
pub struct Projection<T> {
    /// Accepted spellings of the sub-key, tried in order.
    pub sub_keys: &'static [&'static str],
    pub primitive: fn(&Value) -> Option<T>,
}

pub const SUMMARY: Projection<String> = Projection {
    sub_keys: &["summary"],
    primitive: as_text,
};

pub const TRANSLATED_TEXT: Projection<String> = Projection {
    sub_keys: &["translated_text", "translatedText"],
    primitive: as_text,
};

pub const WORD_COUNT: Projection<u64> = Projection {
    sub_keys: &["word_count", "wordCount"],
    primitive: as_count,
};

pub fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(ToOwned::to_owned)
}

pub fn as_count(value: &Value) -> Option<u64> {
    value.as_u64()
}

/// The agent's state as pushed in one snapshot.
///
/// Parsing never fails on shape: unknown keys are dropped and every known key
/// falls back to [`RawField::Absent`]. Both the snake_case keys used on the wire
/// and their camelCase spellings are accepted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentSnapshot {
    /// Conversation entries, kept opaque.
    pub messages: Vec<Value>,
    pub summary_data: RawField,
    pub translated_data: RawField,
    pub final_count: RawField,
    pub llm_status: RawField,
    pub file_quality: RawField,
    pub preprocess_data: RawField,
    pub extracted_data: RawField,
    pub grounded_data: RawField,
    pub file_errors: RawField,
}

const FIELD_KEYS: [(&str, &str); 9] = [
    ("summary_data", "summaryData"),
    ("translated_data", "translatedData"),
    ("final_count", "finalCount"),
    ("llm_status", "llmStatus"),
    ("file_quality", "fileQuality"),
    ("preprocess_data", "preprocessData"),
    ("extracted_data", "extractedData"),
    ("grounded_data", "groundedData"),
    ("file_errors", "fileErrors"),
];

impl AgentSnapshot {
    /// Builds a snapshot from an arbitrary JSON value. Non-objects yield an
    /// empty snapshot.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };

        let messages = match map.remove("messages") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };

        let mut take = |index: usize| {
            let (snake, camel) = FIELD_KEYS[index];
            let value = map.remove(snake).or_else(|| map.remove(camel));
            RawField::from_value(value)
        };

        Self {
            messages,
            summary_data: take(0),
            translated_data: take(1),
            final_count: take(2),
            llm_status: take(3),
            file_quality: take(4),
            preprocess_data: take(5),
            extracted_data: take(6),
            grounded_data: take(7),
            file_errors: take(8),
        }
    }

    /// Serializes back to the snake_case wire shape, omitting absent fields.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("messages".to_string(), Value::Array(self.messages.clone()));
        for ((key, _), field) in FIELD_KEYS.iter().zip(self.fields()) {
            if !field.is_absent() {
                map.insert((*key).to_string(), field.to_value());
            }
        }
        Value::Object(map)
    }

    fn fields(&self) -> [&RawField; 9] {
        [
            &self.summary_data,
            &self.translated_data,
            &self.final_count,
            &self.llm_status,
            &self.file_quality,
            &self.preprocess_data,
            &self.extracted_data,
            &self.grounded_data,
            &self.file_errors,
        ]
    }
}

impl<'de> Deserialize<'de> for AgentSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl Serialize for AgentSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_mixed_key_spellings() {
        let snapshot = AgentSnapshot::from_value(json!({
            "summary_data": {"summary": "x", "key_points": []},
            "finalCount": 3,
            "llm_status": null,
            "unknown": true
        }));
        assert!(matches!(snapshot.summary_data, RawField::Structured(_)));
        assert_eq!(snapshot.final_count, RawField::Scalar(json!(3)));
        assert!(snapshot.llm_status.is_absent());
        assert!(snapshot.messages.is_empty());
    }

    #[test]
    fn non_object_snapshot_is_empty() {
        assert_eq!(AgentSnapshot::from_value(json!([1, 2])), AgentSnapshot::default());
    }

    #[test]
    fn messages_of_wrong_shape_are_dropped() {
        let snapshot = AgentSnapshot::from_value(json!({"messages": "nope"}));
        assert!(snapshot.messages.is_empty());
    }

    #[test]
    fn projection_reads_camel_case_sub_key() {
        let field = RawField::from_value(Some(json!({"wordCount": 9})));
        assert_eq!(field.project(&WORD_COUNT), Some(9));
    }

    #[test]
    fn negative_or_fractional_counts_are_rejected() {
        assert_eq!(RawField::Scalar(json!(-1)).project(&WORD_COUNT), None);
        assert_eq!(RawField::Scalar(json!(1.5)).project(&WORD_COUNT), None);
        assert_eq!(RawField::Scalar(json!("12")).project(&WORD_COUNT), None);
    }

    #[test]
    fn serde_round_trip_keeps_present_fields() {
        let raw = json!({"messages": [], "translated_data": "hola"});
        let snapshot: AgentSnapshot = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&snapshot).unwrap(), raw);
    }
}
