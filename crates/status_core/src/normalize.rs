use serde_json::{Map, Value};

use crate::snapshot::{as_text, AgentSnapshot, RawField, SUMMARY, TRANSLATED_TEXT, WORD_COUNT};

/// Display-ready values resolved from one [`AgentSnapshot`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedView {
    pub summary: Option<String>,
    pub key_points: Vec<String>,
    pub translated_text: Option<String>,
    pub word_count: Option<u64>,
    /// The agent's own status phrase, verbatim (not trimmed).
    pub llm_status: Option<String>,
    pub file_quality: Option<Value>,
    pub preprocess_data: Option<Value>,
    pub extracted_data: Option<Value>,
    pub grounded_data: Option<Value>,
    pub file_errors: Vec<String>,
}

/// Resolves every union-typed field of the snapshot. Pure; never fails.
pub fn normalize(snapshot: &AgentSnapshot) -> NormalizedView {
    NormalizedView {
        summary: snapshot.summary_data.project(&SUMMARY),
        key_points: key_points(&snapshot.summary_data),
        translated_text: snapshot.translated_data.project(&TRANSLATED_TEXT),
        word_count: snapshot.final_count.project(&WORD_COUNT),
        llm_status: match &snapshot.llm_status {
            RawField::Scalar(value) => as_text(value),
            RawField::Structured(_) | RawField::Absent => None,
        },
        file_quality: record_or_list(&snapshot.file_quality),
        preprocess_data: record_or_list(&snapshot.preprocess_data),
        extracted_data: record_or_list(&snapshot.extracted_data),
        grounded_data: record_or_list(&snapshot.grounded_data),
        file_errors: error_texts(&snapshot.file_errors),
    }
}

impl NormalizedView {
    /// Rebuilds a snapshot that normalizes back to this view.
    pub fn rehydrate(&self) -> AgentSnapshot {
        let summary_data = if self.summary.is_some() || !self.key_points.is_empty() {
            let mut record = Map::new();
            if let Some(summary) = &self.summary {
                record.insert("summary".to_string(), Value::String(summary.clone()));
            }
            record.insert(
                "key_points".to_string(),
                Value::Array(self.key_points.iter().cloned().map(Value::String).collect()),
            );
            RawField::Structured(record)
        } else {
            RawField::Absent
        };

        let file_errors = if self.file_errors.is_empty() {
            RawField::Absent
        } else {
            RawField::Scalar(Value::Array(
                self.file_errors.iter().cloned().map(Value::String).collect(),
            ))
        };

        AgentSnapshot {
            messages: Vec::new(),
            summary_data,
            translated_data: text_field(&self.translated_text),
            final_count: self
                .word_count
                .map_or(RawField::Absent, |count| RawField::Scalar(Value::from(count))),
            llm_status: text_field(&self.llm_status),
            file_quality: RawField::from_value(self.file_quality.clone()),
            preprocess_data: RawField::from_value(self.preprocess_data.clone()),
            extracted_data: RawField::from_value(self.extracted_data.clone()),
            grounded_data: RawField::from_value(self.grounded_data.clone()),
            file_errors,
        }
    }
}

fn text_field(value: &Option<String>) -> RawField {
    value
        .as_ref()
        .map_or(RawField::Absent, |text| RawField::Scalar(Value::String(text.clone())))
}

fn key_points(field: &RawField) -> Vec<String> {
    match field {
        RawField::Structured(map) => map
            .get("key_points")
            .or_else(|| map.get("keyPoints"))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(as_text).collect())
            .unwrap_or_default(),
        RawField::Scalar(_) | RawField::Absent => Vec::new(),
    }
}

/// Pipeline records are shown only when they carry structure.
fn record_or_list(field: &RawField) -> Option<Value> {
    match field {
        RawField::Structured(map) => Some(Value::Object(map.clone())),
        RawField::Scalar(value @ Value::Array(_)) => Some(value.clone()),
        RawField::Scalar(_) | RawField::Absent => None,
    }
}

fn error_texts(field: &RawField) -> Vec<String> {
    match field {
        RawField::Structured(map) => error_text_of_record(map).into_iter().collect(),
        RawField::Scalar(Value::String(text)) => vec![text.clone()],
        RawField::Scalar(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.clone()),
                Value::Object(map) => error_text_of_record(map),
                _ => None,
            })
            .collect(),
        RawField::Scalar(_) | RawField::Absent => Vec::new(),
    }
}

fn error_text_of_record(map: &Map<String, Value>) -> Option<String> {
    map.get("message")
        .or_else(|| map.get("error"))
        .and_then(as_text)
}
