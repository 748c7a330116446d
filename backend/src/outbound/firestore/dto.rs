//! DTOs for the Firestore REST v1 document resource.
//!
//! Only the value kinds this service writes are decoded precisely. Any other
//! kind reads back as a null field.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::{Document, DocumentPath, FieldValue, Fields};

/// Separator between the database resource name and the document path.
const DOCUMENTS_MARKER: &str = "/documents/";

#[derive(Debug, Deserialize)]
pub(super) struct DocumentDto {
    pub(super) name: String,
    #[serde(default)]
    pub(super) fields: BTreeMap<String, ValueDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ValueDto {
    #[serde(default)]
    pub(super) string_value: Option<String>,
    #[serde(default)]
    pub(super) timestamp_value: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListDocumentsDto {
    #[serde(default)]
    pub(super) documents: Vec<DocumentDto>,
    #[serde(default)]
    pub(super) next_page_token: Option<String>,
}

impl DocumentDto {
    /// Relative document path parsed from the full resource name.
    pub(super) fn path(&self) -> Result<DocumentPath, String> {
        let relative = self
            .name
            .split_once(DOCUMENTS_MARKER)
            .map(|(_, rest)| rest)
            .ok_or_else(|| format!("unexpected document name {:?}", self.name))?;
        DocumentPath::parse(relative).map_err(|err| err.to_string())
    }

    pub(super) fn into_document(self) -> Result<Document, String> {
        let path = self.path()?;
        let fields = self
            .fields
            .into_iter()
            .map(|(name, value)| (name, value.into_field_value()))
            .collect();
        Ok(Document { path, fields })
    }
}

impl ValueDto {
    fn into_field_value(self) -> FieldValue {
        match (self.string_value, self.timestamp_value) {
            (Some(text), _) => FieldValue::String(text),
            (None, Some(at)) => FieldValue::Timestamp(at),
            (None, None) => FieldValue::Null,
        }
    }
}

/// Encode fields as the `{"fields": {...}}` request body.
pub(super) fn encode_document(fields: &Fields) -> Value {
    let encoded: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect();
    json!({ "fields": encoded })
}

fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::String(text) => json!({ "stringValue": text }),
        FieldValue::Timestamp(at) => {
            json!({ "timestampValue": at.to_rfc3339_opts(SecondsFormat::Micros, true) })
        }
        FieldValue::Null => json!({ "nullValue": null }),
    }
}
