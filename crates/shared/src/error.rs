use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Error body returned by the LMS API for any non-2xx response.
///
/// Validation failures carry a field -> messages map; everything else only a
/// `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// All field messages flattened in field order and joined with ", ".
    pub fn joined_field_errors(&self) -> Option<String> {
        let joined = self
            .errors
            .values()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        (!joined.is_empty()).then_some(joined)
    }

    pub fn first_field_error(&self) -> Option<&str> {
        self.errors.values().flatten().next().map(String::as_str)
    }
}
