use serde::Deserialize;

use crate::config::ColumnConfig;

/// Inbound form-submission event.
///
/// The trigger may fire with no payload at all (a manual test run, for
/// example), so a missing `values` array is a benign no-op, not an error.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FormEvent {
    #[serde(default)]
    pub values: Option<Vec<String>>,
}

/// Named view of one submitted row. All fields are plain strings; a field
/// whose column is absent from the row comes through as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub student_email: String,
    pub counselor_name: String,
    pub student_id: String,
    pub last_name: String,
    pub first_name: String,
    pub reason: String,
    pub urgency: String,
    pub person_completing: String,
    pub description: String,
}

impl FormData {
    /// Fixed-offset extraction. Out-of-range offsets yield empty strings;
    /// this never fails, which also means a column table out of step with
    /// the form misreads silently. `ColumnConfig::validate` plus the
    /// extraction tests are the guard rails.
    pub fn extract(values: &[String], columns: &ColumnConfig) -> Self {
        let field = |index: usize| -> String {
            values.get(index).cloned().unwrap_or_default()
        };

        Self {
            student_email: field(columns.student_email),
            counselor_name: field(columns.counselor_name),
            student_id: field(columns.student_id),
            last_name: field(columns.last_name),
            first_name: field(columns.first_name),
            reason: field(columns.reason),
            urgency: field(columns.urgency),
            person_completing: field(columns.person_completing),
            description: field(columns.description),
        }
    }
}

/// Fields a submission cannot be routed without.
pub const REQUIRED_FIELDS: [&str; 3] = ["first_name", "last_name", "counselor_name"];

/// Names of required fields that are empty or whitespace-only.
pub fn missing_required_fields(data: &FormData) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if data.first_name.trim().is_empty() {
        missing.push("first_name");
    }
    if data.last_name.trim().is_empty() {
        missing.push("last_name");
    }
    if data.counselor_name.trim().is_empty() {
        missing.push("counselor_name");
    }
    missing
}

pub fn is_valid(data: &FormData) -> bool {
    missing_required_fields(data).is_empty()
}
