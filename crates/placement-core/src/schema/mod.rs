//! Entity schemas
//!
//! Each publishable entity declares its metadata as a static table of
//! `FieldSpec`s, and validation walks that table.

mod fields;
mod pattern;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

pub use pattern::Pattern;

/// Value type of a metadata field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Comma-separated on input, stored as a trimmed list.
    TextList,
    Integer,
    /// Lower-cased and checked against the email pattern.
    Email,
}

#[derive(Debug, Clone, Copy)]
pub enum Constraint {
    MaxLen(usize),
    OneOf(&'static [&'static str]),
    Min(i64),
    /// Upper bound relative to the current calendar year.
    MaxYearsAhead(i32),
    Matches(Pattern),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub constraints: &'static [Constraint],
}

/// Publishable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntitySchema {
    Resource,
    ShowcaseProject,
    AlumniExperience,
}

impl EntitySchema {
    pub fn name(&self) -> &'static str {
        match self {
            EntitySchema::Resource => "resource",
            EntitySchema::ShowcaseProject => "showcase_project",
            EntitySchema::AlumniExperience => "alumni_experience",
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            EntitySchema::Resource => fields::RESOURCE,
            EntitySchema::ShowcaseProject => fields::SHOWCASE_PROJECT,
            EntitySchema::AlumniExperience => fields::ALUMNI_EXPERIENCE,
        }
    }

    /// Whether publishing this entity requires a stored file.
    pub fn requires_artifact(&self) -> bool {
        !matches!(self, EntitySchema::AlumniExperience)
    }

    pub fn validate(&self, input: &FormFields) -> Result<ValidatedFields, Violations> {
        self.validate_at(input, Utc::now())
    }

    /// Validate against the field table, collecting every violation rather than stopping at the first.
    pub fn validate_at(
        &self,
        input: &FormFields,
        now: DateTime<Utc>,
    ) -> Result<ValidatedFields, Violations> {
        let mut values = BTreeMap::new();
        let mut violations = Vec::new();

        for spec in self.fields() {
            let raw = input
                .get(spec.name)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .or(spec.default);

            let Some(raw) = raw else {
                if spec.required {
                    violations.push(Violation::new(spec.name, "is required"));
                }
                continue;
            };

            match parse_value(spec, raw) {
                Ok(value) => {
                    let before = violations.len();
                    for constraint in spec.constraints {
                        if let Some(message) = check(constraint, &value, now) {
                            violations.push(Violation::new(spec.name, message));
                        }
                    }
                    if violations.len() == before {
                        values.insert(spec.name, value);
                    }
                }
                Err(message) => violations.push(Violation::new(spec.name, message)),
            }
        }

        if violations.is_empty() {
            Ok(ValidatedFields { values })
        } else {
            Err(Violations(violations))
        }
    }
}

fn parse_value(spec: &FieldSpec, raw: &str) -> Result<FieldValue, String> {
    match spec.kind {
        FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::TextList => {
            let items: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if items.is_empty() {
                Err("must list at least one entry".to_string())
            } else {
                Ok(FieldValue::List(items))
            }
        }
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| "must be a whole number".to_string()),
        FieldKind::Email => {
            let email = raw.to_lowercase();
            if Pattern::Email.regex().is_match(&email) {
                Ok(FieldValue::Text(email))
            } else {
                Err(format!("must be {}", Pattern::Email.hint()))
            }
        }
    }
}

fn check(constraint: &Constraint, value: &FieldValue, now: DateTime<Utc>) -> Option<String> {
    match (constraint, value) {
        (Constraint::MaxLen(max), FieldValue::Text(text)) if text.chars().count() > *max => {
            Some(format!("must be at most {} characters", max))
        }
        (Constraint::OneOf(allowed), FieldValue::Text(text))
            if !allowed.contains(&text.as_str()) =>
        {
            Some(format!("must be one of: {}", allowed.join(", ")))
        }
        (Constraint::Min(min), FieldValue::Integer(n)) if n < min => {
            Some(format!("must be at least {}", min))
        }
        (Constraint::MaxYearsAhead(years), FieldValue::Integer(n)) => {
            let max = i64::from(now.year() + years);
            (*n > max).then(|| format!("must be at most {}", max))
        }
        (Constraint::Matches(pattern), FieldValue::Text(text))
            if !pattern.regex().is_match(text) =>
        {
            Some(format!("must be {}", pattern.hint()))
        }
        _ => None,
    }
}

/// Raw text metadata as submitted (multipart text parts or a flat JSON object).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(BTreeMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Flatten a JSON object: strings as-is, numbers and booleans via `to_string`,
    /// arrays of scalars comma-joined. Nulls and nested objects are skipped.
    pub fn from_json(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        use serde_json::Value;

        fn scalar(value: &Value) -> Option<String> {
            match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            }
        }

        let mut fields = FormFields::new();
        for (key, value) in map {
            let flattened = match value {
                Value::Array(items) => Some(
                    items
                        .iter()
                        .filter_map(scalar)
                        .collect::<Vec<_>>()
                        .join(","),
                ),
                other => scalar(other),
            };
            if let Some(flattened) = flattened {
                fields.insert(key.clone(), flattened);
            }
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Integer(i64),
}

/// Metadata that passed schema validation, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct ValidatedFields {
    values: BTreeMap<&'static str, FieldValue>,
}

impl ValidatedFields {
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name) {
            Some(FieldValue::List(items)) => Some(items),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(FieldValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// Required text field; validation guarantees presence for required specs.
    pub fn require_text(&self, name: &'static str) -> Result<String, Violations> {
        self.text(name)
            .map(str::to_string)
            .ok_or_else(|| Violations::single(name, "is required"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// One or more failed field checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Violations(vec![Violation::new(field, message)])
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|v| v.field).collect()
    }
}

impl Display for Violations {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|v| format!("{} {}", v.field, v.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
