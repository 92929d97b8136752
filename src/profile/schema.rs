//! Output schema: an ordered allow-list of the fields a reply may expose.
//!
//! Validation is also a projection. Fields not listed here never leave the
//! service, some listed fields are redacted after their type is checked, and
//! `twitter_username` is rewritten into a link.

use super::Record;
use crate::error::SchemaError;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    RequiredString,
    OptionalString,
    OptionalNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform {
    Keep,
    /// Type-checked, then dropped from the output.
    Redact,
    TwitterLink,
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    transform: Transform,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        transform: Transform::Keep,
    }
}

const OUTPUT_SCHEMA: &[FieldSpec] = &[
    field("isHubber", FieldKind::RequiredString),
    field("login", FieldKind::RequiredString),
    FieldSpec {
        name: "msft_alias",
        kind: FieldKind::OptionalString,
        transform: Transform::Redact,
    },
    field("name", FieldKind::OptionalString),
    field("title", FieldKind::OptionalString),
    field("cost_center", FieldKind::OptionalString),
    field("manager", FieldKind::OptionalString),
    field("country", FieldKind::OptionalString),
    field("state", FieldKind::OptionalString),
    field("bio", FieldKind::OptionalString),
    field("recent", FieldKind::OptionalString),
    FieldSpec {
        name: "twitter_username",
        kind: FieldKind::OptionalString,
        transform: Transform::TwitterLink,
    },
    field("public_repos", FieldKind::OptionalNumber),
    field("public_gists", FieldKind::OptionalNumber),
    field("followers", FieldKind::OptionalNumber),
    field("following", FieldKind::OptionalNumber),
];

/// A validated profile, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    fields: Vec<(&'static str, Value)>,
}

impl OutputRecord {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }
}

/// Check `record` against the output schema and project it.
///
/// Absent optional fields are omitted; optional fields present as `null`
/// are kept. Undeclared fields are dropped.
pub fn validate(record: &Record) -> Result<OutputRecord, SchemaError> {
    let mut fields = Vec::with_capacity(OUTPUT_SCHEMA.len());

    for spec in OUTPUT_SCHEMA {
        let Some(value) = record.get(spec.name) else {
            if spec.kind == FieldKind::RequiredString {
                return Err(SchemaError::MissingField(spec.name));
            }
            continue;
        };

        check_kind(spec, value)?;

        if let Some(value) = apply_transform(spec.transform, value) {
            fields.push((spec.name, value));
        }
    }

    Ok(OutputRecord { fields })
}

fn check_kind(spec: &FieldSpec, value: &Value) -> Result<(), SchemaError> {
    let invalid = |expected: &'static str| SchemaError::InvalidType {
        field: spec.name,
        expected,
    };

    match (spec.kind, value) {
        (FieldKind::RequiredString, Value::String(_)) => Ok(()),
        (FieldKind::RequiredString, Value::Null) => Err(SchemaError::MissingField(spec.name)),
        (FieldKind::RequiredString, _) => Err(invalid("string")),
        (FieldKind::OptionalString, Value::String(_) | Value::Null) => Ok(()),
        (FieldKind::OptionalString, _) => Err(invalid("string")),
        (FieldKind::OptionalNumber, Value::Number(_) | Value::Null) => Ok(()),
        (FieldKind::OptionalNumber, _) => Err(invalid("number")),
    }
}

fn apply_transform(transform: Transform, value: &Value) -> Option<Value> {
    match (transform, value) {
        (Transform::Redact, _) => None,
        (Transform::TwitterLink, Value::String(handle)) if !handle.is_empty() => Some(
            Value::String(format!("[@{handle}](https://twitter.com/{handle})")),
        ),
        _ => Some(value.clone()),
    }
}
