// Declarative response shapes.
//
// Each endpoint declares the structure it expects as a `Shape` constant.
// The validator walks a decoded `serde_json::Value` against it and
// collects every mismatch instead of stopping at the first one, so a
// drifting API contract can be diagnosed from a single response.
//
// Shapes are also used to synthesise the smallest conforming value for
// dry-run mode: required fields get an empty/zero value, optional fields
// are left out.

use serde_json::{Map, Value};

use crate::error::ValidationIssue;

/// Expected structure of a JSON value.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    String,
    Number,
    /// A number without a fractional part that fits in an `i64`/`u64`.
    Integer,
    Bool,
    /// A string restricted to the listed values.
    Enum(&'static [&'static str]),
    Array(&'static Shape),
    /// An object with arbitrary keys whose values share one shape.
    Record(&'static Shape),
    Object(&'static [Field]),
}

/// One named member of a [`Shape::Object`].
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

/// Declare an object member: `field!("id", Shape::String)` is required,
/// `field!("size"?, Shape::Number)` is optional. Optional members accept
/// both a missing key and an explicit `null`.
#[macro_export]
macro_rules! field {
    ($name:literal ?, $shape:expr) => {
        $crate::shape::Field {
            name: $name,
            shape: $shape,
            required: false,
        }
    };
    ($name:literal, $shape:expr) => {
        $crate::shape::Field {
            name: $name,
            shape: $shape,
            required: true,
        }
    };
}

impl Shape {
    /// Validate `value` and return every issue found. Empty means valid.
    pub fn validate(&self, value: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.check(value, "", &mut issues);
        issues
    }

    /// Build the smallest value that passes [`Shape::validate`].
    pub fn minimal(&self) -> Value {
        match self {
            Shape::String => Value::String(String::new()),
            Shape::Number | Shape::Integer => Value::from(0),
            Shape::Bool => Value::Bool(false),
            Shape::Enum(variants) => {
                Value::String(variants.first().copied().unwrap_or_default().to_string())
            }
            Shape::Array(_) => Value::Array(Vec::new()),
            Shape::Record(_) => Value::Object(Map::new()),
            Shape::Object(fields) => Value::Object(
                fields
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| (f.name.to_string(), f.shape.minimal()))
                    .collect(),
            ),
        }
    }

    fn describe(&self) -> String {
        match self {
            Shape::String => "string".into(),
            Shape::Number => "number".into(),
            Shape::Integer => "integer".into(),
            Shape::Bool => "boolean".into(),
            Shape::Enum(variants) => format!("one of {}", variants.join(", ")),
            Shape::Array(_) => "array".into(),
            Shape::Record(_) | Shape::Object(_) => "object".into(),
        }
    }

    fn check(&self, value: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
        match (self, value) {
            (Shape::String, Value::String(_))
            | (Shape::Number, Value::Number(_))
            | (Shape::Bool, Value::Bool(_)) => {}
            (Shape::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => {}
            (Shape::Enum(variants), Value::String(s)) => {
                if !variants.contains(&s.as_str()) {
                    issues.push(ValidationIssue::new(
                        path,
                        format!("expected {}, got {:?}", self.describe(), s),
                    ));
                }
            }
            (Shape::Array(inner), Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.check(item, &format!("{path}[{i}]"), issues);
                }
            }
            (Shape::Record(inner), Value::Object(map)) => {
                for (key, item) in map {
                    inner.check(item, &join(path, key), issues);
                }
            }
            (Shape::Object(fields), Value::Object(map)) => {
                for field in fields.iter() {
                    let child = join(path, field.name);
                    match map.get(field.name) {
                        None | Some(Value::Null) if !field.required => {}
                        None => issues.push(ValidationIssue::new(child, "required field is missing")),
                        Some(item) => field.shape.check(item, &child, issues),
                    }
                }
            }
            (expected, actual) => issues.push(ValidationIssue::new(
                path,
                format!("expected {}, got {}", expected.describe(), type_name(actual)),
            )),
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ENTRY: Shape = Shape::Object(&[
        field!("id", Shape::String),
        field!("kind", Shape::Enum(&["file", "folder"])),
        field!("size"?, Shape::Number),
    ]);

    const LISTING: Shape = Shape::Object(&[
        field!("status", Shape::Enum(&["success", "error"])),
        field!("content", Shape::Array(&ENTRY)),
        field!("tags"?, Shape::Record(&Shape::Array(&Shape::String))),
    ]);

    #[test]
    fn accepts_conforming_value() {
        let value = json!({
            "status": "success",
            "content": [{"id": "a", "kind": "file", "size": 12}, {"id": "b", "kind": "folder"}],
            "tags": {"x": ["1", "2"]},
            "extra": true
        });
        assert!(LISTING.validate(&value).is_empty());
    }

    #[test]
    fn optional_field_accepts_null() {
        let value = json!({"status": "error", "content": [{"id": "a", "kind": "file", "size": null}]});
        assert!(LISTING.validate(&value).is_empty());
    }

    #[test]
    fn reports_every_mismatch_with_its_path() {
        let value = json!({
            "status": "weird",
            "content": [{"kind": "file"}, {"id": 5, "kind": "link", "size": "big"}],
            "tags": {"x": ["ok", 3]}
        });
        let paths: Vec<String> = LISTING.validate(&value).into_iter().map(|i| i.path).collect();
        assert_eq!(
            paths,
            vec![
                "status",
                "content[0].id",
                "content[1].id",
                "content[1].kind",
                "content[1].size",
                "tags.x[1]",
            ]
        );
    }

    #[test]
    fn wrong_root_type_is_a_single_root_issue() {
        let issues = LISTING.validate(&json!([1, 2]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "");
        assert_eq!(issues[0].message, "expected object, got array");
    }

    #[test]
    fn integer_rejects_fractions_but_not_whole_numbers() {
        const STAMPED: Shape = Shape::Object(&[field!("created_at", Shape::Integer)]);
        assert!(STAMPED.validate(&json!({"created_at": 1700000000})).is_empty());

        let issues = STAMPED.validate(&json!({"created_at": 1700000000.5}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "created_at");
        assert_eq!(issues[0].message, "expected integer, got number");
        assert!(STAMPED.validate(&STAMPED.minimal()).is_empty());
    }

    #[test]
    fn required_null_is_rejected() {
        let issues = LISTING.validate(&json!({"status": null, "content": []}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "status");
        assert!(issues[0].message.contains("got null"));
    }

    #[test]
    fn minimal_value_is_valid_and_omits_optionals() {
        let value = LISTING.minimal();
        assert_eq!(value, json!({"status": "success", "content": []}));
        assert!(LISTING.validate(&value).is_empty());
    }
}
