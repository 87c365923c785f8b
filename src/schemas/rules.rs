//! Field rules and a reader that checks a JSON object field by field, collecting every violation.

use crate::error::ValidationError;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Constraint on a text field. Lengths count characters after optional trimming.
pub struct TextRule {
    pub trim: bool,
    /// Optional fields only: a value that is empty or all whitespace is stored as null.
    pub blank_is_null: bool,
    pub min_chars: usize,
    pub max_chars: usize,
    pub pattern: Option<(fn() -> &'static Regex, &'static str)>,
}

/// Inclusive bounds for an integer field.
pub struct IntRule {
    pub min: i64,
    pub max: i64,
}

pub const NAME: TextRule = TextRule {
    blank_is_null: false,
    trim: true,
    min_chars: 1,
    max_chars: 200,
    pattern: None,
};

pub const LOCATION: TextRule = TextRule {
    blank_is_null: true,
    trim: true,
    min_chars: 0,
    max_chars: 200,
    pattern: None,
};

pub const COMMENT: TextRule = TextRule {
    blank_is_null: true,
    trim: false,
    min_chars: 0,
    max_chars: 2000,
    pattern: None,
};

pub const IMAGE_PATH: TextRule = TextRule {
    blank_is_null: false,
    trim: false,
    min_chars: 1,
    max_chars: 512,
    pattern: Some((
        relative_path,
        "must be a relative path of letters, digits, '.', '_', '-' and '/' without '..'",
    )),
};

pub const TAG_NAME: TextRule = TextRule {
    blank_is_null: false,
    trim: true,
    min_chars: 1,
    max_chars: 64,
    pattern: Some((
        tag_name,
        "may only contain letters, digits, spaces, '_', '.' and '-'",
    )),
};

pub const QUANTITY: IntRule = IntRule {
    min: 0,
    max: 1_000_000_000,
};

/// Ids are SQLite rowids: positive.
pub const ID: IntRule = IntRule { min: 1, max: i64::MAX };

fn relative_path() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Segments may not start with '.', which also rules out "." and "..".
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9._-]*(/[A-Za-z0-9_-][A-Za-z0-9._-]*)*$")
            .expect("static pattern compiles")
    })
}

fn tag_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\p{L}\p{N} _.-]+$").expect("static pattern compiles"))
}

fn is_blank(s: &str, rule: &TextRule) -> bool {
    rule.blank_is_null && s.trim().is_empty()
}

/// Reads fields out of a JSON object. Each accessor records violations instead of failing,
/// so one pass reports every problem with the payload.
pub struct FieldReader {
    fields: Map<String, Value>,
    errors: ValidationError,
}

impl FieldReader {
    /// Start reading `value`, which must be an object whose keys are all in `known`.
    pub fn object(value: Value, known: &[&str]) -> Result<Self, ValidationError> {
        let fields = match value {
            Value::Object(m) => m,
            _ => return Err(ValidationError::single("body", "must be a JSON object")),
        };
        let mut errors = ValidationError::default();
        let mut unknown: Vec<&String> = fields.keys().filter(|k| !known.contains(&k.as_str())).collect();
        unknown.sort();
        for k in unknown {
            errors.push(k.as_str(), "is not a known field");
        }
        Ok(Self { fields, errors })
    }

    /// Optional text: absent or null reads as `None`.
    pub fn text(&mut self, field: &str, rule: &TextRule) -> Option<String> {
        match self.fields.remove(field) {
            None | Some(Value::Null) => None,
            Some(v) => self.check_text(field, v, rule).filter(|s| !is_blank(s, rule)),
        }
    }

    pub fn required_text(&mut self, field: &str, rule: &TextRule) -> Option<String> {
        match self.fields.remove(field) {
            None | Some(Value::Null) => {
                self.errors.push(field, "is required");
                None
            }
            Some(v) => self.check_text(field, v, rule),
        }
    }

    /// Optional integer: absent or null reads as `None`.
    pub fn integer(&mut self, field: &str, rule: &IntRule) -> Option<i64> {
        match self.fields.remove(field) {
            None | Some(Value::Null) => None,
            Some(v) => self.check_int(field, &v, rule),
        }
    }

    /// Patch of a nullable text field: absent = `None`, null = `Some(None)`.
    pub fn patch_text(&mut self, field: &str, rule: &TextRule) -> Option<Option<String>> {
        match self.fields.remove(field) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(v) => self
                .check_text(field, v, rule)
                .map(|s| if is_blank(&s, rule) { None } else { Some(s) }),
        }
    }

    /// Patch of a nullable integer field: absent = `None`, null = `Some(None)`.
    pub fn patch_integer(&mut self, field: &str, rule: &IntRule) -> Option<Option<i64>> {
        match self.fields.remove(field) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(v) => self.check_int(field, &v, rule).map(Some),
        }
    }

    /// Patch of a non-nullable text field: absent = `None`, null is a violation.
    pub fn patch_required_text(&mut self, field: &str, rule: &TextRule) -> Option<String> {
        match self.fields.remove(field) {
            None => None,
            Some(Value::Null) => {
                self.errors.push(field, "may not be null");
                None
            }
            Some(v) => self.check_text(field, v, rule),
        }
    }

    /// Patch of a non-nullable integer field: absent = `None`, null is a violation.
    pub fn patch_required_integer(&mut self, field: &str, rule: &IntRule) -> Option<i64> {
        match self.fields.remove(field) {
            None => None,
            Some(Value::Null) => {
                self.errors.push(field, "may not be null");
                None
            }
            Some(v) => self.check_int(field, &v, rule),
        }
    }

    /// Record a violation found outside the per-field accessors.
    pub fn reject(&mut self, field: &str, message: &str) {
        self.errors.push(field, message);
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        self.errors.into_result()
    }

    fn check_text(&mut self, field: &str, v: Value, rule: &TextRule) -> Option<String> {
        let s = match v {
            Value::String(s) => s,
            _ => {
                self.errors.push(field, "must be a string");
                return None;
            }
        };
        let s = if rule.trim { s.trim().to_string() } else { s };
        let len = s.chars().count();
        if len == 0 && rule.min_chars > 0 {
            self.errors.push(field, "must not be empty");
            return None;
        }
        if len < rule.min_chars {
            self.errors.push(field, format!("must be at least {} characters", rule.min_chars));
            return None;
        }
        if len > rule.max_chars {
            self.errors.push(field, format!("must be at most {} characters", rule.max_chars));
            return None;
        }
        if let Some((pattern, message)) = rule.pattern {
            if !pattern().is_match(&s) {
                self.errors.push(field, message);
                return None;
            }
        }
        Some(s)
    }

    fn check_int(&mut self, field: &str, v: &Value, rule: &IntRule) -> Option<i64> {
        let n = match v.as_i64() {
            Some(n) => n,
            None => {
                self.errors.push(field, "must be an integer");
                return None;
            }
        };
        if n < rule.min {
            self.errors.push(field, format!("must be at least {}", rule.min));
            return None;
        }
        if n > rule.max {
            self.errors.push(field, format!("must be at most {}", rule.max));
            return None;
        }
        Some(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_body_is_rejected() {
        let err = FieldReader::object(json!([1, 2]), &["name"]).err().unwrap();
        assert!(err.has_field("body"));
    }

    #[test]
    fn collects_every_violation() {
        let mut r = FieldReader::object(
            json!({"name": "  ", "quantity": -3, "colour": "red", "comment": 5}),
            &["name", "quantity", "comment"],
        )
        .unwrap();
        r.required_text("name", &NAME);
        r.integer("quantity", &QUANTITY);
        r.text("comment", &COMMENT);
        let err = r.finish().unwrap_err();
        let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["colour", "name", "quantity", "comment"]);
        assert_eq!(err.errors[1].message, "must not be empty");
        assert_eq!(err.errors[2].message, "must be at least 0");
        assert_eq!(err.errors[3].message, "must be a string");
    }

    #[test]
    fn text_is_trimmed_when_rule_says_so() {
        let mut r = FieldReader::object(json!({"name": "  Toolbox "}), &["name"]).unwrap();
        assert_eq!(r.required_text("name", &NAME).as_deref(), Some("Toolbox"));
        assert!(r.finish().is_ok());
    }

    #[test]
    fn integers_reject_fractions_and_strings() {
        let mut r = FieldReader::object(json!({"a": 1.5, "b": "2"}), &["a", "b"]).unwrap();
        assert_eq!(r.integer("a", &QUANTITY), None);
        assert_eq!(r.integer("b", &QUANTITY), None);
        assert_eq!(r.finish().unwrap_err().errors.len(), 2);
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let mut r = FieldReader::object(json!({"comment": null, "name": null}), &["comment", "name", "location"]).unwrap();
        assert_eq!(r.patch_text("comment", &COMMENT), Some(None));
        assert_eq!(r.patch_text("location", &LOCATION), None);
        assert_eq!(r.patch_required_text("name", &NAME), None);
        let err = r.finish().unwrap_err();
        assert_eq!(err.errors, vec![crate::error::FieldError::new("name", "may not be null")]);
    }

    #[test]
    fn blank_optional_text_reads_as_null() {
        let mut r = FieldReader::object(
            json!({"location": "   ", "comment": "", "name": "Shelf"}),
            &["location", "comment", "name"],
        )
        .unwrap();
        assert_eq!(r.text("location", &LOCATION), None);
        assert_eq!(r.patch_text("comment", &COMMENT), Some(None));
        assert_eq!(r.required_text("name", &NAME).as_deref(), Some("Shelf"));
        assert!(r.finish().is_ok());
    }

    #[test]
    fn image_paths_must_be_relative_without_parent_segments() {
        for ok in ["img/box.jpg", "a/b/c_1-2.png", "photo.jpeg"] {
            assert!(relative_path().is_match(ok), "{}", ok);
        }
        for bad in ["/etc/passwd", "../secret", "img/../x", "img//x", ".hidden", "a b.png"] {
            assert!(!relative_path().is_match(bad), "{}", bad);
        }
    }

    #[test]
    fn tag_names_allow_unicode_letters() {
        assert!(tag_name().is_match("Küche 2"));
        assert!(!tag_name().is_match("kitchen/2"));
    }
}
