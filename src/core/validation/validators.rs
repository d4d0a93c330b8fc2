//! Per-rule checks
//!
//! Each check receives the attribute being validated and returns the failure
//! message when the rule does not hold. Presence is handled by the engine;
//! everything here assumes the key exists.

use super::rules::Rule;
use crate::core::fields::{Fields, lookup};
use serde_json::Value;
use validator::{ValidateEmail, ValidateUrl};

/// The value under test and the context a rule may need
pub struct Attribute<'a> {
    /// Concrete key (`items.0.sku`)
    pub key: &'a str,
    /// Value found at `key`, `None` when absent
    pub value: Option<&'a Value>,
    /// The complete field map, for cross-field rules
    pub fields: &'a Fields,
    /// Size strings by numeric value instead of character count
    pub numeric: bool,
}

impl Attribute<'_> {
    /// Human form of the key used in messages
    pub fn label(&self) -> String {
        self.key.replace('_', " ")
    }
}

/// Whether a value counts as "filled" for presence rules
pub fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

/// Run one rule against an attribute
pub fn check(rule: &Rule, attr: &Attribute<'_>) -> Result<(), String> {
    let label = attr.label();
    let value = attr.value.unwrap_or(&Value::Null);

    match rule {
        Rule::Nullable | Rule::Bail => Ok(()),

        Rule::Required => {
            if is_filled(attr.value) {
                Ok(())
            } else {
                Err(format!("The {} field is required.", label))
            }
        }

        Rule::RequiredWith(other) => {
            if is_filled(lookup(attr.fields, other)) && !is_filled(attr.value) {
                Err(format!(
                    "The {} field is required when {} is present.",
                    label,
                    other.replace('_', " ")
                ))
            } else {
                Ok(())
            }
        }

        Rule::RequiredWithout(other) => {
            if !is_filled(lookup(attr.fields, other)) && !is_filled(attr.value) {
                Err(format!(
                    "The {} field is required when {} is not present.",
                    label,
                    other.replace('_', " ")
                ))
            } else {
                Ok(())
            }
        }

        Rule::String => expect(value.is_string(), || {
            format!("The {} field must be a string.", label)
        }),

        Rule::Integer => expect(is_integer(value), || {
            format!("The {} field must be an integer.", label)
        }),

        Rule::Numeric => expect(as_number(value).is_some(), || {
            format!("The {} field must be a number.", label)
        }),

        Rule::Boolean => expect(is_boolean(value), || {
            format!("The {} field must be true or false.", label)
        }),

        Rule::Array => expect(value.is_array() || value.is_object(), || {
            format!("The {} field must be an array.", label)
        }),

        Rule::Min(min) => match size_of(value, attr.numeric) {
            Some((size, unit)) if size < *min => Err(format!(
                "The {} field must be at least {}{}.",
                label,
                min,
                unit.suffix()
            )),
            _ => Ok(()),
        },

        Rule::Max(max) => match size_of(value, attr.numeric) {
            Some((size, unit)) if size > *max => Err(format!(
                "The {} field must not be greater than {}{}.",
                label,
                max,
                unit.suffix()
            )),
            _ => Ok(()),
        },

        Rule::Between(min, max) => match size_of(value, attr.numeric) {
            Some((size, unit)) if size < *min || size > *max => Err(format!(
                "The {} field must be between {} and {}{}.",
                label,
                min,
                max,
                unit.suffix()
            )),
            _ => Ok(()),
        },

        Rule::Size(expected) => match size_of(value, attr.numeric) {
            Some((size, unit)) if size != *expected => Err(format!(
                "The {} field must be {}{}.",
                label,
                expected,
                unit.suffix()
            )),
            _ => Ok(()),
        },

        Rule::Email => expect(
            value.as_str().is_some_and(|s| s.validate_email()),
            || format!("The {} field must be a valid email address.", label),
        ),

        Rule::Url => expect(value.as_str().is_some_and(|s| s.validate_url()), || {
            format!("The {} field must be a valid URL.", label)
        }),

        Rule::Uuid => expect(
            value
                .as_str()
                .is_some_and(|s| uuid::Uuid::parse_str(s).is_ok()),
            || format!("The {} field must be a valid UUID.", label),
        ),

        Rule::Regex(pattern) => match value.as_str().map(|s| pattern.is_match(s)) {
            Some(Some(true)) => Ok(()),
            Some(None) => {
                tracing::warn!(
                    key = attr.key,
                    pattern = pattern.as_str(),
                    "regex rule has an invalid pattern"
                );
                Err(format!("The {} field format is invalid.", label))
            }
            _ => Err(format!("The {} field format is invalid.", label)),
        },

        Rule::In(allowed) => expect(
            scalar_text(value).is_some_and(|s| allowed.contains(&s)),
            || format!("The selected {} is invalid.", label),
        ),

        Rule::NotIn(denied) => expect(
            !scalar_text(value).is_some_and(|s| denied.contains(&s)),
            || format!("The selected {} is invalid.", label),
        ),

        Rule::DateFormat(format) => expect(
            value.as_str().is_some_and(|s| parses_with(s, format)),
            || format!("The {} field must match the format {}.", label, format),
        ),

        Rule::Same(other) => expect(lookup(attr.fields, other) == attr.value, || {
            format!(
                "The {} field must match {}.",
                label,
                other.replace('_', " ")
            )
        }),

        Rule::Different(other) => expect(lookup(attr.fields, other) != attr.value, || {
            format!(
                "The {} field and {} must be different.",
                label,
                other.replace('_', " ")
            )
        }),

        Rule::Confirmed => {
            let confirmation = format!("{}_confirmation", attr.key);
            expect(lookup(attr.fields, &confirmation) == attr.value, || {
                format!("The {} field confirmation does not match.", label)
            })
        }
    }
}

fn expect(ok: bool, message: impl FnOnce() -> String) -> Result<(), String> {
    if ok { Ok(()) } else { Err(message()) }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => false,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn is_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Number(n) => matches!(n.as_i64(), Some(0 | 1)),
        Value::String(s) => matches!(s.as_str(), "0" | "1" | "true" | "false"),
        _ => false,
    }
}

/// Text form of a scalar for membership rules
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parses_with(input: &str, format: &str) -> bool {
    chrono::NaiveDateTime::parse_from_str(input, format).is_ok()
        || chrono::NaiveDate::parse_from_str(input, format).is_ok()
        || chrono::NaiveTime::parse_from_str(input, format).is_ok()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SizeUnit {
    Value,
    Characters,
    Items,
}

impl SizeUnit {
    fn suffix(self) -> &'static str {
        match self {
            SizeUnit::Value => "",
            SizeUnit::Characters => " characters",
            SizeUnit::Items => " items",
        }
    }
}

/// Size of a value for min/max/between/size
///
/// Numbers measure by value, strings by character count (or by value when a
/// numeric type rule is declared), arrays and objects by item count.
fn size_of(value: &Value, numeric: bool) -> Option<(f64, SizeUnit)> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| (f, SizeUnit::Value)),
        Value::String(s) if numeric => as_number(value)
            .map(|f| (f, SizeUnit::Value))
            .or(Some((s.chars().count() as f64, SizeUnit::Characters))),
        Value::String(s) => Some((s.chars().count() as f64, SizeUnit::Characters)),
        Value::Array(items) => Some((items.len() as f64, SizeUnit::Items)),
        Value::Object(map) => Some((map.len() as f64, SizeUnit::Items)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(rule: Rule, value: Value) -> Result<(), String> {
        run_with(rule, "field", Some(value), &Fields::new(), false)
    }

    fn run_with(
        rule: Rule,
        key: &str,
        value: Option<Value>,
        fields: &Fields,
        numeric: bool,
    ) -> Result<(), String> {
        let attr = Attribute {
            key,
            value: value.as_ref(),
            fields,
            numeric,
        };
        check(&rule, &attr)
    }

    fn fields(value: Value) -> Fields {
        serde_json::from_value(value).expect("object literal")
    }

    // === required ===

    #[test]
    fn test_required_null_value_returns_error() {
        let result = run(Rule::Required, json!(null));
        assert_eq!(result.unwrap_err(), "The field field is required.");
    }

    #[test]
    fn test_required_absent_returns_error() {
        assert!(run_with(Rule::Required, "name", None, &Fields::new(), false).is_err());
    }

    #[test]
    fn test_required_blank_string_returns_error() {
        assert!(run(Rule::Required, json!("   ")).is_err());
    }

    #[test]
    fn test_required_empty_array_returns_error() {
        assert!(run(Rule::Required, json!([])).is_err());
    }

    #[test]
    fn test_required_zero_and_false_are_filled() {
        assert!(run(Rule::Required, json!(0)).is_ok());
        assert!(run(Rule::Required, json!(false)).is_ok());
    }

    #[test]
    fn test_required_label_replaces_underscores() {
        let err = run_with(Rule::Required, "first_name", None, &Fields::new(), false);
        assert_eq!(err.unwrap_err(), "The first name field is required.");
    }

    // === types ===

    #[test]
    fn test_string_rejects_number() {
        assert!(run(Rule::String, json!(1)).is_err());
        assert!(run(Rule::String, json!("1")).is_ok());
    }

    #[test]
    fn test_integer_accepts_numeric_strings_and_whole_floats() {
        assert!(run(Rule::Integer, json!(42)).is_ok());
        assert!(run(Rule::Integer, json!("42")).is_ok());
        assert!(run(Rule::Integer, json!(3.0)).is_ok());
        assert!(run(Rule::Integer, json!(3.5)).is_err());
        assert!(run(Rule::Integer, json!(null)).is_err());
    }

    #[test]
    fn test_numeric() {
        assert!(run(Rule::Numeric, json!("3.14")).is_ok());
        assert!(run(Rule::Numeric, json!("pi")).is_err());
    }

    #[test]
    fn test_boolean() {
        assert!(run(Rule::Boolean, json!(true)).is_ok());
        assert!(run(Rule::Boolean, json!(1)).is_ok());
        assert!(run(Rule::Boolean, json!("false")).is_ok());
        assert!(run(Rule::Boolean, json!("yes")).is_err());
    }

    #[test]
    fn test_array_accepts_lists_and_maps() {
        assert!(run(Rule::Array, json!([1])).is_ok());
        assert!(run(Rule::Array, json!({"a": 1})).is_ok());
        assert!(run(Rule::Array, json!("a")).is_err());
    }

    // === sizes ===

    #[test]
    fn test_min_on_number() {
        let err = run(Rule::Min(0.0), json!(-1)).unwrap_err();
        assert_eq!(err, "The field field must be at least 0.");
        assert!(run(Rule::Min(0.0), json!(0)).is_ok());
    }

    #[test]
    fn test_max_on_string_counts_characters() {
        let err = run(Rule::Max(3.0), json!("héllo")).unwrap_err();
        assert!(err.contains("3 characters"));
        assert!(run(Rule::Max(5.0), json!("héllo")).is_ok());
    }

    #[test]
    fn test_min_on_numeric_string_with_numeric_rule() {
        let empty = Fields::new();
        assert!(run_with(Rule::Min(10.0), "n", Some(json!("12")), &empty, true).is_ok());
        assert!(run_with(Rule::Min(10.0), "n", Some(json!("12")), &empty, false).is_err());
    }

    #[test]
    fn test_between_on_array_counts_items() {
        assert!(run(Rule::Between(1.0, 2.0), json!([1, 2])).is_ok());
        let err = run(Rule::Between(1.0, 2.0), json!([1, 2, 3])).unwrap_err();
        assert!(err.contains("items"));
    }

    #[test]
    fn test_size_exact() {
        assert!(run(Rule::Size(2.0), json!("ab")).is_ok());
        assert!(run(Rule::Size(2.0), json!("abc")).is_err());
    }

    #[test]
    fn test_size_rules_ignore_non_sizable() {
        assert!(run(Rule::Max(1.0), json!(true)).is_ok());
    }

    // === formats ===

    #[test]
    fn test_email() {
        assert!(run(Rule::Email, json!("a@b.com")).is_ok());
        assert!(run(Rule::Email, json!("invalid-email")).is_err());
        assert!(run(Rule::Email, json!(42)).is_err());
    }

    #[test]
    fn test_url() {
        assert!(run(Rule::Url, json!("https://example.com/path")).is_ok());
        assert!(run(Rule::Url, json!("not a url")).is_err());
    }

    #[test]
    fn test_uuid() {
        assert!(run(Rule::Uuid, json!("67e55044-10b1-426f-9247-bb680e5fe0c8")).is_ok());
        assert!(run(Rule::Uuid, json!("not-a-uuid")).is_err());
    }

    #[test]
    fn test_regex() {
        assert!(run(Rule::regex(r"^[A-Z]{3}\d{3}$"), json!("ABC123")).is_ok());
        assert!(run(Rule::regex(r"^[A-Z]{3}\d{3}$"), json!("abc123")).is_err());
    }

    #[test]
    fn test_regex_invalid_pattern_fails() {
        assert!(run(Rule::regex("("), json!("(")).is_err());
    }

    #[test]
    fn test_in_list() {
        let rule = Rule::in_list(["active", "inactive"]);
        assert!(run(rule.clone(), json!("active")).is_ok());
        assert_eq!(
            run(rule, json!("deleted")).unwrap_err(),
            "The selected field is invalid."
        );
    }

    #[test]
    fn test_in_list_matches_numbers_as_text() {
        assert!(run(Rule::in_list(["1", "2"]), json!(2)).is_ok());
    }

    #[test]
    fn test_not_in() {
        assert!(run(Rule::not_in(["root"]), json!("root")).is_err());
        assert!(run(Rule::not_in(["root"]), json!("ana")).is_ok());
    }

    #[test]
    fn test_date_format() {
        let rule = Rule::DateFormat("%Y-%m-%d".to_string());
        assert!(run(rule.clone(), json!("2024-01-15")).is_ok());
        assert!(run(rule, json!("15/01/2024")).is_err());
    }

    #[test]
    fn test_date_format_with_time() {
        let rule = Rule::DateFormat("%Y-%m-%d %H:%M".to_string());
        assert!(run(rule, json!("2024-01-15 10:30")).is_ok());
    }

    // === cross-field ===

    #[test]
    fn test_same_and_different() {
        let f = fields(json!({"password": "s3cret", "repeat": "s3cret"}));
        assert!(
            run_with(Rule::Same("password".into()), "repeat", Some(json!("s3cret")), &f, false)
                .is_ok()
        );
        assert!(
            run_with(Rule::Different("password".into()), "repeat", Some(json!("s3cret")), &f, false)
                .is_err()
        );
    }

    #[test]
    fn test_confirmed() {
        let f = fields(json!({"password": "a", "password_confirmation": "b"}));
        let err = run_with(Rule::Confirmed, "password", Some(json!("a")), &f, false);
        assert_eq!(
            err.unwrap_err(),
            "The password field confirmation does not match."
        );
    }

    #[test]
    fn test_required_with() {
        let f = fields(json!({"phone": "123"}));
        let rule = Rule::RequiredWith("phone".into());
        assert!(run_with(rule.clone(), "country", None, &f, false).is_err());
        assert!(run_with(rule, "country", None, &Fields::new(), false).is_ok());
    }

    #[test]
    fn test_required_without() {
        let rule = Rule::RequiredWithout("email".into());
        assert!(run_with(rule.clone(), "phone", None, &Fields::new(), false).is_err());
        let f = fields(json!({"email": "a@b.com"}));
        assert!(run_with(rule, "phone", None, &f, false).is_ok());
    }
}
