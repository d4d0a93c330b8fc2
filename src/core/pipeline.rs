//! The DTO construction pipeline
//!
//! Every DTO is built by the same fixed sequence of stages:
//!
//! ```text
//! raw ──▶ strip nulls? ──▶ fill defaults ──▶ merge transform ──▶ filters
//!     ──▶ whitelist? ──▶ validate ──▶ fields
//! ```
//!
//! Reordering the stages changes observable behaviour: defaults and derived
//! fields may populate whitelisted keys, and validation only ever sees the keys
//! that survived the whitelist.
//!
//! A [`Pipeline`] is a plain configuration value, so DTO shapes can be defined
//! at runtime (see [`crate::config::SchemaConfig`]); static schemas build one
//! through [`crate::core::dto::DtoSchema::pipeline`].

use crate::core::dto::{Dto, Dynamic};
use crate::core::error::{DtoError, ParseError, ValidationError};
use crate::core::fields::{self, Fields};
use crate::core::validation::{Filter, RuleEngine, RuleSet, Rules, ValidationEngine};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Derives additional fields from the working field map
pub type Transform = Arc<dyn Fn(&Fields) -> Fields + Send + Sync>;

/// Configuration for building DTOs from raw field maps
#[derive(Clone)]
pub struct Pipeline {
    name: String,
    defaults: Fields,
    rules: Rules,
    filters: Vec<(String, Filter)>,
    transform: Option<Transform>,
    whitelist: bool,
    strip_nulls: bool,
    engine: Arc<dyn ValidationEngine>,
}

impl Pipeline {
    /// Create an empty pipeline: no defaults, no rules, whitelisting off
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: Fields::new(),
            rules: Rules::new(),
            filters: Vec::new(),
            transform: None,
            whitelist: false,
            strip_nulls: false,
            engine: Arc::new(RuleEngine),
        }
    }

    /// Replace the default values
    pub fn with_defaults(mut self, defaults: Fields) -> Self {
        self.defaults = defaults;
        self
    }

    /// Add a single default value
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Replace the rules
    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    /// Declare the rule-set for one key
    pub fn with_rule(mut self, key: impl Into<String>, rules: impl Into<RuleSet>) -> Self {
        self.rules.insert(key, rules);
        self
    }

    /// Append a filter for a top-level key
    ///
    /// Filters for the same key run in the order they were added.
    pub fn with_filter<F>(mut self, key: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&str, Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.filters.push((key.into(), Arc::new(filter)));
        self
    }

    /// Append an already shared filter
    pub fn with_shared_filter(mut self, key: impl Into<String>, filter: Filter) -> Self {
        self.filters.push((key.into(), filter));
        self
    }

    /// Set the transform stage
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Fields) -> Fields + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Restrict the fields to keys that have declared rules
    ///
    /// A dotted rule such as `customer.email` keeps its top-level `customer`
    /// key. Filters for keys the whitelist drops are skipped.
    ///
    /// With no rules declared every field is dropped; that is almost always a
    /// misconfiguration and is logged as a warning on each construction.
    pub fn whitelist(mut self, enabled: bool) -> Self {
        self.whitelist = enabled;
        self
    }

    /// Drop top-level null inputs before defaults are applied
    pub fn strip_nulls(mut self, enabled: bool) -> Self {
        self.strip_nulls = enabled;
        self
    }

    /// Swap the validation engine
    pub fn with_engine<E: ValidationEngine + 'static>(mut self, engine: E) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn defaults(&self) -> &Fields {
        &self.defaults
    }

    pub fn is_whitelisted(&self) -> bool {
        self.whitelist
    }

    pub fn strips_nulls(&self) -> bool {
        self.strip_nulls
    }

    /// Run every stage and return the final field map
    pub fn run(&self, raw: Fields) -> Result<Fields, ValidationError> {
        let mut working = raw;

        if self.strip_nulls {
            fields::strip_nulls(&mut working);
        }

        fields::fill_defaults(&mut working, self.defaults.clone());
        tracing::debug!(dto = %self.name, fields = working.len(), "defaults applied");

        if let Some(transform) = &self.transform {
            let derived = transform(&working);
            fields::deep_merge(&mut working, derived);
            tracing::debug!(dto = %self.name, fields = working.len(), "transform applied");
        }

        self.apply_filters(&mut working)?;

        if self.whitelist {
            if self.rules.is_empty() {
                tracing::warn!(
                    dto = %self.name,
                    "whitelist enabled without rules; every field is dropped"
                );
            }
            working.retain(|key, _| self.rules.addresses(key));
            tracing::debug!(dto = %self.name, fields = working.len(), "whitelist applied");
        }

        if let Err(err) = self.engine.validate(&working, &self.rules) {
            tracing::debug!(dto = %self.name, failures = err.len(), "validation failed");
            return Err(err);
        }

        Ok(working)
    }

    /// Validate an existing field map against this pipeline's rules only
    pub fn validate(&self, fields: &Fields) -> Result<(), ValidationError> {
        self.engine.validate(fields, &self.rules)
    }

    /// Build a DTO from a field map
    pub fn construct(&self, raw: Fields) -> Result<Dto<Dynamic>, ValidationError> {
        self.run(raw).map(Dto::from_validated)
    }

    /// Build a DTO from a JSON value, which must be an object
    pub fn from_value(&self, value: Value) -> Result<Dto<Dynamic>, DtoError> {
        let raw = fields::into_fields(value).map_err(|other| ParseError::not_an_object(&other))?;
        Ok(self.construct(raw)?)
    }

    /// Build a DTO from a JSON document, which must be an object
    pub fn from_json(&self, json: &str) -> Result<Dto<Dynamic>, DtoError> {
        let value: Value = serde_json::from_str(json).map_err(ParseError::from)?;
        self.from_value(value)
    }

    fn apply_filters(&self, working: &mut Fields) -> Result<(), ValidationError> {
        for (key, filter) in &self.filters {
            if self.whitelist && !self.rules.addresses(key) {
                continue;
            }
            let Some(slot) = working.get_mut(key) else {
                continue;
            };
            let current = std::mem::take(slot);
            *slot = filter(key, current).map_err(|e| {
                ValidationError::field(
                    key.clone(),
                    format!("The {} field could not be filtered: {}", key.replace('_', " "), e),
                )
            })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("defaults", &self.defaults)
            .field("rules", &self.rules)
            .field(
                "filters",
                &self.filters.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .field("transform", &self.transform.is_some())
            .field("whitelist", &self.whitelist)
            .field("strip_nulls", &self.strip_nulls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::{Rule, filters};
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        fields::into_fields(value).expect("object literal")
    }

    fn person() -> Pipeline {
        Pipeline::new("person")
            .with_default("age", 0)
            .with_rule("name", [Rule::Required, Rule::String])
            .with_rule("age", [Rule::Nullable, Rule::Integer, Rule::Min(0.0)])
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let out = person().run(fields(json!({"name": "Ana"}))).unwrap();
        assert_eq!(Value::Object(out), json!({"name": "Ana", "age": 0}));
    }

    #[test]
    fn test_input_overrides_defaults() {
        let out = person().run(fields(json!({"name": "Ana", "age": 7}))).unwrap();
        assert_eq!(out["age"], json!(7));
    }

    #[test]
    fn test_invalid_input_fails_on_key() {
        let err = person()
            .run(fields(json!({"age": -1, "name": "Ana"})))
            .unwrap_err();
        assert!(err.has("age"));
        assert!(!err.has("name"));
    }

    #[test]
    fn test_transform_wins_over_input_and_defaults() {
        let p = person().with_transform(|f: &Fields| {
            let mut out = Fields::new();
            if let Some(name) = f.get("name").and_then(Value::as_str) {
                out.insert("name".into(), json!(name.to_uppercase()));
            }
            out.insert("age".into(), json!(99));
            out
        });
        let out = p.run(fields(json!({"name": "ana", "age": 1}))).unwrap();
        assert_eq!(Value::Object(out), json!({"name": "ANA", "age": 99}));
    }

    #[test]
    fn test_transform_deep_merges_nested_objects() {
        let p = Pipeline::new("nested")
            .with_defaults(fields(json!({"meta": {"source": "api", "version": 1}})))
            .with_transform(|_: &Fields| fields(json!({"meta": {"version": 2}})));
        let out = p.run(fields(json!({"meta": {"trace": "x"}}))).unwrap();
        assert_eq!(
            Value::Object(out),
            json!({"meta": {"trace": "x", "source": "api", "version": 2}})
        );
    }

    #[test]
    fn test_transform_sees_defaults() {
        let p = Pipeline::new("derived")
            .with_default("first", "Ada")
            .with_transform(|f: &Fields| {
                let first = f.get("first").and_then(Value::as_str).unwrap_or_default();
                fields(json!({"greeting": format!("Hello {}", first)}))
            });
        let out = p.run(Fields::new()).unwrap();
        assert_eq!(out["greeting"], json!("Hello Ada"));
    }

    #[test]
    fn test_whitelist_drops_undeclared_keys_before_validation() {
        let p = Pipeline::new("signup")
            .whitelist(true)
            .with_rule("email", [Rule::Required]);
        let out = p
            .run(fields(json!({"email": "a@b.com", "extra": "x"})))
            .unwrap();
        assert_eq!(Value::Object(out), json!({"email": "a@b.com"}));
    }

    #[test]
    fn test_whitelist_keeps_survivor_order() {
        let p = Pipeline::new("ordered")
            .whitelist(true)
            .with_rule("b", RuleSet::new())
            .with_rule("a", RuleSet::new());
        let out = p.run(fields(json!({"a": 1, "x": 0, "b": 2}))).unwrap();
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_whitelist_without_rules_empties_fields() {
        let p = Pipeline::new("empty").whitelist(true);
        let out = p.run(fields(json!({"a": 1}))).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_whitelist_lets_derived_fields_through() {
        let p = Pipeline::new("slugged")
            .whitelist(true)
            .with_rule("slug", [Rule::Required])
            .with_transform(|f: &Fields| {
                let title = f.get("title").and_then(Value::as_str).unwrap_or_default();
                fields(json!({"slug": title.to_lowercase().replace(' ', "-")}))
            });
        let out = p.run(fields(json!({"title": "Hello World"}))).unwrap();
        assert_eq!(Value::Object(out), json!({"slug": "hello-world"}));
    }

    #[test]
    fn test_strip_nulls_lets_defaults_fill_in() {
        let out = person()
            .strip_nulls(true)
            .run(fields(json!({"name": "Ana", "age": null})))
            .unwrap();
        assert_eq!(out["age"], json!(0));
    }

    #[test]
    fn test_without_strip_nulls_null_input_wins() {
        let out = person()
            .run(fields(json!({"name": "Ana", "age": null})))
            .unwrap();
        assert_eq!(out["age"], json!(null));
    }

    #[test]
    fn test_filters_run_before_validation() {
        let p = Pipeline::new("contact")
            .with_rule("email", [Rule::Required, Rule::Email])
            .with_filter("email", filters::trim())
            .with_filter("email", filters::lowercase());
        let out = p.run(fields(json!({"email": "  Ana@Example.COM "}))).unwrap();
        assert_eq!(out["email"], json!("ana@example.com"));
    }

    #[test]
    fn test_filter_failure_is_validation_error() {
        let p = Pipeline::new("strict")
            .with_filter("n", |_: &str, _: Value| Err(anyhow::anyhow!("boom")));
        let err = p.run(fields(json!({"n": 1}))).unwrap_err();
        assert!(err.first("n").unwrap().contains("boom"));
    }

    #[test]
    fn test_whitelist_skips_filters_on_dropped_keys() {
        let p = Pipeline::new("strict")
            .whitelist(true)
            .with_rule("email", [Rule::Required])
            .with_filter("debug", |_: &str, _: Value| Err(anyhow::anyhow!("boom")));
        let out = p
            .run(fields(json!({"email": "a@b.com", "debug": 1})))
            .unwrap();
        assert_eq!(Value::Object(out), json!({"email": "a@b.com"}));
    }

    #[test]
    fn test_whitelist_keeps_root_of_dotted_rule() {
        let p = Pipeline::new("order")
            .whitelist(true)
            .with_rule("customer.email", [Rule::Required, Rule::Email]);
        let out = p
            .run(fields(json!({"customer": {"email": "a@b.io"}, "extra": 1})))
            .unwrap();
        assert_eq!(Value::Object(out), json!({"customer": {"email": "a@b.io"}}));
    }

    #[test]
    fn test_whitelist_drops_literal_dotted_key() {
        let p = Pipeline::new("p")
            .whitelist(true)
            .with_rule("a.b", [Rule::Required]);
        assert!(p.run(fields(json!({"a": {"b": 1}}))).is_ok());

        let err = p.run(fields(json!({"a.b": 1}))).unwrap_err();
        assert_eq!(err.first("a.b"), Some("The a.b field is required."));
    }

    #[test]
    fn test_custom_engine_is_used() {
        struct RejectAll;
        impl ValidationEngine for RejectAll {
            fn validate(&self, _: &Fields, _: &Rules) -> Result<(), ValidationError> {
                Err(ValidationError::field("*", "rejected"))
            }
        }

        let p = Pipeline::new("closed").with_engine(RejectAll);
        assert!(p.run(Fields::new()).is_err());
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        let err = person().from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, DtoError::Parse(_)));
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let err = person().from_json("{\"name\": ").unwrap_err();
        assert!(matches!(err, DtoError::Parse(_)));
    }

    #[test]
    fn test_from_json_runs_validation() {
        let err = person().from_json("{}").unwrap_err();
        assert!(err.as_validation().is_some_and(|e| e.has("name")));
    }
}
