//! Validation engine seam
//!
//! The pipeline only needs `validate(fields, rules)`; [`RuleEngine`] is the
//! built-in implementation of the rule grammar in [`super::rules`].

use super::rules::{Rule, Rules};
use super::validators::{Attribute, check};
use crate::core::error::ValidationError;
use crate::core::fields::{Fields, resolve};
use indexmap::IndexMap;
use serde_json::Value;

/// Validates a field map against declared rules
///
/// Implementations must collect every failure rather than stop at the first
/// one, and must be reentrant: a single engine is shared by every DTO built
/// from the same pipeline.
pub trait ValidationEngine: Send + Sync {
    fn validate(&self, fields: &Fields, rules: &Rules) -> Result<(), ValidationError>;
}

/// The built-in rule evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ValidationEngine for RuleEngine {
    fn validate(&self, fields: &Fields, rules: &Rules) -> Result<(), ValidationError> {
        let mut errors: IndexMap<String, Vec<String>> = IndexMap::new();

        for (pattern, rule_set) in rules.iter() {
            for (key, value) in resolve(fields, pattern) {
                let attr = Attribute {
                    key: &key,
                    value,
                    fields,
                    numeric: rule_set.is_numeric(),
                };

                let present = value.is_some();
                let skip_null = rule_set.is_nullable() && matches!(value, Some(Value::Null));

                for rule in rule_set {
                    // absent keys and nullable nulls only answer to presence rules
                    if (!present || skip_null) && !rule.is_implicit() {
                        continue;
                    }
                    if let Err(message) = check(rule, &attr) {
                        errors.entry(key.clone()).or_default().push(message);
                        if rule_set.bails() || *rule == Rule::Required {
                            break;
                        }
                    }
                }
            }
        }

        match ValidationError::from_errors(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
