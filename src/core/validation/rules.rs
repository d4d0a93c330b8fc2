//! Declarative rule grammar
//!
//! A [`RuleSet`] is the list of constraints declared for one key, written
//! either with the [`Rule`] constructors or in the compact textual form
//! `required|string|max:255`. [`Rules`] maps keys (dotted, optionally with
//! `*` wildcards) to their rule-sets.

use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing textual rule-sets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Unknown validation rule '{rule}'")]
    Unknown { rule: String },

    #[error("Validation rule '{rule}' requires a parameter")]
    MissingParameter { rule: String },

    #[error("Invalid parameter '{value}' for validation rule '{rule}'")]
    InvalidParameter { rule: String, value: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// A compiled regular expression that remembers its source
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: Result<Regex, String>,
}

impl Pattern {
    /// Compile `source`
    ///
    /// Never fails; an invalid expression makes every match attempt fail and
    /// is reported by [`Pattern::check`].
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source).map_err(|e| e.to_string());
        Self { source, compiled }
    }

    /// Compile `source`, rejecting invalid expressions
    pub fn try_new(source: impl Into<String>) -> Result<Self, RuleError> {
        let pattern = Self::new(source);
        pattern.check()?;
        Ok(pattern)
    }

    /// The original expression
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Ok when the expression compiled
    pub fn check(&self) -> Result<(), RuleError> {
        match &self.compiled {
            Ok(_) => Ok(()),
            Err(message) => Err(RuleError::InvalidPattern {
                pattern: self.source.clone(),
                message: message.clone(),
            }),
        }
    }

    /// `None` when the expression failed to compile
    pub fn is_match(&self, haystack: &str) -> Option<bool> {
        self.compiled.as_ref().ok().map(|re| re.is_match(haystack))
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A single constraint on a field
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Present, not null, not an empty string/array/object
    Required,
    /// Null values skip the remaining non-presence rules
    Nullable,
    /// Stop at the first failure for this key
    Bail,
    String,
    Integer,
    Numeric,
    Boolean,
    /// Array or object
    Array,
    /// Size at least `n` (value, character count or item count)
    Min(f64),
    /// Size at most `n`
    Max(f64),
    /// Size within `[min, max]`
    Between(f64, f64),
    /// Size exactly `n`
    Size(f64),
    Email,
    Url,
    Uuid,
    Regex(Pattern),
    In(Vec<String>),
    NotIn(Vec<String>),
    /// chrono format string
    DateFormat(String),
    /// Equal to the value at another key
    Same(String),
    /// Different from the value at another key
    Different(String),
    /// Equal to `{key}_confirmation`
    Confirmed,
    /// Required when another key is present
    RequiredWith(String),
    /// Required when another key is absent
    RequiredWithout(String),
}

impl Rule {
    /// Rules that run even when the key is absent
    pub fn is_implicit(&self) -> bool {
        matches!(
            self,
            Rule::Required | Rule::RequiredWith(_) | Rule::RequiredWithout(_)
        )
    }

    /// Shorthand for [`Rule::Regex`]
    pub fn regex(pattern: &str) -> Self {
        Rule::Regex(Pattern::new(pattern))
    }

    /// Shorthand for [`Rule::In`]
    pub fn in_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::In(values.into_iter().map(Into::into).collect())
    }

    /// Shorthand for [`Rule::NotIn`]
    pub fn not_in<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::NotIn(values.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "required"),
            Rule::Nullable => write!(f, "nullable"),
            Rule::Bail => write!(f, "bail"),
            Rule::String => write!(f, "string"),
            Rule::Integer => write!(f, "integer"),
            Rule::Numeric => write!(f, "numeric"),
            Rule::Boolean => write!(f, "boolean"),
            Rule::Array => write!(f, "array"),
            Rule::Min(n) => write!(f, "min:{}", n),
            Rule::Max(n) => write!(f, "max:{}", n),
            Rule::Between(a, b) => write!(f, "between:{},{}", a, b),
            Rule::Size(n) => write!(f, "size:{}", n),
            Rule::Email => write!(f, "email"),
            Rule::Url => write!(f, "url"),
            Rule::Uuid => write!(f, "uuid"),
            Rule::Regex(p) => write!(f, "regex:/{}/", p.as_str()),
            Rule::In(values) => write!(f, "in:{}", values.join(",")),
            Rule::NotIn(values) => write!(f, "not_in:{}", values.join(",")),
            Rule::DateFormat(format) => write!(f, "date_format:{}", format),
            Rule::Same(other) => write!(f, "same:{}", other),
            Rule::Different(other) => write!(f, "different:{}", other),
            Rule::Confirmed => write!(f, "confirmed"),
            Rule::RequiredWith(other) => write!(f, "required_with:{}", other),
            Rule::RequiredWithout(other) => write!(f, "required_without:{}", other),
        }
    }
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, param) = match s.split_once(':') {
            Some((name, param)) => (name.trim(), Some(param)),
            None => (s.trim(), None),
        };

        let require = || {
            param.ok_or_else(|| RuleError::MissingParameter {
                rule: name.to_string(),
            })
        };
        let number = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| RuleError::InvalidParameter {
                    rule: name.to_string(),
                    value: value.to_string(),
                })
        };
        let list = |value: &str| -> Vec<String> {
            value.split(',').map(|v| v.trim().to_string()).collect()
        };

        let rule = match name {
            "required" => Rule::Required,
            "nullable" => Rule::Nullable,
            "bail" => Rule::Bail,
            "string" => Rule::String,
            "integer" | "int" => Rule::Integer,
            "numeric" => Rule::Numeric,
            "boolean" | "bool" => Rule::Boolean,
            "array" => Rule::Array,
            "email" => Rule::Email,
            "url" => Rule::Url,
            "uuid" => Rule::Uuid,
            "confirmed" => Rule::Confirmed,
            "min" => Rule::Min(number(require()?)?),
            "max" => Rule::Max(number(require()?)?),
            "size" => Rule::Size(number(require()?)?),
            "between" => {
                let raw = require()?;
                let (min, max) = raw.split_once(',').ok_or_else(|| RuleError::InvalidParameter {
                    rule: name.to_string(),
                    value: raw.to_string(),
                })?;
                Rule::Between(number(min)?, number(max)?)
            }
            "regex" => {
                let raw = require()?;
                let source = raw
                    .strip_prefix('/')
                    .and_then(|rest| rest.strip_suffix('/'))
                    .unwrap_or(raw);
                Rule::Regex(Pattern::try_new(source)?)
            }
            "in" => Rule::In(list(require()?)),
            "not_in" => Rule::NotIn(list(require()?)),
            "date_format" => Rule::DateFormat(require()?.to_string()),
            "same" => Rule::Same(require()?.trim().to_string()),
            "different" => Rule::Different(require()?.trim().to_string()),
            "required_with" => Rule::RequiredWith(require()?.trim().to_string()),
            "required_without" => Rule::RequiredWithout(require()?.trim().to_string()),
            other => {
                return Err(RuleError::Unknown {
                    rule: other.to_string(),
                });
            }
        };

        Ok(rule)
    }
}

/// The constraints declared for one key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet(Vec<Rule>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule
    pub fn with(mut self, rule: Rule) -> Self {
        self.0.push(rule);
        self
    }

    pub fn push(&mut self, rule: Rule) {
        self.0.push(rule);
    }

    pub fn contains(&self, rule: &Rule) -> bool {
        self.0.contains(rule)
    }

    /// Whether null values skip the remaining checks
    pub fn is_nullable(&self) -> bool {
        self.0.contains(&Rule::Nullable)
    }

    /// Whether checking stops at the first failure
    pub fn bails(&self) -> bool {
        self.0.contains(&Rule::Bail)
    }

    /// Whether a numeric type rule is declared, so strings are sized by value
    pub fn is_numeric(&self) -> bool {
        self.0
            .iter()
            .any(|rule| matches!(rule, Rule::Integer | Rule::Numeric))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromStr for RuleSet {
    type Err = RuleError;

    /// Parse `required|string|max:255`
    ///
    /// A `|` inside a regex parameter splits the rule-set; declare such
    /// patterns with [`Rule::regex`] instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('|')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Rule::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(RuleSet)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("|"))
    }
}

impl<const N: usize> From<[Rule; N]> for RuleSet {
    fn from(rules: [Rule; N]) -> Self {
        RuleSet(rules.into())
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        RuleSet(rules)
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        RuleSet(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Rule-sets keyed by field, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rules(IndexMap<String, RuleSet>);

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the rule-set for `key`, replacing any previous one
    pub fn field(mut self, key: impl Into<String>, rules: impl Into<RuleSet>) -> Self {
        self.0.insert(key.into(), rules.into());
        self
    }

    /// Declare a rule-set from its textual form
    pub fn parse_field(self, key: impl Into<String>, rules: &str) -> Result<Self, RuleError> {
        Ok(self.field(key, rules.parse::<RuleSet>()?))
    }

    pub fn insert(&mut self, key: impl Into<String>, rules: impl Into<RuleSet>) {
        self.0.insert(key.into(), rules.into());
    }

    pub fn get(&self, key: &str) -> Option<&RuleSet> {
        self.0.get(key)
    }

    /// Whether a rule-set is declared for exactly `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Whether a top-level input key is addressed by any declared rule
    ///
    /// `customer.email` addresses `customer`, and a leading `*` addresses every
    /// key. A literal key containing dots is not addressed by a dotted rule,
    /// since the rule resolves as a nested path.
    pub fn addresses(&self, key: &str) -> bool {
        self.0.keys().any(|rule_key| {
            let root = rule_key.split('.').next().unwrap_or(rule_key);
            root == key || root == "*"
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSet)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, R: Into<RuleSet>> FromIterator<(K, R)> for Rules {
    fn from_iter<I: IntoIterator<Item = (K, R)>>(iter: I) -> Self {
        Rules(
            iter.into_iter()
                .map(|(k, r)| (k.into(), r.into()))
                .collect(),
        )
    }
}
