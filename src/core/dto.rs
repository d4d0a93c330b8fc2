//! The DTO entity and the schema trait that configures it

use crate::core::error::{DtoError, ParseError, ValidationError};
use crate::core::fields::{self, Fields};
use crate::core::pipeline::Pipeline;
use crate::core::validation::{Filter, Rules};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Capability trait describing one DTO shape
///
/// Implement it on a unit type (usually through [`crate::dto_schema!`]) and
/// use [`Dto<Self>`](Dto) as the object type. Every method has an empty
/// default, so a schema only declares what it needs.
///
/// ```
/// use dto::prelude::*;
/// use serde_json::json;
///
/// struct Person;
///
/// impl DtoSchema for Person {
///     const NAME: &'static str = "person";
///
///     fn defaults() -> Fields {
///         json!({"age": 0}).as_object().cloned().unwrap_or_default()
///     }
///
///     fn rules() -> Rules {
///         Rules::new()
///             .field("name", [Rule::Required, Rule::String])
///             .field("age", [Rule::Nullable, Rule::Integer, Rule::Min(0.0)])
///     }
/// }
///
/// let person = Dto::<Person>::from_json(r#"{"name": "Ana"}"#).unwrap();
/// assert_eq!(person.get("age"), Some(&json!(0)));
/// ```
pub trait DtoSchema: 'static {
    /// Name used in logs
    const NAME: &'static str;

    /// Restrict fields to keys declared in [`DtoSchema::rules`]
    const WHITELIST: bool = false;

    /// Drop top-level null inputs before defaults are applied
    const STRIP_NULLS: bool = false;

    /// Values filled in when the input omits them
    fn defaults() -> Fields {
        Fields::new()
    }

    /// Validation rules per key
    fn rules() -> Rules {
        Rules::new()
    }

    /// Per-key filters applied after the transform
    fn filters() -> Vec<(String, Filter)> {
        Vec::new()
    }

    /// Derived fields merged over the input and defaults
    fn transform(_fields: &Fields) -> Fields {
        Fields::new()
    }

    /// The construction pipeline for this schema
    fn pipeline() -> Pipeline {
        let pipeline = Pipeline::new(Self::NAME)
            .with_defaults(Self::defaults())
            .with_rules(Self::rules())
            .with_transform(Self::transform)
            .whitelist(Self::WHITELIST)
            .strip_nulls(Self::STRIP_NULLS);

        Self::filters()
            .into_iter()
            .fold(pipeline, |p, (key, filter)| p.with_shared_filter(key, filter))
    }
}

/// Marker for DTOs built from a runtime [`Pipeline`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dynamic {}

/// A validated field map
///
/// Only obtainable through the construction pipeline, so every instance
/// satisfied its rules when it was built. [`Dto::set`] and [`Dto::remove`]
/// mutate the fields directly without re-validating; call [`Dto::validate`]
/// afterwards when that matters.
pub struct Dto<S> {
    fields: Fields,
    _schema: PhantomData<fn() -> S>,
}

impl<S> Dto<S> {
    pub(crate) fn from_validated(fields: Fields) -> Self {
        Self {
            fields,
            _schema: PhantomData,
        }
    }

    /// Value at `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Value at `key`, or `default` when absent
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.fields
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    /// Value at `key` converted to `T`
    ///
    /// `None` when the key is absent or the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.fields
            .get(key)
            .and_then(|value| T::deserialize(value).ok())
    }

    /// Value at a dotted path (`address.city`, `items.0.sku`)
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        fields::lookup(&self.fields, path)
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields
    pub fn count(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Snapshot copy of the fields
    pub fn all(&self) -> Fields {
        self.fields.clone()
    }

    /// Alias of [`Dto::all`]
    pub fn to_array(&self) -> Fields {
        self.all()
    }

    /// The fields as a JSON object value
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Compact JSON encoding of the fields
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Indented JSON encoding of the fields
    pub fn to_json_pretty(&self) -> String {
        format!("{:#}", self.to_value())
    }

    /// Consume the DTO and return its fields
    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Insert or replace a field without re-validating
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Remove a field without re-validating
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }
}

impl<S: DtoSchema> Dto<S> {
    /// Run the schema pipeline over `raw`
    pub fn new(raw: Fields) -> Result<Self, ValidationError> {
        S::pipeline().run(raw).map(Self::from_validated)
    }

    /// Alias of [`Dto::new`]
    pub fn create(raw: Fields) -> Result<Self, ValidationError> {
        Self::new(raw)
    }

    /// Alias of [`Dto::new`]
    pub fn from_array(raw: Fields) -> Result<Self, ValidationError> {
        Self::new(raw)
    }

    /// Build from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, DtoError> {
        let raw = fields::into_fields(value).map_err(|other| ParseError::not_an_object(&other))?;
        Ok(Self::new(raw)?)
    }

    /// Parse a JSON document and build from it
    pub fn from_json(json: &str) -> Result<Self, DtoError> {
        let value: Value = serde_json::from_str(json).map_err(ParseError::from)?;
        Self::from_value(value)
    }

    /// Re-check the current fields against the schema rules
    ///
    /// Defaults, transform and whitelist are not re-applied.
    pub fn validate(&self) -> Result<(), ValidationError> {
        S::pipeline().validate(&self.fields)
    }
}

impl Dto<Dynamic> {
    /// Re-check the current fields against a pipeline's rules
    pub fn validate_with(&self, pipeline: &Pipeline) -> Result<(), ValidationError> {
        pipeline.validate(&self.fields)
    }
}

impl<S> Clone for Dto<S> {
    fn clone(&self) -> Self {
        Self::from_validated(self.fields.clone())
    }
}

impl<S> PartialEq for Dto<S> {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl<S> fmt::Debug for Dto<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dto")
            .field("schema", &std::any::type_name::<S>())
            .field("fields", &self.fields)
            .finish()
    }
}

impl<S> fmt::Display for Dto<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl<S: DtoSchema> TryFrom<Fields> for Dto<S> {
    type Error = ValidationError;

    fn try_from(raw: Fields) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl<S: DtoSchema> FromStr for Dto<S> {
    type Err = DtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

impl<S> Serialize for Dto<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.fields.serialize(serializer)
    }
}

impl<'de, S: DtoSchema> Deserialize<'de> for Dto<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Fields::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
