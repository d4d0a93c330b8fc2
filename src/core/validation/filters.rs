//! Reusable field filters
//!
//! Filters rewrite a single field value after the transform step and before
//! whitelisting and validation.

use anyhow::{Context, Result, bail};
use serde_json::{Number, Value};
use std::sync::Arc;

/// Largest place count `round_decimals` accepts; `10^309` is not a finite `f64`
pub const MAX_DECIMAL_PLACES: u32 = 308;

/// A shareable field filter
pub type Filter = Arc<dyn Fn(&str, Value) -> Result<Value> + Send + Sync>;

/// Box any filter closure into a shareable [`Filter`]
pub fn shared<F>(filter: F) -> Filter
where
    F: Fn(&str, Value) -> Result<Value> + Send + Sync + 'static,
{
    Arc::new(filter)
}

/// Rewrite string values with `map`, leaving every other value alone
fn on_strings<M>(map: M) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone
where
    M: Fn(&str) -> String + Send + Sync + Clone,
{
    move |_: &str, value: Value| match value {
        Value::String(text) => Ok(Value::String(map(&text))),
        other => Ok(other),
    }
}

/// Filter: strip leading and trailing whitespace
pub fn trim() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    on_strings(|text: &str| text.trim().to_owned())
}

pub fn uppercase() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    on_strings(str::to_uppercase)
}

pub fn lowercase() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    on_strings(str::to_lowercase)
}

/// Filter: round floats to `places` decimal places
///
/// Integers are already exact and keep their integer representation. A value
/// whose scaled form leaves the finite `f64` range is returned as given.
pub fn round_decimals(
    places: u32,
) -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    move |_: &str, value: Value| {
        let float = match &value {
            Value::Number(number) if !(number.is_i64() || number.is_u64()) => number.as_f64(),
            _ => None,
        };
        Ok(float
            .and_then(|float| round_to(float, places))
            .map(Value::Number)
            .unwrap_or(value))
    }
}

fn round_to(float: f64, places: u32) -> Option<Number> {
    let factor = 10_f64.powi(i32::try_from(places).ok()?);
    let rounded = (float * factor).round() / factor;
    if rounded.is_finite() {
        Number::from_f64(rounded)
    } else {
        None
    }
}

/// Filter: turn blank strings into null
pub fn null_if_empty() -> impl Fn(&str, Value) -> Result<Value> + Send + Sync + Clone {
    |_: &str, value: Value| match value.as_str() {
        Some(s) if s.trim().is_empty() => Ok(Value::Null),
        _ => Ok(value),
    }
}

/// Resolve a filter from its configuration name
///
/// Accepts `trim`, `lowercase`, `uppercase`, `null_if_empty` and
/// `round_decimals:<n>` with `n` up to [`MAX_DECIMAL_PLACES`].
pub fn by_name(name: &str) -> Result<Filter> {
    let (name, param) = match name.split_once(':') {
        Some((name, param)) => (name.trim(), Some(param.trim())),
        None => (name.trim(), None),
    };

    let filter: Filter = match (name, param) {
        ("trim", None) => Arc::new(trim()),
        ("lowercase", None) => Arc::new(lowercase()),
        ("uppercase", None) => Arc::new(uppercase()),
        ("null_if_empty", None) => Arc::new(null_if_empty()),
        ("round_decimals", Some(places)) => {
            let places: u32 = places
                .parse()
                .with_context(|| format!("Invalid decimal places '{}'", places))?;
            if places > MAX_DECIMAL_PLACES {
                bail!(
                    "Filter 'round_decimals' accepts at most {} decimal places, got {}",
                    MAX_DECIMAL_PLACES,
                    places
                );
            }
            Arc::new(round_decimals(places))
        }
        ("round_decimals", None) => bail!("Filter 'round_decimals' requires a parameter"),
        (other, _) => bail!("Unknown filter '{}'", other),
    };

    Ok(filter)
}
