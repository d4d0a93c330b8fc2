//! Field maps and the merge primitives used by the construction pipeline

use serde_json::{Map, Value};

/// The key → value mapping owned by every DTO
///
/// Backed by `serde_json::Map` with `preserve_order`, so iteration follows
/// insertion order while equality ignores it.
pub type Fields = Map<String, Value>;

/// Merge `overlay` into `target`, overlay values winning
///
/// When both sides hold an object for the same key the two objects are merged
/// recursively. Any other collision (scalars, arrays, mixed kinds) replaces
/// the target value wholesale; arrays are never concatenated.
pub fn deep_merge(target: &mut Fields, overlay: Fields) {
    for (key, incoming) in overlay {
        let Value::Object(nested) = incoming else {
            target.insert(key, incoming);
            continue;
        };

        if let Some(Value::Object(existing)) = target.get_mut(&key) {
            deep_merge(existing, nested);
            continue;
        }
        target.insert(key, Value::Object(nested));
    }
}

/// Fill `target` with `defaults`, target values winning
///
/// Mirror image of [`deep_merge`]: keys already in `target` keep their value
/// unless both sides are objects, in which case the defaults fill the nested
/// object recursively. Keys only present in `defaults` are appended after the
/// existing ones.
pub fn fill_defaults(target: &mut Fields, defaults: Fields) {
    for (key, default) in defaults {
        match target.get_mut(&key) {
            Some(Value::Object(existing)) => {
                if let Value::Object(nested) = default {
                    fill_defaults(existing, nested);
                }
            }
            Some(_) => {}
            None => {
                target.insert(key, default);
            }
        }
    }
}

/// Drop every top-level key whose value is `null`
pub fn strip_nulls(fields: &mut Fields) {
    fields.retain(|_, value| !value.is_null());
}

/// Expand a dotted rule key against `fields`
///
/// Returns the concrete key of every location the pattern addresses together
/// with the value found there (`None` when the final segment is absent).
/// A `*` segment fans out over array items or object values; wildcards over
/// missing or scalar parents yield nothing.
///
/// ```
/// use dto::core::fields::{resolve, Fields};
/// use serde_json::json;
///
/// let fields: Fields = serde_json::from_value(json!({
///     "items": [{"sku": "A1"}, {"sku": "B2"}]
/// })).unwrap();
///
/// let found = resolve(&fields, "items.*.sku");
/// assert_eq!(found.len(), 2);
/// assert_eq!(found[1].0, "items.1.sku");
/// ```
pub fn resolve<'a>(fields: &'a Fields, pattern: &str) -> Vec<(String, Option<&'a Value>)> {
    let segments: Vec<&str> = pattern.split('.').collect();
    let Some((first, rest)) = segments.split_first() else {
        return Vec::new();
    };

    if *first == "*" {
        return fields
            .iter()
            .flat_map(|(key, value)| descend(key.clone(), Some(value), rest))
            .collect();
    }

    descend(first.to_string(), fields.get(*first), rest)
}

fn descend<'a>(
    path: String,
    value: Option<&'a Value>,
    rest: &[&str],
) -> Vec<(String, Option<&'a Value>)> {
    let Some((segment, tail)) = rest.split_first() else {
        return vec![(path, value)];
    };

    if *segment == "*" {
        return match value {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .flat_map(|(index, item)| descend(format!("{path}.{index}"), Some(item), tail))
                .collect(),
            Some(Value::Object(map)) => map
                .iter()
                .flat_map(|(key, item)| descend(format!("{path}.{key}"), Some(item), tail))
                .collect(),
            _ => Vec::new(),
        };
    }

    let child = match value {
        Some(Value::Object(map)) => map.get(*segment),
        Some(Value::Array(items)) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    };

    descend(format!("{path}.{segment}"), child, tail)
}

/// Look up a single concrete dotted path (no wildcards)
pub fn lookup<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    resolve(fields, path).into_iter().next().and_then(|(_, value)| value)
}

/// Convert a JSON value into a field map
///
/// Returns the original value back when it is not an object.
pub fn into_fields(value: Value) -> Result<Fields, Value> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(other),
    }
}
