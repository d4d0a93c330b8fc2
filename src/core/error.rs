//! Typed error handling for DTO construction
//!
//! Construction can fail in two distinguishable ways, so callers can branch on
//! "bad input shape" versus "input failed the declared rules":
//!
//! - [`ParseError`]: the input string was not a JSON object
//! - [`ValidationError`]: the assembled fields failed one or more rules
//!
//! [`DtoError`] wraps both for the constructors that can raise either.
//!
//! # Example
//!
//! ```rust,ignore
//! match UserDto::from_json(body) {
//!     Ok(dto) => handle(dto),
//!     Err(DtoError::Parse(e)) => eprintln!("malformed payload: {}", e),
//!     Err(DtoError::Validation(e)) => {
//!         for (field, messages) in e.errors() {
//!             eprintln!("{}: {}", field, messages.join(" "));
//!         }
//!     }
//! }
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the DTO constructors
#[derive(Debug, Error)]
pub enum DtoError {
    /// The fields failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The input could not be parsed into a field map
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl DtoError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DtoError::Validation(_) => "VALIDATION_ERROR",
            DtoError::Parse(_) => "PARSE_ERROR",
        }
    }

    /// Borrow the validation failures, if this is a validation error
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            DtoError::Validation(e) => Some(e),
            DtoError::Parse(_) => None,
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Every rule failure collected while validating a field map
///
/// Failures are grouped per concrete key (`items.0.sku` for wildcard rules)
/// in the order they were found. The error is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("The given data was invalid: {}", format_errors(.errors))]
pub struct ValidationError {
    errors: IndexMap<String, Vec<String>>,
}

impl ValidationError {
    /// Build an error from collected failures
    ///
    /// Returns `None` when `errors` holds no messages.
    pub fn from_errors(errors: IndexMap<String, Vec<String>>) -> Option<Self> {
        let errors: IndexMap<String, Vec<String>> = errors
            .into_iter()
            .filter(|(_, messages)| !messages.is_empty())
            .collect();

        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// Single failure for one field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = IndexMap::new();
        errors.insert(field.into(), vec![message.into()]);
        Self { errors }
    }

    /// All failures, keyed by field
    pub fn errors(&self) -> &IndexMap<String, Vec<String>> {
        &self.errors
    }

    /// Messages recorded for `field`
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// First message recorded for `field`
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Whether `field` has at least one failure
    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Failing field names
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consume the error and return the failure map
    pub fn into_errors(self) -> IndexMap<String, Vec<String>> {
        self.errors
    }
}

fn format_errors(errors: &IndexMap<String, Vec<String>>) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Parse Errors
// =============================================================================

/// The input could not be turned into a field map
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid JSON at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    /// The JSON was well-formed but its top level was not an object
    pub fn not_an_object(found: &serde_json::Value) -> Self {
        let kind = match found {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
            serde_json::Value::Object(_) => "an object",
        };
        Self {
            message: format!("expected a JSON object, found {}", kind),
            line: 1,
            column: 1,
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}
