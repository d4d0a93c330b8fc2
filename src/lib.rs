//! # DTO-RS
//!
//! Validated data transfer objects built from loosely-typed input.
//!
//! ## Features
//!
//! - **Construction Pipeline**: null-strip, defaults, transform, whitelist and
//!   validation run in a fixed order on every construction
//! - **Declarative Schemas**: `dto_schema!` declares defaults, rules, filters and
//!   transforms once per DTO type
//! - **Rule Grammar**: `required|string|max:255`, dotted keys and `*` wildcards
//! - **Keyed Errors**: validation failures map each key to its messages
//! - **Runtime Schemas**: build pipelines from YAML configuration
//! - **Scaffolding**: `make-dto Admin/UserProfile` writes a new DTO from a stub
//!
//! ## Quick Start
//!
//! ```rust
//! use dto::prelude::*;
//! use serde_json::json;
//!
//! dto_schema! {
//!     pub struct CreateUserSchema => CreateUser {
//!         whitelist: true,
//!         defaults: { "role": "user" },
//!         rules: {
//!             name: [required, string, max(255)],
//!             email: [required, email],
//!             role: [required, in_list("user", "admin")],
//!         },
//!     }
//! }
//!
//! let user = CreateUser::from_json(
//!     r#"{"name": "Ana", "email": "ana@example.com", "is_admin": true}"#,
//! )?;
//!
//! assert_eq!(user.get("role"), Some(&json!("user")));
//! assert!(!user.has("is_admin"));
//!
//! let err = CreateUser::from_json(r#"{"email": "nope"}"#).unwrap_err();
//! let errors = err.as_validation().unwrap();
//! assert!(errors.has("name") && errors.has("email"));
//! # Ok::<(), DtoError>(())
//! ```

pub mod config;
pub mod core;
pub mod scaffold;
pub mod schema;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        dto::{Dto, DtoSchema, Dynamic},
        error::{DtoError, ParseError, ValidationError},
        fields::Fields,
        pipeline::{Pipeline, Transform},
        validation::{Filter, Rule, RuleEngine, RuleSet, Rules, ValidationEngine, filters},
    };

    // === Macros ===
    pub use crate::dto_schema;

    // === Config ===
    pub use crate::config::{DtoConfig, ScaffoldConfig, SchemaConfig};

    // === Scaffolding ===
    pub use crate::scaffold::{Outcome, ScaffoldError, Scaffolder};

    // === External dependencies ===
    pub use serde_json::{Value, json};
}
