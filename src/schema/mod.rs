//! Declarative DTO schemas
//!
//! [`dto_schema!`](crate::dto_schema) generates a unit type implementing
//! [`DtoSchema`](crate::core::dto::DtoSchema), plus an optional type alias for
//! the matching [`Dto`](crate::core::dto::Dto).

pub mod macros;
