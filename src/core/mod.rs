//! Core module containing the DTO entity, its construction pipeline and the
//! validation system

pub mod dto;
pub mod error;
pub mod fields;
pub mod pipeline;
pub mod validation;

pub use dto::{Dto, DtoSchema, Dynamic};
pub use error::{DtoError, ParseError, ValidationError};
pub use fields::Fields;
pub use pipeline::{Pipeline, Transform};
pub use validation::{Filter, Rule, RuleEngine, RuleError, RuleSet, Rules, ValidationEngine};
