//! Validation and filtering system
//!
//! This module provides a declarative approach to validating and filtering DTO
//! fields. Rules are declared per key (see [`rules`]), evaluated by a
//! [`ValidationEngine`], and field values can be normalised beforehand with
//! [`filters`].

pub mod engine;
pub mod filters;
pub mod rules;
pub mod validators;

pub use engine::{RuleEngine, ValidationEngine};
pub use filters::Filter;
pub use rules::{Pattern, Rule, RuleError, RuleSet, Rules};
