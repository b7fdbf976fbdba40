//! Record validation for customer tables
//!
//! Validators are pure: each call returns a fresh [`ValidationResult`]
//! and keeps no state between records.

pub mod error;
pub mod customer;
pub mod result;

pub use customer::{CustomerValidator, TableValidation, ValidatorConfig};
pub use error::{Error, Result};
pub use result::{FieldError, ValidationResult};
