//! Field rules for customer records
//!
//! Checks `name`, `email`, `age`, `phone` and `total_spent`. Required
//! fields that are absent are reported, never defaulted to an empty or
//! zero value.

use crate::result::{FieldError, ValidationResult};
use crate::{Error, Result};
use custdedup_core::Table;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Thresholds and patterns for customer validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Email pattern, matched case-insensitively
    pub email_pattern: String,
    pub min_age: f64,
    pub max_age: f64,
    /// Exact number of digits in a phone number
    pub phone_digits: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            email_pattern: r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$".to_string(),
            min_age: 0.0,
            max_age: 120.0,
            phone_digits: 10,
        }
    }
}

/// Validates customer records against a [`ValidatorConfig`]
#[derive(Debug, Clone)]
pub struct CustomerValidator {
    config: ValidatorConfig,
    email_regex: Regex,
}

impl CustomerValidator {
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        if config.min_age > config.max_age {
            return Err(Error::InvalidConfig(format!(
                "min_age {} exceeds max_age {}",
                config.min_age, config.max_age
            )));
        }
        if config.phone_digits == 0 {
            return Err(Error::InvalidConfig("phone_digits must be positive".to_string()));
        }
        let email_regex = RegexBuilder::new(&config.email_pattern)
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            config,
            email_regex,
        })
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate one record given as a JSON object
    pub fn validate(&self, record: &Value) -> ValidationResult {
        let Some(fields) = record.as_object() else {
            return ValidationResult::from_errors(vec![FieldError::new(
                "record",
                "Record must be a JSON object",
            )]);
        };

        let mut errors = Vec::new();
        self.check_name(present(fields, "name"), &mut errors);
        self.check_email(present(fields, "email"), &mut errors);
        self.check_age(present(fields, "age"), &mut errors);
        self.check_phone(present(fields, "phone"), &mut errors);
        self.check_total_spent(present(fields, "total_spent"), &mut errors);
        ValidationResult::from_errors(errors)
    }

    /// Validate every row of a table
    pub fn validate_table(&self, table: &Table) -> TableValidation {
        let mut failures = Vec::new();
        for i in 0..table.len() {
            if let Some(record) = table.row_object(i) {
                let result = self.validate(&record);
                if !result.is_valid() {
                    debug!("Row {} failed validation: {:?}", i, result.errors());
                    failures.push((i, result));
                }
            }
        }
        TableValidation {
            total: table.len(),
            failures,
        }
    }

    fn check_name(&self, value: Option<&Value>, errors: &mut Vec<FieldError>) {
        match value {
            None => errors.push(FieldError::new("name", "Name is required")),
            Some(Value::String(s)) if s.trim().is_empty() => {
                errors.push(FieldError::new("name", "Name is required"))
            }
            Some(Value::String(_)) => {}
            Some(_) => errors.push(FieldError::new("name", "Name must be text")),
        }
    }

    fn check_email(&self, value: Option<&Value>, errors: &mut Vec<FieldError>) {
        match value {
            None => errors.push(FieldError::new("email", "Email is required")),
            Some(Value::String(s)) => {
                if !self.email_regex.is_match(s.trim()) {
                    errors.push(FieldError::new("email", "Invalid email format"));
                }
            }
            Some(_) => errors.push(FieldError::new("email", "Invalid email format")),
        }
    }

    fn check_age(&self, value: Option<&Value>, errors: &mut Vec<FieldError>) {
        let Some(value) = value else { return };
        match value.as_f64() {
            None => errors.push(FieldError::new("age", "Age must be a number")),
            Some(age) if age < self.config.min_age => {
                let message = if self.config.min_age == 0.0 {
                    "Age cannot be negative".to_string()
                } else {
                    format!("Age must be at least {}", self.config.min_age)
                };
                errors.push(FieldError::new("age", message));
            }
            Some(age) if age > self.config.max_age => {
                errors.push(FieldError::new("age", "Age is unrealistically high"))
            }
            Some(_) => {}
        }
    }

    fn check_phone(&self, value: Option<&Value>, errors: &mut Vec<FieldError>) {
        let phone = match value {
            None => return,
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                errors.push(FieldError::new("phone", "Phone must contain only digits"));
                return;
            }
        };
        if phone.is_empty() {
            return;
        }
        if !phone.chars().all(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new("phone", "Phone must contain only digits"));
        }
        if phone.chars().count() != self.config.phone_digits {
            errors.push(FieldError::new(
                "phone",
                format!("Phone must be exactly {} digits", self.config.phone_digits),
            ));
        }
    }

    fn check_total_spent(&self, value: Option<&Value>, errors: &mut Vec<FieldError>) {
        if let Some(value) = value {
            if !value.is_number() {
                errors.push(FieldError::new("total_spent", "Total spent must be a number"));
            }
        }
    }
}

/// A field counts as absent when missing or null
fn present<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|v| !v.is_null())
}

impl Default for CustomerValidator {
    fn default() -> Self {
        Self {
            email_regex: RegexBuilder::new(&ValidatorConfig::default().email_pattern)
                .case_insensitive(true)
                .build()
                .expect("default email pattern compiles"),
            config: ValidatorConfig::default(),
        }
    }
}

/// Validation summary for a table
#[derive(Debug, Clone)]
pub struct TableValidation {
    pub total: usize,
    /// Row positions that failed, with their results
    pub failures: Vec<(usize, ValidationResult)>,
}

impl TableValidation {
    pub fn valid_count(&self) -> usize {
        self.total - self.failures.len()
    }

    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_record() -> Value {
        json!({
            "customer_id": 1,
            "name": "Priya Sharma",
            "email": "priya.sharma@email.com",
            "age": 31,
            "phone": "9876543210",
            "total_spent": 1800.0,
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut record = valid_record();
        record[field] = value;
        record
    }

    fn messages(result: &ValidationResult) -> Vec<String> {
        result.errors().iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn test_valid_record() {
        let result = CustomerValidator::default().validate(&valid_record());
        assert!(result.is_valid(), "{:?}", result);
    }

    #[test]
    fn test_uppercase_email_accepted() {
        let validator = CustomerValidator::default();
        let result = validator.validate(&with("email", json!("Priya.Sharma@Email.Com")));
        assert!(result.is_valid());
    }

    #[test]
    fn test_bad_email() {
        let validator = CustomerValidator::default();
        for email in ["no-at-sign", "a@b", "a b@c.com"] {
            let result = validator.validate(&with("email", json!(email)));
            assert_eq!(messages(&result), vec!["Invalid email format"], "{}", email);
        }
    }

    #[test]
    fn test_missing_required_fields_reported() {
        let record = json!({"customer_id": 7, "age": 40});
        let result = CustomerValidator::default().validate(&record);
        assert_eq!(messages(&result), vec!["Name is required", "Email is required"]);
    }

    #[test]
    fn test_blank_name() {
        let result = CustomerValidator::default().validate(&with("name", json!("   ")));
        assert_eq!(messages(&result), vec!["Name is required"]);
    }

    #[test]
    fn test_age_bounds() {
        let validator = CustomerValidator::default();
        let negative = validator.validate(&with("age", json!(-1)));
        assert_eq!(messages(&negative), vec!["Age cannot be negative"]);

        let old = validator.validate(&with("age", json!(121)));
        assert_eq!(messages(&old), vec!["Age is unrealistically high"]);

        let text = validator.validate(&with("age", json!("thirty")));
        assert_eq!(messages(&text), vec!["Age must be a number"]);

        assert!(validator.validate(&with("age", json!(120))).is_valid());
        assert!(validator.validate(&with("age", Value::Null)).is_valid());
    }

    #[test]
    fn test_phone_rules() {
        let validator = CustomerValidator::default();
        let short = validator.validate(&with("phone", json!("12345")));
        assert_eq!(messages(&short), vec!["Phone must be exactly 10 digits"]);

        let dashed = validator.validate(&with("phone", json!("987-654-3210")));
        assert_eq!(
            messages(&dashed),
            vec!["Phone must contain only digits", "Phone must be exactly 10 digits"]
        );

        assert!(validator.validate(&with("phone", json!(9876543210u64))).is_valid());
        assert!(validator.validate(&with("phone", json!(""))).is_valid());
    }

    #[test]
    fn test_total_spent_must_be_numeric() {
        let result = CustomerValidator::default().validate(&with("total_spent", json!("lots")));
        assert_eq!(messages(&result), vec!["Total spent must be a number"]);
    }

    #[test]
    fn test_non_object_record() {
        let result = CustomerValidator::default().validate(&json!([1, 2]));
        assert_eq!(result.errors()[0].field, "record");
    }

    #[test]
    fn test_results_do_not_leak_between_calls() {
        let validator = CustomerValidator::default();
        let bad = validator.validate(&with("age", json!(-5)));
        let good = validator.validate(&valid_record());
        assert!(!bad.is_valid());
        assert!(good.is_valid());
    }

    #[test]
    fn test_invalid_config() {
        let config = ValidatorConfig {
            min_age: 50.0,
            max_age: 10.0,
            ..Default::default()
        };
        assert!(matches!(
            CustomerValidator::new(config),
            Err(Error::InvalidConfig(_))
        ));

        let config = ValidatorConfig {
            email_pattern: "(unclosed".to_string(),
            ..Default::default()
        };
        assert!(matches!(CustomerValidator::new(config), Err(Error::Pattern(_))));
    }

    #[test]
    fn test_custom_age_floor_message() {
        let validator = CustomerValidator::new(ValidatorConfig {
            min_age: 18.0,
            ..Default::default()
        })
        .unwrap();
        let result = validator.validate(&with("age", json!(16)));
        assert_eq!(messages(&result), vec!["Age must be at least 18"]);
    }

    #[test]
    fn test_validate_table() {
        let table = Table::new(
            ["name", "email", "age"],
            vec![
                vec![json!("Amit Singh"), json!("amit.singh@email.com"), json!(29)],
                vec![json!(""), json!("bad"), json!(200)],
            ],
        )
        .unwrap();
        let report = CustomerValidator::default().validate_table(&table);
        assert_eq!(report.total, 2);
        assert_eq!(report.valid_count(), 1);
        assert_eq!(report.failures[0].0, 1);
        assert_eq!(report.failures[0].1.errors().len(), 3);
    }
}
