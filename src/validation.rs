//! Input validation helpers shared by the request payloads.
//!
//! Payloads implement [`Validate`] and collect every problem into a
//! [`FieldErrors`] map so the client can highlight all offending fields at once.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_TEXT_LENGTH: usize = 2000;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error for a field; the first message per field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.0
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn require_text(&mut self, field: &str, value: &str, max_len: usize) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, "This field is required");
        } else if trimmed.chars().count() > max_len {
            self.add(field, format!("Must be at most {} characters", max_len));
        }
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max_len: usize) {
        if let Some(v) = value {
            if v.chars().count() > max_len {
                self.add(field, format!("Must be at most {} characters", max_len));
            }
        }
    }

    pub fn optional_email(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            if !is_valid_email(v) {
                self.add(field, "Invalid email address");
            }
        }
    }

    pub fn positive_amount(&mut self, field: &str, value: Decimal) {
        if value <= Decimal::ZERO {
            self.add(field, "Amount must be greater than zero");
        } else if value.scale() > 2 && value.round_dp(2) != value {
            self.add(field, "Amount can have at most two decimal places");
        }
    }

    pub fn non_negative_amount(&mut self, field: &str, value: Decimal) {
        if value < Decimal::ZERO {
            self.add(field, "Amount cannot be negative");
        } else if value.scale() > 2 && value.round_dp(2) != value {
            self.add(field, "Amount can have at most two decimal places");
        }
    }

    pub fn positive_id(&mut self, field: &str, value: Option<i64>) {
        if matches!(value, Some(id) if id <= 0) {
            self.add(field, "Invalid identifier");
        }
    }

    pub fn year(&mut self, field: &str, value: i32) {
        if !(2000..=2100).contains(&value) {
            self.add(field, "Year must be between 2000 and 2100");
        }
    }

    pub fn month(&mut self, field: &str, value: Option<i32>) {
        if matches!(value, Some(m) if !(1..=12).contains(&m)) {
            self.add(field, "Month must be between 1 and 12");
        }
    }

    pub fn date_not_after(&mut self, field: &str, value: Option<NaiveDate>, limit: NaiveDate) {
        if matches!(value, Some(d) if d > limit) {
            self.add(field, "Date cannot be in the future");
        }
    }

    pub fn date_order(&mut self, field: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        if let (Some(s), Some(e)) = (start, end) {
            if e < s {
                self.add(field, "End date cannot be before start date");
            }
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<_> = self.0.iter().collect();
        fields.sort();
        let parts: Vec<String> = fields.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// Deliberately loose: one '@', non-empty local part, dotted domain, no spaces.
pub fn is_valid_email(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// serde default for flags that start enabled.
pub fn default_true() -> bool {
    true
}

/// Trims optional free text and collapses blank strings to `None`.
pub fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("pastor@iglesia.org"));
        assert!(!is_valid_email("pastor@iglesia"));
        assert!(!is_valid_email("pastor iglesia@org.com"));
        assert!(!is_valid_email("@iglesia.org"));
        assert!(!is_valid_email("a@b@c.org"));
    }

    #[test]
    fn required_text_rejects_blank_and_long() {
        let mut errors = FieldErrors::new();
        errors.require_text("first_name", "   ", MAX_NAME_LENGTH);
        errors.require_text("last_name", &"x".repeat(101), MAX_NAME_LENGTH);
        errors.require_text("nickname", "Ana", MAX_NAME_LENGTH);

        assert_eq!(errors.get("first_name"), Some("This field is required"));
        assert_eq!(errors.get("last_name"), Some("Must be at most 100 characters"));
        assert!(errors.get("nickname").is_none());
    }

    #[test]
    fn amounts() {
        let mut errors = FieldErrors::new();
        errors.positive_amount("zero", dec!(0));
        errors.positive_amount("cents", dec!(10.005));
        errors.positive_amount("ok", dec!(10.50));
        errors.non_negative_amount("neg", dec!(-1));
        errors.non_negative_amount("zero_ok", dec!(0));

        assert!(errors.get("zero").is_some());
        assert!(errors.get("cents").is_some());
        assert!(errors.get("ok").is_none());
        assert!(errors.get("neg").is_some());
        assert!(errors.get("zero_ok").is_none());
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("year", "first");
        errors.add("year", "second");
        assert_eq!(errors.get("year"), Some("first"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn clean_collapses_blank_strings() {
        assert_eq!(clean(&Some("  ".to_string())), None);
        assert_eq!(clean(&Some(" Calle 5 ".to_string())), Some("Calle 5".to_string()));
        assert_eq!(clean(&None), None);
    }
}
