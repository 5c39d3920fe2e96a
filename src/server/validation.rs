use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::types::{Role, TimeValue};

/// Collects missing required fields so a payload is rejected with all of
/// them named at once.
#[derive(Debug, Default)]
pub struct Required {
    missing: Vec<&'static str>,
}

impl Required {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trimmed text, or records `field` as missing when absent or blank.
    pub fn text(&mut self, field: &'static str, value: Option<String>) -> String {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => v,
            _ => {
                self.missing.push(field);
                String::new()
            }
        }
    }

    pub fn value<T>(&mut self, field: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.missing.push(field);
        }
        value
    }

    pub fn finish(self) -> Result<()> {
        if self.missing.is_empty() {
            return Ok(());
        }
        Err(Error::InvalidInput(format!(
            "Missing required fields: {}",
            self.missing.join(", ")
        )))
    }
}

/// Blank optional text becomes None.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidInput(format!("{field} must be a date in YYYY-MM-DD form")))
}

pub fn parse_time_value(value: &str) -> Result<TimeValue> {
    TimeValue::parse(value.trim())
        .ok_or_else(|| Error::InvalidInput("time_value must be 'T' or 'P'".to_string()))
}

pub fn parse_role(value: &str) -> Result<Role> {
    Role::parse(value.trim()).ok_or_else(|| {
        let names: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
        Error::InvalidInput(format!("role must be one of: {}", names.join(", ")))
    })
}
