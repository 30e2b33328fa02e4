//! # Error Types
//!
//! Structured error types for rail_core. Every failure is a deterministic
//! function of the input, so nothing here is retryable; errors carry enough
//! context for the caller to correct the request and resubmit.
//!
//! ## Example
//!
//! ```rust
//! use rail_core::errors::{CalcError, CalcResult};
//!
//! fn check_diameter(wheel_diameter_mm: f64) -> CalcResult<()> {
//!     if wheel_diameter_mm <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "wheel_diameter_mm",
//!             wheel_diameter_mm.to_string(),
//!             "must be greater than 0",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for rail_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// One rejected input field: which field, what the caller sent, and the
/// constraint it violated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldViolation {
    pub field: String,
    pub value: String,
    pub constraint: String,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        FieldViolation {
            field: field.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }
}

/// Pipeline stage that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validation,
    Calculation,
    Rendering,
}

/// Structured error type for all tool operations.
///
/// Three kinds of failure exist in this system: the request was malformed
/// (`Validation`), the formula hit a non-physical input combination
/// (`Calculation`), or the downstream report renderer rejected the payload
/// (`Render`). Render failures never invalidate an already-computed result.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// One or more input fields failed their declared constraints.
    /// Carries every offending field, not just the first.
    #[error("Validation failed: {}", summarize(.violations))]
    Validation { violations: Vec<FieldViolation> },

    /// Formula evaluation hit a domain violation (division guard,
    /// empty curve, non-physical combination)
    #[error("Calculation failed: {context} - {reason}")]
    Calculation { context: String, reason: String },

    /// Report rendering failed downstream; the numeric result stands
    #[error("Render failed for template '{template}': {reason}")]
    Render { template: String, reason: String },
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("'{}' {}", v.field, v.constraint))
        .collect::<Vec<_>>()
        .join("; ")
}

impl CalcError {
    /// Create a Validation error from a full violation list
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        CalcError::Validation { violations }
    }

    /// Create a Validation error for a single field
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        CalcError::Validation {
            violations: vec![FieldViolation::new(field, value, constraint)],
        }
    }

    /// Create a Calculation error
    pub fn calculation(context: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Calculation {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Create a Render error
    pub fn render(template: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Render {
            template: template.into(),
            reason: reason.into(),
        }
    }

    /// Which pipeline stage produced this error
    pub fn stage(&self) -> Stage {
        match self {
            CalcError::Validation { .. } => Stage::Validation,
            CalcError::Calculation { .. } => Stage::Calculation,
            CalcError::Render { .. } => Stage::Rendering,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Validation { .. } => "VALIDATION_ERROR",
            CalcError::Calculation { .. } => "CALCULATION_ERROR",
            CalcError::Render { .. } => "RENDER_ERROR",
        }
    }

    /// The violation list for Validation errors, empty otherwise
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            CalcError::Validation { violations } => violations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("speed_kmh", "-5", "must be greater than 0");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_validation_lists_every_field() {
        let error = CalcError::validation(vec![
            FieldViolation::new("mass_kg", "0", "must be greater than 0"),
            FieldViolation::new("num_wheels", "-4", "must be greater than 0"),
        ]);
        let display = error.to_string();
        assert!(display.contains("mass_kg"));
        assert!(display.contains("num_wheels"));
        assert_eq!(error.violations().len(), 2);
    }

    #[test]
    fn test_error_codes_and_stages() {
        assert_eq!(
            CalcError::calculation("qmax", "wheel diameter is 0").error_code(),
            "CALCULATION_ERROR"
        );
        assert_eq!(
            CalcError::calculation("qmax", "wheel diameter is 0").stage(),
            Stage::Calculation
        );
        assert_eq!(
            CalcError::render("braking_report", "template missing").stage(),
            Stage::Rendering
        );
        assert_eq!(
            CalcError::validation(vec![]).error_code(),
            "VALIDATION_ERROR"
        );
    }
}
