//! # Axle Load (Qmax) Calculation
//!
//! Maximum permissible static wheel load from wheel diameter and the rim
//! material's bending stress allowance, using the empirical relation
//! `Qmax = C · (d/2) · (σB/v)²` with C = 8.257e-7.
//!
//! ## Assumptions
//!
//! - Wheel diameter in millimetres, rim stress in N/mm²
//! - The dynamic headroom factor `v_head` derates the allowable stress for
//!   on-track impacts (1.1 unless the customer specifies otherwise)
//! - Result reported in kN and tonnes (1 t = 9.80665 kN)
//!
//! ## Example
//!
//! ```rust
//! use rail_core::calculations::axle_load::{calculate, AxleLoadInput, WheelGrade};
//!
//! let input = AxleLoadInput {
//!     wheel_diameter_mm: 920.0,
//!     grade: WheelGrade::Grade880,
//!     sigma_b_custom: None,
//!     v_head: 1.1,
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert!((result.qmax_kn - 243.086).abs() < 0.01);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::STANDARD_GRAVITY_KN_PER_TONNE;
use crate::errors::{CalcError, CalcResult, FieldViolation};
use crate::schema::{FieldSpec, Schema};

/// Empirical wheel load coefficient (kN per mm per (N/mm²)²)
const QMAX_COEFFICIENT: f64 = 8.257e-7;

/// Wheel grade options for the table lookup
const WHEEL_GRADES: &[&str] = &["880 N/mm²", "680 N/mm²", "Custom"];

fn default_v_head() -> f64 {
    1.1
}

/// Wheel rim material grade, fixing the bending stress allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelGrade {
    /// Standard grade, 880 N/mm² rim stress
    #[serde(rename = "880 N/mm²")]
    Grade880,
    /// Lower grade, 680 N/mm² rim stress
    #[serde(rename = "680 N/mm²")]
    Grade680,
    /// User-supplied rim stress
    Custom,
}

impl WheelGrade {
    /// All grade variants for UI selection
    pub const ALL: [WheelGrade; 3] = [WheelGrade::Grade880, WheelGrade::Grade680, WheelGrade::Custom];

    /// Rim bending stress for the grade, `None` for Custom
    pub fn sigma_b_n_mm2(&self) -> Option<f64> {
        match self {
            WheelGrade::Grade880 => Some(880.0),
            WheelGrade::Grade680 => Some(680.0),
            WheelGrade::Custom => None,
        }
    }
}

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(
        "axle-load",
        vec![
            // Positivity is the calculation's own guard: a zero diameter is
            // a degenerate geometry, not a malformed request.
            FieldSpec::float("wheel_diameter_mm"),
            FieldSpec::choice("grade", WHEEL_GRADES),
            FieldSpec::float("sigma_b_custom").greater_than(0.0).optional(),
            FieldSpec::float("v_head").greater_than(0.0).optional(),
        ],
    )
});

/// Get the declarative input contract for this tool
pub fn schema() -> &'static Schema {
    &SCHEMA
}

/// Input parameters for the Qmax wheel load calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "wheel_diameter_mm": 920.0,
///   "grade": "Custom",
///   "sigma_b_custom": 700.0,
///   "v_head": 1.1
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxleLoadInput {
    /// New wheel diameter in millimetres
    pub wheel_diameter_mm: f64,

    /// Wheel rim material grade
    pub grade: WheelGrade,

    /// Rim bending stress in N/mm², required when `grade` is Custom
    pub sigma_b_custom: Option<f64>,

    /// Dynamic headroom factor applied to the rim stress
    #[serde(default = "default_v_head")]
    pub v_head: f64,
}

impl AxleLoadInput {
    /// Validate against the input contract, reporting every violation.
    pub fn validate(&self) -> CalcResult<()> {
        schema().validate_typed(self, self.conditional_violations())
    }

    /// Cross-field rules the flat table cannot express
    fn conditional_violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        if self.grade == WheelGrade::Custom && self.sigma_b_custom.is_none() {
            violations.push(FieldViolation::new(
                "sigma_b_custom",
                "",
                "required when grade is Custom",
            ));
        }
        violations
    }

    /// Rim stress after resolving the grade selection
    pub fn resolved_sigma_b(&self) -> Option<f64> {
        self.grade.sigma_b_n_mm2().or(self.sigma_b_custom)
    }
}

/// Parse and validate a raw request body into a typed input.
pub fn parse_input(raw: &Value) -> CalcResult<AxleLoadInput> {
    let input: AxleLoadInput = schema().parse(raw)?;
    input.validate()?;
    Ok(input)
}

/// Results from the Qmax wheel load calculation.
///
/// Inputs are echoed alongside the results so the record is self-contained.
///
/// ## JSON Example
///
/// ```json
/// {
///   "wheel_diameter_mm": 920.0,
///   "sigma_b_n_mm2": 880.0,
///   "v_head": 1.1,
///   "qmax_kn": 243.09,
///   "qmax_t": 24.79
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxleLoadResult {
    /// Wheel diameter used (mm)
    pub wheel_diameter_mm: f64,

    /// Rim bending stress used (N/mm²)
    pub sigma_b_n_mm2: f64,

    /// Dynamic headroom factor used
    pub v_head: f64,

    /// Maximum permissible static wheel load (kN)
    pub qmax_kn: f64,

    /// Maximum permissible static wheel load (tonnes)
    pub qmax_t: f64,
}

/// Calculate the maximum permissible static wheel load.
///
/// # Returns
///
/// * `Ok(AxleLoadResult)` - Qmax in kN and tonnes with inputs echoed
/// * `Err(CalcError)` - Validation error for contract violations, or a
///   calculation error for degenerate geometry (zero wheel diameter)
pub fn calculate(input: &AxleLoadInput) -> CalcResult<AxleLoadResult> {
    input.validate()?;

    let d = input.wheel_diameter_mm;
    if d <= 0.0 {
        return Err(CalcError::calculation(
            "axle load",
            format!("wheel diameter must be positive, got {} mm", d),
        ));
    }

    let sigma_b = input.resolved_sigma_b().ok_or_else(|| {
        CalcError::calculation("axle load", "no rim stress available for the selected grade")
    })?;

    let qmax_kn = QMAX_COEFFICIENT * (d / 2.0) * (sigma_b / input.v_head).powi(2);
    let qmax_t = qmax_kn / STANDARD_GRAVITY_KN_PER_TONNE;

    Ok(AxleLoadResult {
        wheel_diameter_mm: d,
        sigma_b_n_mm2: sigma_b,
        v_head: input.v_head,
        qmax_kn,
        qmax_t,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_input() -> AxleLoadInput {
        AxleLoadInput {
            wheel_diameter_mm: 920.0,
            grade: WheelGrade::Grade880,
            sigma_b_custom: None,
            v_head: 1.1,
        }
    }

    #[test]
    fn test_qmax_reference_value() {
        let result = calculate(&test_input()).unwrap();

        // Qmax = 8.257e-7 * 460 * (880/1.1)² = 243.086 kN = 24.788 t
        assert!((result.qmax_kn - 243.086).abs() < 0.01);
        assert!((result.qmax_t - 24.7879).abs() < 0.001);
        assert_eq!(result.sigma_b_n_mm2, 880.0);
    }

    #[test]
    fn test_custom_grade_uses_user_stress() {
        let input = AxleLoadInput {
            grade: WheelGrade::Custom,
            sigma_b_custom: Some(700.0),
            ..test_input()
        };
        let result = calculate(&input).unwrap();

        assert_eq!(result.sigma_b_n_mm2, 700.0);
        // Lower stress means a lower permissible load
        assert!(result.qmax_kn < 243.086);
    }

    #[test]
    fn test_custom_grade_requires_stress() {
        let input = AxleLoadInput {
            grade: WheelGrade::Custom,
            sigma_b_custom: None,
            ..test_input()
        };
        let err = calculate(&input).unwrap_err();

        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.violations()[0].field, "sigma_b_custom");
    }

    #[test]
    fn test_zero_wheel_diameter_is_calculation_error() {
        let input = AxleLoadInput {
            wheel_diameter_mm: 0.0,
            ..test_input()
        };
        let err = calculate(&input).unwrap_err();

        assert_eq!(err.error_code(), "CALCULATION_ERROR");
    }

    #[test]
    fn test_deterministic() {
        let a = calculate(&test_input()).unwrap();
        let b = calculate(&test_input()).unwrap();
        assert_eq!(a.qmax_kn, b.qmax_kn);
        assert_eq!(a.qmax_t, b.qmax_t);
    }

    #[test]
    fn test_parse_input_applies_headroom_default() {
        let input = parse_input(&json!({
            "wheel_diameter_mm": 920.0,
            "grade": "880 N/mm²"
        }))
        .unwrap();
        assert_eq!(input.v_head, 1.1);
    }

    #[test]
    fn test_parse_input_rejects_unknown_grade() {
        let err = parse_input(&json!({
            "wheel_diameter_mm": 920.0,
            "grade": "900 N/mm²"
        }))
        .unwrap_err();

        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "grade");
    }

    #[test]
    fn test_grade_options_match_schema() {
        for (grade, option) in WheelGrade::ALL.iter().zip(WHEEL_GRADES) {
            let json = serde_json::to_string(grade).unwrap();
            assert_eq!(json, format!("\"{}\"", option));
        }
    }

    #[test]
    fn test_serialization_roundtrip() {
        let input = test_input();
        let json = serde_json::to_string(&input).unwrap();
        assert!(json.contains("880 N/mm²"));

        let roundtrip: AxleLoadInput = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.grade, WheelGrade::Grade880);

        let result = calculate(&input).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: AxleLoadResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.qmax_kn, result.qmax_kn);
    }
}
