//! # Tractive Effort Calculation
//!
//! Hauling effort a locomotive must produce to move a rake, split into the
//! classic four resistance terms:
//!
//! - T1: wagon rolling resistance
//! - T2: locomotive rolling resistance
//! - T3: gradient resistance
//! - T4: curvature resistance
//!
//! Rolling coefficients are per tonne (kg/t), so every term and the total
//! effort come out in kg force. Power follows from TE·v/270 (metric
//! horsepower) and the 25 kV OHE current demand from the power.
//!
//! ## Assumptions
//!
//! - Starting coefficients 4.0/6.0 kg/t, running 1.3505/2.913 kg/t
//! - Start mode evaluates power at 1 km/h, Running at the given speed
//! - OHE supply 22.5 kV at 0.84 efficiency and 0.8 power factor
//!
//! ## Example
//!
//! ```rust
//! use rail_core::calculations::tractive_effort::{
//!     calculate, CurvatureKind, EffortMode, GradientKind, TractiveEffortInput,
//! };
//!
//! let input = TractiveEffortInput {
//!     load_t: 1000.0,
//!     loco_weight_t: 120.0,
//!     gradient: 100.0,
//!     gradient_kind: GradientKind::OneInG,
//!     curvature: 0.0,
//!     curvature_unit: CurvatureKind::RadiusMeters,
//!     mode: EffortMode::Start,
//!     speed_kmh: 0.0,
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert!((result.tractive_effort_kg - 15920.0).abs() < 1e-9);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CalcResult;
use crate::schema::{FieldSpec, Schema};
use crate::units::{Kilowatts, MetricHorsepower};

/// Rolling resistance when starting from rest (kg/t)
const WAGON_ROLLING_START: f64 = 4.0;
const LOCO_ROLLING_START: f64 = 6.0;

/// Rolling resistance at speed (kg/t)
const WAGON_ROLLING_RUNNING: f64 = 1.3505;
const LOCO_ROLLING_RUNNING: f64 = 2.913;

/// TE (kg) times speed (km/h) over this gives metric horsepower
const POWER_DIVISOR: f64 = 270.0;

/// Overhead electrification supply
const OHE_VOLTAGE_V: f64 = 22500.0;
const OHE_EFFICIENCY: f64 = 0.84;
const OHE_POWER_FACTOR: f64 = 0.8;

/// Gradient resistance scale (kg/t per unit slope ratio)
const GRADIENT_CONSTANT: f64 = 1000.0;

/// Curve resistance for radius-based curves (kg/t divided by radius in m)
const CURVATURE_CONSTANT: f64 = 700.0;

const GRADIENT_KINDS: &[&str] = &["Degree", "1 in G"];
const CURVATURE_KINDS: &[&str] = &["Radius(m)", "Degree"];
const EFFORT_MODES: &[&str] = &["Start", "Running"];

/// How the track gradient is specified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientKind {
    /// Slope angle in degrees
    Degree,
    /// Rise of 1 per G along the track
    #[serde(rename = "1 in G")]
    OneInG,
}

impl GradientKind {
    /// Gradient resistance per tonne (kg/t). Zero gradient costs nothing.
    pub fn resistance_per_tonne(&self, gradient: f64) -> f64 {
        if gradient == 0.0 {
            return 0.0;
        }
        match self {
            GradientKind::Degree => gradient.to_radians().tan() * GRADIENT_CONSTANT,
            GradientKind::OneInG => GRADIENT_CONSTANT / gradient,
        }
    }
}

/// How the curve is specified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurvatureKind {
    /// Curve radius in metres
    #[serde(rename = "Radius(m)")]
    RadiusMeters,
    /// Curve sharpness in degrees
    Degree,
}

impl CurvatureKind {
    /// Curve resistance per tonne (kg/t). Straight track costs nothing.
    pub fn resistance_per_tonne(&self, curvature: f64) -> f64 {
        match self {
            CurvatureKind::RadiusMeters => {
                if curvature == 0.0 {
                    0.0
                } else {
                    CURVATURE_CONSTANT / curvature
                }
            }
            CurvatureKind::Degree => curvature,
        }
    }
}

/// Whether the rake is starting from rest or already rolling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffortMode {
    Start,
    Running,
}

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(
        "tractive-effort",
        vec![
            FieldSpec::float("load_t").at_least(0.0),
            FieldSpec::float("loco_weight_t").at_least(0.0),
            FieldSpec::float("gradient").at_least(0.0),
            FieldSpec::choice("gradient_kind", GRADIENT_KINDS),
            FieldSpec::float("curvature").at_least(0.0),
            FieldSpec::choice("curvature_unit", CURVATURE_KINDS),
            FieldSpec::choice("mode", EFFORT_MODES),
            FieldSpec::float("speed_kmh").at_least(0.0).optional(),
        ],
    )
});

/// Get the declarative input contract for this tool
pub fn schema() -> &'static Schema {
    &SCHEMA
}

/// Input parameters for the tractive effort calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "load_t": 1000.0,
///   "loco_weight_t": 120.0,
///   "gradient": 100.0,
///   "gradient_kind": "1 in G",
///   "curvature": 350.0,
///   "curvature_unit": "Radius(m)",
///   "mode": "Running",
///   "speed_kmh": 50.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TractiveEffortInput {
    /// Trailing load in tonnes
    pub load_t: f64,

    /// Locomotive weight in tonnes
    pub loco_weight_t: f64,

    /// Gradient value, interpreted per `gradient_kind`
    pub gradient: f64,

    /// How `gradient` is specified
    pub gradient_kind: GradientKind,

    /// Curve value, interpreted per `curvature_unit`
    pub curvature: f64,

    /// How `curvature` is specified
    pub curvature_unit: CurvatureKind,

    /// Starting from rest or running at speed
    pub mode: EffortMode,

    /// Speed in km/h, used for power in Running mode
    #[serde(default)]
    pub speed_kmh: f64,
}

impl TractiveEffortInput {
    /// Validate against the input contract, reporting every violation.
    pub fn validate(&self) -> CalcResult<()> {
        schema().validate_typed(self, Vec::new())
    }
}

/// Parse and validate a raw request body into a typed input.
pub fn parse_input(raw: &Value) -> CalcResult<TractiveEffortInput> {
    let input: TractiveEffortInput = schema().parse(raw)?;
    input.validate()?;
    Ok(input)
}

/// Results from the tractive effort calculation.
///
/// All force terms are in kg, matching the per-tonne coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TractiveEffortResult {
    /// T1: wagon rolling resistance (kg)
    pub wagon_resistance_kg: f64,

    /// T2: locomotive rolling resistance (kg)
    pub loco_resistance_kg: f64,

    /// T3: gradient resistance (kg)
    pub gradient_resistance_kg: f64,

    /// T4: curvature resistance (kg)
    pub curvature_resistance_kg: f64,

    /// Speed the power figure was evaluated at (km/h)
    pub speed_for_power_kmh: f64,

    /// Total tractive effort, T1 + T2 + T3 + T4 (kg)
    pub tractive_effort_kg: f64,

    /// Power demand in metric horsepower
    pub power_hp: f64,

    /// OHE current demand (A)
    pub ohe_current_a: f64,
}

/// Calculate the tractive effort, power, and OHE current demand.
pub fn calculate(input: &TractiveEffortInput) -> CalcResult<TractiveEffortResult> {
    input.validate()?;

    let total_weight = input.load_t + input.loco_weight_t;

    // === Per-Tonne Resistances ===
    let gradient_per_tonne = input.gradient_kind.resistance_per_tonne(input.gradient);
    let curvature_per_tonne = input.curvature_unit.resistance_per_tonne(input.curvature);

    let (wagon_rr, loco_rr, speed_for_power) = match input.mode {
        EffortMode::Start => (WAGON_ROLLING_START, LOCO_ROLLING_START, 1.0),
        EffortMode::Running => (WAGON_ROLLING_RUNNING, LOCO_ROLLING_RUNNING, input.speed_kmh),
    };

    // === Resistance Components (kg) ===
    let t1 = input.load_t * wagon_rr;
    let t2 = input.loco_weight_t * loco_rr;
    let t3 = total_weight * gradient_per_tonne;
    let t4 = total_weight * curvature_per_tonne;

    let te = t1 + t2 + t3 + t4;

    // === Power and OHE Current ===
    let power_hp = te * speed_for_power / POWER_DIVISOR;
    let power_w = Kilowatts::from(MetricHorsepower(power_hp)).value() * 1000.0;
    let ohe_current_a = power_w / (OHE_VOLTAGE_V * OHE_EFFICIENCY * OHE_POWER_FACTOR);

    Ok(TractiveEffortResult {
        wagon_resistance_kg: t1,
        loco_resistance_kg: t2,
        gradient_resistance_kg: t3,
        curvature_resistance_kg: t4,
        speed_for_power_kmh: speed_for_power,
        tractive_effort_kg: te,
        power_hp,
        ohe_current_a,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_input() -> TractiveEffortInput {
        TractiveEffortInput {
            load_t: 1000.0,
            loco_weight_t: 120.0,
            gradient: 100.0,
            gradient_kind: GradientKind::OneInG,
            curvature: 0.0,
            curvature_unit: CurvatureKind::RadiusMeters,
            mode: EffortMode::Start,
            speed_kmh: 0.0,
        }
    }

    #[test]
    fn test_start_mode_components() {
        let result = calculate(&test_input()).unwrap();

        // T1 = 1000·4 = 4000, T2 = 120·6 = 720, T3 = 1120·(1000/100) = 11200
        assert_eq!(result.wagon_resistance_kg, 4000.0);
        assert_eq!(result.loco_resistance_kg, 720.0);
        assert!((result.gradient_resistance_kg - 11200.0).abs() < 1e-9);
        assert_eq!(result.curvature_resistance_kg, 0.0);
        assert!((result.tractive_effort_kg - 15920.0).abs() < 1e-9);

        // Start mode evaluates power at 1 km/h
        assert_eq!(result.speed_for_power_kmh, 1.0);
        assert!((result.power_hp - 15920.0 / 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_running_mode_uses_input_speed() {
        let input = TractiveEffortInput {
            mode: EffortMode::Running,
            speed_kmh: 50.0,
            ..test_input()
        };
        let result = calculate(&input).unwrap();

        // T1 = 1000·1.3505, T2 = 120·2.913
        assert!((result.wagon_resistance_kg - 1350.5).abs() < 1e-9);
        assert!((result.loco_resistance_kg - 349.56).abs() < 1e-9);
        assert_eq!(result.speed_for_power_kmh, 50.0);

        let te = result.tractive_effort_kg;
        assert!((result.power_hp - te * 50.0 / 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_ohe_current_from_power() {
        let result = calculate(&test_input()).unwrap();

        // I = P·735.5 / (22500·0.84·0.8)
        let expected = result.power_hp * 735.5 / (22500.0 * 0.84 * 0.8);
        assert!((result.ohe_current_a - expected).abs() < 1e-9);
    }

    #[test]
    fn test_degree_gradient_and_radius_curve() {
        let input = TractiveEffortInput {
            gradient: 1.0,
            gradient_kind: GradientKind::Degree,
            curvature: 350.0,
            ..test_input()
        };
        let result = calculate(&input).unwrap();

        // tan(1°)·1000 ≈ 17.455 kg/t, 700/350 = 2 kg/t
        assert!((result.gradient_resistance_kg - 1120.0 * 17.455).abs() < 1.0);
        assert!((result.curvature_resistance_kg - 1120.0 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_gradient_and_curve_cost_nothing() {
        let input = TractiveEffortInput {
            gradient: 0.0,
            curvature: 0.0,
            ..test_input()
        };
        let result = calculate(&input).unwrap();

        assert_eq!(result.gradient_resistance_kg, 0.0);
        assert_eq!(result.curvature_resistance_kg, 0.0);
    }

    #[test]
    fn test_degree_curvature_is_direct() {
        let input = TractiveEffortInput {
            curvature: 5.0,
            curvature_unit: CurvatureKind::Degree,
            ..test_input()
        };
        let result = calculate(&input).unwrap();
        assert!((result.curvature_resistance_kg - 1120.0 * 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_validation_reports_every_violation() {
        let err = parse_input(&json!({
            "load_t": -1.0,
            "loco_weight_t": 120.0,
            "gradient": -2.0,
            "gradient_kind": "Degree",
            "curvature": 0.0,
            "curvature_unit": "Radius(m)",
            "mode": "Drifting"
        }))
        .unwrap_err();

        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["load_t", "gradient", "mode"]);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let input = TractiveEffortInput {
            gradient_kind: GradientKind::OneInG,
            curvature_unit: CurvatureKind::RadiusMeters,
            ..test_input()
        };
        let json = serde_json::to_string(&input).unwrap();
        assert!(json.contains("1 in G"));
        assert!(json.contains("Radius(m)"));

        let back: TractiveEffortInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.gradient_kind, GradientKind::OneInG);
        assert_eq!(back.curvature_unit, CurvatureKind::RadiusMeters);
    }
}
