//! # Load Distribution Calculation
//!
//! Wheel load balance check for a two-axle rail vehicle. The total load is
//! split front/rear, each axle split across its two wheels, and the
//! imbalance ratio ΔQ/Q of the heavier axle is judged against the limit for
//! the vehicle configuration (0.6 for bogie stock, 0.5 for rigid trucks).
//!
//! Wheel numbering: Q1/Q2 front left/right, Q3/Q4 rear left/right.
//!
//! ## Example
//!
//! ```rust
//! use rail_core::calculations::load_distribution::{
//!     calculate, LoadDistributionInput, VehicleConfig,
//! };
//!
//! let input = LoadDistributionInput {
//!     config: VehicleConfig::Bogie,
//!     total_load_t: 40.0,
//!     front_percent: 50.0,
//!     q1_percent: 50.0,
//!     q3_percent: 50.0,
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert!(result.passed);
//! assert_eq!(result.delta_q_ratio, 0.0);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CalcResult;
use crate::schema::{FieldSpec, Schema};

/// Maximum ΔQ/Q for articulated bogie stock
const BOGIE_DELTA_Q_LIMIT: f64 = 0.6;

/// Maximum ΔQ/Q for rigid frames (trucks and single axles)
const TRUCK_DELTA_Q_LIMIT: f64 = 0.5;

/// Configuration options for the table lookup
const VEHICLE_CONFIGS: &[&str] = &["Bogie", "Truck", "Axle"];

/// Running gear configuration, fixing the ΔQ/Q limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleConfig {
    /// Articulated bogies, more tolerant of imbalance
    Bogie,
    /// Rigid truck frame
    Truck,
    /// Single axle study, judged like a rigid frame
    Axle,
}

impl VehicleConfig {
    /// All configuration variants for UI selection
    pub const ALL: [VehicleConfig; 3] =
        [VehicleConfig::Bogie, VehicleConfig::Truck, VehicleConfig::Axle];

    /// Maximum allowable ΔQ/Q ratio for this configuration
    pub fn delta_q_limit(&self) -> f64 {
        match self {
            VehicleConfig::Bogie => BOGIE_DELTA_Q_LIMIT,
            VehicleConfig::Truck | VehicleConfig::Axle => TRUCK_DELTA_Q_LIMIT,
        }
    }
}

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(
        "load-distribution",
        vec![
            FieldSpec::choice("config", VEHICLE_CONFIGS),
            FieldSpec::float("total_load_t").greater_than(0.0),
            FieldSpec::float("front_percent").greater_than(0.0).at_most(100.0),
            FieldSpec::float("q1_percent").greater_than(0.0).at_most(100.0),
            FieldSpec::float("q3_percent").greater_than(0.0).at_most(100.0),
        ],
    )
});

/// Get the declarative input contract for this tool
pub fn schema() -> &'static Schema {
    &SCHEMA
}

/// Input parameters for the load distribution check.
///
/// ## JSON Example
///
/// ```json
/// {
///   "config": "Bogie",
///   "total_load_t": 40.0,
///   "front_percent": 60.0,
///   "q1_percent": 55.0,
///   "q3_percent": 50.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadDistributionInput {
    /// Running gear configuration
    pub config: VehicleConfig,

    /// Total vehicle load in tonnes
    pub total_load_t: f64,

    /// Share of the total load on the front axle, percent
    pub front_percent: f64,

    /// Share of the front axle load on wheel Q1, percent
    pub q1_percent: f64,

    /// Share of the rear axle load on wheel Q3, percent
    pub q3_percent: f64,
}

impl LoadDistributionInput {
    /// Validate against the input contract, reporting every violation.
    pub fn validate(&self) -> CalcResult<()> {
        schema().validate_typed(self, Vec::new())
    }
}

/// Parse and validate a raw request body into a typed input.
pub fn parse_input(raw: &Value) -> CalcResult<LoadDistributionInput> {
    let input: LoadDistributionInput = schema().parse(raw)?;
    input.validate()?;
    Ok(input)
}

/// Results from the load distribution check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadDistributionResult {
    /// Front left wheel load (t)
    pub q1_t: f64,
    /// Front right wheel load (t)
    pub q2_t: f64,
    /// Rear left wheel load (t)
    pub q3_t: f64,
    /// Rear right wheel load (t)
    pub q4_t: f64,

    /// Front axle total (t)
    pub front_load_t: f64,
    /// Rear axle total (t)
    pub rear_load_t: f64,

    /// Wheel carrying the least load ("Q1".."Q4")
    pub lightest_wheel: String,
    /// Least wheel load (t)
    pub lightest_load_t: f64,
    /// Wheel carrying the most load
    pub heaviest_wheel: String,
    /// Greatest wheel load (t)
    pub heaviest_load_t: f64,

    /// Which pair was averaged, "(Q1 + Q2) / 2" or "(Q3 + Q4) / 2"
    pub mean_formula: String,
    /// Mean wheel load of the heavier axle, Q (t)
    pub mean_load_t: f64,

    /// ΔQ = Q − QL (t)
    pub delta_q_t: f64,
    /// ΔQ/Q imbalance ratio (0 when Q is 0)
    pub delta_q_ratio: f64,
    /// Limit applied for the configuration
    pub delta_q_limit: f64,

    /// Whether ΔQ/Q is within the limit
    pub passed: bool,
    /// Human-readable verdict for reports
    pub status_message: String,
}

impl LoadDistributionResult {
    /// Status keyword for report payloads
    pub fn status(&self) -> &'static str {
        if self.passed {
            "success"
        } else {
            "fail"
        }
    }
}

/// First-named wheel with the least load, then the most.
fn min_max_wheels(wheels: &[(&str, f64)]) -> ((String, f64), (String, f64)) {
    let mut min = (wheels[0].0.to_string(), wheels[0].1);
    let mut max = (wheels[0].0.to_string(), wheels[0].1);
    for (name, load) in &wheels[1..] {
        if *load < min.1 {
            min = (name.to_string(), *load);
        }
        if *load > max.1 {
            max = (name.to_string(), *load);
        }
    }
    (min, max)
}

/// Calculate wheel loads and the ΔQ/Q balance verdict.
pub fn calculate(input: &LoadDistributionInput) -> CalcResult<LoadDistributionResult> {
    input.validate()?;

    // === Axle Loads ===
    let front_load = input.front_percent / 100.0 * input.total_load_t;
    let rear_load = input.total_load_t - front_load;

    // === Wheel Loads ===
    let q1 = input.q1_percent / 100.0 * front_load;
    let q2 = front_load - q1;
    let q3 = input.q3_percent / 100.0 * rear_load;
    let q4 = rear_load - q3;

    let wheels = [("Q1", q1), ("Q2", q2), ("Q3", q3), ("Q4", q4)];
    let ((ql_name, ql_value), (qh_name, qh_value)) = min_max_wheels(&wheels);

    // === Mean Load of the Heavier Axle ===
    let (mean_formula, q_value) = if front_load >= rear_load {
        ("(Q1 + Q2) / 2".to_string(), (q1 + q2) / 2.0)
    } else {
        ("(Q3 + Q4) / 2".to_string(), (q3 + q4) / 2.0)
    };

    // === Balance Check ===
    let delta_q = q_value - ql_value;
    let delta_q_ratio = if q_value != 0.0 { delta_q / q_value } else { 0.0 };
    let limit = input.config.delta_q_limit();
    let passed = delta_q_ratio <= limit;

    let status_message = if passed {
        format!(
            "PASS: ΔQ/Q ({:.2}%) is within the {:.0}% limit.",
            delta_q_ratio * 100.0,
            limit * 100.0
        )
    } else {
        format!(
            "FAIL: ΔQ/Q ({:.2}%) exceeds the {:.0}% limit.",
            delta_q_ratio * 100.0,
            limit * 100.0
        )
    };

    Ok(LoadDistributionResult {
        q1_t: q1,
        q2_t: q2,
        q3_t: q3,
        q4_t: q4,
        front_load_t: front_load,
        rear_load_t: rear_load,
        lightest_wheel: ql_name,
        lightest_load_t: ql_value,
        heaviest_wheel: qh_name,
        heaviest_load_t: qh_value,
        mean_formula,
        mean_load_t: q_value,
        delta_q_t: delta_q,
        delta_q_ratio,
        delta_q_limit: limit,
        passed,
        status_message,
    })
}
