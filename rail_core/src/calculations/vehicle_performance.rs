//! # Vehicle Performance Calculation
//!
//! Locomotive performance analysis: peak traction against the wheel-slip
//! limit, tractive effort and shunting capacity curves over the slope range,
//! and the maximum achievable speed per slope for a given trailing load.
//!
//! The engine is described by a discrete torque curve. Torque at any RPM is
//! linearly interpolated (clamped at the ends) and then capped so the engine
//! never exceeds its peak power. Traction at the rail is the smaller of the
//! powertrain force and the adhesion limit μ·W.
//!
//! ## Assumptions
//!
//! - Rolling resistance uses the empirical per-axle-load formula for the
//!   locomotive and fixed wagon coefficients for the trailing load
//! - Curve resistance is 0.4 kgf per tonne per degree of curve; a radius is
//!   converted with the 1750/R rule
//! - Effort and capacity curves include starting resistance; the speed vs
//!   slope table uses running resistance only
//! - Slopes are swept from level in 0.5 % steps up to the given maximum
//!
//! ## Example
//!
//! ```rust
//! use rail_core::calculations::vehicle_performance::{calculate, parse_input};
//! use serde_json::json;
//!
//! let input = parse_input(&json!({
//!     "max_curve": 0.0,
//!     "curve_unit": "degree",
//!     "max_slope": 1.0,
//!     "slope_unit": "%",
//!     "loco_gvw_kg": 120000.0,
//!     "max_speed_kmh": 100.0,
//!     "num_axles": 4,
//!     "rear_axle_ratio": 4.0,
//!     "gear_ratios": [2.0],
//!     "shunting_load_t": 200.0,
//!     "peak_power_kw": 500.0,
//!     "friction_mu": 0.35,
//!     "wheel_diameter_m": 1.0,
//!     "torque_curve": {"1000": 2000.0, "2000": 2400.0}
//! }))
//! .unwrap();
//!
//! let result = calculate(&input).unwrap();
//! assert!(result.traction.max_traction_generated_n > 0.0);
//! ```

use std::collections::BTreeMap;
use std::f64::consts::PI;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::GRAVITY_MPS2;
use crate::errors::{CalcError, CalcResult, FieldViolation};
use crate::schema::{FieldSpec, Schema};
use crate::units::{Degrees, KilometersPerHour, MetersPerSecond, Radians};

const CURVE_UNITS: &[&str] = &["degree", "m"];
const SLOPE_UNITS: &[&str] = &["%", "degree"];

/// Degree of curve for a radius in metres (20 m chord rule)
const DEGREE_OF_CURVE_FACTOR: f64 = 1750.0;

/// Wagon rolling resistance coefficients, kgf/t
const WAGON_ROLLING_A: f64 = 0.6438797;
const WAGON_ROLLING_B: f64 = 0.01047218;
const WAGON_ROLLING_C: f64 = 0.00007323;

/// Starting resistance in kgf per tonne
const LOCO_STARTING_PER_TONNE: f64 = 6.0;
const WAGON_STARTING_PER_TONNE: f64 = 4.0;

/// Slope sweep increment in percent
const SLOPE_STEP_PERCENT: f64 = 0.5;

/// Speed samples per curve segment and per table sweep
const SPEED_SAMPLES: usize = 100;

fn default_min_rpm() -> u32 {
    100
}

fn default_max_rpm() -> u32 {
    2500
}

/// Unit of the maximum-curve input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveUnit {
    /// Degree of curve
    #[serde(rename = "degree")]
    Degree,
    /// Curve radius in metres
    #[serde(rename = "m")]
    RadiusMeters,
}

/// Unit of the maximum-slope input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlopeUnit {
    /// Rise over run, percent
    #[serde(rename = "%")]
    Percent,
    /// Slope angle in degrees
    #[serde(rename = "degree")]
    Degree,
}

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(
        "vehicle-performance",
        vec![
            FieldSpec::float("max_curve").at_least(0.0),
            FieldSpec::choice("curve_unit", CURVE_UNITS),
            FieldSpec::float("max_slope").at_least(0.0),
            FieldSpec::choice("slope_unit", SLOPE_UNITS),
            FieldSpec::float("loco_gvw_kg").greater_than(0.0),
            FieldSpec::float("max_speed_kmh").greater_than(0.0),
            FieldSpec::integer("num_axles").greater_than(0.0),
            FieldSpec::float("rear_axle_ratio").greater_than(0.0),
            FieldSpec::float_list("gear_ratios").greater_than(0.0),
            FieldSpec::float("shunting_load_t").at_least(0.0),
            FieldSpec::float("peak_power_kw").greater_than(0.0),
            FieldSpec::float("friction_mu").greater_than(0.0).at_most(1.0),
            FieldSpec::float("wheel_diameter_m").greater_than(0.0),
            FieldSpec::number_map("torque_curve").at_least(0.0),
            FieldSpec::integer("min_rpm").greater_than(0.0).optional(),
            FieldSpec::integer("max_rpm").greater_than(0.0).optional(),
        ],
    )
});

/// Get the declarative input contract for this tool
pub fn schema() -> &'static Schema {
    &SCHEMA
}

/// Input parameters for the vehicle performance calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "max_curve": 875.0,
///   "curve_unit": "m",
///   "max_slope": 2.0,
///   "slope_unit": "%",
///   "loco_gvw_kg": 120000.0,
///   "max_speed_kmh": 100.0,
///   "num_axles": 4,
///   "rear_axle_ratio": 4.0,
///   "gear_ratios": [2.0, 1.0],
///   "shunting_load_t": 200.0,
///   "peak_power_kw": 500.0,
///   "friction_mu": 0.35,
///   "wheel_diameter_m": 1.0,
///   "torque_curve": {"1000": 2000.0, "1500": 2300.0, "2000": 2400.0},
///   "min_rpm": 1000,
///   "max_rpm": 2000
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehiclePerformanceInput {
    /// Sharpest curve to evaluate, in `curve_unit`
    pub max_curve: f64,

    /// Unit of `max_curve`
    pub curve_unit: CurveUnit,

    /// Steepest slope to evaluate, in `slope_unit`
    pub max_slope: f64,

    /// Unit of `max_slope`
    pub slope_unit: SlopeUnit,

    /// Locomotive gross weight in kg
    pub loco_gvw_kg: f64,

    /// Rated maximum speed in km/h (report data)
    pub max_speed_kmh: f64,

    /// Number of axles
    pub num_axles: u32,

    /// Final drive ratio between gearbox and axle
    pub rear_axle_ratio: f64,

    /// Gearbox ratios to evaluate
    pub gear_ratios: Vec<f64>,

    /// Trailing wagon load for the shunting analysis, tonnes
    pub shunting_load_t: f64,

    /// Engine peak power in kW; torque is capped to never exceed it
    pub peak_power_kw: f64,

    /// Wheel/rail adhesion coefficient
    pub friction_mu: f64,

    /// Wheel diameter in metres
    pub wheel_diameter_m: f64,

    /// Engine torque curve, RPM to Nm
    pub torque_curve: BTreeMap<u32, f64>,

    /// Idle engine speed
    #[serde(default = "default_min_rpm")]
    pub min_rpm: u32,

    /// Governed engine speed
    #[serde(default = "default_max_rpm")]
    pub max_rpm: u32,
}

impl VehiclePerformanceInput {
    /// Validate against the input contract, reporting every violation.
    pub fn validate(&self) -> CalcResult<()> {
        let mut extra = Vec::new();
        if self.min_rpm >= self.max_rpm {
            extra.push(FieldViolation::new(
                "min_rpm",
                self.min_rpm.to_string(),
                "must be less than max_rpm",
            ));
        }
        schema().validate_typed(self, extra)
    }

    /// Maximum curve normalized to degree of curve
    fn normalized_curve_deg(&self) -> f64 {
        match self.curve_unit {
            CurveUnit::Degree => self.max_curve,
            CurveUnit::RadiusMeters => {
                if self.max_curve == 0.0 {
                    0.0
                } else {
                    DEGREE_OF_CURVE_FACTOR / self.max_curve
                }
            }
        }
    }

    /// Maximum slope normalized to percent
    fn normalized_slope_percent(&self) -> f64 {
        match self.slope_unit {
            SlopeUnit::Percent => self.max_slope,
            SlopeUnit::Degree => Radians::from(Degrees(self.max_slope)).value().tan() * 100.0,
        }
    }
}

/// Parse and validate a raw request body into a typed input.
pub fn parse_input(raw: &Value) -> CalcResult<VehiclePerformanceInput> {
    let input: VehiclePerformanceInput = schema().parse(raw)?;
    input.validate()?;
    Ok(input)
}

/// Peak traction against the adhesion limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TractionSnapshot {
    /// Powertrain force at peak torque in the highest gear (N)
    pub max_traction_generated_n: f64,

    /// Adhesion limit μ·W (N)
    pub max_traction_slipping_n: f64,

    /// Whether the powertrain can out-pull the adhesion limit
    pub limited_by_slipping: bool,

    pub result_message: String,
}

/// One sample of a performance curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurvePoint {
    pub slope_percent: f64,
    pub gear_ratio: f64,
    pub speed_kmh: f64,
    /// Tractive effort in N, or shunting capacity in tonnes
    pub value: f64,
}

/// Maximum achievable speed hauling the shunting load at one slope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedSlopeRow {
    pub slope_percent: f64,
    pub max_speed_kmh: f64,
}

/// Results from the vehicle performance calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehiclePerformanceResult {
    /// Curve input normalized to degree of curve
    pub max_curve_deg: f64,

    /// Slope input normalized to percent
    pub max_slope_percent: f64,

    pub traction: TractionSnapshot,

    /// Tractive effort (N) over speed, per slope and gear
    pub tractive_effort_curve: Vec<CurvePoint>,

    /// Haulable wagon tonnage over speed, per slope and gear
    pub shunting_capacity_curve: Vec<CurvePoint>,

    /// Maximum speed per slope for the given shunting load
    pub speed_slope_table: Vec<SpeedSlopeRow>,
}

fn rolling_resistance_loco_n(speed_kmh: f64, weight_t: f64, num_axles: u32) -> f64 {
    let a = 0.647 + 13.17 / (weight_t / f64::from(num_axles));
    let b = 0.00933;
    let c = 0.057 / weight_t;
    (a + b * speed_kmh + c * speed_kmh * speed_kmh) * weight_t * GRAVITY_MPS2
}

fn rolling_resistance_wagon_n(speed_kmh: f64, weight_t: f64) -> f64 {
    (WAGON_ROLLING_A + WAGON_ROLLING_B * speed_kmh + WAGON_ROLLING_C * speed_kmh * speed_kmh)
        * weight_t
        * GRAVITY_MPS2
}

fn gradient_resistance_n(weight_t: f64, slope_percent: f64) -> f64 {
    weight_t * 1000.0 * GRAVITY_MPS2 * slope_percent / 100.0
}

fn curvature_resistance_n(weight_t: f64, curve_deg: f64) -> f64 {
    0.4 * weight_t * curve_deg * GRAVITY_MPS2
}

fn starting_resistance_loco_n(weight_t: f64) -> f64 {
    LOCO_STARTING_PER_TONNE * weight_t * GRAVITY_MPS2
}

fn starting_resistance_wagon_n(weight_t: f64) -> f64 {
    WAGON_STARTING_PER_TONNE * weight_t * GRAVITY_MPS2
}

/// Linear interpolation over the torque curve, clamped at both ends.
fn interpolate_torque(curve: &BTreeMap<u32, f64>, engine_rpm: f64) -> CalcResult<f64> {
    let points: Vec<(f64, f64)> = curve.iter().map(|(&rpm, &nm)| (f64::from(rpm), nm)).collect();
    let (first, last) = match (points.first(), points.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => {
            return Err(CalcError::calculation(
                "vehicle performance",
                "torque curve is empty",
            ))
        }
    };

    if engine_rpm <= first.0 {
        return Ok(first.1);
    }
    if engine_rpm >= last.0 {
        return Ok(last.1);
    }
    for pair in points.windows(2) {
        let (rpm0, nm0) = pair[0];
        let (rpm1, nm1) = pair[1];
        if engine_rpm <= rpm1 {
            return Ok(nm0 + (nm1 - nm0) * (engine_rpm - rpm0) / (rpm1 - rpm0));
        }
    }
    Ok(last.1)
}

/// Cap torque so power never exceeds the engine's peak.
fn power_limited_torque(torque_nm: f64, engine_rpm: f64, peak_power_kw: f64) -> f64 {
    let power_kw = engine_rpm * torque_nm * 2.0 * PI / 60_000.0;
    if power_kw > peak_power_kw && engine_rpm > 0.0 {
        peak_power_kw * 60_000.0 / (engine_rpm * 2.0 * PI)
    } else {
        torque_nm
    }
}

/// Validated input with track limits normalized, shared by all sweeps.
struct PerformanceModel<'a> {
    input: &'a VehiclePerformanceInput,
    curve_deg: f64,
    slope_limit_percent: f64,
    gvw_t: f64,
    slipping_limit_n: f64,
}

impl<'a> PerformanceModel<'a> {
    fn new(input: &'a VehiclePerformanceInput) -> Self {
        let gvw_t = input.loco_gvw_kg / 1000.0;
        PerformanceModel {
            input,
            curve_deg: input.normalized_curve_deg(),
            slope_limit_percent: input.normalized_slope_percent(),
            gvw_t,
            slipping_limit_n: gvw_t * input.friction_mu * 1000.0 * GRAVITY_MPS2,
        }
    }

    fn max_gear(&self) -> f64 {
        self.input.gear_ratios.iter().copied().fold(0.0, f64::max)
    }

    fn min_gear(&self) -> f64 {
        self.input.gear_ratios.iter().copied().fold(f64::INFINITY, f64::min)
    }

    fn engine_rpm(&self, speed_kmh: f64, gear_ratio: f64) -> f64 {
        let speed_ms = MetersPerSecond::from(KilometersPerHour(speed_kmh)).value();
        let wheel_rpm = speed_ms / (PI * self.input.wheel_diameter_m) * 60.0;
        wheel_rpm * gear_ratio * self.input.rear_axle_ratio
    }

    /// Inverse of `engine_rpm`
    fn speed_kmh_at(&self, engine_rpm: f64, gear_ratio: f64) -> f64 {
        let speed_ms = engine_rpm * PI * self.input.wheel_diameter_m
            / (gear_ratio * self.input.rear_axle_ratio * 60.0);
        KilometersPerHour::from(MetersPerSecond(speed_ms)).value()
    }

    /// Vehicle speed at governed RPM in this gear
    fn top_speed_kmh(&self, gear_ratio: f64) -> f64 {
        self.speed_kmh_at(f64::from(self.input.max_rpm), gear_ratio)
    }

    /// Rail force at this speed and gear: interpolated torque, power-capped,
    /// then limited by adhesion.
    fn traction_n(&self, speed_kmh: f64, gear_ratio: f64) -> CalcResult<f64> {
        let engine_rpm = self.engine_rpm(speed_kmh, gear_ratio);
        let torque = power_limited_torque(
            interpolate_torque(&self.input.torque_curve, engine_rpm)?,
            engine_rpm,
            self.input.peak_power_kw,
        );
        let generated =
            2.0 * (torque * gear_ratio * self.input.rear_axle_ratio) / self.input.wheel_diameter_m;
        Ok(generated.min(self.slipping_limit_n))
    }

    /// Level track up to the slope limit in 0.5 % steps
    fn slope_steps(&self) -> Vec<f64> {
        let count = ((self.slope_limit_percent + 1e-9) / SLOPE_STEP_PERCENT).floor() as usize;
        (0..=count).map(|i| i as f64 * SLOPE_STEP_PERCENT).collect()
    }

    fn snapshot(&self) -> TractionSnapshot {
        let max_torque = self.input.torque_curve.values().copied().fold(0.0, f64::max);
        let generated = 2.0 * (max_torque * self.max_gear() * self.input.rear_axle_ratio)
            / self.input.wheel_diameter_m;
        let limited_by_slipping = generated > self.slipping_limit_n;

        let result_message = if limited_by_slipping {
            "Limited by slipping".to_string()
        } else {
            "Not limited by slipping".to_string()
        };

        TractionSnapshot {
            max_traction_generated_n: generated.max(0.0),
            max_traction_slipping_n: self.slipping_limit_n,
            limited_by_slipping,
            result_message,
        }
    }

    /// Sweep slopes, gears and speeds; `shunting` selects haulable tonnage
    /// instead of raw effort.
    fn curve_points(&self, shunting: bool) -> CalcResult<Vec<CurvePoint>> {
        let mut points = Vec::new();

        for slope_percent in self.slope_steps() {
            for &gear_ratio in &self.input.gear_ratios {
                let top = self.top_speed_kmh(gear_ratio);
                for i in 0..SPEED_SAMPLES {
                    let speed_kmh = top * i as f64 / (SPEED_SAMPLES - 1) as f64;
                    let traction = self.traction_n(speed_kmh, gear_ratio)?;

                    // Effort and capacity both budget from standstill
                    let loco_res = rolling_resistance_loco_n(
                        speed_kmh,
                        self.gvw_t,
                        self.input.num_axles,
                    ) + gradient_resistance_n(self.gvw_t, slope_percent)
                        + curvature_resistance_n(self.gvw_t, self.curve_deg)
                        + starting_resistance_loco_n(self.gvw_t);

                    let value = if shunting {
                        let remaining = traction - loco_res;
                        if remaining > 0.0 {
                            let per_tonne = rolling_resistance_wagon_n(speed_kmh, 1.0)
                                + gradient_resistance_n(1.0, slope_percent)
                                + curvature_resistance_n(1.0, self.curve_deg)
                                + starting_resistance_wagon_n(1.0);
                            if per_tonne > 0.0 {
                                remaining / per_tonne
                            } else {
                                0.0
                            }
                        } else {
                            0.0
                        }
                    } else {
                        traction
                    };

                    points.push(CurvePoint {
                        slope_percent,
                        gear_ratio,
                        speed_kmh,
                        value,
                    });
                }
            }
        }
        Ok(points)
    }

    /// Highest speed per slope where traction in the lowest gear still
    /// covers locomotive plus trailing-load running resistance.
    fn speed_slope_table(&self) -> CalcResult<Vec<SpeedSlopeRow>> {
        let max_gear = self.max_gear();
        let min_speed = self.speed_kmh_at(f64::from(self.input.min_rpm), max_gear);
        let max_speed = self.top_speed_kmh(self.min_gear());

        let mut rows = Vec::new();
        for slope_percent in self.slope_steps() {
            let mut max_achievable = 0.0;
            for i in 0..SPEED_SAMPLES {
                let speed_kmh =
                    min_speed + (max_speed - min_speed) * i as f64 / (SPEED_SAMPLES - 1) as f64;
                let traction = self.traction_n(speed_kmh, max_gear)?;

                let loco_res =
                    rolling_resistance_loco_n(speed_kmh, self.gvw_t, self.input.num_axles)
                        + gradient_resistance_n(self.gvw_t, slope_percent)
                        + curvature_resistance_n(self.gvw_t, self.curve_deg);
                let wagon_res =
                    rolling_resistance_wagon_n(speed_kmh, self.input.shunting_load_t)
                        + gradient_resistance_n(self.input.shunting_load_t, slope_percent)
                        + curvature_resistance_n(self.input.shunting_load_t, self.curve_deg);

                if traction >= loco_res + wagon_res {
                    max_achievable = speed_kmh;
                }
            }
            rows.push(SpeedSlopeRow {
                slope_percent,
                max_speed_kmh: max_achievable,
            });
        }
        Ok(rows)
    }
}

/// Calculate the full performance analysis.
pub fn calculate(input: &VehiclePerformanceInput) -> CalcResult<VehiclePerformanceResult> {
    input.validate()?;

    let model = PerformanceModel::new(input);

    Ok(VehiclePerformanceResult {
        max_curve_deg: model.curve_deg,
        max_slope_percent: model.slope_limit_percent,
        traction: model.snapshot(),
        tractive_effort_curve: model.curve_points(false)?,
        shunting_capacity_curve: model.curve_points(true)?,
        speed_slope_table: model.speed_slope_table()?,
    })
}
