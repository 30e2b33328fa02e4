//! # Hydraulic Drive Calculation
//!
//! Hydrostatic drive sizing for a rail machine, in two modes. Displacement
//! mode (`calc_cc`) sizes the motor displacement and the pump per engine
//! gear for a target speed, working from the resistance budget at the wheel
//! back through the axle gearbox. Speed mode (`calc_speed`) goes the other
//! way: given motor and pump displacements it reports the achievable speed
//! per engine gear, warning when a component overspeeds.
//!
//! ## Assumptions
//!
//! - Rolling resistance uses the empirical per-axle-load formula
//!   `A + B·v + C·v²` in kgf per tonne
//! - Starting resistance of 6 kgf/t is always included in the budget
//! - The pump is driven from the engine through the PTO; one pump row is
//!   produced per engine gear ratio
//! - Overspeeding a motor or pump in speed mode is a warning, not an error
//!
//! ## Example
//!
//! ```rust
//! use rail_core::calculations::hydraulic::{calculate, parse_input, HydraulicResult};
//! use serde_json::json;
//!
//! let input = parse_input(&json!({
//!     "calc_mode": "calc_cc",
//!     "weight_t": 40.0,
//!     "axle_count": 2,
//!     "wheel_diameter_mm": 920.0,
//!     "axle_gearbox_ratio": 5.0,
//!     "max_vehicle_rpm": 2200.0,
//!     "pto_gear_ratio": 1.5,
//!     "engine_gear_ratios": [1.0],
//!     "motor_count": 2,
//!     "motors_per_axle": 1,
//!     "vol_eff_motor_percent": 95.0,
//!     "vol_eff_pump_percent": 95.0,
//!     "max_motor_rpm": 3000.0,
//!     "max_pump_rpm": 2500.0,
//!     "speed_kmh": 20.0,
//!     "pressure_bar": 200.0,
//!     "mech_eff_motor_percent": 90.0
//! }))
//! .unwrap();
//!
//! match calculate(&input).unwrap() {
//!     HydraulicResult::Displacement(d) => assert!(d.motor_displacement_cc > 0.0),
//!     HydraulicResult::Speed(_) => unreachable!(),
//! }
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::GRAVITY_MPS2;
use crate::errors::{CalcResult, FieldViolation};
use crate::schema::{FieldSpec, Schema};
use crate::units::{KilometersPerHour, MetersPerSecond};

const CALC_MODES: &[&str] = &["calc_cc", "calc_speed"];

/// Starting resistance in kgf per tonne
const STARTING_RESISTANCE_PER_TONNE: f64 = 6.0;

/// Nm to kgf·cm
const NM_TO_KG_CM: f64 = 10.1972;

/// bar to kgf/cm²
const BAR_TO_KG_CM2: f64 = 1.01972;

/// Rounded π as used in the motor displacement formula
const DISPLACEMENT_PI: f64 = 3.1416;

/// Which direction the sizing runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HydraulicMode {
    /// Size motor and pump displacement for a target speed
    #[serde(rename = "calc_cc")]
    Displacement,
    /// Find achievable speed for given displacements
    #[serde(rename = "calc_speed")]
    Speed,
}

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(
        "hydraulic",
        vec![
            FieldSpec::choice("calc_mode", CALC_MODES),
            FieldSpec::float("weight_t").greater_than(0.0),
            FieldSpec::integer("axle_count").greater_than(0.0),
            FieldSpec::float("wheel_diameter_mm").greater_than(0.0),
            FieldSpec::float("axle_gearbox_ratio").greater_than(0.0),
            FieldSpec::float("max_vehicle_rpm").greater_than(0.0),
            FieldSpec::float("pto_gear_ratio").greater_than(0.0),
            FieldSpec::float_list("engine_gear_ratios").greater_than(0.0),
            FieldSpec::integer("motor_count").greater_than(0.0),
            FieldSpec::integer("motors_per_axle").greater_than(0.0),
            FieldSpec::float("vol_eff_motor_percent").greater_than(0.0).at_most(100.0),
            FieldSpec::float("vol_eff_pump_percent").greater_than(0.0).at_most(100.0),
            FieldSpec::float("max_motor_rpm").greater_than(0.0),
            FieldSpec::float("max_pump_rpm").greater_than(0.0),
            FieldSpec::float("slope_percent").at_least(0.0).optional(),
            FieldSpec::float("curve_degree").at_least(0.0).optional(),
            FieldSpec::float("speed_kmh").greater_than(0.0).optional(),
            FieldSpec::float("pressure_bar").greater_than(0.0).optional(),
            FieldSpec::float("mech_eff_motor_percent").greater_than(0.0).at_most(100.0).optional(),
            FieldSpec::float("motor_displacement_cc").greater_than(0.0).optional(),
            FieldSpec::float("pump_displacement_cc").greater_than(0.0).optional(),
        ],
    )
});

/// Get the declarative input contract for this tool
pub fn schema() -> &'static Schema {
    &SCHEMA
}

/// Input parameters for the hydraulic drive calculation.
///
/// The common block is always required. `speed_kmh`, `pressure_bar` and
/// `mech_eff_motor_percent` are required in `calc_cc` mode;
/// `motor_displacement_cc` and `pump_displacement_cc` in `calc_speed` mode.
///
/// ## JSON Example
///
/// ```json
/// {
///   "calc_mode": "calc_speed",
///   "weight_t": 40.0,
///   "axle_count": 2,
///   "wheel_diameter_mm": 920.0,
///   "axle_gearbox_ratio": 5.0,
///   "max_vehicle_rpm": 2200.0,
///   "pto_gear_ratio": 1.5,
///   "engine_gear_ratios": [1.0, 2.5],
///   "motor_count": 2,
///   "motors_per_axle": 1,
///   "vol_eff_motor_percent": 95.0,
///   "vol_eff_pump_percent": 95.0,
///   "max_motor_rpm": 3000.0,
///   "max_pump_rpm": 2500.0,
///   "motor_displacement_cc": 50.0,
///   "pump_displacement_cc": 100.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydraulicInput {
    /// Sizing direction
    pub calc_mode: HydraulicMode,

    /// Machine weight in tonnes
    pub weight_t: f64,

    /// Number of driven axles
    pub axle_count: u32,

    /// Wheel diameter in mm
    pub wheel_diameter_mm: f64,

    /// Gear ratio between motor and axle
    pub axle_gearbox_ratio: f64,

    /// Maximum engine RPM
    pub max_vehicle_rpm: f64,

    /// PTO gear ratio between engine and pump
    pub pto_gear_ratio: f64,

    /// Engine gear ratios to evaluate
    pub engine_gear_ratios: Vec<f64>,

    /// Total hydraulic motors (report data; the sizing is per motor)
    pub motor_count: u32,

    /// Motors per axle (report data)
    pub motors_per_axle: u32,

    /// Motor volumetric efficiency, percent
    pub vol_eff_motor_percent: f64,

    /// Pump volumetric efficiency, percent
    pub vol_eff_pump_percent: f64,

    /// Motor RPM limit for overspeed warnings
    pub max_motor_rpm: f64,

    /// Pump RPM limit for overspeed warnings
    pub max_pump_rpm: f64,

    /// Track gradient in percent
    #[serde(default)]
    pub slope_percent: f64,

    /// Curve degree (1/R with R in metres)
    #[serde(default)]
    pub curve_degree: f64,

    // === Displacement Mode (calc_cc) ===
    /// Target speed in km/h
    #[serde(default)]
    pub speed_kmh: Option<f64>,

    /// System pressure in bar
    #[serde(default)]
    pub pressure_bar: Option<f64>,

    /// Motor mechanical efficiency, percent
    #[serde(default)]
    pub mech_eff_motor_percent: Option<f64>,

    // === Speed Mode (calc_speed) ===
    /// Motor displacement in cc/rev
    #[serde(default)]
    pub motor_displacement_cc: Option<f64>,

    /// Pump displacement in cc/rev
    #[serde(default)]
    pub pump_displacement_cc: Option<f64>,
}

impl HydraulicInput {
    /// Validate against the input contract, reporting every violation.
    pub fn validate(&self) -> CalcResult<()> {
        schema().validate_typed(self, self.conditional_violations())
    }

    /// Mode-specific required fields the flat table cannot express
    fn conditional_violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        match self.calc_mode {
            HydraulicMode::Displacement => {
                let missing = [
                    ("speed_kmh", self.speed_kmh.is_none()),
                    ("pressure_bar", self.pressure_bar.is_none()),
                    ("mech_eff_motor_percent", self.mech_eff_motor_percent.is_none()),
                ];
                for (field, absent) in missing {
                    if absent {
                        violations.push(FieldViolation::new(
                            field,
                            "",
                            "required when calc_mode is calc_cc",
                        ));
                    }
                }
            }
            HydraulicMode::Speed => {
                let missing = [
                    ("motor_displacement_cc", self.motor_displacement_cc.is_none()),
                    ("pump_displacement_cc", self.pump_displacement_cc.is_none()),
                ];
                for (field, absent) in missing {
                    if absent {
                        violations.push(FieldViolation::new(
                            field,
                            "",
                            "required when calc_mode is calc_speed",
                        ));
                    }
                }
            }
        }
        violations
    }

    fn wheel_circumference_m(&self) -> f64 {
        self.wheel_diameter_mm * std::f64::consts::PI / 1000.0
    }
}

/// Parse and validate a raw request body into a typed input.
pub fn parse_input(raw: &Value) -> CalcResult<HydraulicInput> {
    let input: HydraulicInput = schema().parse(raw)?;
    input.validate()?;
    Ok(input)
}

/// Pump sizing for one engine gear (displacement mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PumpRow {
    pub engine_gear_ratio: f64,
    pub engine_rpm: f64,
    /// Propshaft RPM at this gear
    pub prop_rpm: f64,
    pub pump_rpm: f64,
    pub pump_displacement_cc: f64,
}

/// Results of displacement mode: resistance budget, torque chain,
/// motor sizing and per-gear pump sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplacementResult {
    // === Speed and Rotation ===
    pub speed_ms: f64,
    pub wheel_circumference_m: f64,
    pub wheel_rpm: f64,
    /// Motor output RPM (wheel RPM through the axle gearbox)
    pub gearbox_input_rpm: f64,

    // === Resistance Budget (kN) ===
    pub rolling_resistance_kn: f64,
    pub gradient_resistance_kn: f64,
    pub curvature_resistance_kn: f64,
    pub starting_resistance_kn: f64,
    pub total_resistance_kn: f64,

    // === Torque Chain ===
    pub wheel_radius_m: f64,
    pub total_torque_nm: f64,
    pub per_wheel_torque_nm: f64,
    pub per_axle_torque_nm: f64,
    /// Torque at the motor shaft (per-axle torque through the gearbox)
    pub motor_torque_nm: f64,
    pub motor_torque_kg_cm: f64,
    pub pressure_kg_cm2: f64,

    // === Motor and Pump Sizing ===
    pub motor_displacement_cc: f64,
    pub motor_flow_lpm: f64,
    pub pump_rows: Vec<PumpRow>,
}

/// Achievable speed for one engine gear (speed mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GearSpeedRow {
    pub engine_gear_ratio: f64,
    pub engine_rpm: f64,
    pub prop_rpm: f64,
    pub pump_rpm: f64,
    pub pump_flow_lpm: f64,
    /// Motor displacement in litres per revolution
    pub motor_displacement_l: f64,
    pub motor_rpm: f64,
    pub axle_rpm: f64,
    pub wheel_circumference_m: f64,
    pub achievable_speed_kmh: f64,
}

/// Results of speed mode: per-gear speeds plus overspeed warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedResult {
    pub gear_rows: Vec<GearSpeedRow>,
    pub warnings: Vec<String>,
}

/// Results from the hydraulic calculation, tagged by mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum HydraulicResult {
    #[serde(rename = "calc_cc")]
    Displacement(DisplacementResult),
    #[serde(rename = "calc_speed")]
    Speed(SpeedResult),
}

impl HydraulicResult {
    /// Get calculation mode
    pub fn mode(&self) -> HydraulicMode {
        match self {
            HydraulicResult::Displacement(_) => HydraulicMode::Displacement,
            HydraulicResult::Speed(_) => HydraulicMode::Speed,
        }
    }

    /// Overspeed warnings (displacement mode never warns)
    pub fn warnings(&self) -> &[String] {
        match self {
            HydraulicResult::Displacement(_) => &[],
            HydraulicResult::Speed(s) => &s.warnings,
        }
    }
}

fn calculate_displacement(input: &HydraulicInput) -> DisplacementResult {
    // Mode fields are present after validation
    let speed_kmh = input.speed_kmh.unwrap_or_default();
    let pressure_bar = input.pressure_bar.unwrap_or_default();
    let mech_eff = input.mech_eff_motor_percent.unwrap_or_default() / 100.0;

    let weight = input.weight_t;
    let axles = f64::from(input.axle_count);

    // === Speed and Rotation ===
    let circumference = input.wheel_circumference_m();
    let speed_ms = MetersPerSecond::from(KilometersPerHour(speed_kmh)).value();
    let wheel_rpm = speed_ms / circumference * 60.0;
    let gearbox_input_rpm = wheel_rpm * input.axle_gearbox_ratio;

    // === Resistance Budget ===
    // Rolling resistance in kgf/t: A + B·v + C·v²
    let coeff_a = 0.647 + 13.17 / (weight / axles);
    let coeff_b = 0.00933;
    let coeff_c = 0.057 / weight;
    let rolling_kn =
        (coeff_a + coeff_b * speed_kmh + coeff_c * speed_kmh * speed_kmh) * weight * GRAVITY_MPS2
            / 1000.0;
    let gradient_kn = weight * 1000.0 * GRAVITY_MPS2 * input.slope_percent / 100.0 / 1000.0;
    let curvature_kn = 0.4 * weight * input.curve_degree * GRAVITY_MPS2 / 1000.0;
    let starting_kn = STARTING_RESISTANCE_PER_TONNE * weight * GRAVITY_MPS2 / 1000.0;
    let total_kn = rolling_kn + gradient_kn + curvature_kn + starting_kn;

    // === Torque Chain ===
    let wheel_radius = input.wheel_diameter_mm / 2000.0;
    let total_torque = total_kn * 1000.0 * wheel_radius;
    let per_wheel_torque = total_torque / (axles * 2.0);
    let per_axle_torque = total_torque / axles;
    let motor_torque = per_axle_torque / input.axle_gearbox_ratio;

    let motor_torque_kg_cm = motor_torque * NM_TO_KG_CM;
    let pressure_kg_cm2 = pressure_bar * BAR_TO_KG_CM2;

    // === Motor Sizing ===
    // D = T·2π / (P·η_mech), torque in kgf·cm, pressure in kgf/cm²
    let motor_displacement_cc =
        motor_torque_kg_cm * 2.0 * DISPLACEMENT_PI / (pressure_kg_cm2 * mech_eff);
    let motor_flow_lpm =
        motor_displacement_cc * gearbox_input_rpm / (input.vol_eff_motor_percent / 100.0) / 1000.0;

    // === Pump Sizing per Engine Gear ===
    let vol_eff_pump = input.vol_eff_pump_percent / 100.0;
    let pump_rows = input
        .engine_gear_ratios
        .iter()
        .map(|&gear| {
            let prop_rpm = input.max_vehicle_rpm / gear;
            let pump_rpm = input.pto_gear_ratio * prop_rpm;
            let pump_displacement_cc = motor_flow_lpm / (pump_rpm * vol_eff_pump) * 1000.0;
            PumpRow {
                engine_gear_ratio: gear,
                engine_rpm: input.max_vehicle_rpm,
                prop_rpm,
                pump_rpm,
                pump_displacement_cc,
            }
        })
        .collect();

    DisplacementResult {
        speed_ms,
        wheel_circumference_m: circumference,
        wheel_rpm,
        gearbox_input_rpm,
        rolling_resistance_kn: rolling_kn,
        gradient_resistance_kn: gradient_kn,
        curvature_resistance_kn: curvature_kn,
        starting_resistance_kn: starting_kn,
        total_resistance_kn: total_kn,
        wheel_radius_m: wheel_radius,
        total_torque_nm: total_torque,
        per_wheel_torque_nm: per_wheel_torque,
        per_axle_torque_nm: per_axle_torque,
        motor_torque_nm: motor_torque,
        motor_torque_kg_cm,
        pressure_kg_cm2,
        motor_displacement_cc,
        motor_flow_lpm,
        pump_rows,
    }
}

fn calculate_speed(input: &HydraulicInput) -> SpeedResult {
    // Mode fields are present after validation
    let motor_disp_cc = input.motor_displacement_cc.unwrap_or_default();
    let pump_disp_cc = input.pump_displacement_cc.unwrap_or_default();

    let vol_eff_pump = input.vol_eff_pump_percent / 100.0;
    let vol_eff_motor = input.vol_eff_motor_percent / 100.0;
    let circumference = input.wheel_circumference_m();

    let mut warnings = Vec::new();
    let mut gear_rows = Vec::new();

    for &gear in &input.engine_gear_ratios {
        let prop_rpm = input.max_vehicle_rpm / gear;
        let pump_rpm = prop_rpm * input.pto_gear_ratio;
        if pump_rpm > input.max_pump_rpm {
            warnings.push(format!(
                "Engine Gear {}: Pump speed ({:.0} RPM) exceeds max Pump RPM ({:.0} RPM).",
                gear, pump_rpm, input.max_pump_rpm
            ));
        }

        let pump_flow_lpm = pump_disp_cc * pump_rpm * vol_eff_pump / 1000.0;
        let motor_disp_l = motor_disp_cc / 1000.0;
        let motor_rpm = pump_flow_lpm / motor_disp_l * vol_eff_motor;
        if motor_rpm > input.max_motor_rpm {
            warnings.push(format!(
                "Engine Gear {}: Motor speed ({:.0} RPM) exceeds max Motor RPM ({:.0} RPM).",
                gear, motor_rpm, input.max_motor_rpm
            ));
        }

        let axle_rpm = motor_rpm / input.axle_gearbox_ratio;
        let speed_ms = axle_rpm * circumference / 60.0;
        let achievable_speed_kmh = KilometersPerHour::from(MetersPerSecond(speed_ms)).value();

        gear_rows.push(GearSpeedRow {
            engine_gear_ratio: gear,
            engine_rpm: input.max_vehicle_rpm,
            prop_rpm,
            pump_rpm,
            pump_flow_lpm,
            motor_displacement_l: motor_disp_l,
            motor_rpm,
            axle_rpm,
            wheel_circumference_m: circumference,
            achievable_speed_kmh,
        });
    }

    SpeedResult { gear_rows, warnings }
}

/// Calculate hydraulic drive sizing in the requested mode.
pub fn calculate(input: &HydraulicInput) -> CalcResult<HydraulicResult> {
    input.validate()?;

    Ok(match input.calc_mode {
        HydraulicMode::Displacement => HydraulicResult::Displacement(calculate_displacement(input)),
        HydraulicMode::Speed => HydraulicResult::Speed(calculate_speed(input)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn displacement_input() -> HydraulicInput {
        parse_input(&json!({
            "calc_mode": "calc_cc",
            "weight_t": 40.0,
            "axle_count": 2,
            "wheel_diameter_mm": 920.0,
            "axle_gearbox_ratio": 5.0,
            "max_vehicle_rpm": 2200.0,
            "pto_gear_ratio": 1.5,
            "engine_gear_ratios": [1.0],
            "motor_count": 2,
            "motors_per_axle": 1,
            "vol_eff_motor_percent": 95.0,
            "vol_eff_pump_percent": 95.0,
            "max_motor_rpm": 3000.0,
            "max_pump_rpm": 2500.0,
            "speed_kmh": 20.0,
            "pressure_bar": 200.0,
            "mech_eff_motor_percent": 90.0
        }))
        .unwrap()
    }

    fn speed_input() -> HydraulicInput {
        parse_input(&json!({
            "calc_mode": "calc_speed",
            "weight_t": 40.0,
            "axle_count": 2,
            "wheel_diameter_mm": 920.0,
            "axle_gearbox_ratio": 5.0,
            "max_vehicle_rpm": 2200.0,
            "pto_gear_ratio": 1.5,
            "engine_gear_ratios": [1.0],
            "motor_count": 2,
            "motors_per_axle": 1,
            "vol_eff_motor_percent": 95.0,
            "vol_eff_pump_percent": 95.0,
            "max_motor_rpm": 3000.0,
            "max_pump_rpm": 2500.0,
            "motor_displacement_cc": 50.0,
            "pump_displacement_cc": 100.0
        }))
        .unwrap()
    }

    fn displacement_result() -> DisplacementResult {
        match calculate(&displacement_input()).unwrap() {
            HydraulicResult::Displacement(d) => d,
            HydraulicResult::Speed(_) => panic!("wrong mode"),
        }
    }

    #[test]
    fn test_displacement_speed_and_rotation() {
        let result = displacement_result();

        // 20 km/h on a 920 mm wheel: 5.556 m/s over a 2.890 m circumference
        assert!((result.speed_ms - 5.5556).abs() < 0.001);
        assert!((result.wheel_circumference_m - 2.8903).abs() < 0.0001);
        assert!((result.wheel_rpm - 115.33).abs() < 0.01);
        assert!((result.gearbox_input_rpm - result.wheel_rpm * 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_displacement_resistance_budget() {
        let result = displacement_result();

        // A = 0.647 + 13.17/20, C = 0.057/40 at 20 km/h over 40 t
        assert!((result.rolling_resistance_kn - 0.8092).abs() < 0.001);
        assert!((result.starting_resistance_kn - 2.3544).abs() < 1e-9);
        assert_eq!(result.gradient_resistance_kn, 0.0);
        assert_eq!(result.curvature_resistance_kn, 0.0);
        assert!(
            (result.total_resistance_kn
                - (result.rolling_resistance_kn + result.starting_resistance_kn))
                .abs()
                < 1e-12
        );
    }

    #[test]
    fn test_displacement_torque_chain_and_sizing() {
        let result = displacement_result();

        // T = R·r, split per axle, through the 5:1 gearbox
        assert!((result.total_torque_nm - 1455.24).abs() < 0.05);
        assert!((result.per_axle_torque_nm - result.total_torque_nm / 2.0).abs() < 1e-9);
        assert!((result.per_wheel_torque_nm - result.total_torque_nm / 4.0).abs() < 1e-9);
        assert!((result.motor_torque_nm - result.per_axle_torque_nm / 5.0).abs() < 1e-9);

        // D = T·2π/(P·η) with 200 bar and 90% mechanical efficiency
        assert!((result.pressure_kg_cm2 - 203.944).abs() < 0.001);
        assert!((result.motor_displacement_cc - 50.80).abs() < 0.05);
        assert!((result.motor_flow_lpm - 30.84).abs() < 0.05);
    }

    #[test]
    fn test_displacement_pump_rows() {
        let result = displacement_result();

        assert_eq!(result.pump_rows.len(), 1);
        let row = &result.pump_rows[0];
        assert_eq!(row.engine_gear_ratio, 1.0);
        assert!((row.prop_rpm - 2200.0).abs() < 1e-9);
        assert!((row.pump_rpm - 3300.0).abs() < 1e-9);

        // disp = flow/(rpm·η)·1000
        let expected = result.motor_flow_lpm / (3300.0 * 0.95) * 1000.0;
        assert!((row.pump_displacement_cc - expected).abs() < 1e-9);
        assert!((row.pump_displacement_cc - 9.84).abs() < 0.01);
    }

    #[test]
    fn test_pump_row_per_engine_gear() {
        let mut input = displacement_input();
        input.engine_gear_ratios = vec![1.0, 2.5];
        let result = match calculate(&input).unwrap() {
            HydraulicResult::Displacement(d) => d,
            HydraulicResult::Speed(_) => panic!("wrong mode"),
        };

        assert_eq!(result.pump_rows.len(), 2);
        assert!((result.pump_rows[1].prop_rpm - 880.0).abs() < 1e-9);
        assert!((result.pump_rows[1].pump_rpm - 1320.0).abs() < 1e-9);
        // Slower pump needs more displacement for the same flow
        assert!(result.pump_rows[1].pump_displacement_cc > result.pump_rows[0].pump_displacement_cc);
    }

    #[test]
    fn test_speed_mode_chain() {
        let result = match calculate(&speed_input()).unwrap() {
            HydraulicResult::Speed(s) => s,
            HydraulicResult::Displacement(_) => panic!("wrong mode"),
        };

        assert_eq!(result.gear_rows.len(), 1);
        let row = &result.gear_rows[0];

        // 2200 RPM through PTO 1.5 drives the pump at 3300 RPM
        assert!((row.pump_rpm - 3300.0).abs() < 1e-9);
        // 100 cc at 3300 RPM and 95%: 313.5 LPM
        assert!((row.pump_flow_lpm - 313.5).abs() < 1e-9);
        // 50 cc motor: 313.5/0.05·0.95 = 5956.5 RPM
        assert!((row.motor_rpm - 5956.5).abs() < 1e-9);
        assert!((row.axle_rpm - 1191.3).abs() < 1e-9);
        assert!((row.achievable_speed_kmh - 206.6).abs() < 0.1);
    }

    #[test]
    fn test_speed_mode_overspeed_warnings() {
        let result = match calculate(&speed_input()).unwrap() {
            HydraulicResult::Speed(s) => s,
            HydraulicResult::Displacement(_) => panic!("wrong mode"),
        };

        // Pump at 3300 > 2500 and motor at 5956 > 3000 both warn
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].contains("exceeds max Pump RPM"));
        assert!(result.warnings[1].contains("exceeds max Motor RPM"));
    }

    #[test]
    fn test_warnings_accessor_empty_for_displacement() {
        let result = calculate(&displacement_input()).unwrap();
        assert!(result.warnings().is_empty());
        assert_eq!(result.mode(), HydraulicMode::Displacement);
    }

    #[test]
    fn test_displacement_mode_requires_its_fields() {
        let err = parse_input(&json!({
            "calc_mode": "calc_cc",
            "weight_t": 40.0,
            "axle_count": 2,
            "wheel_diameter_mm": 920.0,
            "axle_gearbox_ratio": 5.0,
            "max_vehicle_rpm": 2200.0,
            "pto_gear_ratio": 1.5,
            "engine_gear_ratios": [1.0],
            "motor_count": 2,
            "motors_per_axle": 1,
            "vol_eff_motor_percent": 95.0,
            "vol_eff_pump_percent": 95.0,
            "max_motor_rpm": 3000.0,
            "max_pump_rpm": 2500.0
        }))
        .unwrap_err();

        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["speed_kmh", "pressure_bar", "mech_eff_motor_percent"]);
    }

    #[test]
    fn test_speed_mode_requires_displacements() {
        let err = parse_input(&json!({
            "calc_mode": "calc_speed",
            "weight_t": 40.0,
            "axle_count": 2,
            "wheel_diameter_mm": 920.0,
            "axle_gearbox_ratio": 5.0,
            "max_vehicle_rpm": 2200.0,
            "pto_gear_ratio": 1.5,
            "engine_gear_ratios": [1.0],
            "motor_count": 2,
            "motors_per_axle": 1,
            "vol_eff_motor_percent": 95.0,
            "vol_eff_pump_percent": 95.0,
            "max_motor_rpm": 3000.0,
            "max_pump_rpm": 2500.0
        }))
        .unwrap_err();

        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["motor_displacement_cc", "pump_displacement_cc"]);
    }

    #[test]
    fn test_efficiency_over_100_rejected() {
        let mut input = displacement_input();
        input.vol_eff_motor_percent = 120.0;
        let err = calculate(&input).unwrap_err();

        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.violations()[0].field, "vol_eff_motor_percent");
        assert!(err.violations()[0].constraint.contains("at most 100"));
    }

    #[test]
    fn test_empty_gear_list_rejected() {
        let mut input = displacement_input();
        input.engine_gear_ratios = vec![];
        let err = calculate(&input).unwrap_err();

        assert_eq!(err.violations()[0].field, "engine_gear_ratios");
        assert!(err.violations()[0].constraint.contains("must not be empty"));
    }

    #[test]
    fn test_result_mode_tag() {
        let result = calculate(&displacement_input()).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["mode"], "calc_cc");
        assert!(value["motor_displacement_cc"].is_number());

        let back: HydraulicResult = serde_json::from_value(value).unwrap();
        assert_eq!(back.mode(), HydraulicMode::Displacement);
    }

    #[test]
    fn test_deterministic() {
        let a = serde_json::to_string(&calculate(&speed_input()).unwrap()).unwrap();
        let b = serde_json::to_string(&calculate(&speed_input()).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
