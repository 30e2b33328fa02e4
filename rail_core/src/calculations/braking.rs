//! # Braking Calculation
//!
//! Stopping distances and brake force sizing for a road-rail machine per
//! DIN EN 15746-2:2021-05. The brake system is sized so every row of the
//! standard's performance table can be met, then the achievable stopping
//! distances are evaluated per gradient and scenario and judged against the
//! permitted maxima.
//!
//! ## Assumptions
//!
//! - The brake force is held at the sized maximum in every rail scenario;
//!   gradients add or remove the weight component along the slope
//! - Road mode brakes on tyre friction (μ·N) instead of the sized force
//! - Flat track is always evaluated alongside the requested gradients
//! - An exactly zero net force cannot stop the machine: distances are
//!   reported as null, never Infinity
//!
//! ## Example
//!
//! ```rust
//! use rail_core::calculations::braking::{calculate, parse_input};
//! use serde_json::json;
//!
//! let input = parse_input(&json!({
//!     "mass_kg": 40000.0,
//!     "reaction_time_s": 2.0,
//!     "num_wheels": 8,
//!     "wheel_diameter_m": 0.92,
//!     "calc_mode": "Rail",
//!     "rail_speeds_kmh": [100.0],
//!     "rail_gradient_kind": "Percentage (%)"
//! }))
//! .unwrap();
//!
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.rows.len(), 1);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::GRAVITY_MPS2;
use crate::errors::{CalcError, CalcResult, FieldViolation};
use crate::schema::{FieldSpec, Schema};
use crate::standards::{
    check_compliance, reference_braking_distance, Compliance, BRAKING_PERFORMANCE,
};
use crate::units::{Degrees, KilometersPerHour, MetersPerSecond, Radians};

const TRACK_MODES: &[&str] = &["Rail", "Rail+Road"];
const GRADIENT_KINDS: &[&str] = &["Degree (°)", "1 in G", "Percentage (%)"];

fn default_friction_mu() -> f64 {
    0.7
}

fn default_true() -> bool {
    true
}

/// Which surfaces the machine is evaluated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackMode {
    /// Rail running only
    Rail,
    /// Rail running plus road (friction) braking
    #[serde(rename = "Rail+Road")]
    RailRoad,
}

/// How a gradient value is specified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientKind {
    /// Slope angle in degrees
    #[serde(rename = "Degree (°)")]
    Degree,
    /// Rise of 1 per G along the track
    #[serde(rename = "1 in G")]
    OneInG,
    /// Rise over run as a percentage
    #[serde(rename = "Percentage (%)")]
    Percentage,
}

impl GradientKind {
    /// Convert a gradient value to a slope angle in degrees.
    /// A zero gradient is flat regardless of the kind.
    pub fn angle_degrees(&self, gradient: f64) -> f64 {
        if gradient == 0.0 {
            return 0.0;
        }
        match self {
            GradientKind::Degree => gradient,
            GradientKind::OneInG => (1.0 / gradient).atan().to_degrees(),
            GradientKind::Percentage => (gradient / 100.0).atan().to_degrees(),
        }
    }
}

/// Travel scenario on a gradient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scenario {
    /// Flat track, no weight component
    #[serde(rename = "Straight Track")]
    StraightTrack,
    /// Climbing: the slope helps the brakes
    #[serde(rename = "Moving up")]
    MovingUp,
    /// Descending: the slope fights the brakes
    #[serde(rename = "Moving down")]
    MovingDown,
}

impl Scenario {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Scenario::StraightTrack => "Straight Track",
            Scenario::MovingUp => "Moving up",
            Scenario::MovingDown => "Moving down",
        }
    }
}

/// Surface a stopping row was evaluated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Surface {
    Rail,
    Road,
}

static SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new(
        "braking",
        vec![
            FieldSpec::float("mass_kg").greater_than(0.0),
            FieldSpec::float("reaction_time_s").at_least(0.0),
            FieldSpec::integer("num_wheels").greater_than(0.0),
            FieldSpec::float("wheel_diameter_m").at_least(0.0),
            FieldSpec::choice("calc_mode", TRACK_MODES),
            FieldSpec::float_list("rail_speeds_kmh").greater_than(0.0),
            FieldSpec::float_list("rail_gradients").at_least(0.0).optional(),
            FieldSpec::choice("rail_gradient_kind", GRADIENT_KINDS),
            FieldSpec::float_list("road_speeds_kmh").greater_than(0.0).optional(),
            FieldSpec::float_list("road_gradients").at_least(0.0).optional(),
            FieldSpec::choice("road_gradient_kind", GRADIENT_KINDS).optional(),
            FieldSpec::float("friction_mu").greater_than(0.0).at_most(1.0).optional(),
            FieldSpec::text("doc_no").optional(),
            FieldSpec::text("made_by").optional(),
            FieldSpec::text("checked_by").optional(),
            FieldSpec::text("approved_by").optional(),
            FieldSpec::flag("show_gbr").optional(),
            FieldSpec::flag("show_straight").optional(),
            FieldSpec::flag("show_moving_up").optional(),
            FieldSpec::flag("show_moving_down").optional(),
        ],
    )
});

/// Get the declarative input contract for this tool
pub fn schema() -> &'static Schema {
    &SCHEMA
}

/// Input parameters for the braking calculation.
///
/// Rail parameters are always required; road parameters only when
/// `calc_mode` is `"Rail+Road"`. Document fields and `show_*` flags pass
/// through to the report payload untouched.
///
/// ## JSON Example
///
/// ```json
/// {
///   "mass_kg": 40000.0,
///   "reaction_time_s": 2.0,
///   "num_wheels": 8,
///   "wheel_diameter_m": 0.92,
///   "calc_mode": "Rail+Road",
///   "rail_speeds_kmh": [20.0, 50.0],
///   "rail_gradients": [2.0],
///   "rail_gradient_kind": "Percentage (%)",
///   "road_speeds_kmh": [30.0],
///   "road_gradients": [5.0],
///   "road_gradient_kind": "Percentage (%)",
///   "friction_mu": 0.7
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrakingInput {
    /// Machine mass in kg
    pub mass_kg: f64,

    /// Operator reaction time in seconds
    pub reaction_time_s: f64,

    /// Number of braked wheels, for the per-wheel force split
    pub num_wheels: u32,

    /// Wheel diameter in metres (report data, not used in the force math)
    pub wheel_diameter_m: f64,

    /// Rail only, or rail plus road
    pub calc_mode: TrackMode,

    /// Rail speeds to evaluate, km/h
    pub rail_speeds_kmh: Vec<f64>,

    /// Rail gradients to evaluate; flat track is always added
    #[serde(default)]
    pub rail_gradients: Vec<f64>,

    /// How rail gradients are specified
    pub rail_gradient_kind: GradientKind,

    /// Road speeds to evaluate, km/h (Rail+Road mode)
    #[serde(default)]
    pub road_speeds_kmh: Vec<f64>,

    /// Road gradients to evaluate; flat road is always added
    #[serde(default)]
    pub road_gradients: Vec<f64>,

    /// How road gradients are specified (Rail+Road mode)
    #[serde(default)]
    pub road_gradient_kind: Option<GradientKind>,

    /// Tyre/road friction coefficient for road braking
    #[serde(default = "default_friction_mu")]
    pub friction_mu: f64,

    // === Document Metadata (report pass-through) ===
    #[serde(default)]
    pub doc_no: String,
    #[serde(default)]
    pub made_by: String,
    #[serde(default)]
    pub checked_by: String,
    #[serde(default)]
    pub approved_by: String,

    // === Report Section Toggles ===
    #[serde(default)]
    pub show_gbr: bool,
    #[serde(default = "default_true")]
    pub show_straight: bool,
    #[serde(default = "default_true")]
    pub show_moving_up: bool,
    #[serde(default = "default_true")]
    pub show_moving_down: bool,
}

impl BrakingInput {
    /// Validate against the input contract, reporting every violation.
    pub fn validate(&self) -> CalcResult<()> {
        schema().validate_typed(self, self.conditional_violations())
    }

    /// Cross-field rules the flat table cannot express
    fn conditional_violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        if self.calc_mode == TrackMode::RailRoad {
            if self.road_speeds_kmh.is_empty() {
                violations.push(FieldViolation::new(
                    "road_speeds_kmh",
                    "",
                    "required when calc_mode is Rail+Road",
                ));
            }
            if self.road_gradient_kind.is_none() {
                violations.push(FieldViolation::new(
                    "road_gradient_kind",
                    "",
                    "required when calc_mode is Rail+Road",
                ));
            }
        }
        violations
    }
}

/// Parse and validate a raw request body into a typed input.
pub fn parse_input(raw: &Value) -> CalcResult<BrakingInput> {
    let input: BrakingInput = schema().parse(raw)?;
    input.validate()?;
    Ok(input)
}

/// One evaluated stopping scenario.
///
/// Distances are `None` when the net force is exactly zero and the machine
/// never stops; compliance is then not applicable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoppingRow {
    pub surface: Surface,
    pub scenario: Scenario,
    /// Gradient as entered (0 for flat track)
    pub gradient_value: f64,
    /// Gradient converted to a slope angle
    pub gradient_angle_deg: f64,
    pub speed_kmh: f64,
    /// Weight component along the slope (N)
    pub gravitational_force_n: f64,
    /// Brake force (rail) or available friction force (road), N
    pub applied_force_n: f64,
    /// Force actually decelerating the machine (N)
    pub net_force_n: f64,
    pub deceleration_ms2: f64,
    pub braking_distance_m: Option<f64>,
    pub reaction_distance_m: f64,
    pub total_distance_m: Option<f64>,
    pub compliance: Compliance,
}

/// Brake demand for one row of the standard's performance table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityRow {
    pub speed_kmh: f64,
    pub speed_ms: f64,
    pub required_deceleration_ms2: f64,
    pub required_force_n: f64,
    pub reaction_distance_m: f64,
    pub total_distance_m: f64,
}

/// Reference braking case at the highest requested speed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceBraking {
    pub speed_kmh: f64,
    pub braking_distance_m: f64,
    pub deceleration_ms2: f64,
    pub force_n: f64,
}

/// Results from the braking calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrakingResult {
    /// Brake force sized over the whole performance table (N)
    pub max_braking_force_n: f64,

    /// Sized force split per wheel (N)
    pub min_braking_force_n: f64,

    /// Brake force over machine weight, percent (GBR)
    pub braking_ratio_percent: f64,

    /// Reference case at the highest requested rail speed
    pub reference: ReferenceBraking,

    /// Demand per performance table row
    pub capability: Vec<CapabilityRow>,

    /// Evaluated stopping scenarios, rail first
    pub rows: Vec<StoppingRow>,
}

impl BrakingResult {
    /// Whether any rail scenario exceeds the permitted stopping distance
    pub fn any_exceeded(&self) -> bool {
        self.rows.iter().any(|r| r.compliance == Compliance::Exceeded)
    }
}

/// Brake force needed to meet every row of the performance table.
fn required_braking_force(mass_kg: f64) -> f64 {
    BRAKING_PERFORMANCE
        .iter()
        .map(|&(speed_kmh, dist_m)| {
            let v = MetersPerSecond::from(KilometersPerHour(speed_kmh)).value();
            mass_kg * v * v / (2.0 * dist_m)
        })
        .fold(0.0, f64::max)
}

/// User gradients plus flat track, ascending, duplicates removed.
fn gradient_sweep(user: &[f64]) -> Vec<f64> {
    let mut sweep = Vec::with_capacity(user.len() + 1);
    sweep.push(0.0);
    sweep.extend_from_slice(user);
    sweep.sort_by(f64::total_cmp);
    sweep.dedup();
    sweep
}

fn sorted(speeds: &[f64]) -> Vec<f64> {
    let mut out = speeds.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

struct RowParams {
    surface: Surface,
    scenario: Scenario,
    gradient_value: f64,
    gradient_angle_deg: f64,
    speed_kmh: f64,
    gravitational_force_n: f64,
    applied_force_n: f64,
    net_force_n: f64,
}

fn stopping_row(p: RowParams, mass_kg: f64, reaction_time_s: f64) -> StoppingRow {
    let v = MetersPerSecond::from(KilometersPerHour(p.speed_kmh)).value();
    let deceleration = (p.net_force_n / mass_kg).abs();
    let reaction_distance = v * reaction_time_s;
    let braking_distance = if deceleration > 0.0 && v > 0.0 {
        Some(v * v / (2.0 * deceleration))
    } else {
        None
    };
    let total_distance = braking_distance.map(|b| b + reaction_distance);

    let compliance = match (p.surface, total_distance) {
        (Surface::Road, _) => Compliance::NotApplicable,
        (Surface::Rail, None) => Compliance::NotApplicable,
        (Surface::Rail, Some(total)) => check_compliance(p.speed_kmh, total),
    };

    StoppingRow {
        surface: p.surface,
        scenario: p.scenario,
        gradient_value: p.gradient_value,
        gradient_angle_deg: p.gradient_angle_deg,
        speed_kmh: p.speed_kmh,
        gravitational_force_n: p.gravitational_force_n,
        applied_force_n: p.applied_force_n,
        net_force_n: p.net_force_n,
        deceleration_ms2: deceleration,
        braking_distance_m: braking_distance,
        reaction_distance_m: reaction_distance,
        total_distance_m: total_distance,
        compliance,
    }
}

/// Calculate brake sizing and stopping distances for all scenarios.
pub fn calculate(input: &BrakingInput) -> CalcResult<BrakingResult> {
    input.validate()?;

    let mass = input.mass_kg;
    let weight_n = mass * GRAVITY_MPS2;

    // === Brake Sizing Against the Standard ===
    let max_force = required_braking_force(mass);
    let min_force = max_force / f64::from(input.num_wheels);
    let braking_ratio = max_force / weight_n * 100.0;

    // === Capability per Performance Table Row ===
    let capability: Vec<CapabilityRow> = BRAKING_PERFORMANCE
        .iter()
        .map(|&(speed_kmh, dist_m)| {
            let v = MetersPerSecond::from(KilometersPerHour(speed_kmh)).value();
            let decel = v * v / (2.0 * dist_m);
            CapabilityRow {
                speed_kmh,
                speed_ms: v,
                required_deceleration_ms2: decel,
                required_force_n: mass * decel,
                reaction_distance_m: v * input.reaction_time_s,
                total_distance_m: v * input.reaction_time_s + dist_m,
            }
        })
        .collect();

    // === Reference Case at the Top Requested Speed ===
    let top_speed = input
        .rail_speeds_kmh
        .iter()
        .copied()
        .fold(0.0, f64::max);
    let ref_dist = reference_braking_distance(top_speed);
    let ref_v = MetersPerSecond::from(KilometersPerHour(top_speed)).value();
    let ref_decel = ref_v * ref_v / (2.0 * ref_dist);
    let reference = ReferenceBraking {
        speed_kmh: top_speed,
        braking_distance_m: ref_dist,
        deceleration_ms2: ref_decel,
        force_n: mass * ref_decel,
    };

    // === Rail Scenarios ===
    let mut rows = Vec::new();
    let rail_speeds = sorted(&input.rail_speeds_kmh);
    for gradient in gradient_sweep(&input.rail_gradients) {
        let scenarios: &[Scenario] = if gradient > 0.0 {
            &[Scenario::MovingUp, Scenario::MovingDown]
        } else {
            &[Scenario::StraightTrack]
        };
        let angle_deg = input.rail_gradient_kind.angle_degrees(gradient);
        let grav = weight_n * Radians::from(Degrees(angle_deg)).value().sin();

        for &scenario in scenarios {
            let net = match scenario {
                Scenario::StraightTrack => max_force,
                Scenario::MovingUp => max_force + grav,
                Scenario::MovingDown => max_force - grav,
            };
            for &speed in &rail_speeds {
                rows.push(stopping_row(
                    RowParams {
                        surface: Surface::Rail,
                        scenario,
                        gradient_value: gradient,
                        gradient_angle_deg: angle_deg,
                        speed_kmh: speed,
                        gravitational_force_n: grav,
                        applied_force_n: max_force,
                        net_force_n: net,
                    },
                    mass,
                    input.reaction_time_s,
                ));
            }
        }
    }

    // === Road Scenarios (friction braking) ===
    if input.calc_mode == TrackMode::RailRoad {
        let kind = input.road_gradient_kind.ok_or_else(|| {
            CalcError::calculation("braking", "road gradient kind missing in Rail+Road mode")
        })?;
        let road_speeds = sorted(&input.road_speeds_kmh);
        for gradient in gradient_sweep(&input.road_gradients) {
            let angle_deg = kind.angle_degrees(gradient);
            let angle_rad = Radians::from(Degrees(angle_deg)).value();
            let normal = weight_n * angle_rad.cos();
            let grav = weight_n * angle_rad.sin();
            let friction = input.friction_mu * normal;

            let scenarios: &[Scenario] = if gradient > 0.0 {
                &[Scenario::MovingUp, Scenario::MovingDown]
            } else {
                &[Scenario::StraightTrack]
            };
            for &scenario in scenarios {
                let net = match scenario {
                    Scenario::StraightTrack => friction,
                    Scenario::MovingUp => friction + grav,
                    Scenario::MovingDown => friction - grav,
                };
                for &speed in &road_speeds {
                    rows.push(stopping_row(
                        RowParams {
                            surface: Surface::Road,
                            scenario,
                            gradient_value: gradient,
                            gradient_angle_deg: angle_deg,
                            speed_kmh: speed,
                            gravitational_force_n: grav,
                            applied_force_n: friction,
                            net_force_n: net,
                        },
                        mass,
                        input.reaction_time_s,
                    ));
                }
            }
        }
    }

    Ok(BrakingResult {
        max_braking_force_n: max_force,
        min_braking_force_n: min_force,
        braking_ratio_percent: braking_ratio,
        reference,
        capability,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_input() -> BrakingInput {
        parse_input(&json!({
            "mass_kg": 40000.0,
            "reaction_time_s": 2.0,
            "num_wheels": 8,
            "wheel_diameter_m": 0.92,
            "calc_mode": "Rail",
            "rail_speeds_kmh": [100.0],
            "rail_gradient_kind": "Percentage (%)"
        }))
        .unwrap()
    }

    #[test]
    fn test_flat_track_kinematics() {
        let result = calculate(&test_input()).unwrap();

        // Sizing over the table peaks at 0.82305 m/s² (8, 16 and 40 km/h rows)
        assert!((result.max_braking_force_n - 32921.81).abs() < 0.1);

        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.scenario, Scenario::StraightTrack);

        // v²/(2a) at 100 km/h with the sized force, plus v·t reaction
        let braking = row.braking_distance_m.unwrap();
        let total = row.total_distance_m.unwrap();
        assert!((braking - 468.75).abs() < 0.01);
        assert!((row.reaction_distance_m - 55.5556).abs() < 0.001);
        assert!((total - (braking + row.reaction_distance_m)).abs() < 1e-9);

        // 524.3 m is inside the 620 m permitted at 100 km/h
        assert_eq!(row.compliance, Compliance::Followed);
    }

    #[test]
    fn test_braking_ratio_and_wheel_split() {
        let result = calculate(&test_input()).unwrap();

        // GBR = F/(m·g)·100 = 0.82305/9.81·100
        assert!((result.braking_ratio_percent - 8.39).abs() < 0.01);
        assert!((result.min_braking_force_n - result.max_braking_force_n / 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_gradient_adds_up_and_down_scenarios() {
        let mut input = test_input();
        input.rail_gradients = vec![2.0];
        let result = calculate(&input).unwrap();

        // Flat track once, then up and down for the 2% gradient
        let scenarios: Vec<Scenario> = result.rows.iter().map(|r| r.scenario).collect();
        assert_eq!(
            scenarios,
            vec![Scenario::StraightTrack, Scenario::MovingUp, Scenario::MovingDown]
        );

        let straight = &result.rows[0];
        let up = &result.rows[1];
        let down = &result.rows[2];

        assert!(up.net_force_n > straight.net_force_n);
        assert!(down.net_force_n < straight.net_force_n);
        assert!(down.braking_distance_m.unwrap() > straight.braking_distance_m.unwrap());

        // Descending at 100 km/h on 2% no longer meets the 620 m limit
        assert_eq!(up.compliance, Compliance::Followed);
        assert_eq!(down.compliance, Compliance::Exceeded);
    }

    #[test]
    fn test_capability_table_covers_standard() {
        let result = calculate(&test_input()).unwrap();

        assert_eq!(result.capability.len(), BRAKING_PERFORMANCE.len());
        let first = &result.capability[0];
        assert_eq!(first.speed_kmh, 8.0);
        assert!((first.required_deceleration_ms2 - 0.8230).abs() < 0.001);
        assert!((first.total_distance_m - (first.reaction_distance_m + 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_reference_uses_highest_speed() {
        let mut input = test_input();
        input.rail_speeds_kmh = vec![20.0, 50.0];
        let result = calculate(&input).unwrap();

        assert_eq!(result.reference.speed_kmh, 50.0);
        assert_eq!(result.reference.braking_distance_m, 135.0);
        let v = 50.0 / 3.6;
        assert!((result.reference.deceleration_ms2 - v * v / 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_road_rows_in_rail_road_mode() {
        let input = parse_input(&json!({
            "mass_kg": 40000.0,
            "reaction_time_s": 2.0,
            "num_wheels": 8,
            "wheel_diameter_m": 0.92,
            "calc_mode": "Rail+Road",
            "rail_speeds_kmh": [50.0],
            "rail_gradient_kind": "Percentage (%)",
            "road_speeds_kmh": [30.0],
            "road_gradient_kind": "Percentage (%)",
            "friction_mu": 0.7
        }))
        .unwrap();
        let result = calculate(&input).unwrap();

        let road: Vec<&StoppingRow> =
            result.rows.iter().filter(|r| r.surface == Surface::Road).collect();
        assert_eq!(road.len(), 1);

        // Flat road: a = μ·g
        assert!((road[0].deceleration_ms2 - 0.7 * 9.81).abs() < 1e-9);
        assert_eq!(road[0].compliance, Compliance::NotApplicable);
        assert!((road[0].applied_force_n - 0.7 * 40000.0 * 9.81).abs() < 1e-6);
    }

    #[test]
    fn test_rail_road_mode_requires_road_inputs() {
        let err = parse_input(&json!({
            "mass_kg": 40000.0,
            "reaction_time_s": 2.0,
            "num_wheels": 8,
            "wheel_diameter_m": 0.92,
            "calc_mode": "Rail+Road",
            "rail_speeds_kmh": [50.0],
            "rail_gradient_kind": "Percentage (%)"
        }))
        .unwrap_err();

        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["road_speeds_kmh", "road_gradient_kind"]);
    }

    #[test]
    fn test_negative_speed_rejected_before_compute() {
        let err = parse_input(&json!({
            "mass_kg": 40000.0,
            "reaction_time_s": 2.0,
            "num_wheels": 8,
            "wheel_diameter_m": 0.92,
            "calc_mode": "Rail",
            "rail_speeds_kmh": [-10.0],
            "rail_gradient_kind": "Percentage (%)"
        }))
        .unwrap_err();

        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.violations()[0].field, "rail_speeds_kmh[0]");
    }

    #[test]
    fn test_gradient_kind_conversions() {
        assert_eq!(GradientKind::Degree.angle_degrees(5.0), 5.0);
        assert!((GradientKind::OneInG.angle_degrees(30.0) - 1.9091).abs() < 0.001);
        assert!((GradientKind::Percentage.angle_degrees(2.0) - 1.1458).abs() < 0.001);
        assert_eq!(GradientKind::Percentage.angle_degrees(0.0), 0.0);
    }

    #[test]
    fn test_unbounded_distance_serializes_as_null() {
        let row = StoppingRow {
            surface: Surface::Rail,
            scenario: Scenario::MovingDown,
            gradient_value: 8.4,
            gradient_angle_deg: 4.8,
            speed_kmh: 20.0,
            gravitational_force_n: 32921.81,
            applied_force_n: 32921.81,
            net_force_n: 0.0,
            deceleration_ms2: 0.0,
            braking_distance_m: None,
            reaction_distance_m: 11.11,
            total_distance_m: None,
            compliance: Compliance::NotApplicable,
        };
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"braking_distance_m\":null"));
        assert!(!json.contains("Infinity"));
    }

    #[test]
    fn test_report_flags_default() {
        let input = test_input();
        assert!(!input.show_gbr);
        assert!(input.show_straight);
        assert!(input.show_moving_up);
        assert!(input.show_moving_down);
        assert_eq!(input.friction_mu, 0.7);
    }

    #[test]
    fn test_deterministic() {
        let a = serde_json::to_string(&calculate(&test_input()).unwrap()).unwrap();
        let b = serde_json::to_string(&calculate(&test_input()).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_result_serialization_roundtrip() {
        let result = calculate(&test_input()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: BrakingResult = serde_json::from_str(&json).unwrap();

        assert_eq!(back.rows.len(), result.rows.len());
        assert_eq!(back.max_braking_force_n, result.max_braking_force_n);
        assert_eq!(back.rows[0].compliance, result.rows[0].compliance);
    }
}
