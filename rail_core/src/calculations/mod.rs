//! # Rail Vehicle Calculations
//!
//! This module contains all calculation tools. Each tool follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - `schema()` - Declarative input constraint table
//! - `calculate(input) -> Result<*Result, CalcError>` - Pure calculation function
//!
//! ## Integration
//!
//! All types are designed for transport over JSON:
//! - Inputs can be parsed straight from a request body via the schema table
//! - Clean JSON serialization on both sides
//! - Structured error responses
//!
//! ## Available Calculations
//!
//! - [`braking`] - Stopping distances and brake force sizing (DIN EN 15746-2)
//! - [`hydraulic`] - Hydrostatic transmission sizing and achievable speed
//! - [`axle_load`] - Maximum static wheel load (Qmax) from wheel and rail limits
//! - [`load_distribution`] - Wheel load balance (ΔQ/Q) checks
//! - [`tractive_effort`] - Hauling effort, power, and OHE current demand
//! - [`vehicle_performance`] - Traction curves, shunting capability, speed limits

pub mod axle_load;
pub mod braking;
pub mod hydraulic;
pub mod load_distribution;
pub mod tractive_effort;
pub mod vehicle_performance;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

// Re-export commonly used types
pub use axle_load::{AxleLoadInput, AxleLoadResult};
pub use braking::{BrakingInput, BrakingResult};
pub use hydraulic::{HydraulicInput, HydraulicResult};
pub use load_distribution::{LoadDistributionInput, LoadDistributionResult};
pub use tractive_effort::{TractiveEffortInput, TractiveEffortResult};
pub use vehicle_performance::{VehiclePerformanceInput, VehiclePerformanceResult};

/// Identifier for each calculation tool.
///
/// Used to route raw requests, tag history records, and name report
/// templates. Serializes to the endpoint slug (e.g. `"axle-load"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    Braking,
    Hydraulic,
    AxleLoad,
    LoadDistribution,
    TractiveEffort,
    VehiclePerformance,
}

impl ToolKind {
    /// All tools, in endpoint order
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Braking,
        ToolKind::Hydraulic,
        ToolKind::AxleLoad,
        ToolKind::LoadDistribution,
        ToolKind::TractiveEffort,
        ToolKind::VehiclePerformance,
    ];

    /// Get the endpoint slug (e.g. "axle-load")
    pub fn code(&self) -> &'static str {
        match self {
            ToolKind::Braking => "braking",
            ToolKind::Hydraulic => "hydraulic",
            ToolKind::AxleLoad => "axle-load",
            ToolKind::LoadDistribution => "load-distribution",
            ToolKind::TractiveEffort => "tractive-effort",
            ToolKind::VehiclePerformance => "vehicle-performance",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.to_lowercase().replace([' ', '_'], "-").as_str() {
            "braking" | "brake" => Ok(ToolKind::Braking),
            "hydraulic" | "hydrostatic" => Ok(ToolKind::Hydraulic),
            "axle-load" | "qmax" => Ok(ToolKind::AxleLoad),
            "load-distribution" => Ok(ToolKind::LoadDistribution),
            "tractive-effort" => Ok(ToolKind::TractiveEffort),
            "vehicle-performance" | "performance" => Ok(ToolKind::VehiclePerformance),
            _ => Err(CalcError::invalid_input(
                "tool",
                s,
                "must be one of: braking, hydraulic, axle-load, load-distribution, \
                 tractive-effort, vehicle-performance",
            )),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Braking => "Braking",
            ToolKind::Hydraulic => "Hydraulic",
            ToolKind::AxleLoad => "Axle Load (Qmax)",
            ToolKind::LoadDistribution => "Load Distribution",
            ToolKind::TractiveEffort => "Tractive Effort",
            ToolKind::VehiclePerformance => "Vehicle Performance",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
