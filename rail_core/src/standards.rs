//! # Stopping Distance Standards
//!
//! Braking performance requirements for road-rail machines, from
//! DIN EN 15746-2:2021-05. Two lookup tables drive the braking tool:
//!
//! - [`BRAKING_PERFORMANCE`]: speed (km/h) to the braking distance (m) the
//!   machine must be able to achieve. Sizing the brake system means meeting
//!   every row of this table.
//! - [`MAX_STOPPING_DISTANCE`]: speed (km/h) to the maximum permitted total
//!   stopping distance (m), including operator reaction. Computed results
//!   are judged against this table.
//!
//! Lookups take the row with the highest speed at or below the query speed.

use serde::{Deserialize, Serialize};

/// Standard the tables are taken from
pub const STANDARD_CITATION: &str = "DIN EN 15746-2:2021-05";

/// Required braking distance by speed, (km/h, m), ascending by speed
pub const BRAKING_PERFORMANCE: &[(f64, f64)] = &[
    (8.0, 3.0),
    (10.0, 5.0),
    (16.0, 12.0),
    (20.0, 20.0),
    (24.0, 28.0),
    (30.0, 45.0),
    (32.0, 50.0),
    (40.0, 75.0),
    (50.0, 135.0),
    (60.0, 180.0),
];

/// Maximum permitted total stopping distance by speed, (km/h, m), ascending
pub const MAX_STOPPING_DISTANCE: &[(f64, f64)] = &[
    (8.0, 6.0),
    (10.0, 9.0),
    (16.0, 18.0),
    (20.0, 27.0),
    (24.0, 36.0),
    (30.0, 55.0),
    (32.0, 60.0),
    (40.0, 90.0),
    (50.0, 155.0),
    (60.0, 230.0),
    (70.0, 300.0),
    (80.0, 400.0),
    (90.0, 500.0),
    (100.0, 620.0),
];

/// Reference braking distance when the speed is below every performance row
const REFERENCE_DISTANCE_FALLBACK_M: f64 = 50.0;

/// Verdict of a stopping distance check against the standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compliance {
    /// Total stopping distance within the permitted maximum
    Followed,
    /// Total stopping distance over the permitted maximum
    Exceeded,
    /// Speed below every table row, no requirement applies
    NoStandard,
    /// Row is outside the standard's scope (road mode, unbounded distance)
    NotApplicable,
}

impl Compliance {
    /// Get display string as shown on reports
    pub fn display_name(&self) -> &'static str {
        match self {
            Compliance::Followed => "✓ Standard Followed",
            Compliance::Exceeded => "✗ Standard Exceeded",
            Compliance::NoStandard => "Standard Not Found",
            Compliance::NotApplicable => "N/A",
        }
    }
}

impl std::fmt::Display for Compliance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Maximum permitted total stopping distance for the given speed. `None`
/// when the speed is below every table row.
pub fn allowed_stopping_distance(speed_kmh: f64) -> Option<f64> {
    MAX_STOPPING_DISTANCE
        .iter()
        .rev()
        .find(|(limit, _)| speed_kmh >= *limit)
        .map(|(_, dist)| *dist)
}

/// Judge a computed total stopping distance against the standard.
pub fn check_compliance(speed_kmh: f64, total_distance_m: f64) -> Compliance {
    match allowed_stopping_distance(speed_kmh) {
        Some(allowed) if total_distance_m <= allowed => Compliance::Followed,
        Some(_) => Compliance::Exceeded,
        None => Compliance::NoStandard,
    }
}

/// Required braking distance for the given speed, used to size the
/// reference deceleration. Speeds below the whole table fall back to a
/// conservative 50 m.
pub fn reference_braking_distance(speed_kmh: f64) -> f64 {
    BRAKING_PERFORMANCE
        .iter()
        .rev()
        .find(|(limit, _)| speed_kmh >= *limit)
        .map(|(_, dist)| *dist)
        .unwrap_or(REFERENCE_DISTANCE_FALLBACK_M)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_distance_takes_highest_row_at_or_below() {
        assert_eq!(allowed_stopping_distance(32.0), Some(60.0));
        assert_eq!(allowed_stopping_distance(35.0), Some(60.0));
        assert_eq!(allowed_stopping_distance(100.0), Some(620.0));
        assert_eq!(allowed_stopping_distance(120.0), Some(620.0));
        assert_eq!(allowed_stopping_distance(5.0), None);
    }

    #[test]
    fn test_compliance_verdicts() {
        assert_eq!(check_compliance(40.0, 80.0), Compliance::Followed);
        assert_eq!(check_compliance(40.0, 90.0), Compliance::Followed);
        assert_eq!(check_compliance(40.0, 95.0), Compliance::Exceeded);
        assert_eq!(check_compliance(5.0, 1000.0), Compliance::NoStandard);
    }

    #[test]
    fn test_reference_distance_with_fallback() {
        assert_eq!(reference_braking_distance(24.0), 28.0);
        assert_eq!(reference_braking_distance(100.0), 180.0);
        assert_eq!(reference_braking_distance(5.0), 50.0);
    }

    #[test]
    fn test_tables_ascend_by_speed() {
        for table in [BRAKING_PERFORMANCE, MAX_STOPPING_DISTANCE] {
            for pair in table.windows(2) {
                assert!(pair[0].0 < pair[1].0);
                assert!(pair[0].1 < pair[1].1);
            }
        }
    }
}
