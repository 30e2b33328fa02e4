//! # Physical Constants
//!
//! Shared physics constants used by more than one calculation tool.
//! Tool-specific coefficients (empirical wheel-load constants, rolling
//! resistance polynomials) live next to the calculation that uses them.

/// Gravitational acceleration in m/s²
pub const GRAVITY_MPS2: f64 = 9.81;

/// Conventional standard gravity, used to convert kilonewtons to
/// tonne-force (1 t ≈ 9.80665 kN)
pub const STANDARD_GRAVITY_KN_PER_TONNE: f64 = 9.80665;
