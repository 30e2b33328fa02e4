//! # rail_core - Rail Vehicle Calculation Engine
//!
//! `rail_core` is the computational heart of the rail tool suite: six
//! stateless engineering-calculation tools for rail vehicle design review,
//! from brake sizing to hydrostatic transmissions. All inputs and outputs
//! are JSON-serializable, so the crate drops straight behind an HTTP
//! endpoint or into a batch pipeline.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Validation reports every offending field, not just the first
//! - **One Validation Engine**: Each tool declares its input contract as a
//!   table; a single engine evaluates all of them
//!
//! ## Quick Start
//!
//! ```rust
//! use rail_core::calculations::ToolKind;
//! use rail_core::service::run_tool;
//! use serde_json::json;
//!
//! let run = run_tool(
//!     ToolKind::LoadDistribution,
//!     &json!({
//!         "config": "Bogie",
//!         "total_load_t": 40.0,
//!         "front_percent": 60.0,
//!         "q1_percent": 55.0,
//!         "q3_percent": 50.0
//!     }),
//! )
//! .unwrap();
//!
//! assert!(run.result["passed"].is_boolean());
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The six tools and their input/result records
//! - [`schema`] - Declarative input constraint tables
//! - [`service`] - Request orchestration (validate, calculate, report)
//! - [`standards`] - DIN EN 15746-2 stopping distance tables
//! - [`units`] - Type-safe unit wrappers
//! - [`constants`] - Shared physical constants
//! - [`errors`] - Structured error types
//! - [`report`] - Report payload assembly and the renderer seam
//! - [`history`] - Calculation history records

pub mod calculations;
pub mod constants;
pub mod errors;
pub mod history;
pub mod report;
pub mod schema;
pub mod service;
pub mod standards;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::ToolKind;
pub use errors::{CalcError, CalcResult, FieldViolation};
pub use service::{run_and_render, run_tool, ToolRun};
