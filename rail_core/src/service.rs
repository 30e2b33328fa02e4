//! # Tool Orchestration
//!
//! One entry point per request: route a raw JSON body to its tool, run
//! validation then the pure calculation, and assemble the report payload.
//! Each stage fails with its own error variant, so callers can tell a
//! rejected request from a domain error from a failed document.
//!
//! Nothing is retried and nothing is shared between requests - a request
//! is a single pass from raw body to [`ToolRun`] or error.
//!
//! ## Example
//!
//! ```rust
//! use rail_core::calculations::ToolKind;
//! use rail_core::service::run_tool;
//! use serde_json::json;
//!
//! let run = run_tool(
//!     ToolKind::AxleLoad,
//!     &json!({ "wheel_diameter_mm": 920.0, "grade": "880 N/mm²" }),
//! )
//! .unwrap();
//!
//! assert_eq!(run.report.template, "axle_load_report");
//! let qmax = run.result["qmax_kn"].as_f64().unwrap();
//! assert!((qmax - 243.086).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calculations::{
    axle_load, braking, hydraulic, load_distribution, tractive_effort, vehicle_performance,
    ToolKind,
};
use crate::errors::{CalcError, CalcResult};
use crate::history::HistoryRecord;
use crate::report::{build_context, DocumentInfo, RenderReport, RenderedDocument, ReportContext};

/// Outcome of one orchestrated tool run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRun {
    /// Tool that ran
    pub tool: ToolKind,

    /// Validated input echo - the record the calculation actually saw,
    /// with defaults applied
    pub input: Value,

    /// Output record
    pub result: Value,

    /// Payload for the external document renderer
    pub report: ReportContext,
}

impl ToolRun {
    /// History record for this run, ready for the external store.
    pub fn history_record(&self) -> HistoryRecord {
        HistoryRecord::new(self.tool, self.input.clone(), self.result.clone())
    }
}

/// Run one tool against a raw JSON request body.
///
/// Stages run in order and stop at the first failure: schema validation,
/// then the calculation, then report-context assembly.
pub fn run_tool(tool: ToolKind, raw: &Value) -> CalcResult<ToolRun> {
    match tool {
        ToolKind::Braking => {
            let input = braking::parse_input(raw)?;
            let result = braking::calculate(&input)?;
            finish(tool, DocumentInfo::from(&input), &input, &result)
        }
        ToolKind::Hydraulic => {
            let input = hydraulic::parse_input(raw)?;
            let result = hydraulic::calculate(&input)?;
            finish(tool, DocumentInfo::default(), &input, &result)
        }
        ToolKind::AxleLoad => {
            let input = axle_load::parse_input(raw)?;
            let result = axle_load::calculate(&input)?;
            finish(tool, DocumentInfo::default(), &input, &result)
        }
        ToolKind::LoadDistribution => {
            let input = load_distribution::parse_input(raw)?;
            let result = load_distribution::calculate(&input)?;
            finish(tool, DocumentInfo::default(), &input, &result)
        }
        ToolKind::TractiveEffort => {
            let input = tractive_effort::parse_input(raw)?;
            let result = tractive_effort::calculate(&input)?;
            finish(tool, DocumentInfo::default(), &input, &result)
        }
        ToolKind::VehiclePerformance => {
            let input = vehicle_performance::parse_input(raw)?;
            let result = vehicle_performance::calculate(&input)?;
            finish(tool, DocumentInfo::default(), &input, &result)
        }
    }
}

/// Run a tool, then hand the report payload to a renderer.
///
/// A render failure does not discard the numbers: the completed run comes
/// back alongside the renderer's error.
pub fn run_and_render(
    tool: ToolKind,
    raw: &Value,
    renderer: &dyn RenderReport,
) -> CalcResult<(ToolRun, Result<RenderedDocument, CalcError>)> {
    let run = run_tool(tool, raw)?;
    let rendered = renderer.render(&run.report);
    Ok((run, rendered))
}

/// Encode the typed records and assemble the run artifacts.
fn finish<I: Serialize, R: Serialize>(
    tool: ToolKind,
    document: DocumentInfo,
    input: &I,
    result: &R,
) -> CalcResult<ToolRun> {
    let input_value = encode(tool, "input", input)?;
    let result_value = encode(tool, "result", result)?;
    let report = build_context(tool, document, input_value.clone(), result_value.clone());
    Ok(ToolRun {
        tool,
        input: input_value,
        result: result_value,
        report,
    })
}

fn encode<T: Serialize>(tool: ToolKind, part: &str, record: &T) -> CalcResult<Value> {
    serde_json::to_value(record).map_err(|e| {
        CalcError::calculation(tool.code(), format!("{} record encode failed: {}", part, e))
    })
}
