//! # Report Context Assembly
//!
//! Builds the structured payload an external document renderer consumes.
//! Page layout and the final PDF bytes live outside this crate: tools hand
//! a [`ReportContext`] across the [`RenderReport`] seam and get opaque
//! document bytes back.
//!
//! A render failure is a [`Render`](crate::errors::CalcError::Render) error
//! and never invalidates the numbers - the calculation result stands even
//! when the document cannot be produced.
//!
//! ## Example
//!
//! ```rust
//! use rail_core::calculations::ToolKind;
//! use rail_core::errors::CalcResult;
//! use rail_core::report::{DocumentInfo, RenderReport, RenderedDocument, ReportContext};
//! use serde_json::json;
//!
//! struct EchoRenderer;
//!
//! impl RenderReport for EchoRenderer {
//!     fn render(&self, context: &ReportContext) -> CalcResult<RenderedDocument> {
//!         Ok(RenderedDocument {
//!             file_name: format!("{}.pdf", context.template),
//!             bytes: context.payload.to_string().into_bytes(),
//!         })
//!     }
//! }
//!
//! let context = ReportContext::new(
//!     ToolKind::AxleLoad,
//!     DocumentInfo::default(),
//!     json!({ "qmax_kn": 243.09 }),
//! );
//!
//! let doc = EchoRenderer.render(&context).unwrap();
//! assert_eq!(doc.file_name, "axle_load_report.pdf");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::calculations::{BrakingInput, ToolKind};
use crate::errors::CalcResult;

/// Title-block metadata printed on every generated document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Document number
    #[serde(default)]
    pub doc_no: String,

    /// Engineer who prepared the calculation
    #[serde(default)]
    pub made_by: String,

    /// Engineer who checked it
    #[serde(default)]
    pub checked_by: String,

    /// Engineer who approved it
    #[serde(default)]
    pub approved_by: String,
}

impl From<&BrakingInput> for DocumentInfo {
    fn from(input: &BrakingInput) -> Self {
        DocumentInfo {
            doc_no: input.doc_no.clone(),
            made_by: input.made_by.clone(),
            checked_by: input.checked_by.clone(),
            approved_by: input.approved_by.clone(),
        }
    }
}

/// Template identifier the renderer resolves to an actual layout
pub fn template_for(tool: ToolKind) -> &'static str {
    match tool {
        ToolKind::Braking => "braking_report",
        ToolKind::Hydraulic => "hydraulic_report",
        ToolKind::AxleLoad => "axle_load_report",
        ToolKind::LoadDistribution => "load_distribution_report",
        ToolKind::TractiveEffort => "tractive_effort_report",
        ToolKind::VehiclePerformance => "vehicle_performance_report",
    }
}

/// Everything a renderer needs for one document: which template to use,
/// the title-block metadata, and the flat data payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportContext {
    /// Tool that produced the payload
    pub tool: ToolKind,

    /// Template identifier, resolved by the renderer
    pub template: String,

    /// Title-block metadata
    pub document: DocumentInfo,

    /// Structured calculation data; no layout, no formatting
    pub payload: Value,
}

impl ReportContext {
    pub fn new(tool: ToolKind, document: DocumentInfo, payload: Value) -> Self {
        ReportContext {
            tool,
            template: template_for(tool).to_string(),
            document,
            payload,
        }
    }
}

/// Assemble the render payload for one completed run.
///
/// The payload carries the validated input echo and the output record side
/// by side, so a template can cite inputs next to derived values without a
/// second lookup.
pub fn build_context(
    tool: ToolKind,
    document: DocumentInfo,
    input: Value,
    result: Value,
) -> ReportContext {
    let payload = json!({
        "input": input,
        "result": result,
    });
    ReportContext::new(tool, document, payload)
}

/// A finished document as handed back by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// Suggested file name, including extension
    pub file_name: String,

    /// Raw document bytes
    pub bytes: Vec<u8>,
}

/// External document renderer seam.
///
/// Implementations live outside this crate (LaTeX, Typst, whatever the
/// deployment uses). Failures must be [`Render`](crate::errors::CalcError::Render)
/// errors so callers can keep the numeric result and report the document
/// problem separately.
pub trait RenderReport {
    fn render(&self, context: &ReportContext) -> CalcResult<RenderedDocument>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::braking::{GradientKind, TrackMode};
    use crate::errors::CalcError;

    fn braking_input() -> BrakingInput {
        BrakingInput {
            mass_kg: 40000.0,
            reaction_time_s: 1.0,
            num_wheels: 8,
            wheel_diameter_m: 0.92,
            calc_mode: TrackMode::Rail,
            rail_speeds_kmh: vec![50.0],
            rail_gradients: vec![],
            rail_gradient_kind: GradientKind::Percentage,
            road_speeds_kmh: vec![],
            road_gradients: vec![],
            road_gradient_kind: None,
            friction_mu: 0.7,
            doc_no: "RC-042".to_string(),
            made_by: "JD".to_string(),
            checked_by: "MK".to_string(),
            approved_by: "HL".to_string(),
            show_gbr: true,
            show_straight: true,
            show_moving_up: true,
            show_moving_down: true,
        }
    }

    #[test]
    fn test_template_names_follow_tool_slugs() {
        assert_eq!(template_for(ToolKind::Braking), "braking_report");
        assert_eq!(template_for(ToolKind::AxleLoad), "axle_load_report");
        assert_eq!(
            template_for(ToolKind::VehiclePerformance),
            "vehicle_performance_report"
        );
    }

    #[test]
    fn test_build_context_carries_input_and_result() {
        let context = build_context(
            ToolKind::AxleLoad,
            DocumentInfo::default(),
            json!({ "wheel_diameter_mm": 920.0 }),
            json!({ "qmax_kn": 243.09 }),
        );

        assert_eq!(context.tool, ToolKind::AxleLoad);
        assert_eq!(context.template, "axle_load_report");
        assert_eq!(context.payload["input"]["wheel_diameter_mm"], 920.0);
        assert_eq!(context.payload["result"]["qmax_kn"], 243.09);
    }

    #[test]
    fn test_document_info_from_braking_input() {
        let document = DocumentInfo::from(&braking_input());

        assert_eq!(document.doc_no, "RC-042");
        assert_eq!(document.made_by, "JD");
        assert_eq!(document.checked_by, "MK");
        assert_eq!(document.approved_by, "HL");
    }

    #[test]
    fn test_failing_renderer_reports_render_stage() {
        struct BrokenRenderer;

        impl RenderReport for BrokenRenderer {
            fn render(&self, context: &ReportContext) -> CalcResult<RenderedDocument> {
                Err(CalcError::render(
                    context.template.clone(),
                    "template not installed",
                ))
            }
        }

        let context = ReportContext::new(
            ToolKind::Hydraulic,
            DocumentInfo::default(),
            json!({}),
        );
        let err = BrokenRenderer.render(&context).unwrap_err();

        assert_eq!(err.error_code(), "RENDER_ERROR");
        assert!(err.to_string().contains("hydraulic_report"));
    }

    #[test]
    fn test_context_serialization_roundtrip() {
        let context = build_context(
            ToolKind::Braking,
            DocumentInfo::from(&braking_input()),
            json!({ "mass_kg": 40000.0 }),
            json!({ "max_braking_force_n": 32921.8 }),
        );

        let json = serde_json::to_string(&context).unwrap();
        assert!(json.contains("\"braking_report\""));
        assert!(json.contains("RC-042"));

        let back: ReportContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tool, ToolKind::Braking);
        assert_eq!(back.document, context.document);
        assert_eq!(back.payload, context.payload);
    }
}
