//! HTTP handlers: translate transport concerns to and from the service
//! contract. One POST endpoint per tool, all sharing the same envelope:
//! `{"tool", "result"}` on success, `{"error": {code, message, violations}}`
//! on failure.
//!
//! Status mapping: validation failures are `422` (the caller can correct
//! the request), calculation failures are `400`, anything downstream is
//! `500`.

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use rail_core::calculations::ToolKind;
use rail_core::errors::{CalcError, Stage};
use rail_core::service::run_tool;

pub type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub async fn braking(Json(body): Json<Value>) -> ApiResult {
    respond(ToolKind::Braking, &body)
}

pub async fn hydraulic(Json(body): Json<Value>) -> ApiResult {
    respond(ToolKind::Hydraulic, &body)
}

pub async fn axle_load(Json(body): Json<Value>) -> ApiResult {
    respond(ToolKind::AxleLoad, &body)
}

pub async fn load_distribution(Json(body): Json<Value>) -> ApiResult {
    respond(ToolKind::LoadDistribution, &body)
}

pub async fn tractive_effort(Json(body): Json<Value>) -> ApiResult {
    respond(ToolKind::TractiveEffort, &body)
}

pub async fn vehicle_performance(Json(body): Json<Value>) -> ApiResult {
    respond(ToolKind::VehiclePerformance, &body)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Run one tool and wrap the outcome for transport.
fn respond(tool: ToolKind, body: &Value) -> ApiResult {
    match run_tool(tool, body) {
        Ok(run) => {
            tracing::info!("{} calculated", tool.code());
            Ok(Json(json!({
                "tool": tool.code(),
                "result": run.result,
            })))
        }
        Err(err) => {
            tracing::warn!("{} rejected: {}", tool.code(), err);
            Err(error_response(err))
        }
    }
}

fn error_response(err: CalcError) -> (StatusCode, Json<Value>) {
    let status = match err.stage() {
        Stage::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        Stage::Calculation => StatusCode::BAD_REQUEST,
        Stage::Rendering => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = json!({
        "error": {
            "code": err.error_code(),
            "message": err.to_string(),
            "violations": err.violations(),
        }
    });
    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_carries_the_result() {
        let body = json!({ "wheel_diameter_mm": 920.0, "grade": "880 N/mm²" });
        let Json(envelope) = respond(ToolKind::AxleLoad, &body).unwrap();

        assert_eq!(envelope["tool"], "axle-load");
        let qmax = envelope["result"]["qmax_kn"].as_f64().unwrap();
        assert!((qmax - 243.086).abs() < 0.01);
    }

    #[test]
    fn test_validation_failure_is_422_with_all_violations() {
        let body = json!({ "wheel_diameter_mm": 920.0, "grade": "900 N/mm²", "v_head": 0.0 });
        let (status, Json(envelope)) = respond(ToolKind::AxleLoad, &body).unwrap_err();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(envelope["error"]["code"], "VALIDATION_ERROR");

        let violations = envelope["error"]["violations"].as_array().unwrap();
        let fields: Vec<&str> = violations
            .iter()
            .map(|v| v["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["grade", "v_head"]);
    }

    #[test]
    fn test_calculation_failure_is_400() {
        let body = json!({ "wheel_diameter_mm": 0.0, "grade": "880 N/mm²" });
        let (status, Json(envelope)) = respond(ToolKind::AxleLoad, &body).unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope["error"]["code"], "CALCULATION_ERROR");
        assert_eq!(envelope["error"]["violations"], json!([]));
    }

    #[test]
    fn test_non_object_body_is_422() {
        let (status, Json(envelope)) = respond(ToolKind::Braking, &json!([1, 2, 3])).unwrap_err();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let violations = envelope["error"]["violations"].as_array().unwrap();
        assert_eq!(violations[0]["field"], "$");
    }

    #[tokio::test]
    async fn test_health_shape() {
        let Json(body) = health().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }
}
